//! Driver session configuration.
//!
//! [`MeidsConfig`] is layered with figment:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `MEIDS_*` environment variables (`MEIDS_TIMEOUTS__IRQ_WAIT_MS=500`)
//!
//! ```toml
//! open_flags = 0
//! default_error_proc = false
//! force_close = false
//! lock_on_open = "none"
//!
//! [timeouts]
//! single_ms = 0
//! irq_wait_ms = 1000
//! stream_start_ms = 0
//! new_values_ms = 1000
//! ```

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeidsError, Result};

/// Longest timeout accepted anywhere in the configuration.
pub const MAX_TIMEOUT_MS: u32 = 3_600_000;

/// Which driver lock, if any, a session takes right after opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockOnOpen {
    #[default]
    /// Take no lock
    None,
    /// `meLockDriver(ME_LOCK_SET)`
    Driver,
}

/// Default timeouts, in milliseconds. Zero waits forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Blocking single reads and writes
    pub single_ms: u32,
    /// `irq_wait` when the caller passes none
    pub irq_wait_ms: u32,
    /// Blocking stream start
    pub stream_start_ms: u32,
    /// `stream_new_values` when the caller passes none
    pub new_values_ms: u32,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            single_ms: 0,
            irq_wait_ms: 1000,
            stream_start_ms: 0,
            new_values_ms: 1000,
        }
    }
}

/// Options for a [`MeidsSystem`](crate::MeidsSystem) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MeidsConfig {
    /// Raw `meOpen` flags
    pub open_flags: i32,
    /// Let the library log failed calls itself (`meErrorSetDefaultProc`)
    pub default_error_proc: bool,
    /// Close with `ME_CLOSE_FORCE`
    pub force_close: bool,
    /// Lock taken right after `meOpen`, released before `meClose`
    pub lock_on_open: LockOnOpen,
    /// Default timeouts for blocking calls
    pub timeouts: TimeoutSettings,
}

impl MeidsConfig {
    /// Defaults overlaid with `MEIDS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::extract(Self::figment())
    }

    /// Defaults, then `path`, then `MEIDS_*` environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MeidsError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "Loading ME-iDS configuration");
        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("MEIDS_").split("__"));
        Self::extract(figment)
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("MEIDS_").split("__"))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| MeidsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.open_flags & !meids_sys::ME_OPEN_NO_FLAGS != 0 {
            return Err(MeidsError::Config(format!(
                "open_flags {:#x} contains unknown bits",
                self.open_flags
            )));
        }
        let timeouts = [
            ("timeouts.single_ms", self.timeouts.single_ms),
            ("timeouts.irq_wait_ms", self.timeouts.irq_wait_ms),
            ("timeouts.stream_start_ms", self.timeouts.stream_start_ms),
            ("timeouts.new_values_ms", self.timeouts.new_values_ms),
        ];
        for (name, value) in timeouts {
            if value > MAX_TIMEOUT_MS {
                return Err(MeidsError::Config(format!(
                    "{name} = {value}ms exceeds the maximum of {MAX_TIMEOUT_MS}ms"
                )));
            }
        }
        Ok(())
    }

    /// Serialize to TOML, e.g. to write a starting config file.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MeidsError::Config(e.to_string()))
    }

    pub(crate) fn close_flags(&self) -> i32 {
        if self.force_close {
            meids_sys::ME_CLOSE_FORCE
        } else {
            meids_sys::ME_CLOSE_NO_FLAGS
        }
    }
}

/// Timeout in the driver's `int` milliseconds.
pub(crate) fn timeout_arg(ms: u32) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = MeidsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.close_flags(), meids_sys::ME_CLOSE_NO_FLAGS);
        assert_eq!(config.timeouts.irq_wait_ms, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "force_close = true\nlock_on_open = \"driver\"\n[timeouts]\nirq_wait_ms = 250"
        )
        .unwrap();

        let config = MeidsConfig::load(file.path()).unwrap();
        assert!(config.force_close);
        assert_eq!(config.lock_on_open, LockOnOpen::Driver);
        assert_eq!(config.timeouts.irq_wait_ms, 250);
        assert_eq!(config.timeouts.new_values_ms, 1000);
        assert_eq!(config.close_flags(), meids_sys::ME_CLOSE_FORCE);
    }

    #[test]
    fn test_rejects_out_of_range_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nsingle_ms = 99999999").unwrap();
        let err = MeidsConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, MeidsError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        assert!(MeidsConfig::load("/nonexistent/meids.toml").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = MeidsConfig {
            force_close: true,
            ..MeidsConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        let parsed: MeidsConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
