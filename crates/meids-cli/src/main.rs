//! `meids` - command-line access to Meilhaus ME-iDS boards.
//!
//! Lists devices, inspects subdevices and ranges, moves single values,
//! runs short stream acquisitions and waits for interrupts. Every command
//! can run against the built-in simulator with `--mock`.
//!
//! # Usage
//!
//! ```bash
//! meids --mock list
//! meids --mock write 0 0 0 2.5 && meids --mock read 0 1 0
//! meids --config meids.toml stream 0 1 --channels 0,1 --rate 10000 --scans 500
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use daq_driver_meids::{IrqEdge, MeidsConfig, MeidsSystem, MockBackend};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "meids")]
#[command(about = "Inspect and drive Meilhaus ME-iDS DAQ boards", long_about = None)]
struct Cli {
    /// Use the simulated board instead of the installed driver library
    #[arg(long, global = true)]
    mock: bool,

    /// Session configuration file (TOML); MEIDS_* variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List devices with their subdevices
    List,

    /// Show everything the driver reports about one device
    Info {
        device: i32,
    },

    /// List the ranges of a subdevice
    Ranges {
        device: i32,
        subdevice: i32,
    },

    /// Read one value
    Read {
        device: i32,
        subdevice: i32,
        channel: i32,
        /// Range index for analog channels
        #[arg(long, default_value_t = 0)]
        range: i32,
        /// Print the raw code instead of a physical value
        #[arg(long)]
        raw: bool,
    },

    /// Write one value
    Write {
        device: i32,
        subdevice: i32,
        channel: i32,
        /// Physical value, or raw code with --raw
        value: f64,
        #[arg(long, default_value_t = 0)]
        range: i32,
        #[arg(long)]
        raw: bool,
    },

    /// Run a counted stream acquisition and summarize each channel
    Stream {
        device: i32,
        subdevice: i32,
        /// Channels to scan, in order
        #[arg(long, value_delimiter = ',', default_value = "0")]
        channels: Vec<i32>,
        /// Conversion rate in Hz
        #[arg(long, default_value_t = 1000.0)]
        rate: f64,
        /// Number of scans to acquire
        #[arg(long, default_value_t = 100)]
        scans: i32,
        #[arg(long, default_value_t = 0)]
        range: i32,
    },

    /// Arm an interrupt and wait for it
    WaitIrq {
        device: i32,
        subdevice: i32,
        #[arg(default_value_t = 0)]
        channel: i32,
        #[arg(long, value_enum, default_value_t = Edge::Rising)]
        edge: Edge,
        /// Timeout in milliseconds, 0 waits until interrupted
        #[arg(long)]
        timeout_ms: Option<u32>,
    },

    /// Start a PWM signal on three counters
    Pwm {
        device: i32,
        /// Prescaler, high and low counter subdevices
        #[arg(num_args = 3)]
        counters: Vec<i32>,
        #[arg(long, default_value_t = 50)]
        duty_cycle: i32,
        #[arg(long, default_value_t = 2)]
        prescaler: i32,
    },

    /// Load a device configuration file into the driver
    LoadConfig {
        path: PathBuf,
    },

    /// Print library and driver versions
    Version,

    /// Print the effective session configuration as TOML
    Config,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Edge {
    Rising,
    Falling,
    Any,
}

impl From<Edge> for IrqEdge {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Rising => IrqEdge::Rising,
            Edge::Falling => IrqEdge::Falling,
            Edge::Any => IrqEdge::Any,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<MeidsConfig> {
    let config = match path {
        Some(path) => MeidsConfig::load(path)?,
        None => MeidsConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    debug!(?config, mock = cli.mock, "Starting");

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    if cli.mock {
        let system = MeidsSystem::open_with(MockBackend::new(), config)?;
        return commands::run(system, cli.command).await;
    }
    open_native(config, cli.command).await
}

#[cfg(feature = "hardware")]
async fn open_native(config: MeidsConfig, command: Command) -> Result<()> {
    let system = MeidsSystem::open_with(daq_driver_meids::NativeBackend::new(), config)?;
    commands::run(system, command).await
}

#[cfg(not(feature = "hardware"))]
async fn open_native(_config: MeidsConfig, _command: Command) -> Result<()> {
    anyhow::bail!("built without the `hardware` feature; pass --mock to use the simulator")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stream() {
        let cli = Cli::try_parse_from([
            "meids", "--mock", "stream", "0", "1", "--channels", "0,3,5", "--rate", "5000",
        ])
        .unwrap();
        assert!(cli.mock);
        match cli.command {
            Command::Stream {
                channels, rate, scans, ..
            } => {
                assert_eq!(channels, vec![0, 3, 5]);
                assert_eq!(rate, 5000.0);
                assert_eq!(scans, 100);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["meids", "read", "0", "1", "2", "--raw", "--mock"]).unwrap();
        assert!(cli.mock);
        assert!(matches!(cli.command, Command::Read { raw: true, channel: 2, .. }));
    }

    #[test]
    fn test_pwm_needs_three_counters() {
        assert!(Cli::try_parse_from(["meids", "pwm", "0", "5", "5"]).is_err());
        assert!(Cli::try_parse_from(["meids", "pwm", "0", "5", "5", "5"]).is_ok());
    }

    #[test]
    fn test_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meids.toml");
        std::fs::write(&path, "force_close = true\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert!(config.force_close);
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
