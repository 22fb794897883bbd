//! Driver session: open/close, locking, error reporting and reset.
//!
//! [`MeidsSystem`] owns one `meOpen` of the driver and closes it when the
//! last clone is dropped. All other operations are added by the sibling
//! modules as further `impl` blocks on the same type.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::address::SubdeviceAddr;
use crate::backend::MeidsBackend;
use crate::callback::{self, CallbackRegistry, ErrorEvent, ErrorHandler};
use crate::codes::{ErrorSwitch, LockMode};
use crate::config::{LockOnOpen, MeidsConfig};
use crate::error::{ErrorCode, MeidsError, Result};
use crate::flags::{ErrorQueryFlags, ResetDeviceFlags};

/// Read a NUL-terminated string out of a driver buffer.
pub(crate) fn c_buffer_to_string(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|b| *b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).into_owned()
}

pub(crate) struct SystemInner<B: MeidsBackend> {
    pub(crate) backend: B,
    pub(crate) config: MeidsConfig,
    pub(crate) callbacks: CallbackRegistry,
    closed: AtomicBool,
    /// Generation of the error handler this session installed, 0 if none.
    error_handler: AtomicU64,
}

impl<B: MeidsBackend> SystemInner<B> {
    /// Unregister callbacks, close the driver and free the callback slots.
    fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let (irq, stream) = self.callbacks.registered();
        for addr in irq {
            // SAFETY: clearing a registration passes no context.
            let status = unsafe {
                self.backend
                    .irq_set_callback(
                        addr.device,
                        addr.subdevice,
                        None,
                        std::ptr::null_mut(),
                        meids_sys::ME_IO_IRQ_SET_CALLBACK_NO_FLAGS,
                    )
            };
            if status != meids_sys::ME_ERRNO_SUCCESS {
                debug!(%addr, status, "Could not clear interrupt callback before close");
            }
        }
        for addr in stream {
            // SAFETY: clearing a registration passes no context.
            let status = unsafe {
                self.backend.stream_set_callbacks(
                    addr.device,
                    addr.subdevice,
                    None,
                    std::ptr::null_mut(),
                    None,
                    std::ptr::null_mut(),
                    None,
                    std::ptr::null_mut(),
                    meids_sys::ME_IO_STREAM_SET_CALLBACKS_NO_FLAGS,
                )
            };
            if status != meids_sys::ME_ERRNO_SUCCESS {
                debug!(%addr, status, "Could not clear stream callbacks before close");
            }
        }
        let generation = self.error_handler.swap(0, Ordering::SeqCst);
        let removed = callback::remove_error_handler(generation, || {
            // SAFETY: None unregisters the trampoline.
            let status = unsafe { self.backend.error_set_user_proc(None) };
            MeidsError::check("meErrorSetUserProc", status)
        });
        if let Err(e) = removed {
            debug!(error = %e, "Could not remove error handler before close");
        }
        if self.config.lock_on_open == LockOnOpen::Driver {
            let status = self
                .backend
                .lock_driver(LockMode::Release.to_raw(), meids_sys::ME_LOCK_DRIVER_NO_FLAGS);
            if status != meids_sys::ME_ERRNO_SUCCESS {
                warn!(status, "Could not release driver lock before close");
            }
        }

        let status = self.backend.close(self.config.close_flags());
        MeidsError::check("meClose", status)?;
        self.callbacks.clear();
        info!("Closed ME-iDS driver");
        Ok(())
    }
}

impl<B: MeidsBackend> Drop for SystemInner<B> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Error closing ME-iDS driver");
        }
    }
}

/// An open session with the ME-iDS driver.
///
/// Cloning is cheap and shares the session; the driver is closed when the
/// last clone is dropped or [`close`](Self::close) is called.
///
/// # Example
///
/// ```
/// use daq_driver_meids::{MeidsSystem, MockBackend};
///
/// # fn main() -> daq_driver_meids::Result<()> {
/// let system = MeidsSystem::open(MockBackend::new())?;
/// assert_eq!(system.number_devices()?, 1);
/// system.close()?;
/// # Ok(())
/// # }
/// ```
pub struct MeidsSystem<B: MeidsBackend> {
    pub(crate) inner: Arc<SystemInner<B>>,
}

impl<B: MeidsBackend> Clone for MeidsSystem<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: MeidsBackend> std::fmt::Debug for MeidsSystem<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeidsSystem")
            .field("closed", &self.inner.closed.load(Ordering::SeqCst))
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "hardware")]
impl MeidsSystem<crate::native::NativeBackend> {
    /// Open the installed driver library with configuration from the
    /// environment.
    pub fn open_native() -> Result<Self> {
        Self::open_with(crate::native::NativeBackend::new(), MeidsConfig::from_env()?)
    }
}

impl<B: MeidsBackend> MeidsSystem<B> {
    /// Open the driver with default settings.
    pub fn open(backend: B) -> Result<Self> {
        Self::open_with(backend, MeidsConfig::default())
    }

    /// Open the driver and apply `config`.
    ///
    /// If a step after `meOpen` fails the driver is closed again before
    /// the error is returned.
    pub fn open_with(backend: B, config: MeidsConfig) -> Result<Self> {
        config.validate()?;
        MeidsError::check("meOpen", backend.open(config.open_flags))?;
        info!(flags = config.open_flags, "Opened ME-iDS driver");

        let system = Self {
            inner: Arc::new(SystemInner {
                backend,
                config,
                callbacks: CallbackRegistry::default(),
                closed: AtomicBool::new(false),
                error_handler: AtomicU64::new(0),
            }),
        };

        // Dropping `system` on error closes the driver.
        if system.inner.config.default_error_proc {
            system.set_default_error_proc(ErrorSwitch::Enable)?;
        }
        if system.inner.config.lock_on_open == LockOnOpen::Driver {
            system.lock_driver(LockMode::Set)?;
        }
        Ok(system)
    }

    /// Close the driver now. Callbacks registered through this session are
    /// unregistered first.
    pub fn close(self) -> Result<()> {
        self.inner.shutdown()
    }

    /// Whether this session has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// The backend this session calls.
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Options the session was opened with.
    pub fn config(&self) -> &MeidsConfig {
        &self.inner.config
    }

    /// Map a raw status, logging failures.
    pub(crate) fn check(&self, function: &'static str, status: i32) -> Result<()> {
        MeidsError::check(function, status).inspect_err(|e| {
            debug!(function, error = %e, "ME-iDS call failed");
        })
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Set, release or check the driver lock.
    pub fn lock_driver(&self, mode: LockMode) -> Result<()> {
        let status = self.backend().lock_driver(mode.to_raw(), meids_sys::ME_LOCK_DRIVER_NO_FLAGS);
        self.check("meLockDriver", status)
    }

    /// Set, release or check the lock on `device`.
    pub fn lock_device(&self, device: i32, mode: LockMode) -> Result<()> {
        let status =
            self.backend()
                .lock_device(device, mode.to_raw(), meids_sys::ME_LOCK_DEVICE_NO_FLAGS);
        self.check("meLockDevice", status)
    }

    /// Set, release or check the lock on one subdevice.
    pub fn lock_subdevice(&self, addr: SubdeviceAddr, mode: LockMode) -> Result<()> {
        let status = self.backend().lock_subdevice(
            addr.device,
            addr.subdevice,
            mode.to_raw(),
            meids_sys::ME_LOCK_SUBDEVICE_NO_FLAGS,
        );
        self.check("meLockSubdevice", status)
    }

    /// Take the driver lock until the guard is dropped.
    pub fn acquire_driver_lock(&self) -> Result<LockGuard<B>> {
        LockGuard::acquire(self, LockScope::Driver)
    }

    /// Take a device lock until the guard is dropped.
    pub fn acquire_device_lock(&self, device: i32) -> Result<LockGuard<B>> {
        LockGuard::acquire(self, LockScope::Device(device))
    }

    /// Take a subdevice lock until the guard is dropped.
    pub fn acquire_subdevice_lock(&self, addr: SubdeviceAddr) -> Result<LockGuard<B>> {
        LockGuard::acquire(self, LockScope::Subdevice(addr))
    }

    // =========================================================================
    // Error reporting
    // =========================================================================

    /// Status of the last failed call, `None` if there was none.
    pub fn last_error(&self, flags: ErrorQueryFlags) -> Result<Option<ErrorCode>> {
        let mut raw = 0;
        let status = self.backend().error_get_last(&mut raw, flags.bits());
        self.check("meErrorGetLast", status)?;
        match ErrorCode::try_from(raw)? {
            ErrorCode::Success => Ok(None),
            code => Ok(Some(code)),
        }
    }

    /// Message describing the last failed call.
    pub fn last_error_message(&self) -> Result<String> {
        let mut buffer = [0u8; meids_sys::ME_ERROR_MSG_MAX_COUNT as usize];
        let status = self.backend().error_get_last_message(&mut buffer);
        self.check("meErrorGetLastMessage", status)?;
        Ok(c_buffer_to_string(&buffer))
    }

    /// The library's message for `code`.
    pub fn error_message(&self, code: ErrorCode) -> Result<String> {
        let mut buffer = [0u8; meids_sys::ME_ERROR_MSG_MAX_COUNT as usize];
        let status = self.backend().error_get_message(code.to_raw(), &mut buffer);
        self.check("meErrorGetMessage", status)?;
        Ok(c_buffer_to_string(&buffer))
    }

    /// Switch the library's built-in error logging on or off.
    pub fn set_default_error_proc(&self, switch: ErrorSwitch) -> Result<()> {
        let status = self.backend().error_set_default_proc(switch.to_raw());
        self.check("meErrorSetDefaultProc", status)
    }

    /// Call `handler` for every failed driver call in the process.
    ///
    /// There is one handler per process; installing a new one replaces the
    /// previous one, whichever session installed it. The handler is removed
    /// when this session closes unless another session has replaced it.
    pub fn set_error_handler<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        let handler: ErrorHandler = Arc::new(handler);
        let generation = callback::install_error_handler(handler, || {
            // SAFETY: the trampoline reads the process-global handler slot,
            // which lives for the whole program.
            let status =
                unsafe { self.backend().error_set_user_proc(callback::error_trampoline_cb()) };
            self.check("meErrorSetUserProc", status)
        })?;
        self.inner.error_handler.store(generation, Ordering::SeqCst);
        Ok(())
    }

    /// Remove the handler installed by [`set_error_handler`](Self::set_error_handler).
    ///
    /// A handler another session installed since then is left in place.
    pub fn clear_error_handler(&self) -> Result<()> {
        let generation = self.inner.error_handler.load(Ordering::SeqCst);
        let removed = callback::remove_error_handler(generation, || {
            // SAFETY: None unregisters the trampoline.
            let status = unsafe { self.backend().error_set_user_proc(None) };
            self.check("meErrorSetUserProc", status)
        })?;
        if !removed {
            debug!("Error handler belongs to another session; leaving it installed");
        }
        self.inner.error_handler.store(0, Ordering::SeqCst);
        Ok(())
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Reset every subdevice of `device` to its power-on state.
    pub fn reset_device(&self, device: i32, flags: ResetDeviceFlags) -> Result<()> {
        debug!(device, ?flags, "Resetting device");
        let status = self.backend().reset_device(device, flags.bits());
        self.check("meIOResetDevice", status)
    }

    /// Reset one subdevice to its power-on state.
    pub fn reset_subdevice(&self, addr: SubdeviceAddr) -> Result<()> {
        debug!(%addr, "Resetting subdevice");
        let status = self.backend().reset_subdevice(
            addr.device,
            addr.subdevice,
            meids_sys::ME_IO_RESET_SUBDEVICE_NO_FLAGS,
        );
        self.check("meIOResetSubdevice", status)
    }
}

// =============================================================================
// Lock guard
// =============================================================================

/// What a [`LockGuard`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockScope {
    /// The driver lock
    Driver,
    /// Lock on one device
    Device(i32),
    /// Lock on one subdevice
    Subdevice(SubdeviceAddr),
}

/// Releases a driver, device or subdevice lock when dropped.
///
/// Release failures on drop are logged; use [`release`](Self::release) to
/// observe them.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<B: MeidsBackend> {
    system: MeidsSystem<B>,
    scope: LockScope,
    held: bool,
}

impl<B: MeidsBackend> LockGuard<B> {
    fn acquire(system: &MeidsSystem<B>, scope: LockScope) -> Result<Self> {
        let mut guard = Self {
            system: system.clone(),
            scope,
            held: false,
        };
        guard.apply(LockMode::Set)?;
        guard.held = true;
        debug!(?scope, "Acquired lock");
        Ok(guard)
    }

    fn apply(&self, mode: LockMode) -> Result<()> {
        match self.scope {
            LockScope::Driver => self.system.lock_driver(mode),
            LockScope::Device(device) => self.system.lock_device(device, mode),
            LockScope::Subdevice(addr) => self.system.lock_subdevice(addr, mode),
        }
    }

    /// What this guard holds.
    pub fn scope(&self) -> LockScope {
        self.scope
    }

    /// Release the lock now.
    pub fn release(mut self) -> Result<()> {
        self.held = false;
        self.apply(LockMode::Release)
    }
}

impl<B: MeidsBackend> Drop for LockGuard<B> {
    fn drop(&mut self) {
        if !self.held {
            return;
        }
        if let Err(e) = self.apply(LockMode::Release) {
            warn!(scope = ?self.scope, error = %e, "Failed to release lock");
        }
    }
}

impl<B: MeidsBackend> std::fmt::Debug for LockGuard<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("scope", &self.scope)
            .field("held", &self.held)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockLockOwner};

    #[test]
    fn test_open_close() {
        let mock = MockBackend::new();
        let system = MeidsSystem::open(mock.clone()).unwrap();
        assert!(mock.is_open());
        system.close().unwrap();
        assert!(!mock.is_open());
    }

    #[test]
    fn test_drop_closes() {
        let mock = MockBackend::new();
        {
            let system = MeidsSystem::open(mock.clone()).unwrap();
            let _clone = system.clone();
        }
        assert!(!mock.is_open());
    }

    #[test]
    fn test_lock_on_open() {
        let mock = MockBackend::new();
        let config = MeidsConfig {
            lock_on_open: LockOnOpen::Driver,
            ..MeidsConfig::default()
        };
        let system = MeidsSystem::open_with(mock.clone(), config).unwrap();
        system.lock_driver(LockMode::Check).unwrap();
        assert_eq!(mock.driver_lock_owner(), MockLockOwner::Local);
        drop(system);
        assert!(!mock.is_open());
        assert_eq!(mock.driver_lock_owner(), MockLockOwner::Free);
    }

    #[test]
    fn test_lock_on_open_released_while_driver_stays_open() {
        let mock = MockBackend::new();
        let other = MeidsSystem::open(mock.clone()).unwrap();
        let config = MeidsConfig {
            lock_on_open: LockOnOpen::Driver,
            ..MeidsConfig::default()
        };
        let locking = MeidsSystem::open_with(mock.clone(), config).unwrap();
        assert_eq!(mock.driver_lock_owner(), MockLockOwner::Local);

        locking.close().unwrap();
        assert!(mock.is_open());
        assert_eq!(mock.driver_lock_owner(), MockLockOwner::Free);
        other.close().unwrap();
    }

    #[test]
    fn test_lock_guard_releases_on_drop() {
        let mock = MockBackend::new();
        let system = MeidsSystem::open(mock.clone()).unwrap();
        let addr = SubdeviceAddr::new(0, 1);
        {
            let guard = system.acquire_subdevice_lock(addr).unwrap();
            assert_eq!(guard.scope(), LockScope::Subdevice(addr));
            assert_eq!(mock.subdevice_lock_owner(0, 1), Some(MockLockOwner::Local));
        }
        assert_eq!(mock.subdevice_lock_owner(0, 1), Some(MockLockOwner::Free));

        let guard = system.acquire_device_lock(0).unwrap();
        assert_eq!(mock.device_lock_owner(0), Some(MockLockOwner::Local));
        guard.release().unwrap();
        assert_eq!(mock.device_lock_owner(0), Some(MockLockOwner::Free));
    }

    #[test]
    fn test_locked_by_foreign_process() {
        let mock = MockBackend::new();
        let system = MeidsSystem::open(mock.clone()).unwrap();
        mock.set_foreign_subdevice_lock(0, 0, true);
        let err = system
            .acquire_subdevice_lock(SubdeviceAddr::new(0, 0))
            .unwrap_err();
        assert!(err.is_locked());
        assert_eq!(system.last_error(ErrorQueryFlags::CLEAR).unwrap(), Some(ErrorCode::Locked));
        assert_eq!(system.last_error(ErrorQueryFlags::empty()).unwrap(), None);
    }

    #[test]
    fn test_error_messages() {
        let system = MeidsSystem::open(MockBackend::new()).unwrap();
        let message = system.error_message(ErrorCode::Timeout).unwrap();
        assert_eq!(message, ErrorCode::Timeout.message());

        let _ = system.reset_subdevice(SubdeviceAddr::new(4, 0));
        assert_eq!(
            system.last_error_message().unwrap(),
            ErrorCode::InvalidDevice.message()
        );
    }

    #[test]
    fn test_c_buffer_to_string() {
        assert_eq!(c_buffer_to_string(b"ME-4680\0garbage"), "ME-4680");
        assert_eq!(c_buffer_to_string(b"no-nul"), "no-nul");
    }
}
