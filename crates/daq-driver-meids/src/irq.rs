//! External and digital-input interrupts.
//!
//! An interrupt line is armed with [`MeidsSystem::irq_start`] and then
//! either waited on ([`MeidsSystem::irq_wait`]) or delivered to a closure
//! registered with [`MeidsSystem::set_irq_callback`].

use tracing::{debug, info};

use crate::address::{ChannelAddr, SubdeviceAddr};
use crate::backend::MeidsBackend;
use crate::callback::{CallbackAction, IrqEvent};
use crate::codes::{IrqEdge, IrqSource};
use crate::config::timeout_arg;
use crate::error::{MeidsError, Result};
use crate::flags::{IrqStartFlags, IrqWaitFlags};
use crate::system::MeidsSystem;

/// One interrupt returned by [`MeidsSystem::irq_wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqWaitResult {
    /// Interrupts seen on the channel since it was armed
    pub irq_count: i32,
    /// Input state captured with the interrupt
    pub value: i32,
}

impl<B: MeidsBackend> MeidsSystem<B> {
    // =========================================================================
    // Arming
    // =========================================================================

    /// Arm the interrupt of `channel`.
    ///
    /// `arg` is the source-specific argument (pattern, mask or bit index);
    /// pass 0 where the source takes none.
    pub fn irq_start(
        &self,
        channel: ChannelAddr,
        source: IrqSource,
        edge: IrqEdge,
        arg: i32,
        flags: IrqStartFlags,
    ) -> Result<()> {
        let status = self.backend().irq_start(
            channel.device,
            channel.subdevice,
            channel.channel,
            source.to_raw(),
            edge.to_raw(),
            arg,
            flags.bits(),
        );
        self.check("meIOIrqStart", status)?;
        info!(%channel, ?source, ?edge, "Interrupt armed");
        Ok(())
    }

    /// Disarm the interrupt of `channel`. Pending waits return with
    /// an error.
    pub fn irq_stop(&self, channel: ChannelAddr) -> Result<()> {
        let status = self.backend().irq_stop(
            channel.device,
            channel.subdevice,
            channel.channel,
            meids_sys::ME_IO_IRQ_STOP_NO_FLAGS,
        );
        self.check("meIOIrqStop", status)?;
        debug!(%channel, "Interrupt disarmed");
        Ok(())
    }

    // =========================================================================
    // Waiting
    // =========================================================================

    /// Block until `channel` raises an interrupt.
    ///
    /// `timeout_ms` of `None` uses the configured default; `Some(0)` waits
    /// forever.
    pub fn irq_wait(
        &self,
        channel: ChannelAddr,
        timeout_ms: Option<u32>,
        flags: IrqWaitFlags,
    ) -> Result<IrqWaitResult> {
        let timeout = timeout_arg(timeout_ms.unwrap_or(self.config().timeouts.irq_wait_ms));
        let mut irq_count = 0;
        let mut value = 0;
        let status = self.backend().irq_wait(
            channel.device,
            channel.subdevice,
            channel.channel,
            &mut irq_count,
            &mut value,
            timeout,
            flags.bits(),
        );
        self.check("meIOIrqWait", status)?;
        Ok(IrqWaitResult { irq_count, value })
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Run `handler` on every interrupt of subdevice `addr`, replacing any
    /// earlier handler.
    ///
    /// The handler runs on a driver thread. Returning
    /// [`CallbackAction::Stop`] disarms the interrupt; a panic counts as
    /// `Stop`. The handler lives until it is replaced, cleared or the
    /// session is closed.
    pub fn set_irq_callback<F>(&self, addr: SubdeviceAddr, handler: F) -> Result<()>
    where
        F: FnMut(&IrqEvent) -> CallbackAction + Send + 'static,
    {
        self.inner
            .callbacks
            .set_irq(addr, Box::new(handler), |callback, context| {
                // SAFETY: the registry keeps the slot behind `context` alive
                // until the driver is closed.
                let status = unsafe {
                    self.backend().irq_set_callback(
                        addr.device,
                        addr.subdevice,
                        callback,
                        context,
                        meids_sys::ME_IO_IRQ_SET_CALLBACK_NO_FLAGS,
                    )
                };
                self.check("meIOIrqSetCallback", status)
            })
    }

    /// Unregister the interrupt handler of `addr`.
    pub fn clear_irq_callback(&self, addr: SubdeviceAddr) -> Result<()> {
        self.inner.callbacks.clear_irq(addr, || {
            // SAFETY: clearing a registration passes no context.
            let status = unsafe {
                self.backend().irq_set_callback(
                    addr.device,
                    addr.subdevice,
                    None,
                    std::ptr::null_mut(),
                    meids_sys::ME_IO_IRQ_SET_CALLBACK_NO_FLAGS,
                )
            };
            self.check("meIOIrqSetCallback", status)
        })
    }

    /// Whether an interrupt callback is registered for `addr`.
    pub fn has_irq_callback(&self, addr: SubdeviceAddr) -> bool {
        self.inner.callbacks.has_irq(addr)
    }
}

impl<B: MeidsBackend + 'static> MeidsSystem<B> {
    /// [`irq_wait`](Self::irq_wait) on the blocking thread pool.
    pub async fn irq_wait_async(
        &self,
        channel: ChannelAddr,
        timeout_ms: Option<u32>,
        flags: IrqWaitFlags,
    ) -> Result<IrqWaitResult> {
        let system = self.clone();
        tokio::task::spawn_blocking(move || system.irq_wait(channel, timeout_ms, flags))
            .await
            .map_err(|e| MeidsError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    use crate::error::ErrorCode;
    use crate::mock::MockBackend;

    const EXT: SubdeviceAddr = SubdeviceAddr::new(0, 6);
    const AO: SubdeviceAddr = SubdeviceAddr::new(0, 0);

    fn system() -> MeidsSystem<MockBackend> {
        MeidsSystem::open(MockBackend::new()).unwrap()
    }

    fn arm(system: &MeidsSystem<MockBackend>) {
        system
            .irq_start(
                EXT.channel(0),
                IrqSource::DioDefault,
                IrqEdge::Rising,
                0,
                IrqStartFlags::empty(),
            )
            .unwrap();
    }

    #[test]
    fn test_wait_returns_pending_interrupt() {
        let system = system();
        arm(&system);
        assert!(system.backend().trigger_irq(0, 6, 0, 0x5A));

        let result = system
            .irq_wait(EXT.channel(0), Some(100), IrqWaitFlags::empty())
            .unwrap();
        assert_eq!(result, IrqWaitResult { irq_count: 1, value: 0x5A });
    }

    #[test]
    fn test_wait_times_out() {
        let system = system();
        arm(&system);
        let err = system
            .irq_wait(EXT.channel(0), Some(10), IrqWaitFlags::empty())
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_wait_on_disarmed_line() {
        let system = system();
        arm(&system);
        system.irq_stop(EXT.channel(0)).unwrap();
        let err = system
            .irq_wait(EXT.channel(0), Some(10), IrqWaitFlags::empty())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SubdeviceNotRunning));
        assert!(!system.backend().trigger_irq(0, 6, 0, 1));
    }

    #[test]
    fn test_irq_not_supported_on_analog_output() {
        let system = system();
        let flags = IrqStartFlags::empty();
        let err = system
            .irq_start(AO.channel(0), IrqSource::DioDefault, IrqEdge::Rising, 0, flags)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotSupported));
        assert!(system.set_irq_callback(AO, |_| CallbackAction::Continue).is_err());
        assert!(!system.has_irq_callback(AO));
    }

    #[test]
    fn test_callback_outlives_registering_scope() {
        let system = system();
        let seen = Arc::new(AtomicI32::new(0));
        {
            let seen = seen.clone();
            system
                .set_irq_callback(EXT, move |event| {
                    seen.store(event.value, Ordering::SeqCst);
                    CallbackAction::Continue
                })
                .unwrap();
        }
        arm(&system);
        assert!(system.backend().trigger_irq(0, 6, 0, 77));
        system.backend().join_callbacks();
        assert_eq!(seen.load(Ordering::SeqCst), 77);
    }

    #[test]
    fn test_replaced_callback_is_not_called() {
        let system = system();
        let first = Arc::new(AtomicI32::new(0));
        let second = Arc::new(AtomicI32::new(0));
        let (f, s) = (first.clone(), second.clone());
        system
            .set_irq_callback(EXT, move |_| {
                f.fetch_add(1, Ordering::SeqCst);
                CallbackAction::Continue
            })
            .unwrap();
        system
            .set_irq_callback(EXT, move |_| {
                s.fetch_add(1, Ordering::SeqCst);
                CallbackAction::Continue
            })
            .unwrap();

        arm(&system);
        system.backend().trigger_irq(0, 6, 0, 1);
        system.backend().join_callbacks();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_disarms_and_panic_counts_as_stop() {
        let system = system();
        system.set_irq_callback(EXT, |_| CallbackAction::Stop).unwrap();
        arm(&system);
        assert!(system.backend().trigger_irq(0, 6, 0, 1));
        system.backend().join_callbacks();
        assert!(!system.backend().trigger_irq(0, 6, 0, 2));

        system
            .set_irq_callback(EXT, |_| panic!("handler failure"))
            .unwrap();
        arm(&system);
        assert!(system.backend().trigger_irq(0, 6, 0, 3));
        system.backend().join_callbacks();
        assert!(!system.backend().trigger_irq(0, 6, 0, 4));
    }

    #[test]
    fn test_clear_callback() {
        let system = system();
        system.set_irq_callback(EXT, |_| CallbackAction::Continue).unwrap();
        assert!(system.has_irq_callback(EXT));
        system.clear_irq_callback(EXT).unwrap();
        assert!(!system.has_irq_callback(EXT));
    }

    #[tokio::test]
    async fn test_async_wait() {
        let system = system();
        arm(&system);
        system.backend().trigger_irq(0, 6, 0, 9);
        let result = system
            .irq_wait_async(EXT.channel(0), Some(100), IrqWaitFlags::empty())
            .await
            .unwrap();
        assert_eq!(result.value, 9);
    }
}
