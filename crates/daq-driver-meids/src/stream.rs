//! Buffered (streaming) acquisition and output.
//!
//! A stream is configured with a channel list and a [`StreamTrigger`],
//! started, then drained with [`MeidsSystem::stream_read`] (input) or fed
//! with [`MeidsSystem::stream_write`] (output). Progress can be polled with
//! [`MeidsSystem::stream_status`] or pushed through callbacks.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::address::SubdeviceAddr;
use crate::backend::MeidsBackend;
use crate::callback::{CallbackAction, StreamCallbacks, StreamEvent};
use crate::codes::{ReadMode, StartMode, StopMode, StreamStatus, Timer, WaitMode, WriteMode};
use crate::config::timeout_arg;
use crate::error::{list_len, Result};
use crate::flags::{
    StreamConfigFlags, StreamReadFlags, StreamStartFlags, StreamStopFlags, TicksFlags,
};
use crate::records::{
    join_ticks, StreamChannel, StreamStartRequest, StreamStopRequest, StreamTrigger,
};
use crate::system::MeidsSystem;

fn count_to_usize(count: i32) -> usize {
    usize::try_from(count).unwrap_or(0)
}

impl<B: MeidsBackend> MeidsSystem<B> {
    // =========================================================================
    // Configuration
    // =========================================================================

    /// Load a channel list and trigger setup into a streaming subdevice.
    pub fn stream_config(
        &self,
        addr: SubdeviceAddr,
        channels: &[StreamChannel],
        trigger: &StreamTrigger,
        fifo_irq_threshold: i32,
        flags: StreamConfigFlags,
    ) -> Result<()> {
        list_len(channels.len())?;
        let mut raw_channels: Vec<_> = channels.iter().map(StreamChannel::to_raw).collect();
        let mut raw_trigger = trigger.to_raw();
        debug!(
            %addr,
            channels = channels.len(),
            conv_ticks = trigger.conv_start.ticks,
            "Configuring stream"
        );
        let status = self.backend().stream_config(
            addr.device,
            addr.subdevice,
            &mut raw_channels,
            &mut raw_trigger,
            fifo_irq_threshold,
            flags.bits(),
        );
        self.check("meIOStreamConfig", status)
    }

    /// Convert a timer period to ticks for a stream trigger stage.
    ///
    /// Returns the ticks and the period they actually represent.
    pub fn stream_time_to_ticks(
        &self,
        addr: SubdeviceAddr,
        timer: Timer,
        time: f64,
        flags: TicksFlags,
    ) -> Result<(u64, f64)> {
        let mut time = time;
        let mut low = 0;
        let mut high = 0;
        let status = self.backend().stream_time_to_ticks(
            addr.device,
            addr.subdevice,
            timer.to_raw(),
            &mut time,
            &mut low,
            &mut high,
            flags.bits(),
        );
        self.check("meIOStreamTimeToTicks", status)?;
        Ok((join_ticks(low, high), time))
    }

    /// Convert a rate in Hz to ticks for a stream trigger stage.
    ///
    /// Returns the ticks and the rate they actually represent.
    pub fn stream_frequency_to_ticks(
        &self,
        addr: SubdeviceAddr,
        timer: Timer,
        frequency: f64,
        flags: TicksFlags,
    ) -> Result<(u64, f64)> {
        let mut frequency = frequency;
        let mut low = 0;
        let mut high = 0;
        let status = self.backend().stream_frequency_to_ticks(
            addr.device,
            addr.subdevice,
            timer.to_raw(),
            &mut frequency,
            &mut low,
            &mut high,
            flags.bits(),
        );
        self.check("meIOStreamFrequencyToTicks", status)?;
        Ok((join_ticks(low, high), frequency))
    }

    // =========================================================================
    // Start / stop
    // =========================================================================

    /// Start several streams in one call. Each request's `errno` is filled
    /// in, also when the call as a whole fails.
    pub fn stream_start(
        &self,
        requests: &mut [StreamStartRequest],
        flags: StreamStartFlags,
    ) -> Result<()> {
        list_len(requests.len())?;
        let mut raw: Vec<_> = requests.iter().map(StreamStartRequest::to_raw).collect();
        let status = self.backend().stream_start(&mut raw, flags.bits());
        for (request, raw) in requests.iter_mut().zip(&raw) {
            request.errno = raw.iErrno;
        }
        self.check("meIOStreamStart", status)
    }

    /// Start one stream with the configured default start timeout.
    pub fn start_stream(&self, addr: SubdeviceAddr, mode: StartMode) -> Result<()> {
        let timeout = timeout_arg(self.config().timeouts.stream_start_ms);
        let mut request = [StreamStartRequest::new(addr, mode).with_timeout(timeout)];
        self.stream_start(&mut request, StreamStartFlags::empty())?;
        info!(%addr, ?mode, "Stream started");
        Ok(())
    }

    /// Stop several streams in one call.
    pub fn stream_stop(
        &self,
        requests: &mut [StreamStopRequest],
        flags: StreamStopFlags,
    ) -> Result<()> {
        list_len(requests.len())?;
        let mut raw: Vec<_> = requests.iter().map(StreamStopRequest::to_raw).collect();
        let status = self.backend().stream_stop(&mut raw, flags.bits());
        for (request, raw) in requests.iter_mut().zip(&raw) {
            request.errno = raw.iErrno;
        }
        self.check("meIOStreamStop", status)
    }

    /// Stop one stream.
    pub fn stop_stream(&self, addr: SubdeviceAddr, mode: StopMode) -> Result<()> {
        let mut request = [StreamStopRequest::new(addr, mode)];
        self.stream_stop(&mut request, StreamStopFlags::empty())?;
        info!(%addr, ?mode, "Stream stopped");
        Ok(())
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Stream state and the number of values waiting in the buffer.
    pub fn stream_status(
        &self,
        addr: SubdeviceAddr,
        wait: WaitMode,
    ) -> Result<(StreamStatus, usize)> {
        let mut status_raw = 0;
        let mut count = 0;
        let status = self.backend().stream_status(
            addr.device,
            addr.subdevice,
            wait.to_raw(),
            &mut status_raw,
            &mut count,
            meids_sys::ME_IO_STREAM_STATUS_NO_FLAGS,
        );
        self.check("meIOStreamStatus", status)?;
        Ok((StreamStatus::try_from(status_raw)?, count_to_usize(count)))
    }

    /// Wait until new values are available and return how many.
    ///
    /// `timeout_ms` of `None` uses the configured default.
    pub fn stream_new_values(&self, addr: SubdeviceAddr, timeout_ms: Option<u32>) -> Result<usize> {
        let timeout = timeout_arg(timeout_ms.unwrap_or(self.config().timeouts.new_values_ms));
        let mut count = 0;
        let status = self.backend().stream_new_values(
            addr.device,
            addr.subdevice,
            timeout,
            &mut count,
            meids_sys::ME_IO_STREAM_NEW_VALUES_NO_FLAGS,
        );
        self.check("meIOStreamNewValues", status)?;
        Ok(count_to_usize(count))
    }

    /// Read up to `values.len()` values; returns the number read.
    pub fn stream_read(
        &self,
        addr: SubdeviceAddr,
        mode: ReadMode,
        values: &mut [i32],
        flags: StreamReadFlags,
    ) -> Result<usize> {
        list_len(values.len())?;
        let mut count = 0;
        let status = self.backend().stream_read(
            addr.device,
            addr.subdevice,
            mode.to_raw(),
            values,
            &mut count,
            flags.bits(),
        );
        self.check("meIOStreamRead", status)?;
        Ok(count_to_usize(count).min(values.len()))
    }

    /// Queue values for output; returns the number accepted.
    pub fn stream_write(
        &self,
        addr: SubdeviceAddr,
        mode: WriteMode,
        values: &[i32],
    ) -> Result<usize> {
        list_len(values.len())?;
        let mut count = 0;
        let status = self.backend().stream_write(
            addr.device,
            addr.subdevice,
            mode.to_raw(),
            values,
            &mut count,
            meids_sys::ME_IO_STREAM_WRITE_NO_FLAGS,
        );
        self.check("meIOStreamWrite", status)?;
        Ok(count_to_usize(count))
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Register closures for the start, new-values and end events of the
    /// stream on `addr`, replacing any earlier registration.
    ///
    /// The closures stay alive until they are replaced, cleared or the
    /// session is closed.
    pub fn set_stream_callbacks(
        &self,
        addr: SubdeviceAddr,
        callbacks: StreamCallbacks,
    ) -> Result<()> {
        if callbacks.is_empty() {
            return self.clear_stream_callbacks(addr);
        }
        self.inner.callbacks.set_stream(addr, callbacks, |registration| {
            // SAFETY: the registry keeps the slot behind `context` alive
            // until the driver is closed.
            let status = unsafe {
                self.backend().stream_set_callbacks(
                    addr.device,
                    addr.subdevice,
                    registration.start,
                    registration.context,
                    registration.new_values,
                    registration.context,
                    registration.end,
                    registration.context,
                    meids_sys::ME_IO_STREAM_SET_CALLBACKS_NO_FLAGS,
                )
            };
            self.check("meIOStreamSetCallbacks", status)
        })
    }

    /// Unregister the stream callbacks of `addr`.
    pub fn clear_stream_callbacks(&self, addr: SubdeviceAddr) -> Result<()> {
        self.inner.callbacks.clear_stream(addr, || {
            // SAFETY: clearing a registration passes no context.
            let status = unsafe {
                self.backend().stream_set_callbacks(
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
            self.check("meIOStreamSetCallbacks", status)
        })
    }

    /// Whether stream callbacks are registered for `addr`.
    pub fn has_stream_callbacks(&self, addr: SubdeviceAddr) -> bool {
        self.inner.callbacks.has_stream(addr)
    }

    /// Deliver the stream events of `addr` to an async channel.
    ///
    /// Replaces any callbacks registered for `addr`. Dropping the receiver
    /// stops the stream at its next start or new-values event.
    pub fn stream_events(
        &self,
        addr: SubdeviceAddr,
    ) -> Result<mpsc::UnboundedReceiver<StreamEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let forward = |tx: mpsc::UnboundedSender<StreamEvent>| {
            move |event: &StreamEvent| match tx.send(*event) {
                Ok(()) => CallbackAction::Continue,
                Err(_) => CallbackAction::Stop,
            }
        };
        let end_tx = tx.clone();
        let callbacks = StreamCallbacks::new()
            .on_start(forward(tx.clone()))
            .on_new_values(forward(tx))
            .on_end(move |event| {
                let _ = end_tx.send(*event);
            });
        self.set_stream_callbacks(addr, callbacks)?;
        Ok(rx)
    }

    /// Read every value an input stream has buffered right now.
    pub fn stream_drain(&self, addr: SubdeviceAddr) -> Result<Vec<i32>> {
        let (_, available) = self.stream_status(addr, WaitMode::None)?;
        if available == 0 {
            return Ok(Vec::new());
        }
        let mut values = vec![0; available];
        let read =
            self.stream_read(addr, ReadMode::NonBlocking, &mut values, StreamReadFlags::empty())?;
        values.truncate(read);
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::callback::StreamPhase;
    use crate::codes::Reference;
    use crate::error::ErrorCode;
    use crate::mock::MockBackend;

    const AO: SubdeviceAddr = SubdeviceAddr::new(0, 0);
    const AI: SubdeviceAddr = SubdeviceAddr::new(0, 1);

    fn system() -> MeidsSystem<MockBackend> {
        MeidsSystem::open(MockBackend::new()).unwrap()
    }

    fn configure_ai(system: &MeidsSystem<MockBackend>, scans: i32) {
        let channels = [
            StreamChannel::new(0, 0, Reference::AiGround),
            StreamChannel::new(1, 0, Reference::AiGround),
        ];
        let trigger = StreamTrigger::software(330)
            .with_scan_stop_count(2)
            .with_acq_stop_count(scans);
        system
            .stream_config(AI, &channels, &trigger, 0, StreamConfigFlags::empty())
            .unwrap();
    }

    #[test]
    fn test_counted_acquisition() {
        let system = system();
        system.backend().set_input(0, 1, 0, 100);
        system.backend().set_input(0, 1, 1, 200);
        configure_ai(&system, 3);

        system.start_stream(AI, StartMode::Blocking).unwrap();
        let (state, available) = system.stream_status(AI, WaitMode::None).unwrap();
        assert_eq!(state, StreamStatus::Idle);
        assert_eq!(available, 6);

        let mut buffer = [0; 16];
        let read = system
            .stream_read(AI, ReadMode::NonBlocking, &mut buffer, StreamReadFlags::empty())
            .unwrap();
        assert_eq!(&buffer[..read], &[100, 200, 100, 200, 100, 200]);
        system.stop_stream(AI, StopMode::Immediate).unwrap();
    }

    #[test]
    fn test_drain() {
        let system = system();
        system.backend().set_input(0, 1, 1, 7);
        configure_ai(&system, 2);
        system.start_stream(AI, StartMode::Blocking).unwrap();
        assert_eq!(system.stream_drain(AI).unwrap(), vec![0, 7, 0, 7]);
    }

    #[test]
    fn test_start_without_config() {
        let system = system();
        let mut requests = [StreamStartRequest::new(AI, StartMode::Blocking)];
        let err = system
            .stream_start(&mut requests, StreamStartFlags::empty())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::PreviousConfig));
        assert_eq!(requests[0].error(), Some(ErrorCode::PreviousConfig));
    }

    #[test]
    fn test_output_preload_loops_back() {
        let system = system();
        let trigger = StreamTrigger::software(330).with_acq_stop_count(2);
        system
            .stream_config(
                AO,
                &[StreamChannel::new(0, 0, Reference::AoGround)],
                &trigger,
                0,
                StreamConfigFlags::empty(),
            )
            .unwrap();
        let accepted = system
            .stream_write(AO, WriteMode::Preload, &[1000, 2000])
            .unwrap();
        assert_eq!(accepted, 2);

        system.start_stream(AO, StartMode::Blocking).unwrap();
        assert_eq!(system.single_read(AI.channel(0)).unwrap(), 2000);
    }

    #[test]
    fn test_stream_ticks() {
        let system = system();
        let (ticks, time) = system
            .stream_time_to_ticks(AI, Timer::ConvStart, 1e-5, TicksFlags::empty())
            .unwrap();
        assert_eq!(ticks, 330);
        assert!((time - 1e-5).abs() < 1e-12);

        let (ticks, frequency) = system
            .stream_frequency_to_ticks(AI, Timer::ConvStart, 100_000.0, TicksFlags::empty())
            .unwrap();
        assert_eq!(ticks, 330);
        assert!((frequency - 100_000.0).abs() < 1e-6);

        assert!(system
            .stream_frequency_to_ticks(AI, Timer::ConvStart, 0.0, TicksFlags::empty())
            .is_err());
    }

    #[test]
    fn test_callbacks_fire_in_order() {
        let system = system();
        configure_ai(&system, 4);

        let order = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(AtomicI32::new(0));
        let (o1, o2, o3, s) = (order.clone(), order.clone(), order.clone(), seen.clone());
        let callbacks = StreamCallbacks::new()
            .on_start(move |event| {
                assert_eq!(event.phase, StreamPhase::Start);
                assert_eq!(o1.fetch_add(1, Ordering::SeqCst), 0);
                CallbackAction::Continue
            })
            .on_new_values(move |event| {
                assert_eq!(o2.fetch_add(1, Ordering::SeqCst), 1);
                s.store(event.count, Ordering::SeqCst);
                CallbackAction::Continue
            })
            .on_end(move |_| {
                assert_eq!(o3.fetch_add(1, Ordering::SeqCst), 2);
            });
        system.set_stream_callbacks(AI, callbacks).unwrap();
        assert!(system.has_stream_callbacks(AI));

        system.start_stream(AI, StartMode::Blocking).unwrap();
        system.backend().join_callbacks();
        assert_eq!(order.load(Ordering::SeqCst), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 8);

        system.clear_stream_callbacks(AI).unwrap();
        assert!(!system.has_stream_callbacks(AI));
    }

    #[test]
    fn test_start_callback_can_stop() {
        let system = system();
        configure_ai(&system, 4);
        let callbacks = StreamCallbacks::new().on_start(|_| CallbackAction::Stop);
        system.set_stream_callbacks(AI, callbacks).unwrap();

        system.start_stream(AI, StartMode::Blocking).unwrap();
        system.backend().join_callbacks();
        let (state, _) = system.stream_status(AI, WaitMode::None).unwrap();
        assert_eq!(state, StreamStatus::Idle);
    }

    #[tokio::test]
    async fn test_stream_events_channel() {
        let system = system();
        configure_ai(&system, 1);
        let mut events = system.stream_events(AI).unwrap();

        system.start_stream(AI, StartMode::Blocking).unwrap();
        let phases = [
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
        ];
        assert_eq!(phases[0].phase, StreamPhase::Start);
        assert_eq!(phases[1].phase, StreamPhase::NewValues);
        assert_eq!(phases[1].count, 2);
        assert_eq!(phases[2].phase, StreamPhase::End);
        assert_eq!(phases[2].subdevice, AI);
    }
}
