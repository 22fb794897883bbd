//! Closure-based callbacks on top of the driver's C callback ABI.
//!
//! The library takes a plain function pointer plus a `void *` context for
//! interrupt and stream notifications. Here the context is the address of a
//! heap slot owned by a [`CallbackRegistry`]; an `extern "C"` trampoline
//! casts it back and runs the boxed closure stored in the slot.
//!
//! There is one slot per subdevice. Its address stays the same for the
//! life of the session, so a library thread holding an old context pointer
//! always finds a live slot; re-registering swaps the closure inside it
//! (waiting for a running invocation to return) and drops the old one.
//! Slots are freed when the system closes and no callback can fire any more.
//!
//! The error callback has no context parameter, so its closure lives in a
//! process-global slot.

use std::cell::Cell;
use std::collections::HashMap;
use std::ffi::CStr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use libc::{c_char, c_int, c_void};
use meids_sys::{meErrorCB_t, meIOIrqCB_t, meIOStreamCB_t};
use parking_lot::Mutex;
use tracing::{error, trace};

use crate::address::{ChannelAddr, SubdeviceAddr};
use crate::error::{ErrorCode, MeidsError, Result};

/// What the driver should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackAction {
    /// Keep the interrupt armed or the stream running
    #[default]
    Continue,
    /// Stop the interrupt or stream that raised the callback
    Stop,
}

/// An interrupt delivered to an [`IrqHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqEvent {
    /// Channel that raised the interrupt
    pub channel: ChannelAddr,
    /// Interrupts seen on this channel since `irq_start`
    pub irq_count: i32,
    /// Port or channel value latched with the interrupt
    pub value: i32,
    /// Error the driver reported alongside the interrupt
    pub error: Option<ErrorCode>,
}

/// Stage of a stream's life a [`StreamEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamPhase {
    /// The stream started
    Start,
    /// New values are available
    NewValues,
    /// The stream finished or was stopped
    End,
}

/// A stream notification delivered to [`StreamCallbacks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamEvent {
    /// Stream that reported
    pub subdevice: SubdeviceAddr,
    /// Which phase this is
    pub phase: StreamPhase,
    /// Values available (new-values phase); zero otherwise
    pub count: i32,
    /// Error the driver reported alongside the event
    pub error: Option<ErrorCode>,
}

/// A failure reported to the global error handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    /// Name of the failing entry point, as reported by the library
    pub function: String,
    /// Decoded status, if it is a known code
    pub code: Option<ErrorCode>,
    /// Status as returned by the library
    pub raw: i32,
}

/// Per-subdevice interrupt handler; the return value decides whether to keep receiving.
pub type IrqHandler = Box<dyn FnMut(&IrqEvent) -> CallbackAction + Send>;
type StreamHandler = Box<dyn FnMut(&StreamEvent) -> CallbackAction + Send>;
type EndHandler = Box<dyn FnMut(&StreamEvent) + Send>;
/// Process-wide handler for failed library calls.
pub type ErrorHandler = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;

/// Handlers for the three stream phases. Phases without a handler are not
/// registered with the driver.
///
/// ```
/// use daq_driver_meids::{CallbackAction, StreamCallbacks};
///
/// let callbacks = StreamCallbacks::new()
///     .on_new_values(|event| {
///         println!("{} values ready", event.count);
///         CallbackAction::Continue
///     })
///     .on_end(|_| println!("stream finished"));
/// assert!(!callbacks.is_empty());
/// ```
#[derive(Default)]
pub struct StreamCallbacks {
    start: Option<StreamHandler>,
    new_values: Option<StreamHandler>,
    end: Option<EndHandler>,
}

impl StreamCallbacks {
    /// No handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once when the stream starts. Returning
    /// [`CallbackAction::Stop`] stops the stream.
    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StreamEvent) -> CallbackAction + Send + 'static,
    {
        self.start = Some(Box::new(f));
        self
    }

    /// Called when new values are available. Returning
    /// [`CallbackAction::Stop`] stops the stream.
    pub fn on_new_values<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StreamEvent) -> CallbackAction + Send + 'static,
    {
        self.new_values = Some(Box::new(f));
        self
    }

    /// Called once when the stream has ended.
    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StreamEvent) + Send + 'static,
    {
        self.end = Some(Box::new(f));
        self
    }

    /// Whether no phase has a handler.
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.new_values.is_none() && self.end.is_none()
    }
}

impl std::fmt::Debug for StreamCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("start", &self.start.is_some())
            .field("new_values", &self.new_values.is_some())
            .field("end", &self.end.is_some())
            .finish()
    }
}

// =============================================================================
// Registry
// =============================================================================

struct IrqSlot {
    handler: Mutex<Option<IrqHandler>>,
    active: AtomicBool,
}

struct StreamSlot {
    callbacks: Mutex<StreamCallbacks>,
    active: AtomicBool,
}

impl IrqSlot {
    fn context(self: &Arc<Self>) -> *mut c_void {
        Arc::as_ptr(self) as *mut c_void
    }
}

impl StreamSlot {
    fn context(self: &Arc<Self>) -> *mut c_void {
        Arc::as_ptr(self) as *mut c_void
    }
}

/// Native arguments for one stream registration.
pub(crate) struct StreamRegistration {
    pub start: meIOStreamCB_t,
    pub new_values: meIOStreamCB_t,
    pub end: meIOStreamCB_t,
    pub context: *mut c_void,
}

thread_local! {
    /// Slot whose handler is running on this thread, null outside callbacks.
    static RUNNING_SLOT: Cell<*const c_void> = const { Cell::new(std::ptr::null()) };
}

/// Marks a slot as running on this thread until dropped.
struct RunningSlot(*const c_void);

impl RunningSlot {
    fn enter(context: *mut c_void) -> Self {
        Self(RUNNING_SLOT.with(|running| running.replace(context)))
    }
}

impl Drop for RunningSlot {
    fn drop(&mut self) {
        RUNNING_SLOT.with(|running| running.set(self.0));
    }
}

/// Swapping a slot's handler waits for the running one, so a handler must
/// not replace or clear itself.
fn check_not_running(context: *mut c_void) -> Result<()> {
    if RUNNING_SLOT.with(|running| running.get() == context as *const c_void) {
        return Err(MeidsError::NotSupported(
            "replacing or clearing a callback from inside itself".to_string(),
        ));
    }
    Ok(())
}

/// Owns every closure the driver may call back into.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    irq: Mutex<HashMap<SubdeviceAddr, Arc<IrqSlot>>>,
    stream: Mutex<HashMap<SubdeviceAddr, Arc<StreamSlot>>>,
}

impl CallbackRegistry {
    fn irq_slot(&self, addr: SubdeviceAddr) -> Arc<IrqSlot> {
        let mut map = self.irq.lock();
        Arc::clone(map.entry(addr).or_insert_with(|| {
            Arc::new(IrqSlot {
                handler: Mutex::new(None),
                active: AtomicBool::new(false),
            })
        }))
    }

    fn stream_slot(&self, addr: SubdeviceAddr) -> Arc<StreamSlot> {
        let mut map = self.stream.lock();
        Arc::clone(map.entry(addr).or_insert_with(|| {
            Arc::new(StreamSlot {
                callbacks: Mutex::new(StreamCallbacks::default()),
                active: AtomicBool::new(false),
            })
        }))
    }

    /// Store `handler` for `addr` once `install` has registered the
    /// trampoline with the driver. If `install` fails the previous
    /// registration stays in place.
    pub(crate) fn set_irq(
        &self,
        addr: SubdeviceAddr,
        handler: IrqHandler,
        install: impl FnOnce(meIOIrqCB_t, *mut c_void) -> Result<()>,
    ) -> Result<()> {
        let slot = self.irq_slot(addr);
        let context = slot.context();
        check_not_running(context)?;

        install(Some(irq_trampoline), context)?;
        let previous = slot.handler.lock().replace(handler);
        slot.active.store(true, Ordering::SeqCst);
        drop(previous);
        trace!(%addr, "Registered interrupt callback");
        Ok(())
    }

    /// Drop the registration for `addr` once `uninstall` has cleared it
    /// with the driver.
    pub(crate) fn clear_irq(
        &self,
        addr: SubdeviceAddr,
        uninstall: impl FnOnce() -> Result<()>,
    ) -> Result<()> {
        let slot = self.irq.lock().get(&addr).cloned();
        if let Some(slot) = &slot {
            check_not_running(slot.context())?;
        }
        uninstall()?;
        if let Some(slot) = slot {
            slot.active.store(false, Ordering::SeqCst);
            let previous = slot.handler.lock().take();
            drop(previous);
        }
        Ok(())
    }

    pub(crate) fn set_stream(
        &self,
        addr: SubdeviceAddr,
        callbacks: StreamCallbacks,
        install: impl FnOnce(StreamRegistration) -> Result<()>,
    ) -> Result<()> {
        let slot = self.stream_slot(addr);
        let context = slot.context();
        check_not_running(context)?;

        let registration = StreamRegistration {
            start: callbacks
                .start
                .is_some()
                .then_some(stream_start_trampoline as StreamTrampoline),
            new_values: callbacks
                .new_values
                .is_some()
                .then_some(stream_new_values_trampoline as StreamTrampoline),
            end: callbacks
                .end
                .is_some()
                .then_some(stream_end_trampoline as StreamTrampoline),
            context,
        };
        install(registration)?;
        let previous = std::mem::replace(&mut *slot.callbacks.lock(), callbacks);
        slot.active.store(true, Ordering::SeqCst);
        drop(previous);
        trace!(%addr, "Registered stream callbacks");
        Ok(())
    }

    pub(crate) fn clear_stream(
        &self,
        addr: SubdeviceAddr,
        uninstall: impl FnOnce() -> Result<()>,
    ) -> Result<()> {
        let slot = self.stream.lock().get(&addr).cloned();
        if let Some(slot) = &slot {
            check_not_running(slot.context())?;
        }
        uninstall()?;
        if let Some(slot) = slot {
            slot.active.store(false, Ordering::SeqCst);
            let previous = std::mem::take(&mut *slot.callbacks.lock());
            drop(previous);
        }
        Ok(())
    }

    /// Subdevices with an interrupt or stream registration.
    pub(crate) fn registered(&self) -> (Vec<SubdeviceAddr>, Vec<SubdeviceAddr>) {
        let irq = self
            .irq
            .lock()
            .iter()
            .filter(|(_, slot)| slot.active.load(Ordering::SeqCst))
            .map(|(addr, _)| *addr)
            .collect();
        let stream = self
            .stream
            .lock()
            .iter()
            .filter(|(_, slot)| slot.active.load(Ordering::SeqCst))
            .map(|(addr, _)| *addr)
            .collect();
        (irq, stream)
    }

    pub(crate) fn has_irq(&self, addr: SubdeviceAddr) -> bool {
        self.irq
            .lock()
            .get(&addr)
            .is_some_and(|slot| slot.active.load(Ordering::SeqCst))
    }

    pub(crate) fn has_stream(&self, addr: SubdeviceAddr) -> bool {
        self.stream
            .lock()
            .get(&addr)
            .is_some_and(|slot| slot.active.load(Ordering::SeqCst))
    }

    /// Number of slots allocated, active or not.
    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.irq.lock().len() + self.stream.lock().len()
    }

    /// Free every slot. Only valid once the driver is closed.
    pub(crate) fn clear(&self) {
        let irq = std::mem::take(&mut *self.irq.lock());
        let stream = std::mem::take(&mut *self.stream.lock());
        trace!(irq = irq.len(), stream = stream.len(), "Releasing callback slots");
    }
}

// =============================================================================
// Trampolines
// =============================================================================

type StreamTrampoline =
    unsafe extern "C" fn(c_int, c_int, c_int, *mut c_void, c_int) -> c_int;

fn callback_error(error: c_int) -> Option<ErrorCode> {
    match ErrorCode::from_raw(error) {
        Some(ErrorCode::Success) => None,
        Some(code) => Some(code),
        None => Some(ErrorCode::Internal),
    }
}

unsafe extern "C" fn irq_trampoline(
    device: c_int,
    subdevice: c_int,
    channel: c_int,
    irq_count: c_int,
    value: c_int,
    context: *mut c_void,
    error_in_callback: c_int,
) -> c_int {
    if context.is_null() {
        error!("Interrupt callback received a null context pointer");
        return 1;
    }
    // SAFETY: context is the address of an IrqSlot owned by a
    // CallbackRegistry, which keeps it at that address until the driver is
    // closed.
    let slot = &*(context as *const IrqSlot);
    let event = IrqEvent {
        channel: ChannelAddr::new(device, subdevice, channel),
        irq_count,
        value,
        error: callback_error(error_in_callback),
    };

    let _running = RunningSlot::enter(context);
    let action = panic::catch_unwind(AssertUnwindSafe(|| {
        slot.handler
            .lock()
            .as_mut()
            .map_or(CallbackAction::Continue, |handler| handler(&event))
    }))
    .unwrap_or_else(|_| {
        error!(channel = %event.channel, "Interrupt callback panicked; stopping");
        CallbackAction::Stop
    });
    match action {
        CallbackAction::Continue => 0,
        CallbackAction::Stop => 1,
    }
}

/// Run one stream phase handler. `None` if the phase has no handler.
unsafe fn dispatch_stream(
    phase: StreamPhase,
    device: c_int,
    subdevice: c_int,
    count: c_int,
    context: *mut c_void,
    error_in_callback: c_int,
) -> Option<CallbackAction> {
    if context.is_null() {
        error!(?phase, "Stream callback received a null context pointer");
        return Some(CallbackAction::Stop);
    }
    // SAFETY: context is the address of a StreamSlot owned by a
    // CallbackRegistry, which keeps it at that address until the driver is
    // closed.
    let slot = &*(context as *const StreamSlot);
    let event = StreamEvent {
        subdevice: SubdeviceAddr::new(device, subdevice),
        phase,
        count,
        error: callback_error(error_in_callback),
    };

    let _running = RunningSlot::enter(context);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut callbacks = slot.callbacks.lock();
        match phase {
            StreamPhase::Start => callbacks.start.as_mut().map(|f| f(&event)),
            StreamPhase::NewValues => callbacks.new_values.as_mut().map(|f| f(&event)),
            StreamPhase::End => callbacks.end.as_mut().map(|f| {
                f(&event);
                CallbackAction::Continue
            }),
        }
    }));
    result.unwrap_or_else(|_| {
        error!(subdevice = %event.subdevice, ?phase, "Stream callback panicked; stopping");
        Some(CallbackAction::Stop)
    })
}

unsafe extern "C" fn stream_start_trampoline(
    device: c_int,
    subdevice: c_int,
    count: c_int,
    context: *mut c_void,
    error_in_callback: c_int,
) -> c_int {
    let phase = StreamPhase::Start;
    match dispatch_stream(phase, device, subdevice, count, context, error_in_callback) {
        Some(CallbackAction::Stop) => 1,
        _ => 0,
    }
}

// The library stops the stream when this callback returns zero.
unsafe extern "C" fn stream_new_values_trampoline(
    device: c_int,
    subdevice: c_int,
    count: c_int,
    context: *mut c_void,
    error_in_callback: c_int,
) -> c_int {
    let phase = StreamPhase::NewValues;
    match dispatch_stream(phase, device, subdevice, count, context, error_in_callback) {
        Some(CallbackAction::Stop) => 0,
        _ => 1,
    }
}

unsafe extern "C" fn stream_end_trampoline(
    device: c_int,
    subdevice: c_int,
    count: c_int,
    context: *mut c_void,
    error_in_callback: c_int,
) -> c_int {
    dispatch_stream(StreamPhase::End, device, subdevice, count, context, error_in_callback);
    0
}

// =============================================================================
// Global error handler
// =============================================================================

static ERROR_HANDLER: Mutex<Option<ErrorHandler>> = parking_lot::const_mutex(None);

/// Generation of the installed handler, 0 when none is installed. Held
/// across the library call that (un)registers the trampoline.
static ERROR_OWNER: Mutex<u64> = parking_lot::const_mutex(0);

static NEXT_ERROR_GENERATION: AtomicU64 = AtomicU64::new(1);

/// The trampoline to register with `meErrorSetUserProc`.
pub(crate) fn error_trampoline_cb() -> meErrorCB_t {
    Some(error_trampoline)
}

/// Make `handler` the process-wide error handler once `install` has
/// registered the trampoline. Returns the generation identifying this
/// installation.
pub(crate) fn install_error_handler(
    handler: ErrorHandler,
    install: impl FnOnce() -> Result<()>,
) -> Result<u64> {
    let mut owner = ERROR_OWNER.lock();
    install()?;
    let generation = NEXT_ERROR_GENERATION.fetch_add(1, Ordering::Relaxed);
    *ERROR_HANDLER.lock() = Some(handler);
    *owner = generation;
    Ok(generation)
}

/// Remove the handler installed as `generation`.
///
/// Returns `Ok(false)` without calling `uninstall` if a later installation
/// has replaced it.
pub(crate) fn remove_error_handler(
    generation: u64,
    uninstall: impl FnOnce() -> Result<()>,
) -> Result<bool> {
    let mut owner = ERROR_OWNER.lock();
    if generation == 0 || *owner != generation {
        return Ok(false);
    }
    uninstall()?;
    *ERROR_HANDLER.lock() = None;
    *owner = 0;
    Ok(true)
}

unsafe extern "C" fn error_trampoline(function: *mut c_char, error: c_int) -> c_int {
    let Some(handler) = ERROR_HANDLER.lock().clone() else {
        return 0;
    };
    let function = if function.is_null() {
        String::new()
    } else {
        // SAFETY: the library passes a NUL-terminated function name that
        // stays valid for the duration of the call.
        CStr::from_ptr(function).to_string_lossy().into_owned()
    };
    let event = ErrorEvent {
        function,
        code: ErrorCode::from_raw(error),
        raw: error,
    };
    if panic::catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
        error!(function = %event.function, "Error handler panicked");
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn test_irq_trampoline_runs_closure() {
        let registry = CallbackRegistry::default();
        let seen = Arc::new(AtomicI32::new(0));
        let seen_in_cb = Arc::clone(&seen);
        let mut captured = None;

        registry
            .set_irq(
                SubdeviceAddr::new(0, 3),
                Box::new(move |event| {
                    seen_in_cb.store(event.value, Ordering::SeqCst);
                    if event.irq_count >= 2 {
                        CallbackAction::Stop
                    } else {
                        CallbackAction::Continue
                    }
                }),
                |cb, ctx| {
                    captured = cb.map(|f| (f, ctx));
                    Ok(())
                },
            )
            .unwrap();

        let (f, ctx) = captured.unwrap();
        assert_eq!(unsafe { f(0, 3, 1, 1, 9, ctx, 0) }, 0);
        assert_eq!(seen.load(Ordering::SeqCst), 9);
        assert_eq!(unsafe { f(0, 3, 1, 2, 4, ctx, 0) }, 1);
        assert!(registry.has_irq(SubdeviceAddr::new(0, 3)));
    }

    #[test]
    fn test_failed_install_keeps_previous() {
        let registry = CallbackRegistry::default();
        let addr = SubdeviceAddr::new(0, 6);
        registry
            .set_irq(addr, Box::new(|_| CallbackAction::Continue), |_, _| Ok(()))
            .unwrap();

        let result = registry.set_irq(addr, Box::new(|_| CallbackAction::Stop), |_, _| {
            Err(crate::MeidsError::NotSupported("test".into()))
        });
        assert!(result.is_err());
        assert!(registry.has_irq(addr));

        registry.clear_irq(addr, || Ok(())).unwrap();
        assert!(!registry.has_irq(addr));
    }

    #[test]
    fn test_stream_return_mapping() {
        let registry = CallbackRegistry::default();
        let mut captured = None;
        registry
            .set_stream(
                SubdeviceAddr::new(0, 1),
                StreamCallbacks::new()
                    .on_new_values(|event| {
                        if event.count > 10 {
                            CallbackAction::Stop
                        } else {
                            CallbackAction::Continue
                        }
                    })
                    .on_end(|_| {}),
                |registration| {
                    captured = Some(registration);
                    Ok(())
                },
            )
            .unwrap();

        let registration = captured.unwrap();
        assert!(registration.start.is_none());
        let new_values = registration.new_values.unwrap();
        let end = registration.end.unwrap();
        let ctx = registration.context;

        assert_eq!(unsafe { new_values(0, 1, 5, ctx, 0) }, 1);
        assert_eq!(unsafe { new_values(0, 1, 50, ctx, 0) }, 0);
        assert_eq!(unsafe { end(0, 1, 0, ctx, 0) }, 0);
    }

    #[test]
    fn test_panicking_callback_stops() {
        let registry = CallbackRegistry::default();
        let mut captured = None;
        registry
            .set_irq(
                SubdeviceAddr::new(0, 0),
                Box::new(|_| panic!("boom")),
                |cb, ctx| {
                    captured = cb.map(|f| (f, ctx));
                    Ok(())
                },
            )
            .unwrap();
        let (f, ctx) = captured.unwrap();
        assert_eq!(unsafe { f(0, 0, 0, 1, 0, ctx, 0) }, 1);
    }

    #[test]
    fn test_reregistration_reuses_slot() {
        let registry = CallbackRegistry::default();
        let addr = SubdeviceAddr::new(0, 3);
        let captured = Arc::new(());
        let mut contexts = Vec::new();

        for _ in 0..100 {
            let held = Arc::clone(&captured);
            registry
                .set_irq(
                    addr,
                    Box::new(move |_| {
                        let _ = &held;
                        CallbackAction::Continue
                    }),
                    |_, ctx| {
                        contexts.push(ctx as usize);
                        Ok(())
                    },
                )
                .unwrap();
        }

        // One slot, one live closure: replaced closures are dropped at once.
        assert_eq!(registry.slot_count(), 1);
        assert!(contexts.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(Arc::strong_count(&captured), 2);

        registry.clear_irq(addr, || Ok(())).unwrap();
        assert_eq!(Arc::strong_count(&captured), 1);
        assert!(!registry.has_irq(addr));
        assert_eq!(registry.registered(), (vec![], vec![]));
    }

    #[test]
    fn test_handler_cannot_replace_itself() {
        let registry = Arc::new(CallbackRegistry::default());
        let addr = SubdeviceAddr::new(0, 3);
        let outcome = Arc::new(Mutex::new(None));
        let mut captured = None;

        let inner_registry = Arc::clone(&registry);
        let inner_outcome = Arc::clone(&outcome);
        registry
            .set_irq(
                addr,
                Box::new(move |_| {
                    let result = inner_registry.clear_irq(addr, || Ok(()));
                    *inner_outcome.lock() = Some(result.is_err());
                    CallbackAction::Continue
                }),
                |cb, ctx| {
                    captured = cb.map(|f| (f, ctx));
                    Ok(())
                },
            )
            .unwrap();

        let (f, ctx) = captured.unwrap();
        assert_eq!(unsafe { f(0, 3, 0, 1, 0, ctx, 0) }, 0);
        assert_eq!(*outcome.lock(), Some(true));
        assert!(registry.has_irq(addr));

        // Outside the handler the same call succeeds.
        registry.clear_irq(addr, || Ok(())).unwrap();
        assert!(!registry.has_irq(addr));
    }

    #[test]
    fn test_stream_reregistration_swaps_phases() {
        let registry = CallbackRegistry::default();
        let addr = SubdeviceAddr::new(0, 1);
        let mut registrations = Vec::new();
        let ends = Arc::new(AtomicI32::new(0));

        let counter = Arc::clone(&ends);
        registry
            .set_stream(
                addr,
                StreamCallbacks::new().on_end(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                |registration| {
                    registrations.push(registration);
                    Ok(())
                },
            )
            .unwrap();
        registry
            .set_stream(
                addr,
                StreamCallbacks::new().on_new_values(|_| CallbackAction::Stop),
                |registration| {
                    registrations.push(registration);
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(registrations[0].context, registrations[1].context);
        assert!(registrations[1].end.is_none());

        // A late call through the first registration finds no end handler.
        let stale_end = registrations[0].end.unwrap();
        assert_eq!(unsafe { stale_end(0, 1, 0, registrations[0].context, 0) }, 0);
        assert_eq!(ends.load(Ordering::SeqCst), 0);

        let new_values = registrations[1].new_values.unwrap();
        assert_eq!(unsafe { new_values(0, 1, 4, registrations[1].context, 0) }, 0);
    }

    #[test]
    fn test_callback_error_decoding() {
        assert_eq!(callback_error(0), None);
        assert_eq!(
            callback_error(meids_sys::ME_ERRNO_TIMEOUT),
            Some(ErrorCode::Timeout)
        );
        assert_eq!(callback_error(9999), Some(ErrorCode::Internal));
    }
}
