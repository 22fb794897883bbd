//! Low-level FFI bindings for the Meilhaus ME-iDS driver library.
//!
//! This crate provides raw, unsafe bindings to `libMEiDS` (`meIDSmain.dll`
//! on Windows), the user-space entry point of the ME-iDS driver system for
//! Meilhaus analog, digital, counter and frequency I/O boards.
//!
//! # Layout
//!
//! - [`constants`] - every `ME_*` constant group, including `ME_ERRNO_*`
//! - [`types`] - `#[repr(C)]` records and callback typedefs
//! - `functions` - the `extern "C"` block (only with `meids-sdk`)
//!
//! Everything is re-exported at the crate root under its C name.
//!
//! # Safety
//!
//! All functions in this crate are `unsafe` as they are direct FFI bindings.
//! For a safe wrapper, use the `daq-driver-meids` crate instead.
//!
//! # Features
//!
//! - `meids-sdk`: Link against the installed ME-iDS library and declare its
//!   entry points. Without this feature only constants and types are
//!   available, so dependent crates build on machines without the SDK.
//!
//! # Example (unsafe)
//!
//! ```ignore
//! use meids_sys::*;
//!
//! unsafe {
//!     if meOpen(ME_OPEN_NO_FLAGS) == ME_ERRNO_SUCCESS {
//!         let mut count = 0;
//!         meQueryNumberDevices(&mut count);
//!         println!("{} devices", count);
//!         meClose(ME_CLOSE_NO_FLAGS);
//!     }
//! }
//! ```

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(missing_docs)]
#![allow(clippy::all)]

pub mod constants;
pub mod types;

#[cfg(feature = "meids-sdk")]
mod functions;

pub use constants::*;
pub use types::*;

#[cfg(feature = "meids-sdk")]
pub use functions::*;
