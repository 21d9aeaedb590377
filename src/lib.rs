//! Native closure argument/return marshalling
//!
//! When native code calls a registered closure through a trampoline, it hands
//! over an array of parameter addresses and one return-value address. This
//! crate reads those parameters as typed values and writes the return value
//! back at the width the native calling convention expects.
//!
//! Everything below `closure` is an unchecked memory contract: the trampoline
//! and the signature builder are responsible for index bounds and type/width
//! agreement. `CheckedClosureBuffer` is the opt-in layer that validates both.

pub mod closure;
pub mod error;
pub mod logging;
pub mod memory;
pub mod platform;
pub mod types;
pub mod word;

// Re-export core types
pub use closure::{dispatch, CheckedClosureBuffer, Closure, ClosureBuffer};
pub use error::MarshalError;
pub use platform::{AddressSize, Platform};
pub use types::{CallContext, CallingConvention, NativeType};
pub use word::NativeWordIo;

use std::sync::Mutex;

use tracing_appender::non_blocking::WorkerGuard;

/// Log flush guard held on behalf of native hosts between
/// `closure_runtime_init` and `closure_runtime_cleanup`.
static RUNTIME_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Initialize logging from the environment and log the platform selection.
///
/// Returns the log flush guard if this call installed the subscriber; drop it
/// before the process exits.
pub fn init() -> Option<WorkerGuard> {
    let guard = logging::init();
    logging::log_platform_selected(Platform::current(), NativeWordIo::instance());
    guard
}

/// Runtime initialization for native hosts
#[no_mangle]
pub extern "C" fn closure_runtime_init() {
    let guard = init();
    if let Ok(mut slot) = RUNTIME_GUARD.lock() {
        if slot.is_none() {
            *slot = guard;
        }
    }
}

/// Runtime cleanup for native hosts: flushes buffered log lines
#[no_mangle]
pub extern "C" fn closure_runtime_cleanup() {
    let guard = match RUNTIME_GUARD.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };
    drop(guard);
}
