//! Closure invocation - native callers into Rust callbacks
//!
//! Architecture:
//! - `buffer.rs` - unchecked typed view over parameter/return memory
//! - `checked.rs` - opt-in validated view (bounds, widths, single return)
//!
//! The trampoline builds one `ClosureBuffer` per native call through
//! `dispatch`; the callback reads its parameters, writes exactly one return
//! value, and the buffer is dropped before the trampoline returns.

mod buffer;
mod checked;

pub use buffer::ClosureBuffer;
pub use checked::CheckedClosureBuffer;

use core::ffi::c_void;

use crate::logging;
use crate::types::CallContext;

/// Callback body reachable from native code
pub trait Closure {
    fn invoke(&self, buffer: ClosureBuffer<'_>);
}

impl<F> Closure for F
where
    F: Fn(ClosureBuffer<'_>),
{
    #[inline]
    fn invoke(&self, buffer: ClosureBuffer<'_>) {
        self(buffer)
    }
}

/// Run `closure` for one native invocation.
///
/// # Safety
/// Same contract as `ClosureBuffer::new`: `parameters` and `retval` must
/// describe memory laid out for `context`, valid until this returns.
pub unsafe fn dispatch<C>(
    closure: &C,
    context: &CallContext,
    retval: *mut c_void,
    parameters: *const *mut c_void,
) where
    C: Closure + ?Sized,
{
    logging::log_closure_invoke(context);
    closure.invoke(ClosureBuffer::new(context, retval, parameters));
    logging::log_closure_return(context);
}
