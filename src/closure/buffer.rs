//! Unchecked closure buffer
//!
//! Layout handed over by the trampoline:
//! - `parameters` points at one address-sized slot per parameter, and each
//!   slot holds the address of that parameter's storage;
//! - `retval` points at the return slot, at least one native word wide or
//!   `return_type.size()` bytes for aggregates.

use core::ffi::c_void;

use super::CheckedClosureBuffer;
use crate::memory;
use crate::platform::Platform;
use crate::types::{CallContext, NativeType};
use crate::word::NativeWordIo;

/// Typed view over one invocation's parameter and return memory
#[derive(Debug)]
pub struct ClosureBuffer<'a> {
    context: &'a CallContext,
    retval: *mut u8,
    parameters: *const u8,
}

impl<'a> ClosureBuffer<'a> {
    /// # Safety
    /// For the lifetime of the buffer:
    /// - `parameters` must hold `context.parameter_count()` readable
    ///   address-sized slots, each pointing at storage of the declared type;
    /// - `retval` must be writable for one native word, or for
    ///   `context.return_type().size()` bytes if that is larger.
    #[inline]
    pub unsafe fn new(
        context: &'a CallContext,
        retval: *mut c_void,
        parameters: *const *mut c_void,
    ) -> Self {
        Self {
            context,
            retval: retval as *mut u8,
            parameters: parameters as *const u8,
        }
    }

    #[inline]
    pub fn context(&self) -> &'a CallContext {
        self.context
    }

    #[inline]
    pub fn return_type(&self) -> NativeType {
        self.context.return_type()
    }

    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.context.parameter_count()
    }

    /// Switch to the validated accessors for the rest of the invocation
    #[inline]
    pub fn checked(self) -> CheckedClosureBuffer<'a> {
        CheckedClosureBuffer::new(self)
    }

    /// Address of parameter `index`'s storage (one indirection through the slot)
    #[inline(always)]
    unsafe fn param(&self, index: usize) -> *mut u8 {
        let slot = self.parameters.add(index * Platform::current().word_size());
        memory::get_address(slot)
    }

    // ----- parameters -----
    //
    // Safety (all getters): `index < parameter_count()` and the parameter's
    // storage holds a value of the accessor's width.

    /// # Safety
    /// See the parameter accessor contract above.
    #[inline]
    pub unsafe fn get_byte(&self, index: usize) -> i8 {
        memory::get::<i8>(self.param(index))
    }

    /// # Safety
    /// See the parameter accessor contract above.
    #[inline]
    pub unsafe fn get_short(&self, index: usize) -> i16 {
        memory::get::<i16>(self.param(index))
    }

    /// # Safety
    /// See the parameter accessor contract above.
    #[inline]
    pub unsafe fn get_int(&self, index: usize) -> i32 {
        memory::get::<i32>(self.param(index))
    }

    /// # Safety
    /// See the parameter accessor contract above.
    #[inline]
    pub unsafe fn get_long(&self, index: usize) -> i64 {
        memory::get::<i64>(self.param(index))
    }

    /// # Safety
    /// See the parameter accessor contract above.
    #[inline]
    pub unsafe fn get_float(&self, index: usize) -> f32 {
        memory::get::<f32>(self.param(index))
    }

    /// # Safety
    /// See the parameter accessor contract above.
    #[inline]
    pub unsafe fn get_double(&self, index: usize) -> f64 {
        memory::get::<f64>(self.param(index))
    }

    /// Pointer-valued parameter, with non-address bits cleared.
    ///
    /// # Safety
    /// See the parameter accessor contract above.
    #[inline]
    pub unsafe fn get_address(&self, index: usize) -> usize {
        let raw = memory::get::<usize>(self.param(index)) as u64;
        Platform::current().mask_address(raw) as usize
    }

    /// Address of the struct argument itself; its layout is the caller's
    /// business.
    ///
    /// # Safety
    /// `index < parameter_count()`.
    #[inline]
    pub unsafe fn get_struct(&self, index: usize) -> *mut u8 {
        self.param(index)
    }

    // ----- return value -----
    //
    // Exactly one setter should run per invocation.

    /// # Safety
    /// The return slot must be at least one native word wide.
    #[inline]
    pub unsafe fn set_byte_return(&self, value: i8) {
        NativeWordIo::instance().put(self.retval, value as i32)
    }

    /// # Safety
    /// The return slot must be at least one native word wide.
    #[inline]
    pub unsafe fn set_short_return(&self, value: i16) {
        NativeWordIo::instance().put(self.retval, value as i32)
    }

    /// # Safety
    /// The return slot must be at least one native word wide.
    #[inline]
    pub unsafe fn set_int_return(&self, value: i32) {
        NativeWordIo::instance().put(self.retval, value)
    }

    /// # Safety
    /// The return slot must be at least 8 bytes wide.
    #[inline]
    pub unsafe fn set_long_return(&self, value: i64) {
        memory::put::<i64>(self.retval, value)
    }

    /// # Safety
    /// The return slot must be at least 4 bytes wide.
    #[inline]
    pub unsafe fn set_float_return(&self, value: f32) {
        memory::put::<f32>(self.retval, value)
    }

    /// # Safety
    /// The return slot must be at least 8 bytes wide.
    #[inline]
    pub unsafe fn set_double_return(&self, value: f64) {
        memory::put::<f64>(self.retval, value)
    }

    /// # Safety
    /// The return slot must be at least one address wide.
    #[inline]
    pub unsafe fn set_address_return(&self, address: usize) {
        memory::put_address(self.retval, address)
    }

    /// Copy `return_type().size()` bytes from `value` into the return slot.
    ///
    /// # Safety
    /// `value` must be readable for that many bytes and must not overlap the
    /// return slot.
    #[inline]
    pub unsafe fn set_struct_return(&self, value: *const u8) {
        memory::copy(value, self.retval, self.return_type().size())
    }

    /// Copy `return_type().size()` bytes from `data[offset..]` into the return
    /// slot. Panics if `data` is too short.
    ///
    /// # Safety
    /// The return slot must be `return_type().size()` bytes wide.
    #[inline]
    pub unsafe fn set_struct_return_from(&self, data: &[u8], offset: usize) {
        let size = self.return_type().size();
        memory::put_bytes(self.retval, &data[offset..offset + size])
    }
}
