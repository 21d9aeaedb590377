//! Raw native memory access
//!
//! Every dereference of a caller-supplied address in this crate goes through
//! here. Nothing is checked: the caller vouches for each address being valid
//! for the access width.
//!
//! Reads and writes are unaligned so that packed trampoline frames are
//! handled the same as naturally aligned ones.

use core::ptr;

/// Read a `T` stored at `address`.
///
/// # Safety
/// `address` must be valid for reads of `size_of::<T>()` bytes and hold a
/// valid bit pattern for `T`.
#[inline(always)]
pub unsafe fn get<T: Copy>(address: *const u8) -> T {
    ptr::read_unaligned(address as *const T)
}

/// Write `value` at `address`.
///
/// # Safety
/// `address` must be valid for writes of `size_of::<T>()` bytes.
#[inline(always)]
pub unsafe fn put<T: Copy>(address: *mut u8, value: T) {
    ptr::write_unaligned(address as *mut T, value)
}

/// Read a pointer-sized value at `address` and treat it as an address.
///
/// # Safety
/// `address` must be valid for reads of one pointer.
#[inline(always)]
pub unsafe fn get_address(address: *const u8) -> *mut u8 {
    get::<*mut u8>(address)
}

/// # Safety
/// `address` must be valid for writes of one pointer.
#[inline(always)]
pub unsafe fn put_address(address: *mut u8, value: usize) {
    put::<usize>(address, value)
}

/// Copy `size` bytes from `src` to `dst`.
///
/// # Safety
/// Both ranges must be valid for `size` bytes and must not overlap.
#[inline]
pub unsafe fn copy(src: *const u8, dst: *mut u8, size: usize) {
    ptr::copy_nonoverlapping(src, dst, size)
}

/// Copy a managed byte slice into native memory.
///
/// # Safety
/// `dst` must be valid for writes of `data.len()` bytes and must not alias
/// `data`.
#[inline]
pub unsafe fn put_bytes(dst: *mut u8, data: &[u8]) {
    ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len())
}
