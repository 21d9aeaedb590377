//! Native word accessor
//!
//! Calling conventions return sub-word integers as if they filled a whole
//! register. `NativeWordIo` is the one place that knows how wide that register
//! slot is: 4 bytes on 32-bit targets, 8 bytes (sign-extended) on 64-bit ones.

use crate::memory;
use crate::platform::{AddressSize, Platform};

const HOST_WORD: NativeWordIo = NativeWordIo::for_platform(&Platform::new(AddressSize::host()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NativeWordIo {
    /// Word is a 32-bit int
    Word32,
    /// Word is a 64-bit long; values are sign-extended on write and
    /// truncated on read
    Word64,
}

impl NativeWordIo {
    /// Process-wide accessor for the host address size
    #[inline(always)]
    pub const fn instance() -> NativeWordIo {
        HOST_WORD
    }

    #[inline]
    pub const fn for_platform(platform: &Platform) -> Self {
        match platform.address_size() {
            AddressSize::Bits32 => Self::Word32,
            AddressSize::Bits64 => Self::Word64,
        }
    }

    /// Bytes touched by `put` and `get`
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            Self::Word32 => 4,
            Self::Word64 => 8,
        }
    }

    /// Write `value` as one native word.
    ///
    /// # Safety
    /// `address` must be valid for writes of `self.width()` bytes.
    #[inline(always)]
    pub unsafe fn put(self, address: *mut u8, value: i32) {
        match self {
            Self::Word32 => memory::put::<i32>(address, value),
            Self::Word64 => memory::put::<i64>(address, value as i64),
        }
    }

    /// Read one native word and narrow it to an `i32`.
    ///
    /// # Safety
    /// `address` must be valid for reads of `self.width()` bytes.
    #[inline(always)]
    pub unsafe fn get(self, address: *const u8) -> i32 {
        match self {
            Self::Word32 => memory::get::<i32>(address),
            Self::Word64 => memory::get::<i64>(address) as i32,
        }
    }
}
