//! Host platform description
//!
//! Only the two facts the closure marshaller needs: how wide an address is,
//! and which bits of a register-width value actually form the address.

/// Native address width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressSize {
    Bits32 = 32,
    Bits64 = 64,
}

impl AddressSize {
    /// Address width of the running process
    #[inline]
    pub const fn host() -> Self {
        #[cfg(target_pointer_width = "32")]
        return Self::Bits32;

        #[cfg(not(target_pointer_width = "32"))]
        return Self::Bits64;
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn bytes(self) -> usize {
        self as usize / 8
    }
}

static HOST: Platform = Platform::new(AddressSize::host());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    address_size: AddressSize,
    address_mask: u64,
}

impl Platform {
    pub const fn new(address_size: AddressSize) -> Self {
        let address_mask = match address_size {
            AddressSize::Bits32 => 0xffff_ffff,
            AddressSize::Bits64 => u64::MAX,
        };
        Self { address_size, address_mask }
    }

    /// The platform this process runs on, fixed at compile time
    #[inline]
    pub fn current() -> &'static Platform {
        &HOST
    }

    #[inline]
    pub const fn address_size(&self) -> AddressSize {
        self.address_size
    }

    /// Bytes per parameter slot (one address)
    #[inline]
    pub const fn word_size(&self) -> usize {
        self.address_size.bytes()
    }

    #[inline]
    pub const fn address_mask(&self) -> u64 {
        self.address_mask
    }

    /// Strip bits that are not part of an address on this platform
    #[inline]
    pub const fn mask_address(&self, raw: u64) -> u64 {
        raw & self.address_mask
    }
}
