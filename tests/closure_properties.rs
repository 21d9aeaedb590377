use core::ffi::c_void;

use ffi_closure_buffer::{AddressSize, CallContext, ClosureBuffer, NativeType, NativeWordIo, Platform};
use proptest::prelude::*;

const SENTINEL: u8 = 0x5a;

/// Run `write` against a fresh return slot and hand back the slot bytes
fn returned(ctx: &CallContext, write: impl FnOnce(&ClosureBuffer<'_>)) -> [u8; 32] {
    let mut ret = [SENTINEL; 32];
    let params: [*mut c_void; 0] = [];
    let buf = unsafe { ClosureBuffer::new(ctx, ret.as_mut_ptr() as *mut c_void, params.as_ptr()) };
    write(&buf);
    drop(buf);
    ret
}

/// Read parameter 0 of a frame whose only slot points at `storage`
fn param<R>(storage: &[u8], read: impl FnOnce(&ClosureBuffer<'_>) -> R) -> R {
    let ctx = CallContext::new(NativeType::Void, vec![NativeType::Pointer]);
    let params = [storage.as_ptr() as *mut c_void];
    let mut ret = [0u8; 8];
    let buf = unsafe { ClosureBuffer::new(&ctx, ret.as_mut_ptr() as *mut c_void, params.as_ptr()) };
    read(&buf)
}

fn word() -> NativeWordIo {
    NativeWordIo::instance()
}

// ===== Round trip =====

#[test]
fn round_trip_edge_values() {
    let ctx = CallContext::new(NativeType::I64, vec![]);

    for value in [0i64, i64::MIN, i64::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_long_return(value) });
        assert_eq!(param(&ret, |buf| unsafe { buf.get_long(0) }), value);
    }
    for value in [0.0f64, f64::MIN, f64::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_double_return(value) });
        assert_eq!(param(&ret, |buf| unsafe { buf.get_double(0) }), value);
    }
    for value in [0.0f32, f32::MIN, f32::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_float_return(value) });
        assert_eq!(param(&ret, |buf| unsafe { buf.get_float(0) }), value);
    }
    for value in [0i32, i32::MIN, i32::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_int_return(value) });
        assert_eq!(unsafe { word().get(ret.as_ptr()) }, value);
    }
    for value in [0i16, i16::MIN, i16::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_short_return(value) });
        assert_eq!(unsafe { word().get(ret.as_ptr()) } as i16, value);
    }
    for value in [0i8, i8::MIN, i8::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_byte_return(value) });
        assert_eq!(unsafe { word().get(ret.as_ptr()) } as i8, value);
    }
}

// The widened word keeps the narrow value in its first bytes only on
// little-endian hosts.
#[cfg(target_endian = "little")]
#[test]
fn narrow_returns_read_back_through_getters() {
    let ctx = CallContext::new(NativeType::I32, vec![]);

    for value in [0i8, i8::MIN, i8::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_byte_return(value) });
        assert_eq!(param(&ret, |buf| unsafe { buf.get_byte(0) }), value);
    }
    for value in [0i16, i16::MIN, i16::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_short_return(value) });
        assert_eq!(param(&ret, |buf| unsafe { buf.get_short(0) }), value);
    }
    for value in [0i32, i32::MIN, i32::MAX] {
        let ret = returned(&ctx, |buf| unsafe { buf.set_int_return(value) });
        assert_eq!(param(&ret, |buf| unsafe { buf.get_int(0) }), value);
    }
}

#[test]
fn narrow_getters_read_storage() {
    let byte = [0x80u8];
    assert_eq!(param(&byte, |buf| unsafe { buf.get_byte(0) }), i8::MIN);

    let short = i16::MAX.to_ne_bytes();
    assert_eq!(param(&short, |buf| unsafe { buf.get_short(0) }), i16::MAX);

    let int = i32::MIN.to_ne_bytes();
    assert_eq!(param(&int, |buf| unsafe { buf.get_int(0) }), i32::MIN);
}

proptest! {
    #[test]
    fn long_round_trip(value in any::<i64>()) {
        let ctx = CallContext::new(NativeType::I64, vec![]);
        let ret = returned(&ctx, |buf| unsafe { buf.set_long_return(value) });
        prop_assert_eq!(param(&ret, |buf| unsafe { buf.get_long(0) }), value);
        prop_assert!(ret[8..].iter().all(|&b| b == SENTINEL));
    }

    #[test]
    fn double_round_trip(value in any::<f64>()) {
        let ctx = CallContext::new(NativeType::F64, vec![]);
        let ret = returned(&ctx, |buf| unsafe { buf.set_double_return(value) });
        let read = param(&ret, |buf| unsafe { buf.get_double(0) });
        prop_assert_eq!(read.to_bits(), value.to_bits());
    }

    #[test]
    fn float_round_trip(value in any::<f32>()) {
        let ctx = CallContext::new(NativeType::F32, vec![]);
        let ret = returned(&ctx, |buf| unsafe { buf.set_float_return(value) });
        let read = param(&ret, |buf| unsafe { buf.get_float(0) });
        prop_assert_eq!(read.to_bits(), value.to_bits());
        prop_assert!(ret[4..].iter().all(|&b| b == SENTINEL));
    }

    #[test]
    fn address_round_trip(value in any::<usize>()) {
        let ctx = CallContext::new(NativeType::Pointer, vec![]);
        let ret = returned(&ctx, |buf| unsafe { buf.set_address_return(value) });
        let read = param(&ret, |buf| unsafe { buf.get_address(0) });
        let masked = Platform::current().mask_address(value as u64) as usize;
        prop_assert_eq!(read, masked);
    }

    // ===== Word widening =====

    #[test]
    fn int_return_is_sign_extended_word(value in any::<i32>()) {
        let ctx = CallContext::new(NativeType::I32, vec![]);
        let ret = returned(&ctx, |buf| unsafe { buf.set_int_return(value) });
        match word() {
            NativeWordIo::Word32 => {
                prop_assert_eq!(i32::from_ne_bytes(ret[..4].try_into().unwrap()), value);
            }
            NativeWordIo::Word64 => {
                prop_assert_eq!(i64::from_ne_bytes(ret[..8].try_into().unwrap()), value as i64);
            }
        }
        prop_assert!(ret[word().width()..].iter().all(|&b| b == SENTINEL));
        prop_assert_eq!(unsafe { word().get(ret.as_ptr()) }, value);
        if cfg!(target_endian = "little") {
            prop_assert_eq!(param(&ret, |buf| unsafe { buf.get_int(0) }), value);
        }
    }

    #[test]
    fn byte_return_is_sign_extended_word(value in any::<i8>()) {
        let ctx = CallContext::new(NativeType::I8, vec![]);
        let ret = returned(&ctx, |buf| unsafe { buf.set_byte_return(value) });
        let full = unsafe { word().get(ret.as_ptr()) };
        prop_assert_eq!(full, value as i32);
        prop_assert_eq!(full as i8, value);
        if cfg!(target_endian = "little") {
            prop_assert_eq!(param(&ret, |buf| unsafe { buf.get_byte(0) }), value);
        }
    }

    #[test]
    fn short_return_is_sign_extended_word(value in any::<i16>()) {
        let ctx = CallContext::new(NativeType::I16, vec![]);
        let ret = returned(&ctx, |buf| unsafe { buf.set_short_return(value) });
        let full = unsafe { word().get(ret.as_ptr()) };
        prop_assert_eq!(full, value as i32);
        prop_assert_eq!(full as i16, value);
        if cfg!(target_endian = "little") {
            prop_assert_eq!(param(&ret, |buf| unsafe { buf.get_short(0) }), value);
        }
    }

    #[test]
    fn word64_accessor_widens_and_truncates(value in any::<i32>()) {
        let mut slot = [0u8; 8];
        unsafe { NativeWordIo::Word64.put(slot.as_mut_ptr(), value) };
        prop_assert_eq!(i64::from_ne_bytes(slot), value as i64);
        prop_assert_eq!(unsafe { NativeWordIo::Word64.get(slot.as_ptr()) }, value);
    }

    #[test]
    fn word32_accessor_writes_one_int(value in any::<i32>()) {
        let mut slot = [SENTINEL; 8];
        unsafe { NativeWordIo::Word32.put(slot.as_mut_ptr(), value) };
        prop_assert_eq!(i32::from_ne_bytes(slot[..4].try_into().unwrap()), value);
        prop_assert_eq!(&slot[4..], &[SENTINEL; 4]);
    }

    // ===== Address masking =====

    #[test]
    fn masking_is_idempotent(raw in any::<u64>()) {
        for size in [AddressSize::Bits32, AddressSize::Bits64] {
            let platform = Platform::new(size);
            let once = platform.mask_address(raw);
            prop_assert_eq!(platform.mask_address(once), once);
        }
    }

    #[test]
    fn masking_ignores_spurious_high_bits(address in any::<u32>(), junk in 1u32..) {
        let platform = Platform::new(AddressSize::Bits32);
        let dirty = ((junk as u64) << 32) | address as u64;
        prop_assert_eq!(platform.mask_address(dirty), platform.mask_address(address as u64));
        prop_assert_eq!(platform.mask_address(dirty), address as u64);
    }

    // ===== Struct copy bounds =====

    #[test]
    fn struct_return_copies_exactly_size(size in 1usize..=24, seed in any::<u8>()) {
        let ctx = CallContext::new(NativeType::Struct { size, align: 1 }, vec![]);
        let source: [u8; 32] = core::array::from_fn(|i| seed.wrapping_add(i as u8) | 1);
        let ret = returned(&ctx, |buf| unsafe { buf.set_struct_return(source.as_ptr()) });
        prop_assert_eq!(&ret[..size], &source[..size]);
        prop_assert!(ret[size..].iter().all(|&b| b == SENTINEL));
    }

    #[test]
    fn struct_return_from_bytes_copies_exactly_size(size in 1usize..=16, offset in 0usize..8) {
        let ctx = CallContext::new(NativeType::Struct { size, align: 1 }, vec![]);
        let data: Vec<u8> = (0..32).map(|i| i as u8).collect();
        let ret = returned(&ctx, |buf| unsafe { buf.set_struct_return_from(&data, offset) });
        prop_assert_eq!(&ret[..size], &data[offset..offset + size]);
        prop_assert!(ret[size..].iter().all(|&b| b == SENTINEL));
    }

    // ===== Parameter indirection =====

    #[test]
    fn get_struct_returns_slot_contents(count in 1usize..8) {
        let storage: Vec<[u8; 16]> = vec![[0u8; 16]; count];
        let params: Vec<*mut c_void> = storage.iter().map(|s| s.as_ptr() as *mut c_void).collect();
        let ctx = CallContext::new(
            NativeType::Void,
            vec![NativeType::Struct { size: 16, align: 1 }; count],
        );
        let mut ret = [0u8; 8];
        let buf = unsafe { ClosureBuffer::new(&ctx, ret.as_mut_ptr() as *mut c_void, params.as_ptr()) };
        for i in 0..count {
            let addr = unsafe { buf.get_struct(i) };
            prop_assert_eq!(addr as *const u8, storage[i].as_ptr());
            prop_assert_ne!(addr as *const u8, unsafe { params.as_ptr().add(i) } as *const u8);
        }
    }
}
