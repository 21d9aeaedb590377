//! Validated closure buffer
//!
//! Same operations as `ClosureBuffer`, but each call is first checked against
//! the signature: index bounds, accessor width against the declared type, and
//! a single return write. Address validity is still covered by the contract of
//! `ClosureBuffer::new`, which is what makes these accessors safe to call.

use core::cell::Cell;

use super::ClosureBuffer;
use crate::error::MarshalError;
use crate::logging;
use crate::types::{CallContext, NativeType};

#[derive(Debug)]
pub struct CheckedClosureBuffer<'a> {
    inner: ClosureBuffer<'a>,
    returned: Cell<bool>,
}

fn is_byte(ty: NativeType) -> bool {
    matches!(ty, NativeType::I8 | NativeType::U8 | NativeType::Bool)
}

fn is_short(ty: NativeType) -> bool {
    matches!(ty, NativeType::I16 | NativeType::U16)
}

fn is_int(ty: NativeType) -> bool {
    matches!(ty, NativeType::I32 | NativeType::U32)
}

fn is_long(ty: NativeType) -> bool {
    matches!(ty, NativeType::I64 | NativeType::U64)
}

impl<'a> CheckedClosureBuffer<'a> {
    pub fn new(inner: ClosureBuffer<'a>) -> Self {
        Self {
            inner,
            returned: Cell::new(false),
        }
    }

    #[inline]
    pub fn context(&self) -> &'a CallContext {
        self.inner.context()
    }

    /// Whether a return setter has succeeded
    #[inline]
    pub fn has_returned(&self) -> bool {
        self.returned.get()
    }

    fn reject<T>(&self, err: MarshalError) -> Result<T, MarshalError> {
        logging::log_contract_violation(&err);
        Err(err)
    }

    fn check_param(
        &self,
        index: usize,
        accessor: &'static str,
        accepts: fn(NativeType) -> bool,
    ) -> Result<(), MarshalError> {
        let count = self.context().parameter_count();
        match self.context().parameter_type(index) {
            None => self.reject(MarshalError::IndexOutOfRange { index, count }),
            Some(declared) if !accepts(declared) => {
                self.reject(MarshalError::ParameterTypeMismatch { index, accessor, declared })
            }
            Some(_) => Ok(()),
        }
    }

    fn check_return(
        &self,
        setter: &'static str,
        accepts: fn(NativeType) -> bool,
    ) -> Result<(), MarshalError> {
        if self.returned.get() {
            return self.reject(MarshalError::ReturnAlreadySet);
        }
        let declared = self.context().return_type();
        if !accepts(declared) {
            return self.reject(MarshalError::ReturnTypeMismatch { setter, declared });
        }
        Ok(())
    }

    // Safety for every block below: index and width were validated against
    // the signature, and `ClosureBuffer::new` guarantees the signature
    // matches the memory.

    pub fn get_byte(&self, index: usize) -> Result<i8, MarshalError> {
        self.check_param(index, "get_byte", is_byte)?;
        Ok(unsafe { self.inner.get_byte(index) })
    }

    pub fn get_short(&self, index: usize) -> Result<i16, MarshalError> {
        self.check_param(index, "get_short", is_short)?;
        Ok(unsafe { self.inner.get_short(index) })
    }

    pub fn get_int(&self, index: usize) -> Result<i32, MarshalError> {
        self.check_param(index, "get_int", is_int)?;
        Ok(unsafe { self.inner.get_int(index) })
    }

    pub fn get_long(&self, index: usize) -> Result<i64, MarshalError> {
        self.check_param(index, "get_long", is_long)?;
        Ok(unsafe { self.inner.get_long(index) })
    }

    pub fn get_float(&self, index: usize) -> Result<f32, MarshalError> {
        self.check_param(index, "get_float", |ty| ty == NativeType::F32)?;
        Ok(unsafe { self.inner.get_float(index) })
    }

    pub fn get_double(&self, index: usize) -> Result<f64, MarshalError> {
        self.check_param(index, "get_double", |ty| ty == NativeType::F64)?;
        Ok(unsafe { self.inner.get_double(index) })
    }

    pub fn get_address(&self, index: usize) -> Result<usize, MarshalError> {
        self.check_param(index, "get_address", |ty| ty == NativeType::Pointer)?;
        Ok(unsafe { self.inner.get_address(index) })
    }

    pub fn get_struct(&self, index: usize) -> Result<*mut u8, MarshalError> {
        self.check_param(index, "get_struct", NativeType::is_struct)?;
        Ok(unsafe { self.inner.get_struct(index) })
    }

    pub fn set_byte_return(&self, value: i8) -> Result<(), MarshalError> {
        self.check_return("set_byte_return", is_byte)?;
        unsafe { self.inner.set_byte_return(value) };
        self.returned.set(true);
        Ok(())
    }

    pub fn set_short_return(&self, value: i16) -> Result<(), MarshalError> {
        self.check_return("set_short_return", is_short)?;
        unsafe { self.inner.set_short_return(value) };
        self.returned.set(true);
        Ok(())
    }

    pub fn set_int_return(&self, value: i32) -> Result<(), MarshalError> {
        self.check_return("set_int_return", is_int)?;
        unsafe { self.inner.set_int_return(value) };
        self.returned.set(true);
        Ok(())
    }

    pub fn set_long_return(&self, value: i64) -> Result<(), MarshalError> {
        self.check_return("set_long_return", is_long)?;
        unsafe { self.inner.set_long_return(value) };
        self.returned.set(true);
        Ok(())
    }

    pub fn set_float_return(&self, value: f32) -> Result<(), MarshalError> {
        self.check_return("set_float_return", |ty| ty == NativeType::F32)?;
        unsafe { self.inner.set_float_return(value) };
        self.returned.set(true);
        Ok(())
    }

    pub fn set_double_return(&self, value: f64) -> Result<(), MarshalError> {
        self.check_return("set_double_return", |ty| ty == NativeType::F64)?;
        unsafe { self.inner.set_double_return(value) };
        self.returned.set(true);
        Ok(())
    }

    pub fn set_address_return(&self, address: usize) -> Result<(), MarshalError> {
        self.check_return("set_address_return", |ty| ty == NativeType::Pointer)?;
        unsafe { self.inner.set_address_return(address) };
        self.returned.set(true);
        Ok(())
    }

    /// # Safety
    /// `value` must be readable for `return_type().size()` bytes; the source
    /// is the one address this layer cannot vouch for.
    pub unsafe fn set_struct_return(&self, value: *const u8) -> Result<(), MarshalError> {
        self.check_return("set_struct_return", NativeType::is_struct)?;
        self.inner.set_struct_return(value);
        self.returned.set(true);
        Ok(())
    }

    pub fn set_struct_return_from(&self, data: &[u8], offset: usize) -> Result<(), MarshalError> {
        self.check_return("set_struct_return_from", NativeType::is_struct)?;
        let needed = self.context().return_type().size();
        if offset.checked_add(needed).map_or(true, |end| end > data.len()) {
            return self.reject(MarshalError::BufferTooShort {
                offset,
                needed,
                available: data.len(),
            });
        }
        unsafe { self.inner.set_struct_return_from(data, offset) };
        self.returned.set(true);
        Ok(())
    }

    /// End the invocation, reporting a missing return for non-void signatures
    pub fn finish(self) -> Result<(), MarshalError> {
        let declared = self.context().return_type();
        if declared != NativeType::Void && !self.returned.get() {
            return self.reject(MarshalError::ReturnNotSet { declared });
        }
        Ok(())
    }
}

impl<'a> From<ClosureBuffer<'a>> for CheckedClosureBuffer<'a> {
    fn from(inner: ClosureBuffer<'a>) -> Self {
        Self::new(inner)
    }
}
