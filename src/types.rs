//! Native type descriptors and call signatures
//!
//! A `CallContext` is built once per closure signature by the caller and then
//! shared read-only by every invocation of that closure.

use core::fmt;

/// Native type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeType {
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Pointer,
    /// Aggregate passed and returned by address; layout owned by the caller
    Struct { size: usize, align: usize },
}

impl NativeType {
    /// Size of type in bytes
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Self::Void => 0,
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
            Self::Pointer => core::mem::size_of::<usize>(),
            Self::Struct { size, .. } => size,
        }
    }

    /// Alignment requirement
    #[inline]
    pub const fn align(self) -> usize {
        match self {
            Self::Void => 1,
            Self::Struct { align, .. } => align,
            other => other.size(),
        }
    }

    #[inline]
    pub const fn is_integral(self) -> bool {
        matches!(self, Self::Bool | Self::I8 | Self::I16 | Self::I32 | Self::I64 |
                      Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    #[inline]
    pub const fn is_struct(self) -> bool {
        matches!(self, Self::Struct { .. })
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Bool => write!(f, "bool"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::Pointer => write!(f, "pointer"),
            Self::Struct { size, align } => write!(f, "struct(size={}, align={})", size, align),
        }
    }
}

/// Calling convention the trampoline was generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CallingConvention {
    /// Platform C convention
    #[default]
    Default,
    /// Win32 stdcall (callee pops arguments)
    Stdcall,
}

/// Signature of a native-callable closure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    return_type: NativeType,
    parameter_types: Vec<NativeType>,
    convention: CallingConvention,
}

impl CallContext {
    #[inline]
    pub fn new(return_type: NativeType, parameter_types: Vec<NativeType>) -> Self {
        Self::with_convention(return_type, parameter_types, CallingConvention::Default)
    }

    pub fn with_convention(
        return_type: NativeType,
        parameter_types: Vec<NativeType>,
        convention: CallingConvention,
    ) -> Self {
        Self {
            return_type,
            parameter_types,
            convention,
        }
    }

    #[inline]
    pub fn return_type(&self) -> NativeType {
        self.return_type
    }

    #[inline]
    pub fn parameter_types(&self) -> &[NativeType] {
        &self.parameter_types
    }

    #[inline]
    pub fn parameter_type(&self, index: usize) -> Option<NativeType> {
        self.parameter_types.get(index).copied()
    }

    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.parameter_types.len()
    }

    #[inline]
    pub fn convention(&self) -> CallingConvention {
        self.convention
    }
}
