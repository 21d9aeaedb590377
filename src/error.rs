//! Errors reported by the validated closure buffer
//!
//! The unchecked path never produces these.

use crate::types::NativeType;

/// Contract violation caught before touching native memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    IndexOutOfRange { index: usize, count: usize },
    ParameterTypeMismatch { index: usize, accessor: &'static str, declared: NativeType },
    ReturnTypeMismatch { setter: &'static str, declared: NativeType },
    ReturnAlreadySet,
    ReturnNotSet { declared: NativeType },
    BufferTooShort { offset: usize, needed: usize, available: usize },
}

impl core::fmt::Display for MarshalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, count } => {
                write!(f, "Parameter index {} out of range for {} parameters", index, count)
            }
            Self::ParameterTypeMismatch { index, accessor, declared } => {
                write!(f, "Parameter {} is declared {}, cannot read with {}", index, declared, accessor)
            }
            Self::ReturnTypeMismatch { setter, declared } => {
                write!(f, "Return type is declared {}, cannot write with {}", declared, setter)
            }
            Self::ReturnAlreadySet => write!(f, "Return value already written"),
            Self::ReturnNotSet { declared } => {
                write!(f, "No return value written for declared return type {}", declared)
            }
            Self::BufferTooShort { offset, needed, available } => {
                write!(
                    f,
                    "Struct return needs {} bytes at offset {}, buffer has {}",
                    needed, offset, available
                )
            }
        }
    }
}

impl std::error::Error for MarshalError {}
