//! DIOPI → ACL dtype and layout mapping

use crate::acl::{AclDataType, AclFormat};
use crate::diopi::{DiopiDtype, DiopiTensor};
use crate::error::{AscendError, AscendResult};

/// Map a DIOPI element type to the ACL type with the same storage.
///
/// bfloat16 and tfloat32 have no ACL counterpart here and are rejected.
pub fn acl_data_type(dtype: DiopiDtype) -> AscendResult<AclDataType> {
    let acl = match dtype {
        DiopiDtype::Float16 => AclDataType::Float16,
        DiopiDtype::Float32 => AclDataType::Float,
        DiopiDtype::Float64 => AclDataType::Double,
        DiopiDtype::Int8 => AclDataType::Int8,
        DiopiDtype::Uint8 => AclDataType::Uint8,
        DiopiDtype::Int16 => AclDataType::Int16,
        DiopiDtype::Uint16 => AclDataType::Uint16,
        DiopiDtype::Int32 => AclDataType::Int32,
        DiopiDtype::Uint32 => AclDataType::Uint32,
        DiopiDtype::Int64 => AclDataType::Int64,
        DiopiDtype::Uint64 => AclDataType::Uint64,
        DiopiDtype::Bool => AclDataType::Bool,
        DiopiDtype::Bfloat16 | DiopiDtype::Tfloat32 => {
            return Err(AscendError::UnsupportedDtype(dtype.name().to_string()))
        }
    };
    Ok(acl)
}

/// Layout tag from rank alone: rank 4 is NCHW, anything else ND.
///
/// This does not inspect strides; channels-last or fractal layouts must be
/// passed explicitly.
pub fn acl_format_for_rank(rank: usize) -> AclFormat {
    if rank == 4 {
        AclFormat::Nchw
    } else {
        AclFormat::Nd
    }
}

/// How a tensor's dtype and layout tag are derived when the caller does not
/// give a format explicitly
pub trait TensorMapping {
    fn acl_dtype<T: DiopiTensor + ?Sized>(&self, tensor: &T) -> AscendResult<AclDataType> {
        acl_data_type(tensor.dtype())
    }

    fn acl_format<T: DiopiTensor + ?Sized>(&self, tensor: &T) -> AclFormat {
        acl_format_for_rank(tensor.dim())
    }
}

/// The stock tables above
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultMapping;

impl TensorMapping for DefaultMapping {}
