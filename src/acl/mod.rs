//! Ascend ACL operator runtime
//!
//! This module provides the vendor side of the adapter: native enums and
//! opaque handles, the [`AclRuntime`] trait, and its two implementations.

mod error;
mod recording;
mod runtime;
mod types;

#[cfg(feature = "ascend")]
mod ffi;
#[cfg(feature = "ascend")]
mod native;

pub use error::{check, AclError, AclResult};
pub use recording::{
    AclCall, BufferRecord, DescRecord, ExecutionRecord, RecordingRuntime, ACL_ERROR_INVALID_PARAM,
};
pub use runtime::AclRuntime;
pub use types::{
    AclCompileType, AclDataType, AclEngineType, AclFormat, DataBufferHandle, ExecuteRequest,
    OpAttrHandle, StreamHandle, TensorDescHandle, ACL_SUCCESS,
};

#[cfg(feature = "ascend")]
pub use native::NativeAcl;
