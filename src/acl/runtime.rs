//! The vendor runtime seam
//!
//! [`AclOpRunner`](crate::runner::AclOpRunner) talks to ACL only through
//! this trait. [`NativeAcl`](super::NativeAcl) forwards to the real
//! libraries; [`RecordingRuntime`](super::RecordingRuntime) stays on the host.

use std::ffi::c_void;

use super::error::AclResult;
use super::types::{
    AclDataType, AclFormat, DataBufferHandle, ExecuteRequest, OpAttrHandle, TensorDescHandle,
};

/// Entry points of the ACL operator API used to build and run one operator
pub trait AclRuntime {
    /// `aclCreateTensorDesc`
    fn create_tensor_desc(
        &self,
        dtype: AclDataType,
        dims: &[i64],
        format: AclFormat,
    ) -> AclResult<TensorDescHandle>;

    /// `aclDestroyTensorDesc`
    fn destroy_tensor_desc(&self, desc: TensorDescHandle);

    /// `aclCreateDataBuffer`. The buffer references `data`, it does not copy it.
    fn create_data_buffer(&self, data: *mut c_void, size: usize) -> AclResult<DataBufferHandle>;

    /// `aclDestroyDataBuffer`
    fn destroy_data_buffer(&self, buffer: DataBufferHandle) -> AclResult<()>;

    /// `aclopCreateAttr`
    fn create_attr(&self) -> AclResult<OpAttrHandle>;

    /// `aclopDestroyAttr`
    fn destroy_attr(&self, attr: OpAttrHandle);

    fn set_attr_int(&self, attr: OpAttrHandle, name: &str, value: i64) -> AclResult<()>;

    fn set_attr_float(&self, attr: OpAttrHandle, name: &str, value: f32) -> AclResult<()>;

    fn set_attr_bool(&self, attr: OpAttrHandle, name: &str, value: bool) -> AclResult<()>;

    fn set_attr_string(&self, attr: OpAttrHandle, name: &str, value: &str) -> AclResult<()>;

    fn set_attr_list_int(&self, attr: OpAttrHandle, name: &str, values: &[i64]) -> AclResult<()>;

    /// `aclopCompileAndExecute`: compile (or fetch from cache) and enqueue the
    /// operator on `request.stream`
    fn compile_and_execute(&self, request: &ExecuteRequest<'_>) -> AclResult<()>;

    /// `aclGetRecentErrMsg`; empty when the runtime has nothing to report
    fn recent_error_message(&self) -> String;
}
