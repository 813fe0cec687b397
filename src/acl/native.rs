//! FFI-backed [`AclRuntime`]

use std::ffi::{c_int, c_void, CStr, CString};
use std::ptr;

use super::error::{check, AclError, AclResult};
use super::ffi;
use super::runtime::AclRuntime;
use super::types::{
    AclDataType, AclFormat, DataBufferHandle, ExecuteRequest, OpAttrHandle, TensorDescHandle,
};

/// Runtime that calls straight into `libascendcl` / `libacl_op_compiler`.
///
/// Device, context and stream setup stay with the caller; this type only
/// covers the operator-building entry points.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeAcl;

impl NativeAcl {
    pub fn new() -> Self {
        NativeAcl
    }
}

fn c_string(call: &'static str, value: &str) -> AclResult<CString> {
    CString::new(value).map_err(|_| AclError::InvalidCString {
        call,
        value: value.to_string(),
    })
}

impl AclRuntime for NativeAcl {
    fn create_tensor_desc(
        &self,
        dtype: AclDataType,
        dims: &[i64],
        format: AclFormat,
    ) -> AclResult<TensorDescHandle> {
        let desc = unsafe {
            ffi::aclCreateTensorDesc(
                dtype.as_raw(),
                dims.len() as c_int,
                dims.as_ptr(),
                format.as_raw(),
            )
        };
        tracing::trace!(
            "aclCreateTensorDesc(dtype={}, dims={:?}, format={}) -> {:?}",
            dtype,
            dims,
            format,
            desc
        );
        TensorDescHandle::from_raw(desc).ok_or(AclError::NullHandle("aclCreateTensorDesc"))
    }

    fn destroy_tensor_desc(&self, desc: TensorDescHandle) {
        unsafe { ffi::aclDestroyTensorDesc(desc.as_ptr()) }
    }

    fn create_data_buffer(&self, data: *mut c_void, size: usize) -> AclResult<DataBufferHandle> {
        let buffer = unsafe { ffi::aclCreateDataBuffer(data, size) };
        tracing::trace!(
            "aclCreateDataBuffer(data={:?}, size={}) -> {:?}",
            data,
            size,
            buffer
        );
        DataBufferHandle::from_raw(buffer).ok_or(AclError::NullHandle("aclCreateDataBuffer"))
    }

    fn destroy_data_buffer(&self, buffer: DataBufferHandle) -> AclResult<()> {
        let ret = unsafe { ffi::aclDestroyDataBuffer(buffer.as_ptr()) };
        check("aclDestroyDataBuffer", ret)
    }

    fn create_attr(&self) -> AclResult<OpAttrHandle> {
        let attr = unsafe { ffi::aclopCreateAttr() };
        OpAttrHandle::from_raw(attr).ok_or(AclError::NullHandle("aclopCreateAttr"))
    }

    fn destroy_attr(&self, attr: OpAttrHandle) {
        unsafe { ffi::aclopDestroyAttr(attr.as_ptr()) }
    }

    fn set_attr_int(&self, attr: OpAttrHandle, name: &str, value: i64) -> AclResult<()> {
        let name = c_string("aclopSetAttrInt", name)?;
        let ret = unsafe { ffi::aclopSetAttrInt(attr.as_ptr(), name.as_ptr(), value) };
        check("aclopSetAttrInt", ret)
    }

    fn set_attr_float(&self, attr: OpAttrHandle, name: &str, value: f32) -> AclResult<()> {
        let name = c_string("aclopSetAttrFloat", name)?;
        let ret = unsafe { ffi::aclopSetAttrFloat(attr.as_ptr(), name.as_ptr(), value) };
        check("aclopSetAttrFloat", ret)
    }

    fn set_attr_bool(&self, attr: OpAttrHandle, name: &str, value: bool) -> AclResult<()> {
        let name = c_string("aclopSetAttrBool", name)?;
        let ret = unsafe { ffi::aclopSetAttrBool(attr.as_ptr(), name.as_ptr(), value as u8) };
        check("aclopSetAttrBool", ret)
    }

    fn set_attr_string(&self, attr: OpAttrHandle, name: &str, value: &str) -> AclResult<()> {
        let name = c_string("aclopSetAttrString", name)?;
        let value = c_string("aclopSetAttrString", value)?;
        let ret = unsafe { ffi::aclopSetAttrString(attr.as_ptr(), name.as_ptr(), value.as_ptr()) };
        check("aclopSetAttrString", ret)
    }

    fn set_attr_list_int(&self, attr: OpAttrHandle, name: &str, values: &[i64]) -> AclResult<()> {
        let name = c_string("aclopSetAttrListInt", name)?;
        let ret = unsafe {
            ffi::aclopSetAttrListInt(
                attr.as_ptr(),
                name.as_ptr(),
                values.len() as c_int,
                values.as_ptr(),
            )
        };
        check("aclopSetAttrListInt", ret)
    }

    fn compile_and_execute(&self, request: &ExecuteRequest<'_>) -> AclResult<()> {
        let op_type = c_string("aclopCompileAndExecute", request.op_type)?;

        // Handles are #[repr(transparent)] over the raw pointers ACL expects
        let ret = unsafe {
            ffi::aclopCompileAndExecute(
                op_type.as_ptr(),
                request.input_descs.len() as c_int,
                request.input_descs.as_ptr() as *const *const c_void,
                request.input_buffers.as_ptr() as *const *const c_void,
                request.output_descs.len() as c_int,
                request.output_descs.as_ptr() as *const *const c_void,
                request.output_buffers.as_ptr() as *const *mut c_void,
                request.attr.as_ptr(),
                request.engine_type as i32,
                request.compile_type as i32,
                ptr::null(),
                request.stream.as_ptr(),
            )
        };
        check("aclopCompileAndExecute", ret)
    }

    fn recent_error_message(&self) -> String {
        let msg = unsafe { ffi::aclGetRecentErrMsg() };
        if msg.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}
