//! Wrappers over live DIOPI C handles

use std::ffi::c_void;
use std::ptr::{self, NonNull};

use super::context::DiopiContext;
use super::dtype::DiopiDtype;
use super::ffi::{self, DiopiSize, DIOPI_SUCCESS};
use super::tensor::DiopiTensor;
use crate::acl::StreamHandle;
use crate::error::{AscendError, AscendResult};

fn diopi_check(call: &'static str, status: i32) -> AscendResult<()> {
    if status == DIOPI_SUCCESS {
        Ok(())
    } else {
        Err(AscendError::DiopiCall { call, status })
    }
}

unsafe fn size_to_vec(size: DiopiSize) -> Vec<i64> {
    if size.data.is_null() || size.len <= 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(size.data, size.len as usize).to_vec()
}

/// A `diopiTensorHandle_t` with its metadata read once at wrap time.
///
/// Device addresses are queried on each call since the framework may
/// rebind storage between operators.
#[derive(Debug)]
pub struct TensorHandle {
    raw: NonNull<c_void>,
    shape: Vec<i64>,
    stride: Vec<i64>,
    numel: i64,
    elem_size: i64,
    dtype: DiopiDtype,
}

impl TensorHandle {
    /// Wrap and query a DIOPI tensor handle.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live tensor handle that outlives the wrapper.
    pub unsafe fn from_raw(raw: *mut c_void) -> AscendResult<Self> {
        let raw = NonNull::new(raw).ok_or(AscendError::NullHandle { what: "tensor" })?;
        let th = raw.as_ptr() as *const c_void;

        let mut shape = DiopiSize::default();
        diopi_check("diopiGetTensorShape", ffi::diopiGetTensorShape(th, &mut shape))?;
        let mut stride = DiopiSize::default();
        diopi_check("diopiGetTensorStride", ffi::diopiGetTensorStride(th, &mut stride))?;
        let mut numel = 0i64;
        diopi_check("diopiGetTensorNumel", ffi::diopiGetTensorNumel(th, &mut numel))?;
        let mut elem_size = 0i64;
        diopi_check("diopiGetTensorElemSize", ffi::diopiGetTensorElemSize(th, &mut elem_size))?;
        let mut raw_dtype = -1i32;
        diopi_check("diopiGetTensorDtype", ffi::diopiGetTensorDtype(th, &mut raw_dtype))?;
        let dtype = DiopiDtype::from_raw(raw_dtype)
            .ok_or_else(|| AscendError::UnsupportedDtype(format!("raw diopiDtype_t {}", raw_dtype)))?;

        Ok(TensorHandle {
            raw,
            shape: size_to_vec(shape),
            stride: size_to_vec(stride),
            numel,
            elem_size,
            dtype,
        })
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.raw.as_ptr()
    }
}

impl DiopiTensor for TensorHandle {
    fn shape(&self) -> &[i64] {
        &self.shape
    }

    fn stride(&self) -> &[i64] {
        &self.stride
    }

    fn numel(&self) -> i64 {
        self.numel
    }

    fn elem_size(&self) -> i64 {
        self.elem_size
    }

    fn dtype(&self) -> DiopiDtype {
        self.dtype
    }

    fn data(&self) -> *const c_void {
        let mut data: *const c_void = ptr::null();
        let status = unsafe { ffi::diopiGetTensorDataConst(self.raw.as_ptr(), &mut data) };
        if status != DIOPI_SUCCESS {
            tracing::warn!("diopiGetTensorDataConst failed with status {}", status);
        }
        data
    }

    fn data_mut(&self) -> *mut c_void {
        let mut data: *mut c_void = ptr::null_mut();
        let status = unsafe { ffi::diopiGetTensorData(self.raw.as_ptr(), &mut data) };
        if status != DIOPI_SUCCESS {
            tracing::warn!("diopiGetTensorData failed with status {}", status);
        }
        data
    }
}

/// A `diopiContextHandle_t`
#[derive(Debug, Clone, Copy)]
pub struct ContextHandle {
    raw: NonNull<c_void>,
}

impl ContextHandle {
    /// # Safety
    ///
    /// `raw` must be null or a live context handle that outlives the wrapper.
    pub unsafe fn from_raw(raw: *mut c_void) -> AscendResult<Self> {
        let raw = NonNull::new(raw).ok_or(AscendError::NullHandle { what: "context" })?;
        Ok(ContextHandle { raw })
    }
}

impl DiopiContext for ContextHandle {
    fn stream(&self) -> AscendResult<StreamHandle> {
        let mut stream: *mut c_void = ptr::null_mut();
        let status = unsafe { ffi::diopiGetStream(self.raw.as_ptr(), &mut stream) };
        diopi_check("diopiGetStream", status)?;
        Ok(StreamHandle::from_raw(stream))
    }
}
