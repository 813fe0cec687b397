//! DIOPI runtime FFI bindings
//!
//! Query functions from `diopi/diopirt.h`. The framework that owns the
//! tensors exports them; handles are opaque here.

use std::ffi::c_void;

/// `diopiSuccess`
pub const DIOPI_SUCCESS: i32 = 0;

/// `diopiSize_t`: borrowed view of an `int64_t` array owned by the tensor
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DiopiSize {
    pub data: *const i64,
    pub len: i64,
}

impl Default for DiopiSize {
    fn default() -> Self {
        DiopiSize {
            data: std::ptr::null(),
            len: 0,
        }
    }
}

#[allow(dead_code)]
extern "C" {
    pub fn diopiGetTensorData(th: *mut c_void, data: *mut *mut c_void) -> i32;
    pub fn diopiGetTensorDataConst(th: *const c_void, data: *mut *const c_void) -> i32;
    pub fn diopiGetTensorShape(th: *const c_void, size: *mut DiopiSize) -> i32;
    pub fn diopiGetTensorStride(th: *const c_void, stride: *mut DiopiSize) -> i32;
    pub fn diopiGetTensorDtype(th: *const c_void, dtype: *mut i32) -> i32;
    pub fn diopiGetTensorNumel(th: *const c_void, numel: *mut i64) -> i32;
    pub fn diopiGetTensorElemSize(th: *const c_void, itemsize: *mut i64) -> i32;
    pub fn diopiGetStream(ctx: *mut c_void, stream: *mut *mut c_void) -> i32;
}
