//! Tensor side of the DIOPI ABI

use std::ffi::c_void;
use std::ptr;

use super::dtype::DiopiDtype;

/// Read access to a DIOPI tensor's metadata and device memory.
///
/// Implementors describe memory they do not own; pointers returned by
/// [`data`](DiopiTensor::data) and [`data_mut`](DiopiTensor::data_mut) must
/// stay valid for as long as the implementor is borrowed.
pub trait DiopiTensor {
    fn shape(&self) -> &[i64];

    fn stride(&self) -> &[i64];

    fn numel(&self) -> i64;

    /// Bytes per element
    fn elem_size(&self) -> i64;

    fn dtype(&self) -> DiopiDtype;

    /// Device address for read-only use
    fn data(&self) -> *const c_void;

    /// Device address the kernel may write to
    fn data_mut(&self) -> *mut c_void;

    fn dim(&self) -> usize {
        self.shape().len()
    }

    /// Row-major contiguity check
    fn is_contiguous(&self) -> bool {
        let shape = self.shape();
        let stride = self.stride();
        if shape.len() != stride.len() {
            return false;
        }
        let mut expected = 1i64;
        for (size, actual) in shape.iter().zip(stride).rev() {
            if *actual != expected {
                return false;
            }
            expected = expected.saturating_mul(*size);
        }
        true
    }
}

impl<T: DiopiTensor + ?Sized> DiopiTensor for &T {
    fn shape(&self) -> &[i64] {
        (**self).shape()
    }

    fn stride(&self) -> &[i64] {
        (**self).stride()
    }

    fn numel(&self) -> i64 {
        (**self).numel()
    }

    fn elem_size(&self) -> i64 {
        (**self).elem_size()
    }

    fn dtype(&self) -> DiopiDtype {
        (**self).dtype()
    }

    fn data(&self) -> *const c_void {
        (**self).data()
    }

    fn data_mut(&self) -> *mut c_void {
        (**self).data_mut()
    }
}

/// A tensor described by plain host-side metadata.
///
/// Useful when the caller already holds shape/dtype/address, and for
/// driving [`RecordingRuntime`](crate::acl::RecordingRuntime) without a
/// framework behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorView {
    shape: Vec<i64>,
    stride: Vec<i64>,
    numel: i64,
    dtype: DiopiDtype,
    data: *mut c_void,
}

impl TensorView {
    /// Contiguous tensor with no backing address
    pub fn new(dtype: DiopiDtype, shape: &[i64]) -> Self {
        TensorView {
            shape: shape.to_vec(),
            stride: contiguous_strides(shape),
            numel: shape.iter().product(),
            dtype,
            data: ptr::null_mut(),
        }
    }

    /// Zero-dimensional single-element tensor
    pub fn scalar(dtype: DiopiDtype) -> Self {
        Self::new(dtype, &[])
    }

    pub fn with_data(mut self, data: *mut c_void) -> Self {
        self.data = data;
        self
    }

    pub fn with_stride(mut self, stride: &[i64]) -> Self {
        self.stride = stride.to_vec();
        self
    }

    /// Override the element count, e.g. to describe a 0-d tensor with no
    /// elements
    pub fn with_numel(mut self, numel: i64) -> Self {
        self.numel = numel;
        self
    }
}

impl DiopiTensor for TensorView {
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
        self.dtype.element_size() as i64
    }

    fn dtype(&self) -> DiopiDtype {
        self.dtype
    }

    fn data(&self) -> *const c_void {
        self.data
    }

    fn data_mut(&self) -> *mut c_void {
        self.data
    }
}

/// Row-major strides for `shape`
pub fn contiguous_strides(shape: &[i64]) -> Vec<i64> {
    let mut strides = vec![0i64; shape.len()];
    let mut stride = 1i64;
    for (i, size) in shape.iter().enumerate().rev() {
        strides[i] = stride;
        stride = stride.saturating_mul((*size).max(1));
    }
    strides
}
