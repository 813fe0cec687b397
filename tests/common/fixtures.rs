//! Host-backed tensor fixtures

use std::ffi::c_void;

use diopi_ascend::acl::{AclCall, RecordingRuntime, StreamHandle};
use diopi_ascend::{DiopiDtype, TensorView};

/// Host allocation plus a [`TensorView`] pointing into it
pub struct HostTensor {
    storage: Vec<u8>,
    pub view: TensorView,
}

impl HostTensor {
    pub fn new(dtype: DiopiDtype, shape: &[i64]) -> Self {
        let numel: i64 = shape.iter().product();
        let mut storage = vec![0u8; numel as usize * dtype.element_size()];
        let view = TensorView::new(dtype, shape).with_data(storage.as_mut_ptr() as *mut c_void);
        HostTensor { storage, view }
    }

    pub fn f32(shape: &[i64]) -> Self {
        Self::new(DiopiDtype::Float32, shape)
    }

    pub fn addr(&self) -> usize {
        self.storage.as_ptr() as usize
    }

    pub fn byte_len(&self) -> usize {
        self.storage.len()
    }
}

/// A non-default stream address for checking propagation
pub fn test_stream() -> StreamHandle {
    StreamHandle::from_raw(0xABC0 as *mut c_void)
}

pub fn count_desc_creates(rt: &RecordingRuntime) -> usize {
    rt.count_calls(|c| matches!(c, AclCall::CreateTensorDesc(_)))
}

pub fn count_desc_destroys(rt: &RecordingRuntime) -> usize {
    rt.count_calls(|c| matches!(c, AclCall::DestroyTensorDesc(_)))
}

pub fn count_buffer_destroys(rt: &RecordingRuntime) -> usize {
    rt.count_calls(|c| matches!(c, AclCall::DestroyDataBuffer(_)))
}

pub fn count_attr_destroys(rt: &RecordingRuntime) -> usize {
    rt.count_calls(|c| matches!(c, AclCall::DestroyAttr(_)))
}

/// Names and values passed to attribute setters, in call order
pub fn attr_calls(rt: &RecordingRuntime) -> Vec<(String, diopi_ascend::AttrValue)> {
    rt.calls()
        .into_iter()
        .filter_map(|call| match call {
            AclCall::SetAttr { name, value, .. } => Some((name, value)),
            _ => None,
        })
        .collect()
}
