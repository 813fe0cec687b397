//! DIOPI tensor ABI
//!
//! The adapter consumes tensors and contexts through the [`DiopiTensor`] and
//! [`DiopiContext`] traits. With the `ascend` feature, [`TensorHandle`] and
//! [`ContextHandle`] implement them over the real C handles.

mod context;
mod dtype;
mod scalar;
mod tensor;

#[cfg(feature = "ascend")]
mod ffi;
#[cfg(feature = "ascend")]
mod handle;

pub use context::DiopiContext;
pub use dtype::DiopiDtype;
pub use scalar::{DiopiScalar, FromScalar};
pub use tensor::{contiguous_strides, DiopiTensor, TensorView};

#[cfg(feature = "ascend")]
pub use handle::{ContextHandle, TensorHandle};
