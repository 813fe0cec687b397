//! Execution context side of the DIOPI ABI

use crate::acl::StreamHandle;
use crate::error::AscendResult;

/// Source of the accelerator stream an operator is enqueued on
pub trait DiopiContext {
    fn stream(&self) -> AscendResult<StreamHandle>;
}

/// A bare stream acts as its own context
impl DiopiContext for StreamHandle {
    fn stream(&self) -> AscendResult<StreamHandle> {
        Ok(*self)
    }
}

impl<C: DiopiContext + ?Sized> DiopiContext for &C {
    fn stream(&self) -> AscendResult<StreamHandle> {
        (**self).stream()
    }
}
