//! diopi-ascend - DIOPI operators on Ascend NPUs
//!
//! Builds ACL operator invocations from DIOPI tensor handles: collect input
//! and output tensors plus typed attributes in an [`AclOpRunner`], then
//! compile and enqueue the named operator on the caller's stream.
//!
//! The vendor runtime is reached through the [`AclRuntime`] trait. Enable
//! the `ascend` feature for the FFI-backed [`acl::NativeAcl`] and the real
//! DIOPI handle wrappers; [`RecordingRuntime`] works on any host.

#![allow(clippy::missing_safety_doc)] // FFI wrappers documented at module level

pub mod acl;
pub mod config;
pub mod diopi;
pub mod error;
pub mod logging;
pub mod runner;

pub use acl::{AclRuntime, RecordingRuntime, StreamHandle};
pub use config::RunnerConfig;
pub use diopi::{DiopiContext, DiopiDtype, DiopiScalar, DiopiTensor, TensorView};
pub use error::{AscendError, AscendResult, ErrorCategory};
pub use runner::{AclOpRunner, AttrValue, OpRunner, RunReport};
