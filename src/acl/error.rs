//! ACL error types

use thiserror::Error;

/// Errors reported by an [`AclRuntime`](super::AclRuntime) call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AclError {
    #[error("{call} failed with code {code}")]
    CallFailed { call: &'static str, code: i32 },
    #[error("{0} returned a null handle")]
    NullHandle(&'static str),
    #[error("{call}: argument {value:?} contains an interior NUL byte")]
    InvalidCString { call: &'static str, value: String },
}

impl AclError {
    /// Status code carried by the error, if the runtime returned one
    pub fn code(&self) -> Option<i32> {
        match self {
            AclError::CallFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// ACL result type
pub type AclResult<T> = Result<T, AclError>;

/// Map a raw `aclError` status to a result
pub fn check(call: &'static str, code: i32) -> AclResult<()> {
    if code == super::types::ACL_SUCCESS {
        Ok(())
    } else {
        Err(AclError::CallFailed { call, code })
    }
}
