//! Unified error handling for diopi-ascend
//!
//! Errors fall into two categories that callers should treat differently:
//! - Contract violations (programmer error: bad handle, bad slot, unsupported
//!   dtype). Retrying will not help.
//! - Vendor failures (ACL rejected a call or failed to compile/execute).
//!   These carry the runtime's own diagnostic.

use std::fmt;

use crate::acl::AclError;
use crate::runner::SlotKind;

/// Unified error type for diopi-ascend
#[derive(Debug, thiserror::Error)]
pub enum AscendError {
    // ========== Contract violations ==========
    /// A DIOPI handle was null
    #[error("{what} handle should not be null")]
    NullHandle { what: &'static str },

    /// Explicit slot position beyond the table
    #[error("{kind} slot {position} out of range: check 0 <= position < {capacity} failed")]
    SlotOutOfRange {
        kind: SlotKind,
        position: usize,
        capacity: usize,
    },

    /// Every slot of the table is already filled
    #[error("no free {kind} slot: all {capacity} slots are filled")]
    SlotsExhausted { kind: SlotKind, capacity: usize },

    /// A filled slot sits behind an empty one when the operator is run
    #[error("{kind} slots must be filled contiguously from 0: slot {empty} is empty but slot {filled} is filled")]
    NonContiguousSlots {
        kind: SlotKind,
        empty: usize,
        filled: usize,
    },

    /// DIOPI dtype with no ACL counterpart
    #[error("acl does not support {0}")]
    UnsupportedDtype(String),

    /// Tensor metadata that cannot describe real memory
    #[error("invalid tensor: {0}")]
    InvalidTensor(String),

    /// A DIOPI query function returned an error status
    #[error("{call} failed with status {status}")]
    DiopiCall { call: &'static str, status: i32 },

    // ========== Vendor failures ==========
    /// `aclCreateTensorDesc` failed
    #[error("failed to create tensor descriptor for {op}: {source}")]
    DescriptorCreationFailed {
        op: String,
        #[source]
        source: AclError,
    },

    /// `aclCreateDataBuffer` failed
    #[error("failed to create data buffer for {op}: {source}")]
    BufferCreationFailed {
        op: String,
        #[source]
        source: AclError,
    },

    /// `aclopCreateAttr` failed
    #[error("failed to create attribute set for {op}: {source}")]
    AttrCreationFailed {
        op: String,
        #[source]
        source: AclError,
    },

    /// An attribute setter rejected the value
    #[error("failed to set attribute {name} on {op}: {source}")]
    AttrRejected {
        op: String,
        name: String,
        #[source]
        source: AclError,
    },

    /// `aclopCompileAndExecute` did not succeed
    #[error("opname:{op},ins.size:{inputs},outs.size:{outputs}: {message}")]
    ExecutionFailed {
        op: String,
        inputs: usize,
        outputs: usize,
        code: Option<i32>,
        message: String,
    },
}

impl AscendError {
    /// Categorize the error for handling decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            AscendError::NullHandle { .. }
            | AscendError::SlotOutOfRange { .. }
            | AscendError::SlotsExhausted { .. }
            | AscendError::NonContiguousSlots { .. }
            | AscendError::UnsupportedDtype(_)
            | AscendError::InvalidTensor(_)
            | AscendError::DiopiCall { .. } => ErrorCategory::Contract,

            AscendError::DescriptorCreationFailed { .. }
            | AscendError::BufferCreationFailed { .. }
            | AscendError::AttrCreationFailed { .. }
            | AscendError::AttrRejected { .. }
            | AscendError::ExecutionFailed { .. } => ErrorCategory::Vendor,
        }
    }

    /// Programmer error: the same call will fail again
    pub fn is_contract_violation(&self) -> bool {
        matches!(self.category(), ErrorCategory::Contract)
    }

    /// The vendor runtime refused or failed the request
    pub fn is_vendor_failure(&self) -> bool {
        matches!(self.category(), ErrorCategory::Vendor)
    }
}

/// Error category for handling decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Argument contract violated by the caller
    Contract,
    /// ACL reported a failure
    Vendor,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Contract => write!(f, "Contract"),
            ErrorCategory::Vendor => write!(f, "Vendor"),
        }
    }
}

/// Result type using [`AscendError`]
pub type AscendResult<T> = std::result::Result<T, AscendError>;
