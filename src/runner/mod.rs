//! Operator invocation builder
//!
//! [`AclOpRunner`] turns DIOPI tensors and typed attributes into one
//! `aclopCompileAndExecute` call.

mod attr;
mod mapping;
#[allow(clippy::module_inception)]
mod runner;
mod slots;

pub use attr::AttrValue;
pub use mapping::{acl_data_type, acl_format_for_rank, DefaultMapping, TensorMapping};
pub use runner::{AclOpRunner, OpRunner, RunReport, DEFAULT_SLOT_CAPACITY};
pub use slots::{SlotKind, SlotTable, TensorSlot};
