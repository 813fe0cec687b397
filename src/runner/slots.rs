//! Fixed-capacity tensor slot tables

use std::fmt;

use crate::acl::{AclDataType, AclFormat, DataBufferHandle, TensorDescHandle};
use crate::error::{AscendError, AscendResult};

/// Which side of the operator a slot table feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Input,
    Output,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Input => write!(f, "input"),
            SlotKind::Output => write!(f, "output"),
        }
    }
}

/// One filled slot: the ACL handles plus what they were built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSlot {
    pub(crate) desc: TensorDescHandle,
    pub(crate) buffer: DataBufferHandle,
    pub(crate) dtype: AclDataType,
    pub(crate) format: AclFormat,
    pub(crate) dims: Vec<i64>,
    pub(crate) byte_len: usize,
}

impl TensorSlot {
    pub fn desc(&self) -> TensorDescHandle {
        self.desc
    }

    pub fn buffer(&self) -> DataBufferHandle {
        self.buffer
    }

    pub fn dtype(&self) -> AclDataType {
        self.dtype
    }

    pub fn format(&self) -> AclFormat {
        self.format
    }

    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// `N` positional slots, each empty or holding one [`TensorSlot`]
#[derive(Debug)]
pub struct SlotTable<const N: usize> {
    kind: SlotKind,
    slots: [Option<TensorSlot>; N],
}

impl<const N: usize> SlotTable<N> {
    pub fn new(kind: SlotKind) -> Self {
        SlotTable {
            kind,
            slots: std::array::from_fn(|_| None),
        }
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn get(&self, position: usize) -> Option<&TensorSlot> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Pick the slot an add will write: `position` if given and in range,
    /// otherwise the first free one
    pub fn resolve(&self, position: Option<usize>) -> AscendResult<usize> {
        match position {
            Some(position) if position < N => Ok(position),
            Some(position) => Err(AscendError::SlotOutOfRange {
                kind: self.kind,
                position,
                capacity: N,
            }),
            None => self.first_free().ok_or(AscendError::SlotsExhausted {
                kind: self.kind,
                capacity: N,
            }),
        }
    }

    /// Store `slot` at `position`, handing back whatever was there
    pub fn insert(&mut self, position: usize, slot: TensorSlot) -> Option<TensorSlot> {
        self.slots[position].replace(slot)
    }

    /// Number of filled slots anywhere in the table
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Length of the filled prefix, or an error if a filled slot follows a
    /// gap (ACL only receives the prefix)
    pub fn contiguous_len(&self) -> AscendResult<usize> {
        let len = self.first_free().unwrap_or(N);
        if let Some(filled) = self.slots[len..].iter().position(Option::is_some) {
            return Err(AscendError::NonContiguousSlots {
                kind: self.kind,
                empty: len,
                filled: len + filled,
            });
        }
        Ok(len)
    }

    /// Descriptor and buffer handles of the first `len` slots
    pub(crate) fn handles(&self, len: usize) -> (Vec<TensorDescHandle>, Vec<DataBufferHandle>) {
        self.slots[..len]
            .iter()
            .flatten()
            .map(|slot| (slot.desc, slot.buffer))
            .unzip()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TensorSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|slot| (i, slot)))
    }

    /// Empty the table, yielding every filled slot once
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = TensorSlot> + '_ {
        self.slots.iter_mut().filter_map(Option::take)
    }
}
