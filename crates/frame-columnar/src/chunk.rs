#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::error::{ColumnarError, Result};
use crate::primitive::Primitive;
use std::sync::Arc;

/// Whether a chunk's buffer may be written without copying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// No other chunk references the buffer.
    Exclusive,
    /// The buffer is aliased (e.g. by a shallow column clone) and is read-only.
    Shared,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ChunkBuffer<T> {
    values: Vec<T>,
    /// `None` means every slot is valid.
    validity: Option<BitVec>,
}

/// A fixed-length block of values of one scalar type, plus its validity bits.
///
/// Cloning a chunk is cheap: the clone shares the buffer and both handles become
/// [`Ownership::Shared`]. The only way to write is [`Chunk::as_mutable`], which copies a shared
/// buffer first.
#[derive(Clone, Debug)]
pub struct Chunk<T> {
    buffer: Arc<ChunkBuffer<T>>,
}

impl<T: Primitive> Chunk<T> {
    pub fn from_vec(values: Vec<T>) -> Self {
        Self::from_parts(values, None)
    }

    /// Fails with [`ColumnarError::LengthMismatch`] unless there is one validity bit per value.
    pub fn with_validity(values: Vec<T>, validity: BitVec) -> Result<Self> {
        if values.len() != validity.len() {
            return Err(ColumnarError::LengthMismatch {
                left: values.len(),
                right: validity.len(),
                chunk: None,
            });
        }
        Ok(Self::from_parts(values, Some(validity)))
    }

    pub(crate) fn from_parts(values: Vec<T>, validity: Option<BitVec>) -> Self {
        Self {
            buffer: Arc::new(ChunkBuffer {
                values,
                validity: validity.filter(|v| !v.all_true()),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.values.is_empty()
    }

    /// Value at `index`, or `None` for a null slot or an index past the end.
    pub fn read(&self, index: usize) -> Option<T> {
        let value = *self.buffer.values.get(index)?;
        self.is_valid(index).then_some(value)
    }

    pub fn is_valid(&self, index: usize) -> bool {
        match &self.buffer.validity {
            Some(validity) => index < validity.len() && validity.get(index),
            None => index < self.len(),
        }
    }

    pub fn null_count(&self) -> usize {
        self.buffer
            .validity
            .as_ref()
            .map_or(0, BitVec::count_zeros)
    }

    /// Raw values, including the placeholder stored in null slots.
    pub fn values(&self) -> &[T] {
        &self.buffer.values
    }

    pub fn validity(&self) -> Option<&BitVec> {
        self.buffer.validity.as_ref()
    }

    pub fn ownership(&self) -> Ownership {
        if Arc::strong_count(&self.buffer) == 1 && Arc::weak_count(&self.buffer) == 0 {
            Ownership::Exclusive
        } else {
            Ownership::Shared
        }
    }

    pub fn shares_buffer_with(&self, other: &Chunk<T>) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    /// The single write entry point.
    ///
    /// An exclusive buffer is handed out as is. A shared buffer is copied (values and
    /// validity) and this chunk's reference is replaced by the copy, so later calls reuse it.
    /// The check-and-copy is atomic (`Arc::make_mut`): two handles racing on the same shared
    /// buffer each get their own copy.
    pub fn as_mutable(&mut self) -> ExclusiveChunk<'_, T> {
        if self.ownership() == Ownership::Shared {
            log::trace!(
                "copy-on-write: duplicating shared {} chunk of {} values",
                T::DATA_TYPE,
                self.len()
            );
        }
        ExclusiveChunk {
            buffer: Arc::make_mut(&mut self.buffer),
        }
    }
}

/// Write access to a chunk buffer that no other chunk aliases.
pub struct ExclusiveChunk<'a, T> {
    buffer: &'a mut ChunkBuffer<T>,
}

impl<'a, T: Primitive> ExclusiveChunk<'a, T> {
    pub fn len(&self) -> usize {
        self.buffer.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.buffer.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.buffer.values
    }

    pub fn validity(&self) -> Option<&BitVec> {
        self.buffer.validity.as_ref()
    }

    /// Split borrow used by the kernels: writable values next to the validity bits.
    pub fn parts_mut(&mut self) -> (&mut [T], Option<&BitVec>) {
        (&mut self.buffer.values, self.buffer.validity.as_ref())
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.buffer
            .validity
            .as_ref()
            .map_or(index < self.len(), |v| v.get(index))
    }

    /// Write one slot; `None` marks it null.
    pub fn set(&mut self, index: usize, value: Option<T>) {
        let len = self.len();
        match value {
            Some(value) => {
                self.buffer.values[index] = value;
                if let Some(validity) = &mut self.buffer.validity {
                    validity.set(index, true);
                }
            }
            None => {
                self.buffer.values[index] = T::default();
                self.buffer
                    .validity
                    .get_or_insert_with(|| BitVec::with_len_all_true(len))
                    .set(index, false);
            }
        }
        self.normalize_validity();
    }

    /// Flip a slot's validity without touching its value.
    pub fn set_valid(&mut self, index: usize, valid: bool) {
        let len = self.len();
        self.buffer
            .validity
            .get_or_insert_with(|| BitVec::with_len_all_true(len))
            .set(index, valid);
        self.normalize_validity();
    }

    pub fn push(&mut self, value: Option<T>) {
        let len = self.len();
        self.buffer.values.push(value.unwrap_or_default());
        match (&mut self.buffer.validity, value.is_some()) {
            (Some(validity), valid) => validity.push(valid),
            (None, true) => {}
            (None, false) => {
                let mut validity = BitVec::with_len_all_true(len);
                validity.push(false);
                self.buffer.validity = Some(validity);
            }
        }
    }

    /// Null out every slot that is null in `other`.
    pub fn intersect_validity(&mut self, other: Option<&BitVec>) {
        let Some(other) = other else {
            return;
        };
        match &mut self.buffer.validity {
            Some(validity) => validity.and_inplace(other),
            None => self.buffer.validity = Some(other.clone()),
        }
        self.normalize_validity();
    }

    fn normalize_validity(&mut self) {
        if self.buffer.validity.as_ref().is_some_and(BitVec::all_true) {
            self.buffer.validity = None;
        }
    }
}
