#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::chunk::{Chunk, ExclusiveChunk};
use crate::error::{ColumnarError, Result};
use crate::kernel::{ArithmeticOp, BitwiseOp, CompareOp, ShiftOp};
use crate::primitive::Primitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Values per chunk. Every chunk but the last is exactly this long. Must be non-zero.
    pub chunk_len: usize,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self { chunk_len: 65_536 }
    }
}

/// The ordered chunks holding one column's values.
///
/// `Clone` is shallow: the clone shares every chunk buffer with the source, and whichever side
/// writes first copies the chunk it touches.
#[derive(Clone, Debug)]
pub struct ColumnContainer<T> {
    chunks: Vec<Chunk<T>>,
    len: usize,
    options: ColumnOptions,
}

impl<T: Primitive> ColumnContainer<T> {
    pub fn new() -> Self {
        Self::with_options(ColumnOptions::default())
    }

    /// An empty container.
    ///
    /// # Panics
    ///
    /// Panics if `options.chunk_len` is zero. Every `*_with_options` constructor goes through
    /// here.
    pub fn with_options(options: ColumnOptions) -> Self {
        assert!(options.chunk_len > 0, "chunk_len must be non-zero");
        Self {
            chunks: Vec::new(),
            len: 0,
            options,
        }
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        Self::from_vec_with_options(values, ColumnOptions::default())
    }

    pub fn from_vec_with_options(values: Vec<T>, options: ColumnOptions) -> Self {
        let mut out = Self::with_options(options);
        if values.len() <= options.chunk_len {
            if !values.is_empty() {
                out.len = values.len();
                out.chunks.push(Chunk::from_vec(values));
            }
            return out;
        }
        for block in values.chunks(options.chunk_len) {
            out.len += block.len();
            out.chunks.push(Chunk::from_vec(block.to_vec()));
        }
        out
    }

    /// Build from optional values; `None` entries become null slots.
    pub fn from_options(values: Vec<Option<T>>) -> Self {
        Self::from_options_with_options(values, ColumnOptions::default())
    }

    pub fn from_options_with_options(values: Vec<Option<T>>, options: ColumnOptions) -> Self {
        let mut out = Self::with_options(options);
        for block in values.chunks(options.chunk_len) {
            let validity: BitVec = block.iter().map(Option::is_some).collect();
            let values = block.iter().map(|v| v.unwrap_or_default()).collect();
            out.len += block.len();
            out.chunks.push(Chunk::from_parts(values, Some(validity)));
        }
        out
    }

    pub fn filled(value: T, len: usize) -> Self {
        Self::filled_with_options(value, len, ColumnOptions::default())
    }

    pub fn filled_with_options(value: T, len: usize, options: ColumnOptions) -> Self {
        Self::from_layout(len, options, |n| (vec![value; n], None))
    }

    /// A column of `len` null slots.
    pub fn nulls(len: usize) -> Self {
        Self::nulls_with_options(len, ColumnOptions::default())
    }

    pub fn nulls_with_options(len: usize, options: ColumnOptions) -> Self {
        Self::from_layout(len, options, |n| {
            (vec![T::default(); n], Some(BitVec::with_len_all_false(n)))
        })
    }

    fn from_layout(
        len: usize,
        options: ColumnOptions,
        mut make: impl FnMut(usize) -> (Vec<T>, Option<BitVec>),
    ) -> Self {
        let mut out = Self::with_options(options);
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(options.chunk_len);
            let (values, validity) = make(n);
            out.chunks.push(Chunk::from_parts(values, validity));
            remaining -= n;
        }
        out.len = len;
        out
    }

    /// A default-valued container with the same chunk layout as `other`.
    pub(crate) fn with_layout_of<U: Primitive>(other: &ColumnContainer<U>) -> Self {
        Self {
            chunks: other
                .chunks
                .iter()
                .map(|c| Chunk::from_vec(vec![T::default(); c.len()]))
                .collect(),
            len: other.len,
            options: other.options,
        }
    }

    pub(crate) fn from_chunks(chunks: Vec<Chunk<T>>, options: ColumnOptions) -> Self {
        let len = chunks.iter().map(Chunk::len).sum();
        Self {
            chunks,
            len,
            options,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn options(&self) -> ColumnOptions {
        self.options
    }

    pub fn null_count(&self) -> usize {
        self.chunks.iter().map(Chunk::null_count).sum()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_lens(&self) -> Vec<usize> {
        self.chunks.iter().map(Chunk::len).collect()
    }

    pub fn chunks(&self) -> &[Chunk<T>] {
        &self.chunks
    }

    pub(crate) fn chunks_mut(&mut self) -> &mut [Chunk<T>] {
        &mut self.chunks
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        (index / self.options.chunk_len, index % self.options.chunk_len)
    }

    /// Value at `index`; `None` for a null slot or an index past the end.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let (chunk, offset) = self.locate(index);
        self.chunks.get(chunk)?.read(offset)
    }

    pub fn set(&mut self, index: usize, value: Option<T>) -> Result<()> {
        if index >= self.len {
            return Err(ColumnarError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let (chunk, offset) = self.locate(index);
        self.chunks[chunk].as_mutable().set(offset, value);
        Ok(())
    }

    pub fn push(&mut self, value: Option<T>) {
        let needs_chunk = self
            .chunks
            .last()
            .map_or(true, |c| c.len() >= self.options.chunk_len);
        if needs_chunk {
            self.chunks.push(Chunk::from_vec(Vec::new()));
        }
        if let Some(last) = self.chunks.last_mut() {
            last.as_mutable().push(value);
        }
        self.len += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
        self.chunks
            .iter()
            .flat_map(|chunk| (0..chunk.len()).map(move |i| chunk.read(i)))
    }

    pub fn to_vec(&self) -> Vec<Option<T>> {
        self.iter().collect()
    }

    /// True when any chunk buffer is aliased with the matching chunk of `other`.
    pub fn shares_chunks_with(&self, other: &ColumnContainer<T>) -> bool {
        self.chunks
            .iter()
            .zip(&other.chunks)
            .any(|(a, b)| a.shares_buffer_with(b))
    }

    /// Fails with `LengthMismatch` unless both containers have the same length and the same
    /// per-chunk lengths.
    pub fn check_layout<U: Primitive>(&self, other: &ColumnContainer<U>) -> Result<()> {
        if self.len != other.len || self.chunks.len() != other.chunks.len() {
            return Err(ColumnarError::LengthMismatch {
                left: self.len,
                right: other.len,
                chunk: None,
            });
        }
        for (idx, (a, b)) in self.chunks.iter().zip(&other.chunks).enumerate() {
            if a.len() != b.len() {
                return Err(ColumnarError::LengthMismatch {
                    left: a.len(),
                    right: b.len(),
                    chunk: Some(idx),
                });
            }
        }
        Ok(())
    }

    /// Pair each chunk with the matching chunk of `other`, converting the left one to
    /// exclusive first. The layout is checked before anything is touched.
    pub fn for_each_chunk_pair<U: Primitive>(
        &mut self,
        other: &ColumnContainer<U>,
        mut f: impl FnMut(ExclusiveChunk<'_, T>, &Chunk<U>),
    ) -> Result<()> {
        self.check_layout(other)?;
        for (chunk, other) in self.chunks.iter_mut().zip(&other.chunks) {
            f(chunk.as_mutable(), other);
        }
        Ok(())
    }

    pub fn for_each_chunk_mut(&mut self, mut f: impl FnMut(ExclusiveChunk<'_, T>)) {
        for chunk in &mut self.chunks {
            f(chunk.as_mutable());
        }
    }

    /// Copy every value into a new container of `U`, keeping the chunk layout and validity.
    ///
    /// Fails with `UnsupportedCast` if a non-null value has no representation in `U`.
    pub fn cast<U: Primitive>(&self) -> Result<ColumnContainer<U>> {
        let unsupported = || ColumnarError::UnsupportedCast {
            from: T::DATA_TYPE,
            to: U::DATA_TYPE,
        };
        let mut chunks = Vec::with_capacity(self.chunks.len());
        for chunk in &self.chunks {
            let mut values = Vec::with_capacity(chunk.len());
            for (idx, value) in chunk.values().iter().enumerate() {
                if chunk.is_valid(idx) {
                    values.push(U::narrow(value.widen()).ok_or_else(unsupported)?);
                } else {
                    values.push(U::default());
                }
            }
            chunks.push(Chunk::from_parts(values, chunk.validity().cloned()));
        }
        Ok(ColumnContainer::from_chunks(chunks, self.options))
    }
}

impl<T: Primitive> Default for ColumnContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Primitive> FromIterator<T> for ColumnContainer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

macro_rules! arithmetic_methods {
    ($($op:ident => $name:ident, $scalar:ident, $reverse:ident;)*) => {
        impl<T: Primitive> ColumnContainer<T> {
            $(
                pub fn $name(&mut self, right: &ColumnContainer<T>) -> Result<()> {
                    T::kernel().arithmetic(ArithmeticOp::$op, self, right)
                }

                pub fn $scalar(&mut self, scalar: T) -> Result<()> {
                    T::kernel().arithmetic_scalar(ArithmeticOp::$op, self, scalar)
                }

                pub fn $reverse(&mut self, scalar: T) -> Result<()> {
                    T::kernel().reverse_arithmetic_scalar(ArithmeticOp::$op, scalar, self)
                }
            )*
        }
    };
}

arithmetic_methods! {
    Add => add, add_scalar, reverse_add_scalar;
    Subtract => subtract, subtract_scalar, reverse_subtract_scalar;
    Multiply => multiply, multiply_scalar, reverse_multiply_scalar;
    Divide => divide, divide_scalar, reverse_divide_scalar;
    Modulo => modulo, modulo_scalar, reverse_modulo_scalar;
}

macro_rules! bitwise_methods {
    ($($op:ident => $name:ident, $scalar:ident, $reverse:ident;)*) => {
        impl<T: Primitive> ColumnContainer<T> {
            $(
                pub fn $name(&mut self, right: &ColumnContainer<T>) -> Result<()> {
                    T::kernel().bitwise(BitwiseOp::$op, self, right)
                }

                pub fn $scalar(&mut self, scalar: T) -> Result<()> {
                    T::kernel().bitwise_scalar(BitwiseOp::$op, self, scalar)
                }

                pub fn $reverse(&mut self, scalar: T) -> Result<()> {
                    T::kernel().reverse_bitwise_scalar(BitwiseOp::$op, scalar, self)
                }
            )*
        }
    };
}

bitwise_methods! {
    And => and, and_scalar, reverse_and_scalar;
    Or => or, or_scalar, reverse_or_scalar;
    Xor => xor, xor_scalar, reverse_xor_scalar;
}

macro_rules! compare_methods {
    ($($op:ident => $name:ident, $scalar:ident;)*) => {
        impl<T: Primitive> ColumnContainer<T> {
            $(
                pub fn $name(
                    &self,
                    right: &ColumnContainer<T>,
                    out: &mut ColumnContainer<bool>,
                ) -> Result<()> {
                    T::kernel().compare(CompareOp::$op, self, right, out)
                }

                pub fn $scalar(&self, scalar: T, out: &mut ColumnContainer<bool>) -> Result<()> {
                    T::kernel().compare_scalar(CompareOp::$op, self, scalar, out)
                }
            )*
        }
    };
}

compare_methods! {
    Equal => elementwise_equals, elementwise_equals_scalar;
    NotEqual => elementwise_not_equals, elementwise_not_equals_scalar;
    GreaterOrEqual => elementwise_greater_than_or_equal, elementwise_greater_than_or_equal_scalar;
    LessOrEqual => elementwise_less_than_or_equal, elementwise_less_than_or_equal_scalar;
    Greater => elementwise_greater_than, elementwise_greater_than_scalar;
    Less => elementwise_less_than, elementwise_less_than_scalar;
}

impl<T: Primitive> ColumnContainer<T> {
    pub fn left_shift(&mut self, amount: i32) -> Result<()> {
        T::kernel().shift(ShiftOp::LeftShift, self, amount)
    }

    pub fn right_shift(&mut self, amount: i32) -> Result<()> {
        T::kernel().shift(ShiftOp::RightShift, self, amount)
    }
}
