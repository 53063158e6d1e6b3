//! Elementwise operation kernels.
//!
//! Each scalar type has one stateless kernel (see [`crate::registry`]). A kernel walks the
//! operands chunk by chunk: the left chunk is converted to exclusive, the paired chunk of the
//! right operand is read in place, and the result is written element by element into the
//! exclusive buffer. Comparisons write into a separate `bool` container instead.
//!
//! Kernels check every precondition (capability, layout, zero divisors) before the first
//! write, so a failed call never leaves an operand half-updated.

#![forbid(unsafe_code)]

mod boolean;
mod character;
mod decimal;
mod float;
mod integer;

pub use self::boolean::BoolKernel;
pub use self::character::CharKernel;
pub use self::decimal::DecimalKernel;
pub use self::float::{FloatKernel, FloatPrimitive};
pub use self::integer::{IntegerKernel, WrappingInteger};

use crate::bitmap::BitVec;
use crate::chunk::Chunk;
use crate::container::ColumnContainer;
use crate::error::{ColumnarError, Result};
use crate::primitive::Primitive;
use crate::types::DataType;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOp {
    pub fn is_commutative(self) -> bool {
        matches!(self, ArithmeticOp::Add | ArithmeticOp::Multiply)
    }

    pub fn divides(self) -> bool {
        matches!(self, ArithmeticOp::Divide | ArithmeticOp::Modulo)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShiftOp {
    LeftShift,
    RightShift,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
}

impl CompareOp {
    pub fn is_equality(self) -> bool {
        matches!(self, CompareOp::Equal | CompareOp::NotEqual)
    }

    pub(crate) fn eval<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            CompareOp::Equal => a == b,
            CompareOp::NotEqual => a != b,
            CompareOp::GreaterOrEqual => a >= b,
            CompareOp::LessOrEqual => a <= b,
            CompareOp::Greater => a > b,
            CompareOp::Less => a < b,
        }
    }
}

/// Every named operation, used for capability queries and error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Xor,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
    Abs,
    Round,
    Sum,
    Product,
    Min,
    Max,
    CumulativeSum,
    CumulativeProduct,
    CumulativeMin,
    CumulativeMax,
    All,
    Any,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Subtract => "subtract",
            Operator::Multiply => "multiply",
            Operator::Divide => "divide",
            Operator::Modulo => "modulo",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Xor => "xor",
            Operator::LeftShift => "left shift",
            Operator::RightShift => "right shift",
            Operator::Equal => "elementwise equals",
            Operator::NotEqual => "elementwise not equals",
            Operator::GreaterOrEqual => "elementwise greater than or equal",
            Operator::LessOrEqual => "elementwise less than or equal",
            Operator::Greater => "elementwise greater than",
            Operator::Less => "elementwise less than",
            Operator::Abs => "abs",
            Operator::Round => "round",
            Operator::Sum => "sum",
            Operator::Product => "product",
            Operator::Min => "min",
            Operator::Max => "max",
            Operator::CumulativeSum => "cumulative sum",
            Operator::CumulativeProduct => "cumulative product",
            Operator::CumulativeMin => "cumulative min",
            Operator::CumulativeMax => "cumulative max",
            Operator::All => "all",
            Operator::Any => "any",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ArithmeticOp> for Operator {
    fn from(op: ArithmeticOp) -> Self {
        match op {
            ArithmeticOp::Add => Operator::Add,
            ArithmeticOp::Subtract => Operator::Subtract,
            ArithmeticOp::Multiply => Operator::Multiply,
            ArithmeticOp::Divide => Operator::Divide,
            ArithmeticOp::Modulo => Operator::Modulo,
        }
    }
}

impl From<BitwiseOp> for Operator {
    fn from(op: BitwiseOp) -> Self {
        match op {
            BitwiseOp::And => Operator::And,
            BitwiseOp::Or => Operator::Or,
            BitwiseOp::Xor => Operator::Xor,
        }
    }
}

impl From<ShiftOp> for Operator {
    fn from(op: ShiftOp) -> Self {
        match op {
            ShiftOp::LeftShift => Operator::LeftShift,
            ShiftOp::RightShift => Operator::RightShift,
        }
    }
}

impl From<CompareOp> for Operator {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Equal => Operator::Equal,
            CompareOp::NotEqual => Operator::NotEqual,
            CompareOp::GreaterOrEqual => Operator::GreaterOrEqual,
            CompareOp::LessOrEqual => Operator::LessOrEqual,
            CompareOp::Greater => Operator::Greater,
            CompareOp::Less => Operator::Less,
        }
    }
}

/// The elementwise operation surface for one scalar type.
///
/// Every method defaults to `UnsupportedOperation`; a kernel overrides the operations its type
/// category defines and reports them through [`Kernel::supports`].
pub trait Kernel<T: Primitive>: Send + Sync {
    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    /// Whether the elementwise operation `op` is defined for this type.
    fn supports(&self, op: Operator) -> bool;

    fn arithmetic(
        &self,
        op: ArithmeticOp,
        _left: &mut ColumnContainer<T>,
        _right: &ColumnContainer<T>,
    ) -> Result<()> {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }

    fn arithmetic_scalar(
        &self,
        op: ArithmeticOp,
        _column: &mut ColumnContainer<T>,
        _scalar: T,
    ) -> Result<()> {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }

    /// `scalar op column`, e.g. `scalar - column` for [`ArithmeticOp::Subtract`].
    fn reverse_arithmetic_scalar(
        &self,
        op: ArithmeticOp,
        _scalar: T,
        _column: &mut ColumnContainer<T>,
    ) -> Result<()> {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }

    fn bitwise(
        &self,
        op: BitwiseOp,
        _left: &mut ColumnContainer<T>,
        _right: &ColumnContainer<T>,
    ) -> Result<()> {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }

    fn bitwise_scalar(
        &self,
        op: BitwiseOp,
        _column: &mut ColumnContainer<T>,
        _scalar: T,
    ) -> Result<()> {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }

    /// And/Or/Xor commute, so the reversed form is the forward form.
    fn reverse_bitwise_scalar(
        &self,
        op: BitwiseOp,
        scalar: T,
        column: &mut ColumnContainer<T>,
    ) -> Result<()> {
        self.bitwise_scalar(op, column, scalar)
    }

    fn shift(&self, op: ShiftOp, _column: &mut ColumnContainer<T>, _amount: i32) -> Result<()> {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }

    /// Compare elementwise into `out`, which is replaced by a container with the left
    /// operand's layout.
    fn compare(
        &self,
        op: CompareOp,
        _left: &ColumnContainer<T>,
        _right: &ColumnContainer<T>,
        _out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }

    fn compare_scalar(
        &self,
        op: CompareOp,
        _left: &ColumnContainer<T>,
        _scalar: T,
        _out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }
}

pub(crate) fn ensure_supported<T: Primitive>(
    kernel: &(impl Kernel<T> + ?Sized),
    op: impl Into<Operator>,
) -> Result<()> {
    let op = op.into();
    if kernel.supports(op) {
        Ok(())
    } else {
        Err(ColumnarError::unsupported(op, T::DATA_TYPE))
    }
}

fn is_valid(validity: Option<&BitVec>, idx: usize) -> bool {
    validity.map_or(true, |v| v.get(idx))
}

fn intersect(a: Option<&BitVec>, b: Option<&BitVec>) -> Option<BitVec> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (Some(a), Some(b)) => {
            let mut out = a.clone();
            out.and_inplace(b);
            Some(out)
        }
    }
}

/// True if any non-null slot of `column` satisfies `pred`.
pub(crate) fn any_valid<T: Primitive>(column: &ColumnContainer<T>, pred: impl Fn(T) -> bool) -> bool {
    column.chunks().iter().any(|chunk| {
        let validity = chunk.validity();
        chunk
            .values()
            .iter()
            .enumerate()
            .any(|(idx, v)| is_valid(validity, idx) && pred(*v))
    })
}

/// `left[i] = f(left[i], right[i])` over slots valid on both sides; the result is null wherever
/// either input is null.
pub(crate) fn zip_in_place<T: Primitive>(
    left: &mut ColumnContainer<T>,
    right: &ColumnContainer<T>,
    f: impl Fn(T, T) -> T,
) -> Result<()> {
    left.for_each_chunk_pair(right, |mut out, other| {
        out.intersect_validity(other.validity());
        let (values, validity) = out.parts_mut();
        let rhs = other.values();
        match validity {
            None => {
                for (l, r) in values.iter_mut().zip(rhs) {
                    *l = f(*l, *r);
                }
            }
            Some(validity) => {
                for (idx, (l, r)) in values.iter_mut().zip(rhs).enumerate() {
                    if validity.get(idx) {
                        *l = f(*l, *r);
                    }
                }
            }
        }
    })
}

/// `column[i] = f(column[i])` over non-null slots.
pub(crate) fn map_in_place<T: Primitive>(column: &mut ColumnContainer<T>, f: impl Fn(T) -> T) {
    column.for_each_chunk_mut(|mut out| {
        let (values, validity) = out.parts_mut();
        match validity {
            None => {
                for v in values.iter_mut() {
                    *v = f(*v);
                }
            }
            Some(validity) => {
                for (idx, v) in values.iter_mut().enumerate() {
                    if validity.get(idx) {
                        *v = f(*v);
                    }
                }
            }
        }
    });
}

/// Fallible form of [`zip_in_place`]: every result is computed into fresh buffers first, and
/// the left chunks are replaced only once all of them succeeded.
pub(crate) fn zip_staged<T: Primitive>(
    left: &mut ColumnContainer<T>,
    right: &ColumnContainer<T>,
    f: impl Fn(T, T) -> Result<T>,
) -> Result<()> {
    left.check_layout(right)?;
    let mut staged = Vec::with_capacity(left.chunk_count());
    for (l, r) in left.chunks().iter().zip(right.chunks()) {
        let validity = intersect(l.validity(), r.validity());
        let mut values = Vec::with_capacity(l.len());
        for (idx, (a, b)) in l.values().iter().zip(r.values()).enumerate() {
            values.push(if is_valid(validity.as_ref(), idx) {
                f(*a, *b)?
            } else {
                *a
            });
        }
        staged.push(Chunk::from_parts(values, validity));
    }
    commit(left, staged);
    Ok(())
}

/// Fallible form of [`map_in_place`], staged like [`zip_staged`].
pub(crate) fn map_staged<T: Primitive>(
    column: &mut ColumnContainer<T>,
    f: impl Fn(T) -> Result<T>,
) -> Result<()> {
    let mut staged = Vec::with_capacity(column.chunk_count());
    for chunk in column.chunks() {
        let validity = chunk.validity();
        let mut values = Vec::with_capacity(chunk.len());
        for (idx, v) in chunk.values().iter().enumerate() {
            values.push(if is_valid(validity, idx) { f(*v)? } else { *v });
        }
        staged.push(Chunk::from_parts(values, validity.cloned()));
    }
    commit(column, staged);
    Ok(())
}

fn commit<T: Primitive>(column: &mut ColumnContainer<T>, staged: Vec<Chunk<T>>) {
    for (slot, chunk) in column.chunks_mut().iter_mut().zip(staged) {
        *slot = chunk;
    }
}

pub(crate) fn compare_columns<T: Primitive>(
    op: CompareOp,
    left: &ColumnContainer<T>,
    right: &ColumnContainer<T>,
    out: &mut ColumnContainer<bool>,
) -> Result<()> {
    left.check_layout(right)?;
    let mut result = ColumnContainer::<bool>::with_layout_of(left);
    for ((l, r), o) in left
        .chunks()
        .iter()
        .zip(right.chunks())
        .zip(result.chunks_mut())
    {
        let mut o = o.as_mutable();
        o.intersect_validity(l.validity());
        o.intersect_validity(r.validity());
        let (bits, _) = o.parts_mut();
        for ((slot, a), b) in bits.iter_mut().zip(l.values()).zip(r.values()) {
            *slot = op.eval(*a, *b);
        }
    }
    *out = result;
    Ok(())
}

pub(crate) fn compare_column_scalar<T: Primitive>(
    op: CompareOp,
    left: &ColumnContainer<T>,
    scalar: T,
    out: &mut ColumnContainer<bool>,
) -> Result<()> {
    let mut result = ColumnContainer::<bool>::with_layout_of(left);
    for (l, o) in left.chunks().iter().zip(result.chunks_mut()) {
        let mut o = o.as_mutable();
        o.intersect_validity(l.validity());
        let (bits, _) = o.parts_mut();
        for (slot, a) in bits.iter_mut().zip(l.values()) {
            *slot = op.eval(*a, scalar);
        }
    }
    *out = result;
    Ok(())
}
