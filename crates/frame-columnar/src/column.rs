#![forbid(unsafe_code)]

use crate::container::{ColumnContainer, ColumnOptions};
use crate::error::{ColumnarError, Result};
use crate::kernel::{any_valid, ArithmeticOp, BitwiseOp, CompareOp, Operator, ShiftOp};
use crate::primitive::Primitive;
use crate::promote::{self, promote};
use crate::registry::{self, with_data_type};
use crate::types::{DataType, Scalar};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_COLUMN_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a column's container.
///
/// In-place operations keep the id; anything that produces a new container (a non in-place
/// operation, a promotion, a clone) gets a fresh one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(u64);

impl ColumnId {
    fn next() -> Self {
        ColumnId(NEXT_COLUMN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A typed container of one of the thirteen supported scalar types.
#[derive(Clone, Debug)]
pub enum ColumnData {
    UInt8(ColumnContainer<u8>),
    Int8(ColumnContainer<i8>),
    Int16(ColumnContainer<i16>),
    UInt16(ColumnContainer<u16>),
    Int32(ColumnContainer<i32>),
    UInt32(ColumnContainer<u32>),
    Int64(ColumnContainer<i64>),
    UInt64(ColumnContainer<u64>),
    Float32(ColumnContainer<f32>),
    Float64(ColumnContainer<f64>),
    Decimal(ColumnContainer<Decimal>),
    Bool(ColumnContainer<bool>),
    Char(ColumnContainer<char>),
}

/// Bind the typed container inside a `ColumnData` (or `&ColumnData`, `&mut ColumnData`).
macro_rules! with_container {
    ($data:expr, $c:ident => $body:expr) => {
        match $data {
            ColumnData::UInt8($c) => $body,
            ColumnData::Int8($c) => $body,
            ColumnData::Int16($c) => $body,
            ColumnData::UInt16($c) => $body,
            ColumnData::Int32($c) => $body,
            ColumnData::UInt32($c) => $body,
            ColumnData::Int64($c) => $body,
            ColumnData::UInt64($c) => $body,
            ColumnData::Float32($c) => $body,
            ColumnData::Float64($c) => $body,
            ColumnData::Decimal($c) => $body,
            ColumnData::Bool($c) => $body,
            ColumnData::Char($c) => $body,
        }
    };
}

/// Bind two containers of the same type; `$fallback` runs when the variants differ.
macro_rules! with_pair {
    ($left:expr, $right:expr, $l:ident, $r:ident => $body:expr, _ => $fallback:expr) => {
        match ($left, $right) {
            (ColumnData::UInt8($l), ColumnData::UInt8($r)) => $body,
            (ColumnData::Int8($l), ColumnData::Int8($r)) => $body,
            (ColumnData::Int16($l), ColumnData::Int16($r)) => $body,
            (ColumnData::UInt16($l), ColumnData::UInt16($r)) => $body,
            (ColumnData::Int32($l), ColumnData::Int32($r)) => $body,
            (ColumnData::UInt32($l), ColumnData::UInt32($r)) => $body,
            (ColumnData::Int64($l), ColumnData::Int64($r)) => $body,
            (ColumnData::UInt64($l), ColumnData::UInt64($r)) => $body,
            (ColumnData::Float32($l), ColumnData::Float32($r)) => $body,
            (ColumnData::Float64($l), ColumnData::Float64($r)) => $body,
            (ColumnData::Decimal($l), ColumnData::Decimal($r)) => $body,
            (ColumnData::Bool($l), ColumnData::Bool($r)) => $body,
            (ColumnData::Char($l), ColumnData::Char($r)) => $body,
            _ => $fallback,
        }
    };
}

/// Bind the primitive value inside a [`Scalar`].
macro_rules! with_scalar {
    ($scalar:expr, $v:ident => $body:expr) => {
        match $scalar {
            Scalar::UInt8($v) => $body,
            Scalar::Int8($v) => $body,
            Scalar::Int16($v) => $body,
            Scalar::UInt16($v) => $body,
            Scalar::Int32($v) => $body,
            Scalar::UInt32($v) => $body,
            Scalar::Int64($v) => $body,
            Scalar::UInt64($v) => $body,
            Scalar::Float32($v) => $body,
            Scalar::Float64($v) => $body,
            Scalar::Decimal($v) => $body,
            Scalar::Bool($v) => $body,
            Scalar::Char($v) => $body,
        }
    };
}

pub(crate) use with_container;

impl ColumnData {
    pub fn data_type(&self) -> DataType {
        with_container!(self, c => container_type(c))
    }

    pub fn len(&self) -> usize {
        with_container!(self, c => c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        with_container!(self, c => c.null_count())
    }

    pub fn chunk_lens(&self) -> Vec<usize> {
        with_container!(self, c => c.chunk_lens())
    }

    pub fn options(&self) -> ColumnOptions {
        with_container!(self, c => c.options())
    }
}

fn container_type<T: Primitive>(_: &ColumnContainer<T>) -> DataType {
    T::DATA_TYPE
}

/// An arithmetic or bitwise binary operator, as accepted by [`Column::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Xor,
}

#[derive(Clone, Copy)]
enum BinaryKind {
    Arithmetic(ArithmeticOp),
    Bitwise(BitwiseOp),
}

impl BinaryOp {
    fn kind(self) -> BinaryKind {
        match self {
            BinaryOp::Add => BinaryKind::Arithmetic(ArithmeticOp::Add),
            BinaryOp::Subtract => BinaryKind::Arithmetic(ArithmeticOp::Subtract),
            BinaryOp::Multiply => BinaryKind::Arithmetic(ArithmeticOp::Multiply),
            BinaryOp::Divide => BinaryKind::Arithmetic(ArithmeticOp::Divide),
            BinaryOp::Modulo => BinaryKind::Arithmetic(ArithmeticOp::Modulo),
            BinaryOp::And => BinaryKind::Bitwise(BitwiseOp::And),
            BinaryOp::Or => BinaryKind::Bitwise(BitwiseOp::Or),
            BinaryOp::Xor => BinaryKind::Bitwise(BitwiseOp::Xor),
        }
    }

    pub fn operator(self) -> Operator {
        match self.kind() {
            BinaryKind::Arithmetic(op) => op.into(),
            BinaryKind::Bitwise(op) => op.into(),
        }
    }

    fn divides(self) -> bool {
        matches!(self, BinaryOp::Divide | BinaryOp::Modulo)
    }
}

/// Right-hand side of a column operation.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
    Column(&'a Column),
    Scalar(Scalar),
}

impl<'a> From<&'a Column> for Operand<'a> {
    fn from(column: &'a Column) -> Self {
        Operand::Column(column)
    }
}

impl From<Scalar> for Operand<'_> {
    fn from(scalar: Scalar) -> Self {
        Operand::Scalar(scalar)
    }
}

macro_rules! operand_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand<'_> {
                fn from(value: $ty) -> Self {
                    Operand::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

operand_from!(u8, i8, i16, u16, i32, u32, i64, u64, f32, f64, Decimal, bool, char);

/// A dynamically typed column: a [`ColumnData`] plus its [`ColumnId`].
///
/// Binary operations promote mixed operand types through [`promote`] and broadcast scalars.
/// Each `op` method returns a new column; each `op_in_place` method mutates `self`, keeping
/// its id unless the result type differs from the column's type.
#[derive(Debug)]
pub struct Column {
    id: ColumnId,
    data: ColumnData,
}

/// A shallow copy: the clone gets a new id and shares every chunk until one side writes.
impl Clone for Column {
    fn clone(&self) -> Self {
        Column {
            id: ColumnId::next(),
            data: self.data.clone(),
        }
    }
}

impl<T: Primitive> From<ColumnContainer<T>> for Column {
    fn from(container: ColumnContainer<T>) -> Self {
        Column::from_container(container)
    }
}

impl Column {
    pub fn from_container<T: Primitive>(container: ColumnContainer<T>) -> Self {
        Self::from_data(T::into_column_data(container))
    }

    pub fn from_data(data: ColumnData) -> Self {
        Column {
            id: ColumnId::next(),
            data,
        }
    }

    pub fn from_vec<T: Primitive>(values: Vec<T>) -> Self {
        Self::from_container(ColumnContainer::from_vec(values))
    }

    pub fn from_options<T: Primitive>(values: Vec<Option<T>>) -> Self {
        Self::from_container(ColumnContainer::from_options(values))
    }

    /// `len` copies of `value`, typed after the scalar.
    pub fn filled(value: Scalar, len: usize) -> Self {
        Self::filled_with_options(value, len, ColumnOptions::default())
    }

    pub fn filled_with_options(value: Scalar, len: usize, options: ColumnOptions) -> Self {
        with_scalar!(value, v => {
            Self::from_container(ColumnContainer::filled_with_options(v, len, options))
        })
    }

    /// A column of `len` nulls.
    pub fn nulls(data_type: DataType, len: usize) -> Self {
        Self::nulls_with_options(data_type, len, ColumnOptions::default())
    }

    pub fn nulls_with_options(data_type: DataType, len: usize, options: ColumnOptions) -> Self {
        with_data_type!(data_type, T => {
            Self::from_container(ColumnContainer::<T>::nulls_with_options(len, options))
        })
    }

    /// An all-null column whose type is given by name (`"int32"`, `"double"`, `"decimal"`, ...).
    pub fn with_type_name(type_name: &str, len: usize) -> Result<Self> {
        let data_type: DataType = type_name.parse()?;
        Ok(Self::nulls(data_type, len))
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut ColumnData {
        &mut self.data
    }

    pub fn into_data(self) -> ColumnData {
        self.data
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    pub fn chunk_lens(&self) -> Vec<usize> {
        self.data.chunk_lens()
    }

    pub fn as_container<T: Primitive>(&self) -> Option<&ColumnContainer<T>> {
        T::container(&self.data)
    }

    pub fn as_container_mut<T: Primitive>(&mut self) -> Option<&mut ColumnContainer<T>> {
        T::container_mut(&mut self.data)
    }

    /// `None` for a null slot or an index past the end.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        with_container!(&self.data, c => c.get(index).map(Primitive::into_scalar))
    }

    /// Write one slot; `None` makes it null. The scalar must have the column's exact type.
    pub fn set(&mut self, index: usize, value: Option<Scalar>) -> Result<()> {
        with_container!(&mut self.data, c => set_slot(c, index, value))
    }

    pub fn to_scalars(&self) -> Vec<Option<Scalar>> {
        with_container!(&self.data, c => c.iter().map(|v| v.map(Primitive::into_scalar)).collect())
    }

    /// Copy into a new column of `target`, keeping the chunk layout and nulls.
    pub fn cast(&self, target: DataType) -> Result<Column> {
        if self.data_type() == target {
            return Ok(self.clone());
        }
        with_container!(&self.data, c => {
            with_data_type!(target, U => c.cast::<U>().map(Column::from_container))
        })
    }

    /// Whether any chunk of `self` aliases a chunk of `other`.
    pub fn shares_chunks_with(&self, other: &Column) -> bool {
        with_pair!(
            &self.data, &other.data, l, r => l.shares_chunks_with(r),
            _ => false
        )
    }

    /// Fails with `LengthMismatch` unless both columns have the same chunk layout.
    pub fn check_layout(&self, other: &Column) -> Result<()> {
        let (left, right) = (self.chunk_lens(), other.chunk_lens());
        if self.len() != other.len() || left.len() != right.len() {
            return Err(ColumnarError::LengthMismatch {
                left: self.len(),
                right: other.len(),
                chunk: None,
            });
        }
        match left.iter().zip(&right).position(|(a, b)| a != b) {
            Some(idx) => Err(ColumnarError::LengthMismatch {
                left: left[idx],
                right: right[idx],
                chunk: Some(idx),
            }),
            None => Ok(()),
        }
    }

    /// True if some non-null slot holds zero.
    pub(crate) fn has_zero(&self) -> bool {
        with_container!(&self.data, c => any_valid(c, |v| v.into_scalar().is_zero()))
    }

    /// Run every precondition of `self op rhs` without touching any buffer: layout, promotion,
    /// operator support for the result type and zero divisors.
    pub fn check<'a>(&self, op: BinaryOp, rhs: impl Into<Operand<'a>>) -> Result<()> {
        self.plan(op, rhs.into(), false).map(|_| ())
    }

    /// [`Column::check`] for `scalar op self`.
    pub fn check_reverse(&self, op: BinaryOp, scalar: impl Into<Scalar>) -> Result<()> {
        self.plan(op, Operand::Scalar(scalar.into()), true)
            .map(|_| ())
    }

    fn plan(&self, op: BinaryOp, rhs: Operand<'_>, reverse: bool) -> Result<DataType> {
        let rhs_type = match rhs {
            Operand::Column(column) => {
                self.check_layout(column)?;
                column.data_type()
            }
            Operand::Scalar(scalar) => scalar.data_type(),
        };
        let target = promote(self.data_type(), rhs_type)?;
        let operator = op.operator();
        if !registry::supports(target, operator) {
            return Err(ColumnarError::unsupported(operator, target));
        }
        if op.divides() && (target.is_integer() || target == DataType::Decimal) {
            let zero_divisor = match (rhs, reverse) {
                (Operand::Column(column), _) => column.has_zero(),
                (Operand::Scalar(scalar), false) => scalar.is_zero(),
                (Operand::Scalar(_), true) => self.has_zero(),
            };
            if zero_divisor {
                return Err(ColumnarError::DivideByZero);
            }
        }
        Ok(target)
    }

    /// `self op rhs` into a new column.
    pub fn apply<'a>(&self, op: BinaryOp, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        let mut result = self.clone();
        result.apply_in_place(op, rhs)?;
        Ok(result)
    }

    /// `self = self op rhs`.
    pub fn apply_in_place<'a>(&mut self, op: BinaryOp, rhs: impl Into<Operand<'a>>) -> Result<()> {
        let rhs = rhs.into();
        let target = self.plan(op, rhs, false)?;
        match rhs {
            Operand::Column(column) => {
                let column = promote::widen(column, target)?;
                self.update(target, |data| binary(op, data, &column.data))
            }
            Operand::Scalar(scalar) => {
                let scalar = scalar.cast(target)?;
                self.update(target, |data| {
                    with_container!(data, c => binary_scalar(op, c, scalar, false))
                })
            }
        }
    }

    /// `scalar op self` into a new column.
    pub fn reverse_apply(&self, op: BinaryOp, scalar: impl Into<Scalar>) -> Result<Column> {
        let mut result = self.clone();
        result.reverse_apply_in_place(op, scalar)?;
        Ok(result)
    }

    /// `self = scalar op self`.
    pub fn reverse_apply_in_place(&mut self, op: BinaryOp, scalar: impl Into<Scalar>) -> Result<()> {
        let scalar = scalar.into();
        let target = self.plan(op, Operand::Scalar(scalar), true)?;
        let scalar = scalar.cast(target)?;
        self.update(target, |data| {
            with_container!(data, c => binary_scalar(op, c, scalar, true))
        })
    }

    /// Run `f` on this column's data, or on a promoted copy that then replaces `self`.
    fn update(
        &mut self,
        target: DataType,
        f: impl FnOnce(&mut ColumnData) -> Result<()>,
    ) -> Result<()> {
        if self.data_type() == target {
            return f(&mut self.data);
        }
        let mut promoted = self.cast(target)?;
        log::debug!(
            "column {} promoted from {} to {}",
            self.id.get(),
            self.data_type(),
            target
        );
        f(&mut promoted.data)?;
        *self = promoted;
        Ok(())
    }

    /// Take over the data of `result`, computed from this column out of place. A result of the
    /// same type keeps this column's id; a promoted result replaces the column.
    pub(crate) fn commit(&mut self, result: Column) {
        if result.data_type() == self.data_type() {
            self.data = result.data;
        } else {
            *self = result;
        }
    }

    pub fn shift(&self, op: ShiftOp, amount: i32) -> Result<Column> {
        let mut result = self.clone();
        result.shift_in_place(op, amount)?;
        Ok(result)
    }

    pub fn shift_in_place(&mut self, op: ShiftOp, amount: i32) -> Result<()> {
        with_container!(&mut self.data, c => match op {
            ShiftOp::LeftShift => c.left_shift(amount),
            ShiftOp::RightShift => c.right_shift(amount),
        })
    }

    pub fn left_shift(&self, amount: i32) -> Result<Column> {
        self.shift(ShiftOp::LeftShift, amount)
    }

    pub fn left_shift_in_place(&mut self, amount: i32) -> Result<()> {
        self.shift_in_place(ShiftOp::LeftShift, amount)
    }

    pub fn right_shift(&self, amount: i32) -> Result<Column> {
        self.shift(ShiftOp::RightShift, amount)
    }

    pub fn right_shift_in_place(&mut self, amount: i32) -> Result<()> {
        self.shift_in_place(ShiftOp::RightShift, amount)
    }

    /// Elementwise comparison into a new `bool` column. Mixed types are promoted first; a
    /// null on either side gives a null result.
    pub fn compare<'a>(&self, op: CompareOp, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        match rhs.into() {
            Operand::Column(column) => {
                self.check_layout(column)?;
                let target = self.check_compare(op, column.data_type())?;
                let left = promote::widen(self, target)?;
                let right = promote::widen(column, target)?;
                with_pair!(
                    &left.data, &right.data, l, r => compare_typed(op, l, r),
                    _ => Err(ColumnarError::UnsupportedPromotion {
                        left: self.data_type(),
                        right: column.data_type(),
                    })
                )
            }
            Operand::Scalar(scalar) => {
                let target = self.check_compare(op, scalar.data_type())?;
                let left = promote::widen(self, target)?;
                let scalar = scalar.cast(target)?;
                with_container!(&left.data, c => compare_scalar_typed(op, c, scalar))
            }
        }
    }

    fn check_compare(&self, op: CompareOp, rhs_type: DataType) -> Result<DataType> {
        let target = promote(self.data_type(), rhs_type)?;
        if !registry::supports(target, op.into()) {
            return Err(ColumnarError::unsupported(op, target));
        }
        Ok(target)
    }
}

fn set_slot<T: Primitive>(
    container: &mut ColumnContainer<T>,
    index: usize,
    value: Option<Scalar>,
) -> Result<()> {
    let value = match value {
        Some(scalar) => Some(T::from_scalar(scalar).ok_or(ColumnarError::ScalarTypeMismatch {
            expected: T::DATA_TYPE,
            actual: scalar.data_type(),
        })?),
        None => None,
    };
    container.set(index, value)
}

fn binary(op: BinaryOp, left: &mut ColumnData, right: &ColumnData) -> Result<()> {
    let (left_type, right_type) = (left.data_type(), right.data_type());
    with_pair!(
        left, right, l, r => binary_typed(op, l, r),
        _ => Err(ColumnarError::UnsupportedPromotion {
            left: left_type,
            right: right_type,
        })
    )
}

fn binary_typed<T: Primitive>(
    op: BinaryOp,
    left: &mut ColumnContainer<T>,
    right: &ColumnContainer<T>,
) -> Result<()> {
    let kernel = T::kernel();
    match op.kind() {
        BinaryKind::Arithmetic(op) => kernel.arithmetic(op, left, right),
        BinaryKind::Bitwise(op) => kernel.bitwise(op, left, right),
    }
}

fn binary_scalar<T: Primitive>(
    op: BinaryOp,
    column: &mut ColumnContainer<T>,
    scalar: Scalar,
    reverse: bool,
) -> Result<()> {
    let scalar = T::from_scalar(scalar).ok_or(ColumnarError::ScalarTypeMismatch {
        expected: T::DATA_TYPE,
        actual: scalar.data_type(),
    })?;
    let kernel = T::kernel();
    match (op.kind(), reverse) {
        (BinaryKind::Arithmetic(op), false) => kernel.arithmetic_scalar(op, column, scalar),
        (BinaryKind::Arithmetic(op), true) => kernel.reverse_arithmetic_scalar(op, scalar, column),
        (BinaryKind::Bitwise(op), false) => kernel.bitwise_scalar(op, column, scalar),
        (BinaryKind::Bitwise(op), true) => kernel.reverse_bitwise_scalar(op, scalar, column),
    }
}

fn compare_typed<T: Primitive>(
    op: CompareOp,
    left: &ColumnContainer<T>,
    right: &ColumnContainer<T>,
) -> Result<Column> {
    let mut out = ColumnContainer::new();
    T::kernel().compare(op, left, right, &mut out)?;
    Ok(Column::from_container(out))
}

fn compare_scalar_typed<T: Primitive>(
    op: CompareOp,
    left: &ColumnContainer<T>,
    scalar: Scalar,
) -> Result<Column> {
    let scalar = T::from_scalar(scalar).ok_or(ColumnarError::ScalarTypeMismatch {
        expected: T::DATA_TYPE,
        actual: scalar.data_type(),
    })?;
    let mut out = ColumnContainer::new();
    T::kernel().compare_scalar(op, left, scalar, &mut out)?;
    Ok(Column::from_container(out))
}

macro_rules! binary_methods {
    ($($op:ident => $name:ident, $in_place:ident, $reverse:ident, $reverse_in_place:ident;)*) => {
        impl Column {
            $(
                pub fn $name<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
                    self.apply(BinaryOp::$op, rhs)
                }

                pub fn $in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<()> {
                    self.apply_in_place(BinaryOp::$op, rhs)
                }

                pub fn $reverse(&self, scalar: impl Into<Scalar>) -> Result<Column> {
                    self.reverse_apply(BinaryOp::$op, scalar)
                }

                pub fn $reverse_in_place(&mut self, scalar: impl Into<Scalar>) -> Result<()> {
                    self.reverse_apply_in_place(BinaryOp::$op, scalar)
                }
            )*
        }
    };
}

binary_methods! {
    Add => add, add_in_place, reverse_add, reverse_add_in_place;
    Subtract => subtract, subtract_in_place, reverse_subtract, reverse_subtract_in_place;
    Multiply => multiply, multiply_in_place, reverse_multiply, reverse_multiply_in_place;
    Divide => divide, divide_in_place, reverse_divide, reverse_divide_in_place;
    Modulo => modulo, modulo_in_place, reverse_modulo, reverse_modulo_in_place;
    And => and, and_in_place, reverse_and, reverse_and_in_place;
    Or => or, or_in_place, reverse_or, reverse_or_in_place;
    Xor => xor, xor_in_place, reverse_xor, reverse_xor_in_place;
}

macro_rules! compare_methods {
    ($($op:ident => $name:ident;)*) => {
        impl Column {
            $(
                pub fn $name<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
                    self.compare(CompareOp::$op, rhs)
                }
            )*
        }
    };
}

compare_methods! {
    Equal => elementwise_equals;
    NotEqual => elementwise_not_equals;
    GreaterOrEqual => elementwise_greater_than_or_equal;
    LessOrEqual => elementwise_less_than_or_equal;
    Greater => elementwise_greater_than;
    Less => elementwise_less_than;
}
