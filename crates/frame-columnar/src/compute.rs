//! Unary computations and reductions over a column. Null slots are skipped.

#![forbid(unsafe_code)]

use crate::chunk::Chunk;
use crate::column::{with_container, Column, ColumnData};
use crate::container::ColumnContainer;
use crate::error::{ColumnarError, Result};
use crate::kernel::{map_in_place, Operator};
use crate::primitive::Primitive;
use crate::types::Scalar;
use rust_decimal::Decimal;

/// Numeric scalar types: the integers, the floats and [`Decimal`].
///
/// Accumulation follows the kernel semantics: integers wrap, floats are IEEE and decimals are
/// checked (`None` on overflow).
pub trait Numeric: Primitive {
    const ZERO: Self;
    const ONE: Self;

    fn accumulate_add(self, rhs: Self) -> Option<Self>;
    fn accumulate_mul(self, rhs: Self) -> Option<Self>;
    fn abs_value(self) -> Self;
    /// Round to the nearest integer, ties to even.
    fn round_value(self) -> Self;
}

macro_rules! signed_numeric {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                const ZERO: Self = 0;
                const ONE: Self = 1;

                fn accumulate_add(self, rhs: Self) -> Option<Self> {
                    Some(self.wrapping_add(rhs))
                }

                fn accumulate_mul(self, rhs: Self) -> Option<Self> {
                    Some(self.wrapping_mul(rhs))
                }

                fn abs_value(self) -> Self {
                    self.wrapping_abs()
                }

                fn round_value(self) -> Self {
                    self
                }
            }
        )*
    };
}

macro_rules! unsigned_numeric {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                const ZERO: Self = 0;
                const ONE: Self = 1;

                fn accumulate_add(self, rhs: Self) -> Option<Self> {
                    Some(self.wrapping_add(rhs))
                }

                fn accumulate_mul(self, rhs: Self) -> Option<Self> {
                    Some(self.wrapping_mul(rhs))
                }

                fn abs_value(self) -> Self {
                    self
                }

                fn round_value(self) -> Self {
                    self
                }
            }
        )*
    };
}

macro_rules! float_numeric {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                const ZERO: Self = 0.0;
                const ONE: Self = 1.0;

                fn accumulate_add(self, rhs: Self) -> Option<Self> {
                    Some(self + rhs)
                }

                fn accumulate_mul(self, rhs: Self) -> Option<Self> {
                    Some(self * rhs)
                }

                fn abs_value(self) -> Self {
                    self.abs()
                }

                fn round_value(self) -> Self {
                    self.round_ties_even()
                }
            }
        )*
    };
}

signed_numeric!(i8, i16, i32, i64);
unsigned_numeric!(u8, u16, u32, u64);
float_numeric!(f32, f64);

impl Numeric for Decimal {
    const ZERO: Self = Decimal::ZERO;
    const ONE: Self = Decimal::ONE;

    fn accumulate_add(self, rhs: Self) -> Option<Self> {
        self.checked_add(rhs)
    }

    fn accumulate_mul(self, rhs: Self) -> Option<Self> {
        self.checked_mul(rhs)
    }

    fn abs_value(self) -> Self {
        self.abs()
    }

    fn round_value(self) -> Self {
        // Banker's rounding.
        self.round()
    }
}

/// Bind the container of a numeric column; bool and char columns evaluate `$other`.
macro_rules! with_numeric {
    ($data:expr, $c:ident => $body:expr, $other:ident => $fallback:expr) => {
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
            $other @ (ColumnData::Bool(_) | ColumnData::Char(_)) => $fallback,
        }
    };
}

fn valid_values<T: Primitive>(column: &ColumnContainer<T>) -> impl Iterator<Item = T> + '_ {
    column.iter().flatten()
}

fn sum_of<T: Numeric>(column: &ColumnContainer<T>) -> Result<Scalar> {
    valid_values(column)
        .try_fold(T::ZERO, T::accumulate_add)
        .map(Primitive::into_scalar)
        .ok_or(ColumnarError::DecimalOverflow { op: Operator::Sum })
}

fn product_of<T: Numeric>(column: &ColumnContainer<T>) -> Result<Scalar> {
    valid_values(column)
        .try_fold(T::ONE, T::accumulate_mul)
        .map(Primitive::into_scalar)
        .ok_or(ColumnarError::DecimalOverflow {
            op: Operator::Product,
        })
}

fn extreme<T: Primitive>(column: &ColumnContainer<T>, keep: fn(&T, &T) -> bool) -> Option<Scalar> {
    valid_values(column)
        .reduce(|acc, v| if keep(&v, &acc) { v } else { acc })
        .map(Primitive::into_scalar)
}

/// Running fold over valid slots, carried across chunk boundaries. Staged: the column is
/// replaced only if every step succeeded.
fn cumulative<T: Primitive>(
    column: &mut ColumnContainer<T>,
    step: impl Fn(T, T) -> Option<T>,
    op: Operator,
) -> Result<()> {
    let mut acc: Option<T> = None;
    let mut staged = Vec::with_capacity(column.chunk_count());
    for chunk in column.chunks() {
        let mut values = Vec::with_capacity(chunk.len());
        for (idx, value) in chunk.values().iter().enumerate() {
            if !chunk.is_valid(idx) {
                values.push(*value);
                continue;
            }
            let next = match acc {
                Some(acc) => step(acc, *value).ok_or(ColumnarError::DecimalOverflow { op })?,
                None => *value,
            };
            acc = Some(next);
            values.push(next);
        }
        staged.push(Chunk::from_parts(values, chunk.validity().cloned()));
    }
    *column = ColumnContainer::from_chunks(staged, column.options());
    Ok(())
}

fn pick_min<T: PartialOrd>(a: T, b: T) -> Option<T> {
    Some(if b < a { b } else { a })
}

fn pick_max<T: PartialOrd>(a: T, b: T) -> Option<T> {
    Some(if b > a { b } else { a })
}

fn unsupported(op: Operator, data: &ColumnData) -> ColumnarError {
    ColumnarError::unsupported(op, data.data_type())
}

fn is_orderable(data: &ColumnData) -> bool {
    !matches!(data, ColumnData::Bool(_))
}

impl Column {
    pub fn abs(&self) -> Result<Column> {
        let mut result = self.clone();
        result.abs_in_place()?;
        Ok(result)
    }

    pub fn abs_in_place(&mut self) -> Result<()> {
        with_numeric!(self.data_mut(), c => {
            map_in_place(c, Numeric::abs_value);
            Ok(())
        }, other => Err(unsupported(Operator::Abs, other)))
    }

    /// Round every value to the nearest integer (ties to even). Integer columns are unchanged.
    pub fn round(&self) -> Result<Column> {
        let mut result = self.clone();
        result.round_in_place()?;
        Ok(result)
    }

    pub fn round_in_place(&mut self) -> Result<()> {
        with_numeric!(self.data_mut(), c => {
            map_in_place(c, Numeric::round_value);
            Ok(())
        }, other => Err(unsupported(Operator::Round, other)))
    }

    /// Sum of the non-null values, typed like the column. An empty column sums to zero.
    pub fn sum(&self) -> Result<Scalar> {
        with_numeric!(self.data(), c => sum_of(c), other => Err(unsupported(Operator::Sum, other)))
    }

    pub fn product(&self) -> Result<Scalar> {
        with_numeric!(self.data(), c => product_of(c), other => {
            Err(unsupported(Operator::Product, other))
        })
    }

    /// Smallest non-null value, or `None` if there is none.
    pub fn min(&self) -> Result<Option<Scalar>> {
        if !is_orderable(self.data()) {
            return Err(unsupported(Operator::Min, self.data()));
        }
        Ok(with_container!(self.data(), c => extreme(c, |v, acc| v < acc)))
    }

    pub fn max(&self) -> Result<Option<Scalar>> {
        if !is_orderable(self.data()) {
            return Err(unsupported(Operator::Max, self.data()));
        }
        Ok(with_container!(self.data(), c => extreme(c, |v, acc| v > acc)))
    }

    pub fn cumulative_sum(&self) -> Result<Column> {
        let mut result = self.clone();
        result.cumulative_sum_in_place()?;
        Ok(result)
    }

    pub fn cumulative_sum_in_place(&mut self) -> Result<()> {
        with_numeric!(self.data_mut(), c => {
            cumulative(c, Numeric::accumulate_add, Operator::CumulativeSum)
        }, other => Err(unsupported(Operator::CumulativeSum, other)))
    }

    pub fn cumulative_product(&self) -> Result<Column> {
        let mut result = self.clone();
        result.cumulative_product_in_place()?;
        Ok(result)
    }

    pub fn cumulative_product_in_place(&mut self) -> Result<()> {
        with_numeric!(self.data_mut(), c => {
            cumulative(c, Numeric::accumulate_mul, Operator::CumulativeProduct)
        }, other => Err(unsupported(Operator::CumulativeProduct, other)))
    }

    pub fn cumulative_min(&self) -> Result<Column> {
        let mut result = self.clone();
        result.cumulative_min_in_place()?;
        Ok(result)
    }

    pub fn cumulative_min_in_place(&mut self) -> Result<()> {
        if !is_orderable(self.data()) {
            return Err(unsupported(Operator::CumulativeMin, self.data()));
        }
        with_container!(self.data_mut(), c => cumulative(c, pick_min, Operator::CumulativeMin))
    }

    pub fn cumulative_max(&self) -> Result<Column> {
        let mut result = self.clone();
        result.cumulative_max_in_place()?;
        Ok(result)
    }

    pub fn cumulative_max_in_place(&mut self) -> Result<()> {
        if !is_orderable(self.data()) {
            return Err(unsupported(Operator::CumulativeMax, self.data()));
        }
        with_container!(self.data_mut(), c => cumulative(c, pick_max, Operator::CumulativeMax))
    }

    /// True if every non-null value is true. Only defined for bool columns.
    pub fn all(&self) -> Result<bool> {
        match self.data() {
            ColumnData::Bool(c) => Ok(valid_values(c).all(|v| v)),
            other => Err(unsupported(Operator::All, other)),
        }
    }

    pub fn any(&self) -> Result<bool> {
        match self.data() {
            ColumnData::Bool(c) => Ok(valid_values(c).any(|v| v)),
            other => Err(unsupported(Operator::Any, other)),
        }
    }
}
