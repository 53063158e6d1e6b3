#![forbid(unsafe_code)]

use super::{
    compare_column_scalar, compare_columns, map_in_place, zip_in_place, ArithmeticOp, CompareOp,
    Kernel, Operator,
};
use crate::container::ColumnContainer;
use crate::error::Result;
use crate::primitive::Primitive;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Rem, Sub};

/// `f32` and `f64`. Arithmetic is plain IEEE 754: division by zero yields an infinity or NaN,
/// and `%` is the truncated remainder (`fmod`).
pub trait FloatPrimitive:
    Primitive
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
{
}

impl FloatPrimitive for f32 {}
impl FloatPrimitive for f64 {}

fn binary_fn<T: FloatPrimitive>(op: ArithmeticOp) -> fn(T, T) -> T {
    match op {
        ArithmeticOp::Add => |a, b| a + b,
        ArithmeticOp::Subtract => |a, b| a - b,
        ArithmeticOp::Multiply => |a, b| a * b,
        ArithmeticOp::Divide => |a, b| a / b,
        ArithmeticOp::Modulo => |a, b| a % b,
    }
}

pub struct FloatKernel<T>(PhantomData<fn() -> T>);

impl<T> Default for FloatKernel<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: FloatPrimitive> Kernel<T> for FloatKernel<T> {
    fn supports(&self, op: Operator) -> bool {
        matches!(
            op,
            Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
                | Operator::Modulo
                | Operator::Equal
                | Operator::NotEqual
                | Operator::GreaterOrEqual
                | Operator::LessOrEqual
                | Operator::Greater
                | Operator::Less
        )
    }

    fn arithmetic(
        &self,
        op: ArithmeticOp,
        left: &mut ColumnContainer<T>,
        right: &ColumnContainer<T>,
    ) -> Result<()> {
        zip_in_place(left, right, binary_fn(op))
    }

    fn arithmetic_scalar(
        &self,
        op: ArithmeticOp,
        column: &mut ColumnContainer<T>,
        scalar: T,
    ) -> Result<()> {
        let f = binary_fn(op);
        map_in_place(column, |v| f(v, scalar));
        Ok(())
    }

    fn reverse_arithmetic_scalar(
        &self,
        op: ArithmeticOp,
        scalar: T,
        column: &mut ColumnContainer<T>,
    ) -> Result<()> {
        let f = binary_fn(op);
        map_in_place(column, |v| f(scalar, v));
        Ok(())
    }

    fn compare(
        &self,
        op: CompareOp,
        left: &ColumnContainer<T>,
        right: &ColumnContainer<T>,
        out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        compare_columns(op, left, right, out)
    }

    fn compare_scalar(
        &self,
        op: CompareOp,
        left: &ColumnContainer<T>,
        scalar: T,
        out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        compare_column_scalar(op, left, scalar, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColumnarError;
    use crate::kernel::{BitwiseOp, ShiftOp};

    #[test]
    fn division_by_zero_follows_ieee() {
        let kernel = FloatKernel::<f64>::default();
        let mut column = ColumnContainer::from_vec(vec![1.0, -1.0, 0.0]);
        kernel
            .arithmetic_scalar(ArithmeticOp::Divide, &mut column, 0.0)
            .unwrap();
        let values: Vec<f64> = column.iter().flatten().collect();
        assert_eq!(values[0], f64::INFINITY);
        assert_eq!(values[1], f64::NEG_INFINITY);
        assert!(values[2].is_nan());
    }

    #[test]
    fn nan_compares_unequal() {
        let kernel = FloatKernel::<f32>::default();
        let left = ColumnContainer::from_vec(vec![f32::NAN, 1.0]);
        let mut out = ColumnContainer::new();
        kernel
            .compare_scalar(CompareOp::Equal, &left, f32::NAN, &mut out)
            .unwrap();
        assert_eq!(out.to_vec(), vec![Some(false), Some(false)]);
    }

    #[test]
    fn bitwise_and_shift_are_rejected() {
        let kernel = FloatKernel::<f64>::default();
        let mut column = ColumnContainer::from_vec(vec![1.0]);
        assert!(matches!(
            kernel.bitwise_scalar(BitwiseOp::And, &mut column, 1.0),
            Err(ColumnarError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            kernel.shift(ShiftOp::LeftShift, &mut column, 1),
            Err(ColumnarError::UnsupportedOperation { .. })
        ));
    }
}
