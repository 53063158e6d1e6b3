#![forbid(unsafe_code)]

use super::{
    any_valid, compare_column_scalar, compare_columns, ensure_supported, map_in_place,
    zip_in_place, ArithmeticOp, BitwiseOp, CompareOp, Kernel, Operator, ShiftOp,
};
use crate::container::ColumnContainer;
use crate::error::{ColumnarError, Result};
use crate::primitive::Primitive;
use std::marker::PhantomData;

/// Two's-complement arithmetic shared by the eight integer types.
///
/// Overflow wraps. Division and remainder also wrap (`MIN / -1 == MIN`); a zero divisor is
/// rejected by the kernel before these are called.
pub trait WrappingInteger: Primitive + Ord {
    const ZERO: Self;

    fn add_wrapped(self, rhs: Self) -> Self;
    fn sub_wrapped(self, rhs: Self) -> Self;
    fn mul_wrapped(self, rhs: Self) -> Self;
    fn div_wrapped(self, rhs: Self) -> Self;
    fn rem_wrapped(self, rhs: Self) -> Self;
    fn bit_and(self, rhs: Self) -> Self;
    fn bit_or(self, rhs: Self) -> Self;
    fn bit_xor(self, rhs: Self) -> Self;

    /// Shift in the promoted width (32 bits for 8/16-bit types), then truncate back. The
    /// amount is masked to the promoted width.
    fn shl_promoted(self, amount: i32) -> Self;
    fn shr_promoted(self, amount: i32) -> Self;
}

macro_rules! wrapping_integer {
    ($($ty:ty => $promoted:ty),* $(,)?) => {
        $(
            impl WrappingInteger for $ty {
                const ZERO: Self = 0;

                fn add_wrapped(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                fn sub_wrapped(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                fn mul_wrapped(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                fn div_wrapped(self, rhs: Self) -> Self {
                    self.wrapping_div(rhs)
                }

                fn rem_wrapped(self, rhs: Self) -> Self {
                    self.wrapping_rem(rhs)
                }

                fn bit_and(self, rhs: Self) -> Self {
                    self & rhs
                }

                fn bit_or(self, rhs: Self) -> Self {
                    self | rhs
                }

                fn bit_xor(self, rhs: Self) -> Self {
                    self ^ rhs
                }

                fn shl_promoted(self, amount: i32) -> Self {
                    (self as $promoted).wrapping_shl(amount as u32) as $ty
                }

                fn shr_promoted(self, amount: i32) -> Self {
                    (self as $promoted).wrapping_shr(amount as u32) as $ty
                }
            }
        )*
    };
}

wrapping_integer!(
    u8 => u32,
    i8 => i32,
    i16 => i32,
    u16 => u32,
    i32 => i32,
    u32 => u32,
    i64 => i64,
    u64 => u64,
);

fn binary_fn<T: WrappingInteger>(op: ArithmeticOp) -> fn(T, T) -> T {
    match op {
        ArithmeticOp::Add => T::add_wrapped,
        ArithmeticOp::Subtract => T::sub_wrapped,
        ArithmeticOp::Multiply => T::mul_wrapped,
        ArithmeticOp::Divide => T::div_wrapped,
        ArithmeticOp::Modulo => T::rem_wrapped,
    }
}

fn bitwise_fn<T: WrappingInteger>(op: BitwiseOp) -> fn(T, T) -> T {
    match op {
        BitwiseOp::And => T::bit_and,
        BitwiseOp::Or => T::bit_or,
        BitwiseOp::Xor => T::bit_xor,
    }
}

/// Kernel for the eight integer types: wrapping arithmetic, bitwise ops, shifts and all six
/// comparisons.
pub struct IntegerKernel<T>(PhantomData<fn() -> T>);

impl<T> Default for IntegerKernel<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: WrappingInteger> Kernel<T> for IntegerKernel<T> {
    fn supports(&self, op: Operator) -> bool {
        matches!(
            op,
            Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
                | Operator::Modulo
                | Operator::And
                | Operator::Or
                | Operator::Xor
                | Operator::LeftShift
                | Operator::RightShift
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
        left.check_layout(right)?;
        if op.divides() && any_valid(right, |v| v == T::ZERO) {
            return Err(ColumnarError::DivideByZero);
        }
        zip_in_place(left, right, binary_fn(op))
    }

    fn arithmetic_scalar(
        &self,
        op: ArithmeticOp,
        column: &mut ColumnContainer<T>,
        scalar: T,
    ) -> Result<()> {
        if op.divides() && scalar == T::ZERO {
            return Err(ColumnarError::DivideByZero);
        }
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
        if op.divides() && any_valid(column, |v| v == T::ZERO) {
            return Err(ColumnarError::DivideByZero);
        }
        let f = binary_fn(op);
        map_in_place(column, |v| f(scalar, v));
        Ok(())
    }

    fn bitwise(
        &self,
        op: BitwiseOp,
        left: &mut ColumnContainer<T>,
        right: &ColumnContainer<T>,
    ) -> Result<()> {
        zip_in_place(left, right, bitwise_fn(op))
    }

    fn bitwise_scalar(
        &self,
        op: BitwiseOp,
        column: &mut ColumnContainer<T>,
        scalar: T,
    ) -> Result<()> {
        let f = bitwise_fn(op);
        map_in_place(column, |v| f(v, scalar));
        Ok(())
    }

    fn shift(&self, op: ShiftOp, column: &mut ColumnContainer<T>, amount: i32) -> Result<()> {
        ensure_supported(self, op)?;
        match op {
            ShiftOp::LeftShift => map_in_place(column, |v| v.shl_promoted(amount)),
            ShiftOp::RightShift => map_in_place(column, |v| v.shr_promoted(amount)),
        }
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
