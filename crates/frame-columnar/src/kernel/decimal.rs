#![forbid(unsafe_code)]

use super::{
    any_valid, compare_column_scalar, compare_columns, map_staged, zip_staged, ArithmeticOp,
    CompareOp, Kernel, Operator,
};
use crate::container::ColumnContainer;
use crate::error::{ColumnarError, Result};
use rust_decimal::Decimal;

/// Checked decimal arithmetic.
///
/// Results go through staging buffers, so an overflow anywhere in the column leaves it unchanged.
#[derive(Default)]
pub struct DecimalKernel;

fn checked(op: ArithmeticOp, a: Decimal, b: Decimal) -> Result<Decimal> {
    let result = match op {
        ArithmeticOp::Add => a.checked_add(b),
        ArithmeticOp::Subtract => a.checked_sub(b),
        ArithmeticOp::Multiply => a.checked_mul(b),
        ArithmeticOp::Divide => a.checked_div(b),
        ArithmeticOp::Modulo => a.checked_rem(b),
    };
    result.ok_or(ColumnarError::DecimalOverflow { op: op.into() })
}

impl Kernel<Decimal> for DecimalKernel {
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
        left: &mut ColumnContainer<Decimal>,
        right: &ColumnContainer<Decimal>,
    ) -> Result<()> {
        left.check_layout(right)?;
        if op.divides() && any_valid(right, |v| v.is_zero()) {
            return Err(ColumnarError::DivideByZero);
        }
        zip_staged(left, right, |a, b| checked(op, a, b))
    }

    fn arithmetic_scalar(
        &self,
        op: ArithmeticOp,
        column: &mut ColumnContainer<Decimal>,
        scalar: Decimal,
    ) -> Result<()> {
        if op.divides() && scalar.is_zero() {
            return Err(ColumnarError::DivideByZero);
        }
        map_staged(column, |v| checked(op, v, scalar))
    }

    fn reverse_arithmetic_scalar(
        &self,
        op: ArithmeticOp,
        scalar: Decimal,
        column: &mut ColumnContainer<Decimal>,
    ) -> Result<()> {
        if op.divides() && any_valid(column, |v| v.is_zero()) {
            return Err(ColumnarError::DivideByZero);
        }
        map_staged(column, |v| checked(op, scalar, v))
    }

    fn compare(
        &self,
        op: CompareOp,
        left: &ColumnContainer<Decimal>,
        right: &ColumnContainer<Decimal>,
        out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        compare_columns(op, left, right, out)
    }

    fn compare_scalar(
        &self,
        op: CompareOp,
        left: &ColumnContainer<Decimal>,
        scalar: Decimal,
        out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        compare_column_scalar(op, left, scalar, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn overflow_leaves_the_column_unchanged() {
        let kernel = DecimalKernel;
        let mut column = ColumnContainer::from_vec(vec![Decimal::ONE, Decimal::MAX]);
        assert_eq!(
            kernel.arithmetic_scalar(ArithmeticOp::Add, &mut column, Decimal::ONE),
            Err(ColumnarError::DecimalOverflow {
                op: Operator::Add
            })
        );
        assert_eq!(column.to_vec(), vec![Some(Decimal::ONE), Some(Decimal::MAX)]);
    }

    #[test]
    fn division_keeps_fractional_digits() {
        let kernel = DecimalKernel;
        let mut column = ColumnContainer::from_vec(vec![Decimal::from(1), Decimal::from(10)]);
        kernel
            .arithmetic_scalar(ArithmeticOp::Divide, &mut column, Decimal::from(4))
            .unwrap();
        assert_eq!(
            column.to_vec(),
            vec![
                Some(Decimal::from_str("0.25").unwrap()),
                Some(Decimal::from_str("2.5").unwrap())
            ]
        );
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let kernel = DecimalKernel;
        let mut left = ColumnContainer::from_vec(vec![Decimal::ONE, Decimal::TWO]);
        let right = ColumnContainer::from_vec(vec![Decimal::ONE, Decimal::ZERO]);
        assert_eq!(
            kernel.arithmetic(ArithmeticOp::Modulo, &mut left, &right),
            Err(ColumnarError::DivideByZero)
        );
    }
}
