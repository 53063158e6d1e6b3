#![forbid(unsafe_code)]

use super::{
    compare_column_scalar, compare_columns, ensure_supported, map_in_place, zip_in_place,
    BitwiseOp, CompareOp, Kernel, Operator,
};
use crate::container::ColumnContainer;
use crate::error::Result;

/// Logical and/or/xor plus equality. Arithmetic, shifts and ordering are undefined for `bool`.
#[derive(Default)]
pub struct BoolKernel;

fn logical(op: BitwiseOp) -> fn(bool, bool) -> bool {
    match op {
        BitwiseOp::And => |a, b| a & b,
        BitwiseOp::Or => |a, b| a | b,
        BitwiseOp::Xor => |a, b| a ^ b,
    }
}

impl Kernel<bool> for BoolKernel {
    fn supports(&self, op: Operator) -> bool {
        matches!(
            op,
            Operator::And | Operator::Or | Operator::Xor | Operator::Equal | Operator::NotEqual
        )
    }

    fn bitwise(
        &self,
        op: BitwiseOp,
        left: &mut ColumnContainer<bool>,
        right: &ColumnContainer<bool>,
    ) -> Result<()> {
        zip_in_place(left, right, logical(op))
    }

    fn bitwise_scalar(
        &self,
        op: BitwiseOp,
        column: &mut ColumnContainer<bool>,
        scalar: bool,
    ) -> Result<()> {
        let f = logical(op);
        map_in_place(column, |v| f(v, scalar));
        Ok(())
    }

    fn compare(
        &self,
        op: CompareOp,
        left: &ColumnContainer<bool>,
        right: &ColumnContainer<bool>,
        out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        ensure_supported(self, op)?;
        compare_columns(op, left, right, out)
    }

    fn compare_scalar(
        &self,
        op: CompareOp,
        left: &ColumnContainer<bool>,
        scalar: bool,
        out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        ensure_supported(self, op)?;
        compare_column_scalar(op, left, scalar, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColumnarError;
    use crate::kernel::ArithmeticOp;
    use crate::types::DataType;

    #[test]
    fn logical_ops_propagate_nulls() {
        let mut left = ColumnContainer::from_options(vec![Some(true), Some(true), None]);
        let right = ColumnContainer::from_vec(vec![false, true, true]);
        BoolKernel.bitwise(BitwiseOp::Xor, &mut left, &right).unwrap();
        assert_eq!(left.to_vec(), vec![Some(true), Some(false), None]);
    }

    #[test]
    fn ordering_and_arithmetic_are_rejected() {
        let left = ColumnContainer::from_vec(vec![true]);
        let mut out = ColumnContainer::new();
        assert_eq!(
            BoolKernel.compare_scalar(CompareOp::Greater, &left, false, &mut out),
            Err(ColumnarError::UnsupportedOperation {
                op: Operator::Greater,
                data_type: DataType::Bool,
            })
        );
        let mut column = left.clone();
        assert_eq!(
            BoolKernel.arithmetic_scalar(ArithmeticOp::Add, &mut column, true),
            Err(ColumnarError::UnsupportedOperation {
                op: Operator::Add,
                data_type: DataType::Bool,
            })
        );
    }
}
