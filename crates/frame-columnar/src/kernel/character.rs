#![forbid(unsafe_code)]

use super::{compare_column_scalar, compare_columns, CompareOp, Kernel, Operator};
use crate::container::ColumnContainer;
use crate::error::Result;

/// `char` columns only compare (by code point).
#[derive(Default)]
pub struct CharKernel;

impl Kernel<char> for CharKernel {
    fn supports(&self, op: Operator) -> bool {
        matches!(
            op,
            Operator::Equal
                | Operator::NotEqual
                | Operator::GreaterOrEqual
                | Operator::LessOrEqual
                | Operator::Greater
                | Operator::Less
        )
    }

    fn compare(
        &self,
        op: CompareOp,
        left: &ColumnContainer<char>,
        right: &ColumnContainer<char>,
        out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        compare_columns(op, left, right, out)
    }

    fn compare_scalar(
        &self,
        op: CompareOp,
        left: &ColumnContainer<char>,
        scalar: char,
        out: &mut ColumnContainer<bool>,
    ) -> Result<()> {
        compare_column_scalar(op, left, scalar, out)
    }
}
