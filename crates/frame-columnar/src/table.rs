#![forbid(unsafe_code)]

use crate::column::{BinaryOp, Column, Operand};
use crate::error::{ColumnarError, Result};
use crate::kernel::{CompareOp, ShiftOp};
use crate::types::Scalar;

/// Ordered, uniquely named columns of equal length.
///
/// Operations broadcast over the columns either with one scalar for every column or with one
/// scalar per column. In-place forms compute every column before the first one is written.
#[derive(Clone, Debug, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self> {
        let mut table = Table::default();
        for (name, column) in columns {
            table.add_column(name, column)?;
        }
        Ok(table)
    }

    /// Append a column. The first column fixes the row count.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(ColumnarError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && column.len() != self.rows {
            return Err(ColumnarError::LengthMismatch {
                left: self.rows,
                right: column.len(),
                chunk: None,
            });
        }
        self.rows = column.len();
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.columns.get(idx)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    fn with_columns(&self, columns: Vec<Column>) -> Table {
        Table {
            names: self.names.clone(),
            columns,
            rows: self.rows,
        }
    }

    fn commit(&mut self, staged: Vec<Column>) {
        for (column, result) in self.columns.iter_mut().zip(staged) {
            column.commit(result);
        }
    }

    fn check_arity(&self, values: &[Scalar]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(ColumnarError::ArgumentCountMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        Ok(())
    }

    /// `column[i] op values[i]` for every column.
    pub fn apply_each(&self, op: BinaryOp, values: &[Scalar]) -> Result<Table> {
        self.check_arity(values)?;
        let columns = self
            .columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.apply(op, *value))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_columns(columns))
    }

    /// Every column is computed out of place first, so a failure in any column (including a
    /// decimal overflow) leaves the whole table unchanged.
    pub fn apply_each_in_place(&mut self, op: BinaryOp, values: &[Scalar]) -> Result<()> {
        self.check_arity(values)?;
        for (column, value) in self.columns.iter().zip(values) {
            column.check(op, Operand::Scalar(*value))?;
        }
        let staged = self
            .columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.apply(op, *value))
            .collect::<Result<Vec<_>>>()?;
        self.commit(staged);
        Ok(())
    }

    /// `column op value` for every column.
    pub fn apply_scalar(&self, op: BinaryOp, value: impl Into<Scalar>) -> Result<Table> {
        let values = vec![value.into(); self.columns.len()];
        self.apply_each(op, &values)
    }

    pub fn apply_scalar_in_place(&mut self, op: BinaryOp, value: impl Into<Scalar>) -> Result<()> {
        let values = vec![value.into(); self.columns.len()];
        self.apply_each_in_place(op, &values)
    }

    /// `values[i] op column[i]` for every column.
    pub fn reverse_apply_each(&self, op: BinaryOp, values: &[Scalar]) -> Result<Table> {
        self.check_arity(values)?;
        let columns = self
            .columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.reverse_apply(op, *value))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_columns(columns))
    }

    pub fn reverse_apply_each_in_place(&mut self, op: BinaryOp, values: &[Scalar]) -> Result<()> {
        self.check_arity(values)?;
        for (column, value) in self.columns.iter().zip(values) {
            column.check_reverse(op, *value)?;
        }
        let staged = self
            .columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.reverse_apply(op, *value))
            .collect::<Result<Vec<_>>>()?;
        self.commit(staged);
        Ok(())
    }

    pub fn reverse_apply_scalar(&self, op: BinaryOp, value: impl Into<Scalar>) -> Result<Table> {
        let values = vec![value.into(); self.columns.len()];
        self.reverse_apply_each(op, &values)
    }

    pub fn reverse_apply_scalar_in_place(
        &mut self,
        op: BinaryOp,
        value: impl Into<Scalar>,
    ) -> Result<()> {
        let values = vec![value.into(); self.columns.len()];
        self.reverse_apply_each_in_place(op, &values)
    }

    /// Elementwise comparison of column *i* against `values[i]`; a table of `bool` columns.
    pub fn compare_each(&self, op: CompareOp, values: &[Scalar]) -> Result<Table> {
        self.check_arity(values)?;
        let columns = self
            .columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.compare(op, *value))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_columns(columns))
    }

    pub fn compare_scalar(&self, op: CompareOp, value: impl Into<Scalar>) -> Result<Table> {
        let values = vec![value.into(); self.columns.len()];
        self.compare_each(op, &values)
    }

    pub fn shift(&self, op: ShiftOp, amount: i32) -> Result<Table> {
        let columns = self
            .columns
            .iter()
            .map(|column| column.shift(op, amount))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_columns(columns))
    }

    pub fn shift_in_place(&mut self, op: ShiftOp, amount: i32) -> Result<()> {
        if let Some(column) = self
            .columns
            .iter()
            .find(|column| !crate::registry::supports(column.data_type(), op.into()))
        {
            return Err(ColumnarError::unsupported(op, column.data_type()));
        }
        for column in &mut self.columns {
            column.shift_in_place(op, amount)?;
        }
        Ok(())
    }

    pub fn left_shift(&self, amount: i32) -> Result<Table> {
        self.shift(ShiftOp::LeftShift, amount)
    }

    pub fn left_shift_in_place(&mut self, amount: i32) -> Result<()> {
        self.shift_in_place(ShiftOp::LeftShift, amount)
    }

    pub fn right_shift(&self, amount: i32) -> Result<Table> {
        self.shift(ShiftOp::RightShift, amount)
    }

    pub fn right_shift_in_place(&mut self, amount: i32) -> Result<()> {
        self.shift_in_place(ShiftOp::RightShift, amount)
    }
}

macro_rules! table_binary_methods {
    ($(
        $op:ident => $each:ident, $each_in_place:ident, $scalar:ident, $scalar_in_place:ident,
            $reverse:ident, $reverse_in_place:ident;
    )*) => {
        impl Table {
            $(
                pub fn $each(&self, values: &[Scalar]) -> Result<Table> {
                    self.apply_each(BinaryOp::$op, values)
                }

                pub fn $each_in_place(&mut self, values: &[Scalar]) -> Result<()> {
                    self.apply_each_in_place(BinaryOp::$op, values)
                }

                pub fn $scalar(&self, value: impl Into<Scalar>) -> Result<Table> {
                    self.apply_scalar(BinaryOp::$op, value)
                }

                pub fn $scalar_in_place(&mut self, value: impl Into<Scalar>) -> Result<()> {
                    self.apply_scalar_in_place(BinaryOp::$op, value)
                }

                pub fn $reverse(&self, value: impl Into<Scalar>) -> Result<Table> {
                    self.reverse_apply_scalar(BinaryOp::$op, value)
                }

                pub fn $reverse_in_place(&mut self, value: impl Into<Scalar>) -> Result<()> {
                    self.reverse_apply_scalar_in_place(BinaryOp::$op, value)
                }
            )*
        }
    };
}

table_binary_methods! {
    Add => add_each, add_each_in_place, add_scalar, add_scalar_in_place,
        reverse_add, reverse_add_in_place;
    Subtract => subtract_each, subtract_each_in_place, subtract_scalar, subtract_scalar_in_place,
        reverse_subtract, reverse_subtract_in_place;
    Multiply => multiply_each, multiply_each_in_place, multiply_scalar, multiply_scalar_in_place,
        reverse_multiply, reverse_multiply_in_place;
    Divide => divide_each, divide_each_in_place, divide_scalar, divide_scalar_in_place,
        reverse_divide, reverse_divide_in_place;
    Modulo => modulo_each, modulo_each_in_place, modulo_scalar, modulo_scalar_in_place,
        reverse_modulo, reverse_modulo_in_place;
    And => and_each, and_each_in_place, and_scalar, and_scalar_in_place,
        reverse_and, reverse_and_in_place;
    Or => or_each, or_each_in_place, or_scalar, or_scalar_in_place,
        reverse_or, reverse_or_in_place;
    Xor => xor_each, xor_each_in_place, xor_scalar, xor_scalar_in_place,
        reverse_xor, reverse_xor_in_place;
}

macro_rules! table_compare_methods {
    ($($op:ident => $each:ident, $scalar:ident;)*) => {
        impl Table {
            $(
                pub fn $each(&self, values: &[Scalar]) -> Result<Table> {
                    self.compare_each(CompareOp::$op, values)
                }

                pub fn $scalar(&self, value: impl Into<Scalar>) -> Result<Table> {
                    self.compare_scalar(CompareOp::$op, value)
                }
            )*
        }
    };
}

table_compare_methods! {
    Equal => elementwise_equals_each, elementwise_equals;
    NotEqual => elementwise_not_equals_each, elementwise_not_equals;
    GreaterOrEqual => elementwise_greater_than_or_equal_each, elementwise_greater_than_or_equal;
    LessOrEqual => elementwise_less_than_or_equal_each, elementwise_less_than_or_equal;
    Greater => elementwise_greater_than_each, elementwise_greater_than;
    Less => elementwise_less_than_each, elementwise_less_than;
}
