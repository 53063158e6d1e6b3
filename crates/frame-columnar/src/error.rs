use crate::kernel::Operator;
use crate::types::DataType;

pub type Result<T, E = ColumnarError> = std::result::Result<T, E>;

/// Errors raised by column, kernel and table operations.
///
/// Every variant is reported before the operand buffers are written, so a failed call leaves
/// its operands untouched.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ColumnarError {
    #[error("{}", length_mismatch_message(*left, *right, *chunk))]
    LengthMismatch {
        left: usize,
        right: usize,
        /// Set when the total lengths agree but the chunk at this index does not.
        chunk: Option<usize>,
    },

    #[error("{op} is not supported for {data_type} columns")]
    UnsupportedOperation { op: Operator, data_type: DataType },

    #[error("{left} and {right} columns cannot be combined")]
    UnsupportedPromotion { left: DataType, right: DataType },

    #[error("unsupported column type: {0}")]
    UnsupportedType(String),

    #[error("cannot represent {from} values as {to}")]
    UnsupportedCast { from: DataType, to: DataType },

    #[error("attempted to divide by zero")]
    DivideByZero,

    #[error("decimal overflow in {op}")]
    DecimalOverflow { op: Operator },

    #[error("expected {expected} values (one per column), got {actual}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("expected a {expected} value, got {actual}")]
    ScalarTypeMismatch { expected: DataType, actual: DataType },

    #[error("index {index} out of bounds for column of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl ColumnarError {
    pub(crate) fn unsupported(op: impl Into<Operator>, data_type: DataType) -> Self {
        ColumnarError::UnsupportedOperation {
            op: op.into(),
            data_type,
        }
    }
}

fn length_mismatch_message(left: usize, right: usize, chunk: Option<usize>) -> String {
    match chunk {
        Some(chunk) => format!(
            "chunk layout mismatch at chunk {chunk}: left chunk holds {left} values, right chunk holds {right}"
        ),
        None => format!("length mismatch: left column has {left} values, right column has {right}"),
    }
}
