//! Chunked typed-column arithmetic for tabular data.
//!
//! This crate focuses on:
//! - Chunked column storage with explicit copy-on-write (`Chunk`, `ColumnContainer`).
//! - One stateless kernel per scalar type implementing elementwise arithmetic, bitwise and
//!   comparison operations directly on chunk buffers.
//! - A static type-promotion lattice so mixed-type binary operations resolve to a single kernel.
//! - Column and table façades that broadcast operations against columns and scalars.
//!
//! Every operation propagates nulls: if either input slot is null, the output slot is null.

#![forbid(unsafe_code)]

mod bitmap;
mod chunk;
mod column;
mod compute;
mod container;
mod error;
pub mod kernel;
mod primitive;
pub mod promote;
pub mod registry;
mod table;
mod types;

pub use crate::bitmap::BitVec;
pub use crate::chunk::{Chunk, ExclusiveChunk, Ownership};
pub use crate::column::{BinaryOp, Column, ColumnData, ColumnId, Operand};
pub use crate::compute::Numeric;
pub use crate::container::{ColumnContainer, ColumnOptions};
pub use crate::error::{ColumnarError, Result};
pub use crate::kernel::{ArithmeticOp, BitwiseOp, CompareOp, Kernel, Operator, ShiftOp};
pub use crate::primitive::Primitive;
pub use crate::registry::get_kernel;
pub use crate::table::Table;
pub use crate::types::{DataType, Scalar};

pub use rust_decimal::Decimal;
