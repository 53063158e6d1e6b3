//! Type promotion for mixed-type binary operations.
//!
//! [`PROMOTION_TABLE`] lists the result type for every ordered pair of [`DataType`]s. Operands
//! whose type differs from the result are widened into a fresh container with the same chunk
//! layout before the result type's kernel runs.

#![forbid(unsafe_code)]

use crate::column::Column;
use crate::error::{ColumnarError, Result};
use crate::types::DataType;
use std::borrow::Cow;

const U8: Option<DataType> = Some(DataType::UInt8);
const I8: Option<DataType> = Some(DataType::Int8);
const I16: Option<DataType> = Some(DataType::Int16);
const U16: Option<DataType> = Some(DataType::UInt16);
const I32: Option<DataType> = Some(DataType::Int32);
const U32: Option<DataType> = Some(DataType::UInt32);
const I64: Option<DataType> = Some(DataType::Int64);
const U64: Option<DataType> = Some(DataType::UInt64);
const F32: Option<DataType> = Some(DataType::Float32);
const F64: Option<DataType> = Some(DataType::Float64);
const DEC: Option<DataType> = Some(DataType::Decimal);
const BOOL: Option<DataType> = Some(DataType::Bool);
const CHAR: Option<DataType> = Some(DataType::Char);
const NONE: Option<DataType> = None;

/// Result type of `left op right`, indexed `[left.index()][right.index()]`.
///
/// Rows and columns follow [`DataType::ALL`]:
/// u8, i8, i16, u16, i32, u32, i64, u64, f32, f64, decimal, bool, char.
#[rustfmt::skip]
pub static PROMOTION_TABLE: [[Option<DataType>; 13]; 13] = [
    //       u8    i8    i16   u16   i32   u32   i64   u64   f32   f64   dec   bool  char
    /* u8 */ [U8,   I16,  I16,  U16,  I32,  U32,  I64,  U64,  F32,  F64,  DEC,  NONE, NONE],
    /* i8 */ [I16,  I8,   I16,  I32,  I32,  I64,  I64,  DEC,  F32,  F64,  DEC,  NONE, NONE],
    /* i16*/ [I16,  I16,  I16,  I32,  I32,  I64,  I64,  DEC,  F32,  F64,  DEC,  NONE, NONE],
    /* u16*/ [U16,  I32,  I32,  U16,  I32,  U32,  I64,  U64,  F32,  F64,  DEC,  NONE, NONE],
    /* i32*/ [I32,  I32,  I32,  I32,  I32,  I64,  I64,  DEC,  F64,  F64,  DEC,  NONE, NONE],
    /* u32*/ [U32,  I64,  I64,  U32,  I64,  U32,  I64,  U64,  F64,  F64,  DEC,  NONE, NONE],
    /* i64*/ [I64,  I64,  I64,  I64,  I64,  I64,  I64,  DEC,  F64,  F64,  DEC,  NONE, NONE],
    /* u64*/ [U64,  DEC,  DEC,  U64,  DEC,  U64,  DEC,  U64,  F64,  F64,  DEC,  NONE, NONE],
    /* f32*/ [F32,  F32,  F32,  F32,  F64,  F64,  F64,  F64,  F32,  F64,  F64,  NONE, NONE],
    /* f64*/ [F64,  F64,  F64,  F64,  F64,  F64,  F64,  F64,  F64,  F64,  F64,  NONE, NONE],
    /* dec*/ [DEC,  DEC,  DEC,  DEC,  DEC,  DEC,  DEC,  DEC,  F64,  F64,  DEC,  NONE, NONE],
    /*bool*/ [NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, BOOL, NONE],
    /*char*/ [NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, CHAR],
];

/// The common type `left` and `right` are both widened to.
pub fn promote(left: DataType, right: DataType) -> Result<DataType> {
    PROMOTION_TABLE[left.index()][right.index()]
        .ok_or(ColumnarError::UnsupportedPromotion { left, right })
}

/// Borrow `column` if it already has type `target`, otherwise widen it into a new column.
pub fn widen(column: &Column, target: DataType) -> Result<Cow<'_, Column>> {
    if column.data_type() == target {
        return Ok(Cow::Borrowed(column));
    }
    log::debug!(
        "widening {} column of {} values to {}",
        column.data_type(),
        column.len(),
        target
    );
    column.cast(target).map(Cow::Owned)
}

/// Promote both operands to their common type. Returns the result type and the (possibly
/// widened) operands.
pub fn combine<'a>(
    left: &'a Column,
    right: &'a Column,
) -> Result<(DataType, Cow<'a, Column>, Cow<'a, Column>)> {
    let target = promote(left.data_type(), right.data_type())?;
    Ok((target, widen(left, target)?, widen(right, target)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lattice_is_symmetric() {
        for left in DataType::ALL {
            for right in DataType::ALL {
                assert_eq!(
                    promote(left, right).ok(),
                    promote(right, left).ok(),
                    "{left} vs {right}"
                );
            }
        }
    }

    #[test]
    fn same_type_is_identity() {
        for data_type in DataType::ALL {
            assert_eq!(promote(data_type, data_type), Ok(data_type));
        }
    }

    #[test]
    fn mixed_signedness_picks_a_signed_type_that_holds_both() {
        assert_eq!(promote(DataType::UInt8, DataType::Int8), Ok(DataType::Int16));
        assert_eq!(promote(DataType::UInt16, DataType::Int16), Ok(DataType::Int32));
        assert_eq!(promote(DataType::UInt32, DataType::Int32), Ok(DataType::Int64));
        assert_eq!(promote(DataType::UInt64, DataType::Int8), Ok(DataType::Decimal));
        assert_eq!(promote(DataType::UInt8, DataType::Int32), Ok(DataType::Int32));
    }

    #[test]
    fn floats_and_decimals() {
        assert_eq!(promote(DataType::Int16, DataType::Float32), Ok(DataType::Float32));
        assert_eq!(promote(DataType::Int32, DataType::Float32), Ok(DataType::Float64));
        assert_eq!(promote(DataType::Float32, DataType::Float64), Ok(DataType::Float64));
        assert_eq!(promote(DataType::Int64, DataType::Decimal), Ok(DataType::Decimal));
        assert_eq!(promote(DataType::Decimal, DataType::Float32), Ok(DataType::Float64));
    }

    #[test]
    fn bool_and_char_never_mix() {
        assert_eq!(
            promote(DataType::Bool, DataType::Int32),
            Err(ColumnarError::UnsupportedPromotion {
                left: DataType::Bool,
                right: DataType::Int32
            })
        );
        assert!(promote(DataType::Char, DataType::UInt16).is_err());
        assert!(promote(DataType::Bool, DataType::Char).is_err());
        assert_eq!(promote(DataType::Bool, DataType::Bool), Ok(DataType::Bool));
    }

    #[test]
    fn combine_borrows_operands_that_already_match() {
        let ints = Column::from_vec(vec![1i64, 2]);
        let bytes = Column::from_vec(vec![3u8, 4]);
        let (target, left, right) = combine(&ints, &bytes).unwrap();
        assert_eq!(target, DataType::Int64);
        assert!(matches!(left, Cow::Borrowed(_)));
        assert!(matches!(right, Cow::Owned(_)));
        assert_eq!(right.data_type(), DataType::Int64);
        assert_eq!(right.chunk_lens(), bytes.chunk_lens());
    }

    #[test]
    fn result_holds_both_integer_ranges() {
        let bounds = |t: DataType| -> Option<(i128, i128)> {
            Some(match t {
                DataType::UInt8 => (0, u8::MAX.into()),
                DataType::Int8 => (i8::MIN.into(), i8::MAX.into()),
                DataType::Int16 => (i16::MIN.into(), i16::MAX.into()),
                DataType::UInt16 => (0, u16::MAX.into()),
                DataType::Int32 => (i32::MIN.into(), i32::MAX.into()),
                DataType::UInt32 => (0, u32::MAX.into()),
                DataType::Int64 => (i64::MIN.into(), i64::MAX.into()),
                DataType::UInt64 => (0, u64::MAX.into()),
                _ => return None,
            })
        };
        for left in DataType::ALL.into_iter().filter(|t| t.is_integer()) {
            for right in DataType::ALL.into_iter().filter(|t| t.is_integer()) {
                let result = promote(left, right).unwrap();
                let Some((lo, hi)) = bounds(result) else {
                    assert_eq!(result, DataType::Decimal);
                    continue;
                };
                let (l_lo, l_hi) = bounds(left).unwrap();
                let (r_lo, r_hi) = bounds(right).unwrap();
                assert!(lo <= l_lo.min(r_lo) && hi >= l_hi.max(r_hi), "{left} vs {right}");
            }
        }
    }
}
