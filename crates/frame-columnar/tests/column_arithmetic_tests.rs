use frame_columnar::{
    BinaryOp, Column, ColumnContainer, ColumnOptions, ColumnarError, DataType, Decimal, Operator,
    Scalar,
};
use pretty_assertions::assert_eq;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn integer_column_plus_scalar() {
    let column = Column::from_vec(vec![1i32, 2, 3]);
    let result = column.add(5i32).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(
        result.to_scalars(),
        vec![
            Some(Scalar::Int32(6)),
            Some(Scalar::Int32(7)),
            Some(Scalar::Int32(8))
        ]
    );
}

#[test]
fn integer_divide_by_zero_scalar_fails() {
    let column = Column::from_vec(vec![10i32]);
    assert_eq!(column.divide(0i32).unwrap_err(), ColumnarError::DivideByZero);
    assert_eq!(column.modulo(0i32).unwrap_err(), ColumnarError::DivideByZero);
}

#[test]
fn byte_addition_wraps() {
    let left = Column::from_vec(vec![250u8]);
    let right = Column::from_vec(vec![10u8]);
    let result = left.add(&right).unwrap();
    assert_eq!(result.data_type(), DataType::UInt8);
    assert_eq!(result.to_scalars(), vec![Some(Scalar::UInt8(4))]);
}

#[test]
fn int_plus_decimal_promotes_to_decimal() {
    let left = Column::from_vec(vec![1i32, 2]);
    let right = Column::from_vec(vec![dec("1.5"), dec("2.5")]);
    let result = left.add(&right).unwrap();
    assert_eq!(result.data_type(), DataType::Decimal);
    assert_eq!(
        result.to_scalars(),
        vec![Some(Scalar::Decimal(dec("2.5"))), Some(Scalar::Decimal(dec("4.5")))]
    );
}

#[test]
fn bool_ordering_comparison_is_unsupported() {
    let column = Column::from_vec(vec![true, false]);
    assert_eq!(
        column.elementwise_greater_than(true).unwrap_err(),
        ColumnarError::UnsupportedOperation {
            op: Operator::Greater,
            data_type: DataType::Bool,
        }
    );
    assert!(column.elementwise_less_than(true).is_err());
    let equal = column.elementwise_equals(true).unwrap();
    assert_eq!(
        equal.to_scalars(),
        vec![Some(Scalar::Bool(true)), Some(Scalar::Bool(false))]
    );
}

#[test]
fn length_mismatch_fails_without_mutation() {
    let mut left = Column::from_vec(vec![1i64, 2, 3]);
    let right = Column::from_vec(vec![1i64, 2, 3, 4]);
    let id = left.id();
    let err = left.add_in_place(&right).unwrap_err();
    assert_eq!(
        err,
        ColumnarError::LengthMismatch {
            left: 3,
            right: 4,
            chunk: None
        }
    );
    assert_eq!(left.id(), id);
    assert_eq!(
        left.to_scalars(),
        vec![
            Some(Scalar::Int64(1)),
            Some(Scalar::Int64(2)),
            Some(Scalar::Int64(3))
        ]
    );
    assert_eq!(right.len(), 4);
}

#[test]
fn length_mismatch_for_every_operator() {
    let left = Column::from_vec(vec![1i32, 2]);
    let right = Column::from_vec(vec![1i32]);
    for op in [
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Modulo,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
    ] {
        assert!(
            matches!(
                left.apply(op, &right),
                Err(ColumnarError::LengthMismatch { .. })
            ),
            "{op:?}"
        );
    }
    assert!(matches!(
        left.elementwise_equals(&right),
        Err(ColumnarError::LengthMismatch { .. })
    ));
}

#[test]
fn chunk_layout_mismatch_names_the_chunk() {
    let left = Column::from_container(ColumnContainer::from_vec_with_options(
        vec![1i32, 2, 3, 4],
        ColumnOptions { chunk_len: 2 },
    ));
    let right = Column::from_container(ColumnContainer::from_vec_with_options(
        vec![1i32, 2, 3, 4],
        ColumnOptions { chunk_len: 4 },
    ));
    assert_eq!(
        left.add(&right).unwrap_err(),
        ColumnarError::LengthMismatch {
            left: 4,
            right: 4,
            chunk: None
        }
    );

    let right = Column::from_container(ColumnContainer::from_vec_with_options(
        vec![1i32, 2, 3, 4, 5],
        ColumnOptions { chunk_len: 3 },
    ));
    let left = Column::from_container(ColumnContainer::from_vec_with_options(
        vec![1i32, 2, 3, 4, 5],
        ColumnOptions { chunk_len: 4 },
    ));
    assert_eq!(
        left.add(&right).unwrap_err(),
        ColumnarError::LengthMismatch {
            left: 4,
            right: 3,
            chunk: Some(0)
        }
    );
}

#[test]
fn reverse_subtract_and_divide() {
    let column = Column::from_vec(vec![1i32, 2, 4]);
    assert_eq!(
        column.reverse_subtract(10i32).unwrap().to_scalars(),
        vec![
            Some(Scalar::Int32(9)),
            Some(Scalar::Int32(8)),
            Some(Scalar::Int32(6))
        ]
    );
    assert_eq!(
        column.reverse_divide(8i32).unwrap().to_scalars(),
        vec![
            Some(Scalar::Int32(8)),
            Some(Scalar::Int32(4)),
            Some(Scalar::Int32(2))
        ]
    );
    let with_zero = Column::from_vec(vec![1i32, 0]);
    assert_eq!(
        with_zero.reverse_modulo(5i32).unwrap_err(),
        ColumnarError::DivideByZero
    );
}

#[test]
fn integer_division_truncates_and_wraps() {
    let column = Column::from_vec(vec![7i32, -7, i32::MIN]);
    let divisor = Column::from_vec(vec![2i32, 2, -1]);
    assert_eq!(
        column.divide(&divisor).unwrap().to_scalars(),
        vec![
            Some(Scalar::Int32(3)),
            Some(Scalar::Int32(-3)),
            Some(Scalar::Int32(i32::MIN))
        ]
    );
}

#[test]
fn shifts_use_promoted_width() {
    let bytes = Column::from_vec(vec![0x81u8, 1]);
    assert_eq!(
        bytes.left_shift(1).unwrap().to_scalars(),
        vec![Some(Scalar::UInt8(0x02)), Some(Scalar::UInt8(2))]
    );
    let ints = Column::from_vec(vec![1i32, -8]);
    assert_eq!(
        ints.left_shift(33).unwrap().to_scalars(),
        vec![Some(Scalar::Int32(2)), Some(Scalar::Int32(-16))]
    );
    assert_eq!(
        ints.right_shift(1).unwrap().to_scalars(),
        vec![Some(Scalar::Int32(0)), Some(Scalar::Int32(-4))]
    );
}

#[test]
fn float_and_decimal_reject_bitwise_and_shift() {
    let columns = [
        Column::from_vec(vec![1.0f32]),
        Column::from_vec(vec![1.0f64]),
        Column::from_vec(vec![Decimal::ONE]),
    ];
    for column in &columns {
        let data_type = column.data_type();
        for op in [BinaryOp::And, BinaryOp::Or, BinaryOp::Xor] {
            assert_eq!(
                column.apply(op, column).unwrap_err(),
                ColumnarError::UnsupportedOperation {
                    op: op.operator(),
                    data_type,
                },
            );
        }
        assert_eq!(
            column.left_shift(1).unwrap_err(),
            ColumnarError::UnsupportedOperation {
                op: Operator::LeftShift,
                data_type,
            }
        );
        assert_eq!(
            column.right_shift(1).unwrap_err(),
            ColumnarError::UnsupportedOperation {
                op: Operator::RightShift,
                data_type,
            }
        );
    }
}

#[test]
fn bool_and_char_do_not_mix_with_numbers() {
    let flags = Column::from_vec(vec![true]);
    let ints = Column::from_vec(vec![1i32]);
    assert_eq!(
        flags.add(&ints).unwrap_err(),
        ColumnarError::UnsupportedPromotion {
            left: DataType::Bool,
            right: DataType::Int32,
        }
    );
    let letters = Column::from_vec(vec!['a']);
    assert!(letters.add(1i32).is_err());
    assert_eq!(
        letters.add(&letters).unwrap_err(),
        ColumnarError::UnsupportedOperation {
            op: Operator::Add,
            data_type: DataType::Char,
        }
    );
}

#[test]
fn bool_logical_ops() {
    let left = Column::from_vec(vec![true, true, false]);
    let right = Column::from_vec(vec![true, false, false]);
    assert_eq!(
        left.and(&right).unwrap().to_scalars(),
        vec![
            Some(Scalar::Bool(true)),
            Some(Scalar::Bool(false)),
            Some(Scalar::Bool(false))
        ]
    );
    assert_eq!(
        left.reverse_or(false).unwrap().to_scalars(),
        left.to_scalars()
    );
}

#[test]
fn u64_with_signed_promotes_to_decimal() {
    let left = Column::from_vec(vec![u64::MAX]);
    let right = Column::from_vec(vec![-1i64]);
    let result = left.add(&right).unwrap();
    assert_eq!(result.data_type(), DataType::Decimal);
    assert_eq!(
        result.to_scalars(),
        vec![Some(Scalar::Decimal(Decimal::from(u64::MAX - 1)))]
    );
}

#[test]
fn decimal_overflow_leaves_the_column_unchanged() {
    let mut column = Column::from_vec(vec![Decimal::ONE, Decimal::MAX]);
    let id = column.id();
    assert_eq!(
        column.multiply_in_place(Decimal::TWO).unwrap_err(),
        ColumnarError::DecimalOverflow {
            op: Operator::Multiply
        }
    );
    assert_eq!(column.id(), id);
    assert_eq!(
        column.to_scalars(),
        vec![Some(Scalar::Decimal(Decimal::ONE)), Some(Scalar::Decimal(Decimal::MAX))]
    );
}

#[test]
fn comparisons_promote_mixed_types() {
    let ints = Column::from_vec(vec![1i32, 2, 3]);
    let floats = Column::from_vec(vec![1.5f64, 2.0, 2.5]);
    let result = ints.elementwise_greater_than_or_equal(&floats).unwrap();
    assert_eq!(result.data_type(), DataType::Bool);
    assert_eq!(
        result.to_scalars(),
        vec![
            Some(Scalar::Bool(false)),
            Some(Scalar::Bool(true)),
            Some(Scalar::Bool(true))
        ]
    );
    let letters = Column::from_vec(vec!['a', 'm']);
    assert_eq!(
        letters.elementwise_less_than('b').unwrap().to_scalars(),
        vec![Some(Scalar::Bool(true)), Some(Scalar::Bool(false))]
    );
}

#[test]
fn long_columns_span_several_chunks() {
    let values: Vec<i64> = (0..200_000).collect();
    let column = Column::from_vec(values);
    assert_eq!(column.chunk_lens(), vec![65_536, 65_536, 65_536, 3_392]);
    let doubled = column.multiply(2i64).unwrap();
    assert_eq!(doubled.chunk_lens(), column.chunk_lens());
    assert_eq!(doubled.get(199_999), Some(Scalar::Int64(399_998)));
    assert_eq!(doubled.sum(), Ok(Scalar::Int64(199_999 * 200_000)));
}
