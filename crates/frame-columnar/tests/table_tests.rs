use frame_columnar::{BinaryOp, Column, ColumnarError, DataType, Decimal, Operator, Scalar, Table};
use pretty_assertions::assert_eq;

fn table() -> Table {
    Table::new(vec![
        ("ints".to_owned(), Column::from_vec(vec![1i32, 2, 3])),
        ("floats".to_owned(), Column::from_vec(vec![0.5f64, 1.5, 2.5])),
        ("decimals".to_owned(), Column::from_vec(vec![Decimal::ONE; 3])),
    ])
    .unwrap()
}

#[test]
fn scalar_broadcasts_to_every_column() {
    let result = table().add_scalar(1i32).unwrap();
    assert_eq!(result.column_count(), 3);
    assert_eq!(result.row_count(), 3);
    assert_eq!(
        result.column("ints").unwrap().to_scalars(),
        vec![
            Some(Scalar::Int32(2)),
            Some(Scalar::Int32(3)),
            Some(Scalar::Int32(4))
        ]
    );
    assert_eq!(
        result.column("floats").unwrap().get(0),
        Some(Scalar::Float64(1.5))
    );
    assert_eq!(
        result.column("decimals").unwrap().get(2),
        Some(Scalar::Decimal(Decimal::TWO))
    );
}

#[test]
fn per_column_values_are_forwarded_in_order() {
    let values = [Scalar::Int32(10), Scalar::Float64(2.0), Scalar::Int32(3)];
    let result = table().multiply_each(&values).unwrap();
    assert_eq!(result.column_at(0).unwrap().get(2), Some(Scalar::Int32(30)));
    assert_eq!(result.column_at(1).unwrap().get(1), Some(Scalar::Float64(3.0)));
    assert_eq!(
        result.column_at(2).unwrap().get(0),
        Some(Scalar::Decimal(Decimal::from(3)))
    );
}

#[test]
fn value_count_must_match_column_count() {
    let mut table = table();
    assert_eq!(
        table
            .subtract_each_in_place(&[Scalar::Int32(1), Scalar::Int32(2)])
            .unwrap_err(),
        ColumnarError::ArgumentCountMismatch {
            expected: 3,
            actual: 2
        }
    );
}

#[test]
fn in_place_is_atomic_across_columns() {
    let mut table = Table::new(vec![
        ("a".to_owned(), Column::from_vec(vec![4i32, 8])),
        ("b".to_owned(), Column::from_vec(vec![true, false])),
    ])
    .unwrap();
    let before: Vec<_> = table.columns().iter().map(Column::to_scalars).collect();

    let err = table.divide_scalar_in_place(2i32).unwrap_err();
    assert_eq!(
        err,
        ColumnarError::UnsupportedPromotion {
            left: DataType::Bool,
            right: DataType::Int32,
        }
    );
    let after: Vec<_> = table.columns().iter().map(Column::to_scalars).collect();
    assert_eq!(after, before);

    let values = [Scalar::Int32(0), Scalar::Bool(true)];
    assert_eq!(
        table.apply_each_in_place(BinaryOp::Divide, &values).unwrap_err(),
        ColumnarError::DivideByZero
    );
    let after: Vec<_> = table.columns().iter().map(Column::to_scalars).collect();
    assert_eq!(after, before);
}

#[test]
fn in_place_keeps_column_identity() {
    let mut table = Table::new(vec![
        ("a".to_owned(), Column::from_vec(vec![1u8, 2])),
        ("b".to_owned(), Column::from_vec(vec![3u8, 4])),
    ])
    .unwrap();
    let ids: Vec<_> = table.columns().iter().map(Column::id).collect();
    table.xor_scalar_in_place(1u8).unwrap();
    let after: Vec<_> = table.columns().iter().map(Column::id).collect();
    assert_eq!(after, ids);
    assert_eq!(
        table.column("b").unwrap().to_scalars(),
        vec![Some(Scalar::UInt8(2)), Some(Scalar::UInt8(5))]
    );
}

#[test]
fn reverse_subtract_broadcasts() {
    let table = Table::new(vec![("a".to_owned(), Column::from_vec(vec![1i64, 2]))]).unwrap();
    let result = table.reverse_subtract(10i64).unwrap();
    assert_eq!(
        result.column("a").unwrap().to_scalars(),
        vec![Some(Scalar::Int64(9)), Some(Scalar::Int64(8))]
    );
}

#[test]
fn comparisons_return_bool_columns() {
    let result = table().elementwise_greater_than(1i32).unwrap();
    for column in result.columns() {
        assert_eq!(column.data_type(), DataType::Bool);
    }
    assert_eq!(
        result.column("floats").unwrap().to_scalars(),
        vec![
            Some(Scalar::Bool(false)),
            Some(Scalar::Bool(true)),
            Some(Scalar::Bool(true))
        ]
    );
}

#[test]
fn shift_in_place_checks_every_column_first() {
    let mut table = Table::new(vec![
        ("a".to_owned(), Column::from_vec(vec![1i32])),
        ("b".to_owned(), Column::from_vec(vec![1.0f32])),
    ])
    .unwrap();
    assert_eq!(
        table.left_shift_in_place(2).unwrap_err(),
        ColumnarError::UnsupportedOperation {
            op: Operator::LeftShift,
            data_type: DataType::Float32,
        }
    );
    assert_eq!(table.column("a").unwrap().get(0), Some(Scalar::Int32(1)));
}

#[test]
fn decimal_overflow_in_a_later_column_leaves_earlier_columns_untouched() {
    let mut table = Table::new(vec![
        ("a".to_owned(), Column::from_vec(vec![Decimal::ONE])),
        ("b".to_owned(), Column::from_vec(vec![Decimal::MAX])),
    ])
    .unwrap();
    let ids: Vec<_> = table.columns().iter().map(Column::id).collect();

    assert_eq!(
        table.add_scalar_in_place(Decimal::ONE).unwrap_err(),
        ColumnarError::DecimalOverflow { op: Operator::Add }
    );
    assert_eq!(
        table.column("a").unwrap().to_scalars(),
        vec![Some(Scalar::Decimal(Decimal::ONE))]
    );
    assert_eq!(
        table.column("b").unwrap().to_scalars(),
        vec![Some(Scalar::Decimal(Decimal::MAX))]
    );
    let after: Vec<_> = table.columns().iter().map(Column::id).collect();
    assert_eq!(after, ids);

    assert!(table.reverse_subtract_in_place(Decimal::MIN).is_err());
    assert_eq!(
        table.column("a").unwrap().to_scalars(),
        vec![Some(Scalar::Decimal(Decimal::ONE))]
    );
}

#[test]
fn failed_promotion_in_place_keeps_the_original_type() {
    let mut table = Table::new(vec![
        ("a".to_owned(), Column::from_vec(vec![1i32])),
        ("b".to_owned(), Column::from_vec(vec![Decimal::MAX])),
    ])
    .unwrap();

    assert_eq!(
        table.multiply_scalar_in_place(Decimal::TWO).unwrap_err(),
        ColumnarError::DecimalOverflow {
            op: Operator::Multiply
        }
    );
    let a = table.column("a").unwrap();
    assert_eq!(a.data_type(), DataType::Int32);
    assert_eq!(a.to_scalars(), vec![Some(Scalar::Int32(1))]);
}

#[test]
fn promoted_columns_are_committed_with_the_rest() {
    let mut table = Table::new(vec![
        ("a".to_owned(), Column::from_vec(vec![1i32, 2])),
        ("b".to_owned(), Column::from_vec(vec![Decimal::ONE, Decimal::TWO])),
    ])
    .unwrap();
    let b_id = table.column("b").unwrap().id();

    table.multiply_scalar_in_place(Decimal::TWO).unwrap();
    let a = table.column("a").unwrap();
    assert_eq!(a.data_type(), DataType::Decimal);
    assert_eq!(a.get(1), Some(Scalar::Decimal(Decimal::from(4))));
    assert_eq!(table.column("b").unwrap().id(), b_id);
    assert_eq!(
        table.column("b").unwrap().get(1),
        Some(Scalar::Decimal(Decimal::from(4)))
    );
}
