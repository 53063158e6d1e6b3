use frame_columnar::{Column, ColumnarError, DataType, Decimal, Scalar};
use pretty_assertions::assert_eq;

#[test]
fn nulls_propagate_through_arithmetic() {
    let left = Column::from_options(vec![Some(1i32), None, Some(3), None]);
    let right = Column::from_options(vec![Some(10i32), Some(20), None, None]);
    let result = left.add(&right).unwrap();
    assert_eq!(
        result.to_scalars(),
        vec![Some(Scalar::Int32(11)), None, None, None]
    );
    assert_eq!(result.null_count(), 3);
}

#[test]
fn scalar_operations_keep_nulls() {
    let column = Column::from_options(vec![Some(2.0f64), None]);
    let result = column.multiply(3.0f64).unwrap();
    assert_eq!(result.to_scalars(), vec![Some(Scalar::Float64(6.0)), None]);
}

#[test]
fn null_divisor_slots_are_not_zero() {
    let left = Column::from_vec(vec![8i32, 9]);
    let right = Column::from_options(vec![Some(2i32), None]);
    let result = left.divide(&right).unwrap();
    assert_eq!(result.to_scalars(), vec![Some(Scalar::Int32(4)), None]);

    let decimals = Column::from_options(vec![Some(Decimal::ONE), None]);
    let result = decimals.reverse_divide(Decimal::TWO).unwrap();
    assert_eq!(result.to_scalars(), vec![Some(Scalar::Decimal(Decimal::TWO)), None]);
}

#[test]
fn comparisons_yield_null_where_either_side_is_null() {
    let left = Column::from_options(vec![Some(1u32), None, Some(5)]);
    let right = Column::from_options(vec![Some(1u32), Some(1), None]);
    let result = left.elementwise_equals(&right).unwrap();
    assert_eq!(result.to_scalars(), vec![Some(Scalar::Bool(true)), None, None]);
}

#[test]
fn promotion_keeps_nulls() {
    let left = Column::from_options(vec![None, Some(1u8)]);
    let right = Column::from_vec(vec![1i8, -1]);
    let result = left.add(&right).unwrap();
    assert_eq!(result.data_type(), DataType::Int16);
    assert_eq!(result.to_scalars(), vec![None, Some(Scalar::Int16(0))]);
}

#[test]
fn set_null_and_back() {
    let mut column = Column::from_vec(vec![1i16, 2]);
    column.set(0, None).unwrap();
    assert_eq!(column.null_count(), 1);
    column.set(0, Some(Scalar::Int16(7))).unwrap();
    assert_eq!(column.null_count(), 0);
    assert_eq!(
        column.set(5, None).unwrap_err(),
        ColumnarError::IndexOutOfBounds { index: 5, len: 2 }
    );
}

#[test]
fn all_null_columns() {
    let column = Column::nulls(DataType::Int64, 3);
    let result = column.add(1i64).unwrap();
    assert_eq!(result.to_scalars(), vec![None, None, None]);
    assert_eq!(column.sum(), Ok(Scalar::Int64(0)));
    assert_eq!(column.max(), Ok(None));
}
