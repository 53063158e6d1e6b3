use crate::column::ColumnData;
use crate::container::ColumnContainer;
use crate::kernel::Kernel;
use crate::registry;
use crate::types::{DataType, Scalar, Widened};
use rust_decimal::Decimal;
use std::fmt;

mod private {
    pub trait Sealed {}
}

/// A scalar type a column can hold.
///
/// The trait is sealed: the supported set is exactly `u8`, `i8`, `i16`, `u16`, `i32`, `u32`,
/// `i64`, `u64`, `f32`, `f64`, [`Decimal`], `bool` and `char`. Any other type is rejected at
/// compile time. For runtime type names see [`DataType`]'s `FromStr`.
pub trait Primitive:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static + private::Sealed
{
    const DATA_TYPE: DataType;

    /// The process-wide kernel for this type, created on first use.
    fn kernel() -> &'static dyn Kernel<Self>;

    fn into_scalar(self) -> Scalar;

    /// Exact-type extraction; no conversion is attempted.
    fn from_scalar(scalar: Scalar) -> Option<Self>;

    #[doc(hidden)]
    fn widen(self) -> Widened;

    #[doc(hidden)]
    fn narrow(value: Widened) -> Option<Self>;

    #[doc(hidden)]
    fn into_column_data(container: ColumnContainer<Self>) -> ColumnData;

    #[doc(hidden)]
    fn container(data: &ColumnData) -> Option<&ColumnContainer<Self>>;

    #[doc(hidden)]
    fn container_mut(data: &mut ColumnData) -> Option<&mut ColumnContainer<Self>>;
}

macro_rules! primitive {
    (
        $ty:ty, $variant:ident, $kernel:path,
        widen: |$w:ident| $widen:expr,
        narrow: |$n:ident| $narrow:expr $(,)?
    ) => {
        impl private::Sealed for $ty {}

        impl Primitive for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn kernel() -> &'static dyn Kernel<Self> {
                $kernel()
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(scalar: Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn widen(self) -> Widened {
                let $w = self;
                $widen
            }

            fn narrow($n: Widened) -> Option<Self> {
                $narrow
            }

            fn into_column_data(container: ColumnContainer<Self>) -> ColumnData {
                ColumnData::$variant(container)
            }

            fn container(data: &ColumnData) -> Option<&ColumnContainer<Self>> {
                match data {
                    ColumnData::$variant(c) => Some(c),
                    _ => None,
                }
            }

            fn container_mut(data: &mut ColumnData) -> Option<&mut ColumnContainer<Self>> {
                match data {
                    ColumnData::$variant(c) => Some(c),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! integer_primitive {
    ($($ty:ty => $variant:ident, $kernel:path;)*) => {
        $(
            primitive!(
                $ty, $variant, $kernel,
                widen: |v| Widened::Int(v.into()),
                narrow: |value| value.to_int().and_then(|v| <$ty>::try_from(v).ok()),
            );
        )*
    };
}

integer_primitive! {
    u8 => UInt8, registry::uint8_kernel;
    i8 => Int8, registry::int8_kernel;
    i16 => Int16, registry::int16_kernel;
    u16 => UInt16, registry::uint16_kernel;
    i32 => Int32, registry::int32_kernel;
    u32 => UInt32, registry::uint32_kernel;
    i64 => Int64, registry::int64_kernel;
    u64 => UInt64, registry::uint64_kernel;
}

primitive!(
    f32, Float32, registry::float32_kernel,
    widen: |v| Widened::Float(v.into()),
    narrow: |value| value.to_f64().map(|v| v as f32),
);

primitive!(
    f64, Float64, registry::float64_kernel,
    widen: |v| Widened::Float(v),
    narrow: |value| value.to_f64(),
);

primitive!(
    Decimal, Decimal, registry::decimal_kernel,
    widen: |v| Widened::Decimal(v),
    narrow: |value| value.to_decimal(),
);

primitive!(
    bool, Bool, registry::bool_kernel,
    widen: |v| Widened::Bool(v),
    narrow: |value| match value {
        Widened::Bool(v) => Some(v),
        _ => None,
    },
);

primitive!(
    char, Char, registry::char_kernel,
    widen: |v| Widened::Char(v),
    narrow: |value| match value {
        Widened::Char(v) => Some(v),
        _ => None,
    },
);
