use crate::error::ColumnarError;
use crate::primitive::Primitive;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Type tag for the thirteen supported scalar types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    UInt8,
    Int8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Bool,
    Char,
}

impl DataType {
    pub const ALL: [DataType; 13] = [
        DataType::UInt8,
        DataType::Int8,
        DataType::Int16,
        DataType::UInt16,
        DataType::Int32,
        DataType::UInt32,
        DataType::Int64,
        DataType::UInt64,
        DataType::Float32,
        DataType::Float64,
        DataType::Decimal,
        DataType::Bool,
        DataType::Char,
    ];

    /// Position of this type in [`DataType::ALL`] (and in the promotion table).
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::UInt8 => "uint8",
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::UInt16 => "uint16",
            DataType::Int32 => "int32",
            DataType::UInt32 => "uint32",
            DataType::Int64 => "int64",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Decimal => "decimal",
            DataType::Bool => "bool",
            DataType::Char => "char",
        }
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        )
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
        )
    }

    pub fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub fn is_float(self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self == DataType::Decimal
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = ColumnarError;

    /// Accepts the canonical names plus the Rust primitive names and the common
    /// dataframe aliases (`byte`, `int`, `double`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data_type = match s.trim().to_ascii_lowercase().as_str() {
            "uint8" | "u8" | "byte" => DataType::UInt8,
            "int8" | "i8" | "sbyte" => DataType::Int8,
            "int16" | "i16" | "short" => DataType::Int16,
            "uint16" | "u16" | "ushort" => DataType::UInt16,
            "int32" | "i32" | "int" => DataType::Int32,
            "uint32" | "u32" | "uint" => DataType::UInt32,
            "int64" | "i64" | "long" => DataType::Int64,
            "uint64" | "u64" | "ulong" => DataType::UInt64,
            "float32" | "f32" | "float" | "single" => DataType::Float32,
            "float64" | "f64" | "double" => DataType::Float64,
            "decimal" => DataType::Decimal,
            "bool" | "boolean" => DataType::Bool,
            "char" => DataType::Char,
            _ => return Err(ColumnarError::UnsupportedType(s.to_owned())),
        };
        Ok(data_type)
    }
}

/// A single typed value, used for scalar operands and for dynamic reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    UInt8(u8),
    Int8(i8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Bool(bool),
    Char(char),
}

impl Scalar {
    pub fn data_type(&self) -> DataType {
        match self {
            Scalar::UInt8(_) => DataType::UInt8,
            Scalar::Int8(_) => DataType::Int8,
            Scalar::Int16(_) => DataType::Int16,
            Scalar::UInt16(_) => DataType::UInt16,
            Scalar::Int32(_) => DataType::Int32,
            Scalar::UInt32(_) => DataType::UInt32,
            Scalar::Int64(_) => DataType::Int64,
            Scalar::UInt64(_) => DataType::UInt64,
            Scalar::Float32(_) => DataType::Float32,
            Scalar::Float64(_) => DataType::Float64,
            Scalar::Decimal(_) => DataType::Decimal,
            Scalar::Bool(_) => DataType::Bool,
            Scalar::Char(_) => DataType::Char,
        }
    }

    pub(crate) fn widen(self) -> Widened {
        match self {
            Scalar::UInt8(v) => Widened::Int(v.into()),
            Scalar::Int8(v) => Widened::Int(v.into()),
            Scalar::Int16(v) => Widened::Int(v.into()),
            Scalar::UInt16(v) => Widened::Int(v.into()),
            Scalar::Int32(v) => Widened::Int(v.into()),
            Scalar::UInt32(v) => Widened::Int(v.into()),
            Scalar::Int64(v) => Widened::Int(v.into()),
            Scalar::UInt64(v) => Widened::Int(v.into()),
            Scalar::Float32(v) => Widened::Float(v.into()),
            Scalar::Float64(v) => Widened::Float(v),
            Scalar::Decimal(v) => Widened::Decimal(v),
            Scalar::Bool(v) => Widened::Bool(v),
            Scalar::Char(v) => Widened::Char(v),
        }
    }

    /// Convert to `target`, failing when the value has no exact (integer targets) or
    /// nearest (float targets) representation there.
    pub fn cast(self, target: DataType) -> Result<Scalar, ColumnarError> {
        if self.data_type() == target {
            return Ok(self);
        }
        let widened = self.widen();
        let cast = match target {
            DataType::UInt8 => narrow_to::<u8>(widened),
            DataType::Int8 => narrow_to::<i8>(widened),
            DataType::Int16 => narrow_to::<i16>(widened),
            DataType::UInt16 => narrow_to::<u16>(widened),
            DataType::Int32 => narrow_to::<i32>(widened),
            DataType::UInt32 => narrow_to::<u32>(widened),
            DataType::Int64 => narrow_to::<i64>(widened),
            DataType::UInt64 => narrow_to::<u64>(widened),
            DataType::Float32 => narrow_to::<f32>(widened),
            DataType::Float64 => narrow_to::<f64>(widened),
            DataType::Decimal => narrow_to::<Decimal>(widened),
            DataType::Bool => narrow_to::<bool>(widened),
            DataType::Char => narrow_to::<char>(widened),
        };
        cast.ok_or(ColumnarError::UnsupportedCast {
            from: self.data_type(),
            to: target,
        })
    }

    pub(crate) fn is_zero(&self) -> bool {
        match self.widen() {
            Widened::Int(v) => v == 0,
            Widened::Float(v) => v == 0.0,
            Widened::Decimal(v) => v.is_zero(),
            Widened::Bool(_) | Widened::Char(_) => false,
        }
    }
}

fn narrow_to<T: Primitive>(value: Widened) -> Option<Scalar> {
    T::narrow(value).map(Primitive::into_scalar)
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::UInt8(v) => write!(f, "{v}"),
            Scalar::Int8(v) => write!(f, "{v}"),
            Scalar::Int16(v) => write!(f, "{v}"),
            Scalar::UInt16(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::UInt32(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::UInt64(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
            Scalar::Decimal(v) => write!(f, "{v}"),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Char(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value)
                }
            }
        )*
    };
}

scalar_from!(
    u8 => UInt8,
    i8 => Int8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Decimal => Decimal,
    bool => Bool,
    char => Char,
);

/// The lossless "common carrier" a value passes through while being widened to another type.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Widened {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
    Bool(bool),
    Char(char),
}

impl Widened {
    pub(crate) fn to_int(self) -> Option<i128> {
        match self {
            Widened::Int(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn to_f64(self) -> Option<f64> {
        match self {
            Widened::Int(v) => Some(v as f64),
            Widened::Float(v) => Some(v),
            Widened::Decimal(v) => v.to_f64(),
            Widened::Bool(_) | Widened::Char(_) => None,
        }
    }

    pub(crate) fn to_decimal(self) -> Option<Decimal> {
        match self {
            Widened::Int(v) => Decimal::from_i128(v),
            Widened::Float(v) => Decimal::from_f64(v),
            Widened::Decimal(v) => Some(v),
            Widened::Bool(_) | Widened::Char(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_and_rejects_unknown_types() {
        assert_eq!("byte".parse::<DataType>().unwrap(), DataType::UInt8);
        assert_eq!("Double".parse::<DataType>().unwrap(), DataType::Float64);
        assert_eq!("i64".parse::<DataType>().unwrap(), DataType::Int64);
        assert_eq!(
            "string".parse::<DataType>(),
            Err(ColumnarError::UnsupportedType("string".to_owned()))
        );
    }

    #[test]
    fn index_matches_all_order() {
        for (idx, data_type) in DataType::ALL.iter().enumerate() {
            assert_eq!(data_type.index(), idx);
        }
    }

    #[test]
    fn scalar_cast_is_exact_for_integers() {
        assert_eq!(Scalar::Int32(5).cast(DataType::UInt8), Ok(Scalar::UInt8(5)));
        assert!(Scalar::Int32(-1).cast(DataType::UInt8).is_err());
        assert_eq!(
            Scalar::Int32(3).cast(DataType::Decimal),
            Ok(Scalar::Decimal(Decimal::from(3)))
        );
        assert!(Scalar::Float64(1.5).cast(DataType::Int32).is_err());
        assert!(Scalar::Bool(true).cast(DataType::Int32).is_err());
    }
}
