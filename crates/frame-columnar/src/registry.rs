//! Process-wide kernel instances, one per scalar type.
//!
//! Each slot is a `static OnceLock`, filled the first time the type is used and kept for the
//! life of the process. After that, resolving a kernel is a single atomic load.

#![forbid(unsafe_code)]

use crate::kernel::{
    BoolKernel, CharKernel, DecimalKernel, FloatKernel, IntegerKernel, Kernel, Operator,
};
use crate::primitive::Primitive;
use crate::types::DataType;
use rust_decimal::Decimal;
use std::sync::OnceLock;

macro_rules! kernel_slot {
    ($($name:ident: $ty:ty => $kernel:ty;)*) => {
        $(
            pub(crate) fn $name() -> &'static dyn Kernel<$ty> {
                static SLOT: OnceLock<$kernel> = OnceLock::new();
                SLOT.get_or_init(|| {
                    log::debug!("initializing {} kernel", <$ty as Primitive>::DATA_TYPE);
                    <$kernel>::default()
                })
            }
        )*
    };
}

kernel_slot! {
    uint8_kernel: u8 => IntegerKernel<u8>;
    int8_kernel: i8 => IntegerKernel<i8>;
    int16_kernel: i16 => IntegerKernel<i16>;
    uint16_kernel: u16 => IntegerKernel<u16>;
    int32_kernel: i32 => IntegerKernel<i32>;
    uint32_kernel: u32 => IntegerKernel<u32>;
    int64_kernel: i64 => IntegerKernel<i64>;
    uint64_kernel: u64 => IntegerKernel<u64>;
    float32_kernel: f32 => FloatKernel<f32>;
    float64_kernel: f64 => FloatKernel<f64>;
    decimal_kernel: Decimal => DecimalKernel;
    bool_kernel: bool => BoolKernel;
    char_kernel: char => CharKernel;
}

/// The kernel for `T`. Types outside the supported set do not implement [`Primitive`], so
/// asking for one is a compile error.
pub fn get_kernel<T: Primitive>() -> &'static dyn Kernel<T> {
    T::kernel()
}

/// Bind `$t` to the Rust type behind a runtime [`DataType`] and evaluate `$body`.
macro_rules! with_data_type {
    ($data_type:expr, $t:ident => $body:expr) => {
        match $data_type {
            DataType::UInt8 => {
                type $t = u8;
                $body
            }
            DataType::Int8 => {
                type $t = i8;
                $body
            }
            DataType::Int16 => {
                type $t = i16;
                $body
            }
            DataType::UInt16 => {
                type $t = u16;
                $body
            }
            DataType::Int32 => {
                type $t = i32;
                $body
            }
            DataType::UInt32 => {
                type $t = u32;
                $body
            }
            DataType::Int64 => {
                type $t = i64;
                $body
            }
            DataType::UInt64 => {
                type $t = u64;
                $body
            }
            DataType::Float32 => {
                type $t = f32;
                $body
            }
            DataType::Float64 => {
                type $t = f64;
                $body
            }
            DataType::Decimal => {
                type $t = Decimal;
                $body
            }
            DataType::Bool => {
                type $t = bool;
                $body
            }
            DataType::Char => {
                type $t = char;
                $body
            }
        }
    };
}

pub(crate) use with_data_type;

/// Whether `op` is defined for columns of `data_type`.
pub fn supports(data_type: DataType, op: Operator) -> bool {
    with_data_type!(data_type, T => get_kernel::<T>().supports(op))
}
