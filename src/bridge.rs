//! Bindings between Rust scalar types and Arrow primitive types.

use std::sync::Arc;

use arrow_array::{
    ArrayRef, ArrowPrimitiveType, PrimitiveArray,
    types::{
        Float16Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type,
        UInt8Type, UInt16Type, UInt32Type, UInt64Type,
    },
};
use arrow_schema::DataType;
use half::f16;

/// A Rust scalar that can live in a file view column.
pub trait Scalar: Copy + Send + Sync + 'static {
    /// The Arrow primitive type storing values of this scalar.
    type Arrow: ArrowPrimitiveType<Native = Self>;

    /// Arrow data type for this scalar.
    fn data_type() -> DataType {
        <Self::Arrow as ArrowPrimitiveType>::DATA_TYPE
    }

    /// Build a non-nullable Arrow array from owned values.
    fn into_array(values: Vec<Self>) -> ArrayRef {
        Arc::new(PrimitiveArray::<Self::Arrow>::from_iter_values(values))
    }
}

macro_rules! impl_scalar {
    ($rust:ty, $atype:ty) => {
        impl Scalar for $rust {
            type Arrow = $atype;
        }
    };
}

impl_scalar!(i8, Int8Type);
impl_scalar!(i16, Int16Type);
impl_scalar!(i32, Int32Type);
impl_scalar!(i64, Int64Type);
impl_scalar!(u8, UInt8Type);
impl_scalar!(u16, UInt16Type);
impl_scalar!(u32, UInt32Type);
impl_scalar!(u64, UInt64Type);
impl_scalar!(f16, Float16Type);
impl_scalar!(f32, Float32Type);
impl_scalar!(f64, Float64Type);
