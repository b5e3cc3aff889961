//! Homogeneous row-major arrays produced by flattened views.

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, ArrowPrimitiveType, RecordBatch, UInt64Array, cast::AsArray};
use arrow_schema::DataType;
use arrow_select::{interleave::interleave, take::take};

use crate::{
    bridge::Scalar,
    error::{FileError, IndexError},
    index::{Index, resolve_position},
    schema::row_width,
};

/// A homogeneous array: one primitive Arrow array laid out row-major in `shape`.
#[derive(Debug, Clone)]
pub struct FlatArray {
    values: ArrayRef,
    shape: Vec<usize>,
}

impl PartialEq for FlatArray {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.values.to_data() == other.values.to_data()
    }
}

impl FlatArray {
    /// Wrap `values` with the given shape.
    ///
    /// # Errors
    /// Returns `FileError::Reinterpret` if the shape does not cover exactly
    /// `values.len()` elements or the values are not primitive.
    pub fn try_new(values: ArrayRef, shape: Vec<usize>) -> Result<Self, FileError> {
        if !values.data_type().is_primitive() {
            return Err(FileError::reinterpret(format!(
                "{} is not a primitive type",
                values.data_type()
            )));
        }
        let expected: usize = shape.iter().product();
        if shape.is_empty() || expected != values.len() {
            return Err(FileError::reinterpret(format!(
                "cannot reshape array of size {} into shape {}",
                values.len(),
                format_shape(&shape)
            )));
        }
        Ok(Self { values, shape })
    }

    /// The flat values in row-major order.
    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    /// The shape; the first axis is rows.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.shape[0]
    }

    /// Returns `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scalar type of the elements.
    pub fn data_type(&self) -> &DataType {
        self.values.data_type()
    }

    /// Borrow the values as a native slice, if `T` matches the element type.
    pub fn as_slice<T: ArrowPrimitiveType>(&self) -> Option<&[T::Native]> {
        let array = self.values.as_primitive_opt::<T>()?;
        let values: &[T::Native] = array.values();
        Some(values)
    }

    /// Copy the values out, if `S` matches the element type.
    pub fn to_vec<S: Scalar>(&self) -> Option<Vec<S>> {
        self.as_slice::<S::Arrow>().map(<[S]>::to_vec)
    }

    /// Elements per row.
    fn row_stride(&self) -> usize {
        self.shape[1..].iter().product()
    }

    /// Apply an integer or slice index to axis 1.
    ///
    /// An integer drops the axis, a slice keeps it.
    ///
    /// # Errors
    /// Returns `IndexError` if the array has a single axis, the index is not an
    /// integer or slice, or an integer is out of bounds.
    pub fn index_axis(&self, index: &Index) -> Result<FlatArray, FileError> {
        if self.ndim() < 2 {
            return Err(IndexError::RankMismatch {
                rank: self.ndim(),
                got: 2,
            }
            .into());
        }
        let axis_len = self.shape[1];
        let (positions, keep_axis) = match index {
            Index::Row(i) => {
                let pos = resolve_position(*i, axis_len).ok_or(IndexError::AxisOutOfBounds {
                    index: *i,
                    axis: 1,
                    len: axis_len,
                })?;
                (vec![pos], false)
            }
            Index::Slice(slice) => {
                let range = slice.resolve(axis_len)?;
                let mut positions: Vec<usize> =
                    (range.start..range.stop).step_by(range.step).collect();
                if range.reversed {
                    positions.reverse();
                }
                (positions, true)
            }
            other => return Err(IndexError::unsupported(other.kind()).into()),
        };

        let inner: usize = self.shape[2..].iter().product();
        let stride = self.row_stride();
        let mut indices = Vec::with_capacity(self.len() * positions.len() * inner);
        for row in 0..self.len() {
            for &pos in &positions {
                let offset = row * stride + pos * inner;
                indices.extend((offset..offset + inner).map(|i| i as u64));
            }
        }
        let values = take(self.values.as_ref(), &UInt64Array::from(indices), None)
            .map_err(FileError::reinterpret)?;

        let mut shape = vec![self.len()];
        if keep_axis {
            shape.push(positions.len());
        }
        shape.extend_from_slice(&self.shape[2..]);
        FlatArray::try_new(values, shape)
    }

    /// Reverse the order of rows.
    pub fn reverse_rows(&self) -> Result<FlatArray, FileError> {
        let stride = self.row_stride();
        let indices: Vec<u64> = (0..self.len())
            .rev()
            .flat_map(|row| (row * stride..(row + 1) * stride).map(|i| i as u64))
            .collect();
        let values = take(self.values.as_ref(), &UInt64Array::from(indices), None)
            .map_err(FileError::reinterpret)?;
        FlatArray::try_new(values, self.shape.clone())
    }
}

/// Format a shape the way tuples print, e.g. `(10,)` or `(10, 3)`.
pub fn format_shape(shape: &[usize]) -> String {
    match shape {
        [single] => format!("({single},)"),
        _ => {
            let parts: Vec<String> = shape.iter().map(ToString::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Strip fixed-size list layers, returning the contiguous scalar values.
fn leaf_values(column: &ArrayRef) -> ArrayRef {
    match column.as_fixed_size_list_opt() {
        Some(list) => {
            let width = usize::try_from(list.value_length()).unwrap_or(0);
            let start = if list.is_empty() {
                0
            } else {
                usize::try_from(list.value_offset(0)).unwrap_or(0)
            };
            leaf_values(&list.values().slice(start, list.len() * width))
        }
        None => Arc::clone(column),
    }
}

/// View a structured batch as a homogeneous array of `scalar`.
///
/// The per-row values of all columns are concatenated in column order, then
/// reshaped to `(-1,) + trailing`.
pub(crate) fn reinterpret(
    batch: &RecordBatch,
    scalar: &DataType,
    trailing: &[usize],
) -> Result<FlatArray, FileError> {
    let rows = batch.num_rows();
    let schema = batch.schema();
    let mut parts = Vec::with_capacity(batch.num_columns());
    let mut widths = Vec::with_capacity(batch.num_columns());
    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let values = leaf_values(column);
        if values.data_type() != scalar {
            return Err(FileError::reinterpret(format!(
                "cannot view column '{}' of type {} as {scalar}",
                field.name(),
                values.data_type()
            )));
        }
        widths.push(row_width(column.data_type()));
        parts.push(values);
    }

    let width: usize = widths.iter().sum();
    let expected: usize = trailing.iter().product();
    if width != expected {
        let mut shape = vec![rows];
        shape.extend_from_slice(trailing);
        return Err(FileError::reinterpret(format!(
            "cannot reshape rows of {width} element(s) into shape {}",
            format_shape(&shape)
        )));
    }

    let values = match parts.as_slice() {
        [] => return Err(FileError::reinterpret("batch has no columns")),
        [single] => Arc::clone(single),
        _ => {
            let mut indices = Vec::with_capacity(rows * width);
            for row in 0..rows {
                for (part, &w) in widths.iter().enumerate() {
                    indices.extend((row * w..(row + 1) * w).map(|i| (part, i)));
                }
            }
            let arrays: Vec<&dyn Array> = parts.iter().map(|p| p.as_ref()).collect();
            interleave(&arrays, &indices).map_err(FileError::reinterpret)?
        }
    };

    let mut shape = vec![rows];
    shape.extend_from_slice(trailing);
    FlatArray::try_new(values, shape)
}
