#![deny(missing_docs)]
//! fileview core: random-access structured file views over Arrow data.
//!
//! A [`FileView`] wraps a [`Backend`] that can read strided row ranges of
//! some of its columns. On top of that it provides column selection,
//! integer / slice / tuple row indexing with Python slice semantics, and
//! flattening of same-typed fields into one homogeneous [`FlatArray`].

pub mod array;
pub mod backend;
pub mod bridge;
pub mod error;
pub mod file;
pub mod index;
pub mod schema;

/// Prelude exporting the most common types and traits.
pub mod prelude {
    pub use crate::{
        backend::Backend,
        bridge::Scalar,
        file::{FileView, Rows, Selection},
        index::{Index, Slice},
    };
}

// Re-export Arrow crates so backends can name the exact versions used here.
pub use arrow_array;
pub use arrow_buffer;
pub use arrow_schema;

pub use crate::{
    array::FlatArray,
    backend::Backend,
    bridge::Scalar,
    error::{BackendError, ConversionError, FileError, IndexError, SchemaError},
    file::{FileView, Rows, Selection},
    index::{Index, RowRange, Slice, get_slice_size},
    schema::{DType, base_type, subshape, vector_type},
};
