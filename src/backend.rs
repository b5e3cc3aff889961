//! The contract a concrete file reader implements.

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;

use crate::error::BackendError;

/// Physical row-range reads over one data source.
///
/// A backend only needs to know its row count, its structured element type
/// and how to read a strided row range of some of its columns. Column
/// selection, negative indices, flattening and secondary-axis indexing are
/// handled by [`FileView`](crate::FileView).
pub trait Backend: Send + Sync {
    /// Total number of rows.
    fn size(&self) -> usize;

    /// Structured element type. Each field is a primitive type, optionally
    /// nested in fixed-size lists to give it a vector sub-shape.
    fn schema(&self) -> SchemaRef;

    /// Read `columns`, in that order, for rows `start, start + step, ...` below `stop`.
    ///
    /// Callers guarantee `0 <= start <= stop <= size`, `step >= 1` and that every
    /// column name comes from [`schema`](Backend::schema). The returned batch holds
    /// exactly [`get_slice_size(start, stop, step)`](crate::get_slice_size) rows.
    ///
    /// # Errors
    /// Any failure of the underlying source, reported as a [`BackendError`].
    fn read(
        &self,
        columns: &[&str],
        start: usize,
        stop: usize,
        step: usize,
    ) -> Result<RecordBatch, BackendError>;

    /// Short name used when printing a file view.
    fn kind(&self) -> &str {
        "FileView"
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn schema(&self) -> SchemaRef {
        (**self).schema()
    }

    fn read(
        &self,
        columns: &[&str],
        start: usize,
        stop: usize,
        step: usize,
    ) -> Result<RecordBatch, BackendError> {
        (**self).read(columns, start, stop, step)
    }

    fn kind(&self) -> &str {
        (**self).kind()
    }
}
