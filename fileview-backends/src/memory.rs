//! A backend over a record batch held in memory.

use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, RecordBatch, UInt64Array};
use arrow_schema::{ArrowError, Field, Schema, SchemaRef};
use arrow_select::take::take_record_batch;
use fileview::{Backend, BackendError, Scalar, vector_type};

/// Serves reads from one in-memory `RecordBatch`.
///
/// Unit-stride reads are zero-copy slices; strided reads gather rows with `take`.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    batch: RecordBatch,
}

impl MemoryBackend {
    /// Wrap an existing batch.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Start building a batch column by column.
    pub fn builder() -> MemoryBuilder {
        MemoryBuilder::default()
    }

    /// The backing batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }
}

impl Backend for MemoryBackend {
    fn size(&self) -> usize {
        self.batch.num_rows()
    }

    fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    fn read(
        &self,
        columns: &[&str],
        start: usize,
        stop: usize,
        step: usize,
    ) -> Result<RecordBatch, BackendError> {
        let size = self.size();
        if step == 0 || start > stop || stop > size {
            return Err(BackendError::InvalidRange {
                start,
                stop,
                step,
                size,
            });
        }
        let schema = self.batch.schema();
        let indices = columns
            .iter()
            .map(|column| {
                schema
                    .index_of(column)
                    .map_err(|_| BackendError::UnknownColumn {
                        column: (*column).to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let projected = self.batch.project(&indices)?;
        if step == 1 {
            return Ok(projected.slice(start, stop - start));
        }
        let rows = UInt64Array::from_iter_values((start..stop).step_by(step).map(|r| r as u64));
        Ok(take_record_batch(&projected, &rows)?)
    }

    fn kind(&self) -> &str {
        "MemoryFile"
    }
}

/// Column-by-column builder for a [`MemoryBackend`].
#[derive(Debug, Default)]
pub struct MemoryBuilder {
    columns: Vec<PendingColumn>,
}

#[derive(Debug)]
struct PendingColumn {
    name: String,
    values: ArrayRef,
    width: Option<usize>,
}

impl MemoryBuilder {
    /// Append a scalar column.
    #[must_use]
    pub fn column<S: Scalar>(mut self, name: impl Into<String>, values: Vec<S>) -> Self {
        self.columns.push(PendingColumn {
            name: name.into(),
            values: S::into_array(values),
            width: None,
        });
        self
    }

    /// Append a vector column of `width` values per row, given row-major.
    #[must_use]
    pub fn vector_column<S: Scalar>(
        mut self,
        name: impl Into<String>,
        width: usize,
        values: Vec<S>,
    ) -> Self {
        self.columns.push(PendingColumn {
            name: name.into(),
            values: S::into_array(values),
            width: Some(width),
        });
        self
    }

    /// Assemble the batch.
    ///
    /// # Errors
    /// Returns `BackendError::Arrow` if no column was added, the columns have
    /// different lengths, or a vector column's values are not a multiple of
    /// its width.
    pub fn finish(self) -> Result<MemoryBackend, BackendError> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let base = column.values.data_type().clone();
            match column.width {
                None => {
                    fields.push(Field::new(column.name, base, false));
                    arrays.push(column.values);
                }
                Some(width) => {
                    let size = i32::try_from(width).map_err(|_| {
                        ArrowError::InvalidArgumentError(format!(
                            "vector width {width} of column '{}' too large",
                            column.name
                        ))
                    })?;
                    let item = Arc::new(Field::new("item", base.clone(), false));
                    let list = FixedSizeListArray::try_new(item, size, column.values, None)?;
                    fields.push(Field::new(column.name, vector_type(base, &[width]), false));
                    arrays.push(Arc::new(list) as ArrayRef);
                }
            }
        }
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(MemoryBackend::new(batch))
    }
}
