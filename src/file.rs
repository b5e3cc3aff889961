//! The file view: column selection, row slicing and flattening over a backend.

use std::{collections::HashSet, fmt};

use arrow_array::{RecordBatch, UInt64Array};
use arrow_select::take::take_record_batch;
use tracing::{debug, trace};

use crate::{
    array::{FlatArray, format_shape, reinterpret},
    backend::Backend,
    error::{BackendError, ConversionError, FileError, IndexError},
    index::{Index, RowRange},
    schema::{DType, base_type, subshape, validate_schema},
};

/// Who performs physical reads for a view.
enum Backing<'a> {
    /// The root view owns the backend and its resources.
    Owned(Box<dyn Backend + 'a>),
    /// Derived views borrow the root's backend.
    Base(&'a (dyn Backend + 'a)),
}

/// Metadata describing what a view exposes. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewMeta {
    dtype: DType,
    size: usize,
    /// Set on flattened views to remember the original field order.
    columns: Option<Vec<String>>,
    /// Set on flattened views; otherwise `(size,)`.
    shape: Option<Vec<usize>>,
}

impl ViewMeta {
    fn columns(&self) -> Vec<&str> {
        match &self.columns {
            Some(columns) => columns.iter().map(String::as_str).collect(),
            None => self.dtype.names().unwrap_or_default(),
        }
    }

    fn shape(&self) -> Vec<usize> {
        self.shape.clone().unwrap_or_else(|| vec![self.size])
    }

    /// Narrow to `names`, in that order.
    fn select(&self, names: &[&str]) -> Result<ViewMeta, IndexError> {
        if !self.dtype.is_structured() {
            return Err(IndexError::FlattenedView);
        }
        if names.is_empty() {
            return Err(IndexError::EmptySelection);
        }
        let keys = self.columns();
        let invalid: Vec<&str> = names
            .iter()
            .filter(|name| !keys.contains(*name))
            .copied()
            .collect();
        if !invalid.is_empty() {
            return Err(IndexError::invalid_keys(invalid, &keys));
        }
        let mut seen = HashSet::with_capacity(names.len());
        if let Some(dup) = names.iter().find(|name| !seen.insert(**name)) {
            return Err(IndexError::DuplicateKey {
                key: (*dup).to_string(),
            });
        }
        let dtype = self
            .dtype
            .project(names)
            .ok_or_else(|| IndexError::invalid_keys(names.iter().copied(), &keys))?;
        Ok(ViewMeta {
            dtype,
            size: self.size,
            columns: None,
            shape: None,
        })
    }

    /// Stack the named fields into a single homogeneous array.
    fn flatten(&self) -> Result<ViewMeta, ConversionError> {
        let fields = match &self.dtype {
            DType::Struct(fields) if !fields.is_empty() => fields,
            _ => return Err(ConversionError::NoNamedFields),
        };
        if fields.len() > 1 {
            let vector = fields.iter().find_map(|f| {
                let shape = subshape(f.data_type());
                (!shape.is_empty()).then(|| (f.name().clone(), shape))
            });
            if let Some((column, shape)) = vector {
                return Err(ConversionError::MultipleVectorFields { column, shape });
            }
        }
        let first = base_type(fields[0].data_type());
        if let Some(other) = fields
            .iter()
            .find(|f| base_type(f.data_type()) != first)
        {
            return Err(ConversionError::MixedBaseTypes {
                column: other.name().clone(),
                expected: first.clone(),
                found: base_type(other.data_type()).clone(),
            });
        }

        let mut shape = vec![self.size];
        if fields.len() == 1 {
            shape.extend(subshape(fields[0].data_type()));
        } else {
            shape.push(fields.len());
        }
        Ok(ViewMeta {
            dtype: DType::Scalar(first.clone()),
            size: self.size,
            columns: Some(self.columns().into_iter().map(str::to_string).collect()),
            shape: Some(shape),
        })
    }
}

/// Data returned by a row read.
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    /// Structured rows of a view with named fields.
    Records(RecordBatch),
    /// Homogeneous rows of a flattened view.
    Array(FlatArray),
}

impl Rows {
    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        match self {
            Rows::Records(batch) => batch.num_rows(),
            Rows::Array(array) => array.len(),
        }
    }

    /// The structured rows, if any.
    pub fn into_records(self) -> Option<RecordBatch> {
        match self {
            Rows::Records(batch) => Some(batch),
            Rows::Array(_) => None,
        }
    }

    /// The homogeneous array, if any.
    pub fn into_array(self) -> Option<FlatArray> {
        match self {
            Rows::Array(array) => Some(array),
            Rows::Records(_) => None,
        }
    }
}

/// Result of [`FileView::get`].
#[derive(Debug)]
pub enum Selection<'v> {
    /// A lazily derived view; nothing has been read yet.
    View(FileView<'v>),
    /// Structured rows.
    Records(RecordBatch),
    /// A homogeneous array.
    Array(FlatArray),
}

impl<'v> Selection<'v> {
    /// The derived view, if any.
    pub fn into_view(self) -> Option<FileView<'v>> {
        match self {
            Selection::View(view) => Some(view),
            _ => None,
        }
    }

    /// The structured rows, if any.
    pub fn into_records(self) -> Option<RecordBatch> {
        match self {
            Selection::Records(batch) => Some(batch),
            _ => None,
        }
    }

    /// The homogeneous array, if any.
    pub fn into_array(self) -> Option<FlatArray> {
        match self {
            Selection::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<Rows> for Selection<'_> {
    fn from(rows: Rows) -> Self {
        match rows {
            Rows::Records(batch) => Selection::Records(batch),
            Rows::Array(array) => Selection::Array(array),
        }
    }
}

/// A structured, array-like facade over a [`Backend`].
///
/// The root view owns the backend. Selecting columns or flattening builds a
/// new view that borrows the root's backend and reads through it; nothing is
/// read until rows are requested.
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_array::{ArrayRef, Float32Array, RecordBatch};
/// # use arrow_schema::{DataType, Field, Schema, SchemaRef};
/// # use fileview::{Backend, BackendError, FileView};
/// # struct Table(RecordBatch);
/// # impl Backend for Table {
/// #     fn size(&self) -> usize { self.0.num_rows() }
/// #     fn schema(&self) -> SchemaRef { self.0.schema() }
/// #     fn read(&self, columns: &[&str], start: usize, stop: usize, step: usize)
/// #         -> Result<RecordBatch, BackendError> {
/// #         assert_eq!(step, 1);
/// #         let idx: Vec<usize> = columns.iter().map(|c| self.0.schema().index_of(c).unwrap()).collect();
/// #         Ok(self.0.project(&idx)?.slice(start, stop - start))
/// #     }
/// # }
/// # let schema = Arc::new(Schema::new(vec![
/// #     Field::new("ra", DataType::Float32, false),
/// #     Field::new("dec", DataType::Float32, false),
/// # ]));
/// # let columns: Vec<ArrayRef> = vec![
/// #     Arc::new(Float32Array::from(vec![235.6, 140.4, 130.0])),
/// #     Arc::new(Float32Array::from(vec![59.4, -1.2, 46.0])),
/// # ];
/// # let table = Table(RecordBatch::try_new(schema, columns).unwrap());
/// let file = FileView::new(table)?;
/// let radec = file.select(&["dec", "ra"])?;
/// let flat = radec.asarray()?;
/// assert_eq!(flat.shape(), vec![3, 2]);
/// let dec = flat.rows((.., 0))?.into_array().unwrap();
/// assert_eq!(dec.to_vec::<f32>().unwrap(), vec![59.4, -1.2, 46.0]);
/// # Ok::<(), fileview::FileError>(())
/// ```
pub struct FileView<'a> {
    backing: Backing<'a>,
    meta: ViewMeta,
}

impl<'a> FileView<'a> {
    /// Create the root view over `backend`.
    ///
    /// # Errors
    /// Returns `FileError::Schema` if the backend's schema has no columns,
    /// repeats a name, or contains a field that is not a primitive or a
    /// fixed-size vector of primitives.
    pub fn new<B: Backend + 'a>(backend: B) -> Result<Self, FileError> {
        let schema = backend.schema();
        validate_schema(&schema)?;
        let meta = ViewMeta {
            dtype: DType::Struct(schema.fields().clone()),
            size: backend.size(),
            columns: None,
            shape: None,
        };
        debug!(kind = backend.kind(), size = meta.size, dtype = %meta.dtype, "opened file view");
        Ok(Self {
            backing: Backing::Owned(Box::new(backend)),
            meta,
        })
    }
}

impl FileView<'_> {
    /// Build a view over the same backend with new metadata.
    fn derive(&self, meta: ViewMeta) -> FileView<'_> {
        trace!(
            parent = ?self.meta.dtype,
            dtype = %meta.dtype,
            shape = ?meta.shape(),
            "derived view"
        );
        FileView {
            backing: Backing::Base(self.backend()),
            meta,
        }
    }

    /// The backend that performs physical reads for this view.
    pub fn backend(&self) -> &dyn Backend {
        match &self.backing {
            Backing::Owned(backend) => &**backend,
            Backing::Base(backend) => *backend,
        }
    }

    /// The backend this view delegates to, or `None` for the root view.
    pub fn base(&self) -> Option<&dyn Backend> {
        match &self.backing {
            Backing::Owned(_) => None,
            Backing::Base(backend) => Some(*backend),
        }
    }

    /// Returns `true` for the view that owns its backend.
    pub fn is_root(&self) -> bool {
        matches!(self.backing, Backing::Owned(_))
    }

    /// Element type.
    pub fn dtype(&self) -> &DType {
        &self.meta.dtype
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.meta.size
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.meta.size
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.meta.size == 0
    }

    /// Column names, which default to the dtype's field names.
    ///
    /// A flattened view keeps the field names it was built from even though
    /// its dtype no longer has named fields.
    pub fn columns(&self) -> Vec<&str> {
        self.meta.columns()
    }

    /// Alias for [`columns`](Self::columns).
    pub fn keys(&self) -> Vec<&str> {
        self.columns()
    }

    /// Number of columns.
    pub fn ncol(&self) -> usize {
        self.columns().len()
    }

    /// Shape of the view; `(size,)` unless flattened.
    pub fn shape(&self) -> Vec<usize> {
        self.meta.shape()
    }

    /// Iterate over column names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns().into_iter()
    }

    /// Restrict the view to `names`, in the given order.
    ///
    /// # Errors
    /// Returns `IndexError` if the view is flattened, `names` is empty,
    /// repeats a column, or names a column the view does not have.
    pub fn select(&self, names: &[&str]) -> Result<FileView<'_>, FileError> {
        let meta = self.meta.select(names)?;
        Ok(self.derive(meta))
    }

    /// A flattened view of a single column.
    ///
    /// # Errors
    /// Same as [`select`](Self::select).
    pub fn column(&self, name: &str) -> Result<FileView<'_>, FileError> {
        let meta = self.meta.select(&[name])?.flatten()?;
        Ok(self.derive(meta))
    }

    /// View the named fields as columns of one homogeneous array.
    ///
    /// A single field keeps its vector sub-shape, giving shape
    /// `(size,) + subshape`; several scalar fields give `(size, nfields)`.
    ///
    /// # Errors
    /// Returns `ConversionError` if the view has no named fields, mixes vector
    /// fields with other fields, or its fields do not share a scalar type.
    pub fn asarray(&self) -> Result<FileView<'_>, FileError> {
        let meta = self.meta.flatten()?;
        Ok(self.derive(meta))
    }

    /// Resolve any index expression.
    ///
    /// Column names give derived views; integers, slices and tuples read rows.
    pub fn get(&self, index: impl Into<Index>) -> Result<Selection<'_>, FileError> {
        match index.into() {
            Index::Column(name) => self.column(&name).map(Selection::View),
            Index::Columns(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                self.select(&names).map(Selection::View)
            }
            other => self.rows(other).map(Selection::from),
        }
    }

    /// Read rows selected by an integer, a slice, or a tuple of those.
    ///
    /// The first tuple entry indexes rows; a second entry indexes the trailing
    /// axis of a flattened view and is applied after the read.
    ///
    /// # Errors
    /// Returns `IndexError` for unsupported or out-of-range indices,
    /// `FileError::Reinterpret` if the read rows cannot be viewed as the
    /// flattened dtype, and `FileError::Backend` if the read fails.
    pub fn rows(&self, index: impl Into<Index>) -> Result<Rows, FileError> {
        let (row_index, axis_index) = match index.into() {
            Index::Tuple(items) => self.split_tuple(items)?,
            other => (other, None),
        };
        let range = match row_index {
            Index::Row(i) => RowRange::single(i, self.meta.size)?,
            Index::Slice(slice) => slice.resolve(self.meta.size)?,
            other => return Err(IndexError::unsupported(other.kind()).into()),
        };
        if let Some(axis) = &axis_index {
            if !matches!(axis, Index::Row(_) | Index::Slice(_)) {
                return Err(IndexError::unsupported(axis.kind()).into());
            }
        }

        let rows = self.read_range(range)?;
        match (rows, axis_index) {
            (rows, None) => Ok(rows),
            (Rows::Array(array), Some(axis)) => Ok(Rows::Array(array.index_axis(&axis)?)),
            (Rows::Records(_), Some(_)) => Err(IndexError::RankMismatch {
                rank: 1,
                got: 2,
            }
            .into()),
        }
    }

    fn split_tuple(&self, items: Vec<Index>) -> Result<(Index, Option<Index>), FileError> {
        let rank = self.meta.shape().len();
        if items.len() > rank {
            return Err(IndexError::RankMismatch {
                rank,
                got: items.len(),
            }
            .into());
        }
        let len = items.len();
        let mut items = items.into_iter();
        match (items.next(), items.next(), items.next()) {
            (Some(first), second, None) => Ok((first, second)),
            _ => Err(IndexError::unsupported(format!("tuple of length {len}")).into()),
        }
    }

    /// Read an ascending row range through the owning backend.
    pub fn read_range(&self, range: RowRange) -> Result<Rows, FileError> {
        let columns = self.columns();
        let backend = self.backend();
        debug!(
            kind = backend.kind(),
            columns = ?columns,
            start = range.start,
            stop = range.stop,
            step = range.step,
            delegated = !self.is_root(),
            "reading rows"
        );
        let batch = backend.read(&columns, range.start, range.stop, range.step)?;
        match &self.meta.dtype {
            DType::Struct(_) if range.reversed => Ok(Rows::Records(reverse_batch(&batch)?)),
            DType::Struct(_) => Ok(Rows::Records(batch)),
            DType::Scalar(scalar) => {
                let shape = self.meta.shape();
                let array = reinterpret(&batch, scalar, &shape[1..])?;
                if range.reversed {
                    array.reverse_rows().map(Rows::Array)
                } else {
                    Ok(Rows::Array(array))
                }
            }
        }
    }
}

fn reverse_batch(batch: &RecordBatch) -> Result<RecordBatch, BackendError> {
    let rows = batch.num_rows() as u64;
    let indices = UInt64Array::from_iter_values((0..rows).rev());
    Ok(take_record_batch(batch, &indices)?)
}

impl<'v> IntoIterator for &'v FileView<'_> {
    type Item = &'v str;
    type IntoIter = std::vec::IntoIter<&'v str>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns().into_iter()
    }
}

impl fmt::Display for FileView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} with {} column(s) and shape {}>",
            self.backend().kind(),
            self.ncol(),
            format_shape(&self.shape())
        )
    }
}

impl fmt::Debug for FileView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileView")
            .field("kind", &self.backend().kind())
            .field("root", &self.is_root())
            .field("dtype", &self.meta.dtype)
            .field("size", &self.meta.size)
            .field("columns", &self.columns())
            .field("shape", &self.shape())
            .finish()
    }
}
