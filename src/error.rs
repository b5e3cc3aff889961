//! Error types for file views.

use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

/// Error type for backends whose schema cannot be exposed as a file view.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The backend does not expose a single column.
    #[error("backend schema has no columns")]
    Empty,
    /// Two fields share the same name.
    #[error("duplicate field name '{field_name}' in backend schema")]
    DuplicateField {
        /// The repeated field name.
        field_name: String,
    },
    /// A field is neither a primitive nor a fixed-size vector of primitives.
    #[error("unsupported type {data_type} for field '{field_name}'; expected a primitive or fixed-size list of primitives")]
    UnsupportedType {
        /// Name of the offending field.
        field_name: String,
        /// Its Arrow data type.
        data_type: DataType,
    },
}

impl SchemaError {
    /// Create an unsupported type error.
    pub fn unsupported(field_name: impl Into<String>, data_type: DataType) -> Self {
        Self::UnsupportedType {
            field_name: field_name.into(),
            data_type,
        }
    }
}

/// Errors raised while resolving an index expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// One or more requested column names do not exist.
    #[error("invalid string keys: {invalid:?}; valid keys are {valid:?}")]
    InvalidKeys {
        /// The requested names that are not columns of the view.
        invalid: Vec<String>,
        /// The columns that were checked against.
        valid: Vec<String>,
    },
    /// Name based access after the view was flattened.
    #[error(
        "cannot access view of specific columns after `asarray()` has been called; use integer or slice indexing instead"
    )]
    FlattenedView,
    /// Column selection with an empty list of names.
    #[error("column selection must name at least one column")]
    EmptySelection,
    /// The same column was requested twice.
    #[error("column '{key}' selected more than once")]
    DuplicateKey {
        /// The repeated name.
        key: String,
    },
    /// The index expression is not understood.
    #[error("index of kind '{kind}' not understood; expected an integer or slice")]
    Unsupported {
        /// Description of the received index.
        kind: String,
    },
    /// A tuple index has more entries than the view has dimensions.
    #[error("file dimension is {rank}, but you supplied tuple of length {got}")]
    RankMismatch {
        /// Rank of the view's shape.
        rank: usize,
        /// Length of the supplied tuple.
        got: usize,
    },
    /// Integer row index outside `[-size, size)`.
    #[error("row index {index} out of bounds for size {size}")]
    RowOutOfBounds {
        /// The index as supplied by the caller.
        index: isize,
        /// Number of rows in the view.
        size: usize,
    },
    /// Integer index on the trailing axis outside `[-len, len)`.
    #[error("index {index} out of bounds for axis {axis} with length {len}")]
    AxisOutOfBounds {
        /// The index as supplied by the caller.
        index: isize,
        /// The axis being indexed.
        axis: usize,
        /// Length of that axis.
        len: usize,
    },
    /// Slice with a step of zero.
    #[error("slice step cannot be zero")]
    ZeroStep,
}

impl IndexError {
    /// Create an invalid keys error.
    pub fn invalid_keys<I, S>(invalid: I, valid: &[&str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::InvalidKeys {
            invalid: invalid.into_iter().map(Into::into).collect(),
            valid: valid.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Create an unsupported index error.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::Unsupported { kind: kind.into() }
    }
}

/// Violated precondition of `FileView::asarray`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The dtype is already flat or has no fields.
    #[error("no named dtype fields to convert to array")]
    NoNamedFields,
    /// Several fields where at least one carries a vector sub-shape.
    #[error("cannot convert multiple vector data types to array (field '{column}' has shape {shape:?})")]
    MultipleVectorFields {
        /// First vector-valued field found.
        column: String,
        /// Its sub-shape.
        shape: Vec<usize>,
    },
    /// Fields do not share a single scalar type.
    #[error("cannot convert data types of different types to single array: field '{column}' is {found}, expected {expected}")]
    MixedBaseTypes {
        /// First field whose base type differs.
        column: String,
        /// Base type of the first field.
        expected: DataType,
        /// Base type of `column`.
        found: DataType,
    },
}

/// Errors produced by backends while performing physical reads.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failure reported by Arrow while assembling a batch.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// A requested column is not provided by the backend.
    #[error("unknown column '{column}'")]
    UnknownColumn {
        /// The missing column.
        column: String,
    },
    /// Row range outside `0 <= start <= stop <= size` or a zero step.
    #[error("invalid row range {start}..{stop} step {step} for size {size}")]
    InvalidRange {
        /// First row.
        start: usize,
        /// One past the last row.
        stop: usize,
        /// Stride.
        step: usize,
        /// Number of rows in the backend.
        size: usize,
    },
    /// Malformed input data.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// One-based column position.
        column: usize,
        /// Description of the problem.
        message: String,
    },
    /// Custom error from a third-party backend.
    #[error("backend error: {0}")]
    Custom(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl BackendError {
    /// Wrap a backend specific error.
    pub fn custom<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Custom(Box::new(err))
    }
}

/// Umbrella error returned by file view operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// Backend rejected at construction.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Bad index expression.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// `asarray` precondition failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// The read buffer could not be viewed as the flattened dtype.
    #[error("error trying to view slice as a single array: {message}")]
    Reinterpret {
        /// Description of the underlying cause.
        message: String,
    },
    /// Propagated unchanged from the backend.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl FileError {
    /// Create a reinterpretation error.
    pub fn reinterpret(message: impl ToString) -> Self {
        Self::Reinterpret {
            message: message.to_string(),
        }
    }
}
