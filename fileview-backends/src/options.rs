//! Configuration for the plain-text backend.

use arrow_schema::DataType;

/// How to parse a plain-text catalog.
///
/// Defaults: whitespace separated, `#` starts a comment, no header rows
/// skipped, every column parsed as `Float64`, all columns kept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextOptions {
    /// Names of the columns in file order. When empty, names are generated
    /// as `col0`, `col1`, ... from the first data line.
    pub names: Vec<String>,
    /// Subset of `names` to keep; `None` keeps every column.
    pub usecols: Option<Vec<String>>,
    /// Character starting a comment that runs to the end of the line.
    pub comment: Option<char>,
    /// Field separator; `None` splits on runs of whitespace.
    pub delimiter: Option<char>,
    /// Number of leading lines to ignore.
    pub skip_rows: usize,
    /// Scalar type of every column.
    pub dtype: DataType,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            usecols: None,
            comment: Some('#'),
            delimiter: None,
            skip_rows: 0,
            dtype: DataType::Float64,
        }
    }
}

impl TextOptions {
    /// Set the column names.
    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Keep only these columns.
    #[must_use]
    pub fn with_usecols<I, S>(mut self, usecols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.usecols = Some(usecols.into_iter().map(Into::into).collect());
        self
    }

    /// Set or clear the comment character.
    #[must_use]
    pub fn with_comment(mut self, comment: Option<char>) -> Self {
        self.comment = comment;
        self
    }

    /// Split on `delimiter` instead of whitespace.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Skip leading lines.
    #[must_use]
    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    /// Parse every column as `dtype`.
    #[must_use]
    pub fn with_dtype(mut self, dtype: DataType) -> Self {
        self.dtype = dtype;
        self
    }
}
