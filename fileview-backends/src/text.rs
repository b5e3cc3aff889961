//! A backend over whitespace or delimiter separated text catalogs.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use arrow_array::{
    ArrayRef, ArrowPrimitiveType, PrimitiveArray, RecordBatch,
    types::{
        Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
        UInt16Type, UInt32Type, UInt64Type,
    },
};
use arrow_schema::{ArrowError, DataType, Field, Schema, SchemaRef};
use fileview::{Backend, BackendError};
use tracing::{debug, info};

use crate::{MemoryBackend, TextOptions};

/// A text catalog parsed eagerly into memory.
///
/// Every kept column has the scalar type given by [`TextOptions::dtype`].
#[derive(Debug, Clone)]
pub struct TextBackend {
    path: Option<PathBuf>,
    inner: MemoryBackend,
}

impl TextBackend {
    /// Read and parse the file at `path`.
    ///
    /// # Errors
    /// `BackendError::Io` if the file cannot be read, `BackendError::Parse`
    /// for malformed lines, `BackendError::UnknownColumn` if `usecols` names a
    /// column missing from `names`.
    pub fn open(path: impl AsRef<Path>, options: TextOptions) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut backend = Self::from_reader(BufReader::new(file), options)?;
        info!(
            path = %path.display(),
            rows = backend.size(),
            columns = backend.inner.batch().num_columns(),
            "loaded text catalog"
        );
        backend.path = Some(path.to_path_buf());
        Ok(backend)
    }

    /// Parse a catalog from any buffered reader.
    ///
    /// # Errors
    /// Same as [`TextBackend::open`].
    pub fn from_reader(reader: impl BufRead, options: TextOptions) -> Result<Self, BackendError> {
        let batch = parse(reader, &options)?;
        Ok(Self {
            path: None,
            inner: MemoryBackend::new(batch),
        })
    }

    /// The file this catalog was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Backend for TextBackend {
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn schema(&self) -> SchemaRef {
        self.inner.schema()
    }

    fn read(
        &self,
        columns: &[&str],
        start: usize,
        stop: usize,
        step: usize,
    ) -> Result<RecordBatch, BackendError> {
        self.inner.read(columns, start, stop, step)
    }

    fn kind(&self) -> &str {
        "TextFile"
    }
}

trait ColumnParser {
    fn push(&mut self, token: &str) -> Result<(), String>;
    fn finish(self: Box<Self>) -> ArrayRef;
}

struct PrimitiveParser<T: ArrowPrimitiveType> {
    values: Vec<T::Native>,
}

impl<T: ArrowPrimitiveType> PrimitiveParser<T> {
    fn boxed() -> Box<dyn ColumnParser>
    where
        T::Native: FromStr,
    {
        Box::new(Self { values: Vec::new() })
    }
}

impl<T> ColumnParser for PrimitiveParser<T>
where
    T: ArrowPrimitiveType,
    T::Native: FromStr,
{
    fn push(&mut self, token: &str) -> Result<(), String> {
        let value = token
            .parse::<T::Native>()
            .map_err(|_| format!("cannot parse '{token}' as {}", T::DATA_TYPE))?;
        self.values.push(value);
        Ok(())
    }

    fn finish(self: Box<Self>) -> ArrayRef {
        Arc::new(PrimitiveArray::<T>::from_iter_values(self.values))
    }
}

fn new_parser(data_type: &DataType) -> Result<Box<dyn ColumnParser>, BackendError> {
    let parser = match data_type {
        DataType::Int8 => PrimitiveParser::<Int8Type>::boxed(),
        DataType::Int16 => PrimitiveParser::<Int16Type>::boxed(),
        DataType::Int32 => PrimitiveParser::<Int32Type>::boxed(),
        DataType::Int64 => PrimitiveParser::<Int64Type>::boxed(),
        DataType::UInt8 => PrimitiveParser::<UInt8Type>::boxed(),
        DataType::UInt16 => PrimitiveParser::<UInt16Type>::boxed(),
        DataType::UInt32 => PrimitiveParser::<UInt32Type>::boxed(),
        DataType::UInt64 => PrimitiveParser::<UInt64Type>::boxed(),
        DataType::Float32 => PrimitiveParser::<Float32Type>::boxed(),
        DataType::Float64 => PrimitiveParser::<Float64Type>::boxed(),
        other => {
            return Err(ArrowError::InvalidArgumentError(format!(
                "text catalogs cannot hold {other} columns"
            ))
            .into());
        }
    };
    Ok(parser)
}

fn split<'l>(line: &'l str, delimiter: Option<char>) -> Vec<&'l str> {
    match delimiter {
        Some(d) => line.split(d).map(str::trim).collect(),
        None => line.split_whitespace().collect(),
    }
}

/// Positions of the kept columns within `names`, in file order.
fn kept_positions(names: &[String], usecols: Option<&[String]>) -> Result<Vec<usize>, BackendError> {
    let Some(usecols) = usecols else {
        return Ok((0..names.len()).collect());
    };
    if let Some(missing) = usecols.iter().find(|c| !names.contains(*c)) {
        return Err(BackendError::UnknownColumn {
            column: missing.clone(),
        });
    }
    Ok(names
        .iter()
        .enumerate()
        .filter(|(_, name)| usecols.contains(*name))
        .map(|(i, _)| i)
        .collect())
}

type Layout = (Vec<usize>, Vec<Box<dyn ColumnParser>>);

fn column_layout(names: &[String], options: &TextOptions) -> Result<Layout, BackendError> {
    let keep = kept_positions(names, options.usecols.as_deref())?;
    let parsers = keep
        .iter()
        .map(|_| new_parser(&options.dtype))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((keep, parsers))
}

fn parse(reader: impl BufRead, options: &TextOptions) -> Result<RecordBatch, BackendError> {
    let mut names = options.names.clone();
    let mut layout: Option<Layout> = None;
    let mut rows = 0usize;

    for (number, line) in reader.lines().enumerate().skip(options.skip_rows) {
        let line = line?;
        let content = match options.comment {
            Some(c) => line.split(c).next().unwrap_or_default(),
            None => line.as_str(),
        };
        if content.trim().is_empty() {
            continue;
        }
        let tokens = split(content, options.delimiter);
        let line_number = number + 1;

        if names.is_empty() {
            names = (0..tokens.len()).map(|i| format!("col{i}")).collect();
        }
        if tokens.len() != names.len() {
            return Err(BackendError::Parse {
                line: line_number,
                column: tokens.len().min(names.len()) + 1,
                message: format!("expected {} values, found {}", names.len(), tokens.len()),
            });
        }
        if layout.is_none() {
            layout = Some(column_layout(&names, options)?);
        }
        if let Some((keep, parsers)) = layout.as_mut() {
            for (&position, parser) in keep.iter().zip(parsers.iter_mut()) {
                parser
                    .push(tokens[position])
                    .map_err(|message| BackendError::Parse {
                        line: line_number,
                        column: position + 1,
                        message,
                    })?;
            }
        }
        rows += 1;
    }

    let (keep, parsers) = match layout {
        Some(layout) => layout,
        None => column_layout(&names, options)?,
    };
    if keep.is_empty() {
        return Err(ArrowError::InvalidArgumentError(
            "text catalog has no columns to keep".to_string(),
        )
        .into());
    }
    debug!(rows, kept = keep.len(), total = names.len(), "parsed text catalog");

    let fields = keep
        .iter()
        .map(|&position| Field::new(names[position].clone(), options.dtype.clone(), false))
        .collect::<Vec<_>>();
    let arrays = parsers.into_iter().map(|p| p.finish()).collect::<Vec<_>>();
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "# header\n\n1 2 # trailing\n3 4\n";
        let options = TextOptions::default().with_names(["a", "b"]);
        let batch = parse(text.as_bytes(), &options).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "a");
    }

    #[test]
    fn names_are_generated_when_missing() {
        let batch = parse("1,2,3\n".as_bytes(), &TextOptions::default().with_delimiter(',')).unwrap();
        let names: Vec<_> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["col0", "col1", "col2"]);
    }

    #[test]
    fn usecols_keep_file_order() {
        let options = TextOptions::default()
            .with_names(["a", "b", "c"])
            .with_usecols(["c", "a"]);
        let batch = parse("1 2 3\n".as_bytes(), &options).unwrap();
        assert_eq!(batch.schema().field(0).name(), "a");
        assert_eq!(batch.schema().field(1).name(), "c");
    }

    #[test]
    fn unsupported_dtype_is_rejected() {
        let options = TextOptions::default()
            .with_names(["a"])
            .with_dtype(DataType::Utf8);
        assert!(matches!(
            parse("x\n".as_bytes(), &options),
            Err(BackendError::Arrow(_))
        ));
    }
}
