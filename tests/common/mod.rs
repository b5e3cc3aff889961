#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use arrow_array::{
    ArrayRef, FixedSizeListArray, Float32Array, Int64Array, RecordBatch, UInt64Array,
};
use arrow_schema::{ArrowError, DataType, Field, Schema, SchemaRef};
use arrow_select::take::take_record_batch;
use fileview::{Backend, BackendError, FileView, vector_type};

/// One call to `Backend::read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    pub columns: Vec<String>,
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

pub type ReadLog = Arc<Mutex<Vec<ReadCall>>>;

/// In-test backend over a record batch that records every read.
pub struct Table {
    batch: RecordBatch,
    log: ReadLog,
    kind: &'static str,
}

impl Table {
    pub fn new(batch: RecordBatch) -> (Self, ReadLog) {
        let log = ReadLog::default();
        let table = Self {
            batch,
            log: Arc::clone(&log),
            kind: "Catalog",
        };
        (table, log)
    }
}

impl Backend for Table {
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
        self.log.lock().unwrap().push(ReadCall {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            start,
            stop,
            step,
        });
        assert!(start <= stop && stop <= self.size() && step >= 1);
        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            indices.push(self.batch.schema().index_of(column)?);
        }
        let projected = self.batch.project(&indices)?;
        let rows = UInt64Array::from_iter_values((start..stop).step_by(step).map(|r| r as u64));
        Ok(take_record_batch(&projected, &rows)?)
    }

    fn kind(&self) -> &str {
        self.kind
    }
}

/// Backend whose reads always fail.
pub struct Broken;

impl Backend for Broken {
    fn size(&self) -> usize {
        4
    }

    fn schema(&self) -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new("a", DataType::Int64, false)]))
    }

    fn read(&self, _: &[&str], _: usize, _: usize, _: usize) -> Result<RecordBatch, BackendError> {
        Err(ArrowError::IoError("disk on fire".into(), std::io::Error::other("eio")).into())
    }
}

/// Backend that ignores the requested columns and always returns `id`.
pub struct Liar(pub RecordBatch);

impl Backend for Liar {
    fn size(&self) -> usize {
        self.0.num_rows()
    }

    fn schema(&self) -> SchemaRef {
        self.0.schema()
    }

    fn read(&self, _: &[&str], start: usize, stop: usize, _: usize) -> Result<RecordBatch, BackendError> {
        let idx = self.0.schema().index_of("id")?;
        Ok(self.0.project(&[idx])?.slice(start, stop - start))
    }
}

pub const ROWS: usize = 10;

/// Ten rows of `ra`, `dec`, `z` (f32), `id` (i64) and `pos` (f32 x 3).
///
/// `ra = i`, `dec = 100 + i`, `z = 0.5 * i`, `id = 1000 + i`,
/// `pos = [3i, 3i + 1, 3i + 2]`.
pub fn catalog_batch() -> RecordBatch {
    let n = ROWS as i64;
    let ra: Vec<f32> = (0..n).map(|i| i as f32).collect();
    let dec: Vec<f32> = (0..n).map(|i| 100.0 + i as f32).collect();
    let z: Vec<f32> = (0..n).map(|i| 0.5 * i as f32).collect();
    let id: Vec<i64> = (0..n).map(|i| 1000 + i).collect();
    let pos: Vec<f32> = (0..3 * n).map(|v| v as f32).collect();
    let item = Arc::new(Field::new("item", DataType::Float32, false));
    let pos = FixedSizeListArray::try_new(item, 3, Arc::new(Float32Array::from(pos)), None).unwrap();

    let schema = Schema::new(vec![
        Field::new("ra", DataType::Float32, false),
        Field::new("dec", DataType::Float32, false),
        Field::new("z", DataType::Float32, false),
        Field::new("id", DataType::Int64, false),
        Field::new("pos", vector_type(DataType::Float32, &[3]), false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float32Array::from(ra)),
        Arc::new(Float32Array::from(dec)),
        Arc::new(Float32Array::from(z)),
        Arc::new(Int64Array::from(id)),
        Arc::new(pos),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).unwrap()
}

pub fn catalog() -> (FileView<'static>, ReadLog) {
    let (table, log) = Table::new(catalog_batch());
    (FileView::new(table).unwrap(), log)
}

pub fn f32_column(batch: &RecordBatch, name: &str) -> Vec<f32> {
    use arrow_array::{cast::AsArray, types::Float32Type};
    batch
        .column_by_name(name)
        .unwrap()
        .as_primitive::<Float32Type>()
        .values()
        .to_vec()
}
