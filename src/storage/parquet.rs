// src/storage/parquet.rs

use anyhow::{bail, Context, Result};
use arrow::{
    array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
    sync::Arc,
};
use tracing::{debug, warn};

/// Column type inferred from the JSON values seen in that column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    fn of(v: &Value) -> Option<Self> {
        match v {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnKind::Bool),
            Value::Number(n) if n.is_i64() => Some(ColumnKind::Int),
            Value::Number(_) => Some(ColumnKind::Float),
            Value::String(_) | Value::Array(_) | Value::Object(_) => Some(ColumnKind::Text),
        }
    }

    /// Ints widen to floats; any other disagreement falls back to text.
    fn merge(self, other: Self) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }

    fn data_type(self) -> DataType {
        match self {
            ColumnKind::Int => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Bool => DataType::Boolean,
            ColumnKind::Text => DataType::Utf8,
        }
    }
}

/// Columns in first-seen order with their merged kinds. All-null columns are text.
pub fn infer_columns(rows: &[Map<String, Value>]) -> Vec<(String, ColumnKind)> {
    let mut cols: Vec<(String, Option<ColumnKind>)> = Vec::new();
    for row in rows {
        for (name, v) in row {
            let kind = ColumnKind::of(v);
            match cols.iter_mut().find(|(n, _)| n == name) {
                Some((_, slot)) => {
                    *slot = match (*slot, kind) {
                        (Some(a), Some(b)) => Some(a.merge(b)),
                        (a, b) => a.or(b),
                    }
                }
                None => cols.push((name.clone(), kind)),
            }
        }
    }
    cols.into_iter()
        .map(|(n, k)| (n, k.unwrap_or(ColumnKind::Text)))
        .collect()
}

fn text_of(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

static NULL: Value = Value::Null;

fn build_array(kind: ColumnKind, name: &str, rows: &[Map<String, Value>]) -> ArrayRef {
    let cells = rows.iter().map(|r| r.get(name).unwrap_or(&NULL));
    match kind {
        ColumnKind::Int => Arc::new(Int64Array::from(
            cells.map(Value::as_i64).collect::<Vec<_>>(),
        )),
        ColumnKind::Float => Arc::new(Float64Array::from(
            cells.map(Value::as_f64).collect::<Vec<_>>(),
        )),
        ColumnKind::Bool => Arc::new(BooleanArray::from(
            cells.map(Value::as_bool).collect::<Vec<_>>(),
        )),
        ColumnKind::Text => Arc::new(StringArray::from(
            cells.map(text_of).collect::<Vec<_>>(),
        )),
    }
}

/// Build a single record batch from JSON-object rows.
pub fn rows_to_batch(rows: &[Map<String, Value>]) -> Result<RecordBatch> {
    let cols = infer_columns(rows);
    let schema = Arc::new(Schema::new(
        cols.iter()
            .map(|(name, kind)| Field::new(name, kind.data_type(), true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = cols
        .iter()
        .map(|(name, kind)| build_array(*kind, name, rows))
        .collect();
    RecordBatch::try_new(schema, arrays).context("building record batch")
}

/// Write serializable rows (each must serialize to a JSON object) as a
/// Snappy-compressed Parquet file. Nothing is written for an empty slice.
pub fn write_parquet<P, T>(path: P, rows: &[T]) -> Result<usize>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let path = path.as_ref();
    if rows.is_empty() {
        warn!(path = %path.display(), "no rows; skipping parquet");
        return Ok(0);
    }

    let objects = rows
        .iter()
        .enumerate()
        .map(|(i, r)| -> Result<Map<String, Value>> {
            match serde_json::to_value(r)? {
                Value::Object(m) => Ok(m),
                other => bail!("row {} is not an object: {}", i, other),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    let batch = rows_to_batch(&objects)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let tmp = path.with_extension("parquet.tmp");
    let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} -> {}", tmp.display(), path.display()))?;

    debug!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(batch.num_rows())
}
