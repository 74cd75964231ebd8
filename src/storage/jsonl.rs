// src/storage/jsonl.rs

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};
use tracing::debug;

/// Write one compact JSON object per line. Non-ASCII text is written as-is.
pub fn write_jsonl<P, I, T>(path: P, rows: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    let mut count = 0;
    for row in rows {
        serde_json::to_writer(&mut w, &row)
            .with_context(|| format!("serializing row {} for {}", count, path.display()))?;
        w.write_all(b"\n")?;
        count += 1;
    }
    w.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    debug!(path = %path.display(), rows = count, "wrote jsonl");
    Ok(count)
}

/// Read every non-blank line of a JSONL file as a JSON value.
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut out = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let v = serde_json::from_str(&line)
            .with_context(|| format!("parsing line {} of {}", i + 1, path.display()))?;
        out.push(v);
    }
    Ok(out)
}
