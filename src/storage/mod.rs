pub mod jsonl;
pub mod parquet;

pub use self::jsonl::{read_jsonl, write_jsonl};
pub use self::parquet::{infer_columns, rows_to_batch, write_parquet, ColumnKind};
