//! CSV extract loader tolerant of Latin-1 encoded files

use anyhow::{Context, Result};
use encoding_rs::WINDOWS_1252;
use polars::prelude::*;
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

/// The seven relational extracts the pipeline consumes, one CSV per entity.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub orders: DataFrame,
    pub stores: DataFrame,
    pub payments: DataFrame,
    pub channels: DataFrame,
    pub hubs: DataFrame,
    pub deliveries: DataFrame,
    pub drivers: DataFrame,
}

/// Load all seven extracts from `data_dir`.
///
/// Any missing or malformed file aborts the run before later stages start.
pub fn load_tables(data_dir: &Path, infer_schema_length: usize) -> Result<RawTables> {
    Ok(RawTables {
        orders: read_extract(data_dir, "orders", infer_schema_length)?,
        stores: read_extract(data_dir, "stores", infer_schema_length)?,
        payments: read_extract(data_dir, "payments", infer_schema_length)?,
        channels: read_extract(data_dir, "channels", infer_schema_length)?,
        hubs: read_extract(data_dir, "hubs", infer_schema_length)?,
        deliveries: read_extract(data_dir, "deliveries", infer_schema_length)?,
        drivers: read_extract(data_dir, "drivers", infer_schema_length)?,
    })
}

fn read_extract(data_dir: &Path, name: &str, infer_schema_length: usize) -> Result<DataFrame> {
    let path = data_dir.join(format!("{}.csv", name));
    read_latin1_csv(&path, infer_schema_length)
        .with_context(|| format!("Failed to load extract '{}' from {}", name, path.display()))
}

/// Read a CSV file, decoding Windows-1252 (a Latin-1 superset) when the
/// bytes are not valid UTF-8. The polars reader only accepts UTF-8, so the
/// file is decoded in memory first.
pub fn read_latin1_csv(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let utf8: Cow<'_, [u8]> = match std::str::from_utf8(&bytes) {
        Ok(_) => Cow::Borrowed(&bytes),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(&bytes);
            Cow::Owned(decoded.into_owned().into_bytes())
        }
    };

    let infer = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer)
        .into_reader_with_file_handle(Cursor::new(utf8.into_owned()))
        .finish()
        .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?;

    Ok(df)
}
