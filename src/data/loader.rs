use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, UInt32Array,
    UInt64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{ChartEntry, ChartTable, DataError, TOP200, parse_streams, streams_from_f64};

const REGION: &str = "region";
const ARTIST: &str = "artist";
const STREAMS: &str = "streams";
const CHART: &str = "chart";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw chart dump and keep its top200 rows. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least `region, artist, streams, chart`
/// * `.json`    – `[{ "region": ..., "artist": ..., "streams": ..., "chart": ... }, ...]`
/// * `.parquet` – same four columns, any extra columns ignored
///
/// Rows of other chart tiers are dropped before `streams` is looked at; a bad
/// `streams` value on a top200 row aborts the whole load with a [`DataError`].
pub fn load_chart_table(path: &Path) -> Result<ChartTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let total = table
        .total_streams()
        .map_or_else(|| "more than u64::MAX".to_string(), |t| t.to_string());
    log::info!(
        "Loaded {} top200 rows ({total} streams) across {} regions from {}",
        table.len(),
        table.regions().len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<ChartTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(DataError::MissingColumn(name))
    };
    let region_idx = column(REGION)?;
    let artist_idx = column(ARTIST)?;
    let streams_idx = column(STREAMS)?;
    let chart_idx = column(CHART)?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let chart = record.get(chart_idx).unwrap_or("");
        if chart != TOP200 {
            skipped += 1;
            continue;
        }

        let streams = parse_streams(record.get(streams_idx).unwrap_or(""), row_no)?;
        entries.push(ChartEntry {
            region: record.get(region_idx).unwrap_or("").to_string(),
            artist: record.get(artist_idx).unwrap_or("").to_string(),
            streams,
            chart: chart.to_string(),
        });
    }

    log::debug!("CSV: skipped {skipped} rows outside the {TOP200} chart");
    Ok(ChartTable::from_entries(entries))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "region": "Belgium", "artist": "Stromae", "streams": 12345, "chart": "top200" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<ChartTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut entries = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let chart = json_text(obj.get(CHART));
        if chart != TOP200 {
            continue;
        }

        let streams = match obj.get(STREAMS) {
            None | Some(JsonValue::Null) => return Err(DataError::MissingStreams { row: i }.into()),
            Some(JsonValue::Number(n)) => match n.as_u64() {
                Some(v) => v,
                None => streams_from_f64(n.as_f64().unwrap_or(f64::NAN), i)?,
            },
            Some(JsonValue::String(s)) => parse_streams(s, i)?,
            Some(other) => {
                return Err(DataError::MalformedStreams {
                    row: i,
                    value: other.to_string(),
                }
                .into());
            }
        };

        entries.push(ChartEntry {
            region: json_text(obj.get(REGION)),
            artist: json_text(obj.get(ARTIST)),
            streams,
            chart,
        });
    }

    Ok(ChartTable::from_entries(entries))
}

fn json_text(val: Option<&JsonValue>) -> String {
    match val {
        Some(JsonValue::String(s)) => s.clone(),
        None | Some(JsonValue::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet chart dump.
///
/// Expected schema:
/// - `region`, `artist`, `chart`: Utf8 or LargeUtf8
/// - `streams`: any integer type, Float32/Float64 (whole values only) or Utf8
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<ChartTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut entries = Vec::new();
    let mut offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let region_col = column_by_name(&batch, REGION)?;
        let artist_col = column_by_name(&batch, ARTIST)?;
        let streams_col = column_by_name(&batch, STREAMS)?;
        let chart_col = column_by_name(&batch, CHART)?;

        for row in 0..batch.num_rows() {
            let global_row = offset + row;
            let chart = string_at(chart_col, row)
                .with_context(|| format!("Row {global_row}: failed to read 'chart'"))?;
            if chart != TOP200 {
                continue;
            }

            let streams = streams_at(streams_col, row, global_row)?;
            entries.push(ChartEntry {
                region: string_at(region_col, row)
                    .with_context(|| format!("Row {global_row}: failed to read 'region'"))?,
                artist: string_at(artist_col, row)
                    .with_context(|| format!("Row {global_row}: failed to read 'artist'"))?,
                streams,
                chart,
            });
        }
        offset += batch.num_rows();
    }

    Ok(ChartTable::from_entries(entries))
}

// -- Parquet / Arrow helpers --

fn column_by_name<'a>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a ArrayRef, DataError> {
    batch
        .schema()
        .index_of(name)
        .map(|i| batch.column(i))
        .map_err(|_| DataError::MissingColumn(name))
}

/// Read a string cell; nulls come back as an empty string.
fn string_at(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected a string column, got {other:?}"),
    }
}

/// Read a `streams` cell under the same coercion rules as the text loaders.
fn streams_at(col: &ArrayRef, row: usize, global_row: usize) -> Result<u64> {
    if col.is_null(row) {
        return Err(DataError::MissingStreams { row: global_row }.into());
    }

    fn signed(v: i64, row: usize) -> Result<u64> {
        u64::try_from(v).map_err(|_| {
            DataError::NegativeStreams {
                row,
                value: v.to_string(),
            }
            .into()
        })
    }

    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int32 => {
            let arr = any.downcast_ref::<Int32Array>().context("expected Int32Array")?;
            signed(arr.value(row) as i64, global_row)?
        }
        DataType::Int64 => {
            let arr = any.downcast_ref::<Int64Array>().context("expected Int64Array")?;
            signed(arr.value(row), global_row)?
        }
        DataType::UInt32 => {
            let arr = any.downcast_ref::<UInt32Array>().context("expected UInt32Array")?;
            arr.value(row) as u64
        }
        DataType::UInt64 => {
            let arr = any.downcast_ref::<UInt64Array>().context("expected UInt64Array")?;
            arr.value(row)
        }
        DataType::Float32 => {
            let arr = any.downcast_ref::<Float32Array>().context("expected Float32Array")?;
            streams_from_f64(arr.value(row) as f64, global_row)?
        }
        DataType::Float64 => {
            let arr = any.downcast_ref::<Float64Array>().context("expected Float64Array")?;
            streams_from_f64(arr.value(row), global_row)?
        }
        DataType::Utf8 | DataType::LargeUtf8 => parse_streams(&string_at(col, row)?, global_row)?,
        other => bail!("Row {global_row}: unsupported 'streams' column type {other:?}"),
    };
    Ok(value)
}
