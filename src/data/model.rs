use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chart tier retained from the raw dump. Every derived table starts here.
pub const TOP200: &str = "top200";

// ---------------------------------------------------------------------------
// DataError – non-recoverable data-quality failures
// ---------------------------------------------------------------------------

/// Raised while reading a raw dump. None of these are retried or coerced
/// around: an aggregate built on top of a bad `streams` cell would be wrong
/// without anyone noticing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: streams value is missing")]
    MissingStreams { row: usize },
    #[error("row {row}: streams value '{value}' is not a number")]
    MalformedStreams { row: usize, value: String },
    #[error("row {row}: streams value '{value}' is not a whole number")]
    FractionalStreams { row: usize, value: String },
    #[error("row {row}: streams value '{value}' is negative")]
    NegativeStreams { row: usize, value: String },
    #[error("row {row}: streams value '{value}' is too large to count exactly")]
    StreamsOutOfRange { row: usize, value: String },
    #[error("total streams for {artist} in {region} overflow a 64-bit count")]
    StreamsOverflow { region: String, artist: String },
}

/// Largest float that still maps onto a unique integer (2^53).
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

/// Coerce a textual `streams` cell to an integer count.
///
/// Integers are taken as-is. Floats are accepted only when they carry no
/// fractional part (`"1234.0"` is what pandas writes for a nullable integer
/// column) and are small enough to be exact; anything else is rejected.
pub fn parse_streams(raw: &str, row: usize) -> Result<u64, DataError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(DataError::MissingStreams { row });
    }
    if let Ok(u) = s.parse::<u64>() {
        return Ok(u);
    }
    if let Ok(i) = s.parse::<i64>() {
        return u64::try_from(i).map_err(|_| DataError::NegativeStreams {
            row,
            value: s.to_string(),
        });
    }
    match s.parse::<f64>() {
        Ok(f) => streams_from_f64(f, row),
        Err(_) => Err(DataError::MalformedStreams {
            row,
            value: s.to_string(),
        }),
    }
}

/// Same policy as [`parse_streams`] for values that arrive already typed
/// (JSON numbers, Arrow float columns).
pub fn streams_from_f64(f: f64, row: usize) -> Result<u64, DataError> {
    if f.is_nan() {
        return Err(DataError::MissingStreams { row });
    }
    if !f.is_finite() {
        return Err(DataError::MalformedStreams {
            row,
            value: f.to_string(),
        });
    }
    if f.fract() != 0.0 {
        return Err(DataError::FractionalStreams {
            row,
            value: f.to_string(),
        });
    }
    if f < 0.0 {
        return Err(DataError::NegativeStreams {
            row,
            value: f.to_string(),
        });
    }
    if f > MAX_EXACT_F64 {
        return Err(DataError::StreamsOutOfRange {
            row,
            value: f.to_string(),
        });
    }
    Ok(f as u64)
}

// ---------------------------------------------------------------------------
// ChartEntry – one row of the raw dump
// ---------------------------------------------------------------------------

/// A single daily chart entry. Columns other than these four are dropped at
/// load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub region: String,
    pub artist: String,
    pub streams: u64,
    pub chart: String,
}

impl ChartEntry {
    pub fn new(region: &str, artist: &str, streams: u64) -> Self {
        ChartEntry {
            region: region.to_string(),
            artist: artist.to_string(),
            streams,
            chart: TOP200.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChartTable – the loaded top200 table
// ---------------------------------------------------------------------------

/// The raw dump restricted to top200 rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartTable {
    pub entries: Vec<ChartEntry>,
}

impl ChartTable {
    /// Keep only rows from the top200 chart tier.
    pub fn from_entries(entries: Vec<ChartEntry>) -> Self {
        let entries = entries.into_iter().filter(|e| e.chart == TOP200).collect();
        ChartTable { entries }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted set of regions present in the table.
    pub fn regions(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.region.as_str()).collect()
    }

    /// Sum of every row's `streams`, `None` if it does not fit in a `u64`.
    pub fn total_streams(&self) -> Option<u64> {
        self.entries
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.streams))
    }
}

// ---------------------------------------------------------------------------
// Derived rows
// ---------------------------------------------------------------------------

/// Total streams for one (region, artist) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionArtistStreams {
    pub region: String,
    pub artist: String,
    pub total_streams: u64,
}

/// Number of distinct artists charting in one region.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionArtistCount {
    pub region: String,
    pub unique_artist_count: u64,
}
