/// Data layer: core types, loading, aggregation and caching.
///
/// Architecture:
/// ```text
///  charts .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, keep top200 → ChartTable
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌───────────┐
///   │  filter   │   │ aggregate │  sums / distinct counts per region
///   └──────────┘   └───────────┘
///        │              ▲
///        └──────────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ materialize │  world_streams / my_arts / my_streams CSVs
///   └─────────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod materialize;
pub mod model;
