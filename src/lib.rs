//! Personal Spotify top200 dashboard: loading, aggregation, caching and the
//! selection state that drives the charts. Rendering lives in the binary.

pub mod config;
pub mod data;
pub mod state;
pub mod views;
