//! Chart data feeds. Each builder is a pure function of a derived table and
//! the selected region; rendering lives in the UI.

use std::cmp::Reverse;

use crate::data::model::{RegionArtistCount, RegionArtistStreams};

/// Personal rows at or below this many streams are not plotted.
pub const PERSONAL_MIN_STREAMS: u64 = 5_000;

/// Personal bars above this value are drawn capped and coloured apart.
pub const PERSONAL_CAP_STREAMS: u64 = 500_000;

/// Rows kept by the world chart.
pub const WORLD_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalBar {
    pub artist: String,
    pub streams: u64,
    pub over_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldBar {
    pub artist: String,
    pub streams: u64,
}

/// Personal artists in `region`, smallest first. Rows with
/// `streams <= PERSONAL_MIN_STREAMS` are dropped.
pub fn personal_stream_view(my_streams: &[RegionArtistStreams], region: &str) -> Vec<PersonalBar> {
    let mut bars: Vec<PersonalBar> = my_streams
        .iter()
        .filter(|r| r.region == region && r.total_streams > PERSONAL_MIN_STREAMS)
        .map(|r| PersonalBar {
            artist: r.artist.clone(),
            streams: r.total_streams,
            over_threshold: r.total_streams > PERSONAL_CAP_STREAMS,
        })
        .collect();
    bars.sort_by_key(|b| b.streams);
    bars
}

/// The ten biggest artists in `region`, returned smallest first so the
/// largest bar ends up furthest from the axis origin.
pub fn world_top10_view(world_streams: &[RegionArtistStreams], region: &str) -> Vec<WorldBar> {
    let mut rows: Vec<&RegionArtistStreams> = world_streams
        .iter()
        .filter(|r| r.region == region)
        .collect();
    rows.sort_by_key(|r| Reverse(r.total_streams));
    rows.truncate(WORLD_TOP_N);
    rows.reverse();

    rows.into_iter()
        .map(|r| WorldBar {
            artist: r.artist.clone(),
            streams: r.total_streams,
        })
        .collect()
}

/// One row per region for the map.
pub fn personal_world_view(my_arts: &[RegionArtistCount]) -> Vec<RegionArtistCount> {
    my_arts.to_vec()
}
