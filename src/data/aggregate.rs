use std::collections::{BTreeMap, BTreeSet};

use super::model::{ChartTable, DataError, RegionArtistCount, RegionArtistStreams};

// ---------------------------------------------------------------------------
// Grouped aggregates over a ChartTable
// ---------------------------------------------------------------------------

/// Group rows by (region, artist) and sum their streams.
///
/// Output happens to come back sorted by (region, artist) because of the
/// `BTreeMap`, but callers that care about stream order must sort themselves.
/// A total that does not fit in a `u64` is an error, never a wrapped value.
pub fn sum_streams_by_region_artist(
    table: &ChartTable,
) -> Result<Vec<RegionArtistStreams>, DataError> {
    let mut totals: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for entry in &table.entries {
        let total = totals
            .entry((entry.region.as_str(), entry.artist.as_str()))
            .or_default();
        *total = total
            .checked_add(entry.streams)
            .ok_or_else(|| DataError::StreamsOverflow {
                region: entry.region.clone(),
                artist: entry.artist.clone(),
            })?;
    }

    Ok(totals
        .into_iter()
        .map(|((region, artist), total_streams)| RegionArtistStreams {
            region: region.to_string(),
            artist: artist.to_string(),
            total_streams,
        })
        .collect())
}

/// Group rows by region and count distinct artists.
pub fn count_unique_artists_by_region(table: &ChartTable) -> Vec<RegionArtistCount> {
    let mut artists: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for entry in &table.entries {
        artists
            .entry(entry.region.as_str())
            .or_default()
            .insert(entry.artist.as_str());
    }

    artists
        .into_iter()
        .map(|(region, set)| RegionArtistCount {
            region: region.to_string(),
            unique_artist_count: set.len() as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ChartEntry;

    fn scenario() -> ChartTable {
        ChartTable::from_entries(vec![
            ChartEntry::new("Belgium", "A", 100),
            ChartEntry::new("Belgium", "A", 50),
            ChartEntry::new("France", "B", 10),
        ])
    }

    #[test]
    fn sums_per_region_artist() {
        let rows = sum_streams_by_region_artist(&scenario()).expect("sum");
        assert_eq!(
            rows,
            vec![
                RegionArtistStreams {
                    region: "Belgium".into(),
                    artist: "A".into(),
                    total_streams: 150,
                },
                RegionArtistStreams {
                    region: "France".into(),
                    artist: "B".into(),
                    total_streams: 10,
                },
            ]
        );
    }

    #[test]
    fn counts_unique_artists() {
        let rows = count_unique_artists_by_region(&scenario());
        assert_eq!(
            rows,
            vec![
                RegionArtistCount {
                    region: "Belgium".into(),
                    unique_artist_count: 1,
                },
                RegionArtistCount {
                    region: "France".into(),
                    unique_artist_count: 1,
                },
            ]
        );
    }

    #[test]
    fn empty_table_gives_empty_results() {
        let empty = ChartTable::default();
        assert_eq!(sum_streams_by_region_artist(&empty), Ok(Vec::new()));
        assert!(count_unique_artists_by_region(&empty).is_empty());
    }

    #[test]
    fn total_streams_are_conserved() {
        let table = ChartTable::from_entries(vec![
            ChartEntry::new("Chile", "X", 7),
            ChartEntry::new("Chile", "Y", 11),
            ChartEntry::new("Peru", "X", 13),
            ChartEntry::new("Chile", "X", 17),
            ChartEntry::new("Peru", "Z", 0),
        ]);
        let summed: u64 = sum_streams_by_region_artist(&table)
            .expect("sum")
            .iter()
            .map(|r| r.total_streams)
            .sum();
        assert_eq!(Some(summed), table.total_streams());
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let table = ChartTable::from_entries(vec![
            ChartEntry::new("Belgium", "A", u64::MAX),
            ChartEntry::new("Belgium", "A", 1),
        ]);
        assert_eq!(
            sum_streams_by_region_artist(&table),
            Err(DataError::StreamsOverflow {
                region: "Belgium".into(),
                artist: "A".into(),
            })
        );

        // Large values in different groups do not interfere.
        let table = ChartTable::from_entries(vec![
            ChartEntry::new("Belgium", "A", u64::MAX),
            ChartEntry::new("Belgium", "B", 1),
        ]);
        assert_eq!(sum_streams_by_region_artist(&table).map(|r| r.len()), Ok(2));
    }

    #[test]
    fn unique_count_never_exceeds_row_count() {
        let table = ChartTable::from_entries(vec![
            ChartEntry::new("Chile", "X", 1),
            ChartEntry::new("Chile", "X", 1),
            ChartEntry::new("Chile", "Y", 1),
            ChartEntry::new("Peru", "Z", 1),
        ]);
        let counts = count_unique_artists_by_region(&table);
        for row in &counts {
            let rows_in_region = table
                .entries
                .iter()
                .filter(|e| e.region == row.region)
                .count() as u64;
            assert!(row.unique_artist_count <= rows_in_region);
        }
        let chile = &counts[0];
        assert_eq!((chile.region.as_str(), chile.unique_artist_count), ("Chile", 2));
    }
}
