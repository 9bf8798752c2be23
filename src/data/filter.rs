use std::collections::BTreeSet;

use super::model::ChartTable;

// ---------------------------------------------------------------------------
// Personal artist allowlist
// ---------------------------------------------------------------------------

/// Caller-supplied set of artist names. Matching is exact and case-sensitive.
pub type PersonalArtists = BTreeSet<String>;

/// Build a [`PersonalArtists`] set from any list of names.
pub fn personal_artists<I, S>(names: I) -> PersonalArtists
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Return the rows whose artist is in `artists`.
///
/// An empty allowlist keeps nothing.
pub fn restrict_to_personal(table: &ChartTable, artists: &PersonalArtists) -> ChartTable {
    let entries = table
        .entries
        .iter()
        .filter(|e| artists.contains(&e.artist))
        .cloned()
        .collect();
    ChartTable { entries }
}
