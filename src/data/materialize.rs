use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::aggregate::{count_unique_artists_by_region, sum_streams_by_region_artist};
use super::filter::{PersonalArtists, restrict_to_personal};
use super::loader::load_chart_table;
use super::model::{ChartTable, DataError, RegionArtistCount, RegionArtistStreams};

// ---------------------------------------------------------------------------
// Artifact names
// ---------------------------------------------------------------------------

/// The cached tables derived from the raw dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Streams per (region, artist) over every top200 row.
    WorldStreams,
    /// Unique personal artists per region.
    MyArts,
    /// Streams per (region, artist) over personal artists only.
    MyStreams,
    /// The top200 rows themselves.
    Charts200,
}

impl Artifact {
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::WorldStreams => "world_streams.csv",
            Artifact::MyArts => "my_arts.csv",
            Artifact::MyStreams => "my_streams.csv",
            Artifact::Charts200 => "charts200.csv",
        }
    }
}

// ---------------------------------------------------------------------------
// ArtifactStore – flat CSV files in one directory
// ---------------------------------------------------------------------------

/// Directory holding the artifact CSVs. Files are a cache only and can be
/// deleted at any time.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, artifact: Artifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }

    /// Overwrite `artifact` with `rows`.
    pub fn write<T: Serialize>(&self, artifact: Artifact, rows: &[T]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path(artifact);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        writer.flush().with_context(|| format!("flushing {}", path.display()))?;
        log::info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    /// Read `artifact`. `Ok(None)` means the file is absent; a file that
    /// exists but does not parse is an error.
    pub fn read<T: DeserializeOwned>(&self, artifact: Artifact) -> Result<Option<Vec<T>>> {
        let path = self.path(artifact);
        if !path.is_file() {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(rows))
    }
}

// ---------------------------------------------------------------------------
// DerivedTables – the three feeds behind the charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedTables {
    pub world_streams: Vec<RegionArtistStreams>,
    pub my_arts: Vec<RegionArtistCount>,
    pub my_streams: Vec<RegionArtistStreams>,
}

impl DerivedTables {
    /// Compute all three tables from a top200 table.
    pub fn compute(table: &ChartTable, artists: &PersonalArtists) -> Result<Self, DataError> {
        let mine = restrict_to_personal(table, artists);
        Ok(DerivedTables {
            world_streams: sum_streams_by_region_artist(table)?,
            my_arts: count_unique_artists_by_region(&mine),
            my_streams: sum_streams_by_region_artist(&mine)?,
        })
    }

    /// Read the cached tables, falling back to the raw dump for any that are
    /// missing. The raw dump is loaded at most once.
    pub fn load_or_recompute(
        store: &ArtifactStore,
        raw_dataset: &Path,
        artists: &PersonalArtists,
    ) -> Result<Self> {
        let world_streams = store.read::<RegionArtistStreams>(Artifact::WorldStreams)?;
        let my_arts = store.read::<RegionArtistCount>(Artifact::MyArts)?;
        let my_streams = store.read::<RegionArtistStreams>(Artifact::MyStreams)?;

        if let (Some(world_streams), Some(my_arts), Some(my_streams)) =
            (&world_streams, &my_arts, &my_streams)
        {
            log::info!("Using cached tables from {}", store.dir().display());
            return Ok(DerivedTables {
                world_streams: world_streams.clone(),
                my_arts: my_arts.clone(),
                my_streams: my_streams.clone(),
            });
        }

        log::warn!(
            "Cached tables missing in {}, recomputing from {}",
            store.dir().display(),
            raw_dataset.display()
        );
        let table = load_chart_table(raw_dataset)?;
        let mine = restrict_to_personal(&table, artists);

        let world_streams = match world_streams {
            Some(rows) => rows,
            None => sum_streams_by_region_artist(&table)?,
        };
        let my_arts = my_arts.unwrap_or_else(|| count_unique_artists_by_region(&mine));
        let my_streams = match my_streams {
            Some(rows) => rows,
            None => sum_streams_by_region_artist(&mine)?,
        };
        Ok(DerivedTables {
            world_streams,
            my_arts,
            my_streams,
        })
    }
}

// ---------------------------------------------------------------------------
// Materializer
// ---------------------------------------------------------------------------

/// Options for one materialization run.
#[derive(Debug, Clone, Default)]
pub struct MaterializeOptions {
    /// Also cache the top200 rows as `charts200.csv`.
    pub write_filtered_table: bool,
}

/// Derive the tables from `table` and overwrite the artifacts in `store`.
///
/// Rows are written in (region, artist) order, so rerunning on the same input
/// produces identical files. Nothing is written if an aggregate fails.
pub fn materialize(
    table: &ChartTable,
    artists: &PersonalArtists,
    store: &ArtifactStore,
    options: &MaterializeOptions,
) -> Result<DerivedTables> {
    let tables = DerivedTables::compute(table, artists)?;

    if options.write_filtered_table {
        store.write(Artifact::Charts200, &table.entries)?;
    }
    store.write(Artifact::WorldStreams, &tables.world_streams)?;
    store.write(Artifact::MyArts, &tables.my_arts)?;
    store.write(Artifact::MyStreams, &tables.my_streams)?;
    Ok(tables)
}

/// Load the raw dump at `raw_dataset` and materialize it into `store`.
pub fn materialize_file(
    raw_dataset: &Path,
    artists: &PersonalArtists,
    store: &ArtifactStore,
    options: &MaterializeOptions,
) -> Result<DerivedTables> {
    let table = load_chart_table(raw_dataset)?;
    materialize(&table, artists, store, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::personal_artists;
    use crate::data::model::ChartEntry;

    fn table() -> ChartTable {
        ChartTable::from_entries(vec![
            ChartEntry::new("Belgium", "A", 100),
            ChartEntry::new("Belgium", "A", 50),
            ChartEntry::new("Belgium", "C", 70),
            ChartEntry::new("France", "B", 10),
        ])
    }

    fn write_raw(dir: &Path) -> PathBuf {
        let path = dir.join("charts.csv");
        std::fs::write(
            &path,
            "region,artist,streams,chart\n\
             Belgium,A,100,top200\n\
             Belgium,A,50,top200\n\
             Belgium,C,70,top200\n\
             France,B,10,top200\n\
             France,B,,viral50\n",
        )
        .expect("write raw");
        path
    }

    #[test]
    fn writes_three_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::new(dir.path());
        let tables = materialize(
            &table(),
            &personal_artists(["A"]),
            &store,
            &MaterializeOptions::default(),
        )
        .expect("materialize");

        assert_eq!(tables.world_streams.len(), 3);
        assert_eq!(tables.my_streams.len(), 1);
        assert_eq!(tables.my_arts[0].unique_artist_count, 1);

        let world = std::fs::read_to_string(store.path(Artifact::WorldStreams)).expect("read");
        assert_eq!(
            world,
            "region,artist,total_streams\nBelgium,A,150\nBelgium,C,70\nFrance,B,10\n"
        );
        let arts = std::fs::read_to_string(store.path(Artifact::MyArts)).expect("read");
        assert_eq!(arts, "region,unique_artist_count\nBelgium,1\n");
        assert!(!store.path(Artifact::Charts200).exists());
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::new(dir.path());
        let artists = personal_artists(["A", "B"]);
        let options = MaterializeOptions {
            write_filtered_table: true,
        };

        materialize(&table(), &artists, &store, &options).expect("first run");
        let snapshot = |store: &ArtifactStore| -> Vec<Vec<u8>> {
            [
                Artifact::WorldStreams,
                Artifact::MyArts,
                Artifact::MyStreams,
                Artifact::Charts200,
            ]
            .iter()
            .map(|a| std::fs::read(store.path(*a)).expect("read"))
            .collect()
        };
        let first = snapshot(&store);

        materialize(&table(), &artists, &store, &options).expect("second run");
        let second = snapshot(&store);

        assert_eq!(first, second);
    }

    #[test]
    fn cached_tables_round_trip_through_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::new(dir.path());
        let artists = personal_artists(["C"]);
        let written =
            materialize(&table(), &artists, &store, &MaterializeOptions::default()).expect("materialize");

        // The raw path does not exist, so this only succeeds from the cache.
        let loaded =
            DerivedTables::load_or_recompute(&store, &dir.path().join("missing.csv"), &artists)
                .expect("load cached");
        assert_eq!(loaded, written);
    }

    #[test]
    fn missing_artifact_falls_back_to_raw_dataset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let raw = write_raw(dir.path());
        let store = ArtifactStore::new(dir.path().join("cache"));
        let artists = personal_artists(["A"]);

        let tables = DerivedTables::load_or_recompute(&store, &raw, &artists).expect("fallback");
        assert_eq!(tables, DerivedTables::compute(&table(), &artists).expect("compute"));
    }

    #[test]
    fn materialize_file_fails_fast_on_bad_streams() {
        let dir = tempfile::tempdir().expect("tempdir");
        let raw = dir.path().join("charts.csv");
        std::fs::write(&raw, "region,artist,streams,chart\nBelgium,A,1.5,top200\n").expect("write");
        let store = ArtifactStore::new(dir.path().join("cache"));

        let result = materialize_file(
            &raw,
            &personal_artists(["A"]),
            &store,
            &MaterializeOptions::default(),
        );
        assert!(result.is_err());
        assert!(!store.path(Artifact::WorldStreams).exists());
    }

    #[test]
    fn overflowing_totals_write_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::new(dir.path());
        let table = ChartTable::from_entries(vec![
            ChartEntry::new("Belgium", "A", u64::MAX),
            ChartEntry::new("Belgium", "A", 1),
        ]);
        let options = MaterializeOptions {
            write_filtered_table: true,
        };

        let err = materialize(&table, &personal_artists(["A"]), &store, &options)
            .expect_err("overflow");
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::StreamsOverflow { .. })
        ));
        assert!(!store.path(Artifact::WorldStreams).exists());
        assert!(!store.path(Artifact::Charts200).exists());
    }
}
