use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::config::DashConfig;
use crate::data::filter::PersonalArtists;
use crate::data::loader::load_chart_table;
use crate::data::materialize::{
    ArtifactStore, DerivedTables, MaterializeOptions, materialize_file,
};
use crate::data::model::RegionArtistCount;
use crate::views::{
    PersonalBar, WorldBar, personal_stream_view, personal_world_view, world_top10_view,
};

/// Region shown at startup and after a click that carries no location.
pub const DEFAULT_REGION: &str = "Belgium";

// ---------------------------------------------------------------------------
// Click events coming from the map
// ---------------------------------------------------------------------------

/// Payload of a click on the region map. Mirrors the plot-library shape
/// `{"points": [{"location": "France"}, ...]}`; every part may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickEvent {
    #[serde(default)]
    pub points: Option<Vec<ClickPoint>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickPoint {
    #[serde(default)]
    pub location: Option<String>,
}

impl ClickEvent {
    /// A click on a single region.
    pub fn at(location: &str) -> Self {
        ClickEvent {
            points: Some(vec![ClickPoint {
                location: Some(location.to_string()),
            }]),
        }
    }

    /// Location of the first clicked point, if it names something.
    pub fn location(&self) -> Option<&str> {
        self.points
            .as_ref()?
            .first()?
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Dashboard – selected region and everything derived from it
// ---------------------------------------------------------------------------

/// The three outputs that follow the selected region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionViews {
    pub personal: Vec<PersonalBar>,
    pub world_top10: Vec<WorldBar>,
    pub label: String,
}

/// Called after every region change with the new region and fresh views.
pub type RegionListener = Box<dyn FnMut(&str, &RegionViews)>;

/// Owns the selected region. The region is private and only changes through
/// [`Dashboard::on_region_clicked`], which rebuilds [`RegionViews`] before
/// returning, so reads after a click never see a previous region's data.
pub struct Dashboard {
    tables: DerivedTables,
    default_region: String,
    region: String,
    views: RegionViews,
    world_map: Vec<RegionArtistCount>,
    listeners: Vec<RegionListener>,
}

impl Dashboard {
    pub fn new(tables: DerivedTables, default_region: &str) -> Self {
        let world_map = personal_world_view(&tables.my_arts);
        let mut dashboard = Dashboard {
            tables,
            default_region: default_region.to_string(),
            region: default_region.to_string(),
            views: RegionViews::default(),
            world_map,
            listeners: Vec::new(),
        };
        dashboard.dispatch();
        dashboard
    }

    pub fn selected_region(&self) -> &str {
        &self.region
    }

    pub fn views(&self) -> &RegionViews {
        &self.views
    }

    /// Region rows for the map. Independent of the selection.
    pub fn world_map(&self) -> &[RegionArtistCount] {
        &self.world_map
    }

    pub fn tables(&self) -> &DerivedTables {
        &self.tables
    }

    /// Register a listener; it runs after each subsequent region change.
    pub fn subscribe(&mut self, listener: RegionListener) {
        self.listeners.push(listener);
    }

    /// Handle a map click. No event, no points or an empty location all
    /// select the default region.
    pub fn on_region_clicked(&mut self, click: Option<&ClickEvent>) {
        let region = click
            .and_then(ClickEvent::location)
            .unwrap_or(self.default_region.as_str())
            .to_string();
        log::debug!("Region selected: {region}");
        self.region = region;
        self.dispatch();
    }

    fn dispatch(&mut self) {
        self.views.personal = personal_stream_view(&self.tables.my_streams, &self.region);
        self.views.world_top10 = world_top10_view(&self.tables.world_streams, &self.region);
        self.views.label = self.region.clone();

        for listener in &mut self.listeners {
            listener(&self.region, &self.views);
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashConfig,

    /// Derived tables and selection (None until tables are loaded).
    pub dashboard: Option<Dashboard>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashConfig) -> Self {
        Self {
            config,
            dashboard: None,
            status_message: None,
        }
    }

    fn artists(&self) -> PersonalArtists {
        self.config.artist_set()
    }

    fn store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.config.artifact_dir)
    }

    /// Install freshly derived tables and reset the selection.
    pub fn set_tables(&mut self, tables: DerivedTables) {
        let mut dashboard = Dashboard::new(tables, &self.config.default_region);
        dashboard.subscribe(Box::new(|region: &str, views: &RegionViews| {
            log::info!(
                "{region}: {} personal bars, {} world bars",
                views.personal.len(),
                views.world_top10.len()
            );
        }));
        self.dashboard = Some(dashboard);
        self.status_message = None;
    }

    /// Startup path: cached artifacts, raw dump for whatever is missing.
    pub fn load_tables(&mut self) -> Result<()> {
        let tables = DerivedTables::load_or_recompute(
            &self.store(),
            &self.config.raw_dataset,
            &self.artists(),
        )?;
        self.set_tables(tables);
        Ok(())
    }

    /// Derive tables from a different raw dump without touching the cache.
    pub fn open_dataset(&mut self, path: &Path) -> Result<()> {
        let table = load_chart_table(path)?;
        let tables = DerivedTables::compute(&table, &self.artists())?;
        self.config.raw_dataset = path.to_path_buf();
        self.set_tables(tables);
        Ok(())
    }

    /// Re-run the materializer on the configured raw dump.
    pub fn rebuild_caches(&mut self) -> Result<()> {
        let options = MaterializeOptions {
            write_filtered_table: self.config.write_filtered_table,
        };
        let tables = materialize_file(
            &self.config.raw_dataset,
            &self.artists(),
            &self.store(),
            &options,
        )?;
        self.set_tables(tables);
        Ok(())
    }

    /// Record a failed action for the status line.
    pub fn report_error(&mut self, what: &str, err: &anyhow::Error) {
        log::error!("{what}: {err:#}");
        self.status_message = Some(format!("Error: {err:#}"));
    }

    pub fn click_region(&mut self, click: Option<&ClickEvent>) {
        if let Some(dashboard) = &mut self.dashboard {
            dashboard.on_region_clicked(click);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::data::filter::personal_artists;
    use crate::data::model::{ChartEntry, ChartTable};

    fn tables() -> DerivedTables {
        let mut entries = vec![
            ChartEntry::new("Belgium", "Stromae", 700_000),
            ChartEntry::new("Belgium", "Angèle", 20_000),
            ChartEntry::new("Belgium", "Tiny", 1_000),
            ChartEntry::new("France", "Stromae", 8_000),
        ];
        for i in 0..12u64 {
            entries.push(ChartEntry::new("France", &format!("fr{i}"), 10_000 + i));
        }
        DerivedTables::compute(
            &ChartTable::from_entries(entries),
            &personal_artists(["Stromae", "Angèle", "Tiny"]),
        )
        .expect("compute")
    }

    fn click(json: &str) -> ClickEvent {
        serde_json::from_str(json).expect("click json")
    }

    #[test]
    fn starts_on_default_region() {
        let dash = Dashboard::new(tables(), DEFAULT_REGION);
        assert_eq!(dash.selected_region(), "Belgium");
        assert_eq!(dash.views().label, "Belgium");
        let artists: Vec<&str> = dash.views().personal.iter().map(|b| b.artist.as_str()).collect();
        assert_eq!(artists, vec!["Angèle", "Stromae"]);
        assert!(dash.views().personal[1].over_threshold);
    }

    #[test]
    fn click_with_location_moves_every_view() {
        let mut dash = Dashboard::new(tables(), DEFAULT_REGION);
        dash.on_region_clicked(Some(&click(r#"{"points": [{"location": "France"}]}"#)));

        assert_eq!(dash.selected_region(), "France");
        let views = dash.views();
        assert_eq!(views.label, "France");
        assert_eq!(views.personal.len(), 1);
        assert_eq!(views.personal[0].artist, "Stromae");
        assert_eq!(views.world_top10.len(), 10);
        assert_eq!(views.world_top10.last().map(|b| b.artist.as_str()), Some("fr11"));
    }

    #[test]
    fn click_without_points_falls_back_to_default() {
        let mut dash = Dashboard::new(tables(), DEFAULT_REGION);
        dash.on_region_clicked(Some(&ClickEvent::at("France")));
        assert_eq!(dash.selected_region(), "France");

        dash.on_region_clicked(Some(&click("{}")));
        assert_eq!(dash.selected_region(), "Belgium");
        let fresh = Dashboard::new(tables(), DEFAULT_REGION);
        assert_eq!(dash.views(), fresh.views());

        dash.on_region_clicked(Some(&ClickEvent::at("France")));
        dash.on_region_clicked(Some(&click(r#"{"points": [{}]}"#)));
        assert_eq!(dash.selected_region(), "Belgium");

        dash.on_region_clicked(Some(&ClickEvent::at("France")));
        dash.on_region_clicked(None);
        assert_eq!(dash.views().label, "Belgium");
    }

    #[test]
    fn unknown_region_renders_empty() {
        let mut dash = Dashboard::new(tables(), DEFAULT_REGION);
        dash.on_region_clicked(Some(&ClickEvent::at("Atlantis")));
        assert_eq!(dash.views().label, "Atlantis");
        assert!(dash.views().personal.is_empty());
        assert!(dash.views().world_top10.is_empty());
    }

    #[test]
    fn listeners_see_consistent_views() {
        let seen: Rc<RefCell<Vec<(String, String, usize)>>> = Rc::default();
        let sink = Rc::clone(&seen);

        let mut dash = Dashboard::new(tables(), DEFAULT_REGION);
        dash.subscribe(Box::new(move |region: &str, views: &RegionViews| {
            sink.borrow_mut()
                .push((region.to_string(), views.label.clone(), views.world_top10.len()));
        }));
        dash.on_region_clicked(Some(&ClickEvent::at("France")));
        dash.on_region_clicked(None);

        assert_eq!(
            *seen.borrow(),
            vec![
                ("France".to_string(), "France".to_string(), 10),
                ("Belgium".to_string(), "Belgium".to_string(), 3),
            ]
        );
    }

    #[test]
    fn world_map_ignores_selection() {
        let mut dash = Dashboard::new(tables(), DEFAULT_REGION);
        let before = dash.world_map().to_vec();
        dash.on_region_clicked(Some(&ClickEvent::at("France")));
        assert_eq!(dash.world_map(), before.as_slice());
        assert_eq!(before.len(), 2);
    }

    #[test]
    fn app_state_loads_and_clicks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let raw = dir.path().join("charts.csv");
        std::fs::write(
            &raw,
            "region,artist,streams,chart\nBelgium,A,9000,top200\nFrance,A,7000,top200\n",
        )
        .expect("write raw");

        let config = DashConfig {
            raw_dataset: raw,
            artifact_dir: dir.path().join("cache"),
            personal_artists: vec!["A".into()],
            ..DashConfig::default()
        };
        let mut state = AppState::new(config);
        state.load_tables().expect("load");
        state.click_region(Some(&ClickEvent::at("France")));

        let dash = state.dashboard.as_ref().expect("dashboard");
        assert_eq!(dash.views().personal[0].streams, 7000);

        state.rebuild_caches().expect("rebuild");
        assert!(dir.path().join("cache").join("my_streams.csv").is_file());
        assert_eq!(
            state.dashboard.as_ref().map(Dashboard::selected_region),
            Some("Belgium")
        );
    }
}
