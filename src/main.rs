mod app;
mod color;
mod ui;

use app::SpotifyDashApp;
use eframe::egui;
use spotify_dash::config::DashConfig;
use spotify_dash::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashConfig::load().unwrap_or_else(|e| {
        log::error!("Bad configuration, falling back to defaults: {e:#}");
        DashConfig::default()
    });

    let mut state = AppState::new(config);
    if let Err(e) = state.load_tables() {
        state.report_error("Failed to load tables", &e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "My Spotify Tastes Around The World",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(SpotifyDashApp::new(state)))
        }),
    )
}
