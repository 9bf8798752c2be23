use eframe::egui::{self, RichText};

use spotify_dash::state::AppState;

use crate::color::{ACCENT, WHEAT};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SpotifyDashApp {
    pub state: AppState,
}

impl SpotifyDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SpotifyDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: region map ----
        egui::SidePanel::left("region_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::region_panel(ui, &mut self.state);
            });

        // ---- Central panel: label, personal chart, world top 10 ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(
                    RichText::new("My Spotify Tastes Around The World")
                        .size(28.0)
                        .color(ACCENT),
                );
                ui.label(
                    RichText::new(
                        "World data is represented by daily top200 Spotify charts between 2017-2021.",
                    )
                    .color(WHEAT),
                );
            });
            ui.separator();

            let Some(dashboard) = &self.state.dashboard else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a chart dump to get started  (File → Open dataset…)");
                });
                return;
            };

            let views = dashboard.views();
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new(&views.label).size(32.0).strong());
            });
            ui.add_space(8.0);
            plot::personal_stream_plot(ui, views);
            ui.add_space(8.0);
            plot::world_top10_plot(ui, views);
        });
    }
}
