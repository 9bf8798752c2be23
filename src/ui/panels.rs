use eframe::egui::{self, Button, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use spotify_dash::state::{AppState, ClickEvent};

use crate::color::{ACCENT, GreenScale, WHEAT};

// ---------------------------------------------------------------------------
// Left side panel – region map
// ---------------------------------------------------------------------------

/// Render the clickable region map. Tile colour follows the number of
/// personal artists charting in each region.
pub fn region_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("Que pongo?").color(ACCENT));
    ui.label(
        RichText::new(
            "Colour intensity is the number of unique artists I like found in each \
             region's Top 200 charts between 2017-2021.",
        )
        .color(Color32::WHITE),
    );
    ui.label(RichText::new("Click a region to see artists' Spotify presence there.").color(WHEAT));
    ui.separator();

    let Some(dashboard) = &state.dashboard else {
        ui.label("No tables loaded.");
        return;
    };

    let regions = dashboard.world_map();
    let selected = dashboard.selected_region();
    let scale = GreenScale::new(regions.iter().map(|r| r.unique_artist_count));

    // Apply the click after drawing so the dashboard isn't borrowed.
    let mut click: Option<ClickEvent> = None;

    ScrollArea::vertical()
        .id_salt("region_tiles")
        .max_height(ui.available_height() * 0.6)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for row in regions {
                    let fill = scale.color_for(row.unique_artist_count);
                    let mut text = RichText::new(&row.region).color(Color32::BLACK);
                    if row.region == selected {
                        text = text.strong().underline();
                    }
                    let response = ui
                        .add(Button::new(text).fill(fill))
                        .on_hover_text(format!("{} artists", row.unique_artist_count));
                    if response.clicked() {
                        click = Some(ClickEvent::at(&row.region));
                    }
                }
            });
        });

    ui.add_space(4.0);
    if ui.small_button("Reset").clicked() {
        click = Some(ClickEvent::default());
    }
    ui.separator();

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder())
        .column(Column::auto())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Region");
            });
            header.col(|ui| {
                ui.strong("Artists");
            });
        })
        .body(|mut body| {
            for row in regions {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(row.region.as_str());
                    });
                    table_row.col(|ui| {
                        ui.label(row.unique_artist_count.to_string());
                    });
                });
            }
        });

    if let Some(click) = click {
        state.click_region(Some(&click));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Rebuild caches").clicked() {
                if let Err(e) = state.rebuild_caches() {
                    state.report_error("Failed to rebuild caches", &e);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(dashboard) = &state.dashboard {
            let tables = dashboard.tables();
            ui.label(format!(
                "{} regions, {} personal artist rows, {} world rows",
                dashboard.world_map().len(),
                tables.my_streams.len(),
                tables.world_streams.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open chart dump")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match state.open_dataset(&path) {
            Ok(()) => log::info!("Derived tables from {}", path.display()),
            Err(e) => state.report_error("Failed to load file", &e),
        }
    }
}
