use std::ops::RangeInclusive;

use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use spotify_dash::state::RegionViews;
use spotify_dash::views::PERSONAL_CAP_STREAMS;

use crate::color::{OVER_CAP_GREEN, UNDER_CAP_GREEN, WHEAT, WORLD_BAR_GREEN};

/// Axis formatter that prints the label of the bar sitting on an integer mark.
fn label_formatter(
    labels: Vec<String>,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        if mark.value.fract() != 0.0 || mark.value < 0.0 {
            return String::new();
        }
        labels.get(mark.value as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Personal streams (vertical bars, capped)
// ---------------------------------------------------------------------------

/// Bars for the selected region's personal artists. Bars over the cap are
/// drawn at the cap in a darker green; hovering shows the full count.
pub fn personal_stream_plot(ui: &mut Ui, views: &RegionViews) {
    ui.label(
        RichText::new(format!(
            "My Favorite Artists' Total Streams in {}'s Top 200",
            views.label
        ))
        .size(20.0)
        .color(WHEAT),
    );
    ui.label("Dark green bars have more than 500k streams. Hover over to get their total.");

    if views.personal.is_empty() {
        ui.weak("None of your artists charted here.");
        return;
    }

    let cap = PERSONAL_CAP_STREAMS as f64;
    let artists: Vec<String> = views.personal.iter().map(|b| b.artist.clone()).collect();
    let totals: Vec<u64> = views.personal.iter().map(|b| b.streams).collect();

    let bars: Vec<Bar> = views
        .personal
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let color = if b.over_threshold {
                OVER_CAP_GREEN
            } else {
                UNDER_CAP_GREEN
            };
            Bar::new(i as f64, (b.streams as f64).min(cap))
                .name(&b.artist)
                .fill(color)
                .width(0.7)
        })
        .collect();

    let chart = BarChart::new(bars).element_formatter(Box::new(
        move |bar: &Bar, _chart: &BarChart| {
            let total = totals.get(bar.argument as usize).copied().unwrap_or_default();
            format!("{}\n{total} streams", bar.name)
        },
    ));

    Plot::new("personal_stream_plot")
        .height(280.0)
        .include_y(0.0)
        .include_y(cap)
        .x_axis_formatter(label_formatter(artists))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

// ---------------------------------------------------------------------------
// World top 10 (horizontal bars)
// ---------------------------------------------------------------------------

/// Ten biggest artists in the selected region; the largest sits on top.
pub fn world_top10_plot(ui: &mut Ui, views: &RegionViews) {
    ui.label(
        RichText::new(format!("Top 10 Artists Total Streams in {}", views.label))
            .strong()
            .color(WHEAT),
    );

    if views.world_top10.is_empty() {
        ui.weak("No chart data for this region.");
        return;
    }

    let artists: Vec<String> = views.world_top10.iter().map(|b| b.artist.clone()).collect();
    let bars: Vec<Bar> = views
        .world_top10
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(i as f64, b.streams as f64)
                .name(&b.artist)
                .fill(WORLD_BAR_GREEN)
                .width(0.7)
        })
        .collect();

    let chart = BarChart::new(bars).horizontal().element_formatter(Box::new(
        |bar: &Bar, _chart: &BarChart| format!("{}\n{} streams", bar.name, bar.value as u64),
    ));

    Plot::new("world_top10_plot")
        .include_x(0.0)
        .y_axis_formatter(label_formatter(artists))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}
