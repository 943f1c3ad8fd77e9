use chrono::NaiveDate;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use visit_dashboard::color::{self, ColorMap, GREEN, ORANGE, TILE};
use visit_dashboard::data::model::DayOrNight;
use visit_dashboard::data::summary::DashboardSummary;

use crate::state::AppState;
use crate::ui::charts;
use crate::ui::pie::{self, PieSlice};
use crate::ui::table;

const PLACEHOLDER: &str = "–";

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the KPI tiles, charts and data table for the current view.
pub fn show(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(summary)) = (&state.dataset, &state.summary) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view visits  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(
                    RichText::new("SERVICE PROVIDER VISITS DASHBOARD")
                        .size(28.0)
                        .strong()
                        .color(Color32::WHITE),
                );
            });
            ui.add_space(12.0);

            kpi_tiles(ui, summary);
            ui.add_space(16.0);

            if summary.is_empty() {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(RichText::new("No visits match the current filters").italics());
                });
            } else {
                ui.columns(2, |cols| {
                    charts::monthly_visits_and_change(&mut cols[0], &summary.visits_by_month);
                    let slices = day_night_slices(summary);
                    pie::donut(&mut cols[1], "Day vs Night Visits", &slices, false);
                });
                ui.add_space(16.0);

                ui.columns(2, |cols| {
                    let slices = visit_type_slices(summary, state.type_colors.as_ref());
                    pie::donut(&mut cols[0], "Visits by Visit Type", &slices, true);
                    charts::top_specialisations(&mut cols[1], &summary.top_specialisations);
                });
            }
            ui.add_space(16.0);

            charts::monthly_area(ui, &summary.all_months);
            ui.add_space(16.0);

            egui::CollapsingHeader::new(RichText::new("Data").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    table::visits_table(ui, dataset, &state.visible_indices);
                });
        });
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

fn kpi_tiles(ui: &mut Ui, summary: &DashboardSummary) {
    ui.columns(2, |cols| {
        tile(&mut cols[0], TILE, "Start Date", format_date(summary.start_date));
        tile(&mut cols[1], TILE, "End Date", format_date(summary.end_date));
    });
    ui.add_space(12.0);

    ui.columns(4, |cols| {
        tile(&mut cols[0], ORANGE, "Total Visits", summary.total_visits.to_string());
        tile(&mut cols[1], ORANGE, "Total Visits by Day", summary.day_visits.to_string());
        tile(&mut cols[2], ORANGE, "Total Visits by Night", summary.night_visits.to_string());
        tile(
            &mut cols[3],
            ORANGE,
            "Average Visits",
            summary
                .average_visits_per_month
                .map(|avg| format!("{avg:.2}"))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        );
    });
    ui.add_space(12.0);

    let peak = summary
        .peak_month
        .as_ref()
        .map(|m| format!("{} ({} visits)", m.period, m.visits))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    tile(ui, GREEN, "Month with Highest Visits", peak);
}

fn tile(ui: &mut Ui, fill: Color32, title: &str, value: String) {
    egui::Frame::default()
        .fill(fill)
        .rounding(5.0)
        .inner_margin(12.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(title).size(13.0).color(Color32::WHITE));
                ui.label(RichText::new(value).size(26.0).strong().color(Color32::WHITE));
            });
        });
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

// ---------------------------------------------------------------------------
// Pie inputs
// ---------------------------------------------------------------------------

fn day_night_slices(summary: &DashboardSummary) -> Vec<PieSlice> {
    vec![
        PieSlice {
            label: DayOrNight::Day.to_string(),
            value: summary.day_visits as f64,
            color: GREEN,
        },
        PieSlice {
            label: DayOrNight::Night.to_string(),
            value: summary.night_visits as f64,
            color: ORANGE,
        },
    ]
}

/// Slices keep the colour assigned to their visit type at load time so a
/// type looks the same whatever the filters.
fn visit_type_slices(summary: &DashboardSummary, colors: Option<&ColorMap>) -> Vec<PieSlice> {
    let fallback = color::category_palette(summary.visits_by_type.len());
    summary
        .visits_by_type
        .iter()
        .zip(fallback)
        .map(|(c, fallback)| PieSlice {
            label: c.label.clone(),
            value: c.visits as f64,
            color: colors.map(|m| m.color_for(&c.label)).unwrap_or(fallback),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use visit_dashboard::data::filter::FilterSelection;
    use visit_dashboard::data::summary::CategoryCount;

    fn summary() -> DashboardSummary {
        DashboardSummary {
            filters: FilterSelection::default(),
            total_visits: 5,
            day_visits: 3,
            night_visits: 2,
            average_day_visits: 0.25,
            average_night_visits: 2.0 / 12.0,
            average_visits_per_month: Some(5.0),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            end_date: None,
            visits_by_month: Vec::new(),
            peak_month: None,
            visits_by_type: vec![
                CategoryCount { label: "Home".into(), visits: 4 },
                CategoryCount { label: "Clinic".into(), visits: 1 },
            ],
            top_specialisations: Vec::new(),
            all_months: Vec::new(),
        }
    }

    #[test]
    fn dates_format_or_placeholder() {
        let s = summary();
        assert_eq!(format_date(s.start_date), "2024-01-02");
        assert_eq!(format_date(s.end_date), PLACEHOLDER);
    }

    #[test]
    fn day_night_uses_fixed_colours() {
        let slices = day_night_slices(&summary());
        assert_eq!(slices[0].label, "Day");
        assert_eq!(slices[0].value, 3.0);
        assert_eq!(slices[0].color, GREEN);
        assert_eq!(slices[1].color, ORANGE);
    }

    #[test]
    fn visit_type_colours_are_stable() {
        let types = vec!["Clinic".to_string(), "Home".to_string()];
        let map = ColorMap::new(&types);
        let slices = visit_type_slices(&summary(), Some(&map));
        // "Home" is listed first by count but keeps its load-time colour.
        assert_eq!(slices[0].label, "Home");
        assert_eq!(slices[0].color, map.color_for("Home"));
        assert_eq!(slices[1].color, map.color_for("Clinic"));

        let unmapped = visit_type_slices(&summary(), None);
        assert_eq!(unmapped[0].color, GREEN);
    }
}
