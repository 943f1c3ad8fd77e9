use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use visit_dashboard::color::{GREEN, ORANGE};
use visit_dashboard::data::summary::{CategoryCount, MonthCount};

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Axis formatter mapping integer positions to `labels`; other grid marks
/// stay blank.
fn index_labels(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn chart_title(ui: &mut Ui, title: &str) {
    ui.label(RichText::new(title).strong().color(Color32::WHITE));
}

// ---------------------------------------------------------------------------
// Monthly visits with rate of change
// ---------------------------------------------------------------------------

/// Bars of visits per month above a line of the month-over-month change.
/// Both plots share their x axis.
pub fn monthly_visits_and_change(ui: &mut Ui, months: &[MonthCount]) {
    chart_title(ui, "Monthly Visits and Rate of Change");

    let labels: Vec<String> = months.iter().map(|m| m.period.label()).collect();

    let bars: Vec<Bar> = months
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Bar::new(i as f64, m.visits as f64)
                .name(m.period.to_string())
                .fill(GREEN.gamma_multiply(0.7))
                .width(0.7)
        })
        .collect();
    let chart = BarChart::new(bars).name("Number of Visits").color(GREEN);

    Plot::new("monthly_visits")
        .height(220.0)
        .legend(Legend::default())
        .y_axis_label("Number of Visits")
        .x_axis_formatter(index_labels(labels.clone()))
        .link_axis("monthly_x", [true, false])
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));

    let change: Vec<[f64; 2]> = months
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.change_pct.map(|pct| [i as f64, pct]))
        .collect();

    Plot::new("monthly_change")
        .height(160.0)
        .legend(Legend::default())
        .x_axis_label("Month")
        .y_axis_label("Rate of Change (%)")
        .x_axis_formatter(index_labels(labels))
        .link_axis("monthly_x", [true, false])
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(change.clone()))
                    .name("Rate of Change")
                    .color(ORANGE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(change))
                    .radius(3.5)
                    .color(ORANGE),
            );
        });
}

// ---------------------------------------------------------------------------
// Top specialisations (horizontal bars)
// ---------------------------------------------------------------------------

pub fn top_specialisations(ui: &mut Ui, ranked: &[CategoryCount]) {
    chart_title(ui, "Top 10 Attending Doctor Specializations");

    // Highest count at the top: the first entry gets the largest position.
    let n = ranked.len();
    let mut labels = vec![String::new(); n];
    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let position = n - 1 - i;
            labels[position] = c.label.clone();
            Bar::new(position as f64, c.visits as f64)
                .name(&c.label)
                .fill(GREEN)
                .width(0.7)
        })
        .collect();
    let chart = BarChart::new(bars)
        .name("Number of Visits")
        .color(GREEN)
        .horizontal();

    Plot::new("top_specialisations")
        .height(300.0)
        .x_axis_label("Number of Visits")
        .y_axis_formatter(index_labels(labels))
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

// ---------------------------------------------------------------------------
// Visits per month over the whole dataset (area)
// ---------------------------------------------------------------------------

pub fn monthly_area(ui: &mut Ui, months: &[MonthCount]) {
    chart_title(ui, "Number of Visits Each Month");

    let labels: Vec<String> = months.iter().map(|m| m.period.to_string()).collect();
    let points: Vec<[f64; 2]> = months
        .iter()
        .enumerate()
        .map(|(i, m)| [i as f64, m.visits as f64])
        .collect();

    Plot::new("monthly_area")
        .height(320.0)
        .legend(Legend::default())
        .x_axis_label("Month")
        .y_axis_label("Number of Visits")
        .x_axis_formatter(index_labels(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Number of Visits")
                    .color(ORANGE)
                    .width(2.0)
                    .fill(0.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(3.5)
                    .color(ORANGE),
            );
        });
}
