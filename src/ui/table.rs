use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use visit_dashboard::data::model::VisitDataset;

const ROW_HEIGHT: f32 = 18.0;

/// Scrolling table of the visits at `indices`.
pub fn visits_table(ui: &mut Ui, dataset: &VisitDataset, indices: &[usize]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(320.0)
        .column(Column::auto().at_least(130.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Created", "Visit Type", "Day/Night", "Specialisation"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                let Some(visit) = indices
                    .get(row.index())
                    .and_then(|&i| dataset.visits.get(i))
                else {
                    return;
                };
                row.col(|ui| {
                    ui.label(visit.created_on.format("%Y-%m-%d %H:%M").to_string());
                });
                row.col(|ui| {
                    ui.label(visit.visit_type.as_deref().unwrap_or("–"));
                });
                row.col(|ui| {
                    ui.label(visit.day_or_night.to_string());
                });
                row.col(|ui| {
                    ui.label(visit.specialisation.as_deref().unwrap_or("–"));
                });
            });
        });
}
