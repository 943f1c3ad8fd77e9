use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Logo (centered) ----
    let logo = egui::include_image!("../../assets/logo.png");
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add(
            egui::Image::new(logo)
                .max_width(ui.available_width() * 0.8)
                .max_height(120.0),
        );
    });
    ui.add_space(4.0);

    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Edit a copy so the cache is rebuilt once, after all widgets ran.
    let mut selection = state.filters.clone();
    let options = &state.options;

    filter_combo(
        ui,
        "Year",
        &mut selection.year,
        options.years.iter().map(|y| (*y, y.to_string())),
    );
    filter_combo(
        ui,
        "Quarter",
        &mut selection.quarter,
        options.quarters.iter().map(|q| (*q, q.to_string())),
    );
    filter_combo(
        ui,
        "Month",
        &mut selection.month,
        options.months.iter().map(|(m, name)| (*m, name.to_string())),
    );
    filter_combo(
        ui,
        "Visit Type",
        &mut selection.visit_type,
        options.visit_types.iter().map(|t| (t.clone(), t.clone())),
    );

    ui.add_space(8.0);
    if ui.button("Reset filters").clicked() {
        selection = Default::default();
    }

    state.set_filters(selection);
}

/// A combo box with an "All" entry (`None`) followed by `choices`.
fn filter_combo<T: Clone + PartialEq>(
    ui: &mut Ui,
    label: &str,
    current: &mut Option<T>,
    choices: impl IntoIterator<Item = (T, String)>,
) {
    let choices: Vec<(T, String)> = choices.into_iter().collect();
    let selected_text = current
        .as_ref()
        .and_then(|c| choices.iter().find(|(v, _)| v == c))
        .map(|(_, text)| text.clone())
        .unwrap_or_else(|| "All".to_string());

    ui.strong(label);
    egui::ComboBox::from_id_salt(label)
        .selected_text(selected_text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(current, None, "All");
            for (value, text) in choices {
                ui.selectable_value(current, Some(value), text);
            }
        });
    ui.add_space(6.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.summary.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} visits loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            if ds.skipped_rows > 0 {
                ui.label(
                    RichText::new(format!("{} rows skipped", ds.skipped_rows))
                        .color(Color32::YELLOW),
                );
            }
        }

        if let Some(path) = &state.source {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open visit data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export summary")
        .add_filter("JSON", &["json"])
        .set_file_name("visit_summary.json")
        .save_file();

    if let Some(path) = file {
        state.export_summary(&path);
    }
}
