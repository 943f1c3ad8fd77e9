use std::path::{Path, PathBuf};

use visit_dashboard::color::ColorMap;
use visit_dashboard::data::filter::{filtered_indices, FilterOptions, FilterSelection};
use visit_dashboard::data::loader::load_file;
use visit_dashboard::data::model::VisitDataset;
use visit_dashboard::data::summary::{self, DashboardSummary};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<VisitDataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Sidebar selections.
    pub filters: FilterSelection,

    /// Choices offered by the sidebar controls.
    pub options: FilterOptions,

    /// Indices of visits passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Figures for the current view (cached).
    pub summary: Option<DashboardSummary>,

    /// Colours for visit types, stable across filter changes.
    pub type_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset, reset filters and recompute.
    pub fn set_dataset(&mut self, dataset: VisitDataset, source: Option<PathBuf>) {
        self.filters = FilterSelection::default();
        self.options = FilterOptions::from_dataset(&dataset);
        self.type_colors = Some(ColorMap::new(&dataset.visit_types));

        self.dataset = Some(dataset);
        self.source = source;
        self.status_message = None;
        self.refilter();
    }

    /// Load a file, replacing the current dataset on success.
    ///
    /// On failure the previous dataset stays and the error is shown in the
    /// status line.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} visits from {} ({} rows skipped)",
                    dataset.len(),
                    path.display(),
                    dataset.skipped_rows
                );
                self.set_dataset(dataset, Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Replace the filter selection, recomputing only when it changed.
    pub fn set_filters(&mut self, filters: FilterSelection) {
        if filters != self.filters {
            self.filters = filters;
            self.refilter();
        }
    }

    /// Recompute `visible_indices` and `summary` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
            self.summary = Some(summary::summarize(ds, &self.visible_indices, &self.filters));
            log::debug!(
                "Filters {:?}: {} of {} visits",
                self.filters,
                self.visible_indices.len(),
                ds.len()
            );
        }
    }

    /// Write the current summary as JSON.
    pub fn export_summary(&mut self, path: &Path) {
        let Some(current) = &self.summary else {
            self.status_message = Some("Nothing to export: no dataset loaded".into());
            return;
        };
        match summary::write_json(path, current) {
            Ok(()) => {
                log::info!("Exported summary to {}", path.display());
                self.status_message = Some(format!("Exported {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export summary: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
