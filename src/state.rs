use std::path::{Path, PathBuf};

use crate::data::filter::{FilterChoice, FilterDomains, FilterSelection};
use crate::data::loader::{load_file, LoadOptions};
use crate::data::model::Dataset;
use crate::pipeline::charts::{render, ChartBundle};
use crate::pipeline::PipelineOptions;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Dataset>,

    /// Where the current dataset came from.
    pub source: Option<PathBuf>,

    /// Selector domains derived from the dataset.
    pub domains: FilterDomains,

    /// Current filter selection.
    pub selection: FilterSelection,

    /// Output of the last render pass (cached until the selection changes).
    pub bundle: Option<ChartBundle>,

    pub load_options: LoadOptions,
    pub pipeline_options: PipelineOptions,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(load_options: LoadOptions, pipeline_options: PipelineOptions) -> Self {
        Self {
            dataset: None,
            source: None,
            domains: FilterDomains::default(),
            selection: FilterSelection::default(),
            bundle: None,
            load_options,
            pipeline_options,
            status_message: None,
        }
    }

    /// Load `path`, replacing the current dataset on success. On failure the
    /// previous dataset is kept and the error is shown in the status line.
    pub fn open(&mut self, path: &Path) {
        match load_file(path, self.load_options) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    dataset.len(),
                    dataset.schema.names(),
                    path.display()
                );
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, derive selector domains and re-render.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        if dataset.is_empty() {
            log::warn!("dataset has a header but no rows");
        }
        match FilterDomains::from_table(&dataset) {
            Ok(domains) => {
                self.selection = domains.sanitize(&self.selection);
                self.domains = domains;
                self.dataset = Some(dataset);
                self.status_message = None;
                self.rerender();
            }
            Err(e) => {
                log::error!("Dataset rejected: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute the chart bundle for the current selection.
    pub fn rerender(&mut self) {
        let Some(ds) = &self.dataset else {
            self.bundle = None;
            return;
        };
        match render(ds, &self.selection, &self.pipeline_options) {
            Ok(bundle) => self.bundle = Some(bundle),
            Err(e) => {
                log::error!("Render failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.bundle = None;
            }
        }
    }

    pub fn set_marital_status(&mut self, choice: FilterChoice) {
        if self.selection.marital_status != choice {
            self.selection.marital_status = choice;
            self.rerender();
        }
    }

    pub fn set_gender(&mut self, choice: FilterChoice) {
        if self.selection.gender != choice {
            self.selection.gender = choice;
            self.rerender();
        }
    }

    /// Number of rows in the current view.
    pub fn visible_rows(&self) -> usize {
        self.bundle.as_ref().map_or(0, |b| b.table.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::sample_dataset;

    fn state() -> AppState {
        let mut s = AppState::new(LoadOptions::default(), PipelineOptions::default());
        s.set_dataset(sample_dataset());
        s
    }

    #[test]
    fn new_dataset_renders_everything() {
        let s = state();
        assert_eq!(s.visible_rows(), 4);
        assert_eq!(s.domains.marital_status.len(), 2);
    }

    #[test]
    fn changing_a_filter_rerenders() {
        let mut s = state();
        s.set_gender(FilterChoice::only("M"));
        assert_eq!(s.visible_rows(), 2);
        s.set_marital_status(FilterChoice::only("S"));
        assert_eq!(s.visible_rows(), 1);
        s.set_gender(FilterChoice::All);
        assert_eq!(s.visible_rows(), 2);
    }

    #[test]
    fn failed_open_keeps_previous_dataset() {
        let mut s = state();
        s.open(Path::new("/no/such/file.csv"));
        assert!(s.dataset.is_some());
        assert!(s.status_message.as_deref().unwrap_or("").starts_with("Error"));
    }
}
