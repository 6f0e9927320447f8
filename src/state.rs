use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::color::ColorMap;
use crate::data::filter::{
    DEFAULT_YEAR_WINDOW, FilterOverrides, FilterParams, LabelFilter, apply_filters,
};
use crate::data::loader::{self, LoadOutcome};
use crate::data::model::{LabelField, MovieTable};
use crate::data::stats::DashboardSummary;

// ---------------------------------------------------------------------------
// Dataset cache
// ---------------------------------------------------------------------------

/// Loads the canonical table once per `(movies, labels)` path pair.
///
/// The input files are static, so an entry is never invalidated; choosing
/// different paths drops it.
#[derive(Debug, Clone)]
pub struct DatasetCache {
    movies_path: PathBuf,
    labels_path: PathBuf,
    loaded: Option<Arc<LoadOutcome>>,
}

impl DatasetCache {
    pub fn new(movies_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        Self {
            movies_path: movies_path.into(),
            labels_path: labels_path.into(),
            loaded: None,
        }
    }

    pub fn movies_path(&self) -> &Path {
        &self.movies_path
    }

    pub fn labels_path(&self) -> &Path {
        &self.labels_path
    }

    pub fn set_movies_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if path != self.movies_path {
            self.movies_path = path;
            self.loaded = None;
        }
    }

    pub fn set_labels_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if path != self.labels_path {
            self.labels_path = path;
            self.loaded = None;
        }
    }

    /// Return the cached outcome, loading it on first use.
    /// Failures are not cached, so a later call retries.
    pub fn get_or_load(&mut self) -> Result<Arc<LoadOutcome>> {
        if let Some(outcome) = &self.loaded {
            return Ok(Arc::clone(outcome));
        }
        let outcome = Arc::new(loader::load(&self.movies_path, &self.labels_path)?);
        self.loaded = Some(Arc::clone(&outcome));
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
pub struct AppState {
    pub cache: DatasetCache,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<LoadOutcome>>,

    /// Current filter selection.
    pub filters: FilterParams,

    /// Size of the rating ranking.
    pub top_n: usize,

    /// Derived views for the current selection (cached).
    pub summary: Option<DashboardSummary>,

    /// Colours shared by every categorical chart.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(cache: DatasetCache, top_n: usize) -> Self {
        Self {
            cache,
            dataset: None,
            filters: FilterParams {
                year_min: DEFAULT_YEAR_WINDOW.0,
                year_max: DEFAULT_YEAR_WINDOW.1,
                female_lead: LabelFilter::All,
                working_woman: LabelFilter::All,
            },
            top_n,
            summary: None,
            color_map: ColorMap::default(),
            status_message: None,
        }
    }

    /// Load (or re-use) the dataset and reset the filters from `overrides`.
    /// A failure is kept in `status_message` as well as returned.
    pub fn load(&mut self, overrides: &FilterOverrides) -> Result<()> {
        match self.cache.get_or_load() {
            Ok(outcome) => {
                self.set_dataset(outcome, overrides);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.dataset = None;
                self.summary = None;
                Err(e)
            }
        }
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, outcome: Arc<LoadOutcome>, overrides: &FilterOverrides) {
        self.filters = FilterParams::resolve(&outcome.table, overrides);
        self.color_map = ColorMap::new(
            outcome
                .table
                .records()
                .iter()
                .flat_map(|r| LabelField::ALL.into_iter().filter_map(move |f| r.label(f)))
                .map(|l| l.as_str()),
        );
        self.dataset = Some(outcome);
        self.status_message = None;
        self.refilter();
    }

    pub fn table(&self) -> Option<&MovieTable> {
        self.dataset.as_deref().map(|o| o.table.as_ref())
    }

    /// Warning to show when the labels could not be joined.
    pub fn labels_warning(&self) -> Option<String> {
        self.dataset.as_ref().and_then(|o| o.labels.warning())
    }

    /// Recompute the derived views after a filter change.
    pub fn refilter(&mut self) {
        self.summary = self.dataset.as_ref().map(|outcome| {
            apply_filters(&outcome.table, &self.filters).summary(self.filters, self.top_n)
        });
    }

    /// Point at a different movie file and reload.
    pub fn open_movies(&mut self, path: PathBuf) {
        self.cache.set_movies_path(path);
        // Error already recorded in `status_message`.
        let _ = self.load(&FilterOverrides::default());
    }

    /// Point at a different labels file and reload.
    pub fn open_labels(&mut self, path: PathBuf) {
        self.cache.set_labels_path(path);
        let _ = self.load(&FilterOverrides::default());
    }
}
