use std::path::PathBuf;

use clap::Parser;

use crate::data::filter::{FilterOverrides, LabelFilter};
use crate::data::stats::DEFAULT_TOP_N;

pub const DEFAULT_MOVIES_PATH: &str = "tamil_movies_clean.csv";
pub const DEFAULT_LABELS_PATH: &str = "tamil_representation_labels.csv";

/// Tamil cinema representation dashboard.
///
/// Opens a window by default; `--summary` prints the same figures instead.
/// Log verbosity follows `RUST_LOG`.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Cleaned movie table (.csv, .json or .parquet)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MOVIES_PATH)]
    pub movies: PathBuf,

    /// Optional representation labels table
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LABELS_PATH)]
    pub labels: PathBuf,

    /// Print a summary to stdout instead of opening a window
    #[arg(long)]
    pub summary: bool,

    /// With --summary, emit JSON
    #[arg(long, requires = "summary")]
    pub json: bool,

    /// First year of the initial selection
    #[arg(long)]
    pub year_min: Option<i32>,

    /// Last year of the initial selection
    #[arg(long)]
    pub year_max: Option<i32>,

    /// Initial female lead filter: all, yes or no
    #[arg(long)]
    pub female_lead: Option<LabelFilter>,

    /// Initial working woman filter: all, yes or no
    #[arg(long)]
    pub working_woman: Option<LabelFilter>,

    /// Number of movies in the rating ranking
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,
}

impl Args {
    pub fn filter_overrides(&self) -> FilterOverrides {
        FilterOverrides {
            year_min: self.year_min,
            year_max: self.year_max,
            female_lead: self.female_lead,
            working_woman: self.working_woman,
        }
    }
}
