//! Derived views over a [`FilteredView`]: KPIs, grouped series and rankings.
//!
//! Every function here is pure and total. Empty subsets produce empty series,
//! zero counts or `None`; views that need a label column return `None` when
//! the canonical table's schema says the column is absent.

use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::{FilterParams, FilteredView};
use super::model::{Label, LabelField, MovieRecord};

/// Bucket for rows with no value in a categorical column.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearShare {
    pub year: i32,
    /// Percentage of eligible rows labelled `Yes`.
    pub pct_yes: f64,
    /// Rows with both a year and a label in this year.
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Flat, display-ready copy of a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRow {
    pub title: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub imdb_rating: Option<f64>,
    pub num_votes: Option<i64>,
    pub female_lead: Option<String>,
    pub working_woman: Option<String>,
}

impl From<&MovieRecord> for MovieRow {
    fn from(r: &MovieRecord) -> Self {
        MovieRow {
            title: r.title.clone(),
            year: r.year,
            genre: r.genre.clone(),
            imdb_rating: r.imdb_rating,
            num_votes: r.num_votes,
            female_lead: r.female_lead.as_ref().map(|l| l.to_string()),
            working_woman: r.working_woman.as_ref().map(|l| l.to_string()),
        }
    }
}

/// Five-number summary of ratings within one category (box plot input).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSpread {
    pub category: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

fn category_name(label: Option<&Label>) -> String {
    label
        .map(|l| l.to_string())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Percentile with linear interpolation between closest ranks (NumPy default).
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

impl FilteredView<'_> {
    pub fn total_count(&self) -> usize {
        self.len()
    }

    /// Mean of the non-null ratings, `None` when there are none.
    pub fn avg_rating(&self) -> Option<f64> {
        let (sum, n) = self
            .records()
            .filter_map(|r| r.imdb_rating)
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Share of rows labelled `Yes`, in percent.
    ///
    /// The denominator is the whole subset: unlabelled rows count as not-Yes.
    /// Returns 0 for an empty subset or when the column is absent.
    pub fn label_pct(&self, field: LabelField) -> f64 {
        if self.is_empty() || !self.table().schema().has_label(field) {
            return 0.0;
        }
        let yes = self
            .records()
            .filter(|r| r.label(field).is_some_and(Label::is_yes))
            .count();
        yes as f64 * 100.0 / self.len() as f64
    }

    pub fn female_lead_pct(&self) -> f64 {
        self.label_pct(LabelField::FemaleLead)
    }

    pub fn working_woman_pct(&self) -> f64 {
        self.label_pct(LabelField::WorkingWoman)
    }

    /// Frequency of every value of `field`, missing values as [`UNKNOWN_CATEGORY`].
    /// Sorted by count descending, then by category name.
    pub fn category_distribution(&self, field: LabelField) -> Option<Vec<CategoryCount>> {
        if !self.table().schema().has_label(field) {
            return None;
        }
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for r in self.records() {
            *counts.entry(category_name(r.label(field))).or_default() += 1;
        }
        let mut dist: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        dist.sort_by(|a, b| b.count.cmp(&a.count));
        Some(dist)
    }

    /// Per-year percentage of `Yes`, over rows that have both a year and a
    /// value for `field`. Years with no such rows are omitted.
    pub fn trend_by_year(&self, field: LabelField) -> Option<Vec<YearShare>> {
        if !self.table().schema().has_label(field) {
            return None;
        }
        let mut per_year: BTreeMap<i32, (usize, usize)> = BTreeMap::new();
        for r in self.records() {
            let (Some(year), Some(label)) = (r.year, r.label(field)) else {
                continue;
            };
            let (yes, total) = per_year.entry(year).or_default();
            *total += 1;
            if label.is_yes() {
                *yes += 1;
            }
        }
        Some(
            per_year
                .into_iter()
                .map(|(year, (yes, rows))| YearShare {
                    year,
                    pct_yes: yes as f64 * 100.0 / rows as f64,
                    rows,
                })
                .collect(),
        )
    }

    /// Movies per year, ascending; rows without a year are left out.
    pub fn yearly_counts(&self) -> Vec<YearCount> {
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for year in self.records().filter_map(|r| r.year) {
            *counts.entry(year).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect()
    }

    /// Rated rows by rating, highest first; equal ratings keep table order.
    pub fn top_n_by_rating(&self, n: usize) -> Vec<MovieRow> {
        let mut rated: Vec<(f64, &MovieRecord)> = self
            .records()
            .filter_map(|r| r.imdb_rating.map(|v| (v, r)))
            .collect();
        // `sort_by` is stable.
        rated.sort_by(|a, b| b.0.total_cmp(&a.0));
        rated
            .into_iter()
            .take(n)
            .map(|(_, r)| MovieRow::from(r))
            .collect()
    }

    /// Rating spread per value of `field` (missing values as [`UNKNOWN_CATEGORY`]).
    /// Categories with no rated rows are omitted.
    pub fn rating_by_category(&self, field: LabelField) -> Option<Vec<RatingSpread>> {
        if !self.table().schema().has_label(field) {
            return None;
        }
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for r in self.records() {
            if let Some(rating) = r.imdb_rating {
                groups.entry(category_name(r.label(field))).or_default().push(rating);
            }
        }
        Some(
            groups
                .into_iter()
                .map(|(category, mut values)| {
                    values.sort_by(f64::total_cmp);
                    RatingSpread {
                        category,
                        count: values.len(),
                        min: values[0],
                        q1: percentile(&values, 25.0),
                        median: percentile(&values, 50.0),
                        q3: percentile(&values, 75.0),
                        max: values[values.len() - 1],
                    }
                })
                .collect(),
        )
    }

    /// Equal-width histogram of the non-null ratings over their own range.
    pub fn rating_histogram(&self, bins: usize) -> Vec<HistogramBin> {
        let ratings: Vec<f64> = self.records().filter_map(|r| r.imdb_rating).collect();
        if ratings.is_empty() || bins == 0 {
            return Vec::new();
        }
        let min = ratings.iter().copied().fold(f64::INFINITY, f64::min);
        let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if range.abs() < f64::EPSILON {
            return vec![HistogramBin {
                lower: min,
                upper: max,
                count: ratings.len(),
            }];
        }

        let width = range / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in &ratings {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + width * i as f64,
                upper: min + width * (i + 1) as f64,
                count,
            })
            .collect()
    }

    /// First `n` rows in table order.
    pub fn preview(&self, n: usize) -> Vec<MovieRow> {
        self.records().take(n).map(MovieRow::from).collect()
    }

    /// Every derived view in one snapshot.
    pub fn summary(&self, filters: FilterParams, top_n: usize) -> DashboardSummary {
        DashboardSummary {
            filters,
            year_bounds: self.table().year_bounds(),
            total_count: self.total_count(),
            avg_rating: self.avg_rating(),
            female_lead_pct: self.female_lead_pct(),
            working_woman_pct: self.working_woman_pct(),
            female_lead_distribution: self.category_distribution(LabelField::FemaleLead),
            working_woman_distribution: self.category_distribution(LabelField::WorkingWoman),
            female_lead_trend: self.trend_by_year(LabelField::FemaleLead),
            rating_by_female_lead: self.rating_by_category(LabelField::FemaleLead),
            yearly_counts: self.yearly_counts(),
            top_rated: self.top_n_by_rating(top_n),
            rating_histogram: self.rating_histogram(DEFAULT_HISTOGRAM_BINS),
            preview: self.preview(DEFAULT_PREVIEW_ROWS),
        }
    }
}

/// Everything the dashboard displays for one filter selection.
/// `None` marks a view whose label column is not available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub filters: FilterParams,
    pub year_bounds: Option<(i32, i32)>,
    pub total_count: usize,
    pub avg_rating: Option<f64>,
    pub female_lead_pct: f64,
    pub working_woman_pct: f64,
    pub female_lead_distribution: Option<Vec<CategoryCount>>,
    pub working_woman_distribution: Option<Vec<CategoryCount>>,
    pub female_lead_trend: Option<Vec<YearShare>>,
    pub rating_by_female_lead: Option<Vec<RatingSpread>>,
    pub yearly_counts: Vec<YearCount>,
    pub top_rated: Vec<MovieRow>,
    pub rating_histogram: Vec<HistogramBin>,
    pub preview: Vec<MovieRow>,
}

/// One decimal, or `N/A` when undefined.
pub fn format_rating(rating: Option<f64>) -> String {
    rating
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_pct(pct: f64) -> String {
    format!("{pct:.0}%")
}
