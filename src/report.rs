use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::Args;
use crate::data::stats::{
    CategoryCount, DashboardSummary, MovieRow, format_pct, format_rating,
};
use crate::state::{AppState, DatasetCache};

// ---------------------------------------------------------------------------
// Headless summary (`--summary`)
// ---------------------------------------------------------------------------

/// Load, filter and print the dashboard figures to stdout.
pub fn run(args: &Args) -> Result<()> {
    let mut state = AppState::new(DatasetCache::new(&args.movies, &args.labels), args.top);
    state.load(&args.filter_overrides())?;

    let summary = state
        .summary
        .as_ref()
        .context("no summary computed after load")?;

    let warning = state.labels_warning();
    if let Some(warning) = &warning {
        eprintln!("warning: {warning}");
    }

    if args.json {
        println!("{}", render_json(summary, warning)?);
    } else {
        print!("{}", render_text(summary));
    }
    Ok(())
}

/// JSON document printed by `--summary --json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    summary: &'a DashboardSummary,
    /// Set when the labels file could not be joined.
    labels_warning: Option<String>,
}

/// Pretty JSON rendering of a [`DashboardSummary`] plus the labels diagnostic.
pub fn render_json(summary: &DashboardSummary, labels_warning: Option<String>) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        summary,
        labels_warning,
    })
    .context("serialising summary")
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn write_distribution(out: &mut String, heading: &str, dist: &Option<Vec<CategoryCount>>) {
    let _ = writeln!(out, "\n{heading}");
    match dist {
        None => {
            let _ = writeln!(out, "  (labels unavailable)");
        }
        Some(dist) => {
            for c in dist {
                let _ = writeln!(out, "  {:<12} {:>6}", c.category, c.count);
            }
        }
    }
}

fn write_rows(out: &mut String, rows: &[MovieRow]) {
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, r) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<32} {:>4}  {:>4}  {:>8}  FL:{:<3}  WW:{:<3}",
            i + 1,
            r.title,
            opt(&r.year),
            format_rating(r.imdb_rating),
            opt(&r.num_votes),
            opt(&r.female_lead),
            opt(&r.working_woman),
        );
    }
}

/// Plain-text rendering of a [`DashboardSummary`].
pub fn render_text(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let f = &summary.filters;

    let _ = writeln!(out, "Tamil Cinema Representation Analysis");
    let _ = writeln!(
        out,
        "Filters: years {}–{}, female lead {}, working woman {}",
        f.year_min, f.year_max, f.female_lead, f.working_woman
    );
    if let Some((lo, hi)) = summary.year_bounds {
        let _ = writeln!(out, "Data covers {lo}–{hi}");
    }

    let _ = writeln!(out, "\nTotal movies     {}", summary.total_count);
    let _ = writeln!(out, "Avg rating       {}", format_rating(summary.avg_rating));
    let _ = writeln!(out, "Female leads     {}", format_pct(summary.female_lead_pct));
    let _ = writeln!(out, "Working women    {}", format_pct(summary.working_woman_pct));

    write_distribution(&mut out, "Female lead distribution", &summary.female_lead_distribution);
    write_distribution(&mut out, "Working woman distribution", &summary.working_woman_distribution);

    if let Some(trend) = &summary.female_lead_trend {
        let _ = writeln!(out, "\nFemale lead trend");
        for t in trend {
            let _ = writeln!(out, "  {}  {:>5.1}%  ({} movies)", t.year, t.pct_yes, t.rows);
        }
    }

    let _ = writeln!(out, "\nTop {} movies by rating", summary.top_rated.len());
    write_rows(&mut out, &summary.top_rated);

    let _ = writeln!(out, "\nMovies per year");
    for y in &summary.yearly_counts {
        let _ = writeln!(out, "  {}  {:>4}", y.year, y.count);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterParams, LabelFilter, apply_filters};
    use crate::data::model::{Label, MovieRecord, MovieTable, OptionalField, Schema};

    fn summary(schema: Schema) -> DashboardSummary {
        let mut a = MovieRecord::new("Aruvi", Some(2016));
        a.imdb_rating = Some(8.6);
        a.female_lead = Some(Label::Yes);
        let mut b = MovieRecord::new("Asuran", Some(2019));
        b.imdb_rating = Some(8.2);
        let table = MovieTable::new(vec![a, b], schema);
        let params = FilterParams {
            year_min: 2011,
            year_max: 2019,
            female_lead: LabelFilter::All,
            working_woman: LabelFilter::All,
        };
        apply_filters(&table, &params).summary(params, 10)
    }

    #[test]
    fn text_report_lists_kpis_and_ranking() {
        let text = render_text(&summary(
            Schema::default()
                .with(OptionalField::FemaleLead)
                .with(OptionalField::WorkingWoman),
        ));

        assert!(text.contains("Total movies     2"));
        assert!(text.contains("Avg rating       8.4"));
        assert!(text.contains("Female leads     50%"));
        assert!(text.contains("1. Aruvi"));
        assert!(text.contains("2016"));
    }

    #[test]
    fn text_report_notes_missing_labels() {
        let text = render_text(&summary(Schema::default()));
        assert!(text.contains("(labels unavailable)"));
        assert!(!text.contains("Female lead trend"));
    }

    #[test]
    fn summary_serialises_to_json() {
        let text = render_json(&summary(Schema::default()), None).expect("render");
        let json: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(json["total_count"], 2);
        assert_eq!(json["filters"]["female_lead"], "All");
        assert!(json["female_lead_distribution"].is_null());
        assert!(json["labels_warning"].is_null());
    }

    #[test]
    fn json_report_carries_the_labels_warning() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let movies = dir.path().join("movies.csv");
        std::fs::write(&movies, "title,year,imdb_rating\nAruvi,2016,8.5\n").expect("write");
        let labels = dir.path().join("absent.csv");

        let mut state = AppState::new(DatasetCache::new(&movies, &labels), 10);
        state
            .load(&crate::data::filter::FilterOverrides::default())
            .expect("load");
        let summary = state.summary.as_ref().expect("summary");

        let text = render_json(summary, state.labels_warning()).expect("render");
        let json: serde_json::Value = serde_json::from_str(&text).expect("json");
        let warning = json["labels_warning"].as_str().expect("warning present");
        assert!(warning.contains("absent.csv"));
        assert_eq!(json["total_count"], 1);
    }
}
