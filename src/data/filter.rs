use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::{Label, LabelField, MovieRecord, MovieTable};

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Initial year window shown before the user touches the slider.
pub const DEFAULT_YEAR_WINDOW: (i32, i32) = (2011, 2019);

/// Selector for one label column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LabelFilter {
    #[default]
    All,
    Yes,
    No,
}

impl LabelFilter {
    pub const ALL: [LabelFilter; 3] = [LabelFilter::All, LabelFilter::Yes, LabelFilter::No];

    pub fn as_str(self) -> &'static str {
        match self {
            LabelFilter::All => "All",
            LabelFilter::Yes => "Yes",
            LabelFilter::No => "No",
        }
    }

    /// `All` passes everything, including rows with no label.
    pub fn matches(self, label: Option<&Label>) -> bool {
        match self {
            LabelFilter::All => true,
            LabelFilter::Yes => label == Some(&Label::Yes),
            LabelFilter::No => label == Some(&Label::No),
        }
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(LabelFilter::All),
            "yes" => Ok(LabelFilter::Yes),
            "no" => Ok(LabelFilter::No),
            other => Err(format!("expected All, Yes or No, got '{other}'")),
        }
    }
}

/// The user's current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterParams {
    pub year_min: i32,
    pub year_max: i32,
    pub female_lead: LabelFilter,
    pub working_woman: LabelFilter,
}

/// Partial selection supplied on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOverrides {
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub female_lead: Option<LabelFilter>,
    pub working_woman: Option<LabelFilter>,
}

impl FilterParams {
    /// [`DEFAULT_YEAR_WINDOW`] clamped into the table's year bounds, no label filters.
    pub fn default_for(table: &MovieTable) -> Self {
        let (lo, hi) = DEFAULT_YEAR_WINDOW;
        FilterParams {
            year_min: lo,
            year_max: hi,
            female_lead: LabelFilter::All,
            working_woman: LabelFilter::All,
        }
        .clamped(table.year_bounds())
    }

    /// Start from the defaults, then apply any explicit overrides.
    ///
    /// Explicit years are taken as given. A single explicit bound is paired
    /// with the data's opposite bound rather than the default window, so
    /// `--year-min 2020` means "2020 onwards". A reversed pair is swapped.
    pub fn resolve(table: &MovieTable, overrides: &FilterOverrides) -> Self {
        let defaults = Self::default_for(table);
        let bounds = table.year_bounds();
        let (year_min, year_max) = match (overrides.year_min, overrides.year_max) {
            (Some(lo), Some(hi)) => (lo.min(hi), lo.max(hi)),
            (Some(lo), None) => (lo, bounds.map_or(lo, |(_, hi)| hi).max(lo)),
            (None, Some(hi)) => (bounds.map_or(hi, |(lo, _)| lo).min(hi), hi),
            (None, None) => (defaults.year_min, defaults.year_max),
        };
        FilterParams {
            year_min,
            year_max,
            female_lead: overrides.female_lead.unwrap_or(defaults.female_lead),
            working_woman: overrides.working_woman.unwrap_or(defaults.working_woman),
        }
    }

    /// Pull both ends of the range into `bounds`, keeping `min <= max`.
    pub fn clamped(mut self, bounds: Option<(i32, i32)>) -> Self {
        if let Some((lo, hi)) = bounds {
            self.year_min = self.year_min.clamp(lo, hi);
            self.year_max = self.year_max.clamp(lo, hi);
        }
        if self.year_min > self.year_max {
            self.year_min = self.year_max;
        }
        self
    }

    pub fn label_filter(&self, field: LabelField) -> LabelFilter {
        match field {
            LabelField::FemaleLead => self.female_lead,
            LabelField::WorkingWoman => self.working_woman,
        }
    }

    pub fn set_label_filter(&mut self, field: LabelField, value: LabelFilter) {
        match field {
            LabelField::FemaleLead => self.female_lead = value,
            LabelField::WorkingWoman => self.working_woman = value,
        }
    }

    /// Null years never fall inside a range.
    pub fn year_in_range(&self, record: &MovieRecord) -> bool {
        record
            .year
            .is_some_and(|y| self.year_min <= y && y <= self.year_max)
    }

    pub fn labels_match(&self, record: &MovieRecord) -> bool {
        LabelField::ALL
            .iter()
            .all(|&field| self.label_filter(field).matches(record.label(field)))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Row subset of the canonical table; the table itself is only borrowed.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a MovieTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn new(table: &'a MovieTable, indices: Vec<usize>) -> Self {
        FilteredView { table, indices }
    }

    /// Every row of the table.
    pub fn all(table: &'a MovieTable) -> Self {
        Self::new(table, (0..table.len()).collect())
    }

    pub fn table(&self) -> &'a MovieTable {
        self.table
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Rows in original table order.
    pub fn records(&self) -> impl Iterator<Item = &'a MovieRecord> + '_ {
        let records = self.table.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Keep the rows satisfying `predicate`.
    pub fn retain(mut self, predicate: impl Fn(&MovieRecord) -> bool) -> Self {
        let records = self.table.records();
        self.indices.retain(|&i| predicate(&records[i]));
        self
    }
}

/// Apply the year range and both label filters (logical AND).
pub fn apply_filters<'a>(table: &'a MovieTable, params: &FilterParams) -> FilteredView<'a> {
    FilteredView::all(table)
        .retain(|r| params.year_in_range(r))
        .retain(|r| params.labels_match(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{OptionalField, Schema};

    fn labelled(title: &str, year: Option<i32>, fl: Option<Label>, ww: Option<Label>) -> MovieRecord {
        let mut r = MovieRecord::new(title, year);
        r.female_lead = fl;
        r.working_woman = ww;
        r
    }

    fn labelled_schema() -> Schema {
        Schema::default()
            .with(OptionalField::FemaleLead)
            .with(OptionalField::WorkingWoman)
    }

    /// 100 rows over 2005..=2022 with a deterministic label pattern.
    fn hundred_movies() -> MovieTable {
        let records = (0..100)
            .map(|i| {
                let year = 2005 + (i % 18);
                let fl = match i % 3 {
                    0 => Some(Label::Yes),
                    1 => Some(Label::No),
                    _ => None,
                };
                let ww = if i % 4 == 0 { Some(Label::Yes) } else { Some(Label::No) };
                labelled(&format!("Film {i}"), Some(year), fl, ww)
            })
            .collect();
        MovieTable::new(records, labelled_schema())
    }

    #[test]
    fn scenario_year_window_and_female_lead() {
        let table = hundred_movies();
        assert_eq!(table.year_bounds(), Some((2005, 2022)));

        let params = FilterParams {
            year_min: 2011,
            year_max: 2019,
            female_lead: LabelFilter::Yes,
            working_woman: LabelFilter::All,
        };
        let view = apply_filters(&table, &params);

        let expected = table
            .records()
            .iter()
            .filter(|r| {
                let y = r.year.unwrap_or_default();
                (2011..=2019).contains(&y) && r.female_lead == Some(Label::Yes)
            })
            .count();
        assert!(expected > 0);
        assert_eq!(view.len(), expected);
        assert!(view
            .records()
            .all(|r| r.female_lead == Some(Label::Yes) && params.year_in_range(r)));
    }

    #[test]
    fn filter_order_does_not_matter() {
        let table = hundred_movies();
        for fl in LabelFilter::ALL {
            for ww in LabelFilter::ALL {
                for (lo, hi) in [(2005, 2022), (2011, 2019), (2015, 2015), (2030, 2040)] {
                    let params = FilterParams {
                        year_min: lo,
                        year_max: hi,
                        female_lead: fl,
                        working_woman: ww,
                    };
                    let years_first = FilteredView::all(&table)
                        .retain(|r| params.year_in_range(r))
                        .retain(|r| params.labels_match(r));
                    let labels_first = FilteredView::all(&table)
                        .retain(|r| params.labels_match(r))
                        .retain(|r| params.year_in_range(r));
                    assert_eq!(years_first.indices(), labels_first.indices());
                }
            }
        }
    }

    #[test]
    fn null_years_are_excluded_for_any_range() {
        let table = MovieTable::new(
            vec![
                MovieRecord::new("Dated", Some(2015)),
                MovieRecord::new("Undated", None),
            ],
            Schema::default(),
        );
        for (lo, hi) in [(i32::MIN, i32::MAX), (2015, 2015), (1900, 2100)] {
            let params = FilterParams {
                year_min: lo,
                year_max: hi,
                female_lead: LabelFilter::All,
                working_woman: LabelFilter::All,
            };
            let view = apply_filters(&table, &params);
            assert!(view.records().all(|r| r.year.is_some()));
        }
    }

    #[test]
    fn specific_label_excludes_unlabelled_rows() {
        let table = MovieTable::new(
            vec![
                labelled("A", Some(2015), Some(Label::Yes), None),
                labelled("B", Some(2015), None, None),
                labelled("C", Some(2015), Some(Label::Other("Ensemble".into())), None),
            ],
            labelled_schema(),
        );
        let mut params = FilterParams::default_for(&table);

        assert_eq!(apply_filters(&table, &params).indices(), &[0, 1, 2]);

        params.female_lead = LabelFilter::Yes;
        assert_eq!(apply_filters(&table, &params).indices(), &[0]);

        params.female_lead = LabelFilter::No;
        assert!(apply_filters(&table, &params).is_empty());
    }

    #[test]
    fn default_window_is_clamped_to_the_data() {
        let table = hundred_movies();
        let params = FilterParams::default_for(&table);
        assert_eq!((params.year_min, params.year_max), (2011, 2019));

        let narrow = MovieTable::new(
            vec![MovieRecord::new("A", Some(2014)), MovieRecord::new("B", Some(2016))],
            Schema::default(),
        );
        let params = FilterParams::default_for(&narrow);
        assert_eq!((params.year_min, params.year_max), (2014, 2016));

        let late = MovieTable::new(vec![MovieRecord::new("A", Some(2022))], Schema::default());
        let params = FilterParams::default_for(&late);
        assert_eq!((params.year_min, params.year_max), (2022, 2022));
    }

    #[test]
    fn overrides_replace_defaults() {
        let table = hundred_movies();
        let params = FilterParams::resolve(
            &table,
            &FilterOverrides {
                year_min: Some(2018),
                year_max: Some(2006),
                female_lead: Some(LabelFilter::No),
                working_woman: None,
            },
        );
        assert_eq!((params.year_min, params.year_max), (2006, 2018));
        assert_eq!(params.female_lead, LabelFilter::No);
        assert_eq!(params.working_woman, LabelFilter::All);
    }

    #[test]
    fn single_year_bound_extends_to_the_data_edge() {
        let table = hundred_movies();

        let from = FilterParams::resolve(
            &table,
            &FilterOverrides {
                year_min: Some(2020),
                ..FilterOverrides::default()
            },
        );
        assert_eq!((from.year_min, from.year_max), (2020, 2022));
        let view = apply_filters(&table, &from);
        assert!(!view.is_empty());
        assert!(view.records().all(|r| r.year.is_some_and(|y| y >= 2020)));

        let until = FilterParams::resolve(
            &table,
            &FilterOverrides {
                year_max: Some(2008),
                ..FilterOverrides::default()
            },
        );
        assert_eq!((until.year_min, until.year_max), (2005, 2008));
        assert!(apply_filters(&table, &until)
            .records()
            .all(|r| r.year.is_some_and(|y| y <= 2008)));

        let beyond = FilterParams::resolve(
            &table,
            &FilterOverrides {
                year_min: Some(2030),
                ..FilterOverrides::default()
            },
        );
        assert_eq!((beyond.year_min, beyond.year_max), (2030, 2030));
        assert!(apply_filters(&table, &beyond).is_empty());
    }

    #[test]
    fn label_filter_parses_case_insensitively() {
        assert_eq!("yes".parse::<LabelFilter>(), Ok(LabelFilter::Yes));
        assert_eq!("ALL".parse::<LabelFilter>(), Ok(LabelFilter::All));
        assert!("maybe".parse::<LabelFilter>().is_err());
    }
}
