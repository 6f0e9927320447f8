use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// RawValue – a single cell as read from disk, before coercion
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what CSV / JSON / Parquet readers hand us.
/// Coercion into the typed [`MovieRecord`] fields never fails: anything that
/// does not fit becomes `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl RawValue {
    /// Non-empty text content. Numbers are rendered back to text so a film
    /// titled `96` survives a typed Parquet column.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            RawValue::Integer(i) => Some(i.to_string()),
            RawValue::Float(v) if v.is_finite() => Some(v.to_string()),
            _ => None,
        }
    }

    /// Like [`RawValue::as_text`] but keeps surrounding whitespace, so join
    /// keys compare exactly as stored. Whitespace-only cells are still empty.
    pub fn as_exact_text(&self) -> Option<String> {
        match self {
            RawValue::String(s) if s.trim().is_empty() => None,
            RawValue::String(s) => Some(s.clone()),
            other => other.as_text(),
        }
    }

    /// Numeric coercion: finite floats only, strings are parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            RawValue::Float(v) => *v,
            RawValue::Integer(i) => *i as f64,
            RawValue::String(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Bool(_) | RawValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Integral coercion. `2015.0` is accepted, `2015.5` is not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Integer(i) => Some(*i),
            RawValue::String(s) if s.trim().parse::<i64>().is_ok() => s.trim().parse().ok(),
            _ => {
                let v = self.as_f64()?;
                (v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64)
                    .then_some(v as i64)
            }
        }
    }

    pub fn as_year(&self) -> Option<i32> {
        self.as_i64().and_then(|y| i32::try_from(y).ok())
    }
}

// ---------------------------------------------------------------------------
// Label – a hand-labelled categorical answer
// ---------------------------------------------------------------------------

/// Value of a representation label. Anything other than the literal
/// `Yes` / `No` is kept verbatim as an extra category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Yes,
    No,
    Other(String),
}

impl Label {
    pub fn from_raw(raw: &RawValue) -> Option<Self> {
        raw.as_text().map(|s| match s.as_str() {
            "Yes" => Label::Yes,
            "No" => Label::No,
            _ => Label::Other(s),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Yes => "Yes",
            Label::No => "No",
            Label::Other(s) => s,
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Label::Yes)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two label columns contributed by the representation dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelField {
    FemaleLead,
    WorkingWoman,
}

impl LabelField {
    pub const ALL: [LabelField; 2] = [LabelField::FemaleLead, LabelField::WorkingWoman];

    /// Column name in the labels file.
    pub fn column(self) -> &'static str {
        match self {
            LabelField::FemaleLead => "female_lead",
            LabelField::WorkingWoman => "working_woman",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LabelField::FemaleLead => "Female Lead",
            LabelField::WorkingWoman => "Working Woman",
        }
    }

    pub fn optional_field(self) -> OptionalField {
        match self {
            LabelField::FemaleLead => OptionalField::FemaleLead,
            LabelField::WorkingWoman => OptionalField::WorkingWoman,
        }
    }
}

// ---------------------------------------------------------------------------
// MovieRecord – one row of the canonical table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub imdb_rating: Option<f64>,
    pub num_votes: Option<i64>,
    pub female_lead: Option<Label>,
    pub working_woman: Option<Label>,
}

impl MovieRecord {
    /// A record with only the join key set; handy for building fixtures.
    pub fn new(title: impl Into<String>, year: Option<i32>) -> Self {
        MovieRecord {
            title: title.into(),
            year,
            genre: None,
            imdb_rating: None,
            num_votes: None,
            female_lead: None,
            working_woman: None,
        }
    }

    pub fn label(&self, field: LabelField) -> Option<&Label> {
        match field {
            LabelField::FemaleLead => self.female_lead.as_ref(),
            LabelField::WorkingWoman => self.working_woman.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema descriptor
// ---------------------------------------------------------------------------

/// Columns that may or may not be present in the canonical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionalField {
    Genre,
    FemaleLead,
    WorkingWoman,
}

/// Which optional columns the canonical table actually carries.
/// Derived views ask this once instead of probing rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    available: BTreeSet<OptionalField>,
}

impl Schema {
    pub fn with(mut self, field: OptionalField) -> Self {
        self.available.insert(field);
        self
    }

    pub fn has(&self, field: OptionalField) -> bool {
        self.available.contains(&field)
    }

    pub fn has_label(&self, field: LabelField) -> bool {
        self.has(field.optional_field())
    }
}

// ---------------------------------------------------------------------------
// MovieTable – the canonical, immutable table
// ---------------------------------------------------------------------------

/// The merged and coerced table with pre-computed year bounds.
#[derive(Debug, Clone)]
pub struct MovieTable {
    records: Vec<MovieRecord>,
    schema: Schema,
    /// Min / max of the non-null years, `None` when no row has a year.
    year_bounds: Option<(i32, i32)>,
}

impl MovieTable {
    pub fn new(records: Vec<MovieRecord>, schema: Schema) -> Self {
        let year_bounds = records
            .iter()
            .filter_map(|r| r.year)
            .fold(None, |acc: Option<(i32, i32)>, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            });
        MovieTable {
            records,
            schema,
            year_bounds,
        }
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.year_bounds
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
