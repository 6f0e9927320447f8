use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    Label, LabelField, MovieRecord, MovieTable, OptionalField, RawValue, Schema,
};

// ---------------------------------------------------------------------------
// Raw table – what every file format is parsed into
// ---------------------------------------------------------------------------

/// A row-oriented, untyped table: column_name → cell.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, RawValue>>,
}

impl RawTable {
    fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }
}

fn cell<'a>(row: &'a BTreeMap<String, RawValue>, column: &str) -> &'a RawValue {
    row.get(column).unwrap_or(&RawValue::Null)
}

// ---------------------------------------------------------------------------
// Labels outcome
// ---------------------------------------------------------------------------

/// Why the representation labels could not be joined.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelsError {
    #[error("labels file {} not found", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read labels file {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("labels file {} is missing column(s): {}", path.display(), columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },
}

/// Result of the optional labels join, handed to the caller to surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelsStatus {
    Joined {
        /// Rows in the labels file.
        label_rows: usize,
        /// Canonical rows that received a label match.
        matched_rows: usize,
    },
    Unavailable(LabelsError),
}

impl LabelsStatus {
    pub fn warning(&self) -> Option<String> {
        match self {
            LabelsStatus::Joined { .. } => None,
            LabelsStatus::Unavailable(e) => {
                Some(format!("Representation labels unavailable: {e}"))
            }
        }
    }
}

/// The canonical table plus how the labels join went.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: Arc<MovieTable>,
    pub labels: LabelsStatus,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

pub const TITLE: &str = "title";
pub const YEAR: &str = "year";
pub const GENRE: &str = "genre";
pub const IMDB_RATING: &str = "imdb_rating";
pub const NUM_VOTES: &str = "num_votes";

/// Load the movie table and left-join the representation labels onto it.
///
/// The movie file is required: any failure reading it is returned as an error.
/// The labels file is optional: failures are reported in
/// [`LoadOutcome::labels`] and the table comes back without label columns.
pub fn load(primary_path: &Path, labels_path: &Path) -> Result<LoadOutcome> {
    let raw = read_table(primary_path)
        .with_context(|| format!("loading movie table {}", primary_path.display()))?;
    let (movies, mut schema) = movies_from_raw(&raw)
        .with_context(|| format!("loading movie table {}", primary_path.display()))?;
    log::info!(
        "Loaded {} movies from {} (columns {:?})",
        movies.len(),
        primary_path.display(),
        raw.columns
    );

    let (records, labels) = match load_labels(labels_path) {
        Ok(label_rows) => {
            let n_labels = label_rows.len();
            let joined = left_join(movies, &label_rows);
            for field in LabelField::ALL {
                schema = schema.with(field.optional_field());
            }
            log::info!(
                "Joined {n_labels} label rows, {} of {} movies matched",
                joined.matched_rows,
                joined.records.len()
            );
            (
                joined.records,
                LabelsStatus::Joined {
                    label_rows: n_labels,
                    matched_rows: joined.matched_rows,
                },
            )
        }
        Err(e) => {
            log::warn!("Continuing without representation labels: {e}");
            (movies, LabelsStatus::Unavailable(e))
        }
    };

    Ok(LoadOutcome {
        table: Arc::new(MovieTable::new(records, schema)),
        labels,
    })
}

/// Parse a file into a [`RawTable`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names
/// * `.json`    – `[{ "title": ..., "year": ..., ... }, ...]`
/// * `.parquet` – flat columns of strings / ints / floats / bools
pub fn read_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Movies / labels from raw rows
// ---------------------------------------------------------------------------

fn movies_from_raw(raw: &RawTable) -> Result<(Vec<MovieRecord>, Schema)> {
    if !raw.has_column(TITLE) {
        bail!("missing required '{TITLE}' column");
    }

    let mut schema = Schema::default();
    if raw.has_column(GENRE) {
        schema = schema.with(OptionalField::Genre);
    }

    let records = raw
        .rows
        .iter()
        .map(|row| {
            let title = cell(row, TITLE).as_exact_text().unwrap_or_default();
            let mut record = MovieRecord::new(title, cell(row, YEAR).as_year());
            record.genre = cell(row, GENRE).as_text();
            record.imdb_rating = cell(row, IMDB_RATING).as_f64();
            record.num_votes = cell(row, NUM_VOTES).as_i64();
            record
        })
        .collect();

    Ok((records, schema))
}

/// One row of the representation labels file.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRow {
    pub title: String,
    pub year: Option<i32>,
    pub female_lead: Option<Label>,
    pub working_woman: Option<Label>,
}

fn load_labels(path: &Path) -> std::result::Result<Vec<LabelRow>, LabelsError> {
    if !path.exists() {
        return Err(LabelsError::Missing {
            path: path.to_path_buf(),
        });
    }

    let raw = read_table(path).map_err(|e| LabelsError::Unreadable {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })?;

    let missing = raw.missing_columns(&[
        TITLE,
        YEAR,
        LabelField::FemaleLead.column(),
        LabelField::WorkingWoman.column(),
    ]);
    if !missing.is_empty() {
        return Err(LabelsError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    Ok(raw
        .rows
        .iter()
        .map(|row| LabelRow {
            title: cell(row, TITLE).as_exact_text().unwrap_or_default(),
            year: cell(row, YEAR).as_year(),
            female_lead: Label::from_raw(cell(row, LabelField::FemaleLead.column())),
            working_woman: Label::from_raw(cell(row, LabelField::WorkingWoman.column())),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Left join
// ---------------------------------------------------------------------------

pub struct JoinResult {
    pub records: Vec<MovieRecord>,
    pub matched_rows: usize,
}

/// Left join on `(title, year)`.
///
/// * every movie is kept, in its original order
/// * a movie matching `k` label rows appears `k` times, once per match
/// * a movie with a null year never matches
/// * label rows without a matching movie are dropped
pub fn left_join(movies: Vec<MovieRecord>, labels: &[LabelRow]) -> JoinResult {
    let mut index: HashMap<(&str, i32), Vec<&LabelRow>> = HashMap::new();
    for row in labels {
        if let Some(year) = row.year {
            index.entry((row.title.as_str(), year)).or_default().push(row);
        }
    }

    let duplicated = index.values().filter(|rows| rows.len() > 1).count();
    if duplicated > 0 {
        log::warn!("{duplicated} (title, year) keys appear more than once in the labels file");
    }

    let mut records = Vec::with_capacity(movies.len());
    let mut matched_rows = 0;

    for movie in movies {
        let matches = movie
            .year
            .and_then(|year| index.get(&(movie.title.as_str(), year)));

        match matches {
            Some(rows) => {
                for label in rows {
                    let mut merged = movie.clone();
                    merged.female_lead = label.female_lead.clone();
                    merged.working_woman = label.working_woman.clone();
                    records.push(merged);
                    matched_rows += 1;
                }
            }
            None => records.push(movie),
        }
    }

    JoinResult {
        records,
        matched_rows,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Every non-empty CSV cell is kept as text; typing happens during coercion.
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let row = columns
            .iter()
            .zip(record.iter())
            .map(|(col, value)| {
                let value = if value.trim().is_empty() {
                    RawValue::Null
                } else {
                    RawValue::String(value.to_string())
                };
                (col.clone(), value)
            })
            .collect();

        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "Vikram Vedha", "year": 2017, "imdb_rating": 8.2, "num_votes": 41000 },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_raw(val));
        }
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

fn json_to_raw(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Null,
        other => RawValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let values = columns
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| (name.clone(), extract_raw_value(col.as_ref(), row)))
                .collect();
            rows.push(values);
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_raw_value(col: &dyn Array, row: usize) -> RawValue {
    if col.is_null(row) {
        return RawValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => RawValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => RawValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => RawValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => RawValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => RawValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => RawValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => RawValue::Bool(col.as_boolean().value(row)),
        _ => array_value_to_string(col, row)
            .map(RawValue::String)
            .unwrap_or(RawValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create fixture");
        file.write_all(contents.as_bytes()).expect("write fixture");
        path
    }

    const MOVIES: &str = "\
title,genre,imdb_rating,year,num_votes
Kaaka Muttai,Drama,8.4,2014,12000
Aruvi,Drama,8.5,2016,9000
Jigarthanda,Action,8.2,2014,20000
Unknown Gem,Drama,N/A,unknown,lots
";

    const LABELS: &str = "\
title,year,female_lead,working_woman
Aruvi,2016,Yes,No
Kaaka Muttai,2014,No,Yes
Ghost Film,2010,Yes,Yes
";

    #[test]
    fn left_join_attaches_labels_and_drops_ghost_rows() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(&dir, "movies.csv", MOVIES);
        let labels = write_file(&dir, "labels.csv", LABELS);

        let outcome = load(&movies, &labels).expect("load");
        let table = &outcome.table;

        assert_eq!(table.len(), 4);
        assert!(table.records().iter().all(|r| r.title != "Ghost Film"));
        assert_eq!(
            outcome.labels,
            LabelsStatus::Joined {
                label_rows: 3,
                matched_rows: 2
            }
        );
        assert!(table.schema().has_label(LabelField::FemaleLead));
        assert!(table.schema().has(OptionalField::Genre));

        let kaaka = &table.records()[0];
        assert_eq!(kaaka.female_lead, Some(Label::No));
        assert_eq!(kaaka.working_woman, Some(Label::Yes));

        let aruvi = &table.records()[1];
        assert_eq!(aruvi.female_lead, Some(Label::Yes));
        assert_eq!(aruvi.working_woman, Some(Label::No));

        let jigarthanda = &table.records()[2];
        assert_eq!(jigarthanda.female_lead, None);
        assert_eq!(jigarthanda.working_woman, None);
    }

    #[test]
    fn unparsable_numbers_become_null_and_rows_survive() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(&dir, "movies.csv", MOVIES);
        let labels = dir.path().join("absent.csv");

        let outcome = load(&movies, &labels).expect("load");
        let gem = &outcome.table.records()[3];

        assert_eq!(outcome.table.len(), 4);
        assert_eq!(gem.title, "Unknown Gem");
        assert_eq!(gem.year, None);
        assert_eq!(gem.imdb_rating, None);
        assert_eq!(gem.num_votes, None);
        assert_eq!(outcome.table.records()[0].num_votes, Some(12000));
    }

    #[test]
    fn missing_labels_file_degrades_gracefully() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(&dir, "movies.csv", MOVIES);
        let labels = dir.path().join("absent.csv");

        let outcome = load(&movies, &labels).expect("load");

        assert!(matches!(
            outcome.labels,
            LabelsStatus::Unavailable(LabelsError::Missing { .. })
        ));
        assert!(outcome.labels.warning().is_some());
        assert!(!outcome.table.schema().has_label(LabelField::FemaleLead));
        assert!(!outcome.table.schema().has_label(LabelField::WorkingWoman));
        assert!(outcome
            .table
            .records()
            .iter()
            .all(|r| r.female_lead.is_none() && r.working_woman.is_none()));
    }

    #[test]
    fn labels_with_wrong_schema_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(&dir, "movies.csv", MOVIES);
        let labels = write_file(&dir, "labels.csv", "title,year,female_lead\nAruvi,2016,Yes\n");

        let outcome = load(&movies, &labels).expect("load");

        match outcome.labels {
            LabelsStatus::Unavailable(LabelsError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec!["working_woman".to_string()]);
            }
            other => panic!("unexpected labels status {other:?}"),
        }
        assert_eq!(outcome.table.len(), 4);
    }

    #[test]
    fn malformed_labels_file_is_not_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(&dir, "movies.csv", MOVIES);
        let labels = write_file(&dir, "labels.json", "{ not json");

        let outcome = load(&movies, &labels).expect("load");

        assert!(matches!(
            outcome.labels,
            LabelsStatus::Unavailable(LabelsError::Unreadable { .. })
        ));
        assert_eq!(outcome.table.len(), 4);
    }

    #[test]
    fn missing_primary_file_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let labels = write_file(&dir, "labels.csv", LABELS);

        let err = load(&dir.path().join("nope.csv"), &labels).unwrap_err();
        assert!(format!("{err:#}").contains("nope.csv"));
    }

    #[test]
    fn primary_without_title_column_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(&dir, "movies.csv", "name,year\nAruvi,2016\n");
        let labels = dir.path().join("absent.csv");

        assert!(load(&movies, &labels).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(&dir, "movies.xlsx", "whatever");
        assert!(read_table(&movies).is_err());
    }

    #[test]
    fn json_records_are_loaded() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(
            &dir,
            "movies.json",
            r#"[
                {"title": "96", "year": 2018, "imdb_rating": 8.5, "num_votes": 30000},
                {"title": "Vada Chennai", "year": "2018", "imdb_rating": "8.5", "num_votes": null}
            ]"#,
        );
        let labels = dir.path().join("absent.csv");

        let outcome = load(&movies, &labels).expect("load");
        let records = outcome.table.records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "96");
        assert_eq!(records[1].year, Some(2018));
        assert_eq!(records[1].imdb_rating, Some(8.5));
        assert_eq!(records[1].num_votes, None);
        assert!(!outcome.table.schema().has(OptionalField::Genre));
    }

    #[test]
    fn duplicate_label_keys_repeat_the_movie() {
        let movies = vec![MovieRecord::new("Aruvi", Some(2016)), MovieRecord::new("Asuran", Some(2019))];
        let labels = vec![
            LabelRow {
                title: "Aruvi".into(),
                year: Some(2016),
                female_lead: Some(Label::Yes),
                working_woman: Some(Label::No),
            },
            LabelRow {
                title: "Aruvi".into(),
                year: Some(2016),
                female_lead: Some(Label::Yes),
                working_woman: Some(Label::Yes),
            },
        ];

        let joined = left_join(movies, &labels);

        assert_eq!(joined.records.len(), 3);
        assert_eq!(joined.matched_rows, 2);
        assert_eq!(joined.records[0].working_woman, Some(Label::No));
        assert_eq!(joined.records[1].working_woman, Some(Label::Yes));
        assert_eq!(joined.records[2].title, "Asuran");
        assert_eq!(joined.records[2].female_lead, None);
    }

    #[test]
    fn titles_join_only_on_exact_text() {
        let dir = TempDir::new().expect("tempdir");
        let movies = write_file(&dir, "movies.csv", "title,year\nAruvi,2016\nAsuran,2019\n");
        let labels = write_file(
            &dir,
            "labels.csv",
            "title,year,female_lead,working_woman\nAruvi ,2016,Yes,Yes\nAsuran,2019,No,No\n",
        );

        let outcome = load(&movies, &labels).expect("load");
        let records = outcome.table.records();

        assert_eq!(records[0].title, "Aruvi");
        assert_eq!(records[0].female_lead, None);
        assert_eq!(records[1].female_lead, Some(Label::No));
        assert_eq!(
            outcome.labels,
            LabelsStatus::Joined {
                label_rows: 2,
                matched_rows: 1
            }
        );
    }

    #[test]
    fn parquet_tables_are_loaded() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema as ArrowSchema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let dir = TempDir::new().expect("tempdir");
        let movies = dir.path().join("movies.parquet");

        let schema = Arc::new(ArrowSchema::new(vec![
            Field::new(TITLE, DataType::Utf8, false),
            Field::new(GENRE, DataType::Utf8, true),
            Field::new(YEAR, DataType::Float64, true),
            Field::new(IMDB_RATING, DataType::Float64, true),
            Field::new(NUM_VOTES, DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Aruvi", "Asuran", "Mystery"])),
                Arc::new(StringArray::from(vec![Some("Drama"), Some("Action"), None])),
                Arc::new(Float64Array::from(vec![Some(2016.0), Some(2019.0), None])),
                Arc::new(Float64Array::from(vec![Some(8.5), None, Some(6.0)])),
                Arc::new(Int64Array::from(vec![Some(9000), Some(40000), None])),
            ],
        )
        .expect("batch");
        let file = std::fs::File::create(&movies).expect("create parquet");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close");

        let labels = write_file(
            &dir,
            "labels.csv",
            "title,year,female_lead,working_woman\nAruvi,2016,Yes,No\n",
        );

        let outcome = load(&movies, &labels).expect("load");
        let records = outcome.table.records();

        assert_eq!(records.len(), 3);
        assert!(outcome.table.schema().has(OptionalField::Genre));
        assert_eq!(outcome.table.year_bounds(), Some((2016, 2019)));

        assert_eq!(records[0].year, Some(2016));
        assert_eq!(records[0].imdb_rating, Some(8.5));
        assert_eq!(records[0].num_votes, Some(9000));
        assert_eq!(records[0].female_lead, Some(Label::Yes));

        assert_eq!(records[1].imdb_rating, None);
        assert_eq!(records[2].year, None);
        assert_eq!(records[2].genre, None);
        assert_eq!(records[2].num_votes, None);
    }

    #[test]
    fn null_years_never_match() {
        let movies = vec![MovieRecord::new("Aruvi", None)];
        let labels = vec![LabelRow {
            title: "Aruvi".into(),
            year: None,
            female_lead: Some(Label::Yes),
            working_woman: Some(Label::Yes),
        }];

        let joined = left_join(movies, &labels);

        assert_eq!(joined.matched_rows, 0);
        assert_eq!(joined.records[0].female_lead, None);
    }
}
