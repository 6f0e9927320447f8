use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic movie table and labels table for trying the dashboard.
#[derive(Parser, Debug)]
struct Args {
    /// Directory to write into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Number of movies
    #[arg(long, default_value_t = 400)]
    movies: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const FIRST: &[&str] = &[
    "Kaadhal", "Vettai", "Nila", "Thendral", "Agni", "Veera", "Maya", "Puyal", "Kanavu", "Mazhai",
    "Pon", "Siragu", "Vaanam", "Kural", "Oru", "Iravu",
];
const SECOND: &[&str] = &[
    "Kottai", "Paadhai", "Raagam", "Theevu", "Kadhai", "Pookkal", "Naatkal", "Vizhigal", "Ulagam",
    "Payanam", "Sathiyam", "Kaalam",
];
const GENRES: &[&str] = &[
    "Drama", "Action", "Comedy", "Romance", "Thriller", "Family", "Action, Drama", "Crime, Thriller",
];

struct Movie {
    title: String,
    genre: Option<&'static str>,
    rating: Option<f64>,
    year: Option<i64>,
    votes: Option<i64>,
    /// Raw cell text for the CSV, including the occasional junk value.
    year_cell: String,
    rating_cell: String,
    votes_cell: String,
}

fn generate_movies(rng: &mut SimpleRng, n: usize) -> Vec<Movie> {
    (0..n)
        .map(|i| {
            let title = format!("{} {} {}", rng.pick(FIRST), rng.pick(SECOND), i + 1);
            let year = 2000 + rng.below(24) as i64;
            // Later years lean slightly higher, like the real catalogue.
            let rating = (rng.gauss(6.2 + (year - 2000) as f64 * 0.02, 1.1) * 10.0).round() / 10.0;
            let rating = rating.clamp(1.0, 9.8);
            let votes = (rng.gauss(8.0, 1.5).exp()).round() as i64;

            let mut movie = Movie {
                title,
                genre: (!rng.chance(0.05)).then(|| rng.pick(GENRES)),
                rating: Some(rating),
                year: Some(year),
                votes: Some(votes),
                year_cell: year.to_string(),
                rating_cell: format!("{rating:.1}"),
                votes_cell: votes.to_string(),
            };

            if rng.chance(0.02) {
                movie.year = None;
                movie.year_cell = "unknown".into();
            }
            if rng.chance(0.05) {
                movie.rating = None;
                movie.rating_cell = "N/A".into();
            }
            if rng.chance(0.03) {
                movie.votes = None;
                movie.votes_cell = String::new();
            }
            movie
        })
        .collect()
}

fn write_movies_csv(path: &std::path::Path, movies: &[Movie]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["title", "genre", "imdb_rating", "year", "num_votes"])?;
    for m in movies {
        writer.write_record([
            m.title.as_str(),
            m.genre.unwrap_or(""),
            m.rating_cell.as_str(),
            m.year_cell.as_str(),
            m.votes_cell.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_movies_parquet(path: &std::path::Path, movies: &[Movie]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("genre", DataType::Utf8, true),
        Field::new("imdb_rating", DataType::Float64, true),
        Field::new("year", DataType::Int64, true),
        Field::new("num_votes", DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                movies.iter().map(|m| m.title.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                movies.iter().map(|m| m.genre).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                movies.iter().map(|m| m.rating).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                movies.iter().map(|m| m.year).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                movies.iter().map(|m| m.votes).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Labels for most (not all) movies, a few ghost rows and one odd category.
fn write_labels_csv(path: &std::path::Path, movies: &[Movie], rng: &mut SimpleRng) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["title", "year", "female_lead", "working_woman"])?;

    let mut rows = 0;
    for m in movies {
        let Some(year) = m.year else { continue };
        if rng.chance(0.25) {
            continue;
        }
        // Female-led films slowly become more common after 2010.
        let p_lead = if year >= 2010 { 0.2 + (year - 2010) as f64 * 0.015 } else { 0.15 };
        let female_lead = rng.chance(p_lead);
        let working = if female_lead { rng.chance(0.55) } else { rng.chance(0.2) };
        let fl = if rng.chance(0.01) { "Ensemble" } else if female_lead { "Yes" } else { "No" };
        let ww = if working { "Yes" } else { "No" };
        writer.write_record([m.title.as_str(), year.to_string().as_str(), fl, ww])?;
        rows += 1;
    }

    for i in 0..5 {
        writer.write_record([format!("Unreleased Project {i}").as_str(), "2024", "Yes", "Yes"])?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let movies = generate_movies(&mut rng, args.movies);

    let movies_csv = args.out_dir.join("tamil_movies_clean.csv");
    write_movies_csv(&movies_csv, &movies)?;
    let movies_parquet = args.out_dir.join("tamil_movies_clean.parquet");
    write_movies_parquet(&movies_parquet, &movies)?;
    let labels_csv = args.out_dir.join("tamil_representation_labels.csv");
    let label_rows = write_labels_csv(&labels_csv, &movies, &mut rng)?;

    println!(
        "Wrote {} movies to {} and {}, {label_rows} label rows to {}",
        movies.len(),
        movies_csv.display(),
        movies_parquet.display(),
        labels_csv.display()
    );
    Ok(())
}
