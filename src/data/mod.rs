/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  movies.{csv,json,parquet}   labels.{csv,json,parquet}
///        │                           │ (optional)
///        ▼                           ▼
///   ┌──────────────────────────────────┐
///   │  loader   parse → coerce → left join on (title, year)
///   └──────────────────────────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  MovieTable  │  immutable rows + schema descriptor + year bounds
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range ∧ label selectors → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  KPIs, distributions, trends, rankings → DashboardSummary
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
pub mod stats;
