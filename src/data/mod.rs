/// Data layer: feature table types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → FeatureTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ FeatureTable  │  column names, rows of cells
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop rows with missing values
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
