/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, decode serial dates → VisitDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ VisitDataset  │  Vec<Visit>, year / visit type index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year / quarter / month / visit type → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary   │  KPIs, monthly series, category counts
///   └──────────┘
/// ```

pub mod dates;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
