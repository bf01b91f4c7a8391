/// Data layer: core types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  .csv / .xls / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → EarthquakeCatalog
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ repository  │  load once, share Arc<EarthquakeCatalog>
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  magnitude / continent / alert → Vec<Event>
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod repository;
