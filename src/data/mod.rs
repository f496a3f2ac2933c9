/// Data layer: core types, loading, the table capability and filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (numeric columns cast to f64)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  table    │  Table trait: filter, distinct, group-by count / mean
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → View (row indices into the Dataset)
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod table;

#[cfg(test)]
pub mod testing;
