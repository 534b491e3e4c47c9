/// Data layer: loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  Top_100_Sports_Bets.csv  (';'-delimited, "1 234 €" amounts)
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  reload only when path / mtime changes
///   │  loader   │  parse + clean → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  sports × competitions × [start, end] → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  one pure view per chart (+ chart intent)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod chart;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
