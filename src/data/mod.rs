/// Data layer: core types, loading, filtering and derived views.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, clean prices → ListingDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ListingDataset │  Vec<Listing>, option lists, price bounds
///   └────────────────┘
///        │            FilterState (user selections)
///        ▼                 │
///   ┌──────────┐           │
///   │  filter   │ ◄────────┤  price / neighbourhood → indices
///   │  view     │ ◄────────┘  room type → review points, id → breakdown
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
pub mod view;
