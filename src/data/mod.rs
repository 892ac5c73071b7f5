/// Data layer: table model, preprocessing, filters, reductions and export.
///
/// Architecture:
/// ```text
///  host input (.json / .csv / directory)
///        │
///        ▼
///   ┌────────────┐
///   │   loader    │  read files → RawInput (id → grid + meta)
///   └────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ preprocess  │  header row → columns, first column → index, coerce cells
///   └────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │   filter    │  metadata criteria, row membership, column membership
///   └────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ transform   │  column sums, row sums, running "sum" table
///   └────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │   export    │  Tables + metadata → { id: { table, meta } }
///   └────────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod preprocess;
pub mod transform;
