/// Data layer: the numeric table and the file loaders.
///
/// Architecture:
/// ```text
///  text / binary dump / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file with FileOptions → DataTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ DataTable  │  rows × columns of f64
///   └───────────┘
/// ```

pub mod loader;
pub mod model;
