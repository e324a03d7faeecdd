//! Content loading: the read-only name → record catalogs

pub mod content;

pub use content::{ContentCatalog, WorldConfig};
