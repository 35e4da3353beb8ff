//! Data module - CSV loading and normalization

mod loader;
mod model;
mod normalizer;

pub use loader::{DataLoader, LoaderError, RawGameRow, RawLanguageRow, RawTables, Source, TableKind};
pub use model::{Dataset, Game, LanguageSupport, NO_NAME};
pub use normalizer::{NormalizeError, NormalizeReport, Normalizer, RowRepair, INTERFACE_ONLY_MARKER};
