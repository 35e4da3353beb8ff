//! langdash - language-support analytics for game demos
//!
//! Loads a wide (one row per game) and a long (one row per game and
//! language) CSV table, then filters, ranks and summarizes them.

pub mod config;
pub mod data;
pub mod filter;
pub mod report;
pub mod session;
pub mod stats;

pub use config::DashboardConfig;
pub use data::{Dataset, Game, LanguageSupport};
pub use filter::{FilterEngine, FilterSpec};
pub use session::{load_dataset, DashboardView, Session, SessionError, ViewState};
pub use stats::{Aggregator, SortMode};
