//! Stats module - rankings, distributions and summary numbers

mod aggregator;

pub use aggregator::{
    Aggregator, CountStats, DistributionEntry, HistogramBin, LanguageBreakdown, LanguageRank,
    SortMode, Summary,
};
