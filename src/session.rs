//! Session context.
//! A session pairs the shared, read-only dataset with its own filter and
//! sort state. Every call to [`Session::view`] recomputes from scratch.

use crate::config::DashboardConfig;
use crate::data::{
    DataLoader, Dataset, Game, LoaderError, NormalizeError, NormalizeReport, Normalizer, Source,
};
use crate::filter::{FilterEngine, FilterSpec};
use crate::stats::{
    Aggregator, DistributionEntry, HistogramBin, LanguageBreakdown, SortMode, Summary,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Resolve sources, load and normalize both tables.
pub fn load_dataset(
    config: &DashboardConfig,
    wide_upload: Option<Source>,
    long_upload: Option<Source>,
) -> Result<(Dataset, NormalizeReport), SessionError> {
    let wide = Source::resolve(wide_upload, &config.wide_path, config.auto_load);
    let long = Source::resolve(long_upload, &config.long_path, config.auto_load);
    let raw = DataLoader::load_tables(wide, long)?;
    let (dataset, report) = Normalizer::normalize(&raw)?;
    info!(
        games = dataset.games.len(),
        languages = dataset.all_languages().len(),
        repairs = report.repairs.len(),
        "dataset ready"
    );
    Ok((dataset, report))
}

/// Per-session view settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub filter: FilterSpec,
    pub sort: SortMode,
    pub top_n: usize,
    pub histogram_bins: usize,
    pub headline_languages: usize,
}

impl ViewState {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            filter: FilterSpec::default(),
            sort: SortMode::default(),
            top_n: config.top_n,
            histogram_bins: config.histogram_bins,
            headline_languages: config.headline_languages,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub state: ViewState,
    /// Values for the language selector, from the unfiltered data.
    pub language_options: Vec<String>,
    pub summary: Summary,
    pub ranking: Vec<LanguageBreakdown>,
    pub top_languages: Vec<LanguageBreakdown>,
    pub distribution: Vec<DistributionEntry>,
    pub histogram: Vec<HistogramBin>,
    /// Filtered games in the requested order.
    pub games: Vec<Game>,
}

pub struct Session {
    dataset: Arc<Dataset>,
    state: ViewState,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>, state: ViewState) -> Self {
        Self { dataset, state }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.state.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.state.sort = sort;
    }

    pub fn set_top_n(&mut self, top_n: usize) {
        self.state.top_n = top_n;
    }

    /// Filtered tables with the game table in the requested order.
    pub fn filtered(&self) -> Dataset {
        let mut view = FilterEngine::apply(&self.dataset, &self.state.filter);
        view.games = Aggregator::sort_games(&view.games, self.state.sort);
        view
    }

    pub fn view(&self) -> DashboardView {
        let filtered = self.filtered();
        debug!(games = filtered.games.len(), sort = ?self.state.sort, "building view");

        let ranking = Aggregator::language_breakdown(&filtered, None);
        let top_languages = ranking.iter().take(self.state.top_n).cloned().collect();

        DashboardView {
            state: self.state.clone(),
            language_options: self.dataset.all_languages(),
            summary: Aggregator::summarize(&filtered, self.state.headline_languages),
            ranking,
            top_languages,
            distribution: Aggregator::count_distribution(&filtered.games),
            histogram: Aggregator::binned_distribution(&filtered.games, self.state.histogram_bins),
            games: filtered.games,
        }
    }
}
