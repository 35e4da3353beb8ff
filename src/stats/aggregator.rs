//! Aggregator Module
//! Grouped counts, rankings, distributions and summary statistics over a
//! (possibly filtered) dataset. Everything here is pure.

use crate::data::{Dataset, Game};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Ordering for the game list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Most languages first, then name A-Z
    #[default]
    CountDesc,
    /// Fewest languages first, then name A-Z
    CountAsc,
    /// Name A-Z
    NameAsc,
}

/// Number of distinct games supporting a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageRank {
    pub language: String,
    pub game_count: usize,
}

/// A ranking row together with the games behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageBreakdown {
    pub language: String,
    pub game_count: usize,
    pub games: Vec<String>,
}

/// Exact `language_count` value and how many games have it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub language_count: u32,
    pub games: usize,
}

/// Inclusive `language_count` range for chart display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub start: u32,
    pub end: u32,
    pub games: usize,
}

/// Descriptive statistics of `language_count`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p05: f64,
    pub p95: f64,
}

/// Headline numbers for the current view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub game_count: usize,
    pub mean_language_count: f64,
    pub max_language_count: u32,
    /// Every game at the maximum, in table order.
    pub max_games: Vec<Game>,
    pub top_languages: Vec<String>,
    pub stats: CountStats,
}

/// Handles the grouping and ranking computations.
pub struct Aggregator;

impl Aggregator {
    /// Distinct game count per language, highest first. Equal counts keep the
    /// order in which languages first appear in the long table. Only games
    /// present in the game table are counted.
    pub fn language_ranking(view: &Dataset, top_n: Option<usize>) -> Vec<LanguageRank> {
        let visible = view.game_ids();
        let mut order: Vec<&str> = Vec::new();
        let mut ids: HashMap<&str, HashSet<i64>> = HashMap::new();

        for s in &view.support {
            let Some(id) = s.app_id.filter(|id| visible.contains(id)) else {
                continue;
            };
            let entry = ids.entry(s.language.as_str()).or_insert_with(|| {
                order.push(s.language.as_str());
                HashSet::new()
            });
            entry.insert(id);
        }

        let mut ranking: Vec<LanguageRank> = order
            .into_iter()
            .map(|language| LanguageRank {
                language: language.to_string(),
                game_count: ids.get(language).map_or(0, HashSet::len),
            })
            .collect();

        // sort_by is stable, which gives the first-appearance tie-break
        ranking.sort_by(|a, b| b.game_count.cmp(&a.game_count));

        if let Some(n) = top_n {
            ranking.truncate(n);
        }
        ranking
    }

    /// Names of games supporting `language`, in the game table's order.
    pub fn games_for_language<'a>(view: &'a Dataset, language: &str) -> Vec<&'a str> {
        let supporting: HashSet<i64> = view
            .support
            .iter()
            .filter(|s| s.language == language)
            .filter_map(|s| s.app_id)
            .collect();

        view.games
            .iter()
            .filter(|g| g.app_id.is_some_and(|id| supporting.contains(&id)))
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Ranking rows joined with their game lists.
    pub fn language_breakdown(view: &Dataset, top_n: Option<usize>) -> Vec<LanguageBreakdown> {
        Self::language_ranking(view, top_n)
            .into_iter()
            .map(|rank| LanguageBreakdown {
                games: Self::games_for_language(view, &rank.language)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                language: rank.language,
                game_count: rank.game_count,
            })
            .collect()
    }

    /// Value to frequency pairs, highest value first.
    pub fn count_distribution(games: &[Game]) -> Vec<DistributionEntry> {
        let mut freq: HashMap<u32, usize> = HashMap::new();
        for g in games {
            *freq.entry(g.language_count).or_default() += 1;
        }

        let mut entries: Vec<DistributionEntry> = freq
            .into_iter()
            .map(|(language_count, games)| DistributionEntry {
                language_count,
                games,
            })
            .collect();
        entries.sort_by(|a, b| b.language_count.cmp(&a.language_count));
        entries
    }

    /// Equal-width integer bins covering [min, max]. At most `bins` bins are
    /// produced; empty bins are kept so the chart axis stays continuous.
    pub fn binned_distribution(games: &[Game], bins: usize) -> Vec<HistogramBin> {
        if bins == 0 {
            return Vec::new();
        }
        let Some(min) = games.iter().map(|g| g.language_count).min() else {
            return Vec::new();
        };
        let max = games.iter().map(|g| g.language_count).max().unwrap_or(min);

        let span = u64::from(max - min) + 1;
        let width = span.div_ceil(bins as u64);
        let count = span.div_ceil(width);

        let mut out: Vec<HistogramBin> = (0..count)
            .map(|i| {
                let start = u64::from(min) + i * width;
                let end = (start + width - 1).min(u64::from(max));
                HistogramBin {
                    start: start as u32,
                    end: end as u32,
                    games: 0,
                }
            })
            .collect();

        for g in games {
            let idx = (u64::from(g.language_count - min) / width) as usize;
            out[idx].games += 1;
        }
        out
    }

    /// Headline numbers. Ties at the maximum are all returned.
    pub fn summarize(view: &Dataset, headline_languages: usize) -> Summary {
        let values: Vec<f64> = view.games.iter().map(|g| f64::from(g.language_count)).collect();
        let stats = Self::describe_counts(&values);

        let max_language_count = view
            .games
            .iter()
            .map(|g| g.language_count)
            .max()
            .unwrap_or(0);
        let max_games = view
            .games
            .iter()
            .filter(|g| g.language_count == max_language_count)
            .cloned()
            .collect();

        let top_languages = Self::language_ranking(view, Some(headline_languages))
            .into_iter()
            .map(|r| r.language)
            .collect();

        Summary {
            game_count: view.games.len(),
            mean_language_count: stats.mean,
            max_language_count,
            max_games,
            top_languages,
            stats,
        }
    }

    /// Sorted copy of `games`. Stable, so equal keys keep table order.
    pub fn sort_games(games: &[Game], mode: SortMode) -> Vec<Game> {
        let mut sorted = games.to_vec();
        match mode {
            SortMode::CountDesc => sorted.sort_by(|a, b| {
                b.language_count
                    .cmp(&a.language_count)
                    .then_with(|| a.name.cmp(&b.name))
            }),
            SortMode::CountAsc => sorted.sort_by(|a, b| {
                a.language_count
                    .cmp(&b.language_count)
                    .then_with(|| a.name.cmp(&b.name))
            }),
            SortMode::NameAsc => sorted.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        sorted
    }

    /// Descriptive statistics. An empty input yields all zeros.
    pub fn describe_counts(values: &[f64]) -> CountStats {
        use statrs::statistics::Statistics;

        let n = values.len();
        if n == 0 {
            return CountStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let std = if n > 1 { values.iter().std_dev() } else { 0.0 };

        CountStats {
            count: n,
            mean: values.iter().mean(),
            median: Self::percentile(&sorted, 50.0),
            std,
            p05: Self::percentile(&sorted, 5.0),
            p95: Self::percentile(&sorted, 95.0),
        }
    }

    /// Percentile with linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return 0.0;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}
