//! Filter Engine
//! Applies language, count and name predicates to a dataset. The result keeps
//! the game and language tables referring to the same set of app ids.

use crate::data::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// User-selected predicates. All active predicates must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Keep games supporting any of these. Empty means no filtering.
    #[serde(default)]
    pub languages: BTreeSet<String>,
    #[serde(default)]
    pub min_language_count: u32,
    /// Case-insensitive substring of the game name. Blank means no filtering.
    #[serde(default)]
    pub name_query: String,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.min_language_count == 0 && self.name_query.trim().is_empty()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.insert(language.into());
        self
    }

    pub fn with_min_language_count(mut self, min: u32) -> Self {
        self.min_language_count = min;
        self
    }

    pub fn with_name_query(mut self, query: impl Into<String>) -> Self {
        self.name_query = query.into();
        self
    }
}

pub struct FilterEngine;

impl FilterEngine {
    /// Apply `spec` to `dataset`. An empty spec returns the input unchanged.
    pub fn apply(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
        if spec.is_empty() {
            return dataset.clone();
        }

        let mut games = dataset.games.clone();

        if !spec.languages.is_empty() {
            let matching: HashSet<i64> = dataset
                .support
                .iter()
                .filter(|s| spec.languages.contains(&s.language))
                .filter_map(|s| s.app_id)
                .collect();
            games.retain(|g| g.app_id.is_some_and(|id| matching.contains(&id)));
        }

        if spec.min_language_count > 0 {
            games.retain(|g| g.language_count >= spec.min_language_count);
        }

        // Blank queries are inactive, but a present query matches as typed.
        let query = spec.name_query.to_lowercase();
        if !query.trim().is_empty() {
            games.retain(|g| g.name.to_lowercase().contains(&query));
        }

        // Games without language rows cannot appear on both sides.
        let supported = dataset.support_ids();
        games.retain(|g| g.app_id.is_some_and(|id| supported.contains(&id)));

        let kept: HashSet<i64> = games.iter().filter_map(|g| g.app_id).collect();
        let support = dataset
            .support
            .iter()
            .filter(|s| s.app_id.is_some_and(|id| kept.contains(&id)))
            .cloned()
            .collect();

        debug!(
            games = games.len(),
            of = dataset.games.len(),
            languages = spec.languages.len(),
            min = spec.min_language_count,
            query = %query,
            "filter applied"
        );
        Dataset::new(games, support)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Game, LanguageSupport};

    fn game(app_id: i64, name: &str, count: u32) -> Game {
        Game {
            app_id: Some(app_id),
            name: name.to_string(),
            language_count: count,
            languages: Vec::new(),
            genre: None,
        }
    }

    fn pair(app_id: i64, language: &str) -> LanguageSupport {
        LanguageSupport {
            app_id: Some(app_id),
            language: language.to_string(),
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                game(1, "Star Forge", 3),
                game(2, "Deep Rock Tales", 1),
                game(3, "Starlight Cafe", 2),
            ],
            vec![
                pair(1, "English"),
                pair(1, "French"),
                pair(1, "Japanese"),
                pair(2, "English"),
                pair(3, "English"),
                pair(3, "Japanese"),
            ],
        )
    }

    fn assert_consistent(view: &Dataset) {
        assert_eq!(view.game_ids(), view.support_ids());
    }

    #[test]
    fn empty_spec_is_identity() {
        let data = dataset();
        assert_eq!(FilterEngine::apply(&data, &FilterSpec::default()), data);
    }

    #[test]
    fn language_filter_keeps_all_rows_of_matching_games() {
        let view = FilterEngine::apply(&dataset(), &FilterSpec::default().with_language("Japanese"));

        assert_eq!(view.game_ids(), HashSet::from([1, 3]));
        assert_eq!(view.support.len(), 5);
        assert_consistent(&view);
    }

    #[test]
    fn language_set_is_a_union() {
        let spec = FilterSpec::default().with_language("French").with_language("Japanese");
        let view = FilterEngine::apply(&dataset(), &spec);
        assert_eq!(view.game_ids(), HashSet::from([1, 3]));
    }

    #[test]
    fn predicates_compose_as_and() {
        let spec = FilterSpec::default()
            .with_language("English")
            .with_min_language_count(2)
            .with_name_query("STAR");
        let view = FilterEngine::apply(&dataset(), &spec);

        let names: Vec<&str> = view.games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Star Forge", "Starlight Cafe"]);
        assert_consistent(&view);
    }

    #[test]
    fn name_query_also_restricts_language_rows() {
        let view = FilterEngine::apply(&dataset(), &FilterSpec::default().with_name_query("deep"));
        assert_eq!(view.games.len(), 1);
        assert_eq!(view.support, vec![pair(2, "English")]);
    }

    #[test]
    fn unsupported_language_yields_empty_tables() {
        let view = FilterEngine::apply(&dataset(), &FilterSpec::default().with_language("Korean"));
        assert!(view.games.is_empty());
        assert!(view.support.is_empty());
    }

    #[test]
    fn orphans_are_dropped_by_active_filters() {
        let mut data = dataset();
        data.support.push(pair(99, "English"));
        let view = FilterEngine::apply(&data, &FilterSpec::default().with_language("English"));

        assert!(!view.support_ids().contains(&99));
        assert_consistent(&view);
    }

    #[test]
    fn games_without_language_rows_drop_under_active_filters() {
        let mut data = dataset();
        data.games.push(game(4, "Silent Star", 2));

        let view = FilterEngine::apply(&data, &FilterSpec::default().with_min_language_count(1));
        assert_eq!(view.game_ids(), HashSet::from([1, 2, 3]));
        assert_consistent(&view);

        let view = FilterEngine::apply(&data, &FilterSpec::default().with_name_query("silent"));
        assert!(view.games.is_empty());

        assert_eq!(FilterEngine::apply(&data, &FilterSpec::default()).games.len(), 4);
    }

    #[test]
    fn name_query_matches_as_typed() {
        let data = dataset();
        let view = FilterEngine::apply(&data, &FilterSpec::default().with_name_query("Star "));
        let names: Vec<&str> = view.games.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Star Forge"]);

        let blank = FilterSpec::default().with_name_query("   ");
        assert!(blank.is_empty());
        assert_eq!(FilterEngine::apply(&data, &blank), data);
    }

    #[test]
    fn every_spec_keeps_tables_consistent() {
        let mut data = dataset();
        data.games.push(game(4, "Silent Star", 2));
        let langs = ["", "English", "French", "Korean"];
        let queries = ["", "star", "zzz"];
        for lang in langs {
            for min in 0..4 {
                for query in queries {
                    let mut spec = FilterSpec::default()
                        .with_min_language_count(min)
                        .with_name_query(query);
                    if !lang.is_empty() {
                        spec = spec.with_language(lang);
                    }
                    assert_consistent(&FilterEngine::apply(&data, &spec));
                }
            }
        }
    }
}
