//! Typed records for the two source tables.

use serde::Serialize;
use std::collections::HashSet;

/// Placeholder used when a game row has no usable name.
pub const NO_NAME: &str = "(no name)";

/// One row of the wide table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    /// `None` when the source id could not be parsed; such a game joins nothing.
    pub app_id: Option<i64>,
    pub name: String,
    pub language_count: u32,
    /// Denormalized copy of the long table, in source order.
    pub languages: Vec<String>,
    pub genre: Option<String>,
}

impl Game {
    /// Language list joined the way the source file stores it.
    pub fn languages_display(&self) -> String {
        self.languages.join(", ")
    }
}

/// One row of the long table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LanguageSupport {
    pub app_id: Option<i64>,
    pub language: String,
}

/// The normalized table pair. Filtered views use the same type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub games: Vec<Game>,
    pub support: Vec<LanguageSupport>,
}

impl Dataset {
    pub fn new(games: Vec<Game>, support: Vec<LanguageSupport>) -> Self {
        Self { games, support }
    }

    /// Sorted distinct language names across the long table.
    pub fn all_languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self
            .support
            .iter()
            .map(|s| s.language.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        langs.sort();
        langs
    }

    /// Parsed game ids. Unparsed ids are left out since they never join.
    pub fn game_ids(&self) -> HashSet<i64> {
        self.games.iter().filter_map(|g| g.app_id).collect()
    }

    pub fn support_ids(&self) -> HashSet<i64> {
        self.support.iter().filter_map(|s| s.app_id).collect()
    }

    /// Distinct languages recorded for one game, in first-appearance order.
    pub fn languages_for(&self, app_id: i64) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.support
            .iter()
            .filter(|s| s.app_id == Some(app_id))
            .map(|s| s.language.as_str())
            .filter(|lang| seen.insert(*lang))
            .collect()
    }
}
