//! Normalizer Module
//! Coerces raw string cells into typed records. Malformed values are
//! repaired in place and recorded, never used as a reason to drop a row.

use crate::data::loader::{RawGameRow, RawLanguageRow, RawTables, TableKind};
use crate::data::model::{Dataset, Game, LanguageSupport, NO_NAME};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Annotation appended to languages that are supported in the interface only.
pub const INTERFACE_ONLY_MARKER: char = '*';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Language data is empty: check the CSV contents")]
    EmptyLanguageSet,
}

/// One in-place repair made while normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRepair {
    pub table: TableKind,
    pub row: usize,
    pub field: &'static str,
    pub raw: Option<String>,
}

/// Repairs and skipped rows from one normalization pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
    pub repairs: Vec<RowRepair>,
    pub skipped_long_rows: usize,
    pub duplicate_pairs: usize,
}

/// Turns raw tables into a dataset satisfying the record invariants.
pub struct Normalizer;

impl Normalizer {
    /// Normalize both tables. Fails only if no language survives.
    pub fn normalize(raw: &RawTables) -> Result<(Dataset, NormalizeReport), NormalizeError> {
        let mut report = NormalizeReport::default();

        let games: Vec<Game> = raw
            .wide
            .iter()
            .enumerate()
            .map(|(row, r)| Self::normalize_game(row, r, &mut report))
            .collect();

        let mut seen: HashSet<LanguageSupport> = HashSet::new();
        let mut support = Vec::with_capacity(raw.long.len());
        for (row, r) in raw.long.iter().enumerate() {
            let Some(pair) = Self::normalize_pair(row, r, &mut report) else {
                report.skipped_long_rows += 1;
                continue;
            };
            if seen.insert(pair.clone()) {
                support.push(pair);
            } else {
                report.duplicate_pairs += 1;
            }
        }

        if support.is_empty() {
            warn!("no language values left after normalization");
            return Err(NormalizeError::EmptyLanguageSet);
        }

        debug!(
            games = games.len(),
            pairs = support.len(),
            repairs = report.repairs.len(),
            skipped = report.skipped_long_rows,
            duplicates = report.duplicate_pairs,
            "tables normalized"
        );
        Ok((Dataset::new(games, support), report))
    }

    fn normalize_game(row: usize, raw: &RawGameRow, report: &mut NormalizeReport) -> Game {
        let app_id = Self::parse_app_id(raw.app_id.as_deref());
        if app_id.is_none() {
            Self::repair(report, TableKind::Wide, row, "appid", &raw.app_id);
        }

        let name = match raw.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                Self::repair(report, TableKind::Wide, row, "name", &raw.name);
                NO_NAME.to_string()
            }
        };

        let language_count = Self::parse_count(raw.language_count.as_deref()).unwrap_or_else(|| {
            Self::repair(report, TableKind::Wide, row, "language_count", &raw.language_count);
            0
        });

        let languages = raw
            .languages
            .as_deref()
            .map(|list| {
                list.split(',')
                    .filter_map(Self::clean_language)
                    .collect()
            })
            .unwrap_or_default();

        let genre = raw
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        Game {
            app_id,
            name,
            language_count,
            languages,
            genre,
        }
    }

    fn normalize_pair(
        row: usize,
        raw: &RawLanguageRow,
        report: &mut NormalizeReport,
    ) -> Option<LanguageSupport> {
        let language = raw.language.as_deref().and_then(Self::clean_language);
        let Some(language) = language else {
            debug!(row, raw = ?raw.language, "long row has no language");
            return None;
        };

        let app_id = Self::parse_app_id(raw.app_id.as_deref());
        if app_id.is_none() {
            Self::repair(report, TableKind::Long, row, "appid", &raw.app_id);
        }

        Some(LanguageSupport { app_id, language })
    }

    /// Trim a language name and strip trailing interface-only markers.
    /// Returns `None` when nothing is left.
    pub fn clean_language(raw: &str) -> Option<String> {
        let cleaned = raw.trim().trim_end_matches(INTERFACE_ONLY_MARKER).trim_end();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned.to_string())
        }
    }

    /// Integer-like count. Decimals truncate, negatives clamp to zero.
    pub fn parse_count(raw: Option<&str>) -> Option<u32> {
        let raw = raw?.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return Some(n.clamp(0, u32::MAX as i64) as u32);
        }
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.max(0.0).min(u32::MAX as f64) as u32)
    }

    fn parse_app_id(raw: Option<&str>) -> Option<i64> {
        let raw = raw?.trim();
        raw.parse::<i64>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        })
    }

    fn repair(
        report: &mut NormalizeReport,
        table: TableKind,
        row: usize,
        field: &'static str,
        raw: &Option<String>,
    ) {
        // Absent names and counts are expected in the source and not worth a warning.
        if raw.as_deref().is_some_and(|v| !v.trim().is_empty()) {
            warn!(%table, row, field, raw = ?raw, "malformed value replaced with default");
        }
        report.repairs.push(RowRepair {
            table,
            row,
            field,
            raw: raw.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterEngine, FilterSpec};
    use crate::stats::Aggregator;

    fn game_row(app_id: &str, name: Option<&str>, count: Option<&str>) -> RawGameRow {
        RawGameRow {
            app_id: Some(app_id.to_string()),
            name: name.map(str::to_string),
            language_count: count.map(str::to_string),
            languages: None,
            genre: None,
        }
    }

    fn pair(app_id: &str, language: &str) -> RawLanguageRow {
        RawLanguageRow {
            app_id: Some(app_id.to_string()),
            language: Some(language.to_string()),
        }
    }

    #[test]
    fn blank_name_and_bad_count_get_defaults() {
        let raw = RawTables {
            wide: vec![game_row("1", Some(""), Some("bad"))],
            long: vec![pair("1", "English")],
        };
        let (dataset, report) = Normalizer::normalize(&raw).unwrap();

        assert_eq!(dataset.games[0].name, "(no name)");
        assert_eq!(dataset.games[0].language_count, 0);
        assert_eq!(report.repairs.len(), 2);
    }

    #[test]
    fn marker_is_stripped_from_long_table() {
        let raw = RawTables {
            wide: vec![game_row("1", Some("Game"), Some("2"))],
            long: vec![pair("1", "French*"), pair("1", "German")],
        };
        let (dataset, _) = Normalizer::normalize(&raw).unwrap();

        assert_eq!(dataset.languages_for(1), vec!["French", "German"]);
        assert!(dataset.support.iter().all(|s| !s.language.contains('*')));
    }

    #[test]
    fn marked_and_unmarked_pairs_collapse() {
        let raw = RawTables {
            wide: vec![game_row("1", Some("Game"), Some("1"))],
            long: vec![pair("1", " French* "), pair("1", "French")],
        };
        let (dataset, report) = Normalizer::normalize(&raw).unwrap();

        assert_eq!(dataset.support.len(), 1);
        assert_eq!(report.duplicate_pairs, 1);
    }

    #[test]
    fn wide_language_list_is_cleaned() {
        let mut row = game_row("1", Some("Game"), Some("3"));
        row.languages = Some("English, Korean*, ,Japanese ".to_string());
        let raw = RawTables {
            wide: vec![row],
            long: vec![pair("1", "English")],
        };
        let (dataset, _) = Normalizer::normalize(&raw).unwrap();

        assert_eq!(dataset.games[0].languages, vec!["English", "Korean", "Japanese"]);
    }

    #[test]
    fn empty_language_set_is_an_error() {
        let raw = RawTables {
            wide: vec![game_row("1", Some("Game"), Some("0"))],
            long: vec![pair("1", "*"), pair("1", "  ")],
        };
        assert_eq!(
            Normalizer::normalize(&raw).unwrap_err(),
            NormalizeError::EmptyLanguageSet
        );
    }

    #[test]
    fn malformed_app_id_keeps_the_row() {
        let raw = RawTables {
            wide: vec![game_row("x1", Some("Game"), Some("4"))],
            long: vec![pair("1", "English")],
        };
        let (dataset, report) = Normalizer::normalize(&raw).unwrap();

        assert_eq!(dataset.games.len(), 1);
        assert_eq!(dataset.games[0].app_id, None);
        assert_eq!(report.repairs[0].field, "appid");
    }

    #[test]
    fn unparsed_ids_never_join_each_other() {
        let raw = RawTables {
            wide: vec![game_row("x1", Some("Quiet Game"), Some("1"))],
            long: vec![pair("garbage", "Korean"), pair("7", "English")],
        };
        let (dataset, report) = Normalizer::normalize(&raw).unwrap();

        assert_eq!(dataset.support[0].app_id, None);
        assert_eq!(report.repairs.len(), 2);
        assert!(dataset.game_ids().is_empty());

        let korean = FilterEngine::apply(&dataset, &FilterSpec::default().with_language("Korean"));
        assert!(korean.games.is_empty());
        assert!(korean.support.is_empty());
        assert!(Aggregator::games_for_language(&dataset, "Korean").is_empty());
        assert!(Aggregator::language_ranking(&dataset, None).is_empty());
    }

    #[test]
    fn names_keep_their_spacing() {
        let raw = RawTables {
            wide: vec![game_row("1", Some("  Foo "), Some("1")), game_row("2", Some("   "), None)],
            long: vec![pair("1", "English")],
        };
        let (dataset, _) = Normalizer::normalize(&raw).unwrap();

        assert_eq!(dataset.games[0].name, "  Foo ");
        assert_eq!(dataset.games[1].name, "(no name)");
    }

    #[test]
    fn counts_accept_decimal_text() {
        assert_eq!(Normalizer::parse_count(Some("12.0")), Some(12));
        assert_eq!(Normalizer::parse_count(Some(" 7 ")), Some(7));
        assert_eq!(Normalizer::parse_count(Some("-3")), Some(0));
        assert_eq!(Normalizer::parse_count(Some("NaN")), None);
        assert_eq!(Normalizer::parse_count(None), None);
    }
}
