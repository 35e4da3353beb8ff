//! Plain-text rendering of a dashboard view.

use crate::session::DashboardView;
use crate::stats::LanguageBreakdown;
use std::fmt;

/// Longest game-name list printed in a ranking row before truncating.
const MAX_LISTED_GAMES: usize = 8;

pub struct TextReport {
    /// Languages listed for the headline game.
    pub headline_language_limit: usize,
}

impl TextReport {
    pub fn new(headline_language_limit: usize) -> Self {
        Self {
            headline_language_limit,
        }
    }

    pub fn render(&self, view: &DashboardView) -> String {
        Rendered { report: self, view }.to_string()
    }
}

/// A view bound to its report settings, written through `Display`.
struct Rendered<'a> {
    report: &'a TextReport,
    view: &'a DashboardView,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        Self::write_ranking(f, "Languages by supported games", &self.view.ranking)?;
        Self::write_ranking(
            f,
            &format!("Top {} languages", self.view.state.top_n),
            &self.view.top_languages,
        )?;
        self.write_distribution(f)?;
        self.write_games(f)
    }
}

impl Rendered<'_> {
    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.view.summary;
        writeln!(f, "Games: {}", s.game_count)?;
        writeln!(f, "Average languages: {:.2}", s.mean_language_count)?;
        if !s.top_languages.is_empty() {
            writeln!(f, "  top {}: {}", s.top_languages.len(), s.top_languages.join(", "))?;
        }
        writeln!(f, "Most languages: {}", s.max_language_count)?;

        // Headline shows the first tied game; the full tie list is in the view.
        match s.max_games.first() {
            Some(game) => {
                writeln!(f, "  game: {}", game.name)?;
                if let Some(genre) = &game.genre {
                    writeln!(f, "  genre: {}", genre)?;
                }
                if !game.languages.is_empty() {
                    let shown: Vec<&str> = game
                        .languages
                        .iter()
                        .take(self.report.headline_language_limit)
                        .map(String::as_str)
                        .collect();
                    writeln!(f, "  languages: {}", shown.join(", "))?;
                }
                if s.max_games.len() > 1 {
                    writeln!(f, "  (+{} tied)", s.max_games.len() - 1)?;
                }
            }
            None => writeln!(f, "  game: N/A")?,
        }

        let filter = &self.view.state.filter;
        if !filter.languages.is_empty() {
            let langs: Vec<&str> = filter.languages.iter().map(String::as_str).collect();
            writeln!(f, "Games supporting {}: {}", langs.join(" or "), s.game_count)?;
        }
        writeln!(f)
    }

    fn write_ranking(f: &mut fmt::Formatter<'_>, title: &str, rows: &[LanguageBreakdown]) -> fmt::Result {
        writeln!(f, "{}", title)?;
        let width = rows.iter().map(|r| r.language.chars().count()).max().unwrap_or(0);
        for row in rows {
            let mut games = row
                .games
                .iter()
                .take(MAX_LISTED_GAMES)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if row.games.len() > MAX_LISTED_GAMES {
                games.push_str(&format!(", ... ({} more)", row.games.len() - MAX_LISTED_GAMES));
            }
            writeln!(
                f,
                "  {:<width$}  {:>3}  {}",
                row.language,
                row.game_count,
                games,
                width = width
            )?;
        }
        writeln!(f)
    }

    fn write_distribution(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Language count distribution")?;
        for entry in &self.view.distribution {
            writeln!(
                f,
                "  {:>3}  {:>3}  {}",
                entry.language_count,
                entry.games,
                "#".repeat(entry.games)
            )?;
        }
        writeln!(f)
    }

    fn write_games(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games ({})", self.view.games.len())?;
        for game in &self.view.games {
            let id = game.app_id.map_or_else(|| "-".to_string(), |id| id.to_string());
            writeln!(
                f,
                "  {:>8}  {:>3}  {}  [{}]",
                id,
                game.language_count,
                game.name,
                game.languages_display()
            )?;
        }
        Ok(())
    }
}
