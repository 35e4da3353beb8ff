//! CSV Data Loader Module
//! Reads the wide and long tables using Polars. Every cell is read as a
//! string; type coercion belongs to the normalizer.

use polars::prelude::*;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No {0} table available: supply the file or upload it")]
    MissingSource(TableKind),
    #[error("{table} table has no '{column}' column")]
    MissingColumn {
        table: TableKind,
        column: &'static str,
    },
    #[error("Failed to read {label}: {source}")]
    Io {
        label: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which of the two input tables a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TableKind {
    Wide,
    Long,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Wide => write!(f, "wide"),
            TableKind::Long => write!(f, "long"),
        }
    }
}

/// Where a table comes from: a file on disk or an uploaded byte stream.
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Bytes { label: String, bytes: Vec<u8> },
}

impl Source {
    /// Read an upload argument into memory. `-` reads standard input.
    pub fn read_upload(arg: &str) -> Result<Self, LoaderError> {
        let mut bytes = Vec::new();
        if arg == "-" {
            std::io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|source| LoaderError::Io {
                    label: "stdin".to_string(),
                    source,
                })?;
        } else {
            bytes = std::fs::read(arg).map_err(|source| LoaderError::Io {
                label: arg.to_string(),
                source,
            })?;
        }
        Ok(Source::Bytes {
            label: arg.to_string(),
            bytes,
        })
    }

    /// Pick the source for one table. An explicit upload always wins; the
    /// default path is used only when auto-loading and the file exists.
    pub fn resolve(upload: Option<Source>, default_path: &Path, auto_load: bool) -> Option<Source> {
        if upload.is_some() {
            return upload;
        }
        if auto_load && default_path.is_file() {
            return Some(Source::Path(default_path.to_path_buf()));
        }
        debug!(path = %default_path.display(), auto_load, "default source not used");
        None
    }

    pub fn label(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Bytes { label, .. } => label.clone(),
        }
    }
}

/// A wide-table row exactly as read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGameRow {
    pub app_id: Option<String>,
    pub name: Option<String>,
    pub language_count: Option<String>,
    pub languages: Option<String>,
    pub genre: Option<String>,
}

/// A long-table row exactly as read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLanguageRow {
    pub app_id: Option<String>,
    pub language: Option<String>,
}

/// Both tables before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub wide: Vec<RawGameRow>,
    pub long: Vec<RawLanguageRow>,
}

/// Handles CSV loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load both tables. Either source missing is terminal.
    pub fn load_tables(
        wide: Option<Source>,
        long: Option<Source>,
    ) -> Result<RawTables, LoaderError> {
        let wide = wide.ok_or(LoaderError::MissingSource(TableKind::Wide))?;
        let long = long.ok_or(LoaderError::MissingSource(TableKind::Long))?;

        let wide_df = Self::read_frame(&wide)?;
        let long_df = Self::read_frame(&long)?;

        let tables = RawTables {
            wide: Self::wide_rows(&wide_df)?,
            long: Self::long_rows(&long_df)?,
        };
        info!(
            wide = %wide.label(),
            long = %long.label(),
            games = tables.wide.len(),
            pairs = tables.long.len(),
            "tables loaded"
        );
        Ok(tables)
    }

    /// Read one CSV source into a DataFrame of string columns.
    pub fn read_frame(source: &Source) -> Result<DataFrame, LoaderError> {
        let df = match source {
            Source::Path(path) => LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(Some(0))
                .finish()?
                .collect()?,
            Source::Bytes { bytes, .. } => CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(Some(0))
                .into_reader_with_file_handle(Cursor::new(bytes.clone()))
                .finish()?,
        };
        debug!(source = %source.label(), rows = df.height(), "csv read");
        Ok(df)
    }

    /// Extract wide-table rows. Only `appid` is required.
    pub fn wide_rows(df: &DataFrame) -> Result<Vec<RawGameRow>, LoaderError> {
        let height = df.height();
        let app_ids = Self::required_cells(df, TableKind::Wide, "appid")?;
        let names = Self::optional_cells(df, "name", height)?;
        let counts = Self::optional_cells(df, "language_count", height)?;
        let languages = Self::optional_cells(df, "languages", height)?;
        let genres = Self::optional_cells(df, "genre", height)?;

        let rows = app_ids
            .into_iter()
            .zip(names)
            .zip(counts)
            .zip(languages)
            .zip(genres)
            .map(
                |((((app_id, name), language_count), languages), genre)| RawGameRow {
                    app_id,
                    name,
                    language_count,
                    languages,
                    genre,
                },
            )
            .collect();
        Ok(rows)
    }

    /// Extract long-table rows.
    pub fn long_rows(df: &DataFrame) -> Result<Vec<RawLanguageRow>, LoaderError> {
        let app_ids = Self::required_cells(df, TableKind::Long, "appid")?;
        let languages = Self::required_cells(df, TableKind::Long, "language")?;

        Ok(app_ids
            .into_iter()
            .zip(languages)
            .map(|(app_id, language)| RawLanguageRow { app_id, language })
            .collect())
    }

    fn required_cells(
        df: &DataFrame,
        table: TableKind,
        column: &'static str,
    ) -> Result<Vec<Option<String>>, LoaderError> {
        if !Self::has_column(df, column) {
            return Err(LoaderError::MissingColumn { table, column });
        }
        Self::string_cells(df, column)
    }

    fn optional_cells(
        df: &DataFrame,
        column: &str,
        height: usize,
    ) -> Result<Vec<Option<String>>, LoaderError> {
        if Self::has_column(df, column) {
            Self::string_cells(df, column)
        } else {
            Ok(vec![None; height])
        }
    }

    fn has_column(df: &DataFrame, column: &str) -> bool {
        df.get_column_names().iter().any(|name| name.as_str() == column)
    }

    fn string_cells(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, LoaderError> {
        let cells = df.column(column)?.cast(&DataType::String)?;
        let ca = cells.str()?;
        Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(label: &str, text: &str) -> Source {
        Source::Bytes {
            label: label.to_string(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn missing_wide_source_is_reported() {
        let long = bytes("long", "appid,language\n1,English\n");
        let err = DataLoader::load_tables(None, Some(long)).unwrap_err();
        assert!(matches!(err, LoaderError::MissingSource(TableKind::Wide)));
    }

    #[test]
    fn missing_long_source_is_reported() {
        let wide = bytes("wide", "appid,name\n1,Game\n");
        let err = DataLoader::load_tables(Some(wide), None).unwrap_err();
        assert!(matches!(err, LoaderError::MissingSource(TableKind::Long)));
    }

    #[test]
    fn reads_cells_as_strings() {
        let wide = bytes(
            "wide",
            "appid,name,language_count,languages,genre\n10,Alpha,bad,\"English, French*\",RPG\n",
        );
        let long = bytes("long", "appid,language\n10,French*\n");
        let tables = DataLoader::load_tables(Some(wide), Some(long)).unwrap();

        assert_eq!(tables.wide.len(), 1);
        let row = &tables.wide[0];
        assert_eq!(row.app_id.as_deref(), Some("10"));
        assert_eq!(row.language_count.as_deref(), Some("bad"));
        assert_eq!(row.languages.as_deref(), Some("English, French*"));
        assert_eq!(row.genre.as_deref(), Some("RPG"));
        assert_eq!(tables.long[0].language.as_deref(), Some("French*"));
    }

    #[test]
    fn optional_wide_columns_may_be_absent() {
        let wide = bytes("wide", "appid\n1\n2\n");
        let long = bytes("long", "appid,language\n1,English\n");
        let tables = DataLoader::load_tables(Some(wide), Some(long)).unwrap();

        assert_eq!(tables.wide.len(), 2);
        assert!(tables.wide.iter().all(|r| r.name.is_none() && r.genre.is_none()));
    }

    #[test]
    fn long_table_requires_language_column() {
        let wide = bytes("wide", "appid\n1\n");
        let long = bytes("long", "appid,lang\n1,English\n");
        let err = DataLoader::load_tables(Some(wide), Some(long)).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MissingColumn {
                table: TableKind::Long,
                column: "language"
            }
        ));
    }

    #[test]
    fn upload_overrides_default_path() {
        let upload = bytes("upload", "appid\n1\n");
        let resolved = Source::resolve(Some(upload), Path::new("/nonexistent.csv"), true);
        assert_eq!(resolved.map(|s| s.label()), Some("upload".to_string()));
    }

    #[test]
    fn absent_default_without_upload_resolves_to_none() {
        assert!(Source::resolve(None, Path::new("/nonexistent/wide.csv"), true).is_none());
    }
}
