//! langdash - Next Fest language-support dashboard
//!
//! Prints the dashboard for the two CSV tables as text or JSON.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use langdash::data::{LoaderError, NormalizeError, Source};
use langdash::report::TextReport;
use langdash::{load_dataset, DashboardConfig, FilterSpec, Session, SessionError, SortMode, ViewState};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    /// Most languages first
    CountDesc,
    /// Fewest languages first
    CountAsc,
    /// Game name A-Z
    Name,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::CountDesc => SortMode::CountDesc,
            SortArg::CountAsc => SortMode::CountAsc,
            SortArg::Name => SortMode::NameAsc,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Language-support dashboard for Next Fest demos
#[derive(Parser, Debug)]
#[command(name = "langdash", version)]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wide table to use instead of the default file ("-" for stdin)
    #[arg(long)]
    wide: Option<String>,

    /// Long table to use instead of the default file ("-" for stdin)
    #[arg(long)]
    long: Option<String>,

    /// Keep games supporting this language (repeatable)
    #[arg(long = "language", short = 'l')]
    languages: Vec<String>,

    /// Keep games with at least this many languages
    #[arg(long, default_value_t = 0)]
    min_languages: u32,

    /// Case-insensitive game name search
    #[arg(long, short = 's', default_value = "")]
    search: String,

    #[arg(long, value_enum, default_value = "count-desc")]
    sort: SortArg,

    /// Length of the top languages table
    #[arg(long)]
    top: Option<usize>,

    /// Histogram bin count
    #[arg(long)]
    bins: Option<usize>,

    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Print the available languages and exit
    #[arg(long)]
    list_languages: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "langdash=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<SessionError>() {
            Some(SessionError::Load(LoaderError::MissingSource(table))) => {
                eprintln!(
                    "No {} table found. Place the CSV next to the binary or pass --{} <FILE>.",
                    table, table
                );
                ExitCode::from(2)
            }
            Some(SessionError::Normalize(NormalizeError::EmptyLanguageSet)) => {
                warn!("{}", e);
                eprintln!("Language data is empty. Check the CSV contents.");
                ExitCode::SUCCESS
            }
            _ => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(top) = args.top {
        config.top_n = top;
    }
    if let Some(bins) = args.bins {
        config.histogram_bins = bins;
    }

    let wide = args.wide.as_deref().map(Source::read_upload).transpose()?;
    let long = args.long.as_deref().map(Source::read_upload).transpose()?;

    let (dataset, _report) = load_dataset(&config, wide, long)?;
    let mut session = Session::new(Arc::new(dataset), ViewState::from_config(&config));

    if args.list_languages {
        for lang in session.dataset().all_languages() {
            println!("{}", lang);
        }
        return Ok(());
    }

    let filter = args
        .languages
        .into_iter()
        .fold(FilterSpec::default(), |spec, lang| spec.with_language(lang))
        .with_min_language_count(args.min_languages)
        .with_name_query(args.search);
    session.set_filter(filter);
    session.set_sort(args.sort.into());
    debug!(state = ?session.state(), "view state");

    let view = session.view();
    match args.format {
        Format::Text => print!("{}", TextReport::new(config.headline_language_limit).render(&view)),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&view).context("Failed to serialize view")?
        ),
    }
    Ok(())
}
