use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tscat::config::Config;
use tscat::i18n::search::search;
use tscat::i18n::writer;
use tscat::{
    Catalog, CatalogDirectory, CatalogLoader, CatalogSelection, Locale, MissingFieldPolicy,
    TextOrigin, Translator,
};

/// Exit status when a lookup key is not in the catalog.
const EXIT_LOOKUP_MISS: u8 = 2;

/// How a command finished. Load and I/O errors are returned as `Err` and
/// exit with status 1 through `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    /// `check --strict` found dropped entries.
    Failure,
    /// `lookup` found no message; the source text was printed.
    LookupMiss,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
            Outcome::LookupMiss => ExitCode::from(EXIT_LOOKUP_MISS),
        }
    }
}

/// Inspect and query Qt Linguist translation catalogs.
#[derive(Parser, Debug)]
#[command(name = "tscat", version)]
struct Cli {
    /// Configuration file (defaults to the user config directory).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one key to its display text.
    Lookup {
        file: PathBuf,
        #[arg(long)]
        context: String,
        #[arg(long)]
        source: String,
        /// Disambiguation comment.
        #[arg(long)]
        comment: Option<String>,
        /// Item count for numerus messages.
        #[arg(long)]
        count: Option<usize>,
    },
    /// Count contexts and messages by completion state.
    Stats { file: PathBuf },
    /// Load a catalog and list every entry that was dropped or looks suspicious.
    Check {
        file: PathBuf,
        /// Exit with an error on any dropped entry.
        #[arg(long)]
        strict: bool,
    },
    /// Fuzzy search source texts and translations.
    Search {
        file: PathBuf,
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Re-serialize a catalog.
    Export {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Ts)]
        format: ExportFormat,
        /// Write to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show which catalog file would be used for a locale.
    Locate {
        /// Locale tag such as zh_CN. Defaults to the configured or system locale.
        #[arg(long)]
        locale: Option<String>,
    },
    /// Show the configuration, optionally storing a new interface language.
    Config {
        #[arg(long)]
        language: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Ts,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Load configuration. Only the config subcommand creates the file.
    let bootstrap = matches!(cli.command, Command::Config { .. });
    let config = match (&cli.config, bootstrap) {
        (Some(path), true) => Config::init_at(path)?,
        (Some(path), false) => Config::load_from(path)?,
        (None, true) => Config::init_at(&Config::config_path()?)?,
        (None, false) => Config::load()?,
    };
    info!(?config, "Configuration loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = run(cli.command, config, cli.config.as_deref(), &mut out)?;
    out.flush()?;
    Ok(outcome.into())
}

fn run(
    command: Command,
    config: Config,
    config_path: Option<&Path>,
    out: &mut impl Write,
) -> Result<Outcome> {
    match command {
        Command::Lookup {
            file,
            context,
            source,
            comment,
            count,
        } => lookup(
            out,
            &config,
            &file,
            &context,
            &source,
            comment.as_deref(),
            count,
        ),
        Command::Stats { file } => {
            let stats = load(&config, &file)?.stats();
            writeln!(out, "contexts:   {}", stats.contexts)?;
            writeln!(out, "messages:   {}", stats.messages)?;
            writeln!(out, "finished:   {}", stats.finished)?;
            writeln!(out, "unfinished: {}", stats.unfinished)?;
            writeln!(out, "blank:      {}", stats.blank)?;
            Ok(Outcome::Success)
        }
        Command::Check { file, strict } => check(out, &file, strict || config.strict),
        Command::Search { file, query, limit } => {
            let catalog = load(&config, &file)?;
            for hit in search(&catalog, &query, limit) {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    hit.context, hit.message.source, hit.message.translation
                )?;
            }
            Ok(Outcome::Success)
        }
        Command::Export {
            file,
            format,
            output,
        } => {
            let catalog = load(&config, &file)?;
            export(out, &catalog, format, output.as_deref())?;
            Ok(Outcome::Success)
        }
        Command::Locate { locale } => {
            let locale = match locale {
                Some(tag) => Locale::parse(&tag)
                    .with_context(|| format!("invalid locale tag {tag:?}"))?,
                None => config.locale()?.unwrap_or_else(Locale::system),
            };
            let directory = CatalogDirectory::from_config(&config)?;
            match directory.select(&locale) {
                CatalogSelection::Requested(path) => writeln!(out, "{}", path.display())?,
                CatalogSelection::Fallback(path) => {
                    writeln!(out, "{} (fallback for {locale})", path.display())?
                }
                CatalogSelection::SourceOnly => writeln!(
                    out,
                    "no catalog for {locale} in {}; source text is shown",
                    directory.dir().display()
                )?,
            }
            Ok(Outcome::Success)
        }
        Command::Config { language } => {
            let mut config = config;
            if let Some(language) = language {
                let locale = Locale::parse(&language)
                    .with_context(|| format!("invalid language tag {language:?}"))?;
                config.language = Some(locale.to_string());
                match config_path {
                    Some(path) => config.save_to(path)?,
                    None => config.save()?,
                }
                info!(%locale, "Interface language saved");
            }
            write!(out, "{}", toml::to_string_pretty(&config)?)?;
            Ok(Outcome::Success)
        }
    }
}

fn load(config: &Config, path: &Path) -> Result<Catalog> {
    CatalogLoader::new(config.missing_field_policy())
        .load_path(path)
        .with_context(|| format!("failed to load {}", path.display()))
}

fn lookup(
    out: &mut impl Write,
    config: &Config,
    file: &Path,
    context: &str,
    source: &str,
    comment: Option<&str>,
    count: Option<usize>,
) -> Result<Outcome> {
    let translator = Translator::new(load(config, file)?);
    let resolved = match count {
        Some(n) => translator.resolve_plural(context, source, comment, n),
        None => translator.resolve(context, source, comment),
    };
    match resolved {
        Ok(display) => {
            if display.origin == TextOrigin::SourceFallback {
                warn!(%context, %source, "Message is unfinished, showing source text");
            }
            writeln!(out, "{}", display.text)?;
            Ok(Outcome::Success)
        }
        Err(miss) => {
            warn!("{miss}");
            writeln!(out, "{source}")?;
            Ok(Outcome::LookupMiss)
        }
    }
}

fn check(out: &mut impl Write, path: &Path, strict: bool) -> Result<Outcome> {
    let (catalog, report) = CatalogLoader::new(MissingFieldPolicy::Drop)
        .load_path_with_report(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    for issue in &report.issues {
        writeln!(out, "dropped: {issue}")?;
    }
    for (context, message) in catalog.messages() {
        if message.is_finished() && message.is_blank() {
            writeln!(out, "blank:   {}::{:?}", context.name, message.source)?;
        }
    }
    let stats = catalog.stats();
    writeln!(
        out,
        "{} messages, {} unfinished, {} blank, {} dropped",
        stats.messages,
        stats.unfinished,
        stats.blank,
        report.issues.len()
    )?;

    if strict && !report.issues.is_empty() {
        return Ok(Outcome::Failure);
    }
    Ok(Outcome::Success)
}

fn export(
    out: &mut impl Write,
    catalog: &Catalog,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    match (format, output) {
        (ExportFormat::Ts, Some(path)) => writer::save_path(catalog, path)?,
        (ExportFormat::Ts, None) => writer::write_ts(catalog, &mut *out)?,
        (ExportFormat::Json, Some(path)) => std::fs::write(path, catalog.to_json()?)?,
        (ExportFormat::Json, None) => writeln!(out, "{}", catalog.to_json()?)?,
    }
    Ok(())
}
