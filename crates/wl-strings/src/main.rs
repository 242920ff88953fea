//! WeatherLink translation tool
//!
//! Validates translation files before release and inspects the tables an
//! installation would load.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use wl_translations::{
    EntityCatalog, KeyPath, LoaderConfig, Namespace, TranslationSet, Translations, DOMAIN,
};

#[derive(Debug, Parser)]
#[command(name = "wl-strings", version, about = "Validate and inspect WeatherLink translations")]
struct Cli {
    /// Loader configuration (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a strings file or an integration directory
    Validate {
        path: PathBuf,
        /// Fail when translated languages differ from the source keys
        #[arg(long)]
        strict: bool,
    },
    /// Look up a dotted key, e.g. entity.sensor.wind_direction.state.n
    Lookup {
        key: String,
        #[arg(long)]
        language: Option<String>,
    },
    /// Print flattened frontend resources as JSON
    ///
    /// Keys resolve like `lookup`: the configured language over the
    /// fallback language over the source strings.
    Flatten {
        /// Restrict to one namespace (config, entity, selector, ...)
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = DOMAIN)]
        domain: String,
    },
    /// Compare the entity namespace with the integration's entity keys
    Coverage,
    /// Report duplicated or untranslated labels
    Lint,
}

fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => LoaderConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LoaderConfig::default().with_env_overrides(),
    };

    match cli.command {
        Command::Validate { path, strict } => validate(&path, strict || config.require_parity),
        Command::Lookup { key, language } => {
            let set = config.open()?;
            let language = language.unwrap_or_else(|| config.language.clone());
            lookup(&set, &language, &key)
        }
        Command::Flatten { category, domain } => {
            let set = config.open()?;
            let category = category
                .as_deref()
                .map(str::parse::<Namespace>)
                .transpose()?;
            let resources = set.flatten(&config.language, &domain, category);
            let output = serde_json::json!({ "resources": resources });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Command::Coverage => coverage(config.open()?.source()),
        Command::Lint => {
            let set = config.open()?;
            lint(set.source());
            Ok(())
        }
    }
}

fn validate(path: &Path, strict: bool) -> Result<()> {
    if path.is_dir() {
        let set = TranslationSet::load_dir(path)
            .with_context(|| format!("validating {}", path.display()))?;
        for language in set.languages() {
            if let Some(table) = set.get(language) {
                info!("{}: {} strings", language, table.leaf_count());
            }
        }

        let gaps = set.check_parity();
        for (language, diff) in &gaps {
            for missing in &diff.missing {
                warn!("{}: missing {}", language, missing);
            }
            for extra in &diff.extra {
                warn!("{}: unexpected {}", language, extra);
            }
        }
        lint(set.source());

        if strict && !gaps.is_empty() {
            bail!("{} language(s) differ from strings.json", gaps.len());
        }
    } else {
        let table = Translations::load(path)
            .with_context(|| format!("validating {}", path.display()))?;
        info!("{}: {} strings", path.display(), table.leaf_count());
        lint(&table);
    }

    println!("ok");
    Ok(())
}

fn lookup(set: &TranslationSet, language: &str, key: &str) -> Result<()> {
    let path = KeyPath::from(key);
    let (namespace, rest) = path
        .segments()
        .split_first()
        .with_context(|| format!("empty key '{}'", key))?;
    let namespace: Namespace = namespace
        .parse()
        .with_context(|| format!("invalid key '{}'", key))?;

    match set.lookup(language, namespace, rest) {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => {
            let shown = set.source().display(namespace, rest);
            println!("{}", shown);
            bail!("no translation for '{}' in '{}'", key, language)
        }
    }
}

fn coverage(table: &Translations) -> Result<()> {
    let report = table.check_catalog(&EntityCatalog::weatherlink());
    for path in &report.missing {
        warn!("missing {} (falls back to a generated label)", path);
    }
    for path in &report.orphaned {
        warn!("orphaned {} (no entity uses this key)", path);
    }

    if !report.orphaned.is_empty() {
        bail!("{} translation key(s) have no entity", report.orphaned.len());
    }
    println!("{} missing, {} orphaned", report.missing.len(), report.orphaned.len());
    Ok(())
}

fn lint(table: &Translations) {
    let warnings = table.lint();
    for warning in &warnings {
        warn!("{}", warning);
    }
    info!("{} lint warning(s)", warnings.len());
}
