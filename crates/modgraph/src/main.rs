use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use std::io::Write;
use std::path::PathBuf;

use modgraph::config::{Config, ParseErrorPolicy};
use modgraph::orchestrator::{AnalysisSettings, analyze_tree};
use modgraph::output::{OutputFormat, render, render_cycles, render_requirements};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root of the source tree; module names are computed relative to it
    root: PathBuf,

    /// Top-level name of the analyzed package (inferred from the root when omitted)
    #[arg(short, long)]
    package: Option<String>,

    /// Dotted name of the lazy-import facade module (default: <package>._imports)
    #[arg(long)]
    facade: Option<String>,

    /// What to do with files that are not valid Python
    #[arg(long, value_enum)]
    on_parse_error: Option<ParseErrorPolicy>,

    /// Output format of the dependency mapping
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print third-party requirements instead of the dependency mapping
    #[arg(long, conflicts_with = "cycles")]
    requirements: bool,

    /// Print import cycles between internal modules instead of the dependency mapping
    #[arg(long)]
    cycles: bool,

    /// Target Python version (e.g., py38, py39, py310, py311, py312, py313)
    #[arg(long, alias = "python-version")]
    target_version: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();
    debug!("Verbosity level: {} (log level: {})", cli.verbose, log_level);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(package) = cli.package {
        config.package = Some(package);
    }
    if let Some(facade) = cli.facade {
        config.facade = Some(facade);
    }
    if let Some(policy) = cli.on_parse_error {
        config.on_parse_error = Some(policy);
    }
    if let Some(target_version) = cli.target_version {
        config.set_target_version(target_version)?;
    }
    debug!("Configuration: {:?}", config);

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Source root not found: {:?}", cli.root))?;
    let settings = AnalysisSettings::from_config(&config, &root)?;
    info!(
        "Analyzing package `{}` under {:?} (facade `{}`)",
        settings.package, root, settings.facade
    );

    let analysis = analyze_tree(&root, &settings)?;
    for skipped in &analysis.skipped {
        warn!("Skipped {:?}: {}", skipped.path, skipped.error);
    }

    let rendered = if cli.requirements {
        render_requirements(&analysis.graph.requirements(config.python_version()?))
    } else if cli.cycles {
        render_cycles(&analysis.graph.cycles())
    } else {
        render(&analysis.graph, cli.format)?
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
