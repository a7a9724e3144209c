mod cli;

use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use cli::Cli;
use gitstatus::config::{ScanConfig, UserConfig};
use gitstatus::output::{self, OutputFormat};
use gitstatus::styling::{
    ERROR, ERROR_EMOJI, HINT, HINT_EMOJI, WARNING, WARNING_EMOJI, eprintln, println,
};
use gitstatus::{CancellationToken, RepositoryResult, WalkError, logging, walk};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{ERROR_EMOJI} {ERROR}{e:#}{ERROR:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.no_color {
        anstream::ColorChoice::Never.write_global();
    }

    logging::init(cli.log.clone().unwrap_or_default(), cli.logfile.as_deref())
        .context("Failed to initialize logger")?;

    let root = dunce::canonicalize(&cli.path)
        .with_context(|| format!("Failed to resolve path {}", cli.path.display()))?;
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let user_config = UserConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let config = scan_config(&cli, root, &user_config);
    log::debug!("{:?}", config);

    let cancel = CancellationToken::new();
    cancel
        .cancel_on_signals()
        .context("Failed to install signal handlers")?;

    let mut results: Vec<RepositoryResult> = Vec::new();
    let failed = match walk(&config, &cancel, |result: RepositoryResult| {
        results.push(result)
    }) {
        Ok(summary) => summary.failed,
        Err(WalkError::Cancelled) => {
            // An interrupted scan still reports what it found
            log::info!("Received interrupt signal, stopping...");
            output::failed_count(&results)
        }
    };

    log::info!("Scan finished. Found {} repositories.", results.len());

    match cli.format {
        OutputFormat::Text => {
            for line in output::render_text(&results, config.show_all) {
                println!("{}", line.render());
            }
        }
        OutputFormat::Json => {
            let json = output::render_json(&results).context("Failed to serialize results")?;
            println!("{json}");
        }
    }

    if failed > 0 {
        let noun = if failed == 1 { "repository" } else { "repositories" };
        eprintln!("{WARNING_EMOJI} {WARNING}{failed} {noun} failed to inspect{WARNING:#}");
        if cli.log.as_ref().is_none_or(|levels| !levels.contains(log::Level::Error)) {
            eprintln!("{HINT_EMOJI} {HINT}Run with --log ERROR to see why{HINT:#}");
        }
    }

    Ok(())
}

/// Layer CLI flags over the user config.
fn scan_config(cli: &Cli, root: std::path::PathBuf, user_config: &UserConfig) -> ScanConfig {
    let mut config = ScanConfig::from_user_config(root, user_config);
    if let Some(depth) = cli.depth {
        config.max_depth = depth;
    }
    if cli.all {
        config.show_all = true;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config
}
