use clap::{Parser, Subcommand};
use kumo::recover::comment_items;
use kumo::{
    FileChoice, OfflineFetcher, OutputDir, RawLog, RecoveryConfig, Service, find_logs, flatten,
    recover, split_title,
};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(
        long,
        global = true,
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recovers every object a saved revision log holds
    Recover {
        /// Saved revision log (raw json, with or without the response prefix)
        log: PathBuf,
        /// Service the log belongs to; guessed from `<title>.<service>.json` otherwise
        #[arg(long)]
        service: Option<Service>,
        /// Document title; defaults to the log's file name
        #[arg(long)]
        title: Option<String>,
        /// Base directory for recovered objects
        #[arg(long, default_value = "downloaded")]
        out: PathBuf,
        /// First revision covered by the log
        #[arg(long, default_value_t = 1)]
        start: u64,
        /// Last revision covered by the log; defaults to the changelog length
        #[arg(long)]
        end: Option<u64>,
        /// Comments response saved as json
        #[arg(long)]
        comments: Option<PathBuf>,
        /// Recovery settings as json
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Prints the flat log of a saved revision log
    Flatten {
        log: PathBuf,
        #[arg(long)]
        delimiter: Option<char>,
    },
    /// Recovers every saved log (`*.json`) under a directory
    Batch {
        dir: PathBuf,
        #[arg(long, default_value = "downloaded")]
        out: PathBuf,
        /// Service for every log; guessed per file otherwise
        #[arg(long)]
        service: Option<Service>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Settings shared by every recovery pass of one invocation.
struct Pass<'a> {
    out: &'a Path,
    config: &'a RecoveryConfig,
    fetcher: &'a OfflineFetcher,
}

/// Which log to recover and what to call it.
struct Target<'a> {
    log: &'a Path,
    service: Option<Service>,
    title: Option<&'a str>,
    start: u64,
    end: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Recover {
            log,
            service,
            title,
            out,
            start,
            end,
            comments,
            config,
        } => recover_command(
            Target {
                log,
                service: *service,
                title: title.as_deref(),
                start: *start,
                end: *end,
            },
            out,
            comments.as_deref(),
            config.as_deref(),
        ),
        Commands::Flatten { log, delimiter } => flatten_command(log, *delimiter),
        Commands::Batch {
            dir,
            out,
            service,
            config,
        } => batch_command(dir, out, *service, config.as_deref()),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn recover_command(
    target: Target<'_>,
    out: &Path,
    comments: Option<&Path>,
    config: Option<&Path>,
) -> CliResult<()> {
    let config = load_config(config)?;
    let fetcher = match comments {
        Some(path) => OfflineFetcher::with_comments(load_comments(path)?),
        None => OfflineFetcher::new(),
    };
    let pass = Pass {
        out,
        config: &config,
        fetcher: &fetcher,
    };
    let (dir, count) = recover_log(&pass, &target)?;
    println!("Recovered {count} objects to {}", dir.display());
    Ok(())
}

fn flatten_command(log: &Path, delimiter: Option<char>) -> CliResult<()> {
    let raw = read_log(log)?;
    let delimiter = delimiter.unwrap_or(kumo::DEFAULT_DELIMITER);
    let flat = flatten(&raw, delimiter)?;
    println!("{}", flat.to_text()?);
    Ok(())
}

fn batch_command(
    dir: &Path,
    out: &Path,
    service: Option<Service>,
    config: Option<&Path>,
) -> CliResult<()> {
    let config = load_config(config)?;
    let fetcher = OfflineFetcher::new();
    let pass = Pass {
        out,
        config: &config,
        fetcher: &fetcher,
    };

    let logs = find_logs(dir)?;
    let mut failed = 0usize;
    for log in &logs {
        let target = Target {
            log,
            service,
            title: None,
            start: 1,
            end: None,
        };
        match recover_log(&pass, &target) {
            Ok((dir, count)) => println!("Recovered {count} objects to {}", dir.display()),
            Err(err) => {
                eprintln!("Error: {}: {err}", log.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} logs failed", logs.len()).into());
    }
    if logs.is_empty() {
        println!("No revision logs found.");
    }
    Ok(())
}

/// One independent recovery pass. Returns the output directory and the
/// number of objects written.
fn recover_log(pass: &Pass<'_>, target: &Target<'_>) -> CliResult<(PathBuf, usize)> {
    let raw = read_log(target.log)?;
    let (guessed_title, guessed_service) = guess_from_path(target.log);
    let service = target
        .service
        .or(guessed_service)
        .unwrap_or(Service::Document);
    let title = target
        .title
        .map(str::to_string)
        .unwrap_or(guessed_title);
    let end = match target.end {
        Some(end) => end,
        None => raw.changelog()?.len() as u64,
    };

    let choice = FileChoice {
        file_id: title.clone(),
        title,
        service,
        max_revs: Some(end),
    };
    let objects = recover(&raw, &choice, pass.fetcher, pass.config)?;
    let dir = OutputDir::for_file(pass.out, service, &choice.title, target.start, end);
    let written = dir.write_all(&objects)?;
    Ok((dir.path, written.len()))
}

/// Title and service from a `<title>.<service>.json` file name. A suffix that
/// names no service stays part of the title.
fn guess_from_path(path: &Path) -> (String, Option<Service>) {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("untitled");
    match split_title(stem) {
        (name, Some(tag)) => match tag.parse::<Service>() {
            Ok(service) => (name, Some(service)),
            Err(_) => (stem.to_string(), None),
        },
        (name, None) => (name, None),
    }
}

fn read_log(path: &Path) -> CliResult<RawLog> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    Ok(RawLog::from_saved(&text)?)
}

fn load_config(path: Option<&Path>) -> CliResult<RecoveryConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(RecoveryConfig::default()),
    }
}

fn load_comments(path: &Path) -> CliResult<Vec<Value>> {
    let text = fs::read_to_string(path)?;
    let response: Value = serde_json::from_str(&text)?;
    let items = comment_items(&response)
        .ok_or_else(|| format!("no comment list in {}", path.display()))?;
    Ok(items.to_vec())
}
