use arrayquery::cli::{self as prog_cli, OutputMode};
use arrayquery::{EngineConfig, QueryEngine, logger};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "arrayquery", version, about = "Filter JSON records with MongoDB-style queries", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). If omitted, the usual locations are searched.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Log level override: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, value_delimiter = ';', help = "Accepted date formats, ';'-separated (chrono patterns or iso8601)")]
    date_formats: Option<Vec<String>>,
    #[arg(long, value_enum, default_value_t = Format::Plain, help = "Output style for scalar results")]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Json,
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Print records matching a query as NDJSON")]
    Filter {
        #[arg(help = "Query JSON (e.g., {\"age\": {\"$gte\": 21}}) or @file")]
        query: String,
        #[arg(long, help = "JSON array or NDJSON file; reads stdin when omitted")]
        input: Option<PathBuf>,
        #[arg(long, help = "Print only the number of matches")]
        count: bool,
    },
    #[command(about = "Check whether a single record satisfies a query")]
    Check {
        #[arg(help = "Query JSON or @file")]
        query: String,
        #[arg(help = "Record JSON or @file")]
        record: String,
    },
    #[command(about = "Flatten records to dotted keys")]
    Flatten {
        #[arg(long, help = "JSON array or NDJSON file; reads stdin when omitted")]
        input: Option<PathBuf>,
        #[arg(long, help = "Write sequence indices as [i] instead of .i")]
        brackets: bool,
    },
}

impl From<Commands> for prog_cli::Command {
    fn from(c: Commands) -> Self {
        match c {
            Commands::Filter { query, input, count } => Self::Filter { query, input, count },
            Commands::Check { query, record } => Self::Check { query, record },
            Commands::Flatten { input, brackets } => Self::Flatten { input, brackets },
        }
    }
}

fn main() {
    let cli = Cli::parse();
    // Precedence: CLI > env > config files > defaults
    let mut cfg = match EngineConfig::load(cli.config.as_deref(), |k| std::env::var(k).ok()) {
        Ok(c) => c,
        Err(e) => { eprintln!("error: {e}"); std::process::exit(2); }
    };
    if let Some(level) = cli.log_level { cfg.log_level = level; }
    if let Some(formats) = cli.date_formats { cfg.date_formats = formats; }

    let log_env = |k: &str| {
        if k == arrayquery::config::ENV_LOG_LEVEL { Some(cfg.log_level.clone()) } else { std::env::var(k).ok() }
    };
    if let Err(e) = logger::configure_from_env(log_env) {
        eprintln!("warning: logging disabled: {e}");
    }

    let engine = QueryEngine::from_config(&cfg);
    let mode = match cli.format { Format::Json => OutputMode::Json, Format::Plain => OutputMode::Plain };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let r = prog_cli::run_with_format(&engine, cli.command.into(), mode, std::io::stdin().lock(), &mut out);
    let _ = out.flush();
    if let Err(e) = r {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
