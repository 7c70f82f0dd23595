//! `log4rs` setup for the library and the CLI.
//!
//! The library itself only emits through the `log` facade; nothing here runs unless a
//! caller asks for it. If a logger is already installed, configuration is a no-op.

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

use crate::errors::QueryError;
use crate::utils::devlog::DEV_TARGET;

pub const ENV_LOG_DIR: &str = "ARRAYQUERY_LOG_DIR";
pub const ENV_LOG_RETENTION: &str = "ARRAYQUERY_LOG_RETENTION";
pub const ENV_DEV6: &str = "ARRAYQUERY_DEV6";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_RETENTION: u32 = 7;

/// error|warn|info|debug|trace|off; anything else is `info`.
#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Console (stderr) configuration. Stdout stays free for CLI output.
///
/// # Errors
/// Invalid log4rs configuration.
pub fn console_config(level: &str) -> Result<Config, QueryError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();
    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .logger(Logger::builder().additive(false).build(DEV_TARGET, LevelFilter::Trace))
        .build(Root::builder().appender("stderr").build(parse_level(level)))
        .map_err(|e| QueryError::Config(e.to_string()))
}

/// Rolling-file configuration writing `{dir}/arrayquery.log`. With `dev6`, developer
/// benchmark lines go to a separate `{dir}/dev6.log`.
///
/// # Errors
/// Directory creation or appender setup failures.
pub fn file_config(dir: &Path, level: &str, retention: Option<u32>, dev6: bool) -> Result<Config, QueryError> {
    std::fs::create_dir_all(dir)?;
    let keep = retention.unwrap_or(DEFAULT_RETENTION);
    let app = rolling_appender(dir, "arrayquery", keep)?;
    let mut builder = Config::builder().appender(Appender::builder().build("app", Box::new(app)));
    if dev6 {
        let dev = rolling_appender(dir, "dev6", keep)?;
        builder = builder
            .appender(Appender::builder().build("dev6", Box::new(dev)))
            .logger(Logger::builder().appender("dev6").additive(false).build(DEV_TARGET, LevelFilter::Trace));
    } else {
        builder = builder.logger(Logger::builder().additive(false).build(DEV_TARGET, LevelFilter::Trace));
    }
    builder
        .build(Root::builder().appender("app").build(parse_level(level)))
        .map_err(|e| QueryError::Config(e.to_string()))
}

fn rolling_appender(dir: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, QueryError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", dir.join(format!("{stem}.{{}}.log")).display()), keep)
        .map_err(|e| QueryError::Config(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{stem}.log")), Box::new(policy))?)
}

/// Install a stderr logger for the process.
///
/// # Errors
/// Invalid configuration.
pub fn configure_logging(level: &str) -> Result<(), QueryError> {
    install(console_config(level)?);
    Ok(())
}

/// Install a rolling-file logger for the process.
///
/// # Errors
/// Directory creation or appender setup failures.
pub fn configure_file_logging(dir: &Path, level: &str, retention: Option<u32>, dev6: bool) -> Result<(), QueryError> {
    install(file_config(dir, level, retention, dev6)?);
    Ok(())
}

/// Configure from environment values found through `lookup`:
/// - `ARRAYQUERY_LOG_DIR` (file logging when set, stderr otherwise)
/// - `ARRAYQUERY_LOG_LEVEL`
/// - `ARRAYQUERY_LOG_RETENTION`
/// - `ARRAYQUERY_DEV6`
///
/// # Errors
/// Invalid configuration.
pub fn configure_from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<(), QueryError> {
    let level = lookup(crate::config::ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string());
    match lookup(ENV_LOG_DIR) {
        Some(dir) => {
            let retention = lookup(ENV_LOG_RETENTION).and_then(|s| s.parse::<u32>().ok());
            let dev6 = lookup(ENV_DEV6)
                .is_some_and(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
            configure_file_logging(Path::new(&dir), &level, retention, dev6)
        }
        None => configure_logging(&level),
    }
}

fn install(config: Config) {
    if let Err(e) = log4rs::init_config(config) {
        log::debug!("logger already installed: {e}");
    }
}
