// Sun Oct 18 2026 - Alex

use colored::*;
use log::{Level, LevelFilter};
use std::io::Write;

pub struct LoggingUtils;

impl LoggingUtils {
    /// Installs the global logger. `RUST_LOG`, when set, takes precedence over
    /// an explicit level, which takes precedence over the verbosity count.
    pub fn init(verbosity: usize, level: Option<&str>) {
        let mut builder = match std::env::var("RUST_LOG") {
            Ok(filter) if !filter.is_empty() => {
                let mut builder = env_logger::Builder::new();
                builder.parse_filters(&filter);
                builder
            }
            _ => {
                let mut builder = env_logger::Builder::new();
                builder.filter_level(Self::level_filter(verbosity, level));
                builder
            }
        };
        builder
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    Self::format_level(record.level()),
                    record.target(),
                    record.args()
                )
            })
            .try_init()
            .ok();
    }

    pub fn level_filter(verbosity: usize, level: Option<&str>) -> LevelFilter {
        match level {
            Some(level) => Self::level_from_str(level),
            None => Self::level_from_verbosity(verbosity),
        }
    }

    pub fn level_from_str(s: &str) -> LevelFilter {
        match s.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }

    pub fn level_from_verbosity(verbosity: usize) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn format_level(level: Level) -> ColoredString {
        match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green().bold(),
            Level::Debug => "DEBUG".blue().bold(),
            Level::Trace => "TRACE".magenta().bold(),
        }
    }
}
