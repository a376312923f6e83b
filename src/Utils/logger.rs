//! Terminal logging, optionally duplicated into a file.
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log level '{0}', expected off, error, warn, info, debug or trace")]
    Level(String),
    #[error("cannot create log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level.trim()).map_err(|_| LoggerError::Level(level.to_string()))
}

/// Installs the global logger. Returns `false` when a logger was already installed, which is
/// not an error: the first one stays.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<bool, LoggerError> {
    let level = parse_level(level)?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = File::create(path).map_err(|source| LoggerError::File {
            path: path.display().to_string(),
            source,
        })?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" DEBUG ").unwrap(), LevelFilter::Debug);
        assert!(matches!(parse_level("loud"), Err(LoggerError::Level(_))));
    }
}
