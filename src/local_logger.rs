use std::{env, io::Write};

use crate::prelude::*;
use console::Style;
use lazy_static::lazy_static;
use log::Log;
use simplelog::{CombinedLogger, SharedLogger};

pub const PROCTREE_U8_COLOR_CODE: u8 = 114; // #87D787

lazy_static! {
    pub static ref IS_TTY: bool = std::io::IsTerminal::is_terminal(&std::io::stderr());
}

/// Logs to stderr, so that the tree printed on stdout can be piped untouched
pub struct LocalLogger {
    log_level: log::LevelFilter,
}

impl LocalLogger {
    pub fn new() -> Self {
        let log_level = env::var("PROCTREE_LOG")
            .ok()
            .and_then(|log_level| log_level.parse::<log::LevelFilter>().ok())
            .unwrap_or(log::LevelFilter::Info);

        LocalLogger { log_level }
    }
}

impl Log for LocalLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.log_level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        eprintln!("{}", format_record(record, *IS_TTY));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Format a log record with the style of its level
///
/// Without a terminal the level is spelled out instead of colored.
fn format_record(record: &log::Record, styled: bool) -> String {
    let message = match record.level() {
        log::Level::Debug | log::Level::Trace => {
            format!("[{}::{}] {}", record.level(), record.target(), record.args())
        }
        _ => record.args().to_string(),
    };

    if !styled {
        return match record.level() {
            log::Level::Info | log::Level::Debug | log::Level::Trace => message,
            level => format!("[{level}] {message}"),
        };
    }

    let style = match record.level() {
        log::Level::Error => Style::new().red(),
        log::Level::Warn => Style::new().yellow(),
        log::Level::Info => Style::new().color256(PROCTREE_U8_COLOR_CODE),
        log::Level::Debug => Style::new().blue().dim(),
        log::Level::Trace => Style::new().black().dim(),
    };
    style.for_stderr().apply_to(message).to_string()
}

impl SharedLogger for LocalLogger {
    fn level(&self) -> log::LevelFilter {
        self.log_level
    }

    fn config(&self) -> Option<&simplelog::Config> {
        None
    }

    fn as_log(self: Box<Self>) -> Box<dyn Log> {
        Box::new(*self)
    }
}

pub fn get_local_logger() -> Box<dyn SharedLogger> {
    Box::new(LocalLogger::new())
}

pub fn init_local_logger() -> Result<()> {
    let logger = get_local_logger();
    CombinedLogger::init(vec![logger])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_with(level: log::Level, styled: bool) -> String {
        format_record(
            &log::Record::builder()
                .level(level)
                .target("proctree::snapshot")
                .args(format_args!("hello"))
                .build(),
            styled,
        )
    }

    #[test]
    fn test_plain_format() {
        assert_eq!(format_with(log::Level::Info, false), "hello");
        assert_eq!(format_with(log::Level::Warn, false), "[WARN] hello");
        assert_eq!(format_with(log::Level::Error, false), "[ERROR] hello");
        assert_eq!(
            format_with(log::Level::Debug, false),
            "[DEBUG::proctree::snapshot] hello"
        );
    }

    #[test]
    fn test_styled_format_keeps_message() {
        assert!(format_with(log::Level::Warn, true).contains("hello"));
    }

    #[test]
    fn test_log_level_from_env() {
        temp_env::with_var("PROCTREE_LOG", Some("debug"), || {
            assert_eq!(LocalLogger::new().log_level, log::LevelFilter::Debug);
        });
        temp_env::with_var("PROCTREE_LOG", Some("nonsense"), || {
            assert_eq!(LocalLogger::new().log_level, log::LevelFilter::Info);
        });
    }
}
