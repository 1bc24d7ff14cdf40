// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Target-filtered logger: per-target level overrides over one global
//! default level, implementing the current `log::Log` trait shape
//! (`enabled(&Metadata)`, `log(&Record)`, `flush()`).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

static INSTALLED: OnceLock<&'static Logger> = OnceLock::new();

/// The logger installed by the most recent successful `install()` call,
/// if any. Backs the PWM facet's `set_loglevel`.
pub fn installed() -> Option<&'static Logger> {
    INSTALLED.get().copied()
}

fn level_to_usize(level: LevelFilter) -> usize {
    level as usize
}

fn usize_to_level(value: usize) -> LevelFilter {
    match value {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub struct Logger {
    default_level: AtomicUsize,
    targets: HashMap<String, LevelFilter>,
}

impl Logger {
    pub fn new(default_level: LevelFilter) -> Logger {
        Logger {
            default_level: AtomicUsize::new(level_to_usize(default_level)),
            targets: HashMap::new(),
        }
    }

    pub fn with_target(mut self, target: &str, level: LevelFilter) -> Logger {
        self.targets.insert(target.to_string(), level);
        self
    }

    /// Installs this logger as the process-wide `log` backend. The PWM
    /// facet's `set_loglevel` adjusts the installed logger's default level
    /// afterward via `set_level`.
    pub fn install(self) -> Result<&'static Logger, SetLoggerError> {
        let level = usize_to_level(self.default_level.load(Ordering::Relaxed));
        let boxed: &'static Logger = Box::leak(Box::new(self));
        log::set_logger(boxed)?;
        log::set_max_level(level);
        let _ = INSTALLED.set(boxed);
        Ok(boxed)
    }

    /// Runtime level adjustment backing the public `set_loglevel` call.
    pub fn set_level(&self, level: LevelFilter) {
        self.default_level.store(level_to_usize(level), Ordering::Relaxed);
        log::set_max_level(level);
    }

    fn level_for(&self, target: &str) -> LevelFilter {
        self.targets
            .get(target)
            .copied()
            .unwrap_or_else(|| usize_to_level(self.default_level.load(Ordering::Relaxed)))
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level_tag = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARN",
                Level::Info => "INFO",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            };
            eprintln!("{} [{}] - {}", level_tag, record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_override_takes_precedence_over_default() {
        let logger = Logger::new(LevelFilter::Warn).with_target("rpio::dma", LevelFilter::Debug);
        assert_eq!(logger.level_for("rpio::dma"), LevelFilter::Debug);
        assert_eq!(logger.level_for("rpio::gpio"), LevelFilter::Warn);
    }

    #[test]
    fn set_level_updates_default_for_unlisted_targets() {
        let logger = Logger::new(LevelFilter::Warn);
        logger.set_level(LevelFilter::Trace);
        assert_eq!(logger.level_for("anything"), LevelFilter::Trace);
    }
}
