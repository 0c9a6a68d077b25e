// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A small stdout logger on top of the `log` facade.
//!
//! ```no_run
//! use logger::*;
//!
//! Logger::new()
//!     .label("demo")
//!     .level(Level::Debug)
//!     .init()
//!     .expect("Failed to initialize logger");
//!
//! info!("ready");
//! ```

pub use log::{debug, error, info, trace, warn, Level, LevelFilter, SetLoggerError};

use log::{Log, Metadata, Record};

use std::io::Write;

/// Log at error level and terminate the process with a non-zero status.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {{
        $crate::error!($($arg)*);
        $crate::flush();
        std::process::exit(1);
    }};
}

/// Builder and implementation of the process-wide logger.
pub struct Logger {
    label: Option<&'static str>,
    level: Level,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new() -> Logger {
        Logger {
            label: None,
            level: Level::Info,
        }
    }

    /// Label printed in place of the module target for info and above.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Install as the global logger. Fails if a logger is already set.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    fn format(&self, record: &Record) -> String {
        let target = if record.level() >= Level::Debug {
            record.target()
        } else {
            self.label.unwrap_or_else(|| record.target())
        };
        format!(
            "{} {:<5} [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            target,
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}", self.format(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Flush the global logger. Used by `fatal!` before exiting.
pub fn flush() {
    log::logger().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_replaces_target_for_info() {
        let logger = Logger::new().label("canny_plot");
        let line = logger.format(
            &Record::builder()
                .args(format_args!("loaded {} rows", 3))
                .level(Level::Info)
                .target("canny_plot::table")
                .build(),
        );
        assert!(line.ends_with("INFO  [canny_plot] loaded 3 rows"));
    }

    #[test]
    fn debug_keeps_module_target() {
        let logger = Logger::new().label("canny_plot");
        let line = logger.format(
            &Record::builder()
                .args(format_args!("row 1"))
                .level(Level::Debug)
                .target("canny_plot::table")
                .build(),
        );
        assert!(line.ends_with("DEBUG [canny_plot::table] row 1"));
    }

    #[test]
    fn level_filters_records() {
        let logger = Logger::new().level(Level::Warn);
        let warn = Metadata::builder().level(Level::Warn).build();
        let info = Metadata::builder().level(Level::Info).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&info));
    }
}
