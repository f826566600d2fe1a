use std::io::{self, Write};
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<ConsoleLogger> = OnceCell::new();

/// Stderr logger printing `[mm:ss] LEVEL message`, elapsed since start.
pub struct ConsoleLogger {
    level: LevelFilter,
    t0: Instant,
}

impl ConsoleLogger {
    #[must_use]
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            t0: Instant::now(),
        }
    }

    fn render(&self, record: &Record<'_>) -> String {
        let ts = fmt_elapsed(self.t0.elapsed().as_secs_f64());
        let lvl = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        format!("[{ts}] {lvl} {}", record.args())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.render(record);
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Installs the console logger; `debug` raises verbosity from Info to Debug.
pub fn init(debug: bool) -> Result<(), SetLoggerError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(level));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

fn fmt_elapsed(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use log::{Level, LevelFilter, Log, Metadata, Record};

    use super::{fmt_elapsed, ConsoleLogger};

    #[test]
    fn elapsed_format() {
        assert_eq!(fmt_elapsed(5.4), "00:05");
        assert_eq!(fmt_elapsed(125.0), "02:05");
        assert_eq!(fmt_elapsed(3725.0), "01:02:05");
    }

    #[test]
    fn level_gate() {
        let logger = ConsoleLogger::new(LevelFilter::Info);
        assert!(!logger.enabled(&Metadata::builder().level(Level::Debug).build()));
        assert!(logger.enabled(&Metadata::builder().level(Level::Info).build()));
        let line = logger.render(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("ready"))
                .build(),
        );
        assert!(line.ends_with("INFO  ready"));
    }
}
