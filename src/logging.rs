//! Console + optional file logging, filtered by `env_logger`.
//!
//! Console lines: `[2024-01-31 12:00:00.123] [INFO] message`, with the source
//! location added for errors.  Errors go to stderr, everything else to
//! stdout.  The log file gets every line with its source location.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use env_logger::Builder;
use log::{Level, LevelFilter, Log, Metadata, Record};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn location(record: &Record) -> String {
    format!(
        "{}:{}",
        record.file().unwrap_or(record.target()),
        record.line().unwrap_or(0)
    )
}

fn console_line(ts: &str, record: &Record) -> String {
    if record.level() == Level::Error {
        format!("[{ts}] [{}] [{}] {}\n", record.level(), location(record), record.args())
    } else {
        format!("[{ts}] [{}] {}\n", record.level(), record.args())
    }
}

fn file_line(ts: &str, record: &Record) -> String {
    format!("[{ts}] [{}] [{}] {}\n", record.level(), location(record), record.args())
}

/// Routes records that pass the `env_logger` filter to the console and the
/// log file.
struct Router {
    filter: env_logger::Logger,
    file:   Option<Mutex<File>>,
}

impl Log for Router {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.filter.matches(record) {
            return;
        }
        let ts = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let line = console_line(&ts, record);
        let _ = if record.level() == Level::Error {
            io::stderr().write_all(line.as_bytes())
        } else {
            io::stdout().write_all(line.as_bytes())
        };
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.write_all(file_line(&ts, record).as_bytes());
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}

/// Install the global logger.  `RUST_LOG` overrides `level` when set.
///
/// With `log_file`, the file is truncated first.  Calling this twice is
/// harmless; the first logger stays.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> io::Result<()> {
    let filter = Builder::new().filter_level(level).parse_default_env().build();
    let max_level = filter.filter();

    let file = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let f = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
            Some(Mutex::new(f))
        }
        None => None,
    };

    if log::set_boxed_logger(Box::new(Router { filter, file })).is_ok() {
        log::set_max_level(max_level);
    }
    Ok(())
}

/// Map `-v`/`-q` counts onto a level; the default is `Info`.
pub fn level_from_flags(verbose: u8, quiet: u8) -> LevelFilter {
    match verbose as i16 - quiet as i16 {
        i16::MIN..=-3 => LevelFilter::Off,
        -2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
