use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;
use syslog::{Facility, Formatter3164, LoggerBackend};

/// Environment variable that overrides the verbosity-derived filter.
pub const LOG_ENV: &str = "SWARM_LOG";

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// The local syslog socket
    Syslog,
    Stderr,
    File(String),
}

impl LogTarget {
    /// No `--log` means syslog; `-` and `stderr` mean standard error;
    /// anything else is a file.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => LogTarget::Syslog,
            Some("-") | Some("stderr") => LogTarget::Stderr,
            Some(path) => LogTarget::File(path.to_string()),
        }
    }
}

/// Map `--verbosity` (0..=3) to a level filter.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn format_record(record: &Record<'_>) -> String {
    format!("{}: {}", record.level(), record.args())
}

fn builder(verbosity: u8) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for_verbosity(verbosity))
        .format(|buf, record| writeln!(buf, "{}", format_record(record)));

    if let Ok(filter) = std::env::var(LOG_ENV) {
        builder.parse_filters(&filter);
    }
    builder
}

/// Sends records through the env_logger filter to syslog.
struct SyslogLogger {
    filter: env_logger::Logger,
    writer: Mutex<syslog::Logger<LoggerBackend, Formatter3164>>,
}

impl Log for SyslogLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.filter.matches(record) {
            return;
        }
        let message = format_record(record);
        if let Ok(mut writer) = self.writer.lock() {
            // Nowhere left to report a failed send
            let _ = match record.level() {
                Level::Error => writer.err(message),
                Level::Warn => writer.warning(message),
                Level::Info => writer.info(message),
                Level::Debug | Level::Trace => writer.debug(message),
            };
        }
    }

    fn flush(&self) {}
}

fn connect_syslog() -> std::result::Result<syslog::Logger<LoggerBackend, Formatter3164>, String> {
    let formatter = Formatter3164 {
        facility: Facility::LOG_DAEMON,
        hostname: None,
        process: "swarm".to_string(),
        pid: std::process::id(),
    };
    syslog::unix(formatter).map_err(|err| err.to_string())
}

/// Install the global logger. Records are written as `LEVEL: message`.
///
/// Without a syslog socket the records go to standard error instead, with
/// a warning saying so.
pub fn init(verbosity: u8, target: &LogTarget) -> Result<()> {
    let mut builder = builder(verbosity);

    match target {
        LogTarget::Syslog => match connect_syslog() {
            Ok(writer) => {
                let filter = builder.build();
                log::set_max_level(filter.filter());
                return log::set_boxed_logger(Box::new(SyslogLogger {
                    filter,
                    writer: Mutex::new(writer),
                }))
                .context("Failed to initialise logging");
            }
            Err(err) => {
                builder.try_init().context("Failed to initialise logging")?;
                log::warn!("syslog unavailable ({}), logging to stderr", err);
                return Ok(());
            }
        },
        LogTarget::Stderr => {}
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    builder.try_init().context("Failed to initialise logging")
}
