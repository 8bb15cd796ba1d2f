use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{self, Write};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

struct InsightLogger;

static LOGGER: InsightLogger = InsightLogger;
static LOGGING_ENABLED: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));
static LOG_FILE: std::sync::LazyLock<Mutex<Option<std::fs::File>>> =
    std::sync::LazyLock::new(|| Mutex::new(None));

/// Sends log lines to the log file if one is set, otherwise to stderr.
/// Stdout is reserved for reports and the MCP stream.
#[derive(Clone)]
struct UnifiedWriter;

impl UnifiedWriter {
    fn emit(buf: &[u8]) {
        if !*LOGGING_ENABLED.lock() {
            return;
        }
        if let Some(file) = LOG_FILE.lock().as_mut() {
            let _ = file.write_all(buf);
            let _ = file.flush();
            return;
        }
        let _ = io::stderr().write_all(buf);
    }
}

impl Write for UnifiedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Self::emit(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = LOG_FILE.lock().as_mut() {
            let _ = file.flush();
        }
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for UnifiedWriter {
    type Writer = UnifiedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        UnifiedWriter
    }
}

impl log::Log for InsightLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if !*LOGGING_ENABLED.lock() {
            return false;
        }

        if metadata.target().starts_with("insight_agents") {
            return metadata.level() <= Level::Debug;
        }

        if metadata.target().starts_with("rig") {
            return metadata.level() <= Level::Info;
        }

        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let message = format!(
                "{} {} [{}] - {}\n",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );
            UnifiedWriter::emit(message.as_bytes());
        }
    }

    fn flush(&self) {}
}

/// Initialize logging for both `log` and `tracing`.
///
/// With `telemetry` the tracing output is JSON and every closed span
/// (`session`, `turn`, `tool_call`) is reported with its timings.
pub fn init(telemetry: bool) -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::{Once, OnceLock};
    static INIT: Once = Once::new();
    static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "insight_agents=debug,rig=info,warn".into());

        let text_layer = (!telemetry).then(|| {
            fmt::Layer::new()
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(UnifiedWriter)
        });
        let json_layer = telemetry.then(|| {
            fmt::Layer::new()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(UnifiedWriter)
        });

        let tracing_result = Registry::default()
            .with(env_filter)
            .with(text_layer)
            .with(json_layer)
            .try_init();

        let log_result = log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug));

        let result = match (tracing_result, log_result) {
            // Either half is enough: tracing forwards `log` records when it owns the logger
            (Ok(()), _) | (Err(_), Ok(())) => Ok(()),
            (Err(tracing_err), Err(log_err)) => Err(format!(
                "Failed to initialize logging: tracing={tracing_err}, log={log_err}"
            )),
        };

        let _ = INIT_RESULT.set(result);
    });

    if telemetry {
        enable_logging();
    }

    match INIT_RESULT.get() {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(e.clone().into()),
        None => Err("Initialization failed unexpectedly".into()),
    }
}

pub fn enable_logging() {
    *LOGGING_ENABLED.lock() = true;
}

pub fn set_log_file(file_path: &str) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;

    *LOG_FILE.lock() = Some(file);
    Ok(())
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}
