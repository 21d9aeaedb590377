//! Logging infrastructure - structured tracing for the closure runtime
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable level, format and destination
//! - Zero-cost when disabled (accessor hot paths never log)
//! - Non-blocking output through `tracing-appender`

use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::error::MarshalError;
use crate::platform::Platform;
use crate::types::CallContext;
use crate::word::NativeWordIo;

/// Set on the first init attempt; `true` only if our subscriber became the
/// global default.
static LOGGER: OnceCell<bool> = OnceCell::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Single file, no rotation
    File { directory: PathBuf, file_name: String },
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Show span events (new/close)
    pub span_events: bool,
    /// Extra filter directives, e.g. "ffi_closure_buffer=trace"
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // FFI_CLOSURE_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("FFI_CLOSURE_LOG_LEVEL") {
            config.level = parse_level(&level_str).unwrap_or(Level::INFO);
        }

        // FFI_CLOSURE_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("FFI_CLOSURE_LOG_FILE") {
            let path = PathBuf::from(path);
            let directory = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "ffi_closure.log".to_string());
            config.output = LogOutput::File { directory, file_name };
        }

        if std::env::var("FFI_CLOSURE_LOG_JSON").is_ok() {
            config.format = LogFormat::Json;
        }

        config.span_events = std::env::var("FFI_CLOSURE_LOG_SPANS").is_ok();

        config
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ffi_closure_buffer={}",
            config.level.as_str().to_lowercase()
        ))
    });

    match &config.filter {
        Some(directives) => directives
            .split(',')
            .filter_map(|directive| directive.trim().parse().ok())
            .fold(base, |filter, directive| filter.add_directive(directive)),
        None => base,
    }
}

fn span_events(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// Initialize logging from the environment.
///
/// See `init_with_config` for the returned guard.
pub fn init() -> Option<WorkerGuard> {
    init_with_config(LogConfig::from_env())
}

/// Initialize logging with custom configuration.
///
/// Returns a `WorkerGuard` when this call installed the global subscriber.
/// Keep it alive for as long as logging is wanted and drop it before the
/// process exits; dropping it flushes buffered lines to the output.
/// Later calls, or a call made while another subscriber already owns the
/// global slot, return `None`.
pub fn init_with_config(config: LogConfig) -> Option<WorkerGuard> {
    let mut installed = None;

    LOGGER.get_or_init(|| {
        let filter = build_filter(&config);
        let (writer, guard) = match &config.output {
            LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
            LogOutput::File { directory, file_name } => {
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
            }
        };

        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(span_events(config.span_events))
            .with_target(true)
            .with_thread_ids(cfg!(debug_assertions))
            .with_line_number(cfg!(debug_assertions));

        let layer = match config.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Json => layer.json().boxed(),
        };

        // The host application may already own the global slot
        let ok = tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_ok();
        if ok {
            installed = Some(guard);
        }
        ok
    });

    installed
}

/// Whether this crate's subscriber is the global default.
///
/// Stays `false` if init was attempted while another subscriber was
/// already installed.
pub fn is_initialized() -> bool {
    LOGGER.get().copied().unwrap_or(false)
}

// ============================================================================
// Closure runtime events
// ============================================================================

/// Log the one-time platform and word accessor selection
pub fn log_platform_selected(platform: &Platform, word: NativeWordIo) {
    use tracing::info;
    info!(
        event = "platform_selected",
        address_bits = platform.address_size().bits(),
        address_mask = platform.address_mask(),
        word_width = word.width(),
        "Closure marshalling platform selected"
    );
}

/// Log entry into a closure from native code
#[inline]
pub fn log_closure_invoke(context: &CallContext) {
    use tracing::trace;
    trace!(
        event = "closure_invoke",
        params = context.parameter_count(),
        return_type = %context.return_type(),
        convention = ?context.convention(),
        "Closure invoked"
    );
}

/// Log return from a closure back to native code
#[inline]
pub fn log_closure_return(context: &CallContext) {
    use tracing::trace;
    trace!(
        event = "closure_return",
        return_type = %context.return_type(),
        "Closure returned"
    );
}

/// Log a contract violation caught by the validated buffer
pub fn log_contract_violation(error: &MarshalError) {
    use tracing::warn;
    warn!(
        event = "contract_violation",
        error = %error,
        "Closure buffer contract violation"
    );
}
