// Logging for Conveyor
//
// This module provides a unified logging interface for the conveyor work
// queue, built on top of the `tracing` ecosystem.
//
// # Usage Examples
//
// ## Basic Initialization
//
// ```rust
// use conveyor::logging;
//
// // Initialize with default settings (INFO level, console output)
// logging::init_default();
//
// // Or initialize with custom settings
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     json_format: false,
//     ..Default::default()
// };
// logging::init(config);
// ```
//
// ## Worker Threads
//
// The global subscriber does not automatically follow a thread spawned
// with `std::thread`. The pool captures the current dispatcher via
// `current_subscriber()` and installs it in every worker thread, so worker
// logs land in the same place as the host's.

use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the conveyor logging setup.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            target_filters: None,
        }
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

/// Initialize the logging system with the given configuration.
///
/// Sets up the global tracing subscriber. Safe to call multiple times;
/// only the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

        if let Some(filters) = config.target_filters {
            for filter in filters.split(',') {
                if let Ok(directive) = filter.parse() {
                    env_filter = env_filter.add_directive(directive);
                }
            }
        }

        let fmt_layer = fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info)
            .with_thread_ids(config.show_thread_info);

        let registry = tracing_subscriber::registry().with(env_filter);

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(registry.with(fmt::layer().json().flatten_event(true)))
        } else {
            Box::new(registry.with(fmt_layer))
        };

        set_global_subscriber(subscriber);
    });
}

fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Initialize with defaults: INFO level, human-readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// Initialize for development: DEBUG level overall, TRACE for the pool
/// internals, colored output with file/line information.
pub fn init_development() {
    let config = LogConfig {
        level: Level::DEBUG,
        json_format: false,
        show_file_line: true,
        show_thread_info: true,
        target_filters: Some("conveyor=debug,conveyor::pool=trace".to_string()),
    };
    init(config);
}

/// Initialize for production: INFO level, JSON output for log aggregators,
/// no file/line information.
pub fn init_production() {
    let config = LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: true,
        target_filters: None,
    };
    init(config);
}

/// Initialize for tests: warnings and errors only, no thread noise.
pub fn init_test() {
    let config = LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        target_filters: None,
    };
    init(config);
}

/// Get the current tracing dispatcher.
///
/// Worker threads are plain `std::thread`s, so they need the dispatcher
/// installed explicitly to log through the host's subscriber:
///
/// ```rust
/// use conveyor::logging;
/// use std::thread;
///
/// logging::init_default();
/// let dispatcher = logging::current_subscriber();
/// thread::spawn(move || {
///     let _guard = tracing::dispatcher::set_default(&dispatcher);
///     tracing::info!("worker thread started");
/// });
/// ```
#[inline]
pub fn current_subscriber() -> tracing::Dispatch {
    tracing::dispatcher::get_default(|d| d.clone())
}

/// Create a span covering one worker's loop.
///
/// ```rust
/// let span = conveyor::worker_span!(3);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! worker_span {
    ($worker_id:expr) => {
        tracing::debug_span!("worker", id = $worker_id)
    };
    ($worker_id:expr, $($fields:tt)*) => {
        tracing::debug_span!("worker", id = $worker_id, $($fields)*)
    };
}

/// Log pool lifecycle events.
///
/// ```rust
/// conveyor::log_pool!("started", pool_size = 4);
/// ```
#[macro_export]
macro_rules! log_pool {
    ($event:expr) => {
        tracing::info!(event = $event);
    };
    ($event:expr, $($fields:tt)*) => {
        tracing::info!(event = $event, $($fields)*);
    };
}

// Re-export the most commonly used tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
