//! Logging for the localengine crates.
//!
//! Every crate in the workspace logs through the macros exported here, so a
//! single set of environment variables controls verbosity for the whole
//! engine, including the background refresher.
//!
//! # Usage
//!
//! ```rust
//! use localengine_log::{debug, info, warn, error, trace};
//!
//! info!("Engine started with default locale {}", "en-US");
//! debug!(target: "localengine::cache", "Installed entry for {}", "es-ES");
//! warn!("Background refresh of {} failed", "fr-FR");
//! ```
//!
//! # Environment Variables
//!
//! - `LOCALENGINE_DEBUG=1` - Enable debug logging
//! - `LOCALENGINE_LOG_LEVEL=trace|debug|info|warn|error|off` - Minimum level
//! - `LOCALENGINE_LOG_FORMAT=pretty|compact|json` - Output format
//! - `LOCALENGINE_LOG_TIMESTAMPS=1|0` - Prefix records with a timestamp
//! - `LOCALENGINE_LOG_MODULE=1|0` - Include the emitting module path

use once_cell::sync::Lazy;
use std::env;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

const ENV_PREFIX: &str = "LOCALENGINE";

// ============================================================================
// Log Levels
// ============================================================================

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Upper-case level name as printed in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable, one record per line with full timestamp
    Pretty,
    /// Short single-line format
    Compact,
    /// One JSON object per line
    Json,
}

impl FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration, read once from the environment.
#[derive(Debug)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include module path
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            timestamps: true,
            module_path: true,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

fn env_flag(name: &str) -> Option<bool> {
    env_var(name).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    /// Build the configuration from `LOCALENGINE_*` variables and publish
    /// the level to the global atomics the macros consult.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("DEBUG").unwrap_or(defaults.debug);

        let level = env_var("LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        let format = env_var("LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.format);

        let config = Self {
            debug,
            level,
            format,
            timestamps: env_flag("LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
            module_path: env_flag("LOG_MODULE").unwrap_or(defaults.module_path),
        };

        DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
        LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);

        config
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Eagerly read the environment configuration.
///
/// The first macro invocation, level check or runtime override does this
/// implicitly.
#[inline]
pub fn init() {
    Lazy::force(&CONFIG);
}

/// Check if debug logging is enabled.
#[inline]
pub fn is_debug_enabled() -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Check if a log level is enabled.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Current minimum level.
pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Change the minimum level at runtime.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Enable or disable debug mode at runtime.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        LOG_LEVEL.store(Level::Debug as u8, Ordering::SeqCst);
    }
}

/// The environment configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Log Output
// ============================================================================

/// Emit a record. Called by the macros; not meant for direct use.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    let config = config();
    if !is_level_enabled(level) {
        return;
    }

    match config.format {
        Format::Pretty => write_text(level, target, message, config, "%Y-%m-%d %H:%M:%S%.3f"),
        Format::Compact => write_text(level, target, message, config, "%H:%M:%S"),
        Format::Json => write_json(level, target, message),
    }
}

fn write_text(level: Level, target: &str, message: &str, config: &LogConfig, clock: &str) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let _ = write!(stderr, "{} ", chrono::Local::now().format(clock));
    }

    let _ = write!(stderr, "{:5} ", level.as_str());

    if config.module_path && !target.is_empty() {
        let _ = write!(stderr, "[{}] ", target);
    }

    let _ = writeln!(stderr, "{}", message);
}

fn write_json(level: Level, target: &str, message: &str) {
    eprintln!("{}", render_json(level, target, message, &chrono::Utc::now().to_rfc3339()));
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str, timestamp: &str) -> String {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Record<'a> {
        timestamp: &'a str,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let record = Record {
        timestamp,
        level: level.as_str(),
        target,
        message,
    };

    serde_json::to_string(&record).unwrap_or_default()
}

#[cfg(not(feature = "json"))]
fn render_json(level: Level, target: &str, message: &str, timestamp: &str) -> String {
    format!(
        r#"{{"timestamp":"{}","level":"{}","target":{:?},"message":{:?}}}"#,
        timestamp,
        level.as_str(),
        target,
        message
    )
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:expr, $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
}

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Trace, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Trace, module_path!(), $($arg)+)
    };
}

/// Log a debug message.
///
/// Enabled by `LOCALENGINE_DEBUG=1` or `LOCALENGINE_LOG_LEVEL=debug`.
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Debug, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Debug, module_path!(), $($arg)+)
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Info, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Info, module_path!(), $($arg)+)
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Warn, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Warn, module_path!(), $($arg)+)
    };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Error, $target, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__log_at!($crate::Level::Error, module_path!(), $($arg)+)
    };
}
