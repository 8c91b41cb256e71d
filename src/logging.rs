use log::{debug, error, info, log_enabled, warn, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// The level comes from `RUST_LOG`; nothing is printed when it is unset.
pub fn init_logger() {
    env_logger::init();
}

/// Initializes `env_logger`, falling back to `default_level` when `RUST_LOG`
/// is unset. Safe to call more than once.
///
/// # Examples
/// ```rust
/// use e220_rs::logging::init_logger_with_default;
///
/// init_logger_with_default("debug");
/// log::debug!("Driver starting");
/// ```
pub fn init_logger_with_default(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}
