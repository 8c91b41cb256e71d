//! Unit tests for the logging functionality in the `e220-rs` crate.

use e220_rs::logging::{init_logger_with_default, log_debug, log_error, log_info, log_warn};

/// Tests that the logging helpers work as expected before and after init.
#[test]
fn test_logging() {
    // Just ensure logging functions do not panic without a logger.
    log_error("This is an error message");
    log_warn("This is a warning message");
    log_info("This is an info message");
    log_debug("This is a debug message");
}

/// Tests that the logger can be initialized more than once.
#[test]
fn test_init_logger_twice() {
    init_logger_with_default("info");
    init_logger_with_default("trace");
    log::trace!("still running");
}
