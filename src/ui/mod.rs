//! User facing output.

/// Sink for single-line messages meant for the person running the command.
#[cfg_attr(test, mockall::automock)]
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// Writes messages to stdout.
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("{}", message);
    }
}
