//! Error handling for spice.
//! Defines the error type and result alias used throughout the application.

use std::io;
use thiserror::Error;

/// Errors that can abort a render run.
///
/// Every variant is fatal: nothing is retried or recovered locally.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// A required input path is missing
    #[error("Path '{path}' does not exist.")]
    PathNotFound { path: String },

    /// Represents invalid command-line input or unusable input paths
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents failures while loading or evaluating the context definition
    #[error("Context error: {0}.")]
    ContextError(String),

    /// Represents errors while discovering templates
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Errors raised by the template engine (syntax errors, render and write failures)
    #[error("Template error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// A template referenced names that are absent from the context
    #[error("Undefined variable(s) {names} in template '{template}'.")]
    UndefinedVariable { template: String, names: String },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
