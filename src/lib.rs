//! spice renders a folder of templates with a context into a target folder.
//! The output mirrors the template folder, nested under a subfolder named
//! after it.

/// Command-line interface module for the spice application
pub mod cli;

/// Context loading and name filtering
/// Supports JSON and YAML documents, and executable context programs on request
pub mod context;

/// Error types and handling for the spice application
pub mod error;

/// Logger setup
pub mod logger;

/// Folder rendering orchestration
/// Clears the target and renders every template into it
pub mod processor;

/// Single file rendering
pub mod renderer;

/// Template discovery and lookup
pub mod template;
