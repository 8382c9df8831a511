//! Command-line interface implementation for spice.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for spice.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render templates with given context into target folder",
    long_about = None
)]
pub struct Args {
    /// The directory containing the templates to use
    #[arg(value_name = "TEMPLATE_PATH")]
    pub template_path: PathBuf,

    /// The path to the JSON or YAML document defining the context
    #[arg(value_name = "CONTEXT_PATH")]
    pub context_path: PathBuf,

    /// The directory where the rendered files will be stored.
    /// Everything already inside it is removed first.
    #[arg(value_name = "TARGET_PATH")]
    pub target_path: PathBuf,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Execute CONTEXT_PATH as a program and read the context from its output.
    /// Only use this with context programs you trust.
    #[arg(long)]
    pub exec_context: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
