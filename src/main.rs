//! spice's main application entry point.

use log::info;
use spice::{
    cli::{get_args, Args},
    context::{CommandReader, ContextReader, DataReader},
    error::{default_error_handler, Result},
    logger::init_logger,
    processor::render_folder,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Picks how the context definition is evaluated
/// 2. Clears the target and renders every template into it
fn run(args: Args) -> Result<()> {
    let reader: Box<dyn ContextReader> = if args.exec_context {
        Box::new(CommandReader::new())
    } else {
        Box::new(DataReader::new())
    };

    let summary = render_folder(
        &*reader,
        &args.template_path,
        &args.context_path,
        &args.target_path,
    )?;

    info!(
        "Rendered {} template(s) into {}.",
        summary.rendered.len(),
        summary.output_dir.display()
    );
    Ok(())
}
