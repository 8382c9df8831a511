//! Renders a single template into a single output file.

use log::debug;
use minijinja::ErrorKind;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::template::TemplateEnvironment;

/// Renders template `name` into `output`, streaming instead of building the
/// whole result in memory.
///
/// The output file is created or truncated before rendering starts, so a
/// failed render leaves an incomplete file behind.
///
/// # Errors
/// * `Error::UndefinedVariable` if the template uses names absent from `context`
/// * `Error::MinijinjaError` for syntax, render and write failures
/// * `Error::IoError` if the output file cannot be created or flushed
pub fn render_file<P: AsRef<Path>>(
    environment: &TemplateEnvironment,
    name: &str,
    output: P,
    context: &Context,
) -> Result<()> {
    let output = output.as_ref();
    let template = environment.get_template(name)?;

    debug!("Generating file: {}", output.display());
    let mut writer = BufWriter::new(File::create(output)?);

    if let Err(err) = template.render_to_write(context, &mut writer) {
        if err.kind() == ErrorKind::UndefinedError {
            let missing = environment.missing_names(&template, context);
            if !missing.is_empty() {
                return Err(Error::UndefinedVariable {
                    template: name.to_string(),
                    names: missing.join(", "),
                });
            }
        }
        return Err(err.into());
    }

    writer.flush()?;
    Ok(())
}
