//! Renders a whole template folder into a target directory.
//!
//! A run is strictly sequential: clear the target, load the context, then
//! render every template to `<target>/<folder>/<identifier>`, where `folder`
//! is the template root's own name. The first failure aborts the run.

use log::debug;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::context::{load_context, Context, ContextReader};
use crate::error::{Error, Result};
use crate::renderer::render_file;
use crate::template::TemplateEnvironment;

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RenderSummary {
    /// `<target>/<folder>`
    pub output_dir: PathBuf,
    /// Identifiers of the rendered templates, in render order.
    pub rendered: Vec<String>,
}

/// One template paired with the file it renders into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub template: String,
    pub output: PathBuf,
}

impl RenderJob {
    pub fn new<P: AsRef<Path>>(target_root: P, folder: &str, template: &str) -> Self {
        Self {
            template: template.to_string(),
            output: resolve_output_path(target_root, folder, template),
        }
    }

    /// Creates the missing parent folders and renders the template.
    pub fn run(&self, environment: &TemplateEnvironment, context: &Context) -> Result<()> {
        ensure_parent_dir(&self.output)?;
        render_file(environment, &self.template, &self.output, context)
    }
}

/// Fails with `Error::PathNotFound` if `path` does not exist.
pub fn ensure_input_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::PathNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Name of the folder the rendered output is nested under: the final
/// segment of the template root as given.
///
/// Only a root without a final name (such as `.` or `..`) is canonicalized.
pub fn template_folder_name<P: AsRef<Path>>(template_root: P) -> Result<String> {
    let template_root = template_root.as_ref();
    if let Some(Component::Normal(name)) = template_root.components().next_back() {
        return name.to_str().map(str::to_string).ok_or_else(|| {
            Error::ConfigError(format!(
                "template path '{}' is not valid UTF-8",
                template_root.display()
            ))
        });
    }

    let template_root = fs::canonicalize(template_root)?;
    template_root
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::ConfigError(format!(
                "template path '{}' has no usable folder name",
                template_root.display()
            ))
        })
}

/// `<target_root>/<folder>/<template>`, splitting the identifier on `/`.
pub fn resolve_output_path<P: AsRef<Path>>(target_root: P, folder: &str, template: &str) -> PathBuf {
    template
        .split('/')
        .fold(target_root.as_ref().join(folder), |path, segment| path.join(segment))
}

/// Removes every immediate child of `target_root`.
///
/// Directories are removed recursively; files and symlinks are unlinked
/// without following them. A missing target is not an error.
pub fn cleanup_target<P: AsRef<Path>>(target_root: P) -> Result<()> {
    let target_root = target_root.as_ref();
    let entries = match fs::read_dir(target_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Target {} does not exist, nothing to remove", target_root.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            debug!("Removing folder: {}", path.display());
            fs::remove_dir_all(&path)?;
        } else {
            debug!("Removing file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            debug!("Creating folder: {}", parent.display());
        }
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

// Cleanup would destroy inputs that live inside the target.
fn ensure_outside_target(input: &Path, target_root: &Path) -> Result<()> {
    let Ok(target_root) = fs::canonicalize(target_root) else {
        return Ok(());
    };
    let input = fs::canonicalize(input)?;
    if input.starts_with(&target_root) {
        return Err(Error::ConfigError(format!(
            "'{}' lies inside the target directory '{}'",
            input.display(),
            target_root.display()
        )));
    }
    Ok(())
}

/// Renders every template under `template_root` into `target_root`.
///
/// # Arguments
/// * `reader` - How the context definition is evaluated
/// * `template_root` - Directory containing the templates
/// * `context_path` - Context definition
/// * `target_root` - Directory whose contents are replaced by the output
///
/// # Returns
/// * `Result<RenderSummary>` - Where the output went and what was rendered
///
/// # Flow
/// 1. Validates the input paths
/// 2. Removes every immediate child of the target
/// 3. Loads the context and builds the template environment
/// 4. Renders each template, creating parent folders as needed
pub fn render_folder<P, C, T>(
    reader: &dyn ContextReader,
    template_root: P,
    context_path: C,
    target_root: T,
) -> Result<RenderSummary>
where
    P: AsRef<Path>,
    C: AsRef<Path>,
    T: AsRef<Path>,
{
    let template_root = template_root.as_ref();
    let context_path = context_path.as_ref();
    let target_root = target_root.as_ref();

    ensure_input_path(template_root)?;
    if !template_root.is_dir() {
        return Err(Error::ConfigError(format!(
            "template path '{}' is not a directory",
            template_root.display()
        )));
    }
    ensure_input_path(context_path)?;
    ensure_outside_target(template_root, target_root)?;
    ensure_outside_target(context_path, target_root)?;
    let folder = template_folder_name(template_root)?;

    cleanup_target(target_root)?;

    let context = load_context(reader, context_path)?;
    let environment = TemplateEnvironment::new(template_root);

    let output_dir = target_root.join(&folder);
    fs::create_dir_all(&output_dir)?;

    let mut rendered = Vec::new();
    for template in environment.list_templates()? {
        let job = RenderJob::new(target_root, &folder, &template);
        job.run(&environment, &context)?;
        rendered.push(job.template);
    }

    Ok(RenderSummary {
        output_dir,
        rendered,
    })
}
