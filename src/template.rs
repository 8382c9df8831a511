//! Template discovery and lookup for spice.
//! Wraps a MiniJinja environment that loads templates lazily from a root
//! directory and fails on any reference to an undefined name.

use minijinja::{AutoEscape, Environment, ErrorKind, Template, UndefinedBehavior};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::context::Context;
use crate::error::{Error, Result};

/// Globals the engine provides on its own; never reported as missing.
const BUILTIN_GLOBALS: [&str; 4] = ["range", "dict", "debug", "namespace"];

/// MiniJinja environment rooted at a template directory.
pub struct TemplateEnvironment {
    root: PathBuf,
    env: Environment<'static>,
}

impl TemplateEnvironment {
    /// Creates an environment loading templates from `root`.
    ///
    /// Undefined names are a hard error and auto-escaping is disabled for
    /// every file type.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let loader_root = root.clone();
        let mut env = Environment::new();
        env.set_loader(move |name| load_source(&loader_root, name));
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { root, env }
    }

    /// Lists every file under the root as a forward-slash identifier, sorted.
    ///
    /// # Errors
    /// * `Error::IoError` if the root cannot be walked
    /// * `Error::TemplateError` if a path is not valid UTF-8
    pub fn list_templates(&self) -> Result<Vec<String>> {
        let mut templates = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            if !entry.path().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::TemplateError(e.to_string()))?;
            templates.push(template_identifier(relative)?);
        }
        templates.sort();
        Ok(templates)
    }

    /// Loads (and compiles) the template with the given identifier.
    pub fn get_template(&self, name: &str) -> Result<Template<'_, '_>> {
        Ok(self.env.get_template(name)?)
    }

    /// Top-level names whose absence from `context` makes `template` fail
    /// with an undefined error, sorted.
    ///
    /// Candidates are the template's undeclared names the context does not
    /// provide. They are confirmed by rendering again with placeholders; a
    /// candidate whose placeholder is not needed to get past the undefined
    /// error is dropped. An empty result means no top-level name is to blame.
    pub fn missing_names(&self, template: &Template<'_, '_>, context: &Context) -> Vec<String> {
        let mut candidates: Vec<String> = template
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| !context.contains(name) && !BUILTIN_GLOBALS.contains(&name.as_str()))
            .collect();
        candidates.sort();

        if candidates.is_empty() || fails_undefined(template, context, &candidates) {
            return Vec::new();
        }

        let mut index = 0;
        while index < candidates.len() {
            let mut without = candidates.clone();
            without.remove(index);
            if fails_undefined(template, context, &without) {
                index += 1;
            } else {
                candidates = without;
            }
        }
        candidates
    }
}

fn fails_undefined(template: &Template<'_, '_>, context: &Context, placeholders: &[String]) -> bool {
    let context = context.with_names(placeholders, Value::String(String::new()));
    matches!(
        template.render_to_write(&context, io::sink()),
        Err(err) if err.kind() == ErrorKind::UndefinedError
    )
}

/// Reads the source of template `name` below `root`.
///
/// Dotfiles are allowed; empty, `.` and `..` segments are not.
fn load_source(root: &Path, name: &str) -> std::result::Result<Option<String>, minijinja::Error> {
    let mut path = root.to_path_buf();
    for segment in name.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Ok(None);
        }
        path.push(segment);
    }

    match fs::read_to_string(&path) {
        Ok(source) => Ok(Some(source)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read template '{}'", name),
        )
        .with_source(err)),
    }
}

/// Converts a root-relative path into a template identifier.
///
/// Identifiers always use `/` as separator, whatever the host OS.
pub fn template_identifier<P: AsRef<Path>>(relative: P) -> Result<String> {
    let relative = relative.as_ref();
    let segments = relative
        .components()
        .map(|component| {
            component.as_os_str().to_str().ok_or_else(|| {
                Error::TemplateError(format!("invalid template path '{}'", relative.display()))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join("/"))
}
