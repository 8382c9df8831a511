//! Context loading for spice.
//! A context definition is read as a JSON/YAML document (or executed as a
//! program when explicitly requested), then filtered down to the names
//! templates are allowed to see.

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Name of the explicit allow-list of exported names.
pub const EXPORTS_KEY: &str = "__all__";

/// Name listing sibling documents merged into a data context.
pub const INCLUDE_KEY: &str = "_include";

/// Names starting with this prefix are private unless exported.
pub const RESERVED_PREFIX: char = '_';

/// Raw, unfiltered names produced by a context definition, in definition order.
pub type Namespace = IndexMap<String, Value>;

/// The filtered mapping of names to values handed to every template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context(Namespace);

impl Context {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Visible names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy of this context with every name in `names` bound to `value`.
    pub(crate) fn with_names(&self, names: &[String], value: Value) -> Context {
        let mut namespace = self.0.clone();
        for name in names {
            namespace.insert(name.clone(), value.clone());
        }
        Context(namespace)
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Document formats accepted for context definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Tried as JSON first, then as YAML.
    Unknown,
}

impl DocumentFormat {
    /// Picks the format from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Self::Json,
            Some("yml") | Some("yaml") => Self::Yaml,
            _ => Self::Unknown,
        }
    }
}

/// Parses a context document whose top level must be a mapping.
///
/// An empty (or whitespace-only) document yields an empty namespace.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Namespace> {
    if content.trim().is_empty() {
        return Ok(Namespace::new());
    }

    match format {
        DocumentFormat::Json => serde_json::from_str(content)
            .map_err(|e| Error::ContextError(format!("invalid JSON document: {}", e))),
        DocumentFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| Error::ContextError(format!("invalid YAML document: {}", e))),
        DocumentFormat::Unknown => match serde_json::from_str(content) {
            Ok(namespace) => Ok(namespace),
            Err(_) => serde_yaml::from_str(content)
                .map_err(|e| Error::ContextError(format!("invalid context document: {}", e))),
        },
    }
}

/// Trait for turning a context-definition unit into a raw namespace.
pub trait ContextReader {
    /// Reads the unit at `path`.
    ///
    /// # Errors
    /// * `Error::IoError` if the unit cannot be found or read
    /// * `Error::ContextError` if the unit is malformed or its evaluation fails
    fn read(&self, path: &Path) -> Result<Namespace>;
}

/// Reads declarative JSON/YAML context documents.
///
/// Sibling documents listed under `_include` are resolved relative to the
/// directory of the document that lists them and merged before its own
/// entries, so the including document wins on conflicts.
pub struct DataReader {}

impl DataReader {
    pub fn new() -> Self {
        Self {}
    }

    fn read_document(&self, path: &Path, visiting: &mut Vec<PathBuf>) -> Result<Namespace> {
        let path = fs::canonicalize(path)?;
        if visiting.contains(&path) {
            return Err(Error::ContextError(format!(
                "include cycle through '{}'",
                path.display()
            )));
        }

        debug!("Loading context document {}", path.display());
        let content = fs::read_to_string(&path)?;
        let document = parse_document(&content, DocumentFormat::from_path(&path))?;

        let includes = match document.get(INCLUDE_KEY) {
            Some(value) => name_list(INCLUDE_KEY, value)?,
            None => return Ok(document),
        };

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        visiting.push(path);
        let mut merged = Namespace::new();
        for include in includes {
            let mut included = self.read_document(&base_dir.join(&include), visiting)?;
            // Exports are declared by the top-level document only.
            included.shift_remove(EXPORTS_KEY);
            merged.extend(included);
        }
        visiting.pop();

        merged.extend(document);
        Ok(merged)
    }
}

impl Default for DataReader {
    fn default() -> Self {
        DataReader::new()
    }
}

impl ContextReader for DataReader {
    fn read(&self, path: &Path) -> Result<Namespace> {
        self.read_document(path, &mut Vec::new())
    }
}

/// Executes the context definition as a program and reads its standard output
/// as a context document.
///
/// The program runs with its own directory as working directory, so it can
/// refer to sibling files by relative path. Its stderr is passed through.
pub struct CommandReader {}

impl CommandReader {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for CommandReader {
    fn default() -> Self {
        CommandReader::new()
    }
}

impl ContextReader for CommandReader {
    fn read(&self, path: &Path) -> Result<Namespace> {
        let program = fs::canonicalize(path)?;
        let working_dir = program.parent().map(Path::to_path_buf).unwrap_or_default();

        debug!("Executing context program {}", program.display());
        let output = Command::new(&program)
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()?;

        if !output.status.success() {
            return Err(Error::ContextError(format!(
                "'{}' failed with status: {}",
                program.display(),
                output.status
            )));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            Error::ContextError(format!(
                "output of '{}' is not valid UTF-8: {}",
                program.display(),
                e
            ))
        })?;

        parse_document(&stdout, DocumentFormat::Unknown)
    }
}

fn name_list(key: &str, value: &Value) -> Result<Vec<String>> {
    let invalid = || Error::ContextError(format!("'{}' must be a list of names", key));
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// Applies the visibility rules to a raw namespace.
///
/// If `__all__` is present only the names it lists survive (the declaration
/// itself is dropped). Otherwise every name starting with `_` is dropped.
pub fn filter_namespace(mut namespace: Namespace) -> Result<Context> {
    match namespace.shift_remove(EXPORTS_KEY) {
        Some(exports) => {
            let exports = name_list(EXPORTS_KEY, &exports)?;
            for name in exports.iter().filter(|name| !namespace.contains_key(*name)) {
                debug!("Exported name '{}' is not defined", name);
            }
            let allowed: HashSet<String> = exports.into_iter().collect();
            namespace.retain(|name, _| allowed.contains(name));
        }
        None => namespace.retain(|name, _| !name.starts_with(RESERVED_PREFIX)),
    }

    Ok(Context(namespace))
}

/// Loads and filters the context defined at `path`.
///
/// # Arguments
/// * `reader` - How the context definition is evaluated
/// * `path` - Location of the context definition
///
/// # Returns
/// * `Result<Context>` - The names visible to templates
pub fn load_context<P: AsRef<Path>>(reader: &dyn ContextReader, path: P) -> Result<Context> {
    let namespace = reader.read(path.as_ref())?;
    let context = filter_namespace(namespace)?;
    debug!(
        "Loaded context with names: [{}]",
        context.names().collect::<Vec<_>>().join(", ")
    );
    Ok(context)
}
