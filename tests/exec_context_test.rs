#![cfg(unix)]

use serde_json::json;
use spice::context::{load_context, CommandReader};
use spice::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

fn write_program(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_command_reader() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("name.txt"), "World").unwrap();

    // Runs from its own directory, so sibling files resolve relatively.
    let program = temp_dir.path().join("context.sh");
    write_program(
        &program,
        "#!/bin/sh\nprintf '{\"name\": \"%s\", \"_hidden\": 1}' \"$(cat name.txt)\"\n",
    );
    let context = load_context(&CommandReader::new(), &program).unwrap();
    assert_eq!(context.names().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(context.get("name"), Some(&json!("World")));

    let failing = temp_dir.path().join("failing.sh");
    write_program(&failing, "#!/bin/sh\nexit 3\n");
    let result = load_context(&CommandReader::new(), &failing);
    assert!(matches!(result, Err(Error::ContextError(_))));
}
