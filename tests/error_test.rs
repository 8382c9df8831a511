use std::io;

use spice::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid template path".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid template path.");

    let err = Error::PathNotFound {
        path: "context.yaml".to_string(),
    };
    assert_eq!(err.to_string(), "Path 'context.yaml' does not exist.");

    let err = Error::UndefinedVariable {
        template: "index.html".to_string(),
        names: "name".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Undefined variable(s) name in template 'index.html'."
    );
}
