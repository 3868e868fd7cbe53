//! Source parsing via tree-sitter
//!
//! Builds a `Package` model straight from Go source so a model file does not
//! have to be written by hand. Only interface declarations are extracted.

mod go;

pub use go::{guess_package_name, parse_go_source};

use crate::error::{Error, Result};
use crate::model::Package;
use std::path::Path;
use tree_sitter::Node;

/// How parsed source relates to the import graph
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Import path of the parsed package; types declared in the file are
    /// qualified with it. `None` leaves them in the unnamed package.
    pub package_path: Option<String>,
}

/// Read and parse a Go file.
pub fn parse_go_file(path: &Path, options: &SourceOptions) -> Result<Package> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| Error::ModelLoad(format!("{}: {}", path.display(), e)))?;
    parse_go_source(&source, options).map_err(|e| at_path(path, e))
}

/// Load a model from disk: `.go` files are parsed, `.json` read as JSON and
/// anything else as YAML.
pub fn load_package(path: &Path, options: &SourceOptions) -> Result<Package> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("go") => parse_go_file(path, options),
        ext => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::ModelLoad(format!("{}: {}", path.display(), e)))?;
            let pkg = if ext == Some("json") {
                Package::from_json(&content)
            } else {
                Package::from_yaml(&content)
            };
            pkg.map_err(|e| at_path(path, e))
        }
    }
}

fn at_path(path: &Path, err: Error) -> Error {
    match err {
        Error::ModelLoad(msg) => Error::ModelLoad(format!("{}: {}", path.display(), msg)),
        other => other,
    }
}

fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_package_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let go = dir.path().join("greeter.go");
        fs::write(
            &go,
            "package greet\n\ntype Greeter interface {\n\tHello(name string) string\n}\n",
        )
        .unwrap();
        let pkg = load_package(&go, &SourceOptions::default()).unwrap();
        assert_eq!(pkg.interfaces[0].name, "Greeter");

        let yaml = dir.path().join("model.yaml");
        fs::write(&yaml, "name: greet\ninterfaces:\n  - name: Empty\n").unwrap();
        let pkg = load_package(&yaml, &SourceOptions::default()).unwrap();
        assert_eq!(pkg.name, "greet");
        assert!(pkg.interfaces[0].methods.is_empty());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load_package(Path::new("/nonexistent/x.go"), &SourceOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::ModelLoadFailed);
        assert!(err.to_string().contains("x.go"));
    }
}
