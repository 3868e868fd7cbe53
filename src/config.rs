//! Generation configuration
//!
//! A `Config` can be loaded from a YAML or JSON file (conventionally
//! `mocker.yaml` next to the destination) and overridden from the command
//! line. Every field has a plain default: empty prefix and suffix, no
//! interfaces selected, and an empty destination module.

use crate::error::{Error, Result};
use crate::imports::is_go_reserved;
use crate::util::is_identifier;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up by the CLI
pub const CONFIG_FILE: &str = "mocker.yaml";

/// Settings for one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Package clause of the generated file; defaults to the model's name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    /// Prepended to each interface name to form the mock type name
    pub prefix: String,

    /// Appended to each interface name to form the mock type name
    pub suffix: String,

    /// Import path the generated file belongs to; its types are unqualified
    pub destination_module: String,

    /// Import path of the parsed source package, used for its unqualified types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_module: Option<String>,

    /// Interfaces to generate mocks for
    pub include: Vec<String>,

    /// Source file named in the generated header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,

    /// How the raw output is canonicalized
    pub formatter: FormatterKind,

    /// Directory holding a `mock.go.jinja` that replaces the embedded template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
}

/// Output canonicalizer selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// Built-in syntax check and whitespace normalization
    #[default]
    Builtin,
    /// External `gofmt` binary
    Gofmt,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub package_name: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub destination_module: Option<String>,
    pub source_module: Option<String>,
    pub include: Option<Vec<String>>,
    pub source_path: Option<String>,
    pub formatter: Option<FormatterKind>,
    pub template_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(include: Vec<String>) -> Self {
        Self {
            include,
            ..Self::default()
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a file; `.json` is read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        };
        parsed.map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `mocker.yaml` from `dir` if present.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let file = dir.join(CONFIG_FILE);
        if !file.exists() {
            return Ok(None);
        }
        Self::load(&file).map(Some)
    }

    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if overrides.package_name.is_some() {
            self.package_name = overrides.package_name;
        }
        if let Some(prefix) = overrides.prefix {
            self.prefix = prefix;
        }
        if let Some(suffix) = overrides.suffix {
            self.suffix = suffix;
        }
        if let Some(dest) = overrides.destination_module {
            self.destination_module = dest;
        }
        if overrides.source_module.is_some() {
            self.source_module = overrides.source_module;
        }
        if let Some(include) = overrides.include {
            self.include = include;
        }
        if overrides.source_path.is_some() {
            self.source_path = overrides.source_path;
        }
        if let Some(formatter) = overrides.formatter {
            self.formatter = formatter;
        }
        if overrides.template_dir.is_some() {
            self.template_dir = overrides.template_dir;
        }
        self
    }

    /// The mock type name for an interface.
    pub fn mock_name(&self, interface: &str) -> String {
        format!("{}{}{}", self.prefix, interface, self.suffix)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(pkg) = &self.package_name {
            validate_package_name(pkg)?;
        }
        if !self.prefix.is_empty() && !is_identifier(&self.prefix) {
            return Err(Error::Config(format!(
                "prefix '{}' cannot start an identifier",
                self.prefix
            )));
        }
        if !self.suffix.is_empty() && !is_identifier(&format!("_{}", self.suffix)) {
            return Err(Error::Config(format!(
                "suffix '{}' contains characters not allowed in an identifier",
                self.suffix
            )));
        }
        for name in &self.include {
            if !is_identifier(name) {
                return Err(Error::Config(format!("invalid interface name '{}'", name)));
            }
        }
        Ok(())
    }
}

fn validate_package_name(name: &str) -> Result<()> {
    if name.contains('.') || name.contains('/') {
        return Err(Error::Config(format!(
            "package name must be a single identifier without dots: '{}'",
            name
        )));
    }
    if !is_identifier(name) {
        return Err(Error::Config(format!("invalid package name '{}'", name)));
    }
    if is_go_reserved(name) {
        return Err(Error::Config(format!(
            "'{}' is a reserved word in Go",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_empty() {
        let config = Config::from_yaml("include: [Greeter]").unwrap();
        assert_eq!(config.prefix, "");
        assert_eq!(config.suffix, "");
        assert_eq!(config.destination_module, "");
        assert_eq!(config.formatter, FormatterKind::Builtin);
        assert_eq!(config.mock_name("Greeter"), "Greeter");
    }

    #[test]
    fn test_merge_overrides_win() {
        let file = Config::from_yaml(
            r#"
prefix: Fake
include: [A, B]
formatter: gofmt
"#,
        )
        .unwrap();
        let merged = file.merge(ConfigOverrides {
            prefix: Some("Mock".into()),
            include: Some(vec!["C".into()]),
            ..Default::default()
        });
        assert_eq!(merged.prefix, "Mock");
        assert_eq!(merged.include, vec!["C".to_string()]);
        // Inherited from file
        assert_eq!(merged.formatter, FormatterKind::Gofmt);
    }

    #[test]
    fn test_mock_name() {
        let config = Config {
            prefix: "Mock".into(),
            suffix: "Impl".into(),
            ..Default::default()
        };
        assert_eq!(config.mock_name("Store"), "MockStoreImpl");
    }

    #[test]
    fn test_validate() {
        assert!(Config::new(vec!["Greeter".into()]).validate().is_ok());

        let bad_pkg = Config {
            package_name: Some("func".into()),
            ..Default::default()
        };
        assert!(bad_pkg.validate().is_err());

        let bad_prefix = Config {
            prefix: "1Mock".into(),
            ..Default::default()
        };
        assert!(bad_prefix.validate().is_err());

        let numeric_suffix = Config {
            suffix: "2".into(),
            ..Default::default()
        };
        assert!(numeric_suffix.validate().is_ok());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), "prefix: Mock\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.prefix, "Mock");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
