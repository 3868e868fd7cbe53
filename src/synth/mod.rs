//! Mock synthesis
//!
//! For each selected interface the synthesizer emits one mock type holding,
//! per method, a stub slot (`<M>Func`), a dedicated mutex (`lock<M>`) and a
//! call log (`calls.<M>`), followed by the forwarding method, the
//! `<M>Called` and `<M>Calls` accessors and a single `Reset`.
//!
//! Locking is per method and per instance: calls to different methods never
//! contend, calls to the same method serialize and each append completes
//! before the lock is released. Stub assignment is not synchronized; the
//! generated doc comment tells users to configure stubs before sharing.
//!
//! ```rust,ignore
//! use mocker::{generate, Config, Package};
//!
//! let pkg = Package::from_yaml(&std::fs::read_to_string("model.yaml")?)?;
//! let mut config = Config::new(vec!["Greeter".into()]);
//! config.prefix = "Mock".into();
//! let go_source = generate(&pkg, &config)?;
//! ```

pub mod context;

pub use context::{
    missing_stub_message, FieldContext, FileContext, ImportContext, MethodContext, MockContext,
};

use tracing::{debug, info_span};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::canonicalizer_for;
use crate::idents::GO_PREDECLARED;
use crate::imports::{allocate, GoKeywords, ReservedWords, SYNC_MODULE};
use crate::model::{modules_of, Package};
use crate::templates::render_mock_file;
use context::{mock_context, Scope};

/// First header line; matches Go's generated-code convention.
pub const GENERATED_HEADER: &str = "Code generated by mocker. DO NOT EDIT.";

/// Synthesize and canonicalize the mock file for `pkg`.
pub fn generate(pkg: &Package, config: &Config) -> Result<String> {
    let raw = Synthesizer::new(config).synthesize(pkg)?;
    Ok(canonicalizer_for(config.formatter).canonicalize(&raw)?)
}

/// Builds mock source text from a package model
pub struct Synthesizer<'a> {
    config: &'a Config,
    reserved: &'a dyn ReservedWords,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            reserved: &GoKeywords,
        }
    }

    /// Use a different reserved-word set for alias allocation.
    pub fn with_reserved(config: &'a Config, reserved: &'a dyn ReservedWords) -> Self {
        Self { config, reserved }
    }

    /// Derive everything the template needs.
    pub fn build_context(&self, pkg: &Package) -> Result<FileContext> {
        self.config.validate()?;
        pkg.validate(self.reserved)?;

        let destination = self.config.destination_module.as_str();
        let selected = pkg.select(&self.config.include);
        for name in &self.config.include {
            if pkg.get_interface(name).is_none() {
                debug!(interface = %name, "requested interface not in model, skipping");
            }
        }

        // An alias must not shadow a builtin the generated bodies rely on
        let reserved = self.reserved;
        let avoid = |ident: &str| reserved.is_reserved(ident) || GO_PREDECLARED.contains(&ident);
        let plan = allocate(&modules_of(selected.iter().copied()), destination, &avoid);
        let scope = Scope {
            plan: &plan,
            destination,
        };

        // Mocks land next to the interfaces when the output shares their package
        let same_package = pkg.path.as_deref().map_or(true, |path| path == destination);

        let mut mocks = Vec::with_capacity(selected.len());
        for intf in &selected {
            let name = self.config.mock_name(&intf.name);
            if same_package && pkg.get_interface(&name).is_some() {
                return Err(Error::MockRedeclared {
                    mock: name,
                    package: pkg.name.clone(),
                });
            }
            debug!(interface = %intf.name, mock = %name, methods = intf.methods.len(), "synthesizing mock");
            mocks.push(mock_context(&scope, &name, intf)?);
        }

        // `sync` is only referenced through method locks
        let uses_sync = mocks.iter().any(|m| !m.methods.is_empty());
        let imports = plan
            .imports()
            .into_iter()
            .filter(|i| uses_sync || i.path != SYNC_MODULE)
            .map(|i| ImportContext {
                alias: i.alias,
                path: i.path,
            })
            .collect();

        let mut header = vec![GENERATED_HEADER.to_string()];
        if let Some(src) = &self.config.source_path {
            header.push(format!("Source: {}", src));
        }

        Ok(FileContext {
            header,
            package: self
                .config
                .package_name
                .clone()
                .unwrap_or_else(|| pkg.name.clone()),
            imports,
            mocks,
        })
    }

    /// Raw, unformatted source text.
    pub fn synthesize(&self, pkg: &Package) -> Result<String> {
        let _span = info_span!("synthesize", package = %pkg.name).entered();
        let ctx = self.build_context(pkg)?;
        let text = render_mock_file(&ctx, self.config.template_dir.as_deref())?;
        debug!(bytes = text.len(), mocks = ctx.mocks.len(), "rendered mock file");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interface, Method, Type};

    fn greeter() -> Package {
        Package {
            name: "greet".into(),
            path: Some("example.com/greet".into()),
            interfaces: vec![
                Interface::new(
                    "Greeter",
                    vec![
                        Method::new("Hello")
                            .param("name", Type::builtin("string"))
                            .returns(Type::builtin("string")),
                        Method::new("Count").returns(Type::builtin("int")),
                    ],
                ),
                Interface::new("Unused", vec![Method::new("Nope")]),
            ],
        }
    }

    #[test]
    fn test_context_selection_and_naming() {
        let mut config = Config::new(vec!["Greeter".into(), "Missing".into()]);
        config.prefix = "Mock".into();
        let ctx = Synthesizer::new(&config).build_context(&greeter()).unwrap();

        assert_eq!(ctx.package, "greet");
        let names: Vec<&str> = ctx.mocks.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["MockGreeter"]);
        let methods: Vec<&str> = ctx.mocks[0]
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(methods, vec!["Hello", "Count"]);
    }

    #[test]
    fn test_sync_dropped_without_methods() {
        let config = Config::new(vec![]);
        let ctx = Synthesizer::new(&config).build_context(&greeter()).unwrap();
        assert!(ctx.imports.is_empty());
        assert!(ctx.mocks.is_empty());
    }

    #[test]
    fn test_package_name_override_and_header() {
        let config = Config {
            package_name: Some("mocks".into()),
            source_path: Some("greet/greeter.go".into()),
            include: vec!["Greeter".into()],
            ..Default::default()
        };
        let ctx = Synthesizer::new(&config).build_context(&greeter()).unwrap();
        assert_eq!(ctx.package, "mocks");
        assert_eq!(
            ctx.header,
            vec![
                GENERATED_HEADER.to_string(),
                "Source: greet/greeter.go".to_string()
            ]
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            package_name: Some("not a name".into()),
            ..Default::default()
        };
        let err = Synthesizer::new(&config).build_context(&greeter()).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::InvalidConfig);
    }

    #[test]
    fn test_alias_avoids_predeclared_names() {
        let pkg = Package {
            name: "p".into(),
            path: None,
            interfaces: vec![Interface::new(
                "Sizer",
                vec![Method::new("Size").returns(Type::named("example.com/len", "Size"))],
            )],
        };
        let mut config = Config::new(vec!["Sizer".into()]);
        config.prefix = "Mock".into();
        let ctx = Synthesizer::new(&config).build_context(&pkg).unwrap();
        let aliases: Vec<&str> = ctx.imports.iter().map(|i| i.alias.as_str()).collect();
        assert_eq!(aliases, vec!["example_com_len", "sync"]);

        let bare = Package {
            interfaces: vec![Interface::new(
                "Sizer",
                vec![Method::new("Size").returns(Type::named("len", "Size"))],
            )],
            ..pkg
        };
        let ctx = Synthesizer::new(&config).build_context(&bare).unwrap();
        assert_eq!(ctx.imports[0].alias, "len0");
    }

    #[test]
    fn test_mock_named_like_interface_rejected() {
        let mut config = Config::new(vec!["Greeter".into()]);
        config.destination_module = "example.com/greet".into();
        let err = Synthesizer::new(&config).build_context(&greeter()).unwrap_err();
        assert!(matches!(err, Error::MockRedeclared { ref mock, .. } if mock == "Greeter"));
        assert_eq!(err.kind(), crate::error::FailureKind::RenderFailed);

        // A different destination package has room for the bare name
        config.include = vec!["Unused".into()];
        config.destination_module = "example.com/greet/mocks".into();
        let ctx = Synthesizer::new(&config).build_context(&greeter()).unwrap();
        assert_eq!(ctx.mocks[0].name, "Unused");
    }

    #[test]
    fn test_raw_text_contains_members() {
        let mut config = Config::new(vec!["Greeter".into()]);
        config.prefix = "Mock".into();
        let raw = Synthesizer::new(&config).synthesize(&greeter()).unwrap();
        assert!(raw.contains("type MockGreeter struct {"));
        assert!(raw.contains("HelloFunc func(name string) string"));
        assert!(raw.contains("CountFunc func() int"));
        assert!(raw.contains("lockHello sync.Mutex"));
        assert!(raw.contains("func (m *MockGreeter) Reset() {"));
    }
}
