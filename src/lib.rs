// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # mocker
//!
//! Generates Go test doubles from interface descriptions.
//!
//! ## Core Concept
//!
//! For every selected interface `I` mocker emits a type `<prefix>I<suffix>`
//! that satisfies `I`. Each method of the mock forwards to a user-assigned
//! stub (`<M>Func`), records its arguments in a per-method call log and
//! exposes `<M>Called` / `<M>Calls` accessors. A single `Reset` clears the
//! call log of every method; assigned stubs stay in place.
//!
//! Calling a method whose stub was never assigned panics immediately with a
//! `MissingStub` message; nothing is recorded.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mocker::{generate, parse_go_source, Config, SourceOptions};
//!
//! let pkg = parse_go_source(r#"
//! package greet
//!
//! type Greeter interface {
//!     Hello(name string) string
//! }
//! "#, &SourceOptions { package_path: Some("example.com/greet".into()) })?;
//!
//! let mut config = Config::new(vec!["Greeter".into()]);
//! config.prefix = "Mock".into();
//! config.destination_module = "example.com/greet/mocks".into();
//!
//! let go_source = generate(&pkg, &config)?;
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Go source ──► parse ──┐
//!                       ├──► Package ──► Synthesizer ──► template ──► Canonicalizer ──► text
//! model.yaml ───────────┘        │
//!                                ├──► imports::allocate (aliases)
//!                                └──► IdentifierAllocator (locals, fields)
//! ```
//!
//! Output is a pure function of the model and the config: the same inputs
//! always produce byte-identical text.

pub mod config;
pub mod error;
pub mod format;
pub mod idents;
pub mod imports;
pub mod model;
pub mod parse;
pub mod synth;
pub mod templates;
pub mod util;

// Re-exports
pub use config::{Config, ConfigOverrides, FormatterKind, CONFIG_FILE};
pub use error::{Error, FailureKind, Result};
pub use format::{canonicalizer_for, Canonicalizer, FormatError, GoCanonicalizer, Gofmt};
pub use idents::IdentifierAllocator;
pub use imports::{allocate, AliasTable, GoKeywords, Import, ImportPlan, ReservedWords};
pub use model::{ChanDir, FuncType, Interface, Method, Package, Parameter, Type};
pub use parse::{guess_package_name, load_package, parse_go_file, parse_go_source, SourceOptions};
pub use synth::{generate, missing_stub_message, Synthesizer, GENERATED_HEADER};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
