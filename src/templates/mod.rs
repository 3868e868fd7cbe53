//! Template-based rendering of the generated file
//!
//! The mock file layout lives in a MiniJinja template embedded in the
//! binary. A directory containing `mock.go.jinja` may override it; the
//! override sees the same context (`synth::FileContext`).

pub mod filters;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::{Error, Result};

/// Name of the mock file template
pub const MOCK_TEMPLATE: &str = "mock.go.jinja";

// Embedded template (compiled into binary)
mod embedded {
    pub const MOCK: &str = include_str!("../../templates/mock.go.jinja");
}

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn base_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    filters::register_filters(&mut env);
    env
}

/// Initialize the template engine with the embedded template
fn init_engine() -> Environment<'static> {
    let mut env = base_environment();
    env.add_template(MOCK_TEMPLATE, embedded::MOCK)
        .expect("Failed to load embedded mock template");
    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Create an engine whose mock template comes from `dir` when present there.
pub fn engine_with_override(dir: &Path) -> Result<Environment<'static>> {
    let path = dir.join(MOCK_TEMPLATE);
    if !path.exists() {
        debug!(dir = %dir.display(), "no template override, using embedded template");
        return Ok(init_engine());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Template(format!("Failed to read {}: {}", path.display(), e)))?;
    let mut env = base_environment();
    env.add_template_owned(MOCK_TEMPLATE, content)
        .map_err(|e| Error::Template(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "loaded template override");
    Ok(env)
}

/// Render the mock file template with `ctx`.
pub fn render_mock_file<S: Serialize>(ctx: &S, template_dir: Option<&Path>) -> Result<String> {
    let owned;
    let env = match template_dir {
        Some(dir) => {
            owned = engine_with_override(dir)?;
            &owned
        }
        None => engine(),
    };
    let template = env
        .get_template(MOCK_TEMPLATE)
        .map_err(|e| Error::Template(e.to_string()))?;
    template
        .render(ctx)
        .map_err(|e| Error::Template(e.to_string()))
}
