//! Custom MiniJinja filters for Go generation

use crate::util;
use minijinja::Environment;

/// Register all custom filters with the environment
pub fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("go_quote", go_quote);
}

/// Quote as a Go interpreted string literal
fn go_quote(value: &str) -> String {
    util::go_quote(value)
}
