//! CLI command implementations
//!
//! - `generate`: synthesize mocks from a Go file or a model file
//! - `schema`: print JSON schemas for the model and config formats
//! - `util`: argument parsing, output and Go module helpers

pub mod generate;
pub mod schema;
pub mod util;

pub use generate::cmd_generate;
pub use schema::cmd_schema;
