//! Error types for mocker

use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// mocker errors
///
/// Generation never recovers from an error: the first failure aborts the run
/// and nothing is written.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("{mock}: generated member `{member}` is defined twice")]
    MemberCollision { mock: String, member: String },

    #[error("mock `{mock}` redeclares a type of package {package}")]
    MockRedeclared { mock: String, package: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The failure class this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::ModelLoad(_) => FailureKind::ModelLoadFailed,
            Error::Render(_)
            | Error::Template(_)
            | Error::MemberCollision { .. }
            | Error::MockRedeclared { .. } => FailureKind::RenderFailed,
            Error::Config(_) => FailureKind::InvalidConfig,
            Error::Io(_) => FailureKind::Io,
            Error::Json(_) | Error::Other(_) => FailureKind::Other,
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

/// Tagged failure classes.
///
/// `MissingStub` never surfaces as a Rust error: it is the tag carried by the
/// panic emitted into generated mocks when an unset stub is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    ModelLoadFailed,
    RenderFailed,
    MissingStub,
    InvalidConfig,
    Io,
    Other,
}

impl FailureKind {
    pub fn tag(self) -> &'static str {
        match self {
            FailureKind::ModelLoadFailed => "ModelLoadFailed",
            FailureKind::RenderFailed => "RenderFailed",
            FailureKind::MissingStub => "MissingStub",
            FailureKind::InvalidConfig => "InvalidConfig",
            FailureKind::Io => "Io",
            FailureKind::Other => "Other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::ModelLoad("bad".into()).kind(),
            FailureKind::ModelLoadFailed
        );
        assert_eq!(Error::Render("bad".into()).kind(), FailureKind::RenderFailed);
        assert_eq!(
            Error::MemberCollision {
                mock: "MockX".into(),
                member: "Reset".into()
            }
            .kind(),
            FailureKind::RenderFailed
        );
        assert_eq!(Error::Config("bad".into()).kind(), FailureKind::InvalidConfig);
        assert_eq!(Error::from("x").kind(), FailureKind::Other);
    }

    #[test]
    fn test_collision_message() {
        let err = Error::MemberCollision {
            mock: "MockStore".into(),
            member: "GetCalls".into(),
        };
        assert_eq!(
            err.to_string(),
            "MockStore: generated member `GetCalls` is defined twice"
        );
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(FailureKind::MissingStub.to_string(), "MissingStub");
    }
}
