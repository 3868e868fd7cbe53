//! Output canonicalization
//!
//! Raw synthesized text is turned into its final form here. Rejection is
//! fatal to the run: text the canonicalizer refuses is never written.
//!
//! - `GoCanonicalizer` (default): tree-sitter-go syntax check followed by
//!   whitespace normalization
//! - `Gofmt`: the external `gofmt` binary

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tree_sitter::{Node, Parser};

use crate::config::FormatterKind;
use crate::error::Error;

/// Turns raw generated text into canonical output
pub trait Canonicalizer {
    fn canonicalize(&self, source: &str) -> Result<String, FormatError>;
}

/// Pick the canonicalizer configured for a run
pub fn canonicalizer_for(kind: FormatterKind) -> Box<dyn Canonicalizer> {
    match kind {
        FormatterKind::Builtin => Box::new(GoCanonicalizer),
        FormatterKind::Gofmt => Box::new(Gofmt::default()),
    }
}

/// Syntax-checks with tree-sitter-go, then normalizes whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct GoCanonicalizer;

impl Canonicalizer for GoCanonicalizer {
    fn canonicalize(&self, source: &str) -> Result<String, FormatError> {
        check_go_syntax(source)?;
        Ok(normalize_go(source))
    }
}

/// Pipes text through `gofmt`
#[derive(Debug, Clone)]
pub struct Gofmt {
    pub binary: PathBuf,
}

impl Default for Gofmt {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("gofmt"),
        }
    }
}

impl Canonicalizer for Gofmt {
    fn canonicalize(&self, source: &str) -> Result<String, FormatError> {
        let tool = self.binary.display().to_string();
        let failed = |message: String| FormatError::ToolFailed {
            tool: tool.clone(),
            message,
        };

        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| failed(e.to_string()))?;
        }

        let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            return Err(FormatError::ParseError {
                language: "Go".into(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| failed(e.to_string()))
    }
}

/// Reject text tree-sitter-go cannot parse cleanly.
pub fn check_go_syntax(source: &str) -> Result<(), FormatError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| FormatError::ParseError {
            language: "Go".into(),
            message: format!("Failed to set language: {}", e),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| FormatError::ParseError {
        language: "Go".into(),
        message: "Failed to parse source".into(),
    })?;

    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }

    let message = match first_error(root) {
        Some(node) => {
            let pos = node.start_position();
            let what = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "unexpected syntax".to_string()
            };
            let line = source.lines().nth(pos.row).unwrap_or("").trim();
            format!("{} at {}:{}: {}", what, pos.row + 1, pos.column + 1, line)
        }
        None => "syntax error".to_string(),
    };
    Err(FormatError::ParseError {
        language: "Go".into(),
        message,
    })
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

/// Normalize layout: one tab per line holding an unclosed bracket, a line
/// starting with a closer takes the indentation of its opener's line, no
/// trailing whitespace, at most one blank line in a row, no blank line right
/// after an opening or before a closing bracket, one trailing newline.
pub fn normalize_go(source: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    // indentation of the line each unclosed bracket was opened on
    let mut open: Vec<usize> = Vec::new();

    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() {
            let after_open = lines
                .last()
                .is_none_or(|l| l.is_empty() || l.ends_with('{') || l.ends_with('('));
            if !after_open {
                lines.push(String::new());
            }
            continue;
        }

        let (leading_closes, events) = bracket_events(line);
        let indent = if leading_closes > 0 {
            while lines.last().is_some_and(|l| l.is_empty()) {
                lines.pop();
            }
            let opener = open.last().copied().unwrap_or(0);
            open.truncate(open.len().saturating_sub(leading_closes));
            opener
        } else {
            open.last().map_or(0, |i| i + 1)
        };
        lines.push(format!("{}{}", "\t".repeat(indent), line));

        for opens in events {
            if opens {
                open.push(indent);
            } else {
                open.pop();
            }
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Brackets outside strings and comments, in order. Closers before the first
/// other token are counted separately; the rest are `true` for an opener.
fn bracket_events(line: &str) -> (usize, Vec<bool>) {
    let mut leading = 0;
    let mut events = Vec::new();
    let mut at_start = true;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '`' | '\'' => {
                at_start = false;
                let quote = c;
                while let Some(n) = chars.next() {
                    if n == '\\' && quote != '`' {
                        chars.next();
                    } else if n == quote {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => break,
            '{' | '(' | '[' => {
                at_start = false;
                events.push(true);
            }
            '}' | ')' | ']' => {
                if at_start {
                    leading += 1;
                } else {
                    events.push(false);
                }
            }
            c if c.is_whitespace() => {}
            _ => at_start = false,
        }
    }
    (leading, events)
}

/// Formatting errors
#[derive(Debug, Clone)]
pub enum FormatError {
    /// The text is not valid source
    ParseError { language: String, message: String },
    /// An external formatter could not be run
    ToolFailed { tool: String, message: String },
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::ParseError { language, message } => {
                write!(f, "Failed to parse {} code: {}", language, message)
            }
            FormatError::ToolFailed { tool, message } => {
                write!(f, "Failed to run {}: {}", tool, message)
            }
        }
    }
}

impl std::error::Error for FormatError {}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Render(e.to_string())
    }
}
