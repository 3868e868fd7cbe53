//! Import alias allocation
//!
//! Every module referenced by the generated file gets a local alias derived
//! from its path. Allocation walks the paths in lexicographic order so the
//! same set of modules always produces the same aliases.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Module path of the mutex every generated mock uses.
pub const SYNC_MODULE: &str = "sync";

/// Identifier reservation for the target language.
pub trait ReservedWords {
    fn is_reserved(&self, ident: &str) -> bool;
}

impl<F> ReservedWords for F
where
    F: Fn(&str) -> bool,
{
    fn is_reserved(&self, ident: &str) -> bool {
        self(ident)
    }
}

/// Go keywords
#[derive(Debug, Clone, Copy, Default)]
pub struct GoKeywords;

impl ReservedWords for GoKeywords {
    fn is_reserved(&self, ident: &str) -> bool {
        is_go_reserved(ident)
    }
}

pub(crate) fn is_go_reserved(word: &str) -> bool {
    matches!(
        word,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

/// Module path → alias
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.aliases.get(path).map(String::as_str)
    }

    /// Qualify `name` with the alias of `path`, or leave it bare when `path`
    /// is the destination or unknown.
    pub fn qualify(&self, path: &str, name: &str, destination: &str) -> String {
        if path == destination {
            return name.to_string();
        }
        match self.get(path) {
            Some(alias) => format!("{}.{}", alias, name),
            None => name.to_string(),
        }
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.values().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(path, alias)| (path.as_str(), alias.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// One line of the import block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub alias: String,
    pub path: String,
}

/// Result of allocation: the full alias table and the imports to emit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub aliases: AliasTable,
    pub destination: String,
}

impl ImportPlan {
    /// Imports to render, sorted by path, without the destination module.
    pub fn imports(&self) -> Vec<Import> {
        self.aliases
            .iter()
            .filter(|(path, _)| *path != self.destination)
            .map(|(path, alias)| Import {
                alias: alias.to_string(),
                path: path.to_string(),
            })
            .collect()
    }
}

/// Allocate an alias for every module in `modules` plus `sync`.
pub fn allocate(
    modules: &BTreeSet<String>,
    destination: &str,
    reserved: &dyn ReservedWords,
) -> ImportPlan {
    let mut paths: BTreeSet<&str> = modules.iter().map(String::as_str).collect();
    paths.insert(SYNC_MODULE);

    let mut aliases = BTreeMap::new();
    let mut used: BTreeSet<String> = BTreeSet::new();
    for path in paths {
        let base = sanitize(path);
        let mut alias = base.clone();
        let mut i = 0;
        while used.contains(&alias) || reserved.is_reserved(&alias) {
            alias = format!("{}{}", base, i);
            i += 1;
        }
        debug!(path, alias = %alias, "allocated import alias");
        used.insert(alias.clone());
        aliases.insert(path.to_string(), alias);
    }

    ImportPlan {
        aliases: AliasTable { aliases },
        destination: destination.to_string(),
    }
}

/// Turn a module path into an identifier.
///
/// The first character must be a letter or `_`; later characters may also be
/// digits. Anything else becomes `_`. A lone `_` becomes `x`.
pub fn sanitize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        let keep = if out.is_empty() {
            c.is_alphabetic() || c == '_'
        } else {
            c.is_alphanumeric() || c == '_'
        };
        out.push(if keep { c } else { '_' });
    }
    if out == "_" {
        out = "x".into();
    }
    out
}
