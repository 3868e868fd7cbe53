//! Local identifier allocation for generated method bodies

use std::collections::BTreeSet;

/// Go predeclared identifiers. Generated bodies call `append`, `len`,
/// `make`, `copy` and `panic`, and record types may spell any builtin type,
/// so locals must never shadow one of these.
pub const GO_PREDECLARED: &[&str] = &[
    "any", "append", "bool", "byte", "cap", "clear", "close", "comparable", "complex",
    "complex128", "complex64", "copy", "delete", "error", "false", "float32", "float64", "imag",
    "int", "int16", "int32", "int64", "int8", "iota", "len", "make", "max", "min", "new", "nil",
    "panic", "print", "println", "real", "recover", "rune", "string", "true", "uint", "uint16",
    "uint32", "uint64", "uint8", "uintptr",
];

/// Hands out identifiers that do not collide with anything already taken.
#[derive(Debug, Clone, Default)]
pub struct IdentifierAllocator {
    taken: BTreeSet<String>,
}

impl IdentifierAllocator {
    pub fn new<I, S>(taken: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: taken.into_iter().map(Into::into).collect(),
        }
    }

    /// Mark `ident` as taken without allocating it.
    pub fn reserve(&mut self, ident: impl Into<String>) {
        self.taken.insert(ident.into());
    }

    pub fn is_taken(&self, ident: &str) -> bool {
        self.taken.contains(ident)
    }

    /// Return `want` if free, else `want_2`, `want_3`, ...; the result is
    /// taken afterwards.
    pub fn allocate(&mut self, want: &str) -> String {
        let mut id = want.to_string();
        let mut i = 2;
        while self.taken.contains(&id) {
            id = format!("{}_{}", want, i);
            i += 1;
        }
        self.taken.insert(id.clone());
        id
    }
}
