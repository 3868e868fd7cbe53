//! Interface model: the structured description mocks are synthesized from
//!
//! A `Package` lists interfaces in source order. Every parameter and result
//! carries a `Type`, which knows how to render itself as Go text given the
//! alias table of the file being generated.
//!
//! ## Example Model
//!
//! ```yaml
//! name: greet
//! path: example.com/greet
//! interfaces:
//!   - name: Greeter
//!     methods:
//!       - name: Hello
//!         params:
//!           - name: name
//!             type: { kind: builtin, name: string }
//!         results:
//!           - type: { kind: builtin, name: string }
//!       - name: Count
//!         results:
//!           - type: { kind: builtin, name: int }
//! ```

use crate::error::{Error, Result};
use crate::imports::{AliasTable, ReservedWords};
use crate::util::is_identifier;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A Go package and the interfaces it declares
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "mocker model", description = "Interfaces to synthesize mocks for")]
pub struct Package {
    /// Package name as declared in source
    pub name: String,

    /// Import path of the package, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Interfaces in declaration order
    #[serde(default)]
    pub interfaces: Vec<Interface>,
}

/// An interface: a name and its methods in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Interface {
    pub name: String,

    #[serde(default)]
    pub methods: Vec<Method>,
}

/// A method signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Method {
    pub name: String,

    #[serde(default)]
    pub params: Vec<Parameter>,

    /// Trailing `...T` parameter; `ty` is the element type `T`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variadic: Option<Parameter>,

    #[serde(default)]
    pub results: Vec<Parameter>,
}

/// A parameter or result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub ty: Type,
}

/// Channel direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

/// A Go type expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    /// A named type declared in `package` (an import path)
    Named {
        package: String,
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_args: Vec<Type>,
    },
    /// A predeclared type such as `int`, `string` or `error`
    Builtin { name: String },
    Pointer { elem: Box<Type> },
    Slice { elem: Box<Type> },
    Array { len: String, elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Chan {
        #[serde(default)]
        dir: ChanDir,
        elem: Box<Type>,
    },
    Func(Box<FuncType>),
    Struct {
        #[serde(default)]
        fields: Vec<StructField>,
    },
    Interface {
        #[serde(default)]
        methods: Vec<InterfaceMethod>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        embedded: Vec<Type>,
    },
}

/// A function signature used as a type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FuncType {
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variadic: Option<Parameter>,
    #[serde(default)]
    pub results: Vec<Parameter>,
}

/// A field of an anonymous struct; `name` is absent for embedded fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
}

/// A method of an interface literal type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InterfaceMethod {
    pub name: String,
    #[serde(flatten)]
    pub signature: FuncType,
}

impl Type {
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Named {
            package: package.into(),
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Type::Builtin { name: name.into() }
    }

    pub fn pointer(elem: Type) -> Self {
        Type::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Render as Go source.
    ///
    /// Named types from `destination` render unqualified; other named types
    /// are qualified by their alias. A package missing from the table renders
    /// bare, which is how types of an unnamed local package come out.
    pub fn render(&self, aliases: &AliasTable, destination: &str) -> String {
        match self {
            Type::Named {
                package,
                name,
                type_args,
            } => {
                let mut out = if package.is_empty() || package == destination {
                    name.clone()
                } else {
                    match aliases.get(package) {
                        Some(alias) => format!("{}.{}", alias, name),
                        None => name.clone(),
                    }
                };
                if !type_args.is_empty() {
                    let args: Vec<String> = type_args
                        .iter()
                        .map(|t| t.render(aliases, destination))
                        .collect();
                    out.push('[');
                    out.push_str(&args.join(", "));
                    out.push(']');
                }
                out
            }
            Type::Builtin { name } => name.clone(),
            Type::Pointer { elem } => format!("*{}", elem.render(aliases, destination)),
            Type::Slice { elem } => format!("[]{}", elem.render(aliases, destination)),
            Type::Array { len, elem } => {
                format!("[{}]{}", len, elem.render(aliases, destination))
            }
            Type::Map { key, value } => format!(
                "map[{}]{}",
                key.render(aliases, destination),
                value.render(aliases, destination)
            ),
            Type::Chan { dir, elem } => {
                let inner_recv = matches!(
                    elem.as_ref(),
                    Type::Chan {
                        dir: ChanDir::Recv,
                        ..
                    }
                );
                let mut elem = elem.render(aliases, destination);
                // `chan <-chan T` parses as `chan<- (chan T)`
                if inner_recv && *dir != ChanDir::Recv {
                    elem = format!("({})", elem);
                }
                match dir {
                    ChanDir::Both => format!("chan {}", elem),
                    ChanDir::Send => format!("chan<- {}", elem),
                    ChanDir::Recv => format!("<-chan {}", elem),
                }
            }
            Type::Func(sig) => format!("func{}", sig.render_signature(aliases, destination)),
            Type::Struct { fields } => {
                if fields.is_empty() {
                    return "struct{}".into();
                }
                let fields: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let ty = f.ty.render(aliases, destination);
                        match &f.name {
                            Some(name) => format!("{} {}", name, ty),
                            None => ty,
                        }
                    })
                    .collect();
                format!("struct{{ {} }}", fields.join("; "))
            }
            Type::Interface { methods, embedded } => {
                if methods.is_empty() && embedded.is_empty() {
                    return "interface{}".into();
                }
                let mut elems: Vec<String> = embedded
                    .iter()
                    .map(|t| t.render(aliases, destination))
                    .collect();
                elems.extend(methods.iter().map(|m| {
                    format!(
                        "{}{}",
                        m.name,
                        m.signature.render_signature(aliases, destination)
                    )
                }));
                format!("interface{{ {} }}", elems.join("; "))
            }
        }
    }

    /// Visit every module path this type references.
    pub fn collect_modules(&self, out: &mut BTreeSet<String>) {
        match self {
            Type::Named {
                package, type_args, ..
            } => {
                if !package.is_empty() {
                    out.insert(package.clone());
                }
                for arg in type_args {
                    arg.collect_modules(out);
                }
            }
            Type::Builtin { .. } => {}
            Type::Pointer { elem }
            | Type::Slice { elem }
            | Type::Array { elem, .. }
            | Type::Chan { elem, .. } => elem.collect_modules(out),
            Type::Map { key, value } => {
                key.collect_modules(out);
                value.collect_modules(out);
            }
            Type::Func(sig) => sig.collect_modules(out),
            Type::Struct { fields } => {
                for f in fields {
                    f.ty.collect_modules(out);
                }
            }
            Type::Interface { methods, embedded } => {
                for t in embedded {
                    t.collect_modules(out);
                }
                for m in methods {
                    m.signature.collect_modules(out);
                }
            }
        }
    }

    /// Visit every type name that renders without a qualifier when the
    /// output belongs to `destination`.
    pub fn collect_local_names(&self, destination: &str, out: &mut BTreeSet<String>) {
        match self {
            Type::Named {
                package,
                name,
                type_args,
            } => {
                if package.is_empty() || package == destination {
                    out.insert(name.clone());
                }
                for arg in type_args {
                    arg.collect_local_names(destination, out);
                }
            }
            Type::Builtin { .. } => {}
            Type::Pointer { elem }
            | Type::Slice { elem }
            | Type::Array { elem, .. }
            | Type::Chan { elem, .. } => elem.collect_local_names(destination, out),
            Type::Map { key, value } => {
                key.collect_local_names(destination, out);
                value.collect_local_names(destination, out);
            }
            Type::Func(sig) => sig.collect_local_names(destination, out),
            Type::Struct { fields } => {
                for f in fields {
                    f.ty.collect_local_names(destination, out);
                }
            }
            Type::Interface { methods, embedded } => {
                for t in embedded {
                    t.collect_local_names(destination, out);
                }
                for m in methods {
                    m.signature.collect_local_names(destination, out);
                }
            }
        }
    }
}

impl FuncType {
    /// Render `(A, B, ...C) R` / `(A) (R1, R2)` without the `func` keyword.
    pub fn render_signature(&self, aliases: &AliasTable, destination: &str) -> String {
        let mut args: Vec<String> = self
            .params
            .iter()
            .map(|p| p.ty.render(aliases, destination))
            .collect();
        if let Some(v) = &self.variadic {
            args.push(format!("...{}", v.ty.render(aliases, destination)));
        }
        let results: Vec<String> = self
            .results
            .iter()
            .map(|p| p.ty.render(aliases, destination))
            .collect();
        format!("({}){}", args.join(", "), results_suffix(&results))
    }

    fn collect_modules(&self, out: &mut BTreeSet<String>) {
        for p in self.params.iter().chain(&self.variadic).chain(&self.results) {
            p.ty.collect_modules(out);
        }
    }

    fn collect_local_names(&self, destination: &str, out: &mut BTreeSet<String>) {
        for p in self.params.iter().chain(&self.variadic).chain(&self.results) {
            p.ty.collect_local_names(destination, out);
        }
    }
}

/// Module paths referenced by the given interfaces.
pub fn modules_of<'a>(interfaces: impl IntoIterator<Item = &'a Interface>) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for intf in interfaces {
        for m in &intf.methods {
            m.collect_modules(&mut out);
        }
    }
    out
}

/// Result list as it follows a parameter list: ``, ` T` or ` (A, B)`.
pub(crate) fn results_suffix(results: &[String]) -> String {
    match results.len() {
        0 => String::new(),
        1 => format!(" {}", results[0]),
        _ => format!(" ({})", results.join(", ")),
    }
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: Type) -> Self {
        Self { name: None, ty }
    }

    /// The declared name, treating `_` and empty as absent.
    pub fn declared_name(&self) -> Option<&str> {
        match self.name.as_deref() {
            None | Some("") | Some("_") => None,
            Some(name) => Some(name),
        }
    }
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            variadic: None,
            results: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.params.push(Parameter::new(name, ty));
        self
    }

    pub fn variadic(mut self, name: impl Into<String>, elem: Type) -> Self {
        self.variadic = Some(Parameter::new(name, elem));
        self
    }

    pub fn returns(mut self, ty: Type) -> Self {
        self.results.push(Parameter::unnamed(ty));
        self
    }

    /// Input parameters followed by the variadic one, if any.
    pub fn inputs(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().chain(&self.variadic)
    }

    fn collect_modules(&self, out: &mut BTreeSet<String>) {
        for p in self.inputs().chain(&self.results) {
            p.ty.collect_modules(out);
        }
    }

    /// Unqualified type names in the signature; a local with one of these
    /// names would shadow the type.
    pub fn local_type_names(&self, destination: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for p in self.inputs().chain(&self.results) {
            p.ty.collect_local_names(destination, &mut out);
        }
        out
    }
}

impl Interface {
    pub fn new(name: impl Into<String>, methods: Vec<Method>) -> Self {
        Self {
            name: name.into(),
            methods,
        }
    }
}

impl Package {
    /// Parse a model from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::ModelLoad(e.to_string()))
    }

    /// Serialize the model to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::ModelLoad(e.to_string()))
    }

    /// Parse a model from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::ModelLoad(e.to_string()))
    }

    /// Serialize the model to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::ModelLoad(e.to_string()))
    }

    /// Get an interface by name
    pub fn get_interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    /// Every module path referenced by any interface's signatures.
    pub fn modules(&self) -> BTreeSet<String> {
        modules_of(&self.interfaces)
    }

    /// Interfaces named in `include`, in declaration order.
    ///
    /// Names missing from the package are ignored.
    pub fn select<'a>(&'a self, include: &[String]) -> Vec<&'a Interface> {
        self.interfaces
            .iter()
            .filter(|intf| include.iter().any(|name| *name == intf.name))
            .collect()
    }

    /// Check identifiers and structure; the model is rejected as a whole.
    pub fn validate(&self, reserved: &dyn ReservedWords) -> Result<()> {
        let check = |what: &str, ident: &str| -> Result<()> {
            if !is_identifier(ident) {
                return Err(Error::ModelLoad(format!("invalid {} name '{}'", what, ident)));
            }
            if reserved.is_reserved(ident) {
                return Err(Error::ModelLoad(format!(
                    "{} name '{}' is a reserved word",
                    what, ident
                )));
            }
            Ok(())
        };

        check("package", &self.name)?;
        let mut seen = HashSet::new();
        for intf in &self.interfaces {
            check("interface", &intf.name)?;
            if !seen.insert(intf.name.as_str()) {
                return Err(Error::ModelLoad(format!(
                    "interface '{}' is declared twice",
                    intf.name
                )));
            }
            let mut methods = HashSet::new();
            for m in &intf.methods {
                check("method", &m.name)?;
                if !methods.insert(m.name.as_str()) {
                    return Err(Error::ModelLoad(format!(
                        "{}.{} is declared twice",
                        intf.name, m.name
                    )));
                }
                for p in m.inputs().chain(&m.results) {
                    if let Some(name) = p.declared_name() {
                        check("parameter", name)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::{allocate, GoKeywords};

    fn table(paths: &[&str], destination: &str) -> AliasTable {
        let set: BTreeSet<String> = paths.iter().map(|s| s.to_string()).collect();
        allocate(&set, destination, &GoKeywords).aliases
    }

    #[test]
    fn test_render_named_qualification() {
        let aliases = table(&["example.com/a", "example.com/self"], "example.com/self");
        assert_eq!(
            Type::named("example.com/a", "Thing").render(&aliases, "example.com/self"),
            "example_com_a.Thing"
        );
        assert_eq!(
            Type::named("example.com/self", "Local").render(&aliases, "example.com/self"),
            "Local"
        );
        assert_eq!(Type::named("", "Bare").render(&aliases, "x"), "Bare");
    }

    #[test]
    fn test_render_composites() {
        let aliases = table(&["io"], "");
        let ty = Type::map(
            Type::builtin("string"),
            Type::slice(Type::pointer(Type::named("io", "Reader"))),
        );
        assert_eq!(ty.render(&aliases, ""), "map[string][]*io.Reader");

        let arr = Type::Array {
            len: "4".into(),
            elem: Box::new(Type::builtin("byte")),
        };
        assert_eq!(arr.render(&aliases, ""), "[4]byte");

        let ch = Type::Chan {
            dir: ChanDir::Recv,
            elem: Box::new(Type::builtin("int")),
        };
        assert_eq!(ch.render(&aliases, ""), "<-chan int");
    }

    #[test]
    fn test_render_func_and_literals() {
        let aliases = table(&[], "");
        let f = Type::Func(Box::new(FuncType {
            params: vec![Parameter::new("a", Type::builtin("int"))],
            variadic: Some(Parameter::unnamed(Type::builtin("string"))),
            results: vec![
                Parameter::unnamed(Type::builtin("bool")),
                Parameter::unnamed(Type::builtin("error")),
            ],
        }));
        assert_eq!(f.render(&aliases, ""), "func(int, ...string) (bool, error)");

        let empty = Type::Struct { fields: vec![] };
        assert_eq!(empty.render(&aliases, ""), "struct{}");

        let st = Type::Struct {
            fields: vec![
                StructField {
                    name: Some("A".into()),
                    ty: Type::builtin("int"),
                },
                StructField {
                    name: None,
                    ty: Type::named("", "Base"),
                },
            ],
        };
        assert_eq!(st.render(&aliases, ""), "struct{ A int; Base }");

        let iface = Type::Interface {
            methods: vec![InterfaceMethod {
                name: "Close".into(),
                signature: FuncType {
                    results: vec![Parameter::unnamed(Type::builtin("error"))],
                    ..Default::default()
                },
            }],
            embedded: vec![],
        };
        assert_eq!(iface.render(&aliases, ""), "interface{ Close() error }");
    }

    #[test]
    fn test_generic_type_args() {
        let aliases = table(&["example.com/list", "example.com/item"], "");
        let ty = Type::Named {
            package: "example.com/list".into(),
            name: "List".into(),
            type_args: vec![Type::named("example.com/item", "Item")],
        };
        assert_eq!(
            ty.render(&aliases, ""),
            "example_com_list.List[example_com_item.Item]"
        );
        let mut modules = BTreeSet::new();
        ty.collect_modules(&mut modules);
        assert_eq!(modules.len(), 2);
    }

    #[test]
    fn test_modules_walks_all_signatures() {
        let pkg = Package {
            name: "p".into(),
            path: None,
            interfaces: vec![Interface::new(
                "Store",
                vec![Method::new("Get")
                    .param("ctx", Type::named("context", "Context"))
                    .variadic("opts", Type::named("example.com/opts", "Option"))
                    .returns(Type::map(
                        Type::builtin("string"),
                        Type::named("example.com/model", "Row"),
                    ))],
            )],
        };
        let modules: Vec<String> = pkg.modules().into_iter().collect();
        assert_eq!(
            modules,
            vec!["context", "example.com/model", "example.com/opts"]
        );
    }

    #[test]
    fn test_yaml_round_trip_shape() {
        let pkg = Package::from_yaml(
            r#"
name: greet
interfaces:
  - name: Greeter
    methods:
      - name: Hello
        params:
          - name: name
            type: { kind: builtin, name: string }
        results:
          - type: { kind: builtin, name: string }
"#,
        )
        .unwrap();
        let hello = &pkg.get_interface("Greeter").unwrap().methods[0];
        assert_eq!(hello.params[0].declared_name(), Some("name"));
        assert_eq!(hello.results.len(), 1);
    }

    #[test]
    fn test_malformed_model_is_load_failure() {
        let err = Package::from_yaml("name: [unclosed").unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::ModelLoadFailed);
    }

    #[test]
    fn test_validate_rejects_keywords_and_duplicates() {
        let bad = Package {
            name: "p".into(),
            path: None,
            interfaces: vec![Interface::new(
                "X",
                vec![Method::new("Do").param("func", Type::builtin("int"))],
            )],
        };
        assert!(bad.validate(&GoKeywords).is_err());

        let dup = Package {
            name: "p".into(),
            path: None,
            interfaces: vec![
                Interface::new("X", vec![]),
                Interface::new("X", vec![]),
            ],
        };
        assert!(dup.validate(&GoKeywords).is_err());
    }

    #[test]
    fn test_underscore_param_is_unnamed() {
        let p = Parameter::new("_", Type::builtin("int"));
        assert_eq!(p.declared_name(), None);
    }
}
