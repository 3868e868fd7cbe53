//! Go parser - extracts interface declarations from Go source

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

use crate::error::{Error, Result};
use crate::idents::GO_PREDECLARED;
use crate::model::{
    ChanDir, FuncType, Interface, InterfaceMethod, Method, Package, Parameter, StructField, Type,
};

use super::{node_text, SourceOptions};

/// Parse Go source into a `Package` holding every interface it declares.
pub fn parse_go_source(source: &str, options: &SourceOptions) -> Result<Package> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| Error::ModelLoad(format!("Failed to set language: {}", e)))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::ModelLoad("Failed to parse source".into()))?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(Error::ModelLoad(syntax_error_message(root, source)));
    }

    let mut ctx = GoContext {
        source,
        package_path: options.package_path.clone().unwrap_or_default(),
        imports: HashMap::new(),
    };
    let mut package_name = String::new();
    let mut specs: Vec<(String, Node)> = Vec::new();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                if let Some(ident) = first_named_of_kind(child, "package_identifier") {
                    package_name = node_text(ident, source).to_string();
                }
            }
            "import_declaration" => ctx.collect_imports(child),
            "type_declaration" => collect_interface_specs(child, source, &mut specs),
            _ => {}
        }
    }

    if package_name.is_empty() {
        return Err(Error::ModelLoad("missing package clause".into()));
    }

    let index: HashMap<&str, Node> = specs.iter().map(|(n, node)| (n.as_str(), *node)).collect();
    let mut interfaces = Vec::new();
    for (name, node) in &specs {
        let mut visiting = HashSet::new();
        let methods = ctx.interface_methods(name, *node, &index, &mut visiting)?;
        debug!(interface = %name, methods = methods.len(), "extracted interface");
        interfaces.push(Interface {
            name: name.clone(),
            methods,
        });
    }

    Ok(Package {
        name: package_name,
        path: options.package_path.clone(),
        interfaces,
    })
}

struct GoContext<'s> {
    source: &'s str,
    package_path: String,
    /// local package name → import path
    imports: HashMap<String, String>,
}

fn syntax_error_message(root: Node, source: &str) -> String {
    fn find(node: Node) -> Option<Node> {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        children
            .into_iter()
            .filter(|c| c.has_error() || c.is_missing())
            .find_map(find)
    }
    match find(root) {
        Some(node) => {
            let pos = node.start_position();
            let line = source.lines().nth(pos.row).unwrap_or("").trim();
            format!("syntax error at {}:{}: {}", pos.row + 1, pos.column + 1, line)
        }
        None => "syntax error".into(),
    }
}

fn first_named_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// `type X interface {...}`, including grouped `type (...)` declarations.
fn collect_interface_specs<'t>(decl: Node<'t>, source: &str, out: &mut Vec<(String, Node<'t>)>) {
    for spec in named_children(decl) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let (Some(name), Some(ty)) = (
            spec.child_by_field_name("name"),
            spec.child_by_field_name("type"),
        ) else {
            continue;
        };
        if ty.kind() != "interface_type" {
            continue;
        }
        let name = node_text(name, source).to_string();
        if spec.child_by_field_name("type_parameters").is_some() {
            warn!(interface = %name, "generic interfaces are not supported, skipping");
            continue;
        }
        out.push((name, ty));
    }
}

/// Package name Go would bind for an import path without an explicit name.
pub fn guess_package_name(path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    // example.com/mod/v2 binds `mod`
    if segments.len() > 1 {
        if let Some(last) = segments.last() {
            let is_major = last.len() > 1
                && last.starts_with('v')
                && last[1..].chars().all(|c| c.is_ascii_digit());
            if is_major {
                segments.pop();
            }
        }
    }
    let last = segments.last().copied().unwrap_or(path);
    // gopkg.in/yaml.v3 binds `yaml`
    let base = match last.find(".v") {
        Some(i) if last[i + 2..].chars().all(|c| c.is_ascii_digit()) && i + 2 < last.len() => {
            &last[..i]
        }
        _ => last,
    };
    base.trim_start_matches("go-").replace(['-', '.'], "_")
}

impl<'s> GoContext<'s> {
    fn text(&self, node: Node) -> &'s str {
        node_text(node, self.source)
    }

    fn collect_imports(&mut self, decl: Node) {
        for child in named_children(decl) {
            match child.kind() {
                "import_spec" => self.add_import(child),
                "import_spec_list" => {
                    for spec in named_children(child) {
                        if spec.kind() == "import_spec" {
                            self.add_import(spec);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn add_import(&mut self, spec: Node) {
        let Some(path_node) = spec.child_by_field_name("path") else {
            return;
        };
        let path = self
            .text(path_node)
            .trim_matches(|c| c == '"' || c == '`')
            .to_string();
        let local = match spec.child_by_field_name("name") {
            Some(name) => match name.kind() {
                "package_identifier" => self.text(name).to_string(),
                "dot" => {
                    warn!(path = %path, "dot imports are not resolved");
                    return;
                }
                _ => return,
            },
            None => guess_package_name(&path),
        };
        self.imports.insert(local, path);
    }

    /// Methods of an interface, with embedded interfaces from this file
    /// flattened in place.
    fn interface_methods(
        &self,
        name: &str,
        node: Node,
        index: &HashMap<&str, Node>,
        visiting: &mut HashSet<String>,
    ) -> Result<Vec<Method>> {
        if !visiting.insert(name.to_string()) {
            return Err(Error::ModelLoad(format!(
                "interface {} embeds itself",
                name
            )));
        }

        let mut methods: Vec<Method> = Vec::new();
        for elem in named_children(node) {
            match elem.kind() {
                "method_elem" | "method_spec" => {
                    let method = self.method(elem)?;
                    push_method(&mut methods, method);
                }
                "type_elem" | "constraint_elem" => {
                    for embedded in named_children(elem) {
                        let embedded_name = self.text(embedded);
                        match (embedded.kind(), index.get(embedded_name)) {
                            ("type_identifier", Some(inner)) => {
                                for m in
                                    self.interface_methods(embedded_name, *inner, index, visiting)?
                                {
                                    push_method(&mut methods, m);
                                }
                            }
                            _ => warn!(
                                interface = %name,
                                embedded = %embedded_name,
                                "embedded type not declared in this file, skipping"
                            ),
                        }
                    }
                }
                // older grammars expose embedded interfaces directly
                "type_identifier" | "qualified_type" => {
                    let embedded_name = self.text(elem);
                    match index.get(embedded_name) {
                        Some(inner) if elem.kind() == "type_identifier" => {
                            for m in self.interface_methods(embedded_name, *inner, index, visiting)? {
                                push_method(&mut methods, m);
                            }
                        }
                        _ => warn!(
                            interface = %name,
                            embedded = %embedded_name,
                            "embedded type not declared in this file, skipping"
                        ),
                    }
                }
                _ => {}
            }
        }

        visiting.remove(name);
        Ok(methods)
    }

    fn method(&self, elem: Node) -> Result<Method> {
        let name = elem
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .ok_or_else(|| Error::ModelLoad("method without a name".into()))?;
        let sig = self.signature(
            elem.child_by_field_name("parameters"),
            elem.child_by_field_name("result"),
        )?;
        Ok(Method {
            name,
            params: sig.params,
            variadic: sig.variadic,
            results: sig.results,
        })
    }

    fn signature(&self, params: Option<Node>, result: Option<Node>) -> Result<FuncType> {
        let mut sig = FuncType::default();
        if let Some(list) = params {
            for decl in named_children(list) {
                match decl.kind() {
                    "parameter_declaration" => {
                        sig.params.extend(self.parameter_declaration(decl)?);
                    }
                    "variadic_parameter_declaration" => {
                        let ty = self.field_type(decl, "type")?;
                        let name = decl
                            .child_by_field_name("name")
                            .map(|n| self.text(n).to_string());
                        sig.variadic = Some(Parameter { name, ty });
                    }
                    kind => {
                        return Err(Error::ModelLoad(format!(
                            "unexpected {} in parameter list",
                            kind
                        )))
                    }
                }
            }
        }
        if let Some(result) = result {
            if result.kind() == "parameter_list" {
                for decl in named_children(result) {
                    sig.results.extend(self.parameter_declaration(decl)?);
                }
            } else {
                sig.results.push(Parameter::unnamed(self.convert_type(result)?));
            }
        }
        Ok(sig)
    }

    /// `a, b int` expands to two parameters; `int` alone is unnamed.
    fn parameter_declaration(&self, decl: Node) -> Result<Vec<Parameter>> {
        let ty = self.field_type(decl, "type")?;
        let mut cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.text(n).to_string())
            .collect();
        if names.is_empty() {
            return Ok(vec![Parameter::unnamed(ty)]);
        }
        Ok(names
            .into_iter()
            .map(|name| Parameter {
                name: Some(name),
                ty: ty.clone(),
            })
            .collect())
    }

    fn field_type(&self, node: Node, field: &str) -> Result<Type> {
        let ty = node.child_by_field_name(field).ok_or_else(|| {
            Error::ModelLoad(format!("missing {} in `{}`", field, self.text(node)))
        })?;
        self.convert_type(ty)
    }

    fn convert_type(&self, node: Node) -> Result<Type> {
        match node.kind() {
            "type_identifier" => {
                let name = self.text(node);
                if GO_PREDECLARED.contains(&name) {
                    Ok(Type::builtin(name))
                } else {
                    Ok(Type::named(self.package_path.clone(), name))
                }
            }
            "qualified_type" => {
                let pkg = node
                    .child_by_field_name("package")
                    .map(|n| self.text(n))
                    .unwrap_or("");
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n))
                    .unwrap_or("");
                let path = self.imports.get(pkg).ok_or_else(|| {
                    Error::ModelLoad(format!("unknown package qualifier '{}'", pkg))
                })?;
                Ok(Type::named(path.clone(), name))
            }
            "generic_type" => {
                let base = node
                    .child_by_field_name("type")
                    .ok_or_else(|| Error::ModelLoad("generic type without base".into()))?;
                let Type::Named { package, name, .. } = self.convert_type(base)? else {
                    return Err(Error::ModelLoad(format!(
                        "unsupported generic type `{}`",
                        self.text(node)
                    )));
                };
                let mut type_args = Vec::new();
                if let Some(args) = node.child_by_field_name("type_arguments") {
                    for arg in named_children(args) {
                        type_args.push(self.convert_type(unwrap_type_elem(arg))?);
                    }
                }
                Ok(Type::Named {
                    package,
                    name,
                    type_args,
                })
            }
            "pointer_type" => Ok(Type::pointer(self.only_child_type(node)?)),
            "parenthesized_type" => self.only_child_type(node),
            "slice_type" => Ok(Type::slice(self.field_type(node, "element")?)),
            "array_type" => {
                let len = node
                    .child_by_field_name("length")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                Ok(Type::Array {
                    len,
                    elem: Box::new(self.field_type(node, "element")?),
                })
            }
            "map_type" => Ok(Type::map(
                self.field_type(node, "key")?,
                self.field_type(node, "value")?,
            )),
            "channel_type" => Ok(Type::Chan {
                dir: channel_dir(node),
                elem: Box::new(self.field_type(node, "value")?),
            }),
            "function_type" => Ok(Type::Func(Box::new(self.signature(
                node.child_by_field_name("parameters"),
                node.child_by_field_name("result"),
            )?))),
            "struct_type" => {
                let mut fields = Vec::new();
                if let Some(list) = first_named_of_kind(node, "field_declaration_list") {
                    for decl in named_children(list) {
                        if decl.kind() != "field_declaration" {
                            continue;
                        }
                        let ty = self.field_type(decl, "type")?;
                        let mut cursor = decl.walk();
                        let names: Vec<String> = decl
                            .children_by_field_name("name", &mut cursor)
                            .map(|n| self.text(n).to_string())
                            .collect();
                        if names.is_empty() {
                            fields.push(StructField { name: None, ty });
                        } else {
                            for name in names {
                                fields.push(StructField {
                                    name: Some(name),
                                    ty: ty.clone(),
                                });
                            }
                        }
                    }
                }
                Ok(Type::Struct { fields })
            }
            "interface_type" => {
                let mut methods = Vec::new();
                let mut embedded = Vec::new();
                for elem in named_children(node) {
                    match elem.kind() {
                        "method_elem" | "method_spec" => {
                            let m = self.method(elem)?;
                            methods.push(InterfaceMethod {
                                name: m.name,
                                signature: FuncType {
                                    params: m.params,
                                    variadic: m.variadic,
                                    results: m.results,
                                },
                            });
                        }
                        "type_elem" | "constraint_elem" => {
                            for t in named_children(elem) {
                                embedded.push(self.convert_type(t)?);
                            }
                        }
                        _ => embedded.push(self.convert_type(elem)?),
                    }
                }
                Ok(Type::Interface { methods, embedded })
            }
            "type_elem" => self.convert_type(unwrap_type_elem(node)),
            kind => Err(Error::ModelLoad(format!(
                "unsupported type `{}` ({})",
                self.text(node),
                kind
            ))),
        }
    }

    fn only_child_type(&self, node: Node) -> Result<Type> {
        let inner = named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelLoad(format!("empty type `{}`", self.text(node))))?;
        self.convert_type(inner)
    }
}

fn unwrap_type_elem(node: Node) -> Node {
    if node.kind() == "type_elem" {
        if let Some(inner) = named_children(node).into_iter().next() {
            return inner;
        }
    }
    node
}

/// Direction from the anonymous `chan` / `<-` tokens preceding the value.
fn channel_dir(node: Node) -> ChanDir {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node
        .children(&mut cursor)
        .take_while(|c| !c.is_named())
        .map(|c| c.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", "chan", ..] => ChanDir::Recv,
        ["chan", "<-", ..] => ChanDir::Send,
        _ => ChanDir::Both,
    }
}

/// Later declarations of the same method name win; embedding may repeat one.
fn push_method(methods: &mut Vec<Method>, method: Method) {
    if let Some(existing) = methods.iter_mut().find(|m| m.name == method.name) {
        *existing = method;
    } else {
        methods.push(method);
    }
}
