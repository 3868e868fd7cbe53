//! Template context derivation
//!
//! Everything the template prints is decided here: identifiers, rendered
//! types, the record layout and the forwarding call. The template only lays
//! the pieces out.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{Error, FailureKind, Result};
use crate::idents::{IdentifierAllocator, GO_PREDECLARED};
use crate::imports::{ImportPlan, SYNC_MODULE};
use crate::model::{results_suffix, Interface, Method};
use crate::util::capitalize;

/// Whole generated file
#[derive(Debug, Clone, Serialize)]
pub struct FileContext {
    pub header: Vec<String>,
    pub package: String,
    pub imports: Vec<ImportContext>,
    pub mocks: Vec<MockContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportContext {
    pub alias: String,
    pub path: String,
}

/// One mock type
#[derive(Debug, Clone, Serialize)]
pub struct MockContext {
    pub name: String,
    pub interface: String,
    /// Qualified mutex type, e.g. `sync.Mutex`
    pub mutex: String,
    /// Receiver of `Reset`
    pub receiver: String,
    pub methods: Vec<MethodContext>,
}

/// Members generated for one interface method
#[derive(Debug, Clone, Serialize)]
pub struct MethodContext {
    pub name: String,
    pub receiver: String,
    pub lock: String,
    pub func_field: String,
    pub called: String,
    pub calls: String,
    /// Parameter list of the forwarding method, e.g. `a, b int, opts ...string`
    pub params: String,
    /// ``, ` T` or ` (A, B)`
    pub results: String,
    /// Type of the stub slot
    pub stub_type: String,
    pub fields: Vec<FieldContext>,
    /// Local holding the new record
    pub record: String,
    /// Local holding the copy returned by the calls accessor
    pub snapshot: String,
    /// Final statement of the forwarding method
    pub forward: String,
    pub panic_message: String,
}

/// One field of a call record
#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub name: String,
    pub ty: String,
    /// Local identifier the value is taken from
    pub value: String,
}

/// Naming and rendering inputs shared by every mock in a file
pub(crate) struct Scope<'a> {
    pub plan: &'a ImportPlan,
    pub destination: &'a str,
}

impl Scope<'_> {
    /// Identifiers no local may take: package qualifiers and predeclared names.
    fn allocator(&self) -> IdentifierAllocator {
        let mut ia = IdentifierAllocator::new(GO_PREDECLARED.iter().copied());
        for alias in self.plan.aliases.aliases() {
            ia.reserve(alias);
        }
        ia
    }

    /// Allocator for one method's bodies. Type names that render unqualified
    /// are taken too, so a parameter never shadows a type the body spells.
    fn method_allocator(&self, m: &Method) -> IdentifierAllocator {
        let mut ia = self.allocator();
        for name in m.local_type_names(self.destination) {
            ia.reserve(name);
        }
        ia
    }

    fn render(&self, ty: &crate::model::Type) -> String {
        ty.render(&self.plan.aliases, self.destination)
    }
}

/// Fail-fast text raised by a forwarding method whose stub is unset.
pub fn missing_stub_message(mock: &str, method: &str) -> String {
    format!(
        "mocker: {}: {}.{}Func is nil but {}.{} was called",
        FailureKind::MissingStub.tag(),
        mock,
        method,
        mock,
        method
    )
}

pub(crate) fn mock_context(
    scope: &Scope<'_>,
    mock_name: &str,
    intf: &Interface,
) -> Result<MockContext> {
    let methods = intf
        .methods
        .iter()
        .map(|m| method_context(scope, mock_name, m))
        .collect::<Vec<_>>();

    check_members(mock_name, &methods)?;

    Ok(MockContext {
        name: mock_name.to_string(),
        interface: intf.name.clone(),
        mutex: scope
            .plan
            .aliases
            .qualify(SYNC_MODULE, "Mutex", scope.destination),
        receiver: scope.allocator().allocate("m"),
        methods,
    })
}

/// Struct fields and methods share one namespace in Go.
fn check_members(mock: &str, methods: &[MethodContext]) -> Result<()> {
    let mut members: BTreeSet<&str> = BTreeSet::new();
    let fixed = ["Reset", "calls"];
    let generated = methods.iter().flat_map(|m| {
        [
            m.name.as_str(),
            m.func_field.as_str(),
            m.lock.as_str(),
            m.called.as_str(),
            m.calls.as_str(),
        ]
    });
    for member in fixed.into_iter().chain(generated) {
        if !members.insert(member) {
            return Err(Error::MemberCollision {
                mock: mock.to_string(),
                member: member.to_string(),
            });
        }
    }
    Ok(())
}

pub(crate) fn method_context(scope: &Scope<'_>, mock_name: &str, m: &Method) -> MethodContext {
    let mut locals = scope.method_allocator(m);
    let mut field_names = IdentifierAllocator::default();

    let mut names = Vec::new();
    let mut sig_types = Vec::new();
    let mut fields = Vec::new();
    for (i, p) in m.inputs().enumerate() {
        let declared = p
            .declared_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("arg{}", i));
        let local = locals.allocate(&declared);

        let rendered = scope.render(&p.ty);
        let is_variadic = i == m.params.len();
        let (sig_ty, record_ty) = if is_variadic {
            (format!("...{}", rendered), format!("[]{}", rendered))
        } else {
            (rendered.clone(), rendered)
        };

        fields.push(FieldContext {
            name: field_names.allocate(&capitalize(&declared)),
            ty: record_ty,
            value: local.clone(),
        });
        names.push(local);
        sig_types.push(sig_ty);
    }

    let results: Vec<String> = m.results.iter().map(|p| scope.render(&p.ty)).collect();
    let results = results_suffix(&results);
    let params = join_params(&names, &sig_types);

    let receiver = locals.allocate("m");
    let record = locals.allocate("call");

    let mut snapshot_locals = scope.method_allocator(m);
    snapshot_locals.reserve(receiver.clone());
    let snapshot = snapshot_locals.allocate("calls");

    let func_field = format!("{}Func", m.name);
    let mut call_args = names.join(", ");
    if m.variadic.is_some() {
        call_args.push_str("...");
    }
    let invoke = format!("{}.{}({})", receiver, func_field, call_args);
    let forward = if m.results.is_empty() {
        invoke
    } else {
        format!("return {}", invoke)
    };

    MethodContext {
        name: m.name.clone(),
        lock: format!("lock{}", m.name),
        called: format!("{}Called", m.name),
        calls: format!("{}Calls", m.name),
        stub_type: format!("func({}){}", params, results),
        panic_message: missing_stub_message(mock_name, &m.name),
        func_field,
        receiver,
        params,
        results,
        fields,
        record,
        snapshot,
        forward,
    }
}

/// Join parameters, writing a type once for a run of identical types.
pub(crate) fn join_params(names: &[String], types: &[String]) -> String {
    let mut args = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if i + 1 < types.len() && types[i] == types[i + 1] {
            args.push(name.clone());
        } else {
            args.push(format!("{} {}", name, types[i]));
        }
    }
    args.join(", ")
}
