//! In-memory workflow definition consumed by the graph extractor
//!
//! A definition is an ordered set of executor bindings plus edge groups keyed
//! by source executor id. It is read-only input to
//! [`build_routing_model`](super::build_routing_model) and
//! [`classify_executors`](super::classify_executors).

use super::condition::EdgeCondition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a type by its fully qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A generic specialization: the unspecialized definition plus its type arguments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenericSpec {
    /// Name of the unspecialized form, e.g. `Executor` or ``core::Executor`2``
    pub definition: String,

    /// Ordered type arguments
    #[serde(default)]
    pub args: Vec<TypeRef>,
}

impl GenericSpec {
    pub fn new(definition: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            definition: definition.into(),
            args,
        }
    }

    /// Whether the unspecialized form belongs to the `Executor` family.
    ///
    /// Any arity suffix (`` Executor`2 ``) or angle-bracket parameter list is
    /// cut first, so qualified parameters never leak into the comparison.
    /// Only the last path segment of what remains is compared.
    pub fn is_executor_family(&self) -> bool {
        let head = self
            .definition
            .split(|c: char| c == '`' || c == '<')
            .next()
            .unwrap_or_default();
        let last = head
            .rsplit(|c: char| c == ':' || c == '.')
            .next()
            .unwrap_or_default()
            .trim();
        last == "Executor"
    }
}

/// Identity of an executor implementation type
///
/// `base` makes the type hierarchy walkable from the concrete type upward.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDescriptor {
    /// Simple type name
    pub name: String,

    /// Declaring module, package or namespace
    #[serde(default)]
    pub module: String,

    /// Set when this type is a generic specialization
    pub generic: Option<GenericSpec>,

    /// Base type, if any
    pub base: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            generic: None,
            base: None,
        }
    }

    /// A generic specialization such as `Executor<A, B>`
    pub fn specialization(definition: impl Into<String>, args: Vec<TypeRef>) -> Self {
        let definition = definition.into();
        Self {
            name: definition.clone(),
            module: String::new(),
            generic: Some(GenericSpec::new(definition, args)),
            base: None,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn with_base(mut self, base: TypeDescriptor) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    /// Fully qualified name (`module::name`, or just `name` without a module)
    pub fn full_name(&self) -> String {
        if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.module, self.name)
        }
    }

    /// Iterate this type and its ancestors, closest first
    pub fn ancestry(&self) -> impl Iterator<Item = &TypeDescriptor> {
        std::iter::successors(Some(self), |t| t.base.as_deref())
    }
}

/// Reference to a human-in-the-loop request port
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestPortRef {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_type: Option<TypeRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<TypeRef>,
}

impl RequestPortRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            request_type: None,
            response_type: None,
        }
    }
}

/// Reference to a nested workflow definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowRef {
    pub name: String,
}

impl WorkflowRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Output type declared up front by the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredOutput {
    Void,
    Typed(TypeRef),
}

/// What every binding knows about its executor implementation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutorSpec {
    pub implementation: TypeDescriptor,

    /// Explicit output declaration; takes precedence over the hierarchy walk
    pub declared_output: Option<DeclaredOutput>,

    /// Explicit agent tag; takes precedence over name matching
    pub agentic: Option<bool>,
}

impl ExecutorSpec {
    pub fn new(implementation: TypeDescriptor) -> Self {
        Self {
            implementation,
            declared_output: None,
            agentic: None,
        }
    }

    pub fn with_output(mut self, output: DeclaredOutput) -> Self {
        self.declared_output = Some(output);
        self
    }

    pub fn with_agentic(mut self, agentic: bool) -> Self {
        self.agentic = Some(agentic);
        self
    }
}

/// How an executor is bound into a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorBinding {
    Plain(ExecutorSpec),
    RequestPort {
        spec: ExecutorSpec,
        port: RequestPortRef,
    },
    SubWorkflow {
        spec: ExecutorSpec,
        workflow: WorkflowRef,
    },
}

impl ExecutorBinding {
    pub fn spec(&self) -> &ExecutorSpec {
        match self {
            Self::Plain(spec)
            | Self::RequestPort { spec, .. }
            | Self::SubWorkflow { spec, .. } => spec,
        }
    }

    pub fn implementation(&self) -> &TypeDescriptor {
        &self.spec().implementation
    }
}

/// Source and sink ids an edge connects
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EdgeConnection {
    pub source_ids: Vec<String>,
    pub sink_ids: Vec<String>,
}

/// Metadata of a direct (one source, one sink) edge
#[derive(Debug, Clone, PartialEq)]
pub struct DirectEdgeData {
    pub source_id: String,
    pub sink_id: String,
    pub condition: Option<EdgeCondition>,
}

/// A routing link from one or more sources to one or more sinks
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub connection: EdgeConnection,
    pub direct: Option<DirectEdgeData>,
}

impl Edge {
    /// Edge with an explicit connection and optional direct metadata
    pub fn new(connection: EdgeConnection, direct: Option<DirectEdgeData>) -> Self {
        Self { connection, direct }
    }

    pub fn direct(
        source: impl Into<String>,
        sink: impl Into<String>,
        condition: Option<EdgeCondition>,
    ) -> Self {
        let source = source.into();
        let sink = sink.into();
        Self {
            connection: EdgeConnection {
                source_ids: vec![source.clone()],
                sink_ids: vec![sink.clone()],
            },
            direct: Some(DirectEdgeData {
                source_id: source,
                sink_id: sink,
                condition,
            }),
        }
    }

    pub fn fan_out<I, S>(source: impl Into<String>, sinks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            connection: EdgeConnection {
                source_ids: vec![source.into()],
                sink_ids: sinks.into_iter().map(Into::into).collect(),
            },
            direct: None,
        }
    }

    pub fn fan_in<I, S>(sources: I, sink: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            connection: EdgeConnection {
                source_ids: sources.into_iter().map(Into::into).collect(),
                sink_ids: vec![sink.into()],
            },
            direct: None,
        }
    }

    pub fn sink_ids(&self) -> &[String] {
        &self.connection.sink_ids
    }
}

/// A workflow: executors, edges and the entry point
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowDefinition {
    name: String,
    start_executor_id: String,
    executors: Vec<(String, ExecutorBinding)>,
    edges: Vec<(String, Vec<Edge>)>,
}

impl WorkflowDefinition {
    pub fn new(name: impl Into<String>, start_executor_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_executor_id: start_executor_id.into(),
            executors: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_executor_id(&self) -> &str {
        &self.start_executor_id
    }

    /// Bind an executor. Re-binding an existing id replaces it in place.
    pub fn add_executor(&mut self, id: impl Into<String>, binding: ExecutorBinding) {
        let id = id.into();
        match self.executors.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = binding,
            None => self.executors.push((id, binding)),
        }
    }

    pub fn with_executor(mut self, id: impl Into<String>, binding: ExecutorBinding) -> Self {
        self.add_executor(id, binding);
        self
    }

    /// Add an edge to the group keyed by `source_id`
    pub fn add_edge(&mut self, source_id: impl Into<String>, edge: Edge) {
        let source_id = source_id.into();
        match self.edges.iter_mut().find(|(existing, _)| *existing == source_id) {
            Some((_, group)) => group.push(edge),
            None => self.edges.push((source_id, vec![edge])),
        }
    }

    pub fn with_edge(mut self, source_id: impl Into<String>, edge: Edge) -> Self {
        self.add_edge(source_id, edge);
        self
    }

    /// Unconditional direct edge
    pub fn connect(self, source: &str, sink: &str) -> Self {
        self.with_edge(source, Edge::direct(source, sink, None))
    }

    /// Conditional direct edge
    pub fn connect_if(self, source: &str, sink: &str, condition: EdgeCondition) -> Self {
        self.with_edge(source, Edge::direct(source, sink, Some(condition)))
    }

    /// Executor bindings in insertion order
    pub fn executors(&self) -> impl Iterator<Item = (&str, &ExecutorBinding)> {
        self.executors.iter().map(|(id, b)| (id.as_str(), b))
    }

    pub fn executor(&self, id: &str) -> Option<&ExecutorBinding> {
        self.executors
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, b)| b)
    }

    pub fn executor_count(&self) -> usize {
        self.executors.len()
    }

    /// Edge groups keyed by source id, in declaration order
    pub fn edge_groups(&self) -> impl Iterator<Item = (&str, &[Edge])> {
        self.edges.iter().map(|(id, g)| (id.as_str(), g.as_slice()))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|(_, g)| g.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_family_names() {
        assert!(GenericSpec::new("Executor", vec![]).is_executor_family());
        assert!(GenericSpec::new("core::Executor", vec![]).is_executor_family());
        assert!(GenericSpec::new("Workflows.Executor`2", vec![]).is_executor_family());
        assert!(GenericSpec::new("Executor<TIn, TOut>", vec![]).is_executor_family());
        assert!(GenericSpec::new("Executor<core::In, core::Out>", vec![]).is_executor_family());
        assert!(
            GenericSpec::new("core::Executor<app.In, app.Out>", vec![]).is_executor_family()
        );
        assert!(!GenericSpec::new("Wrapper<core::Executor>", vec![]).is_executor_family());
        assert!(!GenericSpec::new("ReflectingExecutor", vec![]).is_executor_family());
        assert!(!GenericSpec::new("Executors", vec![]).is_executor_family());
    }

    #[test]
    fn test_full_name() {
        let ty = TypeDescriptor::new("Doubler", "demo::steps");
        assert_eq!(ty.full_name(), "demo::steps::Doubler");
        assert_eq!(TypeDescriptor::new("Doubler", "").full_name(), "Doubler");
    }

    #[test]
    fn test_ancestry_closest_first() {
        let ty = TypeDescriptor::new("Derived", "app").with_base(
            TypeDescriptor::new("Middle", "app").with_base(TypeDescriptor::new("Root", "app")),
        );
        let names: Vec<_> = ty.ancestry().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Derived", "Middle", "Root"]);
    }

    #[test]
    fn test_add_executor_replaces_existing() {
        let mut wf = WorkflowDefinition::new("wf", "a");
        wf.add_executor("a", ExecutorBinding::Plain(ExecutorSpec::default()));
        wf.add_executor("b", ExecutorBinding::Plain(ExecutorSpec::default()));
        wf.add_executor(
            "a",
            ExecutorBinding::RequestPort {
                spec: ExecutorSpec::default(),
                port: RequestPortRef::new("approve"),
            },
        );

        let ids: Vec<_> = wf.executors().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(matches!(
            wf.executor("a"),
            Some(ExecutorBinding::RequestPort { .. })
        ));
    }

    #[test]
    fn test_edges_grouped_by_source() {
        let wf = WorkflowDefinition::new("wf", "a")
            .connect("a", "b")
            .connect("b", "c")
            .connect("a", "c");

        let groups: Vec<_> = wf.edge_groups().map(|(s, g)| (s, g.len())).collect();
        assert_eq!(groups, vec![("a", 2), ("b", 1)]);
        assert_eq!(wf.edge_count(), 3);
    }

    #[test]
    fn test_fan_edges_have_no_direct_data() {
        let out = Edge::fan_out("a", ["b", "c"]);
        assert_eq!(out.sink_ids().to_vec(), vec!["b".to_string(), "c".to_string()]);
        assert!(out.direct.is_none());

        let fan_in = Edge::fan_in(["a", "b"], "c");
        assert_eq!(fan_in.connection.source_ids.len(), 2);
        assert!(fan_in.direct.is_none());
    }
}
