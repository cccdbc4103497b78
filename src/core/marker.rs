// This module implements cross-stage operation targeting. A Marker records that a given
// stage processed an operation; instead of being stored as an attribute on the IR, markers
// live in a MarkerTable, an explicit insert-only set of (operation id, marker) pairs that a
// run threads alongside the payload IR. MarkerFilter is the predicate a stage consults for
// every candidate operation: it ANDs marker presence/absence conditions, exact operation
// name constraints, and caller supplied predicates, and it never writes anything. OpId and
// OpRef are the minimal operation identity and borrowed view a filter needs.

//! Markers, marker tables and marker filters.

use hashbrown::HashSet;
use std::fmt;
use std::sync::Arc;

/// Host assigned identity of a payload operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub u32);

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Borrowed view of one operation, as seen by filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpRef<'a> {
    pub id: OpId,
    pub name: &'a str,
}

impl<'a> OpRef<'a> {
    pub fn new(id: OpId, name: &'a str) -> Self {
        Self { id, name }
    }
}

/// Caller supplied operation predicate attached to a transformation step.
pub type OpPredicate = Arc<dyn Fn(&OpRef<'_>) -> bool + Send + Sync>;

/// Wrap a closure as an [`OpPredicate`].
pub fn op_predicate<F>(f: F) -> OpPredicate
where
    F: Fn(&OpRef<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Tag recording that the stage `stage` of a strategy processed an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker<'ctx> {
    namespace: &'ctx str,
    stage: usize,
}

impl<'ctx> Marker<'ctx> {
    pub fn new(namespace: &'ctx str, stage: usize) -> Self {
        Self { namespace, stage }
    }

    pub fn namespace(&self) -> &'ctx str {
        self.namespace
    }

    pub fn stage(&self) -> usize {
        self.stage
    }
}

impl fmt::Display for Marker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace, self.stage)
    }
}

/// Markers written during one pipeline run.
///
/// Entries are only ever added; the table is dropped with the run.
#[derive(Debug, Clone, Default)]
pub struct MarkerTable<'ctx> {
    marks: HashSet<(OpId, Marker<'ctx>)>,
}

impl<'ctx> MarkerTable<'ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `marker` on `op`. Returns false if it was already present.
    pub fn mark(&mut self, op: OpId, marker: Marker<'ctx>) -> bool {
        self.marks.insert((op, marker))
    }

    pub fn has(&self, op: OpId, marker: Marker<'ctx>) -> bool {
        self.marks.contains(&(op, marker))
    }

    /// Does `op` carry any marker of `namespace`?
    pub fn has_any(&self, op: OpId, namespace: &str) -> bool {
        self.marks
            .iter()
            .any(|(id, marker)| *id == op && marker.namespace == namespace)
    }

    /// All markers recorded on `op`, ordered by stage.
    pub fn markers_of(&self, op: OpId) -> Vec<Marker<'ctx>> {
        let mut markers: Vec<_> = self
            .marks
            .iter()
            .filter(|(id, _)| *id == op)
            .map(|(_, marker)| *marker)
            .collect();
        markers.sort_by_key(|m| (m.stage, m.namespace));
        markers
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// One marker constraint of a [`MarkerFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerCondition<'ctx> {
    Present(Marker<'ctx>),
    Absent(Marker<'ctx>),
    /// No marker of the namespace at all.
    NoMarkerIn(&'ctx str),
}

impl<'ctx> MarkerCondition<'ctx> {
    fn holds(&self, op: OpId, markers: &MarkerTable<'ctx>) -> bool {
        match *self {
            MarkerCondition::Present(marker) => markers.has(op, marker),
            MarkerCondition::Absent(marker) => !markers.has(op, marker),
            MarkerCondition::NoMarkerIn(namespace) => !markers.has_any(op, namespace),
        }
    }
}

/// Predicate selecting which operations a stage applies to.
///
/// Every constraint is ANDed; a filter without constraints matches every
/// operation. Filters are evaluated fresh for each operation.
#[derive(Clone, Default)]
pub struct MarkerFilter<'ctx> {
    conditions: Vec<MarkerCondition<'ctx>>,
    op_names: Vec<String>,
    predicates: Vec<OpPredicate>,
}

impl<'ctx> MarkerFilter<'ctx> {
    /// Filter matching every operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `marker` to be present on the operation.
    pub fn require_marker(mut self, marker: Marker<'ctx>) -> Self {
        self.conditions.push(MarkerCondition::Present(marker));
        self
    }

    /// Require `marker` to be absent from the operation.
    pub fn exclude_marker(mut self, marker: Marker<'ctx>) -> Self {
        self.conditions.push(MarkerCondition::Absent(marker));
        self
    }

    /// Reject operations carrying any marker of `namespace`.
    pub fn exclude_namespace(mut self, namespace: &'ctx str) -> Self {
        self.conditions.push(MarkerCondition::NoMarkerIn(namespace));
        self
    }

    /// Require the operation name to be exactly `name`.
    pub fn with_op_name(mut self, name: impl Into<String>) -> Self {
        self.op_names.push(name.into());
        self
    }

    pub fn with_predicate(mut self, predicate: OpPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Conjunction of two filters.
    pub fn and(mut self, other: MarkerFilter<'ctx>) -> Self {
        self.conditions.extend(other.conditions);
        self.op_names.extend(other.op_names);
        self.predicates.extend(other.predicates);
        self
    }

    pub fn conditions(&self) -> &[MarkerCondition<'ctx>] {
        &self.conditions
    }

    pub fn op_names(&self) -> &[String] {
        &self.op_names
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.conditions.is_empty() && self.op_names.is_empty() && self.predicates.is_empty()
    }

    /// Does `op` pass every constraint given the markers recorded so far?
    pub fn matches(&self, op: &OpRef<'_>, markers: &MarkerTable<'ctx>) -> bool {
        self.conditions.iter().all(|c| c.holds(op.id, markers))
            && self.op_names.iter().all(|name| name == op.name)
            && self.predicates.iter().all(|p| p(op))
    }
}

impl PartialEq for MarkerFilter<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.conditions == other.conditions
            && self.op_names == other.op_names
            && self.predicates.len() == other.predicates.len()
            && self
                .predicates
                .iter()
                .zip(&other.predicates)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl fmt::Debug for MarkerFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerFilter")
            .field("conditions", &self.conditions)
            .field("op_names", &self.op_names)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

impl fmt::Display for MarkerFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for condition in &self.conditions {
            match condition {
                MarkerCondition::Present(m) => parts.push(format!("+{}", m)),
                MarkerCondition::Absent(m) => parts.push(format!("-{}", m)),
                MarkerCondition::NoMarkerIn(ns) => parts.push(format!("-{}*", ns)),
            }
        }
        for name in &self.op_names {
            parts.push(format!("op={}", name));
        }
        if !self.predicates.is_empty() {
            parts.push(format!("predicates={}", self.predicates.len()));
        }
        if parts.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}
