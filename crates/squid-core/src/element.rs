//! Element types for the structural index.
//!
//! An element is one program unit: a project, package, source file, type,
//! member or an external placeholder. Elements are owned by the index and
//! referred to by [`ElementId`] handles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable handle to an element inside one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(usize);

impl ElementId {
    /// Creates a handle from a raw slot number.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw slot number.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of program unit an element represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// The analyzed project (root of the ownership tree).
    Project,
    /// A package / namespace.
    Package,
    /// A source file.
    File,
    /// A class, interface, enum or annotation type.
    Type,
    /// A method or constructor.
    Method,
    /// A field.
    Field,
    /// A type known only as a dependency target.
    External,
}

impl ElementKind {
    /// Returns true for kinds that can be dependency graph vertices.
    pub fn is_type_level(self) -> bool {
        matches!(self, Self::Type | Self::External)
    }

    /// Returns true for kinds owned by a type.
    pub fn is_member(self) -> bool {
        matches!(self, Self::Method | Self::Field)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Package => "package",
            Self::File => "file",
            Self::Type => "type",
            Self::Method => "method",
            Self::Field => "field",
            Self::External => "external",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics computed by the engine itself.
///
/// External visitors may attach measures under any other name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Depth of inheritance tree.
    Dit,
    /// Number of children.
    Noc,
    /// Response for class.
    Rfc,
    /// Lack of cohesion of methods (connected components variant).
    Lcom4,
    /// Afferent coupling.
    Ca,
    /// Efferent coupling.
    Ce,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dit => "dit",
            Self::Noc => "noc",
            Self::Rfc => "rfc",
            Self::Lcom4 => "lcom4",
            Self::Ca => "ca",
            Self::Ce => "ce",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric value.
///
/// Computation faults are stored as sentinels instead of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureValue {
    Number(f64),
    /// The inheritance chain of the element loops back on itself.
    Cycle,
}

impl MeasureValue {
    /// Returns the numeric value, or `None` for a fault sentinel.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value),
            Self::Cycle => None,
        }
    }

    pub fn is_fault(self) -> bool {
        matches!(self, Self::Cycle)
    }
}

impl From<f64> for MeasureValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for MeasureValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Cycle => f.write_str("cycle"),
        }
    }
}

/// One program unit in the structural index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Handle of this element.
    pub id: ElementId,

    /// Unique key (see [`crate::key`]).
    pub key: String,

    /// What kind of unit this is.
    pub kind: ElementKind,

    /// Owning element, if any.
    pub parent: Option<ElementId>,

    /// Owned elements in registration order.
    pub children: Vec<ElementId>,

    /// Metric name to value.
    pub measures: BTreeMap<String, MeasureValue>,
}

impl Element {
    /// Creates an element with no parent, children or measures.
    pub fn new(id: ElementId, key: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id,
            key: key.into(),
            kind,
            parent: None,
            children: Vec::new(),
            measures: BTreeMap::new(),
        }
    }

    /// Looks up a measure by name.
    pub fn measure(&self, name: &str) -> Option<MeasureValue> {
        self.measures.get(name).copied()
    }

    /// Looks up one of the engine's own metrics.
    pub fn metric(&self, metric: Metric) -> Option<MeasureValue> {
        self.measure(metric.as_str())
    }

    /// Convenience accessor for numeric metrics.
    pub fn metric_f64(&self, metric: Metric) -> Option<f64> {
        self.metric(metric).and_then(MeasureValue::as_f64)
    }

    pub fn is_external(&self) -> bool {
        self.kind == ElementKind::External
    }
}
