//! Run-scoped analysis state.
//!
//! One context is created per analysis and passed by reference to both scan
//! pipelines and to every visitor they drive. Nothing here is global.

use crate::report::ScanReport;
use squid_core::{ElementId, MeasureValue, Metric, SquidConfig};
use squid_graph::{DependencyGraph, IndexError, StructuralIndex};
use std::collections::HashMap;

/// The model under construction.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    pub(crate) config: SquidConfig,
    pub(crate) index: StructuralIndex,
    pub(crate) graph: DependencyGraph,

    /// Immediate superclass of every bytecode-scanned type (`None` = root).
    pub(crate) superclasses: HashMap<ElementId, Option<ElementId>>,

    pub(crate) report: ScanReport,
}

impl AnalysisContext {
    /// Creates an empty context.
    pub fn new(config: SquidConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SquidConfig {
        &self.config
    }

    pub fn index(&self) -> &StructuralIndex {
        &self.index
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn report(&self) -> &ScanReport {
        &self.report
    }

    /// Attaches a measure to an element.
    pub fn attach(
        &mut self,
        id: ElementId,
        name: &str,
        value: impl Into<MeasureValue>,
    ) -> Result<(), IndexError> {
        self.index.attach_to(id, name, value)
    }

    /// Attaches one of the engine's own metrics to an element.
    pub fn attach_metric(
        &mut self,
        id: ElementId,
        metric: Metric,
        value: impl Into<MeasureValue>,
    ) -> Result<(), IndexError> {
        self.attach(id, metric.as_str(), value)
    }

    /// Records the immediate superclass of a type.
    pub fn record_superclass(&mut self, id: ElementId, superclass: Option<ElementId>) {
        self.superclasses.insert(id, superclass);
    }

    /// Returns the recorded superclass, or `None` for a root or an unscanned
    /// type.
    pub fn superclass_of(&self, id: ElementId) -> Option<ElementId> {
        self.superclasses.get(&id).copied().flatten()
    }

    /// Returns the key of the project that owns bytecode-only packages,
    /// registering it when the source scan reported none.
    pub(crate) fn ensure_project(&mut self) -> Result<String, IndexError> {
        if let Some(project) = self.index.project() {
            return Ok(project.key.clone());
        }
        let key = self.config.project_key.clone();
        self.index
            .register(&key, squid_core::ElementKind::Project, None)?;
        Ok(key)
    }
}
