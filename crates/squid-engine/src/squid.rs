//! Analysis coordinator and query facade.

use crate::context::AnalysisContext;
use crate::error::SquidError;
use crate::metrics::{
    compute_coupling, compute_dit, compute_noc, Lcom4Visitor, RfcVisitor, TypeHierarchy,
};
use crate::report::ScanReport;
use crate::scan::{BytecodeScanner, SourceScanner};
use crate::visitor::{CodeVisitor, Subscription, VisitorRegistry};
use serde::Serialize;
use squid_core::{
    ClassDecoder, Element, ElementId, ElementKind, MeasureValue, Metric, SourceParser, SquidConfig,
};
use squid_graph::{DependencyGraph, Edge, EdgeKind, GraphEdge, StructuralIndex};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// One analysis run.
///
/// Owns the run context, the visitor registry and both collaborators.
/// [`Squid::scan_files`] consumes it and returns the frozen [`Analysis`].
pub struct Squid {
    ctx: AnalysisContext,
    registry: VisitorRegistry,
    source: SourceScanner,
    bytecode: BytecodeScanner,
}

impl Squid {
    /// Creates a run with the built-in RFC and LCOM4 visitors registered.
    pub fn new<P, D>(config: SquidConfig, parser: P, decoder: D) -> Self
    where
        P: SourceParser + 'static,
        D: ClassDecoder + 'static,
    {
        let mut registry = VisitorRegistry::new();
        registry.subscribe(Box::new(RfcVisitor::new()), Subscription::Bytecode);
        registry.subscribe(
            Box::new(Lcom4Visitor::new(config.fields_to_exclude_from_lcom4.clone())),
            Subscription::Bytecode,
        );

        Self {
            ctx: AnalysisContext::new(config),
            registry,
            source: SourceScanner::new(Box::new(parser)),
            bytecode: BytecodeScanner::new(Box::new(decoder)),
        }
    }

    /// Subscribes an external visitor to both pipelines.
    pub fn accept<V: CodeVisitor + 'static>(&mut self, visitor: V) {
        self.accept_on(visitor, Subscription::Both);
    }

    /// Subscribes an external visitor to the chosen pipelines.
    pub fn accept_on<V: CodeVisitor + 'static>(&mut self, visitor: V, subscription: Subscription) {
        self.registry.subscribe(Box::new(visitor), subscription);
    }

    /// Runs the source scan, the bytecode scan and the post-pass metrics.
    ///
    /// # Errors
    ///
    /// Returns [`SquidError::Visitor`] as soon as a visitor fails. Malformed
    /// inputs do not fail the run; see [`Analysis::report`].
    pub fn scan_files(
        mut self,
        sources: &[PathBuf],
        artifacts: &[PathBuf],
    ) -> Result<Analysis, SquidError> {
        let start = Instant::now();

        self.source
            .scan(sources, &mut self.ctx, &mut self.registry)?;
        self.bytecode
            .scan(artifacts, &mut self.ctx, &mut self.registry)?;

        let post = Instant::now();
        let ctx = &mut self.ctx;
        ctx.graph.add_type_vertices(&ctx.index);
        let hierarchy = TypeHierarchy::build(ctx);
        compute_dit(ctx, &hierarchy)?;
        compute_noc(ctx, &hierarchy)?;
        compute_coupling(ctx)?;
        info!("Post-pass metrics done in {}ms", post.elapsed().as_millis());

        info!(
            "Analysis done in {}ms: {} elements, {} vertices, {} edges, {} issues",
            start.elapsed().as_millis(),
            self.ctx.index.len(),
            self.ctx.graph.vertex_count(),
            self.ctx.graph.edge_count(),
            self.ctx.report.issues.len()
        );

        Ok(Analysis { ctx: self.ctx })
    }
}

/// The frozen result of a run.
#[derive(Debug)]
pub struct Analysis {
    ctx: AnalysisContext,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    elements: Vec<&'a Element>,
    edges: Vec<GraphEdge>,
    report: &'a ScanReport,
}

impl Analysis {
    pub fn find(&self, key: &str) -> Option<&Element> {
        self.ctx.index.find(key)
    }

    pub fn query(&self, kind: ElementKind) -> Vec<&Element> {
        self.ctx.index.query(kind)
    }

    pub fn search<P>(&self, predicate: P) -> Vec<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.ctx.index.search(predicate)
    }

    /// Gets a built-in metric of an element.
    pub fn measure(&self, key: &str, metric: Metric) -> Option<MeasureValue> {
        self.find(key)?.metric(metric)
    }

    /// Gets a measure by name, including those attached by external visitors.
    pub fn measure_named(&self, key: &str, name: &str) -> Option<MeasureValue> {
        self.find(key)?.measure(name)
    }

    /// Returns true if any edge goes from `source` to `target`.
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.id(source), self.id(target)) {
            (Some(s), Some(t)) => self.ctx.graph.has_edge(s, t),
            _ => false,
        }
    }

    pub fn get_edge(&self, source: &str, target: &str, kind: EdgeKind) -> Option<&Edge> {
        self.ctx
            .graph
            .get_edge(self.id(source)?, self.id(target)?, kind)
    }

    pub fn edges_between(&self, source: &str, target: &str) -> Vec<&Edge> {
        match (self.id(source), self.id(target)) {
            (Some(s), Some(t)) => self.ctx.graph.edges_between(s, t),
            _ => Vec::new(),
        }
    }

    /// Returns the graph vertices in insertion order.
    pub fn vertices(&self) -> Vec<&Element> {
        self.ctx
            .graph
            .vertices()
            .into_iter()
            .filter_map(|id| self.ctx.index.get(id))
            .collect()
    }

    pub fn outgoing_edges(&self, key: &str) -> Vec<&Edge> {
        self.id(key)
            .map(|id| self.ctx.graph.outgoing(id))
            .unwrap_or_default()
    }

    pub fn incoming_edges(&self, key: &str) -> Vec<&Edge> {
        self.id(key)
            .map(|id| self.ctx.graph.incoming(id))
            .unwrap_or_default()
    }

    /// Gets every edge with at least one endpoint among `keys`.
    ///
    /// Unknown keys are ignored.
    pub fn edges_touching(&self, keys: &[&str]) -> Vec<&Edge> {
        let ids: Vec<_> = keys.iter().filter_map(|k| self.id(k)).collect();
        self.ctx.graph.edges_touching(&ids)
    }

    pub fn export_edges(&self) -> Vec<GraphEdge> {
        self.ctx.graph.export_edges(&self.ctx.index)
    }

    pub fn report(&self) -> &ScanReport {
        &self.ctx.report
    }

    pub fn index(&self) -> &StructuralIndex {
        &self.ctx.index
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.ctx.graph
    }

    pub fn config(&self) -> &SquidConfig {
        &self.ctx.config
    }

    /// Serializes elements, edges and the scan report to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let snapshot = Snapshot {
            elements: self.ctx.index.iter().collect(),
            edges: self.export_edges(),
            report: &self.ctx.report,
        };
        serde_json::to_string_pretty(&snapshot)
    }

    fn id(&self, key: &str) -> Option<ElementId> {
        self.ctx.index.id_of(key)
    }
}
