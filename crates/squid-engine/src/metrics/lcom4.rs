//! LCOM4 cohesion.
//!
//! Methods and fields of one type are the nodes of an undirected graph. A
//! method is linked to every field it accesses and to every method of the
//! same type it calls. LCOM4 is the number of connected components; 1 means
//! the type is cohesive.

use crate::context::AnalysisContext;
use crate::visitor::{
    CodeVisitor, EventKind, MethodEvent, Phase, ReferenceEvent, TypeEvent, VisitResult,
};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use squid_core::{key, BodyFact, ElementId, Metric};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Builds one cohesion graph per bytecode type.
#[derive(Debug, Default)]
pub struct Lcom4Visitor {
    excluded: BTreeSet<String>,
    current: Option<CohesionGraph>,
}

#[derive(Debug)]
struct CohesionGraph {
    type_id: ElementId,
    type_key: String,
    graph: UnGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
    /// Calls between own methods, linked once every method is known.
    pending_calls: Vec<(String, String)>,
}

impl CohesionGraph {
    fn new(type_id: ElementId, type_key: &str) -> Self {
        Self {
            type_id,
            type_key: type_key.to_string(),
            graph: UnGraph::new_undirected(),
            nodes: HashMap::new(),
            pending_calls: Vec::new(),
        }
    }

    fn node(&mut self, member_key: &str) -> NodeIndex {
        if let Some(&node) = self.nodes.get(member_key) {
            return node;
        }
        let node = self.graph.add_node(member_key.to_string());
        self.nodes.insert(member_key.to_string(), node);
        node
    }

    fn link(&mut self, a: &str, b: &str) {
        let a = self.node(a);
        let b = self.node(b);
        if a != b && self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, ());
        }
    }

    fn components(mut self) -> usize {
        for (caller, callee) in std::mem::take(&mut self.pending_calls) {
            // Calls to inherited methods have no node here.
            if self.nodes.contains_key(&callee) {
                self.link(&caller, &callee);
            }
        }
        if self.graph.node_count() == 0 {
            return 0;
        }
        connected_components(&self.graph)
    }
}

impl Lcom4Visitor {
    /// Creates a visitor ignoring the named fields.
    pub fn new(excluded: BTreeSet<String>) -> Self {
        Self {
            excluded,
            current: None,
        }
    }

    fn is_excluded(&self, field_name: &str) -> bool {
        self.excluded.contains(field_name)
    }
}

impl CodeVisitor for Lcom4Visitor {
    fn name(&self) -> &str {
        "lcom4"
    }

    fn interests(&self) -> &[EventKind] {
        &[
            EventKind::Type,
            EventKind::Method,
            EventKind::Reference,
            EventKind::LeaveType,
        ]
    }

    fn visit_type(&mut self, _ctx: &mut AnalysisContext, event: &TypeEvent<'_>) -> VisitResult {
        if event.phase != Phase::Bytecode {
            return Ok(());
        }
        let mut cohesion = CohesionGraph::new(event.element, event.key);
        for field in event.fields {
            if !self.is_excluded(&field.name) {
                cohesion.node(&key::field_key(event.key, &field.name));
            }
        }
        self.current = Some(cohesion);
        Ok(())
    }

    fn visit_method(&mut self, _ctx: &mut AnalysisContext, event: &MethodEvent<'_>) -> VisitResult {
        if event.phase != Phase::Bytecode {
            return Ok(());
        }
        if let Some(cohesion) = self.current.as_mut() {
            if event.owner == Some(cohesion.type_id) {
                cohesion.node(event.key);
            }
        }
        Ok(())
    }

    fn visit_reference(
        &mut self,
        _ctx: &mut AnalysisContext,
        event: &ReferenceEvent<'_>,
    ) -> VisitResult {
        let excluded = match event.fact {
            BodyFact::FieldAccess(access) => self.is_excluded(&access.name),
            BodyFact::Call(_) => false,
        };
        let Some(cohesion) = self.current.as_mut() else {
            return Ok(());
        };
        if event.from_type != cohesion.type_id || event.fact.target_owner() != cohesion.type_key {
            return Ok(());
        }
        match event.fact {
            BodyFact::FieldAccess(access) if !excluded => {
                cohesion.link(event.from_method_key, &access.target_key());
            }
            BodyFact::Call(call) => {
                cohesion
                    .pending_calls
                    .push((event.from_method_key.to_string(), call.target_key()));
            }
            BodyFact::FieldAccess(_) => {}
        }
        Ok(())
    }

    fn leave_type(&mut self, ctx: &mut AnalysisContext, event: &TypeEvent<'_>) -> VisitResult {
        let Some(cohesion) = self.current.take() else {
            return Ok(());
        };
        if cohesion.type_id != event.element {
            return Ok(());
        }
        let lcom4 = cohesion.components();
        debug!("LCOM4 {} = {}", event.key, lcom4);
        ctx.attach_metric(event.element, Metric::Lcom4, lcom4)?;
        Ok(())
    }
}
