//! Response For Class.

use crate::context::AnalysisContext;
use crate::visitor::{
    CodeVisitor, EventKind, MethodEvent, Phase, ReferenceEvent, TypeEvent, VisitResult,
};
use squid_core::{BodyFact, ElementId, ElementKind, Metric};
use std::collections::HashSet;

/// Counts the distinct methods a type declares or invokes.
///
/// Declared methods include those the source scan attached to the type.
/// Invoked methods are keyed by owner and signature, so repeated calls to
/// the same target count once.
#[derive(Debug, Default)]
pub struct RfcVisitor {
    current: Option<ElementId>,
    responses: HashSet<String>,
}

impl RfcVisitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeVisitor for RfcVisitor {
    fn name(&self) -> &str {
        "rfc"
    }

    fn interests(&self) -> &[EventKind] {
        &[
            EventKind::Type,
            EventKind::Method,
            EventKind::Reference,
            EventKind::LeaveType,
        ]
    }

    fn visit_type(&mut self, ctx: &mut AnalysisContext, event: &TypeEvent<'_>) -> VisitResult {
        if event.phase != Phase::Bytecode {
            return Ok(());
        }
        self.current = Some(event.element);
        self.responses = ctx
            .index
            .members(event.key, ElementKind::Method)
            .into_iter()
            .map(|m| m.key.clone())
            .collect();
        Ok(())
    }

    fn visit_method(&mut self, _ctx: &mut AnalysisContext, event: &MethodEvent<'_>) -> VisitResult {
        if event.phase == Phase::Bytecode && event.owner == self.current {
            self.responses.insert(event.key.to_string());
        }
        Ok(())
    }

    fn visit_reference(
        &mut self,
        _ctx: &mut AnalysisContext,
        event: &ReferenceEvent<'_>,
    ) -> VisitResult {
        if let BodyFact::Call(call) = event.fact {
            if Some(event.from_type) == self.current {
                self.responses.insert(call.target_key());
            }
        }
        Ok(())
    }

    fn leave_type(&mut self, ctx: &mut AnalysisContext, event: &TypeEvent<'_>) -> VisitResult {
        if self.current.take() != Some(event.element) {
            return Ok(());
        }
        let rfc = std::mem::take(&mut self.responses).len();
        ctx.attach_metric(event.element, Metric::Rfc, rfc)?;
        Ok(())
    }
}
