//! Visitor registry - the extension point of the scan pipelines.
//!
//! Metric algorithms and external checks implement [`CodeVisitor`] and
//! subscribe to the source pipeline, the bytecode pipeline or both. The
//! pipelines only know the registry, never the visitors themselves.
//!
//! Dispatch follows registration order. The first visitor error aborts the
//! run: metrics computed by a crashing visitor are not trusted.

use crate::context::AnalysisContext;
use crate::error::SquidError;
use serde::{Deserialize, Serialize};
use squid_core::{BodyFact, ElementId, FieldDecl};
use std::collections::HashMap;
use std::fmt;
use tracing::error;

/// Error type returned by visitors.
pub type VisitorError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by visitor callbacks.
pub type VisitResult = Result<(), VisitorError>;

/// Which pipeline produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Source,
    Bytecode,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Source => write!(f, "source"),
            Phase::Bytecode => write!(f, "bytecode"),
        }
    }
}

/// The callbacks a visitor can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Type,
    Method,
    Reference,
    LeaveType,
    EndScan,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Type,
        EventKind::Method,
        EventKind::Reference,
        EventKind::LeaveType,
        EventKind::EndScan,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Type => "visit_type",
            EventKind::Method => "visit_method",
            EventKind::Reference => "visit_reference",
            EventKind::LeaveType => "leave_type",
            EventKind::EndScan => "end_scan",
        };
        write!(f, "{}", s)
    }
}

/// Which pipelines a visitor listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Source,
    Bytecode,
    Both,
}

impl Subscription {
    fn phases(self) -> &'static [Phase] {
        match self {
            Subscription::Source => &[Phase::Source],
            Subscription::Bytecode => &[Phase::Bytecode],
            Subscription::Both => &[Phase::Source, Phase::Bytecode],
        }
    }
}

/// A type was registered.
///
/// Source events carry no supertypes or fields; the source parser reports
/// ownership only.
#[derive(Debug, Clone, Copy)]
pub struct TypeEvent<'a> {
    pub phase: Phase,
    pub element: ElementId,
    pub key: &'a str,
    pub superclass: Option<&'a str>,
    pub interfaces: &'a [String],
    pub fields: &'a [FieldDecl],
}

impl<'a> TypeEvent<'a> {
    /// An event for a type seen by the source pipeline.
    pub fn source(element: ElementId, key: &'a str) -> Self {
        Self {
            phase: Phase::Source,
            element,
            key,
            superclass: None,
            interfaces: &[],
            fields: &[],
        }
    }
}

/// A method was registered.
#[derive(Debug, Clone, Copy)]
pub struct MethodEvent<'a> {
    pub phase: Phase,
    pub element: ElementId,
    pub key: &'a str,
    /// Owning element, when known.
    pub owner: Option<ElementId>,
    /// Name and descriptor, e.g. `m()V`.
    pub signature: &'a str,
}

/// A call or field access was found in a method body.
///
/// Only the bytecode pipeline emits references.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceEvent<'a> {
    pub from_type: ElementId,
    pub from_type_key: &'a str,
    pub from_method_key: &'a str,
    pub fact: &'a BodyFact,
}

/// Observer of scan events.
///
/// Every callback defaults to a no-op. Visitors write their results into
/// the context (usually through [`AnalysisContext::attach`]).
pub trait CodeVisitor {
    /// Name used in error reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Events this visitor wants. Defaults to all of them.
    fn interests(&self) -> &[EventKind] {
        &EventKind::ALL
    }

    fn visit_type(&mut self, _ctx: &mut AnalysisContext, _event: &TypeEvent<'_>) -> VisitResult {
        Ok(())
    }

    fn visit_method(
        &mut self,
        _ctx: &mut AnalysisContext,
        _event: &MethodEvent<'_>,
    ) -> VisitResult {
        Ok(())
    }

    fn visit_reference(
        &mut self,
        _ctx: &mut AnalysisContext,
        _event: &ReferenceEvent<'_>,
    ) -> VisitResult {
        Ok(())
    }

    /// Called once all methods of a bytecode type have been visited.
    fn leave_type(&mut self, _ctx: &mut AnalysisContext, _event: &TypeEvent<'_>) -> VisitResult {
        Ok(())
    }

    /// Called once at the end of a pipeline.
    fn end_scan(&mut self, _ctx: &mut AnalysisContext, _phase: Phase) -> VisitResult {
        Ok(())
    }
}

/// Ordered subscriber lists per (pipeline, event).
#[derive(Default)]
pub struct VisitorRegistry {
    visitors: Vec<Box<dyn CodeVisitor>>,
    subscribers: HashMap<(Phase, EventKind), Vec<usize>>,
}

impl VisitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a visitor to the events it is interested in.
    pub fn subscribe(&mut self, visitor: Box<dyn CodeVisitor>, subscription: Subscription) {
        let slot = self.visitors.len();
        for &phase in subscription.phases() {
            for &event in visitor.interests() {
                self.subscribers.entry((phase, event)).or_default().push(slot);
            }
        }
        self.visitors.push(visitor);
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// Number of visitors subscribed to one event of one pipeline.
    pub fn subscriber_count(&self, phase: Phase, event: EventKind) -> usize {
        self.subscribers
            .get(&(phase, event))
            .map_or(0, |slots| slots.len())
    }

    pub fn visit_type(
        &mut self,
        ctx: &mut AnalysisContext,
        event: &TypeEvent<'_>,
    ) -> Result<(), SquidError> {
        self.dispatch(event.phase, EventKind::Type, |v| v.visit_type(ctx, event))
    }

    pub fn visit_method(
        &mut self,
        ctx: &mut AnalysisContext,
        event: &MethodEvent<'_>,
    ) -> Result<(), SquidError> {
        self.dispatch(event.phase, EventKind::Method, |v| {
            v.visit_method(ctx, event)
        })
    }

    pub fn visit_reference(
        &mut self,
        ctx: &mut AnalysisContext,
        event: &ReferenceEvent<'_>,
    ) -> Result<(), SquidError> {
        self.dispatch(Phase::Bytecode, EventKind::Reference, |v| {
            v.visit_reference(ctx, event)
        })
    }

    pub fn leave_type(
        &mut self,
        ctx: &mut AnalysisContext,
        event: &TypeEvent<'_>,
    ) -> Result<(), SquidError> {
        self.dispatch(event.phase, EventKind::LeaveType, |v| {
            v.leave_type(ctx, event)
        })
    }

    pub fn end_scan(&mut self, ctx: &mut AnalysisContext, phase: Phase) -> Result<(), SquidError> {
        self.dispatch(phase, EventKind::EndScan, |v| v.end_scan(ctx, phase))
    }

    fn dispatch<F>(&mut self, phase: Phase, event: EventKind, mut call: F) -> Result<(), SquidError>
    where
        F: FnMut(&mut Box<dyn CodeVisitor>) -> VisitResult,
    {
        let Some(slots) = self.subscribers.get(&(phase, event)) else {
            return Ok(());
        };
        for &slot in slots {
            let visitor = &mut self.visitors[slot];
            if let Err(source) = call(&mut *visitor) {
                let name = visitor.name().to_string();
                error!("Visitor {} failed on {} ({} scan): {}", name, event, phase, source);
                return Err(SquidError::Visitor {
                    visitor: name,
                    phase,
                    event,
                    source,
                });
            }
        }
        Ok(())
    }
}
