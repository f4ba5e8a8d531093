//! Bytecode-scan pipeline.

use crate::context::AnalysisContext;
use crate::error::SquidError;
use crate::report::ScanIssue;
use crate::visitor::{MethodEvent, Phase, ReferenceEvent, TypeEvent, VisitorRegistry};
use squid_core::{key, BodyFact, ClassDecoder, ClassFile, ElementId, ElementKind};
use squid_graph::{EdgeKind, IndexError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Drives the class decoder over a set of compiled artifacts.
pub struct BytecodeScanner {
    decoder: Box<dyn ClassDecoder>,
    /// Call sites already applied, keyed by calling method and site id.
    seen_sites: HashSet<(ElementId, u32)>,
    /// Types already scanned in this run.
    scanned_types: HashSet<ElementId>,
}

impl BytecodeScanner {
    pub fn new(decoder: Box<dyn ClassDecoder>) -> Self {
        Self {
            decoder,
            seen_sites: HashSet::new(),
            scanned_types: HashSet::new(),
        }
    }

    /// Scans `artifacts` in the given order.
    ///
    /// Classes decoded before a failure are committed; the failure itself is
    /// recorded and the next artifact is scanned. A class decoded a second
    /// time (e.g. from a directory and from a jar built from it) is recorded
    /// and ignored, so its edges and metrics reflect one copy.
    pub fn scan(
        &mut self,
        artifacts: &[PathBuf],
        ctx: &mut AnalysisContext,
        registry: &mut VisitorRegistry,
    ) -> Result<(), SquidError> {
        let start = Instant::now();
        info!("Bytecode scan: {} artifacts", artifacts.len());
        self.seen_sites.clear();
        self.scanned_types.clear();

        for path in artifacts {
            match self.decoder.decode(path) {
                Ok(classes) => {
                    debug!("{}: {} classes", path.display(), classes.len());
                    for class in &classes {
                        self.scan_class(path, class, ctx, registry)?;
                    }
                }
                Err(failure) => {
                    for class in &failure.partial {
                        self.scan_class(path, class, ctx, registry)?;
                    }
                    ctx.report.record(ScanIssue::DecodeFailed {
                        path: path.clone(),
                        message: failure.to_string(),
                        partial_classes: failure.partial.len(),
                    });
                }
            }
        }

        registry.end_scan(ctx, Phase::Bytecode)?;

        info!(
            "Bytecode scan done in {}ms ({} classes, {} edges)",
            start.elapsed().as_millis(),
            ctx.report.classes_scanned,
            ctx.graph.edge_count()
        );
        Ok(())
    }

    fn scan_class(
        &mut self,
        path: &Path,
        class: &ClassFile,
        ctx: &mut AnalysisContext,
        registry: &mut VisitorRegistry,
    ) -> Result<(), SquidError> {
        let type_id = match resolve_type(ctx, &class.key) {
            Ok(id) => id,
            Err(err) => {
                ctx.report
                    .record_index_error(Phase::Bytecode, &class.key, err);
                return Ok(());
            }
        };
        if !self.scanned_types.insert(type_id) {
            ctx.report.record(ScanIssue::DuplicateClass {
                path: path.to_path_buf(),
                key: class.key.clone(),
            });
            return Ok(());
        }
        ctx.report.classes_scanned += 1;
        ctx.graph.add_vertex(type_id);

        record_supertypes(class, type_id, ctx);

        for field in &class.fields {
            let field_key = key::field_key(&class.key, &field.name);
            if let Err(err) = ctx
                .index
                .register(&field_key, ElementKind::Field, Some(&class.key))
            {
                ctx.report.record_index_error(Phase::Bytecode, &field_key, err);
            }
        }

        let type_event = TypeEvent {
            phase: Phase::Bytecode,
            element: type_id,
            key: &class.key,
            superclass: class.superclass.as_deref(),
            interfaces: &class.interfaces,
            fields: &class.fields,
        };
        registry.visit_type(ctx, &type_event)?;

        for method in &class.methods {
            let method_key = key::method_key(&class.key, &method.signature);
            let method_id =
                match ctx
                    .index
                    .register(&method_key, ElementKind::Method, Some(&class.key))
                {
                    Ok(id) => id,
                    Err(err) => {
                        ctx.report
                            .record_index_error(Phase::Bytecode, &method_key, err);
                        continue;
                    }
                };

            let method_event = MethodEvent {
                phase: Phase::Bytecode,
                element: method_id,
                key: &method_key,
                owner: Some(type_id),
                signature: &method.signature,
            };
            registry.visit_method(ctx, &method_event)?;

            for fact in &method.body {
                if !self.seen_sites.insert((method_id, fact.site())) {
                    continue;
                }
                let reference = ReferenceEvent {
                    from_type: type_id,
                    from_type_key: &class.key,
                    from_method_key: &method_key,
                    fact,
                };
                registry.visit_reference(ctx, &reference)?;
                add_reference_edge(ctx, &class.key, fact);
            }
        }

        registry.leave_type(ctx, &type_event)
    }
}

/// Finds or creates the type element for a decoded class.
///
/// A type already known to the index keeps its ownership. A new type, or an
/// external placeholder being upgraded, is placed under its package.
fn resolve_type(ctx: &mut AnalysisContext, type_key: &str) -> Result<ElementId, IndexError> {
    if let Some(existing) = ctx.index.find(type_key) {
        match existing.kind {
            ElementKind::Type => return Ok(existing.id),
            ElementKind::External => {}
            other => {
                return Err(IndexError::KindConflict {
                    key: type_key.to_string(),
                    existing: other,
                    requested: ElementKind::Type,
                })
            }
        }
    }

    let project = ctx.ensure_project()?;
    let parent = match key::package_of(type_key) {
        Some(package) => {
            ctx.index
                .register(package, ElementKind::Package, Some(&project))?;
            package.to_string()
        }
        None => project,
    };
    ctx.index
        .register(type_key, ElementKind::Type, Some(&parent))
}

fn record_supertypes(class: &ClassFile, type_id: ElementId, ctx: &mut AnalysisContext) {
    let mut superclass = None;
    if let Some(super_key) = class.superclass.as_deref() {
        match ctx
            .graph
            .add_edge(&mut ctx.index, &class.key, super_key, EdgeKind::Extends)
        {
            // A self-extends stores no edge but still feeds the hierarchy.
            Ok(_) => superclass = ctx.index.id_of(super_key),
            Err(err) => ctx
                .report
                .record_graph_error(Phase::Bytecode, super_key, err),
        }
    }
    ctx.record_superclass(type_id, superclass);

    for interface in &class.interfaces {
        if let Err(err) =
            ctx.graph
                .add_edge(&mut ctx.index, &class.key, interface, EdgeKind::Implements)
        {
            ctx.report
                .record_graph_error(Phase::Bytecode, interface, err);
        }
    }
}

fn add_reference_edge(ctx: &mut AnalysisContext, from: &str, fact: &BodyFact) {
    let kind = match fact {
        BodyFact::Call(_) => EdgeKind::Calls,
        BodyFact::FieldAccess(_) => EdgeKind::ReferencesField,
    };
    let target = fact.target_owner();
    if let Err(err) = ctx.graph.add_edge(&mut ctx.index, from, target, kind) {
        ctx.report.record_graph_error(Phase::Bytecode, target, err);
    }
}
