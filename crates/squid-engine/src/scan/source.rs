//! Source-scan pipeline.

use crate::context::AnalysisContext;
use crate::error::SquidError;
use crate::report::ScanIssue;
use crate::visitor::{MethodEvent, Phase, TypeEvent, VisitorRegistry};
use squid_core::{key, ElementKind, SourceFact, SourceParser};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Drives the source parser over a file set.
pub struct SourceScanner {
    parser: Box<dyn SourceParser>,
}

impl SourceScanner {
    pub fn new(parser: Box<dyn SourceParser>) -> Self {
        Self { parser }
    }

    /// Scans `files` in the given order.
    ///
    /// A file that fails to parse is recorded and skipped. Only a visitor
    /// failure stops the scan.
    pub fn scan(
        &mut self,
        files: &[PathBuf],
        ctx: &mut AnalysisContext,
        registry: &mut VisitorRegistry,
    ) -> Result<(), SquidError> {
        let start = Instant::now();
        info!("Source scan: {} files", files.len());

        for path in files {
            let facts = match self.parser.parse(path) {
                Ok(facts) => facts,
                Err(err) => {
                    ctx.report.record(ScanIssue::ParseFailed {
                        path: path.clone(),
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            debug!("{}: {} facts", path.display(), facts.len());

            for fact in &facts {
                apply_fact(fact, ctx, registry)?;
            }
            ctx.report.files_scanned += 1;
        }

        registry.end_scan(ctx, Phase::Source)?;

        info!(
            "Source scan done in {}ms ({} elements, {} files skipped)",
            start.elapsed().as_millis(),
            ctx.index.len(),
            ctx.report.parse_failures()
        );
        Ok(())
    }
}

fn apply_fact(
    fact: &SourceFact,
    ctx: &mut AnalysisContext,
    registry: &mut VisitorRegistry,
) -> Result<(), SquidError> {
    let id = match ctx
        .index
        .register(&fact.key, fact.kind, fact.parent.as_deref())
    {
        Ok(id) => id,
        Err(err) => {
            ctx.report.record_index_error(Phase::Source, &fact.key, err);
            return Ok(());
        }
    };

    match fact.kind {
        ElementKind::Type => {
            registry.visit_type(ctx, &TypeEvent::source(id, &fact.key))?;
        }
        ElementKind::Method => {
            let owner = ctx.index.get(id).and_then(|e| e.parent).or_else(|| {
                key::owner_of(&fact.key).and_then(|owner| ctx.index.id_of(owner))
            });
            let signature = key::member_of(&fact.key).unwrap_or(&fact.key);
            let event = MethodEvent {
                phase: Phase::Source,
                element: id,
                key: &fact.key,
                owner,
                signature,
            };
            registry.visit_method(ctx, &event)?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::{CodeVisitor, Subscription, VisitResult};
    use squid_core::{ElementId, ParseError, SquidConfig};
    use std::collections::HashMap;
    use std::path::Path;

    struct MapParser(HashMap<PathBuf, Vec<SourceFact>>);

    impl SourceParser for MapParser {
        fn parse(&mut self, path: &Path) -> Result<Vec<SourceFact>, ParseError> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| ParseError::syntax(path, 1, "unexpected token"))
        }
    }

    #[test]
    fn test_scan_registers_facts() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("A.java"),
            vec![
                SourceFact::project("shop"),
                SourceFact::package("com/acme", "shop"),
                SourceFact::file("com/acme/A.java", "com/acme"),
                SourceFact::type_decl("com/acme/A", Some("com/acme/A.java")),
                SourceFact::method("com/acme/A", "n()V"),
            ],
        );
        let mut scanner = SourceScanner::new(Box::new(MapParser(files)));
        let mut ctx = AnalysisContext::new(SquidConfig::default());
        let mut registry = VisitorRegistry::new();

        scanner
            .scan(&[PathBuf::from("A.java")], &mut ctx, &mut registry)
            .unwrap();

        assert_eq!(ctx.index.len(), 5);
        assert_eq!(ctx.report.files_scanned, 1);
        let methods = ctx.index.members("com/acme/A", ElementKind::Method);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].key, "com/acme/A#n()V");
    }

    #[test]
    fn test_parse_failure_is_skipped() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("B.java"),
            vec![SourceFact::type_decl("com/acme/B", None)],
        );
        let mut scanner = SourceScanner::new(Box::new(MapParser(files)));
        let mut ctx = AnalysisContext::new(SquidConfig::default());
        let mut registry = VisitorRegistry::new();

        scanner
            .scan(
                &[PathBuf::from("Broken.java"), PathBuf::from("B.java")],
                &mut ctx,
                &mut registry,
            )
            .unwrap();

        assert!(ctx.index.find("com/acme/B").is_some());
        assert_eq!(ctx.report.files_scanned, 1);
        assert_eq!(ctx.report.parse_failures(), 1);
    }

    #[test]
    fn test_conflicting_fact_is_dropped() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("A.java"),
            vec![
                SourceFact::type_decl("com/acme/A", None),
                SourceFact::new(ElementKind::Method, "com/acme/A", None),
                SourceFact::method("com/acme/A", "n()V"),
            ],
        );
        let mut scanner = SourceScanner::new(Box::new(MapParser(files)));
        let mut ctx = AnalysisContext::new(SquidConfig::default());
        let mut registry = VisitorRegistry::new();

        scanner
            .scan(&[PathBuf::from("A.java")], &mut ctx, &mut registry)
            .unwrap();

        assert_eq!(ctx.index.find("com/acme/A").unwrap().kind, ElementKind::Type);
        assert_eq!(ctx.index.len(), 2);
        assert!(matches!(
            ctx.report.issues[0],
            ScanIssue::KindConflict {
                phase: Phase::Source,
                ..
            }
        ));
    }

    struct OwnerLog(std::rc::Rc<std::cell::RefCell<Vec<Option<ElementId>>>>);

    impl CodeVisitor for OwnerLog {
        fn visit_method(
            &mut self,
            _ctx: &mut AnalysisContext,
            event: &MethodEvent<'_>,
        ) -> VisitResult {
            self.0.borrow_mut().push(event.owner);
            Ok(())
        }
    }

    #[test]
    fn test_method_owner_from_key() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("A.java"),
            vec![
                SourceFact::type_decl("com/acme/A", None),
                SourceFact::new(ElementKind::Method, "com/acme/A#n()V", None),
            ],
        );
        let owners = std::rc::Rc::default();
        let mut registry = VisitorRegistry::new();
        registry.subscribe(
            Box::new(OwnerLog(std::rc::Rc::clone(&owners))),
            Subscription::Source,
        );
        let mut scanner = SourceScanner::new(Box::new(MapParser(files)));
        let mut ctx = AnalysisContext::new(SquidConfig::default());

        scanner
            .scan(&[PathBuf::from("A.java")], &mut ctx, &mut registry)
            .unwrap();

        let a = ctx.index.id_of("com/acme/A");
        assert_eq!(*owners.borrow(), vec![a]);
    }
}
