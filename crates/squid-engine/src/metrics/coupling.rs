//! Afferent and efferent coupling.

use crate::context::AnalysisContext;
use squid_core::Metric;
use squid_graph::IndexError;
use std::collections::HashSet;

/// Attaches `ca` and `ce` to every graph vertex.
///
/// `ca` counts the distinct types depending on a vertex, `ce` the distinct
/// types it depends on. Every edge kind counts.
pub fn compute_coupling(ctx: &mut AnalysisContext) -> Result<(), IndexError> {
    let counts: Vec<_> = ctx
        .graph
        .vertices()
        .into_iter()
        .map(|id| {
            let afferent: HashSet<_> = ctx.graph.incoming(id).iter().map(|e| e.source).collect();
            let efferent: HashSet<_> = ctx.graph.outgoing(id).iter().map(|e| e.target).collect();
            (id, afferent.len(), efferent.len())
        })
        .collect();

    for (id, ca, ce) in counts {
        ctx.attach_metric(id, Metric::Ca, ca)?;
        ctx.attach_metric(id, Metric::Ce, ce)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use squid_core::{ElementKind, SquidConfig};
    use squid_graph::EdgeKind;

    #[test]
    fn test_distinct_neighbours() {
        let mut ctx = AnalysisContext::new(SquidConfig::default());
        for key in ["a/A", "a/B", "a/C"] {
            ctx.index.register(key, ElementKind::Type, None).unwrap();
        }
        let edges = [
            ("a/B", "a/A", EdgeKind::Extends),
            ("a/B", "a/A", EdgeKind::Calls),
            ("a/C", "a/A", EdgeKind::Calls),
            ("a/C", "a/B", EdgeKind::ReferencesField),
        ];
        for (from, to, kind) in edges {
            ctx.graph.add_edge(&mut ctx.index, from, to, kind).unwrap();
        }

        compute_coupling(&mut ctx).unwrap();

        let get = |key: &str, metric| ctx.index.find(key).unwrap().metric_f64(metric);
        assert_eq!(get("a/A", Metric::Ca), Some(2.0));
        assert_eq!(get("a/A", Metric::Ce), Some(0.0));
        assert_eq!(get("a/B", Metric::Ca), Some(1.0));
        assert_eq!(get("a/B", Metric::Ce), Some(1.0));
        assert_eq!(get("a/C", Metric::Ca), Some(0.0));
        assert_eq!(get("a/C", Metric::Ce), Some(2.0));
    }
}
