//! Inheritance metrics over the recorded superclass map.

use crate::context::AnalysisContext;
use squid_core::{ElementId, MeasureValue, Metric};
use squid_graph::IndexError;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Frozen view of the inheritance hierarchy.
///
/// Built once after the bytecode scan and shared by DIT and NOC.
#[derive(Debug, Default)]
pub struct TypeHierarchy {
    parents: HashMap<ElementId, ElementId>,
    children: HashMap<ElementId, Vec<ElementId>>,
}

impl TypeHierarchy {
    pub fn build(ctx: &AnalysisContext) -> Self {
        let mut hierarchy = Self::default();
        for (&id, &parent) in &ctx.superclasses {
            let Some(parent) = parent else { continue };
            hierarchy.parents.insert(id, parent);
            if parent != id {
                hierarchy.children.entry(parent).or_default().push(id);
            }
        }
        hierarchy
    }

    pub fn superclass_of(&self, id: ElementId) -> Option<ElementId> {
        self.parents.get(&id).copied()
    }

    /// Number of hops from `id` to its inheritance root.
    ///
    /// Returns [`MeasureValue::Cycle`] when the chain loops.
    pub fn depth(&self, id: ElementId) -> MeasureValue {
        let mut visited = HashSet::from([id]);
        let mut current = id;
        let mut depth = 0usize;
        while let Some(parent) = self.superclass_of(current) {
            if !visited.insert(parent) {
                return MeasureValue::Cycle;
            }
            depth += 1;
            current = parent;
        }
        MeasureValue::from(depth)
    }

    /// Number of types whose recorded superclass is `id`.
    pub fn children_count(&self, id: ElementId) -> usize {
        self.children.get(&id).map_or(0, Vec::len)
    }
}

/// Attaches DIT to every type-level element.
pub fn compute_dit(ctx: &mut AnalysisContext, hierarchy: &TypeHierarchy) -> Result<(), IndexError> {
    for id in type_level_ids(ctx) {
        let dit = hierarchy.depth(id);
        if dit.is_fault() {
            let key = ctx.index.key_of(id).unwrap_or_default();
            warn!("Inheritance cycle through {}", key);
        }
        ctx.attach_metric(id, Metric::Dit, dit)?;
    }
    debug!("DIT computed");
    Ok(())
}

/// Attaches NOC to every type-level element.
pub fn compute_noc(ctx: &mut AnalysisContext, hierarchy: &TypeHierarchy) -> Result<(), IndexError> {
    for id in type_level_ids(ctx) {
        ctx.attach_metric(id, Metric::Noc, hierarchy.children_count(id))?;
    }
    debug!("NOC computed");
    Ok(())
}

fn type_level_ids(ctx: &AnalysisContext) -> Vec<ElementId> {
    ctx.index
        .iter()
        .filter(|e| e.kind.is_type_level())
        .map(|e| e.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use squid_core::{ElementKind, SquidConfig};

    fn types(ctx: &mut AnalysisContext, keys: &[&str]) -> Vec<ElementId> {
        keys.iter()
            .map(|k| ctx.index.register(k, ElementKind::Type, None).unwrap())
            .collect()
    }

    #[test]
    fn test_dit_chain() {
        let mut ctx = AnalysisContext::new(SquidConfig::default());
        let ids = types(&mut ctx, &["a/A", "a/B", "a/C"]);
        ctx.record_superclass(ids[0], None);
        ctx.record_superclass(ids[1], Some(ids[0]));
        ctx.record_superclass(ids[2], Some(ids[1]));

        let hierarchy = TypeHierarchy::build(&ctx);
        compute_dit(&mut ctx, &hierarchy).unwrap();

        let dit = |ctx: &AnalysisContext, id| ctx.index.get(id).unwrap().metric_f64(Metric::Dit);
        assert_eq!(dit(&ctx, ids[0]), Some(0.0));
        assert_eq!(dit(&ctx, ids[1]), Some(1.0));
        assert_eq!(dit(&ctx, ids[2]), Some(2.0));
    }

    #[test]
    fn test_dit_cycle() {
        let mut ctx = AnalysisContext::new(SquidConfig::default());
        let ids = types(&mut ctx, &["a/X", "a/Y", "a/Z", "a/Self"]);
        ctx.record_superclass(ids[0], Some(ids[1]));
        ctx.record_superclass(ids[1], Some(ids[0]));
        // Enters the cycle without being part of it.
        ctx.record_superclass(ids[2], Some(ids[0]));
        ctx.record_superclass(ids[3], Some(ids[3]));

        let hierarchy = TypeHierarchy::build(&ctx);
        compute_dit(&mut ctx, &hierarchy).unwrap();

        for id in ids {
            assert_eq!(
                ctx.index.get(id).unwrap().metric(Metric::Dit),
                Some(MeasureValue::Cycle)
            );
        }
    }

    #[test]
    fn test_noc_matches_superclass_map() {
        let mut ctx = AnalysisContext::new(SquidConfig::default());
        let ids = types(&mut ctx, &["a/Base", "a/L", "a/R", "a/Leaf"]);
        ctx.record_superclass(ids[0], None);
        ctx.record_superclass(ids[1], Some(ids[0]));
        ctx.record_superclass(ids[2], Some(ids[0]));
        ctx.record_superclass(ids[3], Some(ids[1]));

        let hierarchy = TypeHierarchy::build(&ctx);
        compute_noc(&mut ctx, &hierarchy).unwrap();

        let noc = |id| ctx.index.get(id).unwrap().metric_f64(Metric::Noc);
        assert_eq!(noc(ids[0]), Some(2.0));
        assert_eq!(noc(ids[1]), Some(1.0));
        assert_eq!(noc(ids[2]), Some(0.0));
        assert_eq!(noc(ids[3]), Some(0.0));

        let total: usize = ids.iter().map(|&id| hierarchy.children_count(id)).sum();
        let with_parent = ids
            .iter()
            .filter(|&&id| hierarchy.superclass_of(id).is_some())
            .count();
        assert_eq!(total, with_parent);
    }

    #[test]
    fn test_unscanned_type_is_root() {
        let mut ctx = AnalysisContext::new(SquidConfig::default());
        let lib = ctx.index.register_external("org/lib/Lib");

        let hierarchy = TypeHierarchy::build(&ctx);
        compute_dit(&mut ctx, &hierarchy).unwrap();
        compute_noc(&mut ctx, &hierarchy).unwrap();

        let lib = ctx.index.get(lib).unwrap();
        assert_eq!(lib.metric_f64(Metric::Dit), Some(0.0));
        assert_eq!(lib.metric_f64(Metric::Noc), Some(0.0));
    }
}
