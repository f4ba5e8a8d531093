//! The structural index.
//!
//! Maps unique keys to elements and keeps a secondary index by kind. Both
//! scans register into the same index, so registration is idempotent: a key
//! already present resolves to the existing element.

use crate::error::IndexError;
use serde::Serialize;
use squid_core::{Element, ElementId, ElementKind, MeasureValue};
use std::collections::HashMap;
use tracing::debug;

/// Uniquely keyed registry of program elements.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StructuralIndex {
    /// Element storage; an [`ElementId`] is a slot in this vector.
    elements: Vec<Element>,

    /// Key to element handle.
    #[serde(skip)]
    by_key: HashMap<String, ElementId>,

    /// Kind to element handles, in registration order.
    #[serde(skip)]
    by_kind: HashMap<ElementKind, Vec<ElementId>>,
}

impl StructuralIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an element, or returns the existing one with that key.
    ///
    /// An unknown `parent` is registered first as an external placeholder.
    /// An existing element that has no owner adopts `parent`; an existing
    /// owner is never replaced.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::KindConflict`] when the key is registered with an
    /// incompatible kind. An external placeholder is compatible with
    /// [`ElementKind::Type`] and is upgraded in place.
    pub fn register(
        &mut self,
        key: &str,
        kind: ElementKind,
        parent: Option<&str>,
    ) -> Result<ElementId, IndexError> {
        // An element never owns itself.
        let parent = parent.filter(|p| *p != key);

        if let Some(&id) = self.by_key.get(key) {
            self.merge_kind(id, kind)?;
            if let Some(parent_key) = parent {
                if self.elements[id.index()].parent.is_none() {
                    let parent_id = self.ensure_parent(parent_key);
                    if self.is_within(parent_id, id) {
                        debug!("Ignoring parent {} of {}: ownership cycle", parent_key, key);
                    } else {
                        self.link(parent_id, id);
                    }
                }
            }
            return Ok(id);
        }

        let parent_id = parent.map(|p| self.ensure_parent(p));
        let id = self.insert(key, kind);
        if let Some(parent_id) = parent_id {
            self.link(parent_id, id);
        }
        Ok(id)
    }

    /// Registers an external placeholder if `key` is unknown.
    ///
    /// Returns the existing element otherwise, whatever its kind.
    pub fn register_external(&mut self, key: &str) -> ElementId {
        if let Some(&id) = self.by_key.get(key) {
            return id;
        }
        debug!("Materializing external placeholder {}", key);
        self.insert(key, ElementKind::External)
    }

    /// Attaches a measure to the element with `key`.
    pub fn attach(
        &mut self,
        key: &str,
        metric: &str,
        value: impl Into<MeasureValue>,
    ) -> Result<(), IndexError> {
        let id = self
            .id_of(key)
            .ok_or_else(|| IndexError::UnknownElement(key.to_string()))?;
        self.attach_to(id, metric, value)
    }

    /// Attaches a measure to the element behind a handle.
    pub fn attach_to(
        &mut self,
        id: ElementId,
        metric: &str,
        value: impl Into<MeasureValue>,
    ) -> Result<(), IndexError> {
        let element = self
            .elements
            .get_mut(id.index())
            .ok_or(IndexError::UnknownHandle(id))?;
        element.measures.insert(metric.to_string(), value.into());
        Ok(())
    }

    /// Finds an element by key.
    pub fn find(&self, key: &str) -> Option<&Element> {
        self.by_key.get(key).map(|id| &self.elements[id.index()])
    }

    /// Gets an element by handle.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    /// Resolves a key to its handle.
    pub fn id_of(&self, key: &str) -> Option<ElementId> {
        self.by_key.get(key).copied()
    }

    /// Returns the key of a handle.
    pub fn key_of(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(|e| e.key.as_str())
    }

    /// Returns all elements of a kind.
    ///
    /// Callers must not rely on the order.
    pub fn query(&self, kind: ElementKind) -> Vec<&Element> {
        self.by_kind
            .get(&kind)
            .map(|ids| ids.iter().map(|id| &self.elements[id.index()]).collect())
            .unwrap_or_default()
    }

    /// Returns all elements matching a predicate.
    pub fn search<P>(&self, predicate: P) -> Vec<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.elements.iter().filter(|e| predicate(e)).collect()
    }

    /// Returns the children of an element in registration order.
    pub fn children(&self, id: ElementId) -> Vec<&Element> {
        self.get(id)
            .map(|e| e.children.iter().map(|c| &self.elements[c.index()]).collect())
            .unwrap_or_default()
    }

    /// Returns the members of kind `kind` owned by the type `type_key`.
    pub fn members(&self, type_key: &str, kind: ElementKind) -> Vec<&Element> {
        self.id_of(type_key)
            .map(|id| {
                self.children(id)
                    .into_iter()
                    .filter(|child| child.kind == kind)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the first registered project element.
    pub fn project(&self) -> Option<&Element> {
        self.by_kind
            .get(&ElementKind::Project)
            .and_then(|ids| ids.first())
            .map(|id| &self.elements[id.index()])
    }

    /// Iterates over all elements in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn insert(&mut self, key: &str, kind: ElementKind) -> ElementId {
        let id = ElementId::new(self.elements.len());
        self.elements.push(Element::new(id, key, kind));
        self.by_key.insert(key.to_string(), id);
        self.by_kind.entry(kind).or_default().push(id);
        id
    }

    fn ensure_parent(&mut self, key: &str) -> ElementId {
        match self.by_key.get(key) {
            Some(&id) => id,
            None => {
                debug!("Materializing external owner {}", key);
                self.insert(key, ElementKind::External)
            }
        }
    }

    /// Returns true if `node` is `ancestor` or one of its descendants.
    fn is_within(&self, node: ElementId, ancestor: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.elements[id.index()].parent;
        }
        false
    }

    fn link(&mut self, parent: ElementId, child: ElementId) {
        self.elements[child.index()].parent = Some(parent);
        self.elements[parent.index()].children.push(child);
    }

    fn merge_kind(&mut self, id: ElementId, requested: ElementKind) -> Result<(), IndexError> {
        let existing = self.elements[id.index()].kind;
        match (existing, requested) {
            (a, b) if a == b => Ok(()),
            (ElementKind::Type, ElementKind::External) => Ok(()),
            (ElementKind::External, ElementKind::Type) => {
                self.retag(id, ElementKind::External, ElementKind::Type);
                Ok(())
            }
            _ => Err(IndexError::KindConflict {
                key: self.elements[id.index()].key.clone(),
                existing,
                requested,
            }),
        }
    }

    fn retag(&mut self, id: ElementId, from: ElementKind, to: ElementKind) {
        if let Some(ids) = self.by_kind.get_mut(&from) {
            ids.retain(|&other| other != id);
        }
        self.by_kind.entry(to).or_default().push(id);
        self.elements[id.index()].kind = to;
    }
}
