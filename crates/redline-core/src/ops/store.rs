use std::collections::{HashMap, HashSet};

use redline_core_types::ElementId;

use crate::errors::{RedlineError, Result};
use crate::model::{Element, ElementMetadata, InsertPosition};

/// Ordered, identity-stable element collection
///
/// Owns the original snapshot the document was loaded with, the live sequence
/// derived from it, and per-element baselines. The `id -> index` map is
/// rebuilt after every structural change. IDs ever seen are kept in a reserved
/// set that never shrinks, so a deleted element can come back on undo without
/// colliding with a newly minted ID.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    original: Vec<Element>,
    elements: Vec<Element>,
    index: HashMap<ElementId, usize>,
    reserved: HashSet<ElementId>,
    baselines: HashMap<ElementId, String>,
}

impl ElementStore {
    /// Create a store from the initial element snapshot
    ///
    /// # Errors
    ///
    /// Returns `DuplicateElementId` if two elements share an ID.
    pub fn new(initial: Vec<Element>) -> Result<Self> {
        let mut reserved = HashSet::with_capacity(initial.len());
        for element in &initial {
            if !reserved.insert(element.id.clone()) {
                return Err(RedlineError::DuplicateElementId {
                    element_id: element.id.to_string(),
                });
            }
        }
        let mut store = Self {
            original: initial.clone(),
            elements: initial,
            index: HashMap::new(),
            reserved,
            baselines: HashMap::new(),
        };
        store.reindex();
        Ok(store)
    }

    fn reindex(&mut self) {
        self.index = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
    }

    /// Copy of the live sequence in document order
    pub fn current_state(&self) -> Vec<Element> {
        self.elements.clone()
    }

    /// Borrow the live sequence
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The snapshot the store was created from
    pub fn original(&self) -> &[Element] {
        &self.original
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.index.get(id).and_then(|&i| self.elements.get(i))
    }

    /// Like [`ElementStore::get`] but reports a missing element as an error
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the ID is not in the live sequence.
    pub fn require(&self, id: &str) -> Result<&Element> {
        self.get(id).ok_or_else(|| RedlineError::ElementNotFound {
            element_id: id.to_string(),
        })
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// True for any ID this store has ever held, live or not
    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.contains(id)
    }

    /// Mint an ID that has never been used in this store
    pub fn fresh_id(&self) -> ElementId {
        loop {
            let id = ElementId::generate();
            if !self.reserved.contains(id.as_str()) {
                return id;
            }
        }
    }

    pub fn original_element(&self, id: &str) -> Option<&Element> {
        self.original.iter().find(|e| e.id.as_str() == id)
    }

    /// Resolve an insert position to an index into the live sequence
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition` if an `after`/`before` anchor is not live.
    pub fn resolve_position(&self, position: &InsertPosition) -> Result<usize> {
        match position {
            InsertPosition::After(anchor) => self
                .position_of(anchor.as_str())
                .map(|i| i + 1)
                .ok_or_else(|| RedlineError::InvalidPosition {
                    anchor: anchor.to_string(),
                }),
            InsertPosition::Before(anchor) => {
                self.position_of(anchor.as_str())
                    .ok_or_else(|| RedlineError::InvalidPosition {
                        anchor: anchor.to_string(),
                    })
            }
            InsertPosition::Index(i) => Ok((*i).min(self.elements.len())),
        }
    }

    /// Insert an element at `index` (clamped to the sequence length)
    ///
    /// # Errors
    ///
    /// Returns `DuplicateElementId` if the ID is already live.
    pub fn insert_at(&mut self, index: usize, element: Element) -> Result<()> {
        if self.contains(element.id.as_str()) {
            return Err(RedlineError::DuplicateElementId {
                element_id: element.id.to_string(),
            });
        }
        self.reserved.insert(element.id.clone());
        let at = index.min(self.elements.len());
        self.elements.insert(at, element);
        self.reindex();
        Ok(())
    }

    /// Remove an element, returning its former index and value
    ///
    /// The ID stays reserved.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the ID is not live.
    pub fn remove(&mut self, id: &str) -> Result<(usize, Element)> {
        let at = self
            .position_of(id)
            .ok_or_else(|| RedlineError::ElementNotFound {
                element_id: id.to_string(),
            })?;
        let element = self.elements.remove(at);
        self.reindex();
        Ok((at, element))
    }

    /// Replace an element's content and, if given, its metadata
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the ID is not live.
    pub fn update(
        &mut self,
        id: &str,
        content: &str,
        metadata: Option<&ElementMetadata>,
    ) -> Result<()> {
        let at = self
            .position_of(id)
            .ok_or_else(|| RedlineError::ElementNotFound {
                element_id: id.to_string(),
            })?;
        let element = &mut self.elements[at];
        element.content = content.to_string();
        if let Some(metadata) = metadata {
            element.metadata = metadata.clone();
        }
        Ok(())
    }

    /// Move an element so it ends up at `to_index` (clamped), returning its old index
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the ID is not live.
    pub fn move_to(&mut self, id: &str, to_index: usize) -> Result<usize> {
        let from = self
            .position_of(id)
            .ok_or_else(|| RedlineError::ElementNotFound {
                element_id: id.to_string(),
            })?;
        let element = self.elements.remove(from);
        let to = to_index.min(self.elements.len());
        self.elements.insert(to, element);
        self.reindex();
        Ok(from)
    }

    /// Drop every change and return to the original snapshot
    ///
    /// Baselines and reserved IDs are kept.
    pub fn reset_to_original(&mut self) {
        self.elements = self.original.clone();
        self.reindex();
    }

    // ===== Baselines =====

    /// Set the diff reference point for an element
    pub fn set_baseline(&mut self, id: &str, content: impl Into<String>) {
        self.baselines.insert(ElementId::from(id), content.into());
    }

    pub fn clear_baseline(&mut self, id: &str) {
        self.baselines.remove(id);
    }

    pub fn clear_baselines(&mut self) {
        self.baselines.clear();
    }

    pub fn has_explicit_baseline(&self, id: &str) -> bool {
        self.baselines.contains_key(id)
    }

    /// Diff reference for an element
    ///
    /// An explicit baseline wins; otherwise the original snapshot content;
    /// elements inserted during the session have an empty baseline.
    pub fn baseline(&self, id: &str) -> &str {
        if let Some(explicit) = self.baselines.get(id) {
            return explicit;
        }
        self.original_element(id)
            .map(|e| e.content.as_str())
            .unwrap_or_default()
    }
}
