//! Live contact form state.
//!
//! Phone rows live in an arena keyed by `EntryId`; a separate `order` vector
//! holds display order. Ids are handed out from a counter at creation time and
//! never reused, so a row keeps its identity when earlier rows are removed.

use crate::error::FormError;
use crate::phone::{PhoneEntry, PhoneEntryPatch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identity of a phone row, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(u64);

impl EntryId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phone-{}", self.0)
    }
}

/// Result of an insert: where the row landed and what it is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedEntry {
    pub index: usize,
    pub id: EntryId,
}

/// Immutable copy of the form values, without row ids.
///
/// Equality is deep and order-sensitive, which is what drift detection needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSnapshot {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Vec<PhoneEntry>,
}

impl Default for ContactSnapshot {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            phone: vec![PhoneEntry::default()],
        }
    }
}

impl ContactSnapshot {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: Vec::new(),
        }
    }

    /// Builder: append a phone entry.
    pub fn with_phone(mut self, entry: PhoneEntry) -> Self {
        self.phone.push(entry);
        self
    }
}

/// The live form: names plus an ordered, never-empty list of phone rows.
#[derive(Debug, Clone)]
pub struct ContactForm {
    first_name: String,
    last_name: String,
    arena: BTreeMap<EntryId, PhoneEntry>,
    order: Vec<EntryId>,
    next_id: u64,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactForm {
    /// Empty names and a single default phone row.
    pub fn new() -> Self {
        let mut form = Self {
            first_name: String::new(),
            last_name: String::new(),
            arena: BTreeMap::new(),
            order: Vec::new(),
            next_id: 0,
        };
        form.push_entry(PhoneEntry::default());
        form
    }

    /// Rebuild a form from a snapshot. An empty phone list gets the default row.
    pub fn from_snapshot(snapshot: &ContactSnapshot) -> Self {
        let mut form = Self {
            first_name: snapshot.first_name.clone(),
            last_name: snapshot.last_name.clone(),
            arena: BTreeMap::new(),
            order: Vec::new(),
            next_id: 0,
        };
        for entry in &snapshot.phone {
            form.push_entry(entry.clone());
        }
        if form.order.is_empty() {
            form.push_entry(PhoneEntry::default());
        }
        form
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_entry(&mut self, entry: PhoneEntry) -> EntryId {
        let id = self.allocate_id();
        self.arena.insert(id, entry);
        self.order.push(id);
        id
    }

    // -------------------------------------------------------------------------
    // Names
    // -------------------------------------------------------------------------

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.first_name = value.into();
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.last_name = value.into();
    }

    // -------------------------------------------------------------------------
    // Phone rows - read
    // -------------------------------------------------------------------------

    /// Number of phone rows (always at least 1).
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rows in display order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &PhoneEntry)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.arena.get(id).map(|entry| (*id, entry)))
    }

    /// Row ids in display order.
    pub fn ids(&self) -> &[EntryId] {
        &self.order
    }

    pub fn entry(&self, index: usize) -> Option<&PhoneEntry> {
        self.order.get(index).and_then(|id| self.arena.get(id))
    }

    pub fn entry_by_id(&self, id: EntryId) -> Option<&PhoneEntry> {
        self.arena.get(&id)
    }

    pub fn id_at(&self, index: usize) -> Option<EntryId> {
        self.order.get(index).copied()
    }

    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    /// Number of rows currently flagged as preferred.
    pub fn preferred_count(&self) -> usize {
        self.arena.values().filter(|entry| entry.preferred).count()
    }

    /// Whether the remove control for a row should be enabled.
    pub fn can_remove(&self) -> bool {
        self.order.len() > 1
    }

    // -------------------------------------------------------------------------
    // Phone rows - write
    // -------------------------------------------------------------------------

    /// Insert `entry` at `index` (`index == len` appends).
    pub fn insert(&mut self, index: usize, entry: PhoneEntry) -> Result<InsertedEntry, FormError> {
        if index > self.order.len() {
            tracing::warn!(index, len = self.order.len(), "phone insert out of bounds");
            return Err(FormError::IndexOutOfBounds {
                index,
                len: self.order.len(),
            });
        }
        let id = self.allocate_id();
        self.arena.insert(id, entry);
        self.order.insert(index, id);
        tracing::debug!(%id, index, "phone entry inserted");
        Ok(InsertedEntry { index, id })
    }

    /// Insert a default row at `index`.
    pub fn insert_default(&mut self, index: usize) -> Result<InsertedEntry, FormError> {
        self.insert(index, PhoneEntry::default())
    }

    /// Remove the row at `index`.
    ///
    /// Returns `None` without touching the list when it would become empty
    /// or when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<PhoneEntry> {
        let id = self.id_at(index)?;
        self.remove_by_id(id)
    }

    /// Remove a row by id. Same last-row rule as [`ContactForm::remove`].
    pub fn remove_by_id(&mut self, id: EntryId) -> Option<PhoneEntry> {
        if !self.can_remove() {
            tracing::debug!(%id, "ignoring removal of last phone entry");
            return None;
        }
        let index = self.index_of(id)?;
        self.order.remove(index);
        let removed = self.arena.remove(&id);
        tracing::debug!(%id, index, "phone entry removed");
        removed
    }

    /// Merge `patch` into the row at `index`.
    pub fn update(&mut self, index: usize, patch: &PhoneEntryPatch) -> Result<EntryId, FormError> {
        let id = self.id_at(index).ok_or(FormError::IndexOutOfBounds {
            index,
            len: self.order.len(),
        })?;
        self.update_by_id(id, patch)?;
        Ok(id)
    }

    pub fn update_by_id(&mut self, id: EntryId, patch: &PhoneEntryPatch) -> Result<(), FormError> {
        let entry = self
            .arena
            .get_mut(&id)
            .ok_or(FormError::UnknownEntry(id))?;
        patch.apply_to(entry);
        Ok(())
    }

    /// Back to empty names and one fresh default row.
    pub fn reset(&mut self) {
        self.first_name.clear();
        self.last_name.clear();
        self.arena.clear();
        self.order.clear();
        self.push_entry(PhoneEntry::default());
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    pub fn snapshot(&self) -> ContactSnapshot {
        ContactSnapshot {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.entries().map(|(_, entry)| entry.clone()).collect(),
        }
    }

    /// True when the live values equal `snapshot` (ids are ignored).
    pub fn matches(&self, snapshot: &ContactSnapshot) -> bool {
        self.first_name == snapshot.first_name
            && self.last_name == snapshot.last_name
            && self.order.len() == snapshot.phone.len()
            && self
                .entries()
                .zip(snapshot.phone.iter())
                .all(|((_, live), submitted)| live == submitted)
    }
}
