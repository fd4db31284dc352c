//! The production line: resources the player has classified for the active
//! event, in the order they entered.
//!
//! Records are addressed by generational [`LineKey`]s rather than by their
//! live position, so removing one record never changes which record another
//! key refers to. Iteration and [`ProductionLine::snapshot`] follow
//! insertion order.

use crate::error::LineError;
use crate::id::{LineKey, SpawnHandle};
use crate::resource::{
    ColorKind, MachineKind, ResourceRecord, ShapeKind, apply_machine, apply_transform,
};
use slotmap::SlotMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ProductionLine {
    records: SlotMap<LineKey, ResourceRecord>,
    /// Insertion order. Contains exactly the live keys of `records`.
    order: Vec<LineKey>,
    by_handle: HashMap<SpawnHandle, LineKey>,
}

impl ProductionLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the end of the line and return its key.
    ///
    /// A handle already in the line is not added twice; the existing key is
    /// returned and the stored record is left untouched.
    pub fn append(&mut self, record: ResourceRecord) -> LineKey {
        if let Some(&existing) = self.by_handle.get(&record.id) {
            log::warn!("resource {:?} already in production line", record.id);
            return existing;
        }
        let key = self.records.insert(record);
        self.order.push(key);
        self.by_handle.insert(record.id, key);
        key
    }

    /// Overwrite the halves of a record's classification that are present.
    pub fn update_at(
        &mut self,
        key: LineKey,
        shape: Option<ShapeKind>,
        color: Option<ColorKind>,
    ) -> Result<bool, LineError> {
        match self.records.get_mut(key) {
            Some(record) => Ok(apply_transform(record, shape, color)),
            None => {
                log::warn!("update_at: unknown line key {key:?}");
                Err(LineError::InvalidIndex(key))
            }
        }
    }

    /// Run a record through a machine.
    pub fn apply_machine(&mut self, key: LineKey, machine: MachineKind) -> Result<bool, LineError> {
        match self.records.get_mut(key) {
            Some(record) => Ok(apply_machine(machine, record)),
            None => {
                log::warn!("apply_machine: unknown line key {key:?}");
                Err(LineError::InvalidIndex(key))
            }
        }
    }

    /// Remove a record. All other keys keep referring to their records.
    pub fn remove_at(&mut self, key: LineKey) -> Result<ResourceRecord, LineError> {
        let Some(record) = self.records.remove(key) else {
            log::warn!("remove_at: unknown line key {key:?}");
            return Err(LineError::InvalidIndex(key));
        };
        self.order.retain(|k| *k != key);
        self.by_handle.remove(&record.id);
        Ok(record)
    }

    /// Key of the record created for a spawn handle, if it is in the line.
    pub fn key_of(&self, handle: SpawnHandle) -> Option<LineKey> {
        self.by_handle.get(&handle).copied()
    }

    pub fn get(&self, key: LineKey) -> Option<&ResourceRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, handle: SpawnHandle) -> bool {
        self.by_handle.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceRecord> + '_ {
        self.order.iter().filter_map(|k| self.records.get(*k))
    }

    /// Read-only copy of the classifications, in insertion order.
    pub fn snapshot(&self) -> Vec<(ShapeKind, ColorKind)> {
        self.iter().map(ResourceRecord::classification).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
        self.by_handle.clear();
    }
}
