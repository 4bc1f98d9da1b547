//! Arena of unit groups keyed by handle
//!
//! Attacks and sectors never hold a group directly, only its [`GroupId`].
//! Removing a group here is the single point where it stops existing.

use std::collections::BTreeMap;

use tracing::warn;

use crate::core::error::{Result, StrategosError};
use crate::core::types::{AttackId, GroupId, SectorIndex};
use crate::forces::group::UnitGroup;
use crate::units::{TargetTypeValues, UnitCatalog};

/// Registry of all own unit groups
///
/// Iteration runs in handle order so every per-tick recompute sees the
/// groups in the same sequence.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: BTreeMap<GroupId, UnitGroup>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group under its own handle, replacing a stale entry
    ///
    /// A replaced group keeps its attack membership; the attack still holds
    /// the handle.
    pub fn insert(&mut self, mut group: UnitGroup) {
        if let Some(old) = self.groups.get(&group.id) {
            warn!("Group {} registered twice, replacing previous entry", old.id);
            if group.attack.is_none() {
                group.attack = old.attack;
            }
        }
        self.groups.insert(group.id, group);
    }

    pub fn remove(&mut self, id: GroupId) -> Option<UnitGroup> {
        self.groups.remove(&id)
    }

    pub fn get(&self, id: GroupId) -> Option<&UnitGroup> {
        self.groups.get(&id)
    }

    pub fn get_mut(&mut self, id: GroupId) -> Result<&mut UnitGroup> {
        self.groups
            .get_mut(&id)
            .ok_or(StrategosError::UnknownGroup(id))
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitGroup> {
        self.groups.values()
    }

    pub fn resize(&mut self, id: GroupId, size: u32) -> Result<()> {
        self.get_mut(id)?.size = size;
        Ok(())
    }

    pub fn move_to(&mut self, id: GroupId, sector: SectorIndex) -> Result<()> {
        self.get_mut(id)?.sector = Some(sector);
        Ok(())
    }

    /// Record (or clear) the attack a group is committed to
    pub fn assign_attack(&mut self, id: GroupId, attack: Option<AttackId>) -> Result<()> {
        self.get_mut(id)?.attack = attack;
        Ok(())
    }

    /// Idle combat groups in handle order
    pub fn available_groups(&self) -> impl Iterator<Item = &UnitGroup> {
        self.groups.values().filter(|g| g.is_available())
    }

    /// Summed combat power of the given groups; unknown handles contribute nothing
    pub fn combat_power_of<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a GroupId>,
        catalog: &dyn UnitCatalog,
    ) -> TargetTypeValues {
        let mut power = TargetTypeValues::new();
        for id in ids {
            if let Some(group) = self.groups.get(id) {
                power += group.combat_power(catalog);
            }
        }
        power
    }
}
