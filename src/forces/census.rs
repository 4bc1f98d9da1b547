//! Counts of own units and the list of own structures

use ahash::AHashMap;

use crate::core::types::{SectorIndex, UnitDefId};
use crate::units::UnitCategory;

/// Number of active units per category
#[derive(Debug, Clone, Default)]
pub struct ForceCensus {
    active: AHashMap<UnitCategory, u32>,
    under_construction: AHashMap<UnitCategory, u32>,
}

impl ForceCensus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn construction_started(&mut self, category: UnitCategory) {
        *self.under_construction.entry(category).or_insert(0) += 1;
    }

    /// A unit finished; moves it from under construction to active
    pub fn construction_finished(&mut self, category: UnitCategory) {
        if let Some(count) = self.under_construction.get_mut(&category) {
            *count = count.saturating_sub(1);
        }
        *self.active.entry(category).or_insert(0) += 1;
    }

    pub fn unit_lost(&mut self, category: UnitCategory) {
        if let Some(count) = self.active.get_mut(&category) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn active(&self, category: UnitCategory) -> u32 {
        self.active.get(&category).copied().unwrap_or(0)
    }

    pub fn under_construction(&self, category: UnitCategory) -> u32 {
        self.under_construction.get(&category).copied().unwrap_or(0)
    }

    /// Active plus under construction
    pub fn total(&self, category: UnitCategory) -> u32 {
        self.active(category) + self.under_construction(category)
    }

    pub fn active_factories(&self) -> u32 {
        self.active(UnitCategory::StaticConstructor)
    }
}

/// Own finished structures by definition and sector
#[derive(Debug, Clone, Default)]
pub struct OwnStructures {
    counts: AHashMap<(UnitDefId, SectorIndex), u32>,
}

impl OwnStructures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, def: UnitDefId, sector: SectorIndex) {
        *self.counts.entry((def, sector)).or_insert(0) += 1;
    }

    /// Returns false if no such structure was recorded
    pub fn remove(&mut self, def: UnitDefId, sector: SectorIndex) -> bool {
        match self.counts.get_mut(&(def, sector)) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.counts.remove(&(def, sector));
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitDefId, SectorIndex, u32)> + '_ {
        self.counts.iter().map(|((def, sector), count)| (*def, *sector, *count))
    }

    /// Number of finished structures of `def` over all sectors
    pub fn count_of(&self, def: UnitDefId) -> u32 {
        self.counts
            .iter()
            .filter(|((d, _), _)| *d == def)
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.counts.values().map(|c| *c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
