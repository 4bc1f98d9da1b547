//! One offensive and its lifecycle
//!
//! ```text
//! Forming --attack_sector--> Active --stop_attack--> Retreating --disband--> Disbanded
//!    |                         ^  |
//!    +------------disband------|--+--> (retarget via attack_sector)
//! ```

use std::collections::BTreeSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attack::order::Order;
use crate::attack::power::ForceProfile;
use crate::core::config::AttackConfig;
use crate::core::types::{AttackId, ContinentId, GroupId, SectorIndex, Tick};
use crate::forces::{GroupRegistry, UnitGroup};
use crate::sector::SectorMap;
use crate::units::{MovementType, UnitCatalog};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackState {
    /// Collecting groups, no destination yet
    #[display(fmt = "forming")]
    Forming,
    /// Orders issued towards the destination
    #[display(fmt = "active")]
    Active,
    /// Failure detected, halt orders issued
    #[display(fmt = "retreating")]
    Retreating,
    #[display(fmt = "disbanded")]
    Disbanded,
}

/// Why a group was not accepted into an attack
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[display(fmt = "attack no longer accepts groups")]
    Closed,
    #[display(fmt = "group is committed to {}", _0)]
    Committed(AttackId),
    #[display(fmt = "anti-air escort is full")]
    AntiAirFull,
    #[display(fmt = "movement type does not fit the attack")]
    IncompatibleMovement,
    #[display(fmt = "group is on another continent")]
    OtherContinent,
}

#[derive(Debug, Clone)]
pub struct Attack {
    pub id: AttackId,
    state: AttackState,
    destination: Option<SectorIndex>,
    combat_groups: BTreeSet<GroupId>,
    anti_air_groups: BTreeSet<GroupId>,
    /// Union of the movement types of all groups ever accepted
    movement: MovementType,
    /// Continent of the continent-bound groups, if any joined
    continent: Option<ContinentId>,
    /// Tick of the last order wave
    last_order_tick: Tick,
}

impl Attack {
    pub fn new(id: AttackId, tick: Tick) -> Self {
        Self {
            id,
            state: AttackState::Forming,
            destination: None,
            combat_groups: BTreeSet::new(),
            anti_air_groups: BTreeSet::new(),
            movement: MovementType::empty(),
            continent: None,
            last_order_tick: tick,
        }
    }

    pub fn state(&self) -> AttackState {
        self.state
    }

    pub fn destination(&self) -> Option<SectorIndex> {
        self.destination
    }

    pub fn last_order_tick(&self) -> Tick {
        self.last_order_tick
    }

    pub fn movement(&self) -> MovementType {
        self.movement
    }

    pub fn continent(&self) -> Option<ContinentId> {
        self.continent
    }

    pub fn combat_groups(&self) -> &BTreeSet<GroupId> {
        &self.combat_groups
    }

    pub fn anti_air_groups(&self) -> &BTreeSet<GroupId> {
        &self.anti_air_groups
    }

    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.combat_groups.iter().chain(self.anti_air_groups.iter()).copied()
    }

    pub fn contains(&self, group: GroupId) -> bool {
        self.combat_groups.contains(&group) || self.anti_air_groups.contains(&group)
    }

    pub fn is_finished(&self) -> bool {
        self.state == AttackState::Disbanded
    }

    /// Accept a group into the attack
    ///
    /// Anti-air groups join the escort up to `max_anti_air_groups`. Groups
    /// must be able to operate with the movement types already committed, and
    /// continent-bound groups must stand on the attack's continent.
    pub fn add_group(&mut self, group: &UnitGroup, max_anti_air_groups: usize) -> Result<(), Rejection> {
        if matches!(self.state, AttackState::Retreating | AttackState::Disbanded) {
            return Err(Rejection::Closed);
        }
        if let Some(other) = group.attack {
            if other != self.id {
                return Err(Rejection::Committed(other));
            }
        }
        if self.contains(group.id) {
            return Ok(());
        }
        if !group.movement.can_operate_with(self.movement) {
            return Err(Rejection::IncompatibleMovement);
        }
        if let (Some(ours), Some(theirs)) = (self.continent, group.continent) {
            if ours != theirs {
                return Err(Rejection::OtherContinent);
            }
        }

        if group.is_anti_air() {
            if self.anti_air_groups.len() >= max_anti_air_groups {
                return Err(Rejection::AntiAirFull);
            }
            self.anti_air_groups.insert(group.id);
        } else {
            self.combat_groups.insert(group.id);
        }

        self.movement |= group.movement;
        if group.continent.is_some() {
            self.continent = group.continent;
        }
        Ok(())
    }

    /// Drop a group from either set; returns whether it was a member
    ///
    /// Removing a group twice or one that never joined is a no-op.
    pub fn remove_group(&mut self, group: GroupId) -> bool {
        self.combat_groups.remove(&group) | self.anti_air_groups.remove(&group)
    }

    /// Power and unit mix of the committed groups
    pub fn force_profile(&self, groups: &GroupRegistry, catalog: &dyn UnitCatalog) -> ForceProfile {
        ForceProfile::of(self.groups().filter_map(|id| groups.get(id)), catalog)
    }

    /// Whether the committed groups beat the enemy mobile units around `sector`
    pub fn sufficient_combat_power_at(
        &self,
        map: &SectorMap,
        groups: &GroupRegistry,
        catalog: &dyn UnitCatalog,
        sector: SectorIndex,
        aggressiveness: f32,
        neighbour_importance: f32,
    ) -> bool {
        self.force_profile(groups, catalog)
            .sufficient_vs_mobile(map, sector, aggressiveness, neighbour_importance)
    }

    /// Whether the committed combat groups can break the static defences of `sector`
    pub fn sufficient_combat_power_to_attack_sector(
        &self,
        map: &SectorMap,
        groups: &GroupRegistry,
        catalog: &dyn UnitCatalog,
        sector: SectorIndex,
        aggressiveness: f32,
    ) -> bool {
        ForceProfile::of(self.combat_groups.iter().filter_map(|id| groups.get(*id)), catalog)
            .sufficient_vs_static(map, sector, aggressiveness)
    }

    /// Whether the attack should be called off
    ///
    /// Fails with no combat groups left, when the committed power no longer
    /// suffices at the destination, or when no order went out for too long.
    pub fn check_if_failed(
        &self,
        tick: Tick,
        map: &SectorMap,
        groups: &GroupRegistry,
        catalog: &dyn UnitCatalog,
        config: &AttackConfig,
        neighbour_importance: f32,
    ) -> bool {
        if self.combat_groups.is_empty() {
            debug!("{} failed, no combat groups left", self.id);
            return true;
        }

        if let Some(destination) = self.destination {
            if !self.sufficient_combat_power_at(
                map,
                groups,
                catalog,
                destination,
                config.continue_aggressiveness,
                neighbour_importance,
            ) {
                debug!("{} failed, insufficient combat power at {}", self.id, destination);
                return true;
            }
        }

        if tick.saturating_sub(self.last_order_tick) > config.max_idle_ticks {
            debug!("{} failed, no order since tick {}", self.id, self.last_order_tick);
            return true;
        }

        false
    }

    /// Send every committed group towards `sector`
    pub fn attack_sector(&mut self, sector: SectorIndex, tick: Tick) -> Vec<Order> {
        self.destination = Some(sector);
        self.state = AttackState::Active;
        self.last_order_tick = tick;
        self.groups()
            .map(|group| Order::MoveTo { group, sector })
            .collect()
    }

    /// Halt every committed group; membership is left to the caller
    pub fn stop_attack(&mut self) -> Vec<Order> {
        self.state = AttackState::Retreating;
        self.groups().map(|group| Order::Halt { group }).collect()
    }

    /// Release all groups and finish the attack; returns the released groups
    pub fn disband(&mut self) -> Vec<GroupId> {
        self.state = AttackState::Disbanded;
        self.destination = None;
        let released = self.groups().collect();
        self.combat_groups.clear();
        self.anti_air_groups.clear();
        released
    }
}
