//! Launching, monitoring and retiring attacks

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use tracing::{debug, info, warn};

use crate::attack::order::Order;
use crate::attack::power::ForceProfile;
use crate::attack::state::{Attack, AttackState};
use crate::core::config::AttackConfig;
use crate::core::types::{AttackId, ContinentId, GroupId, SectorIndex, Tick};
use crate::forces::{GroupRegistry, UnitGroup};
use crate::sector::{Sector, SectorMap};
use crate::units::UnitCatalog;

/// Idle groups that may join the same attack
#[derive(Debug, Clone, Default)]
pub struct GroupPool {
    pub combat: Vec<GroupId>,
    pub anti_air: Vec<GroupId>,
}

impl GroupPool {
    pub fn is_empty(&self) -> bool {
        self.combat.is_empty()
    }

    fn push(&mut self, group: &UnitGroup) {
        if group.is_anti_air() {
            self.anti_air.push(group.id);
        } else {
            self.combat.push(group.id);
        }
    }
}

/// Idle groups split by continent; groups free to cross water go to the global pool
#[derive(Debug, Clone, Default)]
pub struct GroupPools {
    pub by_continent: BTreeMap<ContinentId, GroupPool>,
    pub global: GroupPool,
}

impl GroupPools {
    pub fn from_registry(groups: &GroupRegistry) -> Self {
        let mut pools = Self::default();
        for group in groups.available_groups() {
            match group.continent {
                Some(continent) => pools.by_continent.entry(continent).or_default().push(group),
                None => pools.global.push(group),
            }
        }
        pools
    }

    /// Pools paired with the continent they are bound to, continents first
    pub fn iter(&self) -> impl Iterator<Item = (Option<ContinentId>, &GroupPool)> {
        self.by_continent
            .iter()
            .map(|(c, pool)| (Some(*c), pool))
            .chain(std::iter::once((None, &self.global)))
    }
}

#[derive(Debug, Clone)]
pub struct AttackManager {
    config: AttackConfig,
    neighbour_importance: f32,
    attacks: BTreeMap<AttackId, Attack>,
    next_id: u32,
}

impl AttackManager {
    pub fn new(config: &AttackConfig, neighbour_importance: f32) -> Self {
        Self {
            config: config.clone(),
            neighbour_importance,
            attacks: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn attack(&self, id: AttackId) -> Option<&Attack> {
        self.attacks.get(&id)
    }

    pub fn attacks(&self) -> impl Iterator<Item = &Attack> {
        self.attacks.values()
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// Monitor running attacks, then try to launch a new one
    pub fn update(
        &mut self,
        tick: Tick,
        map: &SectorMap,
        groups: &mut GroupRegistry,
        catalog: &dyn UnitCatalog,
    ) -> Vec<Order> {
        let mut orders = Vec::new();

        let ids: Vec<AttackId> = self.attacks.keys().copied().collect();
        for id in ids {
            orders.extend(self.check_attack(id, tick, map, groups, catalog));
        }
        self.attacks.retain(|_, attack| !attack.is_finished());

        if self.config.launch_interval > 0
            && tick % self.config.launch_interval == 0
            && self.attacks.len() < self.config.max_concurrent_attacks
        {
            orders.extend(self.launch_attack(tick, map, groups, catalog));
        }

        orders
    }

    /// Call off a failed attack, retarget one whose destination was cleared
    fn check_attack(
        &mut self,
        id: AttackId,
        tick: Tick,
        map: &SectorMap,
        groups: &mut GroupRegistry,
        catalog: &dyn UnitCatalog,
    ) -> Vec<Order> {
        let Some(attack) = self.attacks.get_mut(&id) else {
            return Vec::new();
        };

        let stale: Vec<GroupId> = attack.groups().filter(|g| !groups.contains(*g)).collect();
        for group in stale {
            attack.remove_group(group);
        }

        let failed = attack.check_if_failed(
            tick,
            map,
            groups,
            catalog,
            &self.config,
            self.neighbour_importance,
        );
        if failed {
            info!("{} failed, retreating", id);
            return self.stop_attack(id, groups);
        }

        let cleared = attack
            .destination()
            .and_then(|d| map.get(d))
            .map(|s| !s.is_occupied_by_enemies())
            .unwrap_or(false);
        if cleared {
            return self.next_destination(id, tick, map, groups, catalog);
        }

        Vec::new()
    }

    /// Move an attack on to the best reachable enemy sector it can take, or end it
    pub fn next_destination(
        &mut self,
        id: AttackId,
        tick: Tick,
        map: &SectorMap,
        groups: &mut GroupRegistry,
        catalog: &dyn UnitCatalog,
    ) -> Vec<Order> {
        let Some(attack) = self.attacks.get(&id) else {
            return Vec::new();
        };

        let view: &GroupRegistry = groups;
        let profile = attack.force_profile(view, catalog);
        let destination = self
            .rate_destinations(map, attack.continent(), &profile)
            .into_iter()
            .find(|sector| {
                profile.sufficient_vs_mobile(
                    map,
                    *sector,
                    self.config.continue_aggressiveness,
                    self.neighbour_importance,
                ) && attack.sufficient_combat_power_to_attack_sector(
                    map,
                    view,
                    catalog,
                    *sector,
                    self.config.continue_aggressiveness,
                )
            });

        match destination {
            Some(sector) => {
                info!("{} moving on to sector {}", id, sector);
                self.attacks
                    .get_mut(&id)
                    .map(|attack| attack.attack_sector(sector, tick))
                    .unwrap_or_default()
            }
            None => {
                info!("{} found no further target, returning", id);
                self.stop_attack(id, groups)
            }
        }
    }

    /// Halt an attack and hand its groups back to the pools
    pub fn stop_attack(&mut self, id: AttackId, groups: &mut GroupRegistry) -> Vec<Order> {
        let Some(attack) = self.attacks.get_mut(&id) else {
            return Vec::new();
        };
        let orders = attack.stop_attack();
        for group in attack.disband() {
            if groups.assign_attack(group, None).is_err() {
                debug!("{} released from {} no longer exists", group, id);
            }
        }
        info!("{} disbanded", id);
        orders
    }

    /// Enemy sectors reachable by a pool, best first
    ///
    /// Rated by `(1 + enemy structures) / ((1 + static defence vs our units)
    /// * (1 + distance to base))`.
    fn rate_destinations(
        &self,
        map: &SectorMap,
        continent: Option<ContinentId>,
        profile: &ForceProfile,
    ) -> Vec<SectorIndex> {
        let reachable = |s: &&Sector| continent.map(|c| s.continent == c).unwrap_or(true);
        let mut rated: Vec<(OrderedFloat<f32>, SectorIndex)> = map
            .iter()
            .filter(|s| s.is_occupied_by_enemies())
            .filter(reachable)
            .map(|s| {
                let defence = profile.static_defence_at(map, s.index);
                let distance = s.distance_to_base.unwrap_or(0) as f32;
                let rating = (1.0 + s.enemy_structures) / ((1.0 + defence) * (1.0 + distance));
                (OrderedFloat(rating), s.index)
            })
            .collect();
        rated.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        rated.into_iter().map(|(_, index)| index).collect()
    }

    /// Try each pool against its best rated destinations and launch the first attack that suffices
    fn launch_attack(
        &mut self,
        tick: Tick,
        map: &SectorMap,
        groups: &mut GroupRegistry,
        catalog: &dyn UnitCatalog,
    ) -> Vec<Order> {
        let pools = GroupPools::from_registry(groups);
        let aggressiveness = self.config.launch_aggressiveness;

        for (continent, pool) in pools.iter() {
            if pool.is_empty() {
                continue;
            }

            let id = AttackId(self.next_id);
            let mut attack = Attack::new(id, tick);
            for group_id in pool.combat.iter().chain(pool.anti_air.iter()) {
                let Some(group) = groups.get(*group_id) else {
                    continue;
                };
                if let Err(rejection) = attack.add_group(group, self.config.max_anti_air_groups_per_attack) {
                    debug!("{} not added to {}: {}", group_id, id, rejection);
                }
            }
            if attack.combat_groups().is_empty() {
                continue;
            }

            let profile = attack.force_profile(groups, catalog);
            let target = self
                .rate_destinations(map, continent, &profile)
                .into_iter()
                .find(|sector| {
                    attack.sufficient_combat_power_at(
                        map,
                        groups,
                        catalog,
                        *sector,
                        aggressiveness,
                        self.neighbour_importance,
                    ) && attack.sufficient_combat_power_to_attack_sector(
                        map,
                        groups,
                        catalog,
                        *sector,
                        aggressiveness,
                    )
                });
            let Some(target) = target else {
                continue;
            };

            for group in attack.groups().collect::<Vec<_>>() {
                if let Err(err) = groups.assign_attack(group, Some(id)) {
                    warn!("Could not commit {} to {}: {}", group, id, err);
                    attack.remove_group(group);
                }
            }
            let orders = attack.attack_sector(target, tick);
            info!(
                "{} launched against sector {} with {} groups",
                id,
                target,
                orders.len()
            );
            self.next_id += 1;
            self.attacks.insert(id, attack);
            return orders;
        }

        Vec::new()
    }

    /// Forget a group in whatever attack holds it
    pub fn remove_group(&mut self, group: GroupId) {
        for attack in self.attacks.values_mut() {
            if attack.remove_group(group) {
                debug!("{} removed from {}", group, attack.id);
            }
        }
    }

    /// A group reported idle; re-issue the attack orders if the last wave is old enough
    pub fn group_idle(&mut self, group: GroupId, tick: Tick) -> Vec<Order> {
        let min_interval = self.config.min_order_interval;
        let Some(attack) = self
            .attacks
            .values_mut()
            .find(|a| a.contains(group) && a.state() == AttackState::Active)
        else {
            return Vec::new();
        };
        match attack.destination() {
            Some(sector) if tick.saturating_sub(attack.last_order_tick()) >= min_interval => {
                attack.attack_sector(sector, tick)
            }
            _ => Vec::new(),
        }
    }

    /// Whether the idle groups on `continent` (plus the global pool) beat the enemy around `sector`
    pub fn sufficient_available_power_at(
        &self,
        map: &SectorMap,
        groups: &GroupRegistry,
        catalog: &dyn UnitCatalog,
        sector: SectorIndex,
        aggressiveness: f32,
    ) -> bool {
        let Some(continent) = map.get(sector).map(|s| s.continent) else {
            return false;
        };
        let available = groups
            .available_groups()
            .filter(|g| g.continent.map(|c| c == continent).unwrap_or(true));
        ForceProfile::of(available, catalog).sufficient_vs_mobile(
            map,
            sector,
            aggressiveness,
            self.neighbour_importance,
        )
    }
}
