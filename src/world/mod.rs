//! World domain: zone registry, unlock tracking and zone entry.
//!
//! Zones unlock the first time their requirement holds and never lock
//! again. Requirements are re-checked whenever the player levels up or the
//! inventory changes, plus once when play starts.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;
use crate::progression::PlayerProgress;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: Vec<ZoneDef>,
}

impl ZoneRegistry {
    pub fn register(&mut self, zone: ZoneDef) -> bool {
        if zone.id.is_empty() {
            warn!("[World] Rejected zone with empty id ({})", zone.name);
            return false;
        }
        if self.get(&zone.id).is_some() {
            warn!("[World] Duplicate zone id '{}' ignored", zone.id);
            return false;
        }
        self.zones.push(zone);
        true
    }

    pub fn get(&self, zone_id: &str) -> Option<&ZoneDef> {
        self.zones.iter().find(|z| z.id == zone_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneDef> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Zone ids in the order they were unlocked.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneUnlocks {
    unlocked: Vec<ZoneId>,
}

impl ZoneUnlocks {
    pub fn is_unlocked(&self, zone_id: &str) -> bool {
        !zone_id.is_empty() && self.unlocked.iter().any(|id| id == zone_id)
    }

    /// Unlocks a registered zone regardless of its requirement.
    /// Returns true only on the locked → unlocked transition.
    pub fn unlock(&mut self, registry: &ZoneRegistry, zone_id: &str) -> bool {
        let Some(zone) = registry.get(zone_id) else {
            warn!("[World] Cannot unlock zone: {} not found", zone_id);
            return false;
        };
        if self.is_unlocked(zone_id) {
            return false;
        }
        info!("[World] Zone unlocked: {}", zone.name);
        self.unlocked.push(zone.id.clone());
        true
    }

    /// Unlocks every zone whose requirement now holds, in registry order.
    pub fn evaluate(&mut self, registry: &ZoneRegistry, level: u32, inventory: &Inventory) -> Vec<ZoneId> {
        let ready: Vec<ZoneId> = registry
            .iter()
            .filter(|zone| !self.is_unlocked(&zone.id))
            .filter(|zone| requirement_met(&zone.requirement, level, inventory))
            .map(|zone| zone.id.clone())
            .collect();
        ready
            .into_iter()
            .filter(|id| self.unlock(registry, id))
            .collect()
    }

    pub fn unlocked_zones<'a>(&self, registry: &'a ZoneRegistry) -> Vec<&'a ZoneDef> {
        registry.iter().filter(|z| self.is_unlocked(&z.id)).collect()
    }

    pub fn unlocked_ids(&self) -> &[ZoneId] {
        &self.unlocked
    }
}

pub fn requirement_met(requirement: &UnlockRequirement, level: u32, inventory: &Inventory) -> bool {
    match requirement {
        UnlockRequirement::Always => true,
        UnlockRequirement::Level(required) => level >= *required,
        UnlockRequirement::Item { item_id, count } => inventory.has_item(item_id, (*count).max(1)),
        UnlockRequirement::Quest(_) => false,
    }
}

/// The zone the player is standing in.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentZone {
    pub zone_id: ZoneId,
}

impl Default for CurrentZone {
    fn default() -> Self {
        Self {
            zone_id: DEFAULT_STARTING_ZONE.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Scripted unlock that bypasses the zone's requirement.
#[derive(Event, Debug, Clone)]
pub struct UnlockZoneEvent {
    pub zone_id: ZoneId,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<UnlockZoneEvent>()
            .add_systems(OnEnter(GameState::Playing), initial_zone_pass)
            .add_systems(
                Update,
                (handle_unlock_zone, handle_enter_zone)
                    .chain()
                    .in_set(CoreSet::Actions)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                reevaluate_zones
                    .in_set(CoreSet::Unlocks)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn initial_zone_pass(
    registry: Res<ZoneRegistry>,
    progress: Res<PlayerProgress>,
    inventory: Res<Inventory>,
    mut unlocks: ResMut<ZoneUnlocks>,
    mut unlocked: EventWriter<ZoneUnlockedEvent>,
) {
    for zone_id in unlocks.evaluate(&registry, progress.level, &inventory) {
        unlocked.send(ZoneUnlockedEvent { zone_id });
    }
    info!(
        "[World] {} of {} zones unlocked",
        unlocks.unlocked_ids().len(),
        registry.len()
    );
}

pub fn reevaluate_zones(
    mut level_ups: EventReader<LevelUpEvent>,
    mut inventory_changes: EventReader<InventoryChangedEvent>,
    registry: Res<ZoneRegistry>,
    progress: Res<PlayerProgress>,
    inventory: Res<Inventory>,
    mut unlocks: ResMut<ZoneUnlocks>,
    mut unlocked: EventWriter<ZoneUnlockedEvent>,
) {
    let leveled = level_ups.read().count() > 0;
    let changed = inventory_changes.read().count() > 0;
    if !leveled && !changed {
        return;
    }
    for zone_id in unlocks.evaluate(&registry, progress.level, &inventory) {
        unlocked.send(ZoneUnlockedEvent { zone_id });
    }
}

pub fn handle_unlock_zone(
    mut events: EventReader<UnlockZoneEvent>,
    registry: Res<ZoneRegistry>,
    mut unlocks: ResMut<ZoneUnlocks>,
    mut unlocked: EventWriter<ZoneUnlockedEvent>,
) {
    for ev in events.read() {
        if unlocks.unlock(&registry, &ev.zone_id) {
            unlocked.send(ZoneUnlockedEvent {
                zone_id: ev.zone_id.clone(),
            });
        }
    }
}

pub fn handle_enter_zone(
    mut events: EventReader<EnterZoneEvent>,
    registry: Res<ZoneRegistry>,
    unlocks: Res<ZoneUnlocks>,
    mut current: ResMut<CurrentZone>,
    mut entered: EventWriter<ZoneEnteredEvent>,
) {
    for ev in events.read() {
        if !unlocks.is_unlocked(&ev.zone_id) {
            warn!("[World] Cannot enter locked zone: {}", ev.zone_id);
            continue;
        }
        let Some(zone) = registry.get(&ev.zone_id).filter(|z| !z.scene.is_empty()) else {
            warn!("[World] Zone {} has no valid scene", ev.zone_id);
            continue;
        };
        current.zone_id = zone.id.clone();
        info!("[World] Entered {} ({})", zone.name, zone.scene);
        entered.send(ZoneEnteredEvent {
            zone_id: zone.id.clone(),
            scene: zone.scene.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemCatalog;

    fn zone(id: &str, requirement: UnlockRequirement) -> ZoneDef {
        ZoneDef {
            id: id.into(),
            name: id.to_uppercase(),
            description: String::new(),
            scene: format!("{id}_scene"),
            requirement,
        }
    }

    fn registry() -> ZoneRegistry {
        let mut registry = ZoneRegistry::default();
        registry.register(zone("hub", UnlockRequirement::Always));
        registry.register(zone("grove", UnlockRequirement::Level(3)));
        registry.register(zone(
            "cavern",
            UnlockRequirement::Item {
                item_id: "lantern".into(),
                count: 1,
            },
        ));
        registry.register(zone("shrine", UnlockRequirement::Quest("q_elder".into())));
        registry
    }

    #[test]
    fn test_level_zone_unlocks_once() {
        let registry = registry();
        let inventory = Inventory::default();
        let mut unlocks = ZoneUnlocks::default();

        assert_eq!(unlocks.evaluate(&registry, 1, &inventory), vec!["hub".to_string()]);
        assert!(unlocks.evaluate(&registry, 2, &inventory).is_empty());
        assert_eq!(unlocks.evaluate(&registry, 3, &inventory), vec!["grove".to_string()]);
        assert!(unlocks.evaluate(&registry, 3, &inventory).is_empty());
        // Never re-locks, even if the level somehow drops.
        assert!(unlocks.evaluate(&registry, 1, &inventory).is_empty());
        assert!(unlocks.is_unlocked("grove"));
    }

    #[test]
    fn test_item_zone_and_quest_zone() {
        let registry = registry();
        let mut items = ItemCatalog::default();
        items.register(ItemDef {
            id: "lantern".into(),
            name: "Lantern".into(),
            description: String::new(),
            stackable: false,
            max_stack: 1,
            category: ItemCategory::Tool,
        });
        let mut inventory = Inventory::default();
        inventory.add_item(&items, "lantern", 1);

        let mut unlocks = ZoneUnlocks::default();
        let newly = unlocks.evaluate(&registry, 99, &inventory);
        assert!(newly.contains(&"cavern".to_string()));
        assert!(!unlocks.is_unlocked("shrine"));
    }

    #[test]
    fn test_manual_unlock() {
        let registry = registry();
        let mut unlocks = ZoneUnlocks::default();
        assert!(!unlocks.unlock(&registry, "atlantis"));
        assert!(unlocks.unlock(&registry, "shrine"));
        assert!(!unlocks.unlock(&registry, "shrine"));
        assert_eq!(
            unlocks
                .unlocked_zones(&registry)
                .iter()
                .map(|z| z.id.as_str())
                .collect::<Vec<_>>(),
            vec!["shrine"]
        );
        assert!(!unlocks.is_unlocked(""));
    }
}
