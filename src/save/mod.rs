//! Save domain: in-memory snapshots of player state and new game.
//!
//! Snapshots are plain JSON strings; where they end up on disk is the
//! host's business.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::DayClock;
use crate::cultivation::{Garden, RecipeJournal};
use crate::encyclopedia::Encyclopedia;
use crate::inventory::Inventory;
use crate::progression::{PlayerProgress, ProgressionCurve};
use crate::world::{CurrentZone, ZoneUnlocks};
use crate::shared::*;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("resource {0} is not present in the world")]
    MissingResource(&'static str),
}

// ═══════════════════════════════════════════════════════════════════════
// SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub inventory: Inventory,
    pub progress: PlayerProgress,
    pub zones: ZoneUnlocks,
    pub current_zone: CurrentZone,
    pub encyclopedia: Encyclopedia,
    pub recipes: RecipeJournal,
    pub clock: DayClock,
    pub garden: Garden,
}

fn cloned<R: Resource + Clone>(world: &World) -> Result<R, SnapshotError> {
    world
        .get_resource::<R>()
        .cloned()
        .ok_or(SnapshotError::MissingResource(std::any::type_name::<R>()))
}

impl GameSnapshot {
    pub fn capture(world: &World) -> Result<Self, SnapshotError> {
        Ok(Self {
            version: SNAPSHOT_VERSION,
            inventory: cloned(world)?,
            progress: cloned(world)?,
            zones: cloned(world)?,
            current_zone: cloned(world)?,
            encyclopedia: cloned(world)?,
            recipes: cloned(world)?,
            clock: cloned(world)?,
            garden: cloned(world)?,
        })
    }

    /// Overwrites the live resources and announces the changes so listeners
    /// refresh.
    pub fn restore(self, world: &mut World) {
        let progress = self.progress.clone();
        world.insert_resource(self.inventory);
        world.insert_resource(self.progress);
        world.insert_resource(self.zones);
        world.insert_resource(self.current_zone);
        world.insert_resource(self.encyclopedia);
        world.insert_resource(self.recipes);
        world.insert_resource(self.clock);
        world.insert_resource(self.garden);

        let required = world
            .get_resource::<ProgressionCurve>()
            .map(|curve| progress.required_for_next(curve))
            .unwrap_or(0);
        world.send_event(InventoryChangedEvent);
        world.send_event(ExpChangedEvent {
            exp: progress.exp,
            required,
        });
        world.send_event(EncyclopediaChangedEvent);
        info!(
            "[Save] Restored snapshot at level {} ({} EXP)",
            progress.level, progress.exp
        );
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// NEW GAME
// ═══════════════════════════════════════════════════════════════════════

/// Resets progress to the curve's starting values and empties the bag.
#[derive(Event, Debug, Clone, Default)]
pub struct NewGameEvent;

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<NewGameEvent>().add_systems(
            Update,
            handle_new_game
                .in_set(CoreSet::Actions)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn handle_new_game(
    mut events: EventReader<NewGameEvent>,
    curve: Res<ProgressionCurve>,
    mut progress: ResMut<PlayerProgress>,
    mut inventory: ResMut<Inventory>,
    mut inventory_changed: EventWriter<InventoryChangedEvent>,
    mut exp_changed: EventWriter<ExpChangedEvent>,
) {
    if events.read().count() == 0 {
        return;
    }
    progress.reset(&curve);
    inventory.clear();
    inventory_changed.send(InventoryChangedEvent);
    exp_changed.send(ExpChangedEvent {
        exp: progress.exp,
        required: progress.required_for_next(&curve),
    });
    info!("[Save] New game started");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_state() -> World {
        let mut world = World::new();
        world.init_resource::<Events<InventoryChangedEvent>>();
        world.init_resource::<Events<ExpChangedEvent>>();
        world.init_resource::<Events<EncyclopediaChangedEvent>>();
        world.init_resource::<ProgressionCurve>();
        world.insert_resource(Inventory::with_capacity(12));
        world.insert_resource(PlayerProgress { level: 4, exp: 37 });
        world.init_resource::<ZoneUnlocks>();
        world.init_resource::<CurrentZone>();
        world.init_resource::<Encyclopedia>();
        world.init_resource::<RecipeJournal>();
        world.insert_resource(DayClock::new(600.0, 0.1));
        world.init_resource::<Garden>();
        world
    }

    #[test]
    fn test_capture_json_restore() {
        let mut world = world_with_state();
        world.resource_mut::<Garden>().plant("fern");
        let json = GameSnapshot::capture(&world).unwrap().to_json().unwrap();

        world.insert_resource(PlayerProgress::default());
        world.insert_resource(Garden::default());

        GameSnapshot::from_json(&json).unwrap().restore(&mut world);
        assert_eq!(*world.resource::<PlayerProgress>(), PlayerProgress { level: 4, exp: 37 });
        assert_eq!(world.resource::<Garden>().plots().len(), 1);
        assert_eq!(world.resource::<Inventory>().capacity(), 12);
    }

    #[test]
    fn test_capture_reports_missing_resource() {
        let world = World::new();
        assert!(matches!(
            GameSnapshot::capture(&world),
            Err(SnapshotError::MissingResource(_))
        ));
    }

    #[test]
    fn test_rejects_other_versions_and_garbage() {
        let world = world_with_state();
        let mut snapshot = GameSnapshot::capture(&world).unwrap();
        snapshot.version = 99;
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            GameSnapshot::from_json(&json),
            Err(SnapshotError::Version { found: 99, .. })
        ));
        assert!(matches!(
            GameSnapshot::from_json("not json"),
            Err(SnapshotError::Json(_))
        ));
    }
}
