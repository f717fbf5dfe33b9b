//! Shared resources, events, definitions and states for Verdant Log.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports another domain's systems directly; they talk through
//! the events declared below.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

/// Frame phases. Chained in this order so that everything one phase emits
/// is read by the later phases within the same `App::update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreSet {
    /// Clock and garden growth.
    Clock,
    /// Player intents: inventory edits, cultivation, harvest, zone entry.
    Actions,
    /// EXP awards and encyclopedia discovery.
    Rewards,
    /// Zone unlock re-evaluation.
    Unlocks,
    /// Text notifications for the UI layer.
    Notify,
}

/// Registers the phase ordering on `Update`. Called by the binary and by the
/// headless tests so both run the same schedule shape.
pub fn configure_core_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            CoreSet::Clock,
            CoreSet::Actions,
            CoreSet::Rewards,
            CoreSet::Unlocks,
            CoreSet::Notify,
        )
            .chain(),
    );
}

// ═══════════════════════════════════════════════════════════════════════
// IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════

/// Items, plants, recipes and zones are all keyed by data-driven string ids.
pub type ItemId = String;
pub type PlantId = String;
pub type RecipeId = String;
pub type ZoneId = String;

// ═══════════════════════════════════════════════════════════════════════
// ITEMS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemCategory {
    Seed,
    Material,
    Tool,
    Plant,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_stackable")]
    pub stackable: bool,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    #[serde(default)]
    pub category: ItemCategory,
}

fn default_stackable() -> bool {
    true
}

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

impl ItemDef {
    /// Per-stack cap. Non-stackable items always cap at 1.
    pub fn max_stack_size(&self) -> u32 {
        if self.stackable {
            self.max_stack.max(1)
        } else {
            1
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLANTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDef {
    pub id: PlantId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Number of growth stages, at least 1. The last stage is harvestable.
    pub growth_stages: u32,
    /// Total seconds from planting to the last stage.
    pub growth_time: f32,
    pub exp_value: u32,
    pub harvest_item: ItemId,
    pub harvest_amount: u32,
    pub seed_item: ItemId,
}

impl PlantDef {
    pub fn stage_count(&self) -> u32 {
        self.growth_stages.max(1)
    }

    pub fn time_per_stage(&self) -> f32 {
        self.growth_time / self.stage_count() as f32
    }

    pub fn final_stage(&self) -> u32 {
        self.stage_count() - 1
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CULTIVATION RECIPES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Value: "Day" or "Night".
    TimeOfDay,
    /// Value: id of the item that must be used as catalyst.
    ItemUsed,
    /// Value: id of a plant that must be adjacent.
    Adjacency,
    /// Reserved. Always satisfied.
    Weather,
    /// Reserved. Always satisfied.
    Season,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CultivationCondition {
    pub kind: ConditionKind,
    pub value: String,
}

impl CultivationCondition {
    pub fn new(kind: ConditionKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultivationRecipe {
    pub id: RecipeId,
    pub name: String,
    pub seed_item: ItemId,
    pub output_plant: PlantId,
    /// All must hold (logical AND). Empty = always matches.
    #[serde(default)]
    pub conditions: Vec<CultivationCondition>,
    #[serde(default)]
    pub discovered_by_default: bool,
    #[serde(default)]
    pub hint: String,
}

// ═══════════════════════════════════════════════════════════════════════
// ZONES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockRequirement {
    Always,
    Level(u32),
    Item { item_id: ItemId, count: u32 },
    /// Reserved for quests. Never satisfied.
    Quest(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDef {
    pub id: ZoneId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Scene handed to the scene layer on entry. Empty = not enterable.
    #[serde(default)]
    pub scene: String,
    pub requirement: UnlockRequirement,
}

// ═══════════════════════════════════════════════════════════════════════
// TIME OF DAY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    /// The string TimeOfDay conditions are compared against.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Day => "Day",
            TimeOfDay::Night => "Night",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: notification bus
// ═══════════════════════════════════════════════════════════════════════

/// Any inventory mutation, including a partial add.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct InventoryChangedEvent;

#[derive(Event, Debug, Clone, PartialEq)]
pub struct LevelUpEvent {
    pub level: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ExpChangedEvent {
    pub exp: u32,
    pub required: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ZoneUnlockedEvent {
    pub zone_id: ZoneId,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ZoneEnteredEvent {
    pub zone_id: ZoneId,
    pub scene: String,
}

/// A plant was discovered for the first time.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntryUnlockedEvent {
    pub plant_id: PlantId,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct EncyclopediaChangedEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CultivationSource {
    Cultivated,
    Harvested,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct CultivationSuccessEvent {
    pub plant_id: PlantId,
    pub exp: u32,
    pub source: CultivationSource,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct CultivationFailedEvent {
    pub seed_id: ItemId,
    pub reason: String,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlantHarvestedEvent {
    pub plant_id: PlantId,
    pub item_id: ItemId,
    pub quantity: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct TimeOfDayChangedEvent {
    pub time_of_day: TimeOfDay,
}

/// Plain text for the UI toast layer.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub message: String,
}

/// Text plus a 0..=1 progress value for bar-style notifications.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProgressNotificationEvent {
    pub message: String,
    pub progress: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: intents from the input/UI layer
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone, PartialEq)]
pub struct AddItemEvent {
    pub item_id: ItemId,
    pub quantity: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct RemoveItemEvent {
    pub item_id: ItemId,
    pub quantity: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ClearInventoryEvent;

#[derive(Event, Debug, Clone, PartialEq)]
pub struct AwardExpEvent {
    pub amount: u32,
}

/// Direct overwrite of level and EXP (debug tools, scripted setups).
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SetLevelEvent {
    pub level: u32,
    pub exp: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct EnterZoneEvent {
    pub zone_id: ZoneId,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const DEFAULT_MAX_STACK: u32 = 99;
pub const DEFAULT_INVENTORY_CAPACITY: usize = 30;

/// EXP to reach the next level, index = level - 1. Level 10+ plateaus.
pub const DEFAULT_EXP_CURVE: &[u32] = &[100, 150, 200, 300, 500, 750, 1000, 1500, 2000, 3000];
pub const STARTING_LEVEL: u32 = 1;
pub const STARTING_EXP: u32 = 0;

/// Real seconds per in-game day.
pub const DEFAULT_DAY_LENGTH_SECS: f32 = 600.0;
/// Normalised clock time at boot (0.5 = noon).
pub const DEFAULT_START_TIME: f32 = 0.5;

pub const DEFAULT_STARTING_ZONE: &str = "zone_hub";
pub const DEFAULT_NOTIFICATION_HISTORY: usize = 32;
