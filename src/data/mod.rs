//! Data layer: populates all registries at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), reads the game data
//! manifest and the tuning config (built-in RON unless VERDANT_DATA /
//! VERDANT_CONFIG name a file), fills every registry and applies the
//! config, then transitions the game into GameState::Playing.
//!
//! All domain plugins can safely read these resources once GameState has
//! advanced past Loading.

mod config;
mod manifest;

pub use config::{GameConfig, EMBEDDED_CONFIG};
pub use manifest::{GameData, EMBEDDED_DATA};

use bevy::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calendar::DayClock;
use crate::catalog::{ItemCatalog, PlantCatalog};
use crate::cultivation::RecipeBook;
use crate::encyclopedia::Encyclopedia;
use crate::inventory::Inventory;
use crate::notify::NotificationLog;
use crate::progression::PlayerProgress;
use crate::world::{CurrentZone, ZoneRegistry};
use crate::shared::*;

pub const DATA_PATH_VAR: &str = "VERDANT_DATA";
pub const CONFIG_PATH_VAR: &str = "VERDANT_CONFIG";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("unknown {kind} '{id}' referenced by '{referenced_by}'")]
    UnknownReference {
        kind: &'static str,
        id: String,
        referenced_by: String,
    },
    #[error("invalid data: {0}")]
    Invalid(String),
}

/// Loads from the file named by `var` if set, otherwise the built-in copy.
/// A broken override is logged and the built-in copy used instead; a broken
/// built-in copy falls back to `T::default()`.
fn load_with_override<T: Default>(
    var: &str,
    what: &str,
    load: impl Fn(&Path) -> Result<T, DataError>,
    embedded: impl Fn() -> Result<T, DataError>,
) -> T {
    if let Ok(path) = std::env::var(var) {
        match load(Path::new(&path)) {
            Ok(value) => {
                info!("[Data] Loaded {} from {}", what, path);
                return value;
            }
            Err(err) => error!("[Data] {} override failed ({}); using built-in {}", var, err, what),
        }
    }
    embedded().unwrap_or_else(|err| {
        error!("[Data] Built-in {} is broken: {}", what, err);
        T::default()
    })
}

pub fn load_game_data() -> GameData {
    load_with_override(DATA_PATH_VAR, "game data", GameData::load, GameData::embedded)
}

pub fn load_game_config() -> GameConfig {
    load_with_override(CONFIG_PATH_VAR, "config", GameConfig::load, GameConfig::embedded)
}

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

/// Single system that populates every registry, applies the config and
/// then transitions to Playing.
pub fn load_all_data(mut commands: Commands, mut next_state: ResMut<NextState<GameState>>) {
    info!("[Data] Populating registries…");
    let data = load_game_data();
    let config = load_game_config();

    let mut items = ItemCatalog::default();
    for item in data.items {
        items.register(item);
    }
    let mut plants = PlantCatalog::default();
    for plant in data.plants {
        plants.register(plant);
    }
    let recipes = RecipeBook::from_recipes(data.recipes);
    let mut zones = ZoneRegistry::default();
    for zone in data.zones {
        zones.register(zone);
    }
    info!(
        "[Data] Items: {}, plants: {}, recipes: {}, zones: {}",
        items.len(),
        plants.len(),
        recipes.len(),
        zones.len()
    );

    let curve = config.curve();
    commands.insert_resource(Encyclopedia::from_catalog(&plants));
    commands.insert_resource(Inventory::with_capacity(config.inventory_capacity));
    commands.insert_resource(PlayerProgress::from_curve(&curve));
    commands.insert_resource(DayClock::new(config.day_length_secs, config.start_time));
    commands.insert_resource(CurrentZone {
        zone_id: config.starting_zone.clone(),
    });
    commands.insert_resource(NotificationLog::with_capacity(config.notification_history));
    commands.insert_resource(curve);
    commands.insert_resource(items);
    commands.insert_resource(plants);
    commands.insert_resource(recipes);
    commands.insert_resource(zones);
    commands.insert_resource(config);

    next_state.set(GameState::Playing);
    info!("[Data] Registries ready, entering Playing.");
}
