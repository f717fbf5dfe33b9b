//! Encyclopedia domain: per-plant discovery log.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::PlantCatalog;
use crate::cultivation::RecipeBook;
use crate::shared::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub plant_id: PlantId,
    pub discovered: bool,
    /// Unix seconds of the first discovery.
    pub discovered_at: Option<u64>,
    /// Counts every successful cultivation or harvest, including the first.
    pub times_harvested: u32,
}

impl LogEntry {
    pub fn new(plant_id: impl Into<PlantId>) -> Self {
        Self {
            plant_id: plant_id.into(),
            discovered: false,
            discovered_at: None,
            times_harvested: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryUpdate {
    pub newly_discovered: bool,
    pub times_harvested: u32,
}

/// Entries in catalog order; plants outside the catalog are appended when
/// first seen.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encyclopedia {
    entries: Vec<LogEntry>,
}

impl Encyclopedia {
    pub fn from_catalog(plants: &PlantCatalog) -> Self {
        Self {
            entries: plants.ids().map(LogEntry::new).collect(),
        }
    }

    pub fn unlock_entry(&mut self, plant_id: &str, now: Option<u64>) -> Option<EntryUpdate> {
        if plant_id.is_empty() {
            return None;
        }
        let index = match self.entries.iter().position(|e| e.plant_id == plant_id) {
            Some(index) => index,
            None => {
                self.entries.push(LogEntry::new(plant_id));
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[index];
        let newly_discovered = !entry.discovered;
        if newly_discovered {
            entry.discovered = true;
            entry.discovered_at = now;
        }
        entry.times_harvested = entry.times_harvested.saturating_add(1);
        Some(EntryUpdate {
            newly_discovered,
            times_harvested: entry.times_harvested,
        })
    }

    pub fn entry(&self, plant_id: &str) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.plant_id == plant_id)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_discovered(&self, plant_id: &str) -> bool {
        self.entry(plant_id).is_some_and(|e| e.discovered)
    }

    pub fn discovered_count(&self) -> usize {
        self.entries.iter().filter(|e| e.discovered).count()
    }

    pub fn discovered_plants<'a>(&self, plants: &'a PlantCatalog) -> Vec<&'a PlantDef> {
        self.entries
            .iter()
            .filter(|e| e.discovered)
            .filter_map(|e| plants.get(&e.plant_id))
            .collect()
    }

    /// Percentage of `total_plants` discovered; 0 for an empty catalog.
    pub fn completion_percentage(&self, total_plants: usize) -> f32 {
        if total_plants == 0 {
            return 0.0;
        }
        self.discovered_count() as f32 / total_plants as f32 * 100.0
    }

    /// Recipe hints for the seeds of every plant not yet discovered.
    pub fn hints_for_undiscovered(&self, plants: &PlantCatalog, recipes: &RecipeBook) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.discovered)
            .filter_map(|e| plants.get(&e.plant_id))
            .flat_map(|plant| recipes.recipes_for_seed(&plant.seed_item))
            .filter(|recipe| !recipe.hint.is_empty())
            .map(|recipe| recipe.hint.clone())
            .collect()
    }
}

pub struct EncyclopediaPlugin;

impl Plugin for EncyclopediaPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            record_discoveries
                .in_set(CoreSet::Rewards)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

fn unix_now() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

pub fn record_discoveries(
    mut successes: EventReader<CultivationSuccessEvent>,
    plants: Res<PlantCatalog>,
    mut encyclopedia: ResMut<Encyclopedia>,
    mut unlocked: EventWriter<EntryUnlockedEvent>,
    mut changed: EventWriter<EncyclopediaChangedEvent>,
) {
    for ev in successes.read() {
        let Some(update) = encyclopedia.unlock_entry(&ev.plant_id, unix_now()) else {
            continue;
        };
        if update.newly_discovered {
            info!(
                "[Encyclopedia] New plant discovered: {}",
                plants.display_name(&ev.plant_id)
            );
            unlocked.send(EntryUnlockedEvent {
                plant_id: ev.plant_id.clone(),
            });
        }
        changed.send(EncyclopediaChangedEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plants() -> PlantCatalog {
        let mut plants = PlantCatalog::default();
        for (id, seed) in [("moonflower", "seed_mystic"), ("fern", "seed_fern")] {
            plants.register(PlantDef {
                id: id.into(),
                name: id.into(),
                description: String::new(),
                growth_stages: 1,
                growth_time: 0.0,
                exp_value: 10,
                harvest_item: "leaf".into(),
                harvest_amount: 1,
                seed_item: seed.into(),
            });
        }
        plants
    }

    #[test]
    fn test_double_unlock_discovers_once() {
        let mut book = Encyclopedia::from_catalog(&plants());
        let first = book.unlock_entry("moonflower", Some(100)).unwrap();
        let second = book.unlock_entry("moonflower", Some(200)).unwrap();
        assert!(first.newly_discovered);
        assert!(!second.newly_discovered);
        assert_eq!(second.times_harvested, 2);
        assert_eq!(book.entry("moonflower").and_then(|e| e.discovered_at), Some(100));
    }

    #[test]
    fn test_empty_id_ignored_and_unknown_created() {
        let mut book = Encyclopedia::default();
        assert!(book.unlock_entry("", None).is_none());
        assert!(book.unlock_entry("stray", None).is_some());
        assert!(book.is_discovered("stray"));
    }

    #[test]
    fn test_completion_percentage() {
        let plants = plants();
        let mut book = Encyclopedia::from_catalog(&plants);
        assert_eq!(book.completion_percentage(0), 0.0);
        assert_eq!(book.completion_percentage(plants.len()), 0.0);
        book.unlock_entry("fern", None);
        assert_eq!(book.completion_percentage(plants.len()), 50.0);
        assert_eq!(book.discovered_plants(&plants).len(), 1);
    }

    #[test]
    fn test_hints_only_for_undiscovered() {
        let plants = plants();
        let recipes = RecipeBook::from_recipes([CultivationRecipe {
            id: "mystic".into(),
            name: "Mystic".into(),
            seed_item: "seed_mystic".into(),
            output_plant: "moonflower".into(),
            conditions: vec![],
            discovered_by_default: false,
            hint: "Blooms under the moon".into(),
        }]);
        let mut book = Encyclopedia::from_catalog(&plants);
        assert_eq!(book.hints_for_undiscovered(&plants, &recipes), vec!["Blooms under the moon"]);
        book.unlock_entry("moonflower", None);
        assert!(book.hints_for_undiscovered(&plants, &recipes).is_empty());
    }
}
