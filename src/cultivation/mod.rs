//! Cultivation domain: recipe matching, planting, growth and harvest.
//!
//! `RecipeBook::attempt` is the pure rule engine: given a seed and the
//! situation it is planted in, it returns the first recipe registered for
//! that seed whose conditions all hold. The systems wrap it with the
//! inventory bookkeeping and announce the outcome on the event bus.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::calendar::DayClock;
use crate::catalog::PlantCatalog;
use crate::inventory::Inventory;
use crate::shared::*;

pub mod garden;

pub use garden::{Garden, GardenPlot, HarvestError, HarvestEvent, HarvestYield, PlotId};

// ═══════════════════════════════════════════════════════════════════════
// CONTEXT & RESULT
// ═══════════════════════════════════════════════════════════════════════

/// The situation a single cultivation attempt happens in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CultivationContext {
    pub seed_id: ItemId,
    /// Compared verbatim against TimeOfDay condition values ("Day"/"Night").
    pub time_of_day: String,
    /// Catalyst consumed alongside the seed, if any.
    pub item_used: Option<ItemId>,
    pub adjacent_plants: HashSet<PlantId>,
}

impl CultivationContext {
    pub fn new(seed_id: impl Into<ItemId>) -> Self {
        Self {
            seed_id: seed_id.into(),
            ..Default::default()
        }
    }

    /// Context stamped with the clock's current phase.
    pub fn from_clock(seed_id: impl Into<ItemId>, clock: &DayClock) -> Self {
        Self::new(seed_id).at(clock.time_of_day().as_str())
    }

    pub fn at(mut self, time_of_day: impl Into<String>) -> Self {
        self.time_of_day = time_of_day.into();
        self
    }

    pub fn using(mut self, item_id: impl Into<ItemId>) -> Self {
        self.item_used = Some(item_id.into());
        self
    }

    pub fn next_to(mut self, plant_id: impl Into<PlantId>) -> Self {
        self.adjacent_plants.insert(plant_id.into());
        self
    }

    fn catalyst(&self) -> Option<&str> {
        self.item_used.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CultivationMatch {
    pub recipe_id: RecipeId,
    pub output_plant: PlantId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CultivationFailure {
    #[error("Invalid context")]
    InvalidContext,
    #[error("No recipes for this seed")]
    NoRecipes,
    #[error("No matching conditions")]
    NoMatch,
    #[error("Missing seed")]
    MissingSeed,
    #[error("Missing catalyst")]
    MissingCatalyst,
}

pub type CultivationResult = Result<CultivationMatch, CultivationFailure>;

// ═══════════════════════════════════════════════════════════════════════
// RECIPE BOOK
// ═══════════════════════════════════════════════════════════════════════

/// All recipes in registration order, indexed by input seed.
#[derive(Resource, Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: Vec<CultivationRecipe>,
    by_seed: HashMap<ItemId, Vec<usize>>,
}

impl RecipeBook {
    pub fn from_recipes(recipes: impl IntoIterator<Item = CultivationRecipe>) -> Self {
        let mut book = Self::default();
        book.rebuild(recipes);
        book
    }

    /// Adds a recipe to the end of its seed's list. Recipes without a seed
    /// and duplicate recipe ids are rejected; the first registration wins.
    pub fn register(&mut self, recipe: CultivationRecipe) -> bool {
        if recipe.seed_item.is_empty() {
            warn!("[Cultivation] Recipe '{}' has no input seed", recipe.id);
            return false;
        }
        if !recipe.id.is_empty() && self.get(&recipe.id).is_some() {
            warn!("[Cultivation] Duplicate recipe id '{}' ignored", recipe.id);
            return false;
        }
        self.by_seed
            .entry(recipe.seed_item.clone())
            .or_default()
            .push(self.recipes.len());
        self.recipes.push(recipe);
        true
    }

    /// Drops the current index and registers `recipes` from scratch.
    pub fn rebuild(&mut self, recipes: impl IntoIterator<Item = CultivationRecipe>) {
        self.recipes.clear();
        self.by_seed.clear();
        for recipe in recipes {
            self.register(recipe);
        }
        info!(
            "[Cultivation] Recipe book indexed {} recipes across {} seed types",
            self.recipes.len(),
            self.by_seed.len()
        );
    }

    pub fn get(&self, recipe_id: &str) -> Option<&CultivationRecipe> {
        self.recipes.iter().find(|r| r.id == recipe_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CultivationRecipe> {
        self.recipes.iter()
    }

    pub fn recipes_for_seed<'a>(&'a self, seed_id: &str) -> impl Iterator<Item = &'a CultivationRecipe> {
        self.by_seed
            .get(seed_id)
            .into_iter()
            .flatten()
            .map(|&i| &self.recipes[i])
    }

    pub fn seed_count(&self) -> usize {
        self.by_seed.len()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// First recipe for the seed, in registration order, whose conditions
    /// all hold.
    pub fn attempt(&self, context: Option<&CultivationContext>) -> CultivationResult {
        let Some(context) = context.filter(|c| !c.seed_id.is_empty()) else {
            warn!("[Cultivation] Invalid cultivation context");
            return Err(CultivationFailure::InvalidContext);
        };

        let Some(candidates) = self.by_seed.get(&context.seed_id) else {
            info!("[Cultivation] No recipes found for seed: {}", context.seed_id);
            return Err(CultivationFailure::NoRecipes);
        };

        candidates
            .iter()
            .map(|&i| &self.recipes[i])
            .filter(|recipe| !recipe.output_plant.is_empty())
            .find(|recipe| recipe.conditions.iter().all(|c| condition_holds(c, context)))
            .map(|recipe| CultivationMatch {
                recipe_id: recipe.id.clone(),
                output_plant: recipe.output_plant.clone(),
            })
            .ok_or(CultivationFailure::NoMatch)
    }
}

fn condition_holds(condition: &CultivationCondition, context: &CultivationContext) -> bool {
    match condition.kind {
        ConditionKind::TimeOfDay => context.time_of_day == condition.value,
        ConditionKind::ItemUsed => context.item_used.as_deref() == Some(condition.value.as_str()),
        ConditionKind::Adjacency => context.adjacent_plants.contains(&condition.value),
        ConditionKind::Weather | ConditionKind::Season => {
            debug!("[Cultivation] Unhandled condition kind {:?}, treating as met", condition.kind);
            true
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RECIPE JOURNAL
// ═══════════════════════════════════════════════════════════════════════

/// Recipes the player knows: the default-discovered ones plus every recipe
/// that has matched at least once.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeJournal {
    pub known: Vec<RecipeId>,
}

impl RecipeJournal {
    pub fn seed_defaults(&mut self, book: &RecipeBook) -> usize {
        let mut added = 0;
        for recipe in book.iter().filter(|r| r.discovered_by_default) {
            if self.learn(&recipe.id) {
                added += 1;
            }
        }
        added
    }

    /// Returns true if the recipe was new to the journal.
    pub fn learn(&mut self, recipe_id: &str) -> bool {
        if recipe_id.is_empty() || self.knows(recipe_id) {
            return false;
        }
        self.known.push(recipe_id.to_string());
        true
    }

    pub fn knows(&self, recipe_id: &str) -> bool {
        self.known.iter().any(|id| id == recipe_id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Player plants `context.seed_id` under `context`.
#[derive(Event, Debug, Clone)]
pub struct CultivateEvent {
    pub context: CultivationContext,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct CultivationPlugin;

impl Plugin for CultivationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RecipeJournal>()
            .add_event::<CultivateEvent>()
            .add_event::<HarvestEvent>()
            .add_systems(OnEnter(GameState::Playing), seed_recipe_journal)
            .add_systems(
                Update,
                garden::grow_garden
                    .in_set(CoreSet::Clock)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (handle_cultivate, garden::handle_harvest)
                    .chain()
                    .in_set(CoreSet::Actions)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn seed_recipe_journal(book: Res<RecipeBook>, mut journal: ResMut<RecipeJournal>) {
    let added = journal.seed_defaults(&book);
    if added > 0 {
        info!("[Cultivation] {} recipes known from the start", added);
    }
}

/// Evaluates the recipe, then checks the bag holds the seed (and catalyst).
pub fn resolve_cultivation(
    book: &RecipeBook,
    inventory: &Inventory,
    context: &CultivationContext,
) -> CultivationResult {
    let matched = book.attempt(Some(context))?;
    if !inventory.has(&context.seed_id) {
        return Err(CultivationFailure::MissingSeed);
    }
    if let Some(catalyst) = context.catalyst() {
        let needed = if catalyst == context.seed_id { 2 } else { 1 };
        if !inventory.has_item(catalyst, needed) {
            return Err(CultivationFailure::MissingCatalyst);
        }
    }
    Ok(matched)
}

#[allow(clippy::too_many_arguments)]
pub fn handle_cultivate(
    mut events: EventReader<CultivateEvent>,
    book: Res<RecipeBook>,
    plants: Res<PlantCatalog>,
    mut inventory: ResMut<Inventory>,
    mut garden: ResMut<Garden>,
    mut journal: ResMut<RecipeJournal>,
    mut changed: EventWriter<InventoryChangedEvent>,
    mut successes: EventWriter<CultivationSuccessEvent>,
    mut failures: EventWriter<CultivationFailedEvent>,
) {
    for ev in events.read() {
        let context = &ev.context;
        let matched = match resolve_cultivation(&book, &inventory, context) {
            Ok(matched) => matched,
            Err(failure) => {
                info!("[Cultivation] '{}' failed: {}", context.seed_id, failure);
                failures.send(CultivationFailedEvent {
                    seed_id: context.seed_id.clone(),
                    reason: failure.to_string(),
                });
                continue;
            }
        };

        inventory.remove_item(&context.seed_id, 1);
        if let Some(catalyst) = context.catalyst() {
            inventory.remove_item(catalyst, 1);
        }
        changed.send(InventoryChangedEvent);

        let plot = garden.plant(&matched.output_plant);
        if journal.learn(&matched.recipe_id) {
            info!("[Cultivation] Learned recipe '{}'", matched.recipe_id);
        }

        let exp = plants
            .get(&matched.output_plant)
            .map(|p| p.exp_value)
            .unwrap_or_else(|| {
                warn!("[Cultivation] Output plant '{}' not in catalog", matched.output_plant);
                0
            });
        info!(
            "[Cultivation] '{}' grew into '{}' (plot {}, recipe '{}')",
            context.seed_id, matched.output_plant, plot, matched.recipe_id
        );
        successes.send(CultivationSuccessEvent {
            plant_id: matched.output_plant,
            exp,
            source: CultivationSource::Cultivated,
        });
    }
}
