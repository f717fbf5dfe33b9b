//! Planted plots: timed growth through stages and harvest.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{ItemCatalog, PlantCatalog};
use crate::inventory::Inventory;
use crate::shared::*;

pub type PlotId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenPlot {
    pub id: PlotId,
    pub plant_id: PlantId,
    pub stage: u32,
    /// Seconds accumulated toward the next stage.
    pub elapsed: f32,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Garden {
    plots: Vec<GardenPlot>,
    next_id: PlotId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestYield {
    pub plant_id: PlantId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub exp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarvestError {
    #[error("no plot with id {0}")]
    UnknownPlot(PlotId),
    #[error("plant '{0}' is not in the catalog")]
    UnknownPlant(PlantId),
    #[error("This plant is not ready for harvest yet.")]
    NotReady,
}

impl Garden {
    /// Puts a fresh stage-0 plant in a new plot.
    pub fn plant(&mut self, plant_id: &str) -> PlotId {
        let id = self.next_id;
        self.next_id += 1;
        self.plots.push(GardenPlot {
            id,
            plant_id: plant_id.to_string(),
            stage: 0,
            elapsed: 0.0,
        });
        id
    }

    pub fn plot(&self, id: PlotId) -> Option<&GardenPlot> {
        self.plots.iter().find(|p| p.id == id)
    }

    pub fn plots(&self) -> &[GardenPlot] {
        &self.plots
    }

    pub fn remove(&mut self, id: PlotId) -> Option<GardenPlot> {
        let index = self.plots.iter().position(|p| p.id == id)?;
        Some(self.plots.remove(index))
    }

    pub fn clear(&mut self) {
        self.plots.clear();
    }

    /// Grows every plot by `dt` seconds. Returns the plots that reached
    /// their final stage during this call.
    pub fn advance(&mut self, plants: &PlantCatalog, dt: f32) -> Vec<PlotId> {
        let mut ripened = Vec::new();
        if dt <= 0.0 {
            return ripened;
        }
        for plot in &mut self.plots {
            let Some(def) = plants.get(&plot.plant_id) else {
                continue;
            };
            let final_stage = def.final_stage();
            if plot.stage >= final_stage {
                continue;
            }
            let per_stage = def.time_per_stage();
            if per_stage <= 0.0 {
                plot.stage = final_stage;
            } else {
                plot.elapsed += dt;
                while plot.elapsed >= per_stage && plot.stage < final_stage {
                    plot.elapsed -= per_stage;
                    plot.stage += 1;
                }
            }
            if plot.stage >= final_stage {
                plot.elapsed = 0.0;
                ripened.push(plot.id);
            }
        }
        ripened
    }

    pub fn is_harvestable(&self, plants: &PlantCatalog, id: PlotId) -> bool {
        self.plot(id)
            .and_then(|plot| plants.get(&plot.plant_id).map(|def| plot.stage >= def.final_stage()))
            .unwrap_or(false)
    }

    /// Takes the yield of a ripe plot and sends it back to stage 0.
    pub fn harvest(&mut self, plants: &PlantCatalog, id: PlotId) -> Result<HarvestYield, HarvestError> {
        let plot = self
            .plots
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(HarvestError::UnknownPlot(id))?;
        let def = plants
            .get(&plot.plant_id)
            .ok_or_else(|| HarvestError::UnknownPlant(plot.plant_id.clone()))?;
        if plot.stage < def.final_stage() {
            return Err(HarvestError::NotReady);
        }
        plot.stage = 0;
        plot.elapsed = 0.0;
        Ok(HarvestYield {
            plant_id: def.id.clone(),
            item_id: def.harvest_item.clone(),
            quantity: def.harvest_amount,
            exp: def.exp_value,
        })
    }
}

/// Player harvests the plant in `plot`.
#[derive(Event, Debug, Clone)]
pub struct HarvestEvent {
    pub plot: PlotId,
}

pub fn grow_garden(time: Res<Time>, plants: Res<PlantCatalog>, mut garden: ResMut<Garden>) {
    for id in garden.advance(&plants, time.delta_secs()) {
        debug!("[Garden] Plot {} is ready to harvest", id);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_harvest(
    mut events: EventReader<HarvestEvent>,
    plants: Res<PlantCatalog>,
    items: Res<ItemCatalog>,
    mut garden: ResMut<Garden>,
    mut inventory: ResMut<Inventory>,
    mut changed: EventWriter<InventoryChangedEvent>,
    mut harvested: EventWriter<PlantHarvestedEvent>,
    mut successes: EventWriter<CultivationSuccessEvent>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for ev in events.read() {
        let harvest = match garden.harvest(&plants, ev.plot) {
            Ok(harvest) => harvest,
            Err(HarvestError::NotReady) => {
                notifications.send(NotificationEvent {
                    message: HarvestError::NotReady.to_string(),
                });
                continue;
            }
            Err(err) => {
                warn!("[Garden] Harvest failed: {}", err);
                continue;
            }
        };

        let outcome = inventory.add_item(&items, &harvest.item_id, harvest.quantity);
        if outcome.added() > 0 {
            changed.send(InventoryChangedEvent);
        }
        if outcome.leftover() > 0 {
            notifications.send(NotificationEvent {
                message: "Inventory is full!".to_string(),
            });
        }

        info!(
            "[Garden] Harvested {}x {} from plot {}",
            harvest.quantity, harvest.item_id, ev.plot
        );
        notifications.send(NotificationEvent {
            message: format!(
                "Harvested {}x {}!",
                harvest.quantity,
                items.display_name(&harvest.item_id)
            ),
        });
        harvested.send(PlantHarvestedEvent {
            plant_id: harvest.plant_id.clone(),
            item_id: harvest.item_id,
            quantity: harvest.quantity,
        });
        successes.send(CultivationSuccessEvent {
            plant_id: harvest.plant_id,
            exp: harvest.exp,
            source: CultivationSource::Harvested,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plants() -> PlantCatalog {
        let mut plants = PlantCatalog::default();
        plants.register(PlantDef {
            id: "fern".into(),
            name: "Fern".into(),
            description: String::new(),
            growth_stages: 3,
            growth_time: 30.0,
            exp_value: 15,
            harvest_item: "fern_leaf".into(),
            harvest_amount: 2,
            seed_item: "seed_fern".into(),
        });
        plants
    }

    #[test]
    fn test_growth_steps_through_stages() {
        let plants = plants();
        let mut garden = Garden::default();
        let plot = garden.plant("fern");

        assert!(garden.advance(&plants, 9.0).is_empty());
        assert_eq!(garden.plot(plot).map(|p| p.stage), Some(0));
        garden.advance(&plants, 1.0);
        assert_eq!(garden.plot(plot).map(|p| p.stage), Some(1));
        assert_eq!(garden.advance(&plants, 25.0), vec![plot]);
        assert_eq!(garden.plot(plot).map(|p| p.stage), Some(2));
        assert!(garden.is_harvestable(&plants, plot));
        // Ripe plots stop accumulating.
        assert!(garden.advance(&plants, 100.0).is_empty());
    }

    #[test]
    fn test_harvest_requires_final_stage() {
        let plants = plants();
        let mut garden = Garden::default();
        let plot = garden.plant("fern");
        assert_eq!(garden.harvest(&plants, plot), Err(HarvestError::NotReady));
        assert_eq!(garden.harvest(&plants, 99), Err(HarvestError::UnknownPlot(99)));

        garden.advance(&plants, 30.0);
        let harvest = garden.harvest(&plants, plot).unwrap();
        assert_eq!(harvest.item_id, "fern_leaf");
        assert_eq!(harvest.quantity, 2);
        assert_eq!(harvest.exp, 15);
        assert_eq!(garden.plot(plot).map(|p| p.stage), Some(0));
    }

    #[test]
    fn test_plot_ids_are_not_reused() {
        let mut garden = Garden::default();
        let a = garden.plant("fern");
        garden.remove(a);
        let b = garden.plant("fern");
        assert_ne!(a, b);
        assert_eq!(garden.plots().len(), 1);
    }
}
