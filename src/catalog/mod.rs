//! Static item and plant registries, filled once by the data loader.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// ITEM CATALOG
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemId, ItemDef>,
}

impl ItemCatalog {
    /// Registers an item. Empty and duplicate ids are rejected; the first
    /// registration of an id wins.
    pub fn register(&mut self, mut def: ItemDef) -> bool {
        if def.id.is_empty() {
            warn!("[Catalog] Rejected item with empty id ({})", def.name);
            return false;
        }
        if self.items.contains_key(&def.id) {
            warn!("[Catalog] Duplicate item id '{}' ignored", def.id);
            return false;
        }
        if !def.stackable {
            def.max_stack = 1;
        }
        self.items.insert(def.id.clone(), def);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        !id.is_empty() && self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Display name, falling back to the raw id for unknown items.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|d| d.name.as_str()).unwrap_or(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLANT CATALOG
// ═══════════════════════════════════════════════════════════════════════

/// Plants in registration order, indexed by id.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlantCatalog {
    plants: Vec<PlantDef>,
    index: HashMap<PlantId, usize>,
}

impl PlantCatalog {
    pub fn register(&mut self, mut def: PlantDef) -> bool {
        if def.id.is_empty() {
            warn!("[Catalog] Rejected plant with empty id ({})", def.name);
            return false;
        }
        if self.index.contains_key(&def.id) {
            warn!("[Catalog] Duplicate plant id '{}' ignored", def.id);
            return false;
        }
        def.growth_stages = def.growth_stages.max(1);
        self.index.insert(def.id.clone(), self.plants.len());
        self.plants.push(def);
        true
    }

    pub fn get(&self, id: &str) -> Option<&PlantDef> {
        self.index.get(id).map(|&i| &self.plants[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlantDef> {
        self.plants.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.plants.iter().map(|p| p.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|d| d.name.as_str()).unwrap_or(id)
    }
}
