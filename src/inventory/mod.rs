//! Inventory domain: the player's bag of item stacks.
//!
//! The ledger itself is a plain resource with pure methods; the systems
//! below translate intent events into calls and announce every mutation
//! with `InventoryChangedEvent`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStack {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Why an add was refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddRejection {
    EmptyId,
    UnknownItem,
    ZeroQuantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Nothing changed.
    Rejected(AddRejection),
    /// `added` units were stored; `leftover` did not fit.
    Stored { added: u32, leftover: u32 },
}

impl AddOutcome {
    /// True only when every requested unit was stored.
    pub fn is_complete(&self) -> bool {
        matches!(self, AddOutcome::Stored { leftover: 0, .. })
    }

    pub fn added(&self) -> u32 {
        match self {
            AddOutcome::Stored { added, .. } => *added,
            AddOutcome::Rejected(_) => 0,
        }
    }

    pub fn leftover(&self) -> u32 {
        match self {
            AddOutcome::Stored { leftover, .. } => *leftover,
            AddOutcome::Rejected(_) => 0,
        }
    }
}

/// Ordered list of stacks with a slot cap. Each stack holds between 1 and
/// its item's max stack size.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    stacks: Vec<InventoryStack>,
    capacity: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INVENTORY_CAPACITY)
    }
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stacks: Vec::new(),
            capacity,
        }
    }

    /// Changes the slot cap. Existing stacks are kept even if they exceed it;
    /// the bag just reports full until enough are removed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Try to add `quantity` of an item. Tops up under-full stacks in list
    /// order first, then opens new stacks while slots remain.
    pub fn add_item(&mut self, catalog: &ItemCatalog, item_id: &str, quantity: u32) -> AddOutcome {
        if item_id.is_empty() {
            return AddOutcome::Rejected(AddRejection::EmptyId);
        }
        if quantity == 0 {
            return AddOutcome::Rejected(AddRejection::ZeroQuantity);
        }
        let Some(def) = catalog.get(item_id) else {
            warn!("[Inventory] Cannot add item: '{}' not found in catalog", item_id);
            return AddOutcome::Rejected(AddRejection::UnknownItem);
        };
        let max_stack = def.max_stack_size();
        let mut remaining = quantity;

        for stack in self
            .stacks
            .iter_mut()
            .filter(|s| s.item_id == item_id && s.quantity < max_stack)
        {
            if remaining == 0 {
                break;
            }
            let add = remaining.min(max_stack - stack.quantity);
            stack.quantity += add;
            remaining -= add;
        }

        while remaining > 0 && self.stacks.len() < self.capacity {
            let add = remaining.min(max_stack);
            self.stacks.push(InventoryStack {
                item_id: item_id.to_string(),
                quantity: add,
            });
            remaining -= add;
        }

        if remaining > 0 {
            warn!(
                "[Inventory] Inventory full! Could not add {} {}",
                remaining, def.name
            );
        }

        AddOutcome::Stored {
            added: quantity - remaining,
            leftover: remaining,
        }
    }

    /// Remove exactly `quantity` or nothing at all.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        if item_id.is_empty() || quantity == 0 || !self.has_item(item_id, quantity) {
            return false;
        }

        let mut remaining = quantity;
        for stack in self.stacks.iter_mut().filter(|s| s.item_id == item_id) {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(stack.quantity);
            stack.quantity -= take;
            remaining -= take;
        }
        self.stacks.retain(|s| s.quantity > 0);
        true
    }

    pub fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        if item_id.is_empty() || quantity == 0 {
            return false;
        }
        self.item_count(item_id) >= quantity
    }

    /// `has_item(id, 1)`.
    pub fn has(&self, item_id: &str) -> bool {
        self.has_item(item_id, 1)
    }

    pub fn item_count(&self, item_id: &str) -> u32 {
        self.stacks
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.quantity)
            .sum()
    }

    pub fn clear(&mut self) {
        self.stacks.clear();
    }

    pub fn stacks(&self) -> &[InventoryStack] {
        &self.stacks
    }

    pub fn used_slots(&self) -> usize {
        self.stacks.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.stacks.len() >= self.capacity
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct InventoryPlugin;

impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_clear_inventory, handle_add_item, handle_remove_item)
                .chain()
                .in_set(CoreSet::Actions)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_add_item(
    mut events: EventReader<AddItemEvent>,
    catalog: Res<ItemCatalog>,
    mut inventory: ResMut<Inventory>,
    mut changed: EventWriter<InventoryChangedEvent>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for ev in events.read() {
        let outcome = inventory.add_item(&catalog, &ev.item_id, ev.quantity);
        if outcome.added() > 0 {
            changed.send(InventoryChangedEvent);
        }
        match outcome {
            AddOutcome::Rejected(reason) => {
                debug!("[Inventory] Add '{}' x{} rejected: {:?}", ev.item_id, ev.quantity, reason);
            }
            AddOutcome::Stored { leftover: 0, added } => {
                notifications.send(NotificationEvent {
                    message: format!("Picked up {}x {}", added, catalog.display_name(&ev.item_id)),
                });
            }
            AddOutcome::Stored { .. } => {
                notifications.send(NotificationEvent {
                    message: "Inventory is full!".to_string(),
                });
            }
        }
    }
}

pub fn handle_remove_item(
    mut events: EventReader<RemoveItemEvent>,
    mut inventory: ResMut<Inventory>,
    mut changed: EventWriter<InventoryChangedEvent>,
) {
    for ev in events.read() {
        if inventory.remove_item(&ev.item_id, ev.quantity) {
            changed.send(InventoryChangedEvent);
        } else {
            info!(
                "[Inventory] Cannot remove {} '{}': only {} held",
                ev.quantity,
                ev.item_id,
                inventory.item_count(&ev.item_id)
            );
        }
    }
}

pub fn handle_clear_inventory(
    mut events: EventReader<ClearInventoryEvent>,
    mut inventory: ResMut<Inventory>,
    mut changed: EventWriter<InventoryChangedEvent>,
) {
    if events.read().count() == 0 {
        return;
    }
    inventory.clear();
    changed.send(InventoryChangedEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::default();
        catalog.register(ItemDef {
            id: "seed_basic".into(),
            name: "Basic Seed".into(),
            description: String::new(),
            stackable: true,
            max_stack: 10,
            category: ItemCategory::Seed,
        });
        catalog.register(ItemDef {
            id: "trowel".into(),
            name: "Trowel".into(),
            description: String::new(),
            stackable: false,
            max_stack: 99,
            category: ItemCategory::Tool,
        });
        catalog
    }

    #[test]
    fn test_add_tops_up_before_opening_stacks() {
        let catalog = catalog();
        let mut inv = Inventory::with_capacity(5);
        inv.add_item(&catalog, "seed_basic", 7);
        let outcome = inv.add_item(&catalog, "seed_basic", 6);
        assert!(outcome.is_complete());
        assert_eq!(
            inv.stacks().iter().map(|s| s.quantity).collect::<Vec<_>>(),
            vec![10, 3]
        );
    }

    #[test]
    fn test_non_stackable_one_per_slot() {
        let catalog = catalog();
        let mut inv = Inventory::with_capacity(5);
        inv.add_item(&catalog, "trowel", 3);
        assert_eq!(inv.used_slots(), 3);
        assert!(inv.stacks().iter().all(|s| s.quantity == 1));
    }

    #[test]
    fn test_partial_add_when_full() {
        let catalog = catalog();
        let mut inv = Inventory::with_capacity(2);
        let outcome = inv.add_item(&catalog, "seed_basic", 25);
        assert_eq!(outcome, AddOutcome::Stored { added: 20, leftover: 5 });
        assert!(!outcome.is_complete());
        assert!(inv.is_full());
        assert_eq!(inv.item_count("seed_basic"), 20);
    }

    #[test]
    fn test_add_rejections_leave_state_untouched() {
        let catalog = catalog();
        let mut inv = Inventory::with_capacity(2);
        assert_eq!(
            inv.add_item(&catalog, "", 1),
            AddOutcome::Rejected(AddRejection::EmptyId)
        );
        assert_eq!(
            inv.add_item(&catalog, "seed_basic", 0),
            AddOutcome::Rejected(AddRejection::ZeroQuantity)
        );
        assert_eq!(
            inv.add_item(&catalog, "moonstone", 1),
            AddOutcome::Rejected(AddRejection::UnknownItem)
        );
        assert_eq!(inv.used_slots(), 0);
    }

    #[test]
    fn test_remove_is_atomic() {
        let catalog = catalog();
        let mut inv = Inventory::with_capacity(5);
        inv.add_item(&catalog, "seed_basic", 15);
        let before = inv.clone();
        assert!(!inv.remove_item("seed_basic", 16));
        assert_eq!(inv, before);
    }

    #[test]
    fn test_remove_drops_empty_stacks_in_order() {
        let catalog = catalog();
        let mut inv = Inventory::with_capacity(5);
        inv.add_item(&catalog, "seed_basic", 25);
        assert!(inv.remove_item("seed_basic", 12));
        assert_eq!(
            inv.stacks().iter().map(|s| s.quantity).collect::<Vec<_>>(),
            vec![8, 5]
        );
        assert_eq!(inv.item_count("seed_basic"), 13);
    }

    #[test]
    fn test_has_item_defaults() {
        let catalog = catalog();
        let mut inv = Inventory::default();
        assert!(!inv.has("seed_basic"));
        inv.add_item(&catalog, "seed_basic", 2);
        assert!(inv.has("seed_basic"));
        assert!(inv.has_item("seed_basic", 2));
        assert!(!inv.has_item("seed_basic", 3));
        assert!(!inv.has_item("seed_basic", 0));
        inv.clear();
        assert_eq!(inv.item_count("seed_basic"), 0);
    }
}
