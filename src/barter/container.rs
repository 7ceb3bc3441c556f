//! Fixed-capacity slotted item container and its stack-aware primitives.
//!
//! Every slot is either empty or holds a stack with `1..=max_stack` units. The bulk
//! operations below never leave a container partially changed: they either check
//! up front (`add_items`, `remove_items`) or snapshot and restore (`transfer`).

use serde::{Deserialize, Serialize};

use crate::barter::item::{ids_match, ItemCatalog};
use crate::barter::types::ItemStack;

/// Ordered array of optional item stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemContainer {
    slots: Vec<Option<ItemStack>>,
}

impl ItemContainer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Build a container from explicit slot contents. Zero-quantity stacks become empty slots.
    pub fn from_slots(slots: Vec<Option<ItemStack>>) -> Self {
        Self {
            slots: slots
                .into_iter()
                .map(|slot| slot.filter(|s| s.quantity > 0))
                .collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Replace a slot's contents, returning what was there. Out-of-range slots are ignored.
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> Option<ItemStack> {
        match self.slots.get_mut(slot) {
            Some(cell) => std::mem::replace(cell, stack.filter(|s| s.quantity > 0)),
            None => None,
        }
    }

    pub fn take(&mut self, slot: usize) -> Option<ItemStack> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn total_items(&self) -> u64 {
        self.iter().map(|s| u64::from(s.quantity)).sum()
    }

    /// Id of the first occupied slot, scanning from slot 0.
    pub fn first_item_id(&self) -> Option<&str> {
        self.iter().next().map(|s| s.item_id.as_str())
    }

    /// Units of `item_id` held across all slots, using tolerant id matching.
    pub fn count(&self, item_id: &str) -> u64 {
        self.iter()
            .filter(|s| ids_match(item_id, &s.item_id))
            .map(|s| u64::from(s.quantity))
            .sum()
    }

    /// Units of `item_id` this container could still absorb.
    ///
    /// Empty slots contribute a full stack; matching slots contribute their headroom,
    /// except for unstackable items where an occupied slot contributes nothing.
    pub fn available_space(&self, item_id: &str, catalog: &dyn ItemCatalog) -> u64 {
        let max_stack = catalog.max_stack(item_id);
        self.slots
            .iter()
            .map(|slot| match slot {
                None => u64::from(max_stack),
                Some(stack) if max_stack > 1 && ids_match(item_id, &stack.item_id) => {
                    u64::from(max_stack.saturating_sub(stack.quantity))
                }
                Some(_) => 0,
            })
            .sum()
    }

    /// Remove `quantity` units of `item_id`. Fails without touching anything when the
    /// container holds fewer.
    pub fn remove_items(&mut self, item_id: &str, quantity: u64) -> bool {
        if self.count(item_id) < quantity {
            return false;
        }
        self.drain(item_id, quantity);
        true
    }

    /// Add `quantity` plain (attribute-less) units of `item_id`, topping up matching
    /// stacks first. Fails without touching anything when there is not enough room.
    pub fn add_items(&mut self, item_id: &str, quantity: u64, catalog: &dyn ItemCatalog) -> bool {
        if quantity == 0 {
            return true;
        }
        if self.available_space(item_id, catalog) < quantity {
            return false;
        }
        let max_stack = catalog.max_stack(item_id);
        let mut remaining = quantity;
        if max_stack > 1 {
            for slot in self.slots.iter_mut().flatten() {
                if remaining == 0 {
                    break;
                }
                if ids_match(item_id, &slot.item_id) && slot.quantity < max_stack {
                    let add = remaining.min(u64::from(max_stack - slot.quantity));
                    slot.quantity += add as u32;
                    remaining -= add;
                }
            }
        }
        for cell in self.slots.iter_mut().filter(|c| c.is_none()) {
            if remaining == 0 {
                break;
            }
            let add = remaining.min(u64::from(max_stack));
            *cell = Some(ItemStack::new(item_id, add as u32));
            remaining -= add;
        }
        remaining == 0
    }

    /// Insert a stack keeping all its attributes. Merges only into exactly stackable
    /// slots, then fills empty slots. Returns whatever did not fit.
    pub fn add_stack(&mut self, stack: ItemStack, catalog: &dyn ItemCatalog) -> Option<ItemStack> {
        if stack.quantity == 0 {
            return None;
        }
        let max_stack = catalog.max_stack(&stack.item_id);
        let mut remaining = stack.quantity;
        if max_stack > 1 {
            for existing in self.slots.iter_mut().flatten() {
                if remaining == 0 {
                    break;
                }
                if existing.is_stackable_with(&stack) && existing.quantity < max_stack {
                    let add = remaining.min(max_stack - existing.quantity);
                    existing.quantity += add;
                    remaining -= add;
                }
            }
        }
        for cell in self.slots.iter_mut().filter(|c| c.is_none()) {
            if remaining == 0 {
                break;
            }
            let add = remaining.min(max_stack);
            *cell = Some(stack.with_quantity(add));
            remaining -= add;
        }
        (remaining > 0).then(|| stack.with_quantity(remaining))
    }

    /// Pull up to `quantity` units of `item_id` out as the original stacks (split where
    /// needed), scanning from slot 0.
    fn drain(&mut self, item_id: &str, quantity: u64) -> Vec<ItemStack> {
        let mut taken = Vec::new();
        let mut remaining = quantity;
        for cell in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            let Some(stack) = cell.as_mut() else {
                continue;
            };
            if !ids_match(item_id, &stack.item_id) {
                continue;
            }
            let take = remaining.min(u64::from(stack.quantity)) as u32;
            if take == stack.quantity {
                if let Some(whole) = cell.take() {
                    taken.push(whole);
                }
            } else {
                taken.push(stack.with_quantity(take));
                stack.quantity -= take;
            }
            remaining -= u64::from(take);
        }
        taken
    }
}

/// Move exactly `quantity` units of `item_id` from `src` into `dst`, preserving every
/// stack's attributes.
///
/// Either the whole quantity moves or both containers are left exactly as they were.
pub fn transfer(
    src: &mut ItemContainer,
    dst: &mut ItemContainer,
    item_id: &str,
    quantity: u64,
    catalog: &dyn ItemCatalog,
) -> bool {
    if quantity == 0 {
        return true;
    }
    if src.count(item_id) < quantity {
        return false;
    }
    let src_before = src.slots.clone();
    let dst_before = dst.slots.clone();
    for stack in src.drain(item_id, quantity) {
        if dst.add_stack(stack, catalog).is_some() {
            src.slots = src_before;
            dst.slots = dst_before;
            return false;
        }
    }
    true
}
