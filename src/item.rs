use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RecipeError;
use crate::resource::ResourceLocation;

// ============================================================================
// Item Stacks
// ============================================================================

fn default_count() -> i32 {
    1
}

/// A quantity of one item kind.
///
/// `Clone` is the deep copy used by the matcher's scratch state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ResourceLocation,
    #[serde(default = "default_count")]
    pub count: i32,
}

impl ItemStack {
    pub fn new(item: ResourceLocation, count: i32) -> Self {
        Self { item, count }
    }

    /// A single item
    pub fn one(item: ResourceLocation) -> Self {
        Self::new(item, 1)
    }

    /// Stacks with no items left are removed from working sets
    pub fn is_empty(&self) -> bool {
        self.count <= 0
    }

    /// Take `amount` items off the stack, never going below zero
    pub fn shrink(&mut self, amount: i32) {
        self.count = (self.count - amount).max(0);
    }
}

/// Parses `item` or `item*count`, e.g. `minecraft:stick*3`
impl FromStr for ItemStack {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (item, count) = match s.split_once('*') {
            Some((item, count)) => {
                let count = count
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| RecipeError::malformed(s, "count must be an integer"))?;
                (item, count)
            }
            None => (s, 1),
        };

        if count < 0 {
            return Err(RecipeError::malformed(s, "count must not be negative"));
        }

        Ok(Self::new(item.trim().parse()?, count))
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{}", self.item, self.count)
    }
}

/// Total number of items across a set of stacks
pub fn total_count(stacks: &[ItemStack]) -> i64 {
    stacks.iter().map(|s| s.count.max(0) as i64).sum()
}

// ============================================================================
// Crafting Grid
// ============================================================================

/// A width x height crafting inventory.
///
/// Only the generic shapeless recipe matches against it; spirit trades are
/// driven directly with item lists.
#[derive(Debug, Clone)]
pub struct CraftingGrid {
    width: usize,
    height: usize,
    slots: Vec<Option<ItemStack>>,
}

impl CraftingGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            slots: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Put a stack into a slot. Returns false if the slot is out of range.
    pub fn set(&mut self, x: usize, y: usize, stack: ItemStack) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.slots[y * self.width + x] = if stack.is_empty() { None } else { Some(stack) };
        true
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&ItemStack> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.slots[y * self.width + x].as_ref()
    }

    /// All occupied slots in row-major order
    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrink_to_empty() {
        let mut stack: ItemStack = "stick*2".parse().unwrap();
        stack.shrink(1);
        assert_eq!(stack.count, 1);
        assert!(!stack.is_empty());
        stack.shrink(1);
        assert!(stack.is_empty());
        stack.shrink(1);
        assert_eq!(stack.count, 0);
    }

    #[test]
    fn test_parse_stack() {
        let stack: ItemStack = "occultism:otherstone*16".parse().unwrap();
        assert_eq!(stack.item.to_string(), "occultism:otherstone");
        assert_eq!(stack.count, 16);

        let single: ItemStack = "coal".parse().unwrap();
        assert_eq!(single.count, 1);

        assert!("coal*x".parse::<ItemStack>().is_err());
        assert!("coal*-1".parse::<ItemStack>().is_err());
    }

    #[test]
    fn test_result_defaults_count() {
        let stack: ItemStack = serde_json::from_str(r#"{"item": "minecraft:diamond"}"#).unwrap();
        assert_eq!(stack.count, 1);
    }

    #[test]
    fn test_grid_ignores_empty_and_out_of_range() {
        let mut grid = CraftingGrid::new(2, 2);
        assert!(grid.set(0, 0, "stick".parse().unwrap()));
        assert!(grid.set(1, 1, "coal*0".parse().unwrap()));
        assert!(!grid.set(2, 0, "stick".parse().unwrap()));
        assert_eq!(grid.stacks().count(), 1);
        assert!(grid.get(1, 1).is_none());
    }
}
