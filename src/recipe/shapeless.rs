//! Shapeless Crafting Recipe
//!
//! Ingredients may sit anywhere in the grid; every occupied slot must be
//! claimed by exactly one ingredient.

use super::codec::ShapelessParts;
use super::{Recipe, RecipeKind};
use crate::ingredient::Ingredient;
use crate::item::{CraftingGrid, ItemStack};
use crate::resource::ResourceLocation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapelessRecipe {
    id: ResourceLocation,
    group: String,
    ingredients: Vec<Ingredient>,
    result: ItemStack,
}

impl ShapelessRecipe {
    pub fn new(
        id: ResourceLocation,
        group: impl Into<String>,
        ingredients: Vec<Ingredient>,
        result: ItemStack,
    ) -> Self {
        Self {
            id,
            group: group.into(),
            ingredients,
            result,
        }
    }

    pub fn from_parts(id: ResourceLocation, parts: ShapelessParts) -> Self {
        Self::new(id, parts.group, parts.ingredients, parts.result)
    }

    /// Split into id and shapeless layout
    pub fn into_parts(self) -> (ResourceLocation, ShapelessParts) {
        (
            self.id,
            ShapelessParts {
                group: self.group,
                ingredients: self.ingredients,
                result: self.result,
            },
        )
    }
}

impl Recipe for ShapelessRecipe {
    fn id(&self) -> &ResourceLocation {
        &self.id
    }

    fn kind(&self) -> RecipeKind {
        RecipeKind::Shapeless
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    fn result(&self) -> &ItemStack {
        &self.result
    }

    fn matches(&self, grid: &CraftingGrid) -> bool {
        let stacks: Vec<&ItemStack> = grid.stacks().collect();
        if stacks.len() != self.ingredients.len() {
            return false;
        }

        // Bipartite assignment of ingredients to occupied slots
        let mut slot_owner: Vec<Option<usize>> = vec![None; stacks.len()];
        for ingredient in 0..self.ingredients.len() {
            let mut seen = vec![false; stacks.len()];
            if !self.assign(ingredient, &stacks, &mut slot_owner, &mut seen) {
                return false;
            }
        }
        true
    }

    fn assemble(&self, grid: &CraftingGrid) -> Option<ItemStack> {
        self.matches(grid).then(|| self.result.clone())
    }
}

impl ShapelessRecipe {
    /// Augmenting path search: give `ingredient` a slot, moving earlier
    /// assignments where needed.
    fn assign(
        &self,
        ingredient: usize,
        stacks: &[&ItemStack],
        slot_owner: &mut [Option<usize>],
        seen: &mut [bool],
    ) -> bool {
        for (slot, stack) in stacks.iter().enumerate() {
            if seen[slot] || !self.ingredients[ingredient].test(stack) {
                continue;
            }
            seen[slot] = true;

            let free = match slot_owner[slot] {
                None => true,
                Some(owner) => self.assign(owner, stacks, slot_owner, seen),
            };
            if free {
                slot_owner[slot] = Some(ingredient);
                return true;
            }
        }
        false
    }
}
