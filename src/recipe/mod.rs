//! Recipes
//!
//! The generic shapeless recipe, the spirit trade variant built on it, their
//! shared codec and the registry that dispatches between recipe types.

pub mod codec;
pub mod registry;
pub mod shapeless;
pub mod spirit_trade;

pub use registry::{AnyRecipe, RecipeCodec, SerializerRegistry};
pub use shapeless::ShapelessRecipe;
pub use spirit_trade::{SpiritTrade, TradeOutcome};

use crate::ingredient::Ingredient;
use crate::item::{CraftingGrid, ItemStack};
use crate::resource::ResourceLocation;

/// Most ingredients a shapeless recipe may list (a full 3x3 grid)
pub const MAX_INGREDIENTS: usize = 9;

/// Recipe kinds known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeKind {
    Shapeless,
    SpiritTrade,
}

impl RecipeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeKind::Shapeless => "crafting_shapeless",
            RecipeKind::SpiritTrade => "spirit_trade",
        }
    }
}

/// Interface shared by every recipe kind
pub trait Recipe {
    fn id(&self) -> &ResourceLocation;

    fn kind(&self) -> RecipeKind;

    /// Recipe book group; empty when ungrouped
    fn group(&self) -> &str {
        ""
    }

    fn ingredients(&self) -> &[Ingredient];

    /// The stack produced, without any grid context
    fn result(&self) -> &ItemStack;

    /// Does a crafting grid satisfy this recipe?
    fn matches(&self, grid: &CraftingGrid) -> bool;

    /// Output for a matching crafting grid
    fn assemble(&self, grid: &CraftingGrid) -> Option<ItemStack>;
}
