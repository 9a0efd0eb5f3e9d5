//! Spirit trade recipes.
//!
//! A spirit trade is a shapeless recipe matched against a loose pile of
//! items instead of a crafting grid. [`SpiritTrade::is_valid`] checks an
//! offer, [`SpiritTrade::consume`] returns what is left of it.

pub mod book;
pub mod config;
pub mod error;
pub mod ingredient;
pub mod item;
pub mod recipe;
pub mod resource;
pub mod tags;
pub mod watch;

pub use book::RecipeBook;
pub use config::Config;
pub use error::{RecipeError, Result};
pub use ingredient::Ingredient;
pub use item::{CraftingGrid, ItemStack};
pub use recipe::{
    AnyRecipe, Recipe, RecipeKind, SerializerRegistry, ShapelessRecipe, SpiritTrade, TradeOutcome,
};
pub use resource::ResourceLocation;
pub use tags::TagTable;
pub use watch::{ReloadEvent, SharedRecipeBook};
