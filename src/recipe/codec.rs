//! Shapeless Recipe Codec
//!
//! Reads shapeless recipes from JSON documents and reads/writes them as
//! MessagePack payloads. Recipe variants built on the shapeless layout
//! delegate to these functions and re-wrap the decoded parts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MAX_INGREDIENTS, Recipe};
use crate::error::{RecipeError, Result};
use crate::ingredient::{Ingredient, RawIngredient};
use crate::item::ItemStack;
use crate::resource::ResourceLocation;
use crate::tags::TagTable;

/// Decoded shapeless layout shared by recipe variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapelessParts {
    pub group: String,
    pub ingredients: Vec<Ingredient>,
    pub result: ItemStack,
}

// ============================================================================
// JSON
// ============================================================================

/// Raw recipe document. `type` is consumed by the registry.
#[derive(Debug, Clone, Deserialize)]
struct RawShapelessRecipe {
    #[serde(default)]
    group: String,
    #[serde(default)]
    ingredients: Vec<RawIngredient>,
    result: Option<ItemStack>,
}

/// Read a shapeless recipe document, resolving tags against `tags`.
///
/// Ingredients that resolve to no items (e.g. an unknown tag) are dropped.
/// An empty alternatives array is an error.
pub fn read_json(
    id: &ResourceLocation,
    json: &serde_json::Value,
    tags: &TagTable,
) -> Result<ShapelessParts> {
    let raw = RawShapelessRecipe::deserialize(json)
        .map_err(|e| RecipeError::malformed(id, e.to_string()))?;

    let mut ingredients = Vec::with_capacity(raw.ingredients.len());
    for raw_ingredient in &raw.ingredients {
        if raw_ingredient.values().is_empty() {
            return Err(RecipeError::malformed(id, "ingredient has no alternatives"));
        }
        let ingredient = Ingredient::resolve(raw_ingredient, tags);
        if ingredient.is_empty() {
            debug!("Dropping ingredient with no items in recipe {}", id);
            continue;
        }
        ingredients.push(ingredient);
    }

    if ingredients.is_empty() {
        return Err(RecipeError::NoIngredients(id.to_string()));
    }
    if ingredients.len() > MAX_INGREDIENTS {
        return Err(RecipeError::TooManyIngredients {
            id: id.to_string(),
            count: ingredients.len(),
            max: MAX_INGREDIENTS,
        });
    }

    let result = raw
        .result
        .ok_or_else(|| RecipeError::malformed(id, "missing result"))?;
    if result.count < 1 {
        return Err(RecipeError::malformed(id, "result count must be at least 1"));
    }

    Ok(ShapelessParts {
        group: raw.group,
        ingredients,
        result,
    })
}

// ============================================================================
// MessagePack
// ============================================================================

#[derive(Serialize)]
struct WireRef<'a> {
    group: &'a str,
    ingredients: &'a [Ingredient],
    result: &'a ItemStack,
}

#[derive(Deserialize)]
struct Wire {
    group: String,
    ingredients: Vec<Ingredient>,
    result: ItemStack,
}

/// Encode any shapeless-layout recipe. Ingredients are written as their
/// resolved item ids, so decoding needs no tag table.
pub fn write_bytes(recipe: &dyn Recipe) -> Result<Vec<u8>> {
    let wire = WireRef {
        group: recipe.group(),
        ingredients: recipe.ingredients(),
        result: recipe.result(),
    };
    Ok(rmp_serde::to_vec(&wire)?)
}

pub fn read_bytes(bytes: &[u8]) -> Result<ShapelessParts> {
    let wire: Wire = rmp_serde::from_slice(bytes)?;
    Ok(ShapelessParts {
        group: wire.group,
        ingredients: wire.ingredients,
        result: wire.result,
    })
}
