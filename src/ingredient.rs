//! Recipe Ingredients
//!
//! An ingredient is a predicate over item stacks. Recipe documents name
//! items or tags; those are resolved once, against a [`TagTable`], into the
//! set of item ids the ingredient accepts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::item::ItemStack;
use crate::resource::ResourceLocation;
use crate::tags::TagTable;

// ============================================================================
// Raw JSON Structures
// ============================================================================

/// One accepted alternative as written in a recipe document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawIngredientValue {
    Item { item: ResourceLocation },
    Tag { tag: ResourceLocation },
}

/// `{"item": ..}`, `{"tag": ..}` or an array of those
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawIngredient {
    Single(RawIngredientValue),
    AnyOf(Vec<RawIngredientValue>),
}

impl RawIngredient {
    pub fn values(&self) -> &[RawIngredientValue] {
        match self {
            RawIngredient::Single(value) => std::slice::from_ref(value),
            RawIngredient::AnyOf(values) => values,
        }
    }
}

// ============================================================================
// Resolved Ingredient
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ingredient {
    items: BTreeSet<ResourceLocation>,
}

impl Ingredient {
    /// Accepts any of the given items
    pub fn of_items(items: impl IntoIterator<Item = ResourceLocation>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Accepts exactly one item kind
    pub fn of_item(item: ResourceLocation) -> Self {
        Self::of_items([item])
    }

    /// Expand item and tag alternatives into the accepted item set
    pub fn resolve(raw: &RawIngredient, tags: &TagTable) -> Self {
        let mut items = BTreeSet::new();
        for value in raw.values() {
            match value {
                RawIngredientValue::Item { item } => {
                    items.insert(item.clone());
                }
                RawIngredientValue::Tag { tag } => items.extend(tags.resolve(tag)),
            }
        }
        Self { items }
    }

    /// Does this stack satisfy the ingredient? Empty stacks never do.
    pub fn test(&self, stack: &ItemStack) -> bool {
        !stack.is_empty() && self.items.contains(&stack.item)
    }

    /// True when nothing can satisfy this ingredient
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &ResourceLocation> {
        self.items.iter()
    }
}
