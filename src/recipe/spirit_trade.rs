//! Spirit Trade Recipe
//!
//! A shapeless recipe that is never crafted in a grid. A trader spirit
//! holds a pile of items and checks it against each trade: every ingredient
//! claims one unit from the first stack it accepts, in recipe order.
//!
//! Both operations work on a copy of the offered stacks. A `SpiritTrade`
//! holds no mutable state, so it can be shared freely between threads as
//! long as each call gets its own input.

use serde_json::Value;

use super::codec::{self, ShapelessParts};
use super::{Recipe, RecipeKind};
use crate::error::Result;
use crate::ingredient::Ingredient;
use crate::item::{CraftingGrid, ItemStack};
use crate::resource::ResourceLocation;
use crate::tags::TagTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiritTrade {
    id: ResourceLocation,
    result: ItemStack,
    ingredients: Vec<Ingredient>,
}

/// What a completed trade hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOutcome {
    pub result: ItemStack,
    /// Offered items left over after the trade
    pub remainder: Vec<ItemStack>,
}

impl SpiritTrade {
    pub fn new(id: ResourceLocation, result: ItemStack, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id,
            result,
            ingredients,
        }
    }

    /// Re-wrap a decoded shapeless layout. Groups do not apply to trades.
    pub fn from_parts(id: ResourceLocation, parts: ShapelessParts) -> Self {
        Self::new(id, parts.result, parts.ingredients)
    }

    /// Can every ingredient claim its own unit from `input`?
    ///
    /// An empty ingredient list accepts any input.
    pub fn is_valid(&self, input: &[ItemStack]) -> bool {
        let mut working = input.to_vec();
        self.ingredients
            .iter()
            .all(|ingredient| take_one(&mut working, ingredient))
    }

    /// Take one unit per ingredient from `input` and return what is left.
    ///
    /// Call [`is_valid`](Self::is_valid) first. An ingredient that finds no
    /// match is skipped, so an unchecked call returns a partial consumption
    /// rather than failing.
    pub fn consume(&self, input: &[ItemStack]) -> Vec<ItemStack> {
        let mut working = input.to_vec();
        for ingredient in &self.ingredients {
            take_one(&mut working, ingredient);
        }
        working
    }

    /// Validate and consume in one step
    pub fn trade(&self, input: &[ItemStack]) -> Option<TradeOutcome> {
        if !self.is_valid(input) {
            return None;
        }
        Some(TradeOutcome {
            result: self.result.clone(),
            remainder: self.consume(input),
        })
    }

    // ------------------------------------------------------------------------
    // Serializer: delegates to the shapeless codec
    // ------------------------------------------------------------------------

    pub fn read_json(id: ResourceLocation, json: &Value, tags: &TagTable) -> Result<Self> {
        let parts = codec::read_json(&id, json, tags)?;
        Ok(Self::from_parts(id, parts))
    }

    pub fn read_bytes(id: ResourceLocation, bytes: &[u8]) -> Result<Self> {
        let parts = codec::read_bytes(bytes)?;
        Ok(Self::from_parts(id, parts))
    }

    pub fn write_bytes(&self) -> Result<Vec<u8>> {
        codec::write_bytes(self)
    }
}

/// Claim one unit from the first accepting stack, dropping it once empty
fn take_one(working: &mut Vec<ItemStack>, ingredient: &Ingredient) -> bool {
    let Some(index) = working.iter().position(|stack| ingredient.test(stack)) else {
        return false;
    };

    working[index].shrink(1);
    if working[index].is_empty() {
        working.remove(index);
    }
    true
}

impl Recipe for SpiritTrade {
    fn id(&self) -> &ResourceLocation {
        &self.id
    }

    fn kind(&self) -> RecipeKind {
        RecipeKind::SpiritTrade
    }

    fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    fn result(&self) -> &ItemStack {
        &self.result
    }

    /// Trades are driven through `is_valid`/`consume`, never a grid
    fn matches(&self, _grid: &CraftingGrid) -> bool {
        false
    }

    fn assemble(&self, _grid: &CraftingGrid) -> Option<ItemStack> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::total_count;
    use proptest::prelude::*;
    use serde_json::json;

    fn loc(s: &str) -> ResourceLocation {
        s.parse().unwrap()
    }

    fn stack(s: &str) -> ItemStack {
        s.parse().unwrap()
    }

    fn stacks(items: &[&str]) -> Vec<ItemStack> {
        items.iter().map(|s| stack(s)).collect()
    }

    fn trade_of(ingredients: &[&str]) -> SpiritTrade {
        SpiritTrade::new(
            loc("occultism:test_trade"),
            stack("occultism:spirit_attuned_gem"),
            ingredients.iter().map(|i| Ingredient::of_item(loc(i))).collect(),
        )
    }

    #[test]
    fn test_two_ingredients_from_one_stack() {
        let trade = trade_of(&["stick", "stick"]);
        let input = stacks(&["stick*2"]);

        assert!(trade.is_valid(&input));
        assert!(trade.consume(&input).is_empty());
    }

    #[test]
    fn test_missing_ingredient_is_invalid() {
        let trade = trade_of(&["stick", "coal"]);
        assert!(!trade.is_valid(&stacks(&["stick"])));
    }

    #[test]
    fn test_unit_not_used_twice() {
        let trade = trade_of(&["stick", "stick"]);
        assert!(!trade.is_valid(&stacks(&["stick"])));
        assert!(trade.is_valid(&stacks(&["stick", "stick"])));
    }

    #[test]
    fn test_empty_ingredients_accept_anything() {
        let trade = trade_of(&[]);
        assert!(trade.is_valid(&[]));

        let input = stacks(&["coal*3", "stick*0", "diamond"]);
        assert!(trade.is_valid(&input));
        assert_eq!(trade.consume(&input), input);
    }

    #[test]
    fn test_consumes_from_first_matching_stack() {
        let trade = trade_of(&["stick"]);
        let input = stacks(&["stick", "stick"]);
        assert_eq!(trade.consume(&input), stacks(&["stick"]));

        let mixed = stacks(&["coal*2", "stick*3", "stick*5"]);
        assert_eq!(trade.consume(&mixed), stacks(&["coal*2", "stick*2", "stick*5"]));
    }

    #[test]
    fn test_zero_count_entries_are_skipped() {
        let trade = trade_of(&["stick"]);
        let input = stacks(&["stick*0", "stick*1"]);

        assert!(trade.is_valid(&input));
        assert_eq!(trade.consume(&input), stacks(&["stick*0"]));
        assert!(!trade.is_valid(&stacks(&["stick*0"])));
    }

    #[test]
    fn test_unchecked_consume_skips_missing() {
        let trade = trade_of(&["coal", "stick", "diamond"]);
        let input = stacks(&["stick*2"]);

        assert!(!trade.is_valid(&input));
        assert_eq!(trade.consume(&input), stacks(&["stick"]));
    }

    #[test]
    fn test_tag_ingredient_takes_first_accepted_kind() {
        let trade = SpiritTrade::new(
            loc("occultism:fuel_trade"),
            stack("occultism:otherstone"),
            vec![Ingredient::of_items([loc("coal"), loc("charcoal")])],
        );
        let input = stacks(&["diamond", "charcoal", "coal"]);
        assert_eq!(trade.consume(&input), stacks(&["diamond", "coal"]));
    }

    #[test]
    fn test_trade_returns_result_and_remainder() {
        let trade = trade_of(&["stick", "coal"]);

        let outcome = trade.trade(&stacks(&["coal*2", "stick"])).unwrap();
        assert_eq!(outcome.result, stack("occultism:spirit_attuned_gem"));
        assert_eq!(outcome.remainder, stacks(&["coal"]));

        assert!(trade.trade(&stacks(&["coal*2"])).is_none());
    }

    #[test]
    fn test_grid_interface_is_inert() {
        let trade = trade_of(&["stick"]);
        let mut grid = CraftingGrid::new(3, 3);
        grid.set(0, 0, stack("stick"));

        assert!(!trade.matches(&grid));
        assert!(trade.assemble(&grid).is_none());
        assert_eq!(trade.kind(), RecipeKind::SpiritTrade);
        assert_eq!(trade.group(), "");
    }

    #[test]
    fn test_serializer_delegates_to_shapeless_codec() {
        let doc = json!({
            "type": "occultism:spirit_trade",
            "group": "ignored",
            "ingredients": [{"item": "minecraft:stick"}, {"item": "minecraft:coal"}],
            "result": {"item": "occultism:otherstone", "count": 8}
        });
        let trade =
            SpiritTrade::read_json(loc("occultism:spirit_trade/otherstone"), &doc, &TagTable::new())
                .unwrap();
        assert_eq!(trade.ingredients().len(), 2);
        assert_eq!(trade.result().count, 8);
        assert_eq!(trade.group(), "");

        let bytes = trade.write_bytes().unwrap();
        let decoded = SpiritTrade::read_bytes(trade.id().clone(), &bytes).unwrap();
        assert_eq!(decoded, trade);
    }

    const KINDS: [&str; 4] = ["stick", "coal", "diamond", "bone"];

    fn kind() -> impl Strategy<Value = &'static str> {
        prop::sample::select(KINDS.to_vec())
    }

    fn offer() -> impl Strategy<Value = Vec<ItemStack>> {
        prop::collection::vec(
            (kind(), 0..4i32).prop_map(|(kind, count)| ItemStack::new(loc(kind), count)),
            0..6,
        )
    }

    fn any_trade() -> impl Strategy<Value = SpiritTrade> {
        prop::collection::vec(kind(), 0..5).prop_map(|names| trade_of(&names))
    }

    proptest! {
        #[test]
        fn test_random_offers_keep_invariants(trade in any_trade(), input in offer()) {
            let snapshot = input.clone();

            let valid = trade.is_valid(&input);
            prop_assert_eq!(valid, trade.is_valid(&input));
            prop_assert_eq!(&input, &snapshot);

            let remainder = trade.consume(&input);
            prop_assert_eq!(&input, &snapshot);
            prop_assert!(remainder.iter().all(|s| s.count >= 0));

            if valid {
                prop_assert_eq!(
                    total_count(&remainder),
                    total_count(&input) - trade.ingredients().len() as i64
                );
                // Only stacks that were already empty may stay empty
                let empty_before = input.iter().filter(|s| s.is_empty()).count();
                let empty_after = remainder.iter().filter(|s| s.is_empty()).count();
                prop_assert_eq!(empty_before, empty_after);
            }
        }

        #[test]
        fn test_enough_units_is_always_valid(trade in any_trade(), position in any::<prop::sample::Index>()) {
            // One stack per ingredient, shuffled behind noise
            let mut input: Vec<ItemStack> = trade
                .ingredients()
                .iter()
                .map(|i| ItemStack::one(i.items().next().unwrap().clone()))
                .collect();
            input.push(stack("minecraft:dirt*3"));
            let len = input.len();
            input.swap(0, position.index(len));

            prop_assert!(trade.is_valid(&input));
        }
    }
}
