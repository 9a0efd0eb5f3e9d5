//! Recipe Book
//!
//! Loads item tags and recipe documents from a data directory:
//!
//! ```text
//! data/
//!   tags/*.toml
//!   recipes/**/*.json
//! ```
//!
//! A recipe's id is `<namespace>:<path under recipes/ without extension>`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{RecipeError, Result};
use crate::item::ItemStack;
use crate::recipe::{AnyRecipe, Recipe, SerializerRegistry, SpiritTrade, TradeOutcome};
use crate::resource::ResourceLocation;
use crate::tags::TagTable;

pub struct RecipeBook {
    recipes: HashMap<ResourceLocation, AnyRecipe>,
    tags: TagTable,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self {
            recipes: HashMap::new(),
            tags: TagTable::new(),
        }
    }

    /// Build a book from `data_dir`, naming recipes under `namespace`
    pub fn load(data_dir: &Path, namespace: &str, registry: &SerializerRegistry) -> Result<Self> {
        let mut book = Self::new();
        book.tags.load_from_directory(data_dir)?;
        book.load_from_directory(data_dir, namespace, registry)?;
        Ok(book)
    }

    /// Load all recipe documents from `<data_dir>/recipes`.
    ///
    /// Files that fail to parse are logged and skipped.
    pub fn load_from_directory(
        &mut self,
        data_dir: &Path,
        namespace: &str,
        registry: &SerializerRegistry,
    ) -> Result<()> {
        let recipes_dir = data_dir.join("recipes");

        if !recipes_dir.exists() {
            warn!("Recipes directory does not exist: {:?}", recipes_dir);
            return Ok(());
        }

        let mut paths = Vec::new();
        collect_json_files(&recipes_dir, &mut paths)?;
        paths.sort();

        for path in paths {
            match self.load_file(&recipes_dir, &path, namespace, registry) {
                Ok(id) => info!("Loaded recipe: {}", id),
                Err(e) => warn!("Skipping recipe {:?}: {}", path, e),
            }
        }

        info!("Loaded {} recipe definitions", self.recipes.len());
        Ok(())
    }

    fn load_file(
        &mut self,
        recipes_dir: &Path,
        path: &Path,
        namespace: &str,
        registry: &SerializerRegistry,
    ) -> Result<ResourceLocation> {
        let id = recipe_id(recipes_dir, path, namespace)?;
        let content = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;
        let recipe = registry.read_json(id.clone(), &json, &self.tags)?;

        if self.recipes.contains_key(&id) {
            warn!("Duplicate recipe ID '{}' in {:?}, overwriting", id, path);
        }
        self.recipes.insert(id.clone(), recipe);
        Ok(id)
    }

    /// Add a recipe directly
    pub fn insert(&mut self, recipe: AnyRecipe) {
        self.recipes.insert(recipe.id().clone(), recipe);
    }

    pub fn get(&self, id: &ResourceLocation) -> Option<&AnyRecipe> {
        self.recipes.get(id)
    }

    /// All recipe ids, sorted
    pub fn ids(&self) -> Vec<&ResourceLocation> {
        let mut ids: Vec<_> = self.recipes.keys().collect();
        ids.sort();
        ids
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// All spirit trades, sorted by id
    pub fn spirit_trades(&self) -> Vec<&SpiritTrade> {
        let mut trades: Vec<&SpiritTrade> = self
            .recipes
            .values()
            .filter_map(AnyRecipe::as_spirit_trade)
            .collect();
        trades.sort_by(|a, b| a.id().cmp(b.id()));
        trades
    }

    /// First spirit trade (by id) that the offered items satisfy
    pub fn find_trade(&self, offer: &[ItemStack]) -> Option<&SpiritTrade> {
        self.spirit_trades()
            .into_iter()
            .find(|trade| trade.is_valid(offer))
    }

    /// Run the first matching trade against the offer
    pub fn trade(&self, offer: &[ItemStack]) -> Option<(&SpiritTrade, TradeOutcome)> {
        let trade = self.find_trade(offer)?;
        Some((trade, trade.trade(offer)?))
    }
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_json_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    Ok(())
}

fn recipe_id(recipes_dir: &Path, path: &Path, namespace: &str) -> Result<ResourceLocation> {
    let relative = path
        .strip_prefix(recipes_dir)
        .map_err(|_| RecipeError::InvalidResourceLocation(path.display().to_string()))?
        .with_extension("");

    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    ResourceLocation::new(namespace, &segments.join("/"))
}
