//! Item Tags
//!
//! Loads named item groups from TOML files. Each file is a table of
//! `tag = [members]`; a member starting with `#` includes another tag.
//!
//! ```toml
//! "forge:rods/wooden" = ["minecraft:stick"]
//! "occultism:fuel" = ["minecraft:coal", "#minecraft:logs"]
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{RecipeError, Result};
use crate::resource::ResourceLocation;

#[derive(Debug, Clone, Default)]
pub struct TagTable {
    /// Raw members, nested tag references kept as `#id`
    tags: HashMap<ResourceLocation, Vec<String>>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all tag files from `<data_dir>/tags`.
    ///
    /// Files that fail to parse are logged and skipped.
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<()> {
        let tags_dir = data_dir.join("tags");

        if !tags_dir.exists() {
            warn!("Tags directory does not exist: {:?}", tags_dir);
            return Ok(());
        }

        for entry in std::fs::read_dir(&tags_dir)? {
            let path = entry?.path();

            if path.extension().is_some_and(|ext| ext == "toml") {
                match self.load_file(&path) {
                    Ok(()) => debug!("Loaded tag file {:?}", path),
                    Err(e) => warn!("Skipping tag file {:?}: {}", path, e),
                }
            }
        }

        info!("Loaded {} item tags", self.tags.len());
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.insert_toml(&content)
    }

    /// Merge a TOML table of tags. Members of an existing tag are appended.
    ///
    /// Nothing is merged unless every tag and member in the table is valid.
    pub fn insert_toml(&mut self, content: &str) -> Result<()> {
        let table: HashMap<String, Vec<String>> = toml::from_str(content)?;

        let mut parsed = Vec::with_capacity(table.len());
        for (tag, members) in table {
            let tag: ResourceLocation = tag.parse()?;
            for member in &members {
                validate_member(member)?;
            }
            parsed.push((tag, members));
        }

        for (tag, members) in parsed {
            self.tags.entry(tag).or_default().extend(members);
        }
        Ok(())
    }

    /// Add a single item to a tag
    pub fn insert(&mut self, tag: ResourceLocation, item: ResourceLocation) {
        self.tags.entry(tag).or_default().push(item.to_string());
    }

    pub fn contains(&self, tag: &ResourceLocation) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Every item in a tag, following nested tags. Unknown tags are empty.
    pub fn resolve(&self, tag: &ResourceLocation) -> BTreeSet<ResourceLocation> {
        let mut items = BTreeSet::new();
        let mut visited = HashSet::new();
        self.collect(tag, &mut items, &mut visited);
        items
    }

    fn collect(
        &self,
        tag: &ResourceLocation,
        items: &mut BTreeSet<ResourceLocation>,
        visited: &mut HashSet<ResourceLocation>,
    ) {
        if !visited.insert(tag.clone()) {
            return;
        }

        let Some(members) = self.tags.get(tag) else {
            return;
        };

        for member in members {
            // validated on insert
            match member.strip_prefix('#') {
                Some(nested) => {
                    if let Ok(nested) = nested.parse() {
                        self.collect(&nested, items, visited);
                    }
                }
                None => {
                    if let Ok(item) = member.parse() {
                        items.insert(item);
                    }
                }
            }
        }
    }
}

fn validate_member(member: &str) -> Result<()> {
    let id = member.strip_prefix('#').unwrap_or(member);
    id.parse::<ResourceLocation>()
        .map(|_| ())
        .map_err(|_| RecipeError::InvalidResourceLocation(member.to_string()))
}
