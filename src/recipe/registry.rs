//! Recipe Serializer Registry
//!
//! Maps recipe type names (the `type` field of a recipe document) to the
//! codec for that kind, and frames binary recipe packets.

use std::collections::HashMap;

use rmpv::Value;
use tracing::{debug, warn};

use super::codec;
use super::{Recipe, RecipeKind, ShapelessRecipe, SpiritTrade};
use crate::error::{RecipeError, Result};
use crate::resource::{DEFAULT_NAMESPACE, ResourceLocation};
use crate::tags::TagTable;

/// A decoded recipe of any registered kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyRecipe {
    Shapeless(ShapelessRecipe),
    SpiritTrade(SpiritTrade),
}

impl AnyRecipe {
    pub fn as_recipe(&self) -> &dyn Recipe {
        match self {
            AnyRecipe::Shapeless(recipe) => recipe,
            AnyRecipe::SpiritTrade(recipe) => recipe,
        }
    }

    pub fn as_spirit_trade(&self) -> Option<&SpiritTrade> {
        match self {
            AnyRecipe::SpiritTrade(trade) => Some(trade),
            _ => None,
        }
    }

    pub fn id(&self) -> &ResourceLocation {
        self.as_recipe().id()
    }

    pub fn kind(&self) -> RecipeKind {
        self.as_recipe().kind()
    }
}

/// Constructor/codec functions for one recipe kind
#[derive(Clone, Copy)]
pub struct RecipeCodec {
    pub kind: RecipeKind,
    pub read_json: fn(ResourceLocation, &serde_json::Value, &TagTable) -> Result<AnyRecipe>,
    pub read_bytes: fn(ResourceLocation, &[u8]) -> Result<AnyRecipe>,
    pub write_bytes: fn(&dyn Recipe) -> Result<Vec<u8>>,
}

impl RecipeCodec {
    pub fn shapeless() -> Self {
        Self {
            kind: RecipeKind::Shapeless,
            read_json: |id, json, tags| {
                let parts = codec::read_json(&id, json, tags)?;
                Ok(AnyRecipe::Shapeless(ShapelessRecipe::from_parts(id, parts)))
            },
            read_bytes: |id, bytes| {
                let parts = codec::read_bytes(bytes)?;
                Ok(AnyRecipe::Shapeless(ShapelessRecipe::from_parts(id, parts)))
            },
            write_bytes: codec::write_bytes,
        }
    }

    pub fn spirit_trade() -> Self {
        Self {
            kind: RecipeKind::SpiritTrade,
            read_json: |id, json, tags| {
                SpiritTrade::read_json(id, json, tags).map(AnyRecipe::SpiritTrade)
            },
            read_bytes: |id, bytes| SpiritTrade::read_bytes(id, bytes).map(AnyRecipe::SpiritTrade),
            write_bytes: codec::write_bytes,
        }
    }
}

/// Registry for all recipe serializers
pub struct SerializerRegistry {
    codecs: HashMap<ResourceLocation, RecipeCodec>,
    names: HashMap<RecipeKind, ResourceLocation>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
            names: HashMap::new(),
        }
    }

    /// Registry with the shapeless base and `<namespace>:spirit_trade`
    pub fn with_defaults(namespace: &str) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(
            ResourceLocation::new(DEFAULT_NAMESPACE, RecipeKind::Shapeless.as_str())?,
            RecipeCodec::shapeless(),
        );
        registry.register(
            ResourceLocation::new(namespace, RecipeKind::SpiritTrade.as_str())?,
            RecipeCodec::spirit_trade(),
        );
        Ok(registry)
    }

    /// Register a codec under a type name, replacing any previous one
    pub fn register(&mut self, name: ResourceLocation, codec: RecipeCodec) {
        if self.codecs.contains_key(&name) {
            warn!("Duplicate recipe serializer '{}', overwriting", name);
        }
        debug!("Registered recipe serializer {}", name);
        self.names.insert(codec.kind, name.clone());
        self.codecs.insert(name, codec);
    }

    pub fn get(&self, name: &ResourceLocation) -> Option<&RecipeCodec> {
        self.codecs.get(name)
    }

    /// Type name a recipe kind is registered under
    pub fn name_of(&self, kind: RecipeKind) -> Option<&ResourceLocation> {
        self.names.get(&kind)
    }

    pub fn contains(&self, name: &ResourceLocation) -> bool {
        self.codecs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    fn codec_for(&self, name: &str) -> Result<&RecipeCodec> {
        let key: ResourceLocation = name
            .parse()
            .map_err(|_| RecipeError::UnknownRecipeType(name.to_string()))?;
        self.codecs
            .get(&key)
            .ok_or_else(|| RecipeError::UnknownRecipeType(name.to_string()))
    }

    /// Read a recipe document, dispatching on its `type` field
    pub fn read_json(
        &self,
        id: ResourceLocation,
        json: &serde_json::Value,
        tags: &TagTable,
    ) -> Result<AnyRecipe> {
        let type_name = json
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| RecipeError::malformed(&id, "missing recipe type"))?;

        let codec = self.codec_for(type_name)?;
        (codec.read_json)(id, json, tags)
    }

    /// Encode a recipe packet
    /// Format: [type, id, payload]
    pub fn encode(&self, recipe: &AnyRecipe) -> Result<Vec<u8>> {
        let kind = recipe.kind();
        let name = self
            .name_of(kind)
            .ok_or_else(|| RecipeError::UnknownRecipeType(kind.as_str().to_string()))?;
        let codec = self.codec_for(&name.to_string())?;
        let payload = (codec.write_bytes)(recipe.as_recipe())?;

        let packet = Value::Array(vec![
            Value::String(name.to_string().into()),
            Value::String(recipe.id().to_string().into()),
            Value::Binary(payload),
        ]);

        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &packet)
            .map_err(|e| RecipeError::Encode(e.to_string()))?;
        Ok(buf)
    }

    /// Decode a recipe packet written by [`encode`](Self::encode)
    pub fn decode(&self, data: &[u8]) -> Result<AnyRecipe> {
        let mut cursor = std::io::Cursor::new(data);
        let value = rmpv::decode::read_value(&mut cursor)
            .map_err(|e| RecipeError::Decode(e.to_string()))?;

        let array = value
            .as_array()
            .ok_or_else(|| RecipeError::Decode("expected array".to_string()))?;

        let [type_name, id, payload] = array.as_slice() else {
            return Err(RecipeError::Decode(format!(
                "expected 3 elements, got {}",
                array.len()
            )));
        };

        let type_name = type_name
            .as_str()
            .ok_or_else(|| RecipeError::Decode("recipe type must be a string".to_string()))?;
        let id: ResourceLocation = id
            .as_str()
            .ok_or_else(|| RecipeError::Decode("recipe id must be a string".to_string()))?
            .parse()?;
        let payload = payload
            .as_slice()
            .ok_or_else(|| RecipeError::Decode("payload must be binary".to_string()))?;

        let codec = self.codec_for(type_name)?;
        (codec.read_bytes)(id, payload)
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loc(s: &str) -> ResourceLocation {
        s.parse().unwrap()
    }

    fn trade_doc() -> serde_json::Value {
        json!({
            "type": "occultism:spirit_trade",
            "ingredients": [{"item": "minecraft:stick"}, {"item": "minecraft:stick"}],
            "result": {"item": "occultism:otherstone", "count": 2}
        })
    }

    #[test]
    fn test_defaults_registered() {
        let registry = SerializerRegistry::with_defaults("occultism").unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&loc("occultism:spirit_trade")));
        assert!(registry.contains(&loc("minecraft:crafting_shapeless")));
        assert_eq!(
            registry.name_of(RecipeKind::SpiritTrade),
            Some(&loc("occultism:spirit_trade"))
        );
    }

    #[test]
    fn test_dispatch_on_type() {
        let registry = SerializerRegistry::with_defaults("occultism").unwrap();
        let tags = TagTable::new();

        let trade = registry.read_json(loc("occultism:a"), &trade_doc(), &tags).unwrap();
        assert_eq!(trade.kind(), RecipeKind::SpiritTrade);
        assert!(trade.as_spirit_trade().is_some());

        let mut doc = trade_doc();
        doc["type"] = json!("crafting_shapeless");
        let shapeless = registry.read_json(loc("occultism:b"), &doc, &tags).unwrap();
        assert_eq!(shapeless.kind(), RecipeKind::Shapeless);
        assert!(shapeless.as_spirit_trade().is_none());
    }

    #[test]
    fn test_unknown_or_missing_type() {
        let registry = SerializerRegistry::with_defaults("occultism").unwrap();
        let tags = TagTable::new();

        let mut doc = trade_doc();
        doc["type"] = json!("othermod:spirit_trade");
        assert!(matches!(
            registry.read_json(loc("a:b"), &doc, &tags),
            Err(RecipeError::UnknownRecipeType(_))
        ));

        doc.as_object_mut().unwrap().remove("type");
        assert!(matches!(
            registry.read_json(loc("a:b"), &doc, &tags),
            Err(RecipeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_namespace_follows_registration() {
        let registry = SerializerRegistry::with_defaults("mymod").unwrap();
        let tags = TagTable::new();
        assert!(registry.read_json(loc("a:b"), &trade_doc(), &tags).is_err());

        let mut doc = trade_doc();
        doc["type"] = json!("mymod:spirit_trade");
        assert!(registry.read_json(loc("a:b"), &doc, &tags).is_ok());
    }

    #[test]
    fn test_packet_envelope() {
        let registry = SerializerRegistry::with_defaults("occultism").unwrap();
        let recipe = registry
            .read_json(loc("occultism:trade/otherstone"), &trade_doc(), &TagTable::new())
            .unwrap();

        let packet = registry.encode(&recipe).unwrap();

        let value = rmpv::decode::read_value(&mut std::io::Cursor::new(&packet)).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array[0].as_str(), Some("occultism:spirit_trade"));
        assert_eq!(array[1].as_str(), Some("occultism:trade/otherstone"));

        assert_eq!(registry.decode(&packet).unwrap(), recipe);
    }

    #[test]
    fn test_decode_rejects_bad_packets() {
        let registry = SerializerRegistry::with_defaults("occultism").unwrap();

        let mut short = Vec::new();
        rmpv::encode::write_value(&mut short, &Value::Array(vec![Value::from("x")])).unwrap();
        assert!(matches!(registry.decode(&short), Err(RecipeError::Decode(_))));

        let mut unknown = Vec::new();
        let packet = Value::Array(vec![
            Value::from("othermod:thing"),
            Value::from("a:b"),
            Value::Binary(vec![]),
        ]);
        rmpv::encode::write_value(&mut unknown, &packet).unwrap();
        assert!(matches!(
            registry.decode(&unknown),
            Err(RecipeError::UnknownRecipeType(_))
        ));
    }
}
