//! Error types for recipe decoding and loading.

use thiserror::Error;

/// Errors raised while reading, writing or loading recipes.
///
/// Matching itself never fails with an error: an offer that does not
/// satisfy a recipe is reported as `false` / `None`.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Invalid `namespace:path` identifier
    #[error("Invalid resource location '{0}'")]
    InvalidResourceLocation(String),

    /// No codec registered under this type name
    #[error("Unknown recipe type '{0}'")]
    UnknownRecipeType(String),

    /// Document parsed but has the wrong shape
    #[error("Malformed recipe {id}: {reason}")]
    Malformed { id: String, reason: String },

    /// Every ingredient resolved to nothing
    #[error("No ingredients for shapeless recipe {0}")]
    NoIngredients(String),

    /// More ingredients than a crafting grid can hold
    #[error("Too many ingredients for shapeless recipe {id}: {count} > {max}")]
    TooManyIngredients { id: String, count: usize, max: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to decode recipe packet: {0}")]
    Decode(String),

    #[error("Failed to encode recipe packet: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File watcher error: {0}")]
    Watch(String),
}

impl RecipeError {
    pub fn malformed(id: impl ToString, reason: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<rmp_serde::decode::Error> for RecipeError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for RecipeError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

impl From<notify::Error> for RecipeError {
    fn from(e: notify::Error) -> Self {
        Self::Watch(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecipeError>;
