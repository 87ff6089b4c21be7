//! Chunk template registry.
//!
//! Every entity the world places is built from a named template that fixes its
//! footprint size and tags. The streaming, mining and lava code look templates
//! up by name; a template that is missing at startup is a fatal configuration
//! error.
//!
//! # Layout
//! The registry can be persisted to disk as JSON for inspection.

use burrow_common::Tag;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Names of the templates the game requires.
pub mod names {
    pub const ROCK: &str = "rock";
    pub const FUEL: &str = "fuel";
    pub const SMALL_FUEL: &str = "small_fuel";
    pub const DUNGEON: &str = "dungeon";
    pub const LAVA: &str = "lava";
    pub const TILE: &str = "tile";
    pub const PICKUP: &str = "pickup";

    /// Every template a session needs before it can start.
    pub const REQUIRED: [&str; 7] = [ROCK, FUEL, SMALL_FUEL, DUNGEON, LAVA, TILE, PICKUP];

    /// Templates placed as whole grid cells; they must share the cell size.
    pub const CELL_SIZED: [&str; 5] = [ROCK, FUEL, SMALL_FUEL, DUNGEON, LAVA];
}

/// A placeable entity template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    /// Edge length of the square footprint in world units.
    pub size: f32,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
}

impl Template {
    pub fn new(name: impl Into<String>, size: f32, tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            name: name.into(),
            size,
            tags: tags.into_iter().collect(),
        }
    }
}

/// Errors from template operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template not found: {0}")]
    MissingTemplate(String),
    #[error("template {name} has non-positive size {size}")]
    InvalidSize { name: String, size: f32 },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Name-indexed template registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateStore {
    templates: BTreeMap<String, Template>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock set of templates: cell-sized chunks of edge 10, unit tiles and pickups.
    pub fn stock() -> Self {
        let mut store = Self::new();
        for template in stock_templates() {
            store.register(template);
        }
        store
    }

    /// Register a template, replacing any previous template of the same name.
    pub fn register(&mut self, template: Template) {
        tracing::debug!(name = %template.name, size = template.size, "template registered");
        self.templates.insert(template.name.clone(), template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Look a template up, failing if it was never registered.
    pub fn require(&self, name: &str) -> Result<&Template, AssetError> {
        self.templates
            .get(name)
            .ok_or_else(|| AssetError::MissingTemplate(name.to_string()))
    }

    /// Check that every name in `names` is registered with a positive size.
    pub fn require_all(&self, names: &[&str]) -> Result<(), AssetError> {
        for name in names {
            let template = self.require(name)?;
            if template.size.is_nan() || template.size <= 0.0 {
                return Err(AssetError::InvalidSize {
                    name: template.name.clone(),
                    size: template.size,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Save the registry to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a registry from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let store: Self = serde_json::from_reader(file)?;
        Ok(store)
    }
}

impl FromIterator<Template> for TemplateStore {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        let mut store = Self::new();
        for template in iter {
            store.register(template);
        }
        store
    }
}

/// Templates used when a configuration does not list its own.
pub fn stock_templates() -> Vec<Template> {
    vec![
        Template::new(names::ROCK, 10.0, [Tag::Breakable]),
        Template::new(names::FUEL, 10.0, [Tag::Breakable]),
        Template::new(names::SMALL_FUEL, 10.0, [Tag::Breakable]),
        Template::new(names::DUNGEON, 10.0, [Tag::Breakable]),
        Template::new(names::LAVA, 10.0, [Tag::Lava]),
        Template::new(names::TILE, 1.0, [Tag::Breakable]),
        Template::new(names::PICKUP, 1.0, [Tag::Pickup]),
    ]
}

pub fn crate_info() -> &'static str {
    "burrow-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_has_every_required_template() {
        let store = TemplateStore::stock();
        assert!(store.require_all(&names::REQUIRED).is_ok());
        assert_eq!(store.len(), names::REQUIRED.len());
    }

    #[test]
    fn require_reports_missing_name() {
        let store = TemplateStore::new();
        match store.require(names::ROCK) {
            Err(AssetError::MissingTemplate(name)) => assert_eq!(name, "rock"),
            other => panic!("expected MissingTemplate, got {other:?}"),
        }
    }

    #[test]
    fn require_all_rejects_zero_size() {
        let store: TemplateStore = [Template::new(names::ROCK, 0.0, [])].into_iter().collect();
        assert!(matches!(
            store.require_all(&[names::ROCK]),
            Err(AssetError::InvalidSize { .. })
        ));
    }

    #[test]
    fn register_replaces_by_name() {
        let mut store = TemplateStore::stock();
        store.register(Template::new(names::ROCK, 4.0, [Tag::Breakable]));
        assert_eq!(store.require(names::ROCK).unwrap().size, 4.0);
        assert_eq!(store.len(), names::REQUIRED.len());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = TemplateStore::stock();
        store.save(tmp.path()).unwrap();

        let loaded = TemplateStore::load(tmp.path()).unwrap();
        assert_eq!(loaded.len(), store.len());
        assert!(loaded.require(names::LAVA).unwrap().tags.contains(&Tag::Lava));
    }
}
