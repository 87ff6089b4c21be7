use std::path::Path;

use burrow_assets::{Template, TemplateStore, names, stock_templates};
use burrow_lava::LavaConfig;
use burrow_mine::{FuelConfig, MineConfig};
use burrow_stream::StreamConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Everything a session needs. Every section falls back to its defaults, so a
/// file only has to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for chunk kinds and dungeon rewards.
    pub seed: u64,
    /// World height that counts as depth zero.
    pub depth_origin_y: f32,
    pub stream: StreamConfig,
    pub mine: MineConfig,
    pub fuel: FuelConfig,
    pub lava: LavaConfig,
    pub templates: Vec<Template>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            depth_origin_y: 0.0,
            stream: StreamConfig::default(),
            mine: MineConfig::default(),
            fuel: FuelConfig::default(),
            lava: LavaConfig::default(),
            templates: stock_templates(),
        }
    }
}

impl GameConfig {
    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let text = std::fs::read_to_string(path)?;
        let config = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(extension)),
        };
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the templates with those saved in a template store file.
    pub fn load_templates(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let store = TemplateStore::load(path)?;
        self.templates = store.iter().cloned().collect();
        Ok(())
    }

    pub fn template_store(&self) -> TemplateStore {
        self.templates.iter().cloned().collect()
    }

    /// Check ranges and template presence. The templates are returned so the
    /// caller does not build the store twice.
    pub fn validate(&self) -> Result<TemplateStore, ConfigError> {
        let store = self.template_store();
        store.require_all(&names::REQUIRED)?;

        let cell_size = store.require(names::ROCK)?.size;
        for name in names::CELL_SIZED {
            let size = store.require(name)?.size;
            if size != cell_size {
                return Err(ConfigError::invalid(
                    "templates",
                    format!("{name} has size {size}, cells are {cell_size}"),
                ));
            }
        }

        let stream = &self.stream;
        if stream.padding < 0 {
            return Err(ConfigError::invalid("stream.padding", "must not be negative"));
        }
        if stream.retain_margin < 0 {
            return Err(ConfigError::invalid("stream.retain_margin", "must not be negative"));
        }
        for (field, p) in [
            ("stream.fuel_chance", stream.fuel_chance),
            ("stream.small_fuel_share", stream.small_fuel_share),
            ("stream.dungeon_chance", stream.dungeon_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::invalid(field, format!("{p} is not a probability")));
            }
        }

        let mine = &self.mine;
        if mine.grid_size == 0 {
            return Err(ConfigError::invalid("mine.grid_size", "must be at least 1"));
        }
        if mine.break_delay_secs.is_nan() || mine.break_delay_secs < 0.0 {
            return Err(ConfigError::invalid("mine.break_delay_secs", "must not be negative"));
        }
        for (field, value) in [
            ("mine.mining_distance", mine.mining_distance),
            ("mine.mining_width", mine.mining_width),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::invalid(field, "must be positive"));
            }
        }

        if self.fuel.max.is_nan() || self.fuel.max <= 0.0 {
            return Err(ConfigError::invalid("fuel.max", "must be positive"));
        }
        if self.fuel.passive_drain_per_sec < 0.0 {
            return Err(ConfigError::invalid("fuel.passive_drain_per_sec", "must not be negative"));
        }

        let lava = &self.lava;
        if lava.seconds_per_row.is_nan() || lava.seconds_per_row <= 0.0 {
            return Err(ConfigError::invalid("lava.seconds_per_row", "must be positive"));
        }
        if lava.default_min_x > lava.default_max_x {
            return Err(ConfigError::invalid(
                "lava.default_min_x",
                format!("{} exceeds default_max_x {}", lava.default_min_x, lava.default_max_x),
            ));
        }

        Ok(store)
    }
}
