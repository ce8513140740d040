// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree configuration, loadable from TOML.

use std::fs;
use std::path::Path;

use bramble_index::Aabb2D;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Region covered by the spatial index's quadtree. Boxes outside it still work but
/// are stored at the root.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width.
    pub width: i64,
    /// Height.
    pub height: i64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            x: -100_000,
            y: -100_000,
            width: 200_000,
            height: 200_000,
        }
    }
}

impl WorldBounds {
    /// The bounds as an index box.
    pub fn aabb(&self) -> Aabb2D<i64> {
        Aabb2D::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// Settings for a [`Tree`](crate::Tree). Every field has a default, so a TOML file
/// only needs the keys it changes.
///
/// ```
/// use bramble_scene::TreeConfig;
///
/// let config = TreeConfig::from_toml_str("step_seconds = 0.02\n[world]\nwidth = 4096\n").unwrap();
/// assert_eq!(config.step_seconds, 0.02);
/// assert_eq!(config.world.width, 4096);
/// assert_eq!(config.world.x, -100_000);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Fixed update step in seconds.
    pub step_seconds: f64,
    /// Upper bound on steps per [`Tree::tick`](crate::Tree::tick); excess time is dropped.
    pub max_steps_per_frame: Option<u32>,
    /// Quadtree region.
    pub world: WorldBounds,
    /// Index slots reserved up front.
    pub index_capacity: usize,
    /// Entries a quadtree cell holds before splitting.
    pub split_threshold: usize,
    /// Maximum quadtree depth.
    pub max_depth: u8,
    /// Compact the index after every tick.
    pub optimise_index: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            step_seconds: 1.0 / 60.0,
            max_steps_per_frame: None,
            world: WorldBounds::default(),
            index_capacity: 4096,
            split_threshold: 8,
            max_depth: 12,
            optimise_index: true,
        }
    }
}

impl TreeConfig {
    /// Parse a config from TOML text and [`validate`](Self::validate) it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot drive a tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_step(self.step_seconds)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

pub(crate) fn check_step(step: f64) -> Result<(), ConfigError> {
    if step.is_finite() && step > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidStep { step })
    }
}
