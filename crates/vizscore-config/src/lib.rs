//! # vizscore-config
//!
//! **Tier 0 (Pure Settings)**
//!
//! Clap-free scoring configuration for the extraction and scoring layers.
//! A full [`ScoreConfig`] is always available via `Default`; a user file
//! supplies a [`ScoreConfigOverride`] that is merged key-wise onto the
//! defaults, so callers never restate the whole schema.
//!
//! ## What belongs here
//! * Pure data types with Serde derive
//! * Default weights, mark bonuses, and shelf channels
//! * Override merging and JSON loading
//!
//! ## What does NOT belong here
//! * Clap parsing (lives in the `vizscore` CLI crate)
//! * Extraction or scoring logic

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mark types without a bonus entry fall back to this key.
pub const UNKNOWN_MARK: &str = "unknown";

/// A supplied config failed to load or parse. Fatal at startup, before
/// any workbook is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Scalar weight per scoring signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub dims: f64,
    pub meas: f64,
    pub filters: f64,
    pub calcs: f64,
    pub table_calc: f64,
    pub lod: f64,
    pub params: f64,
    pub shelf_density: f64,
    pub calc_formula_complexity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            dims: 0.5,
            meas: 0.7,
            filters: 0.6,
            calcs: 1.2,
            table_calc: 2.0,
            lod: 2.0,
            params: 0.8,
            shelf_density: 0.3,
            calc_formula_complexity: 0.15,
        }
    }
}

/// Process-wide scoring configuration, immutable after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub weights: ScoreWeights,
    /// Mark-type bonus map. Must carry an `"unknown"` entry; unknown
    /// marks resolve through it, never to zero and never to an error.
    pub mark_bonus: BTreeMap<String, f64>,
    /// Ordered set of channel names counted toward shelf density.
    pub shelf_channels: Vec<String>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            mark_bonus: default_mark_bonus(),
            shelf_channels: default_shelf_channels(),
        }
    }
}

fn default_mark_bonus() -> BTreeMap<String, f64> {
    // Certain mark types tend to need more care (dual-axis blends are
    // not captured here).
    [
        ("text", 0.2),
        ("bar", 0.5),
        ("line", 0.7),
        ("area", 0.7),
        ("shape", 0.8),
        ("map", 1.0),
        ("gantt", 1.0),
        ("scatter", 1.2),
        ("histogram", 0.6),
        ("box-and-whisker", 1.3),
        ("heatmap", 1.0),
        ("density", 1.2),
        ("pie", 0.9),
        ("polygon", 0.8),
        ("automatic", 0.6),
        (UNKNOWN_MARK, 0.4),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_shelf_channels() -> Vec<String> {
    [
        "rows", "cols", "color", "size", "shape", "label", "tooltip", "detail", "path", "text",
        "angle", "opacity",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl ScoreConfig {
    /// Bonus for a detected mark type, falling back to the `"unknown"`
    /// entry when the mark has no entry of its own.
    #[must_use]
    pub fn bonus_for(&self, mark: &str) -> f64 {
        self.mark_bonus
            .get(mark)
            .or_else(|| self.mark_bonus.get(UNKNOWN_MARK))
            .copied()
            .unwrap_or(0.0)
    }

    /// Merge an override layer onto this config.
    ///
    /// Weights merge field-wise, `mark_bonus` entry-wise (entries are
    /// added or replaced, the rest keep their defaults), and
    /// `shelf_channels` wholesale (an ordered set cannot be merged
    /// meaningfully).
    #[must_use]
    pub fn merged(mut self, overrides: ScoreConfigOverride) -> Self {
        if let Some(weights) = overrides.weights {
            weights.apply(&mut self.weights);
        }
        if let Some(bonus) = overrides.mark_bonus {
            for (mark, value) in bonus {
                self.mark_bonus.insert(mark, value);
            }
        }
        if let Some(channels) = overrides.shelf_channels {
            self.shelf_channels = channels;
        }
        self
    }
}

/// Field-wise weight overrides; `None` keeps the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeightsOverride {
    pub dims: Option<f64>,
    pub meas: Option<f64>,
    pub filters: Option<f64>,
    pub calcs: Option<f64>,
    pub table_calc: Option<f64>,
    pub lod: Option<f64>,
    pub params: Option<f64>,
    pub shelf_density: Option<f64>,
    pub calc_formula_complexity: Option<f64>,
}

impl ScoreWeightsOverride {
    fn apply(self, weights: &mut ScoreWeights) {
        if let Some(v) = self.dims {
            weights.dims = v;
        }
        if let Some(v) = self.meas {
            weights.meas = v;
        }
        if let Some(v) = self.filters {
            weights.filters = v;
        }
        if let Some(v) = self.calcs {
            weights.calcs = v;
        }
        if let Some(v) = self.table_calc {
            weights.table_calc = v;
        }
        if let Some(v) = self.lod {
            weights.lod = v;
        }
        if let Some(v) = self.params {
            weights.params = v;
        }
        if let Some(v) = self.shelf_density {
            weights.shelf_density = v;
        }
        if let Some(v) = self.calc_formula_complexity {
            weights.calc_formula_complexity = v;
        }
    }
}

/// Partial config layer as loaded from a user JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfigOverride {
    pub weights: Option<ScoreWeightsOverride>,
    pub mark_bonus: Option<BTreeMap<String, f64>>,
    pub shelf_channels: Option<Vec<String>>,
}

/// Load an override layer from a JSON file.
pub fn load_override(path: &Path) -> Result<ScoreConfigOverride, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load the effective config: defaults, optionally merged with a user
/// override file.
pub fn load_config(path: Option<&Path>) -> Result<ScoreConfig, ConfigError> {
    let base = ScoreConfig::default();
    match path {
        Some(p) => Ok(base.merged(load_override(p)?)),
        None => Ok(base),
    }
}
