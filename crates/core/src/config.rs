//! Engine configuration, read from the host as JSON.
//!
//! Every field has a default, so `{}` is a valid configuration and a
//! partial object only overrides the fields it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::LayoutConfig;
use crate::routing::RouteOptions;
use crate::view::ZoomConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub routing: RouteOptions,
    pub zoom: ZoomConfig,
}

impl EngineConfig {
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the geometry cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("layout.rowHeight", self.layout.row_height),
            ("zoom.maxScale", self.zoom.max_scale),
            ("zoom.minScale", self.zoom.min_scale),
        ];
        for (field, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}
