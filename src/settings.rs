//! Analysis settings loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::events::EventSelectionConfig;
use crate::tracker::TrackerConfig;
use crate::Result;

/// Tracking and event selection settings of one analysis run.
///
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tracker: TrackerConfig,
    pub events: EventSelectionConfig,
}

impl Settings {
    /// Parse settings from a JSON string and validate them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file and validate them.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;
        self.events.validate()
    }
}
