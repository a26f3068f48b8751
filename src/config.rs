// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent settings are stored in TOML through confy. Every field has a
//! serde default so older or partial files keep loading.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use spacelink_core::{JitterBounds, SessionConfig};

const APP_NAME: &str = "spacelink-desktop";
const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Telemetry tick period in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// How long a notification stays up, in milliseconds
    #[serde(default = "default_notification_lifetime_ms")]
    pub notification_lifetime_ms: u64,

    /// Maximum notifications kept at once
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,

    /// Per-tick perturbation bounds
    #[serde(default)]
    pub jitter: JitterBounds,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,

    /// Companies to connect on startup
    #[serde(default)]
    pub auto_connect: Vec<String>,

    /// Connect every company on startup
    #[serde(default)]
    pub connect_all_on_start: bool,

    /// Satellite to follow on startup
    #[serde(default)]
    pub follow: Option<String>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_tick_interval_ms() -> u64 {
    2000
}

fn default_notification_lifetime_ms() -> u64 {
    5000
}

fn default_notification_capacity() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            tick_interval_ms: default_tick_interval_ms(),
            notification_lifetime_ms: default_notification_lifetime_ms(),
            notification_capacity: default_notification_capacity(),
            jitter: JitterBounds::default(),
            seed: None,
            auto_connect: Vec::new(),
            connect_all_on_start: false,
            follow: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Session settings derived from this configuration
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            notification_capacity: self.notification_capacity,
            notification_lifetime: Duration::from_millis(self.notification_lifetime_ms),
            jitter: self.jitter,
            seed: self.seed,
            ..SessionConfig::default()
        }
    }
}
