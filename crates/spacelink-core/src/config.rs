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

//! Session configuration.

use std::time::Duration;

use thiserror::Error;

use crate::notify::{DEFAULT_CAPACITY, DEFAULT_LIFETIME};
use crate::telemetry::JitterBounds;

/// Largest notification capacity a session accepts.
pub const MAX_NOTIFICATION_CAPACITY: usize = 100;

/// Errors found while validating a [`SessionConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,

    #[error("notification capacity must be at least 1")]
    ZeroNotificationCapacity,

    #[error("notification capacity {value} exceeds the maximum of {max}")]
    NotificationCapacityTooLarge { value: usize, max: usize },

    #[error("notification lifetime must be greater than zero")]
    ZeroNotificationLifetime,

    #[error("event channel capacity must be at least 1")]
    ZeroEventCapacity,

    #[error("invalid jitter bound '{field}': {value}")]
    InvalidJitter { field: &'static str, value: f64 },
}

/// Configuration for a dashboard session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Period of the telemetry tick.
    pub tick_interval: Duration,
    /// Maximum number of notifications kept.
    pub notification_capacity: usize,
    /// How long a notification stays before expiring.
    pub notification_lifetime: Duration,
    /// Per-tick perturbation bounds.
    pub jitter: JitterBounds,
    /// Random seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Broadcast channel capacity for dashboard events.
    pub event_channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(2000),
            notification_capacity: DEFAULT_CAPACITY,
            notification_lifetime: DEFAULT_LIFETIME,
            jitter: JitterBounds::default(),
            seed: None,
            event_channel_capacity: 256,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::ZeroNotificationCapacity);
        }
        if self.notification_capacity > MAX_NOTIFICATION_CAPACITY {
            return Err(ConfigError::NotificationCapacityTooLarge {
                value: self.notification_capacity,
                max: MAX_NOTIFICATION_CAPACITY,
            });
        }
        if self.notification_lifetime.is_zero() {
            return Err(ConfigError::ZeroNotificationLifetime);
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }

        let bounds = [
            ("lat_lon_deg", self.jitter.lat_lon_deg),
            ("altitude_km", self.jitter.altitude_km),
            ("speed_kmh", self.jitter.speed_kmh),
        ];
        for (field, value) in bounds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidJitter { field, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SessionConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(2));
        assert_eq!(config.notification_capacity, 5);
        assert_eq!(config.notification_lifetime, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_values() {
        let config = SessionConfig {
            tick_interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickInterval));

        let config = SessionConfig {
            notification_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroNotificationCapacity));
    }

    #[test]
    fn test_rejects_oversized_capacity() {
        let config = SessionConfig {
            notification_capacity: usize::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotificationCapacityTooLarge {
                value: usize::MAX,
                max: MAX_NOTIFICATION_CAPACITY,
            })
        );

        let config = SessionConfig {
            notification_capacity: MAX_NOTIFICATION_CAPACITY,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_jitter() {
        let config = SessionConfig {
            jitter: JitterBounds {
                altitude_km: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidJitter {
                field: "altitude_km",
                value: -1.0
            })
        );

        let config = SessionConfig {
            jitter: JitterBounds {
                speed_kmh: f64::INFINITY,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
