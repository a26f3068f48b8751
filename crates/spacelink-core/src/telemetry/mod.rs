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

//! Simulated telemetry.
//!
//! Each tick nudges every satellite's position, altitude and speed by a
//! bounded uniform random delta and redraws the coarse link status. There is
//! no orbital model and no clamping: values random-walk for as long as the
//! session runs.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::catalog::Satellite;

/// Coarse feed status shown next to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Connected,
    Syncing,
    Updating,
}

const LINK_STATUSES: [LinkStatus; 3] = [
    LinkStatus::Connected,
    LinkStatus::Syncing,
    LinkStatus::Updating,
];

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connected => "connected",
            Self::Syncing => "syncing",
            Self::Updating => "updating",
        })
    }
}

/// Half-widths of the per-tick uniform perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterBounds {
    /// Latitude and longitude, in degrees.
    pub lat_lon_deg: f64,
    /// Altitude, in kilometres.
    pub altitude_km: f64,
    /// Speed, in kilometres per hour.
    pub speed_kmh: f64,
}

impl Default for JitterBounds {
    fn default() -> Self {
        Self {
            lat_lon_deg: 0.05,
            altitude_km: 1.0,
            speed_kmh: 25.0,
        }
    }
}

/// Result of one simulation tick.
#[derive(Debug, Clone)]
pub struct TelemetryFrame {
    pub satellites: Vec<Satellite>,
    pub link_status: LinkStatus,
}

/// Random-walk telemetry generator.
#[derive(Debug)]
pub struct TelemetrySimulator<R> {
    rng: R,
    jitter: JitterBounds,
}

impl TelemetrySimulator<Pcg64Mcg> {
    /// PCG-backed simulator; a fixed seed makes runs reproducible.
    #[must_use]
    pub fn seeded(seed: Option<u64>, jitter: JitterBounds) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed),
            None => Pcg64Mcg::from_entropy(),
        };
        Self::new(rng, jitter)
    }
}

impl<R: Rng> TelemetrySimulator<R> {
    #[must_use]
    pub fn new(rng: R, jitter: JitterBounds) -> Self {
        Self { rng, jitter }
    }

    #[must_use]
    pub fn jitter(&self) -> JitterBounds {
        self.jitter
    }

    /// Perturb every satellite and redraw the link status.
    ///
    /// Cardinality, order and identity of the satellites are preserved.
    pub fn tick(&mut self, satellites: &[Satellite]) -> TelemetryFrame {
        let satellites = satellites
            .iter()
            .map(|satellite| self.perturb(satellite))
            .collect();

        TelemetryFrame {
            satellites,
            link_status: self.draw_link_status(),
        }
    }

    fn perturb(&mut self, satellite: &Satellite) -> Satellite {
        let JitterBounds {
            lat_lon_deg,
            altitude_km,
            speed_kmh,
        } = self.jitter;

        Satellite {
            latitude: satellite.latitude + self.uniform(lat_lon_deg),
            longitude: satellite.longitude + self.uniform(lat_lon_deg),
            altitude_km: satellite.altitude_km + self.uniform(altitude_km),
            speed_kmh: satellite.speed_kmh + self.uniform(speed_kmh),
            ..satellite.clone()
        }
    }

    /// Uniform draw over `[-half_width, half_width)`; zero for a zero bound.
    fn uniform(&mut self, half_width: f64) -> f64 {
        if half_width > 0.0 {
            self.rng.gen_range(-half_width..half_width)
        } else {
            0.0
        }
    }

    fn draw_link_status(&mut self) -> LinkStatus {
        LINK_STATUSES[self.rng.gen_range(0..LINK_STATUSES.len())]
    }
}
