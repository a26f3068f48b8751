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

//! Satellite and company catalog.
//!
//! Holds the current snapshot of tracked satellites and the static company
//! reference data. Satellites are replaced wholesale on every telemetry tick;
//! companies never change during a session.

mod seed;

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Share of a company's fleet reported as operational in the detail view.
const OPERATIONAL_FLEET_RATIO: f64 = 0.94;

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate satellite id: {0}")]
    DuplicateSatellite(String),

    #[error("duplicate company id: {0}")]
    DuplicateCompany(String),
}

/// Satellite status as reported by the owning company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SatelliteStatus {
    Active,
    Maintenance,
    #[serde(other)]
    Other,
}

impl SatelliteStatus {
    #[must_use]
    pub fn tone(self) -> StatusTone {
        match self {
            Self::Active => StatusTone::Nominal,
            Self::Maintenance => StatusTone::Caution,
            Self::Other => StatusTone::Alert,
        }
    }
}

impl fmt::Display for SatelliteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Other => "other",
        })
    }
}

/// Company operating status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    Operational,
    Expanding,
    #[serde(other)]
    Other,
}

impl CompanyStatus {
    #[must_use]
    pub fn tone(self) -> StatusTone {
        match self {
            Self::Operational => StatusTone::Nominal,
            Self::Expanding => StatusTone::Caution,
            Self::Other => StatusTone::Alert,
        }
    }
}

impl fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Operational => "operational",
            Self::Expanding => "expanding",
            Self::Other => "other",
        })
    }
}

/// Coarse health classification shared by satellite and company statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Nominal,
    Caution,
    Alert,
}

/// A tracked satellite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Satellite {
    /// Unique identifier (e.g. "SAT-001").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Name of the owning company.
    pub company: String,
    /// Altitude in kilometres.
    pub altitude_km: f64,
    /// Speed in kilometres per hour.
    pub speed_kmh: f64,
    pub status: SatelliteStatus,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Static company reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier (e.g. "spacex").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Number of satellites in the fleet.
    pub satellites: u32,
    /// Number of completed missions.
    pub missions: u32,
    pub status: CompanyStatus,
    /// Next scheduled launch.
    pub next_launch: DateTime<Utc>,
    /// Connection mode label ("direct", "satellite-relay", ...).
    pub connection: String,
}

impl Company {
    /// Satellites reported as operational, rounded down.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "fleet sizes are small non-negative integers"
    )]
    pub fn operational_satellites(&self) -> u32 {
        (f64::from(self.satellites) * OPERATIONAL_FLEET_RATIO).floor() as u32
    }
}

/// The entity store: satellites plus company reference data.
#[derive(Debug, Clone)]
pub struct Catalog {
    satellites: Vec<Satellite>,
    companies: Vec<Company>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate satellite or company ids.
    pub fn new(satellites: Vec<Satellite>, companies: Vec<Company>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for satellite in &satellites {
            if !seen.insert(satellite.id.as_str()) {
                return Err(CatalogError::DuplicateSatellite(satellite.id.clone()));
            }
        }

        seen.clear();
        for company in &companies {
            if !seen.insert(company.id.as_str()) {
                return Err(CatalogError::DuplicateCompany(company.id.clone()));
            }
        }

        Ok(Self {
            satellites,
            companies,
        })
    }

    /// The fixed start-of-session catalog.
    #[must_use]
    pub fn seed() -> Self {
        Self {
            satellites: seed::satellites(),
            companies: seed::companies(),
        }
    }

    #[must_use]
    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    #[must_use]
    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    #[must_use]
    pub fn satellite(&self, id: &str) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    /// Iterate company ids in catalog order.
    pub fn company_ids(&self) -> impl Iterator<Item = &str> {
        self.companies.iter().map(|c| c.id.as_str())
    }

    /// Swap in a new satellite collection in one step.
    pub fn replace_satellites(&mut self, satellites: Vec<Satellite>) {
        self.satellites = satellites;
    }
}
