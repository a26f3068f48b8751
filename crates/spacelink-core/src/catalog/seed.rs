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

//! Fixed start-of-session catalog contents.

use chrono::{DateTime, TimeZone, Utc};

use super::{Company, CompanyStatus, Satellite, SatelliteStatus};

fn launch(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments, reason = "flat seed rows")]
fn satellite(
    id: &str,
    name: &str,
    company: &str,
    altitude_km: f64,
    speed_kmh: f64,
    status: SatelliteStatus,
    latitude: f64,
    longitude: f64,
) -> Satellite {
    Satellite {
        id: id.to_string(),
        name: name.to_string(),
        company: company.to_string(),
        altitude_km,
        speed_kmh,
        status,
        latitude,
        longitude,
    }
}

fn company(
    id: &str,
    name: &str,
    satellites: u32,
    missions: u32,
    status: CompanyStatus,
    next_launch: DateTime<Utc>,
    connection: &str,
) -> Company {
    Company {
        id: id.to_string(),
        name: name.to_string(),
        satellites,
        missions,
        status,
        next_launch,
        connection: connection.to_string(),
    }
}

pub(super) fn satellites() -> Vec<Satellite> {
    use SatelliteStatus::{Active, Maintenance};

    vec![
        satellite("SAT-001", "Starlink-4829", "SpaceX", 550.0, 27500.0, Active, 42.3, -71.1),
        satellite("SAT-002", "OneWeb-0445", "OneWeb", 1200.0, 26800.0, Active, 51.5, 0.1),
        satellite("SAT-003", "Kuiper-0123", "Amazon", 630.0, 27200.0, Maintenance, 37.7, -122.4),
        satellite("SAT-004", "GPS-IIIF-05", "Lockheed Martin", 20200.0, 14000.0, Active, 0.0, 0.0),
        satellite("SAT-005", "Sentinel-2C", "ESA", 786.0, 26900.0, Active, 48.8, 2.3),
    ]
}

pub(super) fn companies() -> Vec<Company> {
    use CompanyStatus::{Expanding, Operational};

    vec![
        company("spacex", "SpaceX", 4829, 89, Operational, launch(2025, 9, 23, 10, 30), "direct"),
        company("oneweb", "OneWeb", 648, 21, Operational, launch(2025, 9, 25, 14, 15), "satellite-relay"),
        company("amazon", "Amazon Kuiper", 3236, 15, Expanding, launch(2025, 9, 28, 8, 45), "direct"),
        company("lockheed", "Lockheed Martin", 24, 156, Operational, launch(2025, 10, 2, 16, 20), "ground-station"),
        company("esa", "European Space Agency", 89, 78, Operational, launch(2025, 10, 5, 12, 0), "international-link"),
    ]
}
