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

//! Console formatting for dashboard state.

use spacelink_core::{Company, DashboardSnapshot, LinkState, Notification, Satellite};

/// One status line per tick.
pub fn summary_line(snapshot: &DashboardSnapshot) -> String {
    let metrics = &snapshot.metrics;
    let mut line = format!(
        "[{}] tick {} | {} | network {} | {:.1} TB/h | coverage {:.1}% | latency {}ms",
        snapshot.current_time.format("%H:%M:%S"),
        snapshot.tick,
        snapshot.link_status,
        metrics.active,
        metrics.exchange_rate_tb_per_hour,
        metrics.coverage_percent,
        metrics.latency_ms,
    );

    if let Some(satellite) = &snapshot.followed {
        line.push_str(" | tracking ");
        line.push_str(&tracking_detail(satellite));
    }

    line
}

/// Position readout for the followed satellite.
pub fn tracking_detail(satellite: &Satellite) -> String {
    format!(
        "{} ({:.4}°N {:.4}°E, {:.1} km, {:.0} km/h)",
        satellite.name,
        satellite.latitude,
        satellite.longitude,
        satellite.altitude_km,
        satellite.speed_kmh,
    )
}

pub fn notification_line(notification: &Notification) -> String {
    format!("[{}] {}", notification.severity, notification.message)
}

/// Database panel for the viewed company.
pub fn company_detail(company: &Company, link: LinkState) -> String {
    format!(
        "{} Database Access: {} missions, {} satellites ({} operational), {}, next launch {}, {} link, {}",
        company.name,
        company.missions,
        company.satellites,
        company.operational_satellites(),
        company.status,
        company.next_launch.format("%Y-%m-%d %H:%M UTC"),
        company.connection,
        match link {
            LinkState::Connected => "connected",
            LinkState::Standby => "standby",
        },
    )
}
