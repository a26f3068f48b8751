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

//! Derived network metrics.
//!
//! Everything here is a pure function of how many companies are connected.
//! Values are recomputed on every read.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

const EXCHANGE_RATE_PER_CONNECTION_TB_H: f64 = 1.2;
const BASE_COVERAGE_PERCENT: f64 = 98.7;
const COVERAGE_PER_CONNECTION_PERCENT: f64 = 0.2;
const MAX_COVERAGE_PERCENT: f64 = 100.0;
const BASE_LATENCY_MS: u32 = 45;
const LATENCY_PER_CONNECTION_MS: u32 = 5;
const MIN_LATENCY_MS: u32 = 15;

/// Connected companies over total companies, shown as "c/total".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRatio {
    pub connected: usize,
    pub total: usize,
}

impl ActiveRatio {
    /// Fraction connected, zero when there are no companies.
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "company counts are tiny")]
    pub fn fraction(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.connected as f64 / self.total as f64
        }
    }
}

impl fmt::Display for ActiveRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.connected, self.total)
    }
}

#[must_use]
pub fn active_ratio(connected: usize, total: usize) -> ActiveRatio {
    ActiveRatio { connected, total }
}

/// Synthetic data exchange rate in TB/h.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "company counts are tiny")]
pub fn exchange_rate_tb_per_hour(connected: usize) -> f64 {
    connected as f64 * EXCHANGE_RATE_PER_CONNECTION_TB_H
}

/// Synthetic network coverage percentage, capped at 100.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "company counts are tiny")]
pub fn coverage_percent(connected: usize) -> f64 {
    (BASE_COVERAGE_PERCENT + connected as f64 * COVERAGE_PER_CONNECTION_PERCENT)
        .min(MAX_COVERAGE_PERCENT)
}

/// Synthetic latency in milliseconds, floored at 15.
#[must_use]
pub fn latency_ms(connected: usize) -> u32 {
    let connected = u32::try_from(connected).unwrap_or(u32::MAX);
    BASE_LATENCY_MS
        .saturating_sub(connected.saturating_mul(LATENCY_PER_CONNECTION_MS))
        .max(MIN_LATENCY_MS)
}

/// All headline network metrics for one read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub active: ActiveRatio,
    pub exchange_rate_tb_per_hour: f64,
    pub coverage_percent: f64,
    pub latency_ms: u32,
}

impl NetworkMetrics {
    #[must_use]
    pub fn compute(connected: usize, total: usize) -> Self {
        Self {
            active: active_ratio(connected, total),
            exchange_rate_tb_per_hour: exchange_rate_tb_per_hour(connected),
            coverage_percent: coverage_percent(connected),
            latency_ms: latency_ms(connected),
        }
    }
}

/// Per-company link indicator in the network view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Connected,
    Standby,
}

impl LinkState {
    #[must_use]
    pub fn of(connections: &BTreeSet<String>, company_id: &str) -> Self {
        if connections.contains(company_id) {
            Self::Connected
        } else {
            Self::Standby
        }
    }
}

/// An inter-company link that is active only when all its parties are connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerLink {
    /// Display labels of the parties.
    pub parties: Vec<String>,
    /// Link type, e.g. "Data Sharing".
    pub kind: String,
    pub active: bool,
}

impl fmt::Display for PartnerLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.parties.join(" ↔ "),
            self.kind,
            if self.active { "Active" } else { "Inactive" }
        )
    }
}

/// Bilateral links and their required company ids.
const BILATERAL_LINKS: [(&str, &str, &str, &str, &str); 2] = [
    ("SpaceX", "OneWeb", "Data Sharing", "spacex", "oneweb"),
    ("Amazon", "ESA", "Joint Mission", "amazon", "esa"),
];

/// Derive the partner links from the connection set.
#[must_use]
pub fn partner_links(connections: &BTreeSet<String>, total_companies: usize) -> Vec<PartnerLink> {
    let mut links: Vec<PartnerLink> = BILATERAL_LINKS
        .iter()
        .map(|&(left, right, kind, left_id, right_id)| PartnerLink {
            parties: vec![left.to_string(), right.to_string()],
            kind: kind.to_string(),
            active: connections.contains(left_id) && connections.contains(right_id),
        })
        .collect();

    links.push(PartnerLink {
        parties: vec!["All Companies".to_string()],
        kind: "Emergency Protocol".to_string(),
        active: total_companies > 0 && connections.len() == total_companies,
    });

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_no_connections() {
        let m = NetworkMetrics::compute(0, 5);
        assert_eq!(m.active.to_string(), "0/5");
        assert!((m.coverage_percent - 98.7).abs() < 1e-9);
        assert_eq!(m.latency_ms, 45);
        assert!(m.exchange_rate_tb_per_hour.abs() < 1e-9);
    }

    #[test]
    fn test_all_connected() {
        let m = NetworkMetrics::compute(5, 5);
        assert_eq!(m.active.to_string(), "5/5");
        assert!((m.coverage_percent - 99.7).abs() < 1e-9);
        assert_eq!(m.latency_ms, 20);
        assert!((m.exchange_rate_tb_per_hour - 6.0).abs() < 1e-9);
        assert!((m.active.fraction() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps() {
        // 98.7 + 7 * 0.2 = 100.1 -> 100
        assert!((coverage_percent(7) - 100.0).abs() < 1e-9);
        assert!((coverage_percent(1000) - 100.0).abs() < 1e-9);
        // 45 - 6 * 5 = 15, anything beyond stays at the floor
        assert_eq!(latency_ms(6), 15);
        assert_eq!(latency_ms(7), 15);
        assert_eq!(latency_ms(usize::MAX), 15);
    }

    #[test]
    fn test_exchange_rate_monotonic() {
        let rates: Vec<f64> = (0..10).map(exchange_rate_tb_per_hour).collect();
        assert!(rates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_ratio_fraction() {
        assert!(active_ratio(0, 0).fraction().abs() < f64::EPSILON);
    }

    #[test]
    fn test_partner_links() {
        let links = partner_links(&set(&["spacex", "oneweb"]), 5);
        assert_eq!(links.len(), 3);
        assert!(links[0].active);
        assert!(!links[1].active);
        assert!(!links[2].active);
        assert_eq!(links[0].to_string(), "SpaceX ↔ OneWeb: Data Sharing (Active)");

        let links = partner_links(&set(&["spacex", "oneweb", "amazon", "lockheed", "esa"]), 5);
        assert!(links.iter().all(|l| l.active));
    }

    #[test]
    fn test_link_state() {
        let connections = set(&["esa"]);
        assert_eq!(LinkState::of(&connections, "esa"), LinkState::Connected);
        assert_eq!(LinkState::of(&connections, "spacex"), LinkState::Standby);
    }

    #[test]
    fn test_emergency_link_needs_companies() {
        let links = partner_links(&BTreeSet::new(), 0);
        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|link| !link.active));
    }
}
