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

//! Core state for the SpaceLink satellite dashboard.
//!
//! The library simulates satellite telemetry, tracks which satellite is
//! followed and which companies are connected, derives network metrics, and
//! keeps a short list of self-expiring notifications. It has several layers
//! that can be used on their own:
//!
//! - **Catalog**: satellites and company reference data
//! - **Telemetry**: random-walk position, altitude and speed updates
//! - **Metrics**: pure functions of the connection count
//! - **Selection** and **Notify**: follow/connect/view toggles and the
//!   notification queue
//! - **Dashboard**: the state owner combining all of the above
//! - **Session**: a tokio task driving a dashboard on a timer
//!
//! # Quick Start
//!
//! ```no_run
//! use spacelink_core::{Dashboard, Session, SessionConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let dashboard = Dashboard::seeded(&SessionConfig::default()).unwrap();
//!     let session = Session::spawn(dashboard);
//!
//!     session.toggle_connect("spacex");
//!     session.toggle_follow("SAT-001");
//!     session.sync().await;
//!
//!     let snapshot = session.snapshot();
//!     println!("{} coverage {:.1}%", snapshot.metrics.active, snapshot.metrics.coverage_percent);
//! }
//! ```
//!
//! # Driving a Dashboard by Hand
//!
//! Frame-loop front ends can skip the session and call the dashboard
//! directly:
//!
//! ```
//! use spacelink_core::{Dashboard, SessionConfig};
//!
//! let mut dashboard = Dashboard::seeded(&SessionConfig {
//!     seed: Some(1),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! dashboard.connect_all();
//! dashboard.tick();
//! dashboard.prune_notifications();
//!
//! assert_eq!(dashboard.metrics().latency_ms, 20);
//! ```

pub mod catalog;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod metrics;
pub mod notify;
pub mod selection;
pub mod session;
pub mod telemetry;

pub use catalog::{Catalog, CatalogError, Company, CompanyStatus, Satellite, SatelliteStatus, StatusTone};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, SessionConfig, MAX_NOTIFICATION_CAPACITY};
pub use dashboard::{Dashboard, DashboardEvent, DashboardSnapshot, OperatorCommand};
pub use metrics::{ActiveRatio, LinkState, NetworkMetrics, PartnerLink};
pub use notify::{Notification, NotificationId, NotificationQueue, RemovalReason, Severity};
pub use session::Session;
pub use telemetry::{JitterBounds, LinkStatus, TelemetrySimulator};
