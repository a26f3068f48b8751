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

//! The dashboard state owner.
//!
//! [`Dashboard`] owns the catalog, the follow/connection/view selection, the
//! notification queue and the telemetry simulator, and exposes the user
//! actions and the periodic tick as plain synchronous methods. Each method
//! runs to completion, so callers never observe partial state.
//!
//! State changes are published as [`DashboardEvent`]s on a broadcast channel.
//! Actions naming an unknown satellite or company are ignored.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::Rng;
use rand_pcg::Pcg64Mcg;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::catalog::{Catalog, Company, Satellite};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, SessionConfig};
use crate::metrics::{self, LinkState, NetworkMetrics, PartnerLink};
use crate::notify::{
    Notification, NotificationId, NotificationQueue, QueueChange, RemovalReason, Severity,
};
use crate::selection::{ConnectChange, FollowChange, Selection};
use crate::telemetry::{LinkStatus, TelemetrySimulator};

/// Events emitted when dashboard state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// A telemetry tick completed.
    Ticked { tick: u64, link_status: LinkStatus },
    /// The followed satellite changed (`None` when tracking stopped).
    FollowChanged(Option<String>),
    /// A company was connected or disconnected.
    ConnectionChanged { company_id: String, connected: bool },
    /// The viewed company changed (`None` when the view was closed).
    CompanyViewed(Option<String>),
    NotificationPosted(Notification),
    NotificationRemoved {
        id: NotificationId,
        reason: RemovalReason,
    },
}

/// Operator buttons that only post a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Message the viewed company.
    SendMessage,
    /// Request data from the viewed company.
    RequestData,
    ActivateGlobalProtocols,
    EmergencyProtocols,
    RunDiagnostics,
    OptimizeNetwork,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub tick: u64,
    pub current_time: DateTime<Utc>,
    pub link_status: LinkStatus,
    pub satellites: Vec<Satellite>,
    pub companies: Vec<Company>,
    pub connections: BTreeSet<String>,
    pub followed: Option<Satellite>,
    pub viewed: Option<Company>,
    pub notifications: Vec<Notification>,
    pub metrics: NetworkMetrics,
    pub partner_links: Vec<PartnerLink>,
}

pub struct Dashboard<R = Pcg64Mcg> {
    catalog: Catalog,
    selection: Selection,
    notifications: NotificationQueue,
    simulator: TelemetrySimulator<R>,
    link_status: LinkStatus,
    clock: Arc<dyn Clock>,
    current_time: DateTime<Utc>,
    tick_count: u64,
    tick_interval: Duration,
    event_tx: broadcast::Sender<DashboardEvent>,
}

impl<R> std::fmt::Debug for Dashboard<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("satellites", &self.catalog.satellites().len())
            .field("companies", &self.catalog.companies().len())
            .field("selection", &self.selection)
            .field("notifications", &self.notifications.len())
            .field("tick_count", &self.tick_count)
            .finish_non_exhaustive()
    }
}

impl Dashboard<Pcg64Mcg> {
    /// Seed catalog, system clock and a PCG simulator seeded from `config`.
    pub fn seeded(config: &SessionConfig) -> Result<Self, ConfigError> {
        Self::from_config(Catalog::seed(), config, Arc::new(SystemClock))
    }

    /// PCG simulator seeded from `config`, with an explicit catalog and clock.
    pub fn from_config(
        catalog: Catalog,
        config: &SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let simulator = TelemetrySimulator::seeded(config.seed, config.jitter);
        Self::new(catalog, simulator, config, clock)
    }
}

impl<R: Rng> Dashboard<R> {
    pub fn new(
        catalog: Catalog,
        simulator: TelemetrySimulator<R>,
        config: &SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);
        let current_time = clock.now();

        Ok(Self {
            catalog,
            selection: Selection::new(),
            notifications: NotificationQueue::new(
                config.notification_capacity,
                config.notification_lifetime,
            ),
            simulator,
            link_status: LinkStatus::default(),
            clock,
            current_time,
            tick_count: 0,
            tick_interval: config.tick_interval,
            event_tx,
        })
    }

    // ===== Telemetry =====

    /// Advance the simulation one step.
    pub fn tick(&mut self) {
        let frame = self.simulator.tick(self.catalog.satellites());
        self.catalog.replace_satellites(frame.satellites);
        self.link_status = frame.link_status;
        self.current_time = self.clock.now();
        self.tick_count += 1;

        debug!("Tick {} ({})", self.tick_count, self.link_status);
        self.emit(DashboardEvent::Ticked {
            tick: self.tick_count,
            link_status: self.link_status,
        });
    }

    // ===== User actions =====

    /// Follow a satellite, or stop following it if it is already followed.
    pub fn toggle_follow(&mut self, satellite_id: &str) {
        let Some(satellite) = self.catalog.satellite(satellite_id) else {
            warn!("Ignoring follow request for unknown satellite {satellite_id}");
            return;
        };
        let name = satellite.name.clone();
        let company = satellite.company.clone();

        match self.selection.toggle_follow(satellite_id) {
            FollowChange::Started => {
                info!("Following {satellite_id}");
                self.emit(DashboardEvent::FollowChanged(Some(satellite_id.to_string())));
                self.notify(format!("Now tracking {name} from {company}"), Severity::Success);
            }
            FollowChange::Stopped => {
                info!("Stopped following {satellite_id}");
                self.emit(DashboardEvent::FollowChanged(None));
                self.notify(format!("Stopped tracking {name}"), Severity::Info);
            }
        }
    }

    /// Close the tracking panel without a notification.
    pub fn clear_follow(&mut self) {
        if self.selection.clear_follow().is_some() {
            self.emit(DashboardEvent::FollowChanged(None));
        }
    }

    /// Connect a company, or disconnect it if it is already connected.
    pub fn toggle_connect(&mut self, company_id: &str) {
        let Some(company) = self.catalog.company(company_id) else {
            warn!("Ignoring connection request for unknown company {company_id}");
            return;
        };
        let name = company.name.clone();

        match self.selection.toggle_connect(company_id) {
            ConnectChange::Connected => {
                info!("Connected to {company_id}");
                self.emit(DashboardEvent::ConnectionChanged {
                    company_id: company_id.to_string(),
                    connected: true,
                });
                self.notify(format!("Successfully connected to {name}"), Severity::Success);
            }
            ConnectChange::Disconnected => {
                info!("Disconnected from {company_id}");
                self.emit(DashboardEvent::ConnectionChanged {
                    company_id: company_id.to_string(),
                    connected: false,
                });
                self.notify(format!("Disconnected from {name}"), Severity::Warning);
            }
        }
    }

    /// Connect every company that is not connected yet, one notification each.
    pub fn connect_all(&mut self) {
        let pending: Vec<String> = self
            .catalog
            .company_ids()
            .filter(|id| !self.selection.is_connected(id))
            .map(str::to_string)
            .collect();

        for company_id in pending {
            self.toggle_connect(&company_id);
        }
    }

    /// Open the database view for a company. Re-selecting keeps the view.
    pub fn select_company_for_view(&mut self, company_id: &str) {
        let Some(company) = self.catalog.company(company_id) else {
            warn!("Ignoring view request for unknown company {company_id}");
            return;
        };
        let name = company.name.clone();

        if self.selection.view(company_id) {
            self.emit(DashboardEvent::CompanyViewed(Some(company_id.to_string())));
        }
        self.notify(format!("Accessing {name} database..."), Severity::Info);
    }

    /// Close the database view without a notification.
    pub fn close_company_view(&mut self) {
        if self.selection.close_view().is_some() {
            self.emit(DashboardEvent::CompanyViewed(None));
        }
    }

    /// Post the notification for an operator button.
    pub fn issue(&mut self, command: OperatorCommand) {
        let viewed = self.viewed_company().map(|c| c.name.clone());

        let (message, severity) = match (command, viewed) {
            (OperatorCommand::SendMessage, Some(name)) => {
                (format!("Message sent to {name}"), Severity::Success)
            }
            (OperatorCommand::RequestData, Some(name)) => {
                (format!("Data request sent to {name}"), Severity::Info)
            }
            (OperatorCommand::SendMessage | OperatorCommand::RequestData, None) => {
                warn!("Ignoring {command:?} with no company in view");
                return;
            }
            (OperatorCommand::ActivateGlobalProtocols, _) => (
                "Global communication protocols activated".to_string(),
                Severity::Success,
            ),
            (OperatorCommand::EmergencyProtocols, _) => (
                "Emergency protocols initiated across all networks".to_string(),
                Severity::Warning,
            ),
            (OperatorCommand::RunDiagnostics, _) => (
                "Full network diagnostics initiated".to_string(),
                Severity::Info,
            ),
            (OperatorCommand::OptimizeNetwork, _) => (
                "Network optimization protocols activated".to_string(),
                Severity::Success,
            ),
        };

        self.notify(message, severity);
    }

    // ===== Notifications =====

    /// Dismiss a notification. No-op if it is already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let removed = self.notifications.dismiss(id);
        if removed {
            self.emit(DashboardEvent::NotificationRemoved {
                id,
                reason: RemovalReason::Dismissed,
            });
        }
        removed
    }

    /// Expire a notification whose timer fired. No-op if it is already gone.
    pub fn expire(&mut self, id: NotificationId) -> bool {
        let removed = self.notifications.expire(id);
        if removed {
            self.emit(DashboardEvent::NotificationRemoved {
                id,
                reason: RemovalReason::Expired,
            });
        }
        removed
    }

    /// Expire everything past its deadline according to the dashboard clock.
    pub fn prune_notifications(&mut self) -> usize {
        let expired = self.notifications.prune_expired(self.clock.now());
        for &id in &expired {
            self.emit(DashboardEvent::NotificationRemoved {
                id,
                reason: RemovalReason::Expired,
            });
        }
        expired.len()
    }

    /// Start logging queue insertions and removals for
    /// [`take_notification_changes`](Self::take_notification_changes).
    ///
    /// Callers driving expiry with [`prune_notifications`](Self::prune_notifications)
    /// leave this off.
    pub fn enable_notification_changes(&mut self) {
        self.notifications.enable_change_log(self.clock.now());
    }

    /// Drain queue insertions and removals since the last call.
    pub fn take_notification_changes(&mut self) -> Vec<QueueChange> {
        self.notifications.take_changes()
    }

    fn notify(&mut self, message: String, severity: Severity) {
        let posted = self.notifications.enqueue(message, severity, self.clock.now());

        if let Some(notification) = self.notifications.get(posted.id) {
            debug!("Notification {} [{}]: {}", notification.id, severity, notification.message);
            self.emit(DashboardEvent::NotificationPosted(notification.clone()));
        }
        for id in posted.evicted {
            self.emit(DashboardEvent::NotificationRemoved {
                id,
                reason: RemovalReason::Evicted,
            });
        }
    }

    fn emit(&self, event: DashboardEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl<R> Dashboard<R> {
    // ===== Read accessors =====

    #[must_use]
    pub fn satellites(&self) -> &[Satellite] {
        self.catalog.satellites()
    }

    #[must_use]
    pub fn companies(&self) -> &[Company] {
        self.catalog.companies()
    }

    #[must_use]
    pub fn connections(&self) -> &BTreeSet<String> {
        self.selection.connections()
    }

    /// The followed satellite as of the latest tick.
    #[must_use]
    pub fn followed(&self) -> Option<&Satellite> {
        self.selection
            .followed()
            .and_then(|id| self.catalog.satellite(id))
    }

    #[must_use]
    pub fn viewed_company(&self) -> Option<&Company> {
        self.selection
            .viewed()
            .and_then(|id| self.catalog.company(id))
    }

    /// Notifications, most recent first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    #[must_use]
    pub fn link_status(&self) -> LinkStatus {
        self.link_status
    }

    /// Time of the latest tick (or of construction before the first tick).
    #[must_use]
    pub fn current_time(&self) -> DateTime<Utc> {
        self.current_time
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub fn metrics(&self) -> NetworkMetrics {
        NetworkMetrics::compute(self.connections().len(), self.companies().len())
    }

    #[must_use]
    pub fn partner_links(&self) -> Vec<PartnerLink> {
        metrics::partner_links(self.connections(), self.companies().len())
    }

    #[must_use]
    pub fn link_state(&self, company_id: &str) -> LinkState {
        LinkState::of(self.connections(), company_id)
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            tick: self.tick_count,
            current_time: self.current_time,
            link_status: self.link_status,
            satellites: self.satellites().to_vec(),
            companies: self.companies().to_vec(),
            connections: self.connections().clone(),
            followed: self.followed().cloned(),
            viewed: self.viewed_company().cloned(),
            notifications: self.notifications().cloned().collect(),
            metrics: self.metrics(),
            partner_links: self.partner_links(),
        }
    }

    /// Subscribe to dashboard events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.event_tx.subscribe()
    }

    /// Sender half of the event channel, for handing out more subscriptions.
    #[must_use]
    pub fn event_sender(&self) -> broadcast::Sender<DashboardEvent> {
        self.event_tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 23, 10, 0, 0).unwrap()
    }

    fn dashboard() -> (Dashboard, ManualClock) {
        let clock = ManualClock::new(start());
        let config = SessionConfig {
            seed: Some(11),
            ..Default::default()
        };
        let dashboard =
            Dashboard::from_config(Catalog::seed(), &config, Arc::new(clock.clone())).unwrap();
        (dashboard, clock)
    }

    fn messages(dashboard: &Dashboard) -> Vec<(String, Severity)> {
        dashboard
            .notifications()
            .map(|n| (n.message.clone(), n.severity))
            .collect()
    }

    #[test]
    fn test_connect_scenario() {
        let (mut dashboard, _) = dashboard();

        dashboard.toggle_connect("spacex");
        assert!(dashboard.connections().contains("spacex"));
        assert_eq!(dashboard.connections().len(), 1);
        assert_eq!(
            messages(&dashboard),
            vec![("Successfully connected to SpaceX".to_string(), Severity::Success)]
        );

        dashboard.toggle_connect("spacex");
        assert!(dashboard.connections().is_empty());
        assert_eq!(
            messages(&dashboard)[0],
            ("Disconnected from SpaceX".to_string(), Severity::Warning)
        );
    }

    #[test]
    fn test_follow_scenario() {
        let (mut dashboard, _) = dashboard();

        dashboard.toggle_follow("SAT-001");
        assert_eq!(dashboard.followed().map(|s| s.id.as_str()), Some("SAT-001"));
        assert_eq!(
            messages(&dashboard)[0],
            ("Now tracking Starlink-4829 from SpaceX".to_string(), Severity::Success)
        );

        dashboard.toggle_follow("SAT-001");
        assert!(dashboard.followed().is_none());
        assert_eq!(
            messages(&dashboard)[0],
            ("Stopped tracking Starlink-4829".to_string(), Severity::Info)
        );
    }

    #[test]
    fn test_connect_all_idempotent() {
        let (mut dashboard, _) = dashboard();
        dashboard.enable_notification_changes();
        let all: BTreeSet<String> = dashboard.companies().iter().map(|c| c.id.clone()).collect();

        dashboard.toggle_connect("oneweb");
        dashboard.connect_all();
        assert_eq!(dashboard.connections(), &all);
        // One for oneweb plus one per newly connected company
        assert_eq!(dashboard.notifications().count(), 5);
        assert_eq!(dashboard.take_notification_changes().len(), 5);

        dashboard.connect_all();
        assert_eq!(dashboard.connections(), &all);
        assert!(dashboard.take_notification_changes().is_empty());

        let metrics = dashboard.metrics();
        assert_eq!(metrics.active.to_string(), "5/5");
        assert_eq!(metrics.latency_ms, 20);
        assert!(dashboard.partner_links().iter().all(|l| l.active));
    }

    #[test]
    fn test_view_company() {
        let (mut dashboard, _) = dashboard();

        dashboard.select_company_for_view("esa");
        dashboard.select_company_for_view("esa");
        assert_eq!(dashboard.viewed_company().map(|c| c.id.as_str()), Some("esa"));
        assert_eq!(
            messages(&dashboard)[0],
            ("Accessing European Space Agency database...".to_string(), Severity::Info)
        );
        // Viewing does not connect
        assert!(dashboard.connections().is_empty());

        dashboard.close_company_view();
        assert!(dashboard.viewed_company().is_none());
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let (mut dashboard, _) = dashboard();

        dashboard.toggle_follow("SAT-404");
        dashboard.toggle_connect("blue-origin");
        dashboard.select_company_for_view("blue-origin");

        assert!(dashboard.followed().is_none());
        assert!(dashboard.connections().is_empty());
        assert!(dashboard.viewed_company().is_none());
        assert_eq!(dashboard.notifications().count(), 0);
    }

    #[test]
    fn test_tick_updates_followed_and_time() {
        let (mut dashboard, clock) = dashboard();
        let before = dashboard.satellites().to_vec();
        dashboard.toggle_follow("SAT-004");

        clock.advance(chrono::Duration::seconds(2));
        dashboard.tick();

        assert_eq!(dashboard.tick_count(), 1);
        assert_eq!(dashboard.current_time(), start() + chrono::Duration::seconds(2));
        assert_eq!(dashboard.satellites().len(), before.len());
        for (a, b) in before.iter().zip(dashboard.satellites()) {
            assert_eq!(a.id, b.id);
        }

        let followed = dashboard.followed().unwrap();
        assert_eq!(followed, &dashboard.satellites()[3]);
        assert_ne!(followed, &before[3]);
    }

    #[test]
    fn test_operator_commands() {
        let (mut dashboard, _) = dashboard();

        // Needs a company in view
        dashboard.issue(OperatorCommand::SendMessage);
        assert_eq!(dashboard.notifications().count(), 0);

        dashboard.select_company_for_view("oneweb");
        dashboard.issue(OperatorCommand::SendMessage);
        dashboard.issue(OperatorCommand::RequestData);
        dashboard.issue(OperatorCommand::EmergencyProtocols);

        assert_eq!(
            messages(&dashboard)[..3],
            [
                (
                    "Emergency protocols initiated across all networks".to_string(),
                    Severity::Warning
                ),
                ("Data request sent to OneWeb".to_string(), Severity::Info),
                ("Message sent to OneWeb".to_string(), Severity::Success),
            ]
        );
    }

    #[test]
    fn test_notifications_capped_and_pruned() {
        let (mut dashboard, clock) = dashboard();

        for _ in 0..4 {
            dashboard.toggle_connect("amazon");
        }
        dashboard.issue(OperatorCommand::RunDiagnostics);
        dashboard.issue(OperatorCommand::OptimizeNetwork);
        assert_eq!(dashboard.notifications().count(), 5);

        clock.advance(chrono::Duration::seconds(5));
        assert_eq!(dashboard.prune_notifications(), 5);
        assert_eq!(dashboard.notifications().count(), 0);
    }

    #[test]
    fn test_dismiss() {
        let (mut dashboard, _) = dashboard();
        dashboard.toggle_connect("lockheed");
        let id = dashboard.notifications().next().unwrap().id;

        assert!(dashboard.dismiss(id));
        assert!(!dashboard.dismiss(id));
        assert!(!dashboard.expire(id));
    }

    #[test]
    fn test_events_emitted() {
        let (mut dashboard, _) = dashboard();
        let mut events = dashboard.subscribe();

        dashboard.toggle_connect("esa");
        assert_eq!(
            events.try_recv().unwrap(),
            DashboardEvent::ConnectionChanged {
                company_id: "esa".to_string(),
                connected: true
            }
        );
        match events.try_recv().unwrap() {
            DashboardEvent::NotificationPosted(n) => {
                assert_eq!(n.message, "Successfully connected to European Space Agency");
            }
            other => panic!("unexpected event {other:?}"),
        }

        dashboard.tick();
        assert!(matches!(
            events.try_recv().unwrap(),
            DashboardEvent::Ticked { tick: 1, .. }
        ));
    }

    #[test]
    fn test_snapshot_serializes() {
        let (mut dashboard, _) = dashboard();
        dashboard.toggle_follow("SAT-002");
        dashboard.toggle_connect("oneweb");

        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.followed.as_ref().map(|s| s.name.as_str()), Some("OneWeb-0445"));
        assert_eq!(snapshot.metrics.active.to_string(), "1/5");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["link_status"], "connected");
        assert_eq!(json["connections"][0], "oneweb");
        assert_eq!(json["notifications"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_frame_loop_keeps_no_change_backlog() {
        let (mut dashboard, clock) = dashboard();
        for _ in 0..10_000 {
            dashboard.toggle_connect("spacex");
            dashboard.tick();
            clock.advance(chrono::Duration::milliseconds(100));
            dashboard.prune_notifications();
        }

        assert_eq!(dashboard.notifications().count(), 5);
        assert!(dashboard.take_notification_changes().is_empty());
    }
}
