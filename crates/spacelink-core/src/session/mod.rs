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

//! Scheduled session driver.
//!
//! A [`Session`] moves a [`Dashboard`] into a single background task, the
//! only owner of dashboard state. That task multiplexes the periodic
//! telemetry tick, notification expiry timers and UI commands, handling one
//! at a time. After each handler it publishes a fresh snapshot on a watch
//! channel.
//!
//! Expiry timers live in a [`DelayQueue`]; the key returned for each posted
//! notification is its cancellation handle, removed on dismissal or eviction.

use std::collections::HashMap;
use std::future::poll_fn;

use log::{info, warn};
use rand::Rng;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::time::{delay_queue, DelayQueue};

use crate::dashboard::{Dashboard, DashboardEvent, DashboardSnapshot, OperatorCommand};
use crate::notify::{NotificationId, QueueChange};

#[derive(Debug)]
enum Command {
    ToggleFollow(String),
    ClearFollow,
    ToggleConnect(String),
    ConnectAll,
    ViewCompany(String),
    CloseCompanyView,
    Issue(OperatorCommand),
    Dismiss(NotificationId),
    Sync(oneshot::Sender<()>),
}

/// Handle to a running dashboard session.
///
/// Action methods never block; they queue a command for the session task.
/// Dropping the handle stops the session.
pub struct Session {
    command_tx: mpsc::UnboundedSender<Command>,
    snapshot_rx: watch::Receiver<DashboardSnapshot>,
    event_tx: broadcast::Sender<DashboardEvent>,
    cancel_token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Spawn the session task. Must be called from within a tokio runtime.
    ///
    /// The first tick fires one tick interval after spawning.
    #[must_use]
    pub fn spawn<R>(dashboard: Dashboard<R>) -> Self
    where
        R: Rng + Send + 'static,
    {
        let mut dashboard = dashboard;
        dashboard.enable_notification_changes();

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(dashboard.snapshot());
        let event_tx = dashboard.event_sender();
        let cancel_token = CancellationToken::new();

        let first_tick = Instant::now() + dashboard.tick_interval();
        let task_cancel = cancel_token.clone();
        let task = tokio::spawn(async move {
            session_loop(dashboard, first_tick, command_rx, snapshot_tx, task_cancel).await;
        });

        Self {
            command_tx,
            snapshot_rx,
            event_tx,
            cancel_token,
            task: Some(task),
        }
    }

    pub fn toggle_follow(&self, satellite_id: impl Into<String>) {
        self.send(Command::ToggleFollow(satellite_id.into()));
    }

    pub fn clear_follow(&self) {
        self.send(Command::ClearFollow);
    }

    pub fn toggle_connect(&self, company_id: impl Into<String>) {
        self.send(Command::ToggleConnect(company_id.into()));
    }

    pub fn connect_all(&self) {
        self.send(Command::ConnectAll);
    }

    pub fn select_company_for_view(&self, company_id: impl Into<String>) {
        self.send(Command::ViewCompany(company_id.into()));
    }

    pub fn close_company_view(&self) {
        self.send(Command::CloseCompanyView);
    }

    pub fn issue(&self, command: OperatorCommand) {
        self.send(Command::Issue(command));
    }

    pub fn dismiss(&self, id: NotificationId) {
        self.send(Command::Dismiss(id));
    }

    /// Wait until every command sent so far has been handled.
    pub async fn sync(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Command::Sync(ack_tx));
        // A closed channel means the session is gone; nothing left to wait for
        let _ = ack_rx.await;
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver that is notified whenever a new snapshot is published.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Subscribe to dashboard events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.event_tx.subscribe()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the session, cancelling the periodic tick.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    /// Wait for the session task to finish.
    pub async fn stopped(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Session task ended abnormally: {}", e);
            }
        }
    }

    fn send(&self, command: Command) {
        if let Err(e) = self.command_tx.send(command) {
            warn!("Session stopped, dropping {:?}", e.0);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn session_loop<R: Rng>(
    mut dashboard: Dashboard<R>,
    first_tick: Instant,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
    cancel_token: CancellationToken,
) {
    let period = dashboard.tick_interval();
    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut expiry: DelayQueue<NotificationId> = DelayQueue::new();
    let mut handles: HashMap<NotificationId, delay_queue::Key> = HashMap::new();
    // Notifications posted before spawn
    reconcile_expiry(&mut dashboard, &mut expiry, &mut handles);

    info!("Session started, ticking every {} ms", period.as_millis());

    loop {
        tokio::select! {
            biased;

            () = cancel_token.cancelled() => {
                info!("Session cancelled after {} ticks", dashboard.tick_count());
                return;
            }

            _ = ticker.tick() => dashboard.tick(),

            Some(expired) = poll_fn(|cx| expiry.poll_expired(cx)), if !expiry.is_empty() => {
                let id = expired.into_inner();
                handles.remove(&id);
                dashboard.expire(id);
            }

            command = command_rx.recv() => match command {
                Some(command) => handle_command(&mut dashboard, command),
                None => {
                    info!("All session handles dropped");
                    return;
                }
            },
        }

        reconcile_expiry(&mut dashboard, &mut expiry, &mut handles);
        snapshot_tx.send_replace(dashboard.snapshot());
    }
}

fn handle_command<R: Rng>(dashboard: &mut Dashboard<R>, command: Command) {
    match command {
        Command::ToggleFollow(id) => dashboard.toggle_follow(&id),
        Command::ClearFollow => dashboard.clear_follow(),
        Command::ToggleConnect(id) => dashboard.toggle_connect(&id),
        Command::ConnectAll => dashboard.connect_all(),
        Command::ViewCompany(id) => dashboard.select_company_for_view(&id),
        Command::CloseCompanyView => dashboard.close_company_view(),
        Command::Issue(operator) => dashboard.issue(operator),
        Command::Dismiss(id) => {
            dashboard.dismiss(id);
        }
        Command::Sync(ack) => {
            // Earlier commands were published at the end of their own iteration
            let _ = ack.send(());
        }
    }
}

/// Create expiry timers for new notifications and cancel those of removed ones.
fn reconcile_expiry<R: Rng>(
    dashboard: &mut Dashboard<R>,
    expiry: &mut DelayQueue<NotificationId>,
    handles: &mut HashMap<NotificationId, delay_queue::Key>,
) {
    for change in dashboard.take_notification_changes() {
        match change {
            QueueChange::Posted { id, lifetime } => {
                let key = expiry.insert(id, lifetime);
                handles.insert(id, key);
            }
            QueueChange::Removed { id, .. } => {
                if let Some(key) = handles.remove(&id) {
                    expiry.try_remove(&key);
                }
            }
        }
    }
}
