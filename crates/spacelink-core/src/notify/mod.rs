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

//! Capacity-bounded, self-expiring notification queue.
//!
//! Newest notifications come first. Inserting beyond capacity drops the
//! oldest immediately. Each notification also carries a deadline; whoever
//! drives time (the session's delay queue, or a frame loop calling
//! [`NotificationQueue::prune_expired`]) removes it once the deadline passes.
//! Every removal path is idempotent.
//!
//! All insertions and removals are recorded as [`QueueChange`]s so the driver
//! can create and cancel its expiry handles.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of notifications kept.
pub const DEFAULT_CAPACITY: usize = 5;

/// Default time a notification stays up.
pub const DEFAULT_LIFETIME: Duration = Duration::from_millis(5000);

/// Unique, monotonically increasing notification id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Why a notification left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalReason {
    /// Pushed out by a newer notification.
    Evicted,
    Dismissed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueChange {
    Posted {
        id: NotificationId,
        lifetime: Duration,
    },
    Removed {
        id: NotificationId,
        reason: RemovalReason,
    },
}

/// Result of [`NotificationQueue::enqueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enqueued {
    pub id: NotificationId,
    /// Ids dropped to stay within capacity.
    pub evicted: Vec<NotificationId>,
}

#[derive(Debug)]
pub struct NotificationQueue {
    entries: VecDeque<Notification>,
    capacity: usize,
    lifetime: Duration,
    next_id: u64,
    // `None` until a consumer opts in with `enable_change_log`
    changes: Option<Vec<QueueChange>>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_LIFETIME)
    }
}

impl NotificationQueue {
    #[must_use]
    pub fn new(capacity: usize, lifetime: Duration) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY) + 1),
            capacity,
            lifetime,
            next_id: 1,
            changes: None,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Notifications, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    /// Post a notification at the front, dropping the oldest beyond capacity.
    pub fn enqueue(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> Enqueued {
        let id = NotificationId(self.next_id);
        self.next_id += 1;

        let expires_at = chrono::Duration::from_std(self.lifetime)
            .ok()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.push_front(Notification {
            id,
            message: message.into(),
            severity,
            created_at: now,
            expires_at,
        });
        self.record(QueueChange::Posted {
            id,
            lifetime: self.lifetime,
        });

        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.entries.pop_back() {
                evicted.push(oldest.id);
                self.record(QueueChange::Removed {
                    id: oldest.id,
                    reason: RemovalReason::Evicted,
                });
            }
        }

        Enqueued { id, evicted }
    }

    /// Remove a notification at the user's request. No-op if already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        self.remove(id, RemovalReason::Dismissed)
    }

    /// Remove a notification whose timer fired. No-op if already gone.
    pub fn expire(&mut self, id: NotificationId) -> bool {
        self.remove(id, RemovalReason::Expired)
    }

    /// Remove every notification whose deadline is at or before `now`.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> Vec<NotificationId> {
        let expired: Vec<_> = self
            .entries
            .iter()
            .filter(|n| n.expires_at <= now)
            .map(|n| n.id)
            .collect();

        for id in &expired {
            self.remove(*id, RemovalReason::Expired);
        }

        expired
    }

    /// Start recording queue changes for [`take_changes`](Self::take_changes).
    ///
    /// Notifications already live are logged as posted with whatever lifetime
    /// they have left at `now`. Calling this again has no effect.
    pub fn enable_change_log(&mut self, now: DateTime<Utc>) {
        if self.changes.is_some() {
            return;
        }

        let pending = self
            .entries
            .iter()
            .rev()
            .map(|n| QueueChange::Posted {
                id: n.id,
                lifetime: (n.expires_at - now).to_std().unwrap_or(Duration::ZERO),
            })
            .collect();
        self.changes = Some(pending);
    }

    #[must_use]
    pub fn is_change_log_enabled(&self) -> bool {
        self.changes.is_some()
    }

    /// Drain the change log accumulated since the last call.
    ///
    /// Always empty unless [`enable_change_log`](Self::enable_change_log) was called.
    pub fn take_changes(&mut self) -> Vec<QueueChange> {
        self.changes.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn record(&mut self, change: QueueChange) {
        if let Some(changes) = &mut self.changes {
            changes.push(change);
        }
    }

    fn remove(&mut self, id: NotificationId, reason: RemovalReason) -> bool {
        let Some(pos) = self.entries.iter().position(|n| n.id == id) else {
            return false;
        };
        self.entries.remove(pos);
        self.record(QueueChange::Removed { id, reason });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 23, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_newest_first() {
        let mut queue = NotificationQueue::default();
        queue.enqueue("first", Severity::Info, t0());
        queue.enqueue("second", Severity::Success, t0());

        let messages: Vec<_> = queue.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn test_capacity_bound() {
        let mut queue = NotificationQueue::default();
        for i in 0..12 {
            queue.enqueue(format!("n{i}"), Severity::Info, t0());
            assert!(queue.len() <= DEFAULT_CAPACITY);
        }

        let messages: Vec<_> = queue.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["n11", "n10", "n9", "n8", "n7"]);
    }

    #[test]
    fn test_eviction_reported() {
        let mut queue = NotificationQueue::new(2, DEFAULT_LIFETIME);
        queue.enable_change_log(t0());
        let a = queue.enqueue("a", Severity::Info, t0());
        queue.enqueue("b", Severity::Info, t0());
        assert_eq!(queue.take_changes().len(), 2);

        let c = queue.enqueue("c", Severity::Warning, t0());
        assert_eq!(c.evicted, vec![a.id]);
        assert_eq!(
            queue.take_changes(),
            vec![
                QueueChange::Posted {
                    id: c.id,
                    lifetime: DEFAULT_LIFETIME
                },
                QueueChange::Removed {
                    id: a.id,
                    reason: RemovalReason::Evicted
                },
            ]
        );

        // The evicted id's timer firing later is harmless
        assert!(!queue.expire(a.id));
        assert!(queue.take_changes().is_empty());
    }

    #[test]
    fn test_ids_unique_within_burst() {
        let mut queue = NotificationQueue::default();
        let ids: Vec<_> = (0..5)
            .map(|_| queue.enqueue("same instant", Severity::Success, t0()).id)
            .collect();
        let mut sorted = ids.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_dismiss_idempotent() {
        let mut queue = NotificationQueue::default();
        let posted = queue.enqueue("bye", Severity::Info, t0());

        assert!(queue.dismiss(posted.id));
        assert!(!queue.dismiss(posted.id));
        assert!(!queue.expire(posted.id));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_prune_expired() {
        let mut queue = NotificationQueue::default();
        let early = queue.enqueue("early", Severity::Info, t0());
        let late = queue.enqueue("late", Severity::Info, t0() + chrono::Duration::seconds(3));

        assert_eq!(
            queue.get(early.id).unwrap().expires_at,
            t0() + chrono::Duration::seconds(5)
        );

        assert!(queue.prune_expired(t0() + chrono::Duration::milliseconds(4999)).is_empty());
        assert_eq!(queue.prune_expired(t0() + chrono::Duration::seconds(5)), vec![early.id]);
        assert_eq!(queue.len(), 1);
        assert!(queue.get(late.id).is_some());

        assert_eq!(queue.prune_expired(t0() + chrono::Duration::seconds(8)), vec![late.id]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_change_log_off_by_default() {
        let mut queue = NotificationQueue::default();
        for i in 0..10_000 {
            let now = t0() + chrono::Duration::milliseconds(i);
            queue.enqueue("connected", Severity::Success, now);
            queue.prune_expired(now);
        }

        assert_eq!(queue.len(), DEFAULT_CAPACITY);
        assert!(!queue.is_change_log_enabled());
        assert!(queue.take_changes().is_empty());
    }

    #[test]
    fn test_enable_change_log_reports_live_entries() {
        let mut queue = NotificationQueue::default();
        let first = queue.enqueue("first", Severity::Info, t0());
        let second = queue.enqueue("second", Severity::Info, t0() + chrono::Duration::seconds(1));

        queue.enable_change_log(t0() + chrono::Duration::seconds(2));
        assert_eq!(
            queue.take_changes(),
            vec![
                QueueChange::Posted {
                    id: first.id,
                    lifetime: Duration::from_secs(3)
                },
                QueueChange::Posted {
                    id: second.id,
                    lifetime: Duration::from_secs(4)
                },
            ]
        );

        // A second call does not replay the live entries
        queue.enable_change_log(t0() + chrono::Duration::seconds(2));
        assert!(queue.take_changes().is_empty());

        assert!(queue.dismiss(first.id));
        assert_eq!(
            queue.take_changes(),
            vec![QueueChange::Removed {
                id: first.id,
                reason: RemovalReason::Dismissed
            }]
        );
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut queue = NotificationQueue::new(usize::MAX, DEFAULT_LIFETIME);
        queue.enqueue("only", Severity::Info, t0());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.capacity(), usize::MAX);
    }
}
