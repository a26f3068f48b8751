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

//! Follow, connection and company-view state.
//!
//! These are plain id toggles. Callers check ids against the catalog first;
//! nothing here knows about names or notifications.

use std::collections::BTreeSet;

/// What a follow toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowChange {
    Started,
    Stopped,
}

/// What a connection toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectChange {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    followed: Option<String>,
    connections: BTreeSet<String>,
    viewed: Option<String>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn followed(&self) -> Option<&str> {
        self.followed.as_deref()
    }

    #[must_use]
    pub fn connections(&self) -> &BTreeSet<String> {
        &self.connections
    }

    #[must_use]
    pub fn is_connected(&self, company_id: &str) -> bool {
        self.connections.contains(company_id)
    }

    #[must_use]
    pub fn viewed(&self) -> Option<&str> {
        self.viewed.as_deref()
    }

    /// Follow `id`, or stop following it if it is already followed.
    pub fn toggle_follow(&mut self, id: &str) -> FollowChange {
        if self.followed.as_deref() == Some(id) {
            self.followed = None;
            FollowChange::Stopped
        } else {
            self.followed = Some(id.to_string());
            FollowChange::Started
        }
    }

    /// Stop following whatever is followed. Returns the id that was followed.
    pub fn clear_follow(&mut self) -> Option<String> {
        self.followed.take()
    }

    /// Symmetric-difference toggle of `company_id` in the connection set.
    pub fn toggle_connect(&mut self, company_id: &str) -> ConnectChange {
        if self.connections.remove(company_id) {
            ConnectChange::Disconnected
        } else {
            self.connections.insert(company_id.to_string());
            ConnectChange::Connected
        }
    }

    /// Set the viewed company. Returns false if it was already viewed.
    pub fn view(&mut self, company_id: &str) -> bool {
        if self.viewed.as_deref() == Some(company_id) {
            return false;
        }
        self.viewed = Some(company_id.to_string());
        true
    }

    pub fn close_view(&mut self) -> Option<String> {
        self.viewed.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_connect_is_involution() {
        let mut selection = Selection::new();
        selection.toggle_connect("esa");
        let before = selection.clone();

        assert_eq!(selection.toggle_connect("spacex"), ConnectChange::Connected);
        assert!(selection.is_connected("spacex"));
        assert_eq!(selection.toggle_connect("spacex"), ConnectChange::Disconnected);
        assert_eq!(selection, before);
    }

    #[test]
    fn test_toggle_follow_is_involution() {
        let mut selection = Selection::new();
        assert_eq!(selection.toggle_follow("SAT-001"), FollowChange::Started);
        assert_eq!(selection.followed(), Some("SAT-001"));
        assert_eq!(selection.toggle_follow("SAT-001"), FollowChange::Stopped);
        assert_eq!(selection.followed(), None);
    }

    #[test]
    fn test_follow_switches_target() {
        let mut selection = Selection::new();
        selection.toggle_follow("SAT-001");
        assert_eq!(selection.toggle_follow("SAT-002"), FollowChange::Started);
        assert_eq!(selection.followed(), Some("SAT-002"));
        assert_eq!(selection.clear_follow().as_deref(), Some("SAT-002"));
        assert_eq!(selection.clear_follow(), None);
    }

    #[test]
    fn test_view_is_not_a_toggle() {
        let mut selection = Selection::new();
        assert!(selection.view("oneweb"));
        assert!(!selection.view("oneweb"));
        assert_eq!(selection.viewed(), Some("oneweb"));
        assert!(selection.view("esa"));
        assert_eq!(selection.close_view().as_deref(), Some("esa"));
        assert_eq!(selection.viewed(), None);
    }
}
