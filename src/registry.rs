// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::types::Connection;

pub const REMOTE_ORIGIN_PREFIX: &str = "SDKREMOTE::";

/// Approval value under `disabled_hosts` marking a host as explicitly
/// revoked, distinct from never having been granted trust at all.
pub const DISABLED_SENTINEL: i64 = 0;

/// Derives the trust-bookkeeping host key for a channel.
#[uniffi::export]
pub fn host_for_channel(channel_id: &str) -> String {
    format!("{REMOTE_ORIGIN_PREFIX}{channel_id}")
}

/// In-memory session and trust state for SDK remote connections.
///
/// Owns four maps: active connection records and connecting flags keyed by
/// channel id, plus approval timestamps and revocation markers keyed by the
/// derived host. `approved_hosts` and `connections` are mirrored to durable
/// storage by the caller after every mutation.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, Connection>,
    connecting: HashSet<String>,
    approved_hosts: HashMap<String, i64>,
    disabled_hosts: HashMap<String, i64>,
}

impl ConnectionRegistry {
    pub const MAX_TRACKED_CONNECTIONS: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_persisted(
        approved_hosts: HashMap<String, i64>,
        connections: HashMap<String, Connection>,
    ) -> Self {
        Self {
            connections,
            connecting: HashSet::new(),
            approved_hosts,
            disabled_hosts: HashMap::new(),
        }
    }

    /// Revokes a channel: marks its host disabled, drops any trust grant,
    /// and tears down connecting/connection bookkeeping. Safe to call for
    /// unknown or already-invalidated channels; calling twice leaves the
    /// same end state as calling once.
    pub fn invalidate_channel(&mut self, channel_id: &str) {
        let host = host_for_channel(channel_id);
        self.disabled_hosts.insert(host.clone(), DISABLED_SENTINEL);
        self.approved_hosts.remove(&host);
        self.connecting.remove(channel_id);
        self.connections.remove(channel_id);
    }

    pub fn begin_connecting(&mut self, channel_id: &str) {
        self.connecting.insert(channel_id.to_string());
    }

    /// Clears the connecting flag and creates or re-authorizes the
    /// connection record. Returns false when the registry is full and
    /// evicting expired entries did not free a slot.
    pub fn establish_channel(
        &mut self,
        channel_id: &str,
        origin: Option<String>,
        now_ms: i64,
    ) -> bool {
        if !self.ensure_capacity(channel_id, now_ms) {
            return false;
        }
        self.connecting.remove(channel_id);
        match self.connections.entry(channel_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let connection = entry.get_mut();
                connection.last_authorized = now_ms;
                if origin.is_some() {
                    connection.origin = origin;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Connection {
                    id: channel_id.to_string(),
                    last_authorized: now_ms,
                    origin,
                });
            }
        }
        true
    }

    /// Grants trust to the channel's host until `approved_until`, clearing
    /// any explicit revocation marker.
    pub fn approve_host(&mut self, channel_id: &str, approved_until: i64) {
        let host = host_for_channel(channel_id);
        self.disabled_hosts.remove(&host);
        self.approved_hosts.insert(host, approved_until);
    }

    pub fn disapprove_channel(&mut self, channel_id: &str) {
        self.approved_hosts.remove(&host_for_channel(channel_id));
    }

    /// Full forget: drops the channel from all four maps, including any
    /// disabled marker. Unlike invalidation, nothing records that the host
    /// was ever seen.
    pub fn remove_channel(&mut self, channel_id: &str) {
        let host = host_for_channel(channel_id);
        self.approved_hosts.remove(&host);
        self.disabled_hosts.remove(&host);
        self.connecting.remove(channel_id);
        self.connections.remove(channel_id);
    }

    pub fn remove_all(&mut self) {
        self.connections.clear();
        self.connecting.clear();
        self.approved_hosts.clear();
        self.disabled_hosts.clear();
    }

    pub fn is_approved(&self, channel_id: &str, now_ms: i64) -> bool {
        let host = host_for_channel(channel_id);
        if self.disabled_hosts.contains_key(&host) {
            return false;
        }
        self.approved_hosts
            .get(&host)
            .is_some_and(|until| *until > now_ms)
    }

    pub fn is_connecting(&self, channel_id: &str) -> bool {
        self.connecting.contains(channel_id)
    }

    pub fn connection(&self, channel_id: &str) -> Option<&Connection> {
        self.connections.get(channel_id)
    }

    pub fn connections(&self) -> &HashMap<String, Connection> {
        &self.connections
    }

    pub fn approved_hosts(&self) -> &HashMap<String, i64> {
        &self.approved_hosts
    }

    pub fn disabled_hosts(&self) -> &HashMap<String, i64> {
        &self.disabled_hosts
    }

    fn ensure_capacity(&mut self, channel_id: &str, now_ms: i64) -> bool {
        if self.connections.len() < Self::MAX_TRACKED_CONNECTIONS
            || self.connections.contains_key(channel_id)
        {
            return true;
        }
        self.evict_expired(now_ms);
        self.connections.len() < Self::MAX_TRACKED_CONNECTIONS
    }

    fn evict_expired(&mut self, now_ms: i64) {
        let stale: Vec<String> = self
            .connections
            .keys()
            .filter(|id| {
                self.approved_hosts
                    .get(&host_for_channel(id))
                    .is_some_and(|until| *until <= now_ms)
            })
            .cloned()
            .collect();
        for id in stale {
            self.approved_hosts.remove(&host_for_channel(&id));
            self.connections.remove(&id);
        }
    }
}
