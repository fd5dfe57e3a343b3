// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

#![forbid(unsafe_code)]

mod error;
mod persistence;
mod registry;
mod storage;
mod types;

pub use error::SdkConnectError;
pub use registry::{host_for_channel, ConnectionRegistry, DISABLED_SENTINEL, REMOTE_ORIGIN_PREFIX};
pub use storage::{PreferenceStorage, APPROVED_HOSTS_STORAGE_KEY, CONNECTIONS_STORAGE_KEY};
pub use types::Connection;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

uniffi::setup_scaffolding!();

/// Host approvals expire after seven days unless renewed.
pub const HOST_APPROVAL_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

const MAX_CHANNEL_ID_LENGTH: usize = 256;

/// Process-wide manager for SDK remote connections. Holds the session
/// registry behind a single lock and mirrors `approved_hosts` and
/// `connections` to the injected storage after every mutation.
#[derive(uniffi::Object)]
pub struct SdkConnect {
    registry: Mutex<ConnectionRegistry>,
    storage: Arc<dyn PreferenceStorage>,
}

#[uniffi::export]
impl SdkConnect {
    #[uniffi::constructor]
    pub fn new(storage: Arc<dyn PreferenceStorage>) -> Result<Self, SdkConnectError> {
        let registry = persistence::load_registry(&storage)?;
        Ok(Self {
            registry: Mutex::new(registry),
            storage,
        })
    }

    /// Revokes a channel and mirrors both persisted maps, unconditionally,
    /// even when the channel was never seen. Storage failures propagate
    /// after the in-memory mutation has already taken effect.
    pub fn invalidate_channel(&self, channel_id: String) -> Result<(), SdkConnectError> {
        validate_channel_id(&channel_id)?;
        let mut registry = self.lock_registry();
        registry.invalidate_channel(&channel_id);
        tracing::debug!(%channel_id, "invalidated channel");
        persistence::persist_approved_hosts(&self.storage, registry.approved_hosts())?;
        persistence::persist_connections(&self.storage, registry.connections())
    }

    pub fn begin_connecting(&self, channel_id: String) -> Result<(), SdkConnectError> {
        validate_channel_id(&channel_id)?;
        self.lock_registry().begin_connecting(&channel_id);
        Ok(())
    }

    pub fn establish_channel(
        &self,
        channel_id: String,
        origin: Option<String>,
    ) -> Result<(), SdkConnectError> {
        validate_channel_id(&channel_id)?;
        let mut registry = self.lock_registry();
        if !registry.establish_channel(&channel_id, origin, now_ms()) {
            return Err(SdkConnectError::TooManyConnections);
        }
        persistence::persist_connections(&self.storage, registry.connections())
    }

    pub fn approve_host(&self, channel_id: String) -> Result<(), SdkConnectError> {
        validate_channel_id(&channel_id)?;
        let mut registry = self.lock_registry();
        registry.approve_host(&channel_id, now_ms() + HOST_APPROVAL_TTL_MS);
        persistence::persist_approved_hosts(&self.storage, registry.approved_hosts())
    }

    pub fn disapprove_channel(&self, channel_id: String) -> Result<(), SdkConnectError> {
        validate_channel_id(&channel_id)?;
        let mut registry = self.lock_registry();
        registry.disapprove_channel(&channel_id);
        persistence::persist_approved_hosts(&self.storage, registry.approved_hosts())
    }

    pub fn remove_channel(&self, channel_id: String) -> Result<(), SdkConnectError> {
        validate_channel_id(&channel_id)?;
        let mut registry = self.lock_registry();
        registry.remove_channel(&channel_id);
        tracing::debug!(%channel_id, "removed channel");
        persistence::persist_approved_hosts(&self.storage, registry.approved_hosts())?;
        persistence::persist_connections(&self.storage, registry.connections())
    }

    pub fn remove_all_channels(&self) -> Result<(), SdkConnectError> {
        let mut registry = self.lock_registry();
        registry.remove_all();
        persistence::persist_approved_hosts(&self.storage, registry.approved_hosts())?;
        persistence::persist_connections(&self.storage, registry.connections())
    }

    pub fn is_approved(&self, channel_id: String) -> bool {
        self.lock_registry().is_approved(&channel_id, now_ms())
    }

    pub fn is_connecting(&self, channel_id: String) -> bool {
        self.lock_registry().is_connecting(&channel_id)
    }

    pub fn connection(&self, channel_id: String) -> Option<Connection> {
        self.lock_registry().connection(&channel_id).cloned()
    }

    pub fn connections(&self) -> HashMap<String, Connection> {
        self.lock_registry().connections().clone()
    }

    pub fn approved_hosts(&self) -> HashMap<String, i64> {
        self.lock_registry().approved_hosts().clone()
    }

    pub fn disabled_hosts(&self) -> HashMap<String, i64> {
        self.lock_registry().disabled_hosts().clone()
    }
}

impl SdkConnect {
    // The guard stays held across persistence writes: the four maps and the
    // durable mirror are observed consistently as a group.
    fn lock_registry(&self) -> MutexGuard<'_, ConnectionRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn validate_channel_id(channel_id: &str) -> Result<(), SdkConnectError> {
    if channel_id.is_empty() {
        return Err(SdkConnectError::InvalidChannel {
            msg: "Channel ID must not be empty".into(),
        });
    }
    if channel_id.len() > MAX_CHANNEL_ID_LENGTH {
        return Err(SdkConnectError::InvalidChannel {
            msg: "Channel ID exceeds maximum length".into(),
        });
    }
    Ok(())
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
