// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::SdkConnectError;
use crate::registry::ConnectionRegistry;
use crate::storage::{PreferenceStorage, APPROVED_HOSTS_STORAGE_KEY, CONNECTIONS_STORAGE_KEY};
use crate::types::Connection;

pub(crate) fn load_registry(
    storage: &Arc<dyn PreferenceStorage>,
) -> Result<ConnectionRegistry, SdkConnectError> {
    let approved_hosts = load_map(storage, APPROVED_HOSTS_STORAGE_KEY)?;
    let connections = load_map(storage, CONNECTIONS_STORAGE_KEY)?;
    Ok(ConnectionRegistry::with_persisted(approved_hosts, connections))
}

pub(crate) fn persist_approved_hosts(
    storage: &Arc<dyn PreferenceStorage>,
    approved_hosts: &HashMap<String, i64>,
) -> Result<(), SdkConnectError> {
    let data =
        serde_json::to_string(approved_hosts).map_err(|e| SdkConnectError::Serialization {
            msg: format!("Failed to serialize approved hosts: {e}"),
        })?;
    storage.set(APPROVED_HOSTS_STORAGE_KEY.into(), data)
}

pub(crate) fn persist_connections(
    storage: &Arc<dyn PreferenceStorage>,
    connections: &HashMap<String, Connection>,
) -> Result<(), SdkConnectError> {
    let data = serde_json::to_string(connections).map_err(|e| SdkConnectError::Serialization {
        msg: format!("Failed to serialize connections: {e}"),
    })?;
    storage.set(CONNECTIONS_STORAGE_KEY.into(), data)
}

// Corrupt blobs are discarded; adapter read failures propagate.
fn load_map<T: DeserializeOwned>(
    storage: &Arc<dyn PreferenceStorage>,
    key: &str,
) -> Result<HashMap<String, T>, SdkConnectError> {
    let data = match storage.get(key.into()) {
        Ok(Some(data)) => data,
        Ok(None) | Err(SdkConnectError::StorageNotFound) => return Ok(HashMap::new()),
        Err(e) => return Err(e),
    };
    match serde_json::from_str(&data) {
        Ok(map) => Ok(map),
        Err(e) => {
            tracing::warn!("Discarding corrupt persisted map under {key}: {e}");
            Ok(HashMap::new())
        }
    }
}
