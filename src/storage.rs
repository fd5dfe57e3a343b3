// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::SdkConnectError;

pub const APPROVED_HOSTS_STORAGE_KEY: &str = "sdk.approved_hosts";
pub const CONNECTIONS_STORAGE_KEY: &str = "sdk.connections";

/// Key/value store supplied by the host application. Values written under a
/// key must be retrievable by a later `get` once `set` has returned.
#[uniffi::export(with_foreign)]
pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: String) -> Result<Option<String>, SdkConnectError>;
    fn set(&self, key: String, value: String) -> Result<(), SdkConnectError>;
}
