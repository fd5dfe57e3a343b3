// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

#[derive(Debug, Error, uniffi::Error)]
pub enum SdkConnectError {
    #[error("Storage error")]
    StorageError { msg: String },

    #[error("Key not found in storage")]
    StorageNotFound,

    #[error("Serialization error")]
    Serialization { msg: String },

    #[error("Invalid channel ID")]
    InvalidChannel { msg: String },

    #[error("Too many tracked connections")]
    TooManyConnections,
}
