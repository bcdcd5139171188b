// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the thermostat skill.
//!
//! This module provides the error hierarchy shared by the orchestrator and
//! its collaborators: device reachability, mutation failures, hold
//! bookkeeping, protocol communication, parsing and value validation.

use thiserror::Error;

/// Sentence spoken when the thermostat cannot be reached.
pub const OFFLINE_MESSAGE: &str = "Sorry, the thermostat is offline at the moment.";

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The session reported the thermostat as offline.
    #[error("thermostat is unreachable")]
    DeviceUnreachable,

    /// The device was fetched but reported itself as not contactable.
    #[error("thermostat is not responding")]
    DeviceUnresponsive,

    /// The mutation strategy failed to apply a change.
    #[error("failed to {action}: {source}")]
    MutationFailed {
        /// What the orchestrator was trying to do.
        action: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The hold coordinator could not complete a request.
    #[error("hold coordinator failed: {0}")]
    HoldCoordinatorFailed(String),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The thermostat configuration is missing or invalid.
    #[error("invalid thermostat configuration: {0}")]
    Configuration(String),
}

impl Error {
    /// Wraps an error raised by the mutation strategy.
    pub(crate) fn mutation(action: &'static str, source: Error) -> Self {
        Self::MutationFailed {
            action,
            source: Box::new(source),
        }
    }

    /// Returns `true` for session-layer failures that mean the device is offline.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::DeviceUnreachable | Self::DeviceUnresponsive)
    }

    /// Returns a sentence suitable for reading back to the user.
    #[must_use]
    pub fn spoken(&self) -> &'static str {
        match self {
            Self::DeviceUnreachable | Self::DeviceUnresponsive => OFFLINE_MESSAGE,
            Self::MutationFailed { .. } => "Sorry, I couldn't change the thermostat settings.",
            Self::Configuration(_) => "Sorry, the thermostat has not been set up yet.",
            _ => "Sorry, something went wrong talking to the thermostat.",
        }
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An invalid heating status string was provided.
    #[error("invalid heating status: {0}")]
    InvalidHeatingStatus(String),

    /// An invalid away mode string was provided.
    #[error("invalid away mode: {0}")]
    InvalidAwayMode(String),

    /// An invalid hold state string was provided.
    #[error("invalid hold state: {0}")]
    InvalidHoldState(String),

    /// A duration string could not be understood.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

/// Errors related to protocol communication with the thermostat gateway.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the gateway failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to parsing gateway responses and configuration.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
