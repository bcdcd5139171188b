// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! REST thermostat gateway backend.
//!
//! The gateway exposes a small token-authenticated JSON API:
//!
//! | Method   | Path                               | Purpose                       |
//! |----------|------------------------------------|-------------------------------|
//! | `POST`   | `/api/session`                     | log in, returns `{"token"}`   |
//! | `GET`    | `/api/ping`                        | reachability check            |
//! | `GET`    | `/api/device`                      | current [`DeviceState`]       |
//! | `PUT`    | `/api/device/target-temperature`   | set target, returns state     |
//! | `PUT`    | `/api/device/away-mode`            | set away mode, returns state  |
//! | `DELETE` | `/api/session/{token}`             | log out                       |

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::backend::{DeviceDescriptor, MutationStrategy, Session, SessionProvider};
use crate::error::{ParseError, ProtocolError, Result};
use crate::state::DeviceState;
use crate::types::AwayMode;

// ============================================================================
// HttpConfig
// ============================================================================

/// Connection settings for a thermostat gateway.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use thermostat_skill::backend::HttpConfig;
///
/// let config = HttpConfig::new("192.168.1.40")
///     .with_port(8080)
///     .with_credentials("skill", "secret")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://192.168.1.40:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
    descriptor: DeviceDescriptor,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the gateway at `host`.
    ///
    /// A `http://` or `https://` prefix is honoured, and a `:port` suffix
    /// overrides the default port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        let (use_https, rest) = if let Some(rest) = host.strip_prefix("https://") {
            (true, rest.to_string())
        } else if let Some(rest) = host.strip_prefix("http://") {
            (false, rest.to_string())
        } else {
            (false, host)
        };
        let rest = rest.trim_end_matches('/');

        let default_port = if use_https {
            Self::DEFAULT_HTTPS_PORT
        } else {
            Self::DEFAULT_PORT
        };
        // A bare IPv6 address has several colons and no port.
        let bare_ipv6 = !rest.starts_with('[') && rest.matches(':').count() > 1;
        let (host, port) = match rest.rsplit_once(':').filter(|_| !bare_ipv6) {
            Some((h, p)) => match p.parse::<u16>() {
                Ok(port) => (h, port),
                Err(_) => (rest, default_port),
            },
            None => (rest, default_port),
        };
        let host = host.trim_start_matches('[').trim_end_matches(']').to_string();

        Self {
            host,
            port,
            use_https,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
            descriptor: DeviceDescriptor::default(),
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If port hasn't been explicitly set, it will be changed to 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the description reported for the device.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: DeviceDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix =
            if (self.use_https && self.port == 443) || (!self.use_https && self.port == 80) {
                String::new()
            } else {
                format!(":{}", self.port)
            };
        if self.host.contains(':') {
            format!("{scheme}://[{}]{port_suffix}", self.host)
        } else {
            format!("{scheme}://{}{port_suffix}", self.host)
        }
    }

    /// Creates a session provider from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn into_provider(self) -> std::result::Result<HttpSessionProvider, ProtocolError> {
        if self.host.is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpSessionProvider {
            base_url: self.base_url(),
            client,
            credentials: self.credentials,
            timeout: self.timeout,
            descriptor: self.descriptor,
        })
    }
}

// ============================================================================
// Session provider
// ============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Opens token sessions against a thermostat gateway.
#[derive(Debug, Clone)]
pub struct HttpSessionProvider {
    base_url: String,
    client: Client,
    credentials: Option<(String, String)>,
    timeout: Duration,
    descriptor: DeviceDescriptor,
}

impl HttpSessionProvider {
    /// Returns the gateway base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SessionProvider for HttpSessionProvider {
    type Session = HttpSession;

    async fn login(&self) -> Result<HttpSession> {
        let url = format!("{}/api/session", self.base_url);
        tracing::debug!(url = %url, "Logging in to thermostat gateway");

        let (username, password) = self
            .credentials
            .as_ref()
            .map_or(("", ""), |(u, p)| (u.as_str(), p.as_str()));
        let request = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password });

        let body = send(request, self.timeout).await?;
        let login: LoginResponse = serde_json::from_str(&body).map_err(ParseError::Json)?;
        let token = login
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ParseError::MissingField("token".to_string()))?;

        Ok(HttpSession {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            token,
            timeout: self.timeout,
        })
    }

    fn descriptor(&self) -> DeviceDescriptor {
        self.descriptor.clone()
    }
}

// ============================================================================
// Session
// ============================================================================

/// An open gateway session.
#[derive(Debug)]
pub struct HttpSession {
    base_url: String,
    client: Client,
    token: String,
    timeout: Duration,
}

impl HttpSession {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn put_state<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<DeviceState> {
        let url = self.url(path);
        tracing::debug!(url = %url, "Updating thermostat");
        let request = self.client.put(&url).bearer_auth(&self.token).json(body);
        let body = send(request, self.timeout).await?;
        parse_state(&body)
    }
}

impl Session for HttpSession {
    async fn online(&self) -> bool {
        let request = self.client.get(self.url("/api/ping")).bearer_auth(&self.token);
        match send(request, self.timeout).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Thermostat gateway ping failed");
                false
            }
        }
    }

    async fn device(&self) -> Result<DeviceState> {
        let request = self.client.get(self.url("/api/device")).bearer_auth(&self.token);
        let body = send(request, self.timeout).await?;
        parse_state(&body)
    }

    async fn logout(self) -> Result<()> {
        let url = self.url(&format!(
            "/api/session/{}",
            urlencoding::encode(&self.token)
        ));
        tracing::debug!("Logging out of thermostat gateway");
        send(self.client.delete(&url), self.timeout).await?;
        Ok(())
    }
}

// ============================================================================
// Mutation strategy
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetTemperatureRequest {
    target_temperature: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AwayModeRequest {
    away_mode: AwayMode,
}

/// Applies changes directly through the gateway's device endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpMutation;

impl MutationStrategy<HttpSession> for HttpMutation {
    async fn set_temperature(&self, session: &HttpSession, target: f64) -> Result<DeviceState> {
        session
            .put_state(
                "/api/device/target-temperature",
                &TargetTemperatureRequest {
                    target_temperature: target,
                },
            )
            .await
    }

    async fn set_away_mode(&self, session: &HttpSession, mode: AwayMode) -> Result<DeviceState> {
        session
            .put_state("/api/device/away-mode", &AwayModeRequest { away_mode: mode })
            .await
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn send(
    request: RequestBuilder,
    timeout: Duration,
) -> std::result::Result<String, ProtocolError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            // Safe: configured timeouts never approach u64::MAX milliseconds
            #[allow(clippy::cast_possible_truncation)]
            let timeout_ms = timeout.as_millis() as u64;
            ProtocolError::Timeout(timeout_ms)
        } else {
            ProtocolError::Http(e)
        }
    })?;

    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(ProtocolError::AuthenticationFailed);
    }

    if !response.status().is_success() {
        return Err(ProtocolError::ConnectionFailed(format!(
            "HTTP {} - {}",
            response.status().as_u16(),
            response.status().canonical_reason().unwrap_or("Unknown")
        )));
    }

    let body = response.text().await.map_err(ProtocolError::Http)?;
    tracing::trace!(body = %body, "Received gateway response");
    Ok(body)
}

fn parse_state(body: &str) -> Result<DeviceState> {
    serde_json::from_str(body)
        .map_err(ParseError::Json)
        .map_err(Into::into)
}
