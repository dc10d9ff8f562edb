//! Connection configuration handed to the engine at client creation.
//!
//! The config is serialized to JSON and crosses the boundary as one byte
//! buffer; the engine owns every knob below (reconnect pacing, TLS, initial
//! subscriptions) — this layer only validates and forwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 6379;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeAddress {
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password: String,
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Exponential backoff parameters forwarded to the engine's reconnect loop.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconnectStrategy {
    pub retries: u32,
    pub factor: u32,
    pub exponent_base: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionMode {
    Exact,
    Pattern,
    Sharded,
}

/// A channel the engine subscribes to on connect and after reconnects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub mode: SubscriptionMode,
    pub channel: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    pub addresses: Vec<NodeAddress>,
    #[serde(default)]
    pub cluster_mode: bool,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Standalone only; incompatible with `cluster_mode`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect: Option<ReconnectStrategy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscriptions: Vec<Subscription>,
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.addresses.push(NodeAddress::new(host, port));
        self
    }

    pub fn cluster_mode(mut self, enabled: bool) -> Self {
        self.cluster_mode = enabled;
        self
    }

    pub fn use_tls(mut self, enabled: bool) -> Self {
        self.use_tls = enabled;
        self
    }

    pub fn credentials(mut self, username: Option<&str>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.map(str::to_string),
            password: password.into(),
        });
        self
    }

    pub fn database_id(mut self, id: u32) -> Self {
        self.database_id = Some(id);
        self
    }

    pub fn request_timeout_ms(mut self, timeout: u32) -> Self {
        self.request_timeout_ms = Some(timeout);
        self
    }

    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn reconnect(mut self, strategy: ReconnectStrategy) -> Self {
        self.reconnect = Some(strategy);
        self
    }

    pub fn subscribe(mut self, mode: SubscriptionMode, channel: impl Into<String>) -> Self {
        self.subscriptions.push(Subscription {
            mode,
            channel: channel.into(),
        });
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.addresses.is_empty() {
            return Err(Error::Config("at least one address is required".into()));
        }
        if self.cluster_mode && self.database_id.is_some() {
            return Err(Error::Config(
                "database_id cannot be combined with cluster_mode".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_payload(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| Error::Config(err.to_string()))
    }
}
