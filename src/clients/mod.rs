//! Outbound HTTP clients.
//!
//! # Responsibilities
//! - Compute each client's base address from settings, once
//! - Hand out named, shareable clients to the rest of the application
//!
//! # Design Decisions
//! - One long-lived `reqwest::Client` per logical name (pooled, cheap to clone)
//! - Base address is fixed at registration, never per request
//! - Unknown or duplicate names are startup errors

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::config::ModelApiSettings;

/// Logical name of the model API client.
pub const MODEL_API_CLIENT: &str = "model-api";

/// Error type for client registration and lookup.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base address '{address}' for client '{name}': {source}")]
    InvalidBaseAddress {
        name: String,
        address: String,
        source: url::ParseError,
    },

    #[error("failed to build HTTP client '{name}': {source}")]
    Build { name: String, source: reqwest::Error },

    #[error("client '{0}' is already registered")]
    Duplicate(String),

    #[error("no client registered under '{0}'")]
    Unknown(String),
}

/// An outbound client bound to one logical name and base address.
#[derive(Debug, Clone)]
pub struct NamedClient {
    name: String,
    base_url: Url,
    client: reqwest::Client,
}

impl NamedClient {
    /// Build a client for `host:port`. Hosts without a scheme get `http://`.
    pub fn new(name: &str, settings: &ModelApiSettings) -> Result<Self, ClientError> {
        let address = base_address(&settings.host, settings.port);
        let base_url = Url::parse(&address).map_err(|source| ClientError::InvalidBaseAddress {
            name: name.to_string(),
            address: address.clone(),
            source,
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("toolkeeper-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Build {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.to_string(),
            base_url,
            client,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base address.
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    /// Start a GET request for `path`, relative to the base address.
    pub fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, url::ParseError> {
        Ok(self.client.get(self.url(path)?))
    }
}

fn base_address(host: &str, port: u16) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        format!("{}:{}", host, port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

/// Registry of named clients, built once during composition.
#[derive(Debug, Clone, Default)]
pub struct HttpClientFactory {
    clients: HashMap<String, NamedClient>,
}

impl HttpClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under `name`.
    pub fn register(&mut self, name: &str, settings: &ModelApiSettings) -> Result<&NamedClient, ClientError> {
        if self.clients.contains_key(name) {
            return Err(ClientError::Duplicate(name.to_string()));
        }

        let client = NamedClient::new(name, settings)?;
        tracing::debug!(client = name, base_url = %client.base_url, "Registered outbound client");

        Ok(self.clients.entry(name.to_string()).or_insert(client))
    }

    /// Look up a client by name.
    pub fn client(&self, name: &str) -> Result<NamedClient, ClientError> {
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::Unknown(name.to_string()))
    }
}
