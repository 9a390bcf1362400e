//! Configuration management for the RRP client
//!
//! This module provides utilities for loading and validating the client
//! configuration, with support for environment variables. The endpoint URL is
//! supplied once, when the dispatcher is built; there is no per-call override.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::util::parse_duration;

/// Source of raw string settings
pub trait ConfigProvider: Send + Sync {
    /// Look up `key`, failing with a configuration error when it is absent
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Typed lookups on top of [`ConfigProvider`]
pub trait ConfigProviderExt: ConfigProvider {
    /// `None` when the key is absent
    fn get_optional(&self, key: &str) -> Option<String> {
        self.get_string(key).ok()
    }

    /// Parse the value with [`FromStr`]
    fn get_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get_string(key)?;
        raw.trim()
            .parse::<T>()
            .map_err(|e| ClientError::configuration(format!("Invalid value {:?} for key {}: {}", raw, key, e)))
    }

    fn get_int(&self, key: &str) -> Result<i64> {
        self.get_parsed(key)
    }

    /// Accepts true/false, yes/no, on/off and 1/0
    fn get_bool(&self, key: &str) -> Result<bool> {
        let raw = self.get_string(key)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(ClientError::configuration(format!("Invalid boolean {:?} for key {}", raw, key))),
        }
    }

    /// Durations such as `30s` or `500ms`
    fn get_duration(&self, key: &str) -> Result<Duration> {
        let raw = self.get_string(key)?;
        parse_duration(&raw)
            .ok_or_else(|| ClientError::configuration(format!("Invalid duration {:?} for key {}", raw, key)))
    }

    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_optional(key).unwrap_or_else(|| default.to_string())
    }

    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Reads settings from environment variables.
///
/// Key `user-agent` with prefix `RRP` is looked up as `RRP_USER_AGENT`.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `<prefix>_` to every variable name
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    fn variable_name(&self, key: &str) -> String {
        let key: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();

        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key),
            None => key,
        }
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let name = self.variable_name(key);
        env::var(&name).map_err(|e| match e {
            env::VarError::NotPresent => {
                ClientError::configuration(format!("Environment variable not set: {}", name))
            }
            env::VarError::NotUnicode(_) => {
                ClientError::configuration(format!("Environment variable is not valid unicode: {}", name))
            }
        })
    }
}

/// Fixed in-memory settings, mostly for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        match self.values.get(key) {
            Some(value) => Ok(value.clone()),
            None => Err(ClientError::configuration(format!("Configuration key not found: {}", key))),
        }
    }
}

/// Asks several providers in turn; the first one knowing a key wins.
#[derive(Clone, Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Arc<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_provider`](Self::add_provider)
    pub fn with_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.add_provider(Arc::new(provider));
        self
    }

    /// Consult `provider` after all providers added so far
    pub fn add_provider(&mut self, provider: Arc<dyn ConfigProvider>) {
        self.providers.push(provider);
    }
}

impl ConfigProvider for CompositeConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        for provider in &self.providers {
            if let Ok(value) = provider.get_string(key) {
                return Ok(value);
            }
        }
        Err(ClientError::configuration(format!("Configuration key not found in any provider: {}", key)))
    }
}

/// Provider used by [`ClientConfig::from_env`], reading `RRP_*` variables
pub static DEFAULT_PROVIDER: Lazy<Arc<EnvConfigProvider>> =
    Lazy::new(|| Arc::new(EnvConfigProvider::new().with_prefix("RRP")));

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings of a dispatcher and its HTTP transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL of the request/response WebApi endpoint
    pub url: String,

    /// HTTP request timeout
    pub timeout: Duration,

    /// User agent override
    pub user_agent: Option<String>,

    /// Accept gzip-compressed responses
    pub compression: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            compression: true,
        }
    }
}

impl ClientConfig {
    /// Configuration for the given endpoint with default settings
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let url = provider.get_string("url")?;
        let timeout = match provider.get_optional("timeout") {
            Some(_) => provider.get_duration("timeout")?,
            None => DEFAULT_TIMEOUT,
        };
        let user_agent = provider.get_optional("user_agent");
        let compression = match provider.get_optional("compression") {
            Some(_) => provider.get_bool("compression")?,
            None => true,
        };

        let config = Self {
            url,
            timeout,
            user_agent,
            compression,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `RRP_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }

    /// Validate this configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ClientError::configuration("Endpoint URL is required"));
        }

        let parsed = url::Url::parse(&self.url)
            .map_err(|e| ClientError::configuration(format!("Invalid endpoint URL {}: {}", self.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::configuration(format!(
                "Endpoint URL must use http or https: {}",
                self.url
            )));
        }

        Ok(())
    }
}
