//! Dispatcher builder
//!
//! Collects the endpoint, HTTP settings and interceptors, then wires them
//! into a [`Dispatcher`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::dispatcher::Dispatcher;
use crate::config::{ClientConfig, DEFAULT_TIMEOUT};
use crate::error::Result;
use crate::interceptors::{Interceptor, InterceptorChain};
use crate::transport::{HttpTransport, Transport, UserAgent};

/// Builder for [`Dispatcher`]
pub struct DispatcherBuilder {
    /// URL of the WebApi endpoint
    url: Option<String>,

    /// Custom headers to include with all requests
    custom_headers: HashMap<String, String>,

    /// Request timeout
    timeout: Option<Duration>,

    /// User agent
    user_agent: Option<String>,

    /// Accept gzip-compressed responses
    compression: bool,

    interceptors: InterceptorChain,

    /// Replaces the HTTP transport when set
    transport: Option<Arc<dyn Transport>>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            url: None,
            custom_headers: HashMap::new(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: None,
            compression: true,
            interceptors: InterceptorChain::new(),
            transport: None,
        }
    }
}

impl DispatcherBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            url: Some(config.url.clone()),
            timeout: Some(config.timeout),
            user_agent: config.user_agent.clone(),
            compression: config.compression,
            ..Self::default()
        }
    }

    /// Set the endpoint URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add a custom header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the request timeout
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Enable or disable compression
    pub fn compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Append an interceptor. Interceptors see requests in the order they
    /// were added and responses in reverse order.
    pub fn interceptor(self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptor_arc(Arc::new(interceptor))
    }

    /// Append a shared interceptor
    pub fn interceptor_arc(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Use a custom transport instead of HTTP. Header, timeout, user agent
    /// and compression settings are ignored then.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Configuration the dispatcher would be built with
    fn config(&self) -> ClientConfig {
        ClientConfig {
            url: self.url.clone().unwrap_or_default(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: self.user_agent.clone(),
            compression: self.compression,
        }
    }

    /// Build the HTTP transport with the configured settings
    pub fn build_http_transport(&self) -> Result<HttpTransport> {
        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| UserAgent::default().to_string());

        HttpTransport::new(&user_agent, self.timeout, &self.custom_headers, self.compression)
    }

    /// Validate the settings and build the dispatcher
    pub fn build(self) -> Result<Dispatcher> {
        let config = self.config();
        config.validate()?;

        let transport = match self.transport {
            Some(ref transport) => transport.clone(),
            None => Arc::new(self.build_http_transport()?) as Arc<dyn Transport>,
        };

        debug!(
            endpoint = %config.url,
            interceptors = self.interceptors.len(),
            "building dispatcher"
        );

        Ok(Dispatcher::new(config.url, transport, self.interceptors))
    }
}
