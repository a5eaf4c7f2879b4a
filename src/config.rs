//! Process-wide request defaults.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::accessory::Accessory;
use crate::injector::Injector;
use crate::registry::Registry;

/// Defaults applied to every request dispatched through a
/// [`Dispatcher`](crate::Dispatcher).
///
/// Built once at startup with the chainable setters below, then handed to
/// `Dispatcher::new`, which freezes it into an immutable snapshot for the
/// process lifetime. There is no ambient singleton: tests construct their own
/// config and dispatcher.
///
/// # Example
///
/// ```ignore
/// let config = NetConfig::new()
///     .base_url("https://api.example.com/v1")
///     .request_timeout(Duration::from_secs(15))
///     .authentication_token(token)
///     .default_header("X-Client", "mobile")
///     .register_injector(Arc::new(DeviceInfoInjector));
///
/// let dispatcher = Dispatcher::new(config)?;
/// ```
#[derive(Clone, Debug)]
pub struct NetConfig {
    /// Base URL prepended to relative descriptor paths.
    pub base_url: Option<String>,
    /// Timeout applied to every request by the transport. Default 10s.
    pub request_timeout: Duration,
    /// Token written to the `Authorization` header of requests that set
    /// `requires_auth`. Stored verbatim; include a `Bearer ` prefix if the
    /// upstream expects one.
    pub authentication_token: Option<String>,
    /// Parameters merged into every request before per-request parameters.
    pub additional_parameters: BTreeMap<String, Value>,
    /// Headers merged into every request before per-request headers.
    pub additional_headers: BTreeMap<String, String>,
    injectors: Registry<dyn Injector>,
    accessories: Registry<dyn Accessory>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl NetConfig {
    /// Create a config with no base URL, no defaults, and a 10 second
    /// request timeout.
    pub fn new() -> Self {
        Self {
            base_url: None,
            request_timeout: Duration::from_secs(10),
            authentication_token: None,
            additional_parameters: BTreeMap::new(),
            additional_headers: BTreeMap::new(),
            injectors: Registry::new(),
            accessories: Registry::new(),
        }
    }

    /// Set the base URL prepended to relative paths.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request transport timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the authentication token used for `requires_auth` requests.
    pub fn authentication_token(mut self, token: impl Into<String>) -> Self {
        self.authentication_token = Some(token.into());
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers.insert(name.into(), value.into());
        self
    }

    /// Add a parameter merged into every request.
    pub fn default_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_parameters.insert(key.into(), value.into());
        self
    }

    /// Register a global injector. A second injector with the same
    /// identifier is silently ignored.
    pub fn register_injector(mut self, injector: Arc<dyn Injector>) -> Self {
        self.injectors.register(injector);
        self
    }

    /// Register a global accessory. A second accessory with the same
    /// identifier is silently ignored.
    pub fn register_accessory(mut self, accessory: Arc<dyn Accessory>) -> Self {
        self.accessories.register(accessory);
        self
    }

    /// Remove all global injectors.
    pub fn clear_injectors(&mut self) {
        self.injectors.clear();
    }

    /// Remove all global accessories.
    pub fn clear_accessories(&mut self) {
        self.accessories.clear();
    }

    /// The registered global injectors, in registration order.
    pub fn injectors(&self) -> &Registry<dyn Injector> {
        &self.injectors
    }

    /// The registered global accessories, in registration order.
    pub fn accessories(&self) -> &Registry<dyn Accessory> {
        &self.accessories
    }
}
