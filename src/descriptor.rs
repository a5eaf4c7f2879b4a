//! Request descriptors: typed values describing one HTTP call.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::accessory::Accessory;
use crate::builder::OutboundRequest;
use crate::injector::Injector;
use crate::registry::Registry;

/// HTTP request methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET method.
    #[default]
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP DELETE method.
    Delete,
    /// HTTP HEAD method.
    Head,
    /// HTTP PATCH method.
    Patch,
}

impl Method {
    /// Convert to reqwest method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Patch => reqwest::Method::PATCH,
        }
    }

    /// Methods whose parameters always go into the URL query string,
    /// regardless of the descriptor's parameter encoding.
    pub(crate) fn encodes_in_query(self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Delete)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Head => write!(f, "HEAD"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// How merged parameters are encoded into the request body.
///
/// Only consulted for methods that carry a body; GET, HEAD, and DELETE
/// always encode parameters into the query string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParameterEncoding {
    /// `application/x-www-form-urlencoded` body.
    Url,
    /// JSON body.
    #[default]
    Json,
    /// XML body.
    Xml,
}

/// The wire format used to parse the response body.
///
/// The shape the parsed body is mapped onto is the payload type parameter of
/// [`Dispatcher::dispatch`](crate::Dispatcher::dispatch), not part of the
/// descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Serializer {
    /// Parse the body as JSON.
    #[default]
    Json,
    /// Parse the body as XML.
    Xml,
}

/// A value fully describing one request's intent before it is sent.
///
/// Descriptors are plain data plus per-request injectors and accessories;
/// everything that varies per endpoint (method, path, auth) is an explicit
/// field. Mutate a descriptor only before handing it to the dispatcher.
///
/// # Example
///
/// ```ignore
/// let descriptor = RequestDescriptor::new("/banner")
///     .parameter("current", 0)
///     .parameter("size", 10);
///
/// dispatcher
///     .dispatch::<BannerResponse, _>(descriptor, callbacks)
///     .await;
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestDescriptor {
    /// URL path, appended to the base URL. If it is itself an absolute URL
    /// (scheme and host), it is used verbatim.
    pub path: String,
    /// Per-request base URL overriding the config's.
    pub base_url: Option<String>,
    /// HTTP method. Default GET.
    pub method: Method,
    /// Whether to attach the configured authentication token.
    pub requires_auth: bool,
    /// Wire format of the response body.
    pub serializer: Serializer,
    /// Body encoding for merged parameters.
    pub parameter_encoding: ParameterEncoding,
    /// Per-request parameters, merged after the config's.
    pub additional_parameters: BTreeMap<String, Value>,
    /// Per-request headers, merged after the config's.
    pub additional_headers: BTreeMap<String, String>,
    /// Path components appended to `path` in order.
    pub additional_subpaths: Vec<String>,
    /// Raw body sent verbatim as UTF-8, bypassing parameter encoding
    /// entirely. `Content-Type` defaults to `application/json` unless a
    /// header already set it.
    pub custom_body: Option<String>,
    /// Escape hatch: a fully custom outbound request submitted as-is,
    /// bypassing the request builder (and with it URL resolution, merging,
    /// and injection).
    pub custom_request: Option<OutboundRequest>,
    pub(crate) injectors: Registry<dyn Injector>,
    pub(crate) accessories: Registry<dyn Accessory>,
}

impl RequestDescriptor {
    /// Create a GET descriptor for the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Override the config's base URL for this request.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Attach the configured authentication token to this request.
    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    /// Set the response wire format.
    pub fn serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    /// Set the parameter body encoding.
    pub fn parameter_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.parameter_encoding = encoding;
        self
    }

    /// Add a per-request parameter.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_parameters.insert(key.into(), value.into());
        self
    }

    /// Add a per-request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers.insert(name.into(), value.into());
        self
    }

    /// Append a path component after `path`.
    pub fn subpath(mut self, component: impl Into<String>) -> Self {
        self.additional_subpaths.push(component.into());
        self
    }

    /// Set a raw body, bypassing parameter encoding.
    pub fn custom_body(mut self, body: impl Into<String>) -> Self {
        self.custom_body = Some(body.into());
        self
    }

    /// Submit a prebuilt request as-is instead of building one.
    pub fn custom_request(mut self, request: OutboundRequest) -> Self {
        self.custom_request = Some(request);
        self
    }

    /// Add a per-request injector. A second injector with the same
    /// identifier is silently ignored.
    pub fn add_injector(mut self, injector: Arc<dyn Injector>) -> Self {
        self.injectors.register(injector);
        self
    }

    /// Remove the per-request injector with the given identifier.
    /// Returns `true` if one was removed.
    pub fn remove_injector(&mut self, identifier: &str) -> bool {
        self.injectors.remove(identifier)
    }

    /// Remove all per-request injectors.
    pub fn remove_all_injectors(&mut self) {
        self.injectors.clear();
    }

    /// Add a per-request accessory. A second accessory with the same
    /// identifier is silently ignored.
    pub fn add_accessory(mut self, accessory: Arc<dyn Accessory>) -> Self {
        self.accessories.register(accessory);
        self
    }

    /// Remove the per-request accessory with the given identifier.
    /// Returns `true` if one was removed.
    pub fn remove_accessory(&mut self, identifier: &str) -> bool {
        self.accessories.remove(identifier)
    }

    /// Remove all per-request accessories.
    pub fn remove_all_accessories(&mut self) {
        self.accessories.clear();
    }

    /// The per-request injectors, in registration order.
    pub fn injectors(&self) -> &Registry<dyn Injector> {
        &self.injectors
    }

    /// The per-request accessories, in registration order.
    pub fn accessories(&self) -> &Registry<dyn Accessory> {
        &self.accessories
    }
}
