//! Request building: descriptor + config + injectors folded into an
//! immutable outbound request.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde_json::Value;
use url::Url;

use crate::config::NetConfig;
use crate::descriptor::{Method, ParameterEncoding, RequestDescriptor};
use crate::error::{ErrorKind, NetworkError, Result};

/// A built request ready to be handed to the transport.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
    /// The fully resolved request URL, query included.
    pub url: Url,
    /// The HTTP method.
    pub method: Method,
    /// The final header set.
    pub headers: http::HeaderMap,
    /// The encoded body, if any.
    pub body: Option<Bytes>,
}

/// Build an [`OutboundRequest`] from a descriptor and the config defaults.
///
/// Pure transformation with no side effects. Encoding failures surface as a
/// build-time [`NetworkError`]; an unresolvable URL (relative path with no
/// base URL anywhere) is a programmer error and panics.
pub fn build(descriptor: &RequestDescriptor, config: &NetConfig) -> Result<OutboundRequest> {
    let mut url = resolve_url(descriptor, config)?;
    let mut headers = merge_headers(descriptor, config);
    let parameters = merge_parameters(descriptor, config);

    if descriptor.method.encodes_in_query() {
        for (key, value) in &parameters {
            url.query_pairs_mut().append_pair(key, &query_value(value));
        }
    }

    let mut body = None;
    if let Some(custom) = &descriptor.custom_body {
        set_default_header(&mut headers, "Content-Type", "application/json");
        body = Some(Bytes::copy_from_slice(custom.as_bytes()));
    } else if !descriptor.method.encodes_in_query() && !parameters.is_empty() {
        match descriptor.parameter_encoding {
            ParameterEncoding::Url => {
                let mut encoded = url::form_urlencoded::Serializer::new(String::new());
                for (key, value) in &parameters {
                    encoded.append_pair(key, &query_value(value));
                }
                set_default_header(
                    &mut headers,
                    "Content-Type",
                    "application/x-www-form-urlencoded",
                );
                body = Some(Bytes::from(encoded.finish().into_bytes()));
            }
            ParameterEncoding::Json => {
                let encoded = serde_json::to_vec(&parameters)
                    .map_err(|e| ErrorKind::Encode(e.to_string()))?;
                set_default_header(&mut headers, "Content-Type", "application/json");
                body = Some(Bytes::from(encoded));
            }
            ParameterEncoding::Xml => {
                let encoded = quick_xml::se::to_string_with_root("request", &parameters)
                    .map_err(|e| ErrorKind::Encode(e.to_string()))?;
                set_default_header(&mut headers, "Content-Type", "application/xml");
                body = Some(Bytes::from(encoded.into_bytes()));
            }
        }
    }

    Ok(OutboundRequest {
        url,
        method: descriptor.method,
        headers: to_header_map(headers)?,
        body,
    })
}

/// Resolve the final request URL.
///
/// A path that is itself an absolute URL (scheme and host) is used verbatim
/// and subpaths are ignored. Otherwise the descriptor's base URL (if set and
/// non-empty) or the config's base URL is prepended, and each subpath is
/// appended in order.
fn resolve_url(descriptor: &RequestDescriptor, config: &NetConfig) -> Result<Url> {
    if let Ok(url) = Url::parse(&descriptor.path) {
        if url.has_host() {
            return Ok(url);
        }
    }

    let base = descriptor
        .base_url
        .as_deref()
        .filter(|base| !base.is_empty())
        .or(config.base_url.as_deref());
    let Some(base) = base else {
        panic!(
            "cannot resolve request URL: path '{}' is relative and no base URL is configured",
            descriptor.path
        );
    };

    let mut target = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        descriptor.path.trim_start_matches('/')
    );
    for component in &descriptor.additional_subpaths {
        target.push('/');
        target.push_str(component.trim_matches('/'));
    }

    Url::parse(&target)
        .map_err(|e| NetworkError::new(ErrorKind::InvalidUrl(format!("{target}: {e}"))))
}

/// Merge headers left to right; later writers win on key collision.
///
/// Order: config defaults, config injectors, the `Authorization` token (only
/// when the descriptor requires auth), descriptor headers, descriptor
/// injectors. Auth sits between the global and per-request stages, so
/// per-request headers and injectors may still override it.
fn merge_headers(
    descriptor: &RequestDescriptor,
    config: &NetConfig,
) -> BTreeMap<String, String> {
    let mut headers = config.additional_headers.clone();
    for injector in config.injectors().iter() {
        headers = injector.inject_headers(headers, descriptor);
    }
    if descriptor.requires_auth {
        if let Some(token) = &config.authentication_token {
            headers.insert("Authorization".to_string(), token.clone());
        }
    }
    for (name, value) in &descriptor.additional_headers {
        headers.insert(name.clone(), value.clone());
    }
    for injector in descriptor.injectors().iter() {
        headers = injector.inject_headers(headers, descriptor);
    }
    headers
}

/// Merge parameters with the same ordering rules as headers (minus auth).
fn merge_parameters(
    descriptor: &RequestDescriptor,
    config: &NetConfig,
) -> BTreeMap<String, Value> {
    let mut parameters = config.additional_parameters.clone();
    for injector in config.injectors().iter() {
        parameters = injector.inject_parameters(parameters, descriptor);
    }
    for (key, value) in &descriptor.additional_parameters {
        parameters.insert(key.clone(), value.clone());
    }
    for injector in descriptor.injectors().iter() {
        parameters = injector.inject_parameters(parameters, descriptor);
    }
    parameters
}

/// Render a parameter value for query or form encoding.
///
/// Strings go in unquoted; everything else uses its JSON rendering.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Insert a header only if no header with that name (case-insensitive) is
/// already present.
fn set_default_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    if !headers.keys().any(|key| key.eq_ignore_ascii_case(name)) {
        headers.insert(name.to_string(), value.to_string());
    }
}

fn to_header_map(headers: BTreeMap<String, String>) -> Result<http::HeaderMap> {
    let mut map = http::HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = http::HeaderName::try_from(name.as_str())
            .map_err(|_| ErrorKind::InvalidHeader(format!("invalid header name '{name}'")))?;
        let value = http::HeaderValue::try_from(value.as_str())
            .map_err(|_| ErrorKind::InvalidHeader(format!("invalid value for header '{name:?}'")))?;
        map.insert(name, value);
    }
    Ok(map)
}
