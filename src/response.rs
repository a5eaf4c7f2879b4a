//! Response envelope and the typed payload contract.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The application-defined shape a response body is deserialized into.
///
/// Implementations declare how to read the business status code embedded in
/// the body: code `0` means business success, anything else is routed to the
/// failure path. The defaults (code 0, no message) suit APIs that signal
/// errors purely through HTTP status.
///
/// # Example
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct BannerResponse {
///     errcode: i64,
///     errmsg: Option<String>,
///     data: Option<BannerPage>,
/// }
///
/// impl ResponsePayload for BannerResponse {
///     fn business_code(&self) -> i64 { self.errcode }
///     fn business_message(&self) -> Option<&str> { self.errmsg.as_deref() }
/// }
/// ```
pub trait ResponsePayload: DeserializeOwned + Send + 'static {
    /// The application-level status code. `0` is success.
    fn business_code(&self) -> i64 {
        0
    }

    /// The server-supplied status message, if any.
    fn business_message(&self) -> Option<&str> {
        None
    }
}

/// Untyped JSON payloads read the conventional `errcode`/`errmsg` keys when
/// present, so business routing still applies to schemaless dispatches.
impl ResponsePayload for Value {
    fn business_code(&self) -> i64 {
        self.get("errcode").and_then(Value::as_i64).unwrap_or(0)
    }

    fn business_message(&self) -> Option<&str> {
        self.get("errmsg").and_then(Value::as_str)
    }
}

/// Everything known about one completed exchange, handed to the success
/// callback.
///
/// Created fresh per call and discarded after the callbacks return; nothing
/// is cached.
#[derive(Debug)]
pub struct ResponseEnvelope<P> {
    /// When the request was handed to the transport.
    pub start_time: DateTime<Utc>,
    /// When the body finished arriving.
    pub completed_time: DateTime<Utc>,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// The raw body bytes.
    pub raw_body: Bytes,
    /// The body parsed as generic JSON, when the serializer was JSON and the
    /// body parsed.
    pub parsed_json: Option<Value>,
    /// The typed payload. `None` only for empty-body success statuses
    /// (204, 205), where no deserialization is attempted.
    pub payload: Option<P>,
}
