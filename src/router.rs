//! Response routing: classify the raw transport outcome, deserialize, check
//! the business status code, and fan out to accessories and the handler.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::accessory;
use crate::codes;
use crate::config::NetConfig;
use crate::descriptor::{RequestDescriptor, Serializer};
use crate::error::{ErrorKind, NetworkError};
use crate::events::{EventBus, NetEvent};
use crate::handler::ResponseHandle;
use crate::response::{ResponseEnvelope, ResponsePayload};

/// HTTP statuses treated as successful with no body to deserialize.
const EMPTY_BODY_STATUSES: [u16; 2] = [204, 205];

/// Route one transport outcome to its terminal state.
///
/// Every call ends in exactly one of the success or failure fan-outs; no
/// outcome is silently dropped.
pub(crate) async fn route<P, H>(
    descriptor: &RequestDescriptor,
    outcome: reqwest::Result<reqwest::Response>,
    start_time: DateTime<Utc>,
    request_url: String,
    handler: &mut H,
    config: &NetConfig,
    events: &EventBus,
) where
    P: ResponsePayload,
    H: ResponseHandle<P>,
{
    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            let error = NetworkError::new(ErrorKind::from(err)).with_context(
                Some(request_url),
                start_time,
                Utc::now(),
            );
            finish_failure(descriptor, error, handler, config);
            return;
        }
    };

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let raw_body = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            let error = NetworkError::new(ErrorKind::from(err)).with_context(
                Some(request_url),
                start_time,
                Utc::now(),
            );
            finish_failure(descriptor, error, handler, config);
            return;
        }
    };
    let completed_time = Utc::now();

    if EMPTY_BODY_STATUSES.contains(&status) {
        let envelope = ResponseEnvelope {
            start_time,
            completed_time,
            status,
            headers,
            raw_body,
            parsed_json: None,
            payload: None,
        };
        finish_success(descriptor, envelope, handler, config);
        return;
    }

    let (parsed_json, payload) = match parse_payload::<P>(descriptor.serializer, &raw_body) {
        Ok(pair) => pair,
        Err(kind) => {
            let error = NetworkError::new(kind).with_context(
                Some(request_url),
                start_time,
                completed_time,
            );
            finish_failure(descriptor, error, handler, config);
            return;
        }
    };

    let code = payload.business_code();
    if code != 0 {
        let message = payload.business_message().map(str::to_string);
        broadcast_business_error(code, message.as_deref(), events);
        let error = NetworkError::new(ErrorKind::Business { code, message }).with_context(
            Some(request_url),
            start_time,
            completed_time,
        );
        finish_failure(descriptor, error, handler, config);
        return;
    }

    let envelope = ResponseEnvelope {
        start_time,
        completed_time,
        status,
        headers,
        raw_body,
        parsed_json,
        payload: Some(payload),
    };
    finish_success(descriptor, envelope, handler, config);
}

/// Parse the raw body in the descriptor's declared format, then map it onto
/// the payload type.
///
/// For JSON the two stages are distinct: an unparseable body is a `Format`
/// error, a parseable body that does not fit `P` is a `Mapping` error. XML
/// parses directly into `P`, so both collapse into `Format`.
fn parse_payload<P: ResponsePayload>(
    serializer: Serializer,
    raw: &[u8],
) -> std::result::Result<(Option<Value>, P), ErrorKind> {
    match serializer {
        Serializer::Json => {
            let value: Value =
                serde_json::from_slice(raw).map_err(|e| ErrorKind::Format(e.to_string()))?;
            let payload: P = serde_json::from_value(value.clone())
                .map_err(|e| ErrorKind::Mapping(e.to_string()))?;
            Ok((Some(value), payload))
        }
        Serializer::Xml => {
            let text =
                std::str::from_utf8(raw).map_err(|e| ErrorKind::Format(e.to_string()))?;
            let payload: P =
                quick_xml::de::from_str(text).map_err(|e| ErrorKind::Format(e.to_string()))?;
            Ok((None, payload))
        }
    }
}

/// Broadcast the event matching a non-zero business code.
///
/// Ordered fallback: the bundled error-code table first, then the well-known
/// application codes. Codes matching neither are logged as unhandled. The
/// caller routes to FAILURE in every case.
fn broadcast_business_error(code: i64, message: Option<&str>, events: &EventBus) {
    if let Some(user_message) = codes::lookup(code) {
        tracing::debug!(
            target: "relaykit::router",
            "business code {code} resolved from bundled table"
        );
        events.emit(NetEvent::DebugError {
            message: user_message.to_string(),
        });
        return;
    }

    let message = message.map(str::to_string);
    match code {
        codes::TOKEN_MISSING => events.emit(NetEvent::TokenMissing { code, message }),
        codes::TOKEN_INVALID => events.emit(NetEvent::TokenInvalid { code, message }),
        codes::PERMISSION_DENIED => events.emit(NetEvent::PermissionDenied { code, message }),
        _ => {
            tracing::warn!(
                target: "relaykit::router",
                "unhandled business status code {code}: {message:?}"
            );
        }
    }
}

/// SUCCESS fan-out: accessories, handler, completion, accessories again.
pub(crate) fn finish_success<P, H>(
    descriptor: &RequestDescriptor,
    envelope: ResponseEnvelope<P>,
    handler: &mut H,
    config: &NetConfig,
) where
    P: ResponsePayload,
    H: ResponseHandle<P>,
{
    accessory::for_each(config, descriptor, |a| a.on_will_complete(descriptor, true));
    handler.on_success(descriptor, envelope);
    handler.on_completed(descriptor, true);
    accessory::for_each(config, descriptor, |a| a.on_did_complete(descriptor, true));
}

/// FAILURE fan-out, mirror of [`finish_success`].
pub(crate) fn finish_failure<P, H>(
    descriptor: &RequestDescriptor,
    error: NetworkError,
    handler: &mut H,
    config: &NetConfig,
) where
    P: ResponsePayload,
    H: ResponseHandle<P>,
{
    tracing::debug!(
        target: "relaykit::router",
        "request to {} failed: {}",
        error.request_url.as_deref().unwrap_or(&descriptor.path),
        error
    );
    accessory::for_each(config, descriptor, |a| a.on_will_complete(descriptor, false));
    handler.on_failure(descriptor, error);
    handler.on_completed(descriptor, false);
    accessory::for_each(config, descriptor, |a| a.on_did_complete(descriptor, false));
}
