//! Typed request dispatch layer over reqwest.
//!
//! This crate lets application code describe HTTP calls as typed
//! [`RequestDescriptor`] values with typed response payloads, and dispatch
//! them through a shared [`Dispatcher`]:
//!
//! - **Descriptors** carry path, method, headers, parameters, and the
//!   response wire format as plain data.
//! - **Injectors** rewrite the merged header/parameter maps before a request
//!   is built (device info, tracing IDs, signatures).
//! - **Accessories** observe request lifecycle transitions (loading
//!   indicators, instrumentation).
//! - **Routing** classifies every outcome (transport failure, unparseable
//!   body, shape mismatch, or a non-zero business status code in the body)
//!   into exactly one success or failure callback plus exactly one
//!   completion callback.
//!
//! # Example
//!
//! ```ignore
//! use relaykit::{Callbacks, Dispatcher, NetConfig, RequestDescriptor};
//!
//! let dispatcher = Dispatcher::new(
//!     NetConfig::new()
//!         .base_url("http://x.test/api")
//!         .authentication_token(token),
//! )?;
//!
//! let descriptor = RequestDescriptor::new("/banner")
//!     .parameter("current", 0)
//!     .parameter("size", 10);
//!
//! dispatcher
//!     .dispatch::<BannerResponse, _>(
//!         descriptor,
//!         Callbacks::new()
//!             .on_success(|_d, envelope| render(envelope.payload))
//!             .on_failure(|_d, error| toast(error.message())),
//!     )
//!     .await;
//! ```
//!
//! Well-known business error codes (token missing/invalid, permission
//! denied) additionally broadcast on the dispatcher's [`EventBus`], so a
//! single listener can handle forced logout or permission prompts for the
//! whole app:
//!
//! ```ignore
//! let mut events = dispatcher.subscribe();
//! while let Ok(event) = events.recv().await {
//!     if let NetEvent::TokenInvalid { .. } = event {
//!         session.force_logout();
//!     }
//! }
//! ```

mod accessory;
mod builder;
mod codes;
mod config;
mod descriptor;
mod dispatcher;
mod error;
mod events;
mod handler;
mod injector;
mod persistence;
mod registry;
mod response;
mod router;
pub mod runtime;

pub use accessory::Accessory;
pub use builder::{OutboundRequest, build};
pub use codes::{PERMISSION_DENIED, TOKEN_INVALID, TOKEN_MISSING, lookup as lookup_error_code};
pub use config::NetConfig;
pub use descriptor::{Method, ParameterEncoding, RequestDescriptor, Serializer};
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, NetworkError, Result};
pub use events::{ConnectionState, EventBus, NetEvent};
pub use handler::{Callbacks, ResponseHandle};
pub use injector::Injector;
pub use persistence::CacheStore;
pub use registry::{Identified, Registry};
pub use response::{ResponseEnvelope, ResponsePayload};
