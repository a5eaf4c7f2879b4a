//! The dispatcher: owns the transport session and runs the request pipeline.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;

use crate::accessory;
use crate::builder::{self, OutboundRequest};
use crate::config::NetConfig;
use crate::descriptor::RequestDescriptor;
use crate::error::{ErrorKind, Result};
use crate::events::{EventBus, NetEvent};
use crate::handler::ResponseHandle;
use crate::response::ResponsePayload;
use crate::router;
use crate::runtime;

struct DispatcherInner {
    client: reqwest::Client,
    config: NetConfig,
    events: EventBus,
}

/// Submits built requests to the transport and routes their results.
///
/// Created once at startup from a [`NetConfig`]; the config becomes an
/// immutable snapshot and the underlying `reqwest::Client` is configured
/// exactly once with its request timeout. Cheaply cloneable; clones share
/// the connection pool, config, and event bus.
///
/// Any number of requests may be in flight concurrently. There is no
/// descriptor-to-task map and no cancellation by descriptor: once submitted,
/// a request runs to completion or to its transport timeout.
///
/// # Example
///
/// ```ignore
/// let dispatcher = Dispatcher::new(
///     NetConfig::new().base_url("https://api.example.com"),
/// )?;
///
/// dispatcher.submit::<BannerResponse, _>(
///     RequestDescriptor::new("/banner").parameter("size", 10),
///     Callbacks::new().on_success(|_d, envelope| render(envelope.payload)),
/// );
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Create a dispatcher over a fresh transport session configured with
    /// the config's request timeout.
    pub fn new(config: NetConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ErrorKind::Transport(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(DispatcherInner {
                client,
                config,
                events: EventBus::new(),
            }),
        })
    }

    /// The frozen configuration this dispatcher was built with.
    pub fn config(&self) -> &NetConfig {
        &self.inner.config
    }

    /// The event bus broadcast to during response routing.
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Subscribe to routing events. Shorthand for `events().subscribe()`.
    pub fn subscribe(&self) -> broadcast::Receiver<NetEvent> {
        self.inner.events.subscribe()
    }

    /// Run the full pipeline for one descriptor and await its completion.
    ///
    /// Accessories are notified that the request will start, the outbound
    /// request is built (or taken verbatim from `custom_request`), submitted
    /// to the transport, and the outcome is routed to the handler. Exactly
    /// one of the handler's success/failure hooks fires, then its completion
    /// hook, whatever happens.
    pub async fn dispatch<P, H>(&self, descriptor: RequestDescriptor, mut handler: H)
    where
        P: ResponsePayload,
        H: ResponseHandle<P>,
    {
        let config = &self.inner.config;
        accessory::for_each(config, &descriptor, |a| a.on_will_start(&descriptor));

        let start_time = Utc::now();
        let outbound = match descriptor.custom_request.clone() {
            Some(custom) => Ok(custom),
            None => builder::build(&descriptor, config),
        };
        let outbound = match outbound {
            Ok(outbound) => outbound,
            Err(error) => {
                // Build failures never reach the transport; they surface
                // through the same failure path as routed errors.
                let error = error.with_context(None, start_time, Utc::now());
                router::finish_failure(&descriptor, error, &mut handler, config);
                return;
            }
        };

        let request_url = outbound.url.to_string();
        tracing::debug!(
            target: "relaykit::dispatcher",
            "{} {}",
            outbound.method,
            request_url
        );
        let outcome = self.send(outbound).await;
        router::route(
            &descriptor,
            outcome,
            start_time,
            request_url,
            &mut handler,
            config,
            &self.inner.events,
        )
        .await;
    }

    /// Fire-and-forget submission: spawn [`dispatch`](Self::dispatch) on the
    /// global runtime and return immediately.
    pub fn submit<P, H>(&self, descriptor: RequestDescriptor, handler: H)
    where
        P: ResponsePayload,
        H: ResponseHandle<P>,
    {
        let this = self.clone();
        runtime::spawn(async move {
            this.dispatch(descriptor, handler).await;
        });
    }

    async fn send(&self, outbound: OutboundRequest) -> reqwest::Result<reqwest::Response> {
        let mut request = self
            .inner
            .client
            .request(outbound.method.to_reqwest(), outbound.url)
            .headers(outbound.headers);
        if let Some(body) = outbound.body {
            request = request.body(body);
        }
        request.send().await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.inner.config.base_url)
            .field("request_timeout", &self.inner.config.request_timeout)
            .finish()
    }
}
