//! Result callbacks for dispatched requests.

use crate::descriptor::RequestDescriptor;
use crate::error::NetworkError;
use crate::response::ResponseEnvelope;

/// Receives the outcome of one dispatched request.
///
/// For every request, exactly one of `on_success` / `on_failure` fires,
/// followed by exactly one `on_completed` with the matching flag. A type
/// holding UI state can implement this directly in delegate style; for
/// ad-hoc closures use [`Callbacks`]. All hooks default to no-ops.
pub trait ResponseHandle<P>: Send + 'static {
    /// The request succeeded; the envelope is yours until this returns.
    fn on_success(&mut self, descriptor: &RequestDescriptor, response: ResponseEnvelope<P>) {
        let _ = (descriptor, response);
    }

    /// The request failed with the given error.
    fn on_failure(&mut self, descriptor: &RequestDescriptor, error: NetworkError) {
        let _ = (descriptor, error);
    }

    /// The request finished, successfully or not. Always fires, after the
    /// success or failure hook.
    fn on_completed(&mut self, descriptor: &RequestDescriptor, success: bool) {
        let _ = (descriptor, success);
    }
}

/// Closure-based [`ResponseHandle`] adapter.
///
/// # Example
///
/// ```ignore
/// let callbacks = Callbacks::new()
///     .on_success(|_descriptor, envelope| show(envelope.payload))
///     .on_failure(|_descriptor, error| toast(error.message()));
///
/// dispatcher.submit::<BannerResponse, _>(descriptor, callbacks);
/// ```
pub struct Callbacks<P> {
    success: Option<Box<dyn FnMut(&RequestDescriptor, ResponseEnvelope<P>) + Send>>,
    failure: Option<Box<dyn FnMut(&RequestDescriptor, NetworkError) + Send>>,
    completed: Option<Box<dyn FnMut(&RequestDescriptor, bool) + Send>>,
}

impl<P> Callbacks<P> {
    /// Create an adapter with no callbacks set.
    pub fn new() -> Self {
        Self {
            success: None,
            failure: None,
            completed: None,
        }
    }

    /// Set the success callback.
    pub fn on_success(
        mut self,
        f: impl FnMut(&RequestDescriptor, ResponseEnvelope<P>) + Send + 'static,
    ) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    /// Set the failure callback.
    pub fn on_failure(
        mut self,
        f: impl FnMut(&RequestDescriptor, NetworkError) + Send + 'static,
    ) -> Self {
        self.failure = Some(Box::new(f));
        self
    }

    /// Set the completion callback, invoked after success or failure.
    pub fn on_completed(
        mut self,
        f: impl FnMut(&RequestDescriptor, bool) + Send + 'static,
    ) -> Self {
        self.completed = Some(Box::new(f));
        self
    }
}

impl<P> Default for Callbacks<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Send + 'static> ResponseHandle<P> for Callbacks<P> {
    fn on_success(&mut self, descriptor: &RequestDescriptor, response: ResponseEnvelope<P>) {
        if let Some(f) = self.success.as_mut() {
            f(descriptor, response);
        }
    }

    fn on_failure(&mut self, descriptor: &RequestDescriptor, error: NetworkError) {
        if let Some(f) = self.failure.as_mut() {
            f(descriptor, error);
        }
    }

    fn on_completed(&mut self, descriptor: &RequestDescriptor, success: bool) {
        if let Some(f) = self.completed.as_mut() {
            f(descriptor, success);
        }
    }
}
