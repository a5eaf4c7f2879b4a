//! Pluggable header/parameter injection.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::descriptor::RequestDescriptor;
use crate::registry::Identified;

/// A pure rewrite step applied to a request's headers and parameters before
/// it is built.
///
/// Injectors run in registration order: first the ones registered on
/// [`NetConfig`](crate::NetConfig), then the ones added to the descriptor
/// itself. Each hook receives the current merged map and returns the map to
/// continue with, so a later injector sees (and may override) what an earlier
/// one wrote. Implementations must not retain the descriptor.
///
/// Both hooks default to the identity function; implement only the one you
/// need.
///
/// # Example
///
/// ```ignore
/// struct TraceInjector;
///
/// impl Identified for TraceInjector {
///     fn identifier(&self) -> &str { "trace" }
/// }
///
/// impl Injector for TraceInjector {
///     fn inject_headers(
///         &self,
///         mut headers: BTreeMap<String, String>,
///         _descriptor: &RequestDescriptor,
///     ) -> BTreeMap<String, String> {
///         headers.insert("X-Trace-Id".into(), next_trace_id());
///         headers
///     }
/// }
/// ```
pub trait Injector: Identified + Send + Sync {
    /// Rewrite the merged header map for a request about to be built.
    fn inject_headers(
        &self,
        headers: BTreeMap<String, String>,
        descriptor: &RequestDescriptor,
    ) -> BTreeMap<String, String> {
        let _ = descriptor;
        headers
    }

    /// Rewrite the merged parameter map for a request about to be built.
    fn inject_parameters(
        &self,
        parameters: BTreeMap<String, Value>,
        descriptor: &RequestDescriptor,
    ) -> BTreeMap<String, Value> {
        let _ = descriptor;
        parameters
    }
}
