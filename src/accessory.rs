//! Request lifecycle observers.

use crate::config::NetConfig;
use crate::descriptor::RequestDescriptor;
use crate::registry::Identified;

/// An observer notified at fixed points of a request's lifecycle, for side
/// effects like toggling a loading indicator.
///
/// Hooks fire in this order for every request: `on_will_start` before the
/// request is handed to the transport, `on_will_complete` after the outcome
/// is classified but before any result callback runs, and `on_did_complete`
/// after all result callbacks have returned. All hooks default to no-ops.
pub trait Accessory: Identified + Send + Sync {
    /// The request is about to be submitted to the transport.
    fn on_will_start(&self, descriptor: &RequestDescriptor) {
        let _ = descriptor;
    }

    /// The outcome is known; result callbacks have not run yet.
    fn on_will_complete(&self, descriptor: &RequestDescriptor, success: bool) {
        let _ = (descriptor, success);
    }

    /// All result callbacks for this request have returned.
    fn on_did_complete(&self, descriptor: &RequestDescriptor, success: bool) {
        let _ = (descriptor, success);
    }
}

/// Visit the accessories registered globally and on the descriptor, in that
/// order. A per-request accessory sharing an identifier with a global one is
/// skipped, matching registry dedup semantics.
pub(crate) fn for_each(
    config: &NetConfig,
    descriptor: &RequestDescriptor,
    mut visit: impl FnMut(&dyn Accessory),
) {
    for accessory in config.accessories().iter() {
        visit(accessory.as_ref());
    }
    for accessory in descriptor.accessories.iter() {
        if !config.accessories().contains(accessory.identifier()) {
            visit(accessory.as_ref());
        }
    }
}
