//! Ordered, identifier-deduplicated collections of injectors and accessories.

use std::sync::Arc;

/// Anything that can be told apart by a string identifier.
///
/// Injectors and accessories are deduplicated by this identifier: within a
/// single registry, the first item registered under an identifier wins and
/// later registrations under the same identifier are silently ignored.
pub trait Identified {
    /// Unique identifier within a registry.
    fn identifier(&self) -> &str;
}

/// An append-mostly, registration-ordered collection deduplicated by
/// [`Identified::identifier`].
///
/// Mutated only by setup code before any request is submitted; during request
/// processing it is read through an immutable snapshot, so no locking is
/// needed.
pub struct Registry<T: ?Sized> {
    items: Vec<Arc<T>>,
}

impl<T: Identified + ?Sized> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an item unless one with the same identifier is already present.
    ///
    /// Returns `true` if the item was added.
    pub fn register(&mut self, item: Arc<T>) -> bool {
        if self.contains(item.identifier()) {
            tracing::debug!(
                target: "relaykit::registry",
                "ignoring duplicate registration for '{}'",
                item.identifier()
            );
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the item with the given identifier, if present.
    ///
    /// Returns `true` if an item was removed.
    pub fn remove(&mut self, identifier: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.identifier() != identifier);
        self.items.len() != before
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether an item with the given identifier is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.items.iter().any(|item| item.identifier() == identifier)
    }

    /// Iterate the items in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.items.iter()
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Identified + ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: Identified + ?Sized> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.items.iter().map(|item| item.identifier()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tagged(&'static str);

    impl Identified for Tagged {
        fn identifier(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn duplicate_identifiers_are_ignored() {
        let mut registry: Registry<Tagged> = Registry::new();
        assert!(registry.register(Arc::new(Tagged("a"))));
        assert!(registry.register(Arc::new(Tagged("b"))));
        assert!(!registry.register(Arc::new(Tagged("a"))));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut registry: Registry<Tagged> = Registry::new();
        registry.register(Arc::new(Tagged("b")));
        registry.register(Arc::new(Tagged("a")));
        let order: Vec<&str> = registry.iter().map(|i| i.identifier()).collect();
        assert_eq!(order, ["b", "a"]);
    }

    #[test]
    fn remove_and_clear() {
        let mut registry: Registry<Tagged> = Registry::new();
        registry.register(Arc::new(Tagged("a")));
        registry.register(Arc::new(Tagged("b")));
        assert!(registry.remove("a"));
        assert!(!registry.remove("a"));
        assert!(registry.contains("b"));
        registry.clear();
        assert!(registry.is_empty());
    }
}
