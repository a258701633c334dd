// Opaque server components contributed by configuration fragments.
// The hosting server owns their behaviour; here they are only collected.

use apimount_core::EndpointId;
use std::fmt;
use std::sync::Arc;

/// Message interceptor installed on an inbound, outbound or fault chain.
pub trait Interceptor: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

/// Server feature such as compression or request logging.
pub trait Feature: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

/// Entity or exception provider, e.g. a serializer.
pub trait Provider: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

/// Transport / bus handle shared by servers.
pub trait Bus: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;
}

/// An instantiated service endpoint ready to be bound.
pub trait Endpoint: Send + Sync + fmt::Debug {
    fn endpoint_id(&self) -> &EndpointId;
}

/// Identity comparison of two shared components.
///
/// Only the data pointer is compared, so the same object seen through
/// different vtables still counts as equal.
pub fn same_component<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Append every element of `source` not already present in `target`.
/// Returns how many were added.
pub fn append_unique<T: ?Sized>(target: &mut Vec<Arc<T>>, source: &[Arc<T>]) -> usize {
    let mut added = 0;
    for item in source {
        if !target.iter().any(|existing| same_component(existing, item)) {
            target.push(Arc::clone(item));
            added += 1;
        }
    }
    added
}
