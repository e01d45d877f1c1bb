//! Observation: a static list of registered event listeners
//!
//! Listeners are only recorded so tests can assert on registrations; the
//! store never delivers events.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A node was added
pub const NODE_ADDED: u32 = 1;
/// A node was removed
pub const NODE_REMOVED: u32 = 2;
/// A property was added
pub const PROPERTY_ADDED: u32 = 4;
/// A property was removed
pub const PROPERTY_REMOVED: u32 = 8;
/// A property value changed
pub const PROPERTY_CHANGED: u32 = 16;
/// A node was moved
pub const NODE_MOVED: u32 = 32;
/// Every event type
pub const ALL_EVENTS: u32 =
    NODE_ADDED | NODE_REMOVED | PROPERTY_ADDED | PROPERTY_REMOVED | PROPERTY_CHANGED | NODE_MOVED;

/// A change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// One of the event type constants
    pub event_type: u32,
    /// Path of the affected item
    pub path: String,
}

/// Receiver of change notifications
pub trait EventListener: Send + Sync {
    /// Called with a batch of events
    fn on_events(&self, events: &[Event]);
}

/// One listener registration
#[derive(Clone)]
pub struct Registration {
    /// The registered listener
    pub listener: Arc<dyn EventListener>,
    /// Bit mask of event types
    pub event_types: u32,
    /// Path the listener observes
    pub abs_path: String,
    /// Whether the subtree below `abs_path` is observed too
    pub is_deep: bool,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("event_types", &self.event_types)
            .field("abs_path", &self.abs_path)
            .field("is_deep", &self.is_deep)
            .finish()
    }
}

/// Listener list of one workspace
#[derive(Default)]
pub struct ObservationManager {
    registrations: RwLock<Vec<Registration>>,
}

impl ObservationManager {
    /// Record a listener registration
    pub fn add_event_listener(
        &self,
        listener: Arc<dyn EventListener>,
        event_types: u32,
        abs_path: &str,
        is_deep: bool,
    ) {
        debug!(
            target: "jcrmock::observation",
            path = abs_path,
            event_types,
            is_deep,
            "Listener added"
        );
        self.registrations.write().push(Registration {
            listener,
            event_types,
            abs_path: abs_path.to_string(),
            is_deep,
        });
    }

    /// Drop every registration of `listener`, returning whether any existed
    pub fn remove_event_listener(&self, listener: &Arc<dyn EventListener>) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|r| !same_listener(&r.listener, listener));
        registrations.len() != before
    }

    /// Current registrations in registration order
    pub fn registered_listeners(&self) -> Vec<Registration> {
        self.registrations.read().clone()
    }
}

fn same_listener(a: &Arc<dyn EventListener>, b: &Arc<dyn EventListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl fmt::Debug for ObservationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationManager")
            .field("registrations", &self.registrations.read().len())
            .finish()
    }
}
