//! Ordered hook channels for Horizon Shortcuts.
//!
//! A [`Signal`] is a list of listeners (slots) that are invoked in the order
//! they were connected. Unlike a classic signal/slot pair, the signal never
//! invokes its slots itself: the owner takes a snapshot with
//! [`Signal::slots`] and calls each slot with whatever arguments it needs.
//! This lets slots receive mutable access to the owner (for example a
//! shortcut manager) without the signal holding a borrow while they run.
//!
//! # Key Types
//!
//! - [`Signal<S>`] - An ordered collection of `Arc<S>` slots
//! - [`ConnectionId`] - Token returned when connecting a slot, required to
//!   disconnect it again
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_shortcuts_core::Signal;
//!
//! type Listener = dyn Fn(&mut Vec<i32>, i32) + Send + Sync;
//!
//! let mut signal: Signal<Listener> = Signal::new();
//! let id = signal.connect(Arc::new(|log: &mut Vec<i32>, n| log.push(n)));
//!
//! let mut log = Vec::new();
//! for slot in signal.slots() {
//!     slot(&mut log, 42);
//! }
//! assert_eq!(log, vec![42]);
//!
//! assert!(signal.disconnect(id));
//! assert!(signal.is_empty());
//! ```

use std::fmt;
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a connected slot.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped. IDs are never reused for a different slot.
    pub struct ConnectionId;
}

/// An ordered list of connected slots.
///
/// # Type Parameter
///
/// - `S`: The slot type, usually a trait object such as
///   `dyn Fn(&mut Owner, &Event) + Send + Sync`.
///
/// # Ordering
///
/// Slots are returned by [`slots`](Self::slots) in connection order.
/// Disconnecting a slot does not disturb the relative order of the rest.
pub struct Signal<S: ?Sized> {
    /// All active connections.
    connections: SlotMap<ConnectionId, Arc<S>>,
    /// Connection order, oldest first.
    order: Vec<ConnectionId>,
}

impl<S: ?Sized> Default for Signal<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> Signal<S> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Connect a slot to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect(&mut self, slot: Arc<S>) -> ConnectionId {
        let id = self.connections.insert(slot);
        self.order.push(id);
        tracing::trace!(
            target: targets::SIGNAL,
            ?id,
            connection_count = self.order.len(),
            "slot connected"
        );
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        if self.connections.remove(id).is_none() {
            return false;
        }
        self.order.retain(|other| *other != id);
        tracing::trace!(target: targets::SIGNAL, ?id, "slot disconnected");
        true
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.order.len()
    }

    /// Check whether no slot is connected.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Snapshot the connected slots in connection order.
    ///
    /// The snapshot is independent of the signal: slots may connect or
    /// disconnect listeners while the snapshot is being walked without
    /// affecting the current dispatch.
    pub fn slots(&self) -> Vec<Arc<S>> {
        self.order
            .iter()
            .filter_map(|id| self.connections.get(*id).cloned())
            .collect()
    }
}

impl<S: ?Sized> fmt::Debug for Signal<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.order)
            .finish()
    }
}
