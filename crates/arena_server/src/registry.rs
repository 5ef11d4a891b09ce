//! Lookup from a seated connection to the session that owns it.

use crate::connection::ConnectionId;
use crate::session::Session;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

/// Maps each connection in an active match to its [`Session`].
///
/// Shared between the pairing loop, which fills it, and disconnect handling,
/// which drains it. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    sessions: Arc<Mutex<HashMap<ConnectionId, Arc<Session>>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Arc<Session>>> {
        // Entries are plain inserts and removes, so a poisoned map is still consistent.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records that `id` is seated in `session`.
    #[instrument(skip(self, session), fields(connection_id = %id, session_id = %session.id()))]
    pub fn put(&self, id: ConnectionId, session: Arc<Session>) {
        if self.lock().insert(id, session).is_some() {
            debug!("Replaced stale registry entry");
        }
    }

    /// Forgets `id`, returning the session it was seated in.
    #[instrument(skip(self), fields(connection_id = %id))]
    pub fn remove(&self, id: ConnectionId) -> Option<Arc<Session>> {
        self.lock().remove(&id)
    }

    /// Returns the session `id` is seated in, if any.
    pub fn lookup(&self, id: ConnectionId) -> Option<Arc<Session>> {
        self.lock().get(&id).cloned()
    }

    /// Number of seated connections.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no connection is seated.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
