//! Typed login/logout event emitter

use crate::session::state::UserData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Event kinds consumers can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEventKind {
    Login,
    Logout,
}

/// An emitted event with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Login(UserData),
    Logout,
}

impl AuthEvent {
    pub fn kind(&self) -> AuthEventKind {
        match self {
            AuthEvent::Login(_) => AuthEventKind::Login,
            AuthEvent::Logout => AuthEventKind::Logout,
        }
    }
}

/// Registered event callback
pub type Handler = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

/// Identifies a registration; pass it to `off` to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Registration {
    id: HandlerId,
    kind: AuthEventKind,
    once: bool,
    handler: Handler,
}

/// Handler registry for [`AuthEvent`]s
#[derive(Default)]
pub struct EventEmitter {
    next_id: AtomicU64,
    handlers: Mutex<Vec<Registration>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn handlers(&self) -> MutexGuard<'_, Vec<Registration>> {
        // Registrations stay consistent even if a previous holder panicked
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn register(&self, kind: AuthEventKind, once: bool, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers().push(Registration {
            id,
            kind,
            once,
            handler,
        });
        id
    }

    /// Call `handler` for every event of `kind`
    pub fn on<F>(&self, kind: AuthEventKind, handler: F) -> HandlerId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        self.register(kind, false, Arc::new(handler))
    }

    /// Call `handler` for the next event of `kind` only
    pub fn once<F>(&self, kind: AuthEventKind, handler: F) -> HandlerId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        self.register(kind, true, Arc::new(handler))
    }

    /// Remove a registration; returns false if it was already gone
    pub fn off(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers();
        let before = handlers.len();
        handlers.retain(|r| r.id != id);
        handlers.len() != before
    }

    /// Number of handlers registered for `kind`
    pub fn listener_count(&self, kind: AuthEventKind) -> usize {
        self.handlers().iter().filter(|r| r.kind == kind).count()
    }

    /// Deliver `event` to its subscribers in registration order
    ///
    /// Handlers run after the registry lock is released, so they may
    /// subscribe or unsubscribe themselves.
    pub fn trigger(&self, event: &AuthEvent) {
        let kind = event.kind();
        let to_call: Vec<Handler> = {
            let mut handlers = self.handlers();
            let matching = handlers
                .iter()
                .filter(|r| r.kind == kind)
                .map(|r| r.handler.clone())
                .collect();
            handlers.retain(|r| !(r.once && r.kind == kind));
            matching
        };

        for handler in to_call {
            handler(event);
        }
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("handlers", &self.handlers().len())
            .finish()
    }
}
