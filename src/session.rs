//! Session store.
//!
//! Upstream request handling keeps the working instance list between calls
//! under an opaque session id. The store is a trait so deployments can swap
//! the backend; the default is an in-memory map behind a mutex.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::schema::FormField;

/// Per-session working state.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// Form being filled
    pub form_id: String,
    /// Current instance list
    pub fields: Vec<FormField>,
    /// Extracted source text, for re-runs
    pub source_text: String,
}

/// Create/get/delete interface for session state.
pub trait SessionStore: Send + Sync {
    /// Create a session and return its id.
    fn create(&self, data: SessionData) -> String;
    /// Fetch a session's state.
    fn get(&self, session_id: &str) -> Option<SessionData>;
    /// Replace a session's state. Returns false for unknown ids.
    fn update(&self, session_id: &str, data: SessionData) -> bool;
    /// Drop a session.
    fn delete(&self, session_id: &str);
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionData>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, data: SessionData) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .expect("session store poisoned")
            .insert(id.clone(), data);
        id
    }

    fn get(&self, session_id: &str) -> Option<SessionData> {
        self.sessions
            .lock()
            .expect("session store poisoned")
            .get(session_id)
            .cloned()
    }

    fn update(&self, session_id: &str, data: SessionData) -> bool {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        match sessions.get_mut(session_id) {
            Some(slot) => {
                *slot = data;
                true
            },
            None => false,
        }
    }

    fn delete(&self, session_id: &str) {
        self.sessions
            .lock()
            .expect("session store poisoned")
            .remove(session_id);
    }
}
