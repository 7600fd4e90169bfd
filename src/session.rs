use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::Report;

/// The two screens a session can be on. Serializable so the rendering
/// layer receives an explicit record instead of reading process globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Home,
    Report { subject: String, report: Report },
}

impl SessionState {
    pub fn is_home(&self) -> bool {
        matches!(self, SessionState::Home)
    }
}

/// In-process session records, one per session id. Sessions never share
/// state with each other and nothing survives a restart.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown ids are fresh sessions on the home screen.
    pub fn get(&self, id: Uuid) -> SessionState {
        self.sessions
            .lock()
            .expect("session store poisoned")
            .get(&id)
            .cloned()
            .unwrap_or(SessionState::Home)
    }

    /// Records a successful generation, replacing any held report.
    pub fn set_report(&self, id: Uuid, subject: String, report: Report) {
        self.sessions
            .lock()
            .expect("session store poisoned")
            .insert(id, SessionState::Report { subject, report });
    }

    /// Back navigation: the held report is discarded.
    pub fn go_home(&self, id: Uuid) {
        self.sessions
            .lock()
            .expect("session store poisoned")
            .insert(id, SessionState::Home);
    }
}
