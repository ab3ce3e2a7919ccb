//! Lifecycle state shared between a session and its reader loop.

use std::sync::{Mutex, PoisonError};

use tracing::info;

use minishell_core::{SessionId, SessionStatus};

/// Status and exit code of one session.
#[derive(Debug)]
pub(crate) struct SessionState {
    id: SessionId,
    status: Mutex<SessionStatus>,
    exit_code: Mutex<Option<i32>>,
}

impl SessionState {
    pub(crate) fn new(id: SessionId) -> Self {
        Self {
            id,
            status: Mutex::new(SessionStatus::Starting),
            exit_code: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn status(&self) -> SessionStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `next`. `Terminated` is final; returns false if nothing changed.
    pub(crate) fn transition(&self, next: SessionStatus) -> bool {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = *status;
        if previous == next || previous.is_terminated() {
            return false;
        }
        *status = next;
        drop(status);

        info!(
            "Session status changed: id={}, {:?} → {:?}",
            self.id, previous, next
        );
        true
    }

    pub(crate) fn exit_code(&self) -> Option<i32> {
        *self.exit_code.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_exit_code(&self, code: Option<i32>) {
        *self.exit_code.lock().unwrap_or_else(PoisonError::into_inner) = code;
    }
}
