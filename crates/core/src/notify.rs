//! Notifications emitted after each accepted operation.

use crate::{Identity, ProposalIndex, WorkflowPhase};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// A committed state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    ParticipantRegistered {
        identity: Identity,
    },
    PhaseChanged {
        from: WorkflowPhase,
        to: WorkflowPhase,
    },
    ProposalRegistered {
        index: ProposalIndex,
    },
    VoteCast {
        identity: Identity,
        index: ProposalIndex,
    },
}

/// Trait for receiving notifications. Called only after the change is
/// committed.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Discards every notification.
impl Notifier for () {
    fn notify(&self, _notification: &Notification) {}
}

/// Emits each notification as a structured `tracing` event.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::ParticipantRegistered { identity } => {
                info!(identity = %identity, "participant registered");
            }
            Notification::PhaseChanged { from, to } => {
                info!(from = %from, to = %to, "phase changed");
            }
            Notification::ProposalRegistered { index } => {
                info!(index, "proposal registered");
            }
            Notification::VoteCast { identity, index } => {
                info!(identity = %identity, index, "vote cast");
            }
        }
    }
}

/// Keeps every notification in a shared in-memory log. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.lock().push(notification.clone());
    }
}
