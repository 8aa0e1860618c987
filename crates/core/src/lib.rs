//! ezballot-core: Core types and state machine for the ezballot governance ledger.
//!
//! An administrator registers participants, participants submit proposals
//! and cast one vote each, and the administrator tallies a winner. Every
//! operation is gated by a linear workflow:
//!
//! ```text
//! RegisteringParticipants -> ProposalsOpen -> ProposalsClosed
//!     -> VotingOpen -> VotingClosed -> Tallied
//! ```
//!
//! The election consults an injected [`AccessGate`] for capabilities and
//! reports committed changes to an injected [`Notifier`]. Callers arrive as
//! already-resolved [`Identity`] values; how a host authenticates them is up
//! to the host.

mod command;
mod election;
mod error;
mod gate;
mod hash;
mod identity;
mod model;
mod notify;
mod phase;
mod snapshot;

pub use command::{Command, JournalEntry, Outcome};
pub use election::Election;
pub use error::{Error, ErrorKind};
pub use gate::{AccessGate, AlwaysAllow, Capability, IdentityGate};
pub use hash::Hash;
pub use identity::Identity;
pub use model::{GENESIS_DESCRIPTION, Participant, Participants, Proposal, ProposalIndex};
pub use notify::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use phase::WorkflowPhase;
pub use snapshot::Snapshot;
