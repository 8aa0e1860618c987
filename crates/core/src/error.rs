//! Error types for ezballot-core.

use thiserror::Error;

use crate::{Capability, Identity, ProposalIndex, WorkflowPhase};

/// Core errors.
///
/// Each variant names the precondition a call violated. Every failed call
/// leaves the election untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller lacks the capability the operation requires.
    #[error("{identity} lacks the {required} capability")]
    Unauthorized {
        identity: Identity,
        required: Capability,
    },

    /// Operation is not valid in the current phase.
    #[error("{operation} requires phase {expected}, election is in {actual}")]
    Phase {
        operation: &'static str,
        expected: WorkflowPhase,
        actual: WorkflowPhase,
    },

    /// Identity is already registered.
    #[error("participant already registered: {0}")]
    AlreadyRegistered(Identity),

    /// Participant has already cast their vote.
    #[error("participant already voted: {0}")]
    AlreadyVoted(Identity),

    /// Proposal description is the empty string.
    #[error("proposal description is empty")]
    EmptyProposal,

    /// Vote target does not exist.
    #[error("proposal {index} not found ({count} proposals)")]
    ProposalNotFound { index: ProposalIndex, count: usize },

    /// Read of a proposal past the end of the sequence.
    #[error("proposal index {index} out of range ({count} proposals)")]
    IndexOutOfRange { index: ProposalIndex, count: usize },

    /// Participant-only read attempted by a non-participant.
    #[error("identity not registered: {0}")]
    IdentityNotRegistered(Identity),

    /// Malformed hex-encoded hash or identity.
    #[error("invalid hex digest: {0}")]
    InvalidHex(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A journal entry was rejected while replaying.
    #[error("journal entry {position} rejected: {source}")]
    Replay {
        position: usize,
        #[source]
        source: Box<Error>,
    },
}

/// Fieldless classification of [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Phase,
    AlreadyRegistered,
    AlreadyVoted,
    EmptyProposal,
    ProposalNotFound,
    IndexOutOfRange,
    IdentityNotRegistered,
    InvalidHex,
    Serialization,
    Replay,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unauthorized { .. } => ErrorKind::Unauthorized,
            Error::Phase { .. } => ErrorKind::Phase,
            Error::AlreadyRegistered(_) => ErrorKind::AlreadyRegistered,
            Error::AlreadyVoted(_) => ErrorKind::AlreadyVoted,
            Error::EmptyProposal => ErrorKind::EmptyProposal,
            Error::ProposalNotFound { .. } => ErrorKind::ProposalNotFound,
            Error::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Error::IdentityNotRegistered(_) => ErrorKind::IdentityNotRegistered,
            Error::InvalidHex(_) => ErrorKind::InvalidHex,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Replay { .. } => ErrorKind::Replay,
        }
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(e: ciborium::de::Error<std::io::Error>) -> Self {
        Error::Serialization(e.to_string())
    }
}
