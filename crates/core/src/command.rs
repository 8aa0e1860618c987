//! Serializable commands naming every mutating operation.

use crate::{Identity, ProposalIndex};
use serde::{Deserialize, Serialize};

/// A request to mutate the election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Register { identity: Identity },
    OpenProposals,
    CloseProposals,
    OpenVoting,
    CloseVoting,
    SubmitProposal { description: String },
    CastVote { proposal_index: ProposalIndex },
    Tally,
}

impl Command {
    /// Operation name, as used in logs and phase errors.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::OpenProposals => "open_proposals",
            Command::CloseProposals => "close_proposals",
            Command::OpenVoting => "open_voting",
            Command::CloseVoting => "close_voting",
            Command::SubmitProposal { .. } => "submit_proposal",
            Command::CastVote { .. } => "cast_vote",
            Command::Tally => "tally",
        }
    }
}

/// What an accepted command produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    ProposalRegistered(ProposalIndex),
    Winner(ProposalIndex),
}

/// An accepted command and the caller that issued it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub caller: Identity,
    pub command: Command,
}
