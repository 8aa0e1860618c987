//! Point-in-time copies of an election's data.

use crate::{Error, Hash, Participants, Proposal, ProposalIndex, WorkflowPhase};
use serde::{Deserialize, Serialize};

/// Everything an election owns, minus its gate and notifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: WorkflowPhase,
    pub proposals: Vec<Proposal>,
    pub participants: Participants,
    pub winning_proposal_index: Option<ProposalIndex>,
}

impl Snapshot {
    /// Content hash of the CBOR encoding. Participants are ordered by
    /// identity, so registration order does not change the hash.
    pub fn hash(&self) -> Result<Hash, Error> {
        Hash::of_value(self)
    }

    /// Total votes across all proposals.
    pub fn total_votes(&self) -> u64 {
        self.proposals.iter().map(|p| p.vote_count).sum()
    }

    /// Number of participants that have voted.
    pub fn voters(&self) -> usize {
        self.participants.values().filter(|p| p.has_voted).count()
    }
}
