//! Participant and proposal records.

use crate::Identity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a proposal in the append-only proposal sequence.
pub type ProposalIndex = usize;

/// Registry of participants keyed by identity.
pub type Participants = BTreeMap<Identity, Participant>;

/// Description of the sentinel proposal at index 0.
pub const GENESIS_DESCRIPTION: &str = "GENESIS";

/// A participant's record. `Default` is the record of an identity that was
/// never registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub is_registered: bool,
    pub has_voted: bool,
    /// Only meaningful once `has_voted` is set.
    pub voted_proposal_index: ProposalIndex,
}

impl Participant {
    pub(crate) fn registered() -> Self {
        Self {
            is_registered: true,
            ..Self::default()
        }
    }
}

/// A described option accumulating votes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub description: String,
    pub vote_count: u64,
}

impl Proposal {
    pub(crate) fn new(description: String) -> Self {
        Self {
            description,
            vote_count: 0,
        }
    }

    pub(crate) fn genesis() -> Self {
        Self::new(GENESIS_DESCRIPTION.to_string())
    }

    pub fn is_genesis(&self, index: ProposalIndex) -> bool {
        index == 0 && self.description == GENESIS_DESCRIPTION
    }
}

/// Index of the winning proposal: the running winner starts at index 0 and
/// only moves on a strictly greater count, so ties go to the earliest index.
pub(crate) fn winning_index(proposals: &[Proposal]) -> ProposalIndex {
    let mut winner = 0;
    for (index, proposal) in proposals.iter().enumerate() {
        if proposal.vote_count > proposals[winner].vote_count {
            winner = index;
        }
    }
    winner
}
