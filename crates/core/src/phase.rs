//! The workflow phase chain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an election. Phases advance one step at a time and never
/// go back; `Tallied` is terminal.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    #[default]
    RegisteringParticipants,
    ProposalsOpen,
    ProposalsClosed,
    VotingOpen,
    VotingClosed,
    Tallied,
}

impl WorkflowPhase {
    /// Every phase, in workflow order.
    pub const ALL: [WorkflowPhase; 6] = [
        WorkflowPhase::RegisteringParticipants,
        WorkflowPhase::ProposalsOpen,
        WorkflowPhase::ProposalsClosed,
        WorkflowPhase::VotingOpen,
        WorkflowPhase::VotingClosed,
        WorkflowPhase::Tallied,
    ];

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<WorkflowPhase> {
        match self {
            WorkflowPhase::RegisteringParticipants => Some(WorkflowPhase::ProposalsOpen),
            WorkflowPhase::ProposalsOpen => Some(WorkflowPhase::ProposalsClosed),
            WorkflowPhase::ProposalsClosed => Some(WorkflowPhase::VotingOpen),
            WorkflowPhase::VotingOpen => Some(WorkflowPhase::VotingClosed),
            WorkflowPhase::VotingClosed => Some(WorkflowPhase::Tallied),
            WorkflowPhase::Tallied => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowPhase::RegisteringParticipants => "registering_participants",
            WorkflowPhase::ProposalsOpen => "proposals_open",
            WorkflowPhase::ProposalsClosed => "proposals_closed",
            WorkflowPhase::VotingOpen => "voting_open",
            WorkflowPhase::VotingClosed => "voting_closed",
            WorkflowPhase::Tallied => "tallied",
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_linear() {
        for pair in WorkflowPhase::ALL.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0] < pair[1]);
        }
        assert!(WorkflowPhase::Tallied.is_terminal());
        assert_eq!(
            WorkflowPhase::ALL.iter().filter(|p| p.is_terminal()).count(),
            1
        );
    }

    #[test]
    fn starts_registering() {
        assert_eq!(WorkflowPhase::default(), WorkflowPhase::RegisteringParticipants);
    }

    #[test]
    fn display_matches_serde_name() {
        for phase in WorkflowPhase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase));
        }
    }
}
