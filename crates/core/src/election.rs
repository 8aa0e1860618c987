//! The election state machine: gates every operation on phase and
//! capability, applies it, journals it, then notifies.

use crate::{
    AccessGate, Capability, Command, Error, Identity, JournalEntry, Notification, Notifier,
    Outcome, Participant, Participants, Proposal, ProposalIndex, Snapshot, WorkflowPhase,
    model::winning_index,
};
use std::fmt;
use tracing::debug;

/// A single-use election.
///
/// Every mutating operation checks, in order, the caller's capability, the
/// current phase, then its own arguments. All checks run before any write,
/// so a failed call changes nothing and notifies nobody.
pub struct Election {
    /// Current workflow phase.
    phase: WorkflowPhase,

    /// Append-only; a proposal's position is its identifier.
    proposals: Vec<Proposal>,

    /// Participant registry.
    participants: Participants,

    /// Set by `tally`.
    winning_proposal_index: Option<ProposalIndex>,

    /// Accepted commands in order of application.
    journal: Vec<JournalEntry>,

    /// Capability checks.
    gate: Box<dyn AccessGate>,

    /// Receives one notification per accepted operation.
    notifier: Box<dyn Notifier>,
}

impl Election {
    /// Create an election in `RegisteringParticipants`.
    pub fn new(gate: Box<dyn AccessGate>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            phase: WorkflowPhase::default(),
            proposals: Vec::new(),
            participants: Participants::new(),
            winning_proposal_index: None,
            journal: Vec::new(),
            gate,
            notifier,
        }
    }

    /// Rebuild an election by dispatching a journal in order. Fails on the
    /// first entry the election rejects.
    pub fn replay<I>(
        gate: Box<dyn AccessGate>,
        notifier: Box<dyn Notifier>,
        journal: I,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = JournalEntry>,
    {
        let mut election = Self::new(gate, notifier);
        for (position, entry) in journal.into_iter().enumerate() {
            election
                .dispatch(&entry.caller, entry.command)
                .map_err(|source| Error::Replay {
                    position,
                    source: Box::new(source),
                })?;
        }
        Ok(election)
    }

    // =========================================================================
    // Administrator operations
    // =========================================================================

    /// Register an identity as a participant.
    pub fn register(&mut self, caller: &Identity, identity: Identity) -> Result<(), Error> {
        self.require(caller, Capability::Administrator)?;
        self.require_phase("register", WorkflowPhase::RegisteringParticipants)?;
        if self.is_registered(&identity) {
            return Err(Error::AlreadyRegistered(identity));
        }

        self.participants.insert(identity, Participant::registered());

        self.commit(caller, Command::Register { identity });
        self.emit(Notification::ParticipantRegistered { identity });
        Ok(())
    }

    /// Open proposal registration. Creates the sentinel proposal at index 0.
    pub fn open_proposals(&mut self, caller: &Identity) -> Result<(), Error> {
        let (from, to) = self.check_advance(
            caller,
            "open_proposals",
            WorkflowPhase::RegisteringParticipants,
        )?;

        self.phase = to;
        self.proposals.push(Proposal::genesis());

        self.commit(caller, Command::OpenProposals);
        self.emit(Notification::PhaseChanged { from, to });
        Ok(())
    }

    pub fn close_proposals(&mut self, caller: &Identity) -> Result<(), Error> {
        self.advance(caller, Command::CloseProposals, WorkflowPhase::ProposalsOpen)
    }

    pub fn open_voting(&mut self, caller: &Identity) -> Result<(), Error> {
        self.advance(caller, Command::OpenVoting, WorkflowPhase::ProposalsClosed)
    }

    pub fn close_voting(&mut self, caller: &Identity) -> Result<(), Error> {
        self.advance(caller, Command::CloseVoting, WorkflowPhase::VotingOpen)
    }

    /// Compute the winner and move to the terminal phase.
    pub fn tally(&mut self, caller: &Identity) -> Result<ProposalIndex, Error> {
        let (from, to) = self.check_advance(caller, "tally", WorkflowPhase::VotingClosed)?;

        let winner = winning_index(&self.proposals);
        self.winning_proposal_index = Some(winner);
        self.phase = to;

        self.commit(caller, Command::Tally);
        self.emit(Notification::PhaseChanged { from, to });
        Ok(winner)
    }

    // =========================================================================
    // Participant operations
    // =========================================================================

    /// Append a proposal and return its index.
    pub fn submit_proposal(
        &mut self,
        caller: &Identity,
        description: &str,
    ) -> Result<ProposalIndex, Error> {
        self.require(caller, Capability::Participant)?;
        self.require_phase("submit_proposal", WorkflowPhase::ProposalsOpen)?;
        if description.is_empty() {
            return Err(Error::EmptyProposal);
        }

        self.proposals.push(Proposal::new(description.to_string()));
        let index = self.proposals.len() - 1;

        self.commit(
            caller,
            Command::SubmitProposal {
                description: description.to_string(),
            },
        );
        self.emit(Notification::ProposalRegistered { index });
        Ok(index)
    }

    /// Cast the caller's single vote.
    pub fn cast_vote(
        &mut self,
        caller: &Identity,
        proposal_index: ProposalIndex,
    ) -> Result<(), Error> {
        self.require(caller, Capability::Participant)?;
        self.require_phase("cast_vote", WorkflowPhase::VotingOpen)?;
        if self.participant_record(caller).has_voted {
            return Err(Error::AlreadyVoted(*caller));
        }
        let count = self.proposals.len();
        if proposal_index >= count {
            return Err(Error::ProposalNotFound {
                index: proposal_index,
                count,
            });
        }

        let voter = self.participants.entry(*caller).or_default();
        voter.has_voted = true;
        voter.voted_proposal_index = proposal_index;
        self.proposals[proposal_index].vote_count += 1;

        self.commit(caller, Command::CastVote { proposal_index });
        self.emit(Notification::VoteCast {
            identity: *caller,
            index: proposal_index,
        });
        Ok(())
    }

    /// Route a command to its operation.
    pub fn dispatch(&mut self, caller: &Identity, command: Command) -> Result<Outcome, Error> {
        let name = command.name();
        let result = match command {
            Command::Register { identity } => {
                self.register(caller, identity).map(|_| Outcome::Applied)
            }
            Command::OpenProposals => self.open_proposals(caller).map(|_| Outcome::Applied),
            Command::CloseProposals => self.close_proposals(caller).map(|_| Outcome::Applied),
            Command::OpenVoting => self.open_voting(caller).map(|_| Outcome::Applied),
            Command::CloseVoting => self.close_voting(caller).map(|_| Outcome::Applied),
            Command::SubmitProposal { description } => self
                .submit_proposal(caller, &description)
                .map(Outcome::ProposalRegistered),
            Command::CastVote { proposal_index } => {
                self.cast_vote(caller, proposal_index).map(|_| Outcome::Applied)
            }
            Command::Tally => self.tally(caller).map(Outcome::Winner),
        };

        if let Err(e) = &result {
            debug!(operation = name, caller = %caller, error = %e, "command rejected");
        }

        result
    }

    // =========================================================================
    // Queries (registered participants only)
    // =========================================================================

    pub fn current_phase(&self, caller: &Identity) -> Result<WorkflowPhase, Error> {
        self.require_reader(caller)?;
        Ok(self.phase)
    }

    /// Record for any identity; never-registered identities get the
    /// zero-value record.
    pub fn participant(
        &self,
        caller: &Identity,
        identity: &Identity,
    ) -> Result<Participant, Error> {
        self.require_reader(caller)?;
        Ok(self.participant_record(identity))
    }

    pub fn proposal(&self, caller: &Identity, index: ProposalIndex) -> Result<&Proposal, Error> {
        self.require_reader(caller)?;
        self.proposals.get(index).ok_or(Error::IndexOutOfRange {
            index,
            count: self.proposals.len(),
        })
    }

    pub fn proposal_count(&self, caller: &Identity) -> Result<usize, Error> {
        self.require_reader(caller)?;
        Ok(self.proposals.len())
    }

    /// `None` until the election is tallied.
    pub fn winning_proposal_index(
        &self,
        caller: &Identity,
    ) -> Result<Option<ProposalIndex>, Error> {
        self.require_reader(caller)?;
        Ok(self.winning_proposal_index)
    }

    // =========================================================================
    // Host access
    // =========================================================================

    /// Copy of the election's data, for auditing and persistence by the host.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            proposals: self.proposals.clone(),
            participants: self.participants.clone(),
            winning_proposal_index: self.winning_proposal_index,
        }
    }

    /// Accepted commands in order of application.
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require(&self, caller: &Identity, capability: Capability) -> Result<(), Error> {
        if self.gate.has_capability(caller, capability, &self.participants) {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                identity: *caller,
                required: capability,
            })
        }
    }

    fn require_reader(&self, caller: &Identity) -> Result<(), Error> {
        if self.gate.is_registered_participant(caller, &self.participants) {
            Ok(())
        } else {
            Err(Error::IdentityNotRegistered(*caller))
        }
    }

    fn require_phase(&self, operation: &'static str, expected: WorkflowPhase) -> Result<(), Error> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::Phase {
                operation,
                expected,
                actual: self.phase,
            })
        }
    }

    /// Administrator check plus phase check for a transition out of `from`.
    fn check_advance(
        &self,
        caller: &Identity,
        operation: &'static str,
        from: WorkflowPhase,
    ) -> Result<(WorkflowPhase, WorkflowPhase), Error> {
        self.require(caller, Capability::Administrator)?;
        self.require_phase(operation, from)?;
        // Only `Tallied` has no successor, and no operation starts there.
        let to = from.next().ok_or(Error::Phase {
            operation,
            expected: from,
            actual: self.phase,
        })?;
        Ok((from, to))
    }

    /// Plain one-step transition with no other effect.
    fn advance(
        &mut self,
        caller: &Identity,
        command: Command,
        from: WorkflowPhase,
    ) -> Result<(), Error> {
        let (from, to) = self.check_advance(caller, command.name(), from)?;

        self.phase = to;

        self.commit(caller, command);
        self.emit(Notification::PhaseChanged { from, to });
        Ok(())
    }

    fn is_registered(&self, identity: &Identity) -> bool {
        self.participants
            .get(identity)
            .is_some_and(|participant| participant.is_registered)
    }

    fn participant_record(&self, identity: &Identity) -> Participant {
        self.participants.get(identity).copied().unwrap_or_default()
    }

    fn commit(&mut self, caller: &Identity, command: Command) {
        debug!(
            operation = command.name(),
            caller = %caller,
            phase = %self.phase,
            "command applied"
        );
        self.journal.push(JournalEntry {
            caller: *caller,
            command,
        });
    }

    fn emit(&self, notification: Notification) {
        self.notifier.notify(&notification);
    }
}

impl fmt::Debug for Election {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Election")
            .field("phase", &self.phase)
            .field("proposals", &self.proposals.len())
            .field("participants", &self.participants.len())
            .field("winning_proposal_index", &self.winning_proposal_index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlwaysAllow, ErrorKind, IdentityGate, RecordingNotifier};

    fn admin() -> Identity {
        Identity::from_bytes([0xAA; 32])
    }

    fn voter(n: u8) -> Identity {
        Identity::from_bytes([n; 32])
    }

    fn election() -> (Election, RecordingNotifier) {
        let recorder = RecordingNotifier::new();
        let election = Election::new(
            Box::new(IdentityGate::new(admin())),
            Box::new(recorder.clone()),
        );
        (election, recorder)
    }

    #[test]
    fn register_marks_participant() {
        let (mut e, rec) = election();
        e.register(&admin(), voter(1)).unwrap();

        assert!(e.participants[&voter(1)].is_registered);
        assert!(!e.participants[&voter(1)].has_voted);
        assert_eq!(
            rec.notifications(),
            vec![Notification::ParticipantRegistered { identity: voter(1) }]
        );
    }

    #[test]
    fn register_twice_fails_without_side_effects() {
        let (mut e, rec) = election();
        e.register(&admin(), voter(1)).unwrap();

        let err = e.register(&admin(), voter(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyRegistered);
        assert_eq!(rec.len(), 1);
        assert_eq!(e.journal.len(), 1);
    }

    #[test]
    fn opening_proposals_creates_sentinel() {
        let (mut e, _) = election();
        assert!(e.proposals.is_empty());

        e.open_proposals(&admin()).unwrap();

        assert_eq!(e.phase, WorkflowPhase::ProposalsOpen);
        assert_eq!(e.proposals.len(), 1);
        assert!(e.proposals[0].is_genesis(0));
        assert_eq!(e.proposals[0].vote_count, 0);
    }

    #[test]
    fn vote_updates_record_and_count() {
        let (mut e, _) = election();
        e.register(&admin(), voter(1)).unwrap();
        e.open_proposals(&admin()).unwrap();
        e.submit_proposal(&voter(1), "Proposal A").unwrap();
        e.close_proposals(&admin()).unwrap();
        e.open_voting(&admin()).unwrap();

        e.cast_vote(&voter(1), 1).unwrap();

        let record = e.participants[&voter(1)];
        assert!(record.has_voted);
        assert_eq!(record.voted_proposal_index, 1);
        assert_eq!(e.proposals[1].vote_count, 1);
        assert_eq!(e.proposals[0].vote_count, 0);
    }

    #[test]
    fn already_voted_is_checked_before_range() {
        let (mut e, _) = election();
        e.register(&admin(), voter(1)).unwrap();
        e.open_proposals(&admin()).unwrap();
        e.close_proposals(&admin()).unwrap();
        e.open_voting(&admin()).unwrap();
        e.cast_vote(&voter(1), 0).unwrap();

        let err = e.cast_vote(&voter(1), 99).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyVoted);
    }

    #[test]
    fn authorization_is_checked_before_phase() {
        let (mut e, _) = election();
        // Wrong phase and wrong caller: the capability failure wins
        let err = e.tally(&voter(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = e.tally(&admin()).unwrap_err();
        assert!(matches!(
            err,
            Error::Phase {
                operation: "tally",
                expected: WorkflowPhase::VotingClosed,
                actual: WorkflowPhase::RegisteringParticipants,
            }
        ));
    }

    #[test]
    fn phase_is_checked_before_arguments() {
        let (mut e, _) = election();
        e.register(&admin(), voter(1)).unwrap();
        let err = e.submit_proposal(&voter(1), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Phase);
    }

    #[test]
    fn always_allow_lets_anyone_drive() {
        let mut e = Election::new(Box::new(AlwaysAllow), Box::new(()));
        let anyone = voter(7);
        e.open_proposals(&anyone).unwrap();
        e.submit_proposal(&anyone, "x").unwrap();
        e.close_proposals(&anyone).unwrap();
        e.open_voting(&anyone).unwrap();
        e.cast_vote(&anyone, 1).unwrap();
        e.close_voting(&anyone).unwrap();
        assert_eq!(e.tally(&anyone).unwrap(), 1);
        // The vote still landed in the registry even without registration
        assert!(e.participants[&anyone].has_voted);
    }

    #[test]
    fn winner_unset_until_tally() {
        let (mut e, _) = election();
        e.register(&admin(), voter(1)).unwrap();
        assert_eq!(e.winning_proposal_index(&voter(1)).unwrap(), None);
        e.open_proposals(&admin()).unwrap();
        e.close_proposals(&admin()).unwrap();
        e.open_voting(&admin()).unwrap();
        e.close_voting(&admin()).unwrap();
        e.tally(&admin()).unwrap();
        assert_eq!(e.winning_proposal_index(&voter(1)).unwrap(), Some(0));
    }

    #[test]
    fn debug_does_not_need_gate() {
        let (e, _) = election();
        let rendered = format!("{e:?}");
        assert!(rendered.contains("RegisteringParticipants"));
    }
}
