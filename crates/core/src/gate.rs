//! Access gate: the capability checks the election consults before honoring
//! an operation.

use crate::{Identity, Participants};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A capability an operation can require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Administrator,
    Participant,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Administrator => f.write_str("administrator"),
            Capability::Participant => f.write_str("participant"),
        }
    }
}

/// Trait for answering capability checks.
pub trait AccessGate: Send + Sync {
    /// Whether the identity administers the election.
    fn is_administrator(&self, identity: &Identity) -> bool;

    /// Whether the identity is a registered participant, given the
    /// election's current registry.
    fn is_registered_participant(&self, identity: &Identity, participants: &Participants) -> bool;

    fn has_capability(
        &self,
        identity: &Identity,
        capability: Capability,
        participants: &Participants,
    ) -> bool {
        match capability {
            Capability::Administrator => self.is_administrator(identity),
            Capability::Participant => self.is_registered_participant(identity, participants),
        }
    }
}

/// Grants every capability to everyone. Only useful in tests.
pub struct AlwaysAllow;

impl AccessGate for AlwaysAllow {
    fn is_administrator(&self, _identity: &Identity) -> bool {
        true
    }

    fn is_registered_participant(
        &self,
        _identity: &Identity,
        _participants: &Participants,
    ) -> bool {
        true
    }
}

/// Production gate: one fixed administrator, participants are whoever the
/// registry marks as registered.
#[derive(Clone, Debug)]
pub struct IdentityGate {
    administrator: Identity,
}

impl IdentityGate {
    pub fn new(administrator: Identity) -> Self {
        Self { administrator }
    }

    pub fn administrator(&self) -> Identity {
        self.administrator
    }
}

impl AccessGate for IdentityGate {
    fn is_administrator(&self, identity: &Identity) -> bool {
        *identity == self.administrator
    }

    fn is_registered_participant(&self, identity: &Identity, participants: &Participants) -> bool {
        participants
            .get(identity)
            .is_some_and(|participant| participant.is_registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Participant;

    #[test]
    fn identity_gate_checks_administrator() {
        let admin = Identity::from_bytes([1; 32]);
        let other = Identity::from_bytes([2; 32]);
        let gate = IdentityGate::new(admin);
        let participants = Participants::new();

        assert!(gate.has_capability(&admin, Capability::Administrator, &participants));
        assert!(!gate.has_capability(&other, Capability::Administrator, &participants));
    }

    #[test]
    fn identity_gate_consults_registry() {
        let admin = Identity::from_bytes([1; 32]);
        let voter = Identity::from_bytes([2; 32]);
        let gate = IdentityGate::new(admin);

        let mut participants = Participants::new();
        assert!(!gate.is_registered_participant(&voter, &participants));

        // A record that exists but is not registered does not count
        participants.insert(voter, Participant::default());
        assert!(!gate.is_registered_participant(&voter, &participants));

        participants.insert(voter, Participant::registered());
        assert!(gate.is_registered_participant(&voter, &participants));

        // The administrator is not implicitly a participant
        assert!(!gate.is_registered_participant(&admin, &participants));
    }

    #[test]
    fn always_allow_grants_everything() {
        let anyone = Identity::from_bytes([9; 32]);
        let participants = Participants::new();
        assert!(AlwaysAllow.has_capability(&anyone, Capability::Administrator, &participants));
        assert!(AlwaysAllow.has_capability(&anyone, Capability::Participant, &participants));
    }
}
