//! Signed calls: how the host resolves who issued a command.
//!
//! A call carries the caller's ed25519 public key, the command, a timestamp
//! and a signature over the CBOR encoding of the first three. Verifying the
//! call yields the caller [`Identity`] that the election is driven with.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use ezballot_core::{Command, Hash, Identity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a signed call cannot be attributed to a caller.
#[derive(Debug, Error)]
pub enum CallError {
    /// Signature does not verify against the claimed public key.
    #[error("invalid signature for caller: {0}")]
    InvalidSignature(Identity),

    /// Claimed public key is not a valid ed25519 point.
    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<ciborium::ser::Error<std::io::Error>> for CallError {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        CallError::Encoding(e.to_string())
    }
}

/// Identity owning an ed25519 verifying key.
pub fn identity_of(key: &VerifyingKey) -> Identity {
    Identity::from_public_key(key.as_bytes())
}

/// A command signed by its caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedCall {
    /// Caller's ed25519 public key.
    #[serde(with = "hex::serde")]
    pub public_key: [u8; 32],

    /// What the caller asks for.
    pub command: Command,

    /// Unix timestamp in milliseconds. Makes otherwise identical calls
    /// distinct.
    pub timestamp: u64,

    /// Ed25519 signature over the call content.
    #[serde(with = "hex::serde")]
    pub signature: [u8; 64],
}

impl SignedCall {
    /// Create a call stamped with the current time and sign it.
    pub fn new(command: Command, signing_key: &SigningKey) -> Result<Self, CallError> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();

        Self::new_at(command, timestamp, signing_key)
    }

    /// Create a call with an explicit timestamp and sign it.
    pub fn new_at(
        command: Command,
        timestamp: u64,
        signing_key: &SigningKey,
    ) -> Result<Self, CallError> {
        let mut call = Self {
            public_key: signing_key.verifying_key().to_bytes(),
            command,
            timestamp,
            signature: [0u8; 64],
        };

        let content = call.signable_content()?;
        call.signature = signing_key.sign(&content).to_bytes();

        Ok(call)
    }

    /// Check the signature and return the caller's identity.
    pub fn verify(&self) -> Result<Identity, CallError> {
        let key = VerifyingKey::from_bytes(&self.public_key)
            .map_err(|_| CallError::InvalidPublicKey)?;
        let caller = identity_of(&key);

        let signature = Signature::from_bytes(&self.signature);
        let content = self.signable_content()?;

        key.verify_strict(&content, &signature)
            .map_err(|_| CallError::InvalidSignature(caller))?;

        Ok(caller)
    }

    /// Hash of the signed content. Two calls share a digest exactly when the
    /// same key signed the same command at the same timestamp, whatever
    /// signature bytes accompany them.
    pub fn digest(&self) -> Result<Hash, CallError> {
        Ok(Hash::of(&self.signable_content()?))
    }

    /// Content covered by the signature (everything except the signature).
    fn signable_content(&self) -> Result<Vec<u8>, CallError> {
        let signable = SignableCall {
            public_key: &self.public_key,
            command: &self.command,
            timestamp: self.timestamp,
        };

        let mut buf = Vec::new();
        ciborium::into_writer(&signable, &mut buf)?;
        Ok(buf)
    }
}

#[derive(Serialize)]
struct SignableCall<'a> {
    public_key: &'a [u8; 32],
    command: &'a Command,
    timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn signed_call_verifies_to_signer() {
        let key = SigningKey::generate(&mut OsRng);
        let call = SignedCall::new(Command::OpenProposals, &key).unwrap();

        assert_eq!(call.verify().unwrap(), identity_of(&key.verifying_key()));
    }

    #[test]
    fn tampered_command_is_rejected() {
        let key = SigningKey::generate(&mut OsRng);
        let mut call = SignedCall::new(Command::CastVote { proposal_index: 1 }, &key).unwrap();
        call.command = Command::CastVote { proposal_index: 2 };

        assert!(matches!(call.verify(), Err(CallError::InvalidSignature(_))));
    }

    #[test]
    fn swapped_public_key_is_rejected() {
        let key = SigningKey::generate(&mut OsRng);
        let other = SigningKey::generate(&mut OsRng);
        let mut call = SignedCall::new(Command::Tally, &key).unwrap();
        call.public_key = other.verifying_key().to_bytes();

        let expected = identity_of(&other.verifying_key());
        let err = call.verify().unwrap_err();
        assert!(matches!(err, CallError::InvalidSignature(id) if id == expected));
    }

    #[test]
    fn json_roundtrip_still_verifies() {
        let key = SigningKey::generate(&mut OsRng);
        let call = SignedCall::new_at(
            Command::SubmitProposal {
                description: "Fund the library".to_string(),
            },
            1_700_000_000_000,
            &key,
        )
        .unwrap();

        let json = serde_json::to_string(&call).unwrap();
        let back: SignedCall = serde_json::from_str(&json).unwrap();
        assert!(back.verify().is_ok());
        assert_eq!(back.digest().unwrap(), call.digest().unwrap());
    }

    #[test]
    fn digest_tracks_timestamp() {
        let key = SigningKey::from_bytes(&[4; 32]);
        let a = SignedCall::new_at(Command::OpenVoting, 1, &key).unwrap();
        let b = SignedCall::new_at(Command::OpenVoting, 2, &key).unwrap();
        let again = SignedCall::new_at(Command::OpenVoting, 1, &key).unwrap();

        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
        assert_eq!(a.digest().unwrap(), again.digest().unwrap());
    }
}
