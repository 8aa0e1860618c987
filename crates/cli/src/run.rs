//! Replay of a signed call log against one election.

use anyhow::{Context, Result};
use ezballot_core::{Election, Hash, IdentityGate, Notifier, Snapshot};
use std::collections::HashSet;
use std::io::BufRead;
use tracing::{debug, info, warn};

use crate::call::SignedCall;

/// Summary of a replay.
pub struct Report {
    pub accepted: usize,
    pub rejected: usize,
    pub snapshot: Snapshot,
    pub hash: Hash,
}

/// Verify and dispatch every call in `reader` (one JSON `SignedCall` per
/// line, blank lines ignored). Rejected calls are logged and skipped; a line
/// that is not a signed call aborts the run.
///
/// Each signed call is dispatched at most once: a later line carrying the
/// same signed content is rejected as a duplicate.
pub fn run_calls<R: BufRead>(
    gate: IdentityGate,
    notifier: Box<dyn Notifier>,
    reader: R,
) -> Result<Report> {
    info!(administrator = %gate.administrator(), "starting election");
    let mut election = Election::new(Box::new(gate), notifier);
    let mut accepted = 0;
    let mut rejected = 0;
    let mut seen = HashSet::new();

    for (number, line) in reader.lines().enumerate() {
        let number = number + 1;
        let line = line.with_context(|| format!("failed to read line {number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let call: SignedCall = serde_json::from_str(&line)
            .with_context(|| format!("line {number} is not a signed call"))?;

        let caller = match call.verify() {
            Ok(caller) => caller,
            Err(e) => {
                warn!(line = number, error = %e, "call failed verification");
                rejected += 1;
                continue;
            }
        };

        if !seen.insert(call.digest()?) {
            warn!(line = number, caller = %caller, "duplicate call");
            rejected += 1;
            continue;
        }

        let operation = call.command.name();
        match election.dispatch(&caller, call.command) {
            Ok(outcome) => {
                debug!(line = number, operation, ?outcome, "call accepted");
                accepted += 1;
            }
            Err(e) => {
                warn!(line = number, operation, caller = %caller, error = %e, "call rejected");
                rejected += 1;
            }
        }
    }

    let snapshot = election.snapshot();
    let hash = snapshot.hash()?;
    info!(accepted, rejected, phase = %snapshot.phase, %hash, "replay finished");

    Ok(Report {
        accepted,
        rejected,
        snapshot,
        hash,
    })
}
