//! Interfaces to the systems the engine depends on but does not implement.
//!
//! - [`Custody`] holds player funds. Stakes are debited before a bet is accepted and winnings
//!   or returned principal are credited after settlement.
//! - [`AccessPolicy`] decides who may perform each [`Operation`].
//! - [`RandomSource`] produces dice for a request id, possibly some time after the request.

use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;

/// Operations gated by the access policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    StartSeries,
    RequestRoll,
    FulfillRoll,
    EndSeries,
    PlaceBet,
    RemoveBet,
}

impl Operation {
    /// Operations that drive the table rather than manage a player's own bets.
    pub fn is_operator(self) -> bool {
        !matches!(self, Operation::PlaceBet | Operation::RemoveBet)
    }
}

pub trait Custody {
    /// Escrow `amount` from `player`. An error rejects the bet.
    fn debit(&mut self, player: &PublicKey, amount: u64) -> Result<()>;

    /// Pay `amount` to `player`.
    fn credit(&mut self, player: &PublicKey, amount: u64);
}

pub trait AccessPolicy {
    fn authorized(&self, actor: &PublicKey, operation: Operation) -> bool;
}

/// Two-phase dice provider.
///
/// `request` registers interest in `request_id`; `poll` returns the faces once they are
/// available and keeps returning the same faces until `release`. The engine releases a request
/// only after its roll has committed. Faces are validated by the engine, not the source.
pub trait RandomSource {
    fn request(&mut self, request_id: u64) -> Result<()>;
    fn poll(&mut self, request_id: u64) -> Option<(u8, u8)>;
    fn release(&mut self, request_id: u64);
}
