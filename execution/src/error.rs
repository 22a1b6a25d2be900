use craps_types::{BetType, Phase, RulesError};
use thiserror::Error as ThisError;

use crate::collaborators::Operation;

/// Every way an engine operation can be refused.
///
/// All of these are raised before any state is mutated.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum CrapsError {
    #[error("invalid phase transition ({action} in {phase:?})")]
    InvalidPhaseTransition { action: &'static str, phase: Phase },
    #[error("invalid bet type (code={0})")]
    InvalidBetType(u8),
    #[error("bet not allowed in phase (bet={bet_type:?}, phase={phase:?})")]
    BetNotAllowedInPhase { bet_type: BetType, phase: Phase },
    #[error("bet not offered under the table rules (bet={0:?})")]
    BetNotOffered(BetType),
    #[error("duplicate bet (bet={0:?})")]
    DuplicateBet(BetType),
    #[error("insufficient funds (amount={amount}): {reason}")]
    InsufficientFunds { amount: u64, reason: String },
    #[error("unresolved pending roll (request={0})")]
    UnresolvedPendingRoll(u64),
    #[error("bet amount must be greater than zero")]
    ZeroAmount,
    #[error("bet amount outside table limits (amount={amount}, min={min}, max={max})")]
    BetOutOfLimits { amount: u64, min: u64, max: u64 },
    #[error("bet not found (bet={0:?})")]
    BetNotFound(BetType),
    #[error("bet cannot be removed once a point is set (bet={0:?})")]
    BetNotRemovable(BetType),
    #[error("odds require an active line bet (odds={0:?})")]
    NoLineBet(BetType),
    #[error("invalid dice (d1={d1}, d2={d2})")]
    InvalidDice { d1: u8, d2: u8 },
    #[error("unauthorized ({0:?})")]
    Unauthorized(Operation),
    #[error("unknown roll request (request={0})")]
    UnknownRollRequest(u64),
    #[error("no roll pending")]
    NoRollPending,
    #[error("series not found (id={0})")]
    SeriesNotFound(u64),
    #[error("payout overflow (bet={0:?})")]
    PayoutOverflow(BetType),
    #[error("invalid rules: {0}")]
    InvalidRules(String),
    #[error("random source failed: {0}")]
    RandomSource(String),
}

impl From<RulesError> for CrapsError {
    fn from(err: RulesError) -> Self {
        CrapsError::InvalidRules(err.to_string())
    }
}
