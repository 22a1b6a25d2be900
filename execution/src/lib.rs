//! Craps rules engine.
//!
//! This crate contains the deterministic state machines for a craps table: the series phase
//! machine ([`GameState`]), the per-player bet book ([`BetRegistry`]), fixed-point settlement
//! ([`SettlementEngine`]) and the coordinator that runs the two-phase roll protocol against
//! injected collaborators ([`Table`]).
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside the engine.
//! - Do not generate randomness inside the engine; dice only arrive through `fulfill_roll`.
//! - Avoid iteration order of hash-based collections influencing outputs.
//! - Payouts are integer arithmetic only; overflow aborts the roll instead of wrapping.
//!
//! ## Atomicity
//! A roll either commits in full (series, archive, bets, custody credits) or not at all. Every
//! settlement is computed before the first mutation.
//!
//! ## Minimal table (example)
//! ```rust,ignore
//! # #[cfg(feature = "mocks")]
//! # {
//! use craps_execution::mocks::{create_account, AllowAll, MemoryLedger, ScriptedDice};
//! use craps_execution::Table;
//! use craps_types::{BetType, TableRules};
//!
//! let shooter = create_account(1);
//! let mut ledger = MemoryLedger::default();
//! ledger.deposit(&shooter, 1_000);
//!
//! let dice = ScriptedDice::new([(3, 4)]);
//! let mut table = Table::new(TableRules::default(), ledger, AllowAll, dice)?;
//! table.start_new_series(&shooter, shooter.clone())?;
//! table.place_bet(&shooter, BetType::Pass.code(), 100)?;
//! table.request_roll(&shooter)?;
//! let report = table.poll_roll(&shooter)?.expect("scripted dice are ready");
//! assert_eq!(report.credited, 200);
//! # }
//! ```

pub mod archive;
pub mod bet_registry;
pub mod collaborators;
pub mod error;
pub mod game_state;
pub mod paytable;
pub mod rng;
pub mod settlement;
pub mod table;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;



pub use archive::{SeriesArchive, SeriesSummary};
pub use bet_registry::{can_place_bet, parse_bet_code, BetChange, BetRegistry};
pub use collaborators::{AccessPolicy, Custody, Operation, RandomSource};
pub use error::CrapsError;
pub use game_state::{GameState, SeriesStep, Transition};
pub use paytable::{calculate_payout, field_payout};
pub use rng::{
    compute_commit, dice_from_reveal, verify_commit_reveal, CommitRevealPair, HashChain,
    HashChainDice, RngDice, COMMIT_REVEAL_LEN,
};
pub use settlement::{Payout, Resolution, Settlement, SettlementEngine, SettlementPlan};
pub use table::{RollReport, RollRequest, Table};
