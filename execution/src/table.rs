//! Table coordinator.
//!
//! [`Table`] ties the pure engines ([`GameState`], [`BetRegistry`], [`SettlementEngine`]) to the
//! collaborators that hold money, decide permissions and produce dice. It is the only place
//! that mutates more than one of them, and the only module that logs.
//!
//! ## Roll protocol
//!
//! 1. **Request** - `request_roll` checks the phase, asks the [`RandomSource`] for dice and
//!    returns a [`RollRequest`] token. While the token is outstanding no other roll can be
//!    requested and the series cannot be force-ended; bets can still be placed and removed.
//! 2. **Fulfil** - `fulfill_roll(token, d1, d2)` validates the dice, computes the next series
//!    and the full settlement plan, and only then commits: series, archive, bets, custody.
//!
//! `poll_roll` drives step 2 from the table's own [`RandomSource`].
//!
//! A failed fulfilment leaves everything as it was, including the outstanding token and the
//! source's dice for it; the request is released only once its roll has committed.

use commonware_cryptography::ed25519::PublicKey;
use craps_types::{BetKey, BetType, Phase, Roll, Series, TableRules};
use tracing::{debug, info, warn};

use crate::{
    archive::SeriesArchive,
    bet_registry::BetRegistry,
    collaborators::{AccessPolicy, Custody, Operation, RandomSource},
    game_state::{GameState, SeriesStep, Transition},
    settlement::{Settlement, SettlementEngine},
    CrapsError,
};

/// Token for an outstanding roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollRequest {
    pub request_id: u64,
    pub series_id: u64,
}

/// Everything a committed roll (or forced end) did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollReport {
    pub series_id: u64,
    /// `None` for a forced end.
    pub roll: Option<Roll>,
    pub transition: Transition,
    /// Set when the step completed the series.
    pub completed_series: Option<u64>,
    pub settlements: Vec<Settlement>,
    /// Total paid back to players.
    pub credited: u128,
}

pub struct Table<C: Custody, P: AccessPolicy, R: RandomSource> {
    rules: TableRules,
    game: GameState,
    bets: BetRegistry,
    archive: SeriesArchive,
    engine: SettlementEngine,
    pending: Option<RollRequest>,
    next_request_id: u64,
    custody: C,
    policy: P,
    dice: R,
}

impl<C: Custody, P: AccessPolicy, R: RandomSource> Table<C, P, R> {
    pub fn new(rules: TableRules, custody: C, policy: P, dice: R) -> Result<Self, CrapsError> {
        rules.validate()?;
        Ok(Self {
            rules,
            game: GameState::new(rules.carry_trackers_within_hand),
            bets: BetRegistry::new(),
            archive: SeriesArchive::new(),
            engine: SettlementEngine::new(rules),
            pending: None,
            next_request_id: 1,
            custody,
            policy,
            dice,
        })
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.game.phase()
    }

    /// Current point, 0 when none.
    pub fn point(&self) -> u8 {
        self.game.point()
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn current_series(&self) -> Option<&Series> {
        self.game.current()
    }

    /// A completed series by id.
    pub fn series(&self, id: u64) -> Result<&Series, CrapsError> {
        self.archive.get(id)
    }

    pub fn archive(&self) -> &SeriesArchive {
        &self.archive
    }

    pub fn bets(&self) -> &BetRegistry {
        &self.bets
    }

    pub fn pending_request(&self) -> Option<RollRequest> {
        self.pending
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    pub fn dice(&self) -> &R {
        &self.dice
    }

    /// Opens a series for `shooter`.
    pub fn start_new_series(
        &mut self,
        actor: &PublicKey,
        shooter: PublicKey,
    ) -> Result<u64, CrapsError> {
        self.authorize(actor, Operation::StartSeries)?;
        let id = self.game.start_new_series(shooter)?;
        if let Some(series) = self.game.current() {
            self.bets.rebase_repeaters(&series.trackers.repeater_counts);
        }
        info!(series = id, phase = ?self.game.phase(), "series started");
        Ok(id)
    }

    /// Places a bet for `player` on a raw bet code.
    pub fn place_bet(
        &mut self,
        player: &PublicKey,
        code: u8,
        amount: u64,
    ) -> Result<BetKey, CrapsError> {
        self.authorize(player, Operation::PlaceBet)?;
        let result =
            self.bets
                .place_bet(&mut self.custody, &self.game, &self.rules, player, code, amount);
        self.log_placement(player, amount, result)
    }

    /// Backs the player's `line_type` bet with odds.
    pub fn place_odds_bet(
        &mut self,
        player: &PublicKey,
        line_type: BetType,
        amount: u64,
    ) -> Result<BetKey, CrapsError> {
        self.authorize(player, Operation::PlaceBet)?;
        let result = self.bets.place_odds_bet(
            &mut self.custody,
            &self.game,
            &self.rules,
            player,
            line_type,
            amount,
        );
        self.log_placement(player, amount, result)
    }

    /// Takes a bet down, returning the refunded stake.
    pub fn remove_bet(&mut self, player: &PublicKey, key: &BetKey) -> Result<u64, CrapsError> {
        self.authorize(player, Operation::RemoveBet)?;
        let refunded =
            self.bets
                .remove_bet(&mut self.custody, &self.game, &self.rules, player, key)?;
        info!(
            series = self.game.current().map(|series| series.id),
            player = ?player,
            bet_type = ?key.bet_type,
            point = key.point,
            amount = refunded,
            "bet removed"
        );
        Ok(refunded)
    }

    /// Asks the random source for dice and enters the roll-pending state.
    pub fn request_roll(&mut self, actor: &PublicKey) -> Result<RollRequest, CrapsError> {
        self.authorize(actor, Operation::RequestRoll)?;
        if let Some(pending) = self.pending {
            warn!(request = pending.request_id, "roll already pending");
            return Err(CrapsError::UnresolvedPendingRoll(pending.request_id));
        }
        let series_id = match self.game.current() {
            Some(series) => series.id,
            None => {
                return Err(CrapsError::InvalidPhaseTransition {
                    action: "request roll",
                    phase: self.game.phase(),
                })
            }
        };

        let request_id = self.next_request_id;
        self.dice.request(request_id).map_err(|err| {
            warn!(request = request_id, error = %err, "random source refused request");
            CrapsError::RandomSource(err.to_string())
        })?;
        self.next_request_id = request_id.saturating_add(1);

        let request = RollRequest {
            request_id,
            series_id,
        };
        self.pending = Some(request);
        debug!(request = request_id, series = series_id, "roll requested");
        Ok(request)
    }

    /// Resumes the pending roll with the given faces.
    pub fn fulfill_roll(
        &mut self,
        actor: &PublicKey,
        request_id: u64,
        d1: u8,
        d2: u8,
    ) -> Result<RollReport, CrapsError> {
        self.authorize(actor, Operation::FulfillRoll)?;
        let pending = self.pending.ok_or(CrapsError::NoRollPending)?;
        if pending.request_id != request_id {
            warn!(
                request = request_id,
                pending = pending.request_id,
                "stale roll token"
            );
            return Err(CrapsError::UnknownRollRequest(request_id));
        }
        let roll = Roll::new(d1, d2).map_err(|_| CrapsError::InvalidDice { d1, d2 })?;

        let step = self.game.evaluate_roll(roll)?;
        let report = self.commit(step)?;
        self.pending = None;
        self.dice.release(request_id);
        info!(
            request = request_id,
            series = report.series_id,
            d1,
            d2,
            total = roll.total(),
            transition = ?report.transition,
            settled = report.settlements.len(),
            credited = %report.credited,
            "roll fulfilled"
        );
        Ok(report)
    }

    /// Fulfils the pending roll from the table's random source if its dice are ready.
    pub fn poll_roll(&mut self, actor: &PublicKey) -> Result<Option<RollReport>, CrapsError> {
        let pending = self.pending.ok_or(CrapsError::NoRollPending)?;
        let Some((d1, d2)) = self.dice.poll(pending.request_id) else {
            return Ok(None);
        };
        self.fulfill_roll(actor, pending.request_id, d1, d2).map(Some)
    }

    /// Operator override: completes the open series with outcome 7.
    pub fn end_current_series(&mut self, actor: &PublicKey) -> Result<RollReport, CrapsError> {
        self.authorize(actor, Operation::EndSeries)?;
        if let Some(pending) = self.pending {
            warn!(request = pending.request_id, "cannot end series with a roll pending");
            return Err(CrapsError::UnresolvedPendingRoll(pending.request_id));
        }
        let step = self.game.evaluate_end()?;
        let report = self.commit(step)?;
        info!(
            series = report.series_id,
            settled = report.settlements.len(),
            credited = %report.credited,
            "series force-ended"
        );
        Ok(report)
    }

    /// Settles and commits a step. Nothing is mutated unless the whole plan computes.
    fn commit(&mut self, step: SeriesStep) -> Result<RollReport, CrapsError> {
        let plan = self.engine.settle(&step, &self.bets)?;
        let roll = step.roll;
        let transition = step.transition;
        let series_id = step.series.id;

        let completed_series = match self.game.apply(step)? {
            Some(series) => {
                let series = series.clone();
                info!(
                    series = series.id,
                    outcome = series.outcome,
                    end = ?series.end,
                    rolls = series.roll_count(),
                    points_made = series.trackers.points_made(),
                    "series completed"
                );
                if !self.archive.append(series) {
                    warn!(series = series_id, "series already archived");
                }
                Some(series_id)
            }
            None => None,
        };

        self.bets.apply(&plan.changes);
        for settlement in &plan.settlements {
            debug!(
                player = ?settlement.player,
                bet_type = ?settlement.key.bet_type,
                point = settlement.key.point,
                stake = settlement.stake,
                payout = ?settlement.payout,
                "bet settled"
            );
        }
        for (player, amount) in plan.credits() {
            self.custody.credit(&player, amount);
        }

        let credited = plan.total_credited();
        Ok(RollReport {
            series_id,
            roll,
            transition,
            completed_series,
            settlements: plan.settlements,
            credited,
        })
    }

    fn authorize(&self, actor: &PublicKey, operation: Operation) -> Result<(), CrapsError> {
        if self.policy.authorized(actor, operation) {
            return Ok(());
        }
        warn!(actor = ?actor, operation = ?operation, "unauthorized");
        Err(CrapsError::Unauthorized(operation))
    }

    fn log_placement(
        &self,
        player: &PublicKey,
        amount: u64,
        result: Result<BetKey, CrapsError>,
    ) -> Result<BetKey, CrapsError> {
        match &result {
            Ok(key) => info!(
                series = self.game.current().map(|series| series.id),
                player = ?player,
                bet_type = ?key.bet_type,
                point = key.point,
                amount,
                "bet placed"
            ),
            Err(err @ CrapsError::InsufficientFunds { .. }) => {
                warn!(player = ?player, amount, error = %err, "bet rejected")
            }
            Err(err) => debug!(player = ?player, amount, error = %err, "bet rejected"),
        }
        result
    }
}
