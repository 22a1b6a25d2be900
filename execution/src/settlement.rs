//! Settlement of active bets against a committed roll.
//!
//! [`SettlementEngine::settle`] walks every active bet once, in registry order, and decides it
//! against a [`SeriesStep`]: the roll, the transition it produced, the phase and point before
//! the roll, and the series (with its trackers) after it. The result is a [`SettlementPlan`]
//! that is computed in full before anything is mutated; an overflow anywhere aborts the whole
//! plan.
//!
//! ## Timing
//!
//! - One-roll bets (Field, Next) are decided by every roll.
//! - Line, come, odds, Yes/No and Hardway bets stay up until their number or a 7 rolls.
//! - Fire, Small, Tall and All are decided when the bonus window closes (see
//!   [`SeriesStep::closes_bonus_window`]).
//! - A repeater wins as soon as it has its hits and loses only when the hand ends short.
//! - A forced end settles series-scoped bets as a seven-out and leaves the rest pending.

use commonware_cryptography::ed25519::PublicKey;
use craps_types::{
    is_craps, is_natural, is_point_number, Bet, BetCategory, BetKey, BetType, Phase, TableRules,
};

use crate::{
    bet_registry::{BetChange, BetRegistry},
    game_state::SeriesStep,
    paytable::{calculate_payout, field_payout, fire_multiplier, repeater_terms},
    CrapsError,
};

/// Outcome of a decided bet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payout {
    /// Total return (stake plus winnings).
    Win(u64),
    Loss,
    /// Stake returned.
    Push(u64),
}

impl Payout {
    /// Amount to credit the player.
    pub fn credited(&self) -> u64 {
        match self {
            Payout::Win(amount) | Payout::Push(amount) => *amount,
            Payout::Loss => 0,
        }
    }
}

/// What a single roll did to a single bet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Pending,
    /// A Come / Don't Come bet moved to its own point.
    Travel(u8),
    Settled(Payout),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub player: PublicKey,
    pub key: BetKey,
    pub stake: u64,
    pub payout: Payout,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementPlan {
    pub settlements: Vec<Settlement>,
    pub changes: Vec<BetChange>,
}

impl SettlementPlan {
    /// Sum of all credits in the plan.
    pub fn total_credited(&self) -> u128 {
        self.settlements
            .iter()
            .map(|settlement| settlement.payout.credited() as u128)
            .sum()
    }

    /// Credits grouped per player, in player order.
    pub fn credits(&self) -> Vec<(PublicKey, u64)> {
        let mut credits: Vec<(PublicKey, u64)> = Vec::new();
        for settlement in &self.settlements {
            let amount = settlement.payout.credited();
            if amount == 0 {
                continue;
            }
            match credits.iter_mut().find(|(player, _)| *player == settlement.player) {
                Some((_, total)) => *total = total.saturating_add(amount),
                None => credits.push((settlement.player.clone(), amount)),
            }
        }
        credits.sort_by(|a, b| a.0.cmp(&b.0));
        credits
    }
}

/// Win/lose/push for a flat line bet, before payout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineOutcome {
    Win,
    Lose,
    Push,
    Pending,
    Travel(u8),
}

#[derive(Clone, Copy, Debug)]
pub struct SettlementEngine {
    rules: TableRules,
}

impl SettlementEngine {
    pub fn new(rules: TableRules) -> Self {
        Self { rules }
    }

    /// Decides every active bet in `registry` against `step`.
    pub fn settle(
        &self,
        step: &SeriesStep,
        registry: &BetRegistry,
    ) -> Result<SettlementPlan, CrapsError> {
        let mut plan = SettlementPlan::default();
        for bet in registry.iter() {
            let key = bet.key();
            match self.resolve(bet, step)? {
                Resolution::Pending => {}
                Resolution::Travel(point) => plan.changes.push(BetChange::Travel {
                    player: bet.player.clone(),
                    key,
                    point,
                }),
                Resolution::Settled(payout) => {
                    plan.settlements.push(Settlement {
                        player: bet.player.clone(),
                        key,
                        stake: bet.amount,
                        payout,
                    });
                    plan.changes.push(BetChange::Resolved {
                        player: bet.player.clone(),
                        key,
                    });
                }
            }
        }
        Ok(plan)
    }

    /// Decides a single bet against `step`.
    pub fn resolve(&self, bet: &Bet, step: &SeriesStep) -> Result<Resolution, CrapsError> {
        let bet_type = bet.bet_type;
        let win = |key: u8| -> Result<Resolution, CrapsError> {
            let amount = calculate_payout(bet_type, bet.amount, key)
                .ok_or(CrapsError::PayoutOverflow(bet_type))?;
            Ok(Resolution::Settled(Payout::Win(amount)))
        };
        let lose = Ok(Resolution::Settled(Payout::Loss));

        // Forced end: series-scoped bets settle as a seven-out.
        let Some(roll) = step.roll else {
            if !bet_type.is_series_scoped() {
                return Ok(Resolution::Pending);
            }
            return match bet_type {
                BetType::DontPass => win(0),
                BetType::OddsDontPass => win(bet.point),
                BetType::Pass | BetType::OddsPass => lose,
                _ => self.resolve_bonus(bet, step, win),
            };
        };
        let total = roll.total();

        match bet_type.category() {
            BetCategory::Line => {
                let dont = matches!(bet_type, BetType::DontPass | BetType::DontCome);
                let (come_out, point) = if bet_type.is_come_family() {
                    (bet.point == 0, bet.point)
                } else {
                    (step.phase_before == Phase::ComeOut, step.point_before)
                };
                let outcome = self.line_outcome(dont, come_out, point, total);
                Ok(match outcome {
                    LineOutcome::Win => return win(0),
                    LineOutcome::Lose => Resolution::Settled(Payout::Loss),
                    LineOutcome::Push => Resolution::Settled(Payout::Push(bet.amount)),
                    LineOutcome::Pending => Resolution::Pending,
                    // Pass / Don't Pass work on the series point, which lives on the series.
                    LineOutcome::Travel(point) if bet_type.is_come_family() => {
                        Resolution::Travel(point)
                    }
                    LineOutcome::Travel(_) => Resolution::Pending,
                })
            }
            BetCategory::Odds => {
                let dont = matches!(bet_type, BetType::OddsDontPass | BetType::OddsDontCome);
                if total == bet.point {
                    if dont {
                        lose
                    } else {
                        win(bet.point)
                    }
                } else if total == 7 {
                    if dont {
                        win(bet.point)
                    } else {
                        lose
                    }
                } else {
                    Ok(Resolution::Pending)
                }
            }
            BetCategory::Field => {
                if field_payout(total) > 0 {
                    win(total)
                } else {
                    lose
                }
            }
            BetCategory::Next => {
                if Some(total) == bet_type.target() {
                    win(total)
                } else {
                    lose
                }
            }
            BetCategory::Yes => match bet_type.target() {
                Some(number) if number == total => win(0),
                _ if total == 7 => lose,
                _ => Ok(Resolution::Pending),
            },
            BetCategory::No => match bet_type.target() {
                _ if total == 7 => win(0),
                Some(number) if number == total => lose,
                _ => Ok(Resolution::Pending),
            },
            BetCategory::Hardway => match bet_type.target() {
                Some(number) if number == total && roll.is_hardway(number) => win(0),
                Some(number) if number == total => lose,
                _ if total == 7 => lose,
                _ => Ok(Resolution::Pending),
            },
            BetCategory::Bonus | BetCategory::Repeater => self.resolve_bonus(bet, step, win),
        }
    }

    /// Bonus and repeater bets, decided from the series trackers after the step.
    fn resolve_bonus(
        &self,
        bet: &Bet,
        step: &SeriesStep,
        win: impl Fn(u8) -> Result<Resolution, CrapsError>,
    ) -> Result<Resolution, CrapsError> {
        let trackers = &step.series.trackers;
        let window_closed = step.closes_bonus_window(self.rules.carry_trackers_within_hand);

        if bet.bet_type.category() == BetCategory::Repeater {
            let Some((required, _)) = bet.bet_type.target().and_then(repeater_terms) else {
                return Ok(Resolution::Pending);
            };
            let number = bet.bet_type.target().unwrap_or(0);
            let hits = trackers
                .repeater_counts
                .get(number)
                .saturating_sub(bet.baseline);
            if hits >= required {
                return win(0);
            }
            // Short repeaters only lose when the hand ends.
            let hand_over = matches!(step.series.end, Some(end) if end.ends_hand());
            return Ok(if hand_over {
                Resolution::Settled(Payout::Loss)
            } else {
                Resolution::Pending
            });
        }

        if !window_closed {
            return Ok(Resolution::Pending);
        }
        let points_made = trackers.points_made();
        let won = match bet.bet_type {
            BetType::Fire => fire_multiplier(points_made).is_some(),
            BetType::BonusSmall => trackers.small_complete(),
            BetType::BonusTall => trackers.tall_complete(),
            BetType::BonusAll => trackers.all_complete(),
            _ => false,
        };
        if won {
            win(points_made)
        } else {
            Ok(Resolution::Settled(Payout::Loss))
        }
    }

    /// Pass-line rules, shared by the come family against a bet's private point.
    fn line_outcome(&self, dont: bool, come_out: bool, point: u8, total: u8) -> LineOutcome {
        let (win, lose) = if dont {
            (LineOutcome::Lose, LineOutcome::Win)
        } else {
            (LineOutcome::Win, LineOutcome::Lose)
        };
        if come_out {
            if is_natural(total) {
                return win;
            }
            if total == 12 && dont {
                return if self.rules.bar_twelve_pushes {
                    LineOutcome::Push
                } else {
                    LineOutcome::Pending
                };
            }
            if is_craps(total) {
                return lose;
            }
            if is_point_number(total) {
                return LineOutcome::Travel(total);
            }
            return LineOutcome::Pending;
        }
        if total == point {
            win
        } else if total == 7 {
            lose
        } else {
            LineOutcome::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::GameState;
    use crate::mocks::create_account;
    use craps_types::Roll;

    fn bet(bet_type: BetType, amount: u64) -> Bet {
        Bet {
            player: create_account(1),
            bet_type,
            amount,
            point: 0,
            baseline: 0,
            sequence: 1,
        }
    }

    fn bet_on(bet_type: BetType, amount: u64, point: u8) -> Bet {
        Bet {
            point,
            ..bet(bet_type, amount)
        }
    }

    /// Game with a point already established.
    fn on_point(point_dice: (u8, u8)) -> GameState {
        let mut game = GameState::new(false);
        game.start_new_series(create_account(9)).unwrap();
        game.process_roll(point_dice.0, point_dice.1).unwrap();
        game
    }

    fn come_out() -> GameState {
        let mut game = GameState::new(false);
        game.start_new_series(create_account(9)).unwrap();
        game
    }

    fn step(game: &GameState, d1: u8, d2: u8) -> SeriesStep {
        game.evaluate_roll(Roll::new(d1, d2).unwrap()).unwrap()
    }

    fn engine() -> SettlementEngine {
        SettlementEngine::new(TableRules::default())
    }

    fn resolve(bet: &Bet, step: &SeriesStep) -> Resolution {
        engine().resolve(bet, step).unwrap()
    }

    fn win(amount: u64) -> Resolution {
        Resolution::Settled(Payout::Win(amount))
    }

    const LOSS: Resolution = Resolution::Settled(Payout::Loss);

    #[test]
    fn test_pass_and_dont_pass_come_out() {
        let game = come_out();
        let pass = bet(BetType::Pass, 1000);
        let dont = bet(BetType::DontPass, 1000);

        assert_eq!(resolve(&pass, &step(&game, 3, 4)), win(2000));
        assert_eq!(resolve(&dont, &step(&game, 3, 4)), LOSS);
        assert_eq!(resolve(&pass, &step(&game, 5, 6)), win(2000));

        for (d1, d2) in [(1, 1), (1, 2)] {
            assert_eq!(resolve(&pass, &step(&game, d1, d2)), LOSS);
            assert_eq!(resolve(&dont, &step(&game, d1, d2)), win(2000));
        }

        assert_eq!(resolve(&pass, &step(&game, 6, 6)), LOSS);
        assert_eq!(
            resolve(&dont, &step(&game, 6, 6)),
            Resolution::Settled(Payout::Push(1000))
        );

        assert_eq!(resolve(&pass, &step(&game, 2, 2)), Resolution::Pending);
        assert_eq!(resolve(&dont, &step(&game, 2, 2)), Resolution::Pending);
    }

    #[test]
    fn test_bar_twelve_no_op_policy() {
        let game = come_out();
        let engine = SettlementEngine::new(TableRules {
            bar_twelve_pushes: false,
            ..TableRules::default()
        });
        let dont = bet(BetType::DontPass, 1000);
        assert_eq!(
            engine.resolve(&dont, &step(&game, 6, 6)).unwrap(),
            Resolution::Pending
        );
    }

    #[test]
    fn test_pass_and_dont_pass_point_phase() {
        let game = on_point((3, 3));
        let pass = bet(BetType::Pass, 1000);
        let dont = bet(BetType::DontPass, 1000);

        assert_eq!(resolve(&pass, &step(&game, 2, 4)), win(2000));
        assert_eq!(resolve(&dont, &step(&game, 2, 4)), LOSS);
        assert_eq!(resolve(&pass, &step(&game, 3, 4)), LOSS);
        assert_eq!(resolve(&dont, &step(&game, 3, 4)), win(2000));
        // Craps and 11 mean nothing once a point is set.
        assert_eq!(resolve(&pass, &step(&game, 6, 6)), Resolution::Pending);
        assert_eq!(resolve(&dont, &step(&game, 5, 6)), Resolution::Pending);
    }

    #[test]
    fn test_come_bet_travels_then_resolves() {
        let game = on_point((3, 3));
        let come = bet(BetType::Come, 100);
        assert_eq!(resolve(&come, &step(&game, 4, 5)), Resolution::Travel(9));
        assert_eq!(resolve(&come, &step(&game, 5, 6)), win(200));
        assert_eq!(resolve(&come, &step(&game, 1, 2)), LOSS);

        let travelled = bet_on(BetType::Come, 100, 9);
        assert_eq!(resolve(&travelled, &step(&game, 4, 5)), win(200));
        assert_eq!(resolve(&travelled, &step(&game, 3, 4)), LOSS);
        assert_eq!(resolve(&travelled, &step(&game, 3, 3)), Resolution::Pending);
    }

    #[test]
    fn test_dont_come_mirrors_dont_pass() {
        let game = on_point((2, 2));
        let dont_come = bet(BetType::DontCome, 100);
        assert_eq!(
            resolve(&dont_come, &step(&game, 6, 6)),
            Resolution::Settled(Payout::Push(100))
        );
        assert_eq!(resolve(&dont_come, &step(&game, 1, 2)), win(200));
        assert_eq!(resolve(&dont_come, &step(&game, 3, 4)), LOSS);
        assert_eq!(resolve(&dont_come, &step(&game, 4, 4)), Resolution::Travel(8));

        let travelled = bet_on(BetType::DontCome, 100, 8);
        assert_eq!(resolve(&travelled, &step(&game, 3, 4)), win(200));
        assert_eq!(resolve(&travelled, &step(&game, 2, 6)), LOSS);
    }

    #[test]
    fn test_odds_use_locked_point() {
        let game = on_point((2, 2));
        let odds = bet_on(BetType::OddsPass, 1000, 4);
        assert_eq!(resolve(&odds, &step(&game, 1, 3)), win(3000));
        assert_eq!(resolve(&odds, &step(&game, 3, 4)), LOSS);
        assert_eq!(resolve(&odds, &step(&game, 3, 3)), Resolution::Pending);

        let lay = bet_on(BetType::OddsDontPass, 1000, 4);
        assert_eq!(resolve(&lay, &step(&game, 3, 4)), win(1500));
        assert_eq!(resolve(&lay, &step(&game, 2, 2)), LOSS);

        let come_odds = bet_on(BetType::OddsCome, 1000, 6);
        assert_eq!(resolve(&come_odds, &step(&game, 1, 5)), win(2200));
        assert_eq!(resolve(&come_odds, &step(&game, 1, 3)), Resolution::Pending);
    }

    #[test]
    fn test_field_one_roll() {
        let game = on_point((3, 3));
        let field = bet(BetType::Field, 1000);
        assert_eq!(resolve(&field, &step(&game, 1, 1)), win(3000));
        assert_eq!(resolve(&field, &step(&game, 1, 2)), win(2000));
        assert_eq!(resolve(&field, &step(&game, 6, 6)), win(4000));
        assert_eq!(resolve(&field, &step(&game, 3, 4)), LOSS);
        assert_eq!(resolve(&field, &step(&game, 2, 3)), LOSS);
    }

    #[test]
    fn test_next_one_roll() {
        let game = come_out();
        let next = bet(BetType::Next7, 1000);
        assert_eq!(resolve(&next, &step(&game, 3, 4)), win(5900));
        assert_eq!(resolve(&next, &step(&game, 3, 3)), LOSS);
        let snake_eyes = bet(BetType::Next2, 1000);
        assert_eq!(resolve(&snake_eyes, &step(&game, 1, 1)), win(35_300));
    }

    #[test]
    fn test_yes_and_no() {
        let game = on_point((4, 6));
        let yes = bet(BetType::Yes6, 600);
        assert_eq!(resolve(&yes, &step(&game, 1, 5)), win(1300));
        assert_eq!(resolve(&yes, &step(&game, 3, 4)), LOSS);
        assert_eq!(resolve(&yes, &step(&game, 4, 4)), Resolution::Pending);

        let no = bet(BetType::No6, 700);
        assert_eq!(resolve(&no, &step(&game, 3, 4)), win(1300));
        assert_eq!(resolve(&no, &step(&game, 2, 4)), LOSS);
        assert_eq!(resolve(&no, &step(&game, 4, 4)), Resolution::Pending);
    }

    #[test]
    fn test_hardways() {
        let game = on_point((2, 3));
        let hard = bet(BetType::Hard8, 100);
        assert_eq!(resolve(&hard, &step(&game, 4, 4)), win(1000));
        assert_eq!(resolve(&hard, &step(&game, 2, 6)), LOSS);
        assert_eq!(resolve(&hard, &step(&game, 3, 4)), LOSS);
        assert_eq!(resolve(&hard, &step(&game, 3, 3)), Resolution::Pending);
    }

    #[test]
    fn test_bonus_pending_until_completion() {
        let game = on_point((3, 3));
        let small = bet(BetType::BonusSmall, 10);
        assert_eq!(resolve(&small, &step(&game, 1, 1)), Resolution::Pending);
        // Seven-out with an incomplete set loses.
        assert_eq!(resolve(&small, &step(&game, 3, 4)), LOSS);
    }

    #[test]
    fn test_small_wins_when_complete_at_completion() {
        let mut game = on_point((2, 2)); // 4
        for (d1, d2) in [(1, 1), (1, 2), (2, 3), (5, 6)] {
            game.process_roll(d1, d2).unwrap(); // 2, 3, 5, 11
        }
        let small = bet(BetType::BonusSmall, 10);
        let tall = bet(BetType::BonusTall, 10);
        // 6 completes the small set; the 7 that follows decides the bet.
        game.process_roll(3, 3).unwrap();
        let seven = step(&game, 3, 4);
        assert_eq!(resolve(&small, &seven), win(350));
        assert_eq!(resolve(&tall, &seven), LOSS);
    }

    #[test]
    fn test_fire_needs_three_points() {
        let mut game = GameState::new(true);
        let shooter = create_account(9);
        game.start_new_series(shooter.clone()).unwrap();
        for (d1, d2) in [(2, 2), (1, 3), (3, 3), (2, 4), (4, 4), (2, 6)] {
            game.process_roll(d1, d2).unwrap();
            if game.phase() == Phase::Idle {
                game.start_new_series(shooter.clone()).unwrap();
            }
        }
        game.process_roll(4, 5).unwrap();
        let engine = SettlementEngine::new(TableRules {
            carry_trackers_within_hand: true,
            ..TableRules::default()
        });
        let fire = bet(BetType::Fire, 10);
        let seven_out = step(&game, 3, 4);
        assert_eq!(engine.resolve(&fire, &seven_out).unwrap(), win(80));

        // Point made keeps the hand alive when trackers carry.
        let made = step(&game, 4, 5);
        assert_eq!(engine.resolve(&fire, &made).unwrap(), Resolution::Pending);
    }

    #[test]
    fn test_fire_loses_with_fewer_points() {
        let game = on_point((2, 2));
        let fire = bet(BetType::Fire, 10);
        assert_eq!(resolve(&fire, &step(&game, 2, 2)), LOSS);
    }

    #[test]
    fn test_repeater_wins_on_required_hits() {
        let mut game = on_point((2, 3));
        let repeater = bet(BetType::Repeater2, 10);
        assert_eq!(resolve(&repeater, &step(&game, 1, 1)), Resolution::Pending);
        game.process_roll(1, 1).unwrap();
        assert_eq!(resolve(&repeater, &step(&game, 1, 1)), win(410));
        assert_eq!(resolve(&repeater, &step(&game, 3, 4)), LOSS);
    }

    #[test]
    fn test_repeater_survives_series_completion() {
        let game = come_out();
        let repeater = bet(BetType::Repeater2, 10);
        assert_eq!(resolve(&repeater, &step(&game, 5, 6)), Resolution::Pending);
        assert_eq!(resolve(&repeater, &step(&game, 1, 2)), Resolution::Pending);

        let game = on_point((3, 3));
        assert_eq!(resolve(&repeater, &step(&game, 2, 4)), Resolution::Pending);
        assert_eq!(resolve(&repeater, &step(&game, 3, 4)), LOSS);
    }

    #[test]
    fn test_repeater_counts_from_baseline() {
        let mut game = on_point((2, 3));
        game.process_roll(1, 1).unwrap();
        let repeater = Bet {
            baseline: 1,
            ..bet(BetType::Repeater2, 10)
        };
        assert_eq!(resolve(&repeater, &step(&game, 1, 1)), Resolution::Pending);
    }

    #[test]
    fn test_forced_end_settles_series_bets_only() {
        let game = on_point((3, 3));
        let forced = game.evaluate_end().unwrap();
        assert_eq!(resolve(&bet(BetType::Pass, 100), &forced), LOSS);
        assert_eq!(resolve(&bet(BetType::DontPass, 100), &forced), win(200));
        assert_eq!(resolve(&bet_on(BetType::OddsPass, 100, 6), &forced), LOSS);
        assert_eq!(
            resolve(&bet_on(BetType::OddsDontPass, 600, 6), &forced),
            win(1100)
        );
        assert_eq!(resolve(&bet(BetType::BonusAll, 10), &forced), LOSS);
        assert_eq!(resolve(&bet(BetType::Repeater4, 10), &forced), LOSS);
        for pending in [BetType::Field, BetType::Next7, BetType::Yes4, BetType::Hard6] {
            assert_eq!(resolve(&bet(pending, 100), &forced), Resolution::Pending);
        }
        assert_eq!(
            resolve(&bet_on(BetType::Come, 100, 5), &forced),
            Resolution::Pending
        );
    }

    #[test]
    fn test_settle_builds_plan_in_registry_order() {
        use crate::mocks::MemoryLedger;
        let player = create_account(1);
        let mut ledger = MemoryLedger::default();
        ledger.deposit(&player, 10_000);
        let rules = TableRules::default();
        let game = come_out();
        let mut registry = BetRegistry::new();
        for (bet_type, amount) in [
            (BetType::Pass, 100),
            (BetType::Field, 100),
            (BetType::Hard4, 100),
            (BetType::Next7, 100),
        ] {
            registry
                .place_bet(&mut ledger, &game, &rules, &player, bet_type.code(), amount)
                .unwrap();
        }
        let plan = engine().settle(&step(&game, 3, 4), &registry).unwrap();
        let decided: Vec<_> = plan
            .settlements
            .iter()
            .map(|settlement| (settlement.key.bet_type, settlement.payout))
            .collect();
        assert_eq!(
            decided,
            vec![
                (BetType::Pass, Payout::Win(200)),
                (BetType::Field, Payout::Loss),
                (BetType::Hard4, Payout::Loss),
                (BetType::Next7, Payout::Win(590)),
            ]
        );
        assert_eq!(plan.total_credited(), 790);
        assert_eq!(plan.credits(), vec![(player, 790)]);
    }

    #[test]
    fn test_settle_aborts_on_overflow() {
        let game = come_out();
        let mut registry = BetRegistry::new();
        let mut ledger = crate::mocks::MemoryLedger::default();
        let player = create_account(1);
        ledger.deposit(&player, u64::MAX);
        registry
            .place_bet(
                &mut ledger,
                &game,
                &TableRules::default(),
                &player,
                BetType::Pass.code(),
                u64::MAX,
            )
            .unwrap();
        assert_eq!(
            engine().settle(&step(&game, 3, 4), &registry),
            Err(CrapsError::PayoutOverflow(BetType::Pass))
        );
    }
}
