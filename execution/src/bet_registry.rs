//! Per-player active bets.
//!
//! The registry is partitioned by player and, within a player, by [`BetKey`]. Most bet types
//! have a single slot; Come-family bets and their odds get one slot per attached point.
//!
//! Every validation runs before the custody debit, and the debit runs before the insert, so a
//! rejected placement leaves both the registry and custody untouched.

use std::collections::BTreeMap;

use commonware_cryptography::ed25519::PublicKey;
use craps_types::{Bet, BetCategory, BetKey, BetType, Phase, RepeaterCounts, TableRules};

use crate::{collaborators::Custody, game_state::GameState, CrapsError};

/// Placement policy: which bet types are open in which phase.
///
/// Come, Don't Come and every odds bet need an established point. Everything else is open
/// whenever a series is active. Nothing is open while idle.
pub fn can_place_bet(bet_type: BetType, phase: Phase) -> bool {
    match phase {
        Phase::Idle => false,
        Phase::ComeOut => {
            !(bet_type.is_come_family() || bet_type.category() == BetCategory::Odds)
        }
        Phase::Point => true,
    }
}

/// Maps a raw code to a bet type; codes outside 0-63 and reserved codes are invalid.
pub fn parse_bet_code(code: u8) -> Result<BetType, CrapsError> {
    BetType::try_from(code).map_err(|_| CrapsError::InvalidBetType(code))
}

/// A bet change produced by settlement, applied with [`BetRegistry::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BetChange {
    /// The bet was decided and leaves the table.
    Resolved { player: PublicKey, key: BetKey },
    /// A pending Come / Don't Come bet moved to `point`.
    Travel {
        player: PublicKey,
        key: BetKey,
        point: u8,
    },
}

#[derive(Clone, Debug, Default)]
pub struct BetRegistry {
    bets: BTreeMap<PublicKey, BTreeMap<BetKey, Bet>>,
    sequence: u64,
}

impl BetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a bet of `amount` on `code` for `player`.
    ///
    /// Odds codes are routed to [`BetRegistry::place_odds_bet`].
    pub fn place_bet<C: Custody>(
        &mut self,
        custody: &mut C,
        game: &GameState,
        rules: &TableRules,
        player: &PublicKey,
        code: u8,
        amount: u64,
    ) -> Result<BetKey, CrapsError> {
        let bet_type = parse_bet_code(code)?;
        if let Some(line_type) = bet_type.line_for_odds() {
            return self.place_odds_bet(custody, game, rules, player, line_type, amount);
        }
        if !can_place_bet(bet_type, game.phase()) {
            return Err(CrapsError::BetNotAllowedInPhase {
                bet_type,
                phase: game.phase(),
            });
        }
        if !rules.offers(bet_type) {
            return Err(CrapsError::BetNotOffered(bet_type));
        }
        validate_amount(rules, amount)?;

        let key = BetKey::new(bet_type);
        if self.get_bet(player, &key).is_some() {
            return Err(CrapsError::DuplicateBet(bet_type));
        }

        let baseline = match (bet_type.category(), bet_type.target(), game.current()) {
            (BetCategory::Repeater, Some(number), Some(series)) => {
                series.trackers.repeater_counts.get(number)
            }
            _ => 0,
        };
        self.debit_and_insert(
            custody,
            Bet {
                player: player.clone(),
                bet_type,
                amount,
                point: 0,
                baseline,
                sequence: 0,
            },
        )
    }

    /// Backs `line_type` with odds locked to the point the line bet is working on.
    ///
    /// Pass / Don't Pass odds lock the series point. Come / Don't Come odds lock the point of
    /// the player's most recently established come bet of that kind.
    pub fn place_odds_bet<C: Custody>(
        &mut self,
        custody: &mut C,
        game: &GameState,
        rules: &TableRules,
        player: &PublicKey,
        line_type: BetType,
        amount: u64,
    ) -> Result<BetKey, CrapsError> {
        let odds_type = line_type
            .odds_for_line()
            .ok_or(CrapsError::InvalidBetType(line_type.code()))?;
        if game.phase() != Phase::Point {
            return Err(CrapsError::BetNotAllowedInPhase {
                bet_type: odds_type,
                phase: game.phase(),
            });
        }
        validate_amount(rules, amount)?;

        let line_point = if line_type.is_come_family() {
            self.bets_for(player)
                .filter(|bet| bet.bet_type == line_type && bet.point != 0)
                .max_by_key(|bet| bet.sequence)
                .map(|bet| bet.point)
        } else {
            self.get_bet(player, &BetKey::new(line_type))
                .map(|_| game.point())
        };
        let point = line_point.ok_or(CrapsError::NoLineBet(odds_type))?;

        let bet = Bet {
            player: player.clone(),
            bet_type: odds_type,
            amount,
            point,
            baseline: 0,
            sequence: 0,
        };
        if self.get_bet(player, &bet.key()).is_some() {
            return Err(CrapsError::DuplicateBet(odds_type));
        }
        self.debit_and_insert(custody, bet)
    }

    /// Takes a bet down and returns its stake to the player.
    pub fn remove_bet<C: Custody>(
        &mut self,
        custody: &mut C,
        game: &GameState,
        rules: &TableRules,
        player: &PublicKey,
        key: &BetKey,
    ) -> Result<u64, CrapsError> {
        let bet = self
            .get_bet(player, key)
            .ok_or(CrapsError::BetNotFound(key.bet_type))?;
        let working_line = match bet.bet_type {
            BetType::Pass | BetType::DontPass => game.phase() == Phase::Point,
            BetType::Come | BetType::DontCome => bet.point != 0,
            _ => false,
        };
        if working_line && !rules.line_bets_removable_after_point {
            return Err(CrapsError::BetNotRemovable(bet.bet_type));
        }

        let bet = self
            .take(player, key)
            .ok_or(CrapsError::BetNotFound(key.bet_type))?;
        custody.credit(player, bet.amount);
        Ok(bet.amount)
    }

    pub fn has_active_bet(&self, player: &PublicKey, bet_type: BetType) -> bool {
        self.bets_for(player).any(|bet| bet.bet_type == bet_type)
    }

    pub fn get_bet(&self, player: &PublicKey, key: &BetKey) -> Option<&Bet> {
        self.bets.get(player).and_then(|bets| bets.get(key))
    }

    pub fn bets_for<'a>(&'a self, player: &PublicKey) -> impl Iterator<Item = &'a Bet> + 'a {
        self.bets
            .get(player)
            .into_iter()
            .flat_map(|bets| bets.values())
    }

    /// All active bets, ordered by player then key.
    pub fn iter(&self) -> impl Iterator<Item = &Bet> {
        self.bets.values().flat_map(|bets| bets.values())
    }

    pub fn len(&self) -> usize {
        self.bets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Total stake currently on the table.
    pub fn total_staked(&self) -> u128 {
        self.iter().map(|bet| bet.amount as u128).sum()
    }

    /// Applies settlement changes in order.
    ///
    /// A travelling bet that lands on a point where the player already has the same bet type
    /// is merged into it.
    pub fn apply(&mut self, changes: &[BetChange]) {
        for change in changes {
            match change {
                BetChange::Resolved { player, key } => {
                    self.take(player, key);
                }
                BetChange::Travel { player, key, point } => {
                    let Some(mut bet) = self.take(player, key) else {
                        continue;
                    };
                    bet.point = *point;
                    let destination = bet.key();
                    if let Some(existing) = self.take(player, &destination) {
                        bet.amount = bet.amount.saturating_add(existing.amount);
                    }
                    self.insert(bet);
                }
            }
        }
    }

    /// Pulls repeater baselines down to `counts` after the trackers were reset for a new shooter.
    pub fn rebase_repeaters(&mut self, counts: &RepeaterCounts) {
        for bet in self.bets.values_mut().flat_map(|bets| bets.values_mut()) {
            if bet.bet_type.category() != BetCategory::Repeater {
                continue;
            }
            if let Some(number) = bet.bet_type.target() {
                bet.baseline = bet.baseline.min(counts.get(number));
            }
        }
    }

    fn debit_and_insert<C: Custody>(
        &mut self,
        custody: &mut C,
        bet: Bet,
    ) -> Result<BetKey, CrapsError> {
        custody
            .debit(&bet.player, bet.amount)
            .map_err(|err| CrapsError::InsufficientFunds {
                amount: bet.amount,
                reason: err.to_string(),
            })?;
        Ok(self.insert(bet))
    }

    fn insert(&mut self, mut bet: Bet) -> BetKey {
        self.sequence = self.sequence.saturating_add(1);
        bet.sequence = self.sequence;
        let key = bet.key();
        self.bets
            .entry(bet.player.clone())
            .or_default()
            .insert(key, bet);
        key
    }

    fn take(&mut self, player: &PublicKey, key: &BetKey) -> Option<Bet> {
        let bets = self.bets.get_mut(player)?;
        let bet = bets.remove(key);
        if bets.is_empty() {
            self.bets.remove(player);
        }
        bet
    }
}

fn validate_amount(rules: &TableRules, amount: u64) -> Result<(), CrapsError> {
    if amount == 0 {
        return Err(CrapsError::ZeroAmount);
    }
    if !rules.accepts_amount(amount) {
        return Err(CrapsError::BetOutOfLimits {
            amount,
            min: rules.min_bet,
            max: rules.max_bet,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_account, MemoryLedger};

    struct Fixture {
        ledger: MemoryLedger,
        game: GameState,
        rules: TableRules,
        registry: BetRegistry,
        player: PublicKey,
    }

    impl Fixture {
        fn new() -> Self {
            let player = create_account(1);
            let mut ledger = MemoryLedger::default();
            ledger.deposit(&player, 10_000);
            let mut game = GameState::new(false);
            game.start_new_series(create_account(99)).unwrap();
            Self {
                ledger,
                game,
                rules: TableRules::default(),
                registry: BetRegistry::new(),
                player,
            }
        }

        fn place(&mut self, bet_type: BetType, amount: u64) -> Result<BetKey, CrapsError> {
            self.registry.place_bet(
                &mut self.ledger,
                &self.game,
                &self.rules,
                &self.player,
                bet_type.code(),
                amount,
            )
        }

        fn odds(&mut self, line_type: BetType, amount: u64) -> Result<BetKey, CrapsError> {
            self.registry.place_odds_bet(
                &mut self.ledger,
                &self.game,
                &self.rules,
                &self.player,
                line_type,
                amount,
            )
        }

        fn remove(&mut self, key: BetKey) -> Result<u64, CrapsError> {
            self.registry.remove_bet(
                &mut self.ledger,
                &self.game,
                &self.rules,
                &self.player,
                &key,
            )
        }
    }

    #[test]
    fn test_policy_table() {
        for bet_type in BetType::ALL {
            assert!(!can_place_bet(bet_type, Phase::Idle));
            assert!(can_place_bet(bet_type, Phase::Point));
        }
        assert!(can_place_bet(BetType::Pass, Phase::ComeOut));
        assert!(can_place_bet(BetType::Field, Phase::ComeOut));
        assert!(can_place_bet(BetType::Fire, Phase::ComeOut));
        assert!(can_place_bet(BetType::Repeater4, Phase::ComeOut));
        assert!(!can_place_bet(BetType::Come, Phase::ComeOut));
        assert!(!can_place_bet(BetType::DontCome, Phase::ComeOut));
        assert!(!can_place_bet(BetType::OddsPass, Phase::ComeOut));
    }

    #[test]
    fn test_parse_bet_code() {
        assert_eq!(parse_bet_code(0), Ok(BetType::Pass));
        assert_eq!(parse_bet_code(63), Ok(BetType::Repeater12));
        assert_eq!(parse_bet_code(64), Err(CrapsError::InvalidBetType(64)));
        assert_eq!(parse_bet_code(41), Err(CrapsError::InvalidBetType(41)));
    }

    #[test]
    fn test_place_bet_debits_custody() {
        let mut fx = Fixture::new();
        let key = fx.place(BetType::Pass, 500).unwrap();
        assert_eq!(key, BetKey::new(BetType::Pass));
        assert!(fx.registry.has_active_bet(&fx.player, BetType::Pass));
        assert_eq!(fx.ledger.balance(&fx.player), 9_500);
        let bet = fx.registry.get_bet(&fx.player, &key).unwrap();
        assert_eq!(bet.amount, 500);
        assert_eq!(bet.point, 0);
    }

    #[test]
    fn test_place_bet_rejections_leave_state_untouched() {
        let mut fx = Fixture::new();
        assert_eq!(fx.place(BetType::Pass, 0), Err(CrapsError::ZeroAmount));
        assert_eq!(
            fx.place(BetType::Come, 100),
            Err(CrapsError::BetNotAllowedInPhase {
                bet_type: BetType::Come,
                phase: Phase::ComeOut
            })
        );
        assert!(matches!(
            fx.place(BetType::Field, 20_000),
            Err(CrapsError::InsufficientFunds { amount: 20_000, .. })
        ));
        assert!(fx.registry.is_empty());
        assert_eq!(fx.ledger.balance(&fx.player), 10_000);

        fx.place(BetType::Field, 100).unwrap();
        assert_eq!(
            fx.place(BetType::Field, 100),
            Err(CrapsError::DuplicateBet(BetType::Field))
        );
        assert_eq!(fx.ledger.balance(&fx.player), 9_900);
    }

    #[test]
    fn test_invalid_code_rejected() {
        let mut fx = Fixture::new();
        let result = fx.registry.place_bet(
            &mut fx.ledger,
            &fx.game,
            &fx.rules,
            &fx.player,
            33,
            100,
        );
        assert_eq!(result, Err(CrapsError::InvalidBetType(33)));
    }

    #[test]
    fn test_table_limits() {
        let mut fx = Fixture::new();
        fx.rules = TableRules {
            min_bet: 10,
            max_bet: 1_000,
            ..TableRules::default()
        };
        assert_eq!(
            fx.place(BetType::Pass, 5),
            Err(CrapsError::BetOutOfLimits {
                amount: 5,
                min: 10,
                max: 1_000
            })
        );
        assert!(fx.place(BetType::Pass, 1_000).is_ok());
    }

    #[test]
    fn test_bets_rejected_while_idle() {
        let mut fx = Fixture::new();
        fx.game.process_roll(3, 4).unwrap();
        assert_eq!(
            fx.place(BetType::Pass, 100),
            Err(CrapsError::BetNotAllowedInPhase {
                bet_type: BetType::Pass,
                phase: Phase::Idle
            })
        );
    }

    #[test]
    fn test_odds_lock_current_point() {
        let mut fx = Fixture::new();
        fx.place(BetType::Pass, 100).unwrap();
        assert_eq!(
            fx.odds(BetType::Pass, 200),
            Err(CrapsError::BetNotAllowedInPhase {
                bet_type: BetType::OddsPass,
                phase: Phase::ComeOut
            })
        );
        fx.game.process_roll(2, 2).unwrap();
        let key = fx.odds(BetType::Pass, 200).unwrap();
        assert_eq!(key, BetKey::new(BetType::OddsPass));
        assert_eq!(fx.registry.get_bet(&fx.player, &key).unwrap().point, 4);
        assert_eq!(
            fx.odds(BetType::Pass, 200),
            Err(CrapsError::DuplicateBet(BetType::OddsPass))
        );
    }

    #[test]
    fn test_odds_code_routes_through_place_bet() {
        let mut fx = Fixture::new();
        fx.place(BetType::DontPass, 100).unwrap();
        fx.game.process_roll(4, 5).unwrap();
        let key = fx.place(BetType::OddsDontPass, 300).unwrap();
        assert_eq!(fx.registry.get_bet(&fx.player, &key).unwrap().point, 9);
    }

    #[test]
    fn test_odds_require_line_bet() {
        let mut fx = Fixture::new();
        fx.game.process_roll(3, 3).unwrap();
        assert_eq!(
            fx.odds(BetType::Pass, 100),
            Err(CrapsError::NoLineBet(BetType::OddsPass))
        );
        assert_eq!(
            fx.odds(BetType::Come, 100),
            Err(CrapsError::NoLineBet(BetType::OddsCome))
        );
        assert_eq!(
            fx.odds(BetType::Field, 100),
            Err(CrapsError::InvalidBetType(BetType::Field.code()))
        );
    }

    #[test]
    fn test_come_odds_lock_latest_come_point() {
        let mut fx = Fixture::new();
        fx.game.process_roll(3, 3).unwrap();
        fx.place(BetType::Come, 100).unwrap();
        fx.registry.apply(&[BetChange::Travel {
            player: fx.player.clone(),
            key: BetKey::new(BetType::Come),
            point: 5,
        }]);
        fx.place(BetType::Come, 100).unwrap();
        fx.registry.apply(&[BetChange::Travel {
            player: fx.player.clone(),
            key: BetKey::new(BetType::Come),
            point: 10,
        }]);

        let key = fx.odds(BetType::Come, 50).unwrap();
        assert_eq!(key, BetKey::with_point(BetType::OddsCome, 10));
        assert_eq!(
            fx.odds(BetType::Come, 50),
            Err(CrapsError::DuplicateBet(BetType::OddsCome))
        );
    }

    #[test]
    fn test_travel_merges_existing_sub_bet() {
        let mut fx = Fixture::new();
        fx.game.process_roll(3, 3).unwrap();
        for _ in 0..2 {
            fx.place(BetType::DontCome, 100).unwrap();
            fx.registry.apply(&[BetChange::Travel {
                player: fx.player.clone(),
                key: BetKey::new(BetType::DontCome),
                point: 8,
            }]);
        }
        let merged = fx
            .registry
            .get_bet(&fx.player, &BetKey::with_point(BetType::DontCome, 8))
            .unwrap();
        assert_eq!(merged.amount, 200);
        assert_eq!(fx.registry.len(), 1);
    }

    #[test]
    fn test_remove_bet_credits_stake() {
        let mut fx = Fixture::new();
        let key = fx.place(BetType::Hard8, 250).unwrap();
        assert_eq!(fx.remove(key).unwrap(), 250);
        assert!(!fx.registry.has_active_bet(&fx.player, BetType::Hard8));
        assert_eq!(fx.ledger.balance(&fx.player), 10_000);
        assert_eq!(fx.remove(key), Err(CrapsError::BetNotFound(BetType::Hard8)));
    }

    #[test]
    fn test_line_bet_removal_policy() {
        let mut fx = Fixture::new();
        let key = fx.place(BetType::Pass, 100).unwrap();
        fx.game.process_roll(5, 5).unwrap();
        assert_eq!(fx.remove(key), Err(CrapsError::BetNotRemovable(BetType::Pass)));

        fx.rules.line_bets_removable_after_point = true;
        assert_eq!(fx.remove(key).unwrap(), 100);
    }

    #[test]
    fn test_line_bet_removable_before_point() {
        let mut fx = Fixture::new();
        let key = fx.place(BetType::DontPass, 100).unwrap();
        assert_eq!(fx.remove(key).unwrap(), 100);
    }

    #[test]
    fn test_repeater_records_baseline() {
        let mut fx = Fixture::new();
        fx.game.process_roll(2, 2).unwrap(); // point 4
        fx.game.process_roll(1, 1).unwrap(); // 2
        let key = fx.place(BetType::Repeater2, 10).unwrap();
        assert_eq!(fx.registry.get_bet(&fx.player, &key).unwrap().baseline, 1);
    }

    #[test]
    fn test_rebase_repeaters_after_tracker_reset() {
        let mut fx = Fixture::new();
        fx.game.process_roll(2, 2).unwrap();
        fx.game.process_roll(1, 1).unwrap();
        let key = fx.place(BetType::Repeater2, 10).unwrap();
        fx.registry.rebase_repeaters(&RepeaterCounts::default());
        assert_eq!(fx.registry.get_bet(&fx.player, &key).unwrap().baseline, 0);
    }

    #[test]
    fn test_fire_not_offered_without_carried_trackers() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.place(BetType::Fire, 10),
            Err(CrapsError::BetNotOffered(BetType::Fire))
        );
        assert_eq!(fx.ledger.balance(&fx.player), 10_000);

        fx.rules.carry_trackers_within_hand = true;
        assert!(fx.place(BetType::Fire, 10).is_ok());
    }

    #[test]
    fn test_iteration_is_ordered() {
        let mut fx = Fixture::new();
        fx.place(BetType::Field, 10).unwrap();
        fx.place(BetType::Pass, 10).unwrap();
        fx.place(BetType::Hard4, 10).unwrap();
        let order: Vec<_> = fx.registry.iter().map(|bet| bet.bet_type).collect();
        assert_eq!(order, vec![BetType::Pass, BetType::Field, BetType::Hard4]);
        assert_eq!(fx.registry.total_staked(), 30);
    }
}
