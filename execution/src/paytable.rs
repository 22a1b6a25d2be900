//! Fixed-point payout tables.
//!
//! Ratios are `(numerator, denominator)` pairs of winnings to stake. Field entries are in
//! hundredths of the stake and Next payouts are winnings in basis points. All
//! arithmetic is integer, widened to `u128` and narrowed back with a checked conversion, so
//! results are reproducible on every platform. Fractional winnings round down.

use craps_types::{BetCategory, BetType, FIRE_MIN_POINTS};

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Field multiplier in hundredths, indexed by roll total. A non-zero entry `x` returns
/// `(x / 100 + 1) * stake`; zero loses.
pub const FIELD_RETURN_HUNDREDTHS: [u16; 13] = [0, 0, 200, 100, 100, 0, 0, 0, 0, 100, 100, 100, 300];

/// Next (one-roll) winnings in basis points of the stake, indexed by target total.
/// True odds less a 2% edge.
pub const NEXT_WIN_BPS: [u64; 13] = [
    0, 0, 343_000, 166_700, 107_800, 78_400, 60_760, 49_000, 60_760, 78_400, 107_800, 166_700,
    343_000,
];

/// Fire winnings (to 1) by number of distinct points made.
pub const FIRE_LADDER: [(u8, u64); 4] = [(3, 7), (4, 24), (5, 249), (6, 999)];

/// Small and Tall winnings (to 1).
pub const SMALL_TALL_PAYOUT: u64 = 34;

/// All winnings (to 1).
pub const ALL_PAYOUT: u64 = 175;

/// Field multiplier for `total`, in hundredths. Zero means the bet loses.
pub fn field_payout(total: u8) -> u16 {
    FIELD_RETURN_HUNDREDTHS
        .get(total as usize)
        .copied()
        .unwrap_or(0)
}

/// Pass / Come odds (true odds).
pub fn pass_odds_ratio(point: u8) -> Option<(u64, u64)> {
    match point {
        4 | 10 => Some((2, 1)),
        5 | 9 => Some((3, 2)),
        6 | 8 => Some((6, 5)),
        _ => None,
    }
}

/// Don't Pass / Don't Come odds (lay odds).
pub fn dont_odds_ratio(point: u8) -> Option<(u64, u64)> {
    pass_odds_ratio(point).map(|(num, den)| (den, num))
}

/// Yes (place) bet on `number`.
pub fn yes_ratio(number: u8) -> Option<(u64, u64)> {
    match number {
        2 | 12 => Some((6, 1)),
        3 | 11 => Some((3, 1)),
        4 | 10 => Some((9, 5)),
        5 | 9 => Some((7, 5)),
        6 | 8 => Some((7, 6)),
        _ => None,
    }
}

/// No (lay) bet on `number`: the inverse of the Yes ratio.
pub fn no_ratio(number: u8) -> Option<(u64, u64)> {
    yes_ratio(number).map(|(num, den)| (den, num))
}

pub fn hardway_ratio(number: u8) -> Option<(u64, u64)> {
    match number {
        4 | 10 => Some((7, 1)),
        6 | 8 => Some((9, 1)),
        _ => None,
    }
}

pub fn next_win_bps(number: u8) -> Option<u64> {
    NEXT_WIN_BPS
        .get(number as usize)
        .copied()
        .filter(|bps| *bps > 0)
}

/// Fire winnings (to 1) for `points_made` distinct points; `None` below the minimum.
pub fn fire_multiplier(points_made: u8) -> Option<u64> {
    if points_made < FIRE_MIN_POINTS {
        return None;
    }
    FIRE_LADDER
        .iter()
        .rev()
        .find(|(points, _)| points_made >= *points)
        .map(|(_, pays)| *pays)
}

/// Hits required and winnings (to 1) for a Repeater bet on `number`.
pub fn repeater_terms(number: u8) -> Option<(u8, u64)> {
    match number {
        2 | 12 => Some((2, 40)),
        3 | 11 => Some((3, 50)),
        4 | 10 => Some((4, 65)),
        5 | 9 => Some((5, 80)),
        6 | 8 => Some((6, 90)),
        _ => None,
    }
}

/// `stake * num / den`, or `None` if the result does not fit in a `u64`.
pub fn winnings(stake: u64, num: u64, den: u64) -> Option<u64> {
    if den == 0 {
        return None;
    }
    let scaled = (stake as u128).checked_mul(num as u128)? / den as u128;
    u64::try_from(scaled).ok()
}

/// Stake plus `stake * num / den`.
pub fn total_return(stake: u64, num: u64, den: u64) -> Option<u64> {
    stake.checked_add(winnings(stake, num, den)?)
}

/// Total return of a winning `bet_type` bet of `amount`.
///
/// `key` is whatever the payout depends on: the locked point for odds bets, the rolled total
/// for Field, the number of distinct points made for Fire. It is ignored by every other type.
/// Returns `Some(0)` when the key cannot win (a Field 7, Fire below three points) and `None`
/// on overflow.
pub fn calculate_payout(bet_type: BetType, amount: u64, key: u8) -> Option<u64> {
    let even = (1, 1);
    let ratio = match bet_type.category() {
        BetCategory::Line => even,
        BetCategory::Field => {
            let hundredths = field_payout(key) as u64;
            if hundredths == 0 {
                return Some(0);
            }
            (hundredths, 100)
        }
        BetCategory::Yes => yes_ratio(bet_type.target()?)?,
        BetCategory::No => no_ratio(bet_type.target()?)?,
        BetCategory::Hardway => hardway_ratio(bet_type.target()?)?,
        BetCategory::Odds => match bet_type {
            BetType::OddsPass | BetType::OddsCome => pass_odds_ratio(key),
            _ => dont_odds_ratio(key),
        }
        .unwrap_or((0, 1)),
        BetCategory::Next => (next_win_bps(bet_type.target()?)?, BPS_DENOMINATOR),
        BetCategory::Bonus => match bet_type {
            BetType::Fire => match fire_multiplier(key) {
                Some(pays) => (pays, 1),
                None => return Some(0),
            },
            BetType::BonusAll => (ALL_PAYOUT, 1),
            _ => (SMALL_TALL_PAYOUT, 1),
        },
        BetCategory::Repeater => (repeater_terms(bet_type.target()?)?.1, 1),
    };
    if ratio.0 == 0 {
        return Some(0);
    }
    total_return(amount, ratio.0, ratio.1)
}
