/// Lowest face of a die.
pub const MIN_DIE_FACE: u8 = 1;

/// Highest face of a die.
pub const MAX_DIE_FACE: u8 = 6;

/// Lowest possible two-dice total.
pub const MIN_TOTAL: u8 = 2;

/// Highest possible two-dice total.
pub const MAX_TOTAL: u8 = 12;

/// Totals that establish a point on the come-out roll.
pub const POINT_NUMBERS: [u8; 6] = [4, 5, 6, 8, 9, 10];

/// Numbers covered by Yes/No and Repeater bets (every total except 7).
pub const BOX_NUMBERS: [u8; 10] = [2, 3, 4, 5, 6, 8, 9, 10, 11, 12];

/// Numbers covered by Hardway bets.
pub const HARDWAY_NUMBERS: [u8; 4] = [4, 6, 8, 10];

/// Membership of the "Small" bonus set.
pub const SMALL_NUMBERS: [u8; 5] = [2, 3, 4, 5, 6];

/// Membership of the "Tall" bonus set.
pub const TALL_NUMBERS: [u8; 5] = [8, 9, 10, 11, 12];

/// Number of bet-type codes in the catalog (0..=63).
pub const BET_CODE_COUNT: u8 = 64;

/// Upper bound on roll history read back from an encoded series.
pub const MAX_SERIES_ROLLS: usize = 65_536;

/// Minimum distinct points made before a Fire bet pays.
pub const FIRE_MIN_POINTS: u8 = 3;

/// Returns true if `total` can be a point.
pub fn is_point_number(total: u8) -> bool {
    POINT_NUMBERS.contains(&total)
}

/// Returns true if `total` is a come-out natural (7 or 11).
pub fn is_natural(total: u8) -> bool {
    total == 7 || total == 11
}

/// Returns true if `total` is a come-out craps (2, 3 or 12).
pub fn is_craps(total: u8) -> bool {
    matches!(total, 2 | 3 | 12)
}
