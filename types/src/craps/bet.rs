use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::{BOX_NUMBERS, HARDWAY_NUMBERS};

/// Bet-type catalog.
///
/// Codes are stable and grouped: line 0-3, field 4, yes 5-14, no 15-24, hardway 25-28,
/// odds 29-32, bonus 33-42, next 43-53, repeater 54-63. Bonus codes 33, 35, 36, 37, 41 and
/// 42 are reserved and never decode.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BetType {
    Pass = 0,
    DontPass = 1,
    Come = 2,
    DontCome = 3,
    Field = 4,
    Yes2 = 5,
    Yes3 = 6,
    Yes4 = 7,
    Yes5 = 8,
    Yes6 = 9,
    Yes8 = 10,
    Yes9 = 11,
    Yes10 = 12,
    Yes11 = 13,
    Yes12 = 14,
    No2 = 15,
    No3 = 16,
    No4 = 17,
    No5 = 18,
    No6 = 19,
    No8 = 20,
    No9 = 21,
    No10 = 22,
    No11 = 23,
    No12 = 24,
    Hard4 = 25,
    Hard6 = 26,
    Hard8 = 27,
    Hard10 = 28,
    OddsPass = 29,
    OddsDontPass = 30,
    OddsCome = 31,
    OddsDontCome = 32,
    Fire = 34,
    BonusSmall = 38,
    BonusTall = 39,
    BonusAll = 40,
    Next2 = 43,
    Next3 = 44,
    Next4 = 45,
    Next5 = 46,
    Next6 = 47,
    Next7 = 48,
    Next8 = 49,
    Next9 = 50,
    Next10 = 51,
    Next11 = 52,
    Next12 = 53,
    Repeater2 = 54,
    Repeater3 = 55,
    Repeater4 = 56,
    Repeater5 = 57,
    Repeater6 = 58,
    Repeater8 = 59,
    Repeater9 = 60,
    Repeater10 = 61,
    Repeater11 = 62,
    Repeater12 = 63,
}

/// Grouping of bet types that share timing and payout rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetCategory {
    Line,
    Field,
    Yes,
    No,
    Hardway,
    Odds,
    Bonus,
    Next,
    Repeater,
}

impl BetType {
    /// Every defined bet type in code order.
    pub const ALL: [BetType; 58] = [
        BetType::Pass,
        BetType::DontPass,
        BetType::Come,
        BetType::DontCome,
        BetType::Field,
        BetType::Yes2,
        BetType::Yes3,
        BetType::Yes4,
        BetType::Yes5,
        BetType::Yes6,
        BetType::Yes8,
        BetType::Yes9,
        BetType::Yes10,
        BetType::Yes11,
        BetType::Yes12,
        BetType::No2,
        BetType::No3,
        BetType::No4,
        BetType::No5,
        BetType::No6,
        BetType::No8,
        BetType::No9,
        BetType::No10,
        BetType::No11,
        BetType::No12,
        BetType::Hard4,
        BetType::Hard6,
        BetType::Hard8,
        BetType::Hard10,
        BetType::OddsPass,
        BetType::OddsDontPass,
        BetType::OddsCome,
        BetType::OddsDontCome,
        BetType::Fire,
        BetType::BonusSmall,
        BetType::BonusTall,
        BetType::BonusAll,
        BetType::Next2,
        BetType::Next3,
        BetType::Next4,
        BetType::Next5,
        BetType::Next6,
        BetType::Next7,
        BetType::Next8,
        BetType::Next9,
        BetType::Next10,
        BetType::Next11,
        BetType::Next12,
        BetType::Repeater2,
        BetType::Repeater3,
        BetType::Repeater4,
        BetType::Repeater5,
        BetType::Repeater6,
        BetType::Repeater8,
        BetType::Repeater9,
        BetType::Repeater10,
        BetType::Repeater11,
        BetType::Repeater12,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn category(self) -> BetCategory {
        match self as u8 {
            0..=3 => BetCategory::Line,
            4 => BetCategory::Field,
            5..=14 => BetCategory::Yes,
            15..=24 => BetCategory::No,
            25..=28 => BetCategory::Hardway,
            29..=32 => BetCategory::Odds,
            33..=42 => BetCategory::Bonus,
            43..=53 => BetCategory::Next,
            _ => BetCategory::Repeater,
        }
    }

    /// The number a per-number bet is on (Yes, No, Hardway, Next, Repeater).
    pub fn target(self) -> Option<u8> {
        let code = self as u8;
        match self.category() {
            BetCategory::Yes => Some(BOX_NUMBERS[(code - 5) as usize]),
            BetCategory::No => Some(BOX_NUMBERS[(code - 15) as usize]),
            BetCategory::Hardway => Some(HARDWAY_NUMBERS[(code - 25) as usize]),
            BetCategory::Next => Some(code - 41),
            BetCategory::Repeater => Some(BOX_NUMBERS[(code - 54) as usize]),
            _ => None,
        }
    }

    /// Bets that are decided by the very next roll regardless of outcome.
    pub fn is_one_roll(self) -> bool {
        matches!(self.category(), BetCategory::Field | BetCategory::Next)
    }

    /// Come and Don't Come, which travel to their own point.
    pub fn is_come_family(self) -> bool {
        matches!(self, BetType::Come | BetType::DontCome)
    }

    /// Bets tied to the lifetime of the current series (or hand, when trackers carry).
    pub fn is_series_scoped(self) -> bool {
        matches!(
            self,
            BetType::Pass | BetType::DontPass | BetType::OddsPass | BetType::OddsDontPass
        ) || matches!(self.category(), BetCategory::Bonus | BetCategory::Repeater)
    }

    /// Bets that keep one registry slot per attached point.
    pub fn keyed_by_point(self) -> bool {
        matches!(
            self,
            BetType::Come | BetType::DontCome | BetType::OddsCome | BetType::OddsDontCome
        )
    }

    /// The line bet an odds bet backs.
    pub fn line_for_odds(self) -> Option<BetType> {
        match self {
            BetType::OddsPass => Some(BetType::Pass),
            BetType::OddsDontPass => Some(BetType::DontPass),
            BetType::OddsCome => Some(BetType::Come),
            BetType::OddsDontCome => Some(BetType::DontCome),
            _ => None,
        }
    }

    /// The odds bet that backs a line bet.
    pub fn odds_for_line(self) -> Option<BetType> {
        match self {
            BetType::Pass => Some(BetType::OddsPass),
            BetType::DontPass => Some(BetType::OddsDontPass),
            BetType::Come => Some(BetType::OddsCome),
            BetType::DontCome => Some(BetType::OddsDontCome),
            _ => None,
        }
    }
}

impl TryFrom<u8> for BetType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BetType::ALL
            .iter()
            .copied()
            .find(|bet_type| *bet_type as u8 == value)
            .ok_or(())
    }
}

impl Write for BetType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for BetType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        BetType::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for BetType {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}

/// Registry slot for a player's bet.
///
/// Most bet types have a single slot (`point == 0`). Come-family bets and their odds are keyed
/// by the point they are attached to, so a player can hold several at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BetKey {
    pub bet_type: BetType,
    pub point: u8,
}

impl BetKey {
    pub fn new(bet_type: BetType) -> Self {
        Self { bet_type, point: 0 }
    }

    pub fn with_point(bet_type: BetType, point: u8) -> Self {
        Self { bet_type, point }
    }
}

/// An active bet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    pub player: PublicKey,
    pub bet_type: BetType,
    pub amount: u64,
    /// Locked point for odds bets, travelled point for come bets, otherwise 0.
    pub point: u8,
    /// Repeater tracker count for the bet's number at placement.
    pub baseline: u8,
    /// Registry sequence at placement (or at travel, for come bets).
    pub sequence: u64,
}

impl Bet {
    pub fn key(&self) -> BetKey {
        if self.bet_type.keyed_by_point() {
            BetKey::with_point(self.bet_type, self.point)
        } else {
            BetKey::new(self.bet_type)
        }
    }
}

impl Write for Bet {
    fn write(&self, writer: &mut impl BufMut) {
        self.player.write(writer);
        self.bet_type.write(writer);
        self.amount.write(writer);
        self.point.write(writer);
        self.baseline.write(writer);
        self.sequence.write(writer);
    }
}

impl Read for Bet {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            player: PublicKey::read(reader)?,
            bet_type: BetType::read(reader)?,
            amount: u64::read(reader)?,
            point: u8::read(reader)?,
            baseline: u8::read(reader)?,
            sequence: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Bet {
    fn encode_size(&self) -> usize {
        self.player.encode_size()
            + self.bet_type.encode_size()
            + self.amount.encode_size()
            + self.point.encode_size()
            + self.baseline.encode_size()
            + self.sequence.encode_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::craps::BET_CODE_COUNT;

    #[test]
    fn test_catalog_codes_and_reserved_slots() {
        let reserved = [33u8, 35, 36, 37, 41, 42];
        for code in 0..BET_CODE_COUNT {
            let parsed = BetType::try_from(code);
            if reserved.contains(&code) {
                assert!(parsed.is_err(), "code {code} should be reserved");
            } else {
                assert_eq!(parsed.map(BetType::code), Ok(code));
            }
        }
        for code in BET_CODE_COUNT..=u8::MAX {
            assert!(BetType::try_from(code).is_err());
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(BetType::DontCome.category(), BetCategory::Line);
        assert_eq!(BetType::Field.category(), BetCategory::Field);
        assert_eq!(BetType::Yes12.category(), BetCategory::Yes);
        assert_eq!(BetType::No2.category(), BetCategory::No);
        assert_eq!(BetType::Hard10.category(), BetCategory::Hardway);
        assert_eq!(BetType::OddsDontCome.category(), BetCategory::Odds);
        assert_eq!(BetType::BonusAll.category(), BetCategory::Bonus);
        assert_eq!(BetType::Next7.category(), BetCategory::Next);
        assert_eq!(BetType::Repeater2.category(), BetCategory::Repeater);
    }

    #[test]
    fn test_targets() {
        assert_eq!(BetType::Yes2.target(), Some(2));
        assert_eq!(BetType::Yes8.target(), Some(8));
        assert_eq!(BetType::No12.target(), Some(12));
        assert_eq!(BetType::Hard6.target(), Some(6));
        assert_eq!(BetType::Next2.target(), Some(2));
        assert_eq!(BetType::Next7.target(), Some(7));
        assert_eq!(BetType::Next12.target(), Some(12));
        assert_eq!(BetType::Repeater6.target(), Some(6));
        assert_eq!(BetType::Repeater8.target(), Some(8));
        assert_eq!(BetType::Pass.target(), None);
        assert_eq!(BetType::Fire.target(), None);
    }

    #[test]
    fn test_odds_line_pairs() {
        for line in [BetType::Pass, BetType::DontPass, BetType::Come, BetType::DontCome] {
            let odds = line.odds_for_line().unwrap();
            assert_eq!(odds.line_for_odds(), Some(line));
        }
        assert_eq!(BetType::Field.odds_for_line(), None);
    }
}
