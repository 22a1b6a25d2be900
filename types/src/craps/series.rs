use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::{
    is_point_number, MAX_SERIES_ROLLS, MAX_TOTAL, MIN_TOTAL, SMALL_NUMBERS, TALL_NUMBERS,
};

/// Table phase.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle = 0,
    ComeOut = 1,
    Point = 2,
}

impl TryFrom<u8> for Phase {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Phase::Idle),
            1 => Ok(Phase::ComeOut),
            2 => Ok(Phase::Point),
            _ => Err(()),
        }
    }
}

impl Write for Phase {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Phase {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        Phase::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for Phase {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}

/// How a series completed.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeriesEnd {
    Natural = 0,
    Craps = 1,
    PointMade = 2,
    SevenOut = 3,
    /// Operator override; settles as a seven-out.
    Forced = 4,
}

impl SeriesEnd {
    /// Seven-out and forced ends pass the dice; trackers never carry past them.
    pub fn ends_hand(self) -> bool {
        matches!(self, SeriesEnd::SevenOut | SeriesEnd::Forced)
    }
}

impl TryFrom<u8> for SeriesEnd {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SeriesEnd::Natural),
            1 => Ok(SeriesEnd::Craps),
            2 => Ok(SeriesEnd::PointMade),
            3 => Ok(SeriesEnd::SevenOut),
            4 => Ok(SeriesEnd::Forced),
            _ => Err(()),
        }
    }
}

impl Write for SeriesEnd {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for SeriesEnd {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        SeriesEnd::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl EncodeSize for SeriesEnd {
    fn encode_size(&self) -> usize {
        u8::SIZE
    }
}

/// Set of dice totals packed into a bitmask (bit `n` set when `n` is present).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct NumberSet(u16);

impl NumberSet {
    const VALID_BITS: u16 = 0b0001_1111_1111_1100;

    pub fn new() -> Self {
        Self(0)
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        if bits & !Self::VALID_BITS != 0 {
            return None;
        }
        Some(Self(bits))
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Adds `total`; returns true if it was not already present.
    pub fn insert(&mut self, total: u8) -> bool {
        if !(MIN_TOTAL..=MAX_TOTAL).contains(&total) {
            return false;
        }
        let bit = 1u16 << total;
        let added = self.0 & bit == 0;
        self.0 |= bit;
        added
    }

    pub fn contains(&self, total: u8) -> bool {
        (MIN_TOTAL..=MAX_TOTAL).contains(&total) && self.0 & (1u16 << total) != 0
    }

    pub fn contains_all(&self, totals: &[u8]) -> bool {
        totals.iter().all(|total| self.contains(*total))
    }

    /// Number of distinct totals present.
    pub fn len(&self) -> u8 {
        self.0.count_ones() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (MIN_TOTAL..=MAX_TOTAL).filter(move |total| self.contains(*total))
    }
}

impl Write for NumberSet {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for NumberSet {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let bits = u16::read(reader)?;
        NumberSet::from_bits(bits).ok_or(Error::Invalid("NumberSet", "bit outside 2..=12"))
    }
}

impl EncodeSize for NumberSet {
    fn encode_size(&self) -> usize {
        u16::SIZE
    }
}

/// Hit counts per dice total, indexed directly by total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct RepeaterCounts([u8; 13]);

impl RepeaterCounts {
    pub fn get(&self, total: u8) -> u8 {
        self.0.get(total as usize).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, total: u8) {
        if let Some(count) = self.0.get_mut(total as usize) {
            *count = count.saturating_add(1);
        }
    }

    pub fn as_array(&self) -> &[u8; 13] {
        &self.0
    }
}

impl Write for RepeaterCounts {
    fn write(&self, writer: &mut impl BufMut) {
        for count in self.0.iter() {
            count.write(writer);
        }
    }
}

impl Read for RepeaterCounts {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let mut counts = [0u8; 13];
        for count in counts.iter_mut() {
            *count = u8::read(reader)?;
        }
        if counts[0] != 0 || counts[1] != 0 {
            return Err(Error::Invalid("RepeaterCounts", "count for impossible total"));
        }
        Ok(Self(counts))
    }
}

impl EncodeSize for RepeaterCounts {
    fn encode_size(&self) -> usize {
        u8::SIZE * 13
    }
}

/// Bonus-bet progress owned by a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct BonusTrackers {
    /// Distinct point values made.
    pub fire_points: NumberSet,
    /// Members of the Small set rolled at least once.
    pub small_set: NumberSet,
    /// Members of the Tall set rolled at least once.
    pub tall_set: NumberSet,
    pub repeater_counts: RepeaterCounts,
}

impl BonusTrackers {
    /// Records a rolled total against the small/tall sets and repeater counts.
    pub fn record_roll(&mut self, total: u8) {
        if SMALL_NUMBERS.contains(&total) {
            self.small_set.insert(total);
        }
        if TALL_NUMBERS.contains(&total) {
            self.tall_set.insert(total);
        }
        if total != 7 {
            self.repeater_counts.increment(total);
        }
    }

    /// Records a made point; returns true if the value was new.
    pub fn record_point_made(&mut self, point: u8) -> bool {
        self.fire_points.insert(point)
    }

    pub fn points_made(&self) -> u8 {
        self.fire_points.len()
    }

    pub fn small_complete(&self) -> bool {
        self.small_set.contains_all(&SMALL_NUMBERS)
    }

    pub fn tall_complete(&self) -> bool {
        self.tall_set.contains_all(&TALL_NUMBERS)
    }

    pub fn all_complete(&self) -> bool {
        self.small_complete() && self.tall_complete()
    }
}

impl Write for BonusTrackers {
    fn write(&self, writer: &mut impl BufMut) {
        self.fire_points.write(writer);
        self.small_set.write(writer);
        self.tall_set.write(writer);
        self.repeater_counts.write(writer);
    }
}

impl Read for BonusTrackers {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            fire_points: NumberSet::read(reader)?,
            small_set: NumberSet::read(reader)?,
            tall_set: NumberSet::read(reader)?,
            repeater_counts: RepeaterCounts::read(reader)?,
        })
    }
}

impl EncodeSize for BonusTrackers {
    fn encode_size(&self) -> usize {
        self.fire_points.encode_size()
            + self.small_set.encode_size()
            + self.tall_set.encode_size()
            + self.repeater_counts.encode_size()
    }
}

/// One shooter's turn, from come-out to resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Series {
    pub id: u64,
    pub shooter: PublicKey,
    /// 0 until a point is established.
    pub point: u8,
    /// Roll totals in order.
    pub rolls: Vec<u8>,
    pub completed: bool,
    /// Terminal roll total (7 for a forced end), 0 while open.
    pub outcome: u8,
    pub end: Option<SeriesEnd>,
    pub trackers: BonusTrackers,
}

impl Series {
    pub fn new(id: u64, shooter: PublicKey) -> Self {
        Self::with_trackers(id, shooter, BonusTrackers::default())
    }

    pub fn with_trackers(id: u64, shooter: PublicKey, trackers: BonusTrackers) -> Self {
        Self {
            id,
            shooter,
            point: 0,
            rolls: Vec::new(),
            completed: false,
            outcome: 0,
            end: None,
            trackers,
        }
    }

    pub fn roll_count(&self) -> usize {
        self.rolls.len()
    }

    pub fn last_total(&self) -> Option<u8> {
        self.rolls.last().copied()
    }

    pub fn has_point(&self) -> bool {
        self.point != 0
    }
}

impl Write for Series {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.shooter.write(writer);
        self.point.write(writer);
        self.rolls.write(writer);
        self.completed.write(writer);
        self.outcome.write(writer);
        self.end.write(writer);
        self.trackers.write(writer);
    }
}

impl Read for Series {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = u64::read(reader)?;
        let shooter = PublicKey::read(reader)?;
        let point = u8::read(reader)?;
        if point != 0 && !is_point_number(point) {
            return Err(Error::Invalid("Series", "point is not a point number"));
        }
        let rolls = Vec::<u8>::read_range(reader, 0..=MAX_SERIES_ROLLS)?;
        if rolls
            .iter()
            .any(|total| !(MIN_TOTAL..=MAX_TOTAL).contains(total))
        {
            return Err(Error::Invalid("Series", "roll total out of range"));
        }
        let completed = bool::read(reader)?;
        let outcome = u8::read(reader)?;
        let end = Option::<SeriesEnd>::read(reader)?;
        if completed != end.is_some() {
            return Err(Error::Invalid("Series", "completion flag disagrees with end"));
        }
        let trackers = BonusTrackers::read(reader)?;
        Ok(Self {
            id,
            shooter,
            point,
            rolls,
            completed,
            outcome,
            end,
            trackers,
        })
    }
}

impl EncodeSize for Series {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.shooter.encode_size()
            + self.point.encode_size()
            + self.rolls.encode_size()
            + self.completed.encode_size()
            + self.outcome.encode_size()
            + self.end.encode_size()
            + self.trackers.encode_size()
    }
}
