use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use thiserror::Error as ThisError;

use super::{HARDWAY_NUMBERS, MAX_DIE_FACE, MIN_DIE_FACE};

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum RollError {
    #[error("die face out of range (got={got}, min=1, max=6)")]
    FaceOutOfRange { got: u8 },
}

/// A single throw of two dice.
///
/// Faces are validated on construction and on decode, so every `Roll` in circulation has
/// `1 <= d1, d2 <= 6` and a total in `2..=12`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Roll {
    d1: u8,
    d2: u8,
}

impl Roll {
    pub fn new(d1: u8, d2: u8) -> Result<Self, RollError> {
        for face in [d1, d2] {
            if !(MIN_DIE_FACE..=MAX_DIE_FACE).contains(&face) {
                return Err(RollError::FaceOutOfRange { got: face });
            }
        }
        Ok(Self { d1, d2 })
    }

    pub fn d1(&self) -> u8 {
        self.d1
    }

    pub fn d2(&self) -> u8 {
        self.d2
    }

    pub fn total(&self) -> u8 {
        self.d1 + self.d2
    }

    /// True when both dice show the same face.
    pub fn is_pair(&self) -> bool {
        self.d1 == self.d2
    }

    /// True when this roll makes `total` the hard way.
    pub fn is_hardway(&self, total: u8) -> bool {
        is_hardway(self.d1, self.d2, total)
    }
}

/// `(d1 == d2) && (d1 + d2 == total) && total ∈ {4, 6, 8, 10}`.
pub fn is_hardway(d1: u8, d2: u8, total: u8) -> bool {
    d1 == d2 && d1.saturating_add(d2) == total && HARDWAY_NUMBERS.contains(&total)
}

impl Write for Roll {
    fn write(&self, writer: &mut impl BufMut) {
        self.d1.write(writer);
        self.d2.write(writer);
    }
}

impl Read for Roll {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let d1 = u8::read(reader)?;
        let d2 = u8::read(reader)?;
        Roll::new(d1, d2).map_err(|_| Error::Invalid("Roll", "die face out of range"))
    }
}

impl EncodeSize for Roll {
    fn encode_size(&self) -> usize {
        u8::SIZE * 2
    }
}
