//! Archive of completed series and the queries over it.
//!
//! Completed series are appended once and never mutated. Reads return the stored value, so
//! encoding the same series twice yields identical bytes.
//!
//! ## Query Types
//!
//! - [`SeriesArchive::get`]: a series by its sequential id
//! - [`SeriesArchive::range`]: series with ids in a range
//! - [`SeriesArchive::by_shooter`]: every series rolled by one shooter
//! - [`SeriesSummary`]: compact view of a series for listings

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use commonware_codec::Encode;
use commonware_cryptography::ed25519::PublicKey;
use craps_types::{Series, SeriesEnd};

use crate::CrapsError;

/// Compact view of a completed series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesSummary {
    pub id: u64,
    pub shooter: PublicKey,
    pub point: u8,
    pub roll_count: usize,
    pub outcome: u8,
    pub end: Option<SeriesEnd>,
    /// Distinct points made (popcount of the fire tracker).
    pub points_made: u8,
}

impl SeriesSummary {
    pub fn from_series(series: &Series) -> Self {
        Self {
            id: series.id,
            shooter: series.shooter.clone(),
            point: series.point,
            roll_count: series.roll_count(),
            outcome: series.outcome,
            end: series.end,
            points_made: series.trackers.points_made(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SeriesArchive {
    series: BTreeMap<u64, Series>,
}

impl SeriesArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a completed series. Returns false (and stores nothing) if the series is still
    /// open or its id is already archived.
    pub fn append(&mut self, series: Series) -> bool {
        if !series.completed || self.series.contains_key(&series.id) {
            return false;
        }
        self.series.insert(series.id, series);
        true
    }

    pub fn get(&self, id: u64) -> Result<&Series, CrapsError> {
        self.series.get(&id).ok_or(CrapsError::SeriesNotFound(id))
    }

    /// The archived encoding of a series.
    pub fn encoded(&self, id: u64) -> Result<Vec<u8>, CrapsError> {
        Ok(self.get(id)?.encode().to_vec())
    }

    pub fn latest(&self) -> Option<&Series> {
        self.series.values().next_back()
    }

    pub fn range(&self, ids: RangeInclusive<u64>) -> impl Iterator<Item = &Series> {
        self.series.range(ids).map(|(_, series)| series)
    }

    pub fn by_shooter<'a>(&'a self, shooter: &'a PublicKey) -> impl Iterator<Item = &'a Series> {
        self.series
            .values()
            .filter(move |series| &series.shooter == shooter)
    }

    pub fn summaries(&self) -> Vec<SeriesSummary> {
        self.series.values().map(SeriesSummary::from_series).collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
