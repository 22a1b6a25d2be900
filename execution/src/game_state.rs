//! Phase state machine for a craps table.
//!
//! This module owns the current series (one shooter's turn) and the rules that move it between
//! phases. It knows nothing about bets or money: a roll goes in, a [`Transition`] comes out.
//!
//! ## Phases
//!
//! 1. **Idle** - No series is open. Only `start_new_series` is valid.
//! 2. **ComeOut** - The first roll of a series. 7/11 is a natural, 2/3/12 is craps, both
//!    complete the series. Any other total establishes the point.
//! 3. **Point** - Rolling for the point. Hitting it completes the series ("point made"), a 7
//!    completes it as a seven-out, everything else leaves the phase unchanged.
//!
//! A completed series returns the table to `Idle`; the machine has no terminal state.
//!
//! ## Trackers
//!
//! Bonus trackers belong to a shooter's hand, which ends on a seven-out, a forced end or a change
//! of shooter. Repeater counts always carry through the hand. Fire, Small and Tall progress
//! carries only when the table carries trackers; otherwise it restarts with every series.
//!
//! ## Evaluate, then apply
//!
//! Rolls are processed in two steps so callers can compute settlements against the post-roll
//! series before committing anything:
//!
//! ```rust,ignore
//! let step = game.evaluate_roll(roll)?;      // pure, returns the next series snapshot
//! let plan = engine.settle(&step, &bets)?;    // may fail without side effects
//! game.apply(step)?;                           // commit
//! ```
//!
//! [`GameState::process_roll`] does both for callers that don't need the split.

use commonware_cryptography::ed25519::PublicKey;
use craps_types::{
    is_craps, is_natural, is_point_number, BonusTrackers, Phase, Roll, Series, SeriesEnd,
    MAX_SERIES_ROLLS,
};

use crate::CrapsError;

/// What a roll (or a forced end) did to the series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Come-out roll set the point.
    PointEstablished(u8),
    /// Come-out 7 or 11.
    Natural(u8),
    /// Come-out 2, 3 or 12.
    Craps(u8),
    PointMade(u8),
    SevenOut,
    /// Point phase roll that was neither the point nor 7.
    NoChange,
    /// Operator ended the series without a roll.
    ForcedEnd,
}

impl Transition {
    pub fn series_end(self) -> Option<SeriesEnd> {
        match self {
            Transition::Natural(_) => Some(SeriesEnd::Natural),
            Transition::Craps(_) => Some(SeriesEnd::Craps),
            Transition::PointMade(_) => Some(SeriesEnd::PointMade),
            Transition::SevenOut => Some(SeriesEnd::SevenOut),
            Transition::ForcedEnd => Some(SeriesEnd::Forced),
            Transition::PointEstablished(_) | Transition::NoChange => None,
        }
    }

    pub fn completes_series(self) -> bool {
        self.series_end().is_some()
    }
}

/// A computed but uncommitted change to the current series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesStep {
    /// `None` for a forced end.
    pub roll: Option<Roll>,
    pub transition: Transition,
    pub phase_before: Phase,
    pub point_before: u8,
    /// The series after the step.
    pub series: Series,
}

impl SeriesStep {
    pub fn total(&self) -> Option<u8> {
        self.roll.map(|roll| roll.total())
    }

    pub fn phase_after(&self) -> Phase {
        if self.series.completed {
            Phase::Idle
        } else if self.series.has_point() {
            Phase::Point
        } else {
            Phase::ComeOut
        }
    }

    /// Whether Fire, Small, Tall and All bets must be decided on this step.
    ///
    /// With trackers carried across the hand, only a seven-out (or forced end) closes them;
    /// otherwise every series completion does.
    pub fn closes_bonus_window(&self, carry_trackers: bool) -> bool {
        match self.series.end {
            Some(end) => end.ends_hand() || !carry_trackers,
            None => false,
        }
    }
}

/// Pure state machine for the table's series lifecycle.
#[derive(Clone, Debug)]
pub struct GameState {
    phase: Phase,
    current: Option<Series>,
    last_completed: Option<Series>,
    next_series_id: u64,
    carry_trackers: bool,
    /// Trackers handed to the next series if the same shooter keeps the dice.
    carried: Option<(PublicKey, BonusTrackers)>,
}

impl GameState {
    pub fn new(carry_trackers: bool) -> Self {
        Self {
            phase: Phase::Idle,
            current: None,
            last_completed: None,
            next_series_id: 1,
            carry_trackers,
            carried: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current(&self) -> Option<&Series> {
        self.current.as_ref()
    }

    /// Current point, 0 when none.
    pub fn point(&self) -> u8 {
        self.current.as_ref().map(|series| series.point).unwrap_or(0)
    }

    pub fn last_completed(&self) -> Option<&Series> {
        self.last_completed.as_ref()
    }

    pub fn next_series_id(&self) -> u64 {
        self.next_series_id
    }

    /// Opens a new series for `shooter`. Valid only from `Idle`.
    pub fn start_new_series(&mut self, shooter: PublicKey) -> Result<u64, CrapsError> {
        if self.phase != Phase::Idle {
            return Err(CrapsError::InvalidPhaseTransition {
                action: "start series",
                phase: self.phase,
            });
        }
        let id = self.next_series_id;
        let trackers = match self.carried.take() {
            Some((previous, trackers)) if previous == shooter => trackers,
            _ => BonusTrackers::default(),
        };
        self.current = Some(Series::with_trackers(id, shooter, trackers));
        self.next_series_id = id.saturating_add(1);
        self.phase = Phase::ComeOut;
        Ok(id)
    }

    /// Computes the effect of `roll` on the open series without mutating anything.
    pub fn evaluate_roll(&self, roll: Roll) -> Result<SeriesStep, CrapsError> {
        let current = self.open_series("roll")?;
        if current.rolls.len() >= MAX_SERIES_ROLLS {
            return Err(CrapsError::InvalidPhaseTransition {
                action: "roll past history limit",
                phase: self.phase,
            });
        }

        let total = roll.total();
        let mut series = current.clone();
        series.rolls.push(total);
        series.trackers.record_roll(total);

        let transition = match self.phase {
            Phase::ComeOut if is_natural(total) => Transition::Natural(total),
            Phase::ComeOut if is_craps(total) => Transition::Craps(total),
            Phase::ComeOut if is_point_number(total) => {
                series.point = total;
                Transition::PointEstablished(total)
            }
            Phase::Point if total == series.point => {
                series.trackers.record_point_made(total);
                Transition::PointMade(total)
            }
            Phase::Point if total == 7 => Transition::SevenOut,
            Phase::Point => Transition::NoChange,
            // Every total in 2..=12 is a natural, craps or a point number.
            Phase::ComeOut | Phase::Idle => {
                return Err(CrapsError::InvalidPhaseTransition {
                    action: "roll",
                    phase: self.phase,
                })
            }
        };

        if let Some(end) = transition.series_end() {
            series.completed = true;
            series.outcome = total;
            series.end = Some(end);
        }

        Ok(SeriesStep {
            roll: Some(roll),
            transition,
            phase_before: self.phase,
            point_before: current.point,
            series,
        })
    }

    /// Computes an operator-forced completion: outcome 7, settled as a seven-out.
    pub fn evaluate_end(&self) -> Result<SeriesStep, CrapsError> {
        let current = self.open_series("end series")?;
        let mut series = current.clone();
        series.completed = true;
        series.outcome = 7;
        series.end = Some(SeriesEnd::Forced);
        Ok(SeriesStep {
            roll: None,
            transition: Transition::ForcedEnd,
            phase_before: self.phase,
            point_before: current.point,
            series,
        })
    }

    /// Commits a step produced by `evaluate_roll` or `evaluate_end` on this state.
    ///
    /// Returns the series if the step completed it.
    pub fn apply(&mut self, step: SeriesStep) -> Result<Option<&Series>, CrapsError> {
        let current_id = self.open_series("apply step")?.id;
        if step.series.id != current_id || step.phase_before != self.phase {
            return Err(CrapsError::InvalidPhaseTransition {
                action: "apply stale step",
                phase: self.phase,
            });
        }

        self.phase = step.phase_after();
        if let Some(end) = step.series.end {
            self.carried = if end.ends_hand() {
                None
            } else if self.carry_trackers {
                Some((step.series.shooter.clone(), step.series.trackers))
            } else {
                // Repeater counts live for the shooter's hand even when the other trackers reset.
                let trackers = BonusTrackers {
                    repeater_counts: step.series.trackers.repeater_counts,
                    ..BonusTrackers::default()
                };
                Some((step.series.shooter.clone(), trackers))
            };
            self.current = None;
            self.last_completed = Some(step.series);
            return Ok(self.last_completed.as_ref());
        }
        self.current = Some(step.series);
        Ok(None)
    }

    /// Evaluates and applies a roll of `d1`, `d2`.
    pub fn process_roll(&mut self, d1: u8, d2: u8) -> Result<Transition, CrapsError> {
        let roll = Roll::new(d1, d2).map_err(|_| CrapsError::InvalidDice { d1, d2 })?;
        let step = self.evaluate_roll(roll)?;
        let transition = step.transition;
        self.apply(step)?;
        Ok(transition)
    }

    /// Forces completion of the open series with outcome 7.
    pub fn end_current_series(&mut self) -> Result<Transition, CrapsError> {
        let step = self.evaluate_end()?;
        self.apply(step)?;
        Ok(Transition::ForcedEnd)
    }

    fn open_series(&self, action: &'static str) -> Result<&Series, CrapsError> {
        match (&self.current, self.phase) {
            (Some(series), Phase::ComeOut | Phase::Point) => Ok(series),
            _ => Err(CrapsError::InvalidPhaseTransition {
                action,
                phase: self.phase,
            }),
        }
    }
}
