use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::BetType;

#[derive(Debug, ThisError)]
pub enum RulesError {
    #[error("min_bet must be greater than zero")]
    ZeroMinBet,
    #[error("min_bet exceeds max_bet (min={min}, max={max})")]
    InvertedLimits { min: u64, max: u64 },
    #[error("invalid rules json: {0}")]
    Json(#[from] serde_json::Error),
}

/// House policy for a table.
///
/// The flags cover the behaviours that vary between houses; everything else about the game is
/// fixed by the paytable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRules {
    /// Don't Pass / Don't Come push on a come-out 12. When false the bet stays up unresolved.
    pub bar_twelve_pushes: bool,
    /// Pass and Don't Pass (and Come / Don't Come once travelled) may be taken down after a
    /// point is established.
    pub line_bets_removable_after_point: bool,
    /// Bonus trackers survive a series that ends without a seven-out, so bonus and repeater
    /// bets run for the whole hand rather than a single series.
    pub carry_trackers_within_hand: bool,
    pub min_bet: u64,
    pub max_bet: u64,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            bar_twelve_pushes: true,
            line_bets_removable_after_point: false,
            carry_trackers_within_hand: false,
            min_bet: 1,
            max_bet: u64::MAX,
        }
    }
}

impl TableRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.min_bet == 0 {
            return Err(RulesError::ZeroMinBet);
        }
        if self.min_bet > self.max_bet {
            return Err(RulesError::InvertedLimits {
                min: self.min_bet,
                max: self.max_bet,
            });
        }
        Ok(())
    }

    /// Parse and validate rules from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: TableRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn to_json(&self) -> Result<String, RulesError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn accepts_amount(&self, amount: u64) -> bool {
        (self.min_bet..=self.max_bet).contains(&amount)
    }

    /// Whether the table takes `bet_type` at all.
    ///
    /// Fire needs three points made, which only a hand-long tracker can record.
    pub fn offers(&self, bet_type: BetType) -> bool {
        bet_type != BetType::Fire || self.carry_trackers_within_hand
    }
}
