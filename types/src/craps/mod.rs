//! Craps domain types.
//!
//! Defines dice, bets, series and table rules used by the execution layer.

mod bet;
mod constants;
mod dice;
mod rules;
mod series;

pub use bet::*;
pub use constants::*;
pub use dice::*;
pub use rules::*;
pub use series::*;
