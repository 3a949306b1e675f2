//! Daily and monthly spend limits.
//!
//! Counters reset lazily: nothing runs at midnight. Whenever a limit row is
//! read under lock, [`LimitState::refreshed`] zeroes any window whose reset
//! instant has passed and schedules the next one.
//!
//! - `window` - Reset instants and the lazy roll
//! - `state` - Limit row arithmetic (`reserve`)
//! - `error` - Limit error types

pub mod error;
pub mod state;
pub mod window;

#[cfg(test)]
mod state_props;

pub use error::LimitError;
pub use state::{LimitState, SpendLimits};
pub use window::{LimitWindow, roll};
