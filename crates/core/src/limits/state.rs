//! Limit row arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tijori_shared::config::LimitsConfig;

use super::error::LimitError;
use super::window::{LimitWindow, roll};

/// Configured ceilings for one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendLimits {
    /// Maximum spend per UTC day.
    pub daily_limit: i64,
    /// Maximum spend per UTC month.
    pub monthly_limit: i64,
}

impl SpendLimits {
    /// Creates limits after checking that both are positive and that the
    /// monthly limit covers the daily one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLimits` otherwise.
    pub const fn new(daily_limit: i64, monthly_limit: i64) -> Result<Self, LimitError> {
        if daily_limit <= 0 || monthly_limit <= 0 || monthly_limit < daily_limit {
            return Err(LimitError::InvalidLimits {
                daily: daily_limit,
                monthly: monthly_limit,
            });
        }
        Ok(Self {
            daily_limit,
            monthly_limit,
        })
    }
}

impl From<LimitsConfig> for SpendLimits {
    fn from(config: LimitsConfig) -> Self {
        Self {
            daily_limit: config.daily_limit,
            monthly_limit: config.monthly_limit,
        }
    }
}

/// The stored limit row of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitState {
    /// Daily ceiling.
    pub daily_limit: i64,
    /// Spent in the current day.
    pub daily_spent: i64,
    /// When the daily counter next resets.
    pub daily_reset_at: DateTime<Utc>,
    /// Monthly ceiling.
    pub monthly_limit: i64,
    /// Spent in the current month.
    pub monthly_spent: i64,
    /// When the monthly counter next resets.
    pub monthly_reset_at: DateTime<Utc>,
}

impl LimitState {
    /// Fresh counters for a new wallet.
    #[must_use]
    pub fn new(limits: SpendLimits, now: DateTime<Utc>) -> Self {
        Self {
            daily_limit: limits.daily_limit,
            daily_spent: 0,
            daily_reset_at: LimitWindow::Daily.next_reset(now),
            monthly_limit: limits.monthly_limit,
            monthly_spent: 0,
            monthly_reset_at: LimitWindow::Monthly.next_reset(now),
        }
    }

    /// Applies the lazy reset to both windows.
    #[must_use]
    pub fn refreshed(self, now: DateTime<Utc>) -> Self {
        let (daily_spent, daily_reset_at) =
            roll(LimitWindow::Daily, self.daily_spent, self.daily_reset_at, now);
        let (monthly_spent, monthly_reset_at) = roll(
            LimitWindow::Monthly,
            self.monthly_spent,
            self.monthly_reset_at,
            now,
        );
        Self {
            daily_spent,
            daily_reset_at,
            monthly_spent,
            monthly_reset_at,
            ..self
        }
    }

    /// Left in the current day, never negative.
    #[must_use]
    pub fn remaining_daily(&self) -> i64 {
        self.daily_limit.saturating_sub(self.daily_spent).max(0)
    }

    /// Left in the current month, never negative.
    #[must_use]
    pub fn remaining_monthly(&self) -> i64 {
        self.monthly_limit.saturating_sub(self.monthly_spent).max(0)
    }

    /// Refreshes the windows and reserves `amount` against both.
    ///
    /// The daily window is checked first. On error nothing is reserved; the
    /// caller rolls back its transaction.
    ///
    /// # Errors
    ///
    /// Returns `DailyExceeded` or `MonthlyExceeded` with the remaining amount.
    pub fn reserve(self, amount: i64, now: DateTime<Utc>) -> Result<Self, LimitError> {
        if amount <= 0 {
            return Err(LimitError::InvalidAmount(amount));
        }
        let state = self.refreshed(now);

        let daily_spent = state
            .daily_spent
            .checked_add(amount)
            .ok_or(LimitError::Overflow)?;
        if daily_spent > state.daily_limit {
            return Err(LimitError::DailyExceeded {
                remaining: state.remaining_daily(),
                requested: amount,
            });
        }

        let monthly_spent = state
            .monthly_spent
            .checked_add(amount)
            .ok_or(LimitError::Overflow)?;
        if monthly_spent > state.monthly_limit {
            return Err(LimitError::MonthlyExceeded {
                remaining: state.remaining_monthly(),
                requested: amount,
            });
        }

        Ok(Self {
            daily_spent,
            monthly_spent,
            ..state
        })
    }

    /// Replaces the ceilings, keeping counters and reset instants.
    #[must_use]
    pub const fn with_limits(self, limits: SpendLimits) -> Self {
        Self {
            daily_limit: limits.daily_limit,
            monthly_limit: limits.monthly_limit,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tijori_shared::AppError;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap()
    }

    fn state() -> LimitState {
        LimitState::new(SpendLimits::new(1_000, 5_000).unwrap(), start())
    }

    #[test]
    fn test_new_schedules_resets() {
        let state = state();
        assert_eq!(state.daily_reset_at, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(state.monthly_reset_at, Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());
        assert_eq!(state.remaining_daily(), 1_000);
    }

    #[test]
    fn test_reserve_increments_both_counters() {
        let state = state().reserve(400, start()).unwrap();
        assert_eq!(state.daily_spent, 400);
        assert_eq!(state.monthly_spent, 400);
        assert_eq!(state.remaining_daily(), 600);
    }

    #[test]
    fn test_reserve_up_to_limit() {
        let state = state().reserve(1_000, start()).unwrap();
        let err = state.reserve(1, start()).unwrap_err();
        assert_eq!(
            err,
            LimitError::DailyExceeded {
                remaining: 0,
                requested: 1
            }
        );
        let app: AppError = err.into();
        assert!(matches!(app, AppError::BadRequest(ref m) if m.contains("exceeds daily limit")));
    }

    #[test]
    fn test_daily_counter_resets_next_day() {
        let now = start();
        let state = state().reserve(1_000, now).unwrap();
        let tomorrow = now + Duration::days(1);
        let state = state.reserve(1_000, tomorrow).unwrap();
        assert_eq!(state.daily_spent, 1_000);
        assert_eq!(state.monthly_spent, 2_000);
    }

    #[test]
    fn test_monthly_limit_enforced_across_days() {
        let mut state = state();
        let mut now = start();
        for _ in 0..5 {
            state = state.reserve(1_000, now).unwrap();
            now += Duration::days(1);
        }
        let err = state.reserve(1, now).unwrap_err();
        assert!(matches!(err, LimitError::MonthlyExceeded { remaining: 0, requested: 1 }));
        assert!(err.to_string().contains("exceeds monthly limit"));
    }

    #[test]
    fn test_limits_validation() {
        assert!(SpendLimits::new(100, 100).is_ok());
        assert!(SpendLimits::new(0, 100).is_err());
        assert!(SpendLimits::new(200, 100).is_err());
        assert!(matches!(
            AppError::from(SpendLimits::new(-1, 5).unwrap_err()),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn test_with_limits_keeps_counters() {
        let state = state()
            .reserve(300, start())
            .unwrap()
            .with_limits(SpendLimits::new(2_000, 9_000).unwrap());
        assert_eq!(state.daily_spent, 300);
        assert_eq!(state.remaining_daily(), 1_700);
    }

    #[test]
    fn test_from_config_defaults() {
        let limits = SpendLimits::from(LimitsConfig::default());
        assert_eq!(limits.daily_limit, 1_000_000);
        assert_eq!(limits.monthly_limit, 10_000_000);
    }
}
