//! Property-based tests for spend limits.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use proptest::prelude::*;

use super::state::{LimitState, SpendLimits};
use super::window::LimitWindow;

fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // 2020-01-01 .. ~2040
    (1_577_836_800i64..2_208_988_800i64)
        .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* instant, the next reset is a later UTC midnight.
    #[test]
    fn prop_next_reset_is_future_midnight(now in instant_strategy()) {
        for window in [LimitWindow::Daily, LimitWindow::Monthly] {
            let reset = window.next_reset(now);
            prop_assert!(reset > now);
            prop_assert_eq!(reset.num_seconds_from_midnight(), 0);
        }
        prop_assert!(LimitWindow::Daily.next_reset(now) - now <= Duration::days(1));
    }

    /// *For any* sequence of reservations, the counters never exceed the limits
    /// and a rejected reservation is simply not applied.
    #[test]
    fn prop_reservations_never_exceed_limits(
        start in instant_strategy(),
        steps in prop::collection::vec((1i64..600, 0i64..20_000), 1..60),
    ) {
        let limits = SpendLimits::new(1_000, 8_000).unwrap();
        let mut state = LimitState::new(limits, start);
        let mut now = start;

        for (amount, advance_secs) in steps {
            now += Duration::seconds(advance_secs);
            match state.reserve(amount, now) {
                Ok(next) => state = next,
                Err(_) => state = state.refreshed(now),
            }
            prop_assert!(state.daily_spent <= limits.daily_limit);
            prop_assert!(state.monthly_spent <= limits.monthly_limit);
            prop_assert!(state.daily_spent <= state.monthly_spent);
        }
    }
}
