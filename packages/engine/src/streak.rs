//! Calendar-day streak transition. All dates are calendar days in UTC;
//! the caller derives "today" once (`Utc::now().date_naive()` in the
//! backend) and passes the same value through one logical session so
//! the same-day check cannot misfire on clock skew.

use chrono::NaiveDate;

use crate::types::StreakState;

/// Apply one day of activity. Idempotent within a day: calling again
/// with the same `today` returns the state unchanged. A gap of exactly
/// one day continues the streak, anything longer restarts it at 1.
pub fn update_streak(state: &StreakState, today: NaiveDate) -> StreakState {
    if state.last_activity_date == Some(today) {
        return *state;
    }

    let continues = match (state.last_activity_date, today.pred_opt()) {
        (Some(last), Some(yesterday)) => last == yesterday,
        _ => false,
    };

    let current_streak = if continues {
        state.current_streak + 1
    } else {
        1
    };

    StreakState {
        current_streak,
        longest_streak: state.longest_streak.max(current_streak),
        last_activity_date: Some(today),
    }
}
