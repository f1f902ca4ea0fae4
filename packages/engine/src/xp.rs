//! XP/level curve. Levels follow triangular thresholds:
//! `xp_for_level(n) = 50 * n * (n - 1)`, so level boundaries sit at
//! 0, 100, 300, 600, 1000, ... XP never decreases during normal play.

use crate::types::ExperienceState;

fn threshold(level: u32) -> u128 {
    let n = level as u128;
    50 * n * (n - 1)
}

/// Total XP required to reach `level`. Level 1 starts at 0.
pub fn xp_for_level(level: u32) -> u64 {
    threshold(level).min(u64::MAX as u128) as u64
}

/// Level for a cumulative XP amount. Monotonic non-decreasing, total
/// for all of `u64`, and `level_for_xp(0) == 1`.
pub fn level_for_xp(xp: u64) -> u32 {
    // Closed-form estimate from 50*n*(n-1) <= xp, corrected for float
    // rounding at the boundaries.
    let estimate = ((1.0 + (1.0 + xp as f64 / 12.5).sqrt()) / 2.0) as u32;
    let mut level = estimate.max(1);
    let xp = xp as u128;
    while level > 1 && threshold(level) > xp {
        level -= 1;
    }
    while xp >= threshold(level + 1) {
        level += 1;
    }
    level
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub state: ExperienceState,
    pub leveled_up: bool,
    pub new_level: u32,
}

/// Add XP and detect level crossings. When several levels are crossed
/// in one award, `new_level` carries only the final level - the caller
/// notifies once per award.
pub fn add_xp(state: &ExperienceState, amount: u64) -> XpAward {
    let xp = state.xp.saturating_add(amount);
    let new_level = level_for_xp(xp);
    XpAward {
        state: ExperienceState {
            xp,
            level: new_level,
        },
        leveled_up: new_level > state.level,
        new_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_at_zero_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(299), 2);
        assert_eq!(level_for_xp(300), 3);
        assert_eq!(level_for_xp(600), 4);
        assert_eq!(level_for_xp(1000), 5);
    }

    #[test]
    fn test_level_consistent_with_thresholds() {
        for level in 1..200u32 {
            assert_eq!(level_for_xp(xp_for_level(level)), level);
            assert_eq!(level_for_xp(xp_for_level(level + 1) - 1), level);
        }
    }

    #[test]
    fn test_add_xp_no_level_up() {
        let award = add_xp(&ExperienceState::default(), 50);
        assert_eq!(award.state.xp, 50);
        assert!(!award.leveled_up);
        assert_eq!(award.new_level, 1);
    }

    #[test]
    fn test_add_xp_single_level_up() {
        let award = add_xp(&ExperienceState { xp: 80, level: 1 }, 30);
        assert!(award.leveled_up);
        assert_eq!(award.new_level, 2);
        assert_eq!(award.state.level, 2);
    }

    #[test]
    fn test_add_xp_multi_level_crossing_notifies_final_only() {
        let award = add_xp(&ExperienceState { xp: 0, level: 1 }, 650);
        assert!(award.leveled_up);
        assert_eq!(award.new_level, 4);
    }

    #[test]
    fn test_add_xp_saturates() {
        let award = add_xp(
            &ExperienceState {
                xp: u64::MAX - 1,
                level: level_for_xp(u64::MAX - 1),
            },
            100,
        );
        assert_eq!(award.state.xp, u64::MAX);
    }
}
