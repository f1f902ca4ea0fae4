//! Heart economy: a bounded life pool that regenerates one heart per
//! fixed interval. The stored [`HeartState`] is a snapshot; current
//! availability is always recomputed from elapsed wall-clock time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{HeartState, HEART_COST, HEART_REGEN_INTERVAL_MS, MAX_HEARTS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartConfig {
    pub max_hearts: u32,
    pub regen_interval_ms: i64,
    pub heart_cost: u32,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            max_hearts: MAX_HEARTS,
            regen_interval_ms: HEART_REGEN_INTERVAL_MS,
            heart_cost: HEART_COST,
        }
    }
}

/// Result of trying to spend a heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartSpend {
    pub state: HeartState,
    pub success: bool,
}

/// Result of trying to buy a heart with coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartPurchase {
    pub state: HeartState,
    pub coins: u32,
    pub success: bool,
}

/// Hearts available at `now`, after applying regeneration since the
/// snapshot. Always in `0..=max_hearts`. A snapshot from the future
/// (clock skew) regenerates nothing.
pub fn actual_hearts(state: &HeartState, now: DateTime<Utc>, config: &HeartConfig) -> u32 {
    if state.count >= config.max_hearts {
        return config.max_hearts;
    }
    let elapsed = (now - state.updated_at).num_milliseconds().max(0);
    let regenerated = (elapsed / config.regen_interval_ms).min(config.max_hearts as i64) as u32;
    state.count.saturating_add(regenerated).min(config.max_hearts)
}

/// Spend one heart (wrong answer). Fails with the state unchanged when
/// no hearts are available; the caller must treat that as "out of
/// lives" and end the attempt.
pub fn lose_heart(state: &HeartState, now: DateTime<Utc>, config: &HeartConfig) -> HeartSpend {
    let actual = actual_hearts(state, now, config);
    if actual == 0 {
        return HeartSpend {
            state: *state,
            success: false,
        };
    }
    HeartSpend {
        state: HeartState {
            count: actual - 1,
            updated_at: now,
        },
        success: true,
    }
}

/// Buy one heart for `config.heart_cost` coins. Fails without change
/// when coins are short or the pool is already full.
pub fn buy_heart(
    state: &HeartState,
    coins: u32,
    now: DateTime<Utc>,
    config: &HeartConfig,
) -> HeartPurchase {
    let actual = actual_hearts(state, now, config);
    if coins < config.heart_cost || actual >= config.max_hearts {
        return HeartPurchase {
            state: *state,
            coins,
            success: false,
        };
    }
    HeartPurchase {
        state: HeartState {
            count: actual + 1,
            updated_at: now,
        },
        coins: coins - config.heart_cost,
        success: true,
    }
}

/// Seconds until the next heart regenerates, or `None` when the pool is
/// already full at `now`.
pub fn time_to_next_heart(
    state: &HeartState,
    now: DateTime<Utc>,
    config: &HeartConfig,
) -> Option<i64> {
    if actual_hearts(state, now, config) >= config.max_hearts {
        return None;
    }
    let elapsed = (now - state.updated_at).num_milliseconds().max(0);
    let remaining_ms = config.regen_interval_ms - (elapsed % config.regen_interval_ms);
    Some((remaining_ms + 999) / 1000)
}
