//! Achievement unlocking.
//!
//! Stamp creation asks the policy which achievements a new stamp unlocks.
//! The current policy does not evaluate criteria: every catalog entry the
//! user has not unlocked yet is unlocked by the next stamp. Clients already
//! rely on that, so it stays until criteria evaluation exists; swap the
//! function used in [`Store::record_stamp`](super::store::Store::record_stamp)
//! to change it.

use super::models::Achievement;

/// Every catalog achievement whose code is not in `unlocked`, in catalog order.
pub fn unlock_every_remaining(catalog: &[Achievement], unlocked: &[String]) -> Vec<Achievement> {
    catalog.iter()
        .filter(|achievement| !unlocked.contains(&achievement.code))
        .cloned()
        .collect()
}
