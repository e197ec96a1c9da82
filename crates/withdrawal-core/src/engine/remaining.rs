//! Remaining withdrawal time, kept as a normalized duration until display.

use chrono::TimeDelta;

use crate::models::WithdrawalUnit;

/// Time left on the longest open withdrawal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingTime {
    /// Exact remaining duration
    pub delta: TimeDelta,
    /// Display unit, taken from the record that owns the window
    pub unit: WithdrawalUnit,
}

impl RemainingTime {
    /// Whether `self` outranks `other`.
    ///
    /// Longer durations win regardless of unit. On an exact tie the day-class
    /// window wins, so the result does not depend on record order.
    pub fn outranks(&self, other: &RemainingTime) -> bool {
        match self.delta.cmp(&other.delta) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => {
                self.unit == WithdrawalUnit::Days && other.unit == WithdrawalUnit::Minutes
            }
        }
    }

    /// Remaining time in whole display units, rounded up.
    pub fn display_value(&self) -> u64 {
        ceil_units(self.delta, self.unit)
    }
}

/// Number of whole `unit`s needed to cover `delta`, rounded up. Zero for non-positive input.
pub fn ceil_units(delta: TimeDelta, unit: WithdrawalUnit) -> u64 {
    if delta <= TimeDelta::zero() {
        return 0;
    }
    let unit_secs = unit.unit_length().num_seconds();
    let secs = delta.num_seconds();
    let whole = (secs / unit_secs) as u64;
    let has_fraction = secs % unit_secs != 0 || delta.subsec_nanos() != 0;
    whole + u64::from(has_fraction)
}
