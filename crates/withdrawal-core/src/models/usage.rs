//! Medicine usage ledger models.

use chrono::{DateTime, Days, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Granularity of a withdrawal period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalUnit {
    /// Calendar days (catalog medicines)
    Days,
    /// Minutes (synthetic test medicines)
    Minutes,
}

impl WithdrawalUnit {
    /// Stable string form used in storage and over FFI.
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalUnit::Days => "days",
            WithdrawalUnit::Minutes => "minutes",
        }
    }

    /// Parse the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "days" => Some(WithdrawalUnit::Days),
            "minutes" => Some(WithdrawalUnit::Minutes),
            _ => None,
        }
    }

    /// Length of one unit.
    pub fn unit_length(&self) -> TimeDelta {
        match self {
            WithdrawalUnit::Days => TimeDelta::days(1),
            WithdrawalUnit::Minutes => TimeDelta::minutes(1),
        }
    }
}

/// A withdrawal period resolved at administration time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WithdrawalDuration {
    /// Magnitude in `unit`
    pub amount: u32,
    /// Unit of `amount`
    pub unit: WithdrawalUnit,
}

impl WithdrawalDuration {
    /// A day-granularity withdrawal period.
    pub fn days(amount: u32) -> Self {
        Self {
            amount,
            unit: WithdrawalUnit::Days,
        }
    }

    /// A minute-granularity (test-class) withdrawal period.
    pub fn minutes(amount: u32) -> Self {
        Self {
            amount,
            unit: WithdrawalUnit::Minutes,
        }
    }

    /// Whether the period is empty (expires at administration).
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// End of the withdrawal window for a dose given at `administered_at`.
    ///
    /// Days are added on the calendar rather than as multiples of 86400 seconds.
    /// Overflow saturates to the far future, which keeps the record active.
    pub fn expiry_from(&self, administered_at: DateTime<Utc>) -> DateTime<Utc> {
        let expiry = match self.unit {
            WithdrawalUnit::Days => {
                administered_at.checked_add_days(Days::new(u64::from(self.amount)))
            }
            WithdrawalUnit::Minutes => {
                administered_at.checked_add_signed(TimeDelta::minutes(i64::from(self.amount)))
            }
        };
        expiry.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A logged administration of a medicine to one animal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageRecord {
    /// Unique record ID
    pub id: String,
    /// Owning animal (internal ID)
    pub animal_id: String,
    /// Medicine name as administered
    pub medicine_name: String,
    /// When the medicine was given
    pub administered_at: DateTime<Utc>,
    /// Withdrawal period snapshotted at administration
    pub withdrawal: WithdrawalDuration,
    /// Free-text notes
    pub notes: Option<String>,
}

impl UsageRecord {
    /// Create a new usage record.
    pub fn new(
        animal_id: String,
        medicine_name: String,
        withdrawal: WithdrawalDuration,
        administered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            animal_id,
            medicine_name,
            administered_at,
            withdrawal,
            notes: None,
        }
    }

    /// End of this record's withdrawal window.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.withdrawal.expiry_from(self.administered_at)
    }

    /// Whether the window has fully elapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_unit_round_trip_strings() {
        assert_eq!(WithdrawalUnit::parse("days"), Some(WithdrawalUnit::Days));
        assert_eq!(WithdrawalUnit::parse("minutes"), Some(WithdrawalUnit::Minutes));
        assert_eq!(WithdrawalUnit::parse("hours"), None);
        assert_eq!(WithdrawalUnit::Minutes.as_str(), "minutes");
    }

    #[test]
    fn test_day_expiry_uses_calendar() {
        let expiry = WithdrawalDuration::days(10).expiry_from(t0());
        assert_eq!(expiry, Utc.with_ymd_and_hms(2024, 3, 11, 8, 30, 0).unwrap());

        // Crosses the leap day
        let start = Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap();
        let expiry = WithdrawalDuration::days(2).expiry_from(start);
        assert_eq!(expiry, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_minute_expiry() {
        let expiry = WithdrawalDuration::minutes(3).expiry_from(t0());
        assert_eq!(expiry, t0() + TimeDelta::minutes(3));
    }

    #[test]
    fn test_overflow_saturates() {
        let late = DateTime::<Utc>::MAX_UTC - TimeDelta::days(1);
        let expiry = WithdrawalDuration::days(u32::MAX).expiry_from(late);
        assert_eq!(expiry, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_record_expiry_boundary() {
        let record = UsageRecord::new(
            "animal-1".into(),
            "Test 1".into(),
            WithdrawalDuration::minutes(1),
            t0(),
        );
        assert!(!record.is_expired_at(t0() + TimeDelta::seconds(59)));
        assert!(record.is_expired_at(t0() + TimeDelta::seconds(60)));
        assert_eq!(record.id.len(), 36);
    }

    #[test]
    fn test_zero_duration_expires_immediately() {
        let record = UsageRecord::new(
            "animal-1".into(),
            "Vitamin Z".into(),
            WithdrawalDuration::days(0),
            t0(),
        );
        assert!(record.withdrawal.is_zero());
        assert!(record.is_expired_at(t0()));
    }
}
