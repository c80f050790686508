use crate::models::Plan;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Days left at which a subscription counts as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 5;

impl Plan {
    pub fn duration_days(self) -> i64 {
        match self {
            Plan::Monthly => 30,
            Plan::Bimonthly => 60,
            Plan::Quarterly => 90,
            Plan::Semiannual => 180,
            Plan::Annual => 365,
        }
    }
}

/// Saturates at the last representable instant instead of overflowing.
pub fn calculate_expiry(purchase: NaiveDateTime, plan: Plan) -> NaiveDateTime {
    purchase
        .checked_add_signed(Duration::days(plan.duration_days()))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Calendar days from `now` to `expiry`. Negative once expired, zero on the
/// expiry day itself, whatever the time of day.
pub fn days_remaining(expiry: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (expiry.date() - now.date()).num_days()
}

/// Elapsed share of the billing interval, in percent.
pub fn subscription_progress(purchase: NaiveDateTime, expiry: NaiveDateTime, now: NaiveDateTime) -> f64 {
    if now >= expiry || expiry <= purchase {
        return 100.0;
    }
    if now <= purchase {
        return 0.0;
    }

    let total = (expiry - purchase).num_milliseconds() as f64;
    let elapsed = (now - purchase).num_milliseconds() as f64;
    (elapsed / total * 100.0).clamp(0.0, 100.0)
}

/// Expiry-based classification shared by statistics, rows and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Expired,
    ExpiringSoon,
    Current,
}

impl Standing {
    pub fn from_days(days: i64) -> Self {
        if days < 0 {
            Standing::Expired
        } else if days <= EXPIRING_SOON_DAYS {
            Standing::ExpiringSoon
        } else {
            Standing::Current
        }
    }

    pub fn of(expiry: NaiveDateTime, now: NaiveDateTime) -> Self {
        Self::from_days(days_remaining(expiry, now))
    }

    pub fn is_expired(self) -> bool {
        self == Standing::Expired
    }
}
