use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use crate::domain::ports::Clock;

/// Wall clock; "today" is resolved in the configured timezone.
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// A clock that never moves. Used by tests and the seeding tooling.
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub tz: Tz,
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.tz).date_naive()
    }
}
