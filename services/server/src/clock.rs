//! Time source for the services

use chrono::{NaiveDateTime, Utc};

/// Provides the current instant to business rules that compare against "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;

#[cfg(test)]
mod fixed {
    use super::*;

    /// Clock frozen at a given instant
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: NaiveDateTime,
    }

    impl FixedClock {
        pub fn new(time: NaiveDateTime) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.time
        }
    }
}
