//! Daily lives: a per-user counter that refills once per UTC day.

use serde::{Deserialize, Serialize};

use crate::types::{Date, DbId, Timestamp};

/// Lives granted at the start of every day.
pub const MAX_DAILY_LIVES: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLives {
    pub id: DbId,
    pub user_id: DbId,
    pub current_lives: i32,
    pub last_reset_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DailyLives {
    /// True when the record has not been refilled today.
    pub fn needs_reset(&self, today: Date) -> bool {
        self.last_reset_date < today
    }

    pub fn reset(&mut self, today: Date) {
        self.current_lives = MAX_DAILY_LIVES;
        self.last_reset_date = today;
    }

    /// Refill if the day rolled over. Returns whether a reset happened.
    pub fn reset_if_due(&mut self, today: Date) -> bool {
        if self.needs_reset(today) {
            self.reset(today);
            true
        } else {
            false
        }
    }

    pub fn has_lives(&self) -> bool {
        self.current_lives > 0
    }

    /// Spend one life. Returns `false` (and changes nothing) when exhausted.
    pub fn consume(&mut self) -> bool {
        if !self.has_lives() {
            return false;
        }
        self.current_lives -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::types::today_utc;

    fn lives(current: i32, last_reset_date: Date) -> DailyLives {
        let now = Utc::now();
        DailyLives {
            id: 1,
            user_id: 1,
            current_lives: current,
            last_reset_date,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn consume_stops_at_zero() {
        let mut l = lives(1, today_utc());
        assert!(l.consume());
        assert_eq!(l.current_lives, 0);
        assert!(!l.consume());
        assert_eq!(l.current_lives, 0);
    }

    #[test]
    fn rollover_refills() {
        let today = today_utc();
        let mut l = lives(0, today - Duration::days(1));
        assert!(l.needs_reset(today));
        assert!(l.reset_if_due(today));
        assert_eq!(l.current_lives, MAX_DAILY_LIVES);
        assert_eq!(l.last_reset_date, today);
        assert!(!l.reset_if_due(today));
    }

    #[test]
    fn same_day_does_not_refill() {
        let today = today_utc();
        let mut l = lives(2, today);
        assert!(!l.reset_if_due(today));
        assert_eq!(l.current_lives, 2);
    }
}
