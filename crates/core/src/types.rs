/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (daily lives bookkeeping) are UTC dates.
pub type Date = chrono::NaiveDate;

/// Today's date in UTC.
pub fn today_utc() -> Date {
    chrono::Utc::now().date_naive()
}
