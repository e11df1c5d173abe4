use chrono::{DateTime, SubsecRound, Utc};

/// Postgres `TIMESTAMPTZ` keeps microseconds.
const STORED_SUBSEC_DIGITS: u16 = 6;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Drops sub-microsecond precision so an instant compares equal to its
/// stored form.
pub fn to_stored_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(STORED_SUBSEC_DIGITS)
}
