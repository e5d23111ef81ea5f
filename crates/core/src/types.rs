/// Store-assigned primary keys (users, email tokens, role rows) and organization ids.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Convert a timestamp to the Unix-seconds form used in storage.
pub fn to_unix(ts: Timestamp) -> i64 {
    ts.timestamp()
}

/// Convert a stored Unix-seconds value back to a timestamp.
///
/// Returns `None` for values outside chrono's representable range.
pub fn from_unix(secs: i64) -> Option<Timestamp> {
    chrono::DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_round_trip_drops_subsecond_precision() {
        let ts = from_unix(1_700_000_000).unwrap();
        assert_eq!(to_unix(ts), 1_700_000_000);
    }
}
