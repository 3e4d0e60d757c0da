//! Small shared utilities

/// Current time as Unix milliseconds
///
/// All persisted timestamps use this form; conversion to local dates
/// happens at the presentation edge.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Start of the current UTC day as Unix milliseconds
///
/// Used for "today" windows (dashboard stats, kitchen print feed).
pub fn today_start_millis() -> i64 {
    chrono::Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
        .timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_start_is_before_now() {
        let start = today_start_millis();
        let now = now_millis();
        assert!(start <= now);
        // Within the last 24h
        assert!(now - start < 24 * 60 * 60 * 1000);
    }
}
