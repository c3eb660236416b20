/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Calendar date of a millisecond timestamp as `YYYYMMDD` (UTC).
///
/// Used for human-readable order numbers.
pub fn date_stamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .format("%Y%m%d")
        .to_string()
}
