use chrono::prelude::Local;
use chrono::{Duration, NaiveDate, Timelike};

pub fn get_utc_iso_datetime() -> String {
    let timestamp = chrono::Utc::now().to_rfc3339();
    return timestamp;
}

pub fn get_local_datetime_with_format(format: &str) -> String {
    return Local::now().format(format).to_string();
}

/// Render an Excel serial date (days since 1899-12-30) as ISO text.
///
/// Whole days render as `%Y-%m-%d`; values carrying a time of day render as
/// `%Y-%m-%d %H:%M:%S`. Returns `None` for serials chrono cannot represent.
pub fn excel_serial_to_string(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let excel_base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = value.trunc() as i64;
    let seconds = ((value - days as f64) * 86400.0).round() as i64;
    let datetime = excel_base
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))?;

    if datetime.num_seconds_from_midnight() == 0 {
        Some(datetime.format("%Y-%m-%d").to_string())
    } else {
        Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
