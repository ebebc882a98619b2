mod datetime;
mod filesystem;
mod string;

pub use datetime::{excel_serial_to_string, get_local_datetime_with_format, get_utc_iso_datetime};
pub use filesystem::{append_error_report, write_error_to_log};
pub use string::{normalize_string, truncate_chars};
