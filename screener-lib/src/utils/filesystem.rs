use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::ERRORS_LOG_FILE;
use crate::utils::get_utc_iso_datetime;

/// Centralized function to append a detailed failure report to the errors log file
///
/// # Arguments
/// * `error_type` - A description of the failure category (e.g., "Expert Ranking Error")
/// * `error_message` - The full failure detail
pub fn write_error_to_log(error_type: &str, error_message: &str) {
    append_error_report(Path::new(ERRORS_LOG_FILE), error_type, error_message);
}

/// Same as [`write_error_to_log`] with an explicit log file.
pub fn append_error_report(log_path: &Path, error_type: &str, error_message: &str) {
    let timestamp = get_utc_iso_datetime();
    let log_entry = format!("\n[{}] {}:\n{}\n", timestamp, error_type, error_message);

    match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(mut file) => {
            let _ = writeln!(file, "{}", log_entry);
        }
        Err(e) => {
            tracing::debug!("could not open {}: {}", log_path.display(), e);
        }
    }
}
