#![allow(clippy::needless_return)]

pub mod model;
pub mod utils;

pub use screener_lib::ERRORS_LOG_FILE;
