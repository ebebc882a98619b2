#![allow(clippy::needless_return)]

pub mod column_normalizer;
pub mod config;
pub mod error;
pub mod header_locator;
pub mod loader;
pub mod pipeline;
pub mod ranking;
pub mod record;
pub mod row_sanitizer;
pub mod utils;

// Fixtures and service doubles; integration tests reach them through the `test` feature
#[cfg(any(test, feature = "test"))]
pub mod test_utils;

pub use column_normalizer::{CanonicalColumn, ColumnMapping, MappingSource, SheetTable};
pub use config::{CredentialProvider, ScreenerConfig, resolve_credential};
pub use error::{ExpertError, LoadError, NormalizationWarning, ServiceError};
pub use pipeline::{ProcessedSheet, SheetProcessor};
pub use ranking::{
    CompletionRequest, CompletionService, FallbackReason, RankMode, RankOutcome, RankedResult,
    RankingEngine,
};
pub use record::{Record, RecordTable};

pub const ERRORS_LOG_FILE: &str = "errors.log";
