//! Ranking of normalized records against free-text investment criteria.
//!
//! Expert mode sends records in fixed-size batches to a text generation
//! service; any failure along the way discards the partial results and the
//! deterministic keyword ranking is used instead. [`RankOutcome`] tells the
//! caller which of the two produced the list.

pub mod expert;
pub mod fallback;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::CredentialProvider;
use crate::error::{ExpertError, ServiceError};
use crate::record::RecordTable;
use crate::ERRORS_LOG_FILE;
use crate::utils::append_error_report;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub name: String,
    /// Match score in [0, 100]
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    Expert,
    Fallback,
}

/// Why keyword ranking was used.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The caller asked for keyword ranking
    Requested,
    CredentialMissing,
    ServiceUnavailable(String),
    Parse(String),
}

impl From<ExpertError> for FallbackReason {
    fn from(err: ExpertError) -> Self {
        match err {
            ExpertError::CredentialMissing => FallbackReason::CredentialMissing,
            ExpertError::ServiceUnavailable(detail) => FallbackReason::ServiceUnavailable(detail),
            ExpertError::Parse(detail) => FallbackReason::Parse(detail),
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Requested => write!(f, "keyword ranking requested"),
            FallbackReason::CredentialMissing => write!(f, "no API credential configured"),
            FallbackReason::ServiceUnavailable(detail) => {
                write!(f, "text generation service unavailable: {}", detail)
            }
            FallbackReason::Parse(detail) => write!(f, "expert response not parseable: {}", detail),
        }
    }
}

/// Ranked shortlist tagged with the mode that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RankOutcome {
    Expert(Vec<RankedResult>),
    Fallback {
        results: Vec<RankedResult>,
        reason: FallbackReason,
    },
}

impl RankOutcome {
    pub fn results(&self) -> &[RankedResult] {
        match self {
            RankOutcome::Expert(results) => results,
            RankOutcome::Fallback { results, .. } => results,
        }
    }

    pub fn into_results(self) -> Vec<RankedResult> {
        match self {
            RankOutcome::Expert(results) => results,
            RankOutcome::Fallback { results, .. } => results,
        }
    }

    /// True when the list came from keyword matching
    pub fn is_degraded(&self) -> bool {
        matches!(self, RankOutcome::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            RankOutcome::Expert(_) => None,
            RankOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// One synchronous text-in, text-out call.
#[derive(Clone)]
pub struct CompletionRequest {
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("user_prompt", &self.user_prompt)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

/// Text generation backend used by expert mode.
pub trait CompletionService {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError>;
}

impl<T: CompletionService + ?Sized> CompletionService for &T {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        (**self).complete(request)
    }
}

impl<T: CompletionService + ?Sized> CompletionService for Box<T> {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        (**self).complete(request)
    }
}

/// Stable sort by score descending, then keep the first `top_n`.
pub fn sort_and_truncate(mut results: Vec<RankedResult>, top_n: usize) -> Vec<RankedResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_n);
    results
}

pub struct RankingEngine<P, S> {
    provider: P,
    service: S,
    /// Receives full reports of expert failures
    error_log: PathBuf,
}

impl<P, S> RankingEngine<P, S>
where
    P: CredentialProvider,
    S: CompletionService,
{
    pub fn new(provider: P, service: S) -> Self {
        RankingEngine {
            provider,
            service,
            error_log: PathBuf::from(ERRORS_LOG_FILE),
        }
    }

    /// Write failure reports to `path` instead of `errors.log`.
    pub fn with_error_log<T: Into<PathBuf>>(mut self, path: T) -> Self {
        self.error_log = path.into();
        self
    }

    /// Rank `records` against `criteria`, returning at most `top_n` results.
    /// Expert failures never surface as errors; they select keyword ranking.
    pub fn rank(
        &self,
        records: &RecordTable,
        criteria: &str,
        top_n: usize,
        mode: RankMode,
    ) -> RankOutcome {
        if records.is_empty() {
            tracing::info!("no records to rank");
            return match mode {
                RankMode::Expert => RankOutcome::Expert(Vec::new()),
                RankMode::Fallback => RankOutcome::Fallback {
                    results: Vec::new(),
                    reason: FallbackReason::Requested,
                },
            };
        }

        match mode {
            RankMode::Fallback => RankOutcome::Fallback {
                results: fallback::rank_by_keywords(records, criteria, top_n),
                reason: FallbackReason::Requested,
            },
            RankMode::Expert => match self.rank_expert(records, criteria, top_n) {
                Ok(results) => RankOutcome::Expert(results),
                Err(err) => {
                    if err == ExpertError::CredentialMissing {
                        tracing::warn!("{}; using keyword ranking", err);
                    } else {
                        tracing::error!("expert ranking failed: {}", err);
                        append_error_report(
                            &self.error_log,
                            "Expert Ranking Error",
                            &format!(
                                "Criteria: {}\nRecords: {}\nError: {}",
                                criteria,
                                records.len(),
                                err
                            ),
                        );
                    }
                    RankOutcome::Fallback {
                        results: fallback::rank_by_keywords(records, criteria, top_n),
                        reason: err.into(),
                    }
                }
            },
        }
    }

    /// Expert ranking only. Batches run in order; the first failing batch
    /// fails the whole call.
    pub fn rank_expert(
        &self,
        records: &RecordTable,
        criteria: &str,
        top_n: usize,
    ) -> Result<Vec<RankedResult>, ExpertError> {
        let api_key = self
            .provider
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ExpertError::CredentialMissing)?;
        let model = self.provider.model();

        let mut collected = Vec::with_capacity(records.len());
        for (batch_index, batch) in records.records().chunks(expert::EXPERT_BATCH_SIZE).enumerate()
        {
            let request = CompletionRequest {
                api_key: api_key.clone(),
                model: model.clone(),
                system_prompt: expert::SYSTEM_PROMPT.to_string(),
                user_prompt: expert::build_batch_prompt(batch, criteria),
                max_tokens: expert::MAX_TOKENS,
                temperature: expert::TEMPERATURE,
            };

            tracing::info!(
                "expert batch {} ({} records) sent to {}",
                batch_index + 1,
                batch.len(),
                model
            );
            let response = self.service.complete(&request)?;
            tracing::debug!("raw expert response: {}", response);

            collected.extend(expert::parse_expert_response(&response)?);
        }

        Ok(sort_and_truncate(collected, top_n))
    }
}
