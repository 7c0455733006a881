//! One lookup, from raw user input to a `DetectionResult`
//!
//! ```text
//! Idle -> Normalizing -> Resolving -> Aggregating -> Matching -> Done(Matched | Unknown)
//!              |              |
//!              +--------------+---------------------------------> Failed(InvalidInput | ResolutionFailed)
//! ```
//!
//! The CNAME, NS and A questions are sent concurrently and joined; the first
//! failure aborts the lookup and the other answers are dropped. There are no
//! retries, and nothing is shared between lookups except the read-only
//! signature table.

use std::fmt;

use serde_derive::Serialize;
use tracing::Instrument;

use crate::detect::matcher::SignatureMatcher;
use crate::detect::normalize::normalize_domain;
use crate::detect::result::DetectionResult;
use crate::detect::signatures::SignatureTable;
use crate::detect::LookupError;
use crate::dns::doh::RecordSource;
use crate::dns::logging::{CorrelationContext, LookupLog, StructuredLogger};
use crate::dns::query_type::QueryType;
use crate::dns::records::AggregatedDnsData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Matched,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    InvalidInput,
    ResolutionFailed,
}

/// Lifecycle of a single lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    Normalizing,
    Resolving,
    Aggregating,
    Matching,
    Done(Completion),
    Failed(Failure),
}

impl LookupPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LookupPhase::Done(_) | LookupPhase::Failed(_))
    }
}

impl fmt::Display for LookupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupPhase::Idle => f.write_str("Waiting"),
            LookupPhase::Normalizing => f.write_str("Parsing input"),
            LookupPhase::Resolving => f.write_str("Querying CNAME, NS and A records"),
            LookupPhase::Aggregating => f.write_str("Collecting answers"),
            LookupPhase::Matching => f.write_str("Matching provider signatures"),
            LookupPhase::Done(Completion::Matched) => f.write_str("Provider identified"),
            LookupPhase::Done(Completion::Unknown) => f.write_str("No provider signature matched"),
            LookupPhase::Failed(Failure::InvalidInput) => f.write_str("Invalid input"),
            LookupPhase::Failed(Failure::ResolutionFailed) => f.write_str("Resolution failed"),
        }
    }
}

impl LookupError {
    pub fn failure(&self) -> Failure {
        match self {
            LookupError::InvalidInput { .. } => Failure::InvalidInput,
            LookupError::ResolutionFailed(_) => Failure::ResolutionFailed,
        }
    }
}

/// Everything a completed lookup produced
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LookupOutcome {
    pub hostname: String,
    pub result: DetectionResult,
    /// Raw answers, kept for inspection
    pub records: AggregatedDnsData,
}

/// Runs lookups against a record source and a signature table
pub struct HostHunter<'t, S> {
    source: S,
    table: &'t SignatureTable,
}

impl<'t, S: RecordSource> HostHunter<'t, S> {
    pub fn new(source: S, table: &'t SignatureTable) -> HostHunter<'t, S> {
        HostHunter { source, table }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn hunt(&self, raw: &str) -> Result<LookupOutcome, LookupError> {
        self.hunt_with(raw, |_| {}).await
    }

    /// Run a lookup, reporting every phase transition to `observe`
    pub async fn hunt_with<F>(
        &self,
        raw: &str,
        mut observe: F,
    ) -> Result<LookupOutcome, LookupError>
    where
        F: FnMut(LookupPhase),
    {
        let ctx = CorrelationContext::new("detect");
        let span = ctx.span();

        let outcome = self.run(raw, &mut observe).instrument(span.clone()).await;

        let _entered = span.enter();
        let log = match &outcome {
            Ok(found) => LookupLog {
                domain: Some(found.hostname.clone()),
                outcome: if found.result.is_matched() { "matched" } else { "unknown" }.to_string(),
                provider: Some(found.result.provider_id().to_string()),
                pattern: match &found.result {
                    DetectionResult::Matched { pattern, .. } => Some(pattern.clone()),
                    DetectionResult::Unknown { .. } => None,
                },
                record_count: found.records.len(),
            },
            Err(e) => LookupLog {
                domain: None,
                outcome: match e.failure() {
                    Failure::InvalidInput => "invalid_input",
                    Failure::ResolutionFailed => "resolution_failed",
                }
                .to_string(),
                provider: None,
                pattern: None,
                record_count: 0,
            },
        };
        StructuredLogger::log_lookup(&ctx, &log);

        outcome
    }

    async fn run<F>(&self, raw: &str, observe: &mut F) -> Result<LookupOutcome, LookupError>
    where
        F: FnMut(LookupPhase),
    {
        observe(LookupPhase::Normalizing);
        let hostname = match normalize_domain(raw) {
            Ok(hostname) => hostname,
            Err(e) => {
                observe(LookupPhase::Failed(Failure::InvalidInput));
                return Err(e);
            }
        };
        tracing::debug!(%hostname, "normalized input");

        observe(LookupPhase::Resolving);
        let answers = tokio::try_join!(
            self.source.fetch(&hostname, QueryType::Cname),
            self.source.fetch(&hostname, QueryType::Ns),
            self.source.fetch(&hostname, QueryType::A),
        );
        let (cname, ns, a) = match answers {
            Ok(answers) => answers,
            Err(e) => {
                tracing::warn!(%hostname, error = %e, "DNS resolution failed");
                observe(LookupPhase::Failed(Failure::ResolutionFailed));
                return Err(LookupError::from(e));
            }
        };

        observe(LookupPhase::Aggregating);
        let records = AggregatedDnsData::aggregate(cname, ns, a);
        tracing::debug!(
            cname = records.cname_records.len(),
            ns = records.ns_records.len(),
            a = records.a_records.len(),
            "aggregated answers"
        );

        observe(LookupPhase::Matching);
        let found = SignatureMatcher::new(self.table).find_match(&records);
        let result = DetectionResult::from_match(found);

        observe(LookupPhase::Done(if result.is_matched() {
            Completion::Matched
        } else {
            Completion::Unknown
        }));

        Ok(LookupOutcome {
            hostname,
            result,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(!LookupPhase::Idle.is_terminal());
        assert!(!LookupPhase::Resolving.is_terminal());
        assert!(LookupPhase::Done(Completion::Unknown).is_terminal());
        assert!(LookupPhase::Failed(Failure::InvalidInput).is_terminal());
    }

    #[test]
    fn test_failure_kind() {
        let err = LookupError::InvalidInput {
            input: String::new(),
        };
        assert_eq!(err.failure(), Failure::InvalidInput);
        assert_eq!(err.to_string(), "Please enter a valid URL");
    }
}
