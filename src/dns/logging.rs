//! Structured Logging Module
//!
//! Wires `tracing` output for the CLI and library consumers and provides
//! per-lookup correlation so that the three resolver queries of one lookup
//! can be told apart from those of another.
//!
//! # Features
//!
//! * **Correlation IDs** - Every lookup runs inside a span carrying a UUID
//! * **Structured Logging** - JSON or human readable output
//! * **Env override** - `RUST_LOG` takes precedence over the configured level

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, span, warn, Level, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Log levels for different types of events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum log level
    pub level: LogLevel,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Enable console output
    pub console_output: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            json_format: false,
            console_output: true,
        }
    }
}

/// Summary of one finished lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupLog {
    /// Normalized hostname, if normalization succeeded
    pub domain: Option<String>,
    /// `matched`, `unknown`, `invalid_input` or `resolution_failed`
    pub outcome: String,
    /// Provider id for matched lookups
    pub provider: Option<String>,
    /// Pattern that triggered the match
    pub pattern: Option<String>,
    /// Total number of answer records
    pub record_count: usize,
}

/// Correlation context for one lookup
#[derive(Debug, Clone)]
pub struct CorrelationContext {
    pub id: String,
    pub started_at: Instant,
    pub operation: String,
}

impl CorrelationContext {
    pub fn new(operation: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Span that every event of this lookup is recorded under
    pub fn span(&self) -> Span {
        span!(
            Level::INFO,
            "lookup",
            correlation_id = %self.id,
            operation = %self.operation
        )
    }
}

/// Structured logger implementation
pub struct StructuredLogger {
    config: LoggerConfig,
}

impl StructuredLogger {
    /// Initialize the global subscriber with configuration
    pub fn init(config: LoggerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(format!("{:?}", config.level).to_lowercase()))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let init_result = if config.console_output && config.json_format {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
        } else if config.console_output {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .try_init()
        };

        // A subscriber installed earlier (tests, embedding apps) wins
        if let Err(e) = init_result {
            if config.console_output {
                eprintln!("Warning: Tracing subscriber already initialized: {}", e);
            }
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Log the end of a lookup
    pub fn log_lookup(ctx: &CorrelationContext, entry: &LookupLog) {
        let duration_ms = ctx.elapsed().as_millis() as u64;
        match entry.outcome.as_str() {
            "matched" | "unknown" => info!(
                correlation_id = %ctx.id,
                domain = ?entry.domain,
                outcome = %entry.outcome,
                provider = ?entry.provider,
                pattern = ?entry.pattern,
                record_count = entry.record_count,
                duration_ms,
                "lookup finished"
            ),
            _ => warn!(
                correlation_id = %ctx.id,
                domain = ?entry.domain,
                outcome = %entry.outcome,
                duration_ms,
                "lookup failed"
            ),
        }
    }
}
