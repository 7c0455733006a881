//! DNS plumbing
//!
//! # Module Structure
//!
//! * `query_type` - Record type codes and mnemonics
//! * `records` - Answer records and the aggregated CNAME/NS/A record set
//! * `doh` - DNS-over-HTTPS JSON client
//! * `context` - Process configuration
//! * `logging` - Tracing setup and per-lookup correlation

/// DNS query type definitions
pub mod query_type;

/// Answer records and their aggregation
pub mod records;

/// DNS-over-HTTPS (DoH) JSON client
pub mod doh;

/// Configuration shared by all lookups
pub mod context;

/// Structured logging with correlation IDs
pub mod logging;
