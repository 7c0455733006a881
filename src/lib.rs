//! Host Hunt
//!
//! Identifies which hosting or CDN provider serves a domain by reading its
//! public DNS footprint and comparing it with a table of provider
//! fingerprints.
//!
//! # Features
//!
//! * Accepts bare domains or full URLs
//! * CNAME, NS and A answers fetched concurrently over DNS-over-HTTPS (JSON API)
//! * Ordered, first-match-wins signature table, replaceable from a TOML file
//! * Defined "Unknown / Self-Hosted" fallback when nothing matches
//!
//! # Architecture
//!
//! * `dns` - DoH client, record types, configuration and logging
//! * `detect` - Normalization, signatures, matching and the lookup pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use hosthunt::detect::{HostHunter, SignatureTable};
//! use hosthunt::dns::doh::{DohClient, DEFAULT_DOH_ENDPOINT};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let table = SignatureTable::builtin();
//! let client = DohClient::new(DEFAULT_DOH_ENDPOINT.to_string(), None)?;
//! let outcome = HostHunter::new(client, &table).hunt("https://my-app.vercel.app").await?;
//! println!("{}", outcome.result.signature().name);
//! # Ok(())
//! # }
//! ```

/// DNS-over-HTTPS plumbing
pub mod dns;

/// Provider detection engine
pub mod detect;
