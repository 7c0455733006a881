//! DNS-over-HTTPS (DoH) JSON client
//!
//! Queries a resolver speaking the `application/dns-json` dialect
//! (`GET {endpoint}?name=<host>&type=<TYPE>`), as offered by Google Public DNS
//! and Cloudflare.
//!
//! # Features
//!
//! * **JSON API** - Only the `Answer[].{name,type,TTL,data}` fields are consumed
//! * **Missing sections** - An absent `Answer` is an empty answer, not an error
//! * **Pluggable** - The `RecordSource` trait decouples lookups from HTTP

use std::future::Future;
use std::time::Duration;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::dns::query_type::QueryType;
use crate::dns::records::DnsRecord;

/// DoH Content Types
pub const DOH_CONTENT_TYPE_JSON: &str = "application/dns-json";

/// Google Public DNS JSON API
pub const DEFAULT_DOH_ENDPOINT: &str = "https://dns.google/resolve";

#[derive(Debug, Display, Error)]
pub enum DohError {
    #[display(fmt = "DoH request failed: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "DoH server returned {} for {} query", status, qtype)]
    Status { status: u16, qtype: QueryType },
    #[display(fmt = "Failed to parse DoH response: {}", _0)]
    Decode(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DohError>;

/// DNS JSON response body
///
/// Every section is optional on the wire; fields the lookup does not need
/// are not modelled and are skipped during deserialization.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DnsJson {
    /// Status (standard DNS response code)
    #[serde(rename = "Status", default)]
    pub status: u16,
    /// Answer section, absent or `null` when there is nothing to report
    #[serde(rename = "Answer", default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Vec<DnsJsonRecord>>,
    /// Free-form resolver diagnostics
    #[serde(rename = "Comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// DNS JSON Record format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsJsonRecord {
    /// Domain name
    pub name: String,
    /// Record type, `0` when the resolver omits it
    #[serde(rename = "type", default)]
    pub rtype: u16,
    /// Time to live
    #[serde(rename = "TTL", default)]
    pub ttl: u32,
    /// Record data
    pub data: String,
}

impl From<DnsJsonRecord> for DnsRecord {
    fn from(record: DnsJsonRecord) -> Self {
        DnsRecord {
            owner_name: record.name,
            record_type: QueryType::from_num(record.rtype),
            ttl: record.ttl,
            value: record.data,
        }
    }
}

impl DnsJson {
    /// Parse a response body into answer records
    pub fn parse_answers(body: &[u8]) -> Result<Vec<DnsRecord>> {
        let json: DnsJson = serde_json::from_slice(body).map_err(DohError::Decode)?;
        if json.status != 0 {
            log::debug!("DoH response carried rcode {} ({:?})", json.status, json.comment);
        }
        Ok(json
            .answer
            .unwrap_or_default()
            .into_iter()
            .map(DnsRecord::from)
            .collect())
    }
}

/// Source of answer records for a single (name, type) question
///
/// `DohClient` is the production implementation; tests substitute canned
/// answers.
pub trait RecordSource {
    fn fetch(
        &self,
        hostname: &str,
        qtype: QueryType,
    ) -> impl Future<Output = Result<Vec<DnsRecord>>> + Send;
}

/// DoH client issuing JSON API queries
pub struct DohClient {
    /// DoH server URL
    pub server_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl DohClient {
    /// Create a new DoH client
    ///
    /// Without a `timeout` the transport default applies.
    pub fn new(server_url: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DohError::Transport)?;

        Ok(Self { server_url, client })
    }

    /// Create a client around a preconfigured HTTP client (proxies, TLS roots)
    pub fn with_client(server_url: String, client: reqwest::Client) -> Self {
        Self { server_url, client }
    }

    /// Query DNS over HTTPS using the JSON GET API
    pub async fn query_json(&self, domain: &str, qtype: QueryType) -> Result<Vec<DnsRecord>> {
        log::debug!("DoH {} query for {} via {}", qtype, domain, self.server_url);

        let qtype_name = qtype.to_string();
        let response = self
            .client
            .get(&self.server_url)
            .query(&[("name", domain), ("type", qtype_name.as_str())])
            .header("Accept", DOH_CONTENT_TYPE_JSON)
            .send()
            .await
            .map_err(DohError::Transport)?;

        if !response.status().is_success() {
            log::warn!("DoH server returned {} for {} {}", response.status(), domain, qtype);
            return Err(DohError::Status {
                status: response.status().as_u16(),
                qtype,
            });
        }

        let body = response.bytes().await.map_err(DohError::Transport)?;
        let records = DnsJson::parse_answers(&body)?;

        log::debug!("DoH found {} answers for {} {}", records.len(), domain, qtype);
        Ok(records)
    }
}

impl RecordSource for DohClient {
    fn fetch(
        &self,
        hostname: &str,
        qtype: QueryType,
    ) -> impl Future<Output = Result<Vec<DnsRecord>>> + Send {
        self.query_json(hostname, qtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_google_response() {
        let body = br#"{
            "Status": 0, "TC": false, "RD": true, "RA": true, "AD": false, "CD": false,
            "Question": [{"name": "my-app.vercel.app.", "type": 5}],
            "Answer": [{"name": "my-app.vercel.app.", "type": 5, "TTL": 1800, "data": "cname.vercel-dns.com."}]
        }"#;

        let records = DnsJson::parse_answers(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner_name, "my-app.vercel.app.");
        assert_eq!(records[0].record_type, QueryType::Cname);
        assert_eq!(records[0].ttl, 1800);
        assert_eq!(records[0].value, "cname.vercel-dns.com.");
    }

    #[test]
    fn test_missing_answer_is_empty() {
        let body = br#"{"Status": 0, "Question": [{"name": "example.com.", "type": 5}],
            "Authority": [{"name": "example.com.", "type": 6, "TTL": 1800, "data": "ns.icann.org. noc.dns.icann.org. 1 7200 3600 1209600 3600"}]}"#;

        let records = DnsJson::parse_answers(body).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_nxdomain_is_not_an_error() {
        let body = br#"{"Status": 3, "Comment": "NXDOMAIN"}"#;
        assert!(DnsJson::parse_answers(body).unwrap().is_empty());
    }

    #[test]
    fn test_null_answer_is_empty() {
        let body = br#"{"Status": 0, "Answer": null}"#;
        assert!(DnsJson::parse_answers(body).unwrap().is_empty());
    }

    #[test]
    fn test_answer_without_type() {
        let body = br#"{"Status": 0, "Answer": [{"name": "example.com.", "TTL": 60, "data": "192.0.2.7"}]}"#;

        let records = DnsJson::parse_answers(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, QueryType::Unknown(0));
        assert_eq!(records[0].value, "192.0.2.7");
    }

    #[test]
    fn test_malformed_body() {
        let err = DnsJson::parse_answers(b"<html>busy</html>").unwrap_err();
        assert!(matches!(err, DohError::Decode(_)));
    }

    #[test]
    fn test_status_error_display() {
        let err = DohError::Status {
            status: 500,
            qtype: QueryType::Ns,
        };
        assert_eq!(err.to_string(), "DoH server returned 500 for NS query");
    }
}
