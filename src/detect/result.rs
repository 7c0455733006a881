//! Final identification of a lookup and its presentation summary

use serde_derive::{Deserialize, Serialize};

use crate::detect::matcher::SignatureMatch;
use crate::detect::signatures::{ProviderMetadata, ProviderSignature};
use crate::dns::query_type::QueryType;
use crate::dns::records::AggregatedDnsData;

/// Label shown in place of a pattern when nothing matched
pub const GENERIC_MATCH_LABEL: &str = "Analysis";

pub const UNKNOWN_PROVIDER_ID: &str = "unknown";

/// Placeholder provider reported when no signature matched
///
/// Constant: it never depends on the lookup input.
pub fn unknown_provider() -> ProviderSignature {
    ProviderSignature {
        id: UNKNOWN_PROVIDER_ID.to_string(),
        name: "Unknown / Self-Hosted".to_string(),
        patterns: Vec::new(),
        metadata: ProviderMetadata {
            display_color: "#1e293b".to_string(),
            icon_ref: None,
            description: Some(
                "No matching signature found. This could be a private server or a VPS."
                    .to_string(),
            ),
        },
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectionResult {
    Matched {
        signature: ProviderSignature,
        /// The pattern that produced the match
        pattern: String,
    },
    Unknown {
        fallback: ProviderSignature,
    },
}

impl DetectionResult {
    pub fn from_match(found: Option<SignatureMatch<'_>>) -> DetectionResult {
        match found {
            Some(found) => DetectionResult::Matched {
                signature: found.signature.clone(),
                pattern: found.pattern.to_string(),
            },
            None => DetectionResult::Unknown {
                fallback: unknown_provider(),
            },
        }
    }

    /// The provider to present, real or placeholder
    pub fn signature(&self) -> &ProviderSignature {
        match self {
            DetectionResult::Matched { signature, .. } => signature,
            DetectionResult::Unknown { fallback } => fallback,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, DetectionResult::Matched { .. })
    }

    pub fn provider_id(&self) -> &str {
        &self.signature().id
    }

    pub fn matched_pattern(&self) -> &str {
        match self {
            DetectionResult::Matched { pattern, .. } => pattern,
            DetectionResult::Unknown { .. } => GENERIC_MATCH_LABEL,
        }
    }
}

/// At-a-glance facts about a lookup for display next to the provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionDetails {
    pub ip: String,
    pub name_server: String,
    pub ttl: String,
    pub matched_pattern: String,
}

impl DetectionDetails {
    pub fn new(result: &DetectionResult, records: &AggregatedDnsData) -> DetectionDetails {
        // A answers may lead with the CNAME chain
        let address = records
            .a_records
            .iter()
            .find(|r| r.record_type == QueryType::A);

        let ip = address
            .map(|r| r.value.clone())
            .unwrap_or_else(|| "Hidden / N/A".to_string());

        let name_server = records
            .ns_records
            .first()
            .map(|r| r.value.strip_suffix('.').unwrap_or(&r.value).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        // A zero A-record TTL falls through to the CNAME TTL
        let ttl = address
            .map(|r| r.ttl)
            .filter(|ttl| *ttl > 0)
            .or_else(|| records.cname_records.first().map(|r| r.ttl))
            .unwrap_or(0);
        let ttl = if ttl > 0 {
            format!("{}s", ttl)
        } else {
            "Dynamic".to_string()
        };

        DetectionDetails {
            ip,
            name_server,
            ttl,
            matched_pattern: result.matched_pattern().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::signatures::SignatureTable;
    use crate::dns::records::DnsRecord;

    #[test]
    fn test_from_match() {
        let table = SignatureTable::builtin();
        let github = table.get("github").unwrap();
        let result = DetectionResult::from_match(Some(SignatureMatch {
            signature: github,
            pattern: "github.io",
        }));

        assert!(result.is_matched());
        assert_eq!(result.provider_id(), "github");
        assert_eq!(result.matched_pattern(), "github.io");
        assert_eq!(result.signature(), github);
    }

    #[test]
    fn test_unknown_is_constant() {
        let a = DetectionResult::from_match(None);
        let b = DetectionResult::from_match(None);
        assert_eq!(a, b);
        assert!(!a.is_matched());
        assert_eq!(a.provider_id(), "unknown");
        assert_eq!(a.signature().name, "Unknown / Self-Hosted");
        assert!(a.signature().patterns.is_empty());
        assert!(a.signature().metadata.icon_ref.is_none());
        assert_eq!(a.matched_pattern(), GENERIC_MATCH_LABEL);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(DetectionResult::from_match(None)).unwrap();
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["fallback"]["id"], "unknown");
        assert_eq!(json["fallback"]["display_color"], "#1e293b");
    }

    #[test]
    fn test_details_with_records() {
        let records = AggregatedDnsData::aggregate(
            vec![DnsRecord::new(
                "www.example.com.",
                QueryType::Cname,
                3600,
                "example.netlify.app.",
            )],
            vec![DnsRecord::new("www.example.com.", QueryType::Ns, 172800, "dns1.p01.nsone.net.")],
            vec![DnsRecord::new("example.netlify.app.", QueryType::A, 20, "75.2.60.5")],
        );
        let details = DetectionDetails::new(&DetectionResult::from_match(None), &records);

        assert_eq!(details.ip, "75.2.60.5");
        assert_eq!(details.name_server, "dns1.p01.nsone.net");
        assert_eq!(details.ttl, "20s");
        assert_eq!(details.matched_pattern, "Analysis");
    }

    #[test]
    fn test_details_fallbacks() {
        let details = DetectionDetails::new(
            &DetectionResult::from_match(None),
            &AggregatedDnsData::default(),
        );
        assert_eq!(details.ip, "Hidden / N/A");
        assert_eq!(details.name_server, "Unknown");
        assert_eq!(details.ttl, "Dynamic");
    }

    #[test]
    fn test_details_ttl_falls_back_to_cname() {
        let records = AggregatedDnsData::aggregate(
            vec![DnsRecord::new("a.example.com.", QueryType::Cname, 300, "b.example.net.")],
            vec![],
            vec![DnsRecord::new("b.example.net.", QueryType::A, 0, "192.0.2.10")],
        );
        let details = DetectionDetails::new(&DetectionResult::from_match(None), &records);
        assert_eq!(details.ttl, "300s");
    }

    #[test]
    fn test_details_skip_cname_chain_in_a_answers() {
        let records = AggregatedDnsData::aggregate(
            vec![DnsRecord::new(
                "my-app.vercel.app.",
                QueryType::Cname,
                1800,
                "cname.vercel-dns.com.",
            )],
            vec![],
            vec![
                DnsRecord::new(
                    "my-app.vercel.app.",
                    QueryType::Cname,
                    1800,
                    "cname.vercel-dns.com.",
                ),
                DnsRecord::new("cname.vercel-dns.com.", QueryType::A, 30, "76.76.21.22"),
            ],
        );
        let details = DetectionDetails::new(&DetectionResult::from_match(None), &records);

        assert_eq!(details.ip, "76.76.21.22");
        assert_eq!(details.ttl, "30s");
    }
}
