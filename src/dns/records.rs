//! DNS answer records and the aggregated per-lookup record set

use serde_derive::{Deserialize, Serialize};

use crate::dns::query_type::QueryType;

/// A single answer record as reported by the resolver
///
/// Names and values are kept verbatim, including the trailing `.` DNS
/// appends to fully qualified names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub owner_name: String,
    pub record_type: QueryType,
    pub ttl: u32,
    pub value: String,
}

impl DnsRecord {
    pub fn new(owner_name: &str, record_type: QueryType, ttl: u32, value: &str) -> DnsRecord {
        DnsRecord {
            owner_name: owner_name.to_string(),
            record_type,
            ttl,
            value: value.to_string(),
        }
    }
}

/// The CNAME, NS and A answers of one lookup
///
/// Any of the lists may be empty: the domain may have no records of that
/// type, or the resolver simply omitted the `Answer` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedDnsData {
    pub cname_records: Vec<DnsRecord>,
    pub ns_records: Vec<DnsRecord>,
    pub a_records: Vec<DnsRecord>,
}

impl AggregatedDnsData {
    /// Package the three answer lists without touching their content
    pub fn aggregate(
        cname_records: Vec<DnsRecord>,
        ns_records: Vec<DnsRecord>,
        a_records: Vec<DnsRecord>,
    ) -> AggregatedDnsData {
        AggregatedDnsData {
            cname_records,
            ns_records,
            a_records,
        }
    }

    /// Iterate all records in CNAME, NS, A order
    pub fn iter(&self) -> impl Iterator<Item = &DnsRecord> {
        self.cname_records
            .iter()
            .chain(self.ns_records.iter())
            .chain(self.a_records.iter())
    }

    pub fn len(&self) -> usize {
        self.cname_records.len() + self.ns_records.len() + self.a_records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten the record set into the lowercase text that signatures are
    /// matched against.
    ///
    /// One line per record, `"<owner> <type> <value>"`, in CNAME, NS, A order.
    /// TTLs and numeric type codes are left out so that a number can never
    /// match a pattern by coincidence.
    pub fn canonical_text(&self) -> String {
        let mut text = String::new();
        for record in self.iter() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&record.owner_name);
            text.push(' ');
            text.push_str(&record.record_type.to_string());
            text.push(' ');
            text.push_str(&record.value);
        }
        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AggregatedDnsData {
        AggregatedDnsData::aggregate(
            vec![DnsRecord::new("www.Example.com.", QueryType::Cname, 300, "Edge.Example.NET.")],
            vec![DnsRecord::new("example.com.", QueryType::Ns, 21600, "ns1.example.org.")],
            vec![
                DnsRecord::new("edge.example.net.", QueryType::A, 60, "192.0.2.1"),
                DnsRecord::new("edge.example.net.", QueryType::A, 60, "192.0.2.2"),
            ],
        )
    }

    #[test]
    fn test_aggregate_preserves_values() {
        let data = sample();
        assert_eq!(data.len(), 4);
        assert_eq!(data.cname_records[0].value, "Edge.Example.NET.");
        assert_eq!(data.ns_records[0].value, "ns1.example.org.");
    }

    #[test]
    fn test_canonical_text_order_and_case() {
        let text = sample().canonical_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "www.example.com. cname edge.example.net.",
                "example.com. ns ns1.example.org.",
                "edge.example.net. a 192.0.2.1",
                "edge.example.net. a 192.0.2.2",
            ]
        );
    }

    #[test]
    fn test_canonical_text_excludes_ttl() {
        let text = sample().canonical_text();
        assert!(!text.contains("21600"));
        assert!(!text.contains("300"));
    }

    #[test]
    fn test_empty_aggregate() {
        let data = AggregatedDnsData::default();
        assert!(data.is_empty());
        assert_eq!(data.canonical_text(), "");
    }
}
