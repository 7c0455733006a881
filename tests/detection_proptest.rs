//! Property-based testing for normalization and matching using proptest

use proptest::prelude::*;

use hosthunt::detect::{normalize_domain, DetectionResult, SignatureMatcher, SignatureTable};
use hosthunt::dns::query_type::QueryType;
use hosthunt::dns::records::{AggregatedDnsData, DnsRecord};

// Strategy for generating valid lowercase domain names (no `xn--` labels)
fn domain_name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-wyz][a-z0-9-]{0,20}[a-z0-9]", 2..5).prop_map(|parts| parts.join("."))
}

// Strategy for record values that never contain a built-in pattern:
// every built-in pattern has a vowel or a digit, these labels have neither
fn neutral_value_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[b-df-hj-np-tv-z]{3,10}", 2..4)
        .prop_map(|parts| format!("{}.invalid.", parts.join(".")))
}

fn records_strategy() -> impl Strategy<Value = AggregatedDnsData> {
    (
        prop::collection::vec((neutral_value_strategy(), any::<u32>()), 0..3),
        prop::collection::vec((neutral_value_strategy(), any::<u32>()), 0..3),
        prop::collection::vec(any::<u32>(), 0..3),
    )
        .prop_map(|(cname, ns, a)| {
            AggregatedDnsData::aggregate(
                cname
                    .into_iter()
                    .map(|(v, ttl)| DnsRecord::new("host.invalid.", QueryType::Cname, ttl, &v))
                    .collect(),
                ns.into_iter()
                    .map(|(v, ttl)| DnsRecord::new("host.invalid.", QueryType::Ns, ttl, &v))
                    .collect(),
                a.into_iter()
                    .map(|ttl| DnsRecord::new("host.invalid.", QueryType::A, ttl, "192.0.2.1"))
                    .collect(),
            )
        })
}

fn provider_index_strategy() -> impl Strategy<Value = usize> {
    0..SignatureTable::builtin().len()
}

proptest! {
    #[test]
    fn test_bare_domain_is_returned(domain in domain_name_strategy()) {
        prop_assert_eq!(normalize_domain(&domain).unwrap(), domain);
    }

    #[test]
    fn test_scheme_and_path_are_stripped(
        domain in domain_name_strategy(),
        scheme in prop::sample::select(vec!["http", "https", "HTTPS"]),
        path in "(/[a-z0-9]{1,8}){0,3}",
    ) {
        let input = format!("  {}://{}{} ", scheme, domain, path);
        prop_assert_eq!(normalize_domain(&input).unwrap(), domain);
    }

    #[test]
    fn test_whitespace_only_is_invalid(blank in "[ \t\n]{0,8}") {
        prop_assert!(normalize_domain(&blank).is_err());
    }

    #[test]
    fn test_neutral_records_are_unknown(data in records_strategy()) {
        let table = SignatureTable::builtin();
        let found = SignatureMatcher::new(&table).find_match(&data);
        prop_assert!(found.is_none());
        let result = DetectionResult::from_match(found);
        prop_assert_eq!(result.provider_id(), "unknown");
    }

    #[test]
    fn test_matching_is_deterministic(data in records_strategy(), i in provider_index_strategy()) {
        let table = SignatureTable::builtin();
        let mut data = data;
        let pattern = table.providers()[i].patterns[0].clone();
        data.cname_records.push(DnsRecord::new("host.invalid.", QueryType::Cname, 60, &pattern));

        let matcher = SignatureMatcher::new(&table);
        let first = DetectionResult::from_match(matcher.find_match(&data));
        let second = DetectionResult::from_match(matcher.find_match(&data.clone()));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_earlier_provider_wins(i in provider_index_strategy(), j in provider_index_strategy()) {
        let table = SignatureTable::builtin();
        let providers = table.providers();
        let late = &providers[i.max(j)];
        let early = &providers[i.min(j)];

        // The later provider's pattern comes first in the records
        let data = AggregatedDnsData::aggregate(
            vec![DnsRecord::new("host.invalid.", QueryType::Cname, 60, &late.patterns[0])],
            vec![DnsRecord::new(
                "host.invalid.",
                QueryType::Ns,
                60,
                early.patterns.last().unwrap(),
            )],
            vec![],
        );

        let found = SignatureMatcher::new(&table).find_match(&data).unwrap();
        prop_assert_eq!(&found.signature.id, &early.id);
    }
}
