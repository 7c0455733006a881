//! First-match-wins substring scan of a record set against a signature table

use crate::detect::signatures::{ProviderSignature, SignatureTable};
use crate::dns::records::AggregatedDnsData;

/// A provider together with the pattern that identified it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignatureMatch<'t> {
    pub signature: &'t ProviderSignature,
    pub pattern: &'t str,
}

pub struct SignatureMatcher<'t> {
    table: &'t SignatureTable,
}

impl<'t> SignatureMatcher<'t> {
    pub fn new(table: &'t SignatureTable) -> SignatureMatcher<'t> {
        SignatureMatcher { table }
    }

    /// Scan providers in table order, and each provider's patterns in order,
    /// returning the first pattern contained in the record text.
    ///
    /// Pattern length or specificity play no part: an earlier provider with a
    /// short pattern beats a later provider with a longer one.
    pub fn find_match(&self, data: &AggregatedDnsData) -> Option<SignatureMatch<'t>> {
        self.match_text(&data.canonical_text())
    }

    /// Same scan over pre-flattened, lowercase text
    pub fn match_text(&self, text: &str) -> Option<SignatureMatch<'t>> {
        for signature in self.table.providers() {
            for pattern in &signature.patterns {
                if text.contains(pattern.as_str()) {
                    log::debug!("pattern {:?} matched provider {}", pattern, signature.id);
                    return Some(SignatureMatch {
                        signature,
                        pattern: pattern.as_str(),
                    });
                }
            }
        }

        None
    }
}
