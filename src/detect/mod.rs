//! Provider detection
//!
//! * `normalize` - Raw input to hostname
//! * `signatures` - Ordered provider fingerprint table
//! * `matcher` - First-match-wins substring scan
//! * `result` - Matched/unknown result and display details
//! * `pipeline` - One lookup from raw input to result

use derive_more::{Display, Error};

use crate::dns::doh::DohError;

pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod result;
pub mod signatures;

/// Why a lookup produced no result
///
/// The display strings are user-facing; details of a resolution failure are
/// kept in `source()`.
#[derive(Debug, Display, Error)]
pub enum LookupError {
    #[display(fmt = "Please enter a valid URL")]
    InvalidInput { input: String },
    #[display(fmt = "Connection failed. Please check your internet.")]
    ResolutionFailed(DohError),
}

impl From<DohError> for LookupError {
    fn from(e: DohError) -> Self {
        LookupError::ResolutionFailed(e)
    }
}

pub use matcher::{SignatureMatch, SignatureMatcher};
pub use normalize::normalize_domain;
pub use pipeline::{Completion, Failure, HostHunter, LookupOutcome, LookupPhase};
pub use result::{DetectionDetails, DetectionResult};
pub use signatures::{ProviderSignature, SignatureTable};
