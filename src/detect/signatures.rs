//! Provider fingerprints
//!
//! A `SignatureTable` is an ordered list of providers, each with the
//! substrings expected somewhere in its DNS footprint. Order is part of the
//! contract: when several providers could match, the earlier one wins, so a
//! table must never be reordered or deduplicated into a set.
//!
//! Tables are built once per process (`builtin()` or `load()`) and shared by
//! reference with the matcher.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use derive_more::{Display, Error};
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Display, Error)]
pub enum TableError {
    #[display(fmt = "Failed to read signature table: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "Failed to parse signature table: {}", _0)]
    Parse(toml::de::Error),
    #[display(fmt = "Duplicate provider id: {}", id)]
    DuplicateId { id: String },
    #[display(fmt = "Provider {} has no patterns", id)]
    EmptyPatterns { id: String },
    #[display(fmt = "Signature table has no providers")]
    Empty,
}

type Result<T> = std::result::Result<T, TableError>;

/// Presentation hints carried alongside a provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// CSS-style hex color, e.g. `#f97316`
    pub display_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSignature {
    pub id: String,
    pub name: String,
    /// Lowercase substrings, tried in order
    pub patterns: Vec<String>,
    #[serde(flatten)]
    pub metadata: ProviderMetadata,
}

impl ProviderSignature {
    fn new(id: &str, name: &str, color: &str, icon: &str, patterns: &[&str]) -> ProviderSignature {
        ProviderSignature {
            id: id.to_string(),
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            metadata: ProviderMetadata {
                display_color: color.to_string(),
                icon_ref: Some(icon.to_string()),
                description: None,
            },
        }
    }
}

/// On-disk layout: a TOML array of `[[provider]]` tables
#[derive(Deserialize)]
struct TableFile {
    #[serde(default)]
    provider: Vec<ProviderSignature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureTable {
    providers: Vec<ProviderSignature>,
}

impl SignatureTable {
    /// Validate and wrap an ordered provider list
    ///
    /// Patterns are lowercased since they are matched against lowercased
    /// record text.
    pub fn new(mut providers: Vec<ProviderSignature>) -> Result<SignatureTable> {
        if providers.is_empty() {
            return Err(TableError::Empty);
        }

        let mut seen = HashSet::new();
        for provider in providers.iter_mut() {
            if !seen.insert(provider.id.clone()) {
                return Err(TableError::DuplicateId {
                    id: provider.id.clone(),
                });
            }

            provider.patterns.retain(|p| !p.trim().is_empty());
            if provider.patterns.is_empty() {
                return Err(TableError::EmptyPatterns {
                    id: provider.id.clone(),
                });
            }
            for pattern in provider.patterns.iter_mut() {
                *pattern = pattern.trim().to_lowercase();
            }
        }

        Ok(SignatureTable { providers })
    }

    pub fn from_toml_str(data: &str) -> Result<SignatureTable> {
        let file: TableFile = toml::from_str(data).map_err(TableError::Parse)?;
        Self::new(file.provider)
    }

    pub fn load(path: &Path) -> Result<SignatureTable> {
        let data = fs::read_to_string(path).map_err(TableError::Io)?;
        let table = Self::from_toml_str(&data)?;
        log::info!(
            "Loaded {} provider signatures from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Providers in match priority order
    pub fn providers(&self) -> &[ProviderSignature] {
        &self.providers
    }

    pub fn get(&self, id: &str) -> Option<&ProviderSignature> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The bundled table of well-known hosts and CDNs
    pub fn builtin() -> SignatureTable {
        let providers = vec![
            ProviderSignature::new(
                "vercel",
                "Vercel",
                "#000000",
                "▲",
                &["vercel.app", "vercel-dns.com", "76.76.21.21"],
            ),
            ProviderSignature::new(
                "netlify",
                "Netlify",
                "#0d9488",
                "💠",
                &["netlify.app", "netlify.com", "netlify.global"],
            ),
            ProviderSignature::new(
                "cloudflare",
                "Cloudflare Pages / CDN",
                "#f97316",
                "☁️",
                &["cloudflare.com", "cloudflare.net", "pages.dev"],
            ),
            ProviderSignature::new(
                "github",
                "GitHub Pages",
                "#374151",
                "🐙",
                &["github.io", "githubusercontent.com", "185.199.108.153"],
            ),
            ProviderSignature::new(
                "heroku",
                "Heroku",
                "#9333ea",
                "🏩",
                &["herokuapp.com", "herokudns.com"],
            ),
            ProviderSignature::new(
                "aws",
                "AWS (S3/CloudFront)",
                "#ca8a04",
                "📦",
                &["amazonaws.com", "cloudfront.net", "awsdns"],
            ),
            ProviderSignature::new(
                "google",
                "Google Cloud / Firebase",
                "#2563eb",
                "🔥",
                &[
                    "firebaseapp.com",
                    "googlehosted.com",
                    "googledomains.com",
                    "199.36.158.100",
                ],
            ),
            ProviderSignature::new(
                "shopify",
                "Shopify",
                "#16a34a",
                "🛍️",
                &["myshopify.com", "shops.myshopify.com"],
            ),
            ProviderSignature::new(
                "wordpress",
                "WordPress.com",
                "#1e40af",
                "📝",
                &["wordpress.com", "wp.com"],
            ),
            ProviderSignature::new(
                "squarespace",
                "Squarespace",
                "#292524",
                "⬛",
                &["squarespace.com", "squarespacedns.com"],
            ),
            ProviderSignature::new(
                "wix",
                "Wix",
                "#facc15",
                "⭐",
                &["wixdns.net", "wix.com"],
            ),
        ];

        SignatureTable { providers }
    }
}
