//! Build-time ingestion of the game catalog.

/// HTTP fetcher that produces a fresh games file.
pub mod fetcher;
/// Category and technology heuristics.
pub mod infer;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::{
    CatalogResponse, Category, GameId, NormalizedGame, Platforms, RawGameRecord, Stats,
};

pub use fetcher::{CatalogFetcher, FetchOutcome};
pub use infer::{CategoryPolicy, CategoryRule, InferenceText, Matcher, TechnologyPolicy};

/// Placeholder used when a catalog entry has no short description.
pub const MISSING_DESCRIPTION: &str = "No description available";

/// Fatal conditions of a fetcher run. None of them leave a file behind.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The credential variable is unset or empty.
    #[error("{0} environment variable is not set")]
    MissingCredential(String),
    /// The request never produced a response. The URL is stripped since it
    /// carries the credential.
    #[error("catalog request failed: {0}")]
    Transport(reqwest::Error),
    /// The catalog answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The body was not valid JSON.
    #[error("failed to parse catalog response: {0}")]
    Parse(#[from] serde_json::Error),
    /// The catalog reported an error payload.
    #[error("catalog API error: {0}")]
    Api(String),
    /// Writing the snapshot failed.
    #[error("failed to write games file: {0:#}")]
    Persist(anyhow::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.without_url())
    }
}

impl FetchError {
    /// True for pre-flight configuration failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, FetchError::MissingCredential(_))
    }
}

/// Turn a raw HTTP exchange into a catalog response or a fetch error.
pub fn interpret_response(status: u16, body: &str) -> Result<CatalogResponse, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Http {
            status,
            body: body.to_string(),
        });
    }

    let response: CatalogResponse = serde_json::from_str(body)?;
    if let Some(errors) = response.errors() {
        return Err(FetchError::Api(describe_api_errors(errors)));
    }
    Ok(response)
}

fn describe_api_errors(errors: &Value) -> String {
    match errors {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Maps raw catalog records to the persisted shape.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    categories: CategoryPolicy,
    technologies: TechnologyPolicy,
}

impl Normalizer {
    /// Normalizer with custom policies.
    pub fn new(categories: CategoryPolicy, technologies: TechnologyPolicy) -> Self {
        Self {
            categories,
            technologies,
        }
    }

    /// Keep published records only and normalize them, preserving catalog order.
    pub fn normalize_all(&self, records: &[RawGameRecord]) -> Vec<NormalizedGame> {
        records
            .iter()
            .filter(|record| record.is_published())
            .map(|record| self.normalize(record))
            .collect()
    }

    /// Normalize a single record regardless of its publication flag.
    pub fn normalize(&self, record: &RawGameRecord) -> NormalizedGame {
        let text = InferenceText::from_record(record);
        let description = record
            .short_text
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(MISSING_DESCRIPTION)
            .to_string();

        NormalizedGame {
            id: record
                .id
                .clone()
                .unwrap_or_else(|| GameId::Text(String::new())),
            title: record.title().to_string(),
            description,
            url: record.url.clone().unwrap_or_default(),
            cover_url: record.cover_url.clone().filter(|url| !url.is_empty()),
            category: self.categories.categorize(&text),
            technologies: self.technologies.extract(&text),
            platforms: Platforms {
                windows: record.p_windows.unwrap_or(false),
                mac: record.p_osx.unwrap_or(false),
                linux: record.p_linux.unwrap_or(false),
                android: record.p_android.unwrap_or(false),
            },
            stats: Stats {
                downloads: record.downloads(),
                views: record.views(),
            },
            published: record.is_published(),
            published_at: record.published_at.clone(),
            created_at: record.created_at.clone(),
            min_price: record.min_price.filter(|price| *price > 0.0).unwrap_or(0.0),
        }
    }
}

/// Count games per category, in category order.
pub fn category_summary(games: &[NormalizedGame]) -> BTreeMap<Category, usize> {
    games.iter().fold(BTreeMap::new(), |mut counts, game| {
        *counts.entry(game.category).or_insert(0) += 1;
        counts
    })
}
