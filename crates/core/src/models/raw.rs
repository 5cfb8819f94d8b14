use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use super::{lenient, GameId};

/// Body returned by the catalog endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogResponse {
    #[serde(default, deserialize_with = "game_list")]
    games: Option<Vec<Value>>,
    #[serde(default)]
    errors: Option<Value>,
}

impl CatalogResponse {
    /// API-level error payload, if the catalog reported one.
    pub fn errors(&self) -> Option<&Value> {
        self.errors.as_ref().filter(|value| !value.is_null())
    }

    /// Number of raw entries in the response, including malformed ones.
    pub fn len(&self) -> usize {
        self.games.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// True when the catalog listed no games at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode every entry that is at least a JSON object.
    pub fn records(&self) -> Vec<RawGameRecord> {
        self.games
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(index, value)| match value {
                Value::Object(_) => RawGameRecord::deserialize(value)
                    .map_err(|err| warn!("Skipping catalog entry {index}: {err}"))
                    .ok(),
                other => {
                    warn!("Skipping catalog entry {index}: expected an object, got {other}");
                    None
                }
            })
            .collect()
    }
}

/// Absent or null means no games; any other non-list shape is rejected.
fn game_list<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items)),
        other => Err(de::Error::custom(format!(
            "expected `games` to be a list, got {other}"
        ))),
    }
}

/// One untrusted catalog entry. Every field may be absent, null or malformed.
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(missing_docs)]
pub struct RawGameRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<GameId>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cover_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub p_windows: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub p_osx: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub p_linux: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub p_android: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub downloads_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub views_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub min_price: Option<f64>,
}

impl RawGameRecord {
    /// Title, or an empty string when missing.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Short description, or an empty string when missing.
    pub fn short_text(&self) -> &str {
        self.short_text.as_deref().unwrap_or_default()
    }

    /// Whether the catalog flags this entry as published.
    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(false)
    }

    /// Download count, zero when missing.
    pub fn downloads(&self) -> u64 {
        self.downloads_count.unwrap_or(0)
    }

    /// View count, zero when missing.
    pub fn views(&self) -> u64 {
        self.views_count.unwrap_or(0)
    }
}
