//! Shared domain models.

mod raw;

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

pub use raw::{CatalogResponse, RawGameRecord};

/// Opaque catalog identifier, passed through unchanged from the raw record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameId {
    /// Numeric identifier (the common case for itch.io).
    Number(i64),
    /// Any other textual identifier.
    Text(String),
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameId::Number(id) => write!(f, "{id}"),
            GameId::Text(id) => f.write_str(id),
        }
    }
}

/// Portfolio bucket a game is sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Released titles with real traction.
    Published,
    /// Coursework and tutorial follow-alongs.
    Course,
    /// Game jam entries.
    Gamejam,
    /// Remakes of existing games.
    Clone,
    /// Prototypes, experiments and tools.
    Prototype,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 5] = [
        Category::Published,
        Category::Course,
        Category::Gamejam,
        Category::Clone,
        Category::Prototype,
    ];

    /// Lowercase wire name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Published => "published",
            Category::Course => "course",
            Category::Gamejam => "gamejam",
            Category::Clone => "clone",
            Category::Prototype => "prototype",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| format!("unknown category `{value}`"))
    }
}

/// Platform availability flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platforms {
    /// Windows build available.
    #[serde(default, deserialize_with = "or_default")]
    pub windows: bool,
    /// macOS build available.
    #[serde(default, deserialize_with = "or_default")]
    pub mac: bool,
    /// Linux build available.
    #[serde(default, deserialize_with = "or_default")]
    pub linux: bool,
    /// Android build available.
    #[serde(default, deserialize_with = "or_default")]
    pub android: bool,
}

impl Platforms {
    /// True when no native platform flag is set (the game is browser-only).
    pub fn is_empty(&self) -> bool {
        !(self.windows || self.mac || self.linux || self.android)
    }
}

/// Popularity counters reported by the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of downloads.
    #[serde(default, deserialize_with = "or_default")]
    pub downloads: u64,
    /// Number of page views.
    #[serde(default, deserialize_with = "or_default")]
    pub views: u64,
}

/// A catalog entry after filtering and inference, as persisted in the games file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedGame {
    /// Stable identifier from the catalog.
    pub id: GameId,
    /// Display title.
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    /// Short description, or a placeholder when the catalog has none.
    #[serde(default, deserialize_with = "or_default")]
    pub description: String,
    /// Canonical page of the game.
    #[serde(default, deserialize_with = "or_default")]
    pub url: String,
    /// Cover image, if the catalog provides one.
    #[serde(default, deserialize_with = "lenient")]
    pub cover_url: Option<String>,
    /// Inferred portfolio bucket.
    pub category: Category,
    /// Inferred technology tags in insertion order, without duplicates.
    #[serde(default, deserialize_with = "or_default")]
    pub technologies: Vec<String>,
    /// Native platform availability.
    #[serde(default, deserialize_with = "or_default")]
    pub platforms: Platforms,
    /// Download and view counters.
    #[serde(default, deserialize_with = "or_default")]
    pub stats: Stats,
    /// Publication flag from the catalog.
    #[serde(default, deserialize_with = "or_default")]
    pub published: bool,
    /// Opaque passthrough of the catalog's publication timestamp.
    #[serde(default, deserialize_with = "lenient")]
    pub published_at: Option<String>,
    /// Opaque passthrough of the catalog's creation timestamp.
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    /// Minimum price, zero for free games.
    #[serde(default, deserialize_with = "or_default")]
    pub min_price: f64,
}

/// Deserialize a field, mapping `null` and values of the wrong shape to `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], falling back to the type's default.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}
