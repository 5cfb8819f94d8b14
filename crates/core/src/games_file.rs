//! Snapshot file shared between the fetcher and the loader.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{lenient, NormalizedGame};

/// Default location of the snapshot, relative to the site root.
pub const DEFAULT_GAMES_PATH: &str = "data/games.json";

/// Full snapshot of the catalog written by one fetcher run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesFile {
    /// When the snapshot was produced.
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Number of games at write time.
    #[serde(default)]
    pub total_games: usize,
    /// Games in catalog order. Sorting is left to the reader.
    #[serde(default, deserialize_with = "decodable_games")]
    pub games: Vec<NormalizedGame>,
}

impl GamesFile {
    /// Build a snapshot stamped with the current time.
    pub fn new(games: Vec<NormalizedGame>) -> Self {
        Self::at(Utc::now(), games)
    }

    /// Build a snapshot with an explicit timestamp.
    pub fn at(last_updated: DateTime<Utc>, games: Vec<NormalizedGame>) -> Self {
        Self {
            last_updated: Some(last_updated),
            total_games: games.len(),
            games,
        }
    }

    /// Load a snapshot from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read games file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse games file {}", path.display()))
    }

    /// Write the snapshot as pretty JSON, replacing any previous file and
    /// creating parent directories if needed.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create games directory {}", parent.display())
            })?;
        }

        let serialized =
            serde_json::to_string_pretty(self).context("failed to serialize games file")?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write games file {}", path.display()))
    }

    /// Local, human-readable form of [`GamesFile::last_updated`].
    pub fn last_updated_label(&self) -> Option<String> {
        self.last_updated.map(|timestamp| {
            timestamp
                .with_timezone(&Local)
                .format("%-d %B %Y, %H:%M")
                .to_string()
        })
    }
}

/// Decode every entry that can be decoded, skipping the rest with a warning.
fn decodable_games<'de, D>(deserializer: D) -> Result<Vec<NormalizedGame>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!("ignoring games list of unexpected shape: {other}");
            return Ok(Vec::new());
        }
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            serde_json::from_value(entry)
                .map_err(|err| warn!("Skipping game {index}: {err}"))
                .ok()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::game;
    use tempfile::tempdir;

    #[test]
    fn persist_round_trip_keeps_order() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/data/games.json");
        let file = GamesFile::new(vec![game(3, "Low", 1), game(1, "High", 900), game(2, "Mid", 50)]);

        file.persist(&path)?;
        let loaded = GamesFile::load(&path)?;

        assert_eq!(loaded.total_games, loaded.games.len());
        let ids: Vec<_> = loaded.games.iter().map(|game| game.id.to_string()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(loaded, file);
        Ok(())
    }

    #[test]
    fn persist_overwrites_previous_snapshot() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("games.json");

        GamesFile::new(vec![game(1, "Old", 0), game(2, "Older", 0)]).persist(&path)?;
        GamesFile::new(vec![game(9, "New", 0)]).persist(&path)?;

        let loaded = GamesFile::load(&path)?;
        assert_eq!(loaded.total_games, 1);
        assert_eq!(loaded.games[0].title, "New");
        Ok(())
    }

    #[test]
    fn writes_camel_case_fields() -> Result<()> {
        let file = GamesFile::new(vec![game(1, "Shape", 0)]);
        let value = serde_json::to_value(&file)?;
        assert!(value.get("lastUpdated").is_some());
        assert_eq!(value["totalGames"], 1);
        assert!(value["games"][0].get("coverUrl").is_some());
        assert_eq!(value["games"][0]["category"], "prototype");
        Ok(())
    }

    #[test]
    fn skips_entries_that_cannot_be_decoded() -> Result<()> {
        let file: GamesFile = serde_json::from_value(serde_json::json!({
            "totalGames": 4,
            "games": [
                {"id": 1, "title": "Kept", "category": "course"},
                {"id": 2, "title": "Unknown bucket", "category": "arcade"},
                {"title": "No id", "category": "clone"},
                "junk"
            ]
        }))?;

        assert_eq!(file.games.len(), 1);
        assert_eq!(file.games[0].title, "Kept");
        Ok(())
    }

    #[test]
    fn tolerates_missing_metadata() -> Result<()> {
        let file: GamesFile = serde_json::from_str(r#"{"lastUpdated": "not a date"}"#)?;
        assert!(file.last_updated.is_none());
        assert!(file.games.is_empty());
        assert!(file.last_updated_label().is_none());
        Ok(())
    }
}
