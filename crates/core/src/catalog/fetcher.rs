use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    config::AppConfig,
    games_file::GamesFile,
    models::{CatalogResponse, Category},
};

use super::{category_summary, interpret_response, FetchError, Normalizer};

/// Result of a successful fetcher run.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A new snapshot replaced the games file.
    Written {
        /// Location of the written file.
        path: PathBuf,
        /// The snapshot that was written.
        file: GamesFile,
    },
    /// The catalog listed no games; nothing was written.
    Empty,
}

/// Pulls the catalog once and writes a full snapshot.
pub struct CatalogFetcher {
    config: AppConfig,
    normalizer: Normalizer,
}

impl CatalogFetcher {
    /// Fetcher using the default inference policies with the configured fallback category.
    pub fn new(config: AppConfig) -> Self {
        let normalizer = Normalizer::new(
            super::CategoryPolicy::with_fallback(config.fallback_category),
            super::TechnologyPolicy::default(),
        );
        Self { config, normalizer }
    }

    /// Destination of the snapshot.
    pub fn output_path(&self) -> PathBuf {
        self.config.output_path.clone()
    }

    /// Fetch, normalize and persist. The credential is checked before any I/O.
    pub async fn run(&self) -> Result<FetchOutcome, FetchError> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| FetchError::MissingCredential(self.config.api_key_env.clone()))?;

        info!("fetching games from the catalog");
        let response = self.request(&api_key).await?;
        self.store(response)
    }

    async fn request(&self, api_key: &str) -> Result<CatalogResponse, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(self.config.request_timeout())
            .build()?;
        let response = client
            .get(self.config.catalog_endpoint(api_key))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_response(status, &body)
    }

    /// Normalize a parsed response and write it, unless the catalog is empty.
    pub fn store(&self, response: CatalogResponse) -> Result<FetchOutcome, FetchError> {
        if response.is_empty() {
            warn!("no games found; leaving the games file untouched");
            return Ok(FetchOutcome::Empty);
        }
        info!("found {} games", response.len());

        let games = self.normalizer.normalize_all(&response.records());
        let file = GamesFile::new(games);
        let path = self.output_path();
        file.persist(&path).map_err(FetchError::Persist)?;
        info!("saved {} games to {}", file.total_games, path.display());

        log_summary(&category_summary(&file.games));
        Ok(FetchOutcome::Written { path, file })
    }
}

fn log_summary(summary: &std::collections::BTreeMap<Category, usize>) {
    info!("summary:");
    for (category, count) in summary {
        info!("  {category}: {count}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    fn fetcher(output: PathBuf) -> CatalogFetcher {
        CatalogFetcher::new(AppConfig {
            output_path: output,
            api_key_env: "FOLIO_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..AppConfig::default()
        })
    }

    #[tokio::test]
    async fn missing_credential_fails_before_writing() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data/games.json");

        let err = fetcher(path.clone()).run().await.unwrap_err();
        assert!(err.is_configuration());
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn transport_errors_do_not_reveal_the_credential() -> Result<()> {
        let dir = tempdir()?;
        let key_env = "FOLIO_TEST_TRANSPORT_KEY";
        std::env::set_var(key_env, "sup3rs3cretkey");
        let fetcher = CatalogFetcher::new(AppConfig {
            output_path: dir.path().join("games.json"),
            api_key_env: key_env.to_string(),
            catalog_url: "http://127.0.0.1:9/api/1/{api_key}/my-games".to_string(),
            request_timeout_secs: 1,
            ..AppConfig::default()
        });

        let err = fetcher.run().await.unwrap_err();
        std::env::remove_var(key_env);

        assert!(matches!(err, FetchError::Transport(_)));
        let message = err.to_string();
        assert!(!message.contains("sup3rs3cretkey"), "leaked: {message}");
        assert!(!format!("{err:?}").contains("sup3rs3cretkey"));
        Ok(())
    }

    #[test]
    fn empty_catalog_writes_nothing() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data/games.json");
        let response: CatalogResponse = serde_json::from_value(json!({"games": []}))?;

        let outcome = fetcher(path.clone()).store(response)?;
        assert!(matches!(outcome, FetchOutcome::Empty));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn stores_published_games_in_catalog_order() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data/games.json");
        let response: CatalogResponse = serde_json::from_value(json!({
            "games": [
                {"id": 1, "title": "Quiet", "views_count": 5, "published": true},
                {"id": 2, "title": "Draft", "published": false},
                {"id": 3, "title": "Loud", "views_count": 5000, "published": true}
            ]
        }))?;

        let outcome = fetcher(path.clone()).store(response)?;
        let FetchOutcome::Written { file, .. } = outcome else {
            panic!("expected a written snapshot");
        };
        assert_eq!(file.total_games, 2);

        let loaded = GamesFile::load(&path)?;
        let titles: Vec<_> = loaded.games.iter().map(|game| game.title.as_str()).collect();
        assert_eq!(titles, vec!["Quiet", "Loud"]);
        assert_eq!(loaded.games[1].category, Category::Published);
        Ok(())
    }

    #[test]
    fn only_unpublished_games_still_writes_an_empty_snapshot() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("games.json");
        let response: CatalogResponse =
            serde_json::from_value(json!({"games": [{"id": 1, "published": false}]}))?;

        fetcher(path.clone()).store(response)?;
        let loaded = GamesFile::load(&path)?;
        assert_eq!(loaded.total_games, 0);
        assert!(loaded.games.is_empty());
        Ok(())
    }
}
