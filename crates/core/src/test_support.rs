use crate::models::{Category, GameId, NormalizedGame, Platforms, Stats};

pub(crate) fn game(id: i64, title: &str, views: u64) -> NormalizedGame {
    NormalizedGame {
        id: GameId::Number(id),
        title: title.to_string(),
        description: "No description available".to_string(),
        url: format!("https://example.itch.io/{id}"),
        cover_url: None,
        category: Category::Prototype,
        technologies: vec!["Unity".to_string(), "C#".to_string()],
        platforms: Platforms::default(),
        stats: Stats {
            downloads: 0,
            views,
        },
        published: true,
        published_at: Some("2024-01-01 10:00:00".to_string()),
        created_at: None,
        min_price: 0.0,
    }
}
