//! HTML rendering of the projects grid.

use crate::{
    filter::{visible_count_announcement, FilterState},
    games_file::GamesFile,
    loader::{LoadOutcome, LoadPhase},
    models::NormalizedGame,
};

/// Class of the placeholder shown when loading failed.
pub const ERROR_CLASS: &str = "projects-error";
/// Class of the placeholder shown when there are no games yet.
pub const EMPTY_CLASS: &str = "projects-empty";
/// Class of the placeholder shown when a filter hides every game.
pub const NO_MATCH_CLASS: &str = "projects-no-match";
/// Class of the active-filter badge.
pub const BADGE_CLASS: &str = "filter-badge";

const STATS_SEPARATOR: &str = " • ";

/// Markup for the projects grid plus what was rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Fragment to place inside the grid container.
    pub html: String,
    /// `Rendered` or `ErrorRendered`.
    pub phase: LoadPhase,
    /// Number of cards in the fragment.
    pub cards: usize,
}

/// Render a load outcome. Failures become the reload placeholder, never zero cards.
pub fn render_outcome(outcome: &LoadOutcome, filter: &FilterState) -> RenderedPage {
    match outcome {
        LoadOutcome::Loaded(file) => render_games_file(file, filter),
        LoadOutcome::Failed(_) => RenderedPage {
            html: error_placeholder(),
            phase: LoadPhase::ErrorRendered,
            cards: 0,
        },
    }
}

/// Sort, filter and render a loaded games file.
pub fn render_games_file(file: &GamesFile, filter: &FilterState) -> RenderedPage {
    if file.games.is_empty() {
        return RenderedPage {
            html: placeholder(
                EMPTY_CLASS,
                "No games have been loaded yet. Please check back later.",
            ),
            phase: LoadPhase::Rendered,
            cards: 0,
        };
    }

    let visible = filter.visible(sort_by_popularity(&file.games));

    let mut html = String::new();
    if let Some(badge) = filter.describe() {
        html.push_str(&format!(
            "<div class=\"{BADGE_CLASS}\"><span class=\"filter-badge-icon\">🔍</span>\
             <span class=\"filter-badge-text\">{}</span></div>\n",
            escape(&badge)
        ));
    }
    if visible.is_empty() {
        html.push_str(&placeholder(
            NO_MATCH_CLASS,
            "No projects match the selected filters.",
        ));
    }
    for game in &visible {
        html.push_str(&render_card(game));
    }
    html.push_str(&format!(
        "<p class=\"sr-only\" aria-live=\"polite\">{}</p>\n",
        visible_count_announcement(visible.len())
    ));
    if let Some(label) = file.last_updated_label() {
        html.push_str(&format!(
            "<p class=\"projects-updated\">Last updated: {}</p>\n",
            escape(&label)
        ));
    }

    RenderedPage {
        html,
        phase: LoadPhase::Rendered,
        cards: visible.len(),
    }
}

/// Games by view count, highest first. Ties keep their file order.
pub fn sort_by_popularity(games: &[NormalizedGame]) -> Vec<&NormalizedGame> {
    let mut sorted: Vec<&NormalizedGame> = games.iter().collect();
    sorted.sort_by(|a, b| b.stats.views.cmp(&a.stats.views));
    sorted
}

/// Platform icons for the native builds, or `Web` when there are none.
pub fn platform_label(game: &NormalizedGame) -> String {
    let platforms = &game.platforms;
    let icons: Vec<&str> = [
        (platforms.windows, "🪟"),
        (platforms.mac, "🍎"),
        (platforms.linux, "🐧"),
        (platforms.android, "📱"),
    ]
    .into_iter()
    .filter_map(|(available, icon)| available.then_some(icon))
    .collect();

    if icons.is_empty() {
        "Web".to_string()
    } else {
        icons.join(" ")
    }
}

/// Downloads and views, each only when non-zero. `None` when both are zero.
pub fn stats_line(game: &NormalizedGame) -> Option<String> {
    let stats = game.stats;
    let segments: Vec<String> = [
        (stats.downloads, "📥", "downloads"),
        (stats.views, "👁️", "views"),
    ]
    .into_iter()
    .filter(|(count, _, _)| *count > 0)
    .map(|(count, icon, noun)| format!("{icon} {count} {noun}"))
    .collect();

    (!segments.is_empty()).then(|| segments.join(STATS_SEPARATOR))
}

/// One project card.
pub fn render_card(game: &NormalizedGame) -> String {
    let title = escape(&game.title);
    let image = match game.cover_url.as_deref() {
        Some(cover) => format!(
            "<img src=\"{}\" alt=\"{title}\" loading=\"lazy\">",
            escape(cover)
        ),
        None => "<div class=\"project-placeholder\">🎮</div>".to_string(),
    };
    let tags: String = game
        .technologies
        .iter()
        .map(|tech| format!("<span class=\"tech-tag\">{}</span>", escape(tech)))
        .collect();

    let mut lines = vec![
        format!(
            "<div class=\"project-card\" data-category=\"{}\">",
            game.category
        ),
        "  <div class=\"project-image\">".to_string(),
        format!("    {image}"),
        "  </div>".to_string(),
        "  <div class=\"project-content\">".to_string(),
        format!("    <h3>{title}</h3>"),
        format!(
            "    <div class=\"project-platform\"><a href=\"{}\" target=\"_blank\" \
             rel=\"noopener noreferrer\">{} View on itch.io</a></div>",
            escape(&game.url),
            platform_label(game)
        ),
        format!("    <p>{}</p>", escape(&game.description)),
        format!("    <div class=\"project-tech\">{tags}</div>"),
    ];
    if let Some(stats) = stats_line(game) {
        lines.push(format!("    <div class=\"project-stats\">{stats}</div>"));
    }
    lines.push("  </div>".to_string());
    lines.push("</div>\n".to_string());
    lines.join("\n")
}

fn placeholder(class: &str, message: &str) -> String {
    format!("<div class=\"projects-placeholder {class}\"><p>{message}</p></div>\n")
}

fn error_placeholder() -> String {
    format!(
        "<div class=\"projects-placeholder {ERROR_CLASS}\"><p>Games could not be loaded.</p>\
         <button type=\"button\" onclick=\"location.reload()\">Reload</button></div>\n"
    )
}

/// Escape text for HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        loader::LoadError,
        models::{Category, Stats},
        test_support::game,
    };

    #[test]
    fn sorts_by_views_descending_and_stably() {
        let games = vec![game(1, "A", 50), game(2, "B", 200), game(3, "C", 50)];
        let ids: Vec<_> = sort_by_popularity(&games)
            .iter()
            .map(|game| game.id.to_string())
            .collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn stats_line_omits_zero_segments() {
        let mut subject = game(1, "A", 0);
        assert_eq!(stats_line(&subject), None);
        assert!(!render_card(&subject).contains("project-stats"));

        subject.stats = Stats {
            downloads: 5,
            views: 0,
        };
        let line = stats_line(&subject).unwrap();
        assert_eq!(line, "📥 5 downloads");
        assert!(!line.contains(STATS_SEPARATOR));

        subject.stats.views = 12;
        assert_eq!(stats_line(&subject).unwrap(), "📥 5 downloads • 👁️ 12 views");
    }

    #[test]
    fn platform_label_falls_back_to_web() {
        let mut subject = game(1, "A", 0);
        assert_eq!(platform_label(&subject), "Web");
        subject.platforms.windows = true;
        subject.platforms.linux = true;
        assert_eq!(platform_label(&subject), "🪟 🐧");
    }

    #[test]
    fn card_uses_cover_or_placeholder_and_escapes_text() {
        let mut subject = game(1, "Rock & <Roll>", 0);
        subject.category = Category::Clone;
        let card = render_card(&subject);
        assert!(card.contains("Rock &amp; &lt;Roll&gt;"));
        assert!(card.contains("project-placeholder"));
        assert!(card.contains("data-category=\"clone\""));
        assert!(card.contains("href=\"https://example.itch.io/1\""));
        assert!(card.contains("<span class=\"tech-tag\">C#</span>"));

        subject.cover_url = Some("https://img.example/cover.png".to_string());
        let card = render_card(&subject);
        assert!(card.contains("<img src=\"https://img.example/cover.png\""));
        assert!(!card.contains("project-placeholder"));
    }

    #[test]
    fn empty_file_renders_the_empty_state() {
        let page = render_outcome(
            &LoadOutcome::Loaded(GamesFile::new(Vec::new())),
            &FilterState::default(),
        );
        assert_eq!(page.phase, LoadPhase::Rendered);
        assert_eq!(page.cards, 0);
        assert!(page.html.contains(EMPTY_CLASS));
        assert!(!page.html.contains(ERROR_CLASS));
    }

    #[test]
    fn failure_renders_the_error_state() {
        let page = render_outcome(
            &LoadOutcome::Failed(LoadError::Status(500)),
            &FilterState::default(),
        );
        assert_eq!(page.phase, LoadPhase::ErrorRendered);
        assert!(page.html.contains(ERROR_CLASS));
        assert!(page.html.contains("location.reload()"));
        assert!(!page.html.contains(EMPTY_CLASS));
    }

    #[test]
    fn filters_after_sorting() {
        let mut jam = game(1, "Jam Low", 5);
        jam.category = Category::Gamejam;
        let mut jam_high = game(2, "Jam High", 500);
        jam_high.category = Category::Gamejam;
        let file = GamesFile::new(vec![jam, game(3, "Other", 1000), jam_high]);

        let filter = FilterState::new(Some(Category::Gamejam), None);
        let page = render_games_file(&file, &filter);
        assert_eq!(page.cards, 2);
        assert!(!page.html.contains("Other"));
        assert!(page.html.find("Jam High").unwrap() < page.html.find("Jam Low").unwrap());
        assert!(page.html.contains("2 projects shown"));

        assert!(page.html.contains(BADGE_CLASS));
        assert!(page.html.contains("1 active filter: gamejam"));

        let page = render_games_file(&file, &FilterState::default());
        assert!(!page.html.contains(BADGE_CLASS));
        assert_eq!(page.cards, 3);

        let filter = FilterState::new(Some(Category::Course), None);
        let page = render_games_file(&file, &filter);
        assert_eq!(page.cards, 0);
        assert!(page.html.contains(NO_MATCH_CLASS));
        assert!(!page.html.contains(EMPTY_CLASS));
    }
}
