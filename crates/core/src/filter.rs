//! Category and technology filtering of rendered projects.

use crate::models::{Category, NormalizedGame};

/// Immutable filter selection. `None` selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Selected category.
    pub category: Option<Category>,
    /// Selected technology tag, matched exactly.
    pub technology: Option<String>,
}

impl FilterState {
    /// Filter on both axes.
    pub fn new(category: Option<Category>, technology: Option<String>) -> Self {
        Self {
            category,
            technology: technology.filter(|tech| !tech.trim().is_empty()),
        }
    }

    /// Whether `game` passes both criteria.
    pub fn matches(&self, game: &NormalizedGame) -> bool {
        let category_match = self.category.map_or(true, |category| game.category == category);
        let tech_match = self
            .technology
            .as_ref()
            .map_or(true, |tech| game.technologies.iter().any(|tag| tag == tech));
        category_match && tech_match
    }

    /// Games passing the filter, in input order.
    pub fn visible<'a, I>(&self, games: I) -> Vec<&'a NormalizedGame>
    where
        I: IntoIterator<Item = &'a NormalizedGame>,
    {
        games
            .into_iter()
            .filter(|game| self.matches(game))
            .collect()
    }

    /// Number of criteria in effect.
    pub fn active_count(&self) -> usize {
        usize::from(self.category.is_some()) + usize::from(self.technology.is_some())
    }

    /// Badge text for the active criteria, `None` when nothing is filtered.
    pub fn describe(&self) -> Option<String> {
        let count = self.active_count();
        if count == 0 {
            return None;
        }
        let labels: Vec<String> = self
            .category
            .map(|category| category.to_string())
            .into_iter()
            .chain(self.technology.clone())
            .collect();
        let noun = if count == 1 { "filter" } else { "filters" };
        Some(format!("{count} active {noun}: {}", labels.join(", ")))
    }
}

/// Every technology tag in use, sorted and deduplicated.
pub fn unique_technologies(games: &[NormalizedGame]) -> Vec<String> {
    let mut technologies: Vec<String> = games
        .iter()
        .flat_map(|game| game.technologies.iter().cloned())
        .collect();
    technologies.sort();
    technologies.dedup();
    technologies
}

/// Screen-reader announcement for the visible project count.
pub fn visible_count_announcement(count: usize) -> String {
    format!("{count} projects shown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::game;

    fn catalog() -> Vec<NormalizedGame> {
        let mut jam = game(1, "Jam", 0);
        jam.category = Category::Gamejam;
        jam.technologies.push("VR".to_string());
        let mut course = game(2, "Course", 0);
        course.category = Category::Course;
        let mut jam_2d = game(3, "Jam 2D", 0);
        jam_2d.category = Category::Gamejam;
        jam_2d.technologies.push("2D".to_string());
        vec![jam, course, jam_2d]
    }

    #[test]
    fn default_shows_everything() {
        let games = catalog();
        let filter = FilterState::default();
        assert_eq!(filter.visible(&games).len(), 3);
        assert_eq!(filter.active_count(), 0);
        assert_eq!(filter.describe(), None);
    }

    #[test]
    fn combines_category_and_technology() {
        let games = catalog();
        let filter = FilterState::new(Some(Category::Gamejam), None);
        let titles: Vec<_> = filter.visible(&games).iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Jam", "Jam 2D"]);

        let filter = FilterState::new(Some(Category::Gamejam), Some("2D".to_string()));
        let titles: Vec<_> = filter.visible(&games).iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Jam 2D"]);
        assert_eq!(filter.active_count(), 2);
        assert_eq!(filter.describe().as_deref(), Some("2 active filters: gamejam, 2D"));

    }

    #[test]
    fn technology_match_is_exact() {
        let games = catalog();
        let filter = FilterState::new(None, Some("vr".to_string()));
        assert!(filter.visible(&games).is_empty());
        assert_eq!(filter.describe().as_deref(), Some("1 active filter: vr"));
        assert_eq!(FilterState::new(None, Some("  ".to_string())).active_count(), 0);
    }

    #[test]
    fn collects_sorted_technologies() {
        assert_eq!(unique_technologies(&catalog()), vec!["2D", "C#", "Unity", "VR"]);
        assert_eq!(visible_count_announcement(2), "2 projects shown");
    }
}
