//! Category and technology inference for catalog entries.
//!
//! Both are heuristics over the lowercased title and short description. The
//! category rules are evaluated in order and the first match wins, so the
//! order of [`CategoryPolicy::rules`] is part of the policy.

use crate::models::{Category, RawGameRecord};

/// Borrowed view of [`InferenceText`] handed to matchers.
#[derive(Debug, Clone, Copy)]
struct InferenceInput<'a> {
    title: &'a str,
    description: &'a str,
    downloads: u64,
    views: u64,
}

/// Owned, lowercased view of a record used during inference.
#[derive(Debug, Clone)]
pub struct InferenceText {
    title: String,
    description: String,
    downloads: u64,
    views: u64,
}

impl InferenceText {
    /// Prepare a record for inference.
    pub fn from_record(record: &RawGameRecord) -> Self {
        Self::new(
            record.title(),
            record.short_text(),
            record.downloads(),
            record.views(),
        )
    }

    /// Prepare arbitrary title/description text for inference.
    pub fn new(title: &str, description: &str, downloads: u64, views: u64) -> Self {
        Self {
            title: title.to_lowercase(),
            description: description.to_lowercase(),
            downloads,
            views,
        }
    }

    fn input(&self) -> InferenceInput<'_> {
        InferenceInput {
            title: &self.title,
            description: &self.description,
            downloads: self.downloads,
            views: self.views,
        }
    }

    fn combined(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// Condition a category rule checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Any needle found in the title, or any needle found in the description.
    Text {
        /// Needles searched in the title.
        title: Vec<String>,
        /// Needles searched in the description.
        description: Vec<String>,
    },
    /// Downloads strictly above `downloads`, or views strictly above `views`.
    Popularity {
        /// Download threshold (exclusive).
        downloads: u64,
        /// View threshold (exclusive).
        views: u64,
    },
}

impl Matcher {
    /// Text matcher with distinct needle lists per field.
    pub fn text(title: &[&str], description: &[&str]) -> Self {
        Matcher::Text {
            title: title.iter().map(|needle| needle.to_lowercase()).collect(),
            description: description
                .iter()
                .map(|needle| needle.to_lowercase())
                .collect(),
        }
    }

    /// Text matcher searching the same needles in both fields.
    pub fn either(needles: &[&str]) -> Self {
        Self::text(needles, needles)
    }

    fn matches(&self, input: InferenceInput<'_>) -> bool {
        match self {
            Matcher::Text { title, description } => {
                title.iter().any(|needle| input.title.contains(needle.as_str()))
                    || description
                        .iter()
                        .any(|needle| input.description.contains(needle.as_str()))
            }
            Matcher::Popularity { downloads, views } => {
                input.downloads > *downloads || input.views > *views
            }
        }
    }
}

/// One entry in the ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    /// Category assigned when the matcher fires.
    pub category: Category,
    /// Condition for this rule.
    pub matcher: Matcher,
}

/// Ordered, first-match-wins category classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPolicy {
    /// Rules in precedence order.
    pub rules: Vec<CategoryRule>,
    /// Category for entries no rule matches.
    pub fallback: Category,
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule {
                    category: Category::Gamejam,
                    matcher: Matcher::text(&["jam"], &["game jam"]),
                },
                CategoryRule {
                    category: Category::Course,
                    matcher: Matcher::either(&["course"]),
                },
                CategoryRule {
                    category: Category::Clone,
                    matcher: Matcher::either(&["clone"]),
                },
                CategoryRule {
                    category: Category::Prototype,
                    matcher: Matcher::either(&["prototype", "tool"]),
                },
                CategoryRule {
                    category: Category::Published,
                    matcher: Matcher::Popularity {
                        downloads: 10,
                        views: 100,
                    },
                },
            ],
            fallback: Category::Prototype,
        }
    }
}

impl CategoryPolicy {
    /// Default rules with a different fallback bucket.
    pub fn with_fallback(fallback: Category) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    /// Classify prepared text. Total and deterministic.
    pub fn categorize(&self, text: &InferenceText) -> Category {
        let input = text.input();
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(input))
            .map(|rule| rule.category)
            .unwrap_or(self.fallback)
    }
}

/// Keyword dictionary mapping substrings to technology tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnologyPolicy {
    /// Tags every game carries.
    pub base: Vec<String>,
    /// `(keyword, tag)` pairs, scanned in order.
    pub keywords: Vec<(String, String)>,
}

impl Default for TechnologyPolicy {
    fn default() -> Self {
        let keywords = [
            ("2d", "2D"),
            ("3d", "3D"),
            ("multiplayer", "Multiplayer"),
            ("ai", "AI"),
            ("procedural", "Procedural Generation"),
            ("physics", "Physics"),
            ("vr", "VR"),
            ("mobile", "Mobile"),
            ("web", "WebGL"),
            ("shader", "Shaders"),
            ("networked", "Networking"),
            ("pixel", "Pixel Art"),
        ];

        Self {
            base: vec!["Unity".to_string(), "C#".to_string()],
            keywords: keywords
                .into_iter()
                .map(|(keyword, tag)| (keyword.to_string(), tag.to_string()))
                .collect(),
        }
    }
}

impl TechnologyPolicy {
    /// Base tags followed by every matching keyword's tag, deduplicated in insertion order.
    pub fn extract(&self, text: &InferenceText) -> Vec<String> {
        let haystack = text.combined();
        let mut tags: Vec<String> = Vec::with_capacity(self.base.len() + 4);
        let matched = self
            .keywords
            .iter()
            .filter(|(keyword, _)| haystack.contains(keyword.as_str()))
            .map(|(_, tag)| tag);

        for tag in self.base.iter().chain(matched) {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorize(title: &str, description: &str, downloads: u64, views: u64) -> Category {
        CategoryPolicy::default().categorize(&InferenceText::new(
            title,
            description,
            downloads,
            views,
        ))
    }

    #[test]
    fn jam_takes_precedence_over_course() {
        assert_eq!(
            categorize("Spring Jam Entry", "made during a course", 0, 0),
            Category::Gamejam
        );
        assert_eq!(
            categorize("Tiny Dungeon", "Built for a GAME JAM", 0, 0),
            Category::Gamejam
        );
    }

    #[test]
    fn jam_in_description_alone_is_not_enough() {
        // Only "game jam" counts in the description.
        assert_eq!(categorize("Toast", "traffic jam simulator", 0, 0), Category::Prototype);
    }

    #[test]
    fn rules_apply_in_order() {
        assert_eq!(categorize("Course Clone", "", 500, 5000), Category::Course);
        assert_eq!(categorize("Pong Clone", "a prototype", 0, 0), Category::Clone);
        assert_eq!(categorize("Level Tool", "", 999, 999), Category::Prototype);
    }

    #[test]
    fn popularity_thresholds_are_exclusive() {
        assert_eq!(categorize("Orbit", "", 11, 0), Category::Published);
        assert_eq!(categorize("Orbit", "", 0, 101), Category::Published);
        assert_eq!(categorize("Orbit", "", 10, 100), Category::Prototype);
    }

    #[test]
    fn fallback_is_configurable() {
        let policy = CategoryPolicy::with_fallback(Category::Published);
        let text = InferenceText::new("Orbit", "", 0, 0);
        assert_eq!(policy.categorize(&text), Category::Published);
    }

    #[test]
    fn technologies_always_include_base_tags() {
        let policy = TechnologyPolicy::default();
        let tags = policy.extract(&InferenceText::new("Quiet", "", 0, 0));
        assert_eq!(tags, vec!["Unity", "C#"]);

        let tags = policy.extract(&InferenceText::new("Beat Saber-ish", "A vR rhythm game", 0, 0));
        assert!(tags.contains(&"VR".to_string()));
        assert_eq!(&tags[..2], &["Unity", "C#"]);
    }

    #[test]
    fn technology_tags_are_deduplicated_in_dictionary_order() {
        let policy = TechnologyPolicy {
            base: vec!["Unity".to_string()],
            keywords: vec![
                ("pixel".to_string(), "Pixel Art".to_string()),
                ("sprite".to_string(), "Pixel Art".to_string()),
                ("unity".to_string(), "Unity".to_string()),
            ],
        };
        let tags = policy.extract(&InferenceText::new("Pixel Unity", "sprite heavy", 0, 0));
        assert_eq!(tags, vec!["Unity", "Pixel Art"]);

        let tags = TechnologyPolicy::default()
            .extract(&InferenceText::new("Pixel Physics 2D", "", 0, 0));
        assert_eq!(tags, vec!["Unity", "C#", "2D", "Physics", "Pixel Art"]);
    }
}
