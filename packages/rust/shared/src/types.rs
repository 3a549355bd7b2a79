//! Core domain types passed between pipeline stages.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// HarvestedDocument
// ---------------------------------------------------------------------------

/// Concatenated page text for one topic plus the URLs it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestedDocument {
    /// Visible body text of every fetched page, each followed by a blank line.
    pub text: String,
    /// URLs attempted, in search order (post-filter, pre-fetch).
    pub urls: Vec<String>,
    /// Subset of `urls` that were fetched and extracted.
    pub fetched: Vec<String>,
    /// `(url, reason)` for every attempted URL that was skipped.
    pub failures: Vec<(String, String)>,
    /// Number of candidate URLs pulled from the search provider.
    pub candidates_considered: usize,
}

impl HarvestedDocument {
    /// `true` if no page contributed any text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// KeywordLinkSet
// ---------------------------------------------------------------------------

/// Links discovered for a single keyword, in provider-ranked order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLinks {
    pub keyword: String,
    pub links: Vec<String>,
}

/// Ordered keyword → links mapping produced by the link finder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLinkSet {
    pub entries: Vec<KeywordLinks>,
}

impl KeywordLinkSet {
    /// Append the links found for `keyword`.
    pub fn push(&mut self, keyword: impl Into<String>, links: Vec<String>) {
        self.entries.push(KeywordLinks {
            keyword: keyword.into(),
            links,
        });
    }

    /// All links in keyword order, then discovery order within a keyword.
    pub fn combined(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|e| e.links.iter().cloned())
            .collect()
    }

    /// Links for one keyword, if it was processed.
    pub fn links_for(&self, keyword: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.keyword == keyword)
            .map(|e| e.links.as_slice())
    }

    /// Keywords in processing order.
    pub fn keywords(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.keyword.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// MetaDetails
// ---------------------------------------------------------------------------

/// SEO metadata suggestions, or the raw model output when it was not usable JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaDetails {
    Suggestions {
        meta_titles: Vec<String>,
        /// Each intended to stay within 160 characters (not enforced).
        meta_descriptions: Vec<String>,
        /// `<site_url>/<slug>` candidates.
        site_urls: Vec<String>,
    },
    Raw {
        raw_output: String,
    },
}

impl MetaDetails {
    /// Parse model output as the structured object, falling back to [`MetaDetails::Raw`].
    pub fn from_model_output(text: &str) -> Self {
        match serde_json::from_str::<MetaDetails>(text) {
            Ok(parsed @ MetaDetails::Suggestions { .. }) => parsed,
            _ => MetaDetails::Raw {
                raw_output: text.to_string(),
            },
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, MetaDetails::Suggestions { .. })
    }
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Free-form outline text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline(pub String);

impl Outline {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into blocks separated by blank lines.
    ///
    /// Best-effort: section boundaries depend entirely on how the model
    /// formatted its answer.
    pub fn sections(&self) -> Vec<&str> {
        BLANK_LINE_RE
            .split(self.0.trim())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether the outline mentions both an introduction and a conclusion.
    pub fn has_expected_structure(&self) -> bool {
        let lower = self.0.to_lowercase();
        lower.contains("introduction") && lower.contains("conclusion")
    }
}

// ---------------------------------------------------------------------------
// GeneratedArticle
// ---------------------------------------------------------------------------

/// Full article assembled from one elaborated passage per outline section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    pub title_line: String,
    pub sections: Vec<String>,
}

impl GeneratedArticle {
    pub fn new(topic: &str) -> Self {
        Self {
            title_line: format!("Article on \"{topic}\""),
            sections: Vec::new(),
        }
    }

    /// Render the persisted document: title line, then each section followed by a blank line.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n\n", self.title_line);
        for section in &self.sections {
            out.push_str(section);
            out.push_str("\n\n");
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Maximum length of a topic slug used as a directory name.
const MAX_SLUG_LEN: usize = 80;

/// Generate a filesystem-safe slug from free text.
pub fn slugify(text: &str) -> String {
    let slug = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        return "untitled".to_string();
    }

    let mut end = slug.len().min(MAX_SLUG_LEN);
    while !slug.is_char_boundary(end) {
        end -= 1;
    }
    slug[..end].trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_links_follow_keyword_order() {
        let mut set = KeywordLinkSet::default();
        set.push("electric", vec!["https://s.com/articles/a".into(), "https://s.com/articles/b".into()]);
        set.push("bicycle", vec!["https://s.com/articles/c".into()]);

        assert_eq!(
            set.combined(),
            vec![
                "https://s.com/articles/a".to_string(),
                "https://s.com/articles/b".to_string(),
                "https://s.com/articles/c".to_string(),
            ]
        );
        assert_eq!(set.keywords(), vec!["electric", "bicycle"]);
        assert_eq!(set.links_for("bicycle").map(<[String]>::len), Some(1));
        assert!(set.links_for("motor").is_none());
    }

    #[test]
    fn meta_details_parses_expected_shape() {
        let json = r#"{
            "meta_titles": ["A", "B", "C"],
            "meta_descriptions": ["d1", "d2", "d3"],
            "site_urls": ["https://s.com/a", "https://s.com/b", "https://s.com/c"]
        }"#;
        let meta = MetaDetails::from_model_output(json);
        assert!(meta.is_parsed());
        match meta {
            MetaDetails::Suggestions { meta_titles, .. } => assert_eq!(meta_titles.len(), 3),
            MetaDetails::Raw { .. } => panic!("expected suggestions"),
        }
    }

    #[test]
    fn meta_details_falls_back_to_raw() {
        let meta = MetaDetails::from_model_output("Sure! Here are some titles: ...");
        assert_eq!(
            meta,
            MetaDetails::Raw {
                raw_output: "Sure! Here are some titles: ...".into()
            }
        );

        // Valid JSON with the wrong shape is not accepted as suggestions either.
        let meta = MetaDetails::from_model_output(r#"{"titles": ["x"]}"#);
        assert!(!meta.is_parsed());
    }

    #[test]
    fn meta_details_json_roundtrip() {
        let meta = MetaDetails::Suggestions {
            meta_titles: vec!["t".into()],
            meta_descriptions: vec!["d".into()],
            site_urls: vec!["https://s.com/x".into()],
        };
        let json = serde_json::to_string_pretty(&meta).expect("serialize");
        let parsed: MetaDetails = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, meta);

        let raw = MetaDetails::Raw {
            raw_output: "not json".into(),
        };
        let json = serde_json::to_string(&raw).expect("serialize");
        assert_eq!(json, r#"{"raw_output":"not json"}"#);
        let parsed: MetaDetails = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, raw);
    }

    #[test]
    fn outline_sections_split_on_blank_lines() {
        let outline = Outline::new(
            "# Introduction\n- hook\n\n## Body\n- point one\n- point two\n   \n## Conclusion\n- wrap up\n",
        );
        let sections = outline.sections();
        assert_eq!(sections.len(), 3);
        assert!(sections[0].starts_with("# Introduction"));
        assert!(sections[2].contains("wrap up"));
        assert!(outline.has_expected_structure());
    }

    #[test]
    fn outline_empty_has_no_sections() {
        let outline = Outline::new("  \n\n ");
        assert!(outline.sections().is_empty());
        assert!(!outline.has_expected_structure());
    }

    #[test]
    fn article_render_layout() {
        let mut article = GeneratedArticle::new("electric bicycles");
        article.sections.push("Intro prose.".into());
        article.sections.push("Body prose.".into());
        assert_eq!(
            article.render(),
            "Article on \"electric bicycles\"\n\nIntro prose.\n\nBody prose.\n\n"
        );
    }

    #[test]
    fn slugify_topics() {
        assert_eq!(slugify("Electric Bicycles!"), "electric-bicycles");
        assert_eq!(slugify("what is the best e-bike?"), "what-is-the-best-e-bike");
        assert_eq!(slugify("???"), "untitled");
        assert!(slugify(&"word ".repeat(40)).len() <= MAX_SLUG_LEN);
    }
}
