//! Internal Link Finder.
//!
//! Derives keywords from the topic, searches `"<keyword> <site>"` for each,
//! and keeps result URLs that live under the site's article path.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use seoscribe_artifacts::{ArtifactKind, ArtifactStore};
use seoscribe_search::{SearchProvider, search};
use seoscribe_shared::{KeywordLinkSet, LinkConfig, Result};

/// Common function words never used as keywords.
pub const STOPWORDS: &[&str] = &[
    "what", "is", "a", "an", "the", "and", "it", "to", "of", "for", "with", "in", "on", "at", "by",
    "this", "that", "from", "as", "are", "was", "were", "but",
];

/// Title filler that says nothing about the subject.
///
/// Matched after punctuation removal, so `beginner's` appears as `beginners`.
pub const FILLER_WORDS: &[&str] = &[
    "what",
    "how",
    "compares",
    "best",
    "comprehensive",
    "guide",
    "understanding",
    "beginners",
    "benefits",
    "better",
    "detailed",
    "demo",
    "with",
];

static PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Keywords for link search, in topic order without duplicates.
pub fn extract_keywords(topic: &str) -> Vec<String> {
    let cleaned = PUNCT_RE.replace_all(topic, "").to_lowercase();

    let mut keywords: Vec<String> = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() <= 3
            || word.chars().all(char::is_numeric)
            || STOPWORDS.contains(&word)
            || FILLER_WORDS.contains(&word)
        {
            continue;
        }
        if !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }
    keywords
}

/// Find internal links for every topic keyword and persist the combined list.
///
/// Writes `internal_links.txt` with one URL per line, keyword order first,
/// then discovery order. The returned set and the file always agree.
#[instrument(skip_all, fields(topic = %topic, site = %site))]
pub async fn find_links<P: SearchProvider>(
    provider: &P,
    store: &ArtifactStore,
    topic: &str,
    site: &str,
    config: &LinkConfig,
) -> Result<KeywordLinkSet> {
    let keywords = extract_keywords(topic);
    info!(?keywords, "keywords extracted");

    let mut set = KeywordLinkSet::default();
    for keyword in keywords {
        let links = links_for_keyword(provider, &keyword, site, config).await;
        if links.len() < config.per_keyword_cap {
            warn!(
                %keyword,
                found = links.len(),
                wanted = config.per_keyword_cap,
                "fewer internal links than requested"
            );
        }
        set.push(keyword, links);
    }

    let combined = set.combined();
    let mut content = String::new();
    for link in &combined {
        content.push_str(link);
        content.push('\n');
    }
    store.write(ArtifactKind::InternalLinks, &content)?;

    info!(links = combined.len(), "internal links saved");
    Ok(set)
}

/// Walk ranked results for one keyword until the cap is reached.
///
/// A search failure ends this keyword with whatever was already kept.
async fn links_for_keyword<P: SearchProvider>(
    provider: &P,
    keyword: &str,
    site: &str,
    config: &LinkConfig,
) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    if config.per_keyword_cap == 0 {
        return links;
    }

    let query = format!("{keyword} {site}");
    let mut cursor = search(provider, &query);

    loop {
        match cursor.next().await {
            Ok(Some(url)) => {
                if url.to_lowercase().contains(&config.path_marker) && !links.contains(&url) {
                    debug!(%keyword, %url, "internal link kept");
                    links.push(url);
                    if links.len() >= config.per_keyword_cap {
                        break;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(%keyword, error = %e, "link search failed");
                break;
            }
        }
    }

    debug!(%keyword, scanned = cursor.yielded(), kept = links.len(), "keyword done");
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedSearch, temp_dir};

    fn link_config(cap: usize) -> LinkConfig {
        LinkConfig {
            path_marker: "articles".into(),
            per_keyword_cap: cap,
        }
    }

    #[test]
    fn keywords_drop_filler_and_stopwords() {
        assert_eq!(
            extract_keywords("what is the best electric bicycle guide"),
            vec!["electric", "bicycle"]
        );
    }

    #[test]
    fn keywords_strip_punctuation_and_numbers() {
        let keywords = extract_keywords("A Beginner's Guide: Solar-Power in 2025, Solar panels!");
        assert_eq!(keywords, vec!["solarpower", "solar", "panels"]);
        for kw in &keywords {
            assert!(kw.chars().count() > 3);
            assert!(kw.chars().all(|c| c.is_alphanumeric() || c == '_'));
            assert!(!STOPWORDS.contains(&kw.as_str()));
            assert!(!FILLER_WORDS.contains(&kw.as_str()));
        }
    }

    #[test]
    fn keywords_of_short_topic_are_empty() {
        assert!(extract_keywords("how to do it").is_empty());
        assert!(extract_keywords("").is_empty());
    }

    #[tokio::test]
    async fn find_links_caps_and_filters_per_keyword() {
        let tmp = temp_dir();
        let store = ArtifactStore::open(&tmp, "electric bicycle").unwrap();
        let search = ScriptedSearch::new(1)
            .with(
                "electric https://bikes.example",
                &[
                    "https://bikes.example/shop/e1",
                    "https://bikes.example/articles/e-motors",
                    "https://bikes.example/Articles/e-range",
                    "https://bikes.example/articles/e-motors",
                    "https://bikes.example/articles/e-charging",
                    "https://bikes.example/articles/never-reached",
                ],
            )
            .with(
                "bicycle https://bikes.example",
                &["https://bikes.example/about", "https://bikes.example/articles/b-fit"],
            );

        let set = find_links(
            &search,
            &store,
            "electric bicycle",
            "https://bikes.example",
            &link_config(3),
        )
        .await
        .unwrap();

        assert_eq!(set.keywords(), vec!["electric", "bicycle"]);
        assert_eq!(
            set.links_for("electric").unwrap(),
            &[
                "https://bikes.example/articles/e-motors".to_string(),
                "https://bikes.example/Articles/e-range".to_string(),
                "https://bikes.example/articles/e-charging".to_string(),
            ]
        );
        assert_eq!(
            set.links_for("bicycle").unwrap(),
            &["https://bikes.example/articles/b-fit".to_string()]
        );

        for entry in &set.entries {
            assert!(entry.links.len() <= 3);
            assert!(entry.links.iter().all(|l| l.to_lowercase().contains("articles")));
        }

        // One result per page: the fifth result filled the cap, the sixth was never requested.
        assert_eq!(search.pages_requested("electric https://bikes.example"), 5);

        let persisted = store.read(ArtifactKind::InternalLinks).unwrap().unwrap();
        let lines: Vec<String> = persisted.lines().map(String::from).collect();
        assert_eq!(lines, set.combined());
        assert_eq!(lines.len(), 4);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn failing_keyword_search_does_not_stop_others() {
        let tmp = temp_dir();
        let store = ArtifactStore::open(&tmp, "solar panels").unwrap();
        let search = ScriptedSearch::new(10)
            .failing("solar example.org")
            .with("panels example.org", &["https://example.org/articles/panels-101"]);

        let set = find_links(&search, &store, "solar panels", "example.org", &link_config(3))
            .await
            .unwrap();

        assert_eq!(set.links_for("solar").unwrap().len(), 0);
        assert_eq!(set.links_for("panels").unwrap().len(), 1);
        assert_eq!(
            store.read(ArtifactKind::InternalLinks).unwrap().unwrap(),
            "https://example.org/articles/panels-101\n"
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn no_keywords_writes_empty_file() {
        let tmp = temp_dir();
        let store = ArtifactStore::open(&tmp, "how to").unwrap();
        let search = ScriptedSearch::new(10);

        let set = find_links(&search, &store, "how to", "example.org", &link_config(3))
            .await
            .unwrap();

        assert!(set.entries.is_empty());
        assert_eq!(store.read(ArtifactKind::InternalLinks).unwrap().unwrap(), "");
        assert!(search.queries.lock().unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
