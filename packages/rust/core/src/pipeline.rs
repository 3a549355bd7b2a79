//! End-to-end run: harvest → links → metadata → outline → (article).

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use seoscribe_artifacts::{ArtifactKind, ArtifactStore};
use seoscribe_crawler::Harvester;
use seoscribe_llm::CompletionClient;
use seoscribe_search::SearchProvider;
use seoscribe_shared::{HarvestConfig, HarvestedDocument, KeywordLinkSet, LinkConfig, Result};

use crate::article::expand_article;
use crate::links::find_links;
use crate::metadata::generate_metadata;
use crate::outline::{OutlineOutcome, generate_outline};

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub topic: String,
    /// Site used for link search and metadata URL suggestions.
    pub site_url: String,
    /// Root under which the per-topic artifact directory is created.
    pub output_dir: PathBuf,
    pub desired_pages: usize,
    pub expand_article: bool,
    pub harvest: HarvestConfig,
    pub links: LinkConfig,
}

/// How the outline stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineStatus {
    Generated { sections: usize },
    MissingInput { path: PathBuf },
    Failed { reason: String },
}

/// Summary of a pipeline run.
#[derive(Debug)]
pub struct RunReport {
    pub topic: String,
    pub artifact_dir: PathBuf,
    /// URLs the harvester attempted.
    pub harvested_urls: Vec<String>,
    pub fetched: usize,
    pub failed: usize,
    pub links: KeywordLinkSet,
    pub metadata_parsed: bool,
    pub outline: OutlineStatus,
    /// Number of expanded sections, when expansion ran.
    pub article_sections: Option<usize>,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called per unit of work inside a phase (article sections).
    fn task_progress(&self, current: usize, total: usize, detail: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn task_progress(&self, _current: usize, _total: usize, _detail: &str) {}
    fn done(&self, _report: &RunReport) {}
}

/// Harvest pages for `topic` and persist the text to `scraped_content.txt`.
///
/// The file is written even when no page succeeded.
pub async fn harvest_topic<P: SearchProvider>(
    harvester: &Harvester,
    provider: &P,
    store: &ArtifactStore,
    topic: &str,
    desired: usize,
) -> Result<HarvestedDocument> {
    let doc = harvester.harvest(provider, topic, desired).await?;
    if doc.is_empty() {
        warn!("no page content was harvested");
    }
    store.write(ArtifactKind::ScrapedContent, &doc.text)?;
    Ok(doc)
}

/// Run every stage in sequence.
///
/// Search and metadata faults abort the run. Outline faults are reported in
/// [`RunReport::outline`] and skip expansion.
#[instrument(skip_all, fields(topic = %config.topic, site = %config.site_url))]
pub async fn run_pipeline<P: SearchProvider>(
    config: &RunConfig,
    provider: &P,
    client: &CompletionClient,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    let start = Instant::now();
    let store = ArtifactStore::open(&config.output_dir, &config.topic)?;

    info!(dir = %store.dir().display(), run_id = %store.run_id(), "starting run");

    // --- Phase 1: Harvest ---
    progress.phase("Scraping web content");
    let harvester = Harvester::new(config.harvest.clone())?;
    let doc = harvest_topic(
        &harvester,
        provider,
        &store,
        &config.topic,
        config.desired_pages,
    )
    .await?;

    // --- Phase 2: Internal links ---
    progress.phase("Searching for internal links");
    let links = find_links(
        provider,
        &store,
        &config.topic,
        &config.site_url,
        &config.links,
    )
    .await?;

    // --- Phase 3: Metadata ---
    progress.phase("Generating meta details");
    let meta = generate_metadata(client, &store, &config.topic, &config.site_url).await?;

    // --- Phase 4: Outline ---
    progress.phase("Generating article outline");
    let outline = match generate_outline(client, &store, &config.topic).await {
        OutlineOutcome::Generated(outline) => OutlineStatus::Generated {
            sections: outline.sections().len(),
        },
        OutlineOutcome::MissingInput { path } => {
            warn!(path = %path.display(), "outline skipped: no harvested content");
            OutlineStatus::MissingInput { path }
        }
        OutlineOutcome::Failed { error } => {
            warn!(%error, "outline failed");
            OutlineStatus::Failed {
                reason: error.to_string(),
            }
        }
    };

    // --- Phase 5: Article (optional) ---
    let article_sections = match (&outline, config.expand_article) {
        (OutlineStatus::Generated { .. }, true) => {
            progress.phase("Generating article");
            let article = expand_article(client, &store, &config.topic, progress).await?;
            Some(article.sections.len())
        }
        (_, true) => {
            warn!("article expansion skipped: no outline");
            None
        }
        (_, false) => None,
    };

    let report = RunReport {
        topic: config.topic.clone(),
        artifact_dir: store.dir().to_path_buf(),
        fetched: doc.fetched.len(),
        failed: doc.failures.len(),
        harvested_urls: doc.urls,
        links,
        metadata_parsed: meta.is_parsed(),
        outline,
        article_sections,
        elapsed: start.elapsed(),
    };

    info!(
        fetched = report.fetched,
        links = report.links.combined().len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "run complete"
    );

    progress.done(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use seoscribe_shared::MetaDetails;

    use super::*;
    use crate::prompts;
    use crate::testing::{ScriptedSearch, client_for, completion_body, temp_dir};

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        tasks: Mutex<Vec<(usize, usize)>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn task_progress(&self, current: usize, total: usize, _detail: &str) {
            self.tasks.lock().unwrap().push((current, total));
        }
        fn done(&self, _report: &RunReport) {
            self.phases.lock().unwrap().push("done".into());
        }
    }

    fn run_config(output_dir: PathBuf, expand: bool) -> RunConfig {
        RunConfig {
            topic: "what is the best electric bicycle guide".into(),
            site_url: "https://bikes.example".into(),
            output_dir,
            desired_pages: 2,
            expand_article: expand,
            harvest: HarvestConfig {
                fetch_timeout: Duration::from_secs(5),
                excluded_domains: vec!["wikipedia.org".into()],
                min_candidates: 10,
                allow_private_hosts: true,
            },
            links: LinkConfig {
                path_marker: "articles".into(),
                per_keyword_cap: 3,
            },
        }
    }

    async fn mount_completion(server: &wiremock::MockServer, needle: &str, reply: &str) {
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat/completions"))
            .and(wiremock::matchers::body_string_contains(needle))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(completion_body(reply)))
            .mount(server)
            .await;
    }

    async fn mount_page(server: &wiremock::MockServer, route: &str, status: u16, text: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(route))
            .respond_with(
                wiremock::ResponseTemplate::new(status)
                    .set_body_string(format!("<html><body><p>{text}</p></body></html>")),
            )
            .mount(server)
            .await;
    }

    fn search_for(base: &str) -> ScriptedSearch {
        let guides: Vec<String> = ["guide-a", "guide-b", "guide-c"]
            .iter()
            .map(|p| format!("{base}/{p}"))
            .collect();
        ScriptedSearch::new(10)
            .with(
                "what is the best electric bicycle guide",
                &[
                    "https://en.wikipedia.org/wiki/Electric_bicycle",
                    guides[0].as_str(),
                    guides[1].as_str(),
                    guides[2].as_str(),
                ],
            )
            .with(
                "electric https://bikes.example",
                &[
                    "https://bikes.example/articles/electric-motors",
                    "https://bikes.example/shop",
                ],
            )
            .with(
                "bicycle https://bikes.example",
                &["https://bikes.example/articles/bicycle-sizing"],
            )
    }

    #[tokio::test]
    async fn full_run_with_expansion() {
        let server = wiremock::MockServer::start().await;
        let base = server.uri();
        mount_page(&server, "/guide-a", 200, "Mid-drive motors climb well.").await;
        mount_page(&server, "/guide-b", 404, "gone").await;

        mount_completion(
            &server,
            "digital marketing expert",
            r#"{"meta_titles":["a","b","c"],"meta_descriptions":["d","e","f"],"site_urls":["https://bikes.example/x","https://bikes.example/y","https://bikes.example/z"]}"#,
        )
        .await;
        mount_completion(
            &server,
            "senior content strategist",
            "Introduction\n- hook\n\nMotors\n- torque\n\nConclusion\n- recap",
        )
        .await;
        mount_completion(&server, "(Section", "Expanded prose.").await;

        let tmp = temp_dir();
        let config = run_config(tmp.clone(), true);
        let search = search_for(&base);
        let progress = RecordingProgress::default();

        let report = run_pipeline(&config, &search, &client_for(&server), &progress)
            .await
            .unwrap();

        assert_eq!(report.harvested_urls.len(), 2);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.links.keywords(), vec!["electric", "bicycle"]);
        assert_eq!(report.links.combined().len(), 2);
        assert!(report.metadata_parsed);
        assert_eq!(report.outline, OutlineStatus::Generated { sections: 3 });
        assert_eq!(report.article_sections, Some(3));
        assert!(report.artifact_dir.starts_with(&tmp));

        let store = ArtifactStore::open(&tmp, &config.topic).unwrap();
        for kind in ArtifactKind::ALL {
            assert!(store.exists(kind), "{kind} missing");
        }
        let scraped = store.read(ArtifactKind::ScrapedContent).unwrap().unwrap();
        assert!(scraped.contains("Mid-drive motors"));
        let meta: MetaDetails = store.read_json(ArtifactKind::MetaDetails).unwrap().unwrap();
        assert!(meta.is_parsed());
        assert_eq!(store.manifest().unwrap().unwrap().artifacts.len(), 5);

        let phases = progress.phases.lock().unwrap().clone();
        assert_eq!(phases.first().map(String::as_str), Some("Scraping web content"));
        assert_eq!(phases.last().map(String::as_str), Some("done"));
        assert_eq!(*progress.tasks.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn failed_outline_skips_expansion() {
        let server = wiremock::MockServer::start().await;
        let base = server.uri();
        mount_page(&server, "/guide-a", 200, "Hub motors are quiet.").await;
        mount_page(&server, "/guide-b", 200, "Torque sensors feel natural.").await;

        mount_completion(&server, "digital marketing expert", "not json at all").await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::body_string_contains(prompts::OUTLINE_SYSTEM))
            .respond_with(wiremock::ResponseTemplate::new(502))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::body_string_contains("(Section"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(completion_body("x")))
            .expect(0)
            .mount(&server)
            .await;

        let tmp = temp_dir();
        let config = run_config(tmp.clone(), true);
        let report = run_pipeline(&config, &search_for(&base), &client_for(&server), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.fetched, 2);
        assert!(!report.metadata_parsed);
        assert!(matches!(report.outline, OutlineStatus::Failed { ref reason } if reason.contains("502")));
        assert_eq!(report.article_sections, None);

        let store = ArtifactStore::open(&tmp, &config.topic).unwrap();
        assert!(!store.exists(ArtifactKind::Outline));
        assert!(!store.exists(ArtifactKind::GeneratedArticle));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn metadata_fault_aborts_run() {
        let server = wiremock::MockServer::start().await;
        let base = server.uri();
        mount_page(&server, "/guide-a", 200, "text").await;
        mount_page(&server, "/guide-b", 200, "text").await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tmp = temp_dir();
        let config = run_config(tmp.clone(), false);
        let result = run_pipeline(&config, &search_for(&base), &client_for(&server), &SilentProgress).await;
        assert!(result.is_err());

        let store = ArtifactStore::open(&tmp, &config.topic).unwrap();
        assert!(store.exists(ArtifactKind::ScrapedContent));
        assert!(store.exists(ArtifactKind::InternalLinks));
        assert!(!store.exists(ArtifactKind::Outline));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
