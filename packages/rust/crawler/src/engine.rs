//! Content harvester: search → filter → fetch → extract.
//!
//! Fetches a bounded number of search-result pages one after another and
//! concatenates their visible text. A page that cannot be fetched is recorded
//! and skipped; it never fails the harvest.

use std::net::IpAddr;

use reqwest::Client;
use reqwest::redirect::{Attempt, Policy};
use tracing::{debug, info, instrument, warn};
use url::Url;

use seoscribe_search::{SearchProvider, search};
use seoscribe_shared::{HarvestConfig, HarvestedDocument, Result, SeoScribeError};

use crate::extract::visible_text;

/// User-Agent string for page fetches.
const USER_AGENT: &str = concat!("SeoScribe/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects followed per page.
const MAX_REDIRECTS: usize = 5;

/// Number of search candidates to request for `desired` pages.
///
/// Over-fetches so excluded results do not leave the harvest short.
pub fn candidate_count(desired: usize, min_candidates: usize) -> usize {
    desired.saturating_mul(2).max(min_candidates)
}

/// Drop excluded URLs and keep the first `desired` of the rest.
pub fn select_urls(candidates: Vec<String>, excluded: &[String], desired: usize) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|url| !excluded.iter().any(|domain| url.contains(domain.as_str())))
        .take(desired)
        .collect()
}

// ---------------------------------------------------------------------------
// Harvester
// ---------------------------------------------------------------------------

/// Sequential page harvester.
pub struct Harvester {
    config: HarvestConfig,
    client: Client,
}

impl Harvester {
    /// Create a new harvester with the given configuration.
    ///
    /// Unless `allow_private_hosts` is set, every redirect hop is held to the
    /// same private-host check as the first URL.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        let policy = if config.allow_private_hosts {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::custom(guard_redirect)
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(policy)
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| SeoScribeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Harvest up to `desired` result pages for `topic`.
    ///
    /// Only a failure of the search itself is an error.
    #[instrument(skip_all, fields(topic = %topic, desired))]
    pub async fn harvest<P: SearchProvider>(
        &self,
        provider: &P,
        topic: &str,
        desired: usize,
    ) -> Result<HarvestedDocument> {
        let wanted = candidate_count(desired, self.config.min_candidates);
        let mut cursor = search(provider, topic);
        let candidates = cursor.take_urls(wanted).await?;
        let candidates_considered = candidates.len();

        let urls = select_urls(candidates, &self.config.excluded_domains, desired);

        info!(
            requested = wanted,
            candidates = candidates_considered,
            selected = urls.len(),
            "search candidates selected"
        );

        let mut doc = HarvestedDocument {
            urls: urls.clone(),
            candidates_considered,
            ..Default::default()
        };

        for url in &urls {
            match self.fetch_text(url).await {
                Ok(text) => {
                    debug!(%url, chars = text.len(), "page harvested");
                    doc.text.push_str(&text);
                    doc.text.push_str("\n\n");
                    doc.fetched.push(url.clone());
                }
                Err(e) => {
                    warn!(%url, error = %e, "skipping page");
                    doc.failures.push((url.clone(), e.to_string()));
                }
            }
        }

        info!(
            attempted = doc.urls.len(),
            fetched = doc.fetched.len(),
            failed = doc.failures.len(),
            chars = doc.text.len(),
            "harvest completed"
        );

        Ok(doc)
    }

    /// Fetch one page and return its visible text.
    async fn fetch_text(&self, raw_url: &str) -> Result<String> {
        let url = Url::parse(raw_url)
            .map_err(|e| SeoScribeError::Network(format!("{raw_url}: invalid URL: {e}")))?;

        if !self.config.allow_private_hosts && is_ssrf_target(&url) {
            return Err(SeoScribeError::Network(format!(
                "{url}: blocked private or non-HTTP target"
            )));
        }

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SeoScribeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeoScribeError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SeoScribeError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(visible_text(&body))
    }
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

fn guard_redirect(attempt: Attempt) -> reqwest::redirect::Action {
    match redirect_refusal(attempt.url(), attempt.previous().len()) {
        Some(reason) => attempt.error(reason),
        None => attempt.follow(),
    }
}

/// Why a redirect to `target` after `hops` prior requests must not be followed.
fn redirect_refusal(target: &Url, hops: usize) -> Option<String> {
    if hops > MAX_REDIRECTS {
        return Some(format!("too many redirects (limit {MAX_REDIRECTS})"));
    }
    if is_ssrf_target(target) {
        return Some(format!("blocked redirect to private or non-HTTP target {target}"));
    }
    None
}

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    // Block non-HTTP schemes
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    if let Some(host) = url.host_str() {
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            return is_private_ip(&ip);
        }
        if host == "localhost" || host.ends_with(".local") || host.ends_with(".internal") {
            return true;
        }
    }

    false
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}
