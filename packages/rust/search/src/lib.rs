//! Web search provider abstraction and the DuckDuckGo HTML provider.
//!
//! Stages never talk to a search engine directly. They take any
//! [`SearchProvider`] and walk its results through a [`SearchCursor`], which
//! fetches result pages lazily so callers can stop as soon as they have
//! enough URLs.

mod parser;

use std::collections::VecDeque;
use std::future::Future;

use reqwest::Client;
use seoscribe_shared::{Result, SearchConfig, SeoScribeError};
use tracing::{debug, instrument, warn};
use url::Url;

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("SeoScribe/", env!("CARGO_PKG_VERSION"));

/// Page budget used when a provider does not override [`SearchProvider::max_pages`].
pub const DEFAULT_MAX_PAGES: usize = 5;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A ranked web search.
pub trait SearchProvider: Send + Sync {
    /// Fetch one page of result URLs starting at `offset` (0-based rank).
    ///
    /// An empty page means the provider has nothing more for this query.
    fn search_page(
        &self,
        query: &str,
        offset: usize,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Upper bound on pages requested for a single query.
    fn max_pages(&self) -> usize {
        DEFAULT_MAX_PAGES
    }

    /// Human-readable provider name for tracing.
    fn name(&self) -> &str;
}

/// Start a lazy result stream for `query`.
pub fn search<'a, P: SearchProvider>(provider: &'a P, query: &str) -> SearchCursor<'a, P> {
    SearchCursor::new(provider, query, provider.max_pages())
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Lazily-paged iterator over a provider's results for one query.
pub struct SearchCursor<'a, P: SearchProvider> {
    provider: &'a P,
    query: String,
    buffer: VecDeque<String>,
    offset: usize,
    pages_fetched: usize,
    max_pages: usize,
    exhausted: bool,
    yielded: usize,
}

impl<'a, P: SearchProvider> SearchCursor<'a, P> {
    pub fn new(provider: &'a P, query: impl Into<String>, max_pages: usize) -> Self {
        Self {
            provider,
            query: query.into(),
            buffer: VecDeque::new(),
            offset: 0,
            pages_fetched: 0,
            max_pages,
            exhausted: false,
            yielded: 0,
        }
    }

    /// Next URL in ranked order, or `None` once the provider is exhausted
    /// or the page budget is spent.
    pub async fn next(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(url) = self.buffer.pop_front() {
                self.yielded += 1;
                return Ok(Some(url));
            }

            if self.exhausted || self.pages_fetched >= self.max_pages {
                return Ok(None);
            }

            let page = self.provider.search_page(&self.query, self.offset).await?;
            self.pages_fetched += 1;

            debug!(
                provider = self.provider.name(),
                query = %self.query,
                offset = self.offset,
                results = page.len(),
                "search page fetched"
            );

            if page.is_empty() {
                self.exhausted = true;
                continue;
            }

            self.offset += page.len();
            self.buffer.extend(page);
        }
    }

    /// Collect up to `n` URLs.
    ///
    /// A provider error after at least one URL was collected ends the
    /// stream early instead of discarding what was already found.
    pub async fn take_urls(&mut self, n: usize) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(n);
        while urls.len() < n {
            match self.next().await {
                Ok(Some(url)) => urls.push(url),
                Ok(None) => break,
                Err(e) if !urls.is_empty() => {
                    warn!(query = %self.query, error = %e, collected = urls.len(), "search ended early");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(urls)
    }

    /// URLs handed out so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Result pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

// ---------------------------------------------------------------------------
// DuckDuckGo
// ---------------------------------------------------------------------------

/// Search provider backed by DuckDuckGo's JavaScript-free HTML endpoint.
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: Url,
    max_pages: usize,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            SeoScribeError::config(format!("invalid search endpoint '{}': {e}", config.endpoint))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SeoScribeError::Search(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            max_pages: config.max_pages,
        })
    }

    fn page_url(&self, query: &str, offset: usize) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if offset > 0 {
                pairs.append_pair("s", &offset.to_string());
            }
        }
        url
    }
}

impl SearchProvider for DuckDuckGoSearch {
    #[instrument(skip(self), fields(provider = "duckduckgo"))]
    async fn search_page(&self, query: &str, offset: usize) -> Result<Vec<String>> {
        let url = self.page_url(query, offset);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SeoScribeError::Search(format!("{query}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeoScribeError::Search(format!("{query}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SeoScribeError::Search(format!("{query}: failed to read body: {e}")))?;

        Ok(parser::parse_results(&body))
    }

    fn max_pages(&self) -> usize {
        self.max_pages
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}
