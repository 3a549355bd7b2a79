//! Fakes shared by the stage tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use seoscribe_llm::CompletionClient;
use seoscribe_search::SearchProvider;
use seoscribe_shared::{LlmConfig, Result, SeoScribeError};

pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("seoscribe-core-test-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn llm_config(base_url: String) -> LlmConfig {
    LlmConfig {
        api_key_env: "SEOSCRIBE_TEST_KEY".into(),
        base_url,
        model: "test/model".into(),
        temperature: 0.7,
        metadata_max_tokens: 300,
        outline_max_tokens: 1000,
        section_max_tokens: 1500,
        request_timeout: Duration::from_secs(5),
        max_context_chars: 24_000,
    }
}

pub fn client_for(server: &wiremock::MockServer) -> CompletionClient {
    CompletionClient::new(&llm_config(server.uri()), "sk-test").unwrap()
}

/// Chat-completions response body carrying `content`.
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "test/model",
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5}
    })
}

/// Search fake keyed by exact query; paginates in pages of `page_size`.
pub struct ScriptedSearch {
    results: HashMap<String, Vec<String>>,
    failing: Vec<String>,
    page_size: usize,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedSearch {
    pub fn new(page_size: usize) -> Self {
        Self {
            results: HashMap::new(),
            failing: Vec::new(),
            page_size,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, query: &str, urls: &[&str]) -> Self {
        self.results
            .insert(query.to_string(), urls.iter().map(|u| u.to_string()).collect());
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.failing.push(query.to_string());
        self
    }

    pub fn pages_requested(&self, query: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(q, _)| q == query)
            .count()
    }
}

impl SearchProvider for ScriptedSearch {
    async fn search_page(&self, query: &str, offset: usize) -> Result<Vec<String>> {
        self.queries.lock().unwrap().push((query.to_string(), offset));
        if self.failing.iter().any(|q| q == query) {
            return Err(SeoScribeError::Search(format!("{query}: provider unavailable")));
        }
        Ok(self
            .results
            .get(query)
            .map(|urls| urls.iter().skip(offset).take(self.page_size).cloned().collect())
            .unwrap_or_default())
    }

    fn max_pages(&self) -> usize {
        20
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
