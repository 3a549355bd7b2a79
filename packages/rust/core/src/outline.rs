//! Outline Generator: turns harvested text into an article outline.

use std::path::PathBuf;

use tracing::{error, info, instrument, warn};

use seoscribe_artifacts::{ArtifactKind, ArtifactStore};
use seoscribe_llm::{CompletionClient, CompletionRequest};
use seoscribe_shared::{Outline, SeoScribeError};

use crate::prompts;

/// Result of the outline stage.
///
/// Only `Generated` leaves an `outline.txt` behind for the expander. The
/// other outcomes remove any outline left over from an earlier run.
#[derive(Debug)]
pub enum OutlineOutcome {
    Generated(Outline),
    /// No harvested content to work from; no request was made.
    MissingInput { path: PathBuf },
    /// The completion request or the write failed.
    Failed { error: SeoScribeError },
}

impl OutlineOutcome {
    pub fn outline(&self) -> Option<&Outline> {
        match self {
            OutlineOutcome::Generated(outline) => Some(outline),
            _ => None,
        }
    }
}

/// Generate an outline from `scraped_content.txt` and persist it to `outline.txt`.
#[instrument(skip_all, fields(topic = %topic))]
pub async fn generate_outline(
    client: &CompletionClient,
    store: &ArtifactStore,
    topic: &str,
) -> OutlineOutcome {
    let harvested = match store.read(ArtifactKind::ScrapedContent) {
        Ok(Some(text)) => text,
        Ok(None) => {
            let path = store.path(ArtifactKind::ScrapedContent);
            error!(path = %path.display(), "harvested content not found");
            discard_stale_outline(store);
            return OutlineOutcome::MissingInput { path };
        }
        Err(error) => return failed(store, error),
    };

    if harvested.trim().is_empty() {
        warn!("harvested content is empty; outline will rely on the topic alone");
    }

    let settings = client.settings();
    let context = truncate_content(&harvested, settings.max_context_chars);
    let request = CompletionRequest {
        system: prompts::OUTLINE_SYSTEM.to_string(),
        user: prompts::outline_prompt(topic, &context),
        temperature: settings.temperature,
        max_tokens: settings.outline_max_tokens,
    };

    let completion = match client.complete(&request).await {
        Ok(completion) => completion,
        Err(error) => {
            error!(%error, "outline request failed");
            return failed(store, error);
        }
    };

    let outline = Outline::new(completion.text);
    if !outline.has_expected_structure() {
        warn!("outline lacks an introduction or conclusion marker");
    }

    if let Err(error) = store.write(ArtifactKind::Outline, outline.as_str()) {
        return failed(store, error);
    }

    info!(sections = outline.sections().len(), "outline generated");
    OutlineOutcome::Generated(outline)
}

fn failed(store: &ArtifactStore, error: SeoScribeError) -> OutlineOutcome {
    discard_stale_outline(store);
    OutlineOutcome::Failed { error }
}

/// An outline from a previous run must not outlive a failed regeneration.
fn discard_stale_outline(store: &ArtifactStore) {
    match store.remove(ArtifactKind::Outline) {
        Ok(true) => warn!("removed outline left by an earlier run"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "could not remove stale outline"),
    }
}

/// Truncate content to `max_chars` characters, appending a marker if cut.
fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            format!(
                "{}\n\n[... content truncated for LLM context window ...]",
                &content[..cut]
            )
        }
        None => content.to_string(),
    }
}
