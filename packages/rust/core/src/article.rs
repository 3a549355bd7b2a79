//! Article Expander: one completion request per outline section.

use tracing::{debug, error, info, instrument};

use seoscribe_artifacts::{ArtifactKind, ArtifactStore};
use seoscribe_llm::{CompletionClient, CompletionRequest};
use seoscribe_shared::{GeneratedArticle, Outline, Result, SeoScribeError};

use crate::pipeline::ProgressReporter;
use crate::prompts;

/// Expand `outline.txt` into `generated_article.txt`.
///
/// Sections are elaborated strictly in order. The first failed request
/// aborts the stage and nothing is written.
#[instrument(skip_all, fields(topic = %topic))]
pub async fn expand_article(
    client: &CompletionClient,
    store: &ArtifactStore,
    topic: &str,
    progress: &dyn ProgressReporter,
) -> Result<GeneratedArticle> {
    let outline = store.read(ArtifactKind::Outline)?.ok_or_else(|| {
        SeoScribeError::validation(format!(
            "outline not found at {}; generate an outline first",
            store.path(ArtifactKind::Outline).display()
        ))
    })?;
    let outline = Outline::new(outline);
    let sections = outline.sections();
    let total = sections.len();

    info!(sections = total, "expanding outline");

    let settings = client.settings();
    let mut article = GeneratedArticle::new(topic);

    for (i, section) in sections.iter().enumerate() {
        let index = i + 1;
        progress.task_progress(index, total, &format!("Section {index}"));

        let request = CompletionRequest {
            system: prompts::SECTION_SYSTEM.to_string(),
            user: prompts::section_prompt(topic, index, section),
            temperature: settings.temperature,
            max_tokens: settings.section_max_tokens,
        };

        let completion = match client.complete(&request).await {
            Ok(completion) => completion,
            Err(e) => {
                error!(index, total, error = %e, "section expansion failed; aborting");
                return Err(e);
            }
        };

        debug!(index, chars = completion.text.len(), "section completed");
        article.sections.push(completion.text);
    }

    store.write(ArtifactKind::GeneratedArticle, &article.render())?;
    info!(sections = article.sections.len(), "article generated");

    Ok(article)
}
