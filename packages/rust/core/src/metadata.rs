//! Metadata Generator: SEO titles, descriptions and page URLs for a topic.

use tracing::{info, instrument, warn};

use seoscribe_artifacts::{ArtifactKind, ArtifactStore};
use seoscribe_llm::{CompletionClient, CompletionRequest, strip_json_fences};
use seoscribe_shared::{MetaDetails, Result};

use crate::prompts;

/// Request metadata suggestions and persist them to `meta_details.json`.
///
/// Output that is not the expected JSON object is kept verbatim as
/// [`MetaDetails::Raw`]. Completion API faults are returned as errors.
#[instrument(skip_all, fields(topic = %topic, site_url = %site_url))]
pub async fn generate_metadata(
    client: &CompletionClient,
    store: &ArtifactStore,
    topic: &str,
    site_url: &str,
) -> Result<MetaDetails> {
    let settings = client.settings();
    let request = CompletionRequest {
        system: prompts::METADATA_SYSTEM.to_string(),
        user: prompts::metadata_prompt(topic, site_url),
        temperature: settings.temperature,
        max_tokens: settings.metadata_max_tokens,
    };

    let completion = client.complete(&request).await?;
    let details = MetaDetails::from_model_output(strip_json_fences(&completion.text));

    if details.is_parsed() {
        info!(tokens_out = completion.tokens_out, "metadata generated");
    } else {
        warn!("metadata response was not valid JSON; keeping raw output");
    }

    store.write_json(ArtifactKind::MetaDetails, &details)?;
    Ok(details)
}
