//! Stage logic and pipeline orchestration for SeoScribe.
//!
//! Ties the harvester, link finder and the three generation stages together
//! into the end-to-end `run_pipeline` workflow. Each stage reads its input
//! from and writes its output to an [`seoscribe_artifacts::ArtifactStore`].

pub mod article;
pub mod links;
pub mod metadata;
pub mod outline;
pub mod pipeline;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testing;

pub use article::expand_article;
pub use links::{FILLER_WORDS, STOPWORDS, extract_keywords, find_links};
pub use metadata::generate_metadata;
pub use outline::{OutlineOutcome, generate_outline};
pub use pipeline::{
    OutlineStatus, ProgressReporter, RunConfig, RunReport, SilentProgress, harvest_topic,
    run_pipeline,
};
