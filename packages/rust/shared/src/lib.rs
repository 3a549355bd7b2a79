//! Shared types, error model, and configuration for SeoScribe.
//!
//! This crate is the foundation depended on by all other SeoScribe crates.
//! It provides:
//! - [`SeoScribeError`]: the unified error type
//! - Domain types ([`HarvestedDocument`], [`KeywordLinkSet`], [`MetaDetails`], [`Outline`])
//! - Configuration ([`AppConfig`], per-stage runtime configs, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, HarvestConfig, HarvestSection, LinkConfig, LinksSection, LlmConfig,
    LlmSection, SearchConfig, SearchSection, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_api_key,
};
pub use error::{Result, SeoScribeError};
pub use types::{
    GeneratedArticle, HarvestedDocument, KeywordLinkSet, KeywordLinks, MetaDetails, Outline,
    slugify,
};
