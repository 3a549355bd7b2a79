//! Search-result harvesting and visible-text extraction.
//!
//! This crate provides:
//! - [`engine`]: the sequential [`Harvester`] (search, filter, fetch, extract)
//! - [`extract`]: chrome stripping and visible-text extraction from HTML

pub mod engine;
pub mod extract;

pub use engine::{Harvester, candidate_count, select_urls};
pub use extract::visible_text;
