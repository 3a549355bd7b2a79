//! SeoScribe CLI: SEO content pipeline.
//!
//! Harvests web content for a topic, finds internal links on a target site,
//! and drafts metadata, an outline and optionally a full article with a
//! language model.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
