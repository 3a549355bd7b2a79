//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use seoscribe_artifacts::{ArtifactKind, ArtifactStore};
use seoscribe_core::{
    OutlineOutcome, OutlineStatus, ProgressReporter, RunConfig, RunReport, expand_article,
    find_links, generate_metadata, generate_outline, harvest_topic, run_pipeline,
};
use seoscribe_crawler::Harvester;
use seoscribe_llm::CompletionClient;
use seoscribe_search::DuckDuckGoSearch;
use seoscribe_shared::{
    AppConfig, HarvestConfig, LinkConfig, LlmConfig, MetaDetails, SearchConfig, init_config,
    load_config, validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SeoScribe: research a topic and draft SEO content for a site.
#[derive(Parser)]
#[command(
    name = "seoscribe",
    version,
    about = "Harvest web content for a topic and draft SEO metadata, an outline and an article.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Options shared by every stage command.
#[derive(Args, Debug, Clone)]
pub(crate) struct TopicArgs {
    /// Article topic (prompted for when omitted).
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Output root for per-topic artifact directories.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the whole pipeline: harvest, links, metadata, outline (and article).
    Run {
        #[command(flatten)]
        topic: TopicArgs,

        /// Target website URL (prompted for when omitted).
        #[arg(short, long)]
        site: Option<String>,

        /// Expand the outline into a full article.
        #[arg(long)]
        expand: bool,

        /// Number of search-result pages to harvest.
        #[arg(long)]
        pages: Option<usize>,

        /// Internal links to collect per keyword.
        #[arg(long)]
        links: Option<usize>,
    },

    /// Harvest visible text from the top search results.
    Harvest {
        #[command(flatten)]
        topic: TopicArgs,

        /// Number of search-result pages to harvest.
        #[arg(long)]
        pages: Option<usize>,
    },

    /// Find internal links on the target site for each topic keyword.
    Links {
        #[command(flatten)]
        topic: TopicArgs,

        /// Target website URL (prompted for when omitted).
        #[arg(short, long)]
        site: Option<String>,

        /// Internal links to collect per keyword.
        #[arg(long)]
        links: Option<usize>,
    },

    /// Generate meta titles, descriptions and page URLs.
    Meta {
        #[command(flatten)]
        topic: TopicArgs,

        /// Target website URL (prompted for when omitted).
        #[arg(short, long)]
        site: Option<String>,
    },

    /// Generate an article outline from harvested content.
    Outline {
        #[command(flatten)]
        topic: TopicArgs,
    },

    /// Expand an existing outline into a full article.
    Expand {
        #[command(flatten)]
        topic: TopicArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "seoscribe=info",
        1 => "seoscribe=debug",
        _ => "seoscribe=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            topic,
            site,
            expand,
            pages,
            links,
        } => cmd_run(topic, site, expand, pages, links).await,
        Command::Harvest { topic, pages } => cmd_harvest(topic, pages).await,
        Command::Links { topic, site, links } => cmd_links(topic, site, links).await,
        Command::Meta { topic, site } => cmd_meta(topic, site).await,
        Command::Outline { topic } => cmd_outline(topic).await,
        Command::Expand { topic } => cmd_expand(topic).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(
    args: TopicArgs,
    site: Option<String>,
    expand: bool,
    pages: Option<usize>,
    links: Option<usize>,
) -> Result<()> {
    let config = load_config()?;
    // Fail on a missing key before any prompt or network call
    validate_api_key(&config)?;

    let topic = resolve(args.topic, "Enter a topic: ")?;
    let site_url = resolve(site, "Enter the website url: ")?;

    let mut link_config = LinkConfig::from(&config);
    if let Some(n) = links {
        link_config.per_keyword_cap = n;
    }

    let run_config = RunConfig {
        topic,
        site_url,
        output_dir: output_root(&config, args.out),
        desired_pages: pages.unwrap_or(config.defaults.desired_pages),
        expand_article: expand || config.defaults.expand_article,
        harvest: HarvestConfig::from(&config),
        links: link_config,
    };

    info!(
        topic = %run_config.topic,
        site = %run_config.site_url,
        expand = run_config.expand_article,
        "starting pipeline"
    );

    let search = DuckDuckGoSearch::new(&SearchConfig::from(&config))?;
    let client = CompletionClient::from_config(&LlmConfig::from(&config))?;
    let reporter = CliProgress::new();

    let report = run_pipeline(&run_config, &search, &client, &reporter).await?;
    print_report(&report);

    Ok(())
}

async fn cmd_harvest(args: TopicArgs, pages: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let topic = resolve(args.topic, "Enter a topic: ")?;
    let store = ArtifactStore::open(output_root(&config, args.out), &topic)?;

    let search = DuckDuckGoSearch::new(&SearchConfig::from(&config))?;
    let harvester = Harvester::new(HarvestConfig::from(&config))?;
    let desired = pages.unwrap_or(config.defaults.desired_pages);

    let reporter = CliProgress::new();
    reporter.phase("Scraping web content");
    let doc = harvest_topic(&harvester, &search, &store, &topic, desired).await?;
    reporter.finish();

    println!();
    println!("  Harvested {} of {} pages", doc.fetched.len(), doc.urls.len());
    for url in &doc.fetched {
        println!("    ✓ {url}");
    }
    for (url, reason) in &doc.failures {
        println!("    ✗ {url} ({reason})");
    }
    println!("  Saved:  {}", store.path(ArtifactKind::ScrapedContent).display());
    println!();

    Ok(())
}

async fn cmd_links(args: TopicArgs, site: Option<String>, links: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let topic = resolve(args.topic, "Enter a topic: ")?;
    let site_url = resolve(site, "Enter the website url: ")?;
    let store = ArtifactStore::open(output_root(&config, args.out), &topic)?;

    let mut link_config = LinkConfig::from(&config);
    if let Some(n) = links {
        link_config.per_keyword_cap = n;
    }

    let search = DuckDuckGoSearch::new(&SearchConfig::from(&config))?;
    let reporter = CliProgress::new();
    reporter.phase("Searching for internal links");
    let set = find_links(&search, &store, &topic, &site_url, &link_config).await?;
    reporter.finish();

    println!();
    for entry in &set.entries {
        println!("  {} ({} links)", entry.keyword, entry.links.len());
        for link in &entry.links {
            println!("    {link}");
        }
    }
    println!();

    Ok(())
}

async fn cmd_meta(args: TopicArgs, site: Option<String>) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let topic = resolve(args.topic, "Enter a topic: ")?;
    let site_url = resolve(site, "Enter the website url: ")?;
    let store = ArtifactStore::open(output_root(&config, args.out), &topic)?;
    let client = CompletionClient::from_config(&LlmConfig::from(&config))?;

    let reporter = CliProgress::new();
    reporter.phase("Generating meta details");
    let details = generate_metadata(&client, &store, &topic, &site_url).await?;
    reporter.finish();

    if let MetaDetails::Raw { .. } = details {
        println!("  Model output was not valid JSON; saved as raw_output.");
    }
    println!("{}", serde_json::to_string_pretty(&details)?);

    Ok(())
}

async fn cmd_outline(args: TopicArgs) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let topic = resolve(args.topic, "Enter a topic: ")?;
    let store = ArtifactStore::open(output_root(&config, args.out), &topic)?;
    let client = CompletionClient::from_config(&LlmConfig::from(&config))?;

    let reporter = CliProgress::new();
    reporter.phase("Generating article outline");
    let outcome = generate_outline(&client, &store, &topic).await;
    reporter.finish();

    match outcome {
        OutlineOutcome::Generated(outline) => {
            println!("{}", outline.as_str());
            Ok(())
        }
        OutlineOutcome::MissingInput { path } => Err(eyre!(
            "no harvested content at '{}'; run `seoscribe harvest` first",
            path.display()
        )),
        OutlineOutcome::Failed { error } => Err(error.into()),
    }
}

async fn cmd_expand(args: TopicArgs) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let topic = resolve(args.topic, "Enter a topic: ")?;
    let store = ArtifactStore::open(output_root(&config, args.out), &topic)?;
    let client = CompletionClient::from_config(&LlmConfig::from(&config))?;

    let reporter = CliProgress::new();
    reporter.phase("Generating article");
    let article = expand_article(&client, &store, &topic, &reporter).await?;
    reporter.finish();

    println!("{}", article.render());

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn output_root(config: &AppConfig, out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir))
}

/// Use the flag value, or ask on stdin.
fn resolve(value: Option<String>, prompt: &str) -> Result<String> {
    let value = match value {
        Some(v) => v,
        None => read_line(prompt)?,
    };
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(eyre!("{} cannot be empty", prompt.trim_end_matches(": ")));
    }
    Ok(value)
}

fn read_line(prompt: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn print_report(report: &RunReport) {
    println!();
    println!("  Run complete!");
    println!("  Topic:    {}", report.topic);
    println!(
        "  Pages:    {} fetched, {} failed",
        report.fetched, report.failed
    );
    println!("  Links:    {}", report.links.combined().len());
    println!(
        "  Metadata: {}",
        if report.metadata_parsed { "parsed" } else { "raw output" }
    );
    match &report.outline {
        OutlineStatus::Generated { sections } => println!("  Outline:  {sections} sections"),
        OutlineStatus::MissingInput { path } => {
            println!("  Outline:  skipped (no input at {})", path.display())
        }
        OutlineStatus::Failed { reason } => println!("  Outline:  failed ({reason})"),
    }
    if let Some(sections) = report.article_sections {
        println!("  Article:  {sections} sections");
    }
    println!("  Path:     {}", report.artifact_dir.display());
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn task_progress(&self, current: usize, total: usize, detail: &str) {
        self.spinner
            .set_message(format!("Expanding [{current}/{total}] {detail}"));
    }

    fn done(&self, _report: &RunReport) {
        self.finish();
    }
}
