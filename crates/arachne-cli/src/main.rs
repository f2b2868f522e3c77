use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use arachne_client::crawl_with_config;
use arachne_core::{CrawlConfig, CrawlReport, TracingCrawlReporter};

#[derive(Parser)]
#[command(name = "arachne", version, about = "Concurrent web link crawler")]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(short, long, env = "ARACHNE_URL", default_value = "https://duckduckgo.com")]
    url: String,

    /// Maximum number of links deep to traverse (0 = only the seed)
    #[arg(short, long, env = "ARACHNE_DEPTH", default_value_t = 1)]
    depth: usize,

    /// Only follow links on the seed's origin (scheme, host and port)
    #[arg(
        long,
        alias = "sameSite",
        env = "ARACHNE_SAME_SITE",
        default_value_t = true,
        action = ArgAction::Set
    )]
    same_site: bool,

    /// Render pages in headless Chromium before reading links (slower)
    #[arg(long, alias = "loadDynamicContent", env = "ARACHNE_DYNAMIC")]
    load_dynamic_content: bool,

    /// Overall crawl budget in seconds; a partial result is printed when it expires
    #[arg(long, env = "ARACHNE_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    /// Per-page fetch/navigation timeout in seconds
    #[arg(long, env = "ARACHNE_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    fetch_timeout_secs: u64,

    /// Maximum number of pages processed at once
    #[arg(long, env = "ARACHNE_CONCURRENCY", default_value_t = 16)]
    concurrency: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Numbered list, one URL per line
    Text,
    /// Full crawl report as JSON
    Json,
}

impl Cli {
    fn config(&self) -> CrawlConfig {
        CrawlConfig::default()
            .with_max_depth(self.depth)
            .with_same_origin(self.same_site)
            .with_deadline(Duration::from_secs(self.timeout_secs))
            .with_fetch_timeout(Duration::from_secs(self.fetch_timeout_secs))
            .with_max_concurrency(self.concurrency)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing; stdout is reserved for results.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("arachne=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    tracing::info!(
        url = %cli.url,
        depth = cli.depth,
        same_site = cli.same_site,
        dynamic = cli.load_dynamic_content,
        "Starting crawl"
    );

    let report = crawl_with_config(
        &cli.url,
        &config,
        cli.load_dynamic_content,
        Arc::new(TracingCrawlReporter),
    )
    .await
    .with_context(|| format!("Failed to crawl {}", cli.url))?;

    if report.is_partial() {
        tracing::warn!(
            "Timed out after {}s, printing the links found so far",
            cli.timeout_secs
        );
    }

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn render_text(report: &CrawlReport) -> String {
    let mut out = String::from("Links\n-----\n");
    for (i, url) in report.urls.iter().enumerate() {
        let _ = writeln!(out, "{:03}. {}", i + 1, url);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use arachne_core::CrawlOutcome;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["arachne"]).unwrap();
        assert_eq!(cli.url, "https://duckduckgo.com");
        assert_eq!(cli.depth, 1);
        assert!(cli.same_site);
        assert!(!cli.load_dynamic_content);
        assert_eq!(cli.format, OutputFormat::Text);

        let config = cli.config();
        assert_eq!(config.deadline, Duration::from_secs(60));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.max_concurrency, 16);
    }

    #[test]
    fn flags_and_aliases_parse() {
        let cli = Cli::try_parse_from([
            "arachne",
            "--url",
            "https://example.com",
            "--depth",
            "3",
            "--sameSite",
            "false",
            "--loadDynamicContent",
            "--timeout-secs",
            "5",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.url, "https://example.com");
        assert_eq!(cli.depth, 3);
        assert!(!cli.same_site);
        assert!(cli.load_dynamic_content);
        assert_eq!(cli.config().deadline, Duration::from_secs(5));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn text_output_is_numbered_from_one() {
        let report = CrawlReport {
            session_id: Default::default(),
            seed: "https://example.com/".into(),
            urls: vec!["https://example.com/".into(), "https://example.com/a".into()],
            outcome: CrawlOutcome::Completed,
            started_at: Default::default(),
            elapsed_ms: 3,
        };

        assert_eq!(
            render_text(&report),
            "Links\n-----\n001. https://example.com/\n002. https://example.com/a\n\n"
        );
    }
}
