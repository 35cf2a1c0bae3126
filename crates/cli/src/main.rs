//! Deep Research CLI
//!
//! Collects a research topic, runs the research → answer pipeline and
//! prints the drafted answer with its sources. Logs go to stderr so
//! stdout carries only the rendered result.

use anyhow::Context;
use clap::Parser;
use deepresearch_common::{
    build_orchestrator, config::AppConfig, metrics, ResearchOutcome, ResearchQuery, VERSION,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Answer a research question from web evidence
#[derive(Parser, Debug)]
#[command(name = "deep-research", version, about, long_about = None)]
struct Cli {
    /// Research topic (read from stdin if omitted)
    query: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for research_results_*.json files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Do not write a results file
    #[arg(long)]
    no_save: bool,

    /// Search provider: tavily, mock
    #[arg(long)]
    search_provider: Option<String>,

    /// Generation provider: together, mock
    #[arg(long)]
    generation_provider: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(&path.to_string_lossy()),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);

    init_tracing(&config);
    metrics::register_metrics();
    info!("Starting Deep Research v{}", VERSION);

    let text = if cli.query.is_empty() {
        read_query_from_stdin()?
    } else {
        cli.query.join(" ")
    };

    let Ok(query) = ResearchQuery::new(text) else {
        eprintln!("Please enter a research topic.");
        return Ok(ExitCode::from(2));
    };

    let orchestrator = build_orchestrator(&config).context("Failed to build research pipeline")?;

    eprintln!("Searching... Please wait.");
    let outcome = orchestrator.run(query).await;

    render(&outcome, &mut std::io::stdout().lock())?;
    if let Some(path) = &outcome.artifact {
        eprintln!("Results saved to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(dir) = &cli.output_dir {
        config.recorder.output_dir = dir.clone();
    }
    if cli.no_save {
        config.recorder.enabled = false;
    }
    if let Some(provider) = &cli.search_provider {
        config.search.provider = provider.clone();
    }
    if let Some(provider) = &cli.generation_provider {
        config.generation.provider = provider.clone();
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_query_from_stdin() -> anyhow::Result<String> {
    eprint!("Enter your research topic: ");
    std::io::stderr().flush().ok();

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read query from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn render(outcome: &ResearchOutcome, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Final Answer:")?;
    writeln!(out, "{}", outcome.answer)?;

    if !outcome.sources.is_empty() {
        writeln!(out)?;
        writeln!(out, "Sources:")?;
        for url in &outcome.sources {
            writeln!(out, "- {}", url)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_words_are_joined() {
        let cli = Cli::parse_from(["deep-research", "rust", "ownership", "--no-save"]);
        assert_eq!(cli.query.join(" "), "rust ownership");
        assert!(cli.no_save);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "deep-research",
            "q",
            "--output-dir",
            "runs",
            "--search-provider",
            "mock",
            "--generation-provider",
            "mock",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.recorder.output_dir, PathBuf::from("runs"));
        assert!(config.recorder.enabled);
        assert_eq!(config.search.provider, "mock");
        assert_eq!(config.generation.provider, "mock");
    }

    #[test]
    fn test_render_with_sources() {
        let outcome = ResearchOutcome {
            answer: "Rust's ownership model...".to_string(),
            sources: vec!["https://a.example".to_string()],
            artifact: None,
        };
        let mut out = Vec::new();
        render(&outcome, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Final Answer:\nRust's ownership model...\n\nSources:\n- https://a.example\n"
        );
    }

    #[test]
    fn test_render_without_sources() {
        let outcome = ResearchOutcome {
            answer: String::new(),
            sources: Vec::new(),
            artifact: None,
        };
        let mut out = Vec::new();
        render(&outcome, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Final Answer:\n\n");
    }
}
