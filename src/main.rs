//! diffscribe - CLI entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use diffscribe::commit::{self, GitRepository, MessageCache, MessageSource, Mode, WorkflowOptions};
use diffscribe::config::Config;
use diffscribe::llm::{LlmRouter, Provider, RoutingPolicy};

/// Generate semantic commit messages from staged changes.
#[derive(Parser, Debug)]
#[command(name = "diffscribe")]
#[command(about = "Generate semantic commit messages from staged changes")]
#[command(version)]
struct Cli {
    /// Commit with the cached message (or a freshly generated one)
    #[arg(long)]
    commit: bool,

    /// Backend to try first
    #[arg(long, value_enum, default_value_t = ProviderArg::Gemini)]
    provider: ProviderArg,

    /// Seconds to wait for the first backend before falling back
    #[arg(long, value_name = "SECS", conflicts_with = "no_timeout")]
    timeout: Option<u64>,

    /// Wait for the first backend without a time limit
    #[arg(long)]
    no_timeout: bool,

    /// Word budget for the diff sent to the backend
    #[arg(long, value_name = "N")]
    max_words: Option<usize>,

    /// Cache file location (defaults to <git dir>/diffscribe_cache.json)
    #[arg(long, value_name = "PATH")]
    cache_file: Option<PathBuf>,

    /// Regenerate instead of committing a cached message made for a different diff
    #[arg(long)]
    strict_cache: bool,

    /// Repository to operate on
    #[arg(long, value_name = "PATH", default_value = ".")]
    repo: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    Gemini,
    Groq,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Gemini => Provider::Gemini,
            ProviderArg::Groq => Provider::Groq,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of the environment configuration.
    fn apply(&self, config: &mut Config) {
        let env_timeout = config.policy.first_attempt_timeout;

        config.policy = match Provider::from(self.provider) {
            Provider::Gemini => RoutingPolicy::timed(
                env_timeout.unwrap_or(Duration::from_secs(
                    diffscribe::config::DEFAULT_PRIMARY_TIMEOUT_SECS,
                )),
            ),
            Provider::Groq => RoutingPolicy::sequential(),
        };

        if let Some(secs) = self.timeout {
            config.policy.first_attempt_timeout = Some(Duration::from_secs(secs));
        }
        if self.no_timeout {
            config.policy.first_attempt_timeout = None;
        }
        if let Some(max_words) = self.max_words {
            config.max_words = max_words;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    cli.apply(&mut config);

    let repo = GitRepository::discover(&cli.repo)
        .context("Not a git repository. Run diffscribe from within a git repository.")?;

    let cache = MessageCache::new(
        cli.cache_file
            .clone()
            .unwrap_or_else(|| repo.default_cache_path()),
    );

    let router = LlmRouter::from_config(&config).context("Failed to build HTTP client")?;

    let mode = if cli.commit { Mode::Commit } else { Mode::Preview };
    let options = WorkflowOptions {
        max_words: config.max_words,
        strict_cache: cli.strict_cache,
    };

    println!("🧠 Diffscribe: Generating commit message using secure diff...");

    let outcome = commit::run(&repo, &router, &cache, mode, options).await?;

    if outcome.truncated {
        println!(
            "Diff exceeded {} words; only the first part was sent.",
            config.max_words
        );
    }

    match mode {
        Mode::Preview => {
            if let MessageSource::Generated { provider, .. } = outcome.source {
                println!("✅ Suggested Commit Message ({}):\n", provider);
            }
            println!("{}", outcome.message);
        }
        Mode::Commit => {
            let origin = match outcome.source {
                MessageSource::Cached => "cached message".to_string(),
                MessageSource::Generated { provider, .. } => format!("{} message", provider),
            };
            println!(
                "✅ Committed {} with {}:\n",
                outcome.commit_id.as_deref().unwrap_or("HEAD"),
                origin
            );
            println!("{}", outcome.message);
        }
    }

    Ok(())
}
