//! `screener`: evaluate a resume against a job description with a language model.
//!
//! Exit codes:
//! - 0: report produced (possibly with validation notes)
//! - 1: unreadable document, job description or configuration
//! - 2: the model call failed
//! - 3: the model answered but no JSON object could be recovered

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener_core::{
    extract_text, render_report, render_unparsed, EvaluationRequest, SAMPLE_JOB_DESCRIPTION,
};
use screener_runtime::config::parse_duration;
use screener_runtime::{
    ConfigError, ProviderError, RuntimeConfig, RuntimeError, Screener, ScreeningOutcome, Verdict,
};

const EXIT_INPUT: u8 = 1;
const EXIT_MODEL: u8 = 2;
const EXIT_UNPARSED: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "screener", version, about = "Screen a resume against a job description with an LLM")]
struct Cli {
    /// Resume document (.pdf, or any UTF-8 text file)
    resume: PathBuf,

    /// Job description file; the built-in sample posting when omitted
    #[arg(long, value_name = "PATH")]
    job: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Model backend
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Model name (provider default when omitted)
    #[arg(long)]
    model: Option<String>,

    /// Backend base URL
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Per-call timeout, e.g. "90s" or "2m"
    #[arg(long, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Extra attempts for transient model failures
    #[arg(long)]
    retries: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    Ollama,
    Openai,
}

impl ProviderKind {
    fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::Openai => "openai",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    parse_duration("--timeout", value)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = build_config(cli, |key| std::env::var(key).ok())?;
    let screener = Screener::from_config(config)?;

    let resume_text = extract_text(&cli.resume)?;
    eprintln!("Resume loaded. Length: {} characters.", resume_text.chars().count());

    let job_description = load_job_description(cli.job.as_deref())?;
    let request = EvaluationRequest::new(resume_text, job_description);

    eprintln!(
        "Analyzing the candidate with {}/{}... (this may take a while on local hardware)",
        screener.provider_name(),
        screener.model()
    );

    let outcome = screener.screen(&request).await?;
    debug!(metadata = ?outcome.metadata, "Run complete");

    print!("{}", format_outcome(&outcome, cli.format)?);

    Ok(if outcome.is_parsed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_UNPARSED)
    })
}

/// Layer defaults, the YAML file, the environment, then flags.
fn build_config(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_yaml_file(path)?,
        None => RuntimeConfig::default(),
    };

    config.apply_env_with(env)?;

    if let Some(provider) = cli.provider {
        config.provider = provider.as_str().to_string();
    }
    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    if let Some(retries) = cli.retries {
        config.retries = retries;
    }

    config.validate()?;
    Ok(config)
}

fn load_job_description(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => extract_text(path)
            .with_context(|| format!("could not load job description {}", path.display())),
        None => Ok(SAMPLE_JOB_DESCRIPTION.to_string()),
    }
}

fn format_outcome(outcome: &ScreeningOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(outcome)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(match &outcome.verdict {
            Verdict::Parsed(report) => render_report(report),
            Verdict::Unparsed { error, raw } => render_unparsed(error, raw),
        }),
    }
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RuntimeError>() {
        Some(RuntimeError::Provider(ProviderError::NotConfigured(_)) | RuntimeError::Config(_)) => {
            EXIT_INPUT
        }
        Some(RuntimeError::Provider(_)) => EXIT_MODEL,
        // documents, job descriptions, configuration
        None => EXIT_INPUT,
    }
}
