//! # screener-runtime
//!
//! Model invocation for resume screening.
//!
//! `screener-core` never talks to a model. This crate does: it owns the
//! provider abstraction, runtime configuration, and the [`Screener`]
//! pipeline that sends the prompt and hands the answer to the core parser.
//!
//! ## Providers
//!
//! | type | feature | default endpoint |
//! |---|---|---|
//! | `ollama` | `local` (default) | `http://localhost:11434` |
//! | `openai` | `openai` | `https://api.openai.com/v1` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use screener_core::{EvaluationRequest, SAMPLE_JOB_DESCRIPTION};
//! use screener_runtime::{RuntimeConfig, Screener};
//!
//! let screener = Screener::from_config(RuntimeConfig::default())?;
//! let request = EvaluationRequest::new(resume_text, SAMPLE_JOB_DESCRIPTION);
//!
//! let outcome = screener.screen(&request).await?;
//! if let Some(report) = outcome.report() {
//!     println!("{}", screener_core::render_report(report));
//! }
//! ```

pub mod config;
pub mod pipeline;
pub mod providers;

pub use config::{ConfigError, RuntimeConfig};
pub use pipeline::{RunMetadata, RuntimeError, Screener, ScreeningOutcome, Verdict};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderFactory, ProviderRegistry, TokenUsage,
};
