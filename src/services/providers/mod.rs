/// Collaborator abstractions
///
/// The pipeline talks to three outside parties: a prompt/mock catalog, the
/// generative backend and a verifier that re-checks candidates against the
/// user's filters. Each sits behind a trait so deployments (and tests) can swap
/// implementations without touching the orchestrator.
use std::collections::BTreeMap;

use crate::{
    error::AppResult,
    models::{GatewayResponse, GenerationOptions, PromptBundle, Recommendation, ToolId},
};

pub mod catalog;
pub mod gemini;
pub mod verifier;

pub use catalog::StaticCatalog;
pub use gemini::GeminiGateway;
pub use verifier::LlmVerifier;

/// Source of prompts and canned results
///
/// Must be pure: same arguments, same bundle.
#[cfg_attr(test, mockall::automock)]
pub trait PromptCatalog: Send + Sync {
    fn prompt_and_mock(
        &self,
        tool: ToolId,
        inputs: &BTreeMap<String, String>,
        location: &str,
        query: &str,
        is_private: bool,
    ) -> PromptBundle;
}

/// Generative AI backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AiGateway: Send + Sync {
    /// Run one generation call
    ///
    /// Returns whatever structured recommendations could be recovered from the
    /// model output. Errors only on hard failures (transport, quota, unparseable
    /// output).
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> AppResult<GatewayResponse>;
}

/// Second-opinion check of generated candidates
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ResponseValidator: Send + Sync {
    /// Returns the subset of `candidates` judged to satisfy `query`
    async fn verify(
        &self,
        query: &str,
        candidates: &[Recommendation],
        tool: ToolId,
    ) -> AppResult<Vec<Recommendation>>;
}
