use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        GatewayResponse, GenerationMetadata, GenerationOptions, GenerationOutcome,
        GenerationRequest, GenerationResult, PromptBundle, Recommendation,
    },
    services::{
        attempt::{after_failed_retry, next_state, AttemptOutcome, AttemptState, RetryPolicy},
        post_process::post_process,
        providers::{AiGateway, PromptCatalog, ResponseValidator},
    },
};

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Turns filter selections into a validated, client-safe recommendation list
///
/// One call runs at most two generation attempts:
/// 1. Generate from the caller's query and validate the candidates
/// 2. If nothing came back, or validation threw out most of a long list,
///    generate once more with a strict-match query
/// 3. If both attempts came back empty, serve the catalog mock
///
/// Search grounding is optional: a failed grounded call is re-issued without
/// search inside the same attempt. Only a failure of the first attempt's
/// search-less call reaches the caller.
///
/// Holds no per-call state, so one generator can serve concurrent calls.
#[derive(Clone)]
pub struct IdeaGenerator {
    catalog: Arc<dyn PromptCatalog>,
    gateway: Arc<dyn AiGateway>,
    validator: Arc<dyn ResponseValidator>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    validation_timeout: Duration,
}

impl IdeaGenerator {
    pub fn new(
        catalog: Arc<dyn PromptCatalog>,
        gateway: Arc<dyn AiGateway>,
        validator: Arc<dyn ResponseValidator>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            validator,
            policy: RetryPolicy::default(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeouts(mut self, attempt_timeout: Duration, validation_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self.validation_timeout = validation_timeout;
        self
    }

    /// Runs the pipeline for one request
    ///
    /// Errors only when the first attempt's backend call fails hard (the
    /// search-less call itself fails or times out). Every other degraded path,
    /// a failed strict retry included, resolves to a list.
    #[instrument(
        skip_all,
        fields(tool = %request.tool_key, request_id = tracing::field::Empty)
    )]
    pub async fn generate_ideas(&self, request: &GenerationRequest) -> AppResult<GenerationResult> {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));

        if request.use_mock_data {
            tracing::info!("Serving mock data");
            let bundle = self.bundle(request, request.base_query());
            return Ok(self.finish(
                request,
                bundle.mock_response.recommendations,
                GenerationMetadata {
                    request_id,
                    attempts: 0,
                    outcome: GenerationOutcome::Mock,
                    search_grounded: false,
                    generated_at: Utc::now(),
                },
            ));
        }

        let base_query = request.base_query().to_string();
        let mut state = AttemptState::Initial;
        let mut attempt: u8 = 0;
        let mut search_grounded = false;
        let mut fell_back = false;

        let recommendations = loop {
            state = match state {
                AttemptState::Initial => {
                    attempt = 1;
                    let (outcome, used_search) =
                        self.run_attempt(request, &base_query, attempt).await?;
                    search_grounded = used_search;
                    next_state(attempt, outcome, &self.policy, &base_query, None)
                }
                AttemptState::RetryStrict { query, previous } => {
                    attempt += 1;
                    tracing::info!(
                        attempt,
                        previous_count = previous.as_ref().map(Vec::len),
                        "Retrying with strict query"
                    );
                    match self.run_attempt(request, &query, attempt).await {
                        Ok((outcome, used_search)) => {
                            search_grounded = used_search;
                            next_state(attempt, outcome, &self.policy, &base_query, previous)
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                attempt,
                                has_previous = previous.is_some(),
                                "Strict retry failed, keeping best result so far"
                            );
                            after_failed_retry(previous)
                        }
                    }
                }
                AttemptState::FallbackMock => {
                    tracing::warn!(attempts = attempt, "No candidates generated, using mock data");
                    fell_back = true;
                    break self.bundle(request, &base_query).mock_response.recommendations;
                }
                AttemptState::Done(recommendations) => break recommendations,
            };
        };

        let outcome = match (fell_back, attempt) {
            (true, _) => GenerationOutcome::MockFallback,
            (false, 1) => GenerationOutcome::Validated,
            (false, _) => GenerationOutcome::StrictRetry,
        };

        tracing::info!(
            attempts = attempt,
            outcome = ?outcome,
            results = recommendations.len(),
            "Generation completed"
        );

        Ok(self.finish(
            request,
            recommendations,
            GenerationMetadata {
                request_id,
                attempts: attempt,
                outcome,
                search_grounded,
                generated_at: Utc::now(),
            },
        ))
    }

    fn bundle(&self, request: &GenerationRequest, query: &str) -> PromptBundle {
        self.catalog.prompt_and_mock(
            request.tool_key,
            &request.inputs,
            &request.target_location,
            query,
            request.is_private,
        )
    }

    fn finish(
        &self,
        request: &GenerationRequest,
        recommendations: Vec<Recommendation>,
        metadata: GenerationMetadata,
    ) -> GenerationResult {
        let processed = post_process(
            GenerationResult::from_recommendations(recommendations),
            request.tool_key,
            &request.target_location,
            &request.inputs,
        );

        GenerationResult {
            recommendations: processed.recommendations,
            metadata: Some(metadata),
        }
    }

    /// One generation attempt: prompt, generate, validate
    ///
    /// Returns the outcome plus whether the successful call was search grounded.
    async fn run_attempt(
        &self,
        request: &GenerationRequest,
        query: &str,
        attempt: u8,
    ) -> AppResult<(AttemptOutcome, bool)> {
        let bundle = self.bundle(request, query);
        let options = GenerationOptions::for_request(request);

        let (response, used_search) = self.call_gateway(&bundle.prompt, options, attempt).await?;
        let raw = response.recommendations;

        if raw.is_empty() {
            tracing::info!(attempt, used_search, "Generation returned no candidates");
            return Ok((AttemptOutcome::Empty, used_search));
        }

        let query = validation_query(query, request);
        let filtered = self.score(&query, &raw, request).await;

        tracing::info!(
            attempt,
            used_search,
            raw_count = raw.len(),
            filtered_count = filtered.len(),
            "Candidates validated"
        );

        Ok((
            AttemptOutcome::Scored {
                raw_count: raw.len(),
                filtered,
            },
            used_search,
        ))
    }

    async fn call_gateway(
        &self,
        prompt: &str,
        options: GenerationOptions,
        attempt: u8,
    ) -> AppResult<(GatewayResponse, bool)> {
        match self.generate_with_timeout(prompt, options, attempt).await {
            Ok(response) => Ok((response, options.use_search)),
            Err(e) if options.use_search => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    "Search-grounded generation failed, retrying without search"
                );
                let response = self
                    .generate_with_timeout(prompt, options.without_search(), attempt)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, attempt, "Generation failed without search");
                        e
                    })?;
                Ok((response, false))
            }
            Err(e) => {
                tracing::error!(error = %e, attempt, "Generation failed");
                Err(e)
            }
        }
    }

    async fn generate_with_timeout(
        &self,
        prompt: &str,
        options: GenerationOptions,
        attempt: u8,
    ) -> AppResult<GatewayResponse> {
        match tokio::time::timeout(self.attempt_timeout, self.gateway.generate(prompt, options))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "generation attempt {} exceeded {:?}",
                attempt, self.attempt_timeout
            ))),
        }
    }

    /// Validator output, or every raw candidate if the validator can't answer
    async fn score(
        &self,
        query: &str,
        raw: &[Recommendation],
        request: &GenerationRequest,
    ) -> Vec<Recommendation> {
        let verify = self.validator.verify(query, raw, request.tool_key);

        match tokio::time::timeout(self.validation_timeout, verify).await {
            Ok(Ok(filtered)) => filtered,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Validation failed, keeping unvalidated candidates");
                raw.to_vec()
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.validation_timeout,
                    "Validation timed out, keeping unvalidated candidates"
                );
                raw.to_vec()
            }
        }
    }
}

/// Attempt query followed by the filters the user actually set
pub fn validation_query(query: &str, request: &GenerationRequest) -> String {
    let query = query.trim();
    let summary = request.filter_summary();

    if summary.is_empty() {
        query.to_string()
    } else if query.is_empty() {
        format!("Filters: {}", summary)
    } else {
        format!("{} Filters: {}", query, summary)
    }
}
