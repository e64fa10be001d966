use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{GenerationOptions, Recommendation, ToolId},
    services::providers::{AiGateway, ResponseValidator},
};

/// Verification wants the most literal reading the model can give
const VERIFY_TEMPERATURE: f32 = 0.1;

/// Validator that asks the generative backend to re-judge its own candidates
///
/// Only the names of accepted candidates are taken from the model; the original
/// records are returned so nothing rewritten on the second pass leaks into the
/// result.
#[derive(Clone)]
pub struct LlmVerifier {
    gateway: Arc<dyn AiGateway>,
}

impl LlmVerifier {
    pub fn new(gateway: Arc<dyn AiGateway>) -> Self {
        Self { gateway }
    }

    fn build_prompt(query: &str, candidates: &[Recommendation], tool: ToolId) -> String {
        let listing = candidates
            .iter()
            .map(|rec| {
                format!(
                    "- {} | {} | {}",
                    rec.name,
                    rec.description.as_deref().unwrap_or(""),
                    rec.address.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are checking {tool} recommendations against a user's request.\n\
             Request: {query}\n\n\
             Candidates (name | description | address):\n{listing}\n\n\
             Keep only candidates that clearly satisfy every part of the request. \
             Respond with JSON: {{\"recommendations\": [{{\"name\": \"<exact candidate name>\"}}]}}"
        )
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait::async_trait]
impl ResponseValidator for LlmVerifier {
    async fn verify(
        &self,
        query: &str,
        candidates: &[Recommendation],
        tool: ToolId,
    ) -> AppResult<Vec<Recommendation>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = Self::build_prompt(query, candidates, tool);
        let options = GenerationOptions {
            temperature: VERIFY_TEMPERATURE,
            json_mode: true,
            use_search: false,
        };

        let verdict = self.gateway.generate(&prompt, options).await?;
        let accepted: HashSet<String> = verdict
            .recommendations
            .iter()
            .map(|rec| name_key(&rec.name))
            .collect();

        let filtered: Vec<Recommendation> = candidates
            .iter()
            .filter(|rec| accepted.contains(&name_key(&rec.name)))
            .cloned()
            .collect();

        tracing::debug!(
            tool = %tool,
            candidates = candidates.len(),
            accepted = filtered.len(),
            "Verification completed"
        );

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::GatewayResponse;
    use crate::services::providers::MockAiGateway;

    fn candidates() -> Vec<Recommendation> {
        vec![
            Recommendation::named("Thai Kitchen"),
            Recommendation::named("Burger Barn"),
            Recommendation::named("Lotus Thai"),
        ]
    }

    #[tokio::test]
    async fn test_verify_keeps_original_records_by_name() {
        let mut gateway = MockAiGateway::new();
        gateway
            .expect_generate()
            .withf(|prompt, options| {
                prompt.contains("cuisine: Thai")
                    && prompt.contains("Burger Barn")
                    && options.json_mode
                    && !options.use_search
            })
            .times(1)
            .returning(|_, _| {
                Ok(GatewayResponse {
                    recommendations: vec![
                        Recommendation::named("thai kitchen "),
                        Recommendation::named("Lotus Thai"),
                        Recommendation::named("Invented Place"),
                    ],
                })
            });

        let verifier = LlmVerifier::new(Arc::new(gateway));
        let original = candidates();
        let filtered = verifier
            .verify("cuisine: Thai", &original, ToolId::Dining)
            .await
            .unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].name, "Thai Kitchen");
        assert_eq!(filtered[1].name, "Lotus Thai");
    }

    #[tokio::test]
    async fn test_verify_empty_candidates_skips_backend() {
        let gateway = MockAiGateway::new();
        let verifier = LlmVerifier::new(Arc::new(gateway));

        let filtered = verifier.verify("anything", &[], ToolId::Bar).await.unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn test_verify_propagates_backend_errors() {
        let mut gateway = MockAiGateway::new();
        gateway
            .expect_generate()
            .returning(|_, _| Err(AppError::ExternalApi("quota".to_string())));

        let verifier = LlmVerifier::new(Arc::new(gateway));
        let result = verifier
            .verify("cuisine: Thai", &candidates(), ToolId::Dining)
            .await;

        assert!(result.is_err());
    }
}
