/// Gemini generateContent gateway
///
/// Sends one prompt per call and recovers a recommendation list from the model
/// text. With search grounding enabled Gemini refuses a JSON response MIME type,
/// so the text may come back wrapped in prose or a fenced code block; the
/// extractor below copes with both.
use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{
        gemini::{
            GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse,
            GeminiTool,
        },
        GatewayResponse, GenerationOptions, Recommendation,
    },
    services::providers::AiGateway,
};

const JSON_MIME_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct GeminiGateway {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiGateway {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    fn build_request(&self, prompt: &str, options: GenerationOptions) -> GeminiRequest {
        let tools = if options.use_search {
            vec![GeminiTool {
                google_search: serde_json::json!({}),
            }]
        } else {
            Vec::new()
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature,
                response_mime_type: options.json_mode.then(|| JSON_MIME_TYPE.to_string()),
            },
            tools,
        }
    }
}

#[async_trait::async_trait]
impl AiGateway for GeminiGateway {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> AppResult<GatewayResponse> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Gemini API key is not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        );

        tracing::debug!(
            model = %self.model,
            use_search = options.use_search,
            json_mode = options.json_mode,
            temperature = options.temperature,
            "Calling Gemini"
        );

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.build_request(prompt, options))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Gemini request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(response = %response_text, "Raw Gemini API response");

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, "Failed to deserialize Gemini response");
            AppError::ExternalApi(format!("Failed to parse Gemini response: {}", e))
        })?;

        // A blocked or empty candidate is a zero-yield answer, not a failure
        let Some(text) = parsed.text() else {
            tracing::warn!(
                finish_reason = parsed.finish_reason().unwrap_or("none"),
                "Gemini returned no candidate text"
            );
            return Ok(GatewayResponse::default());
        };

        let recommendations = parse_recommendations(&text)?;

        tracing::info!(
            results = recommendations.len(),
            use_search = options.use_search,
            "Gemini generation completed"
        );

        Ok(GatewayResponse { recommendations })
    }
}

/// Pulls a recommendation list out of model text
///
/// Accepts `{"recommendations": [...]}`, a bare array, or either of those
/// embedded in a fenced block or surrounding prose. Entries that don't look
/// like recommendations are dropped.
pub fn parse_recommendations(text: &str) -> AppResult<Vec<Recommendation>> {
    let json = extract_json(text).ok_or_else(|| {
        AppError::ExternalApi("Model response did not contain JSON".to_string())
    })?;

    let value: Value = serde_json::from_str(json).map_err(|e| {
        AppError::ExternalApi(format!("Model response contained invalid JSON: {}", e))
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("recommendations") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Recommendation>(item) {
            Ok(rec) if !rec.name.trim().is_empty() => Some(rec),
            Ok(_) => {
                tracing::warn!("Dropping model entry without a name");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed model entry");
                None
            }
        })
        .collect())
}

fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();

    if let Some(fenced) = fenced_block(trimmed) {
        return extract_json(fenced);
    }

    let start = trimmed.find(['{', '['])?;
    let closing = if trimmed[start..].starts_with('{') {
        '}'
    } else {
        ']'
    };
    let end = trimmed.rfind(closing)?;
    (end > start).then(|| &trimmed[start..=end])
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // Skip the language tag line (```json)
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_gateway() -> GeminiGateway {
        GeminiGateway::new(
            "test_key".to_string(),
            "http://test.local".to_string(),
            "gemini-test".to_string(),
        )
    }

    #[test]
    fn test_parse_wrapped_object() {
        let text = r#"{"recommendations": [{"name": "Blue Note"}, {"name": "Smalls"}]}"#;
        let recs = parse_recommendations(text).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].name, "Smalls");
    }

    #[test]
    fn test_parse_bare_array() {
        let recs = parse_recommendations(r#"[{"name": "Dune"}]"#).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].name, "Dune");
    }

    #[test]
    fn test_parse_fenced_block_with_prose() {
        let text = "Here are some ideas:\n```json\n{\"recommendations\": [{\"name\": \"Rooftop Bar\", \"price\": \"$$\"}]}\n```\nEnjoy!";
        let recs = parse_recommendations(text).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].price.as_deref(), Some("$$"));
    }

    #[test]
    fn test_parse_drops_nameless_entries() {
        let text = r#"[{"name": ""}, {"description": "no name"}, {"name": "Kept"}]"#;
        let recs = parse_recommendations(text).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].name, "Kept");
    }

    #[test]
    fn test_parse_keeps_recipes_with_loose_ingredients() {
        let text = r#"[
            {"name": "Cake", "typeData": {"ingredients": "Eggs, Flour"}},
            {"name": "Soup", "typeData": {"ingredients": [{"item": "Water"}]}},
            {"name": "Toast"}
        ]"#;
        let recs = parse_recommendations(text).unwrap();

        let names: Vec<&str> = recs.iter().map(|rec| rec.name.as_str()).collect();
        assert_eq!(names, vec!["Cake", "Soup", "Toast"]);
        assert_eq!(
            recs[0].type_data.as_ref().unwrap().ingredients,
            vec!["Eggs", "Flour"]
        );
        assert_eq!(recs[1].type_data.as_ref().unwrap().ingredients, vec!["Water"]);
    }

    #[test]
    fn test_parse_object_without_recommendations_is_empty() {
        let recs = parse_recommendations(r#"{"message": "nothing found"}"#).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_parse_plain_prose_is_an_error() {
        let result = parse_recommendations("Sorry, I can't help with that.");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("did not contain JSON"));
    }

    #[test]
    fn test_build_request_json_mode() {
        let gateway = create_test_gateway();
        let request = gateway.build_request(
            "prompt",
            GenerationOptions {
                temperature: 0.3,
                json_mode: true,
                use_search: false,
            },
        );

        assert!(request.tools.is_empty());
        assert_eq!(
            request.generation_config.response_mime_type.as_deref(),
            Some(JSON_MIME_TYPE)
        );
    }

    #[test]
    fn test_build_request_search_mode() {
        let gateway = create_test_gateway();
        let request = gateway.build_request(
            "prompt",
            GenerationOptions {
                temperature: 0.7,
                json_mode: false,
                use_search: true,
            },
        );

        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.generation_config.response_mime_type, None);
    }

    #[tokio::test]
    async fn test_generate_without_api_key_fails() {
        let gateway = GeminiGateway::new(
            String::new(),
            "http://test.local".to_string(),
            "gemini-test".to_string(),
        );

        let result = gateway
            .generate(
                "prompt",
                GenerationOptions {
                    temperature: 0.7,
                    json_mode: true,
                    use_search: false,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
