use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod gemini;
pub mod recommendation;
pub mod tool;

pub use recommendation::{Recommendation, TypeData};
pub use tool::ToolId;

/// Input key holding free-text instructions; never part of the filter summary
pub const EXTRA_INSTRUCTIONS_KEY: &str = "extraInstructions";
/// Config that requests pure generation even for search-grounded tools
pub const RECIPE_DISCOVERY_CONFIG: &str = "recipe_discovery";

/// One call into the pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub tool_key: ToolId,
    #[serde(default)]
    pub config_id: String,
    /// Filter selections; absent keys mean "any"
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
    #[serde(default)]
    pub target_location: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub extra_instructions: Option<String>,
    #[serde(default)]
    pub use_mock_data: bool,
}

impl GenerationRequest {
    pub fn new(tool_key: ToolId, target_location: impl Into<String>) -> Self {
        Self {
            tool_key,
            config_id: String::new(),
            inputs: BTreeMap::new(),
            target_location: target_location.into(),
            is_private: false,
            extra_instructions: None,
            use_mock_data: false,
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    /// Query seeding the first attempt
    pub fn base_query(&self) -> &str {
        self.extra_instructions.as_deref().unwrap_or("")
    }

    /// Human-readable summary of the filters the user actually set
    ///
    /// Skips free-text instructions, empty values and "any".
    pub fn filter_summary(&self) -> String {
        active_filters(&self.inputs)
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Filter inputs the user actually set, values trimmed, in key order
///
/// Free-text instructions, blank values and "any" don't narrow anything.
pub fn active_filters(inputs: &BTreeMap<String, String>) -> impl Iterator<Item = (&str, &str)> {
    inputs
        .iter()
        .map(|(key, value)| (key.as_str(), value.trim()))
        .filter(|(key, value)| {
            *key != EXTRA_INSTRUCTIONS_KEY && !value.is_empty() && !value.eq_ignore_ascii_case("any")
        })
}

/// What the pipeline hands back to the caller
///
/// `recommendations` is always present; an absent array on the wire reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GenerationMetadata>,
}

impl GenerationResult {
    pub fn from_recommendations(recommendations: Vec<Recommendation>) -> Self {
        Self {
            recommendations,
            metadata: None,
        }
    }
}

/// How a result was produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// Caller asked for mock data
    Mock,
    /// First attempt passed validation
    Validated,
    /// Result came from the strict second attempt
    StrictRetry,
    /// Both attempts came back empty
    MockFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub request_id: Uuid,
    pub attempts: u8,
    pub outcome: GenerationOutcome,
    pub search_grounded: bool,
    pub generated_at: DateTime<Utc>,
}

/// Options passed to the AI backend for a single call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub json_mode: bool,
    pub use_search: bool,
}

impl GenerationOptions {
    /// Mode for the first call of an attempt
    pub fn for_request(request: &GenerationRequest) -> Self {
        let use_search =
            request.tool_key.search_grounded() && request.config_id != RECIPE_DISCOVERY_CONFIG;
        Self {
            temperature: request.tool_key.temperature(),
            json_mode: !use_search,
            use_search,
        }
    }

    /// Same call with search grounding stripped
    pub fn without_search(self) -> Self {
        Self {
            json_mode: true,
            use_search: false,
            ..self
        }
    }
}

/// Best-effort structured response from the AI backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GatewayResponse {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Prompt plus deterministic mock set for one tool
#[derive(Debug, Clone, PartialEq)]
pub struct PromptBundle {
    pub prompt: String,
    pub mock_response: GenerationResult,
}
