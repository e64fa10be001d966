//! Client-safety passes applied to every result before it leaves the pipeline

use std::collections::BTreeMap;

use crate::models::{GenerationResult, ToolId};

pub mod recipes;
pub mod urls;

pub use recipes::validate_recipe_responses;
pub use urls::normalize_venue_urls;

/// Recipe backfill, then link normalization
pub fn post_process(
    result: GenerationResult,
    tool: ToolId,
    target_location: &str,
    inputs: &BTreeMap<String, String>,
) -> GenerationResult {
    let result = validate_recipe_responses(result, tool);
    normalize_venue_urls(result, tool, target_location, inputs)
}
