use crate::models::{GenerationResult, Recommendation, ToolId};

const RECIPE_IDEA_TYPE: &str = "recipe";
const HOME_ADDRESS: &str = "At Home";
const INGREDIENTS_HEADING: &str = "### ingredients";
const INSTRUCTIONS_HEADING: &str = "### instructions";

/// Backfills the structured recipe shape the client understands
///
/// Generation sometimes returns well-formed `typeData` and sometimes only prose
/// with markdown headers in `details`. Identity for non-recipe tools.
pub fn validate_recipe_responses(mut result: GenerationResult, tool: ToolId) -> GenerationResult {
    if !tool.is_recipe() {
        return result;
    }

    for rec in &mut result.recommendations {
        backfill_recipe(rec);
    }

    result
}

fn backfill_recipe(rec: &mut Recommendation) {
    rec.idea_type = Some(RECIPE_IDEA_TYPE.to_string());

    let at_home = rec
        .address
        .as_deref()
        .map(|address| address.to_lowercase().contains("home"))
        .unwrap_or(false);
    if !at_home {
        rec.address = Some(HOME_ADDRESS.to_string());
    }

    let details = rec.details.clone().unwrap_or_default();
    let data = rec.type_data.get_or_insert_with(Default::default);

    if data.ingredients.is_empty() {
        if let Some(section) = markdown_section(&details, INGREDIENTS_HEADING) {
            data.ingredients = bullet_items(section);
        }
    }

    let has_instructions = data
        .instructions
        .as_deref()
        .map(|steps| !steps.trim().is_empty())
        .unwrap_or(false);
    if !has_instructions {
        data.instructions = markdown_section(&details, INSTRUCTIONS_HEADING)
            .map(str::trim)
            .filter(|steps| !steps.is_empty())
            .map(str::to_string);
    }

    if data.title.is_none() {
        data.title = Some(rec.name.clone());
    }
}

/// Body of the markdown section under `heading`, up to the next heading
///
/// `heading` must be lowercase ASCII; matching ignores ASCII case. The rest of
/// the heading line (e.g. a trailing colon) is skipped.
fn markdown_section<'a>(text: &'a str, heading: &str) -> Option<&'a str> {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let start = lowered.find(heading)?;

    let after_heading = &text[start + heading.len()..];
    let body = match after_heading.find('\n') {
        Some(newline) => &after_heading[newline + 1..],
        None => "",
    };

    if is_heading(body) {
        return Some("");
    }

    let end = body
        .match_indices('\n')
        .map(|(idx, _)| idx)
        .find(|&idx| is_heading(&body[idx + 1..]))
        .unwrap_or(body.len());

    Some(&body[..end])
}

fn is_heading(line: &str) -> bool {
    line.trim_start_matches([' ', '\t']).starts_with('#')
}

fn bullet_items(section: &str) -> Vec<String> {
    section
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('-'))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
