use std::collections::BTreeMap;

use crate::{
    models::{
        active_filters, GenerationResult, PromptBundle, Recommendation, ToolId, TypeData,
    },
    services::providers::PromptCatalog,
};

/// Number of ideas requested per generation
const IDEA_COUNT: usize = 6;

/// Built-in prompt templates and offline mock sets
///
/// Deterministic by construction: no clock, no randomness, no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

/// What the model is asked to find for a tool
fn subject(tool: ToolId) -> &'static str {
    match tool {
        ToolId::Movie => "movies to watch",
        ToolId::Dining => "restaurants",
        ToolId::Bar => "bars",
        ToolId::Wellness => "spas and wellness experiences",
        ToolId::Fitness => "gyms and fitness classes",
        ToolId::Theatre => "theatre shows",
        ToolId::EscapeRoom => "escape rooms",
        ToolId::Sports => "live sports events",
        ToolId::WeekendEvents => "events happening this weekend",
        ToolId::Hotel => "hotels",
        ToolId::Nightclub => "nightclubs",
        ToolId::Concert => "concerts",
        ToolId::Recipe => "recipes to cook at home",
        ToolId::Chef => "dishes a home cook could make tonight",
        ToolId::Youtube => "YouTube videos",
        ToolId::Book => "books",
        ToolId::Game => "games",
        ToolId::Other => "date and activity ideas",
    }
}

fn output_contract(tool: ToolId) -> &'static str {
    if tool.is_recipe() {
        "Respond with JSON: {\"recommendations\": [{\"name\", \"description\", \"price\", \
         \"details\", \"typeData\": {\"ingredients\": [..], \"instructions\": \"..\"}}]}. \
         In details use markdown sections \"### Ingredients\" (one \"- \" bullet per item) \
         and \"### Instructions\"."
    } else if tool == ToolId::Youtube {
        "Respond with JSON: {\"recommendations\": [{\"name\", \"description\", \
         \"website\": \"<canonical youtube.com/watch URL>\"}]}."
    } else {
        "Respond with JSON: {\"recommendations\": [{\"name\", \"description\", \"price\", \
         \"address\", \"website\", \"google_rating\"}]}. Use only real, currently operating \
         places and leave website empty rather than guessing."
    }
}

fn build_prompt(
    tool: ToolId,
    inputs: &BTreeMap<String, String>,
    location: &str,
    query: &str,
    is_private: bool,
) -> String {
    let mut prompt = format!("Suggest {} {}", IDEA_COUNT, subject(tool));
    if !location.trim().is_empty() && !tool.is_recipe() {
        prompt.push_str(&format!(" near {}", location.trim()));
    }
    prompt.push_str(".\n");

    let filters: Vec<String> = active_filters(inputs)
        .map(|(key, value)| format!("- {}: {}", key, value))
        .collect();
    if !filters.is_empty() {
        prompt.push_str("Preferences:\n");
        prompt.push_str(&filters.join("\n"));
        prompt.push('\n');
    }

    if !query.trim().is_empty() {
        prompt.push_str(&format!("Additional instructions: {}\n", query.trim()));
    }

    if is_private {
        prompt.push_str("This is a private plan; favour low-key options over group bookings.\n");
    }

    prompt.push_str(output_contract(tool));
    prompt
}

fn mock_recommendations(tool: ToolId) -> Vec<Recommendation> {
    let entries: &[(&str, &str, &str)] = match tool {
        ToolId::Movie => &[
            ("The Grand Budapest Hotel", "Wes Anderson caper with a lobby boy", "$"),
            ("Arrival", "Linguist decodes an alien language", "$"),
        ],
        ToolId::Dining => &[
            ("The Corner Bistro", "Seasonal small plates", "$$"),
            ("Golden Lotus", "Family-run Thai kitchen", "$"),
            ("Harbor Grill", "Seafood with a view", "$$$"),
        ],
        ToolId::Bar | ToolId::Nightclub => &[
            ("The Velvet Room", "Cocktail lounge with live jazz", "$$"),
            ("Neon Social", "Late-night DJ sets", "$$"),
        ],
        ToolId::Wellness | ToolId::Fitness => &[
            ("Still Waters Spa", "Thermal pools and massage", "$$$"),
            ("Peak Studio", "Small-group strength classes", "$$"),
        ],
        ToolId::Theatre | ToolId::Concert | ToolId::Sports | ToolId::WeekendEvents => &[
            ("Summer Night Showcase", "Open-air performances", "$$"),
            ("City Derby", "Local rivalry match", "$$"),
        ],
        ToolId::EscapeRoom => &[
            ("The Vault", "60-minute heist puzzle", "$$"),
            ("Lost Expedition", "Jungle-themed adventure", "$$"),
        ],
        ToolId::Hotel => &[
            ("The Linden House", "Boutique stay in a restored townhouse", "$$$"),
            ("Canal Inn", "Cosy rooms by the water", "$$"),
        ],
        ToolId::Youtube => &[
            ("Knife Skills 101", "Basic cuts explained", "Free"),
            ("Ten Minute Yoga", "Morning stretch routine", "Free"),
        ],
        ToolId::Book | ToolId::Game | ToolId::Other => &[
            ("Project Hail Mary", "Science puzzle in deep space", "$"),
            ("Codenames", "Word-association party game", "$"),
        ],
        ToolId::Recipe | ToolId::Chef => return mock_recipes(),
    };

    entries
        .iter()
        .map(|(name, description, price)| {
            let mut rec = Recommendation::named(*name);
            rec.description = Some(description.to_string());
            rec.price = Some(price.to_string());
            if tool == ToolId::Youtube {
                rec.website = Some(format!(
                    "https://www.youtube.com/results?search_query={}",
                    name.replace(' ', "+")
                ));
            }
            rec
        })
        .collect()
}

fn mock_recipes() -> Vec<Recommendation> {
    let mut pancakes = Recommendation::named("Buttermilk Pancakes");
    pancakes.description = Some("Fluffy weekend breakfast".to_string());
    pancakes.price = Some("$".to_string());
    pancakes.details = Some(
        "### Ingredients\n- Flour\n- Buttermilk\n- Eggs\n- Butter\n\
         ### Instructions\nWhisk, rest the batter for 10 minutes, then cook on a hot griddle."
            .to_string(),
    );

    let mut pasta = Recommendation::named("Lemon Garlic Pasta");
    pasta.description = Some("Twenty-minute weeknight dinner".to_string());
    pasta.price = Some("$".to_string());
    pasta.type_data = Some(TypeData {
        ingredients: vec![
            "Spaghetti".to_string(),
            "Lemon".to_string(),
            "Garlic".to_string(),
            "Parmesan".to_string(),
        ],
        instructions: Some("Boil pasta. Toss with garlic oil, lemon and cheese.".to_string()),
        ..Default::default()
    });

    vec![pancakes, pasta]
}

impl PromptCatalog for StaticCatalog {
    fn prompt_and_mock(
        &self,
        tool: ToolId,
        inputs: &BTreeMap<String, String>,
        location: &str,
        query: &str,
        is_private: bool,
    ) -> PromptBundle {
        PromptBundle {
            prompt: build_prompt(tool, inputs, location, query, is_private),
            mock_response: GenerationResult::from_recommendations(mock_recommendations(tool)),
        }
    }
}
