use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Recommendation category selected by the caller
///
/// Drives prompt selection, generation mode and link post-processing. Keys the
/// pipeline does not know about deserialize to `Other` and take the default
/// behaviour everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolId {
    Movie,
    Dining,
    Bar,
    Wellness,
    Fitness,
    Theatre,
    EscapeRoom,
    Sports,
    WeekendEvents,
    Hotel,
    Nightclub,
    Concert,
    Recipe,
    Chef,
    Youtube,
    Book,
    Game,
    #[serde(other)]
    Other,
}

/// Sampling temperature for tools that generate content rather than discover venues
const CONTENT_TEMPERATURE: f32 = 0.3;
/// Discovery tools benefit from more varied phrasing
const DISCOVERY_TEMPERATURE: f32 = 0.7;

impl ToolId {
    pub const ALL: [ToolId; 18] = [
        ToolId::Movie,
        ToolId::Dining,
        ToolId::Bar,
        ToolId::Wellness,
        ToolId::Fitness,
        ToolId::Theatre,
        ToolId::EscapeRoom,
        ToolId::Sports,
        ToolId::WeekendEvents,
        ToolId::Hotel,
        ToolId::Nightclub,
        ToolId::Concert,
        ToolId::Recipe,
        ToolId::Chef,
        ToolId::Youtube,
        ToolId::Book,
        ToolId::Game,
        ToolId::Other,
    ];

    /// Wire name of the tool key
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Movie => "MOVIE",
            ToolId::Dining => "DINING",
            ToolId::Bar => "BAR",
            ToolId::Wellness => "WELLNESS",
            ToolId::Fitness => "FITNESS",
            ToolId::Theatre => "THEATRE",
            ToolId::EscapeRoom => "ESCAPE_ROOM",
            ToolId::Sports => "SPORTS",
            ToolId::WeekendEvents => "WEEKEND_EVENTS",
            ToolId::Hotel => "HOTEL",
            ToolId::Nightclub => "NIGHTCLUB",
            ToolId::Concert => "CONCERT",
            ToolId::Recipe => "RECIPE",
            ToolId::Chef => "CHEF",
            ToolId::Youtube => "YOUTUBE",
            ToolId::Book => "BOOK",
            ToolId::Game => "GAME",
            ToolId::Other => "OTHER",
        }
    }

    /// Temperature policy
    pub fn temperature(&self) -> f32 {
        match self {
            ToolId::Chef | ToolId::Recipe | ToolId::Movie | ToolId::Book | ToolId::Game => {
                CONTENT_TEMPERATURE
            }
            _ => DISCOVERY_TEMPERATURE,
        }
    }

    /// Search policy
    ///
    /// Recipes are pure generation and are never grounded in live search.
    pub fn search_grounded(&self) -> bool {
        !matches!(self, ToolId::Recipe)
    }

    /// URL-suffix policy
    ///
    /// Term appended to synthesized search links. Tools without a suffix are
    /// left alone by link normalization.
    pub fn url_suffix(&self) -> Option<&'static str> {
        match self {
            ToolId::Dining => Some("restaurant"),
            ToolId::Movie => Some("showtimes+near"),
            ToolId::Hotel => Some("booking.com"),
            ToolId::Bar => Some("bar"),
            ToolId::Nightclub => Some("nightclub"),
            ToolId::Wellness => Some("spa"),
            ToolId::Fitness => Some("gym"),
            ToolId::Theatre => Some("theatre+tickets"),
            ToolId::EscapeRoom => Some("escape+room"),
            ToolId::Sports => Some("tickets"),
            ToolId::WeekendEvents => Some("events"),
            ToolId::Concert => Some("concert+tickets"),
            ToolId::Recipe
            | ToolId::Chef
            | ToolId::Youtube
            | ToolId::Book
            | ToolId::Game
            | ToolId::Other => None,
        }
    }

    /// Recipe-like tools get structured field backfill
    pub fn is_recipe(&self) -> bool {
        matches!(self, ToolId::Recipe | ToolId::Chef)
    }
}

impl Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_id_serialization() {
        assert_eq!(
            serde_json::to_string(&ToolId::EscapeRoom).unwrap(),
            "\"ESCAPE_ROOM\""
        );
        assert_eq!(
            serde_json::to_string(&ToolId::WeekendEvents).unwrap(),
            "\"WEEKEND_EVENTS\""
        );
    }

    #[test]
    fn test_unknown_tool_falls_through_to_other() {
        let tool: ToolId = serde_json::from_str("\"KARAOKE\"").unwrap();
        assert_eq!(tool, ToolId::Other);
        assert_eq!(tool.temperature(), DISCOVERY_TEMPERATURE);
        assert!(tool.search_grounded());
        assert_eq!(tool.url_suffix(), None);
    }

    #[test]
    fn test_as_str_matches_wire_name() {
        for tool in ToolId::ALL.iter().filter(|t| **t != ToolId::Other) {
            let json = serde_json::to_string(tool).unwrap();
            assert_eq!(json, format!("\"{}\"", tool.as_str()));
        }
    }

    #[test]
    fn test_temperature_policy() {
        for tool in [
            ToolId::Chef,
            ToolId::Recipe,
            ToolId::Movie,
            ToolId::Book,
            ToolId::Game,
        ] {
            assert_eq!(tool.temperature(), 0.3, "{tool}");
        }
        assert_eq!(ToolId::Dining.temperature(), 0.7);
        assert_eq!(ToolId::Nightclub.temperature(), 0.7);
    }

    #[test]
    fn test_search_policy() {
        assert!(!ToolId::Recipe.search_grounded());
        assert!(ToolId::Chef.search_grounded());
        assert!(ToolId::Dining.search_grounded());
    }

    #[test]
    fn test_url_suffix_policy() {
        assert_eq!(ToolId::Dining.url_suffix(), Some("restaurant"));
        assert_eq!(ToolId::Movie.url_suffix(), Some("showtimes+near"));
        assert_eq!(ToolId::Hotel.url_suffix(), Some("booking.com"));
        assert_eq!(ToolId::Youtube.url_suffix(), None);
        assert_eq!(ToolId::Recipe.url_suffix(), None);
    }
}
