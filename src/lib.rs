pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::{AppError, AppResult};
pub use models::{GenerationRequest, GenerationResult, Recommendation, ToolId};
pub use services::post_process::{normalize_venue_urls, validate_recipe_responses};
pub use services::IdeaGenerator;
