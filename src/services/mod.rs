pub mod attempt;
pub mod orchestrator;
pub mod post_process;
pub mod providers;

pub use attempt::RetryPolicy;
pub use orchestrator::IdeaGenerator;
