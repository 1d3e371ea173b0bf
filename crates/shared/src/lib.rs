// Public modules
pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod models;
pub mod orchestrator;
pub mod publisher;
pub mod search;

// Re-export commonly used types
pub use config::{Config, PersonaConfig, RunSettings};
pub use error::PipelineError;
pub use generator::{ContentGenerator, GroqGenerator};
pub use history::{is_duplicate, normalize_title, HistoryStore};
pub use models::{GeneratedPost, HistoryEntry, RunOutcome, Topic};
pub use orchestrator::Orchestrator;
pub use publisher::{LinkedInClient, Publisher};
pub use search::{GoogleNewsClient, TopicSource};
