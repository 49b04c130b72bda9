pub mod config;
pub mod error;
pub mod files;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod state;
pub mod templates;
pub mod traits;

pub use config::{Config, GeminiConfig, OrchestratorConfig};
pub use error::{MemeError, Result};
pub use gemini::{GeminiClient, GeminiImageClient, TemplateClient};
pub use models::*;
pub use orchestrator::MemeOrchestrator;
pub use state::{Action, AppState};
pub use traits::{ImageFetcher, ImageGenerator};
