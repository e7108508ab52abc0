pub mod settings;

pub use settings::{
    ApiKeys, HookConfig, JudgeTool, LlmSettings, LoggingConfig, Settings, ToolOverride,
    ToolOverrides, CONFIG_FILE_NAME,
};

use std::path::Path;

/// Load env vars from `<project_root>/.env` and `$(pwd)/.env`. Variables that
/// are already set are never overridden.
pub fn load_dotenv(project_root: &Path) {
    dotenvy::from_path(project_root.join(".env")).ok();
    dotenvy::dotenv().ok();
}
