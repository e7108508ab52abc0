use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Prompt Paladin configuration
# Environment variables override every value here
# (AUTO_CAST_HEAL, ANGER_TRANSLATOR, HOOK_TIMEOUT_SECS, HOOK_CALL_TIMEOUT_SECS,
#  DEFAULT_PROVIDER, DEFAULT_MODEL, PP_<TOOL>_PROVIDER, PP_<TOOL>_MODEL, LOG_LEVEL).
# API keys are read from ANTHROPIC_API_KEY, OPENAI_API_KEY and GROQ_API_KEY only.

[hook]
# Rewrite fixable prompts instead of blocking them
auto_cast_heal = true
# Translate hostile prompts into constructive ones during auto heal
anger_translator = true
# Hard deadline for one hook run; the prompt passes unchanged when exceeded
timeout_secs = 30.0
# Timeout for each judge call (kept below half the deadline)
call_timeout_secs = 12.0

[llm]
# anthropic | openai | groq
default_provider = "anthropic"
default_model = "claude-3-5-sonnet-20241022"
max_tokens = 2048

# Per-tool overrides: guard, heal, suggestions, discuss
# [llm.tools.heal]
# provider = "groq"
# model = "llama-3.3-70b-versatile"

[logging]
level = "warn"
# Also log to .paladin/hook.<date>.log in the project root (newest 3 kept)
file = true
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}
