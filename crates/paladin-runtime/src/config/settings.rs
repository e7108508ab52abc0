use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm::ProviderKind;

/// Config file looked up in the project root when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "paladin.toml";

/// Slack kept between the two per-call timeouts and the hard deadline
const DEADLINE_MARGIN_SECS: f64 = 1.0;

/// Longest accepted deadline or per-call timeout (one day)
const MAX_TIMEOUT_SECS: f64 = 86_400.0;

/// Full configuration: `[hook]`, `[llm]` and `[logging]` tables plus API keys
/// taken from the environment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub hook: HookConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Never read from or written to the config file
    #[serde(skip)]
    pub api_keys: ApiKeys,
}

/// Tunables for the interception hook
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HookConfig {
    /// Rewrite `heal` prompts automatically instead of blocking them
    #[serde(default = "default_true")]
    pub auto_cast_heal: bool,

    /// Let auto heal pick the tone-translation template for hostile prompts
    #[serde(default = "default_true")]
    pub anger_translator: bool,

    /// Hard deadline for the whole hook invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Timeout for a single judge or heal call
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: f64,
}

/// Vendor and model selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmSettings {
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Empty = vendor default
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub tools: ToolOverrides,
}

/// Per-tool vendor overrides (`[llm.tools.guard]` etc.)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<ToolOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heal: Option<ToolOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<ToolOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discuss: Option<ToolOverride>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ToolOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write the hook log file under `<project>/.paladin/`
    #[serde(default = "default_true")]
    pub file: bool,
}

/// Vendor API keys, read from the environment only
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub groq: Option<String>,
}

/// The judge operations that can each use their own vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JudgeTool {
    Guard,
    Heal,
    Suggestions,
    Discuss,
}

impl JudgeTool {
    pub const ALL: [JudgeTool; 4] = [Self::Guard, Self::Heal, Self::Suggestions, Self::Discuss];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guard => "guard",
            Self::Heal => "heal",
            Self::Suggestions => "suggestions",
            Self::Discuss => "discuss",
        }
    }

    /// Prefix of the `<PREFIX>_PROVIDER` / `<PREFIX>_MODEL` variables
    fn env_prefix(&self) -> &'static str {
        match self {
            Self::Guard => "PP_GUARD",
            Self::Heal => "PP_HEAL",
            Self::Suggestions => "PP_SUGGESTIONS",
            Self::Discuss => "PP_DISCUSS",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> f64 {
    30.0
}

fn default_call_timeout_secs() -> f64 {
    12.0
}

fn default_provider() -> String {
    ProviderKind::Anthropic.as_str().to_string()
}

fn default_model() -> String {
    ProviderKind::Anthropic.default_model().to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            auto_cast_heal: default_true(),
            anger_translator: default_true(),
            timeout_secs: default_timeout_secs(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            tools: ToolOverrides::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_true(),
        }
    }
}

impl HookConfig {
    /// Hard deadline for one hook invocation
    pub fn deadline(&self) -> Duration {
        secs_or_default(self.timeout_secs, default_timeout_secs())
    }

    /// Timeout applied to each judge or heal call
    pub fn call_timeout(&self) -> Duration {
        secs_or_default(self.call_timeout_secs, default_call_timeout_secs())
    }

    /// Repair invalid timeouts and keep `2 * call_timeout < deadline`, so the
    /// inner timeouts fire before the backstop. Returns true if anything changed.
    pub fn enforce_deadline_budget(&mut self) -> bool {
        let mut changed = false;

        if !valid_secs(self.timeout_secs) {
            warn!(timeout_secs = self.timeout_secs, "Invalid hook timeout, using default");
            self.timeout_secs = default_timeout_secs();
            changed = true;
        }
        if !valid_secs(self.call_timeout_secs) {
            warn!(
                call_timeout_secs = self.call_timeout_secs,
                "Invalid call timeout, using default"
            );
            self.call_timeout_secs = default_call_timeout_secs();
            changed = true;
        }

        if 2.0 * self.call_timeout_secs >= self.timeout_secs {
            let budget = (self.timeout_secs - DEADLINE_MARGIN_SECS).max(self.timeout_secs * 0.8);
            let clamped = budget / 2.0;
            warn!(
                call_timeout_secs = self.call_timeout_secs,
                clamped_to = clamped,
                timeout_secs = self.timeout_secs,
                "Per-call timeout exceeds deadline budget, clamping"
            );
            self.call_timeout_secs = clamped;
            changed = true;
        }

        changed
    }
}

impl LlmSettings {
    pub fn tool_override(&self, tool: JudgeTool) -> Option<&ToolOverride> {
        match tool {
            JudgeTool::Guard => self.tools.guard.as_ref(),
            JudgeTool::Heal => self.tools.heal.as_ref(),
            JudgeTool::Suggestions => self.tools.suggestions.as_ref(),
            JudgeTool::Discuss => self.tools.discuss.as_ref(),
        }
    }

    fn tool_override_mut(&mut self, tool: JudgeTool) -> &mut ToolOverride {
        let slot = match tool {
            JudgeTool::Guard => &mut self.tools.guard,
            JudgeTool::Heal => &mut self.tools.heal,
            JudgeTool::Suggestions => &mut self.tools.suggestions,
            JudgeTool::Discuss => &mut self.tools.discuss,
        };
        slot.get_or_insert_with(ToolOverride::default)
    }

    pub fn default_provider_kind(&self) -> Result<ProviderKind> {
        ProviderKind::parse(&self.default_provider).ok_or_else(|| {
            anyhow!(
                "Unknown provider: {}. Supported: anthropic, openai, groq",
                self.default_provider
            )
        })
    }

    /// Resolve the vendor and model used for `tool`.
    ///
    /// A tool override wins when its vendor has a key; otherwise the default
    /// vendor is used. The model comes from the override, else the default
    /// model when the vendor is the default one, else the vendor default
    /// (empty string).
    pub fn resolve(&self, tool: JudgeTool, keys: &ApiKeys) -> Result<(ProviderKind, String)> {
        let default_kind = self.default_provider_kind()?;
        let tool_cfg = self.tool_override(tool);

        let override_kind = match tool_cfg.and_then(|t| t.provider.as_deref()) {
            Some(name) => match ProviderKind::parse(name) {
                Some(kind) if keys.get(kind).is_some() => Some(kind),
                Some(kind) => {
                    warn!(
                        tool = tool.as_str(),
                        provider = %kind,
                        "No API key for tool provider, using default"
                    );
                    None
                }
                None => {
                    warn!(
                        tool = tool.as_str(),
                        provider = name,
                        "Unknown tool provider, using default"
                    );
                    None
                }
            },
            None => None,
        };

        let kind = override_kind.unwrap_or(default_kind);
        let model = match tool_cfg.and_then(|t| t.model.clone()) {
            Some(model) => model,
            None if kind == default_kind => self.default_model.clone(),
            None => String::new(),
        };

        Ok((kind, model))
    }
}

impl ApiKeys {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |kind: ProviderKind| lookup(kind.api_key_var()).filter(|v| !v.trim().is_empty());
        Self {
            anthropic: read(ProviderKind::Anthropic),
            openai: read(ProviderKind::OpenAI),
            groq: read(ProviderKind::Groq),
        }
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::Anthropic => self.anthropic.as_deref(),
            ProviderKind::OpenAI => self.openai.as_deref(),
            ProviderKind::Groq => self.groq.as_deref(),
        }
    }

    pub fn has_any(&self) -> bool {
        ProviderKind::ALL.iter().any(|kind| self.get(*kind).is_some())
    }
}

impl Settings {
    /// Parse a TOML config document (API keys are not read here)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    /// Load settings: explicit path, else `<project_root>/paladin.toml` if it
    /// exists, else defaults. Environment overrides are applied on top and the
    /// deadline budget is enforced.
    pub fn load(path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::read_file(path)?,
            None => {
                let candidate = project_root.join(CONFIG_FILE_NAME);
                if candidate.exists() {
                    Self::read_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_env(|key| std::env::var(key).ok());
        settings.hook.enforce_deadline_budget();
        Ok(settings)
    }

    /// Defaults with environment overrides only. Used when the config file
    /// cannot be loaded.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings.hook.enforce_deadline_budget();
        settings
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
    }

    /// Apply environment overrides (env > file > default) and read API keys.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AUTO_CAST_HEAL") {
            self.hook.auto_cast_heal = parse_flag(&v);
        }
        if let Some(v) = lookup("ANGER_TRANSLATOR") {
            self.hook.anger_translator = parse_flag(&v);
        }
        if let Some(secs) =
            lookup("HOOK_TIMEOUT_SECS").and_then(|v| parse_secs("HOOK_TIMEOUT_SECS", &v))
        {
            self.hook.timeout_secs = secs;
        }
        if let Some(secs) =
            lookup("HOOK_CALL_TIMEOUT_SECS").and_then(|v| parse_secs("HOOK_CALL_TIMEOUT_SECS", &v))
        {
            self.hook.call_timeout_secs = secs;
        }

        if let Some(v) = lookup("DEFAULT_PROVIDER") {
            self.llm.default_provider = v;
        }
        if let Some(v) = lookup("DEFAULT_MODEL") {
            self.llm.default_model = v;
        }
        for tool in JudgeTool::ALL {
            let provider = lookup(&format!("{}_PROVIDER", tool.env_prefix()));
            let model = lookup(&format!("{}_MODEL", tool.env_prefix()));
            if provider.is_none() && model.is_none() {
                continue;
            }
            let slot = self.llm.tool_override_mut(tool);
            if provider.is_some() {
                slot.provider = provider;
            }
            if model.is_some() {
                slot.model = model;
            }
        }

        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v;
        }

        self.api_keys = ApiKeys::from_lookup(lookup);
    }
}

/// Flags are on only for the literal `true`, case-insensitively
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn valid_secs(secs: f64) -> bool {
    secs.is_finite() && secs > 0.0 && secs <= MAX_TIMEOUT_SECS
}

fn secs_or_default(secs: f64, default: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if valid_secs(secs) => duration,
        _ => {
            warn!(secs, default, "Timeout out of range, using default");
            Duration::from_secs_f64(default)
        }
    }
}

fn parse_secs(var: &str, value: &str) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(secs) if valid_secs(secs) => Some(secs),
        _ => {
            warn!(var, value, "Ignoring invalid timeout override");
            None
        }
    }
}
