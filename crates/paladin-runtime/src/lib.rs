pub mod config;
pub mod hooks;
pub mod judge;
pub mod llm;

pub use config::{HookConfig, JudgeTool, LoggingConfig, Settings};
pub use hooks::{run_hook, FailOpenEnvelope, HookEvent, HookResponse, VerdictDispatcher};
pub use judge::{
    DiscussResult, GuardResult, HealMode, HealResult, Judge, JudgeOptions, PromptContext,
    ProceedAck, SuggestionsResult, Verdict,
};
pub use llm::{
    AnthropicClient, GenerateConfig, GenerateResponse, LLMProvider, Message, OpenAIClient,
    ProviderKind, Role, StopReason, Usage,
};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Directory under the project root holding the hook log
pub const LOG_DIR_NAME: &str = ".paladin";
/// Daily log files are named `hook.<date>.log`
pub const LOG_FILE_PREFIX: &str = "hook";
pub const LOG_FILE_SUFFIX: &str = "log";
/// Older daily files are pruned beyond this count
pub const MAX_LOG_FILES: usize = 3;

const FILE_LOG_DIRECTIVES: &str =
    "debug,hyper=info,hyper_util=info,reqwest=info,h2=info,rustls=info";

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize structured JSON logging on stderr (stdout stays free for
/// command output)
pub fn init_logging(level: &str) {
    let _ = fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(level))
        .try_init();
}

/// Logging for the hook: JSON on stderr at the configured level plus a debug
/// file log rotated daily under `<project_root>/.paladin/`.
///
/// Falls back to stderr only when the log directory or file cannot be
/// created.
/// Returns the guard that flushes the file writer; keep it alive until the
/// response has been written.
pub fn init_hook_logging(project_root: &Path, config: &LoggingConfig) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(env_filter(&config.level));

    let log_dir = project_root.join(LOG_DIR_NAME);
    let appender = if config.file && std::fs::create_dir_all(&log_dir).is_ok() {
        hook_log_appender(&log_dir).ok()
    } else {
        None
    };
    let Some(appender) = appender else {
        let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
        return None;
    };

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(EnvFilter::new(FILE_LOG_DIRECTIVES));

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    Some(guard)
}

/// Daily-rotated `hook.<date>.log` keeping the newest `MAX_LOG_FILES` files
pub fn hook_log_appender(log_dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
}
