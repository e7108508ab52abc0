use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use paladin_runtime::{
    init_hook_logging, run_hook, FailOpenEnvelope, HookResponse, Judge, Settings,
    VerdictDispatcher,
};
use tracing::{error, info};

/// Handle one intercepted prompt. Exactly one JSON line goes to stdout,
/// whatever happens.
pub async fn execute(project_root: &Path, config_path: Option<&Path>) {
    let loaded = Settings::load(config_path, project_root);
    let logging = match &loaded {
        Ok(settings) => settings.logging.clone(),
        Err(_) => Settings::from_env().logging,
    };
    let log_guard = init_hook_logging(project_root, &logging);

    let settings = loaded.unwrap_or_else(|e| {
        error!(error = %format!("{:#}", e), "Config load failed, using defaults");
        Settings::from_env()
    });
    info!(
        project_root = %project_root.display(),
        auto_cast_heal = settings.hook.auto_cast_heal,
        timeout_secs = settings.hook.timeout_secs,
        call_timeout_secs = settings.hook.call_timeout_secs,
        "Hook invoked"
    );

    let envelope = FailOpenEnvelope::new(settings.hook.deadline());
    let dispatcher = Arc::new(VerdictDispatcher::new(
        Judge::from_settings(&settings),
        settings.hook.clone(),
    ));
    let response = run_hook(&envelope, dispatcher, tokio::io::stdin()).await;

    emit(&response);
    drop(log_guard);
}

fn emit(response: &HookResponse) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", response.to_json()).and_then(|_| stdout.flush()) {
        error!(error = %e, "Failed to write hook response");
    }
}
