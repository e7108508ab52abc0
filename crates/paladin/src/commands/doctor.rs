use anyhow::{bail, Result};
use paladin_adapters::{expand_path, is_installed, Loaded};
use paladin_runtime::{JudgeTool, ProviderKind, Settings};
use std::path::Path;

/// Print the resolved configuration and fail when the judge cannot work
pub fn execute(settings: &Settings, project_root: &Path, hooks_file: &str) -> Result<()> {
    println!("Project root: {}", project_root.display());
    let config_file = project_root.join(paladin_runtime::config::CONFIG_FILE_NAME);
    if config_file.exists() {
        println!("Config file:  {}", config_file.display());
    } else {
        println!("Config file:  none (defaults and environment)");
    }

    println!("\n[hook]");
    println!("  auto_cast_heal    = {}", settings.hook.auto_cast_heal);
    println!("  anger_translator  = {}", settings.hook.anger_translator);
    println!("  timeout_secs      = {:.1}", settings.hook.timeout_secs);
    println!("  call_timeout_secs = {:.1}", settings.hook.call_timeout_secs);

    println!("\n[api keys]");
    for kind in ProviderKind::ALL {
        let state = if settings.api_keys.get(kind).is_some() { "set" } else { "missing" };
        println!("  {:<18}{}", kind.api_key_var(), state);
    }

    println!("\n[providers]");
    for tool in JudgeTool::ALL {
        match settings.llm.resolve(tool, &settings.api_keys) {
            Ok((kind, model)) => {
                let model = if model.is_empty() { kind.default_model().to_string() } else { model };
                println!("  {:<12}{} / {}", tool.as_str(), kind, model);
            }
            Err(e) => println!("  {:<12}error: {}", tool.as_str(), e),
        }
    }

    let hooks_path = expand_path(hooks_file);
    println!("\n[hook registration]");
    match paladin_adapters::hooks_file::load(&hooks_path)? {
        Loaded::Document(doc) if is_installed(&doc, project_root) => {
            println!("  installed in {}", hooks_path.display())
        }
        Loaded::Document(_) | Loaded::Missing => {
            println!("  not installed (run `paladin install`)")
        }
        Loaded::Corrupted(reason) => {
            println!("  {} is corrupted: {}", hooks_path.display(), reason)
        }
    }

    check_keys(settings)?;
    println!("\nAll checks passed");
    Ok(())
}

/// At least one key, and one for the default provider
fn check_keys(settings: &Settings) -> Result<()> {
    if !settings.api_keys.has_any() {
        bail!("No API key configured. Set ANTHROPIC_API_KEY, OPENAI_API_KEY or GROQ_API_KEY");
    }
    let kind = settings.llm.default_provider_kind()?;
    if settings.api_keys.get(kind).is_none() {
        bail!(
            "Default provider '{}' has no API key. Set {} or change DEFAULT_PROVIDER",
            kind,
            kind.api_key_var()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paladin_runtime::config::ApiKeys;

    fn settings_with(keys: &[(&str, &str)]) -> Settings {
        let mut settings = Settings::default();
        settings.api_keys = ApiKeys::from_lookup(|var| {
            keys.iter()
                .find(|(k, _)| *k == var)
                .map(|(_, v)| v.to_string())
        });
        settings
    }

    #[test]
    fn test_no_keys_fails() {
        let err = check_keys(&settings_with(&[])).unwrap_err();
        assert!(err.to_string().contains("No API key"));
    }

    #[test]
    fn test_default_provider_needs_key() {
        let err = check_keys(&settings_with(&[("GROQ_API_KEY", "gsk-test")])).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let mut settings = settings_with(&[("GROQ_API_KEY", "gsk-test")]);
        settings.llm.default_provider = "groq".into();
        assert!(check_keys(&settings).is_ok());
    }
}
