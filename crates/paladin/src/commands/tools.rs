//! One-shot judge operations for the terminal. Each prints its result as
//! pretty JSON on stdout.

use anyhow::{Context, Result};
use paladin_runtime::{HealMode, Judge, Settings};
use serde::Serialize;

use crate::cli::PromptArgs;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", text);
    Ok(())
}

pub async fn guard(settings: &Settings, args: &PromptArgs) -> Result<()> {
    let judge = Judge::from_settings(settings);
    print_json(&judge.evaluate(&args.prompt, &args.context()).await)
}

pub async fn heal(settings: &Settings, args: &PromptArgs, mode: HealMode) -> Result<()> {
    let judge = Judge::from_settings(settings);
    print_json(&judge.heal(&args.prompt, mode, &args.context()).await)
}

pub async fn suggest(settings: &Settings, args: &PromptArgs) -> Result<()> {
    let judge = Judge::from_settings(settings);
    print_json(&judge.suggestions(&args.prompt, &args.context()).await)
}

pub async fn discuss(settings: &Settings, args: &PromptArgs) -> Result<()> {
    let judge = Judge::from_settings(settings);
    print_json(&judge.discuss(&args.prompt, &args.context()).await)
}

pub fn proceed(prompt: &str) -> Result<()> {
    print_json(&Judge::proceed(prompt))
}
