use clap::{Args, Parser, Subcommand, ValueEnum};
use paladin_runtime::{HealMode, PromptContext};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum HealModeArg {
    /// Rewrite for clarity and specificity
    Clarity,
    /// Translate a frustrated prompt into a constructive one
    Anger,
    /// Pick tone translation for hostile prompts, clarity otherwise
    Auto,
}

impl From<HealModeArg> for HealMode {
    fn from(arg: HealModeArg) -> Self {
        match arg {
            HealModeArg::Clarity => HealMode::Clarity,
            HealModeArg::Anger => HealMode::Anger,
            HealModeArg::Auto => HealMode::Auto,
        }
    }
}

/// Prompt plus optional editor context, shared by the judge subcommands
#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Prompt text
    pub prompt: String,

    /// Recent conversation, embedded verbatim
    #[arg(long)]
    pub history: Option<String>,

    /// Open file path (repeatable)
    #[arg(long = "active-file")]
    pub active_files: Vec<String>,

    /// Code currently selected in the editor
    #[arg(long)]
    pub selected_code: Option<String>,
}

impl PromptArgs {
    pub fn context(&self) -> PromptContext {
        PromptContext {
            conversation_history: self
                .history
                .clone()
                .map(paladin_runtime::judge::History::Text),
            active_files: self.active_files.clone(),
            selected_code: self.selected_code.clone(),
        }
    }
}

#[derive(Parser)]
#[command(name = "paladin")]
#[command(about = "Prompt Paladin - quality gate for prompts sent to coding agents")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (default: <project-root>/paladin.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read one hook event from stdin and write the decision to stdout
    Hook,
    /// Register the hook in the editor's hooks file
    Install {
        /// Hooks file to edit
        #[arg(long, default_value = paladin_adapters::DEFAULT_HOOKS_FILE)]
        hooks_file: String,
        /// Show the resulting file without writing it
        #[arg(long)]
        dry_run: bool,
        /// Rewrite the entry even if it is already installed
        #[arg(long)]
        force: bool,
    },
    /// Remove this project's hook from the editor's hooks file
    Uninstall {
        /// Hooks file to edit
        #[arg(long, default_value = paladin_adapters::DEFAULT_HOOKS_FILE)]
        hooks_file: String,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Keep an empty hook list instead of deleting the file
        #[arg(long)]
        keep_empty: bool,
    },
    /// Check configuration, API keys and hook registration
    Doctor {
        /// Hooks file to inspect
        #[arg(long, default_value = paladin_adapters::DEFAULT_HOOKS_FILE)]
        hooks_file: String,
    },
    /// Write a default config file
    Init {
        /// Path for new config file
        #[arg(default_value = "paladin.toml")]
        path: PathBuf,
    },
    /// Evaluate a prompt and print the verdict
    Guard(PromptArgs),
    /// Rewrite a prompt
    Heal {
        #[command(flatten)]
        prompt: PromptArgs,
        /// Heal template
        #[arg(long, default_value = "clarity", value_enum)]
        mode: HealModeArg,
    },
    /// Propose improved alternatives to a prompt
    Suggest(PromptArgs),
    /// Ask clarifying questions about a vague prompt
    Discuss(PromptArgs),
    /// Keep the original prompt as is
    Proceed {
        /// Prompt text
        prompt: String,
    },
}
