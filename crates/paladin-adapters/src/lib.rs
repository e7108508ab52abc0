pub mod hooks_file;
pub mod installer;

pub use hooks_file::{Loaded, PROMPT_EVENT};
pub use installer::{
    install, is_installed, uninstall, FileAction, HookTarget, InstallOutcome, InstallReport,
    UninstallOutcome, UninstallReport,
};

use std::path::PathBuf;

/// Default host hooks file, relative to the home directory
pub const DEFAULT_HOOKS_FILE: &str = "~/.cursor/hooks.json";

/// Expand a leading `~` in a user-supplied path. Environment variables are
/// left as written.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
