use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::hooks_file::{self, shell_quote, Loaded};

/// Where and what to register
#[derive(Debug, Clone)]
pub struct HookTarget {
    /// Host hooks file, e.g. `~/.cursor/hooks.json`
    pub hooks_file: PathBuf,
    /// Project root; identifies this project's entries
    pub project_root: PathBuf,
    /// Full command line the host runs for each prompt
    pub command: String,
}

impl HookTarget {
    /// Target whose command is `<exe> hook --project-root <root>`
    pub fn for_executable(hooks_file: PathBuf, project_root: PathBuf, exe: &Path) -> Self {
        let command = format!(
            "{} hook --project-root {}",
            shell_quote(&exe.to_string_lossy()),
            shell_quote(&project_root.to_string_lossy())
        );
        Self {
            hooks_file,
            project_root,
            command,
        }
    }

    fn root_str(&self) -> String {
        self.project_root.to_string_lossy().into_owned()
    }

    fn entry(&self) -> Value {
        json!({ "command": self.command })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled,
    Installed,
    Reinstalled,
    Updated,
}

#[derive(Debug)]
pub struct InstallReport {
    pub outcome: InstallOutcome,
    /// Document as written (or as it would be written on a dry run)
    pub rendered: String,
    pub backup: Option<PathBuf>,
    pub written: bool,
}

/// Register the hook. Idempotent: an identical entry is left alone unless
/// `force` is set. A missing or corrupted file starts a fresh document.
pub fn install(target: &HookTarget, dry_run: bool, force: bool) -> Result<InstallReport> {
    let mut doc = match hooks_file::load(&target.hooks_file)? {
        Loaded::Document(doc) => doc,
        Loaded::Missing => {
            info!(path = ?target.hooks_file, "No hooks file found, creating a new one");
            hooks_file::empty_document()
        }
        Loaded::Corrupted(reason) => {
            warn!(
                path = ?target.hooks_file,
                reason = %reason,
                "Hooks file is corrupted, starting fresh"
            );
            hooks_file::empty_document()
        }
    };

    let root = target.root_str();
    let desired = target.entry();
    let mut entries = hooks_file::take_prompt_hooks(&mut doc);

    let outcome = match entries
        .iter()
        .position(|entry| hooks_file::is_project_entry(entry, &root))
    {
        Some(idx) if hooks_file::same_command(&entries[idx], &desired) && !force => {
            InstallOutcome::AlreadyInstalled
        }
        Some(idx) => {
            let outcome = if hooks_file::same_command(&entries[idx], &desired) {
                InstallOutcome::Reinstalled
            } else {
                InstallOutcome::Updated
            };
            entries[idx] = desired;
            outcome
        }
        None => {
            entries.push(desired);
            InstallOutcome::Installed
        }
    };
    hooks_file::set_prompt_hooks(&mut doc, entries);
    let rendered = hooks_file::render(&doc)?;

    if outcome == InstallOutcome::AlreadyInstalled || dry_run {
        return Ok(InstallReport {
            outcome,
            rendered,
            backup: None,
            written: false,
        });
    }

    let backup = hooks_file::create_backup(&target.hooks_file);
    hooks_file::write_atomic(&target.hooks_file, &doc)
        .context("Failed to write hooks file")?;
    info!(path = ?target.hooks_file, outcome = ?outcome, "Hook installed");

    Ok(InstallReport {
        outcome,
        rendered,
        backup,
        written: true,
    })
}

/// What uninstall did (or would do) with the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Rewritten with other prompt hooks preserved
    Rewritten { preserved: usize },
    /// Kept because other hook types remain, or `keep_empty` was requested
    Kept,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    NotInstalled,
    Removed { removed: usize, action: FileAction },
}

#[derive(Debug)]
pub struct UninstallReport {
    pub outcome: UninstallOutcome,
    /// Commands of the prompt hooks left in place
    pub remaining: Vec<String>,
    pub backup: Option<PathBuf>,
    pub written: bool,
}

impl UninstallReport {
    fn untouched(outcome: UninstallOutcome) -> Self {
        Self {
            outcome,
            remaining: Vec::new(),
            backup: None,
            written: false,
        }
    }
}

/// Remove every entry belonging to the project, preserving other entries
/// and other hook types. The file is deleted only when nothing is left.
pub fn uninstall(target: &HookTarget, dry_run: bool, keep_empty: bool) -> Result<UninstallReport> {
    let mut doc = match hooks_file::load(&target.hooks_file)? {
        Loaded::Missing => {
            info!(path = ?target.hooks_file, "No hooks file found, nothing to uninstall");
            return Ok(UninstallReport::untouched(UninstallOutcome::NotInstalled));
        }
        Loaded::Corrupted(reason) => {
            bail!("Hooks file {:?} is corrupted: {}", target.hooks_file, reason);
        }
        Loaded::Document(doc) => doc,
    };

    let root = target.root_str();
    let (ours, others): (Vec<Value>, Vec<Value>) = hooks_file::prompt_hooks(&doc)
        .iter()
        .cloned()
        .partition(|entry| hooks_file::is_project_entry(entry, &root));

    if ours.is_empty() {
        return Ok(UninstallReport::untouched(UninstallOutcome::NotInstalled));
    }

    let remaining: Vec<String> = others
        .iter()
        .map(|entry| {
            entry
                .get("command")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string()
        })
        .collect();

    let action = if !others.is_empty() {
        FileAction::Rewritten {
            preserved: others.len(),
        }
    } else if keep_empty || hooks_file::has_other_hook_types(&doc) {
        FileAction::Kept
    } else {
        FileAction::Deleted
    };
    let outcome = UninstallOutcome::Removed {
        removed: ours.len(),
        action,
    };

    if dry_run {
        return Ok(UninstallReport {
            outcome,
            remaining,
            backup: None,
            written: false,
        });
    }

    let backup = hooks_file::create_backup(&target.hooks_file);
    match action {
        FileAction::Rewritten { .. } => {
            hooks_file::set_prompt_hooks(&mut doc, others);
            hooks_file::write_atomic(&target.hooks_file, &doc)?;
        }
        FileAction::Kept => {
            hooks_file::take_prompt_hooks(&mut doc);
            if keep_empty {
                hooks_file::set_prompt_hooks(&mut doc, Vec::new());
            }
            hooks_file::write_atomic(&target.hooks_file, &doc)?;
        }
        FileAction::Deleted => {
            std::fs::remove_file(&target.hooks_file)
                .context(format!("Failed to delete hooks file: {:?}", target.hooks_file))?;
        }
    }
    info!(path = ?target.hooks_file, removed = ours.len(), action = ?action, "Hook uninstalled");

    Ok(UninstallReport {
        outcome,
        remaining,
        backup,
        written: true,
    })
}

/// True when the project has an entry in the prompt hook list
pub fn is_installed(doc: &Map<String, Value>, project_root: &Path) -> bool {
    let root = project_root.to_string_lossy();
    hooks_file::prompt_hooks(doc)
        .iter()
        .any(|entry| hooks_file::is_project_entry(entry, &root))
}
