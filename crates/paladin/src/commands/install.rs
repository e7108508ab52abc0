use anyhow::{Context, Result};
use paladin_adapters::{
    expand_path, install as install_hook, uninstall as uninstall_hook, FileAction, HookTarget,
    InstallOutcome, UninstallOutcome,
};
use std::path::Path;

fn target(hooks_file: &str, project_root: &Path) -> Result<HookTarget> {
    let exe = std::env::current_exe().context("Failed to locate the paladin executable")?;
    Ok(HookTarget::for_executable(
        expand_path(hooks_file),
        project_root.to_path_buf(),
        &exe,
    ))
}

pub fn install(hooks_file: &str, project_root: &Path, dry_run: bool, force: bool) -> Result<()> {
    let target = target(hooks_file, project_root)?;
    println!("Project root: {}", target.project_root.display());
    println!("Hooks file:   {}", target.hooks_file.display());

    let report = install_hook(&target, dry_run, force)?;

    if dry_run {
        println!("\nDry run, nothing written. Resulting file:\n");
        print!("{}", report.rendered);
        return Ok(());
    }
    if let Some(backup) = &report.backup {
        println!("Backup created: {}", backup.display());
    }

    match report.outcome {
        InstallOutcome::AlreadyInstalled => {
            println!("Hook is already installed (use --force to reinstall)")
        }
        InstallOutcome::Installed => println!("Hook installed"),
        InstallOutcome::Reinstalled => println!("Hook reinstalled"),
        InstallOutcome::Updated => println!("Existing hook entry updated"),
    }
    if report.written {
        println!("Command: {}", target.command);
        println!("Restart the editor to activate the hook");
    }
    Ok(())
}

pub fn uninstall(
    hooks_file: &str,
    project_root: &Path,
    dry_run: bool,
    keep_empty: bool,
) -> Result<()> {
    let target = target(hooks_file, project_root)?;
    println!("Project root: {}", target.project_root.display());
    println!("Hooks file:   {}", target.hooks_file.display());

    let report = uninstall_hook(&target, dry_run, keep_empty)?;

    let (removed, action) = match report.outcome {
        UninstallOutcome::NotInstalled => {
            println!("Hook is not installed");
            return Ok(());
        }
        UninstallOutcome::Removed { removed, action } => (removed, action),
    };

    let verb = if dry_run { "Would remove" } else { "Removed" };
    println!("{} {} hook entr{}", verb, removed, if removed == 1 { "y" } else { "ies" });

    match action {
        FileAction::Rewritten { preserved } => {
            println!("{} other hook(s) preserved:", preserved);
            for command in &report.remaining {
                println!("  - {}", command);
            }
        }
        FileAction::Kept => println!("Hooks file kept"),
        FileAction::Deleted if dry_run => {
            println!("Hooks file would be deleted (no remaining hooks)")
        }
        FileAction::Deleted => println!("Hooks file deleted (no remaining hooks)"),
    }
    if let Some(backup) = &report.backup {
        println!("Backup created: {}", backup.display());
    }
    Ok(())
}
