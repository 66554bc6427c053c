use llamero_core::{AppError, Result};
use log;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const COMMIT_MESSAGE: &str = "Update summaries";

/// Stages and commits `paths` in the repository at `project_root`, then pushes
/// when asked. Returns `false` when there was nothing to commit.
pub fn commit_and_push(project_root: &Path, paths: &[PathBuf], push: bool) -> Result<bool> {
    if paths.is_empty() {
        log::info!("No summaries to commit");
        return Ok(false);
    }

    let mut status_args = vec!["status".to_string(), "--porcelain".to_string(), "--".to_string()];
    status_args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
    let status = run_git(project_root, &status_args)?;
    if status.trim().is_empty() {
        log::info!("Summaries unchanged, nothing to commit");
        return Ok(false);
    }

    let mut add_args = vec!["add".to_string(), "--".to_string()];
    add_args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
    run_git(project_root, &add_args)?;
    run_git(
        project_root,
        &["commit".to_string(), "-m".to_string(), COMMIT_MESSAGE.to_string()],
    )?;
    log::info!("Committed {} summaries", paths.len());

    if push {
        run_git(project_root, &["push".to_string()])?;
        log::info!("Pushed summary commit");
    }
    Ok(true)
}

fn run_git(project_root: &Path, args: &[String]) -> Result<String> {
    log::debug!("Running git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(project_root)
        .output()
        .map_err(|e| AppError::Publish(format!("Failed to run git: {}", e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Publish(format!(
            "git {} failed: {}",
            args.first().map(String::as_str).unwrap_or_default(),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
