use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressStyle};
use llamero_core::SummaryArtifact;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(data).context("Failed to serialize JSON output")?;
    write_to_stdout(&content)
}

pub fn print_artifacts_table(artifacts: &[SummaryArtifact], project_root: &Path) {
    println!();
    if artifacts.is_empty() {
        println!("{}", "(No directories with eligible content)".yellow());
        println!();
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Directory").fg(Color::Green),
        Cell::new("Summary").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
    ]);
    let mut total: u64 = 0;
    for artifact in artifacts {
        total += artifact.bytes as u64;
        let output = relative_display(&artifact.output_path, project_root);
        table.add_row(vec![
            Cell::new(display_dir(&artifact.source_dir)).fg(Color::Cyan),
            Cell::new(output).fg(Color::DarkGrey),
            Cell::new(readable_size(artifact.bytes as u64)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    println!(
        "{} {} summaries written ({})",
        "✅".green(),
        artifacts.len().to_string().cyan(),
        readable_size(total)
    );
    println!();
}

/// Spinner on stderr while summaries are written. Hidden when `hidden` is set.
pub fn progress_spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    match ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        Ok(style) => bar.set_style(style),
        Err(e) => log::debug!("Falling back to the default spinner style: {}", e),
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

pub fn print_saved(what: &str, path: &Path, quiet: bool) {
    if !quiet {
        println!(
            "{} {} saved to: {}",
            "✅".green(),
            what,
            path.display().to_string().blue()
        );
    }
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    if !content.ends_with('\n') {
        file.write_all(b"\n")
            .with_context(|| format!("Failed to write to file {}", path.display()))?;
    }
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn readable_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Decimal)
        .to_string()
}

fn display_dir(relative: &Path) -> String {
    if relative.as_os_str().is_empty() {
        ".".to_string()
    } else {
        relative.display().to_string()
    }
}

fn relative_display(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}
