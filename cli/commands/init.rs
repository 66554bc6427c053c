use crate::cli_args::InitArgs;
use anyhow::{Context, Result};
use colored::*;
use llamero_core::{Config, write_default_files};

pub fn handle_init_command(args: InitArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_root.as_ref())
        .context("Failed to determine project root")?;

    let written = write_default_files(&project_root, args.force)
        .context("Failed to write default files")?;

    if quiet {
        return Ok(());
    }
    if written.is_empty() {
        println!(
            "{} Config files already exist, use {} to overwrite",
            "ℹ".yellow(),
            "--force".bold()
        );
    }
    for path in &written {
        println!("{} Created {}", "✅".green(), path.display().to_string().blue());
    }
    Ok(())
}
