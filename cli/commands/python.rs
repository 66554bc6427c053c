use crate::cli_args::PythonArgs;
use crate::load_config_for_command;
use crate::output::{print_saved, write_to_file, write_to_stdout};
use anyhow::{Context, Result};
use log;
use llamero_core::{Config, generate_python_summary};

pub fn handle_python_command(args: PythonArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config)?;
    let mut resolved = config.resolve_summary(&project_root);
    resolved.exclude_patterns.extend(args.exclude.iter().cloned());

    let outline = generate_python_summary(&project_root, &resolved)
        .context("Failed to generate Python summary")?;

    match &args.save {
        Some(path) => {
            write_to_file(path, &outline)?;
            print_saved("Python summary", path, quiet);
        }
        None => write_to_stdout(&outline)?,
    }
    Ok(())
}
