use crate::cli_args::TreeArgs;
use crate::load_config_for_command;
use crate::output::{print_saved, write_to_file, write_to_stdout};
use anyhow::{Context, Result};
use log;
use llamero_core::{Config, generate_tree};

pub fn handle_tree_command(args: TreeArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config)?;
    let resolved = config.resolve_tree(&project_root);

    let tree = generate_tree(&project_root, &resolved).context("Failed to generate tree")?;
    if tree.is_empty() {
        log::warn!("Every entry under {} was filtered out", project_root.display());
    }

    match &args.save {
        Some(path) => {
            write_to_file(path, &tree)?;
            print_saved("Tree", path, quiet);
        }
        None => write_to_stdout(&tree)?,
    }
    Ok(())
}
