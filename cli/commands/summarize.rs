use crate::cli_args::SummarizeArgs;
use crate::output::{print_artifacts_table, print_json, progress_spinner};
use crate::{load_config_for_command, merge_config_with_cli_overrides, publish};
use anyhow::{Context, Result};
use colored::*;
use log;
use llamero_core::{Config, SummaryGenerator};
use std::path::PathBuf;

pub fn handle_summarize_command(args: SummarizeArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config)?;
    let resolved = merge_config_with_cli_overrides(config.resolve_summary(&project_root), &args)?;
    log::debug!("Effective summary settings: {:?}", resolved);

    let spinner = progress_spinner("Writing summaries...", quiet || args.json);
    let ticker = spinner.clone();
    let result = SummaryGenerator::new(&project_root, resolved)
        .with_progress(move |artifact| {
            let shown = if artifact.source_dir.as_os_str().is_empty() {
                ".".to_string()
            } else {
                artifact.source_dir.display().to_string()
            };
            ticker.set_message(format!("Summarized {}", shown));
        })
        .generate_all();
    spinner.finish_and_clear();
    let artifacts = result.context("Failed to generate summaries")?;

    if args.json {
        print_json(&artifacts)?;
    } else if !quiet {
        print_artifacts_table(&artifacts, &project_root);
    }

    if args.commit {
        let paths: Vec<PathBuf> = artifacts.iter().map(|a| a.output_path.clone()).collect();
        let committed = publish::commit_and_push(&project_root, &paths, args.push)
            .context("Failed to publish summaries")?;
        if committed && !quiet && !args.json {
            let action = if args.push { "committed and pushed" } else { "committed" };
            println!("{} Summaries {}", "✅".green(), action);
        }
    }
    Ok(())
}
