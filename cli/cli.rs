mod cli_args;
mod commands;
mod output;
mod publish;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::Path;
use std::process;

use cli_args::{Cli, Commands, ProjectConfigOpts, SummarizeArgs};
use llamero_core::{AppError, Config, ResolvedConfig};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);

            // Config and argument problems are always shown, even when quiet.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::YamlError(_)) => 1,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::DirCreation { .. }) => 2,
        Some(AppError::RootNotAccessible { .. }) => 2,
        Some(AppError::Parse(_)) => 2,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(AppError::Publish(_)) => 7,
        Some(AppError::Cancelled) => 130,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Summarize(args) => {
                log::debug!("Executing 'summarize' command...");
                commands::summarize::handle_summarize_command(args, quiet)?;
            }
            Commands::Tree(args) => {
                log::debug!("Executing 'tree' command...");
                commands::tree::handle_tree_command(args, quiet)?;
            }
            Commands::Python(args) => {
                log::debug!("Executing 'python' command...");
                commands::python::handle_python_command(args, quiet)?;
            }
            Commands::Init(args) => {
                log::debug!("Executing 'init' command...");
                commands::init::handle_init_command(args, quiet)?;
            }
        },
    }
    Ok(())
}

/// Applies `summarize` flags on top of the resolved file/ignore settings.
fn merge_config_with_cli_overrides(
    mut resolved: ResolvedConfig,
    args: &SummarizeArgs,
) -> Result<ResolvedConfig> {
    log::trace!("Applying summarize command CLI overrides to config...");

    if let Some(size) = &args.max_file_size {
        resolved.max_file_size_bytes = llamero_core::config::parse_max_file_size(size)?;
    }
    if !args.exclude.is_empty() {
        resolved.exclude_patterns.extend(args.exclude.iter().cloned());
    }
    if !args.include_ext.is_empty() {
        resolved.include_extensions = Some(
            args.include_ext
                .iter()
                .map(|e| llamero_core::config::normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect(),
        );
    }
    if args.no_parallel {
        resolved.parallel = false;
    }

    log::trace!("Config after CLI overrides: {:?}", resolved);
    Ok(resolved)
}

pub fn load_config_for_command(project_root: &Path, project_opts: &ProjectConfigOpts) -> Result<Config> {
    Config::load(
        project_root,
        project_opts.config.as_ref(),
        project_opts.no_config,
    )
    .context("Failed to load configuration")
}
