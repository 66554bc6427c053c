use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify the config file (default: .llamero.toml, .llamero.yml or .llamero.yaml in the project root).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        help = "Ignore any config file and use the defaults.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate per-directory summaries of a project's files.",
    long_about = "llamero walks a project and writes a SUMMARY file into every directory that \nholds eligible content. Each SUMMARY holds the directory's own files followed by \nthe summaries of its subdirectories.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  llamero summarize\n  llamero summarize --exclude 'node_modules/' --max-file-size 500KB\n  llamero tree --save tree.txt\n  llamero python --save outline.md\n  llamero init",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "s",
        about = "Write a SUMMARY into every directory with eligible content."
    )]
    Summarize(SummarizeArgs),

    #[command(visible_alias = "t", about = "Print the filtered project tree.")]
    Tree(TreeArgs),

    #[command(
        visible_alias = "py",
        about = "Print an outline of Python functions, classes and methods."
    )]
    Python(PythonArgs),

    #[command(about = "Write the default config and ignore files.")]
    Init(InitArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SummarizeArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        long,
        help = "Print the written summaries as JSON.",
        help_heading = "Output Control"
    )]
    pub json: bool,

    #[arg(
        long,
        help = "Commit the written summaries with git.",
        help_heading = "Publishing"
    )]
    pub commit: bool,

    #[arg(
        long,
        requires = "commit",
        help = "Push after committing.",
        help_heading = "Publishing"
    )]
    pub push: bool,

    #[arg(
        long,
        help = "Process directories one at a time.",
        help_heading = "Generation"
    )]
    pub no_parallel: bool,

    #[arg(
        long,
        value_name = "SIZE_STRING",
        help = "Skip files larger than this (e.g., '500KB', '2MiB', 'unlimited').",
        help_heading = "Content Filtering"
    )]
    pub max_file_size: Option<String>,

    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add a gitignore-style exclude pattern.", help_heading = "Content Filtering")]
    pub exclude: Vec<String>,

    #[arg(long = "include-ext", value_name = "EXT", action = clap::ArgAction::Append, help = "Only include files with this extension (repeatable).", help_heading = "Content Filtering")]
    pub include_ext: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TreeArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        short = 's',
        long,
        value_name = "PATH",
        help = "Write the tree to a file instead of standard output.",
        help_heading = "Output Control"
    )]
    pub save: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PythonArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        short = 's',
        long,
        value_name = "PATH",
        help = "Write the outline to a file instead of standard output.",
        help_heading = "Output Control"
    )]
    pub save: Option<PathBuf>,

    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add a gitignore-style exclude pattern.", help_heading = "Content Filtering")]
    pub exclude: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(long, help = "Overwrite existing files.")]
    pub force: bool,
}
