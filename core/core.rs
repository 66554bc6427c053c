pub mod config;
pub mod eligibility;
pub mod error;
pub mod filter;
pub mod mapping;
pub mod python;
pub mod scan;
pub mod summary;
pub mod tree;

pub use config::{
    Config, PatternEngine, ResolvedConfig, ResolvedTreeConfig, SUMMARY_FILENAME,
    write_default_files,
};
pub use eligibility::EligibilityChecker;
pub use error::{AppError, Result};
pub use filter::{GlobFilter, PathFilter, SubstringFilter, build_filter};
pub use mapping::DirectoryMapper;
pub use python::{Signature, SignatureExtractor, SignatureKind, generate_python_summary};
pub use scan::{DirectoryNode, FileNode, scan_directory};
pub use summary::{CancellationFlag, SummaryArtifact, SummaryGenerator, compose_direct_summary};
pub use tree::{TreeNode, build_tree, generate_tree, render_tree};
