use crate::config::ResolvedTreeConfig;
use crate::error::Result;
use crate::filter::{PathFilter, build_filter};
use crate::scan::{DirectoryNode, scan_directory};
use log;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_PREFIX: &str = "│   ";
const SPACE_PREFIX: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// Builds the filtered tree below `root`.
///
/// Returns `None` when nothing survives filtering and the root is not one of
/// the essential directories.
pub fn build_tree(root: &Path, config: &ResolvedTreeConfig) -> Result<Option<TreeNode>> {
    let filter = build_filter(&config.exclude_patterns, config.pattern_engine);
    let scanned = scan_directory(root, filter.as_ref())?;
    log::debug!(
        "Building tree for {} with {} exclude patterns",
        root.display(),
        config.exclude_patterns.len()
    );
    Ok(to_tree_node(&scanned, filter.as_ref(), &config.essential_dirs))
}

fn to_tree_node(
    dir: &DirectoryNode,
    filter: &dyn PathFilter,
    essential_dirs: &BTreeSet<String>,
) -> Option<TreeNode> {
    let mut children: Vec<TreeNode> = Vec::new();
    for sub in &dir.dirs {
        if let Some(node) = to_tree_node(sub, filter, essential_dirs) {
            children.push(node);
        }
    }
    for file in &dir.files {
        if filter.is_included(&file.relative_path, false) {
            children.push(TreeNode {
                name: file.name.clone(),
                is_dir: false,
                children: Vec::new(),
            });
        } else {
            log::trace!("Tree excludes file: {}", file.relative_path.display());
        }
    }
    children.sort_by(|a, b| a.name.cmp(&b.name));

    let is_root = dir.relative_path.as_os_str().is_empty();
    if !is_root && children.is_empty() && !filter.is_included(&dir.relative_path, true) {
        return None;
    }
    if children.is_empty() && !essential_dirs.contains(&dir.name) {
        log::trace!("Tree drops empty directory: {}", dir.relative_path.display());
        return None;
    }
    Some(TreeNode {
        name: dir.name.clone(),
        is_dir: true,
        children,
    })
}

/// Renders a tree with box-drawing connectors and no trailing newline.
pub fn render_tree(node: &TreeNode) -> String {
    let mut lines = vec![node.name.clone()];
    render_children(node, "", &mut lines);
    lines.join("\n")
}

fn render_children(node: &TreeNode, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{}{}{}", prefix, connector, child.name));
        if child.is_dir {
            let extension = if last { SPACE_PREFIX } else { PIPE_PREFIX };
            render_children(child, &format!("{}{}", prefix, extension), lines);
        }
    }
}

/// The rendered tree, or an empty string when everything was filtered out.
pub fn generate_tree(root: &Path, config: &ResolvedTreeConfig) -> Result<String> {
    Ok(build_tree(root, config)?
        .map(|node| render_tree(&node))
        .unwrap_or_default())
}
