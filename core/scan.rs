use crate::error::{AppError, Result};
use crate::filter::PathFilter;
use ignore::{WalkBuilder, WalkState};
use log;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub name: String,
    pub size: u64,
    pub extension: Option<String>,
}

/// A directory owns its children. Both lists are kept sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub name: String,
    pub files: Vec<FileNode>,
    pub dirs: Vec<DirectoryNode>,
}

impl DirectoryNode {
    fn new(path: PathBuf, relative_path: PathBuf, name: String) -> Self {
        Self {
            path,
            relative_path,
            name,
            files: Vec::new(),
            dirs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    /// Relative paths of this directory and every directory below it, pre-order.
    pub fn directory_paths(&self) -> Vec<PathBuf> {
        let mut out = vec![self.relative_path.clone()];
        for dir in &self.dirs {
            out.extend(dir.directory_paths());
        }
        out
    }
}

#[derive(Debug)]
struct WalkedPathInfo {
    path: PathBuf,
    relative_path: PathBuf,
    is_dir: bool,
    size: u64,
}

/// Takes a one-pass snapshot of `root`.
///
/// Excluded directories are pruned from the walk when the filter has no
/// negations; otherwise everything is walked because a later `!` pattern may
/// re-include something deep inside an excluded directory. Files are never
/// filtered here, eligibility is decided by the caller.
pub fn scan_directory(root: &Path, filter: &dyn PathFilter) -> Result<DirectoryNode> {
    fs::read_dir(root).map_err(|e| AppError::RootNotAccessible {
        path: root.to_path_buf(),
        source: e,
    })?;

    let prune_excluded = !filter.has_negations();
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .threads(rayon::current_num_threads().min(12));
    log::debug!(
        "Scanning {} (pruning excluded directories: {})",
        root.display(),
        prune_excluded
    );

    let (tx_walked, rx_walked) = mpsc::channel::<WalkedPathInfo>();
    builder.build_parallel().run(|| {
        let tx_thread = tx_walked.clone();
        Box::new(move |entry_result| {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Error walking directory: {}", e);
                    return WalkState::Continue;
                }
            };
            if entry.depth() == 0 {
                return WalkState::Continue;
            }
            let path = entry.path();
            let Some(relative_path) = pathdiff::diff_paths(path, root) else {
                log::warn!("Could not get relative path for: {}", path.display());
                return WalkState::Continue;
            };

            let Some(file_type) = entry.file_type() else {
                return WalkState::Continue;
            };
            let is_dir = file_type.is_dir();
            if !is_dir && !file_type.is_file() && !path.is_file() {
                log::trace!("Skipping special entry: {}", relative_path.display());
                return WalkState::Continue;
            }

            if is_dir && prune_excluded && !filter.is_included(&relative_path, true) {
                log::trace!("Pruning excluded directory: {}", relative_path.display());
                return WalkState::Skip;
            }

            let size = if is_dir {
                0
            } else {
                fs::metadata(path).map(|m| m.len()).unwrap_or(0)
            };
            let walked = WalkedPathInfo {
                path: path.to_path_buf(),
                relative_path,
                is_dir,
                size,
            };
            if tx_thread.send(walked).is_err() {
                log::error!("Receiver dropped for walked paths, stopping walk early.");
                return WalkState::Quit;
            }
            WalkState::Continue
        })
    });
    drop(tx_walked);

    let mut walked_paths: Vec<WalkedPathInfo> = rx_walked.into_iter().collect();
    walked_paths.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    log::debug!("Scan complete. Found {} entries.", walked_paths.len());

    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut root_node = DirectoryNode::new(root.to_path_buf(), PathBuf::new(), root_name);
    for walked in walked_paths {
        let components: Vec<String> = walked
            .relative_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if components.is_empty() {
            continue;
        }
        insert_node(&mut root_node, &components, &walked);
    }
    Ok(root_node)
}

fn insert_node(current: &mut DirectoryNode, components: &[String], walked: &WalkedPathInfo) {
    let name = &components[0];
    let remaining = &components[1..];

    if remaining.is_empty() && !walked.is_dir {
        let extension = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        let file = FileNode {
            path: walked.path.clone(),
            relative_path: walked.relative_path.clone(),
            name: name.clone(),
            size: walked.size,
            extension,
        };
        if let Err(idx) = current.files.binary_search_by(|f| f.name.cmp(name)) {
            current.files.insert(idx, file);
        }
        return;
    }

    let idx = match current.dirs.binary_search_by(|d| d.name.cmp(name)) {
        Ok(idx) => idx,
        Err(idx) => {
            let node = DirectoryNode::new(
                current.path.join(name),
                current.relative_path.join(name),
                name.clone(),
            );
            current.dirs.insert(idx, node);
            idx
        }
    };
    if !remaining.is_empty() {
        insert_node(&mut current.dirs[idx], remaining, walked);
    }
}
