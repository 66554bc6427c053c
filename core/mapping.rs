use log;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

pub const HIDDEN_CI_DIR: &str = ".github";
pub const VISIBLE_CI_DIR: &str = "github";
pub const WORKFLOWS_DIR: &str = "workflows";

/// Rewrites source directories to the location their summary is written to.
///
/// A `.github` segment directly followed by `workflows` becomes `github`, so
/// workflow summaries land in a visible directory while the files are still
/// read from the hidden one. Every other path maps to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMapper {
    hidden: String,
    visible: String,
    trigger: String,
}

impl Default for DirectoryMapper {
    fn default() -> Self {
        Self::new(HIDDEN_CI_DIR, VISIBLE_CI_DIR, WORKFLOWS_DIR)
    }
}

impl DirectoryMapper {
    pub fn new(hidden: &str, visible: &str, trigger: &str) -> Self {
        Self {
            hidden: hidden.to_string(),
            visible: visible.to_string(),
            trigger: trigger.to_string(),
        }
    }

    /// `relative_dir` is relative to the tree root.
    pub fn map_output_path(&self, relative_dir: &Path) -> PathBuf {
        let parts: Vec<&std::ffi::OsStr> = relative_dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name),
                _ => None,
            })
            .collect();

        let mut mapped = PathBuf::new();
        for (i, part) in parts.iter().enumerate() {
            let followed_by_trigger = parts.get(i + 1).is_some_and(|next| *next == self.trigger.as_str());
            if *part == self.hidden.as_str() && followed_by_trigger {
                mapped.push(&self.visible);
            } else {
                mapped.push(part);
            }
        }
        mapped
    }

    /// Output paths claimed by more than one source directory, with the
    /// colliding sources in input order. Callers keep the last claimant.
    pub fn find_collisions(&self, relative_dirs: &[PathBuf]) -> Vec<(PathBuf, Vec<PathBuf>)> {
        let mut by_output: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
        let mut order = Vec::new();
        for dir in relative_dirs {
            let output = self.map_output_path(dir);
            let sources = by_output.entry(output.clone()).or_insert_with(|| {
                order.push(output.clone());
                Vec::new()
            });
            sources.push(dir.clone());
        }
        let collisions: Vec<_> = order
            .into_iter()
            .filter_map(|output| {
                let sources = by_output.remove(&output)?;
                (sources.len() > 1).then_some((output, sources))
            })
            .collect();
        for (output, sources) in &collisions {
            log::warn!(
                "Summary output {} is claimed by {:?}; keeping the last one",
                output.display(),
                sources
            );
        }
        collisions
    }
}
