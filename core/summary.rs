//! Per-directory `SUMMARY` generation.
//!
//! Each directory's summary is its own eligible files, serialized in name
//! order, followed by the complete summaries of its child directories in name
//! order. Directories are composed on the way back up a depth-first walk, so a
//! parent always sees finished child summaries. Child text is carried in memory
//! rather than read back from disk.
//!
//! Composition may run subtrees in parallel; writing never does. Composed
//! summaries are collected into a post-order plan and written one at a time
//! afterwards, so the files on disk never depend on thread timing.
//!
//! Record format, one per file:
//!
//! ```text
//! ---
//! File: src/main.rs
//! ---
//! <content>
//!
//! ```

use crate::config::{ResolvedConfig, SUMMARY_FILENAME};
use crate::eligibility::EligibilityChecker;
use crate::error::{AppError, Result};
use crate::filter::{PathFilter, build_filter, to_slash};
use crate::mapping::DirectoryMapper;
use crate::scan::{DirectoryNode, FileNode, scan_directory};
use log;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const RECORD_DELIMITER: &str = "---";
pub const FILE_HEADER_PREFIX: &str = "File: ";

/// Set to `true` to stop a run before the next directory is started.
pub type CancellationFlag = Arc<AtomicBool>;

type ProgressFn = Box<dyn Fn(&SummaryArtifact) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryArtifact {
    /// Source directory relative to the root.
    pub source_dir: PathBuf,
    /// Absolute location of the written `SUMMARY`.
    pub output_path: PathBuf,
    pub bytes: usize,
}

/// Serializes the given files, in the order given, into delimited records.
/// Files that cannot be read are skipped.
pub fn compose_direct_summary(root: &Path, files: &[&FileNode]) -> String {
    let mut summary = String::new();
    for file in files {
        let bytes = match fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Error reading {}: {}", file.path.display(), e);
                continue;
            }
        };
        let relative = pathdiff::diff_paths(&file.path, root)
            .unwrap_or_else(|| file.relative_path.clone());
        let content = String::from_utf8_lossy(&bytes);

        summary.push_str(RECORD_DELIMITER);
        summary.push('\n');
        summary.push_str(FILE_HEADER_PREFIX);
        summary.push_str(&to_slash(&relative));
        summary.push('\n');
        summary.push_str(RECORD_DELIMITER);
        summary.push('\n');
        summary.push_str(&content);
        summary.push_str("\n\n");
    }
    summary
}

/// A composed summary waiting to be written.
#[derive(Debug)]
struct PlannedWrite {
    source_dir: PathBuf,
    text: String,
}

struct DirectoryOutcome {
    text: String,
    /// Post-order: children before parents, siblings in name order.
    planned: Vec<PlannedWrite>,
}

pub struct SummaryGenerator {
    root: PathBuf,
    config: ResolvedConfig,
    filter: Box<dyn PathFilter>,
    mapper: DirectoryMapper,
    cancel: Option<CancellationFlag>,
    progress: Option<ProgressFn>,
}

impl SummaryGenerator {
    pub fn new(root: impl Into<PathBuf>, config: ResolvedConfig) -> Self {
        let filter = build_filter(&config.exclude_patterns, config.pattern_engine);
        Self {
            root: root.into(),
            config,
            filter,
            mapper: DirectoryMapper::default(),
            cancel: None,
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Called after each `SUMMARY` is written, in write order.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&SummaryArtifact) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Writes a `SUMMARY` for every included directory with eligible content
    /// anywhere below it and returns the written artifacts, children before
    /// parents.
    ///
    /// Only an unreadable root or cancellation fails the run; a directory whose
    /// summary cannot be written is logged and left out of the result.
    pub fn generate_all(&self) -> Result<Vec<SummaryArtifact>> {
        log::info!("Starting summary generation in {}", self.root.display());
        let tree = scan_directory(&self.root, self.filter.as_ref())?;

        let checker = EligibilityChecker::new(&self.root, self.filter.as_ref(), &self.config);
        let outcome = self.compose_directory(&tree, &checker)?;
        let skipped = self.resolve_collisions(&outcome.planned);

        let mut artifacts = Vec::new();
        for planned in &outcome.planned {
            if skipped.contains(&planned.source_dir) {
                continue;
            }
            if self.is_cancelled() {
                log::warn!("Generation cancelled after {} summaries", artifacts.len());
                return Err(AppError::Cancelled);
            }
            match self.write_artifact(planned) {
                Ok(artifact) => {
                    if let Some(progress) = &self.progress {
                        progress(&artifact);
                    }
                    artifacts.push(artifact);
                }
                Err(e) => log::error!(
                    "Skipping summary for {}: {}",
                    planned.source_dir.display(),
                    e
                ),
            }
        }
        log::info!("Generated {} summaries", artifacts.len());
        Ok(artifacts)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Sources that lose an output-path collision. The last claimant in
    /// post-order keeps the path.
    fn resolve_collisions(&self, planned: &[PlannedWrite]) -> HashSet<PathBuf> {
        let sources: Vec<PathBuf> = planned.iter().map(|p| p.source_dir.clone()).collect();
        let mut skipped = HashSet::new();
        for (_, claimants) in self.mapper.find_collisions(&sources) {
            if let Some((_winner, losers)) = claimants.split_last() {
                skipped.extend(losers.iter().cloned());
            }
        }
        skipped
    }

    fn compose_directory(
        &self,
        dir: &DirectoryNode,
        checker: &EligibilityChecker<'_>,
    ) -> Result<DirectoryOutcome> {
        if self.is_cancelled() {
            log::warn!("Generation cancelled before {}", dir.path.display());
            return Err(AppError::Cancelled);
        }

        let children: Vec<DirectoryOutcome> = if self.config.parallel {
            dir.dirs
                .par_iter()
                .map(|child| self.compose_directory(child, checker))
                .collect::<Result<Vec<_>>>()?
        } else {
            dir.dirs
                .iter()
                .map(|child| self.compose_directory(child, checker))
                .collect::<Result<Vec<_>>>()?
        };

        let eligible: Vec<&FileNode> = dir
            .files
            .iter()
            .filter(|f| checker.is_eligible_file(&f.path))
            .collect();
        log::debug!(
            "{}: {} eligible files, {} subdirectories",
            dir.path.display(),
            eligible.len(),
            dir.dirs.len()
        );

        let mut text = compose_direct_summary(&self.root, &eligible);
        let mut planned = Vec::new();
        for child in children {
            text.push_str(&child.text);
            planned.extend(child.planned);
        }

        if text.is_empty() {
            log::trace!("No content for {}, skipping", dir.path.display());
        } else if !self.filter.is_included(&dir.relative_path, true) {
            // Re-included content still reaches the nearest included ancestor.
            log::debug!(
                "Not writing a summary into excluded directory {}",
                dir.path.display()
            );
        } else {
            planned.push(PlannedWrite {
                source_dir: dir.relative_path.clone(),
                text: text.clone(),
            });
        }
        Ok(DirectoryOutcome { text, planned })
    }

    fn write_artifact(&self, planned: &PlannedWrite) -> Result<SummaryArtifact> {
        let output_dir = self
            .root
            .join(self.mapper.map_output_path(&planned.source_dir));
        fs::create_dir_all(&output_dir).map_err(|e| AppError::DirCreation {
            path: output_dir.clone(),
            source: e,
        })?;
        let output_path = output_dir.join(SUMMARY_FILENAME);
        fs::write(&output_path, &planned.text).map_err(|e| AppError::FileWrite {
            path: output_path.clone(),
            source: e,
        })?;
        log::info!(
            "Generated summary for {} -> {}",
            planned.source_dir.display(),
            output_path.display()
        );
        Ok(SummaryArtifact {
            source_dir: planned.source_dir.clone(),
            output_path,
            bytes: planned.text.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(root: &Path, rel: &str) -> String {
        fs::read_to_string(root.join(rel).join(SUMMARY_FILENAME)).unwrap()
    }

    fn has_summary(root: &Path, rel: &str) -> bool {
        root.join(rel).join(SUMMARY_FILENAME).exists()
    }

    fn generator(root: &Path, patterns: &[&str]) -> SummaryGenerator {
        let config = ResolvedConfig {
            exclude_patterns: patterns.iter().map(|s| s.to_string()).collect(),
            ..ResolvedConfig::default()
        };
        SummaryGenerator::new(root, config)
    }

    fn frontend(root: &Path) {
        write(root, "frontend/src/js/main.js", "console.log('main');");
        write(root, "frontend/src/js/utils.js", "export function util() {}");
        write(root, "frontend/src/styles/main.css", "body { color: black; }");
        write(root, "frontend/src/styles/utils.css", ".util { display: none; }");
        write(root, "frontend/src/templates/index.html", "<html><body></body></html>");
        write(root, "frontend/src/templates/footer.html", "<footer></footer>");
    }

    fn all_summaries(root: &Path) -> BTreeMap<PathBuf, String> {
        let mut out = BTreeMap::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.file_name().is_some_and(|n| n == SUMMARY_FILENAME) {
                    out.insert(path.clone(), fs::read_to_string(&path).unwrap());
                }
            }
        }
        out
    }

    #[test]
    fn test_record_format() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "hello");
        generator(dir.path(), &[".git/"]).generate_all().unwrap();
        assert_eq!(read(dir.path(), ""), "---\nFile: a.txt\n---\nhello\n\n");
    }

    #[test]
    fn test_scenario_nested_js_and_styles() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/js/main.js", "console.log('main');");
        write(dir.path(), "src/styles/main.css", "body{}");
        generator(dir.path(), &[".git/"]).generate_all().unwrap();

        let js = read(dir.path(), "src/js");
        let styles = read(dir.path(), "src/styles");
        let src = read(dir.path(), "src");
        assert!(js.contains("File: src/js/main.js"));
        assert!(js.contains("console.log('main');"));
        let js_pos = src.find(&js).unwrap();
        let styles_pos = src.find(&styles).unwrap();
        assert!(js_pos < styles_pos);
    }

    #[test]
    fn test_containment_at_every_level() {
        let dir = TempDir::new().unwrap();
        frontend(dir.path());
        generator(dir.path(), &[".git/"]).generate_all().unwrap();

        let src = read(dir.path(), "frontend/src");
        let frontend = read(dir.path(), "frontend");
        for leaf in ["js", "styles", "templates"] {
            let leaf_summary = read(dir.path(), &format!("frontend/src/{}", leaf));
            assert!(src.contains(&leaf_summary));
            assert!(frontend.contains(&leaf_summary));
        }
        assert!(src.contains("---\nFile:"));
        assert!(read(dir.path(), "").contains(&frontend));
    }

    #[test]
    fn test_empty_parent_propagates_child_unchanged() {
        let dir = TempDir::new().unwrap();
        frontend(dir.path());
        generator(dir.path(), &[".git/"]).generate_all().unwrap();
        assert_eq!(read(dir.path(), "frontend/src"), read(dir.path(), "frontend"));
    }

    #[test]
    fn test_child_order_and_file_order() {
        let dir = TempDir::new().unwrap();
        frontend(dir.path());
        generator(dir.path(), &[".git/"]).generate_all().unwrap();

        let src = read(dir.path(), "frontend/src");
        let js_pos = src.find("File: frontend/src/js/").unwrap();
        let styles_pos = src.find("File: frontend/src/styles/").unwrap();
        let templates_pos = src.find("File: frontend/src/templates/").unwrap();
        assert!(js_pos < styles_pos && styles_pos < templates_pos);

        let templates = read(dir.path(), "frontend/src/templates");
        let footer = templates.find("footer.html").unwrap();
        let index = templates.find("index.html").unwrap();
        assert!(footer < index);
    }

    #[test]
    fn test_own_files_precede_child_blocks() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/z.txt", "own");
        write(dir.path(), "pkg/a/inner.txt", "child");
        generator(dir.path(), &[".git/"]).generate_all().unwrap();

        let pkg = read(dir.path(), "pkg");
        let child = read(dir.path(), "pkg/a");
        assert!(pkg.starts_with("---\nFile: pkg/z.txt\n---\nown\n\n"));
        assert!(pkg.ends_with(&child));
    }

    #[test]
    fn test_excluded_directory_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        frontend(dir.path());
        write(dir.path(), "frontend/src/__pycache__/cache.pyc", "cache content");
        generator(dir.path(), &[".git/", "__pycache__"])
            .generate_all()
            .unwrap();

        for (_, content) in all_summaries(dir.path()) {
            assert!(!content.contains("cache content"));
            assert!(!content.contains("__pycache__"));
        }
        assert!(!has_summary(dir.path(), "frontend/src/__pycache__"));
    }

    #[test]
    fn test_oversized_file_absent_everywhere() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "data/big.bin", &"b".repeat(2_000_000));
        write(dir.path(), "data/small.txt", "small");
        generator(dir.path(), &[".git/"]).generate_all().unwrap();

        assert!(!read(dir.path(), "data").contains("big.bin"));
        assert!(!read(dir.path(), "").contains("big.bin"));
        assert!(read(dir.path(), "").contains("small"));
    }

    #[test]
    fn test_empty_directory_writes_nothing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/main.rs", "fn main() {}");
        generator(dir.path(), &[".git/"]).generate_all().unwrap();
        let before = read(dir.path(), "src");

        fs::create_dir_all(dir.path().join("src/empty")).unwrap();
        generator(dir.path(), &[".git/"]).generate_all().unwrap();
        assert!(!has_summary(dir.path(), "src/empty"));
        assert_eq!(read(dir.path(), "src"), before);
    }

    #[test]
    fn test_ineligible_subtree_writes_nothing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "logs/a/app.log", "noise");
        write(dir.path(), "src/lib.rs", "pub fn f() {}");
        let artifacts = generator(dir.path(), &[".git/", "*.log"])
            .generate_all()
            .unwrap();
        assert!(!has_summary(dir.path(), "logs"));
        assert!(!has_summary(dir.path(), "logs/a"));
        let sources: Vec<_> = artifacts.iter().map(|a| a.source_dir.clone()).collect();
        assert_eq!(sources, vec![PathBuf::from("src"), PathBuf::new()]);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let dir = TempDir::new().unwrap();
        frontend(dir.path());
        write(dir.path(), ".github/workflows/ci.yml", "name: CI");
        generator(dir.path(), &[".git/"]).generate_all().unwrap();
        let first = all_summaries(dir.path());
        generator(dir.path(), &[".git/"]).generate_all().unwrap();
        let second = all_summaries(dir.path());
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let parallel_dir = TempDir::new().unwrap();
        let sequential_dir = TempDir::new().unwrap();
        frontend(parallel_dir.path());
        frontend(sequential_dir.path());

        let parallel = generator(parallel_dir.path(), &[".git/"]).generate_all().unwrap();
        let config = ResolvedConfig {
            parallel: false,
            ..ResolvedConfig::default()
        };
        let sequential = SummaryGenerator::new(sequential_dir.path(), config)
            .generate_all()
            .unwrap();

        let rel = |artifacts: &[SummaryArtifact]| -> Vec<PathBuf> {
            artifacts.iter().map(|a| a.source_dir.clone()).collect()
        };
        assert_eq!(rel(&parallel), rel(&sequential));
        assert_eq!(read(parallel_dir.path(), ""), read(sequential_dir.path(), ""));
    }

    #[test]
    fn test_artifacts_listed_children_first() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/js/main.js", "js");
        write(dir.path(), "src/styles/main.css", "css");
        let artifacts = generator(dir.path(), &[".git/"]).generate_all().unwrap();
        let sources: Vec<_> = artifacts.iter().map(|a| a.source_dir.clone()).collect();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("src/js"),
                PathBuf::from("src/styles"),
                PathBuf::from("src"),
                PathBuf::new(),
            ]
        );
        assert_eq!(
            artifacts[0].output_path,
            dir.path().join("src/js").join(SUMMARY_FILENAME)
        );
    }

    #[test]
    fn test_workflows_written_to_visible_dir() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".github/workflows/ci.yml", "name: CI");
        write(dir.path(), ".github/other/notes.md", "notes");
        generator(dir.path(), &[".git/"]).generate_all().unwrap();

        assert!(has_summary(dir.path(), "github/workflows"));
        assert!(!has_summary(dir.path(), ".github/workflows"));
        assert!(read(dir.path(), "github/workflows").contains("File: .github/workflows/ci.yml"));
        assert!(has_summary(dir.path(), ".github/other"));
        assert!(read(dir.path(), ".github").contains("name: CI"));
    }

    #[test]
    fn test_write_failure_skips_only_that_directory() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".github/workflows/ci.yml", "name: CI");
        // A plain file where the mapped output directory would go.
        write(dir.path(), "github", "blocker");
        let artifacts = generator(dir.path(), &[".git/"]).generate_all().unwrap();

        assert!(!artifacts.iter().any(|a| a.source_dir == PathBuf::from(".github/workflows")));
        assert!(read(dir.path(), ".github").contains("name: CI"));
        assert!(read(dir.path(), "").contains("blocker"));
    }

    #[test]
    fn test_negation_reincludes_single_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendor/keep.txt", "kept");
        write(dir.path(), "vendor/drop.txt", "dropped");
        generator(dir.path(), &["vendor/", "!vendor/keep.txt"])
            .generate_all()
            .unwrap();
        let root = read(dir.path(), "");
        assert!(root.contains("kept"));
        assert!(!root.contains("dropped"));
    }

    #[test]
    fn test_excluded_directory_gets_no_summary() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendor/keep.txt", "kept");
        write(dir.path(), "vendor/drop.txt", "dropped");
        write(dir.path(), ".git/config", "[core]");
        write(dir.path(), ".git/HEAD", "ref: refs/heads/main");
        let artifacts = generator(dir.path(), &[".git/", "!.git/config", "vendor/", "!vendor/keep.txt"])
            .generate_all()
            .unwrap();

        assert!(!has_summary(dir.path(), "vendor"));
        assert!(!has_summary(dir.path(), ".git"));
        let sources: Vec<_> = artifacts.iter().map(|a| a.source_dir.clone()).collect();
        assert_eq!(sources, vec![PathBuf::new()]);
        let root = read(dir.path(), "");
        assert!(root.contains("File: vendor/keep.txt"));
        assert!(root.contains("File: .git/config"));
        assert!(!root.contains("refs/heads/main"));
    }

    #[test]
    fn test_rerun_claims_visible_dir_once() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".github/workflows/ci.yml", "name: CI");
        generator(dir.path(), &[".git/"]).generate_all().unwrap();
        // The first run created github/workflows holding only a SUMMARY.
        assert!(has_summary(dir.path(), "github/workflows"));

        let artifacts = generator(dir.path(), &[".git/"]).generate_all().unwrap();
        let claimants: Vec<_> = artifacts
            .iter()
            .filter(|a| a.output_path == dir.path().join("github/workflows").join(SUMMARY_FILENAME))
            .map(|a| a.source_dir.clone())
            .collect();
        assert_eq!(claimants, vec![PathBuf::from(".github/workflows")]);
        assert!(!artifacts.iter().any(|a| a.source_dir == PathBuf::from("github")));

        let sources: Vec<PathBuf> = artifacts.iter().map(|a| a.source_dir.clone()).collect();
        assert!(DirectoryMapper::default().find_collisions(&sources).is_empty());
    }

    #[test]
    fn test_collision_winner_is_stable_in_parallel() {
        for _ in 0..8 {
            let dir = TempDir::new().unwrap();
            write(dir.path(), ".github/workflows/ci.yml", "hidden workflow");
            write(dir.path(), "github/workflows/real.yml", "visible workflow");
            let config = ResolvedConfig {
                parallel: true,
                ..ResolvedConfig::default()
            };
            let artifacts = SummaryGenerator::new(dir.path(), config)
                .generate_all()
                .unwrap();

            let written = read(dir.path(), "github/workflows");
            assert!(written.contains("visible workflow"));
            assert!(!written.contains("hidden workflow"));
            assert!(!artifacts.iter().any(|a| a.source_dir == PathBuf::from(".github/workflows")));
            assert!(read(dir.path(), ".github").contains("hidden workflow"));
        }
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("latin1.txt"), [b'c', b'a', b'f', 0xe9]).unwrap();
        generator(dir.path(), &[".git/"]).generate_all().unwrap();
        assert!(read(dir.path(), "").contains("caf\u{FFFD}"));
    }

    #[test]
    fn test_cancelled_run_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "a");
        let flag: CancellationFlag = Arc::new(AtomicBool::new(true));
        let result = generator(dir.path(), &[".git/"])
            .with_cancellation(flag)
            .generate_all();
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(!has_summary(dir.path(), ""));
    }

    #[test]
    fn test_cancel_between_directories_keeps_earlier_writes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/js/main.js", "js");
        write(dir.path(), "src/styles/main.css", "css");
        let flag: CancellationFlag = Arc::new(AtomicBool::new(false));
        let trigger = Arc::clone(&flag);
        let config = ResolvedConfig {
            parallel: false,
            ..ResolvedConfig::default()
        };
        let result = SummaryGenerator::new(dir.path(), config)
            .with_cancellation(flag)
            .with_progress(move |_| trigger.store(true, Ordering::Relaxed))
            .generate_all();

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(has_summary(dir.path(), "src/js"));
        assert!(!has_summary(dir.path(), "src/styles"));
        assert!(!has_summary(dir.path(), "src"));
        assert!(!has_summary(dir.path(), ""));
    }

    #[test]
    fn test_progress_reports_every_write_in_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/x.txt", "x");
        write(dir.path(), "b/y.txt", "y");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let artifacts = generator(dir.path(), &[".git/"])
            .with_progress(move |a| sink.lock().unwrap().push(a.source_dir.clone()))
            .generate_all()
            .unwrap();
        let expected: Vec<PathBuf> = artifacts.iter().map(|a| a.source_dir.clone()).collect();
        assert_eq!(*seen.lock().unwrap(), expected);
    }

    #[test]
    fn test_inaccessible_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = generator(&dir.path().join("missing"), &[".git/"]).generate_all();
        assert!(matches!(result, Err(AppError::RootNotAccessible { .. })));
    }

    #[test]
    fn test_compose_direct_summary_skips_unreadable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "a");
        let present = FileNode {
            path: dir.path().join("a.txt"),
            relative_path: PathBuf::from("a.txt"),
            name: "a.txt".to_string(),
            size: 1,
            extension: Some("txt".to_string()),
        };
        let vanished = FileNode {
            path: dir.path().join("b.txt"),
            relative_path: PathBuf::from("b.txt"),
            name: "b.txt".to_string(),
            size: 1,
            extension: Some("txt".to_string()),
        };
        let text = compose_direct_summary(dir.path(), &[&present, &vanished]);
        assert_eq!(text, "---\nFile: a.txt\n---\na\n\n");
        assert_eq!(compose_direct_summary(dir.path(), &[]), "");
    }
}
