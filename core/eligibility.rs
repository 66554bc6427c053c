use crate::config::{ResolvedConfig, SUMMARY_FILENAME, normalize_extension};
use crate::filter::PathFilter;
use log;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Bytes inspected by the binary heuristic.
pub const BINARY_SNIFF_LEN: usize = 1024;

/// Decides whether a file's content is embedded in a summary.
pub struct EligibilityChecker<'a> {
    root: &'a Path,
    filter: &'a dyn PathFilter,
    max_file_size_bytes: Option<u64>,
    include_extensions: Option<&'a BTreeSet<String>>,
    detect_binary: bool,
}

impl<'a> EligibilityChecker<'a> {
    pub fn new(root: &'a Path, filter: &'a dyn PathFilter, config: &'a ResolvedConfig) -> Self {
        Self {
            root,
            filter,
            max_file_size_bytes: config.max_file_size_bytes,
            include_extensions: config.include_extensions.as_ref(),
            detect_binary: config.detect_binary,
        }
    }

    pub fn is_eligible_file(&self, path: &Path) -> bool {
        let relative = match path.strip_prefix(self.root) {
            Ok(rel) => rel,
            Err(_) => {
                log::debug!("Path outside of root, skipping: {}", path.display());
                return false;
            }
        };
        if !self.filter.is_included(relative, false) {
            log::trace!("Excluded by patterns: {}", relative.display());
            return false;
        }
        if relative.file_name().is_some_and(|n| n == SUMMARY_FILENAME) {
            log::trace!("Skipping generated summary: {}", relative.display());
            return false;
        }

        let metadata = match fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return false,
            Err(e) => {
                log::debug!("Skipping vanished file {}: {}", path.display(), e);
                return false;
            }
        };

        if let Some(max) = self.max_file_size_bytes {
            if metadata.len() > max {
                log::debug!(
                    "Excluding large file: {} ({} bytes)",
                    relative.display(),
                    metadata.len()
                );
                return false;
            }
        }

        if let Some(allowed) = self.include_extensions {
            let ext = path
                .extension()
                .map(|e| normalize_extension(&e.to_string_lossy()))
                .unwrap_or_default();
            if !allowed.contains(&ext) {
                log::trace!("Extension not in allow-list: {}", relative.display());
                return false;
            }
        }

        if self.detect_binary && looks_binary(path) {
            log::debug!("Excluding likely binary file: {}", relative.display());
            return false;
        }

        true
    }
}

/// True when the first KiB holds a NUL byte. Read failures count as text.
pub fn looks_binary(path: &Path) -> bool {
    let mut buf = [0u8; BINARY_SNIFF_LEN];
    let read = File::open(path).and_then(|mut f| {
        let mut total = 0;
        while total < buf.len() {
            let n = f.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    });
    match read {
        Ok(n) => buf[..n].contains(&0),
        Err(e) => {
            log::debug!("Error checking if binary: {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::GlobFilter;
    use tempfile::TempDir;

    fn config() -> ResolvedConfig {
        ResolvedConfig {
            exclude_patterns: vec!["*.log".to_string()],
            ..ResolvedConfig::default()
        }
    }

    #[test]
    fn test_excluded_by_pattern() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.log"), "log").unwrap();
        fs::write(dir.path().join("app.rs"), "fn main() {}").unwrap();
        let config = config();
        let filter = GlobFilter::new(&config.exclude_patterns);
        let checker = EligibilityChecker::new(dir.path(), &filter, &config);
        assert!(!checker.is_eligible_file(&dir.path().join("app.log")));
        assert!(checker.is_eligible_file(&dir.path().join("app.rs")));
    }

    #[test]
    fn test_missing_file_is_not_eligible() {
        let dir = TempDir::new().unwrap();
        let config = config();
        let filter = GlobFilter::new(&config.exclude_patterns);
        let checker = EligibilityChecker::new(dir.path(), &filter, &config);
        assert!(!checker.is_eligible_file(&dir.path().join("gone.rs")));
    }

    #[test]
    fn test_size_threshold() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.txt"), "x".repeat(11)).unwrap();
        fs::write(dir.path().join("small.txt"), "x".repeat(10)).unwrap();
        let config = ResolvedConfig {
            max_file_size_bytes: Some(10),
            ..config()
        };
        let filter = GlobFilter::new(&config.exclude_patterns);
        let checker = EligibilityChecker::new(dir.path(), &filter, &config);
        assert!(!checker.is_eligible_file(&dir.path().join("big.txt")));
        assert!(checker.is_eligible_file(&dir.path().join("small.txt")));
    }

    #[test]
    fn test_extension_allow_list() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.RS"), "x").unwrap();
        fs::write(dir.path().join("b.py"), "x").unwrap();
        fs::write(dir.path().join("Makefile"), "x").unwrap();
        let config = ResolvedConfig {
            include_extensions: Some(["rs".to_string()].into_iter().collect()),
            ..config()
        };
        let filter = GlobFilter::new(&config.exclude_patterns);
        let checker = EligibilityChecker::new(dir.path(), &filter, &config);
        assert!(checker.is_eligible_file(&dir.path().join("a.RS")));
        assert!(!checker.is_eligible_file(&dir.path().join("b.py")));
        assert!(!checker.is_eligible_file(&dir.path().join("Makefile")));
    }

    #[test]
    fn test_binary_detection_toggle() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blob.dat"), [1u8, 0, 2, 3]).unwrap();
        let mut config = config();
        let filter = GlobFilter::new(&config.exclude_patterns);
        {
            let checker = EligibilityChecker::new(dir.path(), &filter, &config);
            assert!(!checker.is_eligible_file(&dir.path().join("blob.dat")));
        }
        config.detect_binary = false;
        let checker = EligibilityChecker::new(dir.path(), &filter, &config);
        assert!(checker.is_eligible_file(&dir.path().join("blob.dat")));
    }

    #[test]
    fn test_null_byte_past_prefix_is_text() {
        let dir = TempDir::new().unwrap();
        let mut content = vec![b'a'; BINARY_SNIFF_LEN];
        content.push(0);
        fs::write(dir.path().join("late.txt"), content).unwrap();
        assert!(!looks_binary(&dir.path().join("late.txt")));
    }

    #[test]
    fn test_summary_artifacts_are_never_eligible() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SUMMARY_FILENAME), "---\nFile: x\n---\n").unwrap();
        let config = config();
        let filter = GlobFilter::new(&config.exclude_patterns);
        let checker = EligibilityChecker::new(dir.path(), &filter, &config);
        assert!(!checker.is_eligible_file(&dir.path().join(SUMMARY_FILENAME)));
    }
}
