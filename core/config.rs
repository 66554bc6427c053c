use crate::error::{AppError, Result};
use byte_unit::Byte;
use log;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILENAMES: [&str; 3] = [".llamero.toml", ".llamero.yml", ".llamero.yaml"];
pub const IGNORE_FILENAME: &str = ".llameroignore";
pub const GITIGNORE_FILENAME: &str = ".gitignore";
pub const SUMMARY_FILENAME: &str = "SUMMARY";
pub const DEFAULT_MAX_FILE_SIZE: &str = "1000KB";
pub const UNLIMITED_FILE_SIZE: &str = "unlimited";

pub const DEFAULT_CONFIG_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../data/default_config.toml"));
pub const DEFAULT_IGNORE_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../data/default_llameroignore"));

const FALLBACK_EXCLUDE: &str = ".git/";
const FALLBACK_MAX_FILE_SIZE_BYTES: u64 = 1_000_000;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub tree: TreeConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: String,
    #[serde(default)]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default)]
    pub include_extensions: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub detect_binary: bool,
    #[serde(default)]
    pub pattern_engine: PatternEngine,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
    #[serde(default)]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default = "default_essential_dirs")]
    pub essential_dirs: Vec<String>,
    #[serde(default)]
    pub pattern_engine: PatternEngine,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatternEngine {
    #[default]
    Gitignore,
    Substring,
}

fn default_true() -> bool {
    true
}
fn default_max_file_size() -> String {
    DEFAULT_MAX_FILE_SIZE.to_string()
}
fn default_essential_dirs() -> Vec<String> {
    ["docs", "src", "tests"].iter().map(|s| s.to_string()).collect()
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            exclude_patterns: None,
            include_extensions: None,
            detect_binary: default_true(),
            pattern_engine: PatternEngine::default(),
            parallel: default_true(),
        }
    }
}
impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: None,
            essential_dirs: default_essential_dirs(),
            pattern_engine: PatternEngine::default(),
        }
    }
}

/// Immutable per-run settings for summary generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub exclude_patterns: Vec<String>,
    pub max_file_size_bytes: Option<u64>,
    /// Lowercase extensions without the leading dot.
    pub include_extensions: Option<BTreeSet<String>>,
    pub detect_binary: bool,
    pub pattern_engine: PatternEngine,
    pub parallel: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: vec![FALLBACK_EXCLUDE.to_string()],
            max_file_size_bytes: Some(FALLBACK_MAX_FILE_SIZE_BYTES),
            include_extensions: None,
            detect_binary: true,
            pattern_engine: PatternEngine::Gitignore,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTreeConfig {
    pub exclude_patterns: Vec<String>,
    pub essential_dirs: BTreeSet<String>,
    pub pattern_engine: PatternEngine,
}

impl Default for ResolvedTreeConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: vec![FALLBACK_EXCLUDE.to_string()],
            essential_dirs: default_essential_dirs().into_iter().collect(),
            pattern_engine: PatternEngine::Gitignore,
        }
    }
}

pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Parses a size such as `"1000KB"` or `"2MiB"`; `"unlimited"` disables the limit.
pub fn parse_max_file_size(value: &str) -> Result<Option<u64>> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case(UNLIMITED_FILE_SIZE) {
        return Ok(None);
    }
    let byte_value = Byte::from_str(trimmed).map_err(|e| {
        AppError::InvalidArgument(format!(
            "Invalid file size '{}': {}. Use KB, MB, etc.",
            value, e
        ))
    })?;
    let bytes: u128 = byte_value.into();
    let bytes = u64::try_from(bytes).map_err(|_| {
        AppError::InvalidArgument(format!("File size '{}' is too large", value))
    })?;
    Ok(Some(bytes))
}

/// Keeps non-empty, non-comment lines of an ignore file, trimmed.
pub fn parse_ignore_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Patterns from `.llameroignore`, else `.gitignore`, else just `.git/`.
pub fn read_ignore_file(project_root: &Path) -> Vec<String> {
    let mut patterns = Vec::new();
    for name in [IGNORE_FILENAME, GITIGNORE_FILENAME] {
        let path = project_root.join(name);
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(content) => {
                patterns = parse_ignore_lines(&content);
                log::debug!("Loaded {} patterns from {}", patterns.len(), name);
            }
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
            }
        }
        break;
    }

    if patterns.is_empty() {
        log::debug!("No ignore file found, using minimal defaults ({})", FALLBACK_EXCLUDE);
        patterns.push(FALLBACK_EXCLUDE.to_string());
    }
    patterns
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("LLAMERO_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve
            .canonicalize()
            .map_err(|e| AppError::RootNotAccessible {
                path: path_to_resolve.clone(),
                source: e,
            })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&PathBuf>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        if let Some(path) = cli_config_file {
            let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
            let path = if expanded.is_absolute() {
                expanded
            } else {
                project_root.join(expanded)
            };
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Specified config file not found at path: {}",
                    path.display()
                )));
            }
            log::debug!("Using specified config file path: {}", path.display());
            return Ok(Some(path));
        }

        let found = CONFIG_FILENAMES
            .iter()
            .map(|name| project_root.join(name))
            .find(|p| p.is_file());
        match &found {
            Some(p) => log::debug!("Using config file: {}", p.display()),
            None => log::debug!(
                "No config file found in {}, using defaults",
                project_root.display()
            ),
        }
        Ok(found)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        let is_yaml = config_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"));
        if is_yaml {
            serde_yml::from_str::<Config>(&content).map_err(AppError::YamlError)
        } else {
            toml::from_str::<Config>(&content).map_err(|e| {
                AppError::TomlParse(format!(
                    "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                    config_path.display(),
                    e
                ))
            })
        }
    }

    /// Locates and loads the config file. A file that fails to parse is
    /// reported and replaced by the defaults; only a missing explicit path fails.
    pub fn load(
        project_root: &Path,
        cli_config_file: Option<&PathBuf>,
        cli_disable_config: bool,
    ) -> Result<Self> {
        let Some(path) =
            Self::resolve_config_path(project_root, cli_config_file, cli_disable_config)?
        else {
            return Ok(Config::default());
        };
        match Self::load_from_path(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::warn!("Error loading config: {}, using defaults", e);
                Ok(Config::default())
            }
        }
    }

    pub fn resolve_summary(&self, project_root: &Path) -> ResolvedConfig {
        let exclude_patterns = self
            .summary
            .exclude_patterns
            .clone()
            .unwrap_or_else(|| read_ignore_file(project_root));

        let max_file_size_bytes = match parse_max_file_size(&self.summary.max_file_size) {
            Ok(size) => size,
            Err(e) => {
                log::warn!("{}; falling back to {}", e, DEFAULT_MAX_FILE_SIZE);
                Some(FALLBACK_MAX_FILE_SIZE_BYTES)
            }
        };

        let include_extensions = self.summary.include_extensions.as_ref().map(|exts| {
            exts.iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect::<BTreeSet<_>>()
        });

        ResolvedConfig {
            exclude_patterns,
            max_file_size_bytes,
            include_extensions,
            detect_binary: self.summary.detect_binary,
            pattern_engine: self.summary.pattern_engine,
            parallel: self.summary.parallel,
        }
    }

    pub fn resolve_tree(&self, project_root: &Path) -> ResolvedTreeConfig {
        ResolvedTreeConfig {
            exclude_patterns: self
                .tree
                .exclude_patterns
                .clone()
                .unwrap_or_else(|| read_ignore_file(project_root)),
            essential_dirs: self.tree.essential_dirs.iter().cloned().collect(),
            pattern_engine: self.tree.pattern_engine,
        }
    }
}

/// Writes the default `.llamero.toml` and `.llameroignore` into `project_root`.
/// Existing files are kept unless `force` is set.
pub fn write_default_files(project_root: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (name, content) in [
        (CONFIG_FILENAMES[0], DEFAULT_CONFIG_TEMPLATE),
        (IGNORE_FILENAME, DEFAULT_IGNORE_TEMPLATE),
    ] {
        let path = project_root.join(name);
        if path.exists() && !force {
            log::warn!("{} already exists, leaving it untouched", path.display());
            continue;
        }
        fs::write(&path, content).map_err(|e| AppError::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        log::info!("Created {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_default_ignore_template_has_negation_examples() {
        assert!(DEFAULT_IGNORE_TEMPLATE.contains("# Llamero ignore file"));
        assert!(DEFAULT_IGNORE_TEMPLATE.contains("!.git/config"));
        assert!(parse_ignore_lines(DEFAULT_IGNORE_TEMPLATE).contains(&".git/".to_string()));
    }

    #[test]
    fn test_parse_max_file_size() {
        assert_eq!(parse_max_file_size("1000KB").unwrap(), Some(1_000_000));
        assert_eq!(parse_max_file_size("2048").unwrap(), Some(2048));
        assert_eq!(parse_max_file_size("unlimited").unwrap(), None);
        assert!(parse_max_file_size("lots").is_err());
    }

    #[test]
    fn test_resolve_without_files_uses_fallback() {
        let dir = TempDir::new().unwrap();
        let resolved = Config::default().resolve_summary(dir.path());
        assert_eq!(resolved, ResolvedConfig::default());
        assert_eq!(resolved.max_file_size_bytes, Some(1_000_000));
        assert_eq!(resolved.exclude_patterns, vec![".git/".to_string()]);
    }

    #[test]
    fn test_llameroignore_takes_priority_over_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(IGNORE_FILENAME), "llamero_pattern\n").unwrap();
        fs::write(dir.path().join(GITIGNORE_FILENAME), "git_pattern\n").unwrap();
        let patterns = read_ignore_file(dir.path());
        assert_eq!(patterns, vec!["llamero_pattern".to_string()]);
    }

    #[test]
    fn test_gitignore_fallback_skips_comments() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(GITIGNORE_FILENAME),
            "\n# Git ignore patterns\n*.pyc\n__pycache__/\n",
        )
        .unwrap();
        let patterns = read_ignore_file(dir.path());
        assert_eq!(patterns, vec!["*.pyc".to_string(), "__pycache__/".to_string()]);
    }

    #[test]
    fn test_load_toml_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".llamero.toml"),
            "[summary]\nmax_file_size = \"2MB\"\ninclude_extensions = [\".RS\", \"md\"]\n",
        )
        .unwrap();
        let config = Config::load(dir.path(), None, false).unwrap();
        let resolved = config.resolve_summary(dir.path());
        assert_eq!(resolved.max_file_size_bytes, Some(2_000_000));
        let exts: Vec<_> = resolved.include_extensions.unwrap().into_iter().collect();
        assert_eq!(exts, vec!["md".to_string(), "rs".to_string()]);
    }

    #[test]
    fn test_load_yaml_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".llamero.yml"),
            "summary:\n  exclude_patterns:\n    - \"*.log\"\n  detect_binary: false\n",
        )
        .unwrap();
        let config = Config::load(dir.path(), None, false).unwrap();
        let resolved = config.resolve_summary(dir.path());
        assert_eq!(resolved.exclude_patterns, vec!["*.log".to_string()]);
        assert!(!resolved.detect_binary);
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".llamero.toml"), "[summary\nbroken").unwrap();
        let config = Config::load(dir.path(), None, false).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = PathBuf::from("nope.toml");
        assert!(Config::load(dir.path(), Some(&missing), false).is_err());
        assert_eq!(
            Config::load(dir.path(), Some(&missing), true).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_write_default_files_respects_existing() {
        let dir = TempDir::new().unwrap();
        let written = write_default_files(dir.path(), false).unwrap();
        assert_eq!(written.len(), 2);
        assert!(write_default_files(dir.path(), false).unwrap().is_empty());
        assert_eq!(write_default_files(dir.path(), true).unwrap().len(), 2);
    }

    #[test]
    fn test_root_not_accessible() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = Config::determine_project_root(Some(&missing)).unwrap_err();
        assert!(matches!(err, AppError::RootNotAccessible { .. }));
    }
}
