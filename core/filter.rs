//! Gitignore-style path filtering.
//!
//! Patterns are evaluated in declaration order and the last matching pattern
//! decides: a plain pattern excludes, a `!` pattern re-includes. A pattern that
//! matches a directory also matches everything below it, yet every descendant is
//! still evaluated on its own, so `!.git/config` can bring a single file back
//! while `.git/` keeps the rest of the directory out.

use crate::config::PatternEngine;
use globset::{GlobBuilder, GlobMatcher};
use log;
use std::path::{Component, Path};

/// Inclusion predicate shared by the summary generator and the tree renderer.
pub trait PathFilter: Send + Sync {
    /// `relative_path` is relative to the tree root. The root itself is always included.
    fn is_included(&self, relative_path: &Path, is_dir: bool) -> bool;

    /// True when some pattern re-includes paths, which means an excluded
    /// directory may still hold included descendants and cannot be pruned.
    fn has_negations(&self) -> bool;
}

pub fn build_filter(patterns: &[String], engine: PatternEngine) -> Box<dyn PathFilter> {
    match engine {
        PatternEngine::Gitignore => Box::new(GlobFilter::new(patterns)),
        PatternEngine::Substring => Box::new(SubstringFilter::new(patterns)),
    }
}

/// Forward-slash form of a relative path, used for matching and for `File:` headers.
pub fn to_slash(relative_path: &Path) -> String {
    relative_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedPattern {
    body: String,
    negated: bool,
    dir_only: bool,
    anchored: bool,
}

fn parse_pattern(raw: &str) -> Option<ParsedPattern> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negated, rest) = if let Some(stripped) = line.strip_prefix('!') {
        (true, stripped)
    } else if line.starts_with("\\!") || line.starts_with("\\#") {
        (false, &line[1..])
    } else {
        (false, line)
    };

    let dir_only = rest.ends_with('/');
    let trimmed = rest.trim_end_matches('/');
    let anchored = trimmed.contains('/');
    let body = trimmed.trim_start_matches('/');
    if body.is_empty() {
        return None;
    }

    Some(ParsedPattern {
        body: body.to_string(),
        negated,
        dir_only,
        anchored,
    })
}

/// The path itself plus every proper ancestor (ancestors are always directories).
fn candidates(relative_path: &Path, is_dir: bool) -> Vec<(String, bool)> {
    let full = to_slash(relative_path);
    if full.is_empty() {
        return Vec::new();
    }
    let mut out = vec![(full.clone(), is_dir)];
    let mut end = full.len();
    while let Some(idx) = full[..end].rfind('/') {
        out.push((full[..idx].to_string(), true));
        end = idx;
    }
    out
}

#[derive(Debug)]
struct GlobRule {
    pattern: String,
    negated: bool,
    dir_only: bool,
    matcher: GlobMatcher,
}

impl GlobRule {
    fn matches(&self, candidates: &[(String, bool)]) -> bool {
        candidates
            .iter()
            .any(|(path, is_dir)| (!self.dir_only || *is_dir) && self.matcher.is_match(path))
    }
}

#[derive(Debug, Default)]
pub struct GlobFilter {
    rules: Vec<GlobRule>,
}

impl GlobFilter {
    pub fn new(patterns: &[String]) -> Self {
        let mut rules = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let Some(parsed) = parse_pattern(raw) else {
                continue;
            };
            let glob_str = if parsed.anchored {
                parsed.body.clone()
            } else {
                format!("**/{}", parsed.body)
            };
            match GlobBuilder::new(&glob_str).literal_separator(true).build() {
                Ok(glob) => {
                    log::trace!("Adding pattern: {} (processed as {})", raw, glob_str);
                    rules.push(GlobRule {
                        pattern: raw.clone(),
                        negated: parsed.negated,
                        dir_only: parsed.dir_only,
                        matcher: glob.compile_matcher(),
                    });
                }
                Err(e) => {
                    log::warn!("Ignoring invalid pattern \"{}\": {}", raw, e);
                }
            }
        }
        log::debug!("Path filter built with {} patterns", rules.len());
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl PathFilter for GlobFilter {
    fn is_included(&self, relative_path: &Path, is_dir: bool) -> bool {
        let candidates = candidates(relative_path, is_dir);
        if candidates.is_empty() {
            return true;
        }
        let mut included = true;
        for rule in &self.rules {
            if rule.matches(&candidates) {
                log::trace!(
                    "Pattern \"{}\" matched {}",
                    rule.pattern,
                    relative_path.display()
                );
                included = rule.negated;
            }
        }
        included
    }

    fn has_negations(&self) -> bool {
        self.rules.iter().any(|r| r.negated)
    }
}

/// Fallback engine: plain segment and suffix matching without glob semantics.
///
/// `*.ext` matches file names ending in `.ext`, a pattern containing `/` matches
/// when the path contains it, anything else matches a whole path segment.
#[derive(Debug, Default)]
pub struct SubstringFilter {
    rules: Vec<ParsedPattern>,
}

impl SubstringFilter {
    pub fn new(patterns: &[String]) -> Self {
        let rules: Vec<ParsedPattern> = patterns.iter().filter_map(|p| parse_pattern(p)).collect();
        log::debug!("Substring filter built with {} patterns", rules.len());
        Self { rules }
    }

    fn rule_matches(rule: &ParsedPattern, candidates: &[(String, bool)]) -> bool {
        candidates.iter().any(|(path, is_dir)| {
            if rule.dir_only && !is_dir {
                return false;
            }
            let name = path.rsplit('/').next().unwrap_or(path);
            if let Some(suffix) = rule.body.strip_prefix('*') {
                name.ends_with(suffix)
            } else if rule.body.contains('/') {
                path.contains(&rule.body)
            } else {
                name == rule.body
            }
        })
    }
}

impl PathFilter for SubstringFilter {
    fn is_included(&self, relative_path: &Path, is_dir: bool) -> bool {
        let candidates = candidates(relative_path, is_dir);
        if candidates.is_empty() {
            return true;
        }
        let mut included = true;
        for rule in &self.rules {
            if Self::rule_matches(rule, &candidates) {
                included = rule.negated;
            }
        }
        included
    }

    fn has_negations(&self) -> bool {
        self.rules.iter().any(|r| r.negated)
    }
}
