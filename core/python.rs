//! Signature-only summaries of Python sources.
//!
//! Functions, classes and methods are reduced to their `def`/`class` headers
//! and docstrings, giving a compact outline of a Python project.

use crate::config::ResolvedConfig;
use crate::eligibility::EligibilityChecker;
use crate::error::{AppError, Result};
use crate::filter::{build_filter, to_slash};
use crate::scan::{DirectoryNode, FileNode, scan_directory};
use log;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

pub const PYTHON_SUMMARY_TITLE: &str = "# Python Project Structure";
const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Function,
    Class,
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub kind: SignatureKind,
    /// Source text of each parameter, `self` included.
    pub args: Vec<String>,
    pub returns: Option<String>,
    pub docstring: Option<String>,
    /// The `def ...:` or `class ...:` line.
    pub header: String,
    pub methods: Vec<Signature>,
}

pub struct SignatureExtractor {
    parser: Parser,
}

impl SignatureExtractor {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| AppError::Parse(format!("Failed to load Python grammar: {}", e)))?;
        Ok(Self { parser })
    }

    /// Top-level functions and classes in source order. Syntax errors are
    /// tolerated; whatever still parses as a definition is reported.
    pub fn extract_signatures(&mut self, source: &str) -> Result<Vec<Signature>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| AppError::Parse("Python parser returned no tree".to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            log::debug!("Python source has syntax errors, extracting what parses");
        }

        let mut signatures = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let Some(definition) = unwrap_decorated(child) else {
                continue;
            };
            match definition.kind() {
                "function_definition" => {
                    signatures.push(function_signature(definition, source, SignatureKind::Function))
                }
                "class_definition" => signatures.push(class_signature(definition, source)),
                _ => {}
            }
        }
        Ok(signatures)
    }
}

fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

fn unwrap_decorated(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "decorated_definition" => node.child_by_field_name("definition"),
        "function_definition" | "class_definition" => Some(node),
        _ => None,
    }
}

fn function_signature(node: Node<'_>, source: &str, kind: SignatureKind) -> Signature {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();

    let mut args = Vec::new();
    let mut params_text = "()";
    if let Some(params) = node.child_by_field_name("parameters") {
        params_text = text(params, source);
        let mut cursor = params.walk();
        args = params
            .named_children(&mut cursor)
            .filter(|p| {
                !matches!(
                    p.kind(),
                    "comment" | "keyword_separator" | "positional_separator"
                )
            })
            .map(|p| text(p, source).to_string())
            .collect();
    }
    let returns = node
        .child_by_field_name("return_type")
        .map(|r| text(r, source).to_string());

    let prefix = if text(node, source).starts_with("async") {
        "async "
    } else {
        ""
    };
    let mut header = format!("{}def {}{}", prefix, name, params_text);
    if let Some(ret) = &returns {
        header.push_str(" -> ");
        header.push_str(ret);
    }
    header.push(':');

    Signature {
        name,
        kind,
        args,
        returns,
        docstring: docstring(node, source),
        header,
        methods: Vec::new(),
    }
}

fn class_signature(node: Node<'_>, source: &str) -> Signature {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, source).to_string())
        .unwrap_or_default();
    let bases = node
        .child_by_field_name("superclasses")
        .map(|b| text(b, source))
        .unwrap_or_default();

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            if let Some(def) = unwrap_decorated(child).filter(|d| d.kind() == "function_definition") {
                methods.push(function_signature(def, source, SignatureKind::Method));
            }
        }
    }

    Signature {
        header: format!("class {}{}:", name, bases),
        name,
        kind: SignatureKind::Class,
        args: Vec::new(),
        returns: None,
        docstring: docstring(node, source),
        methods,
    }
}

fn docstring(node: Node<'_>, source: &str) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }
    Some(clean_docstring(text(literal, source)))
}

/// Strips quotes and string prefixes, then removes the common indentation of
/// continuation lines.
fn clean_docstring(raw: &str) -> String {
    let unprefixed = raw.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    let mut inner = unprefixed;
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if unprefixed.len() >= quote.len() * 2
            && unprefixed.starts_with(quote)
            && unprefixed.ends_with(quote)
        {
            inner = &unprefixed[quote.len()..unprefixed.len() - quote.len()];
            break;
        }
    }

    let lines: Vec<&str> = inner.trim().lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim()
            } else {
                line.get(indent..).unwrap_or_else(|| line.trim_start()).trim_end()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_signature(signature: &Signature, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    out.push_str(&pad);
    out.push_str(&signature.header);
    out.push('\n');
    if let Some(doc) = &signature.docstring {
        let doc_pad = INDENT.repeat(depth + 1);
        let mut lines = doc.lines();
        if let Some(first) = lines.next() {
            out.push_str(&format!("{}\"\"\"{}", doc_pad, first));
            for line in lines {
                out.push('\n');
                if !line.is_empty() {
                    out.push_str(&doc_pad);
                    out.push_str(line);
                }
            }
            out.push_str("\"\"\"\n");
        }
    }
    for method in &signature.methods {
        render_signature(method, depth + 1, out);
    }
}

/// Renders one file's signatures.
pub fn render_python_file(relative_path: &Path, signatures: &[Signature]) -> String {
    let mut out = format!("## {}\n\n", to_slash(relative_path));
    for (i, signature) in signatures.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_signature(signature, 0, &mut out);
    }
    out.push('\n');
    out
}

fn collect_python_files<'a>(dir: &'a DirectoryNode, out: &mut Vec<&'a FileNode>) {
    out.extend(dir.files.iter().filter(|f| {
        f.extension
            .as_deref()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("py"))
    }));
    for sub in &dir.dirs {
        collect_python_files(sub, out);
    }
}

/// Outline of every eligible `.py` file under `root`, in path order. Files
/// without definitions and files that cannot be read are left out.
pub fn generate_python_summary(root: &Path, config: &ResolvedConfig) -> Result<String> {
    let filter = build_filter(&config.exclude_patterns, config.pattern_engine);
    let tree = scan_directory(root, filter.as_ref())?;
    let checker = EligibilityChecker::new(root, filter.as_ref(), config);

    let mut files = Vec::new();
    collect_python_files(&tree, &mut files);
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let mut extractor = SignatureExtractor::new()?;
    let mut summary = format!("{}\n\n", PYTHON_SUMMARY_TITLE);
    let mut described = 0;
    for file in files {
        if !checker.is_eligible_file(&file.path) {
            continue;
        }
        let source = match fs::read_to_string(&file.path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Error reading {}: {}", file.path.display(), e);
                continue;
            }
        };
        let signatures = extractor.extract_signatures(&source)?;
        if signatures.is_empty() {
            log::trace!("No definitions in {}", file.relative_path.display());
            continue;
        }
        summary.push_str(&render_python_file(&file.relative_path, &signatures));
        described += 1;
    }
    log::info!("Python summary covers {} files", described);
    Ok(summary)
}
