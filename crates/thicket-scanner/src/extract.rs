//! Import specifier and statistics extraction
//!
//! Sources are parsed with tree-sitter. Specifiers come from import and
//! re-export statements, TypeScript `import x = require(...)`, dynamic
//! `import()` and CommonJS `require()` calls. Comments and the contents of
//! other string literals never produce specifiers.

use std::path::Path;

use thicket_core::ArtifactStats;
use tracing::warn;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::{Result, ScanError};

/// Grammar used to parse a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Pick the grammar from the file extension. Unknown extensions parse as JavaScript.
    pub fn for_path(path: &Path) -> Dialect {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts" | "mts" | "cts") => Dialect::TypeScript,
            Some("tsx") => Dialect::Tsx,
            _ => Dialect::JavaScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parse `source`. Syntax errors still yield a tree; only grammar setup can fail.
pub fn parse_source(path: &Path, source: &str, dialect: Dialect) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|err| ScanError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    parser.parse(source, None).ok_or_else(|| ScanError::Parse {
        path: path.to_path_buf(),
        message: "parser produced no tree".to_string(),
    })
}

/// Pre-order walk over every node of the tree.
fn visit<'tree>(tree: &'tree Tree, mut f: impl FnMut(Node<'tree>)) {
    let mut cursor = tree.walk();
    loop {
        f(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Specifiers in source order. Repeats are kept; they count as extra usage.
pub fn extract_specifiers(tree: &Tree, source: &str) -> Vec<String> {
    let bytes = source.as_bytes();
    let mut found = Vec::new();
    visit(tree, |node| {
        let literal = match node.kind() {
            "import_statement" | "export_statement" | "import_require_clause" => {
                node.child_by_field_name("source")
            }
            "call_expression" if is_module_call(node, bytes) => node
                .child_by_field_name("arguments")
                .and_then(|args| args.named_child(0)),
            _ => None,
        };
        if let Some(specifier) = literal.and_then(|lit| string_value(lit, bytes)) {
            found.push(specifier);
        }
    });
    found
}

/// `import(...)` or `require(...)`.
fn is_module_call(call: Node<'_>, source: &[u8]) -> bool {
    call.child_by_field_name("function").is_some_and(|function| {
        function.kind() == "import"
            || (function.kind() == "identifier" && function.utf8_text(source) == Ok("require"))
    })
}

fn string_value(literal: Node<'_>, source: &[u8]) -> Option<String> {
    if literal.kind() != "string" {
        return None;
    }
    let text = literal.utf8_text(source).ok()?;
    let value = text.trim_matches(|c| c == '"' || c == '\'').trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Size, line count and a branch-count complexity estimate.
pub fn compute_stats(tree: &Tree, source: &str) -> ArtifactStats {
    let mut branches = 0usize;
    visit(tree, |node| {
        let is_branch = match node.kind() {
            "if_statement" | "for_statement" | "for_in_statement" | "while_statement"
            | "do_statement" | "switch_case" | "catch_clause" | "ternary_expression" => true,
            "binary_expression" => node
                .child_by_field_name("operator")
                .is_some_and(|op| matches!(op.kind(), "&&" | "||" | "??")),
            _ => false,
        };
        if is_branch {
            branches += 1;
        }
    });

    ArtifactStats {
        size: source.len() as u64,
        lines: source.lines().count() as u32,
        complexity: 1.0 + branches as f64,
    }
}

/// Facts read from a `package.json`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub name: Option<String>,
    pub dependencies: Vec<String>,
}

/// Parse a manifest. Malformed JSON yields an empty manifest.
pub fn parse_manifest(path: &str, source: &str) -> Manifest {
    let value: serde_json::Value = match serde_json::from_str(source) {
        Ok(value) => value,
        Err(err) => {
            warn!("Ignoring malformed manifest {}: {}", path, err);
            return Manifest::default();
        }
    };

    let name = value
        .get("name")
        .and_then(|n| n.as_str())
        .map(str::to_string);
    let dependencies = ["dependencies", "peerDependencies"]
        .iter()
        .filter_map(|section| value.get(section).and_then(|s| s.as_object()))
        .flat_map(|deps| deps.keys().cloned())
        .collect();

    Manifest { name, dependencies }
}
