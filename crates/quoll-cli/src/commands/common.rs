//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use quoll_ast::SyntaxTree;

/// Load a serialised module.
pub fn load_tree(path: &str) -> Result<SyntaxTree> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    SyntaxTree::from_json(&source).with_context(|| format!("Failed to parse module: {path}"))
}

/// `<stem>_translated.json` next to the working directory.
pub fn default_output(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".into());
    format!("{stem}_translated.json")
}
