//! Render command implementation.

use anyhow::Result;

use super::common::load_tree;

/// Print a module as source text.
pub fn execute(input: &str) -> Result<()> {
    let tree = load_tree(input)?;
    println!("{}", tree.render_module()?);
    Ok(())
}
