//! Translate command implementation.

use anyhow::{Context, Result};
use console::style;
use std::fs;

use quoll_compile::Translator;

use super::common::{default_output, load_tree};
use super::config;

/// Execute the translate command.
pub fn execute(
    input: &str,
    output: Option<&str>,
    config_path: Option<&str>,
    pretty: bool,
    show: bool,
) -> Result<()> {
    println!(
        "{} Translating {}",
        style("→").cyan().bold(),
        style(input).green()
    );

    let options = config::load(config_path)?;
    let tree = load_tree(input)?;
    println!("  Loaded: {} top-level statements", tree.body().len());

    let translation = Translator::new(options)
        .translate(tree)
        .with_context(|| format!("Failed to translate {input}"))?;
    let stats = &translation.stats;

    println!("{} Translation complete", style("✓").green().bold());
    println!(
        "  Derived: {} adjoint, {} controlled",
        stats.adjoints_derived, stats.controlled_derived
    );
    println!(
        "  Hoisted: {} measurements in {} blocks, {} conditionals lowered",
        stats.measurements_hoisted, stats.blocks_hoisted, stats.conditionals_lowered
    );

    let output_path = output.map_or_else(|| default_output(input), str::to_string);
    let encoded = translation.tree.to_json(pretty)?;
    fs::write(&output_path, encoded)
        .with_context(|| format!("Failed to write file: {output_path}"))?;
    println!("  Output: {}", style(&output_path).green());

    if show {
        println!();
        println!("{}", translation.tree.render_module()?);
    }

    Ok(())
}
