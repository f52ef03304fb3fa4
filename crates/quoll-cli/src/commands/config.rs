//! Translation options loaded from a YAML file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use quoll_compile::TranslateOptions;

/// Load options from `path`, or the defaults when no file is given.
pub fn load(path: Option<&str>) -> Result<TranslateOptions> {
    let Some(path) = path else {
        return Ok(TranslateOptions::default());
    };

    if !Path::new(path).exists() {
        anyhow::bail!("Config file not found: {path}");
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    let options = parse(&contents).with_context(|| format!("Invalid config: {path}"))?;
    debug!("Loaded translation options from {path}");
    Ok(options)
}

/// Parse and validate a YAML document. Missing keys keep their defaults.
pub fn parse(contents: &str) -> Result<TranslateOptions> {
    let options: TranslateOptions = if contents.trim().is_empty() {
        TranslateOptions::default()
    } else {
        serde_yaml_ng::from_str(contents)?
    };
    validate(&options)?;
    Ok(options)
}

/// Every configured marker must be usable as an identifier.
fn validate(options: &TranslateOptions) -> Result<()> {
    let identifiers = [
        ("boilerplate_alias", &options.boilerplate_alias),
        ("measure_fn", &options.measure_fn),
        ("allocate_fn", &options.allocate_fn),
        ("condition_fn", &options.condition_fn),
        ("scope_fn", &options.scope_fn),
        ("execute_fn", &options.execute_fn),
        ("control_param", &options.control_param),
        ("placeholder_prefix", &options.placeholder_prefix),
        ("proxy_prefix", &options.proxy_prefix),
    ];
    for (key, value) in identifiers {
        if !is_identifier(value) {
            anyhow::bail!("'{key}' must be an identifier, got '{value}'");
        }
    }
    if !options.boilerplate_module.split('.').all(is_identifier) {
        anyhow::bail!(
            "'boilerplate_module' must be a dotted module path, got '{}'",
            options.boilerplate_module
        );
    }
    if options.placeholder_prefix == options.proxy_prefix {
        anyhow::bail!("'placeholder_prefix' and 'proxy_prefix' must differ");
    }
    Ok(())
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
