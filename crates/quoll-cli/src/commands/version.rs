//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - functor synthesis and measurement batching",
        style("Quoll").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  quoll-ast      Syntax tree arena");
    println!("  quoll-compile  Translation passes");
    println!("  quoll-runtime  Control scopes and batched measurement");
    println!("  quoll-cli      Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
