//! Translation options: the markers the passes recognise.

use serde::{Deserialize, Serialize};

use crate::table::OperationTable;

/// Names and markers used when recognising and emitting constructs.
///
/// Missing fields fall back to the dialect defaults, so a configuration
/// file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Module imported at the top of every translated module.
    pub boilerplate_module: String,
    /// Alias the boilerplate module is imported under.
    pub boilerplate_alias: String,
    /// Call recognised as a measurement request.
    pub measure_fn: String,
    /// Call recognised as the context of an allocation block.
    pub allocate_fn: String,
    /// Call recognised as a quantum conditional test.
    pub condition_fn: String,
    /// Boilerplate context manager toggling the zero bits of a comparison.
    pub scope_fn: String,
    /// Boilerplate helper running a batch of measurement proxies.
    pub execute_fn: String,
    /// Base name of injected control parameters.
    pub control_param: String,
    /// Base name of measurement placeholders (`_m1`, `_m2`, ...).
    pub placeholder_prefix: String,
    /// Base name of measurement proxy temporaries (`_mp1`, `_mp2`, ...).
    pub proxy_prefix: String,
    /// Operations known before the module is inspected.
    pub operations: OperationTable,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            boilerplate_module: "quoll.boilerplate".into(),
            boilerplate_alias: "bp".into(),
            measure_fn: "measure".into(),
            allocate_fn: "allocate".into(),
            condition_fn: "superposition".into(),
            scope_fn: "control_scope".into(),
            execute_fn: "execute".into(),
            control_param: "__control".into(),
            placeholder_prefix: "_m".into(),
            proxy_prefix: "_mp".into(),
            operations: OperationTable::preamble(),
        }
    }
}

impl TranslateOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known operation table.
    #[must_use]
    pub fn with_operations(mut self, operations: OperationTable) -> Self {
        self.operations = operations;
        self
    }

    /// Change the boilerplate alias.
    #[must_use]
    pub fn with_boilerplate_alias(mut self, alias: impl Into<String>) -> Self {
        self.boilerplate_alias = alias.into();
        self
    }
}
