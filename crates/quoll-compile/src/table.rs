//! Operation symbol table and functor resolution.
//!
//! Every operation the module may call is listed here together with how
//! its `Adjoint` and `Controlled` variants resolve. The synthesizers fill
//! in the variants they derive, so after translation every requested
//! functor maps to a concrete definition name.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use quoll_ast::{DeriveMarkers, Functor};

use crate::error::{CompileError, CompileResult};

/// How a functor applied to an operation resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// No variant exists.
    #[default]
    Undefined,
    /// A variant was requested and will be derived during this compilation.
    Pending,
    /// The variant is the named definition.
    Variant(String),
}

impl Resolution {
    /// Whether the functor can be applied at all.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Resolution::Undefined)
    }

    fn requested(requested: bool) -> Self {
        if requested {
            Resolution::Pending
        } else {
            Resolution::Undefined
        }
    }
}

/// Functor resolutions of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEntry {
    /// Resolution of `Adjoint[op]`.
    #[serde(default)]
    pub adjoint: Resolution,
    /// Resolution of `Controlled[op]`.
    #[serde(default)]
    pub controlled: Resolution,
}

impl OperationEntry {
    /// Entry with both variants resolved.
    pub fn with_variants(adjoint: impl Into<String>, controlled: impl Into<String>) -> Self {
        Self {
            adjoint: Resolution::Variant(adjoint.into()),
            controlled: Resolution::Variant(controlled.into()),
        }
    }

    /// Entry for an operation whose markers request auto-derivation.
    pub fn from_markers(markers: DeriveMarkers) -> Self {
        Self {
            adjoint: Resolution::requested(markers.adjoint),
            controlled: Resolution::requested(markers.controlled),
        }
    }

    /// Resolution for `functor`.
    pub fn get(&self, functor: Functor) -> &Resolution {
        match functor {
            Functor::Adjoint => &self.adjoint,
            Functor::Controlled => &self.controlled,
        }
    }

    fn get_mut(&mut self, functor: Functor) -> &mut Resolution {
        match functor {
            Functor::Adjoint => &mut self.adjoint,
            Functor::Controlled => &mut self.controlled,
        }
    }
}

/// Module-scope table of names known to denote quantum operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationTable {
    entries: FxHashMap<String, OperationEntry>,
}

impl OperationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The operations provided by the runtime preamble.
    pub fn preamble() -> Self {
        let mut table = Self::new();
        for gate in ["X", "H", "Z"] {
            let controlled = format!("_{gate}_ctl");
            table.insert(gate, OperationEntry::with_variants(gate, &controlled));
            // Controlled Pauli and Hadamard gates are their own inverses.
            table.insert(
                &controlled,
                OperationEntry::with_variants(&controlled, &controlled),
            );
        }
        table.insert("R1", OperationEntry::with_variants("_R1_adj", "_R1_ctl"));
        table.insert("_R1_adj", OperationEntry::with_variants("R1", "_R1_adj_ctl"));
        table.insert("_R1_ctl", OperationEntry::with_variants("_R1_adj_ctl", "_R1_ctl"));
        table.insert(
            "_R1_adj_ctl",
            OperationEntry::with_variants("_R1_ctl", "_R1_adj_ctl"),
        );
        table.insert("map", OperationEntry::with_variants("_map_adj", "_map_ctl"));
        table.insert("_map_adj", OperationEntry::with_variants("map", "_map_adj_ctl"));
        table.insert("_map_ctl", OperationEntry::with_variants("_map_adj_ctl", "_map_ctl"));
        table.insert(
            "_map_adj_ctl",
            OperationEntry::with_variants("_map_ctl", "_map_adj_ctl"),
        );
        table
    }

    /// Add or replace an operation.
    pub fn insert(&mut self, name: impl Into<String>, entry: OperationEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Record an operation definition found in the module.
    pub fn declare(&mut self, name: impl Into<String>, markers: DeriveMarkers) {
        self.insert(name, OperationEntry::from_markers(markers));
    }

    /// Whether `name` is a known operation.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Look up an operation.
    pub fn get(&self, name: &str) -> Option<&OperationEntry> {
        self.entries.get(name)
    }

    /// Number of known operations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `functor` can be applied to `name`.
    pub fn supports(&self, name: &str, functor: Functor) -> bool {
        self.get(name)
            .is_some_and(|entry| entry.get(functor).is_defined())
    }

    /// Fail unless every functor in `chain` can be applied to `name`.
    pub fn require(&self, name: &str, chain: &[Functor]) -> CompileResult<()> {
        match chain.iter().find(|&&functor| !self.supports(name, functor)) {
            Some(&functor) => Err(CompileError::UndefinedVariant {
                operation: name.to_string(),
                functor,
            }),
            None => Ok(()),
        }
    }

    /// Resolve `functor[name]` to the definition implementing it.
    pub fn resolve(&self, name: &str, functor: Functor) -> CompileResult<&str> {
        match self.get(name).map(|entry| entry.get(functor)) {
            Some(Resolution::Variant(variant)) => Ok(variant.as_str()),
            _ => Err(CompileError::UndefinedVariant {
                operation: name.to_string(),
                functor,
            }),
        }
    }

    /// Point `functor[name]` at `variant`, declaring `name` if needed.
    pub fn link(&mut self, name: &str, functor: Functor, variant: impl Into<String>) {
        *self
            .entries
            .entry(name.to_string())
            .or_default()
            .get_mut(functor) = Resolution::Variant(variant.into());
    }

    /// Iterate over all operations.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperationEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}
