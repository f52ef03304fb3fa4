//! Node kinds stored in the syntax tree arena.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node inside a [`SyntaxTree`](crate::SyntaxTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        NodeId(u32::try_from(id).expect("NodeId overflow: exceeds u32::MAX"))
    }
}

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A functor that can be applied to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Functor {
    /// The reversed, inverse-effect variant.
    Adjoint,
    /// The variant taking an extra leading control argument.
    Controlled,
}

impl Functor {
    /// Name of the functor as written in source.
    pub fn name(self) -> &'static str {
        match self {
            Functor::Adjoint => "Adjoint",
            Functor::Controlled => "Controlled",
        }
    }

    /// Suffix used when naming a derived variant.
    pub fn suffix(self) -> &'static str {
        match self {
            Functor::Adjoint => "adj",
            Functor::Controlled => "ctl",
        }
    }
}

impl fmt::Display for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
}

/// A keyword argument of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// Keyword name.
    pub name: String,
    /// Argument value.
    pub value: NodeId,
}

/// Expression nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Identifier reference.
    Name(String),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// String literal.
    Str(String),
    /// `value.attr`
    Attribute {
        /// Object being accessed.
        value: NodeId,
        /// Attribute name.
        attr: String,
    },
    /// `func(args..., name=value...)`
    Call {
        /// Callee expression.
        func: NodeId,
        /// Positional arguments.
        args: Vec<NodeId>,
        /// Keyword arguments.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        keywords: Vec<Keyword>,
    },
    /// `Adjoint[target]` or `Controlled[target]`.
    Functor {
        /// Functor being applied.
        functor: Functor,
        /// Operation (or nested functor application) being wrapped.
        target: NodeId,
    },
    /// Flattened all-ones control over several line references.
    ControlAggregate {
        /// Control lines in order.
        members: Vec<NodeId>,
    },
    /// `[a, b, ...]`
    List(Vec<NodeId>),
    /// `(a, b, ...)`
    Tuple(Vec<NodeId>),
    /// `left op right`
    Compare {
        /// Left operand.
        left: NodeId,
        /// Operator.
        op: CompareOp,
        /// Right operand.
        right: NodeId,
    },
}

impl Expr {
    /// Short label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Name(_) => "name",
            Expr::Int(_) => "integer literal",
            Expr::Float(_) => "float literal",
            Expr::Bool(_) => "boolean literal",
            Expr::Str(_) => "string literal",
            Expr::Attribute { .. } => "attribute",
            Expr::Call { .. } => "call",
            Expr::Functor { .. } => "functor application",
            Expr::ControlAggregate { .. } => "control aggregate",
            Expr::List(_) => "list",
            Expr::Tuple(_) => "tuple",
            Expr::Compare { .. } => "comparison",
        }
    }

    /// Direct child expressions, in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Expr::Name(_) | Expr::Int(_) | Expr::Float(_) | Expr::Bool(_) | Expr::Str(_) => {
                vec![]
            }
            Expr::Attribute { value, .. } => vec![*value],
            Expr::Call {
                func,
                args,
                keywords,
            } => std::iter::once(*func)
                .chain(args.iter().copied())
                .chain(keywords.iter().map(|k| k.value))
                .collect(),
            Expr::Functor { target, .. } => vec![*target],
            Expr::ControlAggregate { members } => members.clone(),
            Expr::List(items) | Expr::Tuple(items) => items.clone(),
            Expr::Compare { left, right, .. } => vec![*left, *right],
        }
    }
}

/// Auto-derivation markers carried by an operation definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveMarkers {
    /// Derive the adjoint variant.
    #[serde(default)]
    pub adjoint: bool,
    /// Derive the controlled variant.
    #[serde(default)]
    pub controlled: bool,
}

impl DeriveMarkers {
    /// Whether the given functor is requested.
    pub fn requests(self, functor: Functor) -> bool {
        match functor {
            Functor::Adjoint => self.adjoint,
            Functor::Controlled => self.controlled,
        }
    }
}

/// A function or operation definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Definition name.
    pub name: String,
    /// Parameter names, in order.
    pub params: Vec<String>,
    /// Statement ids of the body.
    pub body: Vec<NodeId>,
    /// `Some` when the definition is a quantum operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<DeriveMarkers>,
}

impl Definition {
    /// Whether this definition denotes a quantum operation.
    pub fn is_operation(&self) -> bool {
        self.operation.is_some()
    }

    /// Derivation markers, all false for plain functions.
    pub fn markers(&self) -> DeriveMarkers {
        self.operation.unwrap_or_default()
    }
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `import module as alias`
    Import {
        /// Module path.
        module: String,
        /// Local alias.
        alias: String,
    },
    /// Expression evaluated for its effect.
    Expr(NodeId),
    /// `target = value`
    Assign {
        /// Name or tuple of names.
        target: NodeId,
        /// Assigned expression.
        value: NodeId,
    },
    /// Function or operation definition.
    Def(Definition),
    /// Class body; definitions inside are method-like.
    Class {
        /// Class name.
        name: String,
        /// Statement ids of the body.
        body: Vec<NodeId>,
    },
    /// Scoped block: `with context as binding: body`
    With {
        /// Context expression.
        context: NodeId,
        /// Optional binding target.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<NodeId>,
        /// Statement ids of the body.
        body: Vec<NodeId>,
    },
    /// `if test: body else: orelse`
    If {
        /// Condition.
        test: NodeId,
        /// Statement ids of the branch.
        body: Vec<NodeId>,
        /// Statement ids of the else branch.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        orelse: Vec<NodeId>,
    },
    /// Links `operation` to its `functor` variant for the executor.
    Wire {
        /// Which functor the link resolves.
        functor: Functor,
        /// Operation being resolved.
        operation: String,
        /// Definition it resolves to.
        variant: String,
    },
    /// No-op.
    Pass,
}

impl Stmt {
    /// Short label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Import { .. } => "import",
            Stmt::Expr(_) => "expression statement",
            Stmt::Assign { .. } => "assignment",
            Stmt::Def(_) => "definition",
            Stmt::Class { .. } => "class",
            Stmt::With { .. } => "scoped block",
            Stmt::If { .. } => "conditional",
            Stmt::Wire { .. } => "functor wiring",
            Stmt::Pass => "pass",
        }
    }
}

/// A node in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// An expression.
    Expr(Expr),
    /// A statement.
    Stmt(Stmt),
}

impl Node {
    /// `"expression"` or `"statement"`.
    pub fn category(&self) -> &'static str {
        match self {
            Node::Expr(_) => "expression",
            Node::Stmt(_) => "statement",
        }
    }
}
