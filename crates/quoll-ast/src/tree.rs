//! Arena-backed syntax tree.

use serde::{Deserialize, Serialize};

use crate::error::{AstError, AstResult};
use crate::node::{CompareOp, Expr, Functor, Keyword, Node, NodeId, Stmt};

/// A module-level syntax tree.
///
/// Every node lives in a single arena and is addressed by [`NodeId`].
/// Rewriting passes never share a node between two places in the tree:
/// deriving a new body goes through [`SyntaxTree::deep_copy_block`], which
/// allocates fresh nodes for the whole subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    /// Node arena. Ids index into this vector and are never reused.
    nodes: Vec<Node>,
    /// Top-level statements of the module.
    body: Vec<NodeId>,
}

impl SyntaxTree {
    /// Create an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a tree from its JSON form.
    ///
    /// Every id referenced by the document must point into its arena.
    pub fn from_json(source: &str) -> AstResult<Self> {
        let tree: SyntaxTree =
            serde_json::from_str(source).map_err(|e| AstError::InvalidDocument(e.to_string()))?;
        tree.validate()?;
        Ok(tree)
    }

    /// Encode the tree as JSON.
    pub fn to_json(&self, pretty: bool) -> AstResult<String> {
        let encoded = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        encoded.map_err(|e| AstError::InvalidDocument(e.to_string()))
    }

    /// Check that every reference resolves and the body forms a tree.
    ///
    /// A node reached twice, through a cycle or from two parents, makes the
    /// document invalid.
    pub fn validate(&self) -> AstResult<()> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack: Vec<NodeId> = self.body.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let children = self.children(id)?;
            if std::mem::replace(&mut seen[id.index()], true) {
                return Err(AstError::InvalidDocument(format!(
                    "node {} is reachable more than once",
                    id.0
                )));
            }
            stack.extend(children.into_iter().rev());
        }
        Ok(())
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level statements.
    pub fn body(&self) -> &[NodeId] {
        &self.body
    }

    /// Replace the top-level statements.
    pub fn set_body(&mut self, body: Vec<NodeId>) {
        self.body = body;
    }

    /// Append a top-level statement.
    pub fn push_body(&mut self, stmt: NodeId) {
        self.body.push(stmt);
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::from(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Allocate an expression node.
    pub fn add_expr(&mut self, expr: Expr) -> NodeId {
        self.push(Node::Expr(expr))
    }

    /// Allocate a statement node.
    pub fn add_stmt(&mut self, stmt: Stmt) -> NodeId {
        self.push(Node::Stmt(stmt))
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> AstResult<&Node> {
        self.nodes.get(id.index()).ok_or(AstError::NodeNotFound(id))
    }

    /// Look up an expression node.
    pub fn expr(&self, id: NodeId) -> AstResult<&Expr> {
        match self.node(id)? {
            Node::Expr(expr) => Ok(expr),
            other => Err(AstError::KindMismatch {
                id,
                expected: "expression",
                found: other.category(),
            }),
        }
    }

    /// Look up a statement node.
    pub fn stmt(&self, id: NodeId) -> AstResult<&Stmt> {
        match self.node(id)? {
            Node::Stmt(stmt) => Ok(stmt),
            other => Err(AstError::KindMismatch {
                id,
                expected: "statement",
                found: other.category(),
            }),
        }
    }

    /// Mutable access to an expression node.
    pub fn expr_mut(&mut self, id: NodeId) -> AstResult<&mut Expr> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Expr(expr)) => Ok(expr),
            Some(other) => Err(AstError::KindMismatch {
                id,
                expected: "expression",
                found: other.category(),
            }),
            None => Err(AstError::NodeNotFound(id)),
        }
    }

    /// Mutable access to a statement node.
    pub fn stmt_mut(&mut self, id: NodeId) -> AstResult<&mut Stmt> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Stmt(stmt)) => Ok(stmt),
            Some(other) => Err(AstError::KindMismatch {
                id,
                expected: "statement",
                found: other.category(),
            }),
            None => Err(AstError::NodeNotFound(id)),
        }
    }

    // ------------------------------------------------------------------
    // Construction helpers
    // ------------------------------------------------------------------

    /// `name`
    pub fn name(&mut self, name: impl Into<String>) -> NodeId {
        self.add_expr(Expr::Name(name.into()))
    }

    /// Integer literal.
    pub fn int(&mut self, value: i64) -> NodeId {
        self.add_expr(Expr::Int(value))
    }

    /// `func(args...)`
    pub fn call(&mut self, func: NodeId, args: Vec<NodeId>) -> NodeId {
        self.add_expr(Expr::Call {
            func,
            args,
            keywords: vec![],
        })
    }

    /// `name(args...)`
    pub fn call_named(&mut self, name: impl Into<String>, args: Vec<NodeId>) -> NodeId {
        let func = self.name(name);
        self.call(func, args)
    }

    /// `value.attr`
    pub fn attribute(&mut self, value: NodeId, attr: impl Into<String>) -> NodeId {
        self.add_expr(Expr::Attribute {
            value,
            attr: attr.into(),
        })
    }

    /// `Functor[target]`
    pub fn functor(&mut self, functor: Functor, target: NodeId) -> NodeId {
        self.add_expr(Expr::Functor { functor, target })
    }

    /// `[items...]`
    pub fn list(&mut self, items: Vec<NodeId>) -> NodeId {
        self.add_expr(Expr::List(items))
    }

    /// `(items...)`
    pub fn tuple(&mut self, items: Vec<NodeId>) -> NodeId {
        self.add_expr(Expr::Tuple(items))
    }

    /// `left == right`
    pub fn equals(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.add_expr(Expr::Compare {
            left,
            op: CompareOp::Eq,
            right,
        })
    }

    /// Expression statement.
    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.add_stmt(Stmt::Expr(expr))
    }

    /// `target = value`
    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.add_stmt(Stmt::Assign { target, value })
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Direct children of a node, expressions and statements alike.
    pub fn children(&self, id: NodeId) -> AstResult<Vec<NodeId>> {
        Ok(match self.node(id)? {
            Node::Expr(expr) => expr.children(),
            Node::Stmt(stmt) => stmt_children(stmt),
        })
    }

    /// Every node reachable from `root`, in pre-order, `root` included.
    pub fn subtree(&self, root: NodeId) -> AstResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let children = self.children(id)?;
            out.push(id);
            stack.extend(children.into_iter().rev());
        }
        Ok(out)
    }

    /// Whether two statement blocks have any node in common.
    pub fn shares_nodes(&self, a: &[NodeId], b: &[NodeId]) -> AstResult<bool> {
        let mut seen = vec![false; self.nodes.len()];
        for &root in a {
            for id in self.subtree(root)? {
                seen[id.index()] = true;
            }
        }
        for &root in b {
            for id in self.subtree(root)? {
                if seen[id.index()] {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Follow a chain of functor applications down to the wrapped operation.
    pub fn innermost_target(&self, mut id: NodeId) -> AstResult<NodeId> {
        while let Expr::Functor { target, .. } = self.expr(id)? {
            id = *target;
        }
        Ok(id)
    }

    /// Copy a subtree into freshly allocated nodes.
    pub fn deep_copy(&mut self, id: NodeId) -> AstResult<NodeId> {
        let copied = match self.node(id)?.clone() {
            Node::Expr(expr) => Node::Expr(self.copy_expr(expr)?),
            Node::Stmt(stmt) => Node::Stmt(self.copy_stmt(stmt)?),
        };
        Ok(self.push(copied))
    }

    /// Copy every statement of a block.
    pub fn deep_copy_block(&mut self, ids: &[NodeId]) -> AstResult<Vec<NodeId>> {
        ids.iter().map(|&id| self.deep_copy(id)).collect()
    }

    fn copy_expr(&mut self, expr: Expr) -> AstResult<Expr> {
        Ok(match expr {
            leaf @ (Expr::Name(_)
            | Expr::Int(_)
            | Expr::Float(_)
            | Expr::Bool(_)
            | Expr::Str(_)) => leaf,
            Expr::Attribute { value, attr } => Expr::Attribute {
                value: self.deep_copy(value)?,
                attr,
            },
            Expr::Call {
                func,
                args,
                keywords,
            } => {
                let func = self.deep_copy(func)?;
                let args = self.deep_copy_block(&args)?;
                let mut copied = Vec::with_capacity(keywords.len());
                for keyword in keywords {
                    copied.push(Keyword {
                        value: self.deep_copy(keyword.value)?,
                        name: keyword.name,
                    });
                }
                Expr::Call {
                    func,
                    args,
                    keywords: copied,
                }
            }
            Expr::Functor { functor, target } => Expr::Functor {
                functor,
                target: self.deep_copy(target)?,
            },
            Expr::ControlAggregate { members } => Expr::ControlAggregate {
                members: self.deep_copy_block(&members)?,
            },
            Expr::List(items) => Expr::List(self.deep_copy_block(&items)?),
            Expr::Tuple(items) => Expr::Tuple(self.deep_copy_block(&items)?),
            Expr::Compare { left, op, right } => Expr::Compare {
                left: self.deep_copy(left)?,
                op,
                right: self.deep_copy(right)?,
            },
        })
    }

    fn copy_stmt(&mut self, stmt: Stmt) -> AstResult<Stmt> {
        Ok(match stmt {
            leaf @ (Stmt::Import { .. } | Stmt::Wire { .. } | Stmt::Pass) => leaf,
            Stmt::Expr(expr) => Stmt::Expr(self.deep_copy(expr)?),
            Stmt::Assign { target, value } => Stmt::Assign {
                target: self.deep_copy(target)?,
                value: self.deep_copy(value)?,
            },
            Stmt::Def(mut def) => {
                def.body = self.deep_copy_block(&def.body)?;
                Stmt::Def(def)
            }
            Stmt::Class { name, body } => Stmt::Class {
                name,
                body: self.deep_copy_block(&body)?,
            },
            Stmt::With {
                context,
                binding,
                body,
            } => Stmt::With {
                context: self.deep_copy(context)?,
                binding: binding.map(|b| self.deep_copy(b)).transpose()?,
                body: self.deep_copy_block(&body)?,
            },
            Stmt::If { test, body, orelse } => Stmt::If {
                test: self.deep_copy(test)?,
                body: self.deep_copy_block(&body)?,
                orelse: self.deep_copy_block(&orelse)?,
            },
        })
    }

    /// Structural equality of two subtrees, ignoring node ids.
    pub fn same_structure(&self, a: NodeId, b: NodeId) -> AstResult<bool> {
        let equal_shallow = match (self.node(a)?, self.node(b)?) {
            (Node::Expr(x), Node::Expr(y)) => shallow_expr_eq(x, y),
            (Node::Stmt(x), Node::Stmt(y)) => shallow_stmt_eq(x, y),
            _ => false,
        };
        if !equal_shallow {
            return Ok(false);
        }
        let left = self.children(a)?;
        let right = self.children(b)?;
        self.same_blocks(&left, &right)
    }

    /// Pairwise [`same_structure`](Self::same_structure) over two blocks.
    pub fn same_blocks(&self, a: &[NodeId], b: &[NodeId]) -> AstResult<bool> {
        if a.len() != b.len() {
            return Ok(false);
        }
        for (&x, &y) in a.iter().zip(b) {
            if !self.same_structure(x, y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Direct children of a statement: its expressions, then nested statements.
fn stmt_children(stmt: &Stmt) -> Vec<NodeId> {
    match stmt {
        Stmt::Import { .. } | Stmt::Wire { .. } | Stmt::Pass => vec![],
        Stmt::Expr(expr) => vec![*expr],
        Stmt::Assign { target, value } => vec![*target, *value],
        Stmt::Def(def) => def.body.clone(),
        Stmt::Class { body, .. } => body.clone(),
        Stmt::With {
            context,
            binding,
            body,
        } => std::iter::once(*context)
            .chain(*binding)
            .chain(body.iter().copied())
            .collect(),
        Stmt::If { test, body, orelse } => std::iter::once(*test)
            .chain(body.iter().copied())
            .chain(orelse.iter().copied())
            .collect(),
    }
}

/// Compare everything except child ids.
fn shallow_expr_eq(a: &Expr, b: &Expr) -> bool {
    match (a, b) {
        (Expr::Name(x), Expr::Name(y)) | (Expr::Str(x), Expr::Str(y)) => x == y,
        (Expr::Int(x), Expr::Int(y)) => x == y,
        (Expr::Float(x), Expr::Float(y)) => x == y,
        (Expr::Bool(x), Expr::Bool(y)) => x == y,
        (Expr::Attribute { attr: x, .. }, Expr::Attribute { attr: y, .. }) => x == y,
        (
            Expr::Call {
                args: xa,
                keywords: xk,
                ..
            },
            Expr::Call {
                args: ya,
                keywords: yk,
                ..
            },
        ) => {
            xa.len() == ya.len()
                && xk.len() == yk.len()
                && xk.iter().zip(yk).all(|(p, q)| p.name == q.name)
        }
        (Expr::Functor { functor: x, .. }, Expr::Functor { functor: y, .. }) => x == y,
        (Expr::ControlAggregate { members: x }, Expr::ControlAggregate { members: y })
        | (Expr::List(x), Expr::List(y))
        | (Expr::Tuple(x), Expr::Tuple(y)) => x.len() == y.len(),
        (Expr::Compare { op: x, .. }, Expr::Compare { op: y, .. }) => x == y,
        _ => false,
    }
}

fn shallow_stmt_eq(a: &Stmt, b: &Stmt) -> bool {
    match (a, b) {
        (Stmt::Import { .. }, Stmt::Import { .. }) | (Stmt::Wire { .. }, Stmt::Wire { .. }) => {
            a == b
        }
        (Stmt::Expr(_), Stmt::Expr(_))
        | (Stmt::Assign { .. }, Stmt::Assign { .. })
        | (Stmt::Pass, Stmt::Pass) => true,
        (Stmt::Def(x), Stmt::Def(y)) => {
            x.name == y.name
                && x.params == y.params
                && x.operation == y.operation
                && x.body.len() == y.body.len()
        }
        (Stmt::Class { name: x, body: xb }, Stmt::Class { name: y, body: yb }) => {
            x == y && xb.len() == yb.len()
        }
        (
            Stmt::With {
                binding: xb,
                body: xs,
                ..
            },
            Stmt::With {
                binding: yb,
                body: ys,
                ..
            },
        ) => xb.is_some() == yb.is_some() && xs.len() == ys.len(),
        (
            Stmt::If {
                body: xb,
                orelse: xo,
                ..
            },
            Stmt::If {
                body: yb,
                orelse: yo,
                ..
            },
        ) => xb.len() == yb.len() && xo.len() == yo.len(),
        _ => false,
    }
}
