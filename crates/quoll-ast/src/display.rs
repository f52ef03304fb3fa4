//! Compact source-like rendering of tree fragments.
//!
//! Used for diagnostics and golden tests. This is not a serializer: the
//! output is close to the dialect's surface syntax but makes no promise of
//! being parseable.

use crate::error::AstResult;
use crate::node::{CompareOp, Expr, NodeId, Stmt};
use crate::tree::SyntaxTree;

const INDENT: &str = "    ";

impl SyntaxTree {
    /// Render an expression on one line.
    pub fn render_expr(&self, id: NodeId) -> AstResult<String> {
        Ok(match self.expr(id)? {
            Expr::Name(name) => name.clone(),
            Expr::Int(value) => value.to_string(),
            Expr::Float(value) => format!("{value:?}"),
            Expr::Bool(true) => "True".into(),
            Expr::Bool(false) => "False".into(),
            Expr::Str(value) => format!("'{value}'"),
            Expr::Attribute { value, attr } => format!("{}.{attr}", self.render_expr(*value)?),
            Expr::Call {
                func,
                args,
                keywords,
            } => {
                let mut parts = self.render_list(args)?;
                for keyword in keywords {
                    parts.push(format!(
                        "{}={}",
                        keyword.name,
                        self.render_expr(keyword.value)?
                    ));
                }
                format!("{}({})", self.render_expr(*func)?, parts.join(", "))
            }
            Expr::Functor { functor, target } => {
                format!("{functor}[{}]", self.render_expr(*target)?)
            }
            Expr::ControlAggregate { members } | Expr::List(members) => {
                format!("[{}]", self.render_list(members)?.join(", "))
            }
            Expr::Tuple(items) if items.len() == 1 => {
                format!("({},)", self.render_expr(items[0])?)
            }
            Expr::Tuple(items) => format!("({})", self.render_list(items)?.join(", ")),
            Expr::Compare { left, op, right } => {
                let op = match op {
                    CompareOp::Eq => "==",
                    CompareOp::NotEq => "!=",
                };
                format!(
                    "{} {op} {}",
                    self.render_expr(*left)?,
                    self.render_expr(*right)?
                )
            }
        })
    }

    fn render_list(&self, ids: &[NodeId]) -> AstResult<Vec<String>> {
        ids.iter().map(|&id| self.render_expr(id)).collect()
    }

    /// Render a statement block, one line per simple statement.
    pub fn render_block(&self, ids: &[NodeId]) -> AstResult<Vec<String>> {
        let mut lines = Vec::new();
        for &id in ids {
            self.render_stmt_into(id, 0, &mut lines)?;
        }
        Ok(lines)
    }

    /// Render the whole module.
    pub fn render_module(&self) -> AstResult<String> {
        Ok(self.render_block(self.body())?.join("\n"))
    }

    fn render_nested(&self, ids: &[NodeId], depth: usize, out: &mut Vec<String>) -> AstResult<()> {
        if ids.is_empty() {
            out.push(format!("{}pass", INDENT.repeat(depth)));
        }
        for &id in ids {
            self.render_stmt_into(id, depth, out)?;
        }
        Ok(())
    }

    fn render_stmt_into(&self, id: NodeId, depth: usize, out: &mut Vec<String>) -> AstResult<()> {
        let pad = INDENT.repeat(depth);
        match self.stmt(id)? {
            Stmt::Import { module, alias } => out.push(format!("{pad}import {module} as {alias}")),
            Stmt::Expr(expr) => out.push(format!("{pad}{}", self.render_expr(*expr)?)),
            Stmt::Assign { target, value } => out.push(format!(
                "{pad}{} = {}",
                self.render_expr(*target)?,
                self.render_expr(*value)?
            )),
            Stmt::Def(def) => {
                if let Some(markers) = def.operation {
                    out.push(format!(
                        "{pad}@qdef(adj={}, ctl={})",
                        py_bool(markers.adjoint),
                        py_bool(markers.controlled)
                    ));
                }
                out.push(format!("{pad}def {}({}):", def.name, def.params.join(", ")));
                self.render_nested(&def.body, depth + 1, out)?;
            }
            Stmt::Class { name, body } => {
                out.push(format!("{pad}class {name}:"));
                self.render_nested(body, depth + 1, out)?;
            }
            Stmt::With {
                context,
                binding,
                body,
            } => {
                let context = self.render_expr(*context)?;
                match binding {
                    Some(binding) => out.push(format!(
                        "{pad}with {context} as {}:",
                        self.render_expr(*binding)?
                    )),
                    None => out.push(format!("{pad}with {context}:")),
                }
                self.render_nested(body, depth + 1, out)?;
            }
            Stmt::If { test, body, orelse } => {
                out.push(format!("{pad}if {}:", self.render_expr(*test)?));
                self.render_nested(body, depth + 1, out)?;
                if !orelse.is_empty() {
                    out.push(format!("{pad}else:"));
                    self.render_nested(orelse, depth + 1, out)?;
                }
            }
            Stmt::Wire {
                functor,
                operation,
                variant,
            } => out.push(format!("{pad}{functor}[{operation}] := {variant}")),
            Stmt::Pass => out.push(format!("{pad}pass")),
        }
        Ok(())
    }
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
