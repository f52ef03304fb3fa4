//! Functor algebra over call expressions.
//!
//! These helpers only allocate new nodes; they never rewrite an existing
//! node in place. The synthesizers decide where the results are attached.

use quoll_ast::{Expr, Functor, NodeId, SyntaxTree};

use crate::error::CompileResult;

/// Whether the innermost form of a functor chain already takes a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// No `Controlled` wrapper in the chain; arguments are the plain ones.
    Identity,
    /// A `Controlled` wrapper is present; the first argument is the control.
    Controlled,
}

/// `Adjoint[target]`
pub fn wrap_adjoint(tree: &mut SyntaxTree, target: NodeId) -> NodeId {
    tree.functor(Functor::Adjoint, target)
}

/// `Controlled[target]`
pub fn wrap_controlled(tree: &mut SyntaxTree, target: NodeId) -> NodeId {
    tree.functor(Functor::Controlled, target)
}

/// Classify a callee by walking its wrapper chain.
///
/// The walk stops at the first `Controlled` wrapper or at the first node
/// that is not a wrapper.
pub fn classify_functor_signature(tree: &SyntaxTree, callee: NodeId) -> CompileResult<Signature> {
    let mut id = callee;
    loop {
        match tree.expr(id)? {
            Expr::Functor {
                functor: Functor::Controlled,
                ..
            } => return Ok(Signature::Controlled),
            Expr::Functor { target, .. } => id = *target,
            _ => return Ok(Signature::Identity),
        }
    }
}

/// The functors wrapping `callee`, outermost first, and the wrapped node.
pub fn functor_chain(tree: &SyntaxTree, callee: NodeId) -> CompileResult<(Vec<Functor>, NodeId)> {
    let mut chain = Vec::new();
    let mut id = callee;
    while let Expr::Functor { functor, target } = tree.expr(id)? {
        chain.push(*functor);
        id = *target;
    }
    Ok((chain, id))
}

/// Name of the operation a callee refers to, looking through wrappers.
///
/// Both `op` and `receiver.op` name the operation `op`.
pub fn operation_name(tree: &SyntaxTree, callee: NodeId) -> CompileResult<Option<&str>> {
    let target = tree.innermost_target(callee)?;
    Ok(match tree.expr(target)? {
        Expr::Name(name) => Some(name.as_str()),
        Expr::Attribute { attr, .. } => Some(attr.as_str()),
        _ => None,
    })
}

/// Combine an existing control argument with a new control reference.
///
/// The result is a single flat [`Expr::ControlAggregate`]: `new_control`
/// first, then the members of `existing` in their original order, with
/// lists and nested aggregates flattened. A member structurally equal to
/// one already present is dropped.
pub fn merge_control(
    tree: &mut SyntaxTree,
    existing: NodeId,
    new_control: NodeId,
) -> CompileResult<NodeId> {
    let mut candidates = vec![new_control];
    flatten_controls(tree, existing, &mut candidates)?;

    let mut members: Vec<NodeId> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let mut duplicate = false;
        for &member in &members {
            if tree.same_structure(member, candidate)? {
                duplicate = true;
                break;
            }
        }
        if !duplicate {
            members.push(candidate);
        }
    }
    Ok(tree.add_expr(Expr::ControlAggregate { members }))
}

fn flatten_controls(tree: &SyntaxTree, id: NodeId, out: &mut Vec<NodeId>) -> CompileResult<()> {
    match tree.expr(id)? {
        Expr::List(items) | Expr::ControlAggregate { members: items } => {
            for &item in items {
                flatten_controls(tree, item, out)?;
            }
        }
        _ => out.push(id),
    }
    Ok(())
}

/// Drop every directly nested `Adjoint[Adjoint[..]]` pair in a chain.
///
/// Returns the node the simplified chain starts at; nodes are reused, not
/// copied.
pub fn cancel_adjoint_pairs(tree: &mut SyntaxTree, callee: NodeId) -> CompileResult<NodeId> {
    let (chain, base) = functor_chain(tree, callee)?;
    let original = chain.len();
    let mut reduced: Vec<Functor> = Vec::with_capacity(chain.len());
    for functor in chain {
        if functor == Functor::Adjoint && reduced.last() == Some(&Functor::Adjoint) {
            reduced.pop();
        } else {
            reduced.push(functor);
        }
    }
    if reduced.len() == original {
        return Ok(callee);
    }
    let mut id = base;
    for functor in reduced.into_iter().rev() {
        id = tree.functor(functor, id);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_identity_and_controlled() {
        let mut tree = SyntaxTree::new();
        let x = tree.name("X");
        assert_eq!(
            classify_functor_signature(&tree, x).unwrap(),
            Signature::Identity
        );

        let adj = wrap_adjoint(&mut tree, x);
        assert_eq!(
            classify_functor_signature(&tree, adj).unwrap(),
            Signature::Identity
        );

        let ctl = wrap_controlled(&mut tree, adj);
        let outer = wrap_adjoint(&mut tree, ctl);
        assert_eq!(
            classify_functor_signature(&tree, outer).unwrap(),
            Signature::Controlled
        );
    }

    #[test]
    fn test_operation_name_through_wrappers() {
        let mut tree = SyntaxTree::new();
        let receiver = tree.name("self");
        let method = tree.attribute(receiver, "prepare");
        let wrapped = wrap_controlled(&mut tree, method);
        assert_eq!(operation_name(&tree, wrapped).unwrap(), Some("prepare"));
    }

    #[test]
    fn test_merge_control_prepends_and_flattens() {
        let mut tree = SyntaxTree::new();
        let c = tree.name("c");
        let d = tree.name("d");
        let existing = tree.list(vec![c, d]);
        let new_control = tree.name("__control");

        let merged = merge_control(&mut tree, existing, new_control).unwrap();
        assert_eq!(tree.render_expr(merged).unwrap(), "[__control, c, d]");
        assert!(matches!(
            tree.expr(merged).unwrap(),
            Expr::ControlAggregate { .. }
        ));
    }

    #[test]
    fn test_merge_control_does_not_duplicate() {
        let mut tree = SyntaxTree::new();
        let c = tree.name("c");
        let again = tree.name("c");
        let merged = merge_control(&mut tree, c, again).unwrap();
        let Expr::ControlAggregate { members } = tree.expr(merged).unwrap() else {
            panic!("expected a control aggregate");
        };
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_merge_control_is_idempotent() {
        let mut tree = SyntaxTree::new();
        let c = tree.name("c");
        let first = tree.name("k");
        let once = merge_control(&mut tree, c, first).unwrap();
        let second = tree.name("k");
        let twice = merge_control(&mut tree, once, second).unwrap();
        assert!(tree.same_structure(once, twice).unwrap());
    }

    #[test]
    fn test_cancel_adjoint_pairs() {
        let mut tree = SyntaxTree::new();
        let x = tree.name("X");
        let ctl = wrap_controlled(&mut tree, x);
        let adj = wrap_adjoint(&mut tree, ctl);
        let adj_adj = wrap_adjoint(&mut tree, adj);

        let simplified = cancel_adjoint_pairs(&mut tree, adj_adj).unwrap();
        assert_eq!(tree.render_expr(simplified).unwrap(), "Controlled[X]");

        // Nothing to cancel: the node itself comes back.
        assert_eq!(cancel_adjoint_pairs(&mut tree, adj).unwrap(), adj);
    }

    proptest! {
        #[test]
        fn prop_merged_controls_stay_flat(names in proptest::collection::vec("[a-e]", 1..8)) {
            let mut tree = SyntaxTree::new();
            let first = tree.name(names[0].clone());
            let mut control = tree.list(vec![first]);
            for name in &names[1..] {
                let new_control = tree.name(name.clone());
                control = merge_control(&mut tree, control, new_control).unwrap();
            }

            let mut distinct = names.clone();
            distinct.sort();
            distinct.dedup();

            let members = match tree.expr(control).unwrap() {
                Expr::ControlAggregate { members } | Expr::List(members) => members.clone(),
                other => panic!("unexpected {}", other.kind_name()),
            };
            prop_assert_eq!(members.len(), distinct.len());
            for member in members {
                prop_assert!(matches!(tree.expr(member).unwrap(), Expr::Name(_)));
            }
        }
    }
}
