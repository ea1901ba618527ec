//! Visitor dispatch over a document tree.
//!
//! [`walk`] visits a subtree in document order, calling [`Visitor::enter`] in
//! pre-order and [`Visitor::leave`] in post-order. Handlers steer traversal
//! through [`Visit`]:
//!
//! | signal           | descend | `leave` called |
//! |------------------|---------|----------------|
//! | `Continue`       | yes     | yes            |
//! | `SkipChildren`   | no      | yes            |
//! | `SkipNode`       | no      | no             |
//!
//! Tags a visitor does not claim through [`Visitor::handles`] go to the
//! default entries [`Visitor::enter_unknown`] / [`Visitor::leave_unknown`],
//! which apply the visitor's [`UnknownPolicy`].
//!
//! The engine keeps no output state. The first handler error aborts the walk
//! and comes back wrapped in [`Error::Walk`] naming the node and phase.

use std::fmt;

use crate::error::{Error, Result};
use crate::nodes::{Document, NodeId, NodeRef, Tag};

/// Traversal signal returned from [`Visitor::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visit {
    /// Descend into children, then call `leave`.
    #[default]
    Continue,
    /// Do not descend; `leave` is still called.
    SkipChildren,
    /// Do not descend and do not call `leave`.
    SkipNode,
}

/// What the default entry does with a tag the visitor does not handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPolicy {
    /// Render nothing for the node itself but visit its children.
    #[default]
    Lenient,
    /// Fail with [`Error::UnsupportedNode`].
    Strict,
}

/// Which half of the visit a handler was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Leave,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Enter => "entering",
            Phase::Leave => "leaving",
        })
    }
}

/// Per-tag enter/leave handlers.
pub trait Visitor {
    /// Whether `enter`/`leave` handle this tag. Everything except
    /// [`Tag::Other`] by default.
    fn handles(&self, tag: &Tag) -> bool {
        !tag.is_other()
    }

    fn enter(&mut self, node: NodeRef<'_>) -> Result<Visit>;

    fn leave(&mut self, node: NodeRef<'_>) -> Result<()>;

    fn unknown_policy(&self) -> UnknownPolicy {
        UnknownPolicy::Lenient
    }

    /// Default entry for unhandled tags.
    fn enter_unknown(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        match self.unknown_policy() {
            UnknownPolicy::Lenient => {
                log::debug!("no handler for <{}>, visiting children", node.tag());
                Ok(Visit::Continue)
            }
            UnknownPolicy::Strict => Err(Error::UnsupportedNode {
                tag: node.tag().name().to_string(),
            }),
        }
    }

    fn leave_unknown(&mut self, _node: NodeRef<'_>) -> Result<()> {
        Ok(())
    }
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Walk the subtree rooted at `root`.
///
/// Iterative, so deeply nested trees cannot overflow the call stack.
pub fn walk<V: Visitor + ?Sized>(doc: &Document, root: NodeId, visitor: &mut V) -> Result<()> {
    if !doc.contains(root) {
        return Err(Error::Invariant(format!("walk root {root:?} not in document")));
    }

    let mut stack = vec![Step::Enter(root)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                let node = doc.get(id);
                let result = if visitor.handles(node.tag()) {
                    visitor.enter(node)
                } else {
                    visitor.enter_unknown(node)
                };
                let signal =
                    result.map_err(|e| e.located(node.tag().name(), node.line(), Phase::Enter))?;

                match signal {
                    Visit::SkipNode => {}
                    Visit::SkipChildren => stack.push(Step::Leave(id)),
                    Visit::Continue => {
                        stack.push(Step::Leave(id));
                        let start = stack.len();
                        stack.extend(doc.children(id).map(Step::Enter));
                        stack[start..].reverse();
                    }
                }
            }
            Step::Leave(id) => {
                let node = doc.get(id);
                let result = if visitor.handles(node.tag()) {
                    visitor.leave(node)
                } else {
                    visitor.leave_unknown(node)
                };
                result.map_err(|e| e.located(node.tag().name(), node.line(), Phase::Leave))?;
            }
        }
    }
    Ok(())
}

/// Walk the whole document from its root.
pub fn walkabout<V: Visitor + ?Sized>(doc: &Document, visitor: &mut V) -> Result<()> {
    walk(doc, doc.root(), visitor)
}
