use crate::{AstNode, AstValue};

/// A tree whose nodes hold their children in fields.
pub trait Tree: Sized {
    /// Child nodes held by field `index` in source order, or `None` past the
    /// last field.
    fn field_children(&self, index: usize) -> Option<&[Self]>;

    /// Returns a preorder iterator over nodes.
    fn preorder(&self) -> Preorder<'_, Self> {
        Preorder::new(self)
    }

    /// Number of nodes on the longest path from this node down to a leaf.
    fn depth(&self) -> usize {
        let (mut depth, mut deepest) = (0, 0);
        for event in self.preorder() {
            match event {
                WalkEvent::Enter(_) => {
                    depth += 1;
                    deepest = deepest.max(depth);
                }
                WalkEvent::Leave(_) => depth -= 1,
            }
        }
        deepest
    }

    /// Computes a value bottom-up. `leave` gets each node together with the
    /// values of its children, in the order [`Tree::preorder`] enters them.
    fn fold<'a, T, E>(
        &'a self,
        mut leave: impl FnMut(&'a Self, std::vec::IntoIter<T>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut open: Vec<Vec<T>> = Vec::new();
        for event in self.preorder() {
            match event {
                WalkEvent::Enter(_) => open.push(Vec::new()),
                WalkEvent::Leave(node) => {
                    let children = open.pop().unwrap_or_default();
                    let value = leave(node, children.into_iter())?;
                    match open.last_mut() {
                        Some(parent) => parent.push(value),
                        None => return Ok(value),
                    }
                }
            }
        }
        unreachable!("a preorder walk ends by leaving its root")
    }
}

impl Tree for AstNode {
    fn field_children(&self, index: usize) -> Option<&[Self]> {
        let (_, value) = self.fields().get(index)?;
        Some(match value {
            AstValue::Node(node) => std::slice::from_ref(&**node),
            AstValue::List(items) => items,
            AstValue::Null | AstValue::Scalar(_) => &[],
        })
    }
}

/// Preorder walk event for nodes.
#[derive(Debug)]
pub enum WalkEvent<'a, N> {
    Enter(&'a N),
    Leave(&'a N),
}

struct Cursor<'a, N> {
    node: &'a N,
    field: usize,
    item: usize,
}

/// Preorder traversal over nodes.
///
/// Keeps its own stack, so trees of any depth are walked in constant native
/// stack space.
pub struct Preorder<'a, N> {
    stack: Vec<Cursor<'a, N>>,
    root: Option<&'a N>,
}

impl<'a, N: Tree> Preorder<'a, N> {
    fn new(root: &'a N) -> Self {
        Self { stack: Vec::with_capacity(64), root: Some(root) }
    }

    fn enter(&mut self, node: &'a N) -> WalkEvent<'a, N> {
        self.stack.push(Cursor { node, field: 0, item: 0 });
        WalkEvent::Enter(node)
    }
}

impl<'a, N: Tree> Iterator for Preorder<'a, N> {
    type Item = WalkEvent<'a, N>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(active) = self.stack.last_mut() else {
            let root = self.root.take()?;
            return Some(self.enter(root));
        };

        let child = loop {
            let node: &'a N = active.node;
            let Some(children) = node.field_children(active.field) else { break None };
            if let Some(child) = children.get(active.item) {
                active.item += 1;
                break Some(child);
            }
            active.field += 1;
            active.item = 0;
        };

        match child {
            Some(child) => Some(self.enter(child)),
            None => self.stack.pop().map(|exited| WalkEvent::Leave(exited.node)),
        }
    }
}
