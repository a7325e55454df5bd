use std::convert::Infallible;
use std::fmt;

use jscst_ast::{AstNode, AstValue, Scalar, Tree, WalkEvent};

use crate::ExtrasRecord;
use crate::schedule::{AnchorRole, Owner};

/// A node of the concrete syntax tree: an AST node plus its extras.
///
/// Fields follow the grammar's order. Under the virtual node strategy a
/// field may hold a [`VirtualNode`] in place of the value it wraps.
#[derive(Clone, Debug, PartialEq)]
pub struct CstNode {
    ty: String,
    fields: Vec<(String, CstValue)>,
    extras: ExtrasRecord,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CstValue {
    Node(Box<CstNode>),
    Null,
    List(Vec<CstNode>),
    Scalar(Scalar),
    Virtual(Box<VirtualNode>),
}

/// A synthetic anchor standing for a syntactic position with no AST node.
#[derive(Clone, Debug, PartialEq)]
pub struct VirtualNode {
    role: AnchorRole,
    /// `None` when the wrapped value is empty.
    wrapped: Option<CstValue>,
    extras: ExtrasRecord,
}

impl CstNode {
    pub fn new(
        ty: impl Into<String>,
        fields: Vec<(String, CstValue)>,
        extras: ExtrasRecord,
    ) -> Self {
        Self { ty: ty.into(), fields, extras }
    }

    /// A pure AST seen as a CST without any extras or virtual nodes.
    pub fn lift(ast: &AstNode) -> Self {
        let Ok(lifted) = ast.fold(|node, mut children| {
            let fields = node
                .fields()
                .iter()
                .map(|(name, value)| {
                    let value = match value {
                        AstValue::Node(_) => children
                            .next()
                            .map_or(CstValue::Null, |child| CstValue::Node(Box::new(child))),
                        AstValue::Null => CstValue::Null,
                        AstValue::List(items) => {
                            CstValue::List(children.by_ref().take(items.len()).collect())
                        }
                        AstValue::Scalar(scalar) => CstValue::Scalar(scalar.clone()),
                    };
                    (name.clone(), value)
                })
                .collect();
            Ok::<_, Infallible>(Self::new(node.ty(), fields, ExtrasRecord::default()))
        });
        lifted
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn fields(&self) -> &[(String, CstValue)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CstValue> {
        self.fields.iter().find(|(field, _)| field == name).map(|(_, value)| value)
    }

    pub fn extras(&self) -> &ExtrasRecord {
        &self.extras
    }

    pub(crate) fn anchor_mut(&mut self) -> (Owner<'_>, &mut ExtrasRecord) {
        (Owner::Node(&self.ty), &mut self.extras)
    }

    /// Number of non-empty labels in this subtree.
    pub(crate) fn label_count(&self) -> usize {
        self.preorder()
            .filter_map(|event| match event {
                WalkEvent::Enter(node) => Some(node),
                WalkEvent::Leave(_) => None,
            })
            .map(|node| {
                let virtual_labels: usize =
                    node.fields.iter().map(|(_, value)| value.virtual_labels()).sum();
                node.extras.len() + virtual_labels
            })
            .sum()
    }
}

impl Tree for CstNode {
    fn field_children(&self, index: usize) -> Option<&[Self]> {
        let (_, value) = self.fields.get(index)?;
        Some(value.nodes())
    }
}

impl Drop for CstNode {
    fn drop(&mut self) {
        let mut values = self.fields.drain(..).map(|(_, value)| value).collect::<Vec<_>>();
        while let Some(value) = values.pop() {
            match value {
                CstValue::Node(mut node) => {
                    values.extend(node.fields.drain(..).map(|(_, value)| value));
                }
                CstValue::List(items) => {
                    for mut item in items {
                        values.extend(item.fields.drain(..).map(|(_, value)| value));
                    }
                }
                CstValue::Virtual(node) => values.extend(node.wrapped),
                CstValue::Null | CstValue::Scalar(_) => {}
            }
        }
    }
}

impl CstValue {
    /// The nodes this value holds, looking through virtual nodes.
    fn nodes(&self) -> &[CstNode] {
        let mut value = self;
        while let Self::Virtual(node) = value {
            match &node.wrapped {
                Some(wrapped) => value = wrapped,
                None => return &[],
            }
        }
        match value {
            Self::Node(node) => std::slice::from_ref(&**node),
            Self::List(items) => items,
            Self::Null | Self::Scalar(_) | Self::Virtual(_) => &[],
        }
    }

    fn virtual_labels(&self) -> usize {
        let mut count = 0;
        let mut value = self;
        while let Self::Virtual(node) = value {
            count += node.extras.len();
            match &node.wrapped {
                Some(wrapped) => value = wrapped,
                None => break,
            }
        }
        count
    }
}

impl VirtualNode {
    pub fn new(role: AnchorRole, wrapped: Option<CstValue>, extras: ExtrasRecord) -> Self {
        Self { role, wrapped, extras }
    }

    pub fn role(&self) -> AnchorRole {
        self.role
    }

    pub fn wrapped(&self) -> Option<&CstValue> {
        self.wrapped.as_ref()
    }

    pub fn extras(&self) -> &ExtrasRecord {
        &self.extras
    }

    pub(crate) fn anchor_mut(&mut self) -> (Owner<'_>, &mut ExtrasRecord) {
        (Owner::Virtual(self.role), &mut self.extras)
    }
}

/// An indented outline of the tree, one field or label per line.
impl fmt::Display for CstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.ty)?;

        let mut pending = vec![Line::Body(self, 1)];
        while let Some(line) = pending.pop() {
            match line {
                Line::Body(node, depth) => {
                    write_extras(f, &node.extras, depth)?;
                    let fields = node.fields.iter().rev();
                    pending.extend(fields.map(|(name, value)| Line::Field(name, value, depth)));
                }
                Line::Item(node, depth) => {
                    writeln!(f, "{:indent$}- {}", "", node.ty, indent = depth * 2)?;
                    pending.push(Line::Body(node, depth + 1));
                }
                Line::Field(name, value, depth) => {
                    write_field(f, name, value, depth, &mut pending)?;
                }
            }
        }
        Ok(())
    }
}

/// Outline entries still to be written, each with its depth.
enum Line<'c> {
    Body(&'c CstNode, usize),
    Item(&'c CstNode, usize),
    Field(&'c str, &'c CstValue, usize),
}

fn write_extras(f: &mut fmt::Formatter<'_>, extras: &ExtrasRecord, depth: usize) -> fmt::Result {
    for (label, tokens) in extras.iter() {
        write!(f, "{:indent$}@{label}", "", indent = depth * 2)?;
        for token in tokens {
            write!(f, " {:?}", token.text())?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn push_items<'c>(pending: &mut Vec<Line<'c>>, items: &'c [CstNode], depth: usize) {
    pending.extend(items.iter().rev().map(|item| Line::Item(item, depth)));
}

/// Writes the first line of a field and queues what goes under it.
fn write_field<'c>(
    f: &mut fmt::Formatter<'_>,
    name: &'c str,
    value: &'c CstValue,
    depth: usize,
    pending: &mut Vec<Line<'c>>,
) -> fmt::Result {
    let indent = depth * 2;
    match value {
        CstValue::Node(node) => {
            writeln!(f, "{:indent$}{name}: {}", "", node.ty)?;
            pending.push(Line::Body(node, depth + 1));
        }
        CstValue::Null => writeln!(f, "{:indent$}{name}: null", "")?,
        CstValue::Scalar(scalar) => {
            let Ok(scalar) = serde_json::to_string(scalar) else { return Err(fmt::Error) };
            writeln!(f, "{:indent$}{name}: {scalar}", "")?;
        }
        CstValue::List(items) if items.is_empty() => writeln!(f, "{:indent$}{name}: []", "")?,
        CstValue::List(items) => {
            writeln!(f, "{:indent$}{name}:", "")?;
            push_items(pending, items, depth + 1);
        }
        CstValue::Virtual(node) => {
            let role = node.role;
            match &node.wrapped {
                Some(CstValue::List(items)) if items.is_empty() => {
                    writeln!(f, "{:indent$}{name}: <{role}> []", "")?;
                }
                _ => writeln!(f, "{:indent$}{name}: <{role}>", "")?,
            }
            write_extras(f, &node.extras, depth + 1)?;
            match &node.wrapped {
                Some(CstValue::List(items)) => push_items(pending, items, depth + 1),
                Some(wrapped) => pending.push(Line::Field(name, wrapped, depth + 1)),
                None => {}
            }
        }
    }
    Ok(())
}
