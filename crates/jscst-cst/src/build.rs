use jscst_ast::{AstNode, AstValue, FieldShape, Scalar, ShapeError};
use jscst_syntax::{SourceToken, Token};
use text_size::{TextRange, TextSize};
use tracing::trace;

use crate::schedule::{AnchorTarget, Element, Gap, Owner, Slot};
use crate::strategy::unresolvable;
use crate::{CstError, CstNode, CstValue, ExtrasRecord, Label, Schema, VirtualNode};

/// Builds the CST of `ast` from the complete token stream it was parsed from.
///
/// Walks each node's slot schedule, consuming semantic tokens as the
/// schedule names them and attaching each run of extras between two
/// elements to the anchor the schema's strategy picks for that gap.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(strategy = schema.strategy().name(), tokens = tokens.len())
)]
pub fn build(
    schema: &Schema,
    ast: &AstNode,
    tokens: &[SourceToken],
) -> Result<CstNode, CstError> {
    check_tiling(tokens)?;
    schema.grammar().check(ast)?;

    let mut builder = Builder { schema, tokens, pos: 0 };
    let root = builder.run(ast)?;
    if builder.pos < tokens.len() {
        return Err(builder.mismatch("the end of input".to_owned()));
    }
    Ok(root)
}

/// Token ranges must follow each other without gaps, starting at zero.
fn check_tiling(tokens: &[SourceToken]) -> Result<(), CstError> {
    let mut offset = TextSize::new(0);
    for SourceToken { token, .. } in tokens {
        let range = token.range();
        if range.start() != offset || token.text().len() != usize::from(range.len()) {
            return Err(CstError::TokenStreamMismatch {
                expected: format!("a token starting at offset {}", u32::from(offset)),
                found: format!("{:?} at {}", token.text(), token.span),
                range,
            });
        }
        offset = range.end();
    }
    Ok(())
}

/// Extras a parent hands to a child it is about to build.
struct Attachment {
    label: Label,
    tokens: Vec<Token>,
}

/// Position of a built child inside a frame's fields.
#[derive(Clone, Copy)]
struct ChildSlot {
    field: usize,
    item: Option<usize>,
}

/// A node or virtual node under construction.
struct Frame<'t> {
    owner: Owner<'t>,
    ast: &'t AstNode,
    schedule: &'static [Slot],
    extras: ExtrasRecord,
    /// Fields in schedule order.
    fields: Vec<(String, CstValue)>,
    left: Option<Element>,
    last_child: Option<ChildSlot>,
    root: bool,
    /// The slot being filled.
    slot: usize,
    /// The next item of a list slot, and the field the list is stored in.
    item: usize,
    list: Option<usize>,
}

/// A finished frame, ready to be stored in its parent.
enum Built {
    Node(CstNode),
    Virtual(String, VirtualNode),
}

impl Frame<'_> {
    fn enter(&mut self, element: Element, child: Option<ChildSlot>) {
        self.left = Some(element);
        self.last_child = child;
    }

    fn push_child(&mut self, element: Element, field: &str, value: CstValue) {
        self.fields.push((field.to_owned(), value));
        let child = ChildSlot { field: self.fields.len() - 1, item: None };
        self.enter(element, Some(child));
    }

    fn child_anchor(&mut self, child: ChildSlot) -> Option<(Owner<'_>, &mut ExtrasRecord)> {
        let (_, value) = self.fields.get_mut(child.field)?;
        match (value, child.item) {
            (CstValue::List(items), Some(index)) => items.get_mut(index).map(CstNode::anchor_mut),
            (CstValue::Node(node), None) => Some(node.anchor_mut()),
            (CstValue::Virtual(node), None) => Some(node.anchor_mut()),
            _ => None,
        }
    }

    /// Stores the child built for the current slot and moves past it.
    fn attach(&mut self, built: Built) -> Result<(), CstError> {
        let slot = self.slot;
        match (self.schedule.get(slot), built) {
            (Some(Slot::List { .. }), Built::Node(node)) => {
                let index = self.item;
                let Some(list) = self.list else {
                    return Err(CstError::incomplete(self.owner, "list item outside of a list"));
                };
                if let (_, CstValue::List(items)) = &mut self.fields[list] {
                    items.push(node);
                }
                let child = ChildSlot { field: list, item: Some(index) };
                self.enter(Element::Item { slot, index }, Some(child));
                self.item += 1;
            }
            (Some(Slot::Node(field) | Slot::Optional(field)), Built::Node(node)) => {
                let value = CstValue::Node(Box::new(node));
                self.push_child(Element::Child { slot }, field, value);
                self.slot += 1;
            }
            (Some(Slot::Virtual(_)), Built::Virtual(field, node)) => {
                let value = CstValue::Virtual(Box::new(node));
                self.push_child(Element::Child { slot }, &field, value);
                self.slot += 1;
            }
            _ => return Err(CstError::incomplete(self.owner, "child does not fit its slot")),
        }
        Ok(())
    }

    /// Orders the fields the way the grammar declares them.
    fn finish(mut self, schema: &Schema) -> Result<Built, CstError> {
        let owner = self.owner;
        let ty = match owner {
            Owner::Node(ty) => ty,
            Owner::Virtual(role) => {
                let (field, value) =
                    self.fields.pop().ok_or_else(|| CstError::incomplete(owner, "wraps no field"))?;
                let wrapped = match value {
                    CstValue::List(items) if items.is_empty() => None,
                    value => Some(value),
                };
                return Ok(Built::Virtual(field, VirtualNode::new(role, wrapped, self.extras)));
            }
        };

        let declared =
            schema.grammar().fields(ty).ok_or_else(|| ShapeError::UnknownType(ty.to_owned()))?;
        let mut fields = Vec::with_capacity(declared.len());
        for def in declared {
            let index =
                self.fields.iter().position(|(name, _)| *name == def.name).ok_or_else(|| {
                    CstError::incomplete(owner, format!("field `{}` is not placed", def.name))
                })?;
            fields.push(self.fields.swap_remove(index));
        }
        Ok(Built::Node(CstNode::new(ty, fields, self.extras)))
    }
}

struct Builder<'a> {
    schema: &'a Schema,
    tokens: &'a [SourceToken],
    pos: usize,
}

impl Builder<'_> {
    /// Builds the tree with an explicit stack of frames, so the depth of the
    /// AST is bounded by memory rather than by the native stack.
    fn run(&mut self, ast: &AstNode) -> Result<CstNode, CstError> {
        let mut stack = Vec::new();
        let mut frame = self.frame(Owner::Node(ast.ty()), ast, None, true)?;
        loop {
            if let Some(child) = self.step(&mut frame)? {
                stack.push(std::mem::replace(&mut frame, child));
                continue;
            }
            let built = frame.finish(self.schema)?;
            match stack.pop() {
                Some(parent) => {
                    frame = parent;
                    frame.attach(built)?;
                }
                None => {
                    let Built::Node(root) = built else {
                        return Err(CstError::incomplete(Owner::Node(ast.ty()), "is not a node"));
                    };
                    return Ok(root);
                }
            }
        }
    }

    fn frame<'t>(
        &mut self,
        owner: Owner<'t>,
        ast: &'t AstNode,
        before: Option<Attachment>,
        root: bool,
    ) -> Result<Frame<'t>, CstError> {
        let mut frame = Frame {
            owner,
            ast,
            schedule: self.schema.schedule(owner)?,
            extras: ExtrasRecord::default(),
            fields: Vec::new(),
            left: root.then_some(Element::Start),
            last_child: None,
            root,
            slot: 0,
            item: 0,
            list: None,
        };
        if let Some(Attachment { label, tokens }) = before {
            frame.extras.set(self.schema.vocabulary(owner)?, label.as_str(), tokens)?;
        }
        Ok(frame)
    }

    /// Fills the slots of `frame` until one needs a child built, and
    /// returns the frame of that child. `None` once the frame is complete.
    fn step<'t>(&mut self, frame: &mut Frame<'t>) -> Result<Option<Frame<'t>>, CstError> {
        let (owner, ast) = (frame.owner, frame.ast);

        while let Some(kind) = frame.schedule.get(frame.slot) {
            let slot = frame.slot;
            match *kind {
                Slot::Extras(_) => {}
                Slot::Token(text) => self.token(frame, Element::Token { slot }, text)?,
                Slot::Scalar(field) => {
                    let value = scalar(ast, field)?;
                    let Scalar::String(text) = value else {
                        return Err(CstError::malformed(
                            owner,
                            format!("scalar field `{field}` must hold its source text"),
                        ));
                    };
                    self.token(frame, Element::Token { slot }, text)?;
                    frame.fields.push((field.to_owned(), CstValue::Scalar(value.clone())));
                }
                Slot::Implied(field) => {
                    let value = scalar(ast, field)?;
                    frame.fields.push((field.to_owned(), CstValue::Scalar(value.clone())));
                }
                Slot::Node(field) | Slot::Optional(field) => match field_value(ast, field)? {
                    AstValue::Node(child) => {
                        let before = self.gap(frame, Element::Child { slot })?;
                        let child = self.frame(Owner::Node(child.ty()), child, before, false)?;
                        return Ok(Some(child));
                    }
                    AstValue::Null if matches!(kind, Slot::Optional(_)) => {
                        frame.fields.push((field.to_owned(), CstValue::Null));
                    }
                    _ => return Err(wrong_shape(ast, field, FieldShape::Node)),
                },
                Slot::List { field, separator } => {
                    let AstValue::List(items) = field_value(ast, field)? else {
                        return Err(wrong_shape(ast, field, FieldShape::List));
                    };
                    if frame.list.is_none() {
                        frame.fields.push((field.to_owned(), CstValue::List(Vec::new())));
                        frame.list = Some(frame.fields.len() - 1);
                    }

                    let index = frame.item;
                    if let Some(item) = items.get(index) {
                        if let (Some(separator), Some(previous)) = (separator, index.checked_sub(1))
                        {
                            let element = Element::Separator { slot, index: previous };
                            self.token(frame, element, separator)?;
                        }
                        let before = self.gap(frame, Element::Item { slot, index })?;
                        let child = self.frame(Owner::Node(item.ty()), item, before, false)?;
                        return Ok(Some(child));
                    }
                    frame.list = None;
                    frame.item = 0;
                }
                Slot::Virtual(role) => {
                    let before = self.gap(frame, Element::Child { slot })?;
                    let child = self.frame(Owner::Virtual(role), ast, before, false)?;
                    return Ok(Some(child));
                }
            }
            frame.slot += 1;
        }

        if frame.root {
            self.gap(frame, Element::End)?;
        }
        Ok(None)
    }

    fn token(
        &mut self,
        frame: &mut Frame<'_>,
        element: Element,
        text: &str,
    ) -> Result<(), CstError> {
        self.gap(frame, element)?;
        match self.tokens.get(self.pos) {
            Some(SourceToken { token, .. }) if token.text() == text => self.pos += 1,
            _ => return Err(self.mismatch(format!("`{text}`"))),
        }
        frame.enter(element, None);
        Ok(())
    }

    /// Consumes the extras in front of `right` and attaches them.
    ///
    /// Extras destined for `right` itself are returned, to be stored when
    /// that child is built.
    fn gap(
        &mut self,
        frame: &mut Frame<'_>,
        right: Element,
    ) -> Result<Option<Attachment>, CstError> {
        let start = self.pos;
        while self.tokens.get(self.pos).is_some_and(SourceToken::is_extra) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let tokens: Vec<Token> =
            self.tokens[start..self.pos].iter().map(|token| token.token.clone()).collect();

        let (owner, schedule) = (frame.owner, frame.schedule);
        // A child's leading extras are always consumed by its parent.
        let Some(left) = frame.left else {
            return Err(CstError::UnresolvableAnchor {
                owner: owner.to_string(),
                gap: "before the first element".to_owned(),
            });
        };
        let gap = Gap::new(left, right);
        let anchor = self.schema.resolve(owner, schedule, gap)?;
        trace!(
            %owner,
            gap = %gap.describe(schedule),
            target = ?anchor.target,
            label = %anchor.label,
            tokens = tokens.len(),
            "attach extras"
        );

        match anchor.target {
            AnchorTarget::Owner => {
                frame.extras.set(self.schema.vocabulary(owner)?, anchor.label.as_str(), tokens)?;
                Ok(None)
            }
            AnchorTarget::Right if right.is_child() => {
                Ok(Some(Attachment { label: anchor.label, tokens }))
            }
            AnchorTarget::Left if left.is_child() => {
                let (child, record) = frame
                    .last_child
                    .and_then(|child| frame.child_anchor(child))
                    .ok_or_else(|| unresolvable(owner, schedule, gap))?;
                record.set(self.schema.vocabulary(child)?, anchor.label.as_str(), tokens)?;
                Ok(None)
            }
            AnchorTarget::Left | AnchorTarget::Right => Err(unresolvable(owner, schedule, gap)),
        }
    }

    fn mismatch(&self, expected: String) -> CstError {
        match self.tokens.get(self.pos) {
            Some(SourceToken { token, .. }) => CstError::TokenStreamMismatch {
                expected,
                found: format!("{:?}", token.text()),
                range: token.range(),
            },
            None => {
                let end = self
                    .tokens
                    .last()
                    .map_or(TextSize::new(0), |token| token.token.range().end());
                CstError::TokenStreamMismatch {
                    expected,
                    found: "the end of input".to_owned(),
                    range: TextRange::empty(end),
                }
            }
        }
    }
}

fn field_value<'t>(ast: &'t AstNode, field: &str) -> Result<&'t AstValue, CstError> {
    ast.field(field).ok_or_else(|| {
        ShapeError::MissingField { ty: ast.ty().to_owned(), field: field.to_owned() }.into()
    })
}

fn scalar<'t>(ast: &'t AstNode, field: &str) -> Result<&'t Scalar, CstError> {
    match field_value(ast, field)? {
        AstValue::Scalar(value) => Ok(value),
        _ => Err(wrong_shape(ast, field, FieldShape::Scalar)),
    }
}

fn wrong_shape(ast: &AstNode, field: &str, expected: FieldShape) -> CstError {
    ShapeError::FieldShape { ty: ast.ty().to_owned(), field: field.to_owned(), expected }.into()
}
