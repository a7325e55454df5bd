use crate::schedule::{AnchorTarget, Element, Gap, Owner, Slot};
use crate::{CstError, CstNode, CstValue, ExtrasRecord, Label, Schema, VirtualNode};

/// Re-emits the source text of a CST built under `schema`.
///
/// Every node is replayed along its slot schedule, with the extras of each
/// gap read back from the anchor the strategy assigns to that gap. For a
/// tree produced by [`build`](crate::build) the output equals the original
/// source byte for byte.
#[tracing::instrument(level = "debug", skip_all, fields(strategy = schema.strategy().name()))]
pub fn reconstruct(schema: &Schema, cst: &CstNode) -> Result<String, CstError> {
    let mut emitter = Emitter { schema, out: String::new(), emitted: 0 };
    emitter.run(cst)?;

    if emitter.emitted != cst.label_count() {
        return Err(CstError::malformed(cst.ty(), "extras are attached where no gap reaches them"));
    }
    Ok(emitter.out)
}

#[derive(Clone, Copy)]
enum Source<'c> {
    Node(&'c CstNode),
    Virtual(&'c VirtualNode),
}

/// An element of a node paired with what it emits.
#[derive(Clone, Copy)]
enum Piece<'c> {
    Text(&'c str),
    Node(&'c CstNode),
    Virtual(&'c VirtualNode),
}

impl<'c> Piece<'c> {
    fn extras(self) -> Option<&'c ExtrasRecord> {
        match self {
            Self::Text(_) => None,
            Self::Node(node) => Some(node.extras()),
            Self::Virtual(node) => Some(node.extras()),
        }
    }
}

/// A node or virtual node being replayed.
struct Frame<'c> {
    owner: Owner<'c>,
    schedule: &'static [Slot],
    extras: &'c ExtrasRecord,
    pieces: std::vec::IntoIter<(Element, Piece<'c>)>,
    /// The last element emitted with its extras.
    left: Option<(Element, Option<&'c ExtrasRecord>)>,
    root: bool,
}

impl<'c> Frame<'c> {
    fn new(schema: &Schema, piece: Piece<'c>, root: bool) -> Result<Option<Self>, CstError> {
        let (owner, source, extras) = match piece {
            Piece::Text(_) => return Ok(None),
            Piece::Node(node) => (Owner::Node(node.ty()), Source::Node(node), node.extras()),
            Piece::Virtual(node) => {
                (Owner::Virtual(node.role()), Source::Virtual(node), node.extras())
            }
        };
        let schedule = schema.schedule(owner)?;
        let pieces = pieces(owner, schedule, source)?.into_iter();
        let left = root.then_some((Element::Start, None));
        Ok(Some(Self { owner, schedule, extras, pieces, left, root }))
    }
}

struct Emitter<'s> {
    schema: &'s Schema,
    out: String,
    /// Non-empty labels written so far.
    emitted: usize,
}

impl Emitter<'_> {
    fn run(&mut self, cst: &CstNode) -> Result<(), CstError> {
        let mut stack = Vec::new();
        stack.extend(Frame::new(self.schema, Piece::Node(cst), true)?);

        while let Some(frame) = stack.last_mut() {
            let Some((element, piece)) = frame.pieces.next() else {
                if frame.root {
                    let (last, last_extras) = frame.left.unwrap_or((Element::Start, None));
                    let gap = Gap::new(last, Element::End);
                    self.gap(frame.owner, frame.schedule, gap, frame.extras, last_extras, None)?;
                }
                stack.pop();
                continue;
            };

            if let Some((left, left_extras)) = frame.left {
                let (owner, schedule) = (frame.owner, frame.schedule);
                let gap = Gap::new(left, element);
                self.gap(owner, schedule, gap, frame.extras, left_extras, piece.extras())?;
            }
            frame.left = Some((element, piece.extras()));

            if let Piece::Text(text) = piece {
                self.out.push_str(text);
            }
            stack.extend(Frame::new(self.schema, piece, false)?);
        }
        Ok(())
    }

    fn gap(
        &mut self,
        owner: Owner<'_>,
        schedule: &[Slot],
        gap: Gap,
        own: &ExtrasRecord,
        left: Option<&ExtrasRecord>,
        right: Option<&ExtrasRecord>,
    ) -> Result<(), CstError> {
        let anchor = self.schema.resolve(owner, schedule, gap)?;
        let record = match anchor.target {
            AnchorTarget::Owner => Some(own),
            AnchorTarget::Left => left,
            AnchorTarget::Right => right,
        };
        if let Some(record) = record {
            self.extras(record, anchor.label);
        }
        Ok(())
    }

    fn extras(&mut self, record: &ExtrasRecord, label: Label) {
        let tokens = record.get(label.as_str());
        if tokens.is_empty() {
            return;
        }
        self.emitted += 1;
        for token in tokens {
            self.out.push_str(token.text());
        }
    }
}

/// The elements of one node in source order.
fn pieces<'c>(
    owner: Owner<'_>,
    schedule: &'static [Slot],
    source: Source<'c>,
) -> Result<Vec<(Element, Piece<'c>)>, CstError> {
    let missing = |field: &str| {
        CstError::malformed(owner, format!("field `{field}` is missing or malformed"))
    };
    let value = |field: &str| match source {
        Source::Node(node) => node.field(field),
        Source::Virtual(node) => node.wrapped(),
    };

    let mut pieces = Vec::new();
    for (slot, kind) in schedule.iter().enumerate() {
        match *kind {
            Slot::Extras(_) | Slot::Implied(_) => {}
            Slot::Token(text) => pieces.push((Element::Token { slot }, Piece::Text(text))),
            Slot::Scalar(field) => match value(field) {
                Some(CstValue::Scalar(jscst_ast::Scalar::String(text))) => {
                    pieces.push((Element::Token { slot }, Piece::Text(text)));
                }
                _ => return Err(missing(field)),
            },
            Slot::Node(field) | Slot::Optional(field) => match value(field) {
                Some(CstValue::Node(node)) => {
                    pieces.push((Element::Child { slot }, Piece::Node(node)));
                }
                Some(CstValue::Null) if matches!(kind, Slot::Optional(_)) => {}
                _ => return Err(missing(field)),
            },
            Slot::List { field, separator } => {
                let items: &[CstNode] = match (value(field), source) {
                    (Some(CstValue::List(items)), _) => items.as_slice(),
                    (None, Source::Virtual(_)) => &[],
                    _ => return Err(missing(field)),
                };
                for (index, item) in items.iter().enumerate() {
                    if let (Some(separator), Some(previous)) = (separator, index.checked_sub(1)) {
                        let element = Element::Separator { slot, index: previous };
                        pieces.push((element, Piece::Text(separator)));
                    }
                    pieces.push((Element::Item { slot, index }, Piece::Node(item)));
                }
            }
            Slot::Virtual(role) => {
                let node = match source {
                    Source::Node(node) => node.fields().iter().find_map(|(_, value)| match value {
                        CstValue::Virtual(node) if node.role() == role => Some(&**node),
                        _ => None,
                    }),
                    Source::Virtual(_) => None,
                };
                let node = node.ok_or_else(|| {
                    CstError::malformed(owner, format!("expected a <{role}> virtual node"))
                })?;
                pieces.push((Element::Child { slot }, Piece::Virtual(node)));
            }
        }
    }
    Ok(pieces)
}
