//! Slot schedules: the per-owner order of tokens, fields and extras positions.
//!
//! A schedule drives the builder's draining order and the reconstructor's
//! emission order, so both traverse a node identically.

use std::fmt;
use std::ops::Range;

use jscst_ast::FieldShape;
use serde::Serialize;

use crate::Label;

/// The syntactic position a virtual node stands for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum AnchorRole {
    /// The parenthesized parameter list of a function.
    ParamList,
    /// The parenthesized argument list of a call.
    ArgumentList,
}

impl AnchorRole {
    pub const ALL: [Self; 2] = [Self::ParamList, Self::ArgumentList];

    pub const fn name(self) -> &'static str {
        match self {
            Self::ParamList => "ParamList",
            Self::ArgumentList => "ArgumentList",
        }
    }

    /// Shape of the field a virtual node of this role wraps.
    pub const fn shape(self) -> FieldShape {
        match self {
            Self::ParamList | Self::ArgumentList => FieldShape::List,
        }
    }
}

impl fmt::Display for AnchorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The node type or anchor role a schedule and extras record belong to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Owner<'a> {
    Node(&'a str),
    Virtual(AnchorRole),
}

impl fmt::Display for Owner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(ty) => f.write_str(ty),
            Self::Virtual(role) => write!(f, "<{role}>"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    /// A position where extras of the owner itself may sit.
    Extras(Label),
    /// A fixed semantic token.
    Token(&'static str),
    /// A scalar field spelled by exactly one semantic token.
    Scalar(&'static str),
    /// A scalar field computed from other fields; it has no token of its own.
    Implied(&'static str),
    Node(&'static str),
    Optional(&'static str),
    List { field: &'static str, separator: Option<&'static str> },
    /// A virtual node of the given role, wrapping a field of the owner.
    Virtual(AnchorRole),
}

impl Slot {
    /// The grammar field this slot fills, with the shape it expects.
    pub fn field(self) -> Option<(&'static str, FieldShape)> {
        match self {
            Self::Scalar(field) | Self::Implied(field) => Some((field, FieldShape::Scalar)),
            Self::Node(field) => Some((field, FieldShape::Node)),
            Self::Optional(field) => Some((field, FieldShape::Optional)),
            Self::List { field, .. } => Some((field, FieldShape::List)),
            Self::Extras(_) | Self::Token(_) | Self::Virtual(_) => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extras(label) => write!(f, "@{label}"),
            Self::Token(text) => write!(f, "`{text}`"),
            Self::Scalar(field) => write!(f, "{field}=text"),
            Self::Implied(field) => write!(f, "{field}=implied"),
            Self::Node(field) => f.write_str(field),
            Self::Optional(field) => write!(f, "{field}?"),
            Self::List { field, separator: Some(separator) } => write!(f, "{field}[{separator}]"),
            Self::List { field, separator: None } => write!(f, "{field}[]"),
            Self::Virtual(role) => write!(f, "<{role}>"),
        }
    }
}

/// The field wrapped by a virtual node's schedule.
pub(crate) fn wrapped_field(schedule: &[Slot]) -> Option<&'static str> {
    schedule.iter().find_map(|slot| slot.field()).map(|(field, _)| field)
}

/// A piece of a node that occupies source text.
///
/// `Start` and `End` only bound the root, whose extras may precede its first
/// token or follow its last.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Element {
    Start,
    /// A `Token` or `Scalar` slot.
    Token { slot: usize },
    /// A `Node`, present `Optional` or `Virtual` slot.
    Child { slot: usize },
    Item { slot: usize, index: usize },
    /// The separator following item `index`.
    Separator { slot: usize, index: usize },
    End,
}

impl Element {
    pub fn is_child(self) -> bool {
        matches!(self, Self::Child { .. } | Self::Item { .. })
    }

    pub fn is_item(self) -> bool {
        matches!(self, Self::Item { .. })
    }

    fn slot(self) -> Option<usize> {
        match self {
            Self::Token { slot }
            | Self::Child { slot }
            | Self::Item { slot, .. }
            | Self::Separator { slot, .. } => Some(slot),
            Self::Start | Self::End => None,
        }
    }

    fn describe(self, schedule: &[Slot]) -> String {
        let slot = self.slot().and_then(|slot| schedule.get(slot));
        match (self, slot) {
            (Self::Start, _) => "the start of input".to_owned(),
            (Self::End, _) => "the end of input".to_owned(),
            (Self::Item { index, .. }, Some(slot)) => format!("item {index} of {slot}"),
            (Self::Separator { index, .. }, Some(Slot::List { separator: Some(sep), .. })) => {
                format!("`{sep}` after item {index}")
            }
            (_, Some(slot)) => slot.to_string(),
            (_, None) => "an unknown slot".to_owned(),
        }
    }
}

/// The stretch of source between two adjacent elements of one owner.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Gap {
    pub left: Element,
    pub right: Element,
}

impl Gap {
    pub fn new(left: Element, right: Element) -> Self {
        Self { left, right }
    }

    /// Indices of the schedule slots strictly between the two elements.
    pub fn between(self, schedule: &[Slot]) -> Range<usize> {
        let lo = self.left.slot().map_or(0, |slot| slot + 1);
        let hi = self.right.slot().unwrap_or(schedule.len());
        lo..hi.max(lo)
    }

    /// Extras labels of the owner lying inside the gap, in schedule order.
    pub fn labels(self, schedule: &[Slot]) -> impl DoubleEndedIterator<Item = Label> + '_ {
        schedule[self.between(schedule)].iter().filter_map(|slot| match slot {
            Slot::Extras(label) => Some(*label),
            _ => None,
        })
    }

    pub fn describe(self, schedule: &[Slot]) -> String {
        format!("between {} and {}", self.left.describe(schedule), self.right.describe(schedule))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnchorTarget {
    /// The owner of the schedule.
    Owner,
    /// The child element on the left of the gap.
    Left,
    /// The child element on the right of the gap.
    Right,
}

/// Where the extras of a gap are stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Anchor {
    pub target: AnchorTarget,
    pub label: Label,
}

impl Anchor {
    pub fn owner(label: Label) -> Self {
        Self { target: AnchorTarget::Owner, label }
    }

    pub fn left(label: Label) -> Self {
        Self { target: AnchorTarget::Left, label }
    }

    pub fn right(label: Label) -> Self {
        Self { target: AnchorTarget::Right, label }
    }
}

/// First and last element of a slot, and whether the slot may be absent.
struct Unit {
    first: Element,
    last: Element,
    optional: bool,
}

/// Every pair of elements that can be adjacent in some node of this schedule.
///
/// Lists are explored with zero, one and two items, which exposes every kind
/// of adjacency a longer list has.
pub(crate) fn admissible_gaps(schedule: &[Slot], root: bool) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut units = Vec::new();
    if root {
        units.push(Unit { first: Element::Start, last: Element::Start, optional: false });
    }

    for (slot, kind) in schedule.iter().enumerate() {
        let unit = match *kind {
            Slot::Extras(_) | Slot::Implied(_) => continue,
            Slot::Token(_) | Slot::Scalar(_) => {
                let token = Element::Token { slot };
                Unit { first: token, last: token, optional: false }
            }
            Slot::Node(_) | Slot::Virtual(_) => {
                let child = Element::Child { slot };
                Unit { first: child, last: child, optional: false }
            }
            Slot::Optional(_) => {
                let child = Element::Child { slot };
                Unit { first: child, last: child, optional: true }
            }
            Slot::List { separator, .. } => {
                let first = Element::Item { slot, index: 0 };
                let second = Element::Item { slot, index: 1 };
                match separator {
                    Some(_) => {
                        let separator = Element::Separator { slot, index: 0 };
                        gaps.push(Gap::new(first, separator));
                        gaps.push(Gap::new(separator, second));
                    }
                    None => gaps.push(Gap::new(first, second)),
                }
                Unit { first, last: first, optional: true }
            }
        };
        units.push(unit);
    }

    if root {
        units.push(Unit { first: Element::End, last: Element::End, optional: false });
    }

    for (index, left) in units.iter().enumerate() {
        for right in &units[index + 1..] {
            gaps.push(Gap::new(left.last, right.first));
            if !right.optional {
                break;
            }
        }
    }

    gaps
}
