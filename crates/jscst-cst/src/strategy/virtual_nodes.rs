use crate::schedule::{Anchor, AnchorRole, Gap, Owner, Slot};
use crate::strategy::{Strategy, unresolvable};
use crate::{CstError, Label, Vocabulary};

const PROGRAM: &[Slot] =
    &[Slot::Extras(Label::INSIDE), Slot::List { field: "body", separator: None }];

const FUNCTION_DECLARATION: &[Slot] = &[
    Slot::Token("function"),
    Slot::Node("id"),
    Slot::Virtual(AnchorRole::ParamList),
    Slot::Node("body"),
];

const PARAM_LIST: &[Slot] = &[
    Slot::Token("("),
    Slot::Extras(Label::INSIDE),
    Slot::List { field: "params", separator: Some(",") },
    Slot::Token(")"),
];

const BLOCK_STATEMENT: &[Slot] = &[
    Slot::Token("{"),
    Slot::Extras(Label::INSIDE),
    Slot::List { field: "body", separator: None },
    Slot::Token("}"),
];

const RETURN_STATEMENT: &[Slot] = &[Slot::Token("return"), Slot::Optional("argument")];

const EXPRESSION_STATEMENT: &[Slot] = &[Slot::Node("expression")];

const EMPTY_STATEMENT: &[Slot] = &[Slot::Token(";")];

const CALL_EXPRESSION: &[Slot] = &[Slot::Node("callee"), Slot::Virtual(AnchorRole::ArgumentList)];

const ARGUMENT_LIST: &[Slot] = &[
    Slot::Token("("),
    Slot::Extras(Label::INSIDE),
    Slot::List { field: "arguments", separator: Some(",") },
    Slot::Token(")"),
];

pub(crate) const IDENTIFIER: &[Slot] = &[Slot::Scalar("name")];

pub(crate) const LITERAL: &[Slot] = &[Slot::Scalar("raw"), Slot::Implied("value")];

/// Every record uses the same three labels. Positions with no node of their
/// own, such as the inside of an empty parameter list, get a virtual node.
///
/// A gap belongs to the child after it (`before`); failing that, to the
/// child before it (`after`); failing that, to the owner's `inside`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VirtualNodes;

impl Strategy for VirtualNodes {
    fn name(&self) -> &'static str {
        "virtual-nodes"
    }

    fn slot_schedule(&self, owner: Owner<'_>) -> Option<&'static [Slot]> {
        Some(match owner {
            Owner::Node("Program") => PROGRAM,
            Owner::Node("FunctionDeclaration") => FUNCTION_DECLARATION,
            Owner::Node("BlockStatement") => BLOCK_STATEMENT,
            Owner::Node("ReturnStatement") => RETURN_STATEMENT,
            Owner::Node("ExpressionStatement") => EXPRESSION_STATEMENT,
            Owner::Node("EmptyStatement") => EMPTY_STATEMENT,
            Owner::Node("CallExpression") => CALL_EXPRESSION,
            Owner::Node("Identifier") => IDENTIFIER,
            Owner::Node("Literal") => LITERAL,
            Owner::Node(_) => return None,
            Owner::Virtual(AnchorRole::ParamList) => PARAM_LIST,
            Owner::Virtual(AnchorRole::ArgumentList) => ARGUMENT_LIST,
        })
    }

    fn vocabulary(&self, owner: Owner<'_>, _schedule: &[Slot]) -> Vocabulary {
        Vocabulary::new(owner, [Label::BEFORE, Label::INSIDE, Label::AFTER])
    }

    fn resolve_anchor(
        &self,
        owner: Owner<'_>,
        schedule: &[Slot],
        gap: Gap,
    ) -> Result<Anchor, CstError> {
        if gap.right.is_child() {
            return Ok(Anchor::right(Label::BEFORE));
        }
        if gap.left.is_child() {
            return Ok(Anchor::left(Label::AFTER));
        }
        gap.labels(schedule)
            .next()
            .map(Anchor::owner)
            .ok_or_else(|| unresolvable(owner, schedule, gap))
    }
}
