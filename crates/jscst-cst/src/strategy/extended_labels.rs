use crate::schedule::{Anchor, Gap, Owner, Slot};
use crate::strategy::virtual_nodes::{IDENTIFIER, LITERAL};
use crate::strategy::{Strategy, unresolvable};
use crate::{CstError, Label, Vocabulary};

const PROGRAM: &[Slot] =
    &[Slot::Extras(Label::new("insideBody")), Slot::List { field: "body", separator: None }];

const FUNCTION_DECLARATION: &[Slot] = &[
    Slot::Token("function"),
    Slot::Extras(Label::new("afterFunction")),
    Slot::Node("id"),
    Slot::Extras(Label::new("afterName")),
    Slot::Token("("),
    Slot::Extras(Label::new("insideParams")),
    Slot::List { field: "params", separator: Some(",") },
    Slot::Token(")"),
    Slot::Extras(Label::new("afterParams")),
    Slot::Node("body"),
];

const BLOCK_STATEMENT: &[Slot] = &[
    Slot::Token("{"),
    Slot::Extras(Label::new("insideBody")),
    Slot::List { field: "body", separator: None },
    Slot::Token("}"),
];

const RETURN_STATEMENT: &[Slot] = &[
    Slot::Token("return"),
    Slot::Extras(Label::new("afterReturn")),
    Slot::Optional("argument"),
];

const EXPRESSION_STATEMENT: &[Slot] = &[Slot::Node("expression")];

const EMPTY_STATEMENT: &[Slot] = &[Slot::Token(";")];

const CALL_EXPRESSION: &[Slot] = &[
    Slot::Node("callee"),
    Slot::Extras(Label::new("afterCallee")),
    Slot::Token("("),
    Slot::Extras(Label::new("insideArguments")),
    Slot::List { field: "arguments", separator: Some(",") },
    Slot::Token(")"),
];

/// Every record hangs off a real node. Besides `before` and `after`, each
/// node type names the positions between its own tokens and fields.
///
/// List items take the gaps around them as `before`/`after`; any other gap
/// goes to the last label of the owner lying inside it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtendedLabels;

impl Strategy for ExtendedLabels {
    fn name(&self) -> &'static str {
        "extended-labels"
    }

    fn slot_schedule(&self, owner: Owner<'_>) -> Option<&'static [Slot]> {
        let Owner::Node(ty) = owner else { return None };
        Some(match ty {
            "Program" => PROGRAM,
            "FunctionDeclaration" => FUNCTION_DECLARATION,
            "BlockStatement" => BLOCK_STATEMENT,
            "ReturnStatement" => RETURN_STATEMENT,
            "ExpressionStatement" => EXPRESSION_STATEMENT,
            "EmptyStatement" => EMPTY_STATEMENT,
            "CallExpression" => CALL_EXPRESSION,
            "Identifier" => IDENTIFIER,
            "Literal" => LITERAL,
            _ => return None,
        })
    }

    fn vocabulary(&self, owner: Owner<'_>, schedule: &[Slot]) -> Vocabulary {
        let own = schedule.iter().filter_map(|slot| match slot {
            Slot::Extras(label) => Some(*label),
            _ => None,
        });
        Vocabulary::new(owner, [Label::BEFORE, Label::AFTER].into_iter().chain(own))
    }

    fn resolve_anchor(
        &self,
        owner: Owner<'_>,
        schedule: &[Slot],
        gap: Gap,
    ) -> Result<Anchor, CstError> {
        if gap.right.is_item() {
            return Ok(Anchor::right(Label::BEFORE));
        }
        if gap.left.is_item() {
            return Ok(Anchor::left(Label::AFTER));
        }
        gap.labels(schedule)
            .next_back()
            .map(Anchor::owner)
            .ok_or_else(|| unresolvable(owner, schedule, gap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Element;

    #[test]
    fn vocabulary_is_per_type() {
        let vocabulary =
            ExtendedLabels.vocabulary(Owner::Node("FunctionDeclaration"), FUNCTION_DECLARATION);
        let labels: Vec<_> = vocabulary.labels().iter().map(|label| label.as_str()).collect();

        assert_eq!(
            labels,
            ["before", "after", "afterFunction", "afterName", "insideParams", "afterParams"]
        );
    }

    #[test]
    fn gaps_between_fields_use_type_labels() {
        let owner = Owner::Node("FunctionDeclaration");
        let resolve = |left, right| {
            let gap = Gap::new(left, right);
            ExtendedLabels.resolve_anchor(owner, FUNCTION_DECLARATION, gap).unwrap()
        };

        assert_eq!(
            resolve(Element::Token { slot: 0 }, Element::Child { slot: 2 }),
            Anchor::owner(Label::new("afterFunction"))
        );
        assert_eq!(
            resolve(Element::Token { slot: 4 }, Element::Token { slot: 7 }),
            Anchor::owner(Label::new("insideParams"))
        );
        assert_eq!(
            resolve(Element::Item { slot: 6, index: 1 }, Element::Token { slot: 7 }),
            Anchor::left(Label::AFTER)
        );
    }

    #[test]
    fn never_defines_virtual_owners() {
        for role in crate::AnchorRole::ALL {
            assert!(ExtendedLabels.slot_schedule(Owner::Virtual(role)).is_none());
        }
    }
}
