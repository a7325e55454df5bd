use jscst_ast::{AstNode, AstValue, FieldShape, Tree as _};

use crate::{CstError, CstNode, CstValue, VirtualNode};

/// Strips a CST down to its AST: extras are dropped and every virtual node
/// is replaced by the value it wraps.
///
/// A pure AST lifted with [`CstNode::lift`] projects to itself.
#[tracing::instrument(level = "debug", skip_all, fields(ty = cst.ty()))]
pub fn project(cst: &CstNode) -> Result<AstNode, CstError> {
    cst.fold(|node, mut children| -> Result<AstNode, CstError> {
        let fields = node
            .fields()
            .iter()
            .map(|(name, value)| Ok((name.clone(), self::value(node, value, &mut children)?)))
            .collect::<Result<_, CstError>>()?;
        Ok(AstNode::new(node.ty(), fields))
    })
}

/// Projects one field of `owner`, taking the nodes it holds from the
/// already projected `children`.
fn value(
    owner: &CstNode,
    value: &CstValue,
    children: &mut impl Iterator<Item = AstNode>,
) -> Result<AstValue, CstError> {
    Ok(match value {
        CstValue::Node(_) => {
            let child = children
                .next()
                .ok_or_else(|| CstError::malformed(owner.ty(), "a child node is missing"))?;
            AstValue::Node(Box::new(child))
        }
        CstValue::Null => AstValue::Null,
        CstValue::List(items) => AstValue::List(children.by_ref().take(items.len()).collect()),
        CstValue::Scalar(scalar) => AstValue::Scalar(scalar.clone()),
        CstValue::Virtual(virtual_node) => unwrap(owner, virtual_node, children)?,
    })
}

/// The value a virtual node stands in for; its arity must fit the role.
fn unwrap(
    owner: &CstNode,
    virtual_node: &VirtualNode,
    children: &mut impl Iterator<Item = AstNode>,
) -> Result<AstValue, CstError> {
    let role = virtual_node.role();
    match (role.shape(), virtual_node.wrapped()) {
        (FieldShape::List, None) => Ok(AstValue::List(Vec::new())),
        (FieldShape::Optional, None) => Ok(AstValue::Null),
        (_, Some(CstValue::Virtual(_))) => {
            Err(CstError::malformed(owner.ty(), format!("<{role}> wraps another virtual node")))
        }
        (FieldShape::List, Some(wrapped @ CstValue::List(_)))
        | (FieldShape::Node | FieldShape::Optional, Some(wrapped @ CstValue::Node(_)))
        | (FieldShape::Optional, Some(wrapped @ CstValue::Null))
        | (FieldShape::Scalar, Some(wrapped @ CstValue::Scalar(_))) => {
            value(owner, wrapped, children)
        }
        (shape, _) => Err(CstError::malformed(
            owner.ty(),
            format!("<{role}> must wrap a {shape}"),
        )),
    }
}
