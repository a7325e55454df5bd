use std::convert::Infallible;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::{FieldShape, Grammar, Tree as _};

/// Largest magnitude below which every integral `f64` is an exact `i64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A semantic leaf value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    fn from_json(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(*value),
            Value::Number(number) => Self::Number(number.as_f64()?),
            Value::String(value) => Self::String(value.clone()),
            Value::Array(_) | Value::Object(_) => return None,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(value) if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*value as i64)
            }
            Self::Number(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AstValue {
    Node(Box<AstNode>),
    /// An absent optional node.
    Null,
    List(Vec<AstNode>),
    Scalar(Scalar),
}

impl Serialize for AstValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Node(node) => node.serialize(serializer),
            Self::Null => serializer.serialize_none(),
            Self::List(items) => serializer.collect_seq(items),
            Self::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

/// A node of the abstract syntax tree.
///
/// The field set is dictated by the grammar table and stored in the table's
/// order. Serializes as an ESTree object with `type` first.
///
/// Cloning, comparing and dropping never recurse, so trees of any depth are
/// safe to hold.
#[derive(Debug)]
pub struct AstNode {
    ty: String,
    fields: Vec<(String, AstValue)>,
}

impl AstNode {
    pub fn new(ty: impl Into<String>, fields: Vec<(String, AstValue)>) -> Self {
        Self { ty: ty.into(), fields }
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn fields(&self) -> &[(String, AstValue)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&AstValue> {
        self.fields.iter().find(|(field, _)| field == name).map(|(_, value)| value)
    }

    /// Reads an ESTree object, keeping only the fields the grammar declares.
    ///
    /// Keys the grammar does not know about, such as `start`, `end` or `loc`,
    /// are ignored.
    pub fn from_json(value: &Value, grammar: &Grammar) -> Result<Self, ShapeError> {
        node_from_json(value, grammar, "the root")
    }
}

impl Clone for AstNode {
    fn clone(&self) -> Self {
        let Ok(copy) = self.fold(|node, mut children| {
            let fields = node
                .fields
                .iter()
                .map(|(name, value)| {
                    let value = match value {
                        AstValue::Node(_) => children
                            .next()
                            .map_or(AstValue::Null, |child| AstValue::Node(Box::new(child))),
                        AstValue::List(items) => {
                            AstValue::List(children.by_ref().take(items.len()).collect())
                        }
                        AstValue::Null => AstValue::Null,
                        AstValue::Scalar(scalar) => AstValue::Scalar(scalar.clone()),
                    };
                    (name.clone(), value)
                })
                .collect();
            Ok::<_, Infallible>(Self { ty: node.ty.clone(), fields })
        });
        copy
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.ty != b.ty || a.fields.len() != b.fields.len() {
                return false;
            }
            for ((a_name, a), (b_name, b)) in a.fields.iter().zip(&b.fields) {
                if a_name != b_name {
                    return false;
                }
                match (a, b) {
                    (AstValue::Node(a), AstValue::Node(b)) => pending.push((&**a, &**b)),
                    (AstValue::List(a), AstValue::List(b)) if a.len() == b.len() => {
                        pending.extend(a.iter().zip(b));
                    }
                    (AstValue::Null, AstValue::Null) => {}
                    (AstValue::Scalar(a), AstValue::Scalar(b)) if a == b => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Drop for AstNode {
    fn drop(&mut self) {
        let mut values = self.fields.drain(..).map(|(_, value)| value).collect::<Vec<_>>();
        while let Some(value) = values.pop() {
            match value {
                AstValue::Node(mut node) => {
                    values.extend(node.fields.drain(..).map(|(_, value)| value));
                }
                AstValue::List(items) => {
                    for mut item in items {
                        values.extend(item.fields.drain(..).map(|(_, value)| value));
                    }
                }
                AstValue::Null | AstValue::Scalar(_) => {}
            }
        }
    }
}

impl Serialize for AstNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("type", &self.ty)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn node_from_json(value: &Value, grammar: &Grammar, at: &str) -> Result<AstNode, ShapeError> {
    let object = value.as_object().ok_or_else(|| ShapeError::NotANode(at.to_owned()))?;
    let ty = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ShapeError::NotANode(at.to_owned()))?;
    let defs = grammar.fields(ty).ok_or_else(|| ShapeError::UnknownType(ty.to_owned()))?;

    let mut fields = Vec::with_capacity(defs.len());
    for def in defs {
        let mismatch = || ShapeError::FieldShape {
            ty: ty.to_owned(),
            field: def.name.clone(),
            expected: def.shape,
        };
        let at = format!("field `{}` of `{ty}`", def.name);

        let value = match (def.shape, object.get(&def.name)) {
            (FieldShape::Optional, None | Some(Value::Null)) => AstValue::Null,
            (_, None) => {
                return Err(ShapeError::MissingField { ty: ty.to_owned(), field: def.name.clone() });
            }
            (FieldShape::Node | FieldShape::Optional, Some(value @ Value::Object(_))) => {
                AstValue::Node(Box::new(node_from_json(value, grammar, &at)?))
            }
            (FieldShape::List, Some(Value::Array(items))) => AstValue::List(
                items
                    .iter()
                    .map(|item| node_from_json(item, grammar, &at))
                    .collect::<Result<_, _>>()?,
            ),
            (FieldShape::Scalar, Some(value)) => {
                AstValue::Scalar(Scalar::from_json(value).ok_or_else(mismatch)?)
            }
            _ => return Err(mismatch()),
        };
        fields.push((def.name.clone(), value));
    }

    Ok(AstNode { ty: ty.to_owned(), fields })
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected a `{expected}` root, found `{found}`")]
    UnexpectedRoot { expected: String, found: String },
    #[error("unknown node type `{0}`")]
    UnknownType(String),
    #[error("expected a node object with a string `type` at {0}")]
    NotANode(String),
    #[error("`{ty}` is missing field `{field}`")]
    MissingField { ty: String, field: String },
    #[error("`{ty}` has fields {found:?}, expected {expected:?}")]
    FieldSet { ty: String, expected: Vec<String>, found: Vec<String> },
    #[error("field `{field}` of `{ty}` has the wrong shape, expected {expected}")]
    FieldShape { ty: String, field: String, expected: FieldShape },
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use serde_json::json;

    use super::*;

    fn identifier(name: &str) -> AstNode {
        let name = AstValue::Scalar(Scalar::String(name.into()));
        AstNode::new("Identifier", vec![("name".into(), name)])
    }

    #[test]
    fn serializes_as_estree() {
        let call = AstNode::new(
            "CallExpression",
            vec![
                ("callee".into(), AstValue::Node(Box::new(identifier("f")))),
                (
                    "arguments".into(),
                    AstValue::List(vec![AstNode::new(
                        "Literal",
                        vec![
                            ("value".into(), AstValue::Scalar(Scalar::Number(16.0))),
                            ("raw".into(), AstValue::Scalar(Scalar::String("0x10".into()))),
                        ],
                    )]),
                ),
            ],
        );

        let actual = serde_json::to_string(&call).unwrap();
        expect![[r#"{"type":"CallExpression","callee":{"type":"Identifier","name":"f"},"arguments":[{"type":"Literal","value":16,"raw":"0x10"}]}"#]]
            .assert_eq(&actual);
    }

    fn chain(depth: usize, callee: &str) -> AstNode {
        let mut node = identifier(callee);
        for _ in 0..depth {
            node = AstNode::new(
                "CallExpression",
                vec![
                    ("callee".into(), AstValue::Node(Box::new(node))),
                    ("arguments".into(), AstValue::List(Vec::new())),
                ],
            );
        }
        node
    }

    #[test]
    fn deep_trees_clone_compare_and_drop() {
        let deep = chain(100_000, "f");
        let copy = deep.clone();
        assert!(copy == deep);
        assert!(chain(100_000, "g") != deep);
        assert!(chain(99_999, "f") != deep);
    }

    #[test]
    fn fractional_numbers_stay_floats() {
        let actual = serde_json::to_string(&Scalar::Number(1.5)).unwrap();
        assert_eq!(actual, "1.5");
    }

    #[test]
    fn reads_estree_and_ignores_positions() {
        let grammar = Grammar::es5();
        let value = json!({
            "type": "Program",
            "start": 0,
            "body": [{
                "type": "ReturnStatement",
                "loc": { "line": 1 },
                "argument": null
            }]
        });

        let ast = AstNode::from_json(&value, &grammar).unwrap();
        assert_eq!(ast.ty(), "Program");
        let Some(AstValue::List(body)) = ast.field("body") else { panic!("body is not a list") };
        assert_eq!(body[0].field("argument"), Some(&AstValue::Null));
        grammar.check(&ast).unwrap();
    }

    #[test]
    fn reading_requires_declared_fields() {
        let grammar = Grammar::es5();
        let value = json!({ "type": "Identifier" });

        assert_eq!(
            AstNode::from_json(&value, &grammar),
            Err(ShapeError::MissingField { ty: "Identifier".into(), field: "name".into() })
        );
    }

    #[test]
    fn reading_rejects_unknown_types() {
        let grammar = Grammar::es5();
        let value = json!({ "type": "Program", "body": [{ "type": "WithStatement" }] });

        assert_eq!(
            AstNode::from_json(&value, &grammar),
            Err(ShapeError::UnknownType("WithStatement".into()))
        );
    }
}
