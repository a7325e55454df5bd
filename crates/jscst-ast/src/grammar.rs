use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{AstNode, AstValue, ShapeError, Tree as _, WalkEvent};

const ES5_FUNCTIONS: &str = include_str!("../grammar/es5-functions.json");

/// How a field of a node type is populated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldShape {
    /// Exactly one child node.
    Node,
    /// A child node or `null`.
    Optional,
    /// An ordered, possibly empty, sequence of child nodes.
    List,
    /// A semantic value: string, number, boolean or `null`.
    Scalar,
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Optional => "optional",
            Self::List => "list",
            Self::Scalar => "scalar",
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub shape: FieldShape,
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("malformed grammar table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("root type `{0}` is not defined by the grammar")]
    UnknownRoot(String),
    #[error("`{ty}` declares field `{field}` more than once")]
    DuplicateField { ty: String, field: String },
    #[error("`{ty}` uses the reserved field name `type`")]
    ReservedField { ty: String },
}

/// Versioned table of node types and their ordered fields.
///
/// The table is data: traversal code never matches on concrete node type
/// names, so a new grammar version only needs a new table (and slot
/// schedules for any new type).
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Grammar {
    version: String,
    root: String,
    types: IndexMap<String, Vec<FieldDef>>,
}

impl Grammar {
    /// The bundled `es5-functions` table covering the function declaration family.
    pub fn es5() -> Self {
        Self::from_json(ES5_FUNCTIONS).expect("bundled grammar table is well-formed")
    }

    pub fn from_json(text: &str) -> Result<Self, GrammarError> {
        let grammar: Self = serde_json::from_str(text)?;

        if !grammar.types.contains_key(&grammar.root) {
            return Err(GrammarError::UnknownRoot(grammar.root));
        }
        for (ty, fields) in &grammar.types {
            for (index, field) in fields.iter().enumerate() {
                if field.name == "type" {
                    return Err(GrammarError::ReservedField { ty: ty.clone() });
                }
                if fields[..index].iter().any(|other| other.name == field.name) {
                    return Err(GrammarError::DuplicateField {
                        ty: ty.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        Ok(grammar)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn fields(&self, ty: &str) -> Option<&[FieldDef]> {
        self.types.get(ty).map(Vec::as_slice)
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, &[FieldDef])> {
        self.types.iter().map(|(ty, fields)| (ty.as_str(), fields.as_slice()))
    }

    /// Checks that `ast` is a tree of this grammar rooted at the root type.
    pub fn check(&self, ast: &AstNode) -> Result<(), ShapeError> {
        if ast.ty() != self.root {
            return Err(ShapeError::UnexpectedRoot {
                expected: self.root.clone(),
                found: ast.ty().to_owned(),
            });
        }
        for event in ast.preorder() {
            if let WalkEvent::Enter(node) = event {
                self.check_fields(node)?;
            }
        }
        Ok(())
    }

    /// Checks the fields of `node` itself; children are checked by the walk.
    fn check_fields(&self, node: &AstNode) -> Result<(), ShapeError> {
        let fields = self
            .fields(node.ty())
            .ok_or_else(|| ShapeError::UnknownType(node.ty().to_owned()))?;

        let names = node.fields().iter().map(|(name, _)| name.as_str());
        if !names.eq(fields.iter().map(|field| field.name.as_str())) {
            return Err(ShapeError::FieldSet {
                ty: node.ty().to_owned(),
                expected: fields.iter().map(|field| field.name.clone()).collect(),
                found: node.fields().iter().map(|(name, _)| name.clone()).collect(),
            });
        }

        for (field, (_, value)) in fields.iter().zip(node.fields()) {
            match (field.shape, value) {
                (FieldShape::Node | FieldShape::Optional, AstValue::Node(_))
                | (FieldShape::Optional, AstValue::Null)
                | (FieldShape::Scalar, AstValue::Scalar(_))
                | (FieldShape::List, AstValue::List(_)) => {}
                (shape, _) => {
                    return Err(ShapeError::FieldShape {
                        ty: node.ty().to_owned(),
                        field: field.name.clone(),
                        expected: shape,
                    });
                }
            }
        }

        Ok(())
    }
}
