//! Generic ESTree-shaped abstract syntax trees driven by a grammar table.

mod grammar;
mod node;
mod walk;

pub use grammar::{FieldDef, FieldShape, Grammar, GrammarError};
pub use node::{AstNode, AstValue, Scalar, ShapeError};
pub use walk::{Preorder, Tree, WalkEvent};
