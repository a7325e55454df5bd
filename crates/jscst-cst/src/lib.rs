//! Concrete syntax trees layered over ESTree ASTs.
//!
//! A CST is the AST of a program with every non-semantic token (comments,
//! whitespace, statement-ending semicolons, redundant parentheses) kept in
//! [`ExtrasRecord`]s attached to its nodes. Where extras attach is decided by
//! a [`Strategy`]:
//!
//! - [`VirtualNodes`] uses the labels `before`, `inside` and `after`
//!   everywhere and inserts [`VirtualNode`]s for positions no AST node
//!   covers, such as the inside of an empty parameter list;
//! - [`ExtendedLabels`] never adds nodes and instead gives each node type
//!   its own labels, such as `afterName` or `insideParams`.
//!
//! [`build`] makes a CST from an AST and its token stream, [`project`] takes
//! it back to the AST and [`reconstruct`] re-emits the exact source text.

mod build;
mod error;
mod extras;
mod project;
mod reconstruct;
pub mod schedule;
mod schema;
mod strategy;
mod tree;
#[cfg(test)]
mod tests;

pub use build::build;
pub use error::CstError;
pub use extras::{ExtrasRecord, Label, Vocabulary};
pub use project::project;
pub use reconstruct::reconstruct;
pub use schedule::{AnchorRole, Owner};
pub use schema::{LabelTable, OwnerLabels, Schema};
pub use strategy::{ExtendedLabels, Strategy, StrategyKind, VirtualNodes};
pub use tree::{CstNode, CstValue, VirtualNode};
