//! Pluggable policies deciding where extras attach.

use std::fmt;

use crate::schedule::{Anchor, Gap, Owner, Slot};
use crate::{CstError, Vocabulary};

mod extended_labels;
mod virtual_nodes;

pub use extended_labels::ExtendedLabels;
pub use virtual_nodes::VirtualNodes;

/// An attachment policy: slot schedules, label vocabularies and the mapping
/// from gaps to anchors.
///
/// Implementations are stateless tables. A [`Schema`](crate::Schema) checks
/// once that a strategy covers a whole grammar, so builders and
/// reconstructors can rely on every admissible gap resolving.
pub trait Strategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// The schedule of a node type or anchor role, if the strategy defines one.
    fn slot_schedule(&self, owner: Owner<'_>) -> Option<&'static [Slot]>;

    /// Labels an extras record of `owner` may carry, given its schedule.
    ///
    /// Called with an empty schedule, returns the labels every owner carries.
    fn vocabulary(&self, owner: Owner<'_>, schedule: &[Slot]) -> Vocabulary;

    /// Maps the extras lying in `gap` of `owner` to an anchor.
    fn resolve_anchor(
        &self,
        owner: Owner<'_>,
        schedule: &[Slot],
        gap: Gap,
    ) -> Result<Anchor, CstError>;
}

/// The built-in strategies.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StrategyKind {
    /// Fixed `before`/`inside`/`after` labels plus virtual nodes.
    VirtualNodes,
    /// Per-type label vocabularies on real nodes only.
    ExtendedLabels,
}

impl StrategyKind {
    pub const ALL: [Self; 2] = [Self::VirtualNodes, Self::ExtendedLabels];

    pub fn strategy(self) -> Box<dyn Strategy> {
        match self {
            Self::VirtualNodes => Box::new(VirtualNodes),
            Self::ExtendedLabels => Box::new(ExtendedLabels),
        }
    }
}

pub(crate) fn unresolvable(owner: Owner<'_>, schedule: &[Slot], gap: Gap) -> CstError {
    CstError::UnresolvableAnchor { owner: owner.to_string(), gap: gap.describe(schedule) }
}
