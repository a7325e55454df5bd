use indexmap::IndexMap;
use jscst_ast::{FieldShape, Grammar};
use serde::Serialize;

use crate::schedule::{self, Anchor, AnchorRole, AnchorTarget, Gap, Owner, Slot};
use crate::strategy::{Strategy, StrategyKind};
use crate::{CstError, Label, Vocabulary};

#[derive(Debug)]
struct Entry {
    schedule: &'static [Slot],
    vocabulary: Vocabulary,
}

/// A grammar paired with a strategy that has been checked to cover it.
///
/// Construction validates every schedule once: each grammar field is placed
/// exactly once with a matching shape, labels are unique, and every gap that
/// can occur in a tree of the grammar resolves to an anchor. A `Schema` is
/// immutable afterwards and may be shared freely between threads.
#[derive(Debug)]
pub struct Schema {
    grammar: Grammar,
    strategy: Box<dyn Strategy>,
    nodes: IndexMap<String, Entry>,
    roles: IndexMap<AnchorRole, Entry>,
}

impl Schema {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(grammar = grammar.version(), strategy = strategy.name())
    )]
    pub fn new(grammar: Grammar, strategy: Box<dyn Strategy>) -> Result<Self, CstError> {
        let mut nodes = IndexMap::new();
        let mut roles = IndexMap::new();

        for (ty, fields) in grammar.types() {
            let owner = Owner::Node(ty);
            let schedule = strategy
                .slot_schedule(owner)
                .ok_or_else(|| CstError::incomplete(owner, "no slot schedule is defined"))?;

            let mut placed = Vec::new();
            for slot in schedule {
                match *slot {
                    Slot::Virtual(role) => {
                        if !roles.contains_key(&role) {
                            roles.insert(role, role_entry(&*strategy, role)?);
                        }
                        let field = schedule::wrapped_field(roles[&role].schedule).ok_or_else(
                            || CstError::incomplete(Owner::Virtual(role), "wraps no field"),
                        )?;
                        placed.push((field, role.shape()));
                    }
                    slot => placed.extend(slot.field()),
                }
            }
            let declared = fields.iter().map(|field| (field.name.as_str(), field.shape));
            check_fields(owner, &placed, declared)?;

            let entry = entry(&*strategy, owner, schedule, ty == grammar.root())?;
            nodes.insert(ty.to_owned(), entry);
        }

        tracing::debug!(node_types = nodes.len(), anchor_roles = roles.len(), "schema validated");
        Ok(Self { grammar, strategy, nodes, roles })
    }

    /// The bundled grammar under one of the built-in strategies.
    pub fn es5(kind: StrategyKind) -> Result<Self, CstError> {
        Self::new(Grammar::es5(), kind.strategy())
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn strategy(&self) -> &dyn Strategy {
        &*self.strategy
    }

    fn entry(&self, owner: Owner<'_>) -> Result<&Entry, CstError> {
        match owner {
            Owner::Node(ty) => self.nodes.get(ty),
            Owner::Virtual(role) => self.roles.get(&role),
        }
        .ok_or_else(|| CstError::incomplete(owner, "not covered by the schema"))
    }

    pub fn schedule(&self, owner: Owner<'_>) -> Result<&'static [Slot], CstError> {
        self.entry(owner).map(|entry| entry.schedule)
    }

    pub fn vocabulary(&self, owner: Owner<'_>) -> Result<&Vocabulary, CstError> {
        self.entry(owner).map(|entry| &entry.vocabulary)
    }

    pub fn resolve(
        &self,
        owner: Owner<'_>,
        schedule: &[Slot],
        gap: Gap,
    ) -> Result<Anchor, CstError> {
        self.strategy.resolve_anchor(owner, schedule, gap)
    }

    /// The published label vocabulary and anchor roles of every owner.
    pub fn label_table(&self) -> LabelTable<'_> {
        let describe = |schedule: &[Slot]| schedule.iter().map(Slot::to_string).collect();

        let node_types = self
            .nodes
            .iter()
            .map(|(ty, entry)| OwnerLabels {
                owner: ty.clone(),
                labels: entry.vocabulary.labels(),
                schedule: describe(entry.schedule),
                virtual_nodes: entry
                    .schedule
                    .iter()
                    .filter_map(|slot| match slot {
                        Slot::Virtual(role) => Some(*role),
                        _ => None,
                    })
                    .collect(),
                wraps: None,
            })
            .collect();

        let anchor_roles = self
            .roles
            .iter()
            .map(|(role, entry)| OwnerLabels {
                owner: role.name().to_owned(),
                labels: entry.vocabulary.labels(),
                schedule: describe(entry.schedule),
                virtual_nodes: Vec::new(),
                wraps: schedule::wrapped_field(entry.schedule),
            })
            .collect();

        LabelTable {
            grammar: self.grammar.version(),
            strategy: self.strategy.name(),
            node_types,
            anchor_roles,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelTable<'s> {
    pub grammar: &'s str,
    pub strategy: &'static str,
    pub node_types: Vec<OwnerLabels<'s>>,
    pub anchor_roles: Vec<OwnerLabels<'s>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerLabels<'s> {
    pub owner: String,
    pub labels: &'s [Label],
    pub schedule: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub virtual_nodes: Vec<AnchorRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wraps: Option<&'static str>,
}

fn role_entry(strategy: &dyn Strategy, role: AnchorRole) -> Result<Entry, CstError> {
    let owner = Owner::Virtual(role);
    let schedule = strategy
        .slot_schedule(owner)
        .ok_or_else(|| CstError::incomplete(owner, "no slot schedule is defined"))?;

    if schedule.iter().any(|slot| matches!(slot, Slot::Virtual(_))) {
        return Err(CstError::incomplete(owner, "virtual nodes cannot nest"));
    }
    let placed: Vec<_> = schedule.iter().filter_map(|slot| slot.field()).collect();
    match placed.as_slice() {
        [(_, shape)] if *shape == role.shape() => {}
        [(field, _)] => {
            return Err(CstError::incomplete(
                owner,
                format!("wrapped field `{field}` must be a {}", role.shape()),
            ));
        }
        _ => return Err(CstError::incomplete(owner, "must wrap exactly one field")),
    }

    entry(strategy, owner, schedule, false)
}

/// Each grammar field must be placed once, with its declared shape.
fn check_fields<'a>(
    owner: Owner<'_>,
    placed: &[(&str, FieldShape)],
    declared: impl Iterator<Item = (&'a str, FieldShape)>,
) -> Result<(), CstError> {
    let mut declared_count = 0;
    for (name, shape) in declared {
        declared_count += 1;
        let mut matching = placed.iter().filter(|(field, _)| *field == name);
        match (matching.next(), matching.next()) {
            (None, _) => {
                return Err(CstError::incomplete(owner, format!("field `{name}` is not placed")));
            }
            (Some(_), Some(_)) => {
                return Err(CstError::incomplete(owner, format!("field `{name}` is placed twice")));
            }
            (Some((_, placed_shape)), None) if *placed_shape != shape => {
                return Err(CstError::incomplete(
                    owner,
                    format!("field `{name}` is placed as {placed_shape}, but declared as {shape}"),
                ));
            }
            (Some(_), None) => {}
        }
    }

    if placed.len() != declared_count {
        return Err(CstError::incomplete(owner, "places a field the grammar does not declare"));
    }
    Ok(())
}

fn entry(
    strategy: &dyn Strategy,
    owner: Owner<'_>,
    schedule: &'static [Slot],
    root: bool,
) -> Result<Entry, CstError> {
    let vocabulary = strategy.vocabulary(owner, schedule);
    let shared = strategy.vocabulary(owner, &[]);

    let mut labels = Vec::new();
    for slot in schedule {
        let Slot::Extras(label) = *slot else { continue };
        if label == Label::BEFORE || label == Label::AFTER {
            let message = format!("label `{label}` belongs to the parent");
            return Err(CstError::incomplete(owner, message));
        }
        if labels.contains(&label) {
            return Err(CstError::incomplete(owner, format!("label `{label}` is used twice")));
        }
        if !vocabulary.contains(label) {
            return Err(CstError::InvalidLabel {
                owner: owner.to_string(),
                label: label.to_string(),
            });
        }
        labels.push(label);
    }

    for gap in schedule::admissible_gaps(schedule, root) {
        let anchor = strategy.resolve_anchor(owner, schedule, gap)?;
        let (valid, labels) = match anchor.target {
            AnchorTarget::Owner => (true, &vocabulary),
            AnchorTarget::Left => (gap.left.is_child(), &shared),
            AnchorTarget::Right => (gap.right.is_child(), &shared),
        };
        if !valid {
            return Err(crate::strategy::unresolvable(owner, schedule, gap));
        }
        if !labels.contains(anchor.label) {
            return Err(CstError::InvalidLabel {
                owner: owner.to_string(),
                label: anchor.label.to_string(),
            });
        }
    }

    Ok(Entry { schedule, vocabulary })
}
