//! The relationship declaration table and navigation over it.
//!
//! Each [`Relation`] names one foreign key together with the navigation names
//! it exposes on both sides, e.g. `organization.providers` and
//! `provider.organization`.

use std::collections::BTreeSet;

use strum::IntoEnumIterator;

use self::Cardinality::{OneToMany, ZeroOrOneToMany};
use super::Table;

/// How many parents a child row has through a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
  /// Every child has exactly one parent (the foreign key is NOT NULL).
  OneToMany,
  /// A child has at most one parent (the foreign key is nullable).
  ZeroOrOneToMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
  pub parent:          Table,
  pub child:           Table,
  /// Column on `child` holding the parent's primary key.
  pub foreign_key:     &'static str,
  pub cardinality:     Cardinality,
  /// Name of the child collection as seen from the parent.
  pub parent_navigate: &'static str,
  /// Name of the parent as seen from the child.
  pub child_navigate:  &'static str,
}

const fn rel(
  parent: Table,
  child: Table,
  foreign_key: &'static str,
  cardinality: Cardinality,
  parent_navigate: &'static str,
  child_navigate: &'static str,
) -> Relation {
  Relation {
    parent,
    child,
    foreign_key,
    cardinality,
    parent_navigate,
    child_navigate,
  }
}

/// Every relationship in the model, one per declared foreign key.
#[rustfmt::skip]
pub static RELATIONS: &[Relation] = &[
  // Parties.
  rel(Table::Organization, Table::Provider,   "organization_id", ZeroOrOneToMany, "providers",   "organization"),
  // Encounter hub.
  rel(Table::Patient,      Table::Encounter,  "patient_id",      OneToMany,       "encounters",  "patient"),
  rel(Table::Organization, Table::Encounter,  "organization_id", ZeroOrOneToMany, "encounters",  "organization"),
  rel(Table::Provider,     Table::Encounter,  "provider_id",     ZeroOrOneToMany, "encounters",  "provider"),
  rel(Table::Payer,        Table::Encounter,  "payer_id",        ZeroOrOneToMany, "encounters",  "payer"),
  // Clinical facts.
  rel(Table::Encounter,    Table::Condition,  "encounter_id",    OneToMany,       "conditions",  "encounter"),
  rel(Table::Encounter,    Table::Procedure,  "encounter_id",    OneToMany,       "procedures",  "encounter"),
  rel(Table::Encounter,    Table::Medication, "encounter_id",    OneToMany,       "medications", "encounter"),
  rel(Table::Encounter,    Table::Imaging,    "encounter_id",    OneToMany,       "imaging",     "encounter"),
  rel(Table::Payer,        Table::Medication, "payer_id",        ZeroOrOneToMany, "medications", "payer"),
  rel(Table::Condition,    Table::Medication, "condition_id",    ZeroOrOneToMany, "medications", "condition"),
  rel(Table::Condition,    Table::Procedure,  "condition_id",    ZeroOrOneToMany, "procedures",  "condition"),
  // Denormalized patient shortcuts.
  rel(Table::Patient,      Table::Condition,  "patient_id",      ZeroOrOneToMany, "conditions",  "patient"),
  rel(Table::Patient,      Table::Procedure,  "patient_id",      ZeroOrOneToMany, "procedures",  "patient"),
  rel(Table::Patient,      Table::Imaging,    "patient_id",      ZeroOrOneToMany, "imaging",     "patient"),
];

// ─── Navigation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// From a parent row to the child rows that reference it.
  ToChildren,
  /// From a child row to the parent row it references.
  ToParent,
}

/// One side of a [`Relation`], as walked from a row of [`Self::source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
  pub relation:  &'static Relation,
  pub direction: Direction,
}

impl Navigation {
  /// The table the walk starts from.
  pub fn source(&self) -> Table {
    match self.direction {
      Direction::ToChildren => self.relation.parent,
      Direction::ToParent => self.relation.child,
    }
  }

  /// The table the walk arrives at.
  pub fn target(&self) -> Table {
    match self.direction {
      Direction::ToChildren => self.relation.child,
      Direction::ToParent => self.relation.parent,
    }
  }

  /// The navigation name on the source side.
  pub fn name(&self) -> &'static str {
    match self.direction {
      Direction::ToChildren => self.relation.parent_navigate,
      Direction::ToParent => self.relation.child_navigate,
    }
  }

  /// The same relation walked the other way.
  pub fn reverse(self) -> Self {
    let direction = match self.direction {
      Direction::ToChildren => Direction::ToParent,
      Direction::ToParent => Direction::ToChildren,
    };
    Self { relation: self.relation, direction }
  }
}

/// Every navigation available from rows of `table`.
pub fn navigations(table: Table) -> impl Iterator<Item = Navigation> {
  RELATIONS.iter().flat_map(move |relation| {
    let down = (relation.parent == table)
      .then_some(Navigation { relation, direction: Direction::ToChildren });
    let up = (relation.child == table)
      .then_some(Navigation { relation, direction: Direction::ToParent });
    down.into_iter().chain(up)
  })
}

/// Look up a navigation by name, e.g. `navigate(Table::Organization,
/// "providers")`.
pub fn navigate(table: Table, name: &str) -> Option<Navigation> {
  navigations(table).find(|nav| nav.name() == name)
}

// ─── Insertion order ─────────────────────────────────────────────────────────

/// All tables ordered so that every table comes after the tables its foreign
/// keys reference.
///
/// Submitting rows in this order satisfies referential integrity without
/// deferring constraint checks. The declarations are acyclic; were a cycle
/// introduced, the tables on it would be left out of the order.
pub fn insertion_order() -> Vec<Table> {
  let mut placed = BTreeSet::new();
  let mut order = Vec::new();

  while order.len() < Table::iter().count() {
    let before = order.len();
    for table in Table::iter() {
      if placed.contains(&table) {
        continue;
      }
      let ready = table
        .def()
        .foreign_keys()
        .all(|(_, parent)| parent == table || placed.contains(&parent));
      if ready {
        placed.insert(table);
        order.push(table);
      }
    }
    if order.len() == before {
      debug_assert!(false, "foreign keys form a cycle");
      break;
    }
  }

  order
}
