use std::collections::HashMap;

use jdfmerge_core::Row;

/// Position of a canonical entity in its table, which is also its
/// first-seen order.
pub type Slot = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEntity {
    pub row: Row,
    /// Secondary disambiguator; 0 until assigned.
    pub disambiguator: u32,
}

/// Whether a folded row started a new canonical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    New(Slot),
    Existing(Slot),
}

impl Placement {
    pub fn slot(self) -> Slot {
        match self {
            Self::New(slot) | Self::Existing(slot) => slot,
        }
    }
}

/// Accumulator for one entity type: canonical entities keyed by their full
/// identity (natural key plus identity-confirming fields), grouped by the
/// primary identifying field.
#[derive(Debug, Default)]
pub struct CanonicalTable {
    entities: Vec<CanonicalEntity>,
    by_identity: HashMap<Vec<String>, Slot>,
    groups: HashMap<String, Vec<Slot>>,
}

impl CanonicalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one row into the table.
    ///
    /// A row whose identity was seen before refines that entity: its blank
    /// fields are filled from the row. Any other row becomes a new entity,
    /// appended to the group of its primary value.
    pub fn fold(&mut self, primary: String, identity: Vec<String>, row: Row) -> Placement {
        if let Some(&slot) = self.by_identity.get(&identity) {
            refine(&mut self.entities[slot].row, &row);
            return Placement::Existing(slot);
        }

        let slot = self.entities.len();
        self.by_identity.insert(identity, slot);
        self.groups.entry(primary).or_default().push(slot);
        self.entities.push(CanonicalEntity {
            row,
            disambiguator: 0,
        });
        Placement::New(slot)
    }

    /// Number every primary-value group 1..=k in first-seen order and write
    /// the number into `field` of each row, if given.
    pub fn assign_disambiguators(&mut self, field: Option<usize>) {
        for slots in self.groups.values() {
            for (n, &slot) in slots.iter().enumerate() {
                let entity = &mut self.entities[slot];
                entity.disambiguator = n as u32 + 1;
                if let Some(field) = field {
                    entity.row.set(field, entity.disambiguator.to_string());
                }
            }
        }
    }

    pub fn disambiguator(&self, slot: Slot) -> u32 {
        self.entities[slot].disambiguator
    }

    pub fn entities(&self) -> &[CanonicalEntity] {
        &self.entities
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.entities.iter().map(|entity| &entity.row)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Fill blank fields of `target` from `source`.
pub fn refine(target: &mut Row, source: &Row) {
    for (idx, value) in source.fields().iter().enumerate() {
        if target.field(idx).is_empty() && !value.is_empty() {
            target.set(idx, value.clone());
        }
    }
}
