// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-type quantity totals and their cross-file reduction

use crate::quantity::{Confidence, QuantityKind, ResolvedQuantity};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Running total of one quantity kind for one element type
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateRecord {
    pub type_tag: String,
    pub kind: QuantityKind,
    /// Sum over measured and estimated values
    pub sum: f64,
    /// Entities that contributed to `sum`
    pub contributing: usize,
    pub measured: usize,
    pub estimated: usize,
    pub unavailable: usize,
}

impl AggregateRecord {
    pub fn new(type_tag: impl Into<String>, kind: QuantityKind) -> Self {
        Self {
            type_tag: type_tag.into(),
            kind,
            sum: 0.0,
            contributing: 0,
            measured: 0,
            estimated: 0,
            unavailable: 0,
        }
    }

    /// Account for one resolved quantity
    pub fn add(&mut self, quantity: &ResolvedQuantity) {
        match (quantity.confidence, quantity.value) {
            (Confidence::Unavailable, _) | (_, None) => self.unavailable += 1,
            (confidence, Some(value)) => {
                self.sum += value;
                self.contributing += 1;
                if confidence == Confidence::Measured {
                    self.measured += 1;
                } else {
                    self.estimated += 1;
                }
            }
        }
    }

    /// Combine with a record of the same type and kind
    ///
    /// Counts merge exactly; sums agree up to floating point rounding in
    /// whatever order records are merged.
    pub fn merge(&mut self, other: &AggregateRecord) {
        debug_assert!(self.type_tag == other.type_tag && self.kind == other.kind);
        self.sum += other.sum;
        self.contributing += other.contributing;
        self.measured += other.measured;
        self.estimated += other.estimated;
        self.unavailable += other.unavailable;
    }

    /// Entities seen, whether or not they contributed
    pub fn entity_count(&self) -> usize {
        self.contributing + self.unavailable
    }
}

/// Ordered set of records, one per (type, kind)
///
/// Records are kept in the order of the tracked types and then the kinds,
/// so reports list them the way the specification names them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Totals {
    records: Vec<AggregateRecord>,
    index: FxHashMap<(String, QuantityKind), usize>,
}

impl Totals {
    /// Empty records for every tracked type and kind
    pub fn new<S: AsRef<str>>(types: &[S], kinds: &[QuantityKind]) -> Self {
        let mut totals = Self::default();
        for type_tag in types {
            for kind in kinds {
                totals.slot(type_tag.as_ref(), *kind);
            }
        }
        totals
    }

    fn slot(&mut self, type_tag: &str, kind: QuantityKind) -> &mut AggregateRecord {
        let key = (type_tag.to_ascii_uppercase(), kind);
        let position = match self.index.get(&key) {
            Some(position) => *position,
            None => {
                self.records.push(AggregateRecord::new(type_tag, kind));
                self.index.insert(key, self.records.len() - 1);
                self.records.len() - 1
            }
        };
        &mut self.records[position]
    }

    /// Account for one resolved quantity
    pub fn add(&mut self, quantity: &ResolvedQuantity) {
        self.slot(&quantity.type_tag, quantity.kind).add(quantity);
    }

    /// Fold another set of records into this one
    pub fn merge(&mut self, records: &[AggregateRecord]) {
        for record in records {
            self.slot(&record.type_tag, record.kind).merge(record);
        }
    }

    pub fn get(&self, type_tag: &str, kind: QuantityKind) -> Option<&AggregateRecord> {
        self.index
            .get(&(type_tag.to_ascii_uppercase(), kind))
            .map(|position| &self.records[*position])
    }

    pub fn records(&self) -> &[AggregateRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AggregateRecord> {
        self.records
    }
}

/// Sum of one kind across all records
pub fn grand_total(records: &[AggregateRecord], kind: QuantityKind) -> f64 {
    records
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| r.sum)
        .sum()
}
