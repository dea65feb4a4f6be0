use crate::group::GroupStore;
use crate::participant::{is_group, Occurrence};
use crate::SplitError;
use anyhow::Result;
use indexmap::IndexMap;

use std::collections::BTreeMap;

/// Per-person weight counter. Missing people count as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Weights(BTreeMap<String, i64>);

impl Weights {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, person: &str, weight: i64) {
        *self.0.entry(person.to_string()).or_insert(0) += weight;
    }

    pub fn subtract(&mut self, person: &str, weight: i64) {
        self.add(person, -weight);
    }

    /// Subtract every weight of `other`, people only in `other` end up negative.
    pub fn subtract_all(&mut self, other: &Weights) {
        for (person, &weight) in other.iter() {
            self.subtract(person, weight);
        }
    }

    pub fn get(&self, person: &str) -> i64 {
        self.0.get(person).copied().unwrap_or(0)
    }

    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.0.iter()
    }
}

/// An item with its final, non-negative weight per person.
///
/// People whose contributions cancel out stay in with weight zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedItem {
    pub name: String,
    pub weights: BTreeMap<String, u64>,
}

impl ResolvedItem {
    pub fn total_weight(&self) -> u64 {
        self.weights.values().sum()
    }

    /// People with a nonzero weight.
    pub fn contributors(&self) -> impl Iterator<Item = (&String, u64)> {
        self.weights
            .iter()
            .filter(|(_, weight)| **weight > 0)
            .map(|(person, &weight)| (person, weight))
    }
}

/// Turn raw occurrences into a weight per person.
///
/// A list with negations but no group reference means "everyone except", so
/// `@everyone` is seeded at weight one before the occurrences are applied.
/// `groups` must already be resolved.
pub fn finalize_item(name: &str, occurrences: &[Occurrence], groups: &GroupStore) -> Result<ResolvedItem> {
    let mut kept = Weights::new();
    let mut removed = Weights::new();

    if occurrences.iter().any(|o| o.negate) && !occurrences.iter().any(Occurrence::is_group) {
        for person in groups.everyone() {
            kept.add(person, 1);
        }
    }

    for occurrence in occurrences {
        let expanded: Vec<Occurrence> = if occurrence.is_group() {
            let members = groups
                .members(&occurrence.name)
                .ok_or(SplitError::UndefinedGroup {
                    group: occurrence.name.clone(),
                })?;
            occurrence.expand(members).collect()
        } else {
            vec![occurrence.clone()]
        };

        for person in expanded {
            if person.negate {
                removed.add(&person.name, person.weight.into());
            } else {
                kept.add(&person.name, person.weight.into());
            }
        }
    }

    kept.subtract_all(&removed);

    let mut weights = BTreeMap::new();
    for (person, &weight) in kept.iter() {
        if is_group(person) {
            return Err(SplitError::UnresolvedGroupLeak {
                item: name.to_string(),
                group: person.clone(),
            }
            .into());
        }
        let weight = u64::try_from(weight).map_err(|_| SplitError::NegativeContribution {
            item: name.to_string(),
            person: person.clone(),
            weight,
        })?;
        weights.insert(person.clone(), weight);
    }

    Ok(ResolvedItem {
        name: name.to_string(),
        weights,
    })
}

/// Finalize every item, keeping description order.
pub fn finalize<'a, I>(items: I, groups: &GroupStore) -> Result<IndexMap<String, ResolvedItem>>
where
    I: IntoIterator<Item = (&'a String, &'a Vec<Occurrence>)>,
{
    let mut resolved = IndexMap::new();
    for (name, occurrences) in items {
        resolved.insert(name.clone(), finalize_item(name, occurrences, groups)?);
    }
    Ok(resolved)
}
