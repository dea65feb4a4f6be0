use crate::amount::{from_integer, Exact};
use crate::bill::{Bill, PricedItem};
use crate::contribution::ResolvedItem;
use crate::matcher::Matcher;
use crate::SplitError;
use anyhow::Result;
use indexmap::IndexMap;
use num_traits::Zero;

/// Exact share of every person, overall and per bill item.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    totals: IndexMap<String, Exact>,
    breakdown: IndexMap<String, IndexMap<String, Exact>>,
    grand_total: Exact,
}

impl Allocation {
    pub fn new() -> Self {
        Self {
            totals: IndexMap::new(),
            breakdown: IndexMap::new(),
            grand_total: Exact::zero(),
        }
    }

    /// Match every bill item to a description item and share its price.
    pub fn assign(
        bill: &Bill,
        items: &IndexMap<String, ResolvedItem>,
        matcher: &Matcher,
    ) -> Result<Allocation> {
        let mut allocation = Allocation::new();
        for bill_item in bill.items() {
            let matched = matcher.best_match(&bill_item.name)?;
            let resolved = items.get(matched).ok_or(SplitError::UnmatchedItem {
                item: bill_item.name.clone(),
                candidates: vec![matched.to_string()],
            })?;
            allocation.allocate(bill_item, resolved)?;
        }
        Ok(allocation)
    }

    /// Split one item's price in proportion to the weights of its people.
    pub fn allocate(&mut self, item: &PricedItem, resolved: &ResolvedItem) -> Result<()> {
        let total_weight = resolved.total_weight();
        if total_weight == 0 {
            return Err(SplitError::ZeroParticipantItem {
                item: item.name.clone(),
            }
            .into());
        }

        let per_share = &item.price / from_integer(total_weight);
        let mut allocated = Exact::zero();
        for (person, weight) in resolved.contributors() {
            let share = &per_share * from_integer(weight);
            allocated = &allocated + &share;

            let total = self
                .totals
                .entry(person.clone())
                .or_insert_with(Exact::zero);
            *total = &*total + &share;

            let detail = self
                .breakdown
                .entry(person.clone())
                .or_default()
                .entry(item.name.clone())
                .or_insert_with(Exact::zero);
            *detail = &*detail + &share;
        }
        debug_assert_eq!(allocated, item.price);

        self.grand_total = &self.grand_total + &item.price;
        Ok(())
    }

    /// Each person's exact total, in order of their first share.
    pub fn totals(&self) -> &IndexMap<String, Exact> {
        &self.totals
    }

    /// Each person's exact share of every bill item they had.
    pub fn breakdown(&self) -> &IndexMap<String, IndexMap<String, Exact>> {
        &self.breakdown
    }

    pub fn grand_total(&self) -> &Exact {
        &self.grand_total
    }
}
