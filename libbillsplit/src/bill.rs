use crate::amount::{parse_amount, round_currency, Exact};
use crate::parser::Rule;
use crate::SplitError;
use anyhow::{anyhow, Result};
use num_traits::Zero;
use pest::iterators::Pair;
use tracing::info;

/// A bill line: `quantity<TAB>name<TAB>price`.
///
/// Quantity is informational, the price already covers all of them.
#[derive(Clone, Debug, PartialEq)]
pub struct PricedItem {
    pub name: String,
    pub price: Exact,
    pub quantity: u32,
}

impl PricedItem {
    pub fn parse(token: Pair<Rule>) -> Result<PricedItem> {
        let mut pairs = token.into_inner();
        let quantity = pairs
            .next()
            .ok_or(anyhow!(format!("invalid quantity: '{}'", pairs.as_str())))?
            .as_str()
            .parse::<u32>()?;
        let name = pairs
            .next()
            .ok_or(anyhow!(format!("invalid item name: '{}'", pairs.as_str())))?
            .as_str()
            .trim()
            .to_string();
        let price = parse_amount(
            pairs
                .next()
                .ok_or(anyhow!(format!("invalid price: '{}'", pairs.as_str())))?,
        )?;

        Ok(PricedItem {
            name,
            price,
            quantity,
        })
    }

    pub fn scale_price(&self, multiplier: &Exact) -> PricedItem {
        PricedItem {
            name: self.name.clone(),
            price: &self.price * multiplier,
            quantity: self.quantity,
        }
    }
}

/// Bill items, with prices scaled so they add up to what was actually paid.
///
/// The paid amount absorbs taxes, tips and discounts, each item carries its
/// proportion of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Bill {
    paid: Exact,
    original_sum: Exact,
    items: Vec<PricedItem>,
}

impl Bill {
    /// `items` carry their original, pre-adjustment prices.
    pub fn new(paid: Exact, items: Vec<PricedItem>) -> Result<Bill> {
        let original_sum = items
            .iter()
            .fold(Exact::zero(), |acc, item| acc + &item.price);
        if original_sum.is_zero() {
            return Err(SplitError::EmptyBill.into());
        }
        info!("bill sum: {}", round_currency(&original_sum)?);

        let multiplier = &paid / &original_sum;
        let items = items
            .iter()
            .map(|item| item.scale_price(&multiplier))
            .collect();

        Ok(Bill {
            paid,
            original_sum,
            items,
        })
    }

    pub fn paid(&self) -> &Exact {
        &self.paid
    }

    pub fn original_sum(&self) -> &Exact {
        &self.original_sum
    }

    pub fn items(&self) -> &[PricedItem] {
        &self.items
    }
}
