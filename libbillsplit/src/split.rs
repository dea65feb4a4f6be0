use crate::allocation::Allocation;
use crate::amount::Exact;
use crate::bill::Bill;
use crate::contribution::{self, ResolvedItem};
use crate::description::Description;
use crate::matcher::Matcher;
use crate::options::SplitOptions;
use crate::rounding::{self, RoundedTotals};
use anyhow::Result;
use indexmap::IndexMap;
use tracing::debug;

/// Outcome of a split run.
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    paid: Exact,
    items: IndexMap<String, ResolvedItem>,
    allocation: Allocation,
    rounded: RoundedTotals,
}

impl Split {
    pub fn paid(&self) -> &Exact {
        &self.paid
    }

    /// Finalized weights of every described item.
    pub fn items(&self) -> &IndexMap<String, ResolvedItem> {
        &self.items
    }

    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    pub fn rounded(&self) -> &RoundedTotals {
        &self.rounded
    }
}

/// Run every stage on parsed inputs: resolve groups, finalize weights, match
/// bill items, share prices out and round the totals.
pub fn split(bill: &Bill, description: &Description, options: &SplitOptions) -> Result<Split> {
    let groups = description.groups().resolve()?;
    debug!("everyone: {:?}", groups.everyone());

    let items = contribution::finalize(description.items(), &groups)?;
    let matcher = Matcher::new(items.keys().map(String::as_str), options);
    let allocation = Allocation::assign(bill, &items, &matcher)?;
    let rounded = rounding::round_totals(
        allocation.totals(),
        &options.run_id,
        options.rounding_tolerance,
    )?;

    Ok(Split {
        paid: bill.paid().clone(),
        items,
        allocation,
        rounded,
    })
}

#[cfg(test)]
mod tests {
    use crate::amount::from_integer;
    use crate::options::SplitOptions;
    use crate::parser::{parse_bill, parse_description};
    use crate::split::{split, Split};
    use crate::SplitError;
    use rust_decimal::Decimal;

    use anyhow::Result;

    fn run(bill: &str, description: &str) -> Result<Split> {
        let mut options = SplitOptions::default();
        options.run_id = "test.bill".to_string();
        split(&parse_bill(bill)?, &parse_description(description)?, &options)
    }

    fn cents(value: i64) -> Option<Decimal> {
        Some(Decimal::new(value, 2))
    }

    #[test]
    fn even_split() -> Result<()> {
        let split = run("!paid: 100\n1\tPizza\t100", "Pizza: A, B")?;
        assert_eq!(split.allocation().totals()["A"], from_integer(50));
        assert_eq!(split.allocation().totals()["B"], from_integer(50));
        assert_eq!(split.rounded().get("A"), cents(5000));
        assert_eq!(split.rounded().get("B"), cents(5000));
        assert_eq!(split.rounded().adjustment(), None);
        Ok(())
    }

    #[test]
    fn negation_seeds_everyone() -> Result<()> {
        let split = run(
            "!paid: 100\n1\tPizza\t100",
            "# food: A, B, C\nPizza: -A, B x2",
        )?;
        assert_eq!(split.items()["Pizza"].weights["A"], 0);
        assert_eq!(split.items()["Pizza"].weights["B"], 3);
        assert_eq!(split.items()["Pizza"].weights["C"], 1);

        assert_eq!(split.rounded().get("A"), None);
        assert_eq!(split.rounded().get("B"), cents(7500));
        assert_eq!(split.rounded().get("C"), cents(2500));
        Ok(())
    }

    #[test]
    fn sampler_only_matches_sampler() -> Result<()> {
        let split = run(
            "!paid: 20\n1\tSampler tea\t10\n1\tSample tea\t10",
            "sampler cakes: A\nsample tea: B",
        )?;
        assert_eq!(split.rounded().get("A"), cents(1000));
        assert_eq!(split.rounded().get("B"), cents(1000));
        assert_eq!(split.allocation().breakdown()["A"].len(), 1);
        assert!(split.allocation().breakdown()["A"].contains_key("Sampler tea"));
        Ok(())
    }

    #[test]
    fn unmatched_item_fails() {
        let err = run("!paid: 10\n1\tSteak\t10", "nachos: A").unwrap_err();
        assert_eq!(
            err.downcast_ref::<SplitError>(),
            Some(&SplitError::UnmatchedItem {
                item: "Steak".to_string(),
                candidates: vec!["nachos".to_string()],
            })
        );
    }

    #[test]
    fn taxes_spread_and_totals_reconcile() -> Result<()> {
        let split = run(
            "!paid: 110.00\n1\tPizza\t60\n1\tLemonade\t20\n1\tNachos\t20",
            "@hunters: Gon, Killua\npizza: @hunters, Kurapika\nlemonade: Gon\n# starters: @everyone\nnachos",
        )?;
        let rounded = split.rounded();
        assert_eq!(rounded.grand_total(), Decimal::new(11000, 2));
        assert_eq!(
            rounded.totals().values().copied().sum::<Decimal>(),
            rounded.grand_total()
        );
        // lemonade 22, a third of pizza 22, half of nachos 11
        assert_eq!(rounded.get("Gon"), cents(5500));
        assert_eq!(rounded.get("Kurapika"), cents(3300));
        Ok(())
    }

    #[test]
    fn cycles_abort_the_run() {
        let err = run("!paid: 10\n1\tTea\t10", "@a: @b\n@b: @a\ntea: @a").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SplitError>(),
            Some(SplitError::CyclicGroupReference { .. })
        ));
    }
}
