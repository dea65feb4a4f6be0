use crate::amount::{round_currency, Exact};
use crate::SplitError;
use anyhow::Result;
use indexmap::IndexMap;
use num_traits::Zero;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use tracing::info;

/// Rounding correction applied to one person's total.
#[derive(Clone, Debug, PartialEq)]
pub struct Adjustment {
    pub person: String,
    /// Subtracted from the person's rounded total.
    pub delta: Decimal,
}

/// Totals at currency precision. They always add up to the rounded grand total.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundedTotals {
    totals: IndexMap<String, Decimal>,
    grand_total: Decimal,
    adjustment: Option<Adjustment>,
}

impl RoundedTotals {
    pub fn totals(&self) -> &IndexMap<String, Decimal> {
        &self.totals
    }

    pub fn get(&self, person: &str) -> Option<Decimal> {
        self.totals.get(person).copied()
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    pub fn adjustment(&self) -> Option<&Adjustment> {
        self.adjustment.as_ref()
    }
}

/// Pick one of `people` from the run identity alone, so the same run always
/// picks the same person. `people` must be sorted.
pub fn pick_person<'a>(run_id: &str, people: &[&'a str]) -> Option<&'a str> {
    if people.is_empty() {
        return None;
    }

    let mut hasher = Sha256::new();
    hasher.update(run_id.as_bytes());
    for person in people {
        hasher.update([0u8]);
        hasher.update(person.as_bytes());
    }
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let idx = u64::from_be_bytes(head) % people.len() as u64;
    people.get(idx as usize).copied()
}

/// Round every total and push the leftover cents onto one person.
///
/// A leftover above `tolerance` means the shares were wrong to begin with,
/// and fails with [`SplitError::RoundingOverflow`].
pub fn round_totals(
    shares: &IndexMap<String, Exact>,
    run_id: &str,
    tolerance: Decimal,
) -> Result<RoundedTotals> {
    let exact_total = shares
        .values()
        .fold(Exact::zero(), |acc, share| acc + share);
    let grand_total = round_currency(&exact_total)
        .map_err(|_| SplitError::RoundingOverflow { delta: Decimal::MAX })?;
    info!("total {}", grand_total);

    let mut totals = IndexMap::new();
    for (person, share) in shares {
        totals.insert(person.clone(), round_currency(share)?);
    }

    let delta = totals.values().copied().sum::<Decimal>() - grand_total;
    if delta.abs() > tolerance {
        return Err(SplitError::RoundingOverflow { delta }.into());
    }

    let mut adjustment = None;
    if !delta.is_zero() {
        let mut people: Vec<&str> = totals.keys().map(String::as_str).collect();
        people.sort_unstable();
        if let Some(person) = pick_person(run_id, &people).map(str::to_string) {
            info!("Rounding off {} by {}", person, delta);
            if let Some(total) = totals.get_mut(&person) {
                *total -= delta;
            }
            adjustment = Some(Adjustment { person, delta });
        }
    }

    debug_assert_eq!(totals.values().copied().sum::<Decimal>(), grand_total);
    Ok(RoundedTotals {
        totals,
        grand_total,
        adjustment,
    })
}

#[cfg(test)]
mod tests {
    use crate::amount::{from_integer, Exact};
    use crate::rounding::{pick_person, round_totals};
    use crate::SplitError;
    use indexmap::IndexMap;
    use num_bigint::BigInt;
    use rust_decimal::Decimal;

    use anyhow::Result;

    fn ratio(n: i64, d: i64) -> Exact {
        Exact::new(BigInt::from(n), BigInt::from(d))
    }

    fn shares(values: &[(&str, Exact)]) -> IndexMap<String, Exact> {
        values
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }

    fn sum(totals: &IndexMap<String, Decimal>) -> Decimal {
        totals.values().copied().sum()
    }

    #[test]
    fn even_split_needs_no_adjustment() -> Result<()> {
        let rounded = round_totals(
            &shares(&[("A", from_integer(50)), ("B", from_integer(50))]),
            "sample.bill",
            Decimal::new(50, 2),
        )?;
        assert_eq!(rounded.get("A"), Some(Decimal::new(5000, 2)));
        assert_eq!(rounded.get("B"), Some(Decimal::new(5000, 2)));
        assert_eq!(rounded.adjustment(), None);
        Ok(())
    }

    #[test]
    fn thirds_are_reconciled() -> Result<()> {
        let third = ratio(100, 3);
        let rounded = round_totals(
            &shares(&[("A", third.clone()), ("B", third.clone()), ("C", third)]),
            "sample.bill",
            Decimal::new(50, 2),
        )?;
        assert_eq!(rounded.grand_total(), Decimal::new(10000, 2));
        assert_eq!(sum(rounded.totals()), rounded.grand_total());

        let adjustment = rounded.adjustment().unwrap();
        assert_eq!(adjustment.delta, Decimal::new(-1, 2));
        assert_eq!(rounded.get(&adjustment.person), Some(Decimal::new(3334, 2)));
        Ok(())
    }

    #[test]
    fn same_run_picks_same_person() -> Result<()> {
        let third = ratio(100, 3);
        let input = shares(&[("A", third.clone()), ("B", third.clone()), ("C", third)]);
        let first = round_totals(&input, "dinner.bill", Decimal::new(50, 2))?;
        for _ in 0..5 {
            assert_eq!(round_totals(&input, "dinner.bill", Decimal::new(50, 2))?, first);
        }
        Ok(())
    }

    #[test]
    fn pick_is_stable_and_in_range() {
        let people = ["Gon", "Killua", "Kurapika", "Leorio"];
        let picked = pick_person("trip/day-1.bill", &people);
        assert!(picked.is_some());
        assert_eq!(pick_person("trip/day-1.bill", &people), picked);
        assert_eq!(pick_person("anything", &["Gon"]), Some("Gon"));
        assert_eq!(pick_person("anything", &[]), None);
    }

    #[test]
    fn large_discrepancy_fails() {
        // 102 people at 0.005 each round up to 1.02 while the total is 0.51
        let people: Vec<(String, Exact)> = (0..102)
            .map(|i| (format!("p{}", i), ratio(1, 200)))
            .collect();
        let input: IndexMap<String, Exact> = people.into_iter().collect();
        let err = round_totals(&input, "crowd.bill", Decimal::new(50, 2)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SplitError>(),
            Some(&SplitError::RoundingOverflow {
                delta: Decimal::new(51, 2)
            })
        );
    }
}
