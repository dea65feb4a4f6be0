use crate::parser::Rule;
use anyhow::{anyhow, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use pest::iterators::Pair;
use rust_decimal::Decimal;

use std::str::FromStr;

/// Money kept as an exact fraction, so shares of a price always add back up to it.
pub type Exact = BigRational;

/// Decimal places of the currency totals are rounded to.
pub const CURRENCY_PLACES: u32 = 2;

pub fn parse_amount(token: Pair<Rule>) -> Result<Exact> {
    match token.as_rule() {
        Rule::amount => parse_str(token.as_str()),
        _ => Err(anyhow!(format!(
            "unexpected token for amount: '{}'",
            token.as_str()
        ))),
    }
}

/// Parse `1,234.50` style amounts. Thousands separators are dropped.
pub fn parse_str(s: &str) -> Result<Exact> {
    let cleaned: String = s.chars().filter(|&c| c != ',').collect();
    let nominal = Decimal::from_str(&cleaned)
        .map_err(|e| anyhow!(format!("invalid amount '{}': {}", s, e)))?;
    Ok(from_decimal(nominal))
}

pub fn from_decimal(nominal: Decimal) -> Exact {
    Exact::new(
        BigInt::from(nominal.mantissa()),
        BigInt::from(10u32).pow(nominal.scale()),
    )
}

pub fn from_integer(n: u64) -> Exact {
    Exact::from_integer(BigInt::from(n))
}

/// Round to currency precision, half-way cases away from zero.
pub fn round_currency(value: &Exact) -> Result<Decimal> {
    let scale = Exact::from_integer(BigInt::from(10u32).pow(CURRENCY_PLACES));
    let units = (value * &scale).round().to_integer();
    let units = units
        .to_i64()
        .ok_or(anyhow!(format!("amount '{}' is too large for a currency value", value)))?;
    Ok(Decimal::new(units, CURRENCY_PLACES))
}

#[cfg(test)]
mod tests {
    use crate::amount::{from_decimal, parse_amount, parse_str, round_currency, Exact};
    use crate::parser::{Rule, SplitParser};
    use num_bigint::BigInt;
    use pest::Parser;
    use rust_decimal::Decimal;

    use anyhow::Result;

    fn ratio(n: i64, d: i64) -> Exact {
        Exact::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn parse_wrong_token() -> Result<()> {
        let mut tokens = SplitParser::parse(Rule::quantity, "12")?;
        let amount = parse_amount(tokens.next().unwrap());
        assert_eq!(
            format!("{}", amount.unwrap_err()),
            "unexpected token for amount: '12'"
        );
        Ok(())
    }

    #[test]
    fn parse_amount_with_separators() -> Result<()> {
        let mut tokens = SplitParser::parse(Rule::amount, "1,234.50")?;
        let amount = parse_amount(tokens.next().unwrap())?;
        assert_eq!(amount, ratio(2469, 2));
        assert_eq!(parse_str("-15")?, ratio(-15, 1));
        Ok(())
    }

    #[test]
    fn decimal_is_lifted_exactly() {
        assert_eq!(from_decimal(Decimal::new(1005, 3)), ratio(201, 200));
    }

    #[test]
    fn round_half_away_from_zero() -> Result<()> {
        assert_eq!(round_currency(&ratio(1, 3))?, Decimal::new(33, 2));
        assert_eq!(round_currency(&ratio(2, 3))?, Decimal::new(67, 2));
        assert_eq!(round_currency(&ratio(1, 200))?, Decimal::new(1, 2));
        assert_eq!(round_currency(&ratio(-1, 200))?, Decimal::new(-1, 2));
        assert_eq!(round_currency(&ratio(50, 1))?.to_string(), "50.00");
        Ok(())
    }
}
