use crate::matcher::MatchMetric;
use crate::SplitError;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use std::str::FromStr;

/// Knobs of a split run.
///
/// Defaults can be overridden by `!option: key = value` lines in the
/// description, and those in turn by the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitOptions {
    /// Lowest similarity accepted when matching item names.
    pub similarity_threshold: f64,
    pub metric: MatchMetric,
    /// Case-insensitive prefix of items that only match each other.
    pub sampler_prefix: String,
    /// Largest rounding discrepancy that is corrected rather than rejected.
    pub rounding_tolerance: Decimal,
    /// Identifies the run, picks who absorbs the rounding discrepancy.
    pub run_id: String,
    pub currency: String,
    pub date: Option<NaiveDate>,
    pub title: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            metric: MatchMetric::default(),
            sampler_prefix: "sampler".to_string(),
            rounding_tolerance: Decimal::new(50, 2),
            run_id: String::new(),
            currency: "USD".to_string(),
            date: None,
            title: "Bill split".to_string(),
        }
    }
}

fn invalid(key: &str, reason: impl ToString) -> SplitError {
    SplitError::InvalidOption {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

impl SplitOptions {
    pub fn set_option(&mut self, key: &str, val: &str) -> Result<()> {
        match key {
            "similarity-threshold" => {
                let threshold = val.parse::<f64>().map_err(|e| invalid(key, e))?;
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(invalid(key, "must be between 0 and 1").into());
                }
                self.similarity_threshold = threshold;
            }
            "metric" => self.metric = val.parse()?,
            "sampler-prefix" => self.sampler_prefix = val.to_string(),
            "rounding-tolerance" => {
                let tolerance = Decimal::from_str(val).map_err(|e| invalid(key, e))?;
                if tolerance.is_sign_negative() {
                    return Err(invalid(key, "must not be negative").into());
                }
                self.rounding_tolerance = tolerance;
            }
            "run-id" => self.run_id = val.to_string(),
            "currency" => self.currency = val.to_string(),
            "date" => {
                self.date =
                    Some(NaiveDate::parse_from_str(val, "%Y-%m-%d").map_err(|e| invalid(key, e))?)
            }
            "title" => self.title = val.to_string(),
            _ => return Err(invalid(key, "unknown option").into()),
        }
        Ok(())
    }

    pub fn apply_options<'a, I>(&mut self, options: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, val) in options {
            self.set_option(key, val)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::matcher::MatchMetric;
    use crate::options::SplitOptions;
    use crate::parser::parse_description;
    use crate::SplitError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use anyhow::{anyhow, Result};

    #[test]
    fn test_set_option() -> Result<()> {
        let mut options = SplitOptions::default();
        options.set_option("similarity-threshold", "0.8")?;
        options.set_option("metric", "jaro-winkler")?;
        options.set_option("rounding-tolerance", "0.10")?;
        options.set_option("date", "2021-05-20")?;

        assert_eq!(options.similarity_threshold, 0.8);
        assert_eq!(options.metric, MatchMetric::JaroWinkler);
        assert_eq!(options.rounding_tolerance, Decimal::new(10, 2));
        assert_eq!(
            options.date,
            Some(NaiveDate::from_ymd_opt(2021, 5, 20).ok_or(anyhow!("invalid date"))?)
        );
        Ok(())
    }

    #[test]
    fn test_reject_options() {
        let mut options = SplitOptions::default();
        for (key, val) in [
            ("similarity-threshold", "1.5"),
            ("similarity-threshold", "high"),
            ("rounding-tolerance", "-1"),
            ("date", "20/05/2021"),
            ("colour", "blue"),
        ] {
            let err = options.set_option(key, val).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<SplitError>(),
                    Some(SplitError::InvalidOption { .. })
                ),
                "{} = {} should be rejected",
                key,
                val
            );
        }
        assert_eq!(options, SplitOptions::default());
    }

    #[test]
    fn test_options_from_description() -> Result<()> {
        let description = parse_description(
            "!option: sampler-prefix = taster\n!option: currency = IDR\ntea: Gon",
        )?;
        let mut options = SplitOptions::default();
        options.apply_options(description.options())?;
        assert_eq!(options.sampler_prefix, "taster");
        assert_eq!(options.currency, "IDR");
        Ok(())
    }
}
