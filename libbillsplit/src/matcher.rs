use crate::options::SplitOptions;
use crate::SplitError;
use anyhow::Result;
use tracing::debug;

use std::fmt;
use std::str::FromStr;

/// String similarity used to pair bill items with description items.
/// Every metric scores from 0.0 (nothing alike) to 1.0 (identical).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchMetric {
    #[default]
    Levenshtein,
    JaroWinkler,
    SorensenDice,
}

impl MatchMetric {
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        match self {
            MatchMetric::Levenshtein => strsim::normalized_levenshtein(a, b),
            MatchMetric::JaroWinkler => strsim::jaro_winkler(a, b),
            MatchMetric::SorensenDice => strsim::sorensen_dice(a, b),
        }
    }
}

impl fmt::Display for MatchMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMetric::Levenshtein => write!(f, "levenshtein"),
            MatchMetric::JaroWinkler => write!(f, "jaro-winkler"),
            MatchMetric::SorensenDice => write!(f, "sorensen-dice"),
        }
    }
}

impl FromStr for MatchMetric {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "levenshtein" => Ok(MatchMetric::Levenshtein),
            "jaro-winkler" => Ok(MatchMetric::JaroWinkler),
            "sorensen-dice" => Ok(MatchMetric::SorensenDice),
            other => Err(SplitError::InvalidOption {
                key: "metric".to_string(),
                reason: format!(
                    "unknown metric `{}', expected levenshtein, jaro-winkler or sorensen-dice",
                    other
                ),
            }),
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Pairs bill item names with description item names.
///
/// Bill items starting with the sampler prefix only ever match description
/// items with the same prefix.
#[derive(Debug)]
pub struct Matcher<'m> {
    names: Vec<(&'m str, String)>,
    metric: MatchMetric,
    threshold: f64,
    sampler_prefix: String,
}

impl<'m> Matcher<'m> {
    pub fn new<I>(names: I, options: &SplitOptions) -> Matcher<'m>
    where
        I: IntoIterator<Item = &'m str>,
    {
        Matcher {
            names: names.into_iter().map(|n| (n, normalize(n))).collect(),
            metric: options.metric,
            threshold: options.similarity_threshold,
            sampler_prefix: normalize(&options.sampler_prefix),
        }
    }

    pub fn is_sampler(&self, name: &str) -> bool {
        !self.sampler_prefix.is_empty() && normalize(name).starts_with(&self.sampler_prefix)
    }

    /// The single best description item for `item`, at or above the threshold.
    /// Ties go to whichever was described first.
    pub fn best_match(&self, item: &str) -> Result<&'m str> {
        let sampler = self.is_sampler(item);
        let wanted = normalize(item);
        let candidates: Vec<&(&'m str, String)> = self
            .names
            .iter()
            .filter(|(_, normalized)| !sampler || normalized.starts_with(&self.sampler_prefix))
            .collect();

        let mut best: Option<(&'m str, f64)> = None;
        for (name, normalized) in candidates.iter().copied() {
            let score = self.metric.similarity(&wanted, normalized);
            if score < self.threshold {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((*name, score));
            }
        }

        match best {
            Some((name, score)) => {
                debug!("bill item `{}' matched `{}' ({:.3})", item, name, score);
                Ok(name)
            }
            None => Err(SplitError::UnmatchedItem {
                item: item.to_string(),
                candidates: candidates.iter().map(|(name, _)| name.to_string()).collect(),
            }
            .into()),
        }
    }
}
