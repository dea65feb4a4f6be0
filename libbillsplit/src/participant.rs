use crate::parser::{line_of, Rule};
use crate::SplitError;
use anyhow::{anyhow, Result};
use pest::iterators::Pair;

use std::collections::BTreeSet;

/// Any token containing this is a group reference rather than a person.
pub const GROUP_MARKER: char = '@';

/// Implicit group of every person named in a category header or item list.
pub const EVERYONE: &str = "@everyone";

pub fn is_group(name: &str) -> bool {
    name.contains(GROUP_MARKER)
}

/// A participant token as written, e.g. `-Gon` or `Ging x3`.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedParticipant<'p> {
    pub(crate) name: &'p str,
    pub(crate) negate: bool,
    pub(crate) weight: u32,
}

impl<'p> ParsedParticipant<'p> {
    pub fn parse(token: Pair<'p, Rule>) -> Result<ParsedParticipant<'p>> {
        let line = line_of(&token);
        let raw = token.as_str();
        let mut participant = ParsedParticipant {
            name: "",
            negate: false,
            weight: 1,
        };

        for pair in token.into_inner() {
            match pair.as_rule() {
                Rule::negation => participant.negate = true,
                Rule::name => participant.name = pair.as_str().trim(),
                Rule::multiplier => {
                    let count = pair
                        .into_inner()
                        .next()
                        .ok_or(anyhow!(format!("invalid multiplier: '{}'", raw)))?;
                    participant.weight = match count.as_str().parse::<u32>() {
                        Ok(0) => {
                            return Err(SplitError::MalformedParticipant {
                                line,
                                token: raw.to_string(),
                                reason: "multiplier must be at least 1",
                            }
                            .into())
                        }
                        Ok(weight) => weight,
                        Err(_) => {
                            return Err(SplitError::MalformedParticipant {
                                line,
                                token: raw.to_string(),
                                reason: "multiplier is too large",
                            }
                            .into())
                        }
                    };
                }
                _ => {
                    return Err(anyhow!(format!(
                        "unexpected token for participant: '{}'",
                        pair.as_str()
                    )))
                }
            }
        }

        Ok(participant)
    }

    pub fn parse_list(token: Pair<'p, Rule>) -> Result<Vec<ParsedParticipant<'p>>> {
        match token.as_rule() {
            Rule::participants => token.into_inner().map(Self::parse).collect(),
            _ => Err(anyhow!(format!(
                "unexpected token for participants: '{}'",
                token.as_str()
            ))),
        }
    }

    pub fn is_group(&self) -> bool {
        is_group(self.name)
    }

    pub fn is_plain(&self) -> bool {
        !self.negate && self.weight == 1
    }
}

/// An owned participant occurrence, kept per item until finalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub name: String,
    pub negate: bool,
    pub weight: u32,
}

impl Occurrence {
    pub fn person(name: &str) -> Self {
        Self {
            name: name.to_string(),
            negate: false,
            weight: 1,
        }
    }

    pub fn is_group(&self) -> bool {
        is_group(&self.name)
    }

    /// One occurrence per member, each carrying this one's negation and weight.
    pub fn expand<'a>(&'a self, members: &'a BTreeSet<String>) -> impl Iterator<Item = Occurrence> + 'a {
        members.iter().map(move |name| Occurrence {
            name: name.clone(),
            negate: self.negate,
            weight: self.weight,
        })
    }
}

impl From<&ParsedParticipant<'_>> for Occurrence {
    fn from(p: &ParsedParticipant<'_>) -> Self {
        Self {
            name: p.name.to_string(),
            negate: p.negate,
            weight: p.weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{Rule, SplitParser};
    use crate::participant::{Occurrence, ParsedParticipant};
    use crate::SplitError;
    use pest::Parser;

    use anyhow::Result;

    use std::collections::BTreeSet;

    fn participant(input: &str) -> Result<ParsedParticipant> {
        ParsedParticipant::parse(SplitParser::parse(Rule::participant, input)?.next().unwrap())
    }

    #[test]
    fn parse_negated_multiplied() -> Result<()> {
        assert_eq!(
            participant("- Leorio x2")?,
            ParsedParticipant {
                name: "Leorio",
                negate: true,
                weight: 2,
            }
        );
        assert_eq!(
            participant("Jean-Luc")?,
            ParsedParticipant {
                name: "Jean-Luc",
                negate: false,
                weight: 1,
            }
        );
        Ok(())
    }

    #[test]
    fn zero_multiplier_is_rejected() {
        let err = participant("Gon x0").unwrap_err();
        assert_eq!(
            err.downcast_ref::<SplitError>(),
            Some(&SplitError::MalformedParticipant {
                line: 1,
                token: "Gon x0".to_string(),
                reason: "multiplier must be at least 1",
            })
        );
    }

    #[test]
    fn group_detection() -> Result<()> {
        assert!(participant("@hunters x2")?.is_group());
        assert!(!participant("@hunters x2")?.is_plain());
        assert!(!participant("Gon")?.is_group());
        Ok(())
    }

    #[test]
    fn expand_carries_negation_and_weight() {
        let members: BTreeSet<String> = ["Gon", "Killua"].iter().map(|s| s.to_string()).collect();
        let group = Occurrence {
            name: "@hunters".to_string(),
            negate: true,
            weight: 2,
        };
        let expanded: Vec<Occurrence> = group.expand(&members).collect();
        assert_eq!(
            expanded,
            vec![
                Occurrence {
                    name: "Gon".to_string(),
                    negate: true,
                    weight: 2,
                },
                Occurrence {
                    name: "Killua".to_string(),
                    negate: true,
                    weight: 2,
                },
            ]
        );
    }
}
