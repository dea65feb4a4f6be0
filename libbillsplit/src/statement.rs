use crate::amount::{parse_amount, Exact};
use crate::parser::{trimmed_str, Rule};
use crate::participant::ParsedParticipant;
use pest::iterators::Pair;

use std::convert::TryFrom;

/// `!` lines. Anything that is not one of the known forms is a comment.
#[derive(Debug, PartialEq)]
pub enum Directive<'d> {
    Option(&'d str, &'d str),
    BeanName(&'d str, &'d str),
    BeanNameMe(&'d str, &'d str),
    BeanUnknown(&'d str),
    BeanTotal(&'d str),
    Paid(Exact),
    Comment(&'d str),
}

macro_rules! next_token {
    ($pairs:ident, $expected:expr) => {
        $pairs.next().ok_or(anyhow::Error::msg(format!(
            "invalid next token, expected {}",
            $expected
        )))?
    };
}

impl<'d> Directive<'d> {
    pub fn parse(token: Pair<'d, Rule>) -> anyhow::Result<Directive<'d>> {
        let mut pairs = token.into_inner();
        let directive = next_token!(pairs, "directive body");
        let tag = directive.as_rule();
        let mut pairs = directive.into_inner();

        let parsed = match tag {
            Rule::option_directive => {
                let (key, val) = Self::mapping(next_token!(pairs, "option mapping"))?;
                Self::Option(key, val)
            }
            Rule::bean_name => {
                let (name, account) = Self::mapping(next_token!(pairs, "bean-name mapping"))?;
                Self::BeanName(name, account)
            }
            Rule::bean_name_me => {
                let (name, account) = Self::mapping(next_token!(pairs, "bean-name-me mapping"))?;
                Self::BeanNameMe(name, account)
            }
            Rule::bean_unknown => Self::BeanUnknown(next_token!(pairs, "account").as_str()),
            Rule::bean_total => Self::BeanTotal(next_token!(pairs, "account").as_str()),
            Rule::paid => Self::Paid(parse_amount(next_token!(pairs, "paid amount"))?),
            Rule::comment => Self::Comment(trimmed_str(next_token!(pairs, "comment"))),
            _ => unreachable!(),
        };

        Ok(parsed)
    }

    fn mapping(token: Pair<'d, Rule>) -> anyhow::Result<(&'d str, &'d str)> {
        let mut pairs = token.into_inner();
        let key = trimmed_str(next_token!(pairs, "mapping key"));
        let val = trimmed_str(next_token!(pairs, "mapping value"));
        Ok((key, val))
    }
}

/// One non-blank line of a description.
#[derive(Debug, PartialEq)]
pub enum Statement<'s> {
    Directive(Directive<'s>),
    Group(&'s str, Option<Vec<ParsedParticipant<'s>>>),
    Category(Option<&'s str>, Option<Vec<ParsedParticipant<'s>>>),
    Item(&'s str, Option<Vec<ParsedParticipant<'s>>>),
}

impl<'s> TryFrom<Pair<'s, Rule>> for Statement<'s> {
    type Error = anyhow::Error;

    fn try_from(pair: Pair<'s, Rule>) -> Result<Self, Self::Error> {
        let inner = pair.into_inner().next().ok_or(anyhow::Error::msg(
            "invalid next token, expected statements",
        ))?;
        Self::into_statement(inner)
    }
}

impl<'s> Statement<'s> {
    fn into_statement(statement: Pair<'s, Rule>) -> anyhow::Result<Self> {
        let tag = statement.as_rule();
        if tag == Rule::directive {
            return Ok(Self::Directive(Directive::parse(statement)?));
        }

        let mut pairs = statement.into_inner().peekable();
        let label = match pairs.peek().map(|p| p.as_rule()) {
            Some(Rule::label) | Some(Rule::group_label) => pairs.next().map(trimmed_str),
            _ => None,
        };
        let participants = match pairs.next() {
            Some(list) => Some(ParsedParticipant::parse_list(list)?),
            None => None,
        };

        let stmt = match tag {
            Rule::group_definition => Self::Group(label.unwrap_or_default(), participants),
            Rule::category => Self::Category(label, participants),
            Rule::item => Self::Item(label.unwrap_or_default(), participants),
            _ => unreachable!(),
        };

        Ok(stmt)
    }
}
