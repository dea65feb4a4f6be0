use std::cmp::PartialEq;
use std::fmt;

use crate::parser::Rule;
use crate::SplitError;
use pest::iterators::Pair;

/// A Beancount account, split into its root and its segments.
#[derive(Clone, Debug, PartialEq)]
pub enum Account<'a> {
    Assets(Vec<&'a str>),
    Expenses(Vec<&'a str>),
    Liabilities(Vec<&'a str>),
    Income(Vec<&'a str>),
    Equity(Vec<&'a str>),
}

impl<'a> Account<'a> {
    pub fn base_name(s: &'a str) -> Vec<&'a str> {
        s.split(':').skip(1).collect()
    }

    pub fn parse(token: Pair<'a, Rule>) -> anyhow::Result<Account<'a>> {
        token.as_str().try_into()
    }

    pub fn segments(&self) -> &[&'a str] {
        match self {
            Account::Assets(v)
            | Account::Expenses(v)
            | Account::Liabilities(v)
            | Account::Income(v)
            | Account::Equity(v) => v,
        }
    }

    /// Accounts people pay back into. Anything else is most likely a typo
    /// in a `!bean-name` line.
    pub fn is_settlement(&self) -> bool {
        matches!(
            self,
            Account::Assets(_) | Account::Liabilities(_) | Account::Expenses(_)
        )
    }
}

impl<'a> fmt::Display for Account<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Account::Assets(v) => write!(f, "Assets:{}", v.join(":")),
            Account::Expenses(v) => write!(f, "Expenses:{}", v.join(":")),
            Account::Liabilities(v) => write!(f, "Liabilities:{}", v.join(":")),
            Account::Income(v) => write!(f, "Income:{}", v.join(":")),
            Account::Equity(v) => write!(f, "Equity:{}", v.join(":")),
        }
    }
}

impl<'a> TryFrom<&'a str> for Account<'a> {
    type Error = anyhow::Error;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        let segments = Account::base_name(s);
        if segments.is_empty()
            || segments
                .iter()
                .any(|seg| seg.is_empty() || seg.chars().any(char::is_whitespace))
        {
            return Err(SplitError::InvalidAccount(s.to_string()).into());
        }

        if s.starts_with("Assets:") {
            return Ok(Account::Assets(segments));
        }

        if s.starts_with("Expenses:") {
            return Ok(Account::Expenses(segments));
        }

        if s.starts_with("Liabilities:") {
            return Ok(Account::Liabilities(segments));
        }

        if s.starts_with("Income:") {
            return Ok(Account::Income(segments));
        }

        if s.starts_with("Equity:") {
            return Ok(Account::Equity(segments));
        }

        Err(SplitError::InvalidAccount(s.to_string()).into())
    }
}
