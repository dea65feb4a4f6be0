use crate::account::Account;
use crate::amount::{round_currency, Exact};
use crate::options::SplitOptions;
use crate::rounding::RoundedTotals;
use crate::statement::Directive;
use crate::SplitError;
use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, warn};

use std::fmt::Write;

/// Where the rounded totals get posted to, collected from `!bean-...` lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostingConfig {
    accounts: IndexMap<String, String>,
    me: Option<(String, String)>,
    unknown: Option<String>,
    total: Option<String>,
}

fn validate(account: &str) -> Result<String> {
    let parsed = Account::try_from(account)?;
    if !parsed.is_settlement() {
        warn!("`{}' is an unusual account to settle a bill with", parsed);
    }
    Ok(parsed.to_string())
}

impl PostingConfig {
    pub fn apply(&mut self, directive: &Directive) -> Result<()> {
        match directive {
            Directive::BeanName(person, account) => {
                self.accounts
                    .insert(person.to_string(), validate(account)?);
            }
            Directive::BeanNameMe(person, account) => {
                self.me = Some((person.to_string(), validate(account)?));
            }
            Directive::BeanUnknown(account) => self.unknown = Some(validate(account)?),
            Directive::BeanTotal(account) => self.total = Some(validate(account)?),
            other => debug!("not a posting directive: {:?}", other),
        }
        Ok(())
    }

    /// Overlay `other` on top of this config, `other` wins on conflicts.
    pub fn merge(&mut self, other: &PostingConfig) {
        for (person, account) in &other.accounts {
            self.accounts.insert(person.clone(), account.clone());
        }
        if other.me.is_some() {
            self.me = other.me.clone();
        }
        if other.unknown.is_some() {
            self.unknown = other.unknown.clone();
        }
        if other.total.is_some() {
            self.total = other.total.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &PostingConfig::default()
    }

    pub fn account_of(&self, person: &str) -> Option<&str> {
        match &self.me {
            Some((me, account)) if me == person => Some(account.as_str()),
            _ => self.accounts.get(person).map(String::as_str),
        }
    }

    pub fn me(&self) -> Option<&str> {
        self.me.as_ref().map(|(person, _)| person.as_str())
    }

    pub fn total(&self) -> Option<&str> {
        self.total.as_deref()
    }

    pub fn unknown(&self) -> Option<&str> {
        self.unknown.as_deref()
    }

    /// Render the totals as a beancount transaction.
    ///
    /// The header is only written when a date is configured. "Me" is posted
    /// last, with the amount elided so beancount balances it.
    pub fn render(
        &self,
        rounded: &RoundedTotals,
        paid: &Exact,
        options: &SplitOptions,
    ) -> Result<String> {
        let mut out = String::new();
        if let Some(date) = options.date {
            writeln!(out, "{} * \"{}\"", date.format("%Y-%m-%d"), options.title)?;
        }

        if let Some(total) = &self.total {
            writeln!(
                out,
                "  {}  {} {}",
                total,
                -round_currency(paid)?,
                options.currency
            )?;
        }

        let me = self.me();
        if let Some(me) = me {
            if rounded.get(me).is_none() {
                return Err(SplitError::UnknownParticipant(me.to_string()).into());
            }
        }

        for (person, amount) in rounded.totals() {
            if Some(person.as_str()) == me {
                continue;
            }
            let account = match (self.accounts.get(person), &self.unknown) {
                (Some(account), _) => account.as_str(),
                (None, Some(unknown)) => {
                    warn!("no account for `{}', posting to {}", person, unknown);
                    unknown.as_str()
                }
                (None, None) => {
                    warn!("no account for `{}', posting to the bare name", person);
                    person.as_str()
                }
            };
            writeln!(out, "  {}  {} {}", account, amount, options.currency)?;
        }

        if let Some((_, account)) = &self.me {
            writeln!(out, "  {}", account)?;
        }

        Ok(out)
    }
}
