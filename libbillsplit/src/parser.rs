use crate::bill::{Bill, PricedItem};
use crate::description::Description;
use crate::posting::PostingConfig;
use crate::statement::Directive;
use crate::SplitError;
use anyhow::{anyhow, Result};
use pest::iterators::Pair;
use pest::Parser;

use std::fs;
use std::path::Path;

#[derive(Parser)]
#[grammar = "billsplit.pest"]
pub struct SplitParser;

pub fn parse_description_file(path: &Path) -> Result<Description> {
    let fcontent = fs::read_to_string(path)?;
    parse_description(&fcontent)
}

/// Parse participant descriptions. Groups are left unresolved, see [`crate::split`].
pub fn parse_description(input: &str) -> Result<Description> {
    let statements = SplitParser::parse(Rule::description, input)?;
    let mut description = Description::new();

    for statement in statements {
        match statement.as_rule() {
            Rule::statement => {
                let line = line_of(&statement);
                description.process_statement(line, statement.try_into()?)?
            }
            Rule::EOI => (),
            _ => return Err(anyhow!(format!("unexpected token: {}", statement.as_str()))),
        };
    }

    Ok(description)
}

pub fn parse_bill_file(path: &Path) -> Result<Bill> {
    let fcontent = fs::read_to_string(path)?;
    parse_bill(&fcontent)
}

/// Parse a bill sheet. The first line must be a `!paid` directive, every
/// item price is rescaled so they add up to the paid amount.
pub fn parse_bill(input: &str) -> Result<Bill> {
    let (line, first) = input
        .lines()
        .enumerate()
        .find(|(_, l)| !l.trim().is_empty())
        .map(|(idx, l)| (idx + 1, l.trim()))
        .unwrap_or((1, ""));
    if !first.starts_with("!paid") {
        return Err(SplitError::MalformedPaidDirective {
            line,
            found: first.to_string(),
        }
        .into());
    }

    let rows = SplitParser::parse(Rule::bill, input)?;
    let mut paid = None;
    let mut items = Vec::new();

    for row in rows {
        match row.as_rule() {
            Rule::directive => {
                let line = line_of(&row);
                let found = row.as_str().to_string();
                match Directive::parse(row)? {
                    Directive::Paid(amount) if paid.is_none() => paid = Some(amount),
                    Directive::Paid(_) => {
                        return Err(SplitError::MalformedPaidDirective { line, found }.into())
                    }
                    _ if paid.is_none() => {
                        return Err(SplitError::MalformedPaidDirective { line, found }.into())
                    }
                    _ => (),
                }
            }
            Rule::bill_row => items.push(PricedItem::parse(row)?),
            Rule::EOI => (),
            _ => return Err(anyhow!(format!("unexpected token: {}", row.as_str()))),
        };
    }

    let paid = paid.ok_or(SplitError::MalformedPaidDirective {
        line,
        found: first.to_string(),
    })?;
    Bill::new(paid, items)
}

pub fn parse_mapping_file(path: &Path) -> Result<PostingConfig> {
    let fcontent = fs::read_to_string(path)?;
    parse_mapping(&fcontent)
}

/// Parse a person to account mapping. Only `!bean-...` directives are
/// picked up, every other line is skipped.
pub fn parse_mapping(input: &str) -> Result<PostingConfig> {
    let directives = SplitParser::parse(Rule::mapping_file, input)?;
    let mut config = PostingConfig::default();

    for directive in directives {
        if directive.as_rule() == Rule::directive {
            config.apply(&Directive::parse(directive)?)?;
        }
    }

    Ok(config)
}

pub fn line_of(token: &Pair<Rule>) -> usize {
    token.as_span().start_pos().line_col().0
}

pub fn trimmed_str(token: Pair<Rule>) -> &str {
    token.as_str().trim()
}
