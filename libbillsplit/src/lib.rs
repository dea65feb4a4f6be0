//! Billsplit - split a paid bill across the people who shared it
//! ---
//!
//! Takes a bill sheet (what was bought, what it cost, and what was actually paid)
//! and a free-text description of who had what, then works out exactly how much
//! each person owes. Totals can be printed as [Beancount](https://beancount.github.io)
//! postings.
//!
//! A description looks like this:
//!
//! ```text
//! @hunters: Gon, Killua
//!
//! # drinks
//! lemonade: Killua, Gon
//! rose punch: Leorio x2
//!
//! # starters: @everyone
//! nachos
//! fries
//!
//! # main course
//! pizza: -Gon, Ging x3
//! fried rice: -Kurapika
//! ```
//!

extern crate pest;
#[macro_use]
extern crate pest_derive;

/// Beancount account names, e.g. `Assets:Receivable:Gon`.
pub mod account;

mod amount;

/// Priced line items, rescaled to the amount actually paid.
pub mod bill;

/// Who consumed what, as written in the description text.
pub mod description;

mod allocation;
mod contribution;
mod group;
mod matcher;
mod options;
mod participant;
mod posting;
mod report;
mod rounding;
mod statement;

/// Our main parser entrypoints.
pub mod parser;

/// The whole pipeline, from parsed inputs to rounded totals.
pub mod split;

pub use allocation::Allocation;
pub use amount::{from_decimal, round_currency, Exact, CURRENCY_PLACES};
pub use contribution::{ResolvedItem, Weights};
pub use group::GroupStore;
pub use matcher::{MatchMetric, Matcher};
pub use options::SplitOptions;
pub use participant::{Occurrence, EVERYONE, GROUP_MARKER};
pub use posting::PostingConfig;
pub use rounding::{Adjustment, RoundedTotals};
pub use parser::{
    parse_bill, parse_bill_file, parse_description, parse_description_file, parse_mapping,
    parse_mapping_file,
};
pub use split::{split, Split};

use rust_decimal::Decimal;

/// Everything that can invalidate a split.
///
/// None of these are recovered from: any of them means the inputs (or the
/// pipeline) are wrong and the totals cannot be trusted. Pipeline functions
/// return [`anyhow::Result`], use `downcast_ref::<SplitError>()` to tell them apart.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum SplitError {
    #[error("line {line}: first line should be the paid amount, e.g. '!paid: 1234.00', found `{found}'")]
    MalformedPaidDirective { line: usize, found: String },

    #[error("bill items sum up to zero, cannot scale them to the paid amount")]
    EmptyBill,

    #[error("line {line}: malformed definition of group `{group}': {reason}")]
    MalformedGroupDefinition {
        line: usize,
        group: String,
        reason: &'static str,
    },

    #[error("line {line}: malformed participant `{token}': {reason}")]
    MalformedParticipant {
        line: usize,
        token: String,
        reason: &'static str,
    },

    #[error("line {line}: no category people or groups defined for item `{item}'")]
    UnresolvedCategory { line: usize, item: String },

    #[error("group `{group}' is used but never defined")]
    UndefinedGroup { group: String },

    #[error("cyclic group reference: {}", .cycle.join(" -> "))]
    CyclicGroupReference { cycle: Vec<String> },

    #[error("item `{item}': `{person}' ends up with negative contribution {weight}")]
    NegativeContribution {
        item: String,
        person: String,
        weight: i64,
    },

    #[error("item `{item}': group `{group}' left in the final participants")]
    UnresolvedGroupLeak { item: String, group: String },

    #[error("no match for bill item `{item}' in: {}", .candidates.join(", "))]
    UnmatchedItem {
        item: String,
        candidates: Vec<String>,
    },

    #[error("nobody shares bill item `{item}'")]
    ZeroParticipantItem { item: String },

    #[error("rounded totals are off by {delta}, something is very wrong")]
    RoundingOverflow { delta: Decimal },

    #[error("invalid option `{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("input `{0}' is not a valid account name")]
    InvalidAccount(String),

    #[error("participant `{0}' not found in the totals")]
    UnknownParticipant(String),
}
