use crate::group::GroupStore;
use crate::participant::{Occurrence, ParsedParticipant};
use crate::posting::PostingConfig;
use crate::statement::{Directive, Statement};
use crate::SplitError;
use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Everything a description says, before groups are resolved.
///
/// Items keep the order they were written in. Each holds the raw participant
/// occurrences, mixing people and group references.
#[derive(Clone, Debug, Default)]
pub struct Description {
    items: IndexMap<String, Vec<Occurrence>>,
    groups: GroupStore,
    category: Option<Vec<Occurrence>>,
    options: IndexMap<String, String>,
    posting: PostingConfig,
}

impl Description {
    pub fn new() -> Description {
        Default::default()
    }

    pub fn items(&self) -> &IndexMap<String, Vec<Occurrence>> {
        &self.items
    }

    pub fn groups(&self) -> &GroupStore {
        &self.groups
    }

    pub fn options(&self) -> &IndexMap<String, String> {
        &self.options
    }

    pub fn posting(&self) -> &PostingConfig {
        &self.posting
    }

    pub fn set_option(&mut self, key: &str, val: &str) {
        self.options.insert(key.to_string(), val.to_string());
    }

    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }

    pub fn process_statement(&mut self, line: usize, statement: Statement) -> Result<()> {
        match statement {
            Statement::Directive(directive) => self.directive(line, directive),
            Statement::Group(group, participants) => self.group(line, group, participants),
            Statement::Category(label, participants) => {
                self.category(label, participants);
                Ok(())
            }
            Statement::Item(name, participants) => self.item(line, name, participants),
        }
    }

    fn directive(&mut self, line: usize, directive: Directive) -> Result<()> {
        match directive {
            Directive::Option(key, val) => {
                self.set_option(key, val);
                Ok(())
            }
            Directive::Paid(_) => {
                debug!("line {}: paid directive has no meaning in descriptions", line);
                Ok(())
            }
            Directive::Comment(text) => {
                if text.starts_with("bean-") || text.starts_with("option") {
                    warn!("line {}: ignoring malformed directive `!{}'", line, text);
                }
                Ok(())
            }
            posting => self.posting.apply(&posting),
        }
    }

    fn group(
        &mut self,
        line: usize,
        group: &str,
        participants: Option<Vec<ParsedParticipant>>,
    ) -> Result<()> {
        let participants = participants.ok_or(SplitError::MalformedGroupDefinition {
            line,
            group: group.to_string(),
            reason: "missing member list",
        })?;

        if participants.iter().any(|p| !p.is_plain()) {
            return Err(SplitError::MalformedGroupDefinition {
                line,
                group: group.to_string(),
                reason: "members cannot be negated or multiplied",
            }
            .into());
        }

        self.groups.define(group, participants.iter().map(|p| p.name));
        Ok(())
    }

    fn category(&mut self, label: Option<&str>, participants: Option<Vec<ParsedParticipant>>) {
        let defaults = participants.map(|list| self.enlist(&list));
        self.category = defaults;
        debug!(
            "category `{}' defaults to {:?}",
            label.unwrap_or_default(),
            self.category
        );
    }

    fn item(
        &mut self,
        line: usize,
        name: &str,
        participants: Option<Vec<ParsedParticipant>>,
    ) -> Result<()> {
        let occurrences = match participants {
            Some(list) => self.enlist(&list),
            None => match &self.category {
                Some(defaults) if !defaults.is_empty() => defaults.clone(),
                _ => {
                    return Err(SplitError::UnresolvedCategory {
                        line,
                        item: name.to_string(),
                    }
                    .into())
                }
            },
        };

        if self.items.insert(name.to_string(), occurrences).is_some() {
            warn!("line {}: item `{}' described twice, keeping the last one", line, name);
        }
        Ok(())
    }

    /// Convert a participant list, enrolling every person into `@everyone`.
    fn enlist(&mut self, list: &[ParsedParticipant]) -> Vec<Occurrence> {
        for participant in list.iter().filter(|p| !p.is_group()) {
            self.groups.enroll(participant.name);
        }
        list.iter().map(Occurrence::from).collect()
    }
}
