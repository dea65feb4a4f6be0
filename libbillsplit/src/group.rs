use crate::participant::{is_group, EVERYONE};
use crate::SplitError;
use anyhow::Result;
use tracing::debug;

use std::collections::{BTreeMap, BTreeSet};

/// Named groups of people, e.g. `@hunters: Gon, Killua, @elders`.
///
/// Members may be other groups until [`GroupStore::resolve`] flattens them.
/// The implicit [`EVERYONE`] group is always present.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupStore {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl Default for GroupStore {
    fn default() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(EVERYONE.to_string(), BTreeSet::new());
        Self { groups }
    }
}

impl GroupStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add members to a group, creating it if needed. Redefining a group extends it.
    pub fn define<I, S>(&mut self, group: &str, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .entry(group.to_string())
            .or_default()
            .extend(members.into_iter().map(Into::into));
    }

    /// Record a person as part of [`EVERYONE`].
    pub fn enroll(&mut self, person: &str) {
        self.define(EVERYONE, [person]);
    }

    pub fn members(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(group)
    }

    pub fn everyone(&self) -> &BTreeSet<String> {
        // EVERYONE is inserted on construction and never removed
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.groups.get(EVERYONE).unwrap_or(&EMPTY)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.groups.iter()
    }

    pub fn is_resolved(&self) -> bool {
        self.groups
            .values()
            .all(|members| !members.iter().any(|m| is_group(m)))
    }

    /// Expand group references until every group only holds person names.
    ///
    /// Fails on references to undefined groups and on cycles. Resolving an
    /// already resolved store gives back an equal store.
    pub fn resolve(&self) -> Result<GroupStore> {
        let mut resolved = BTreeMap::new();
        for group in self.groups.keys() {
            let mut path = Vec::new();
            self.resolve_group(group, &mut resolved, &mut path)?;
        }
        debug!("resolved {} groups", resolved.len());
        Ok(GroupStore { groups: resolved })
    }

    fn resolve_group(
        &self,
        group: &str,
        resolved: &mut BTreeMap<String, BTreeSet<String>>,
        path: &mut Vec<String>,
    ) -> Result<BTreeSet<String>> {
        if let Some(members) = resolved.get(group) {
            return Ok(members.clone());
        }

        if let Some(start) = path.iter().position(|g| g == group) {
            let mut cycle = path[start..].to_vec();
            cycle.push(group.to_string());
            return Err(SplitError::CyclicGroupReference { cycle }.into());
        }

        let members = self
            .groups
            .get(group)
            .ok_or(SplitError::UndefinedGroup {
                group: group.to_string(),
            })?;

        path.push(group.to_string());
        let mut people = BTreeSet::new();
        for member in members {
            if is_group(member) {
                people.extend(self.resolve_group(member, resolved, path)?);
            } else {
                people.insert(member.clone());
            }
        }
        path.pop();

        resolved.insert(group.to_string(), people.clone());
        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use crate::group::GroupStore;
    use crate::participant::EVERYONE;
    use crate::SplitError;

    use anyhow::Result;

    use std::collections::BTreeSet;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_nested_groups() -> Result<()> {
        let mut store = GroupStore::new();
        store.define("@hunters", ["Gon", "Killua", "@elders"]);
        store.define("@elders", ["Ging", "@zoldycks"]);
        store.define("@zoldycks", ["Killua", "Silva"]);
        store.enroll("Leorio");

        let resolved = store.resolve()?;
        assert!(resolved.is_resolved());
        assert_eq!(
            resolved.members("@hunters"),
            Some(&set(&["Ging", "Gon", "Killua", "Silva"]))
        );
        assert_eq!(resolved.members("@elders"), Some(&set(&["Ging", "Killua", "Silva"])));
        assert_eq!(resolved.members(EVERYONE), Some(&set(&["Leorio"])));
        Ok(())
    }

    #[test]
    fn resolve_is_idempotent() -> Result<()> {
        let mut store = GroupStore::new();
        store.define("@a", ["A", "@b"]);
        store.define("@b", ["B"]);
        store.enroll("C");

        let once = store.resolve()?;
        let twice = once.resolve()?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn resolve_rejects_cycles() {
        let mut store = GroupStore::new();
        store.define("@a", ["A", "@b"]);
        store.define("@b", ["@c"]);
        store.define("@c", ["@a"]);

        let err = store.resolve().unwrap_err();
        assert_eq!(
            err.downcast_ref::<SplitError>(),
            Some(&SplitError::CyclicGroupReference {
                cycle: vec![
                    "@a".to_string(),
                    "@b".to_string(),
                    "@c".to_string(),
                    "@a".to_string()
                ]
            })
        );
    }

    #[test]
    fn resolve_rejects_self_reference() {
        let mut store = GroupStore::new();
        store.define("@a", ["@a"]);
        assert!(matches!(
            store.resolve().unwrap_err().downcast_ref::<SplitError>(),
            Some(SplitError::CyclicGroupReference { .. })
        ));
    }

    #[test]
    fn resolve_rejects_undefined_groups() {
        let mut store = GroupStore::new();
        store.define("@a", ["A", "@nobody"]);
        assert_eq!(
            store.resolve().unwrap_err().downcast_ref::<SplitError>(),
            Some(&SplitError::UndefinedGroup {
                group: "@nobody".to_string()
            })
        );
    }

    #[test]
    fn everyone_can_be_extended_explicitly() -> Result<()> {
        let mut store = GroupStore::new();
        store.define("@friends", ["Kurapika"]);
        store.define(EVERYONE, ["@friends"]);
        store.enroll("Gon");

        let resolved = store.resolve()?;
        assert_eq!(resolved.everyone(), &set(&["Gon", "Kurapika"]));
        Ok(())
    }
}
