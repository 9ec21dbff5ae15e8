//! Immutable collections of rules handed to the planner for one planning phase.

use std::fmt::{Display, Formatter};
use std::iter::FromIterator;
use std::slice::Iter;
use std::sync::Arc;

use anyhow::bail;
use itertools::Itertools;
use prettytable::Table;

use crate::error::{OptResult, RuleSetError};
use crate::rules::{Rule, RuleId, RuleImpl};

mod builder;
pub use builder::*;
mod cache;
pub use cache::*;

/// An ordered set of rules.
///
/// Iteration follows construction order, which is also the order the planner registers rules in.
/// Cloning is cheap and clones share the same rules.
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Arc<[RuleImpl]>,
}

impl RuleSet {
    /// Creates a rule set, dropping repeated rules but the first occurrence.
    pub fn new<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = RuleImpl>,
    {
        let rules: Vec<RuleImpl> = rules.into_iter().unique().collect();
        Self {
            rules: rules.into(),
        }
    }

    /// Creates a rule set, failing on the first repeated rule.
    pub fn try_new_unique<I>(rules: I) -> OptResult<Self>
    where
        I: IntoIterator<Item = RuleImpl>,
    {
        let rules: Vec<RuleImpl> = rules.into_iter().collect();
        if let Some(rule) = rules.iter().duplicates().next() {
            bail!(RuleSetError::duplicate(rule));
        }

        Ok(Self {
            rules: rules.into(),
        })
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn iter(&self) -> Iter<'_, RuleImpl> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, rule: &RuleImpl) -> bool {
        self.rules.contains(rule)
    }

    pub fn contains_id(&self, rule_id: RuleId) -> bool {
        self.rule_ids().any(|id| id == rule_id)
    }

    /// Catalog ids in order, rules built at planning time are skipped.
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rules.iter().filter_map(RuleImpl::rule_id)
    }

    /// Whether both handles point to the same instance.
    pub fn ptr_eq(&self, other: &RuleSet) -> bool {
        Arc::ptr_eq(&self.rules, &other.rules)
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(row!["#", "Rule", "Kind"]);
        for (idx, rule) in self.rules.iter().enumerate() {
            table.add_row(row![idx, rule, rule.kind()]);
        }
        table
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleImpl;
    type IntoIter = Iter<'a, RuleImpl>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<RuleImpl> for RuleSet {
    fn from_iter<T: IntoIterator<Item = RuleImpl>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl Display for RuleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_table())
    }
}
