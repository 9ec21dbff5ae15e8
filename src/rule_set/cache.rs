use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::RwLock;

use crate::error::OptResult;
use crate::rule_set::RuleSet;

lazy_static! {
    static ref GLOBAL_RULE_SET_CACHE: Arc<RuleSetCache> = Arc::new(RuleSetCache::new());
}

/// Memoizes rule sets by name.
///
/// A rule set is built at most once per name, no matter what settings later callers plan with.
/// Concurrent first callers are serialized, so they all get the same instance back.
#[derive(Debug, Default)]
pub struct RuleSetCache {
    rule_sets: RwLock<HashMap<String, RuleSet>>,
}

impl RuleSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process wide cache.
    pub fn global() -> Arc<RuleSetCache> {
        GLOBAL_RULE_SET_CACHE.clone()
    }

    /// Returns the rule set cached under `name`, calling `build` if there is none.
    ///
    /// Nothing is cached when `build` fails. `build` runs under the cache's write lock and must
    /// not call back into the same cache.
    pub fn get_or_build<F>(&self, name: &str, build: F) -> OptResult<RuleSet>
    where
        F: FnOnce() -> OptResult<RuleSet>,
    {
        if let Some(rule_set) = self.get(name) {
            trace!("Using cached {} rule set", name);
            return Ok(rule_set);
        }

        let mut rule_sets = self.rule_sets.write();
        // Another caller may have built it while we were waiting for the lock.
        if let Some(rule_set) = rule_sets.get(name) {
            return Ok(rule_set.clone());
        }

        let rule_set = build()?;
        debug!("Built {} rule set with {} rules", name, rule_set.len());
        rule_sets.insert(name.to_string(), rule_set.clone());
        Ok(rule_set)
    }

    pub fn get(&self, name: &str) -> Option<RuleSet> {
        self.rule_sets.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.rule_sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_sets.read().is_empty()
    }

    /// Drops every cached rule set, the next request rebuilds it.
    pub fn clear(&self) {
        self.rule_sets.write().clear();
    }
}
