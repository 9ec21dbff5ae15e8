use std::hash::{Hash, Hasher};
use std::sync::Arc;

use derive_more::Display;

use crate::optimizer::FunctionRegistry;
use crate::rules::{Rule, RuleKind};

/// Merges adjacent projections.
///
/// Built at planning time from the function registry in the planner settings.
#[derive(Clone, Debug, Display)]
#[display(fmt = "merge_project(force = {})", force)]
pub struct MergeProjectRule {
    force: bool,
    function_registry: Arc<dyn FunctionRegistry>,
}

impl MergeProjectRule {
    pub fn new(force: bool, function_registry: Arc<dyn FunctionRegistry>) -> Self {
        Self {
            force,
            function_registry,
        }
    }

    pub fn force(&self) -> bool {
        self.force
    }

    fn registry_addr(&self) -> *const () {
        Arc::as_ptr(&self.function_registry) as *const ()
    }
}

/// Two instances are the same rule when they share a registry.
impl PartialEq for MergeProjectRule {
    fn eq(&self, other: &Self) -> bool {
        self.force == other.force && self.registry_addr() == other.registry_addr()
    }
}

impl Eq for MergeProjectRule {}

impl Hash for MergeProjectRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.force.hash(state);
        self.registry_addr().hash(state);
    }
}

impl Rule for MergeProjectRule {
    fn name(&self) -> &'static str {
        "merge_project"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Logical
    }
}
