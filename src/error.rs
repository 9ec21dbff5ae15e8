use thiserror::Error;

use crate::rules::RuleImpl;

pub type OptResult<T> = anyhow::Result<T>;

/// Errors raised while assembling rule sets.
#[derive(Error, Debug)]
pub enum RuleSetError {
    /// A configuration accessor required by a rule constructor returned nothing.
    #[error("failed to build {rule_set} rule set: {accessor} is not available in planner settings")]
    ConfigurationUnavailable {
        rule_set: &'static str,
        accessor: &'static str,
    },
    #[error("rule {rule} appears more than once in rule set")]
    DuplicateRule { rule: String },
    #[error("unknown planner option: {0}")]
    UnknownOption(String),
}

impl RuleSetError {
    pub(crate) fn duplicate(rule: &RuleImpl) -> Self {
        Self::DuplicateRule {
            rule: format!("{}", rule),
        }
    }
}
