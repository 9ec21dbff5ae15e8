//! Identifiers of transformation rules.
//!
//! Rules themselves live in the planner framework, this crate only needs to tell them apart. A
//! rule is either a catalog constant ([`RuleId`]) or a rule whose instance is built at planning
//! time from planner settings (e.g. [`MergeProjectRule`]).

use derive_more::Display;
use enum_as_inner::EnumAsInner;
use enum_dispatch::enum_dispatch;

mod catalog;
pub use catalog::*;
mod merge_project;
pub use merge_project::*;

#[enum_dispatch]
pub trait Rule {
    /// Stable name of the rule, used in logs and explain output.
    fn name(&self) -> &'static str;

    fn kind(&self) -> RuleKind;
}

/// A rule handle with identity based equality.
#[enum_dispatch(Rule)]
#[derive(Clone, Debug, Display, Hash, Eq, PartialEq, EnumAsInner)]
pub enum RuleImpl {
    Catalog(RuleId),
    MergeProject(MergeProjectRule),
}

impl RuleImpl {
    /// Catalog id of this rule, if it is a catalog constant.
    pub fn rule_id(&self) -> Option<RuleId> {
        self.as_catalog().copied()
    }
}
