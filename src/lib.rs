//! ## Background
//!
//! A cost based optimizer explores alternative plans by applying transformation rules to a query
//! plan and keeps the cheapest one it finds. Which rules it may apply is decided before the search
//! starts: each planning phase is handed a rule set. Logical rules rewrite a plan into a logically
//! equivalent one, for example pushing a filter past a join or removing a trivial projection.
//! Physical rules pick concrete execution strategies, for example whether a join runs as a hash
//! join or a merge join, and whether the smaller input is broadcast to every node.
//!
//! Some engines apply rules in registration order when costs tie, so the order of a rule set is
//! part of its contract, not only its membership.
//!
//! ## Design
//!
//! ### Rules
//!
//! Rules are opaque to this crate. Most are catalog constants named by [`rules::RuleId`], a few are
//! built at planning time because they need something from the planner settings, for example the
//! function registry. Both are represented by [`rules::RuleImpl`], which compares by identity.
//!
//! ### Rule sets
//!
//! A [`rule_set::RuleSet`] is an immutable, ordered set of rules. The logical rule set doesn't
//! depend on planner features, so it's built once and memoized in a [`rule_set::RuleSetCache`].
//! The physical rule set is a function of the enabled planner features and is rebuilt for every
//! query: each optional rule family is guarded by the set of features it requires.
//!
//! Rule sets built independently can be merged with [`rule_set::merge_rule_sets`].

#[macro_use]
extern crate prettytable;
#[macro_use]
extern crate lazy_static;

pub mod error;
pub mod optimizer;
pub mod rule_set;
pub mod rules;
