use std::sync::Arc;

use enumset::{enum_set, EnumSet};
use log::{debug, trace};

use crate::error::{OptResult, RuleSetError};
use crate::optimizer::{PlannerFeature, PlannerSettings};
use crate::rule_set::{RuleSet, RuleSetCache};
use crate::rules::RuleId::*;
use crate::rules::{MergeProjectRule, RuleId, RuleImpl};

/// Cache key of the logical rule set.
pub const BASIC_RULE_SET: &str = "basic";

/// Logical rules registered before the merge project rule.
const BASIC_RULES_HEAD: &[RuleId] = &[
    PushFilterPastProject,
    PushFilterOnJoin,
    PushFilterPastJoin,
    PushJoinThroughJoinRight,
    PushJoinThroughJoinLeft,
    MergeFilter,
    ExpandConversion,
    RemoveDistinct,
    RemoveTrivialProject,
    RemoveSort,
];

/// Logical rules registered after the merge project rule.
const BASIC_RULES_TAIL: &[RuleId] = &[
    RemoveDistinctAggregate,
    PushProjectPastFilter,
    PushProjectPastJoin,
    PushProjectIntoScan,
    PushPartitionFilterOnProject,
    PushPartitionFilterOnScan,
    LogicalScan,
    LogicalFilter,
    LogicalProject,
    LogicalWindow,
    LogicalAggregate,
    LogicalLimit,
    LogicalSort,
    LogicalJoin,
    LogicalUnion,
    ReduceAggregates,
];

const PHYSICAL_RULES: &[RuleId] = &[
    ConvertCountAggOnProjectOnScan,
    ConvertCountAggOnScan,
    PhysicalSortConvert,
    PhysicalSort,
    PhysicalProject,
    PhysicalScan,
    PhysicalScreen,
    ExpandConversion,
    PhysicalFilter,
    PhysicalLimit,
    PhysicalWriter,
    PhysicalWindow,
    PushLimitToTopN,
    PhysicalUnionAll,
];

/// Physical rules included only when every feature in `requires` is enabled.
pub struct GatedRules {
    pub requires: EnumSet<PlannerFeature>,
    pub rules: &'static [RuleId],
}

/// Evaluated in order, after the unconditional physical rules.
pub const GATED_PHYSICAL_RULES: &[GatedRules] = &[
    GatedRules {
        requires: enum_set!(PlannerFeature::HashAgg),
        rules: &[PhysicalHashAgg],
    },
    GatedRules {
        requires: enum_set!(PlannerFeature::StreamAgg),
        rules: &[PhysicalStreamAgg],
    },
    GatedRules {
        requires: enum_set!(PlannerFeature::HashJoin),
        rules: &[PhysicalDistributedHashJoin],
    },
    GatedRules {
        requires: enum_set!(PlannerFeature::HashJoin | PlannerFeature::BroadcastJoin),
        rules: &[PhysicalBroadcastHashJoin],
    },
    GatedRules {
        requires: enum_set!(PlannerFeature::MergeJoin),
        rules: &[PhysicalDistributedMergeJoin],
    },
    GatedRules {
        requires: enum_set!(PlannerFeature::MergeJoin | PlannerFeature::BroadcastJoin),
        rules: &[PhysicalBroadcastMergeJoin],
    },
];

lazy_static! {
    static ref PHYSICAL_DISK_RULES: RuleSet = RuleSet::new(vec![RuleImpl::from(PhysicalProject)]);
}

/// Unconditional physical rules in registration order.
pub fn base_physical_rule_ids() -> &'static [RuleId] {
    PHYSICAL_RULES
}

/// Assembles the rule sets used by each planning phase.
///
/// The logical rule set doesn't depend on planner features and is built once per cache, physical
/// rule sets are rebuilt for every call.
#[derive(Clone, Debug)]
pub struct RuleSetBuilder {
    cache: Arc<RuleSetCache>,
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::with_cache(RuleSetCache::global())
    }
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: Arc<RuleSetCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<RuleSetCache> {
        &self.cache
    }

    /// Logical rewrite rules.
    ///
    /// Only the settings of the first successful call are used, later calls get the cached rule
    /// set back even if their function registry differs.
    pub fn basic_rules<S>(&self, settings: &S) -> OptResult<RuleSet>
    where
        S: PlannerSettings + ?Sized,
    {
        self.cache.get_or_build(BASIC_RULE_SET, || build_basic_rules(settings))
    }

    /// Physical rules enabled by `settings`.
    pub fn physical_rules<S>(&self, settings: &S) -> RuleSet
    where
        S: PlannerSettings + ?Sized,
    {
        let features = settings.features();
        let gated = GATED_PHYSICAL_RULES.iter().filter(|gated| {
            let included = features.is_superset(gated.requires);
            trace!(
                "Physical rules {:?} included: {}, requires {:?}",
                gated.rules,
                included,
                gated.requires
            );
            included
        });

        let rule_set = PHYSICAL_RULES
            .iter()
            .chain(gated.flat_map(|gated| gated.rules.iter()))
            .copied()
            .map(RuleImpl::from)
            .collect::<RuleSet>();
        debug!(
            "Built physical rule set with {} rules for features {:?}",
            rule_set.len(),
            features
        );
        rule_set
    }

    /// Rules for planning a plan that only writes to disk.
    pub fn disk_physical_rules(&self) -> RuleSet {
        PHYSICAL_DISK_RULES.clone()
    }
}

fn build_basic_rules<S>(settings: &S) -> OptResult<RuleSet>
where
    S: PlannerSettings + ?Sized,
{
    let function_registry = settings
        .function_registry()
        .ok_or(RuleSetError::ConfigurationUnavailable {
            rule_set: BASIC_RULE_SET,
            accessor: "function registry",
        })?;
    let merge_project = MergeProjectRule::new(true, function_registry);

    let head = BASIC_RULES_HEAD.iter().copied().map(RuleImpl::from);
    let tail = BASIC_RULES_TAIL.iter().copied().map(RuleImpl::from);
    RuleSet::try_new_unique(
        head.chain(std::iter::once(RuleImpl::from(merge_project)))
            .chain(tail),
    )
}

/// Union of `rule_sets`, keeping the first occurrence of each rule.
pub fn merge_rule_sets<'a, I>(rule_sets: I) -> RuleSet
where
    I: IntoIterator<Item = &'a RuleSet>,
{
    rule_sets
        .into_iter()
        .flat_map(|rule_set| rule_set.iter().cloned())
        .collect()
}

/// Logical rules from the process wide cache.
pub fn basic_rules<S>(settings: &S) -> OptResult<RuleSet>
where
    S: PlannerSettings + ?Sized,
{
    RuleSetBuilder::new().basic_rules(settings)
}

pub fn physical_rules<S>(settings: &S) -> RuleSet
where
    S: PlannerSettings + ?Sized,
{
    RuleSetBuilder::new().physical_rules(settings)
}

pub fn disk_physical_rules() -> RuleSet {
    PHYSICAL_DISK_RULES.clone()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use enumset::EnumSet;
    use itertools::Itertools;
    use strum::IntoEnumIterator;

    use crate::error::RuleSetError;
    use crate::optimizer::{FunctionRegistry, OptimizerContext, PlannerFeature};
    use crate::rule_set::{
        base_physical_rule_ids, merge_rule_sets, RuleSet, RuleSetBuilder, RuleSetCache,
        BASIC_RULE_SET, GATED_PHYSICAL_RULES,
    };
    use crate::rules::RuleId::*;
    use crate::rules::{Rule, RuleId, RuleImpl, RuleKind};

    #[derive(Debug)]
    struct TestRegistry;

    impl FunctionRegistry for TestRegistry {
        fn is_deterministic(&self, function_name: &str) -> bool {
            function_name != "random"
        }
    }

    fn builder() -> RuleSetBuilder {
        RuleSetBuilder::with_cache(Arc::new(RuleSetCache::new()))
    }

    fn context(features: EnumSet<PlannerFeature>) -> OptimizerContext {
        OptimizerContext::new(features, Some(Arc::new(TestRegistry)))
    }

    fn ids(rule_set: &RuleSet) -> Vec<RuleId> {
        rule_set.rule_ids().collect()
    }

    #[test]
    fn test_basic_rules_order() {
        let rule_set = builder().basic_rules(&context(EnumSet::all())).unwrap();

        assert_eq!(27, rule_set.len());
        let names: Vec<&str> = rule_set.iter().map(|r| r.name()).collect();
        assert_eq!("push_filter_past_project", names[0]);
        assert_eq!("remove_sort", names[9]);
        assert_eq!("merge_project", names[10]);
        assert_eq!("remove_distinct_aggregate", names[11]);
        assert_eq!("reduce_aggregates", names[26]);

        let merge_project = rule_set.iter().nth(10).unwrap();
        assert!(merge_project.as_merge_project().unwrap().force());
    }

    #[test]
    fn test_basic_rules_are_not_physical() {
        let rule_set = builder().basic_rules(&context(EnumSet::all())).unwrap();
        assert!(rule_set.iter().all(|r| r.kind() != RuleKind::Physical));
    }

    #[test]
    fn test_basic_rules_without_registry() {
        let builder = builder();
        let err = builder.basic_rules(&OptimizerContext::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RuleSetError>(),
            Some(RuleSetError::ConfigurationUnavailable { rule_set, .. })
                if *rule_set == BASIC_RULE_SET
        ));
        assert!(builder.cache().get(BASIC_RULE_SET).is_none());
    }

    #[test]
    fn test_basic_rules_cached_regardless_of_settings() {
        let builder = builder();
        let first = builder.basic_rules(&context(EnumSet::all())).unwrap();
        let second = builder.basic_rules(&context(EnumSet::empty())).unwrap();
        // A settings object without a registry still gets the cached set.
        let third = builder.basic_rules(&OptimizerContext::default()).unwrap();

        assert!(first.ptr_eq(&second));
        assert!(first.ptr_eq(&third));
    }

    #[test]
    fn test_physical_rules_all_disabled() {
        let rule_set = builder().physical_rules(&context(EnumSet::empty()));
        assert_eq!(base_physical_rule_ids(), ids(&rule_set).as_slice());
    }

    #[test]
    fn test_physical_rules_all_enabled() {
        let rule_set = builder().physical_rules(&context(EnumSet::all()));
        let expected: Vec<RuleId> = base_physical_rule_ids()
            .iter()
            .copied()
            .chain(vec![
                PhysicalHashAgg,
                PhysicalStreamAgg,
                PhysicalDistributedHashJoin,
                PhysicalBroadcastHashJoin,
                PhysicalDistributedMergeJoin,
                PhysicalBroadcastMergeJoin,
            ])
            .collect();
        assert_eq!(expected, ids(&rule_set));
    }

    #[test]
    fn test_physical_rules_hash_join_with_broadcast() {
        let features = PlannerFeature::HashJoin | PlannerFeature::BroadcastJoin;
        let rule_set = builder().physical_rules(&context(features));

        assert!(rule_set.contains_id(PhysicalDistributedHashJoin));
        assert!(rule_set.contains_id(PhysicalBroadcastHashJoin));
        assert!(!rule_set.contains_id(PhysicalDistributedMergeJoin));
        assert!(!rule_set.contains_id(PhysicalBroadcastMergeJoin));
    }

    #[test]
    fn test_broadcast_alone_adds_nothing() {
        let builder = builder();
        let none = builder.physical_rules(&context(EnumSet::empty()));
        let broadcast =
            builder.physical_rules(&context(EnumSet::only(PlannerFeature::BroadcastJoin)));
        assert_eq!(ids(&none), ids(&broadcast));
    }

    #[test]
    fn test_physical_rules_follow_every_feature_combination() {
        let builder = builder();
        let all: Vec<PlannerFeature> = PlannerFeature::iter().collect();

        for size in 0..=all.len() {
            for combination in all.iter().copied().combinations(size) {
                let features: EnumSet<PlannerFeature> = combination.into_iter().collect();
                let rule_set = builder.physical_rules(&context(features));
                let has = |f| features.contains(f);

                assert_eq!(has(PlannerFeature::HashAgg), rule_set.contains_id(PhysicalHashAgg));
                assert_eq!(
                    has(PlannerFeature::StreamAgg),
                    rule_set.contains_id(PhysicalStreamAgg)
                );
                assert_eq!(
                    has(PlannerFeature::HashJoin),
                    rule_set.contains_id(PhysicalDistributedHashJoin)
                );
                assert_eq!(
                    has(PlannerFeature::HashJoin) && has(PlannerFeature::BroadcastJoin),
                    rule_set.contains_id(PhysicalBroadcastHashJoin)
                );
                assert_eq!(
                    has(PlannerFeature::MergeJoin),
                    rule_set.contains_id(PhysicalDistributedMergeJoin)
                );
                assert_eq!(
                    has(PlannerFeature::MergeJoin) && has(PlannerFeature::BroadcastJoin),
                    rule_set.contains_id(PhysicalBroadcastMergeJoin)
                );
                // The unconditional rules always come first.
                assert_eq!(
                    base_physical_rule_ids(),
                    &ids(&rule_set)[..base_physical_rule_ids().len()]
                );
            }
        }
    }

    #[test]
    fn test_physical_rules_are_rebuilt() {
        let builder = builder();
        let settings = context(EnumSet::all());
        let first = builder.physical_rules(&settings);
        let second = builder.physical_rules(&settings);

        assert!(!first.ptr_eq(&second));
        assert_eq!(ids(&first), ids(&second));
        assert!(builder.cache().is_empty());
    }

    #[test]
    fn test_catalog_tables_have_no_duplicates() {
        let gated: Vec<RuleId> = GATED_PHYSICAL_RULES
            .iter()
            .flat_map(|g| g.rules.iter().copied())
            .collect();
        let physical: Vec<RuleImpl> = base_physical_rule_ids()
            .iter()
            .chain(gated.iter())
            .copied()
            .map(RuleImpl::from)
            .collect();
        assert!(RuleSet::try_new_unique(physical).is_ok());

        let base: HashSet<RuleId> = base_physical_rule_ids().iter().copied().collect();
        assert!(gated.iter().all(|r| !base.contains(r)));
    }

    #[test]
    fn test_disk_physical_rules() {
        let builder = builder();
        let first = builder.disk_physical_rules();
        let second = super::disk_physical_rules();

        assert_eq!(vec![PhysicalProject], ids(&first));
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn test_merge_basic_and_physical() {
        let builder = builder();
        let settings = context(EnumSet::all());
        let basic = builder.basic_rules(&settings).unwrap();
        let physical = builder.physical_rules(&settings);

        // Expand conversion is part of both sets.
        let merged = merge_rule_sets(&[basic.clone(), physical.clone()]);
        assert_eq!(basic.len() + physical.len() - 1, merged.len());
        assert!(merged.iter().take(basic.len()).eq(basic.iter()));
    }

    #[test]
    fn test_merge_nothing() {
        let none: [RuleSet; 0] = [];
        assert!(merge_rule_sets(&none).is_empty());
    }
}
