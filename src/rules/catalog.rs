use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::rules::Rule;

/// Which planning phase a rule belongs to.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Display)]
pub enum RuleKind {
    /// Rewrites among logically equivalent plans.
    Logical,
    /// Chooses a concrete execution strategy.
    Physical,
    /// Converts between traits, used by both phases.
    Conversion,
}

/// Rules provided by the planner framework, referenced by name only.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RuleId {
    // Where style joins.
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
    RemoveDistinctAggregate,

    // Projection push down.
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

    ConvertCountAggOnProjectOnScan,
    ConvertCountAggOnScan,
    PhysicalSortConvert,
    PhysicalSort,
    PhysicalProject,
    PhysicalScan,
    PhysicalScreen,
    PhysicalFilter,
    PhysicalLimit,
    PhysicalWriter,
    PhysicalWindow,
    PushLimitToTopN,
    PhysicalUnionAll,
    PhysicalHashAgg,
    PhysicalStreamAgg,
    PhysicalDistributedHashJoin,
    PhysicalBroadcastHashJoin,
    PhysicalDistributedMergeJoin,
    PhysicalBroadcastMergeJoin,
}

impl RuleId {
    pub fn kind(&self) -> RuleKind {
        use RuleId::*;
        match self {
            ExpandConversion => RuleKind::Conversion,
            ConvertCountAggOnProjectOnScan
            | ConvertCountAggOnScan
            | PhysicalSortConvert
            | PhysicalSort
            | PhysicalProject
            | PhysicalScan
            | PhysicalScreen
            | PhysicalFilter
            | PhysicalLimit
            | PhysicalWriter
            | PhysicalWindow
            | PushLimitToTopN
            | PhysicalUnionAll
            | PhysicalHashAgg
            | PhysicalStreamAgg
            | PhysicalDistributedHashJoin
            | PhysicalBroadcastHashJoin
            | PhysicalDistributedMergeJoin
            | PhysicalBroadcastMergeJoin => RuleKind::Physical,
            _ => RuleKind::Logical,
        }
    }
}

impl Rule for RuleId {
    fn name(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> RuleKind {
        RuleId::kind(self)
    }
}
