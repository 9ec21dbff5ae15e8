//! Planner settings consumed while assembling rule sets.

use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;

use enumset::{EnumSet, EnumSetType};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{OptResult, RuleSetError};

/// Planner feature toggles, named by their option keys.
#[derive(EnumSetType, Debug, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum PlannerFeature {
    #[strum(serialize = "planner.enable_hashagg")]
    HashAgg,
    #[strum(serialize = "planner.enable_streamagg")]
    StreamAgg,
    #[strum(serialize = "planner.enable_hashjoin")]
    HashJoin,
    #[strum(serialize = "planner.enable_mergejoin")]
    MergeJoin,
    #[strum(serialize = "planner.enable_broadcast_join")]
    BroadcastJoin,
}

/// Function/operator registry owned by the execution layer.
pub trait FunctionRegistry: Debug + Send + Sync {
    fn is_deterministic(&self, function_name: &str) -> bool;
}

/// Read only view of planner settings for one rule set build.
pub trait PlannerSettings {
    fn features(&self) -> EnumSet<PlannerFeature>;

    fn function_registry(&self) -> Option<Arc<dyn FunctionRegistry>>;

    fn is_enabled(&self, feature: PlannerFeature) -> bool {
        self.features().contains(feature)
    }

    fn is_hash_agg_enabled(&self) -> bool {
        self.is_enabled(PlannerFeature::HashAgg)
    }

    fn is_stream_agg_enabled(&self) -> bool {
        self.is_enabled(PlannerFeature::StreamAgg)
    }

    fn is_hash_join_enabled(&self) -> bool {
        self.is_enabled(PlannerFeature::HashJoin)
    }

    fn is_merge_join_enabled(&self) -> bool {
        self.is_enabled(PlannerFeature::MergeJoin)
    }

    fn is_broadcast_join_enabled(&self) -> bool {
        self.is_enabled(PlannerFeature::BroadcastJoin)
    }
}

/// Per query optimizer context.
///
/// All features are enabled by default, and no function registry is attached.
#[derive(Clone, Debug)]
pub struct OptimizerContext {
    features: EnumSet<PlannerFeature>,
    function_registry: Option<Arc<dyn FunctionRegistry>>,
}

impl Default for OptimizerContext {
    fn default() -> Self {
        Self {
            features: EnumSet::all(),
            function_registry: None,
        }
    }
}

impl OptimizerContext {
    pub fn new(
        features: EnumSet<PlannerFeature>,
        function_registry: Option<Arc<dyn FunctionRegistry>>,
    ) -> Self {
        Self {
            features,
            function_registry,
        }
    }

    pub fn with_function_registry(
        mut self,
        function_registry: Arc<dyn FunctionRegistry>,
    ) -> Self {
        self.function_registry = Some(function_registry);
        self
    }

    pub fn with_feature(mut self, feature: PlannerFeature, enabled: bool) -> Self {
        self.set_feature(feature, enabled);
        self
    }

    pub fn set_feature(&mut self, feature: PlannerFeature, enabled: bool) {
        if enabled {
            self.features.insert(feature);
        } else {
            self.features.remove(feature);
        }
    }

    /// Applies one planner option, e.g. `planner.enable_hashjoin = false`.
    pub fn set_option(&mut self, key: &str, enabled: bool) -> OptResult<()> {
        let feature = PlannerFeature::from_str(key)
            .map_err(|_| RuleSetError::UnknownOption(key.to_string()))?;
        self.set_feature(feature, enabled);
        Ok(())
    }
}

impl PlannerSettings for OptimizerContext {
    fn features(&self) -> EnumSet<PlannerFeature> {
        self.features
    }

    fn function_registry(&self) -> Option<Arc<dyn FunctionRegistry>> {
        self.function_registry.clone()
    }
}
