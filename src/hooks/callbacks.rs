//! Per-stage callback lists owned by a model.

use std::collections::HashMap;
use std::sync::Arc;

use crate::hooks::hook::{Callback, LifecycleStage};

/// Ordered callback lists keyed by lifecycle stage.
///
/// Callbacks keep their registration order. A set is filled while a model
/// is being defined and only read afterwards.
#[derive(Default, Clone)]
pub struct CallbackSet {
    stages: HashMap<LifecycleStage, Vec<Arc<dyn Callback>>>,
}

impl CallbackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to the end of `stage`'s list.
    pub fn push(&mut self, stage: LifecycleStage, callback: Arc<dyn Callback>) {
        self.stages.entry(stage).or_default().push(callback);
    }

    /// Callbacks for `stage` in registration order.
    pub fn get(&self, stage: LifecycleStage) -> &[Arc<dyn Callback>] {
        self.stages.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Callback names for `stage` in registration order.
    pub fn names(&self, stage: LifecycleStage) -> Vec<String> {
        self.get(stage)
            .iter()
            .map(|cb| cb.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for stage in LifecycleStage::ALL {
            let names = self.names(stage);
            if !names.is_empty() {
                map.entry(&stage.as_str(), &names);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use crate::hooks::hook::Invocation;
    use crate::model::Model;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl Callback for Named {
        fn name(&self) -> &str {
            self.0
        }
        async fn call(&self, _model: &Model, _invocation: Invocation<'_>) -> Result<(), HookError> {
            Ok(())
        }
    }

    #[test]
    fn keeps_registration_order_per_stage() {
        let mut set = CallbackSet::new();
        set.push(LifecycleStage::BeforeCreate, Arc::new(Named("b")));
        set.push(LifecycleStage::AfterCreate, Arc::new(Named("other")));
        set.push(LifecycleStage::BeforeCreate, Arc::new(Named("a")));

        assert_eq!(set.names(LifecycleStage::BeforeCreate), vec!["b", "a"]);
        assert_eq!(set.names(LifecycleStage::AfterCreate), vec!["other"]);
        assert!(set.get(LifecycleStage::BeforeDestroy).is_empty());
        assert_eq!(set.len(), 3);
    }
}
