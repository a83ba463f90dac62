//! Installs criteria-aware entry points on every model once the ORM loads.

use std::sync::Arc;

use crate::config::{Config, RunnerConfig};
use crate::hooks::CallbackRunner;
use crate::orm::{CriteriaAwareUpdate, CriteriaAwareValidate, Orm};

/// Replaces each model's `update` and `validate` with implementations that
/// pass the mutation's criteria through to callbacks and validators.
#[derive(Debug, Clone)]
pub struct LifecyclePlugin {
    runner: Arc<CallbackRunner>,
}

impl LifecyclePlugin {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            runner: Arc::new(CallbackRunner::new(config)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.runner.clone())
    }

    pub fn runner(&self) -> &Arc<CallbackRunner> {
        &self.runner
    }

    /// Wait for `orm` to finish loading, then patch every registered model.
    ///
    /// Returns the number of models patched. Models registered afterwards
    /// keep the stock methods.
    pub async fn initialize(&self, orm: &Orm) -> usize {
        orm.wait_loaded().await;

        let patched = orm
            .replace_methods(
                Arc::new(CriteriaAwareUpdate::new(Arc::clone(&self.runner))),
                Arc::new(CriteriaAwareValidate::new(Arc::clone(&self.runner))),
            )
            .await;

        tracing::info!(models = patched, "Installed criteria-aware update and validate");
        patched
    }
}

impl Default for LifecyclePlugin {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::PersistenceError;
    use crate::hooks::{Criteria, Values};
    use crate::model::Model;
    use crate::orm::Persistence;

    struct NullStore;

    #[async_trait]
    impl Persistence for NullStore {
        async fn update(
            &self,
            _criteria: &Criteria,
            _values: &Values,
        ) -> Result<Vec<Values>, PersistenceError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_initialize_waits_for_orm_then_patches_all_models() {
        let orm = Arc::new(Orm::new(Arc::new(CallbackRunner::default())));
        for name in ["post", "user"] {
            orm.register(Model::builder(name).build(), Arc::new(NullStore))
                .await
                .unwrap();
        }

        let plugin = LifecyclePlugin::default();
        let task = {
            let orm = Arc::clone(&orm);
            tokio::spawn(async move { plugin.initialize(&orm).await })
        };

        tokio::task::yield_now().await;
        assert!(!task.is_finished());
        assert_eq!(orm.installed_methods("user").await.unwrap().0, "stock:update");

        orm.mark_loaded();
        assert_eq!(task.await.unwrap(), 2);

        for name in ["post", "user"] {
            let (update, validate) = orm.installed_methods(name).await.unwrap();
            assert_eq!(update, "criteria_aware:update");
            assert_eq!(validate, "criteria_aware:validate");
        }
    }

    #[tokio::test]
    async fn test_models_registered_later_keep_stock_methods() {
        let orm = Orm::new(Arc::new(CallbackRunner::default()));
        orm.mark_loaded();
        assert_eq!(LifecyclePlugin::default().initialize(&orm).await, 0);

        orm.register(Model::builder("late").build(), Arc::new(NullStore))
            .await
            .unwrap();
        let (update, _) = orm.installed_methods("late").await.unwrap();
        assert_eq!(update, "stock:update");
    }
}
