//! Model registry with replaceable entry points and a load-order signal.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::error::{Error, OrmError};
use crate::hooks::{CallbackRunner, Criteria, Values};
use crate::model::Model;
use crate::orm::methods::{
    Persistence, StockUpdate, StockValidate, UpdateMethod, UpdateTarget, ValidateMethod,
};

/// A registered model together with its storage and current entry points.
struct ModelEntry {
    model: Arc<Model>,
    store: Arc<dyn Persistence>,
    update: Arc<dyn UpdateMethod>,
    validate: Arc<dyn ValidateMethod>,
}

/// The host ORM: named models, their entry points, and a "loaded" signal
/// other components can wait on before touching the models.
pub struct Orm {
    models: RwLock<HashMap<String, ModelEntry>>,
    loaded: watch::Sender<bool>,
    stock_update: Arc<dyn UpdateMethod>,
    stock_validate: Arc<dyn ValidateMethod>,
}

impl Orm {
    /// Create an empty ORM whose models start out with the stock entry
    /// points driven by `runner`.
    pub fn new(runner: Arc<CallbackRunner>) -> Self {
        let (loaded, _) = watch::channel(false);
        Self {
            models: RwLock::new(HashMap::new()),
            loaded,
            stock_update: Arc::new(StockUpdate::new(Arc::clone(&runner))),
            stock_validate: Arc::new(StockValidate::new(runner)),
        }
    }

    /// Register a model backed by `store`.
    pub async fn register(&self, model: Model, store: Arc<dyn Persistence>) -> Result<(), OrmError> {
        let mut models = self.models.write().await;
        let name = model.name().to_string();
        if models.contains_key(&name) {
            return Err(OrmError::DuplicateModel(name));
        }
        models.insert(
            name,
            ModelEntry {
                model: Arc::new(model),
                store,
                update: Arc::clone(&self.stock_update),
                validate: Arc::clone(&self.stock_validate),
            },
        );
        Ok(())
    }

    /// Signal that every model has been registered.
    pub fn mark_loaded(&self) {
        if !self.loaded.send_replace(true) {
            tracing::debug!("ORM loaded");
        }
    }

    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    /// Resolve once [`Orm::mark_loaded`] has been called.
    pub async fn wait_loaded(&self) {
        let mut rx = self.loaded.subscribe();
        // The sender lives as long as `self`, so this cannot observe a
        // closed channel.
        let _ = rx.wait_for(|loaded| *loaded).await;
    }

    /// Registered model names, sorted.
    pub async fn model_names(&self) -> Vec<String> {
        let models = self.models.read().await;
        let mut names: Vec<String> = models.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of the `update` and `validate` methods installed on `model`.
    pub async fn installed_methods(&self, model: &str) -> Result<(String, String), OrmError> {
        let models = self.models.read().await;
        let entry = models
            .get(model)
            .ok_or_else(|| OrmError::UnknownModel(model.to_string()))?;
        Ok((
            entry.update.name().to_string(),
            entry.validate.name().to_string(),
        ))
    }

    /// Install `update` and `validate` on every registered model. Returns
    /// the number of models patched.
    pub async fn replace_methods(
        &self,
        update: Arc<dyn UpdateMethod>,
        validate: Arc<dyn ValidateMethod>,
    ) -> usize {
        let mut models = self.models.write().await;
        for (name, entry) in models.iter_mut() {
            tracing::trace!(
                model = %name,
                update = update.name(),
                validate = validate.name(),
                "Replacing model methods"
            );
            entry.update = Arc::clone(&update);
            entry.validate = Arc::clone(&validate);
        }
        models.len()
    }

    /// Update records of `model` through its installed `update` method.
    pub async fn update(
        &self,
        model: &str,
        criteria: Criteria,
        values: Values,
    ) -> Result<Vec<Values>, Error> {
        // Clone what we need and drop the read guard before running
        // callbacks, which may take arbitrarily long.
        let (model, store, update, validate) = {
            let models = self.models.read().await;
            let entry = models
                .get(model)
                .ok_or_else(|| OrmError::UnknownModel(model.to_string()))?;
            (
                Arc::clone(&entry.model),
                Arc::clone(&entry.store),
                Arc::clone(&entry.update),
                Arc::clone(&entry.validate),
            )
        };

        let target = UpdateTarget {
            model: &model,
            store: store.as_ref(),
            validate: validate.as_ref(),
        };
        update.update(target, criteria, values).await
    }

    /// Validate `values` through `model`'s installed `validate` method.
    pub async fn validate(
        &self,
        model: &str,
        values: &Values,
        present_only: bool,
        criteria: Option<&Criteria>,
    ) -> Result<(), Error> {
        let (model, validate) = {
            let models = self.models.read().await;
            let entry = models
                .get(model)
                .ok_or_else(|| OrmError::UnknownModel(model.to_string()))?;
            (Arc::clone(&entry.model), Arc::clone(&entry.validate))
        };

        validate
            .validate(&model, values, present_only, criteria)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::PersistenceError;

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

    fn orm() -> Orm {
        Orm::new(Arc::new(CallbackRunner::default()))
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let orm = orm();
        orm.register(Model::builder("user").build(), Arc::new(NullStore))
            .await
            .unwrap();
        let err = orm
            .register(Model::builder("user").build(), Arc::new(NullStore))
            .await
            .unwrap_err();
        assert!(matches!(err, OrmError::DuplicateModel(name) if name == "user"));
    }

    #[tokio::test]
    async fn test_model_names_are_sorted() {
        let orm = orm();
        for name in ["user", "comment", "post"] {
            orm.register(Model::builder(name).build(), Arc::new(NullStore))
                .await
                .unwrap();
        }
        assert_eq!(orm.model_names().await, vec!["comment", "post", "user"]);
    }

    #[tokio::test]
    async fn test_new_models_get_stock_methods() {
        let orm = orm();
        orm.register(Model::builder("user").build(), Arc::new(NullStore))
            .await
            .unwrap();
        let (update, validate) = orm.installed_methods("user").await.unwrap();
        assert_eq!(update, "stock:update");
        assert_eq!(validate, "stock:validate");
    }

    #[tokio::test]
    async fn test_unknown_model_is_an_error() {
        let orm = orm();
        let err = orm
            .update("ghost", Criteria::none(), Values::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Orm(OrmError::UnknownModel(_))));

        let err = orm
            .validate("ghost", &Values::new(), false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Orm(OrmError::UnknownModel(_))));
    }

    #[tokio::test]
    async fn test_wait_loaded_resolves_after_signal() {
        let orm = Arc::new(orm());
        assert!(!orm.is_loaded());

        let waiter = {
            let orm = Arc::clone(&orm);
            tokio::spawn(async move { orm.wait_loaded().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        orm.mark_loaded();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait_loaded should resolve")
            .unwrap();
        assert!(orm.is_loaded());

        // Already loaded: resolves immediately
        orm.wait_loaded().await;
    }
}
