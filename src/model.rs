//! Model definitions: the context callbacks run on behalf of.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{HookError, ValidationError};
use crate::hooks::callbacks::CallbackSet;
use crate::hooks::hook::{Callback, LifecycleStage, Values};

/// A model's own validation routine.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validate `values`. With `present_only`, only attributes present in
    /// `values` are checked (partial updates). `criteria` is the raw
    /// criteria of the mutation, when the caller had any.
    async fn validate(
        &self,
        values: &Values,
        present_only: bool,
        criteria: Option<&Value>,
    ) -> Result<(), ValidationError>;
}

/// Validator that accepts everything.
#[derive(Debug, Default)]
pub struct AcceptAll;

#[async_trait]
impl Validator for AcceptAll {
    async fn validate(
        &self,
        _values: &Values,
        _present_only: bool,
        _criteria: Option<&Value>,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A model definition: its name, its callbacks and its validator.
///
/// Immutable once built.
pub struct Model {
    name: String,
    callbacks: CallbackSet,
    validator: Arc<dyn Validator>,
}

impl Model {
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            callbacks: CallbackSet::new(),
            validator: Arc::new(AcceptAll),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn callbacks(&self) -> &CallbackSet {
        &self.callbacks
    }

    /// Run the model's validator.
    pub async fn validate(
        &self,
        values: &Values,
        present_only: bool,
        criteria: Option<&Value>,
    ) -> Result<(), ValidationError> {
        self.validator.validate(values, present_only, criteria).await
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Model`].
pub struct ModelBuilder {
    name: String,
    callbacks: CallbackSet,
    validator: Arc<dyn Validator>,
}

impl ModelBuilder {
    /// Register `callback` at the end of `stage`'s list.
    pub fn on(mut self, stage: LifecycleStage, callback: Arc<dyn Callback>) -> Self {
        self.callbacks.push(stage, callback);
        self
    }

    /// Register `callback` under a stage key such as `"beforeCreate"`.
    pub fn on_named(self, stage: &str, callback: Arc<dyn Callback>) -> Result<Self, HookError> {
        let parsed = stage
            .parse::<LifecycleStage>()
            .map_err(|_| HookError::UnknownStage {
                stage: stage.to_string(),
            })?;
        Ok(self.on(parsed, callback))
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn build(self) -> Model {
        Model {
            name: self.name,
            callbacks: self.callbacks,
            validator: self.validator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::hook::Invocation;
    use serde_json::json;

    struct Noop;

    #[async_trait]
    impl Callback for Noop {
        fn name(&self) -> &str {
            "noop"
        }
        async fn call(&self, _model: &Model, _invocation: Invocation<'_>) -> Result<(), HookError> {
            Ok(())
        }
    }

    struct RequireName;

    #[async_trait]
    impl Validator for RequireName {
        async fn validate(
            &self,
            values: &Values,
            present_only: bool,
            _criteria: Option<&Value>,
        ) -> Result<(), ValidationError> {
            if !present_only && !values.contains_key("name") {
                return Err(ValidationError::MissingAttribute("name".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn on_named_accepts_registration_keys() {
        let model = Model::builder("user")
            .on_named("beforeCreate", Arc::new(Noop))
            .unwrap()
            .on_named("after_destroy", Arc::new(Noop))
            .unwrap()
            .build();

        assert_eq!(model.name(), "user");
        assert_eq!(model.callbacks().names(LifecycleStage::BeforeCreate), vec!["noop"]);
        assert_eq!(model.callbacks().names(LifecycleStage::AfterDestroy), vec!["noop"]);
    }

    #[test]
    fn on_named_rejects_unknown_stage() {
        let result = Model::builder("user").on_named("beforeValidate", Arc::new(Noop));
        assert!(matches!(
            result,
            Err(HookError::UnknownStage { stage }) if stage == "beforeValidate"
        ));
    }

    #[tokio::test]
    async fn validate_calls_the_configured_validator() {
        let model = Model::builder("user").validator(Arc::new(RequireName)).build();
        let values = json!({"email": "a@b.c"}).as_object().cloned().unwrap();

        assert!(matches!(
            model.validate(&values, false, None).await,
            Err(ValidationError::MissingAttribute(attr)) if attr == "name"
        ));
        assert!(model.validate(&values, true, None).await.is_ok());
    }

    #[tokio::test]
    async fn default_validator_accepts_everything() {
        let model = Model::builder("post").build();
        assert!(model.validate(&Values::new(), false, None).await.is_ok());
    }
}
