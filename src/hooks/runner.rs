//! Serial execution of a model's lifecycle callbacks.

use crate::config::RunnerConfig;
use crate::error::{HookError, ValidationError};
use crate::hooks::criteria::Criteria;
use crate::hooks::hook::{Callback, CallbackSignature, Invocation, LifecycleStage, Values};
use crate::model::Model;

/// What a chain threads through its callbacks.
enum ChainInput<'a> {
    Values(&'a mut Values),
    Update {
        values: &'a mut Values,
        criteria: &'a Criteria,
    },
    Destroy(&'a Criteria),
}

/// Runs the callbacks registered on a model for one lifecycle stage.
///
/// - Callbacks run in registration order, one at a time.
/// - The first `Err` stops the chain; later callbacks never run and the
///   error is returned unchanged.
/// - `values` is handed to each callback by `&mut`, so edits made by one
///   callback are visible to the next and to the caller.
#[derive(Debug, Clone, Default)]
pub struct CallbackRunner {
    config: RunnerConfig,
}

impl CallbackRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Delegate to the model's validator. No callback chain is involved.
    pub async fn validate(
        &self,
        model: &Model,
        values: &Values,
        present_only: bool,
        criteria: Option<&Criteria>,
    ) -> Result<(), ValidationError> {
        model
            .validate(values, present_only, criteria.map(Criteria::raw))
            .await
    }

    /// Run `beforeCreate` callbacks as `(values, next)`.
    pub async fn before_create(&self, model: &Model, values: &mut Values) -> Result<(), HookError> {
        self.run_chain(model, LifecycleStage::BeforeCreate, ChainInput::Values(values))
            .await
    }

    /// Run `afterCreate` callbacks as `(values, next)`.
    pub async fn after_create(&self, model: &Model, values: &mut Values) -> Result<(), HookError> {
        self.run_chain(model, LifecycleStage::AfterCreate, ChainInput::Values(values))
            .await
    }

    /// Run `beforeUpdate` callbacks.
    ///
    /// `AcceptsCriteria` callbacks get `(values, where, next)` where `where`
    /// is the non-empty `where` clause of `criteria` or `None`. All other
    /// callbacks get `(values, next)`.
    pub async fn before_update(
        &self,
        model: &Model,
        values: &mut Values,
        criteria: &Criteria,
    ) -> Result<(), HookError> {
        self.run_chain(
            model,
            LifecycleStage::BeforeUpdate,
            ChainInput::Update { values, criteria },
        )
        .await
    }

    /// Run `afterUpdate` callbacks as `(values, next)`.
    pub async fn after_update(&self, model: &Model, values: &mut Values) -> Result<(), HookError> {
        self.run_chain(model, LifecycleStage::AfterUpdate, ChainInput::Values(values))
            .await
    }

    /// Run `beforeDestroy` callbacks.
    ///
    /// Callbacks get `(criteria, next)` with the criteria untouched, except
    /// `ContinuationOnly` callbacks, which get `(next)`.
    pub async fn before_destroy(&self, model: &Model, criteria: &Criteria) -> Result<(), HookError> {
        self.run_chain(model, LifecycleStage::BeforeDestroy, ChainInput::Destroy(criteria))
            .await
    }

    /// Run `afterDestroy` callbacks as `(values, next)`.
    pub async fn after_destroy(&self, model: &Model, values: &mut Values) -> Result<(), HookError> {
        self.run_chain(model, LifecycleStage::AfterDestroy, ChainInput::Values(values))
            .await
    }

    async fn run_chain(
        &self,
        model: &Model,
        stage: LifecycleStage,
        mut input: ChainInput<'_>,
    ) -> Result<(), HookError> {
        let callbacks = model.callbacks().get(stage);
        if callbacks.is_empty() {
            return Ok(());
        }

        tracing::trace!(
            model = model.name(),
            stage = %stage,
            count = callbacks.len(),
            "Running lifecycle callbacks"
        );

        for (index, callback) in callbacks.iter().enumerate() {
            let invocation = match &mut input {
                ChainInput::Values(values) => Invocation::Values(&mut **values),
                ChainInput::Update { values, criteria } => match callback.signature() {
                    CallbackSignature::AcceptsCriteria => Invocation::ValuesWithCriteria {
                        values: &mut **values,
                        criteria: criteria.where_clause(),
                    },
                    CallbackSignature::Legacy | CallbackSignature::ContinuationOnly => {
                        if criteria.where_clause().is_some() {
                            self.note_withheld_criteria(model, callback.as_ref());
                        }
                        Invocation::Values(&mut **values)
                    }
                },
                ChainInput::Destroy(criteria) => match callback.signature() {
                    CallbackSignature::Legacy | CallbackSignature::AcceptsCriteria => {
                        Invocation::Criteria(*criteria)
                    }
                    CallbackSignature::ContinuationOnly => Invocation::Bare,
                },
            };

            if let Err(err) = self.invoke(model, callback.as_ref(), invocation).await {
                tracing::debug!(
                    model = model.name(),
                    stage = %stage,
                    hook = callback.name(),
                    index,
                    "Callback failed, skipping remaining callbacks: {}",
                    err
                );
                return Err(err);
            }
        }

        Ok(())
    }

    async fn invoke(
        &self,
        model: &Model,
        callback: &dyn Callback,
        invocation: Invocation<'_>,
    ) -> Result<(), HookError> {
        let call = callback.call(model, invocation);
        match callback.timeout().or(self.config.hook_timeout) {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_elapsed) => Err(HookError::Timeout {
                    hook: callback.name().to_string(),
                    timeout: limit,
                }),
            },
            None => call.await,
        }
    }

    fn note_withheld_criteria(&self, model: &Model, callback: &dyn Callback) {
        if self.config.warn_on_dropped_criteria {
            tracing::warn!(
                model = model.name(),
                hook = callback.name(),
                "Legacy beforeUpdate callback called without criteria (criteria withheld)"
            );
        } else {
            tracing::debug!(
                model = model.name(),
                hook = callback.name(),
                "Legacy beforeUpdate callback called without criteria (criteria withheld)"
            );
        }
    }
}
