//! Replaceable `update` and `validate` entry points of a model.
//!
//! The ORM ships [`StockUpdate`] and [`StockValidate`], which run the
//! lifecycle callbacks but never show the mutation's criteria to them.
//! [`CriteriaAwareUpdate`] and [`CriteriaAwareValidate`] are drop-in
//! replacements that forward the caller's criteria.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, PersistenceError, ValidationError};
use crate::hooks::{CallbackRunner, Criteria, Values};
use crate::model::Model;

/// The storage operation behind a model.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Apply `values` to every record matching `criteria` and return the
    /// updated records.
    async fn update(
        &self,
        criteria: &Criteria,
        values: &Values,
    ) -> Result<Vec<Values>, PersistenceError>;
}

/// Everything an `update` call operates on.
#[derive(Clone, Copy)]
pub struct UpdateTarget<'a> {
    pub model: &'a Model,
    pub store: &'a dyn Persistence,
    /// The model's currently installed `validate` method.
    pub validate: &'a dyn ValidateMethod,
}

/// A model's `update` method.
#[async_trait]
pub trait UpdateMethod: Send + Sync {
    fn name(&self) -> &str;

    async fn update(
        &self,
        target: UpdateTarget<'_>,
        criteria: Criteria,
        values: Values,
    ) -> Result<Vec<Values>, Error>;
}

/// A model's `validate` method.
#[async_trait]
pub trait ValidateMethod: Send + Sync {
    fn name(&self) -> &str;

    async fn validate(
        &self,
        model: &Model,
        values: &Values,
        present_only: bool,
        criteria: Option<&Criteria>,
    ) -> Result<(), ValidationError>;
}

/// validate → beforeUpdate → persist → afterUpdate (per record).
///
/// `visible` is what callbacks and the validator get to see; the store
/// always receives the real criteria.
async fn run_update(
    runner: &CallbackRunner,
    target: UpdateTarget<'_>,
    criteria: &Criteria,
    visible: Option<&Criteria>,
    mut values: Values,
) -> Result<Vec<Values>, Error> {
    let model = target.model;

    target
        .validate
        .validate(model, &values, true, visible)
        .await?;

    let none = Criteria::none();
    runner
        .before_update(model, &mut values, visible.unwrap_or(&none))
        .await?;

    let mut records = target.store.update(criteria, &values).await?;
    tracing::debug!(
        model = model.name(),
        updated = records.len(),
        "Persisted update"
    );

    // Persistence already happened: report the first failure without
    // rolling anything back.
    for record in &mut records {
        runner.after_update(model, record).await?;
    }

    Ok(records)
}

/// The ORM's built-in `update`.
#[derive(Debug, Clone)]
pub struct StockUpdate {
    runner: Arc<CallbackRunner>,
}

impl StockUpdate {
    pub fn new(runner: Arc<CallbackRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl UpdateMethod for StockUpdate {
    fn name(&self) -> &str {
        "stock:update"
    }

    async fn update(
        &self,
        target: UpdateTarget<'_>,
        criteria: Criteria,
        values: Values,
    ) -> Result<Vec<Values>, Error> {
        run_update(&self.runner, target, &criteria, None, values).await
    }
}

/// The ORM's built-in `validate`: the validator never sees criteria.
#[derive(Debug, Clone)]
pub struct StockValidate {
    runner: Arc<CallbackRunner>,
}

impl StockValidate {
    pub fn new(runner: Arc<CallbackRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl ValidateMethod for StockValidate {
    fn name(&self) -> &str {
        "stock:validate"
    }

    async fn validate(
        &self,
        model: &Model,
        values: &Values,
        present_only: bool,
        _criteria: Option<&Criteria>,
    ) -> Result<(), ValidationError> {
        self.runner.validate(model, values, present_only, None).await
    }
}

/// `update` that hands the caller's criteria to `beforeUpdate` callbacks
/// and to `validate`.
#[derive(Debug, Clone)]
pub struct CriteriaAwareUpdate {
    runner: Arc<CallbackRunner>,
}

impl CriteriaAwareUpdate {
    pub fn new(runner: Arc<CallbackRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl UpdateMethod for CriteriaAwareUpdate {
    fn name(&self) -> &str {
        "criteria_aware:update"
    }

    async fn update(
        &self,
        target: UpdateTarget<'_>,
        criteria: Criteria,
        values: Values,
    ) -> Result<Vec<Values>, Error> {
        run_update(&self.runner, target, &criteria, Some(&criteria), values).await
    }
}

/// `validate` that forwards criteria to the model's validator.
#[derive(Debug, Clone)]
pub struct CriteriaAwareValidate {
    runner: Arc<CallbackRunner>,
}

impl CriteriaAwareValidate {
    pub fn new(runner: Arc<CallbackRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl ValidateMethod for CriteriaAwareValidate {
    fn name(&self) -> &str {
        "criteria_aware:validate"
    }

    async fn validate(
        &self,
        model: &Model,
        values: &Values,
        present_only: bool,
        criteria: Option<&Criteria>,
    ) -> Result<(), ValidationError> {
        self.runner
            .validate(model, values, present_only, criteria)
            .await
    }
}
