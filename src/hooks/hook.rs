//! Core callback types and traits.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::HookError;
use crate::hooks::criteria::Criteria;
use crate::model::Model;

/// A record's field-to-value mapping as it travels through a mutation.
pub type Values = serde_json::Map<String, serde_json::Value>;

/// Points in a model mutation where callbacks can be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleStage {
    /// Before a record is inserted.
    BeforeCreate,
    /// After a record was inserted.
    AfterCreate,
    /// Before matching records are updated.
    BeforeUpdate,
    /// After a record was updated, once per updated record.
    AfterUpdate,
    /// Before matching records are removed.
    BeforeDestroy,
    /// After records were removed.
    AfterDestroy,
}

impl LifecycleStage {
    pub const ALL: [LifecycleStage; 6] = [
        LifecycleStage::BeforeCreate,
        LifecycleStage::AfterCreate,
        LifecycleStage::BeforeUpdate,
        LifecycleStage::AfterUpdate,
        LifecycleStage::BeforeDestroy,
        LifecycleStage::AfterDestroy,
    ];

    /// The key models use to register callbacks for this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::BeforeCreate => "beforeCreate",
            LifecycleStage::AfterCreate => "afterCreate",
            LifecycleStage::BeforeUpdate => "beforeUpdate",
            LifecycleStage::AfterUpdate => "afterUpdate",
            LifecycleStage::BeforeDestroy => "beforeDestroy",
            LifecycleStage::AfterDestroy => "afterDestroy",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "").as_str() {
            "beforecreate" => Ok(LifecycleStage::BeforeCreate),
            "aftercreate" => Ok(LifecycleStage::AfterCreate),
            "beforeupdate" => Ok(LifecycleStage::BeforeUpdate),
            "afterupdate" => Ok(LifecycleStage::AfterUpdate),
            "beforedestroy" => Ok(LifecycleStage::BeforeDestroy),
            "afterdestroy" => Ok(LifecycleStage::AfterDestroy),
            _ => Err(format!("unknown lifecycle stage: {s:?}")),
        }
    }
}

/// Which calling convention a callback was written against.
///
/// Only `beforeUpdate` and `beforeDestroy` look at it:
///
/// | stage           | `Legacy`            | `AcceptsCriteria`                | `ContinuationOnly` |
/// |-----------------|---------------------|----------------------------------|--------------------|
/// | `beforeUpdate`  | `(values, next)`    | `(values, where-or-none, next)`  | `(values, next)`   |
/// | `beforeDestroy` | `(criteria, next)`  | `(criteria, next)`               | `(next)`           |
///
/// Every other stage always receives `(values, next)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallbackSignature {
    #[default]
    Legacy,
    AcceptsCriteria,
    /// Takes nothing but the continuation.
    ContinuationOnly,
}

/// The arguments handed to a single callback invocation.
#[derive(Debug)]
pub enum Invocation<'a> {
    /// `(values, next)`. Callbacks may edit `values` in place; later
    /// callbacks and the mutation itself see the edits.
    Values(&'a mut Values),
    /// `(values, criteria, next)`. `criteria` is the non-empty `where`
    /// clause of the mutation, or `None`.
    ValuesWithCriteria {
        values: &'a mut Values,
        criteria: Option<&'a serde_json::Value>,
    },
    /// `(criteria, next)` with the criteria exactly as the caller passed them.
    Criteria(&'a Criteria),
    /// `(next)`.
    Bare,
}

impl Invocation<'_> {
    /// Mutable access to the values, when this invocation carries them.
    pub fn values_mut(&mut self) -> Option<&mut Values> {
        match self {
            Invocation::Values(values) | Invocation::ValuesWithCriteria { values, .. } => {
                Some(&mut **values)
            }
            Invocation::Criteria(_) | Invocation::Bare => None,
        }
    }
}

/// A user-registered lifecycle callback.
///
/// Completing the returned future plays the role of the continuation:
/// `Ok(())` lets the chain advance, `Err` halts it and is surfaced to the
/// mutation caller unchanged.
#[async_trait]
pub trait Callback: Send + Sync {
    /// A name for log output.
    fn name(&self) -> &str;

    /// Calling convention this callback expects.
    ///
    /// Default: `Legacy`.
    fn signature(&self) -> CallbackSignature {
        CallbackSignature::Legacy
    }

    /// Maximum time this callback is allowed to run. `None` defers to the
    /// runner's configured limit.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Execute the callback on behalf of `model`.
    async fn call(&self, model: &Model, invocation: Invocation<'_>) -> Result<(), HookError>;
}
