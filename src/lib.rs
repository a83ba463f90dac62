//! Lifecycle callbacks for ORM model mutations.
//!
//! A [`hooks::CallbackRunner`] runs the callbacks a [`model::Model`]
//! registered for a lifecycle stage, strictly in order, stopping at the
//! first failure. [`plugin::LifecyclePlugin`] installs criteria-aware
//! `update` and `validate` entry points on every model of an
//! [`orm::Orm`] once it has loaded, so `beforeUpdate` callbacks can see
//! which records are being updated.

pub mod config;
pub mod error;
pub mod hooks;
pub mod model;
pub mod orm;
pub mod plugin;

pub use config::{Config, RunnerConfig};
pub use error::{Error, HookError, Result};
pub use hooks::{
    Callback, CallbackRunner, CallbackSignature, Criteria, Invocation, LifecycleStage, Values,
};
pub use model::{Model, Validator};
pub use orm::Orm;
pub use plugin::LifecyclePlugin;
