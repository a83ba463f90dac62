//! The host ORM as seen by the lifecycle plugin.
//!
//! Models are registered with stock `update` and `validate` entry points.
//! Once the ORM signals it is loaded, [`crate::plugin::LifecyclePlugin`]
//! swaps those for criteria-aware replacements.

pub mod methods;
pub mod registry;

pub use methods::{
    CriteriaAwareUpdate, CriteriaAwareValidate, Persistence, StockUpdate, StockValidate,
    UpdateMethod, UpdateTarget, ValidateMethod,
};
pub use registry::Orm;
