//! Lifecycle callbacks run around model mutations.
//!
//! Six stages accept callbacks:
//!
//! - **beforeCreate** / **afterCreate**: around an insert
//! - **beforeUpdate** / **afterUpdate**: around an update
//! - **beforeDestroy** / **afterDestroy**: around a removal
//!
//! Callbacks for a stage run in registration order, one at a time, and the
//! first failure aborts the rest of the stage. Callbacks tagged
//! [`CallbackSignature::AcceptsCriteria`] additionally receive the mutation's
//! criteria in `beforeUpdate` and `beforeDestroy`.

pub mod callbacks;
pub mod criteria;
pub mod hook;
pub mod runner;

pub use callbacks::CallbackSet;
pub use criteria::Criteria;
pub use hook::{Callback, CallbackSignature, Invocation, LifecycleStage, Values};
pub use runner::CallbackRunner;
