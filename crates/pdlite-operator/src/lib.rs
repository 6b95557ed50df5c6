//! pdlite-operator — operators and their admission.
//!
//! An [`Operator`] is a validated request to mutate one region (here: move
//! its leadership). Schedulers build operators through the factory
//! functions in [`builder`]; the [`OperatorController`] tracks the ones in
//! flight and answers the per-kind counts schedulers use for rate limiting.

pub mod builder;
pub mod controller;
pub mod error;
pub mod operator;

pub use builder::create_transfer_leader_operator;
pub use controller::OperatorController;
pub use error::{OperatorError, OperatorResult};
pub use operator::{Operator, OperatorKind, OperatorStep};
