//! Core types and pure logic for the Provost HOD lifecycle engine.
//!
//! This crate is deliberately free of HTTP dependencies. It defines the
//! canonical [`appointee::Appointee`] record, the lifecycle state machine,
//! the tenure calculator, and the reconciliation merge. Everything here is a
//! pure function of its inputs; clocks and networks belong to the caller.

pub mod appointee;
pub mod lifecycle;
pub mod reconcile;
pub mod tenure;
pub mod view;

pub use appointee::{Appointee, Identity, LifecycleStatus};
pub use lifecycle::{Action, InvalidTransition, TransitionPayload, transition};
