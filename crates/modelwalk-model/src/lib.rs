//! Model adapter contract for modelwalk.
//!
//! A system under test is described as a finite state machine: an
//! observation function ([`FsmModel::state`]), a reset, and a set of
//! named, optionally guarded actions. This crate defines that contract
//! and the thin wrapper ([`Model`]) the exploration engine drives.
//!
//! # Layout
//!
//! ```text
//!   FsmModel (user code)          Model<M> (engine side)
//!   ────────────────────          ──────────────────────
//!   reset(testing)        ──→     reset()   checks initial state stability
//!   state()               ──→     state()   rejects missing observations
//!   actions()             ──→     ActionCatalog, indexed alphabetically
//! ```
//!
//! Action indices are assigned once, by sorting action names, and stay
//! stable for the lifetime of a [`Model`]. Everything downstream (graph
//! edges, coverage, recordings) refers to actions by that index.

pub mod action;
pub mod model;
pub mod transition;

pub use action::{ActionCatalog, ActionDef, ActionError};
pub use model::{FsmModel, Model, ModelError, ResetReason, StepError};
pub use transition::{Sequence, Transition};
