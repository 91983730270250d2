//! Session management module.
//!
//! This module provides the binding state machine and the session runner
//! that installs a store, runs a computation and captures the result.

mod runner;
mod state;

pub use state::BindingState;
