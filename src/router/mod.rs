//! The pipeline engine: chain builders, execution, and the invocable unit.
//!
//! Module layout:
//! - [`core`]: typed chain handles (`ActionRouter`, `ValidatedActionRouter`)
//! - [`stack`]: the execution algorithm threading context and schema placement
//! - [`wrapper`]: failure classification around stages and handlers
//! - [`action`]: the frozen, invocable `Action` and its terminal boundary
//! - [`types`]: erased plumbing shared by the above

mod action;
mod core;
mod stack;
mod types;
mod wrapper;

pub use self::action::Action;
pub use self::core::{ActionRouter, RunOptions, ValidatedActionRouter};

#[cfg(test)]
mod tests;
