//! Application use cases. Each one owns the store handles it needs and
//! exposes a single `execute` entry point.

pub mod approval_rules;
pub mod chapters;
pub mod evaluate_approval;
pub mod evaluation_history;
pub mod lives;
pub mod practice;
pub mod progress;

#[cfg(test)]
pub(crate) mod memory;
