//! Routine module: locate a template on screen, click it, wait, repeat
//!
//! The locator polls fresh frames until a template clears the confidence
//! threshold or the retry budget runs out. The runner walks an ordered list
//! of steps and stops at the first one that fails.

pub mod locator;
pub mod runner;
pub mod steps;
pub mod types;

#[cfg(test)]
mod tests;

pub use locator::Locator;
pub use runner::{Routine, RoutineConfig};
pub use steps::default_steps;
pub use types::{RoutineReport, RoutineStep, Sleeper, ThreadSleeper};
