pub mod args;
pub mod capture;
pub mod error;
pub mod input;
pub mod routine;
pub mod template_matching;

#[cfg(test)]
mod testing;

pub use error::{AutomationError, AutomationResult};
