// Pointer input module
// Simulated pointer moves and clicks with jitter, randomized movement time and
// a corner fail-safe.

pub mod click;
pub mod pointer;

pub use click::{ClickConfig, ClickDispatcher};
pub use pointer::{DryRunPointer, EnigoPointer, Pointer};
