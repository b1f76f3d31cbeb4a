// Types shared by the locator and the routine runner
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STEP_WAIT: Duration = Duration::from_secs(2);

/// Blocking pause, swapped out in tests to record durations
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// One "find image, click, wait" step
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineStep {
    /// Template path, relative to the routine's picture directory
    pub template: PathBuf,
    /// Human readable name for progress output
    pub label: String,
    /// Base pause after a successful click
    pub wait: Duration,
}

impl RoutineStep {
    pub fn new(template: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            label: label.into(),
            wait: DEFAULT_STEP_WAIT,
        }
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }
}

/// What a routine run got through
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutineReport {
    /// Labels of the steps that clicked, in order
    pub completed: Vec<String>,
    /// Label of the step that stopped the run
    pub failed: Option<String>,
}

impl RoutineReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}
