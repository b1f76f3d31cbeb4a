//! Sequential step runner

use super::locator::Locator;
use super::types::{RoutineReport, RoutineStep, Sleeper};
use crate::capture::ScreenSource;
use crate::error::AutomationResult;
use crate::input::{ClickDispatcher, Pointer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RoutineConfig {
    /// Base directory step template paths are resolved against
    pub pic_dir: PathBuf,
    /// Upper bound of the random pause added to each step's wait
    pub extra_wait: Duration,
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            pic_dir: PathBuf::from("."),
            extra_wait: Duration::from_secs(1),
        }
    }
}

/// Runs "find image, click, wait" steps in order
pub struct Routine<S: ScreenSource, P: Pointer, Z: Sleeper> {
    locator: Locator<S, Z>,
    clicker: ClickDispatcher<P>,
    config: RoutineConfig,
    rng: StdRng,
}

impl<S: ScreenSource, P: Pointer, Z: Sleeper> Routine<S, P, Z> {
    pub fn new(locator: Locator<S, Z>, clicker: ClickDispatcher<P>, config: RoutineConfig) -> Self {
        Self::with_rng(locator, clicker, config, StdRng::from_os_rng())
    }

    pub fn with_rng(
        locator: Locator<S, Z>,
        clicker: ClickDispatcher<P>,
        config: RoutineConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            locator,
            clicker,
            config,
            rng,
        }
    }

    pub fn locator(&self) -> &Locator<S, Z> {
        &self.locator
    }

    pub fn clicker(&self) -> &ClickDispatcher<P> {
        &self.clicker
    }

    /// Find the step's template, click it and wait
    ///
    /// Returns `Ok(false)` when the template is missing, unreadable, not on
    /// screen, or the screen could not be captured. Fail-safe and pointer
    /// errors are returned as `Err` so the caller stops the whole routine.
    pub fn run_step(&mut self, step: &RoutineStep) -> AutomationResult<bool> {
        println!("--- Step: {} ---", step.label);
        let path = self.config.pic_dir.join(&step.template);

        let found = match self.locator.find_image(&path) {
            Ok(found) => found,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                println!("❌ Locating {} failed: {}", path.display(), e);
                None
            }
        };

        let Some(target) = found else {
            println!("❌ Step failed: {} not found", step.label);
            return Ok(false);
        };

        self.clicker.random_click(target)?;

        let extra = if self.config.extra_wait.is_zero() {
            Duration::ZERO
        } else {
            self.rng.random_range(Duration::ZERO..self.config.extra_wait)
        };
        let pause = step.wait + extra;
        println!("⏳ Waiting {:.2}s...", pause.as_secs_f64());
        self.locator.sleeper().sleep(pause);
        Ok(true)
    }

    /// Run steps in order, stopping at the first one that fails
    pub fn run(&mut self, steps: &[RoutineStep]) -> AutomationResult<RoutineReport> {
        let mut report = RoutineReport::default();
        for step in steps {
            if self.run_step(step)? {
                report.completed.push(step.label.clone());
            } else {
                report.failed = Some(step.label.clone());
                break;
            }
        }
        Ok(report)
    }
}
