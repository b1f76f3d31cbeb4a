//! Jittered click dispatch

use super::pointer::Pointer;
use crate::error::{AutomationError, AutomationResult};
use crate::template_matching::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClickConfig {
    /// Max per-axis random offset in pixels
    pub jitter: i32,
    /// Shortest pointer travel time
    pub min_move: Duration,
    /// Longest pointer travel time
    pub max_move: Duration,
    /// Abort when the pointer is parked in a screen corner
    pub fail_safe: bool,
    /// Distance from a corner that still counts as "in the corner"
    pub fail_safe_margin: i32,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            jitter: 5,
            min_move: Duration::from_millis(100),
            max_move: Duration::from_millis(300),
            fail_safe: true,
            fail_safe_margin: 0,
        }
    }
}

/// Moves the pointer near a target and clicks
pub struct ClickDispatcher<P: Pointer> {
    pointer: P,
    config: ClickConfig,
    rng: StdRng,
}

impl<P: Pointer> ClickDispatcher<P> {
    pub fn new(pointer: P, config: ClickConfig) -> Self {
        Self::with_rng(pointer, config, StdRng::from_os_rng())
    }

    /// Dispatcher with a caller-provided random source
    pub fn with_rng(pointer: P, config: ClickConfig, rng: StdRng) -> Self {
        Self {
            pointer,
            config,
            rng,
        }
    }

    pub fn pointer(&self) -> &P {
        &self.pointer
    }

    /// Click near `target` with random jitter and a random travel time
    ///
    /// # Returns
    /// The point actually clicked, within `jitter` pixels of `target` on each axis.
    pub fn random_click(&mut self, target: Point) -> AutomationResult<Point> {
        let jitter = self.config.jitter.abs();
        let final_point = target.offset(
            self.rng.random_range(-jitter..=jitter),
            self.rng.random_range(-jitter..=jitter),
        );

        let (shortest, longest) = if self.config.min_move <= self.config.max_move {
            (self.config.min_move, self.config.max_move)
        } else {
            (self.config.max_move, self.config.min_move)
        };
        let travel = self.rng.random_range(shortest..=longest);

        self.check_fail_safe()?;
        self.pointer.move_to(final_point, travel)?;
        self.check_fail_safe()?;
        self.pointer.click()?;

        println!("🖱️ Clicked at {}", final_point);
        Ok(final_point)
    }

    /// Fail with `FailSafeTriggered` when the pointer sits in a screen corner
    pub fn check_fail_safe(&self) -> AutomationResult<()> {
        if !self.config.fail_safe {
            return Ok(());
        }

        let at = self.pointer.location()?;
        let (width, height) = self.pointer.screen_size()?;
        let margin = self.config.fail_safe_margin.max(0);
        let near_x = at.x <= margin || at.x >= width - 1 - margin;
        let near_y = at.y <= margin || at.y >= height - 1 - margin;

        if near_x && near_y {
            log::warn!("Pointer parked in a screen corner at {}, aborting", at);
            return Err(AutomationError::FailSafeTriggered { x: at.x, y: at.y });
        }
        Ok(())
    }
}
