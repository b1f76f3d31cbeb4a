//! Retrying template locator

use super::types::Sleeper;
use crate::capture::ScreenSource;
use crate::error::AutomationResult;
use crate::template_matching::{MatchConfig, MatchResult, Point, Template, TemplateMatcher};
use std::path::Path;

/// Polls a screen source until a template shows up or the retry budget is spent
pub struct Locator<S: ScreenSource, Z: Sleeper> {
    screen: S,
    sleeper: Z,
    matcher: TemplateMatcher,
    config: MatchConfig,
}

impl<S: ScreenSource, Z: Sleeper> Locator<S, Z> {
    pub fn new(screen: S, sleeper: Z, config: MatchConfig) -> Self {
        Self {
            screen,
            sleeper,
            matcher: TemplateMatcher::from_config(&config),
            config,
        }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn sleeper(&self) -> &Z {
        &self.sleeper
    }

    /// Load a template and locate it
    ///
    /// A missing or undecodable template is reported and treated as not found.
    /// Capture failures are returned as errors.
    pub fn find_image(&mut self, path: &Path) -> AutomationResult<Option<Point>> {
        let template = match Template::load(path) {
            Ok(template) => template,
            Err(e) => {
                println!("❌ {e}");
                return Ok(None);
            }
        };
        Ok(self.locate(&template)?.map(|found| found.position))
    }

    /// Capture and match up to `max_retries` times
    ///
    /// # Returns
    /// The template center in screen coordinates once a frame scores at or above
    /// the confidence threshold, `None` when every attempt fell short.
    pub fn locate(&mut self, template: &Template) -> AutomationResult<Option<MatchResult>> {
        let max_retries = self.config.max_retries;

        for attempt in 1..=max_retries {
            let frame = self.screen.capture()?;
            log::debug!(
                "Attempt {}/{}: captured {}x{} in {}ms",
                attempt,
                max_retries,
                frame.image.width(),
                frame.image.height(),
                frame.duration_ms
            );

            match self.matcher.best_match(&frame.image, template) {
                Some(found) => {
                    println!(
                        "🔍 Looking for {}, best score {:.2} (attempt {}/{})",
                        template.path.display(),
                        found.correlation,
                        attempt,
                        max_retries
                    );
                    if self.config.accepts(found.correlation) {
                        let result = MatchResult::from_match(
                            template,
                            &found,
                            frame.origin,
                            frame.scale_factor,
                        );
                        log::debug!(
                            "Matched '{}' at {} with score {:.4}",
                            template.name,
                            result.position,
                            result.score
                        );
                        return Ok(Some(result));
                    }
                }
                None => {
                    let (width, height) = frame.dimensions();
                    println!(
                        "⚠️ Template {} ({}x{}) does not fit the {}x{} search area (attempt {}/{})",
                        template.path.display(),
                        template.width(),
                        template.height(),
                        width,
                        height,
                        attempt,
                        max_retries
                    );
                }
            }

            self.sleeper.sleep(self.config.retry_delay);
        }

        println!("⏱️ Timed out: {} not found", template.path.display());
        Ok(None)
    }
}
