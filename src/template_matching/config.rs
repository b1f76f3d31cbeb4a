//! Configuration for template locating

use std::time::Duration;

/// Scoring method used when sliding a template over a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMethod {
    /// Correlation coefficient over the RGB channels, range [-1, 1]
    #[default]
    ZeroMeanNormalized,
    /// imageproc normalized cross-correlation on luma, range [0, 1]
    CrossCorrelationNormalized,
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Minimum accepted score (inclusive)
    pub confidence_threshold: f32,
    /// Scoring method
    pub method: MatchMethod,
    /// Number of capture + match attempts before giving up
    pub max_retries: u32,
    /// Pause after each failed attempt
    pub retry_delay: Duration,
    /// Downscale factor of the coarse search pass (1 disables it)
    pub coarse_factor: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            method: MatchMethod::default(),
            max_retries: 10,
            retry_delay: Duration::from_millis(500),
            coarse_factor: 4,
        }
    }
}

impl MatchConfig {
    /// Whether a score clears the confidence threshold
    pub fn accepts(&self, score: f32) -> bool {
        score >= self.confidence_threshold
    }
}
