/// Template matching for locating UI elements in screen frames
///
/// This module provides:
/// - Template loading with validation and optional search regions from the filename
/// - Zero-mean normalized cross-correlation over RGB (default)
/// - Luma cross-correlation through imageproc as an alternative method
/// - The match configuration holding the confidence threshold and retry policy
pub mod config;
pub mod matcher;
pub mod region;
pub mod types;


pub use config::{MatchConfig, MatchMethod};
pub use matcher::TemplateMatcher;
pub use region::SearchRegion;
pub use types::{Match, MatchResult, Point, Template};
