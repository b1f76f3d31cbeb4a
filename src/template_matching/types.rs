/// Template matching data types
use super::region::SearchRegion;
use crate::error::{AutomationError, AutomationResult};
use image::RgbImage;
use std::fmt;
use std::path::{Path, PathBuf};

/// A point in global screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by an offset
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev distance (max of the per-axis distances)
    pub fn chebyshev_distance(&self, other: &Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A reference image to locate on screen, immutable once loaded
#[derive(Debug, Clone)]
pub struct Template {
    /// Path the template was loaded from
    pub path: PathBuf,
    /// File stem, used in progress output
    pub name: String,
    /// Pixels in RGB order
    pub image: RgbImage,
    /// Restricts the search when the filename carries `[x,y,w,h]`
    pub search_region: Option<SearchRegion>,
}

impl Template {
    /// Load and validate a template image from disk
    pub fn load(path: impl AsRef<Path>) -> AutomationResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AutomationError::TemplateNotFound {
                path: path.to_path_buf(),
            });
        }

        let image = image::open(path)
            .map_err(|e| AutomationError::TemplateLoad {
                path: path.to_path_buf(),
                description: e.to_string(),
            })?
            .to_rgb8();

        if image.width() == 0 || image.height() == 0 {
            return Err(AutomationError::TemplateLoad {
                path: path.to_path_buf(),
                description: "image is empty".to_string(),
            });
        }

        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        log::debug!(
            "Loaded template '{}' ({}x{}) from {}",
            name,
            image.width(),
            image.height(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            name,
            search_region: SearchRegion::parse_from_filename(file_name),
            image,
        })
    }

    /// Build a template from pixels already in memory
    pub fn from_image(name: impl Into<String>, image: RgbImage) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            image,
            search_region: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Center of the template when its top-left corner sits at (x, y)
    pub fn center_at(&self, x: u32, y: u32) -> (u32, u32) {
        (x + self.width() / 2, y + self.height() / 2)
    }
}

/// Best position found for a template in one frame, in frame pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// X coordinate of the template's top-left corner
    pub x: u32,
    /// Y coordinate of the template's top-left corner
    pub y: u32,
    /// Correlation score
    pub correlation: f32,
}

/// An accepted match: the template center in screen coordinates and its score
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    pub position: Point,
    pub score: f32,
}

impl MatchResult {
    /// Map a frame match to a screen position
    ///
    /// `origin` is the frame's top-left in pointer coordinates and `scale_factor`
    /// the number of frame pixels per pointer unit.
    pub fn from_match(template: &Template, found: &Match, origin: Point, scale_factor: f32) -> Self {
        let (cx, cy) = template.center_at(found.x, found.y);
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            position: origin.offset(
                (cx as f32 / scale).round() as i32,
                (cy as f32 / scale).round() as i32,
            ),
            score: found.correlation,
        }
    }
}
