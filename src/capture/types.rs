// Core capture types and traits
use crate::error::AutomationResult;
use crate::template_matching::Point;
use image::RgbImage;

/// One captured display image
#[derive(Debug, Clone)]
pub struct Frame {
    /// Pixels in RGB order
    pub image: RgbImage,
    /// Global pointer coordinates of the frame's top-left pixel
    pub origin: Point,
    /// Frame pixels per pointer unit (2.0 on a Retina display)
    pub scale_factor: f32,
    pub duration_ms: u128,
}

impl Frame {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

// Trait defining frame sources (desktop capture or test fixtures)
pub trait ScreenSource {
    // Raw backend-specific capture, already normalized to RGB
    fn capture_image(&mut self) -> AutomationResult<Frame>;

    // Default high-level capture with timing
    fn capture(&mut self) -> AutomationResult<Frame> {
        let start = std::time::Instant::now();
        let frame = self.capture_image()?;
        Ok(Frame {
            duration_ms: start.elapsed().as_millis(),
            ..frame
        })
    }
}
