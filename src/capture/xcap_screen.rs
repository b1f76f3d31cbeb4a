//! Desktop capture through xcap

use super::types::{Frame, ScreenSource};
use crate::error::{AutomationError, AutomationResult};
use crate::template_matching::Point;
use image::{DynamicImage, RgbaImage};
use xcap::Monitor;

/// Captures the primary display, or the first display when none reports primary
#[derive(Debug, Default)]
pub struct XcapScreen {
    captures: u64,
}

impl XcapScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn primary_monitor() -> AutomationResult<Monitor> {
        let monitors = Monitor::all()?;
        let primary = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        monitors
            .into_iter()
            .nth(primary)
            .ok_or(AutomationError::NoDisplay)
    }

    // macOS captures backing pixels while the pointer moves in points.
    // Windows and X11 pointers already use physical pixels.
    #[cfg(target_os = "macos")]
    fn pointer_scale(monitor: &Monitor) -> AutomationResult<f32> {
        Ok(monitor.scale_factor()?)
    }

    #[cfg(not(target_os = "macos"))]
    fn pointer_scale(_monitor: &Monitor) -> AutomationResult<f32> {
        Ok(1.0)
    }
}

impl ScreenSource for XcapScreen {
    fn capture_image(&mut self) -> AutomationResult<Frame> {
        let monitor = Self::primary_monitor()?;
        let origin = Point::new(monitor.x()?, monitor.y()?);
        let scale_factor = Self::pointer_scale(&monitor)?;
        let captured = monitor.capture_image()?;

        // Rebuild through raw bytes so the buffer type is ours, then drop alpha
        let (width, height) = (captured.width(), captured.height());
        let rgba = RgbaImage::from_raw(width, height, captured.into_raw()).ok_or_else(|| {
            AutomationError::Capture {
                description: format!("capture buffer does not match {width}x{height}"),
            }
        })?;

        self.captures += 1;
        log::debug!(
            "Captured frame #{} ({}x{}, scale {}) at origin {}",
            self.captures,
            width,
            height,
            scale_factor,
            origin
        );
        Ok(Frame {
            image: DynamicImage::ImageRgba8(rgba).to_rgb8(),
            origin,
            scale_factor,
            duration_ms: 0,
        })
    }
}
