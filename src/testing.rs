// Fakes and fixtures shared by unit tests
use crate::capture::{Frame, ScreenSource};
use crate::error::{AutomationError, AutomationResult};
use crate::input::Pointer;
use crate::routine::Sleeper;
use crate::template_matching::Point;
use image::{Rgb, RgbImage};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Deterministic noisy image (xorshift), distinct per seed
pub fn noise_image(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state & 0xff) as u8
    };
    RgbImage::from_fn(width, height, |_, _| Rgb([next(), next(), next()]))
}

/// Copy `patch` into `frame` with its top-left corner at (x, y)
pub fn paste(frame: &mut RgbImage, patch: &RgbImage, x: u32, y: u32) {
    image::imageops::replace(frame, patch, x as i64, y as i64);
}

/// Screen that serves prepared frames in order, repeating the last one
pub struct FakeScreen {
    frames: Vec<RgbImage>,
    origin: Point,
    scale_factor: f32,
    failing: bool,
    pub captures: usize,
}

impl FakeScreen {
    pub fn new(frame: RgbImage) -> Self {
        Self::sequence(vec![frame])
    }

    pub fn sequence(frames: Vec<RgbImage>) -> Self {
        Self {
            frames,
            origin: Point::default(),
            scale_factor: 1.0,
            failing: false,
            captures: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::sequence(Vec::new())
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_scale(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }
}

impl ScreenSource for FakeScreen {
    fn capture_image(&mut self) -> AutomationResult<Frame> {
        self.captures += 1;
        if self.failing {
            return Err(AutomationError::Capture {
                description: "display went away".to_string(),
            });
        }
        let index = (self.captures - 1).min(self.frames.len().saturating_sub(1));
        let image = self.frames.get(index).cloned().ok_or(AutomationError::NoDisplay)?;
        Ok(Frame {
            image,
            origin: self.origin,
            scale_factor: self.scale_factor,
            duration_ms: 0,
        })
    }
}

/// Sleeper that records instead of blocking
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Pointer that records moves and clicks
pub struct RecordingPointer {
    pub location: Point,
    pub screen_size: (i32, i32),
    pub moves: Vec<(Point, Duration)>,
    pub clicks: Vec<Point>,
}

impl RecordingPointer {
    pub fn at(location: Point) -> Self {
        Self {
            location,
            screen_size: (1920, 1080),
            moves: Vec::new(),
            clicks: Vec::new(),
        }
    }
}

impl Default for RecordingPointer {
    fn default() -> Self {
        Self::at(Point::new(500, 500))
    }
}

impl Pointer for RecordingPointer {
    fn location(&self) -> AutomationResult<Point> {
        Ok(self.location)
    }

    fn screen_size(&self) -> AutomationResult<(i32, i32)> {
        Ok(self.screen_size)
    }

    fn move_to(&mut self, target: Point, duration: Duration) -> AutomationResult<()> {
        self.moves.push((target, duration));
        self.location = target;
        Ok(())
    }

    fn click(&mut self) -> AutomationResult<()> {
        self.clicks.push(self.location);
        Ok(())
    }
}

/// Scratch directory removed on drop
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "screen-auto-run-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("create test dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save an image under a relative path, creating parent directories
    pub fn save_image(&self, relative: &str, image: &RgbImage) -> PathBuf {
        let path = self.path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create image dir");
        }
        image.save(&path).expect("save test image");
        path
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
