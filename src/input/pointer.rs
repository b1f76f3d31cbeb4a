//! Pointer backends

use crate::error::AutomationResult;
use crate::template_matching::Point;
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use std::thread::sleep;
use std::time::Duration;

const MOVE_STEP: Duration = Duration::from_millis(10);

/// Capabilities the click dispatcher needs from a pointer device
pub trait Pointer {
    /// Current pointer position in global coordinates
    fn location(&self) -> AutomationResult<Point>;

    /// Size of the main display in pointer coordinates
    fn screen_size(&self) -> AutomationResult<(i32, i32)>;

    /// Move to `target`, taking roughly `duration`
    fn move_to(&mut self, target: Point, duration: Duration) -> AutomationResult<()>;

    /// Left click at the current position
    fn click(&mut self) -> AutomationResult<()>;
}

/// OS pointer driven through enigo
pub struct EnigoPointer {
    enigo: Enigo,
}

impl EnigoPointer {
    pub fn new() -> AutomationResult<Self> {
        Ok(Self {
            enigo: Enigo::new(&Settings::default())?,
        })
    }
}

impl Pointer for EnigoPointer {
    fn location(&self) -> AutomationResult<Point> {
        let (x, y) = self.enigo.location()?;
        Ok(Point::new(x, y))
    }

    fn screen_size(&self) -> AutomationResult<(i32, i32)> {
        Ok(self.enigo.main_display()?)
    }

    fn move_to(&mut self, target: Point, duration: Duration) -> AutomationResult<()> {
        let start = self.location()?;
        let steps = (duration.as_millis() / MOVE_STEP.as_millis()).max(1) as u32;
        let pause = duration / steps;

        // Linear path; the last step lands exactly on the target
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            let x = start.x + ((target.x - start.x) as f64 * t).round() as i32;
            let y = start.y + ((target.y - start.y) as f64 * t).round() as i32;
            self.enigo.move_mouse(x, y, Coordinate::Abs)?;
            sleep(pause);
        }
        Ok(())
    }

    fn click(&mut self) -> AutomationResult<()> {
        self.enigo.button(Button::Left, Direction::Click)?;
        Ok(())
    }
}

/// Pointer that only logs, for rehearsing a routine without touching the desktop
#[derive(Debug, Clone)]
pub struct DryRunPointer {
    location: Point,
    screen_size: (i32, i32),
    clicks: usize,
}

impl DryRunPointer {
    /// Virtual pointer parked at the screen center
    pub fn new(screen_width: i32, screen_height: i32) -> Self {
        Self {
            location: Point::new(screen_width / 2, screen_height / 2),
            screen_size: (screen_width, screen_height),
            clicks: 0,
        }
    }

    pub fn clicks(&self) -> usize {
        self.clicks
    }
}

impl Pointer for DryRunPointer {
    fn location(&self) -> AutomationResult<Point> {
        Ok(self.location)
    }

    fn screen_size(&self) -> AutomationResult<(i32, i32)> {
        Ok(self.screen_size)
    }

    fn move_to(&mut self, target: Point, duration: Duration) -> AutomationResult<()> {
        log::info!(
            "[dry-run] move {} -> {} over {}ms",
            self.location,
            target,
            duration.as_millis()
        );
        self.location = target;
        Ok(())
    }

    fn click(&mut self) -> AutomationResult<()> {
        self.clicks += 1;
        log::info!("[dry-run] click #{} at {}", self.clicks, self.location);
        Ok(())
    }
}
