//! Search regions encoded in template filenames

/// Screen rectangle a template is searched in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SearchRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole frame
    pub fn full_frame(frame_width: u32, frame_height: u32) -> Self {
        Self::new(0, 0, frame_width, frame_height)
    }

    /// Parse region from filename format: `template-[x,y,width,height].png`
    pub fn parse_from_filename(filename: &str) -> Option<Self> {
        let start = filename.find('[')?;
        let end = filename.find(']')?;
        if end <= start {
            return None;
        }

        let parts: Vec<&str> = filename[start + 1..end].split(',').collect();
        if parts.len() == 4
            && let (Ok(x), Ok(y), Ok(width), Ok(height)) = (
                parts[0].trim().parse::<u32>(),
                parts[1].trim().parse::<u32>(),
                parts[2].trim().parse::<u32>(),
                parts[3].trim().parse::<u32>(),
            )
        {
            return Some(Self::new(x, y, width, height));
        }
        None
    }

    /// Clip region to frame boundaries
    pub fn clip_to(&self, frame_width: u32, frame_height: u32) -> Self {
        let x = self.x.min(frame_width);
        let y = self.y.min(frame_height);
        Self {
            x,
            y,
            width: self.width.min(frame_width - x),
            height: self.height.min(frame_height - y),
        }
    }

    /// Whether a template of the given size fits inside the region
    pub fn fits(&self, width: u32, height: u32) -> bool {
        width > 0 && height > 0 && width <= self.width && height <= self.height
    }
}
