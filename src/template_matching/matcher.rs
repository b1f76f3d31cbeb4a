/// Template matching implementation
///
/// Scores offsets of a template inside a search region and keeps the global
/// maximum. Large templates are searched coarse-to-fine: a downscaled scan picks
/// a few candidate positions, then each is refined at full resolution. The
/// zero-mean scorer works on exact integer sums so that a pixel-identical window
/// scores exactly 1.0.
use super::config::{MatchConfig, MatchMethod};
use super::region::SearchRegion;
use super::types::{Match, Template};
use image::RgbImage;
use image::imageops::{self, FilterType};
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template_parallel};
use std::time::Instant;

/// Coarse positions kept for full-resolution refinement
const COARSE_CANDIDATES: usize = 8;
/// Smallest downscaled template side still worth a coarse pass
const MIN_COARSE_SIDE: u32 = 4;

/// Template matcher for finding a template in screen frames
pub struct TemplateMatcher {
    method: MatchMethod,
    coarse_factor: u32,
}

impl TemplateMatcher {
    /// Matcher with a downscale factor for the coarse pass (1 scans every offset)
    pub fn new(method: MatchMethod, coarse_factor: u32) -> Self {
        Self {
            method,
            coarse_factor: coarse_factor.max(1),
        }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.method, config.coarse_factor)
    }

    /// Find the best-scoring position of a template in a frame
    ///
    /// Searches the template's own region when it has one, otherwise the whole
    /// frame. Returns `None` when the template does not fit in the search area.
    pub fn best_match(&self, frame: &RgbImage, template: &Template) -> Option<Match> {
        let region = template
            .search_region
            .map(|r| r.clip_to(frame.width(), frame.height()))
            .unwrap_or_else(|| SearchRegion::full_frame(frame.width(), frame.height()));
        self.best_match_in_region(frame, &template.image, &region)
    }

    /// Find the best-scoring position of a patch inside one region of a frame
    ///
    /// # Returns
    /// Top-left corner of the best window in frame coordinates and its score.
    /// Ties keep the first position in row-major order.
    pub fn best_match_in_region(
        &self,
        frame: &RgbImage,
        patch: &RgbImage,
        region: &SearchRegion,
    ) -> Option<Match> {
        let region = region.clip_to(frame.width(), frame.height());
        if !region.fits(patch.width(), patch.height()) {
            log::debug!(
                "Skipping match: {}x{} template does not fit in {}x{} region",
                patch.width(),
                patch.height(),
                region.width,
                region.height
            );
            return None;
        }

        let started = Instant::now();
        let found = match self.coarse_candidates(frame, patch, &region) {
            Some(candidates) => candidates
                .into_iter()
                .map(|(x, y)| {
                    let window = self.refine_region(x, y, patch, &region);
                    self.exact_best(frame, patch, &window)
                })
                .reduce(|best, other| if outranks(&other, &best) { other } else { best })
                .unwrap_or_else(|| self.exact_best(frame, patch, &region)),
            None => self.exact_best(frame, patch, &region),
        };
        log::debug!(
            "  Scanned {}x{} region with {}x{} template in {}ms: best {:.4} at ({},{})",
            region.width,
            region.height,
            patch.width(),
            patch.height(),
            started.elapsed().as_millis(),
            found.correlation,
            found.x,
            found.y
        );
        Some(found)
    }

    fn exact_best(&self, frame: &RgbImage, patch: &RgbImage, region: &SearchRegion) -> Match {
        match self.method {
            MatchMethod::ZeroMeanNormalized => zero_mean_best(frame, patch, region),
            MatchMethod::CrossCorrelationNormalized => luma_best(frame, patch, region),
        }
    }

    /// Top positions of a downscaled zero-mean scan, mapped back to frame pixels
    ///
    /// `None` when the template is too small to survive downscaling.
    fn coarse_candidates(
        &self,
        frame: &RgbImage,
        patch: &RgbImage,
        region: &SearchRegion,
    ) -> Option<Vec<(u32, u32)>> {
        let factor = self.coarse_factor;
        let (patch_width, patch_height) = (patch.width() / factor, patch.height() / factor);
        let (search_width, search_height) = (region.width / factor, region.height / factor);
        if factor <= 1
            || patch_width < MIN_COARSE_SIDE
            || patch_height < MIN_COARSE_SIDE
            || patch_width > search_width
            || patch_height > search_height
        {
            return None;
        }

        let search =
            imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image();
        let small_search = imageops::resize(&search, search_width, search_height, FilterType::Triangle);
        let small_patch = imageops::resize(patch, patch_width, patch_height, FilterType::Triangle);

        // Sorted by descending score
        let mut top: Vec<(f32, u32, u32)> = Vec::with_capacity(COARSE_CANDIDATES + 1);
        scan_zero_mean(
            &small_search,
            &small_patch,
            &SearchRegion::full_frame(search_width, search_height),
            |x, y, score| {
                if top.len() < COARSE_CANDIDATES || score > top[top.len() - 1].0 {
                    let at = top.partition_point(|c| c.0 >= score);
                    top.insert(at, (score, x, y));
                    top.truncate(COARSE_CANDIDATES);
                }
            },
        );

        Some(
            top.into_iter()
                .map(|(_, x, y)| (region.x + x * factor, region.y + y * factor))
                .collect(),
        )
    }

    /// Full-resolution window around a coarse candidate, kept inside `region`
    fn refine_region(&self, x: u32, y: u32, patch: &RgbImage, region: &SearchRegion) -> SearchRegion {
        let pad = self.coarse_factor * 2;
        let last_x = region.x + region.width - patch.width();
        let last_y = region.y + region.height - patch.height();

        let left = x.saturating_sub(pad).max(region.x).min(last_x);
        let top = y.saturating_sub(pad).max(region.y).min(last_y);
        let right = (x + pad).min(last_x);
        let bottom = (y + pad).min(last_y);

        SearchRegion::new(
            left,
            top,
            right - left + patch.width(),
            bottom - top + patch.height(),
        )
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::from_config(&MatchConfig::default())
    }
}

/// Higher score wins, ties go to the earlier position in row-major order
fn outranks(candidate: &Match, current: &Match) -> bool {
    candidate.correlation > current.correlation
        || (candidate.correlation == current.correlation
            && (candidate.y, candidate.x) < (current.y, current.x))
}

/// Per-channel sums of the template, computed once per scan
struct PatchStats {
    pixel_count: i128,
    sum: [u64; 3],
    /// `n * sum(t^2) - sum(t)^2` over all channels
    scaled_variance: i128,
}

impl PatchStats {
    fn new(patch: &RgbImage) -> Self {
        let pixel_count = patch.width() as i128 * patch.height() as i128;
        let mut sum = [0u64; 3];
        let mut sum_sq = [0u64; 3];
        for pixel in patch.pixels() {
            for c in 0..3 {
                let v = pixel.0[c] as u64;
                sum[c] += v;
                sum_sq[c] += v * v;
            }
        }
        let scaled_variance = (0..3)
            .map(|c| pixel_count * sum_sq[c] as i128 - (sum[c] as i128).pow(2))
            .sum();
        Self {
            pixel_count,
            sum,
            scaled_variance,
        }
    }

    /// Correlation coefficient of the template against one window
    fn score(&self, dot: &[u64; 3], sum: &[u64; 3], sum_sq: &[u64; 3]) -> f32 {
        let n = self.pixel_count;
        let mut cross: i128 = 0;
        let mut window_variance: i128 = 0;
        for c in 0..3 {
            let s = sum[c] as i128;
            cross += n * dot[c] as i128 - self.sum[c] as i128 * s;
            window_variance += n * sum_sq[c] as i128 - s * s;
        }

        match (self.scaled_variance == 0, window_variance == 0) {
            // Both flat: equal sums over equal pixel counts means equal colour
            (true, true) => {
                if self.sum == *sum {
                    1.0
                } else {
                    0.0
                }
            }
            (true, false) | (false, true) => 0.0,
            (false, false) => {
                let denom = (self.scaled_variance as f64 * window_variance as f64).sqrt();
                (cross as f64 / denom).clamp(-1.0, 1.0) as f32
            }
        }
    }
}

/// Summed-area tables of pixel values and squared values, per channel
struct ChannelIntegrals {
    origin_x: u32,
    origin_y: u32,
    stride: usize,
    sum: Vec<[u64; 3]>,
    sum_sq: Vec<[u64; 3]>,
}

impl ChannelIntegrals {
    fn new(frame: &RgbImage, region: &SearchRegion) -> Self {
        let stride = region.width as usize + 1;
        let len = stride * (region.height as usize + 1);
        let mut sum = vec![[0u64; 3]; len];
        let mut sum_sq = vec![[0u64; 3]; len];

        for dy in 0..region.height as usize {
            let mut row_sum = [0u64; 3];
            let mut row_sum_sq = [0u64; 3];
            for dx in 0..region.width as usize {
                let pixel = frame.get_pixel(region.x + dx as u32, region.y + dy as u32);
                let above = dy * stride + dx + 1;
                let here = above + stride;
                for c in 0..3 {
                    let v = pixel.0[c] as u64;
                    row_sum[c] += v;
                    row_sum_sq[c] += v * v;
                    sum[here][c] = sum[above][c] + row_sum[c];
                    sum_sq[here][c] = sum_sq[above][c] + row_sum_sq[c];
                }
            }
        }

        Self {
            origin_x: region.x,
            origin_y: region.y,
            stride,
            sum,
            sum_sq,
        }
    }

    /// Sums over the window with top-left (x, y) in frame coordinates
    fn window(&self, x: u32, y: u32, width: u32, height: u32) -> ([u64; 3], [u64; 3]) {
        let left = (x - self.origin_x) as usize;
        let top = (y - self.origin_y) as usize;
        let right = left + width as usize;
        let bottom = top + height as usize;

        let a = top * self.stride + left;
        let b = top * self.stride + right;
        let c = bottom * self.stride + left;
        let d = bottom * self.stride + right;

        let mut sum = [0u64; 3];
        let mut sum_sq = [0u64; 3];
        for ch in 0..3 {
            sum[ch] = (self.sum[d][ch] + self.sum[a][ch]) - (self.sum[b][ch] + self.sum[c][ch]);
            sum_sq[ch] = (self.sum_sq[d][ch] + self.sum_sq[a][ch])
                - (self.sum_sq[b][ch] + self.sum_sq[c][ch]);
        }
        (sum, sum_sq)
    }
}

fn zero_mean_best(frame: &RgbImage, patch: &RgbImage, region: &SearchRegion) -> Match {
    let mut best = Match {
        x: region.x,
        y: region.y,
        correlation: f32::MIN,
    };
    scan_zero_mean(frame, patch, region, |x, y, score| {
        if score > best.correlation {
            best = Match {
                x,
                y,
                correlation: score,
            };
        }
    });
    best
}

/// Score every offset of `patch` in `region` in row-major order
fn scan_zero_mean(
    frame: &RgbImage,
    patch: &RgbImage,
    region: &SearchRegion,
    mut visit: impl FnMut(u32, u32, f32),
) {
    let (patch_width, patch_height) = patch.dimensions();
    let stats = PatchStats::new(patch);
    let integrals = ChannelIntegrals::new(frame, region);

    let frame_width = frame.width() as usize;
    let frame_raw = frame.as_raw();
    let patch_raw = patch.as_raw();
    let row_len = patch_width as usize * 3;

    for y in region.y..=region.y + region.height - patch_height {
        for x in region.x..=region.x + region.width - patch_width {
            let mut dot = [0u64; 3];
            for dy in 0..patch_height as usize {
                let start = ((y as usize + dy) * frame_width + x as usize) * 3;
                let window_row = &frame_raw[start..start + row_len];
                let patch_row = &patch_raw[dy * row_len..(dy + 1) * row_len];
                for (w, p) in window_row.chunks_exact(3).zip(patch_row.chunks_exact(3)) {
                    dot[0] += w[0] as u64 * p[0] as u64;
                    dot[1] += w[1] as u64 * p[1] as u64;
                    dot[2] += w[2] as u64 * p[2] as u64;
                }
            }

            let (sum, sum_sq) = integrals.window(x, y, patch_width, patch_height);
            visit(x, y, stats.score(&dot, &sum, &sum_sq));
        }
    }
}

fn luma_best(frame: &RgbImage, patch: &RgbImage, region: &SearchRegion) -> Match {
    let search =
        imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image();
    let search_gray = imageops::grayscale(&search);
    let patch_gray = imageops::grayscale(patch);

    let scores = match_template_parallel(
        &search_gray,
        &patch_gray,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );
    let extremes = find_extremes(&scores);

    Match {
        x: region.x + extremes.max_value_location.0,
        y: region.y + extremes.max_value_location.1,
        correlation: extremes.max_value,
    }
}
