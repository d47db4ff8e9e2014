use crate::{
    core::{Rgba8Premul, Viewport},
    error::{NebulaError, NebulaResult},
    field::{Blob, FieldFrame, PointSprite, BLOB_ALPHA_CENTER, BLOB_ALPHA_MID},
    palette::Rgb8,
    visualizer::BAR_COUNT,
};

/// Opacity of the per-tick trail overlay when none is configured.
pub const DEFAULT_TRAIL_ALPHA: f64 = 0.1;

/// Peak edge darkening of the vignette pass.
const VIGNETTE_ALPHA: f64 = 0.4;

/// Opacity of visualizer bars at full mount fade.
const BAR_ALPHA: f64 = 0.9;

/// The exclusively-owned drawing surface of one mounted session:
/// premultiplied RGBA8 bytes, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
    premultiplied: bool,
}

impl Surface {
    /// Acquire a surface for the viewport. Returns `None` for a zero-area
    /// viewport; the caller degrades to a no-op render.
    pub fn acquire(viewport: Viewport) -> Option<Surface> {
        if viewport.is_degenerate() {
            return None;
        }
        Some(Surface {
            width: viewport.width,
            height: viewport.height,
            data: vec![0u8; viewport.pixel_count() * 4],
            premultiplied: true,
        })
    }

    /// Reallocate the bitmap for a new viewport. Previous contents are lost,
    /// exactly as a host canvas loses its bitmap on dimension change; the
    /// next frame repaints.
    pub fn resize(&mut self, viewport: Viewport) {
        self.width = viewport.width;
        self.height = viewport.height;
        self.data = vec![0u8; viewport.pixel_count() * 4];
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    fn blend(&mut self, x: i64, y: i64, src: Rgba8Premul) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let dst = [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]];
        let out = over(dst, src);
        self.data[i..i + 4].copy_from_slice(&out);
    }
}

/// Paints one frame's primitives onto the surface: trail fade, blobs
/// back-to-front, points on top.
#[derive(Clone, Debug)]
pub struct Compositor {
    base: Rgb8,
    trail_alpha: f64,
}

impl Compositor {
    pub fn new(base: Rgb8, trail_alpha: f64) -> NebulaResult<Self> {
        if !trail_alpha.is_finite() || !(0.0..=1.0).contains(&trail_alpha) {
            return Err(NebulaError::validation(
                "compositor trail_alpha must be within [0, 1]",
            ));
        }
        Ok(Self { base, trail_alpha })
    }

    pub fn base(&self) -> Rgb8 {
        self.base
    }

    /// Fully clear to the opaque base color. Run once before the loop starts
    /// so the first visible frame is never an uninitialized surface.
    pub fn clear(&self, surface: &mut Surface) {
        let px = [self.base.r, self.base.g, self.base.b, 255];
        for chunk in surface.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Paint one frame: a low-opacity base overlay (trail fade rather than a
    /// hard clear), then blobs, then point sprites. `fade_in` scales all
    /// primitive alpha during the mount ramp.
    pub fn composite(&self, surface: &mut Surface, frame: &FieldFrame, fade_in: f64) {
        let fade_in = fade_in.clamp(0.0, 1.0);

        let trail = self.base.premul(self.trail_alpha);
        for chunk in surface.data.chunks_exact_mut(4) {
            let dst = [chunk[0], chunk[1], chunk[2], chunk[3]];
            chunk.copy_from_slice(&over(dst, trail));
        }

        for blob in &frame.blobs {
            paint_blob(surface, blob, fade_in);
        }
        for point in &frame.points {
            paint_point(surface, point, fade_in);
        }
    }

    /// Paint the visualizer's 32 bars across the lower band, each a vertical
    /// gradient from `bottom` to `top`.
    pub fn paint_bars(
        &self,
        surface: &mut Surface,
        heights: &[f64; BAR_COUNT],
        bottom: Rgb8,
        top: Rgb8,
        fade_in: f64,
    ) {
        let w = f64::from(surface.width);
        let h = f64::from(surface.height);
        let alpha = BAR_ALPHA * fade_in.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }

        let region_w = w * 0.8;
        let left = (w - region_w) / 2.0;
        let slot = region_w / (BAR_COUNT as f64);
        let bar_w = (slot * 0.5).max(1.0);
        let band_h = h * 0.25;
        let base_y = h * 0.95;

        for (i, &height) in heights.iter().enumerate() {
            let bar_h = band_h * height.clamp(0.0, 1.0);
            let x0 = (left + slot * (i as f64) + (slot - bar_w) / 2.0).round() as i64;
            let x1 = ((x0 as f64) + bar_w).round() as i64 - 1;
            let y1 = base_y.round() as i64 - 1;
            let y0 = (base_y - bar_h).round() as i64;

            for y in y0..=y1 {
                let rel = (base_y - (y as f64 + 0.5)) / band_h;
                let src = bottom.lerp(top, rel.clamp(0.0, 1.0)).premul(alpha);
                for x in x0..=x1 {
                    surface.blend(x, y, src);
                }
            }
        }
    }

    /// Radial edge darkening in the base color: transparent at the center,
    /// strongest at the corners.
    pub fn apply_vignette(&self, surface: &mut Surface) {
        let w = f64::from(surface.width);
        let h = f64::from(surface.height);
        let (cx, cy) = (w / 2.0, h / 2.0);

        for y in 0..surface.height {
            for x in 0..surface.width {
                let nx = ((f64::from(x) + 0.5) - cx) / cx.max(1.0);
                let ny = ((f64::from(y) + 0.5) - cy) / cy.max(1.0);
                let t = (nx * nx + ny * ny).sqrt().min(1.0);
                if t <= 0.0 {
                    continue;
                }
                let src = self.base.premul(VIGNETTE_ALPHA * t);
                surface.blend(i64::from(x), i64::from(y), src);
            }
        }
    }
}

/// Premultiplied source-over in u8 arithmetic.
fn over(dst: [u8; 4], src: Rgba8Premul) -> [u8; 4] {
    if src.a == 0 {
        return dst;
    }
    if src.a == 255 {
        return [src.r, src.g, src.b, 255];
    }

    let inv = 255u16 - u16::from(src.a);
    [
        src.r.saturating_add(mul_div255(u16::from(dst[0]), inv)),
        src.g.saturating_add(mul_div255(u16::from(dst[1]), inv)),
        src.b.saturating_add(mul_div255(u16::from(dst[2]), inv)),
        src.a.saturating_add(mul_div255(u16::from(dst[3]), inv)),
    ]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// Alpha along the blob gradient: center stop to mid stop to transparent rim.
fn gradient_alpha(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t <= 0.5 {
        BLOB_ALPHA_CENTER + (BLOB_ALPHA_MID - BLOB_ALPHA_CENTER) * (t * 2.0)
    } else {
        BLOB_ALPHA_MID * (1.0 - (t - 0.5) * 2.0)
    }
}

fn paint_blob(surface: &mut Surface, blob: &Blob, fade_in: f64) {
    let r = blob.radius;
    if r <= 0.0 || fade_in <= 0.0 {
        return;
    }

    let x0 = ((blob.center.x - r).floor() as i64).max(0);
    let x1 = ((blob.center.x + r).ceil() as i64).min(i64::from(surface.width) - 1);
    let y0 = ((blob.center.y - r).floor() as i64).max(0);
    let y1 = ((blob.center.y + r).ceil() as i64).min(i64::from(surface.height) - 1);
    let r2 = r * r;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = (x as f64 + 0.5) - blob.center.x;
            let dy = (y as f64 + 0.5) - blob.center.y;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            let alpha = gradient_alpha(d2.sqrt() / r) * fade_in;
            if alpha <= 0.0 {
                continue;
            }
            surface.blend(x, y, blob.color.premul(alpha));
        }
    }
}

fn paint_point(surface: &mut Surface, point: &PointSprite, fade_in: f64) {
    let alpha = (point.opacity * fade_in).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let src = Rgb8::new(255, 255, 255).premul(alpha);

    let r = point.size;
    if r < 0.5 {
        surface.blend(point.pos.x.round() as i64, point.pos.y.round() as i64, src);
        return;
    }

    let x0 = (point.pos.x - r).floor() as i64;
    let x1 = (point.pos.x + r).ceil() as i64;
    let y0 = (point.pos.y - r).floor() as i64;
    let y1 = (point.pos.y + r).ceil() as i64;
    let r2 = r * r;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = (x as f64 + 0.5) - point.pos.x;
            let dy = (y as f64 + 0.5) - point.pos.y;
            if dx * dx + dy * dy <= r2 {
                surface.blend(x, y, src);
            }
        }
    }
}
