//! Software rasterizer: an owned RGBA8 surface plus the fill primitives
//! paint commands are replayed with.
//!
//! Coverage is decided at pixel centres. Circles are 4x4 supersampled since
//! star radii are at or below a couple of pixels.

use std::ops::Range;

use crate::error::{Error, Result};
use crate::rendering::layout::{Path, Point, Rect};
use crate::rendering::paint::{BlendMode, Paint, PaintCommand};

const CIRCLE_SAMPLES: u32 = 4;

/// A `width x height` RGBA8 pixel grid, straight (non-premultiplied) alpha.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelSurface {
    /// Allocate a transparent surface.
    ///
    /// Zero dimensions are a precondition violation; allocation failure is
    /// reported rather than aborting.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ValidationError(format!(
                "surface dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::RenderError(format!("surface {}x{} overflows", width, height)))?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels on the surface.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Replay a single paint command.
    pub fn execute(&mut self, cmd: &PaintCommand) -> Result<()> {
        match cmd {
            PaintCommand::FillRect { rect, paint, blend } => self.fill_rect(rect, paint, *blend),
            PaintCommand::FillPath { path, paint, blend } => self.fill_path(path, paint, *blend),
            PaintCommand::FillCircle {
                center,
                radius,
                paint,
                blend,
            } => self.fill_circle(*center, *radius, paint, *blend),
        }
    }

    pub fn fill_rect(&mut self, rect: &Rect, paint: &Paint, blend: BlendMode) -> Result<()> {
        if !rect.is_finite() {
            return Err(Error::RenderError(format!("non-finite rectangle {:?}", rect)));
        }
        let cols = span(rect.x, rect.right(), self.width);
        for py in span(rect.y, rect.bottom(), self.height) {
            for px in cols.clone() {
                self.blend_pixel(px, py, paint, blend, 1.0);
            }
        }
        Ok(())
    }

    pub fn fill_circle(&mut self, center: Point, radius: f32, paint: &Paint, blend: BlendMode) -> Result<()> {
        if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite()) || radius < 0.0 {
            return Err(Error::RenderError(format!("invalid circle at {:?} r={}", center, radius)));
        }
        let r2 = radius * radius;
        let step = 1.0 / CIRCLE_SAMPLES as f32;
        let cols = span_covering(center.x - radius, center.x + radius, self.width);
        for py in span_covering(center.y - radius, center.y + radius, self.height) {
            for px in cols.clone() {
                let mut hits = 0u32;
                for sy in 0..CIRCLE_SAMPLES {
                    for sx in 0..CIRCLE_SAMPLES {
                        let dx = px as f32 + (sx as f32 + 0.5) * step - center.x;
                        let dy = py as f32 + (sy as f32 + 0.5) * step - center.y;
                        if dx * dx + dy * dy < r2 {
                            hits += 1;
                        }
                    }
                }
                if hits > 0 {
                    let coverage = hits as f32 / (CIRCLE_SAMPLES * CIRCLE_SAMPLES) as f32;
                    self.blend_pixel(px, py, paint, blend, coverage);
                }
            }
        }
        Ok(())
    }

    /// Fill a closed contour with the non-zero winding rule.
    pub fn fill_path(&mut self, path: &Path, paint: &Paint, blend: BlendMode) -> Result<()> {
        if !path.is_finite() {
            return Err(Error::RenderError("non-finite path".into()));
        }
        let poly = path.flatten();
        if poly.len() < 3 {
            return Ok(());
        }
        let bounds = path.bounds();
        let mut crossings: Vec<(f32, i32)> = Vec::new();
        for py in span(bounds.y, bounds.bottom(), self.height) {
            let sy = py as f32 + 0.5;
            crossings.clear();
            for (i, a) in poly.iter().enumerate() {
                let b = poly[(i + 1) % poly.len()];
                if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                    let x = a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x);
                    crossings.push((x, if b.y > a.y { 1 } else { -1 }));
                }
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding != 0 {
                    for px in span(pair[0].0, pair[1].0, self.width) {
                        self.blend_pixel(px, py, paint, blend, 1.0);
                    }
                }
            }
        }
        Ok(())
    }

    fn blend_pixel(&mut self, px: u32, py: u32, paint: &Paint, blend: BlendMode, coverage: f32) {
        let mut src = paint.sample(Point::new(px as f32 + 0.5, py as f32 + 0.5));
        if coverage < 1.0 {
            for c in src.iter_mut() {
                *c *= coverage;
            }
        }
        if src[3] <= 0.0 {
            return;
        }
        let i = self.index(px, py);
        let dst = &mut self.data[i..i + 4];
        let out = composite(src, [dst[0], dst[1], dst[2], dst[3]], blend);
        dst.copy_from_slice(&out);
    }
}

/// Composite premultiplied `src` over straight-alpha `dst`.
///
/// Screen follows the separable blend formula
/// `co = cs(1 - ab) + cb(1 - as) + as*ab*B(cb, cs)`, which over an opaque
/// backdrop reduces to `1 - (1 - cb)(1 - cs*as)`.
pub fn composite(src: [f32; 4], dst: [u8; 4], blend: BlendMode) -> [u8; 4] {
    let sa = src[3];
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for ch in 0..3 {
        let cb = dst[ch] as f32 / 255.0;
        let sp = src[ch];
        let co = match blend {
            BlendMode::SourceOver => sp + cb * da * (1.0 - sa),
            BlendMode::Screen => {
                let cs = if sa > 0.0 { sp / sa } else { 0.0 };
                let mixed = cb + cs - cb * cs;
                sp * (1.0 - da) + cb * da * (1.0 - sa) + sa * da * mixed
            }
        };
        out[ch] = to_u8(co / out_a);
    }
    out[3] = to_u8(out_a);
    out
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Pixels whose centres fall in `[lo, hi)`, clipped to `0..limit`.
fn span(lo: f32, hi: f32, limit: u32) -> Range<u32> {
    let start = (lo - 0.5).ceil().max(0.0);
    let end = (hi - 0.5).ceil().min(limit as f32);
    if end <= start {
        return 0..0;
    }
    start as u32..end as u32
}

/// Pixels touched at all by `[lo, hi]`, clipped to `0..limit`.
fn span_covering(lo: f32, hi: f32, limit: u32) -> Range<u32> {
    let start = lo.floor().max(0.0);
    let end = hi.ceil().min(limit as f32);
    if end <= start {
        return 0..0;
    }
    start as u32..end as u32
}
