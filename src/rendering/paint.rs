/// Paint command set: colors, gradients, blend modes and the fill commands
/// the rasterizer replays.

use crate::rendering::layout::{Path, Point, Rect};

/// A color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in `[0, 1]`
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::hex(0xffffff);

    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 1.0,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied `[r, g, b, a]` in `[0, 1]`.
    pub fn premultiplied(&self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            self.r as f32 / 255.0 * a,
            self.g as f32 / 255.0 * a,
            self.b as f32 / 255.0 * a,
            a,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Offset along the gradient axis in `[0, 1]`
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// A linear gradient between two points.
///
/// Colors are interpolated in premultiplied space; positions outside the
/// axis clamp to the first or last stop.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    pub fn new(start: Point, end: Point, stops: &[GradientStop]) -> Self {
        Self {
            start,
            end,
            stops: stops.to_vec(),
        }
    }

    /// Project a point onto the gradient axis.
    ///
    /// Returns `None` for a degenerate axis, which paints nothing.
    pub fn position(&self, p: Point) -> Option<f32> {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len2 = dx * dx + dy * dy;
        if len2 <= f32::EPSILON {
            return None;
        }
        let t = ((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len2;
        Some(t.clamp(0.0, 1.0))
    }

    /// Sample the premultiplied color at axis position `t`.
    pub fn sample(&self, t: f32) -> [f32; 4] {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return [0.0; 4],
        };
        if t <= first.offset {
            return first.color.premultiplied();
        }
        if t >= last.offset {
            return last.color.premultiplied();
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t >= a.offset && t <= b.offset {
                let span = b.offset - a.offset;
                let f = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                let ca = a.color.premultiplied();
                let cb = b.color.premultiplied();
                return [
                    ca[0] + (cb[0] - ca[0]) * f,
                    ca[1] + (cb[1] - ca[1]) * f,
                    ca[2] + (cb[2] - ca[2]) * f,
                    ca[3] + (cb[3] - ca[3]) * f,
                ];
            }
        }
        last.color.premultiplied()
    }
}

/// What a fill command paints with.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear(LinearGradient),
}

impl Paint {
    /// Premultiplied color at a surface point.
    pub fn sample(&self, p: Point) -> [f32; 4] {
        match self {
            Paint::Solid(c) => c.premultiplied(),
            Paint::Linear(g) => match g.position(p) {
                Some(t) => g.sample(t),
                None => [0.0; 4],
            },
        }
    }
}

/// Compositing operator, chosen per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha-over
    #[default]
    SourceOver,
    /// `1 - (1 - backdrop) * (1 - source)` per channel
    Screen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    FillRect {
        rect: Rect,
        paint: Paint,
        blend: BlendMode,
    },
    FillPath {
        path: Path,
        paint: Paint,
        blend: BlendMode,
    },
    FillCircle {
        center: Point,
        radius: f32,
        paint: Paint,
        blend: BlendMode,
    },
}

impl PaintCommand {
    /// Solid source-over rectangle, the common case.
    pub fn solid_rect(rect: Rect, color: Color) -> Self {
        PaintCommand::FillRect {
            rect,
            paint: Paint::Solid(color),
            blend: BlendMode::SourceOver,
        }
    }

    pub fn blend(&self) -> BlendMode {
        match self {
            PaintCommand::FillRect { blend, .. }
            | PaintCommand::FillPath { blend, .. }
            | PaintCommand::FillCircle { blend, .. } => *blend,
        }
    }

    pub fn paint(&self) -> &Paint {
        match self {
            PaintCommand::FillRect { paint, .. }
            | PaintCommand::FillPath { paint, .. }
            | PaintCommand::FillCircle { paint, .. } => paint,
        }
    }
}
