/// Scene geometry: primitive shapes, the fixed building layout and the
/// window grid derived from a building's rectangle.

use crate::rendering::paint::{Color, GradientStop};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x && other.y >= self.y && other.right() <= self.right() && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
}

/// A single closed contour of lines and quadratic curves.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub start: Point,
    pub segments: Vec<PathSegment>,
}

/// Steps used when flattening one quadratic curve.
const QUAD_STEPS: usize = 8;

impl Path {
    pub fn builder(start: Point) -> PathBuilder {
        PathBuilder {
            path: Path {
                start,
                segments: Vec::new(),
            },
        }
    }

    /// Flatten the contour into a closed polygon.
    pub fn flatten(&self) -> Vec<Point> {
        let mut pts = vec![self.start];
        let mut cur = self.start;
        for seg in &self.segments {
            match *seg {
                PathSegment::LineTo(p) => {
                    pts.push(p);
                    cur = p;
                }
                PathSegment::QuadTo { ctrl, to } => {
                    for i in 1..=QUAD_STEPS {
                        let t = i as f32 / QUAD_STEPS as f32;
                        let a = cur.lerp(ctrl, t);
                        let b = ctrl.lerp(to, t);
                        pts.push(a.lerp(b, t));
                    }
                    cur = to;
                }
            }
        }
        pts
    }

    /// Bounding box of all points including control points.
    pub fn bounds(&self) -> Rect {
        let mut min = self.start;
        let mut max = self.start;
        let mut grow = |p: Point| {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        };
        for seg in &self.segments {
            match *seg {
                PathSegment::LineTo(p) => grow(p),
                PathSegment::QuadTo { ctrl, to } => {
                    grow(ctrl);
                    grow(to);
                }
            }
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn is_finite(&self) -> bool {
        let ok = |p: &Point| p.x.is_finite() && p.y.is_finite();
        ok(&self.start)
            && self.segments.iter().all(|s| match s {
                PathSegment::LineTo(p) => ok(p),
                PathSegment::QuadTo { ctrl, to } => ok(ctrl) && ok(to),
            })
    }
}

pub struct PathBuilder {
    path: Path,
}

impl PathBuilder {
    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.path.segments.push(PathSegment::LineTo(Point::new(x, y)));
        self
    }

    pub fn quad_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        self.path.segments.push(PathSegment::QuadTo {
            ctrl: Point::new(cx, cy),
            to: Point::new(x, y),
        });
        self
    }

    /// Close the contour back to its start point.
    pub fn close(self) -> Path {
        self.path
    }
}

/// Rectangle with quadratic corners: four edges, four curves.
pub fn rounded_rect_path(r: Rect, radius: f32) -> Path {
    let (x, y, w, h) = (r.x, r.y, r.width, r.height);
    Path::builder(Point::new(x + radius, y))
        .line_to(x + w - radius, y)
        .quad_to(x + w, y, x + w, y + radius)
        .line_to(x + w, y + h - radius)
        .quad_to(x + w, y + h, x + w - radius, y + h)
        .line_to(x + radius, y + h)
        .quad_to(x, y + h, x, y + h - radius)
        .line_to(x, y + radius)
        .quad_to(x, y, x + radius, y)
        .close()
}

/// A rectangular building silhouette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub rect: Rect,
    pub color: Color,
}

impl Building {
    pub const fn new(x: f32, y: f32, width: f32, height: f32, color: Color) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            color,
        }
    }
}

pub const SKY_STOPS: [GradientStop; 3] = [
    GradientStop::new(0.0, Color::hex(0x1a1a2e)),
    GradientStop::new(0.3, Color::hex(0x16213e)),
    GradientStop::new(1.0, Color::hex(0x0f3460)),
];

pub const BACKGROUND_BUILDINGS: [Building; 5] = [
    Building::new(200.0, 300.0, 80.0, 400.0, Color::hex(0x1a1a2e)),
    Building::new(300.0, 250.0, 70.0, 450.0, Color::hex(0x16213e)),
    Building::new(500.0, 320.0, 90.0, 380.0, Color::hex(0x0f3460)),
    Building::new(650.0, 280.0, 75.0, 420.0, Color::hex(0x1a1a2e)),
    Building::new(800.0, 310.0, 85.0, 390.0, Color::hex(0x16213e)),
];
pub const BACKGROUND_LIGHT_RATIO: f64 = 0.3;

pub const LEFT_BUILDING: Building = Building::new(100.0, 200.0, 120.0, 500.0, Color::hex(0x0a0a1a));
pub const LEFT_LIGHT_RATIO: f64 = 0.4;

pub const CENTER_BUILDING: Building = Building::new(350.0, 450.0, 200.0, 250.0, Color::hex(0xe8e8e8));
pub const CENTER_CORNER_RADIUS: f32 = 15.0;
pub const CENTER_FLOORS: u32 = 8;
pub const CENTER_FLOOR_TOP: f32 = 20.0;
pub const CENTER_FLOOR_PITCH: f32 = 30.0;
pub const CENTER_DIVIDER_COLOR: Color = Color::hex(0x4a4a4a);
pub const CENTER_PANE_COLOR: Color = Color::hex(0xffd700);
pub const CENTER_PANE_LIT_RATIO: f64 = 0.7;

/// The skyscraper's fill is a diagonal gradient; its color field is unused.
pub const SKYSCRAPER: Building = Building::new(750.0, 100.0, 180.0, 600.0, Color::hex(0x2a4a6a));
pub const SKYSCRAPER_STOPS: [GradientStop; 5] = [
    GradientStop::new(0.0, Color::hex(0x2a4a6a)),
    GradientStop::new(0.3, Color::hex(0x1a3a5a)),
    GradientStop::new(0.5, Color::hex(0x0a2a4a)),
    GradientStop::new(0.7, Color::hex(0x1a3a5a)),
    GradientStop::new(1.0, Color::hex(0x2a4a6a)),
];
pub const GLOW_STOPS: [GradientStop; 2] = [
    GradientStop::new(0.0, Color::rgba(255, 200, 100, 0.3)),
    GradientStop::new(1.0, Color::rgba(255, 200, 100, 0.0)),
];
/// Share of the tower height covered by the glow.
pub const GLOW_FRACTION: f32 = 0.4;
pub const SKYSCRAPER_LIGHT_RATIO: f64 = 0.5;
pub const ROOF_CAP_COLOR: Color = Color::WHITE;
pub const ROOF_FIXTURE_COLOR: Color = Color::hex(0xffd700);

pub const FOREGROUND_BUILDINGS: [Building; 3] = [
    Building::new(50.0, 550.0, 100.0, 150.0, Color::hex(0x2a2a3a)),
    Building::new(170.0, 580.0, 90.0, 120.0, Color::hex(0x1a1a2a)),
    Building::new(280.0, 560.0, 110.0, 140.0, Color::hex(0x2a2a3a)),
];
pub const FOREGROUND_LIGHT_RATIO: f64 = 0.2;

pub const STAR_COUNT: usize = 30;
pub const STAR_BAND_HEIGHT: f32 = 200.0;
pub const STAR_MAX_RADIUS: f32 = 2.0;
pub const HAZE_COLOR: Color = Color::rgba(255, 200, 100, 0.1);
/// Share of the canvas height covered by the haze band.
pub const HAZE_FRACTION: f32 = 0.3;

pub const WINDOW_SIZE: f32 = 12.0;
pub const WINDOW_SPACING: f32 = 15.0;
pub const WINDOW_MARGIN: f32 = 10.0;
pub const WINDOW_LIT_COLOR: Color = Color::hex(0xffd700);
pub const WINDOW_HIGHLIGHT_COLOR: Color = Color::hex(0xffed4e);
pub const WINDOW_HIGHLIGHT_INSET: f32 = 2.0;
pub const WINDOW_DARK_COLOR: Color = Color::hex(0x0a0a1a);

/// Window cells laid out inside a building, margin on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGrid {
    origin: Point,
    pub cols: u32,
    pub rows: u32,
}

impl WindowGrid {
    pub fn for_building(rect: &Rect) -> Self {
        let pitch = WINDOW_SIZE + WINDOW_SPACING;
        let fit = |extent: f32| ((extent - WINDOW_MARGIN * 2.0) / pitch).floor().max(0.0) as u32;
        Self {
            origin: Point::new(rect.x + WINDOW_MARGIN, rect.y + WINDOW_MARGIN),
            cols: fit(rect.width),
            rows: fit(rect.height),
        }
    }

    pub fn len(&self) -> usize {
        (self.cols * self.rows) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell rectangles in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Rect> + '_ {
        let pitch = WINDOW_SIZE + WINDOW_SPACING;
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| {
                Rect::new(
                    self.origin.x + col as f32 * pitch,
                    self.origin.y + row as f32 * pitch,
                    WINDOW_SIZE,
                    WINDOW_SIZE,
                )
            })
        })
    }
}
