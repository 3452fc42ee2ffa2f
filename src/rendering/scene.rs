//! Scene composition: turns a canvas size and a random source into the
//! ordered passes of paint commands that make up one cityscape.

use rand::Rng;

use crate::rendering::layout::*;
use crate::rendering::paint::{BlendMode, Color, LinearGradient, Paint, PaintCommand};
use crate::CanvasConfig;

/// The passes of a cityscape, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Sky,
    BackgroundBuildings,
    LeftBuilding,
    CenterBuilding,
    RightSkyscraper,
    ForegroundBuildings,
    AtmosphericDetail,
}

impl PassKind {
    pub const ORDER: [PassKind; 7] = [
        PassKind::Sky,
        PassKind::BackgroundBuildings,
        PassKind::LeftBuilding,
        PassKind::CenterBuilding,
        PassKind::RightSkyscraper,
        PassKind::ForegroundBuildings,
        PassKind::AtmosphericDetail,
    ];
}

#[derive(Debug, Clone)]
pub struct Pass {
    pub kind: PassKind,
    pub commands: Vec<PaintCommand>,
}

/// A fully composed, not yet rasterized, cityscape.
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub passes: Vec<Pass>,
}

impl Scene {
    /// Compose every pass. Window lighting and stars are drawn from `rng`.
    pub fn compose<R: Rng + ?Sized>(config: &CanvasConfig, rng: &mut R) -> Self {
        let width = config.width as f32;
        let height = config.height as f32;
        let passes = PassKind::ORDER
            .iter()
            .map(|&kind| {
                let mut commands = Vec::new();
                match kind {
                    PassKind::Sky => sky(&mut commands, width, height),
                    PassKind::BackgroundBuildings => {
                        silhouettes(&mut commands, &BACKGROUND_BUILDINGS, BACKGROUND_LIGHT_RATIO, rng)
                    }
                    PassKind::LeftBuilding => {
                        silhouettes(&mut commands, &[LEFT_BUILDING], LEFT_LIGHT_RATIO, rng)
                    }
                    PassKind::CenterBuilding => center_building(&mut commands, rng),
                    PassKind::RightSkyscraper => skyscraper(&mut commands, rng),
                    PassKind::ForegroundBuildings => {
                        silhouettes(&mut commands, &FOREGROUND_BUILDINGS, FOREGROUND_LIGHT_RATIO, rng)
                    }
                    PassKind::AtmosphericDetail => atmosphere(&mut commands, width, height, rng),
                }
                Pass { kind, commands }
            })
            .collect();

        Self {
            width: config.width,
            height: config.height,
            passes,
        }
    }

    /// All commands across passes, in draw order.
    pub fn commands(&self) -> impl Iterator<Item = &PaintCommand> {
        self.passes.iter().flat_map(|p| p.commands.iter())
    }

    pub fn pass(&self, kind: PassKind) -> Option<&Pass> {
        self.passes.iter().find(|p| p.kind == kind)
    }
}

fn sky(out: &mut Vec<PaintCommand>, width: f32, height: f32) {
    out.push(PaintCommand::FillRect {
        rect: Rect::new(0.0, 0.0, width, height),
        paint: Paint::Linear(LinearGradient::new(
            Point::new(0.0, 0.0),
            Point::new(0.0, height),
            &SKY_STOPS,
        )),
        blend: BlendMode::SourceOver,
    });
}

fn silhouettes<R: Rng + ?Sized>(out: &mut Vec<PaintCommand>, buildings: &[Building], light_ratio: f64, rng: &mut R) {
    for b in buildings {
        out.push(PaintCommand::solid_rect(b.rect, b.color));
        windows(out, &b.rect, light_ratio, rng);
    }
}

/// Lit cells are a gold square under an inset highlight; unlit cells a
/// single dark square.
pub fn windows<R: Rng + ?Sized>(out: &mut Vec<PaintCommand>, building: &Rect, light_ratio: f64, rng: &mut R) {
    let ratio = light_ratio.clamp(0.0, 1.0);
    for cell in WindowGrid::for_building(building).cells() {
        if rng.gen_bool(ratio) {
            out.push(PaintCommand::solid_rect(cell, WINDOW_LIT_COLOR));
            let inset = WINDOW_HIGHLIGHT_INSET;
            out.push(PaintCommand::solid_rect(
                Rect::new(cell.x + inset, cell.y + inset, cell.width - inset * 2.0, cell.height - inset * 2.0),
                WINDOW_HIGHLIGHT_COLOR,
            ));
        } else {
            out.push(PaintCommand::solid_rect(cell, WINDOW_DARK_COLOR));
        }
    }
}

fn center_building<R: Rng + ?Sized>(out: &mut Vec<PaintCommand>, rng: &mut R) {
    let r = CENTER_BUILDING.rect;
    out.push(PaintCommand::FillPath {
        path: rounded_rect_path(r, CENTER_CORNER_RADIUS),
        paint: Paint::Solid(CENTER_BUILDING.color),
        blend: BlendMode::SourceOver,
    });

    for floor in 0..CENTER_FLOORS {
        let line_y = r.y + CENTER_FLOOR_TOP + floor as f32 * CENTER_FLOOR_PITCH;
        out.push(PaintCommand::solid_rect(
            Rect::new(r.x + 10.0, line_y, r.width - 20.0, 2.0),
            CENTER_DIVIDER_COLOR,
        ));
        // Panes sit astride the divider; left then right, each independent.
        for pane_x in [r.x + 15.0, r.right() - 40.0] {
            if rng.gen_bool(CENTER_PANE_LIT_RATIO) {
                out.push(PaintCommand::solid_rect(
                    Rect::new(pane_x, line_y - 8.0, 25.0, 12.0),
                    CENTER_PANE_COLOR,
                ));
            }
        }
    }
}

fn skyscraper<R: Rng + ?Sized>(out: &mut Vec<PaintCommand>, rng: &mut R) {
    let r = SKYSCRAPER.rect;
    out.push(PaintCommand::FillRect {
        rect: r,
        paint: Paint::Linear(LinearGradient::new(
            Point::new(r.x, r.y),
            Point::new(r.right(), r.bottom()),
            &SKYSCRAPER_STOPS,
        )),
        blend: BlendMode::SourceOver,
    });

    let glow_h = r.height * GLOW_FRACTION;
    out.push(PaintCommand::FillRect {
        rect: Rect::new(r.x, r.y, r.width, glow_h),
        paint: Paint::Linear(LinearGradient::new(
            Point::new(r.x, r.y),
            Point::new(r.right(), r.y + glow_h),
            &GLOW_STOPS,
        )),
        blend: BlendMode::SourceOver,
    });

    windows(out, &r, SKYSCRAPER_LIGHT_RATIO, rng);

    out.push(PaintCommand::solid_rect(
        Rect::new(r.x + 20.0, r.bottom() - 50.0, r.width - 40.0, 50.0),
        ROOF_CAP_COLOR,
    ));
    out.push(PaintCommand::solid_rect(
        Rect::new(r.x + 30.0, r.bottom() - 40.0, 40.0, 30.0),
        ROOF_FIXTURE_COLOR,
    ));
    out.push(PaintCommand::solid_rect(
        Rect::new(r.right() - 70.0, r.bottom() - 40.0, 40.0, 30.0),
        ROOF_FIXTURE_COLOR,
    ));
}

fn atmosphere<R: Rng + ?Sized>(out: &mut Vec<PaintCommand>, width: f32, height: f32, rng: &mut R) {
    for _ in 0..STAR_COUNT {
        let x = rng.gen::<f32>() * width;
        let y = rng.gen::<f32>() * STAR_BAND_HEIGHT;
        let radius = rng.gen::<f32>() * STAR_MAX_RADIUS;
        out.push(PaintCommand::FillCircle {
            center: Point::new(x, y),
            radius,
            paint: Paint::Solid(Color::WHITE),
            blend: BlendMode::SourceOver,
        });
    }

    out.push(PaintCommand::FillRect {
        rect: Rect::new(0.0, 0.0, width, height * HAZE_FRACTION),
        paint: Paint::Solid(HAZE_COLOR),
        blend: BlendMode::Screen,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn always_lit() -> StepRng {
        StepRng::new(0, 0)
    }

    fn never_lit() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn count_color(cmds: &[PaintCommand], color: Color) -> usize {
        cmds.iter().filter(|c| c.paint() == &Paint::Solid(color)).count()
    }

    #[test]
    fn passes_follow_the_fixed_order() {
        let scene = Scene::compose(&CanvasConfig::default(), &mut StdRng::seed_from_u64(7));
        let kinds: Vec<_> = scene.passes.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, PassKind::ORDER.to_vec());
    }

    #[test]
    fn window_count_matches_grid_formula() {
        let rect = Rect::new(0.0, 0.0, 180.0, 600.0);
        let expected = ((180 - 20) / 27) * ((600 - 20) / 27);

        let mut lit = Vec::new();
        windows(&mut lit, &rect, 0.5, &mut always_lit());
        assert_eq!(lit.len(), expected * 2);
        assert_eq!(count_color(&lit, WINDOW_HIGHLIGHT_COLOR), expected);

        let mut dark = Vec::new();
        windows(&mut dark, &rect, 0.5, &mut never_lit());
        assert_eq!(dark.len(), expected);
        assert_eq!(count_color(&dark, WINDOW_DARK_COLOR), expected);
    }

    #[test]
    fn every_cell_is_fully_lit_or_unlit() {
        let rect = LEFT_BUILDING.rect;
        let grid = WindowGrid::for_building(&rect);
        let mut cmds = Vec::new();
        windows(&mut cmds, &rect, 0.4, &mut StdRng::seed_from_u64(42));
        let lit = count_color(&cmds, WINDOW_HIGHLIGHT_COLOR);
        let dark = count_color(&cmds, WINDOW_DARK_COLOR);
        assert_eq!(lit + dark, grid.len());
        assert_eq!(count_color(&cmds, WINDOW_LIT_COLOR), lit);
        assert_eq!(cmds.len(), lit * 2 + dark);
    }

    #[test]
    fn center_building_lights_each_pane_independently() {
        let mut all = Vec::new();
        center_building(&mut all, &mut always_lit());
        // body + 8 dividers + 16 panes
        assert_eq!(all.len(), 1 + 8 + 16);
        assert!(matches!(all[0], PaintCommand::FillPath { .. }));

        let mut none = Vec::new();
        center_building(&mut none, &mut never_lit());
        assert_eq!(none.len(), 1 + 8);
        assert_eq!(count_color(&none, CENTER_PANE_COLOR), 0);
    }

    #[test]
    fn haze_band_is_the_only_screen_blend_and_comes_last() {
        let scene = Scene::compose(&CanvasConfig::default(), &mut StdRng::seed_from_u64(1));
        let screens: Vec<_> = scene.commands().filter(|c| c.blend() == BlendMode::Screen).collect();
        assert_eq!(screens.len(), 1);
        let last = scene.commands().last().unwrap();
        assert_eq!(last.blend(), BlendMode::Screen);
        match last {
            PaintCommand::FillRect { rect, .. } => {
                assert_eq!(rect.width, 1200.0);
                assert!((rect.height - 240.0).abs() < 1e-3);
            }
            other => panic!("unexpected haze command {:?}", other),
        }
    }

    #[test]
    fn stars_stay_in_the_top_band() {
        let cfg = CanvasConfig { width: 640, height: 480 };
        let scene = Scene::compose(&cfg, &mut StdRng::seed_from_u64(99));
        let detail = scene.pass(PassKind::AtmosphericDetail).unwrap();
        let stars: Vec<_> = detail
            .commands
            .iter()
            .filter_map(|c| match c {
                PaintCommand::FillCircle { center, radius, .. } => Some((*center, *radius)),
                _ => None,
            })
            .collect();
        assert_eq!(stars.len(), STAR_COUNT);
        for (c, r) in stars {
            assert!(c.x >= 0.0 && c.x < 640.0);
            assert!(c.y >= 0.0 && c.y < STAR_BAND_HEIGHT);
            assert!((0.0..STAR_MAX_RADIUS).contains(&r));
        }
    }

    #[test]
    fn skyscraper_layers_gradient_glow_windows_then_roof() {
        let mut cmds = Vec::new();
        skyscraper(&mut cmds, &mut never_lit());
        assert!(matches!(&cmds[0], PaintCommand::FillRect { paint: Paint::Linear(g), .. } if g.stops.len() == 5));
        match &cmds[1] {
            PaintCommand::FillRect { rect, paint: Paint::Linear(_), .. } => {
                assert!((rect.height - 240.0).abs() < 1e-3);
            }
            other => panic!("expected glow, got {:?}", other),
        }
        let n = cmds.len();
        assert_eq!(cmds[n - 3].paint(), &Paint::Solid(ROOF_CAP_COLOR));
        assert_eq!(cmds[n - 1].paint(), &Paint::Solid(ROOF_FIXTURE_COLOR));
    }
}
