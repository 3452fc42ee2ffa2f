use nightscape::rendering::layout::{Point, BACKGROUND_BUILDINGS, CENTER_BUILDING, HAZE_COLOR, SKY_STOPS};
use nightscape::rendering::paint::BlendMode;
use nightscape::rendering::{rasterize, PassKind, Scene};
use nightscape::{render, render_with_rng, CanvasConfig, Error};
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn smoke_render_dimensions() {
    for (w, h) in [(1, 1), (17, 3), (256, 128), (1200, 800)] {
        let s = render(&CanvasConfig { width: w, height: h }).unwrap();
        assert_eq!(s.width(), w);
        assert_eq!(s.height(), h);
        assert_eq!(s.pixel_count(), (w * h) as usize);
    }
}

#[test]
fn default_render_is_stable_across_invocations() {
    let cfg = CanvasConfig::default();
    for _ in 0..3 {
        let s = render(&cfg).unwrap();
        assert_eq!((s.width(), s.height()), (1200, 800));
    }
}

#[test]
fn zero_width_is_a_validation_failure() {
    let err = render(&CanvasConfig { width: 0, height: 800 }).unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));
}

#[test]
fn sky_covers_every_row() {
    // Below the haze band and right of every building the sky shows through.
    let s = render_with_rng(&CanvasConfig::default(), &mut StdRng::seed_from_u64(3)).unwrap();
    for y in 250..800 {
        let px = s.pixel(1100, y).unwrap();
        assert_eq!(px[3], 255, "row {} is not opaque", y);
    }
    let bottom = s.pixel(1100, 799).unwrap();
    let last = SKY_STOPS[2].color;
    assert!((bottom[0] as i32 - last.r as i32).abs() <= 1);
    assert!((bottom[2] as i32 - last.b as i32).abs() <= 1);
}

#[test]
fn later_passes_paint_over_earlier_ones() {
    // Never-lit windows: the third background building's first cell is dark.
    let s = render_with_rng(&CanvasConfig::default(), &mut StepRng::new(u64::MAX, 0)).unwrap();
    let b = BACKGROUND_BUILDINGS[2].rect;
    let cell = s.pixel(b.x as u32 + 15, b.y as u32 + 15).unwrap();
    assert_eq!(cell, [0x0a, 0x0a, 0x1a, 255]);

    // The center building body covers the background buildings behind it.
    let body = s.pixel(450, 640).unwrap();
    assert_eq!(body, [0xe8, 0xe8, 0xe8, 255]);
}

#[test]
fn center_building_stays_inside_its_box() {
    let cfg = CanvasConfig::default();
    let dark = render_with_rng(&cfg, &mut StepRng::new(u64::MAX, 0)).unwrap();
    let r = CENTER_BUILDING.rect;
    // Rounded corner pixel shows what is behind, not the body fill.
    assert_ne!(dark.pixel(r.x as u32, r.y as u32).unwrap(), [0xe8, 0xe8, 0xe8, 255]);
    // Just outside the box on the right is never the body color.
    for y in r.y as u32..r.bottom() as u32 {
        assert_ne!(dark.pixel(r.right() as u32, y).unwrap(), [0xe8, 0xe8, 0xe8, 255]);
    }
}

#[test]
fn haze_band_screens_the_top_of_the_canvas() {
    let cfg = CanvasConfig { width: 64, height: 100 };
    let scene = Scene::compose(&cfg, &mut StepRng::new(u64::MAX, 0));
    let mut bare = scene.clone();
    let haze = bare.passes.last_mut().unwrap().commands.pop().unwrap();
    assert_eq!(haze.blend(), BlendMode::Screen);

    let hazed = rasterize(&scene).unwrap();
    let plain = rasterize(&bare).unwrap();
    for y in [0, 10, 29] {
        for x in [5, 40] {
            let base = plain.pixel(x, y).unwrap();
            let got = hazed.pixel(x, y).unwrap();
            let overlay = [HAZE_COLOR.r, HAZE_COLOR.g, HAZE_COLOR.b];
            for ch in 0..3 {
                let c = base[ch] as f32 / 255.0;
                let o = overlay[ch] as f32 / 255.0 * HAZE_COLOR.a;
                let expected = ((1.0 - (1.0 - c) * (1.0 - o)) * 255.0).round() as i32;
                assert!(
                    (got[ch] as i32 - expected).abs() <= 1,
                    "({}, {}) channel {}: {} vs {}",
                    x,
                    y,
                    ch,
                    got[ch],
                    expected
                );
            }
        }
    }
    // 30% of 100 rows: row 30 is outside the band.
    assert_eq!(hazed.pixel(5, 30), plain.pixel(5, 30));
}

#[test]
fn skyscraper_glow_is_alpha_composited_over_the_tower() {
    let scene = Scene::compose(&CanvasConfig::default(), &mut StepRng::new(u64::MAX, 0));
    let mut bare = scene.clone();
    let tower = bare
        .passes
        .iter_mut()
        .find(|p| p.kind == PassKind::RightSkyscraper)
        .expect("skyscraper pass");
    // Command 0 is the tower body, command 1 the glow.
    let glow = tower.commands.remove(1);
    assert_eq!(glow.blend(), BlendMode::SourceOver);

    let lit = rasterize(&scene).unwrap();
    let plain = rasterize(&bare).unwrap();
    // Between window cells, inside the glow band and below the haze.
    let (x, y) = (775, 260);
    let base = plain.pixel(x, y).unwrap();
    let got = lit.pixel(x, y).unwrap();
    assert_ne!(got, base, "glow left the tower untouched");
    assert_eq!(got[3], 255);

    let src = glow.paint().sample(Point::new(x as f32 + 0.5, y as f32 + 0.5));
    assert!(src[3] > 0.1 && src[3] < 0.2, "glow alpha {}", src[3]);
    for ch in 0..3 {
        let cb = base[ch] as f32 / 255.0;
        let expected = ((src[ch] + cb * (1.0 - src[3])) * 255.0).round() as i32;
        assert!(
            (got[ch] as i32 - expected).abs() <= 1,
            "channel {}: {} vs {}",
            ch,
            got[ch],
            expected
        );
    }
}
