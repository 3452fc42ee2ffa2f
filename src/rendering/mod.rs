//! Rendering pipeline: compose the scene into paint passes, then replay the
//! passes onto a fresh surface in order (painter's algorithm).

pub mod layout;
pub mod paint;
pub mod raster;
pub mod scene;

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::{CanvasConfig, Result};
pub use raster::PixelSurface;
pub use scene::{Pass, PassKind, Scene};

/// A rendered and encoded cityscape.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// Hex SHA-256 of the encoded bytes.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

/// Render with the thread-local random source.
pub fn render(config: &CanvasConfig) -> Result<PixelSurface> {
    render_with_rng(config, &mut rand::thread_rng())
}

/// Render with a caller-supplied random source.
///
/// Dimensions are validated before any allocation or drawing. A failing
/// primitive aborts the whole render; no partial surface is returned.
pub fn render_with_rng<R: Rng + ?Sized>(config: &CanvasConfig, rng: &mut R) -> Result<PixelSurface> {
    config.validate()?;
    let scene = Scene::compose(config, rng);
    rasterize(&scene)
}

/// Replay a composed scene onto a new surface.
pub fn rasterize(scene: &Scene) -> Result<PixelSurface> {
    let mut surface = PixelSurface::new(scene.width, scene.height)?;
    for pass in &scene.passes {
        for cmd in &pass.commands {
            surface.execute(cmd)?;
        }
        log::trace!("pass {:?}: {} commands", pass.kind, pass.commands.len());
    }
    Ok(surface)
}
