//! Nightscape
//!
//! Renders a procedurally lit night cityscape and encodes it as PNG, either
//! directly from Rust or through a small HTTP service.
//!
//! # Pipeline
//!
//! - **Scene**: fixed building layout and gradients, composed into ordered
//!   passes of paint commands. Window lighting and stars come from an
//!   injectable random source.
//! - **Raster**: passes replayed onto a private RGBA surface, later passes on
//!   top of earlier ones, each command carrying its own blend mode.
//! - **Encode**: the surface serialized as 8-bit RGBA PNG.
//!
//! # Example
//!
//! ```
//! use nightscape::CanvasConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CanvasConfig::new(320, 200)?;
//! let shot = nightscape::generate_cityscape(&config)?;
//! assert_eq!(shot.width, 320);
//! assert_eq!(&shot.png_data[0..4], b"\x89PNG");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod encode;
pub mod rendering;
pub mod server;

pub use rendering::{render, render_with_rng, PixelSurface, Screenshot};

use rand::Rng;

/// Largest accepted width or height. Bounds per-request allocation to
/// 64 MiB of pixels.
pub const MAX_DIMENSION: u32 = 4096;

/// Canvas dimensions for a single render.
///
/// # Examples
///
/// ```
/// let cfg = nightscape::CanvasConfig::default();
/// assert_eq!((cfg.width, cfg.height), (1200, 800));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

impl CanvasConfig {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let cfg = Self { width, height };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check both dimensions are in `1..=MAX_DIMENSION`.
    pub fn validate(&self) -> Result<()> {
        check_dimension("Width", self.width)?;
        check_dimension("Height", self.height)?;
        Ok(())
    }

    /// Build from optional raw query values, defaulting what is absent.
    ///
    /// Empty strings count as absent.
    pub fn from_raw(width: Option<&str>, height: Option<&str>) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(raw) = width.filter(|s| !s.is_empty()) {
            cfg.width = parse_dimension("Width", raw)?;
        }
        if let Some(raw) = height.filter(|s| !s.is_empty()) {
            cfg.height = parse_dimension("Height", raw)?;
        }
        Ok(cfg)
    }
}

fn check_dimension(name: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(Error::ValidationError(format!("{} must be a positive number", name)));
    }
    if value > MAX_DIMENSION {
        return Err(Error::ValidationError(format!(
            "{} must not exceed {}",
            name, MAX_DIMENSION
        )));
    }
    Ok(())
}

/// Parse a dimension given as text. `name` is used in the error message.
///
/// Only plain ASCII digits are accepted, surrounding whitespace aside; any
/// sign, decimal point or exponent is rejected.
pub fn parse_dimension(name: &str, raw: &str) -> Result<u32> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::ValidationError(format!("{} must be a positive number", name)));
    }
    // Too many digits for u64 is still just "too large".
    let value: u64 = digits.parse().unwrap_or(u64::MAX);
    if value == 0 {
        return Err(Error::ValidationError(format!("{} must be a positive number", name)));
    }
    let value = u32::try_from(value).unwrap_or(u32::MAX);
    check_dimension(name, value)?;
    Ok(value)
}

/// Render and encode a cityscape with the thread-local random source.
pub fn generate_cityscape(config: &CanvasConfig) -> Result<Screenshot> {
    generate_cityscape_with_rng(config, &mut rand::thread_rng())
}

pub fn generate_cityscape_with_rng<R: Rng + ?Sized>(config: &CanvasConfig, rng: &mut R) -> Result<Screenshot> {
    let surface = render_with_rng(config, rng)?;
    let png_data = encode::encode_png(&surface)?;
    Ok(Screenshot {
        width: surface.width(),
        height: surface.height(),
        png_data,
    })
}
