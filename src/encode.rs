//! PNG encoding of a finished surface

use crate::rendering::PixelSurface;
use crate::Result;

/// Encode a surface as an 8-bit RGBA PNG.
pub fn encode_png(surface: &PixelSurface) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(surface.data())?;
        writer.finish()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_surface_round_trips_its_header() {
        let surface = PixelSurface::new(7, 3).unwrap();
        let bytes = encode_png(&surface).unwrap();
        assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");

        let decoder = png::Decoder::new(&bytes[..]);
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 7);
        assert_eq!(reader.info().height, 3);
        assert_eq!(reader.info().color_type, png::ColorType::Rgba);
    }
}
