use std::path::Path;

use image::{ImageBuffer, Luma, Rgb, RgbImage};
use log::info;

use super::ExportError;
use crate::terrain::HeightField;

// ── Colour map ────────────────────────────────────────────────────────────────

/// "Jet" ramp: blue → cyan → green → yellow → red.
/// `t` ∈ [0.0, 1.0].
pub(crate) fn jet(t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    // Piecewise linear hat functions shifted to R, G, B channels.
    let r = (1.5 - (4.0 * t - 3.0).abs()).clamp(0.0, 1.0);
    let g = (1.5 - (4.0 * t - 2.0).abs()).clamp(0.0, 1.0);
    let b = (1.5 - (4.0 * t - 1.0).abs()).clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

// ── Writers ───────────────────────────────────────────────────────────────────

/// Writes the normalised heights as a 16-bit grayscale PNG, one pixel per
/// vertex (column → x, row → y).  Heights are already in [0, 1], so no
/// range detection is needed.
pub fn export_height_png(field: &HeightField, path: &Path) -> Result<(), ExportError> {
    if field.is_empty() {
        return Err(ExportError::EmptyField);
    }
    let (w, h) = (field.columns as u32, field.rows as u32);
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(w, h, |x, y| {
        let v = field.height(x as usize, y as usize).unwrap_or(0.0);
        Luma([(v.clamp(0.0, 1.0) * 65535.0) as u16])
    });
    img.save(path)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Writes the slopes as a false-colour PNG: flat ground blue, cliffs red.
pub fn export_slope_png(field: &HeightField, path: &Path) -> Result<(), ExportError> {
    if field.is_empty() {
        return Err(ExportError::EmptyField);
    }
    let (w, h) = (field.columns as u32, field.rows as u32);
    let mut img = RgbImage::new(w, h);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let s = field.slope(x as usize, y as usize).unwrap_or(0.0);
        *pixel = Rgb(jet(s));
    }
    img.save(path)?;
    info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp_field() -> HeightField {
        let (columns, rows) = (8, 4);
        let n = columns * rows;
        HeightField {
            columns,
            rows,
            height_scale: 10.0,
            heights: (0..n).map(|i| i as f32 / (n - 1) as f32).collect(),
            slopes: (0..n).map(|i| (i % columns) as f32 / (columns - 1) as f32).collect(),
        }
    }

    #[test]
    fn jet_endpoints() {
        assert_eq!(jet(0.0), [0, 0, 127]);
        assert_eq!(jet(1.0), [127, 0, 0]);
        assert_eq!(jet(0.5), [127, 255, 127]);
    }

    #[test]
    fn height_png_round_trips_extremes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("height.png");
        let field = ramp_field();
        export_height_png(&field, &path).unwrap();

        let img = image::open(&path).unwrap().into_luma16();
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(7, 3)[0], 65535);
    }

    #[test]
    fn slope_png_uses_ramp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slope.png");
        export_slope_png(&ramp_field(), &path).unwrap();

        let img = image::open(&path).unwrap().into_rgb8();
        assert_eq!(img.get_pixel(0, 2).0, jet(0.0));
        assert_eq!(img.get_pixel(7, 2).0, jet(1.0));
    }

    #[test]
    fn empty_field_is_rejected() {
        let dir = tempdir().unwrap();
        let field = HeightField {
            columns: 0,
            rows: 0,
            height_scale: 1.0,
            heights: Vec::new(),
            slopes: Vec::new(),
        };
        let err = export_height_png(&field, &dir.path().join("x.png")).unwrap_err();
        assert!(matches!(err, ExportError::EmptyField));
    }
}
