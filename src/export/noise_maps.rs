/// Export every intermediate signal of the alpine composite as a false-colour PNG.
///
/// The maps produced are:
///
/// | File                   | Range    | Description                                     |
/// |------------------------|----------|-------------------------------------------------|
/// | noise_warp_x.png       | [-1, 1]  | Domain-warp offset, X axis (÷ warp strength)    |
/// | noise_warp_y.png       | [-1, 1]  | Domain-warp offset, Y axis (÷ warp strength)    |
/// | noise_base.png         | [-1, 1]  | Warped base fbm                                 |
/// | noise_ridges.png       | [ 0, 1]  | Warped ridged noise                             |
/// | noise_large_scale.png  | [-1, 1]  | Unwarped low-frequency fbm                      |
/// | noise_ridge_blend.png  | [ 0, 1]  | Ridge blend weight derived from large scale     |
/// | noise_detail.png       | [-1, 1]  | Detail fbm (÷ detail amplitude)                 |
/// | noise_height.png       | [ 0, 1]  | Final alpine height                             |
///
/// Colour encoding
/// ───────────────
/// All maps share the "jet" ramp: blue (low) → cyan → green → yellow → red (high).
/// Signed maps are rescaled so 0.0 → green; unsigned maps so 0.0 → blue.
use std::path::Path;

use image::{Rgb, RgbImage};
use rayon::prelude::*;

use super::ExportError;
use super::png::jet;
use crate::fractal::AlpineLayers;
use crate::terrain::HeightFieldGenerator;

#[inline]
fn diverge(v: f32) -> [u8; 3] {
    jet((v.clamp(-1.0, 1.0) + 1.0) * 0.5)
}

#[inline]
fn sequential(v: f32) -> [u8; 3] {
    jet(v.clamp(0.0, 1.0))
}

/// Writes `data` (row-major, length == size × size) to a PNG at `path`.
fn save_map(
    data: &[f32],
    size: u32,
    path: &Path,
    colorize: impl Fn(f32) -> [u8; 3],
) -> Result<(), ExportError> {
    debug_assert_eq!(data.len(), (size * size) as usize);
    let mut img = RgbImage::new(size, size);
    for (i, &v) in data.iter().enumerate() {
        let x = i as u32 % size;
        let y = i as u32 / size;
        img.put_pixel(x, y, Rgb(colorize(v)));
    }
    img.save(path)?;
    log::info!("[noise] wrote {}", path.display());
    Ok(())
}

fn safe_div(v: f64, d: f64) -> f32 {
    if d == 0.0 { 0.0 } else { (v / d) as f32 }
}

/// Re-samples the alpine composite on a `size × size` lattice over the
/// terrain's unit square and writes one map per layer into `dir`.
pub fn export_noise_maps(
    generator: &HeightFieldGenerator,
    size: u32,
    dir: &Path,
) -> Result<(), ExportError> {
    let size = size.max(2);
    let composer = generator.composer();
    let profile = &generator.config().profile;
    let step = 1.0 / (size - 1) as f64;

    let layers: Vec<AlpineLayers> = (0..size * size)
        .into_par_iter()
        .map(|i| {
            let nx = (i % size) as f64 * step;
            let nz = (i / size) as f64 * step;
            composer.alpine_layers(nx, nz, profile)
        })
        .collect();

    let strength = profile.warp.strength;
    let amplitude = profile.detail_amplitude;
    let save = |file: &str,
                extract: &dyn Fn(&AlpineLayers) -> f32,
                colorize: fn(f32) -> [u8; 3]|
     -> Result<(), ExportError> {
        let data: Vec<f32> = layers.iter().map(|l| extract(l)).collect();
        save_map(&data, size, &dir.join(file), colorize)
    };

    save("noise_warp_x.png", &|l| safe_div(l.warp_x, strength), diverge)?;
    save("noise_warp_y.png", &|l| safe_div(l.warp_y, strength), diverge)?;
    save("noise_base.png", &|l| l.base as f32, diverge)?;
    save("noise_ridges.png", &|l| l.ridges as f32, sequential)?;
    save("noise_large_scale.png", &|l| l.large_scale as f32, diverge)?;
    save("noise_ridge_blend.png", &|l| l.ridge_blend as f32, sequential)?;
    save("noise_detail.png", &|l| safe_div(l.detail, amplitude), diverge)?;
    save("noise_height.png", &|l| l.height as f32, sequential)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainConfig;
    use tempfile::tempdir;

    #[test]
    fn writes_every_layer() {
        let generator = HeightFieldGenerator::new(TerrainConfig::default(), 21);
        let dir = tempdir().unwrap();
        export_noise_maps(&generator, 16, dir.path()).unwrap();
        for name in [
            "noise_warp_x.png",
            "noise_warp_y.png",
            "noise_base.png",
            "noise_ridges.png",
            "noise_large_scale.png",
            "noise_ridge_blend.png",
            "noise_detail.png",
            "noise_height.png",
        ] {
            let img = image::open(dir.path().join(name)).unwrap();
            assert_eq!((img.width(), img.height()), (16, 16), "{name}");
        }
    }

    #[test]
    fn colour_ramps_split_at_zero() {
        assert_eq!(diverge(0.0), jet(0.5));
        assert_eq!(sequential(0.0), jet(0.0));
        assert_eq!(diverge(-5.0), jet(0.0));
    }
}
