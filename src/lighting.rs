/// Lighting snapshot consumed by the scene, the two canonical presets, and
/// field-wise blending between them.
///
/// Colours are linear RGB stored in [`Vec3`]; the presets are authored in
/// sRGB hex like the rest of the scene palette and converted on creation.
use glam::Vec3;
use serde::Serialize;

/// Converts a `0xRRGGBB` colour to a `[0, 1]` RGB triple.
pub fn hex_color(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(r, g, b)
}

/// `a·(1 − t) + b·t`; lands exactly on `b` at `t = 1`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Component-wise [`lerp`].  `Vec3::lerp` computes `a + (b − a)·t`, which
/// can miss `b` by an ulp at `t = 1`.
#[inline]
fn lerp_vec(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// Everything the scene needs to light one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LightingState {
    // ── Sun ───────────────────────────────────────────────────────────────────
    pub sun_position: Vec3,
    /// Unit vector from the scene towards the light.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub sun_intensity: f32,

    // ── Fill lights ───────────────────────────────────────────────────────────
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub hemisphere_sky_color: Vec3,
    pub hemisphere_ground_color: Vec3,
    pub hemisphere_intensity: f32,

    // ── Sky dome ──────────────────────────────────────────────────────────────
    pub sky_top_color: Vec3,
    pub sky_middle_color: Vec3,
    pub sky_bottom_color: Vec3,
    pub sky_horizon_color: Vec3,
    pub sky_sun_color: Vec3,
    pub sky_sun_intensity: f32,
    pub star_intensity: f32,

    // ── Atmosphere and grading ────────────────────────────────────────────────
    pub fog_color: Vec3,
    pub fog_density: f32,
    /// 0 = terrain shaded for day, 1 = for night.
    pub terrain_day_night_mix: f32,
    pub exposure: f32,
}

impl LightingState {
    /// Clear alpine noon.
    pub fn day() -> Self {
        let sun_position = Vec3::new(100.0, 150.0, 50.0);
        Self {
            sun_position,
            sun_direction: sun_position.normalize(),
            sun_color: hex_color(0xfff4e0),
            sun_intensity: 2.0,

            ambient_color: hex_color(0xb8d4f0),
            ambient_intensity: 0.4,
            hemisphere_sky_color: hex_color(0x87ceeb),
            hemisphere_ground_color: hex_color(0x5a6b4a),
            hemisphere_intensity: 0.6,

            sky_top_color: hex_color(0x1e64c8),
            sky_middle_color: hex_color(0x5fa0e6),
            sky_bottom_color: hex_color(0xa8d0f0),
            sky_horizon_color: hex_color(0xe0ecf5),
            sky_sun_color: hex_color(0xfffae6),
            sky_sun_intensity: 1.0,
            star_intensity: 0.0,

            fog_color: hex_color(0xc8dcf0),
            fog_density: 0.0025,
            terrain_day_night_mix: 0.0,
            exposure: 1.0,
        }
    }

    /// Moonlit night; the "sun" slot carries the moon.
    pub fn night() -> Self {
        let sun_position = Vec3::new(-80.0, 120.0, -60.0);
        Self {
            sun_position,
            sun_direction: sun_position.normalize(),
            sun_color: hex_color(0x8fa8d8),
            sun_intensity: 0.3,

            ambient_color: hex_color(0x1a2340),
            ambient_intensity: 0.15,
            hemisphere_sky_color: hex_color(0x1c2a4a),
            hemisphere_ground_color: hex_color(0x0a0d14),
            hemisphere_intensity: 0.2,

            sky_top_color: hex_color(0x02040c),
            sky_middle_color: hex_color(0x0a1228),
            sky_bottom_color: hex_color(0x16203c),
            sky_horizon_color: hex_color(0x243250),
            sky_sun_color: hex_color(0xdce6ff),
            sky_sun_intensity: 0.4,
            star_intensity: 1.0,

            fog_color: hex_color(0x0c1222),
            fog_density: 0.004,
            terrain_day_night_mix: 1.0,
            exposure: 0.6,
        }
    }

    /// Blends every field from `from` to `to` at factor `t`.
    ///
    /// Positions, colours and scalars interpolate linearly; the sun direction
    /// is renormalised afterwards.  The result is a fresh value, so the
    /// presets are never aliased by the working state.
    pub fn blend(from: &Self, to: &Self, t: f32) -> Self {
        let direction = lerp_vec(from.sun_direction, to.sun_direction, t).normalize_or_zero();
        let sun_direction = if direction == Vec3::ZERO {
            // Opposed directions cancel at the midpoint.
            if t < 0.5 { from.sun_direction } else { to.sun_direction }
        } else {
            direction
        };

        Self {
            sun_position: lerp_vec(from.sun_position, to.sun_position, t),
            sun_direction,
            sun_color: lerp_vec(from.sun_color, to.sun_color, t),
            sun_intensity: lerp(from.sun_intensity, to.sun_intensity, t),

            ambient_color: lerp_vec(from.ambient_color, to.ambient_color, t),
            ambient_intensity: lerp(from.ambient_intensity, to.ambient_intensity, t),
            hemisphere_sky_color: lerp_vec(from.hemisphere_sky_color, to.hemisphere_sky_color, t),
            hemisphere_ground_color: lerp_vec(
                from.hemisphere_ground_color,
                to.hemisphere_ground_color,
                t,
            ),
            hemisphere_intensity: lerp(from.hemisphere_intensity, to.hemisphere_intensity, t),

            sky_top_color: lerp_vec(from.sky_top_color, to.sky_top_color, t),
            sky_middle_color: lerp_vec(from.sky_middle_color, to.sky_middle_color, t),
            sky_bottom_color: lerp_vec(from.sky_bottom_color, to.sky_bottom_color, t),
            sky_horizon_color: lerp_vec(from.sky_horizon_color, to.sky_horizon_color, t),
            sky_sun_color: lerp_vec(from.sky_sun_color, to.sky_sun_color, t),
            sky_sun_intensity: lerp(from.sky_sun_intensity, to.sky_sun_intensity, t),
            star_intensity: lerp(from.star_intensity, to.star_intensity, t),

            fog_color: lerp_vec(from.fog_color, to.fog_color, t),
            fog_density: lerp(from.fog_density, to.fog_density, t),
            terrain_day_night_mix: lerp(from.terrain_day_night_mix, to.terrain_day_night_mix, t),
            exposure: lerp(from.exposure, to.exposure, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_channels() {
        assert_eq!(hex_color(0xff0000), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hex_color(0x00ff00), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(hex_color(0x000000), Vec3::ZERO);
        assert!((hex_color(0x808080).x - 128.0 / 255.0).abs() < 1e-7);
    }

    #[test]
    fn presets_have_unit_sun_direction() {
        for state in [LightingState::day(), LightingState::night()] {
            assert!((state.sun_direction.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn blend_endpoints_are_exact() {
        let day = LightingState::day();
        let night = LightingState::night();

        let start = LightingState::blend(&day, &night, 0.0);
        assert_eq!(start.sun_intensity, day.sun_intensity);
        assert_eq!(start.fog_color, day.fog_color);
        assert_eq!(start.exposure, day.exposure);

        let end = LightingState::blend(&day, &night, 1.0);
        assert_eq!(end.sun_intensity, 0.3);
        assert_eq!(end.star_intensity, night.star_intensity);
        assert_eq!(end.sky_top_color, night.sky_top_color);
        assert_eq!(end.sun_position, night.sun_position);
    }

    #[test]
    fn blend_midpoint_is_linear() {
        let day = LightingState::day();
        let night = LightingState::night();
        let mid = LightingState::blend(&day, &night, 0.5);
        assert!((mid.sun_intensity - 1.15).abs() < 1e-6);
        assert!((mid.terrain_day_night_mix - 0.5).abs() < 1e-6);
        let expected_fog = (day.fog_color + night.fog_color) * 0.5;
        assert!(mid.fog_color.abs_diff_eq(expected_fog, 1e-6));
        assert!((mid.sun_direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn blend_leaves_presets_untouched() {
        let day = LightingState::day();
        let night = LightingState::night();
        let _ = LightingState::blend(&day, &night, 0.7);
        assert_eq!(day, LightingState::day());
        assert_eq!(night, LightingState::night());
    }

    #[test]
    fn opposed_directions_do_not_collapse() {
        let mut from = LightingState::day();
        let mut to = LightingState::day();
        from.sun_direction = Vec3::X;
        to.sun_direction = -Vec3::X;
        let mid = LightingState::blend(&from, &to, 0.5);
        assert_eq!(mid.sun_direction, -Vec3::X);
        let early = LightingState::blend(&from, &to, 0.25);
        assert_eq!(early.sun_direction, Vec3::X);
    }
}
