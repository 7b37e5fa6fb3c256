/// Fractal signals layered on top of a [`NoiseField`]: fbm, ridged noise,
/// domain warping and the composite alpine height function.
///
/// The alpine composite runs a fixed sequence:
///
/// | Step | Signal                                                        |
/// |------|---------------------------------------------------------------|
/// | 1    | warp `(x, y)` (strength 0.4, scale 0.3)                       |
/// | 2    | base   = fbm(warped, 5 oct, p 0.5, l 2.0, s 1.5)              |
/// | 3    | ridges = ridged(warped, 5 oct, p 0.5, l 2.2, s 2.0)           |
/// | 4    | large  = fbm(x, y, 3 oct, p 0.4, l 2.0, s 0.4), unwarped      |
/// | 5    | blend  = max(0, large·0.5 + 0.5)                              |
/// | 6    | h = base·(1 − blend·0.6) + ridges·blend·0.8                   |
/// | 7    | h += fbm(4x, 4y, 3 oct, p 0.4, l 2.5, s 4.0)·0.1              |
/// | 8    | h = (h + 1)·0.5                                               |
/// | 9    | h = h^1.3                                                     |
/// | 10   | h < 0.25 → h·0.7 + 0.075 (valley floor lift)                  |
/// | 11   | clamp to [0, 1]                                               |
use crate::noise::NoiseField;
use serde::{Deserialize, Serialize};

/// Offset applied to the second warp sample so it is decorrelated from the first.
const WARP_DECORRELATION: (f64, f64) = (5.2, 1.3);
/// Octave count of each warp sample.
const WARP_OCTAVES: u32 = 4;

// ── Parameters ────────────────────────────────────────────────────────────────

/// Octave accumulation settings shared by [`FractalComposer::fbm`] and
/// [`FractalComposer::ridged_noise`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalParams {
    /// Number of noise layers to combine.
    pub octaves: u32,
    /// Amplitude decay per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Frequency of the first octave.
    pub scale: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 1.0,
        }
    }
}

impl FractalParams {
    pub const fn new(octaves: u32, persistence: f64, lacunarity: f64, scale: f64) -> Self {
        Self {
            octaves,
            persistence,
            lacunarity,
            scale,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpParams {
    pub strength: f64,
    pub scale: f64,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            strength: 0.5,
            scale: 0.5,
        }
    }
}

/// Constants of the alpine composite.  The defaults reproduce the reference
/// terrain; the step order is not configurable.
///
/// Deserialization merges onto [`AlpineProfile::default`] field by field, so
/// `{"base": {"octaves": 7}}` keeps the base layer's own persistence,
/// lacunarity and scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProfileOverrides")]
pub struct AlpineProfile {
    pub warp: WarpParams,
    pub base: FractalParams,
    pub ridges: FractalParams,
    pub large_scale: FractalParams,
    pub detail: FractalParams,
    /// Coordinate multiplier applied before sampling the detail layer.
    pub detail_coord_scale: f64,
    pub detail_amplitude: f64,
    /// How much the ridge blend suppresses the base layer.
    pub base_suppression: f64,
    pub ridge_weight: f64,
    /// Exponent that sharpens peaks after the [0, 1] remap.
    pub peak_exponent: f64,
    /// Heights below this are lifted towards a flat valley floor.
    pub valley_threshold: f64,
    pub valley_compression: f64,
}

impl Default for AlpineProfile {
    fn default() -> Self {
        Self {
            warp: WarpParams {
                strength: 0.4,
                scale: 0.3,
            },
            base: FractalParams::new(5, 0.5, 2.0, 1.5),
            ridges: FractalParams::new(5, 0.5, 2.2, 2.0),
            large_scale: FractalParams::new(3, 0.4, 2.0, 0.4),
            detail: FractalParams::new(3, 0.4, 2.5, 4.0),
            detail_coord_scale: 4.0,
            detail_amplitude: 0.1,
            base_suppression: 0.6,
            ridge_weight: 0.8,
            peak_exponent: 1.3,
            valley_threshold: 0.25,
            valley_compression: 0.7,
        }
    }
}

#[derive(Deserialize)]
struct FractalOverrides {
    octaves: Option<u32>,
    persistence: Option<f64>,
    lacunarity: Option<f64>,
    scale: Option<f64>,
}

impl FractalOverrides {
    fn onto(self, layer: FractalParams) -> FractalParams {
        FractalParams {
            octaves: self.octaves.unwrap_or(layer.octaves),
            persistence: self.persistence.unwrap_or(layer.persistence),
            lacunarity: self.lacunarity.unwrap_or(layer.lacunarity),
            scale: self.scale.unwrap_or(layer.scale),
        }
    }
}

#[derive(Deserialize)]
struct WarpOverrides {
    strength: Option<f64>,
    scale: Option<f64>,
}

#[derive(Deserialize)]
struct ProfileOverrides {
    warp: Option<WarpOverrides>,
    base: Option<FractalOverrides>,
    ridges: Option<FractalOverrides>,
    large_scale: Option<FractalOverrides>,
    detail: Option<FractalOverrides>,
    detail_coord_scale: Option<f64>,
    detail_amplitude: Option<f64>,
    base_suppression: Option<f64>,
    ridge_weight: Option<f64>,
    peak_exponent: Option<f64>,
    valley_threshold: Option<f64>,
    valley_compression: Option<f64>,
}

impl From<ProfileOverrides> for AlpineProfile {
    fn from(o: ProfileOverrides) -> Self {
        let d = AlpineProfile::default();
        let layer = |over: Option<FractalOverrides>, defaults: FractalParams| match over {
            Some(over) => over.onto(defaults),
            None => defaults,
        };
        Self {
            warp: match o.warp {
                Some(w) => WarpParams {
                    strength: w.strength.unwrap_or(d.warp.strength),
                    scale: w.scale.unwrap_or(d.warp.scale),
                },
                None => d.warp,
            },
            base: layer(o.base, d.base),
            ridges: layer(o.ridges, d.ridges),
            large_scale: layer(o.large_scale, d.large_scale),
            detail: layer(o.detail, d.detail),
            detail_coord_scale: o.detail_coord_scale.unwrap_or(d.detail_coord_scale),
            detail_amplitude: o.detail_amplitude.unwrap_or(d.detail_amplitude),
            base_suppression: o.base_suppression.unwrap_or(d.base_suppression),
            ridge_weight: o.ridge_weight.unwrap_or(d.ridge_weight),
            peak_exponent: o.peak_exponent.unwrap_or(d.peak_exponent),
            valley_threshold: o.valley_threshold.unwrap_or(d.valley_threshold),
            valley_compression: o.valley_compression.unwrap_or(d.valley_compression),
        }
    }
}

/// Every intermediate signal of one alpine sample, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AlpineLayers {
    pub warp_x: f64,
    pub warp_y: f64,
    pub base: f64,
    pub ridges: f64,
    pub large_scale: f64,
    pub ridge_blend: f64,
    pub detail: f64,
    pub height: f64,
}

// ── Composer ──────────────────────────────────────────────────────────────────

/// Stateless fractal toolkit over a borrowed noise field.
#[derive(Clone, Copy, Debug)]
pub struct FractalComposer<'a> {
    field: &'a NoiseField,
}

impl<'a> FractalComposer<'a> {
    pub fn new(field: &'a NoiseField) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &'a NoiseField {
        self.field
    }

    /// Fractional Brownian Motion. Sums `octaves` layers of noise with
    /// rising frequency and decaying amplitude, normalised by the amplitude
    /// sum so the result stays in `[-1.0, 1.0]`.
    pub fn fbm(&self, x: f64, y: f64, params: &FractalParams) -> f64 {
        self.accumulate(x, y, params, |n| n)
    }

    /// Ridged noise. Each octave sample is folded as `(1 - |n|)²`, turning
    /// zero crossings into sharp crests.  Returns a value in `[0.0, 1.0]`.
    pub fn ridged_noise(&self, x: f64, y: f64, params: &FractalParams) -> f64 {
        self.accumulate(x, y, params, |n| {
            let r = 1.0 - n.abs();
            r * r
        })
    }

    /// Displaces `(x, y)` by two decorrelated 4-octave fbm samples.
    /// This remaps coordinates; it does not produce a height.
    pub fn domain_warp(&self, x: f64, y: f64, warp: &WarpParams) -> (f64, f64) {
        let (dx, dy) = self.warp_offsets(x, y, warp);
        (x + dx, y + dy)
    }

    /// Height of the alpine terrain at normalised `(x, y)`, in `[0.0, 1.0]`.
    pub fn alpine_height(&self, x: f64, y: f64) -> f64 {
        self.alpine_height_with(x, y, &AlpineProfile::default())
    }

    pub fn alpine_height_with(&self, x: f64, y: f64, profile: &AlpineProfile) -> f64 {
        self.alpine_layers(x, y, profile).height
    }

    /// Runs the alpine composite and keeps every intermediate signal.
    pub fn alpine_layers(&self, x: f64, y: f64, profile: &AlpineProfile) -> AlpineLayers {
        let (warp_x, warp_y) = self.warp_offsets(x, y, &profile.warp);
        let (wx, wy) = (x + warp_x, y + warp_y);

        let base = self.fbm(wx, wy, &profile.base);
        let ridges = self.ridged_noise(wx, wy, &profile.ridges);

        // Ridge placement follows the unwarped coordinates.
        let large_scale = self.fbm(x, y, &profile.large_scale);
        let ridge_blend = (large_scale * 0.5 + 0.5).max(0.0);

        let mut height = base * (1.0 - ridge_blend * profile.base_suppression)
            + ridges * ridge_blend * profile.ridge_weight;

        let detail = self.fbm(
            x * profile.detail_coord_scale,
            y * profile.detail_coord_scale,
            &profile.detail,
        ) * profile.detail_amplitude;
        height += detail;

        height = (height + 1.0) * 0.5;
        // powf is undefined for negative bases.
        height = height.max(0.0).powf(profile.peak_exponent);

        if height < profile.valley_threshold {
            let lift = profile.valley_threshold * (1.0 - profile.valley_compression);
            height = height * profile.valley_compression + lift;
        }

        AlpineLayers {
            warp_x,
            warp_y,
            base,
            ridges,
            large_scale,
            ridge_blend,
            detail,
            height: height.clamp(0.0, 1.0),
        }
    }

    fn warp_offsets(&self, x: f64, y: f64, warp: &WarpParams) -> (f64, f64) {
        let params = FractalParams {
            octaves: WARP_OCTAVES,
            scale: warp.scale,
            ..FractalParams::default()
        };
        let (ox, oy) = WARP_DECORRELATION;
        let qx = self.fbm(x, y, &params);
        let qy = self.fbm(x + ox, y + oy, &params);
        (qx * warp.strength, qy * warp.strength)
    }

    fn accumulate(
        &self,
        x: f64,
        y: f64,
        params: &FractalParams,
        shape: impl Fn(f64) -> f64,
    ) -> f64 {
        let mut value = 0.0f64;
        let mut amplitude = 1.0f64;
        let mut frequency = params.scale;
        let mut max_value = 0.0f64;

        for _ in 0..params.octaves {
            value += shape(self.field.noise(x * frequency, y * frequency)) * amplitude;
            max_value += amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        value / max_value
    }
}
