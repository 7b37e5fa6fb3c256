/// Height-field generation over a centred terrain grid.
///
/// Generation is a round trip through a [`GeometryEngine`]:
///  - heights are sampled from the alpine composite at every grid vertex,
///  - the engine displaces its vertices by `height × height_scale`,
///  - the engine recomputes normals on the displaced surface,
///  - slope is derived per vertex as `1 - |normal.y|`.
use std::time::Instant;

use glam::Vec3;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fractal::{AlpineProfile, FractalComposer};
use crate::noise::NoiseField;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("geometry has {actual} vertices, expected {expected} for a {segments}-segment grid")]
    VertexCountMismatch {
        expected: usize,
        actual: usize,
        segments: u32,
    },
    #[error("geometry returned {normals} normals for {vertices} vertices")]
    NormalCountMismatch { vertices: usize, normals: usize },
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Extent along world X.
    pub width: f32,
    /// Extent along world Z.
    pub depth: f32,
    /// Grid cells per side; the grid has `segments + 1` vertices per side.
    pub segments: u32,
    /// World-space height of a normalised height of 1.0.
    pub height_scale: f32,
    pub profile: AlpineProfile,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            depth: 200.0,
            segments: 256,
            height_scale: 40.0,
            profile: AlpineProfile::default(),
        }
    }
}

impl TerrainConfig {
    pub fn vertices_per_side(&self) -> usize {
        self.segments as usize + 1
    }
}

// ── Geometry collaborator ─────────────────────────────────────────────────────

/// Mesh side of the generation round trip.
pub trait GeometryEngine {
    /// Undisplaced vertex positions; only `x` and `z` are read.
    fn vertex_positions(&self) -> &[Vec3];

    /// Sets each vertex's `y` to the matching displacement.
    fn displace(&mut self, displacements: &[f32]);

    /// Recomputes per-vertex normals on the displaced surface.
    fn recompute_normals(&mut self) -> &[Vec3];
}

/// CPU plane grid in the XZ plane, centred on the origin.
///
/// Vertices are row-major: `index = row * (segments + 1) + col`, with rows
/// advancing along +Z and columns along +X.
#[derive(Clone, Debug)]
pub struct PlaneGrid {
    segments: u32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl PlaneGrid {
    pub fn new(width: f32, depth: f32, segments: u32) -> Self {
        let segments = segments.max(1);
        let side = segments as usize + 1;
        let mut positions = Vec::with_capacity(side * side);
        for row in 0..side {
            let z = -depth / 2.0 + depth * row as f32 / segments as f32;
            for col in 0..side {
                let x = -width / 2.0 + width * col as f32 / segments as f32;
                positions.push(Vec3::new(x, 0.0, z));
            }
        }

        let mut indices = Vec::with_capacity(segments as usize * segments as usize * 6);
        let side = side as u32;
        for row in 0..segments {
            for col in 0..segments {
                let a = row * side + col;
                let b = a + side;
                let c = a + 1;
                let d = b + 1;
                // Winding keeps face normals pointing up (+Y) on a flat grid.
                indices.extend_from_slice(&[a, b, c, c, b, d]);
            }
        }

        let normals = vec![Vec3::Y; positions.len()];
        Self {
            segments,
            positions,
            normals,
            indices,
        }
    }

    pub fn from_config(config: &TerrainConfig) -> Self {
        Self::new(config.width, config.depth, config.segments)
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

impl GeometryEngine for PlaneGrid {
    fn vertex_positions(&self) -> &[Vec3] {
        &self.positions
    }

    fn displace(&mut self, displacements: &[f32]) {
        for (p, &y) in self.positions.iter_mut().zip(displacements) {
            p.y = y;
        }
    }

    /// Area-weighted vertex normals: each vertex sums the unnormalised
    /// normals of the triangles that touch it.
    fn recompute_normals(&mut self) -> &[Vec3] {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let v0 = self.positions[i0];
            let n = (self.positions[i1] - v0).cross(self.positions[i2] - v0);
            acc[i0] += n;
            acc[i1] += n;
            acc[i2] += n;
        }
        for (normal, sum) in self.normals.iter_mut().zip(acc) {
            let n = sum.normalize_or_zero();
            *normal = if n == Vec3::ZERO { Vec3::Y } else { n };
        }
        &self.normals
    }
}

// ── Height field ──────────────────────────────────────────────────────────────

/// Generated per-vertex heights (normalised, `[0, 1]`) and slopes (`[0, 1]`,
/// 0 = flat, 1 = vertical), row-major like [`PlaneGrid`].
#[derive(Clone, Debug, Serialize)]
pub struct HeightField {
    pub columns: usize,
    pub rows: usize,
    pub height_scale: f32,
    pub heights: Vec<f32>,
    pub slopes: Vec<f32>,
}

impl HeightField {
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.columns && row < self.rows).then(|| row * self.columns + col)
    }

    pub fn height(&self, col: usize, row: usize) -> Option<f32> {
        self.index(col, row).map(|i| self.heights[i])
    }

    pub fn slope(&self, col: usize, row: usize) -> Option<f32> {
        self.index(col, row).map(|i| self.slopes[i])
    }

    /// Returns `(min, max)` of the normalised heights.
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    pub fn mean_slope(&self) -> f32 {
        if self.slopes.is_empty() {
            return 0.0;
        }
        self.slopes.iter().sum::<f32>() / self.slopes.len() as f32
    }
}

// ── Generator ─────────────────────────────────────────────────────────────────

pub struct HeightFieldGenerator {
    config: TerrainConfig,
    field: NoiseField,
}

impl HeightFieldGenerator {
    pub fn new(config: TerrainConfig, seed: u32) -> Self {
        Self {
            config,
            field: NoiseField::new(seed),
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn noise_field(&self) -> &NoiseField {
        &self.field
    }

    pub fn composer(&self) -> FractalComposer<'_> {
        FractalComposer::new(&self.field)
    }

    /// Maps world `(x, z)` onto the unit square covered by the terrain.
    pub fn normalize(&self, world_x: f32, world_z: f32) -> (f64, f64) {
        let nx = (world_x as f64 + self.config.width as f64 / 2.0) / self.config.width as f64;
        let nz = (world_z as f64 + self.config.depth as f64 / 2.0) / self.config.depth as f64;
        (nx, nz)
    }

    /// Samples every grid vertex, displaces `geometry` and derives slopes
    /// from the normals it recomputes.
    pub fn generate<G: GeometryEngine + ?Sized>(
        &self,
        geometry: &mut G,
    ) -> Result<HeightField, TerrainError> {
        let started = Instant::now();
        let side = self.config.vertices_per_side();
        let expected = side * side;
        let actual = geometry.vertex_positions().len();
        if actual != expected {
            return Err(TerrainError::VertexCountMismatch {
                expected,
                actual,
                segments: self.config.segments,
            });
        }

        let composer = self.composer();
        let profile = &self.config.profile;
        let heights: Vec<f32> = geometry
            .vertex_positions()
            .par_iter()
            .map(|p| {
                let (nx, nz) = self.normalize(p.x, p.z);
                composer.alpine_height_with(nx, nz, profile) as f32
            })
            .collect();

        let displacements: Vec<f32> = heights
            .iter()
            .map(|h| h * self.config.height_scale)
            .collect();
        geometry.displace(&displacements);

        let normals = geometry.recompute_normals();
        if normals.len() != heights.len() {
            return Err(TerrainError::NormalCountMismatch {
                vertices: heights.len(),
                normals: normals.len(),
            });
        }
        let slopes: Vec<f32> = normals
            .iter()
            .map(|n| (1.0 - n.y.abs()).clamp(0.0, 1.0))
            .collect();

        let field = HeightField {
            columns: side,
            rows: side,
            height_scale: self.config.height_scale,
            heights,
            slopes,
        };
        let (min, max) = field.height_range();
        info!(
            "height field: {} vertices (seed {}), height [{min:.3}, {max:.3}], mean slope {:.3}, {:.2?}",
            field.len(),
            self.field.seed(),
            field.mean_slope(),
            started.elapsed()
        );
        Ok(field)
    }

    /// World-space height at `(world_x, world_z)`, recomputed from noise.
    ///
    /// Returns exactly `0.0` when the point lies off the terrain, which
    /// callers must not confuse with a real low reading.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        let (nx, nz) = self.normalize(world_x, world_z);
        if !(0.0..=1.0).contains(&nx) || !(0.0..=1.0).contains(&nz) {
            return 0.0;
        }
        let h = self.composer().alpine_height_with(nx, nz, &self.config.profile);
        h as f32 * self.config.height_scale
    }
}
