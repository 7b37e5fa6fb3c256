use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use super::ExportError;
use crate::lighting::LightingState;
use crate::terrain::{HeightField, TerrainConfig};

/// Everything needed to rebuild the terrain mesh outside this crate.
#[derive(Serialize)]
pub struct LandscapeReport<'a> {
    pub seed: u32,
    pub terrain: &'a TerrainConfig,
    pub min_height: f32,
    pub max_height: f32,
    pub mean_slope: f32,
    pub field: &'a HeightField,
}

impl<'a> LandscapeReport<'a> {
    pub fn new(seed: u32, terrain: &'a TerrainConfig, field: &'a HeightField) -> Self {
        let (min_height, max_height) = field.height_range();
        Self {
            seed,
            terrain,
            min_height,
            max_height,
            mean_slope: field.mean_slope(),
            field,
        }
    }
}

/// One pushed lighting frame of a simulated run.
#[derive(Clone, Debug, Serialize)]
pub struct LightingFrame {
    pub time: f32,
    /// Day (0) to night (1) blend position.
    pub value: f32,
    pub state: LightingState,
}

fn write_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    info!("wrote {}", path.display());
    Ok(())
}

pub fn export_json(report: &LandscapeReport<'_>, path: &Path) -> Result<(), ExportError> {
    write_pretty(report, path)
}

pub fn export_lighting_trace(frames: &[LightingFrame], path: &Path) -> Result<(), ExportError> {
    write_pretty(frames, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn report_carries_summary_and_field() {
        let field = HeightField {
            columns: 2,
            rows: 2,
            height_scale: 4.0,
            heights: vec![0.1, 0.4, 0.9, 0.2],
            slopes: vec![0.0, 0.5, 0.5, 1.0],
        };
        let terrain = TerrainConfig::default();
        let dir = tempdir().unwrap();
        let path = dir.path().join("landscape.json");
        export_json(&LandscapeReport::new(3, &terrain, &field), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["seed"], 3);
        assert_eq!(value["field"]["columns"], 2);
        assert_eq!(value["field"]["heights"].as_array().unwrap().len(), 4);
        assert!((value["max_height"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert!((value["mean_slope"].as_f64().unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(value["terrain"]["segments"], 256);
    }

    #[test]
    fn lighting_trace_is_an_array_of_frames() {
        let frames = vec![
            LightingFrame {
                time: 0.0,
                value: 0.0,
                state: LightingState::day(),
            },
            LightingFrame {
                time: 2.5,
                value: 1.0,
                state: LightingState::night(),
            },
        ];
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.json");
        export_lighting_trace(&frames, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert!((arr[1]["state"]["sun_intensity"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(arr[0]["state"]["sun_position"].as_array().unwrap().len(), 3);
    }
}
