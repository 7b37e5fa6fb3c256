//! Export backends: height/slope PNGs, JSON report, diagnostic noise maps and
//! lighting traces.
pub mod json;
pub mod noise_maps;
pub mod png;

use thiserror::Error;

pub use json::{LandscapeReport, LightingFrame, export_json, export_lighting_trace};
pub use noise_maps::export_noise_maps;
pub use png::{export_height_png, export_slope_png};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("height field is empty")]
    EmptyField,
}
