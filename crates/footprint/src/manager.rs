use std::{path::Path, sync::Arc};

use ndarray::ArrayD;
use crate::{
    error::{FootprintError, Result},
    io::{fits::read_fits, overlay::{save_overlay, OverlayStyle}, wcs::{pixel_scale, WcsOptions}},
    pipeline::{Pipeline, builder::PipelineBuilder},
    types::{Distance, FootprintReport, PixelScale},
};
use serde::{Serialize, Deserialize};
use schemars::JsonSchema;
use strum::{Display, IntoStaticStr, VariantNames};
use tracing::info;

#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params")]
#[strum(serialize_all = "snake_case")]
pub enum FootprintCommand {
    /// Measure length, breadth and diagonal of the loaded image
    #[serde(rename = "measure")]
    Measure {
        #[schemars(range(min = 0.0))]
        distance_mpc: f64,
    },

    /// Measure and render the footprint over the image
    #[serde(rename = "measure_with_overlay")]
    MeasureWithOverlay {
        #[schemars(range(min = 0.0))]
        distance_mpc: f64,
        #[schemars(length(min = 1))]
        output: String,
    },

    /// Measure and export the footprint geometry as GeoJSON
    #[serde(rename = "measure_with_geojson")]
    #[strum(serialize = "measure_with_geojson")]
    MeasureWithGeoJson {
        #[schemars(range(min = 0.0))]
        distance_mpc: f64,
        #[schemars(length(min = 1))]
        output: String,
    },
}

impl FootprintCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FootprintCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Get a description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::Measure { .. } => "Measure length, breadth and smart diagonal in pixels, arcsec and parsecs",
            Self::MeasureWithOverlay { .. } => "Measure and save a PNG with the bounding rectangle and diagonal drawn over the image",
            Self::MeasureWithGeoJson { .. } => "Measure and save the rectangle, diagonal and hull as GeoJSON",
        }
    }

    /// Get parameter requirements for the command
    pub fn parameters_info(&self) -> Vec<(&'static str, &'static str, bool)> {
        let distance = ("distance_mpc", "Distance to the source in megaparsecs (> 0)", true);
        match self {
            Self::Measure { .. } => vec![distance],
            Self::MeasureWithOverlay { .. } => vec![
                distance,
                ("output", "Path of the PNG to write", true),
            ],
            Self::MeasureWithGeoJson { .. } => vec![
                distance,
                ("output", "Path of the GeoJSON file to write", true),
            ],
        }
    }

    pub fn distance_mpc(&self) -> f64 {
        match self {
            Self::Measure { distance_mpc }
            | Self::MeasureWithOverlay { distance_mpc, .. }
            | Self::MeasureWithGeoJson { distance_mpc, .. } => *distance_mpc,
        }
    }
}

/// Holds one loaded image with its pixel scale and runs commands against it
#[derive(Clone)]
pub struct FootprintManager {
    data: Option<ArrayD<f64>>,
    pixel_scale: Option<PixelScale>,
    wcs_options: WcsOptions,
    overlay_style: OverlayStyle,
    pipeline: Arc<Pipeline>,
}

impl FootprintManager {
    pub fn new() -> Self {
        Self::with_pipeline(PipelineBuilder::new().build())
    }

    /// Create a new FootprintManager with a custom pipeline
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            data: None,
            pixel_scale: None,
            wcs_options: WcsOptions::default(),
            overlay_style: OverlayStyle::default(),
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn with_wcs_options(mut self, options: WcsOptions) -> Self {
        self.wcs_options = options;
        self
    }

    pub fn with_overlay_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    /// Load the first image HDU of a FITS file and its pixel scale
    pub fn load_fits(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let fits = read_fits(path)?;
        let scale = pixel_scale(&fits.header, &self.wcs_options)?;
        info!(
            path = %path.display(),
            shape = ?fits.data.shape(),
            x_arcsec = scale.x_arcsec(),
            y_arcsec = scale.y_arcsec(),
            "loaded FITS image"
        );
        self.set_image(fits.data, scale);
        Ok(())
    }

    /// Set the image (2D or 3D) and pixel scale directly
    pub fn set_image(&mut self, data: ArrayD<f64>, scale: PixelScale) {
        self.data = Some(data);
        self.pixel_scale = Some(scale);
    }

    pub fn pixel_scale(&self) -> Option<PixelScale> {
        self.pixel_scale
    }

    pub fn execute(&self, command: &FootprintCommand) -> Result<FootprintReport> {
        let (data, scale) = self
            .data
            .as_ref()
            .zip(self.pixel_scale)
            .ok_or(FootprintError::NoImageLoaded)?;

        let image = self.pipeline.to_image(data.view())?;
        let distance = Distance::from_megaparsecs(command.distance_mpc())?;
        let report = self.pipeline.process_image(image.view(), scale, distance)?;

        match command {
            FootprintCommand::Measure { .. } => {}
            FootprintCommand::MeasureWithOverlay { output, .. } => {
                save_overlay(output, image.view(), &report, &self.overlay_style)?;
                info!(output, "saved overlay");
            }
            FootprintCommand::MeasureWithGeoJson { output, .. } => {
                report.save_geojson(output)?;
                info!(output, "saved GeoJSON");
            }
        }

        Ok(report)
    }
}

impl Default for FootprintManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    fn manager_with(data: ArrayD<f64>) -> FootprintManager {
        let mut manager = FootprintManager::new();
        manager.set_image(data, PixelScale::from_arcsec(1.0, 1.0).expect("scale"));
        manager
    }

    #[test]
    fn test_execute_without_image() {
        let manager = FootprintManager::new();
        let err = manager
            .execute(&FootprintCommand::Measure { distance_mpc: 1.0 })
            .unwrap_err();
        assert!(matches!(err, FootprintError::NoImageLoaded));
    }

    #[test]
    fn test_measure_cube() {
        let mut cube = Array3::<f64>::from_elem((2, 5, 10), f64::NAN);
        cube.index_axis_mut(ndarray::Axis(0), 1).fill(1.0);
        let manager = manager_with(cube.into_dyn());

        let report = manager
            .execute(&FootprintCommand::Measure { distance_mpc: 1.0 })
            .expect("report");
        assert!((report.table.length().pixels - 9.0).abs() < 1e-9);
        assert!((report.table.breadth().pixels - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_distance_is_rejected() {
        let manager = manager_with(Array2::<f64>::ones((3, 3)).into_dyn());
        let err = manager
            .execute(&FootprintCommand::Measure { distance_mpc: 0.0 })
            .unwrap_err();
        assert!(matches!(err, FootprintError::InvalidParameter { name: "distance", .. }));
    }

    #[test]
    fn test_geojson_command_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("footprint.geojson");
        let manager = manager_with(Array2::<f64>::ones((4, 6)).into_dyn());

        manager
            .execute(&FootprintCommand::MeasureWithGeoJson {
                distance_mpc: 3.0,
                output: output.display().to_string(),
            })
            .expect("report");

        let text = std::fs::read_to_string(&output).expect("written");
        let collection: geojson::FeatureCollection = text.parse().expect("valid GeoJSON");
        assert_eq!(collection.features.len(), 3);
    }

    #[test]
    fn test_command_serialization() {
        let command = FootprintCommand::MeasureWithOverlay {
            distance_mpc: 16.5,
            output: "m51.png".to_string(),
        };
        let json = serde_json::to_value(&command).expect("serializes");
        assert_eq!(json["type"], "measure_with_overlay");
        assert_eq!(json["params"]["distance_mpc"], 16.5);

        let parsed: FootprintCommand = serde_json::from_value(json).expect("parses");
        assert_eq!(parsed, command);
        assert_eq!(command.to_string(), "measure_with_overlay");
        assert_eq!(
            FootprintCommand::command_names(),
            &["measure", "measure_with_overlay", "measure_with_geojson"]
        );
    }
}
