use geojson::{Feature, FeatureCollection, Geometry, Value};
use crate::{
    error::Result,
    types::{FootprintReport, MeasurementTable, Point},
};

fn position(p: &Point) -> Vec<f64> {
    vec![p.x, p.y]
}

fn closed_ring(points: &[Point]) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = points.iter().map(position).collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn feature(id: &str, geometry: Value, properties: serde_json::Map<String, serde_json::Value>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: Some(geojson::feature::Id::String(id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn measurement_properties(table: &MeasurementTable) -> serde_json::Map<String, serde_json::Value> {
    let mut properties = serde_json::Map::new();
    for row in &table.rows {
        let name = <&'static str>::from(row.quantity).to_lowercase();
        properties.insert(format!("{name}_pixels"), number(row.pixels));
        properties.insert(format!("{name}_arcsec"), number(row.angular_arcsec));
        properties.insert(format!("{name}_pc"), number(row.physical_pc));
    }
    properties
}

impl FootprintReport {
    /// Export the rectangle, diagonal and hull as GeoJSON in pixel coordinates
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut footprint_properties = measurement_properties(&self.table);
        footprint_properties.insert("angle_rad".to_string(), number(self.rectangle.angle));
        footprint_properties.insert("area_pixels".to_string(), number(self.rectangle.area));
        footprint_properties.insert(
            "edge_index".to_string(),
            serde_json::Value::from(self.rectangle.edge_index),
        );

        let mut diagonal_properties = serde_json::Map::new();
        diagonal_properties.insert("length_pixels".to_string(), number(self.diameter.length));

        let mut hull_properties = serde_json::Map::new();
        hull_properties.insert("vertex_count".to_string(), serde_json::Value::from(self.hull.len()));
        hull_properties.insert("area_pixels".to_string(), number(self.hull.area()));

        let features = vec![
            feature(
                "footprint",
                Value::Polygon(vec![closed_ring(&self.rectangle.corners)]),
                footprint_properties,
            ),
            feature(
                "diagonal",
                Value::LineString(self.diameter.endpoints.iter().map(position).collect()),
                diagonal_properties,
            ),
            feature(
                "hull",
                Value::Polygon(vec![closed_ring(self.hull.vertices())]),
                hull_properties,
            ),
        ];

        let mut foreign_members = serde_json::Map::new();
        foreign_members.insert("image_width".to_string(), serde_json::Value::from(self.image_width));
        foreign_members.insert("image_height".to_string(), serde_json::Value::from(self.image_height));
        foreign_members.insert("valid_pixels".to_string(), serde_json::Value::from(self.valid_pixels));
        foreign_members.insert("distance_mpc".to_string(), number(self.distance.megaparsecs()));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }
}
