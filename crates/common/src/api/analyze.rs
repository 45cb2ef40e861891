use serde::{Deserialize, Serialize};

/// Coordinate analysis endpoint, relative to the backend base URL.
pub const COORDINATES_PATH: &str = "/api/analyze/coordinates";

/// Image analysis endpoint, relative to the backend base URL.
pub const IMAGE_PATH: &str = "/api/analyze/image";

/// Multipart field that carries the uploaded image.
pub const IMAGE_FIELD: &str = "file";

/// POST /api/analyze/coordinates request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// Response body shared by both analysis endpoints.
///
/// `risk_level` is kept as the raw string here. Conversion into
/// [`crate::types::RiskAssessment`] is where unknown levels are rejected.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub risk_level: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Meters above sea level.
    pub elevation: f64,
    /// Meters to the nearest water body.
    pub distance_from_water: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_bodies: Option<String>,
    /// Free-text narrative produced by the backend model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}
