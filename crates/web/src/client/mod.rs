mod http;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use floodaware_common::api::analyze::{CoordinatesRequest, COORDINATES_PATH, IMAGE_PATH};
use floodaware_common::config::BackendConfig;
use floodaware_common::types::{RiskAssessment, SelectedImage};
use floodaware_common::FloodAwareError;

/// HTTP client for the external flood analysis service.
///
/// Sends exactly one request per call and never retries.
pub struct AnalysisClient {
    http: reqwest::Client,
    coordinates_url: String,
    image_url: String,
}

/// Errors from analysis calls. All of them are request failures from the
/// user's point of view; the variant only matters for logs and metrics.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis HTTP error: {0}")]
    Http(String),

    #[error("analysis service returned status {0}")]
    Status(u16),

    #[error("analysis response parse error: {0}")]
    Parse(String),

    #[error("analysis request timed out after {0:?}")]
    Timeout(Duration),
}

impl AnalysisError {
    /// Short label for the `cause` metrics dimension.
    pub fn cause(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Status(code) if *code >= 500 => "server_error",
            Self::Status(_) => "client_error",
            Self::Parse(_) => "parse",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl AnalysisClient {
    /// Build a client for the configured backend.
    pub fn new(config: &BackendConfig) -> Result<Self, FloodAwareError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FloodAwareError::Config(format!("HTTP client: {}", e)))?;

        Self::with_http(http, &config.base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, FloodAwareError> {
        Ok(Self {
            http,
            coordinates_url: join_base_path(base_url, COORDINATES_PATH)?,
            image_url: join_base_path(base_url, IMAGE_PATH)?,
        })
    }

    pub async fn analyze_coordinates(
        &self,
        request: &CoordinatesRequest,
    ) -> Result<RiskAssessment, AnalysisError> {
        let start = std::time::Instant::now();
        let result = http::post_coordinates(&self.http, &self.coordinates_url, request).await;
        metrics::histogram!("analysis.backend.latency", "mode" => "coordinates")
            .record(start.elapsed().as_secs_f64());
        into_assessment(result?)
    }

    pub async fn analyze_image(&self, image: SelectedImage) -> Result<RiskAssessment, AnalysisError> {
        let start = std::time::Instant::now();
        let result = http::post_image(&self.http, &self.image_url, image).await;
        metrics::histogram!("analysis.backend.latency", "mode" => "image")
            .record(start.elapsed().as_secs_f64());
        into_assessment(result?)
    }
}

fn into_assessment(
    response: floodaware_common::api::analyze::AnalysisResponse,
) -> Result<RiskAssessment, AnalysisError> {
    RiskAssessment::try_from(response).map_err(|e| AnalysisError::Parse(e.to_string()))
}

/// Join a base URL and an absolute endpoint path with exactly one slash between.
pub fn join_base_path(base: &str, path: &str) -> Result<String, FloodAwareError> {
    if base.trim().is_empty() {
        return Err(FloodAwareError::Config("backend base_url is empty".into()));
    }
    let normalized_base = base.trim().trim_end_matches('/');
    let normalized_path = path.trim_start_matches('/');
    Ok(format!("{}/{}", normalized_base, normalized_path))
}

/// Object-safe trait for testability (dyn dispatch).
/// Tests provide a scripted caller; production uses AnalysisClient.
pub trait AnalysisCaller: Send + Sync {
    fn analyze_coordinates<'a>(
        &'a self,
        request: CoordinatesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RiskAssessment, AnalysisError>> + Send + 'a>>;

    fn analyze_image<'a>(
        &'a self,
        image: SelectedImage,
    ) -> Pin<Box<dyn Future<Output = Result<RiskAssessment, AnalysisError>> + Send + 'a>>;
}

impl AnalysisCaller for AnalysisClient {
    fn analyze_coordinates<'a>(
        &'a self,
        request: CoordinatesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RiskAssessment, AnalysisError>> + Send + 'a>> {
        Box::pin(async move { AnalysisClient::analyze_coordinates(self, &request).await })
    }

    fn analyze_image<'a>(
        &'a self,
        image: SelectedImage,
    ) -> Pin<Box<dyn Future<Output = Result<RiskAssessment, AnalysisError>> + Send + 'a>> {
        Box::pin(AnalysisClient::analyze_image(self, image))
    }
}
