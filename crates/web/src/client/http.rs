use floodaware_common::api::analyze::{AnalysisResponse, CoordinatesRequest, IMAGE_FIELD};
use floodaware_common::types::SelectedImage;
use reqwest::multipart::{Form, Part};

use super::AnalysisError;

/// POST the coordinates as JSON.
pub async fn post_coordinates(
    http: &reqwest::Client,
    url: &str,
    request: &CoordinatesRequest,
) -> Result<AnalysisResponse, AnalysisError> {
    let response = http
        .post(url)
        .json(request)
        .send()
        .await
        .map_err(|e| AnalysisError::Http(e.to_string()))?;

    read_analysis(response).await
}

/// POST the image as a single-part multipart body.
pub async fn post_image(
    http: &reqwest::Client,
    url: &str,
    image: SelectedImage,
) -> Result<AnalysisResponse, AnalysisError> {
    let part = Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(image.content_type.as_mime())
        .map_err(|e| AnalysisError::Http(e.to_string()))?;

    let form = Form::new().part(IMAGE_FIELD, part);

    let response = http
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| AnalysisError::Http(e.to_string()))?;

    read_analysis(response).await
}

// Any non-2xx status is a failure; the error body is not inspected.
async fn read_analysis(response: reqwest::Response) -> Result<AnalysisResponse, AnalysisError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AnalysisError::Status(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| AnalysisError::Http(e.to_string()))?;

    serde_json::from_slice(&body).map_err(|e| AnalysisError::Parse(e.to_string()))
}
