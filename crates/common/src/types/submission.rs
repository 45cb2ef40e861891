use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::analyze::CoordinatesRequest;

/// The two mutually exclusive ways to ask for an assessment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Coordinates,
    Image,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coordinates => "coordinates",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "coordinates" => Ok(Self::Coordinates),
            "image" => Ok(Self::Image),
            other => Err(format!("unknown analysis mode: {}", other)),
        }
    }
}

/// Raw latitude/longitude text exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateInput {
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
}

impl CoordinateInput {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

/// Validated coordinates, both finite and in range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinates> for CoordinatesRequest {
    fn from(c: Coordinates) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

/// Image content types the analysis service accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageContentType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/jpg")]
    Jpg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/gif")]
    Gif,
}

impl ImageContentType {
    pub const ALL: [ImageContentType; 4] = [Self::Jpeg, Self::Jpg, Self::Png, Self::Gif];

    /// Match a declared MIME type. Parameters after `;` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_mime() == essence)
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Jpg => "image/jpg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    /// Short upper-case label, e.g. "PNG".
    pub fn label(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Jpg => "JPG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
        }
    }
}

/// An image accepted by validation and held in memory until submitted or removed.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub file_name: String,
    pub content_type: ImageContentType,
    pub bytes: Vec<u8>,
}

impl SelectedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn info(&self) -> SelectedImageInfo {
        SelectedImageInfo {
            file_name: self.file_name.clone(),
            content_type: self.content_type,
            size: self.size(),
        }
    }
}

impl fmt::Debug for SelectedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Metadata of the selected image, without the bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedImageInfo {
    pub file_name: String,
    pub content_type: ImageContentType,
    pub size: u64,
}
