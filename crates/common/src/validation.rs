//! Input validation performed before any request leaves the page.
//!
//! Every check here is local and recoverable: the user edits the input and
//! tries again. The `Display` text of [`ValidationError`] is the message shown
//! in the error dialog.

use std::ops::RangeInclusive;

use crate::types::{CoordinateInput, Coordinates, ImageContentType};

/// Largest image accepted for analysis (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

const COORDINATE_GUIDANCE: &str =
    "Please enter valid coordinates (Lat: -90 to 90, Lng: -180 to 180)";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter both latitude and longitude")]
    MissingCoordinates,

    #[error("{}", COORDINATE_GUIDANCE)]
    InvalidCoordinates,

    #[error("{}", COORDINATE_GUIDANCE)]
    OutOfRange { latitude: f64, longitude: f64 },

    #[error("Image size must be less than {}", size_label(*.limit))]
    ImageTooLarge { size: u64, limit: u64 },

    #[error("Invalid image format. Allowed formats are: {}", allowed_formats())]
    UnsupportedImageType { content_type: String },

    #[error("Please select an image first")]
    NoImageSelected,
}

impl ValidationError {
    /// Stable short code, used as a metrics label and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCoordinates => "missing coordinates",
            Self::InvalidCoordinates => "invalid coordinates",
            Self::OutOfRange { .. } => "out of range",
            Self::ImageTooLarge { .. } => "too large",
            Self::UnsupportedImageType { .. } => "unsupported type",
            Self::NoImageSelected => "no image selected",
        }
    }
}

/// Human size for a byte limit: whole megabytes as "10MB", otherwise whole
/// kilobytes (rounded up) as "512KB", and bytes below one kilobyte.
pub fn size_label(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{}KB", bytes.div_ceil(KIB))
    } else {
        format!("{} bytes", bytes)
    }
}

fn allowed_formats() -> String {
    ImageContentType::ALL
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate raw coordinate text. Checks run in order: presence, number
/// syntax, range.
pub fn validate_coordinates(input: &CoordinateInput) -> Result<Coordinates, ValidationError> {
    let lat_text = input.latitude.trim();
    let lng_text = input.longitude.trim();

    if lat_text.is_empty() || lng_text.is_empty() {
        return Err(ValidationError::MissingCoordinates);
    }

    let (Some(latitude), Some(longitude)) = (parse_finite(lat_text), parse_finite(lng_text))
    else {
        return Err(ValidationError::InvalidCoordinates);
    };

    if !LATITUDE_RANGE.contains(&latitude) || !LONGITUDE_RANGE.contains(&longitude) {
        return Err(ValidationError::OutOfRange {
            latitude,
            longitude,
        });
    }

    Ok(Coordinates {
        latitude,
        longitude,
    })
}

// "inf" and "NaN" parse as f64 but are not coordinates.
fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validate a candidate image by its declared size and content type.
/// Size is checked first.
pub fn validate_image(
    declared_size: u64,
    declared_content_type: &str,
    max_bytes: u64,
) -> Result<ImageContentType, ValidationError> {
    if declared_size > max_bytes {
        return Err(ValidationError::ImageTooLarge {
            size: declared_size,
            limit: max_bytes,
        });
    }

    ImageContentType::from_mime(declared_content_type).ok_or_else(|| {
        ValidationError::UnsupportedImageType {
            content_type: declared_content_type.to_string(),
        }
    })
}
