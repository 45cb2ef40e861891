use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::analyze::AnalysisResponse;
use crate::types::AnalysisMode;

/// Ordinal flood danger classification returned by the analysis service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    /// Display label, identical to the backend's canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    /// Parse a backend label. Case-insensitive; "Very High" may use `_` or `-`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");
        match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "very high" => Some(Self::VeryHigh),
            _ => None,
        }
    }

    pub fn severity(&self) -> RiskSeverity {
        match self {
            Self::High | Self::VeryHigh => RiskSeverity::Severe,
            Self::Medium => RiskSeverity::Elevated,
            Self::Low => RiskSeverity::Minimal,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual severity class of a risk badge. High and Very High share one class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Minimal,
    Elevated,
    Severe,
}

impl RiskSeverity {
    /// Badge variant name used by the stylesheet.
    pub fn badge_variant(&self) -> &'static str {
        match self {
            Self::Minimal => "default",
            Self::Elevated => "secondary",
            Self::Severe => "destructive",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Minimal => "\u{2714}",
            Self::Elevated => "\u{2139}",
            Self::Severe => "\u{26A0}",
        }
    }
}

/// A flood risk assessment as displayed to the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub description: String,
    pub recommendations: Vec<String>,
    /// Meters.
    pub elevation: f64,
    /// Meters.
    pub distance_from_water: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_bodies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk level: {0:?}")]
pub struct UnknownRiskLevel(pub String);

impl TryFrom<AnalysisResponse> for RiskAssessment {
    type Error = UnknownRiskLevel;

    fn try_from(resp: AnalysisResponse) -> Result<Self, Self::Error> {
        let risk_level =
            RiskLevel::from_label(&resp.risk_level).ok_or(UnknownRiskLevel(resp.risk_level))?;

        Ok(Self {
            risk_level,
            description: resp.description,
            recommendations: resp.recommendations,
            elevation: resp.elevation,
            distance_from_water: resp.distance_from_water,
            location_info: non_blank(resp.location_info),
            water_bodies: non_blank(resp.water_bodies),
            ai_analysis: non_blank(resp.ai_analysis),
        })
    }
}

// Empty optional text is "not shown", same as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// The last successful result of a page, with where it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub assessment: RiskAssessment,
    pub mode: AnalysisMode,
    pub completed_at: DateTime<Utc>,
}
