use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::AbortHandle;

use floodaware_common::ids::AttemptId;
use floodaware_common::types::{
    AnalysisMode, AssessmentRecord, CoordinateInput, RiskAssessment, SelectedImage,
    SelectedImageInfo,
};
use floodaware_common::validation::ValidationError;

use crate::client::AnalysisError;

/// Transient state of one flood-detection page.
///
/// Created on mount, dropped on unmount. A new result replaces the previous
/// one wholesale; nothing accumulates.
#[derive(Debug, Default)]
pub struct SubmissionState {
    pub mode: AnalysisMode,
    /// Last coordinate text the user submitted, echoed back into the form.
    pub coordinate_input: CoordinateInput,
    pub selected_image: Option<SelectedImage>,
    pub last_result: Option<AssessmentRecord>,
    pub last_error: Option<String>,
    pending: Option<PendingAttempt>,
    unmounted: bool,
}

/// The single in-flight request of a page.
#[derive(Debug)]
pub struct PendingAttempt {
    pub id: AttemptId,
    pub mode: AnalysisMode,
    pub started_at: DateTime<Utc>,
    abort: Option<AbortHandle>,
}

/// What became of an attempt's outcome once it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Succeeded,
    Failed,
    /// The attempt is no longer pending (aborted or unmounted).
    Stale,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    pub fn pending(&self) -> Option<&PendingAttempt> {
        self.pending.as_ref()
    }

    /// Switch input panel. A real switch drops the selected image.
    /// Returns whether the mode changed.
    pub fn select_mode(&mut self, mode: AnalysisMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.selected_image = None;
        true
    }

    pub fn reject(&mut self, error: &ValidationError) {
        self.last_error = Some(error.to_string());
    }

    /// Enter the Submitting phase. Clears the previous error but keeps the
    /// previous result until a new one arrives.
    pub fn begin_attempt(&mut self, mode: AnalysisMode) -> AttemptId {
        let id = AttemptId::new();
        self.last_error = None;
        self.pending = Some(PendingAttempt {
            id,
            mode,
            started_at: Utc::now(),
            abort: None,
        });
        id
    }

    /// Attach the task handle so unmount can abort the attempt.
    pub fn attach_abort(&mut self, id: AttemptId, handle: AbortHandle) {
        match self.pending.as_mut() {
            Some(pending) if pending.id == id => pending.abort = Some(handle),
            _ => handle.abort(),
        }
    }

    /// Apply the outcome of attempt `id`. Outcomes of attempts that are no
    /// longer pending are discarded.
    pub fn finish_attempt(
        &mut self,
        id: AttemptId,
        outcome: Result<RiskAssessment, AnalysisError>,
    ) -> Applied {
        let mode = match self.pending.as_ref() {
            Some(pending) if pending.id == id => pending.mode,
            _ => return Applied::Stale,
        };
        self.pending = None;

        match outcome {
            Ok(assessment) => {
                self.last_result = Some(AssessmentRecord {
                    assessment,
                    mode,
                    completed_at: Utc::now(),
                });
                self.last_error = None;
                Applied::Succeeded
            }
            Err(_) => {
                self.last_error = Some(request_failure_message(mode).to_string());
                Applied::Failed
            }
        }
    }

    /// Abort and forget the in-flight attempt, if any.
    pub fn cancel_pending(&mut self) -> Option<AttemptId> {
        let pending = self.pending.take()?;
        if let Some(handle) = pending.abort {
            handle.abort();
        }
        Some(pending.id)
    }

    /// Final transition: abort the in-flight attempt and refuse new ones.
    pub fn unmount(&mut self) -> Option<AttemptId> {
        self.unmounted = true;
        self.cancel_pending()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot {
            mode: self.mode,
            coordinate_input: self.coordinate_input.clone(),
            selected_image: self.selected_image.as_ref().map(SelectedImage::info),
            is_loading: self.is_loading(),
            pending_mode: self.pending.as_ref().map(|p| p.mode),
            last_result: self.last_result.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Coarse user-facing message for any request failure.
pub fn request_failure_message(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::Coordinates => {
            "Error analyzing coordinates. Please check if the backend server is running."
        }
        AnalysisMode::Image => {
            "Error analyzing image. Please check if the backend server is running."
        }
    }
}

/// Read-only copy of a page's state for rendering and the JSON state route.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSnapshot {
    pub mode: AnalysisMode,
    pub coordinate_input: CoordinateInput,
    pub selected_image: Option<SelectedImageInfo>,
    pub is_loading: bool,
    pub pending_mode: Option<AnalysisMode>,
    pub last_result: Option<AssessmentRecord>,
    pub last_error: Option<String>,
}
