//! Risk submission flow: validation, the single in-flight analysis request,
//! and mapping its outcome into page state.
//!
//! Per attempt: `Idle -> Validating -> (rejected -> Idle) | Submitting ->
//! (succeeded | failed) -> Idle`. Submitting while an attempt is pending is a
//! no-op. Each attempt runs as its own tokio task under a timeout and is
//! aborted when the page unmounts.

pub mod state;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::watch;

use floodaware_common::api::analyze::CoordinatesRequest;
use floodaware_common::ids::{AttemptId, PageId};
use floodaware_common::types::{
    AnalysisMode, CoordinateInput, ImageContentType, RiskAssessment, SelectedImage,
    SelectedImageInfo,
};
use floodaware_common::validation::{self, ValidationError};

use crate::client::{AnalysisCaller, AnalysisError};

pub use state::{request_failure_message, Applied, SubmissionSnapshot, SubmissionState};

/// Per-page limits for the flow.
#[derive(Clone, Debug)]
pub struct FlowSettings {
    pub request_timeout: Duration,
    pub max_image_bytes: u64,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_image_bytes: validation::MAX_IMAGE_BYTES,
        }
    }
}

/// Result of asking for a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The request was sent; the attempt runs in the background.
    Started(AttemptId),
    /// Input failed validation. No request was sent.
    Rejected(ValidationError),
    /// An attempt is already pending (or the page is gone). Nothing changed.
    Ignored,
}

struct Shared {
    /// Guards the page state. Uses std::sync::Mutex because it is never
    /// held across await points.
    state: Mutex<SubmissionState>,
    /// Mirrors `state.is_loading()` so callers can await the end of an attempt.
    loading_tx: watch::Sender<bool>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SubmissionState> {
        // Every transition leaves the state consistent, so poisoning is ignored.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// State container and controller for one mounted flood-detection page.
pub struct SubmissionFlow {
    page_id: PageId,
    shared: Arc<Shared>,
    caller: Arc<dyn AnalysisCaller>,
    settings: FlowSettings,
}

impl SubmissionFlow {
    pub fn new(page_id: PageId, caller: Arc<dyn AnalysisCaller>, settings: FlowSettings) -> Self {
        let (loading_tx, _) = watch::channel(false);
        Self {
            page_id,
            shared: Arc::new(Shared {
                state: Mutex::new(SubmissionState::new()),
                loading_tx,
            }),
            caller,
            settings,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn snapshot(&self) -> SubmissionSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.lock().is_loading()
    }

    pub fn select_mode(&self, mode: AnalysisMode) {
        if self.shared.lock().select_mode(mode) {
            tracing::debug!(page_id = %self.page_id, mode = %mode, "Analysis mode selected");
        }
    }

    /// Validate the coordinate text and, if valid, send it for analysis.
    pub fn submit_coordinates(&self, input: CoordinateInput) -> SubmitOutcome {
        let mut state = self.shared.lock();
        if state.is_loading() || state.is_unmounted() {
            tracing::debug!(page_id = %self.page_id, "Submission ignored, attempt in flight");
            return SubmitOutcome::Ignored;
        }

        state.coordinate_input = input;
        let coordinates = match validation::validate_coordinates(&state.coordinate_input) {
            Ok(c) => c,
            Err(e) => return self.reject(&mut state, e),
        };

        let request = CoordinatesRequest::from(coordinates);
        let caller = Arc::clone(&self.caller);
        self.start_attempt(&mut state, AnalysisMode::Coordinates, async move {
            caller.analyze_coordinates(request).await
        })
    }

    /// Validate a candidate image and hold it for a later [`Self::submit_image`].
    /// On failure any previously selected image is kept.
    pub fn select_image(
        &self,
        file_name: impl Into<String>,
        declared_content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<SelectedImageInfo, ValidationError> {
        let checked = validation::validate_image(
            bytes.len() as u64,
            declared_content_type,
            self.settings.max_image_bytes,
        );

        let mut state = self.shared.lock();
        match checked {
            Ok(content_type) => {
                let image = SelectedImage {
                    file_name: file_name.into(),
                    content_type,
                    bytes,
                };
                let info = image.info();
                tracing::debug!(
                    page_id = %self.page_id,
                    file_name = %info.file_name,
                    size = info.size,
                    "Image selected"
                );
                state.selected_image = Some(image);
                Ok(info)
            }
            Err(e) => {
                self.record_rejection(&mut state, &e);
                Err(e)
            }
        }
    }

    /// Record an image refused by size before its bytes were kept. Any
    /// previously selected image is kept.
    pub fn reject_image_size(&self, size: u64) -> ValidationError {
        let error = ValidationError::ImageTooLarge {
            size,
            limit: self.settings.max_image_bytes,
        };
        let mut state = self.shared.lock();
        self.record_rejection(&mut state, &error);
        error
    }

    pub fn remove_image(&self) {
        self.shared.lock().selected_image = None;
    }

    /// Bytes and type of the selected image, for the local preview.
    pub fn image_preview(&self) -> Option<(ImageContentType, Vec<u8>)> {
        self.shared
            .lock()
            .selected_image
            .as_ref()
            .map(|image| (image.content_type, image.bytes.clone()))
    }

    /// Send the selected image for analysis.
    pub fn submit_image(&self) -> SubmitOutcome {
        let mut state = self.shared.lock();
        if state.is_loading() || state.is_unmounted() {
            tracing::debug!(page_id = %self.page_id, "Submission ignored, attempt in flight");
            return SubmitOutcome::Ignored;
        }

        let Some(image) = state.selected_image.clone() else {
            return self.reject(&mut state, ValidationError::NoImageSelected);
        };

        let caller = Arc::clone(&self.caller);
        self.start_attempt(&mut state, AnalysisMode::Image, async move {
            caller.analyze_image(image).await
        })
    }

    pub fn dismiss_error(&self) {
        self.shared.lock().dismiss_error();
    }

    /// Wait until no attempt is pending.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.loading_tx.subscribe();
        let _ = rx.wait_for(|loading| !*loading).await;
    }

    /// Tear the page down. The in-flight attempt, if any, is aborted and
    /// never writes to state.
    pub fn unmount(&self) {
        let mut state = self.shared.lock();
        let cancelled = state.unmount();
        self.shared.loading_tx.send_replace(false);
        drop(state);

        if let Some(attempt_id) = cancelled {
            tracing::info!(
                page_id = %self.page_id,
                attempt_id = %attempt_id,
                "Analysis attempt aborted on unmount"
            );
            metrics::counter!("analysis.aborted").increment(1);
        }
    }

    fn reject(&self, state: &mut SubmissionState, error: ValidationError) -> SubmitOutcome {
        self.record_rejection(state, &error);
        SubmitOutcome::Rejected(error)
    }

    fn record_rejection(&self, state: &mut SubmissionState, error: &ValidationError) {
        tracing::debug!(page_id = %self.page_id, kind = error.kind(), "Input rejected");
        metrics::counter!("validation.rejections", "kind" => error.kind()).increment(1);
        state.reject(error);
    }

    /// Spawn the attempt while the state lock is held, so its outcome can
    /// only be applied after it is registered as pending.
    fn start_attempt<F>(
        &self,
        state: &mut SubmissionState,
        mode: AnalysisMode,
        call: F,
    ) -> SubmitOutcome
    where
        F: Future<Output = Result<RiskAssessment, AnalysisError>> + Send + 'static,
    {
        let attempt_id = state.begin_attempt(mode);
        self.shared.loading_tx.send_replace(true);

        tracing::info!(
            page_id = %self.page_id,
            attempt_id = %attempt_id,
            mode = %mode,
            "Analysis attempt started"
        );
        metrics::counter!("analysis.requests", "mode" => mode.as_str()).increment(1);

        let task = run_attempt(
            Arc::clone(&self.shared),
            self.page_id,
            attempt_id,
            mode,
            self.settings.request_timeout,
            call,
        );
        let handle = tokio::spawn(task);
        state.attach_abort(attempt_id, handle.abort_handle());

        SubmitOutcome::Started(attempt_id)
    }
}

impl Drop for SubmissionFlow {
    fn drop(&mut self) {
        if let Some(pending) = self.shared.lock().cancel_pending() {
            tracing::debug!(
                page_id = %self.page_id,
                attempt_id = %pending,
                "Dropped with attempt in flight"
            );
        }
    }
}

async fn run_attempt<F>(
    shared: Arc<Shared>,
    page_id: PageId,
    attempt_id: AttemptId,
    mode: AnalysisMode,
    timeout: Duration,
    call: F,
) where
    F: Future<Output = Result<RiskAssessment, AnalysisError>> + Send + 'static,
{
    let start = Instant::now();
    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AnalysisError::Timeout(timeout)),
    };
    let latency = start.elapsed().as_secs_f64();
    metrics::histogram!("analysis.latency", "mode" => mode.as_str()).record(latency);

    if let Err(ref e) = outcome {
        tracing::warn!(
            page_id = %page_id,
            attempt_id = %attempt_id,
            mode = %mode,
            error = %e,
            "Analysis attempt failed"
        );
        metrics::counter!("analysis.errors", "mode" => mode.as_str(), "cause" => e.cause())
            .increment(1);
    }

    // The loading signal is cleared under the same lock as the state, so a
    // newer attempt's `true` is never overwritten.
    let mut state = shared.lock();
    let applied = state.finish_attempt(attempt_id, outcome);
    if applied != Applied::Stale {
        shared.loading_tx.send_replace(false);
    }
    drop(state);

    match applied {
        Applied::Succeeded => {
            tracing::info!(
                page_id = %page_id,
                attempt_id = %attempt_id,
                latency_secs = latency,
                "Analysis attempt succeeded"
            );
        }
        Applied::Failed => {}
        Applied::Stale => {
            tracing::debug!(page_id = %page_id, attempt_id = %attempt_id, "Stale outcome discarded");
        }
    }
}
