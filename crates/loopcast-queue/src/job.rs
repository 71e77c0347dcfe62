//! Per-job context.

use loopcast_models::JobId;

use crate::queue::EventQueue;

/// Everything one conversion job shares between its components: the probe
/// result, the event queue handle and the job id.
///
/// Exactly one `JobContext` is live at a time (single-flight model).
/// Constructing one resets the queue so events from a previous job cannot
/// leak into the new subscriber's stream.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: JobId,
    /// Total source duration in seconds, when the probe succeeded.
    /// `None` degrades progress lines to their raw, unpercented form.
    pub duration_secs: Option<f64>,
    pub events: EventQueue,
}

impl JobContext {
    pub fn new(duration_secs: Option<f64>, events: EventQueue) -> Self {
        events.clear();
        Self {
            job_id: JobId::new(),
            duration_secs,
            events,
        }
    }
}
