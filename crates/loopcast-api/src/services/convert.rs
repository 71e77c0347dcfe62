//! The conversion orchestrator.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use loopcast_media::{probe_duration, EncodeRunner, FfmpegCommand};
use loopcast_models::{ConversionParams, OutputKind};
use loopcast_queue::{EventQueue, JobContext};
use loopcast_storage::{LocalStorage, Storage};

use crate::error::{ApiError, ApiResult};

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// Bare name of the artifact inside the output store.
    pub output_name: String,
    pub format: OutputKind,
}

/// Ties one conversion job together: persists the upload, probes the
/// source, supervises the engine and reports the final outcome. Progress
/// flows out exclusively through the shared event queue; this service
/// never blocks on delivery.
#[derive(Clone)]
pub struct ConvertService {
    uploads: Arc<LocalStorage>,
    outputs: Arc<LocalStorage>,
    events: EventQueue,
}

impl ConvertService {
    pub fn new(uploads: Arc<LocalStorage>, outputs: Arc<LocalStorage>, events: EventQueue) -> Self {
        Self {
            uploads,
            outputs,
            events,
        }
    }

    /// Run one conversion to completion.
    ///
    /// On failure the uploaded input is kept for diagnosis; it is deleted
    /// only after the engine confirms success. A partially written output
    /// artifact is likewise left in place on failure.
    pub async fn convert(
        &self,
        client_filename: &str,
        bytes: &[u8],
        params: ConversionParams,
    ) -> ApiResult<ConversionOutcome> {
        let filename = sanitize_filename(client_filename);
        if filename.is_empty() {
            return Err(ApiError::NoFileSupplied);
        }

        let input_path = self.uploads.put(&filename, bytes).await?;
        info!("Starting conversion of {}", filename);

        // Best-effort: without a duration, progress lines go out raw.
        let duration = probe_duration(&input_path).await;
        if let Some(secs) = duration {
            info!("Video duration: {:.2} seconds", secs);
        }

        // Resets the queue so the new subscriber sees only this job.
        let ctx = JobContext::new(duration, self.events.clone());

        let output_name = output_filename(&filename, params.kind);
        let cmd = FfmpegCommand::for_conversion(
            &input_path,
            self.outputs.path_for(&output_name),
            &params,
        );

        match EncodeRunner::new().run(&cmd, &ctx).await {
            Ok(()) => {
                info!(job = %ctx.job_id, "Conversion completed successfully");
                if let Err(e) = self.uploads.delete(&filename).await {
                    warn!("Failed to remove uploaded input {}: {}", filename, e);
                }
                Ok(ConversionOutcome {
                    output_name,
                    format: params.kind,
                })
            }
            Err(e) => {
                error!(job = %ctx.job_id, "Conversion failed: {}", e);
                Err(e.into())
            }
        }
    }
}

/// Reduce a client-supplied filename to a safe bare name.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_matches('.').to_string()
}

/// Artifact name derived from the input's base name and the output kind.
fn output_filename(input_name: &str, kind: OutputKind) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    format!("output_{}.{}", stem, kind.extension())
}
