//! Best-effort source duration probing.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Probe a media file for its total duration in seconds.
///
/// Duration is an optimization for percentage computation, never a
/// correctness requirement: a missing ffprobe binary, a non-zero exit or
/// unparseable output all yield `None` and progress degrades to raw lines.
pub async fn probe_duration(path: impl AsRef<Path>) -> Option<f64> {
    let path = path.as_ref();

    let output = match Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            warn!("ffprobe could not be run: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        warn!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    let duration = parse_duration_output(&String::from_utf8_lossy(&output.stdout));
    match duration {
        Some(secs) => debug!("probed duration of {}: {:.2}s", path.display(), secs),
        None => warn!("ffprobe returned no usable duration for {}", path.display()),
    }
    duration
}

/// Parse ffprobe's single-line float output, rejecting nonsense values.
fn parse_duration_output(stdout: &str) -> Option<f64> {
    let secs: f64 = stdout.trim().parse().ok()?;
    if secs.is_finite() && secs > 0.0 {
        Some(secs)
    } else {
        None
    }
}
