//! FFmpeg command builder and encode supervisor.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info};

use loopcast_models::{ConversionParams, OutputKind, ProgressEvent};
use loopcast_queue::JobContext;

use crate::error::{MediaError, MediaResult};
use crate::progress::annotate_line;

/// Builder for FFmpeg conversion commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    output_args: Vec<String>,
    overwrite: bool,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Build the fixed per-kind command for a conversion request:
    /// `ffmpeg -y -i <input> -vf "fps=<r>,scale=<w>:<h>:flags=lanczos" <kind flags> <output>`.
    pub fn for_conversion(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        params: &ConversionParams,
    ) -> Self {
        let filter = format!("fps={},scale={}:flags=lanczos", params.fps, params.scale);
        let cmd = Self::new(input, output).video_filter(filter);

        match params.kind {
            OutputKind::Gif => cmd.video_codec("gif"),
            OutputKind::Webm => cmd
                .video_codec("libvpx")
                .output_args(["-crf", "10", "-b:v", "1M"])
                .audio_codec("libvorbis")
                .output_args(["-auto-alt-ref", "0"])
                .output_args(["-deadline", "realtime", "-cpu-used", "8"])
                .output_args(["-progress", "pipe:1"]),
        }
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Path of the artifact this command produces.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Supervisor for one external conversion process.
///
/// Owns the process from spawn until `wait()` returns: stderr is captured
/// (never inherited) and consumed line-by-line on a dedicated task so the
/// engine can never stall on a full pipe. Every line is mirrored to the
/// host log and pushed, annotated, onto the job's event queue.
pub struct EncodeRunner {
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl Default for EncodeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeRunner {
    pub fn new() -> Self {
        Self { cancel_rx: None }
    }

    /// Set a cancellation signal; when it flips to `true` the external
    /// process is killed and the run fails with [`MediaError::Cancelled`].
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Run a conversion to completion.
    ///
    /// Returns `Ok(())` only after the process has fully terminated with a
    /// zero exit status. A non-zero status maps to
    /// [`MediaError::FfmpegExited`]; the partially written output artifact
    /// is left in place for diagnosis.
    pub async fn run(&self, cmd: &FfmpegCommand, ctx: &JobContext) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;
        if !cmd.input.exists() {
            return Err(MediaError::FileNotFound(cmd.input.clone()));
        }

        let args = cmd.build_args();
        debug!(job = %ctx.job_id, "Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child.stderr.take().expect("stderr not captured");

        // The reader task ends when the engine closes its stderr, normally
        // because it exited. The queue is unbounded, so pushing never
        // blocks this task on a slow or absent subscriber.
        let queue = ctx.events.clone();
        let duration = ctx.duration_secs;
        let reader_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(target: "ffmpeg", "{}", line);
                queue.push(ProgressEvent::Line(annotate_line(&line, duration)));
            }
        });

        let result = self.wait_for_exit(&mut child).await;

        // Drain the reader before signalling termination so the exit event
        // can never overtake a diagnostic line in the queue.
        let _ = reader_task.await;
        ctx.events.push(ProgressEvent::ProcessExited {
            success: result.is_ok(),
        });

        result
    }

    /// Wait for the child with optional cancellation.
    async fn wait_for_exit(&self, child: &mut Child) -> MediaResult<()> {
        let status = match self.cancel_rx.clone() {
            Some(mut cancel_rx) => {
                tokio::select! {
                    status = child.wait() => status?,
                    // Map away the watch::Ref guard inside the branch future
                    // so it is never held across the awaits below (keeps the
                    // future Send).
                    cancelled = async { cancel_rx.wait_for(|c| *c).await.map(|_| ()) } => {
                        if cancelled.is_ok() {
                            info!("Conversion cancelled, killing ffmpeg");
                            let _ = child.kill().await;
                            return Err(MediaError::Cancelled);
                        }
                        // Sender dropped: cancellation can no longer fire.
                        child.wait().await?
                    }
                }
            }
            None => child.wait().await?,
        };

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::FfmpegExited {
                code: status.code(),
            })
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopcast_models::{FrameRate, Scale};

    fn params(kind: OutputKind) -> ConversionParams {
        ConversionParams {
            fps: FrameRate::F10,
            scale: Scale::auto(480),
            kind,
        }
    }

    #[test]
    fn test_gif_command_line() {
        let cmd = FfmpegCommand::for_conversion(
            "uploads/clip.mp4",
            "static/output/output_clip.gif",
            &params(OutputKind::Gif),
        );

        assert_eq!(
            cmd.build_args(),
            vec![
                "-y",
                "-i",
                "uploads/clip.mp4",
                "-vf",
                "fps=10,scale=480:-1:flags=lanczos",
                "-c:v",
                "gif",
                "static/output/output_clip.gif",
            ]
        );
    }

    #[test]
    fn test_webm_command_line() {
        let cmd = FfmpegCommand::for_conversion(
            "uploads/clip.mp4",
            "static/output/output_clip.webm",
            &params(OutputKind::Webm),
        );

        assert_eq!(
            cmd.build_args(),
            vec![
                "-y",
                "-i",
                "uploads/clip.mp4",
                "-vf",
                "fps=10,scale=480:-1:flags=lanczos",
                "-c:v",
                "libvpx",
                "-crf",
                "10",
                "-b:v",
                "1M",
                "-c:a",
                "libvorbis",
                "-auto-alt-ref",
                "0",
                "-deadline",
                "realtime",
                "-cpu-used",
                "8",
                "-progress",
                "pipe:1",
                "static/output/output_clip.webm",
            ]
        );
    }

    #[test]
    fn test_filter_follows_chosen_parameters() {
        let p = ConversionParams {
            fps: FrameRate::F25,
            scale: Scale::auto(1280),
            kind: OutputKind::Gif,
        };
        let args = FfmpegCommand::for_conversion("in.mov", "out.gif", &p).build_args();
        assert!(args.contains(&"fps=25,scale=1280:-1:flags=lanczos".to_string()));
    }
}
