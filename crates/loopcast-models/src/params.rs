//! Conversion parameter definitions.
//!
//! Submissions choose from closed sets of frame rates, output scales and
//! output kinds; anything outside the sets falls back to the defaults, the
//! same way the submission form only ever offers these values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available output frame rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameRate {
    F5,
    #[default]
    F10,
    F15,
    F20,
    F25,
    F30,
}

impl FrameRate {
    pub const ALL: &'static [FrameRate] = &[
        FrameRate::F5,
        FrameRate::F10,
        FrameRate::F15,
        FrameRate::F20,
        FrameRate::F25,
        FrameRate::F30,
    ];

    pub fn as_u32(&self) -> u32 {
        match self {
            FrameRate::F5 => 5,
            FrameRate::F10 => 10,
            FrameRate::F15 => 15,
            FrameRate::F20 => 20,
            FrameRate::F25 => 25,
            FrameRate::F30 => 30,
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

impl FromStr for FrameRate {
    type Err = ParamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| ParamParseError::FrameRate(s.to_string()))?;
        Self::ALL
            .iter()
            .find(|r| r.as_u32() == value)
            .copied()
            .ok_or_else(|| ParamParseError::FrameRate(s.to_string()))
    }
}

/// Output scale: target width with an auto-derived height.
///
/// Rendered for FFmpeg as `W:-1`, where `-1` keeps the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scale {
    pub width: u32,
    /// Explicit output height; `None` lets the engine derive it.
    pub height: Option<u32>,
}

impl Scale {
    pub const ALL: &'static [Scale] = &[
        Scale::auto(320),
        Scale::auto(480),
        Scale::auto(640),
        Scale::auto(800),
        Scale::auto(1280),
    ];

    pub const fn auto(width: u32) -> Self {
        Self {
            width,
            height: None,
        }
    }

    /// Human label as shown on the submission form.
    pub fn label(&self) -> String {
        match self.width {
            1280 => "720p".to_string(),
            w => format!("{}p", w),
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::auto(480)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.height {
            Some(h) => write!(f, "{}:{}", self.width, h),
            None => write!(f, "{}:-1", self.width),
        }
    }
}

impl FromStr for Scale {
    type Err = ParamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParamParseError::Scale(s.to_string());
        let (w, h) = s.trim().split_once(':').ok_or_else(err)?;
        let width: u32 = w.parse().map_err(|_| err())?;
        let height = match h {
            "-1" => None,
            h => Some(h.parse::<u32>().map_err(|_| err())?),
        };
        let scale = Scale { width, height };
        // Only the fixed form options are accepted.
        Self::ALL
            .iter()
            .find(|s| **s == scale)
            .copied()
            .ok_or_else(err)
    }
}

/// Output kind: animated image loop or short web video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    #[default]
    Gif,
    Webm,
}

impl OutputKind {
    pub const ALL: &'static [OutputKind] = &[OutputKind::Gif, OutputKind::Webm];

    /// Output file extension for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::Gif => "gif",
            OutputKind::Webm => "webm",
        }
    }

    /// Label as shown on the submission form.
    pub fn label(&self) -> &'static str {
        match self {
            OutputKind::Gif => "GIF",
            OutputKind::Webm => "WebM",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputKind {
    type Err = ParamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gif" => Ok(OutputKind::Gif),
            "webm" => Ok(OutputKind::Webm),
            _ => Err(ParamParseError::OutputKind(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParamParseError {
    #[error("Unknown frame rate: {0}")]
    FrameRate(String),
    #[error("Unknown scale: {0}")]
    Scale(String),
    #[error("Unknown output format: {0}")]
    OutputKind(String),
}

/// The full set of user-chosen conversion parameters.
///
/// Immutable once built; owned by the orchestrator for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionParams {
    pub fps: FrameRate,
    pub scale: Scale,
    pub kind: OutputKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_round_trip() {
        assert_eq!("10".parse::<FrameRate>().unwrap(), FrameRate::F10);
        assert_eq!("30".parse::<FrameRate>().unwrap().as_u32(), 30);
        assert!("12".parse::<FrameRate>().is_err());
        assert!("fast".parse::<FrameRate>().is_err());
    }

    #[test]
    fn test_scale_display_matches_engine_syntax() {
        assert_eq!(Scale::auto(480).to_string(), "480:-1");
        assert_eq!(Scale::default().to_string(), "480:-1");
    }

    #[test]
    fn test_scale_parse_rejects_unknown_widths() {
        assert_eq!("1280:-1".parse::<Scale>().unwrap(), Scale::auto(1280));
        assert!("1920:-1".parse::<Scale>().is_err());
        assert!("480".parse::<Scale>().is_err());
    }

    #[test]
    fn test_scale_labels() {
        assert_eq!(Scale::auto(1280).label(), "720p");
        assert_eq!(Scale::auto(320).label(), "320p");
    }

    #[test]
    fn test_output_kind_defaults_and_extensions() {
        assert_eq!(OutputKind::default(), OutputKind::Gif);
        assert_eq!("webm".parse::<OutputKind>().unwrap().extension(), "webm");
        assert!("mp4".parse::<OutputKind>().is_err());
    }

    #[test]
    fn test_default_params() {
        let params = ConversionParams::default();
        assert_eq!(params.fps.as_u32(), 10);
        assert_eq!(params.scale.width, 480);
        assert_eq!(params.kind, OutputKind::Gif);
    }
}
