//! Submission options endpoint.
//!
//! Replaces the rendered submission form: the frontend asks which frame
//! rates, scales and output formats it may offer, plus the defaults.

use axum::Json;
use serde::Serialize;

use loopcast_models::{ConversionParams, FrameRate, OutputKind, Scale};

#[derive(Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

#[derive(Serialize)]
pub struct OptionDefaults {
    pub fps: u32,
    pub scale: String,
    pub format: OutputKind,
}

#[derive(Serialize)]
pub struct OptionsResponse {
    pub fps_options: Vec<u32>,
    pub scale_options: Vec<ChoiceOption>,
    pub format_options: Vec<ChoiceOption>,
    pub defaults: OptionDefaults,
}

/// List the closed parameter sets a submission may choose from.
pub async fn conversion_options() -> Json<OptionsResponse> {
    let defaults = ConversionParams::default();

    Json(OptionsResponse {
        fps_options: FrameRate::ALL.iter().map(|r| r.as_u32()).collect(),
        scale_options: Scale::ALL
            .iter()
            .map(|s| ChoiceOption {
                value: s.to_string(),
                label: s.label(),
            })
            .collect(),
        format_options: OutputKind::ALL
            .iter()
            .map(|k| ChoiceOption {
                value: k.extension().to_string(),
                label: k.label().to_string(),
            })
            .collect(),
        defaults: OptionDefaults {
            fps: defaults.fps.as_u32(),
            scale: defaults.scale.to_string(),
            format: defaults.kind,
        },
    })
}
