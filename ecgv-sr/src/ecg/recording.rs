//! Recording metadata: sample rate, declared sensitivity, exam annotations

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::document::{node_text, ExamDocument};
use super::samples::SENSITIVITY_MV_PER_UNIT;
use crate::error::{Error, Result};

const RECORDING_TAG: &str = "Registros";
const SAMPLE_RATE_ATTR: &str = "TaxaAmostragem";
const SENSITIVITY_ATTR: &str = "Sensibilidade";

const ANNOTATION_PARENT: &str = "Registro";
const SPEED_TAG: &str = "Velocidade";
const HEART_RATE_TAG: &str = "FrequenciaCardiaca";

static LEADING_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("sample rate pattern is valid"));

/// Acquisition parameters shared by every lead
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingMetadata {
    pub sample_rate_hz: f64,
    /// Gain applied to raw samples; always [`SENSITIVITY_MV_PER_UNIT`]
    pub sensitivity_mv_per_unit: f64,
    /// `Sensibilidade` attribute as written in the export; informational only
    pub declared_sensitivity: Option<String>,
}

impl RecordingMetadata {
    /// Read the recording node
    ///
    /// `require_sensitivity` makes the `Sensibilidade` attribute mandatory.
    /// Its value is kept for reference but never used for scaling.
    pub fn from_document(doc: &ExamDocument<'_>, require_sensitivity: bool) -> Result<Self> {
        let recording = doc
            .find(RECORDING_TAG)
            .ok_or_else(|| Error::MissingField(RECORDING_TAG.to_string()))?;

        let rate_text = recording
            .attribute(SAMPLE_RATE_ATTR)
            .ok_or_else(|| Error::MissingField(format!("{}@{}", RECORDING_TAG, SAMPLE_RATE_ATTR)))?;
        let sample_rate_hz = parse_sample_rate(rate_text)?;

        let declared_sensitivity = recording.attribute(SENSITIVITY_ATTR).map(str::to_string);
        if require_sensitivity && declared_sensitivity.is_none() {
            return Err(Error::MissingField(format!(
                "{}@{}",
                RECORDING_TAG, SENSITIVITY_ATTR
            )));
        }
        if let Some(declared) = &declared_sensitivity {
            debug!(
                "Declared sensitivity '{}' ignored, using {} mV/unit",
                declared, SENSITIVITY_MV_PER_UNIT
            );
        }

        Ok(Self {
            sample_rate_hz,
            sensitivity_mv_per_unit: SENSITIVITY_MV_PER_UNIT,
            declared_sensitivity,
        })
    }

    /// Sensitivity in µV per raw unit, as printed in the footer
    pub fn sensitivity_uv_per_unit(&self) -> f64 {
        self.sensitivity_mv_per_unit * 1000.0
    }
}

/// Extract the sample rate from free text such as `"500 Hz"`
///
/// Only the first run of digits counts; `"1000.5Hz"` reads as 1000.
pub fn parse_sample_rate(text: &str) -> Result<f64> {
    let digits = LEADING_INTEGER
        .find(text)
        .ok_or_else(|| Error::InvalidSampleRate(text.to_string()))?;
    let rate: f64 = digits
        .as_str()
        .parse()
        .map_err(|_| Error::InvalidSampleRate(text.to_string()))?;
    if rate > 0.0 && rate.is_finite() {
        Ok(rate)
    } else {
        Err(Error::InvalidSampleRate(text.to_string()))
    }
}

/// Footer annotations required by the clinical layout
#[derive(Debug, Clone, PartialEq)]
pub struct ExamAnnotations {
    /// Paper speed as exported, in mm/s; `None` when the node is blank
    pub speed: Option<String>,
    /// Heart rate as exported, in bpm; `None` when the node is blank
    pub heart_rate: Option<String>,
}

impl ExamAnnotations {
    /// Read `Registro/Velocidade` and `Registro/FrequenciaCardiaca`
    ///
    /// Both nodes must exist; blank text is tolerated.
    pub fn from_document(doc: &ExamDocument<'_>) -> Result<Self> {
        let speed = doc
            .find_path(ANNOTATION_PARENT, SPEED_TAG)
            .ok_or_else(|| Error::MissingField(format!("{}/{}", ANNOTATION_PARENT, SPEED_TAG)))?;
        let heart_rate = doc
            .find_path(ANNOTATION_PARENT, HEART_RATE_TAG)
            .ok_or_else(|| {
                Error::MissingField(format!("{}/{}", ANNOTATION_PARENT, HEART_RATE_TAG))
            })?;

        Ok(Self {
            speed: node_text(speed).map(str::to_string),
            heart_rate: node_text(heart_rate).map(str::to_string),
        })
    }
}
