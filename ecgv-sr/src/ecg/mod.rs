//! ECG export to strip-chart pipeline
//!
//! Bytes are decoded to text, parsed into an [`ExamDocument`], read into an
//! [`Exam`], drawn onto a [`figure::Figure`] and rasterized to PNG. Every
//! stage owns its data; nothing outlives the call to [`render_upload`].

pub mod decode;
pub mod document;
pub mod figure;
pub mod layout;
pub mod leads;
pub mod patient;
pub mod raster;
pub mod recording;
pub mod render;
pub mod samples;
pub mod scale;

use tracing::{debug, info};

use ecgv_common::LayoutKind;

pub use document::ExamDocument;
pub use leads::{Lead, LeadSeries, LeadSet};
pub use patient::PatientInfo;
pub use raster::Rasterizer;
pub use recording::{ExamAnnotations, RecordingMetadata};

use crate::error::Result;

/// Everything needed to draw one exam
#[derive(Debug, Clone, PartialEq)]
pub struct Exam {
    pub recording: RecordingMetadata,
    pub leads: LeadSet,
    pub patient: PatientInfo,
    /// Footer data; only read for the clinical layout
    pub annotations: Option<ExamAnnotations>,
}

impl Exam {
    /// Read an exam for drawing in `layout`
    ///
    /// The clinical layout additionally requires the declared sensitivity
    /// and the speed and heart-rate nodes.
    pub fn from_document(doc: &ExamDocument<'_>, layout: LayoutKind) -> Result<Self> {
        let clinical = layout == LayoutKind::Clinical;

        let recording = RecordingMetadata::from_document(doc, clinical)?;
        let annotations = if clinical {
            Some(ExamAnnotations::from_document(doc)?)
        } else {
            None
        };
        let leads = samples::extract_leads(doc)?;
        let patient = PatientInfo::from_document(doc);

        Ok(Self {
            recording,
            leads,
            patient,
            annotations,
        })
    }
}

/// Render one uploaded export to PNG bytes
pub fn render_upload(
    bytes: &[u8],
    layout: LayoutKind,
    dpi: f32,
    rasterizer: &Rasterizer,
) -> Result<Vec<u8>> {
    let text = decode::decode_text(bytes)?;
    let doc = ExamDocument::parse(&text)?;
    let exam = Exam::from_document(&doc, layout)?;
    debug!(
        "Exam read: {} Hz, {} of 12 leads present, longest {} samples",
        exam.recording.sample_rate_hz,
        exam.leads.present_count(),
        exam.leads.longest_len()
    );

    let figure = render::draw_exam(&exam, layout)?;
    let png = rasterizer.render_png(figure, dpi)?;
    info!(
        "Rendered {} chart ({} bytes) for {} leads",
        layout,
        png.len(),
        exam.leads.present_count()
    );
    Ok(png)
}
