//! End-to-end tests for the XML to PNG pipeline

mod common;

use common::{png_dimensions, ExamXml, TEST_DPI};
use ecgv_common::LayoutKind;
use ecgv_sr::ecg::{render_upload, Exam, ExamDocument, Lead, Rasterizer};
use ecgv_sr::Error;

fn render(bytes: &[u8], layout: LayoutKind) -> ecgv_sr::Result<Vec<u8>> {
    render_upload(bytes, layout, TEST_DPI, &Rasterizer::default())
}

// =============================================================================
// Successful renders
// =============================================================================

#[test]
fn test_clinical_sheet_size() {
    let png = render(&ExamXml::complete().to_bytes(), LayoutKind::Clinical).unwrap();
    // 18 x 12 in at 36 dpi
    assert_eq!(png_dimensions(&png), (648, 432));
}

#[test]
fn test_stacked_height_follows_present_leads() {
    let xml = ExamXml::complete().with_leads(&["DI", "DII", "V5"]);
    let png = render(&xml.to_bytes(), LayoutKind::Stacked).unwrap();
    // 15 in wide, 2.5 in per lead
    assert_eq!(png_dimensions(&png), (540, 270));
}

#[test]
fn test_single_usable_lead_renders_both_layouts() {
    let xml = ExamXml::complete().with_leads(&["V3"]);
    for layout in [LayoutKind::Stacked, LayoutKind::Clinical] {
        let png = render(&xml.to_bytes(), layout).unwrap();
        assert!(!png.is_empty());
        png_dimensions(&png);
    }
}

#[test]
fn test_latin1_export_renders() {
    let mut xml = ExamXml::complete();
    xml.patient_name = Some("JOS\u{c9} CONCEI\u{c7}\u{c3}O".to_string());
    // Re-encode as ISO-8859-1: every char here is below U+0100
    let bytes: Vec<u8> = xml.to_xml().chars().map(|c| c as u32 as u8).collect();
    assert!(std::str::from_utf8(&bytes).is_err());

    let png = render(&bytes, LayoutKind::Clinical).unwrap();
    assert_eq!(png_dimensions(&png), (648, 432));
}

#[test]
fn test_stacked_tolerates_missing_sensitivity_and_annotations() {
    let mut xml = ExamXml::complete();
    xml.sensitivity = None;
    xml.speed = None;
    xml.heart_rate = None;
    xml.patient_name = None;
    xml.birth_date = Some("unknown".to_string());
    assert!(render(&xml.to_bytes(), LayoutKind::Stacked).is_ok());
}

#[test]
fn test_exam_reads_metadata() {
    let text = ExamXml::complete().to_xml();
    let doc = ExamDocument::parse(&text).unwrap();
    let exam = Exam::from_document(&doc, LayoutKind::Clinical).unwrap();

    assert_eq!(exam.recording.sample_rate_hz, 250.0);
    assert_eq!(exam.recording.declared_sensitivity.as_deref(), Some("5 uV"));
    assert_eq!(exam.leads.present_count(), 12);
    assert_eq!(exam.leads.get(Lead::V6).len(), 500);
    assert_eq!(exam.patient.age_years, Some(70));
    assert_eq!(
        exam.patient.title(),
        "ECG - Patient: Maria Silva (F, 70 years) - Date: 03/09/2020 14:05"
    );
    let notes = exam.annotations.unwrap();
    assert_eq!(notes.speed.as_deref(), Some("25"));
    assert_eq!(notes.heart_rate.as_deref(), Some("72"));
}

#[test]
fn test_single_sample_lead_renders() {
    let mut xml = ExamXml::complete().with_leads(&["DII"]);
    xml.channels[0].1 = "120".to_string();

    let png = render(&xml.to_bytes(), LayoutKind::Stacked).unwrap();
    assert_eq!(png_dimensions(&png), (540, 90));
    let png = render(&xml.to_bytes(), LayoutKind::Clinical).unwrap();
    assert_eq!(png_dimensions(&png), (648, 432));
}

#[test]
fn test_extreme_amplitude_renders() {
    for spike in ["1e12", "1e300", "-1.7e308"] {
        let mut xml = ExamXml::complete().with_leads(&["V2"]);
        xml.channels[0].1 = format!("0;{};-200;40", spike);
        let png = render(&xml.to_bytes(), LayoutKind::Stacked)
            .unwrap_or_else(|e| panic!("sample {} failed: {}", spike, e));
        assert_eq!(png_dimensions(&png), (540, 90));
    }
}

#[test]
fn test_low_sample_rate_long_lead_renders() {
    // 200 000 samples at 1 Hz span more than two days
    let mut xml = ExamXml::complete().with_leads(&["DI", "DII"]);
    xml.sample_rate = Some("1".to_string());
    for (_, payload) in xml.channels.iter_mut() {
        *payload = "0;".repeat(200_000);
    }

    let png = render(&xml.to_bytes(), LayoutKind::Stacked).unwrap();
    assert_eq!(png_dimensions(&png), (540, 180));
    let png = render(&xml.to_bytes(), LayoutKind::Clinical).unwrap();
    assert_eq!(png_dimensions(&png), (648, 432));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_corrupt_xml_is_malformed_document() {
    let mut text = ExamXml::complete().to_xml();
    text.truncate(text.len() / 2);
    match render(text.as_bytes(), LayoutKind::Clinical) {
        Err(Error::MalformedDocument { line, .. }) => assert!(line > 0),
        other => panic!("expected MalformedDocument, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn test_no_usable_lead_is_no_lead_data() {
    let mut xml = ExamXml::complete();
    for (_, payload) in xml.channels.iter_mut() {
        *payload = "1;2;bad;4".to_string();
    }
    assert!(matches!(
        render(&xml.to_bytes(), LayoutKind::Stacked),
        Err(Error::NoLeadData)
    ));
}

#[test]
fn test_bad_sample_rate() {
    let mut xml = ExamXml::complete();
    xml.sample_rate = Some("Hz".to_string());
    assert!(matches!(
        render(&xml.to_bytes(), LayoutKind::Stacked),
        Err(Error::InvalidSampleRate(_))
    ));
}

#[test]
fn test_clinical_requires_sensitivity_and_annotations() {
    let mut xml = ExamXml::complete();
    xml.sensitivity = None;
    assert!(matches!(
        render(&xml.to_bytes(), LayoutKind::Clinical),
        Err(Error::MissingField(_))
    ));

    let mut xml = ExamXml::complete();
    xml.heart_rate = None;
    match render(&xml.to_bytes(), LayoutKind::Clinical) {
        Err(Error::MissingField(field)) => assert_eq!(field, "Registro/FrequenciaCardiaca"),
        other => panic!("expected MissingField, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn test_utf16_upload_is_encoding_error() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<ECG/>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    assert!(matches!(
        render(&bytes, LayoutKind::Stacked),
        Err(Error::Encoding(_))
    ));
}
