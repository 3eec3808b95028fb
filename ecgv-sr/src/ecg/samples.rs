//! Lead sample extraction and calibration
//!
//! Each `Canal` element carries one lead as a `;`-separated list of raw
//! integer-ish units in its `Amostras` child. Raw units become millivolts
//! through a fixed gain of 5 µV per unit.
//!
//! A lead that is missing or does not parse is replaced by an empty series;
//! only a document where every lead ends up empty is an error.

use thiserror::Error;
use tracing::{debug, warn};

use super::document::{child_element, ExamDocument};
use super::leads::{Lead, LeadSeries, LeadSet};
use crate::error::{Error, Result};

/// Millivolts per raw sample unit (5 µV)
pub const SENSITIVITY_MV_PER_UNIT: f64 = 0.005;

/// Element holding one lead
const CHANNEL_TAG: &str = "Canal";
/// Attribute naming the lead of a channel
const CHANNEL_NAME_ATTR: &str = "Nome";
/// Child element holding the raw sample payload
const SAMPLES_TAG: &str = "Amostras";

/// A sample token that is not a finite number
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid sample '{token}' at position {position}")]
pub struct SampleParseError {
    /// Zero-based index among the non-empty tokens
    pub position: usize,
    pub token: String,
}

/// Parse a raw sample payload
///
/// Line breaks are removed, the text is split on `;` and tokens that are
/// blank after trimming are skipped. `NaN` and infinities are rejected: they
/// would poison the shared voltage range.
pub fn parse_raw_samples(payload: &str) -> std::result::Result<Vec<f64>, SampleParseError> {
    let cleaned: String = payload.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();

    cleaned
        .split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(SampleParseError {
                position,
                token: token.to_string(),
            }),
        })
        .collect()
}

/// Convert raw sample units to millivolts
pub fn to_millivolts(raw: &[f64]) -> Vec<f64> {
    raw.iter().map(|r| r * SENSITIVITY_MV_PER_UNIT).collect()
}

/// Extract all 12 leads from the document
///
/// Channels are matched by exact lead name; when a name appears more than
/// once the last channel wins. Channels with unknown names are ignored.
pub fn extract_leads(doc: &ExamDocument<'_>) -> Result<LeadSet> {
    let mut channels = [None; 12];
    for channel in doc.find_all(CHANNEL_TAG) {
        match channel.attribute(CHANNEL_NAME_ATTR).and_then(Lead::from_name) {
            Some(lead) => channels[lead.index()] = Some(channel),
            None => debug!(
                "Ignoring channel with unrecognized name {:?}",
                channel.attribute(CHANNEL_NAME_ATTR)
            ),
        }
    }

    let mut series = Vec::with_capacity(Lead::ALL.len());
    for lead in Lead::ALL {
        let Some(channel) = channels[lead.index()] else {
            warn!("Lead {} not found in document, leaving it empty", lead);
            series.push(LeadSeries::empty(lead));
            continue;
        };

        let Some(payload) = child_element(channel, SAMPLES_TAG).and_then(|n| n.text()) else {
            warn!("Sample data missing for lead {}, leaving it empty", lead);
            series.push(LeadSeries::empty(lead));
            continue;
        };

        match parse_raw_samples(payload) {
            Ok(raw) => {
                debug!("Lead {}: {} samples", lead, raw.len());
                series.push(LeadSeries::new(lead, to_millivolts(&raw)));
            }
            Err(e) => {
                let preview: String = payload.chars().take(100).collect();
                warn!(
                    "Discarding lead {}: {} (raw data: {}...)",
                    lead, e, preview
                );
                series.push(LeadSeries::empty(lead));
            }
        }
    }

    let leads = LeadSet::from_series(series);
    if leads.is_empty() {
        return Err(Error::NoLeadData);
    }
    Ok(leads)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_channels(channels: &str) -> String {
        format!(
            r#"<Root><Registros TaxaAmostragem="500 Hz">{}</Registros></Root>"#,
            channels
        )
    }

    #[test]
    fn test_parse_raw_samples_strips_line_breaks() {
        let raw = parse_raw_samples("1;2;\r\n3; -4 ;;5;").unwrap();
        assert_eq!(raw, vec![1.0, 2.0, 3.0, -4.0, 5.0]);
    }

    #[test]
    fn test_line_break_inside_number_joins_digits() {
        assert_eq!(parse_raw_samples("12\n3;4").unwrap(), vec![123.0, 4.0]);
    }

    #[test]
    fn test_parse_raw_samples_rejects_bad_token() {
        let err = parse_raw_samples("1;2;x3;4").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.token, "x3");
    }

    #[test]
    fn test_parse_raw_samples_rejects_non_finite() {
        assert!(parse_raw_samples("1;NaN").is_err());
        assert!(parse_raw_samples("inf;1").is_err());
    }

    #[test]
    fn test_blank_payload_is_empty() {
        assert!(parse_raw_samples("  ;\n; ").unwrap().is_empty());
    }

    #[test]
    fn test_scaling_is_linear() {
        let mv = to_millivolts(&[0.0, 1.0, 200.0, -200.0, 1234.5]);
        assert_eq!(mv, vec![0.0, 0.005, 1.0, -1.0, 1234.5 * 0.005]);
    }

    #[test]
    fn test_extract_leads_recovers_per_lead() {
        let text = doc_with_channels(
            r#"
            <Canal Nome="DI"><Amostras>100;200;300</Amostras></Canal>
            <Canal Nome="DII"><Amostras>100;oops;300</Amostras></Canal>
            <Canal Nome="DIII"></Canal>
            <Canal Nome="aVR"><Amostras/></Canal>
            <Canal Nome="XYZ"><Amostras>1;2;3</Amostras></Canal>
            "#,
        );
        let doc = ExamDocument::parse(&text).unwrap();
        let leads = extract_leads(&doc).unwrap();

        assert_eq!(leads.get(Lead::Di).samples_mv, vec![0.5, 1.0, 1.5]);
        assert!(leads.get(Lead::Dii).is_empty());
        assert!(leads.get(Lead::Diii).is_empty());
        assert!(leads.get(Lead::Avr).is_empty());
        assert!(leads.get(Lead::V6).is_empty());
        assert_eq!(leads.present_count(), 1);
    }

    #[test]
    fn test_duplicate_channel_last_wins() {
        let text = doc_with_channels(
            r#"
            <Canal Nome="V1"><Amostras>1</Amostras></Canal>
            <Canal Nome="V1"><Amostras>2;4</Amostras></Canal>
            "#,
        );
        let doc = ExamDocument::parse(&text).unwrap();
        let leads = extract_leads(&doc).unwrap();
        assert_eq!(leads.get(Lead::V1).samples_mv, vec![0.01, 0.02]);
    }

    #[test]
    fn test_no_usable_lead_is_error() {
        let text = doc_with_channels(
            r#"
            <Canal Nome="DI"><Amostras>a;b</Amostras></Canal>
            <Canal Nome="Other"><Amostras>1;2</Amostras></Canal>
            "#,
        );
        let doc = ExamDocument::parse(&text).unwrap();
        assert!(matches!(extract_leads(&doc), Err(Error::NoLeadData)));
    }
}
