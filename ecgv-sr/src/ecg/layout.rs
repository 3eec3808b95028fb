//! Page geometry for the two layouts
//!
//! All coordinates are in points (1/72 inch) from the top-left corner of
//! the page. The rasterizer scales points to pixels at the requested DPI.

use ecgv_common::LayoutKind;

use super::figure::Rect;
use super::leads::{Lead, LeadSet};

pub const POINTS_PER_INCH: f64 = 72.0;

const TITLE_BASELINE: f64 = 28.0;

// Stacked: 15 in wide, 2.5 in per lead
const STACKED_WIDTH_IN: f64 = 15.0;
const STACKED_ROW_IN: f64 = 2.5;
const STACKED_MARGIN_LEFT: f64 = 72.0;
const STACKED_MARGIN_RIGHT: f64 = 18.0;
const STACKED_MARGIN_TOP: f64 = 40.0;
const STACKED_MARGIN_BOTTOM: f64 = 44.0;
const STACKED_ROW_GAP: f64 = 18.0;
const STACKED_LABEL_OFFSET: f64 = 36.0;

// Clinical: 18 x 12 in sheet, four lead rows plus a shorter rhythm row
const CLINICAL_WIDTH_IN: f64 = 18.0;
const CLINICAL_HEIGHT_IN: f64 = 12.0;
const CLINICAL_COLUMNS: usize = 3;
const CLINICAL_LEAD_ROWS: usize = 4;
const CLINICAL_RHYTHM_ROW_RATIO: f64 = 0.7;
const CLINICAL_MARGIN_LEFT: f64 = 96.0;
const CLINICAL_MARGIN_RIGHT: f64 = 16.0;
const CLINICAL_MARGIN_TOP: f64 = 44.0;
const CLINICAL_MARGIN_BOTTOM: f64 = 70.0;
const CLINICAL_COLUMN_GAP: f64 = 40.0;
const CLINICAL_ROW_GAP: f64 = 12.0;
const CLINICAL_RHYTHM_GAP: f64 = 16.0;
const CLINICAL_LEAD_LABEL_OFFSET: f64 = 6.0;
const CLINICAL_RHYTHM_LABEL_OFFSET: f64 = 26.0;
const FOOTER_BOTTOM_OFFSET: f64 = 10.0;
/// Footer item positions as fractions of the page width
const FOOTER_COLUMNS: [f64; 3] = [0.05, 0.20, 0.42];

/// Lead name placed next to a panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Rotated 90° counter-clockwise and centered; otherwise right-aligned
    pub rotated: bool,
}

/// One plotting area
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub lead: Lead,
    pub rect: Rect,
    pub label: PanelLabel,
    /// Voltage tick labels on the left edge
    pub voltage_labels: bool,
    /// Time tick labels and the "Time (s)" caption below the panel
    pub time_labels: bool,
    /// Draw the 1 mV / 0.2 s calibration pulse
    pub calibration_pulse: bool,
}

/// Complete page geometry
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub kind: LayoutKind,
    pub width: f64,
    pub height: f64,
    pub title_baseline: f64,
    pub panels: Vec<Panel>,
    /// Baseline and x positions of the footer items, clinical only
    pub footer: Option<(f64, [f64; 3])>,
}

/// Geometry for `kind`
pub fn page_layout(kind: LayoutKind, leads: &LeadSet) -> PageLayout {
    match kind {
        LayoutKind::Stacked => stacked_layout(leads),
        LayoutKind::Clinical => clinical_layout(leads),
    }
}

/// One full-width row per non-empty lead, shared time axis
pub fn stacked_layout(leads: &LeadSet) -> PageLayout {
    let present: Vec<Lead> = leads.present().map(|s| s.lead).collect();
    let rows = present.len().max(1);

    let width = STACKED_WIDTH_IN * POINTS_PER_INCH;
    let height = STACKED_ROW_IN * POINTS_PER_INCH * rows as f64;
    let plot_width = width - STACKED_MARGIN_LEFT - STACKED_MARGIN_RIGHT;
    let row_height = (height
        - STACKED_MARGIN_TOP
        - STACKED_MARGIN_BOTTOM
        - STACKED_ROW_GAP * (rows - 1) as f64)
        / rows as f64;

    let last = present.len().saturating_sub(1);
    let panels = present
        .iter()
        .enumerate()
        .map(|(i, &lead)| {
            let rect = Rect::new(
                STACKED_MARGIN_LEFT,
                STACKED_MARGIN_TOP + i as f64 * (row_height + STACKED_ROW_GAP),
                plot_width,
                row_height,
            );
            Panel {
                lead,
                label: PanelLabel {
                    text: format!("{} (mV)", lead),
                    x: rect.x - STACKED_LABEL_OFFSET,
                    y: rect.center_y(),
                    rotated: true,
                },
                rect,
                voltage_labels: true,
                time_labels: i == last,
                calibration_pulse: false,
            }
        })
        .collect();

    PageLayout {
        kind: LayoutKind::Stacked,
        width,
        height,
        title_baseline: TITLE_BASELINE,
        panels,
        footer: None,
    }
}

/// 4x3 grid of the 12 leads in canonical order plus a rhythm strip
///
/// Every grid cell is laid out even when its lead is empty; only leads
/// with data get a calibration pulse.
pub fn clinical_layout(leads: &LeadSet) -> PageLayout {
    let width = CLINICAL_WIDTH_IN * POINTS_PER_INCH;
    let height = CLINICAL_HEIGHT_IN * POINTS_PER_INCH;

    let plot_width = width - CLINICAL_MARGIN_LEFT - CLINICAL_MARGIN_RIGHT;
    let column_width =
        (plot_width - CLINICAL_COLUMN_GAP * (CLINICAL_COLUMNS - 1) as f64) / CLINICAL_COLUMNS as f64;
    let rows_height = height
        - CLINICAL_MARGIN_TOP
        - CLINICAL_MARGIN_BOTTOM
        - CLINICAL_ROW_GAP * (CLINICAL_LEAD_ROWS - 1) as f64
        - CLINICAL_RHYTHM_GAP;
    let unit = rows_height / (CLINICAL_LEAD_ROWS as f64 + CLINICAL_RHYTHM_ROW_RATIO);

    let mut panels: Vec<Panel> = Lead::ALL
        .iter()
        .enumerate()
        .map(|(idx, &lead)| {
            let row = idx / CLINICAL_COLUMNS;
            let col = idx % CLINICAL_COLUMNS;
            let rect = Rect::new(
                CLINICAL_MARGIN_LEFT + col as f64 * (column_width + CLINICAL_COLUMN_GAP),
                CLINICAL_MARGIN_TOP + row as f64 * (unit + CLINICAL_ROW_GAP),
                column_width,
                unit,
            );
            Panel {
                lead,
                label: PanelLabel {
                    text: lead.to_string(),
                    x: rect.x - CLINICAL_LEAD_LABEL_OFFSET,
                    y: rect.center_y(),
                    rotated: false,
                },
                rect,
                voltage_labels: false,
                time_labels: false,
                calibration_pulse: !leads.get(lead).is_empty(),
            }
        })
        .collect();

    let rhythm_top = CLINICAL_MARGIN_TOP
        + CLINICAL_LEAD_ROWS as f64 * unit
        + (CLINICAL_LEAD_ROWS - 1) as f64 * CLINICAL_ROW_GAP
        + CLINICAL_RHYTHM_GAP;
    let rhythm_rect = Rect::new(
        CLINICAL_MARGIN_LEFT,
        rhythm_top,
        plot_width,
        unit * CLINICAL_RHYTHM_ROW_RATIO,
    );
    panels.push(Panel {
        lead: Lead::RHYTHM,
        label: PanelLabel {
            text: format!("Rhythm ({})", Lead::RHYTHM),
            x: rhythm_rect.x - CLINICAL_RHYTHM_LABEL_OFFSET,
            y: rhythm_rect.center_y(),
            rotated: false,
        },
        rect: rhythm_rect,
        voltage_labels: true,
        time_labels: true,
        calibration_pulse: false,
    });

    PageLayout {
        kind: LayoutKind::Clinical,
        width,
        height,
        title_baseline: TITLE_BASELINE,
        panels,
        footer: Some((
            height - FOOTER_BOTTOM_OFFSET,
            FOOTER_COLUMNS.map(|f| f * width),
        )),
    }
}
