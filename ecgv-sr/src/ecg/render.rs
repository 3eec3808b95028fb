//! Draw an exam onto a [`Figure`]

use tracing::{debug, warn};

use ecgv_common::LayoutKind;

use super::figure::{
    Anchor, Axes, Figure, Rect, CALIBRATION, MAJOR_GRID, MINOR_GRID, TRACE,
};
use super::layout::{page_layout, Panel};
use super::leads::LeadSeries;
use super::recording::ExamAnnotations;
use super::scale::{time_ticks, voltage_ticks, AxisRange, GridTicks, TimeAxis, CLINICAL_PADDING_MV};
use super::Exam;
use crate::error::{Error, Result};

const TITLE_SIZE: f64 = 16.0;
const LABEL_SIZE: f64 = 10.0;
const TICK_LABEL_SIZE: f64 = 8.0;

const Y_TICK_LABEL_GAP: f64 = 4.0;
const X_TICK_LABEL_DROP: f64 = 11.0;
const X_CAPTION_DROP: f64 = 26.0;

pub const CALIBRATION_START_S: f64 = 0.05;
pub const CALIBRATION_WIDTH_S: f64 = 0.2;
pub const CALIBRATION_HEIGHT_MV: f64 = 1.0;
/// Pulse baseline as a fraction of the voltage range above its minimum
pub const CALIBRATION_BASELINE_FRACTION: f64 = 0.1;

/// Build the complete chart for `exam`
pub fn draw_exam(exam: &Exam, kind: LayoutKind) -> Result<Figure> {
    let padding = match kind {
        LayoutKind::Stacked => 0.0,
        LayoutKind::Clinical => CLINICAL_PADDING_MV,
    };
    let range = AxisRange::from_samples(exam.leads.all_samples(), padding).ok_or(Error::NoLeadData)?;
    let time = TimeAxis::new(exam.recording.sample_rate_hz, exam.leads.longest_len());
    let t_ticks = time_ticks(&time);
    let v_ticks = voltage_ticks(&range);
    let t_max = time.view_end_s();
    if t_ticks.minor.is_empty() || v_ticks.minor.is_empty() {
        warn!(
            "Grid thinned for a wide extent: {} x {} major lines, {} x {} minor lines",
            t_ticks.major.len(),
            v_ticks.major.len(),
            t_ticks.minor.len(),
            v_ticks.minor.len()
        );
    }

    let page = page_layout(kind, &exam.leads);
    debug!(
        "Drawing {} layout: {} panels, {:.3} s, [{:.2}, {:.2}] mV",
        kind,
        page.panels.len(),
        time.end_s(),
        range.min_mv,
        range.max_mv
    );

    let mut fig = Figure::new(page.width, page.height);
    fig.text(
        page.width / 2.0,
        page.title_baseline,
        &exam.patient.title(),
        TITLE_SIZE,
        Anchor::Middle,
    );

    for panel in &page.panels {
        let axes = Axes::new(panel.rect, 0.0, t_max, range);
        let series = exam.leads.get(panel.lead);
        draw_panel(&mut fig, panel, &axes, series, &time, &t_ticks, &v_ticks);
    }

    if let Some((baseline, columns)) = page.footer {
        for (x, text) in columns.iter().zip(footer_items(exam)) {
            fig.text(*x, baseline, &text, LABEL_SIZE, Anchor::Start);
        }
    }

    Ok(fig)
}

fn draw_panel(
    fig: &mut Figure,
    panel: &Panel,
    axes: &Axes,
    series: &LeadSeries,
    time: &TimeAxis,
    t_ticks: &GridTicks,
    v_ticks: &GridTicks,
) {
    fig.clipped(panel.rect, |fig| {
        fig.path(&grid_path(axes, &t_ticks.minor, &v_ticks.minor), MINOR_GRID);
        fig.path(&grid_path(axes, &t_ticks.major, &v_ticks.major), MAJOR_GRID);

        fig.polyline(
            series
                .samples_mv
                .iter()
                .enumerate()
                .map(|(i, &mv)| (axes.x(time.time_at(i)), axes.y(mv))),
            TRACE,
        );

        if panel.calibration_pulse {
            fig.polyline(
                calibration_pulse(&axes.range)
                    .iter()
                    .map(|&(t, mv)| (axes.x(t), axes.y(mv))),
                CALIBRATION,
            );
        }
    });

    if panel.label.rotated {
        fig.vertical_text(panel.label.x, panel.label.y, &panel.label.text, LABEL_SIZE);
    } else {
        fig.text(
            panel.label.x,
            panel.label.y,
            &panel.label.text,
            LABEL_SIZE,
            Anchor::End,
        );
    }

    if panel.voltage_labels {
        for &mv in &v_ticks.labels {
            fig.text(
                panel.rect.x - Y_TICK_LABEL_GAP,
                axes.y(mv) + TICK_LABEL_SIZE / 3.0,
                &tick_label(mv),
                TICK_LABEL_SIZE,
                Anchor::End,
            );
        }
    }

    if panel.time_labels {
        for &t in &t_ticks.labels {
            fig.text(
                axes.x(t),
                panel.rect.bottom() + X_TICK_LABEL_DROP,
                &tick_label(t),
                TICK_LABEL_SIZE,
                Anchor::Middle,
            );
        }
        fig.text(
            panel.rect.x + panel.rect.width / 2.0,
            panel.rect.bottom() + X_CAPTION_DROP,
            "Time (s)",
            LABEL_SIZE,
            Anchor::Middle,
        );
    }
}

/// Vertical lines at `times` and horizontal lines at `voltages`, as one path
fn grid_path(axes: &Axes, times: &[f64], voltages: &[f64]) -> String {
    let Rect { x, y, width, height } = axes.rect;
    let mut d = String::new();
    for &t in times {
        let px = axes.x(t);
        d.push_str(&format!("M{:.2} {:.2}V{:.2}", px, y, y + height));
    }
    for &mv in voltages {
        let py = axes.y(mv);
        d.push_str(&format!("M{:.2} {:.2}H{:.2}", x, py, x + width));
    }
    d
}

/// Square pulse vertices in (seconds, millivolts)
///
/// Up at 0.05 s, across 0.2 s, back down; baseline 10% above the range
/// minimum. Independent of the recorded signal.
pub fn calibration_pulse(range: &AxisRange) -> [(f64, f64); 4] {
    let base = range.min_mv + range.span() * CALIBRATION_BASELINE_FRACTION;
    let top = base + CALIBRATION_HEIGHT_MV;
    let end = CALIBRATION_START_S + CALIBRATION_WIDTH_S;
    [
        (CALIBRATION_START_S, base),
        (CALIBRATION_START_S, top),
        (end, top),
        (end, base),
    ]
}

/// Footer texts: paper speed, sensitivity, heart rate
fn footer_items(exam: &Exam) -> [String; 3] {
    let (speed, heart_rate) = match &exam.annotations {
        Some(ExamAnnotations { speed, heart_rate }) => (speed.as_deref(), heart_rate.as_deref()),
        None => (None, None),
    };
    [
        format!("Speed: {} mm/s", speed.unwrap_or(super::patient::NOT_AVAILABLE)),
        format!(
            "Sensitivity: {:.0} µV/mm (10mm/mV)",
            exam.recording.sensitivity_uv_per_unit()
        ),
        format!("HR: {} bpm", heart_rate.unwrap_or(super::patient::NOT_AVAILABLE)),
    ]
}

/// One decimal, without a negative zero
fn tick_label(value: f64) -> String {
    let text = format!("{:.1}", value);
    if text == "-0.0" {
        "0.0".to_string()
    } else {
        text
    }
}
