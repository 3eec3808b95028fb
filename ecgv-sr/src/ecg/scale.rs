//! Time and voltage axes on standard ECG paper
//!
//! At 25 mm/s and 10 mm/mV a 5 mm major square is 0.2 s by 0.5 mV and a
//! 1 mm minor square is 0.04 s by 0.1 mV. These steps are fixed.

/// Major grid step along time, seconds
pub const MAJOR_TIME_STEP_S: f64 = 0.2;
/// Minor grid step along time, seconds
pub const MINOR_TIME_STEP_S: f64 = 0.04;
/// Major grid step along voltage, millivolts
pub const MAJOR_VOLTAGE_STEP_MV: f64 = 0.5;
/// Minor grid step along voltage, millivolts
pub const MINOR_VOLTAGE_STEP_MV: f64 = 0.1;

/// Voltage range bounds are snapped outward to multiples of this
pub const RANGE_ROUNDING_MV: f64 = 0.5;
/// Narrowest allowed voltage range
pub const MIN_RANGE_SPAN_MV: f64 = 1.0;
/// Extra headroom added on both sides in the clinical layout
pub const CLINICAL_PADDING_MV: f64 = 0.1;

// Tick sequences stop just past the last value so it is included.
const TIME_TICK_SLACK_S: f64 = 0.01;
const MAJOR_VOLTAGE_SLACK_MV: f64 = 0.01;
const MINOR_VOLTAGE_SLACK_MV: f64 = 0.001;

/// Sample-index based time axis shared by all leads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub sample_rate_hz: f64,
    /// Sample count of the longest lead
    pub len: usize,
}

impl TimeAxis {
    pub fn new(sample_rate_hz: f64, len: usize) -> Self {
        Self { sample_rate_hz, len }
    }

    /// Time of sample `index`, seconds
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate_hz
    }

    /// Time of the last sample; 0 for an empty or single-sample axis
    pub fn end_s(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.time_at(self.len - 1)
        }
    }

    /// Right edge of the plotted time range
    ///
    /// Covers the last sample and the last major tick; never zero wide.
    pub fn view_end_s(&self) -> f64 {
        let majors = tick_count(0.0, self.end_s() + TIME_TICK_SLACK_S, MAJOR_TIME_STEP_S);
        let last_major = majors.saturating_sub(1) as f64 * MAJOR_TIME_STEP_S;
        self.end_s()
            .max(last_major)
            .max(1.0 / self.sample_rate_hz)
    }
}

/// Voltage range shared by every panel of one image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min_mv: f64,
    pub max_mv: f64,
}

impl AxisRange {
    pub fn new(min_mv: f64, max_mv: f64) -> Self {
        Self { min_mv, max_mv }
    }

    pub fn span(&self) -> f64 {
        self.max_mv - self.min_mv
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_mv + self.max_mv) / 2.0
    }

    /// Snap outward to multiples of 0.5 mV
    pub fn snap(min_mv: f64, max_mv: f64) -> Self {
        Self::new(
            (min_mv / RANGE_ROUNDING_MV).floor() * RANGE_ROUNDING_MV,
            (max_mv / RANGE_ROUNDING_MV).ceil() * RANGE_ROUNDING_MV,
        )
    }

    /// Snap, widen to at least 1 mV around the snapped midpoint, then pad
    pub fn from_extent(min_mv: f64, max_mv: f64, padding_mv: f64) -> Self {
        let mut range = Self::snap(min_mv, max_mv);
        if range.span() < MIN_RANGE_SPAN_MV {
            let mid = range.midpoint();
            range = Self::new(mid - MIN_RANGE_SPAN_MV / 2.0, mid + MIN_RANGE_SPAN_MV / 2.0);
        }
        Self::new(range.min_mv - padding_mv, range.max_mv + padding_mv)
    }

    /// Range over every sample; `None` when there are no samples
    pub fn from_samples(samples: impl IntoIterator<Item = f64>, padding_mv: f64) -> Option<Self> {
        let (min, max) = samples
            .into_iter()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(Self::from_extent(min, max, padding_mv))
    }
}

/// Most gridlines drawn for one tick level of one axis
///
/// A level that would need more is left out. A one minute recording still
/// gets its minor time lines.
pub const MAX_GRID_LINES: usize = 2000;
/// Most tick labels under the time axis
pub const MAX_TIME_LABELS: usize = 60;
/// Most tick labels beside the voltage axis
pub const MAX_VOLTAGE_LABELS: usize = 24;

/// Major and minor gridline positions along one axis, plus the labelled ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridTicks {
    pub major: Vec<f64>,
    pub minor: Vec<f64>,
    /// Major tick values that get a text label, thinned to a fixed maximum
    pub labels: Vec<f64>,
}

/// Number of values `arange(start, stop, step)` produces
///
/// Saturates at `usize::MAX` for extents too wide to enumerate.
pub fn tick_count(start: f64, stop: f64, step: f64) -> usize {
    let count = ((stop - start) / step).ceil();
    if step <= 0.0 || count.is_nan() || count <= 0.0 {
        0
    } else {
        // Float to int casts saturate, including for +inf
        count as usize
    }
}

/// Evenly spaced values in `[start, stop)`
///
/// Count is `ceil((stop - start) / step)`; values are computed from the
/// index so rounding error does not accumulate. Check [`tick_count`] first
/// when the extent comes from untrusted data.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    (0..tick_count(start, stop, step))
        .map(|i| start + i as f64 * step)
        .collect()
}

/// [`arange`], or nothing when it would exceed [`MAX_GRID_LINES`]
fn grid_level(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if tick_count(start, stop, step) > MAX_GRID_LINES {
        return Vec::new();
    }
    arange(start, stop, step)
}

/// Every n-th value of `arange(start, stop, step)`, at most `max_labels` of them
///
/// The stride is worked out in floating point so it still spreads the
/// labels across extents whose tick count does not fit a `usize`.
pub fn label_ticks(start: f64, stop: f64, step: f64, max_labels: usize) -> Vec<f64> {
    let count = ((stop - start) / step).ceil();
    if tick_count(start, stop, step) == 0 || !count.is_finite() || max_labels == 0 {
        return Vec::new();
    }
    let stride = (count / max_labels as f64).ceil();
    let labels = ((count / stride).ceil() as usize).min(max_labels);
    (0..labels)
        .map(|k| start + k as f64 * stride * step)
        .collect()
}

/// Time gridlines from 0 through the last sample
pub fn time_ticks(axis: &TimeAxis) -> GridTicks {
    let stop = axis.end_s() + TIME_TICK_SLACK_S;
    GridTicks {
        major: grid_level(0.0, stop, MAJOR_TIME_STEP_S),
        minor: grid_level(0.0, stop, MINOR_TIME_STEP_S),
        labels: label_ticks(0.0, stop, MAJOR_TIME_STEP_S, MAX_TIME_LABELS),
    }
}

/// Voltage gridlines starting at the range minimum
pub fn voltage_ticks(range: &AxisRange) -> GridTicks {
    let major_stop = range.max_mv + MAJOR_VOLTAGE_SLACK_MV;
    GridTicks {
        major: grid_level(range.min_mv, major_stop, MAJOR_VOLTAGE_STEP_MV),
        minor: grid_level(
            range.min_mv,
            range.max_mv + MINOR_VOLTAGE_SLACK_MV,
            MINOR_VOLTAGE_STEP_MV,
        ),
        labels: label_ticks(
            range.min_mv,
            major_stop,
            MAJOR_VOLTAGE_STEP_MV,
            MAX_VOLTAGE_LABELS,
        ),
    }
}
