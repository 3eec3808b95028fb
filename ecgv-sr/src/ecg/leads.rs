//! Canonical 12-lead set
//!
//! Leads are identified by their exact export name. The order of
//! [`Lead::ALL`] is the order used everywhere: extraction, the stacked
//! layout and the 4x3 clinical grid.

use std::fmt;

/// One of the 12 standard ECG leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lead {
    Di,
    Dii,
    Diii,
    Avr,
    Avl,
    Avf,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl Lead {
    /// All leads in canonical order
    pub const ALL: [Lead; 12] = [
        Lead::Di,
        Lead::Dii,
        Lead::Diii,
        Lead::Avr,
        Lead::Avl,
        Lead::Avf,
        Lead::V1,
        Lead::V2,
        Lead::V3,
        Lead::V4,
        Lead::V5,
        Lead::V6,
    ];

    /// Lead drawn across the full width as the rhythm strip
    pub const RHYTHM: Lead = Lead::Dii;

    /// Name as written in the `Nome` attribute of a `Canal` element
    pub fn name(&self) -> &'static str {
        match self {
            Lead::Di => "DI",
            Lead::Dii => "DII",
            Lead::Diii => "DIII",
            Lead::Avr => "aVR",
            Lead::Avl => "aVL",
            Lead::Avf => "aVF",
            Lead::V1 => "V1",
            Lead::V2 => "V2",
            Lead::V3 => "V3",
            Lead::V4 => "V4",
            Lead::V5 => "V5",
            Lead::V6 => "V6",
        }
    }

    /// Exact, case-sensitive lookup; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Lead> {
        Lead::ALL.iter().copied().find(|lead| lead.name() == name)
    }

    /// Position in canonical order
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Calibrated samples of one lead, in millivolts
#[derive(Debug, Clone, PartialEq)]
pub struct LeadSeries {
    pub lead: Lead,
    pub samples_mv: Vec<f64>,
}

impl LeadSeries {
    pub fn new(lead: Lead, samples_mv: Vec<f64>) -> Self {
        Self { lead, samples_mv }
    }

    pub fn empty(lead: Lead) -> Self {
        Self::new(lead, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.samples_mv.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples_mv.len()
    }
}

/// All 12 leads of one exam, in canonical order, empty ones included
#[derive(Debug, Clone, PartialEq)]
pub struct LeadSet {
    series: Vec<LeadSeries>,
}

impl LeadSet {
    /// Build from per-lead sample vectors; leads not supplied stay empty
    pub fn from_series(supplied: impl IntoIterator<Item = LeadSeries>) -> Self {
        let mut series: Vec<LeadSeries> = Lead::ALL.iter().map(|&l| LeadSeries::empty(l)).collect();
        for s in supplied {
            let idx = s.lead.index();
            series[idx] = s;
        }
        Self { series }
    }

    pub fn get(&self, lead: Lead) -> &LeadSeries {
        &self.series[lead.index()]
    }

    /// Every lead, canonical order
    pub fn iter(&self) -> impl Iterator<Item = &LeadSeries> {
        self.series.iter()
    }

    /// Non-empty leads, canonical order
    pub fn present(&self) -> impl Iterator<Item = &LeadSeries> {
        self.series.iter().filter(|s| !s.is_empty())
    }

    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    /// True when no lead carries any sample
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.is_empty())
    }

    /// Sample count of the longest lead
    pub fn longest_len(&self) -> usize {
        self.series.iter().map(|s| s.len()).max().unwrap_or(0)
    }

    /// Every sample of every lead
    pub fn all_samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.series.iter().flat_map(|s| s.samples_mv.iter().copied())
    }
}
