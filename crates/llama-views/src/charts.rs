//! Chart data shaping
//!
//! The admin dashboards draw radar, pie, bar and area charts. This module
//! turns analytics payloads into the points those charts need, plus a plain
//! text rendering for terminals.

use llama_core::types::{ActivityPoint, NamedValue, ScoredName, WeeklyAverage};
use llama_core::utils::truncate_label;

/// Top of the grading scale
pub const FULL_MARK: f64 = 20.0;

/// Share below which a pie slice shows no label
pub const PIE_LABEL_MIN_SHARE: f64 = 0.05;

/// One spoke of a radar chart
#[derive(Debug, Clone, PartialEq)]
pub struct RadarPoint {
    /// Axis label, possibly truncated
    pub subject: String,
    /// Untruncated name for tooltips
    pub full_name: String,
    /// Plotted value
    pub value: f64,
    /// Radius of the outer ring
    pub full_mark: f64,
}

/// Radar spokes for a ranking
#[must_use]
pub fn radar_points(ranking: &[ScoredName]) -> Vec<RadarPoint> {
    ranking
        .iter()
        .map(|entry| RadarPoint {
            subject: truncate_label(&entry.name),
            full_name: entry.name.clone(),
            value: entry.average,
            full_mark: FULL_MARK,
        })
        .collect()
}

/// One pie slice
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    /// Slice name
    pub name: String,
    /// Raw value
    pub value: f64,
    /// Share of the total in `0.0..=1.0`
    pub share: f64,
    /// `NN%`, absent for slices under [`PIE_LABEL_MIN_SHARE`]
    pub label: Option<String>,
}

/// Pie slices with their shares and labels
///
/// A zero total yields zero shares and no labels.
#[must_use]
pub fn pie_slices(values: &[NamedValue]) -> Vec<PieSlice> {
    let total: f64 = values.iter().map(|v| v.value.max(0.0)).sum();

    values
        .iter()
        .map(|v| {
            let share = if total > 0.0 { v.value.max(0.0) / total } else { 0.0 };
            PieSlice {
                name: v.name.clone(),
                value: v.value,
                share,
                label: (share >= PIE_LABEL_MIN_SHARE).then(|| format!("{:.0}%", share * 100.0)),
            }
        })
        .collect()
}

/// Labelled value for bar and area charts
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Category label
    pub label: String,
    /// Value
    pub value: f64,
}

impl From<&ActivityPoint> for Bar {
    #[allow(clippy::cast_precision_loss)]
    fn from(point: &ActivityPoint) -> Self {
        Self {
            label: point.date.clone(),
            value: point.attempts as f64,
        }
    }
}

impl From<&WeeklyAverage> for Bar {
    fn from(point: &WeeklyAverage) -> Self {
        Self {
            label: point.week.clone(),
            value: point.average,
        }
    }
}

impl From<&ScoredName> for Bar {
    fn from(entry: &ScoredName) -> Self {
        Self {
            label: entry.name.clone(),
            value: entry.average,
        }
    }
}

/// Convert any series into bars
#[must_use]
pub fn bars<'a, T>(series: &'a [T]) -> Vec<Bar>
where
    Bar: From<&'a T>,
{
    series.iter().map(Bar::from).collect()
}

/// Render bars as `label | ####### value`, scaled so the largest fills `width`
#[must_use]
pub fn render_bars(title: &str, bars: &[Bar], width: usize) -> String {
    let mut out = format!("{title}\n");
    if bars.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let max = bars.iter().map(|bar| bar.value).fold(0.0_f64, f64::max);
    let label_width = bars
        .iter()
        .map(|bar| bar.label.chars().count())
        .max()
        .unwrap_or(0);

    for bar in bars {
        let filled = scaled_width(bar.value, max, width);
        out.push_str(&format!(
            "  {:<label_width$} | {} {}\n",
            bar.label,
            "#".repeat(filled),
            bar.value
        ));
    }
    out
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled_width(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max) * width as f64).round().min(width as f64) as usize
}

/// Render pie slices as a legend
#[must_use]
pub fn render_pie(title: &str, slices: &[PieSlice]) -> String {
    let mut out = format!("{title}\n");
    for slice in slices {
        out.push_str(&format!(
            "  {} {} {}\n",
            slice.name,
            slice.value,
            slice.label.as_deref().unwrap_or("")
        ));
    }
    out
}
