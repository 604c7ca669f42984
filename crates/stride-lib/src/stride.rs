use log::debug;
use serde::{Deserialize, Serialize};

use crate::detectors::gait::GaitEvent;
use crate::error::GaitError;
use crate::signal::{Leg, Series};
use crate::spline::{linspace, CubicSpline};

pub const DEFAULT_STRIDE_POINTS: usize = 100;

/// A contiguous span `[start, end)` of the series bounded by gait events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrideCandidate {
    /// Index of the event that closes the stride.
    pub boundary: usize,
    /// Samples between the bounding crossings.
    pub span: usize,
    pub cadence_spm: f64,
}

impl StrideCandidate {
    pub fn from_event(event: &GaitEvent) -> Self {
        Self {
            boundary: event.index,
            span: event.span,
            cadence_spm: event.cadence_spm,
        }
    }

    /// Number of samples extracted for alignment.
    pub fn points(&self) -> usize {
        self.span + 1
    }

    /// First sample of the extracted range; negative when it would precede the series.
    pub fn start(&self) -> i64 {
        self.boundary as i64 - self.span as i64 - 1
    }

    pub fn end(&self) -> usize {
        self.boundary
    }
}

/// Median by the nearest-rank rule: the value at rank `ceil(n / 2)` of the sorted
/// list, so the result is always one of the inputs.
pub fn median_nearest_rank(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (sorted.len() + 1) / 2;
    Some(sorted[rank - 1])
}

/// Pick the stride whose cadence is the median of all valid events.
pub fn select_median_stride(events: &[GaitEvent]) -> Result<StrideCandidate, GaitError> {
    if events.len() < 2 {
        return Err(GaitError::NoValidStride {
            found: events.len(),
        });
    }
    let cadences: Vec<f64> = events.iter().map(|e| e.cadence_spm).collect();
    let median = median_nearest_rank(&cadences).ok_or(GaitError::NoValidStride { found: 0 })?;
    let event = events
        .iter()
        .find(|e| e.cadence_spm == median)
        .ok_or(GaitError::NoValidStride {
            found: events.len(),
        })?;
    let candidate = StrideCandidate::from_event(event);
    debug!(
        "median cadence {} spm at sample {} (span {})",
        median, candidate.boundary, candidate.span
    );
    Ok(candidate)
}

/// One curve of a canonical stride.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegCurve {
    pub leg: Leg,
    /// Thigh-minus-shank sagittal angle in degrees.
    pub degrees: Vec<f64>,
}

/// Representative stride resampled onto a fixed-length time axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalStride {
    pub source: StrideCandidate,
    /// Seconds from the start of the stride, shared by both legs.
    pub time_s: Vec<f64>,
    pub legs: Vec<LegCurve>,
}

impl CanonicalStride {
    pub fn curve(&self, leg: Leg) -> Option<&[f64]> {
        self.legs
            .iter()
            .find(|c| c.leg == leg)
            .map(|c| c.degrees.as_slice())
    }

    pub fn points(&self) -> usize {
        self.time_s.len()
    }
}

/// Extract the candidate's samples and spline-fit each leg onto `points` offsets.
pub fn align_stride(
    series: &Series,
    candidate: &StrideCandidate,
    points: usize,
) -> Result<CanonicalStride, GaitError> {
    let knots = candidate.points();
    if knots < crate::spline::MIN_KNOTS {
        return Err(GaitError::InsufficientStrideLength { points: knots });
    }
    let start = candidate.start();
    let end = candidate.end();
    if start < 0 || end > series.len() {
        return Err(GaitError::StrideOutOfBounds {
            start,
            end,
            len: series.len(),
        });
    }
    let start = start as usize;

    let mut samples = Vec::with_capacity(knots);
    for index in start..end {
        let frame = &series.frames[index];
        let sample = frame.sample().ok_or(GaitError::MissingData {
            index,
            channel: frame.first_missing().unwrap_or(0),
        })?;
        samples.push(sample);
    }

    let offsets = linspace(0.0, candidate.span as f64, points);
    let mut legs = Vec::with_capacity(Leg::BOTH.len());
    for leg in Leg::BOTH {
        let radians: Vec<f64> = samples.iter().map(|s| s.knee_angle(leg)).collect();
        let spline = CubicSpline::not_a_knot(&radians)?;
        let degrees = offsets
            .iter()
            .map(|&x| spline.eval(x).to_degrees())
            .collect();
        legs.push(LegCurve { leg, degrees });
    }
    let time_s = offsets.iter().map(|x| x / series.fs).collect();

    Ok(CanonicalStride {
        source: *candidate,
        time_s,
        legs,
    })
}

/// Select the median stride and align it in one step.
pub fn canonical_stride(
    series: &Series,
    events: &[GaitEvent],
    points: usize,
) -> Result<CanonicalStride, GaitError> {
    let candidate = select_median_stride(events)?;
    align_stride(series, &candidate, points)
}
