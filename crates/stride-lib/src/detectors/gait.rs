use log::debug;
use serde::{Deserialize, Serialize};

use crate::signal::{Segment, Series, SWING_AXIS};

/// Screen-space projection of a limb angle: `center + leg_length * cos(angle + rotate_offset)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Limb length, the projection scale.
    pub leg_length: f64,
    /// Offset converting the raw angle convention into the projection (radians).
    pub rotate_offset: f64,
    /// Reference line the projection oscillates around.
    pub center: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            leg_length: 100.0,
            rotate_offset: std::f64::consts::FRAC_PI_2,
            center: 300.0,
        }
    }
}

impl ProjectionConfig {
    pub fn project(&self, angle: f64) -> f64 {
        self.center + self.leg_length * (angle + self.rotate_offset).cos()
    }
}

/// How the crossing accumulator is bounded and which cadences count as strides.
///
/// The two knobs can be combined; with both unset every crossing after the
/// first yields an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorPolicy {
    /// Only cadences strictly above this many strides/min produce events.
    pub min_cadence: Option<f64>,
    /// Clear the accumulator once it holds more than this many crossings.
    pub reset_after: Option<usize>,
}

impl DetectorPolicy {
    /// Never resets, discards cadences at or below `min_cadence`.
    pub fn thresholded(min_cadence: f64) -> Self {
        Self {
            min_cadence: Some(min_cadence),
            reset_after: None,
        }
    }

    /// Accepts every cadence, restarts the estimate after `reset_after` crossings.
    pub fn rolling(reset_after: usize) -> Self {
        Self {
            min_cadence: None,
            reset_after: Some(reset_after),
        }
    }
}

impl Default for DetectorPolicy {
    fn default() -> Self {
        Self::thresholded(30.0)
    }
}

/// Configurable parameters for gait-event detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitDetectorConfig {
    pub projection: ProjectionConfig,
    pub policy: DetectorPolicy,
    /// Limb whose angle drives detection.
    pub segment: Segment,
    /// Axis of that limb's angle vector.
    pub axis: usize,
}

impl Default for GaitDetectorConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            policy: DetectorPolicy::default(),
            segment: Segment::LeftThigh,
            axis: SWING_AXIS,
        }
    }
}

/// A downward crossing that produced a valid cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitEvent {
    /// Sample index of the last frame above the reference line.
    pub index: usize,
    pub time_s: f64,
    /// Strides per minute, rounded to 2 dp.
    pub cadence_spm: f64,
    /// Samples since the previous crossing.
    pub span: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GaitDetection {
    /// Every downward crossing, valid or not.
    pub crossings: Vec<usize>,
    pub events: Vec<GaitEvent>,
}

impl GaitDetection {
    /// `[time_s, strides/min]` pairs for plotting.
    pub fn cadence_series(&self) -> Vec<[f64; 2]> {
        self.events
            .iter()
            .map(|e| [e.time_s, e.cadence_spm])
            .collect()
    }

    /// Most recent cadence at or before `index`, if any.
    pub fn cadence_at(&self, index: usize) -> Option<f64> {
        let pos = self.events.partition_point(|e| e.index <= index);
        pos.checked_sub(1).map(|i| self.events[i].cadence_spm)
    }
}

/// Outcome of a downward crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crossing {
    Valid(GaitEvent),
    /// First crossing of a window, or a cadence the policy discarded.
    Rejected,
}

/// Per-recording crossing accumulator. Build one per run; state is never shared.
#[derive(Debug, Clone)]
pub struct GaitDetector {
    cfg: GaitDetectorConfig,
    fs: f64,
    window: Vec<f64>,
    last_crossing: Option<usize>,
}

impl GaitDetector {
    pub fn new(cfg: GaitDetectorConfig, fs: f64) -> Self {
        Self {
            cfg,
            fs,
            window: Vec::new(),
            last_crossing: None,
        }
    }

    pub fn config(&self) -> &GaitDetectorConfig {
        &self.cfg
    }

    /// Feed the detection angle at `index` and `index + 1`.
    ///
    /// Returns `None` when the projection did not cross the reference line downward.
    pub fn observe(&mut self, index: usize, angle: f64, next_angle: f64) -> Option<Crossing> {
        let proj = &self.cfg.projection;
        if !(proj.project(angle) > proj.center && proj.project(next_angle) < proj.center) {
            return None;
        }

        let time_s = index as f64 / self.fs;
        self.window.push(time_s);
        let span = index - self.last_crossing.unwrap_or(0);
        self.last_crossing = Some(index);

        if self.window.len() < 2 {
            return Some(Crossing::Rejected);
        }
        let elapsed_min = (time_s - self.window[0]) / 60.0;
        let cadence_spm = round2(self.window.len() as f64 / elapsed_min);
        if let Some(limit) = self.cfg.policy.reset_after {
            if self.window.len() > limit {
                self.window.clear();
            }
        }
        if self
            .cfg
            .policy
            .min_cadence
            .is_some_and(|min| cadence_spm <= min)
        {
            return Some(Crossing::Rejected);
        }
        Some(Crossing::Valid(GaitEvent {
            index,
            time_s,
            cadence_spm,
            span,
        }))
    }

    /// Scan every adjacent pair of valid frames.
    pub fn detect(&mut self, series: &Series) -> GaitDetection {
        let mut detection = GaitDetection::default();
        let (segment, axis) = (self.cfg.segment, self.cfg.axis);
        for t in 0..series.len().saturating_sub(1) {
            let (Some(a), Some(b)) = (series.sample(t), series.sample(t + 1)) else {
                continue;
            };
            let angle = a.segment(segment)[axis.min(2)];
            let next = b.segment(segment)[axis.min(2)];
            match self.observe(t, angle, next) {
                Some(Crossing::Valid(event)) => {
                    detection.crossings.push(t);
                    detection.events.push(event);
                }
                Some(Crossing::Rejected) => detection.crossings.push(t),
                None => {}
            }
        }
        debug!(
            "detected {} crossings, {} valid gait events",
            detection.crossings.len(),
            detection.events.len()
        );
        detection
    }
}

/// Run detection with a fresh accumulator.
pub fn detect_gait_events(series: &Series, cfg: &GaitDetectorConfig) -> GaitDetection {
    GaitDetector::new(*cfg, series.fs).detect(series)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
