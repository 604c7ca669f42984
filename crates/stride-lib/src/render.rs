//! Per-frame limb geometry handed to the video renderer.

use serde::{Deserialize, Serialize};

use crate::detectors::gait::GaitDetection;
use crate::signal::{Leg, Sample, Series, SAGITTAL_AXIS};

/// Canvas the stick figure is drawn on, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
        }
    }
}

impl RenderConfig {
    pub fn center(&self) -> [f64; 2] {
        [self.width * 0.5, self.height * 0.5]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegPose {
    pub leg: Leg,
    pub hip: [f64; 2],
    pub knee: [f64; 2],
    pub ankle: [f64; 2],
    /// Knee flexion shown next to the figure, degrees in `[0, 180)`.
    pub knee_angle_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub index: usize,
    pub elapsed_s: f64,
    /// Latest cadence at or before this frame, 0 until the first event.
    pub cadence_spm: f64,
    pub left: LegPose,
    pub right: LegPose,
}

pub fn leg_pose(sample: &Sample, leg: Leg, canvas: &RenderConfig, limb_length: f64) -> LegPose {
    let thigh = sample.segment(leg.thigh())[SAGITTAL_AXIS];
    let shank = sample.segment(leg.shank())[SAGITTAL_AXIS];
    let hip = canvas.center();
    let knee = [
        hip[0] + limb_length * thigh.cos(),
        hip[1] - limb_length * thigh.sin(),
    ];
    let ankle = [
        knee[0] - limb_length * shank.cos(),
        knee[1] - limb_length * shank.sin(),
    ];
    let knee_angle_deg = round2((thigh - shank).abs().to_degrees() % 180.0);
    LegPose {
        leg,
        hip,
        knee,
        ankle,
        knee_angle_deg,
    }
}

/// One render frame per valid sample; invalid frames are skipped.
pub fn render_frames(
    series: &Series,
    detection: &GaitDetection,
    canvas: &RenderConfig,
    limb_length: f64,
) -> Vec<RenderFrame> {
    series
        .samples()
        .map(|(index, sample)| RenderFrame {
            index,
            elapsed_s: round2(index as f64 / series.fs),
            cadence_spm: detection.cadence_at(index).unwrap_or(0.0),
            left: leg_pose(&sample, Leg::Left, canvas, limb_length),
            right: leg_pose(&sample, Leg::Right, canvas, limb_length),
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::gait::GaitEvent;
    use crate::signal::{Frame, CHANNELS};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn straight_leg_hangs_from_the_hip() {
        let sample = Sample::from_channels([0.0; CHANNELS]);
        let pose = leg_pose(&sample, Leg::Left, &RenderConfig::default(), 100.0);
        assert_eq!(pose.hip, [300.0, 300.0]);
        assert_eq!(pose.knee, [400.0, 300.0]);
        assert_eq!(pose.ankle, [300.0, 300.0]);
        assert_eq!(pose.knee_angle_deg, 0.0);
    }

    #[test]
    fn knee_angle_is_unsigned_degrees() {
        let mut sample = Sample::from_channels([0.0; CHANNELS]);
        sample.right_thigh[SAGITTAL_AXIS] = 0.2;
        sample.right_shank[SAGITTAL_AXIS] = 0.2 + FRAC_PI_2;
        let pose = leg_pose(&sample, Leg::Right, &RenderConfig::default(), 100.0);
        assert_eq!(pose.knee_angle_deg, 90.0);
        assert!((pose.knee[1] - (300.0 - 100.0 * 0.2f64.sin())).abs() < 1e-9);
    }

    #[test]
    fn frames_carry_running_cadence() {
        let mut frames = vec![Frame::complete([0.0; CHANNELS]); 6];
        frames[2].channels[0] = None;
        let series = Series::new(30.0, frames);
        let detection = GaitDetection {
            crossings: vec![1, 3],
            events: vec![GaitEvent {
                index: 3,
                time_s: 0.1,
                cadence_spm: 150.0,
                span: 2,
            }],
        };
        let rendered = render_frames(&series, &detection, &RenderConfig::default(), 100.0);
        assert_eq!(rendered.len(), 5);
        assert_eq!(rendered[2].index, 3);
        assert_eq!(rendered[1].cadence_spm, 0.0);
        assert_eq!(rendered[2].cadence_spm, 150.0);
        assert_eq!(rendered[4].elapsed_s, 0.17);
    }
}
