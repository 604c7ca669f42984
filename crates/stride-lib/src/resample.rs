use log::{debug, warn};

use crate::error::GaitError;
use crate::signal::{Frame, Series, CHANNELS};

const POSITION_EPS: f64 = 1e-9;

/// Linear-interpolation rate converter from the capture rate to the analysis rate.
#[derive(Debug, Clone, Copy)]
pub struct Resampler {
    pub source_fs: f64,
    pub target_fs: f64,
}

/// Resampled series plus every channel that could not be interpolated.
#[derive(Debug, Clone)]
pub struct Resampled {
    pub series: Series,
    pub missing: Vec<GaitError>,
}

impl Resampler {
    pub fn new(source_fs: f64, target_fs: f64) -> Self {
        Self {
            source_fs,
            target_fs,
        }
    }

    /// Number of output frames for `raw_len` input frames.
    pub fn output_len(&self, raw_len: usize) -> usize {
        if raw_len == 0 {
            return 0;
        }
        let span = (raw_len - 1) as f64 * self.target_fs / self.source_fs;
        (span + POSITION_EPS).floor() as usize + 1
    }

    pub fn resample(&self, raw: &[Frame]) -> Resampled {
        let len = self.output_len(raw.len());
        let step = self.source_fs / self.target_fs;
        let mut frames = Vec::with_capacity(len);
        let mut missing = Vec::new();

        for j in 0..len {
            let position = j as f64 * step;
            let mut i = position.floor() as usize;
            let mut frac = position - i as f64;
            if frac > 1.0 - POSITION_EPS {
                i += 1;
                frac = 0.0;
            }
            let i = i.min(raw.len() - 1);
            let frame = if frac < POSITION_EPS || i + 1 >= raw.len() {
                carry(&raw[i], j, &mut missing)
            } else {
                interpolate(&raw[i], &raw[i + 1], frac, j, &mut missing)
            };
            frames.push(frame);
        }

        debug!(
            "resampled {} frames at {} Hz into {} frames at {} Hz ({} missing channels)",
            raw.len(),
            self.source_fs,
            frames.len(),
            self.target_fs,
            missing.len()
        );
        Resampled {
            series: Series::new(self.target_fs, frames),
            missing,
        }
    }
}

fn carry(frame: &Frame, index: usize, missing: &mut Vec<GaitError>) -> Frame {
    for channel in 0..CHANNELS {
        if frame.channels[channel].is_none() {
            report_missing(missing, index, channel);
        }
    }
    *frame
}

fn interpolate(
    prev: &Frame,
    next: &Frame,
    frac: f64,
    index: usize,
    missing: &mut Vec<GaitError>,
) -> Frame {
    let mut channels = [None; CHANNELS];
    for (channel, slot) in channels.iter_mut().enumerate() {
        *slot = match (prev.channels[channel], next.channels[channel]) {
            (Some(a), Some(b)) => Some(lerp(a, b, frac)),
            (Some(v), None) | (None, Some(v)) => {
                report_missing(missing, index, channel);
                Some(v)
            }
            (None, None) => {
                report_missing(missing, index, channel);
                None
            }
        };
    }
    Frame { channels }
}

fn lerp(a: f64, b: f64, frac: f64) -> f64 {
    if (frac - 0.5).abs() < POSITION_EPS {
        (a + b) / 2.0
    } else {
        a + (b - a) * frac
    }
}

fn report_missing(missing: &mut Vec<GaitError>, index: usize, channel: usize) {
    let err = GaitError::MissingData { index, channel };
    warn!("{err}");
    missing.push(err);
}
