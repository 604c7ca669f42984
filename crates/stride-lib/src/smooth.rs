//! Causal time-decayed recursive smoother.
//!
//! Each output channel starts at the raw value and receives one correction per
//! retained output frame: `(1/k) * (raw - past_k)` for the k-th most recent
//! frame. The sum is not renormalised by the number of terms applied.

use log::debug;
use std::collections::VecDeque;

use crate::signal::{Frame, Series, CHANNELS};

pub const DEFAULT_DEPTH: usize = 4;

/// Owns the trailing window of emitted frames for one recording.
#[derive(Debug, Clone)]
pub struct DecaySmoother {
    depth: usize,
    window: VecDeque<Frame>,
}

impl DecaySmoother {
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            window: VecDeque::with_capacity(depth + 1),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Smooth one raw frame and retain the result in the window.
    pub fn push(&mut self, raw: &Frame) -> Frame {
        let mut out = [None; CHANNELS];
        for (channel, slot) in out.iter_mut().enumerate() {
            let Some(current) = raw.channels[channel] else {
                continue;
            };
            let mut value = current;
            for (k, past) in self.window.iter().rev().enumerate() {
                if let Some(past) = past.channels[channel] {
                    value += (1.0 / (k + 1) as f64) * (current - past);
                }
            }
            *slot = Some(value);
        }
        let frame = Frame { channels: out };
        self.window.push_back(frame);
        if self.window.len() > self.depth {
            self.window.pop_front();
        }
        frame
    }

    /// Lazily smooth a sequence; dropping the iterator early is fine.
    pub fn iter<'a>(
        &'a mut self,
        frames: &'a [Frame],
    ) -> impl Iterator<Item = Frame> + 'a {
        frames.iter().map(move |frame| self.push(frame))
    }

    pub fn smooth(&mut self, series: &Series) -> Series {
        let frames: Vec<Frame> = self.iter(&series.frames).collect();
        debug!(
            "smoothed {} frames with window depth {}",
            frames.len(),
            self.depth
        );
        Series::new(series.fs, frames)
    }
}

impl Default for DecaySmoother {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

/// Smooth a whole series with a fresh window.
pub fn smooth_series(series: &Series, depth: usize) -> Series {
    DecaySmoother::new(depth).smooth(series)
}
